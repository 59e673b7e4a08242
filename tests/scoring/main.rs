
use nutrisense::ports::{ConceptKind, ConceptMatch};

pub fn concept(id: &str, kind: ConceptKind, relevance: Option<f64>, distance: f64) -> ConceptMatch {
    ConceptMatch {
        concept_id: id.to_string(),
        kind,
        relevance,
        distance,
    }
}
