mod memory;

use nutrisense::{
    session::InteractionRecord,
    types::{Intent, RoutingDecision},
};

pub fn record(input: &str) -> InteractionRecord {
    InteractionRecord::now(input, Intent::General, RoutingDecision::Finalize)
}
