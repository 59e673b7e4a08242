use anyhow::{Context, Result};
use nutrisense::{
    chat::{render_setup, run_chat_loop},
    cli::args_from_env,
    config::Config,
    logging::init_tracing,
    runtime::build_orchestrator,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = args_from_env()?;
    let config = Config::load_or_default(args.config_path.as_deref()).with_context(|| {
        match &args.config_path {
            Some(path) => format!("failed to load config from {}", path.display()),
            None => "failed to load config".to_string(),
        }
    })?;
    let logging_guard = init_tracing(&config.logging)?;
    tracing::info!(
        target: "orchestrator",
        run_id = logging_guard.run_id(),
        session_id = %args.session_id,
        "nutrisense_started"
    );

    let orchestrator = build_orchestrator(&config)?;

    if args.validate {
        println!("{}", render_setup(&orchestrator.validate()));
        return Ok(());
    }

    match &args.query {
        Some(query) => println!("{}", orchestrator.respond(&args.session_id, query).await),
        None => run_chat_loop(&orchestrator, &args.session_id).await?,
    }

    Ok(())
}
