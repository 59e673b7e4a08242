use std::{env, path::PathBuf};

use anyhow::{Result, anyhow};

pub const DEFAULT_SESSION_ID: &str = "cli";

pub const USAGE: &str =
    "usage: nutrisense [--config <path>] [--session <id>] [--query <text>] [--validate]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub session_id: String,
    pub query: Option<String>,
    pub validate: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            config_path: None,
            session_id: DEFAULT_SESSION_ID.to_string(),
            query: None,
            validate: false,
        }
    }
}

pub fn args_from_env() -> Result<CliArgs> {
    parse_args(env::args().skip(1))
}

pub fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => parsed.config_path = Some(PathBuf::from(value_for(&arg, args.next())?)),
            "--session" => {
                let session_id = value_for(&arg, args.next())?;
                if session_id.trim().is_empty() {
                    return Err(anyhow!("--session cannot be empty. {USAGE}"));
                }
                parsed.session_id = session_id;
            }
            "--query" => parsed.query = Some(value_for(&arg, args.next())?),
            "--validate" => parsed.validate = true,
            other => return Err(anyhow!("unexpected argument '{other}'. {USAGE}")),
        }
    }

    Ok(parsed)
}

fn value_for(flag: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| anyhow!("{flag} expects a value. {USAGE}"))
}
