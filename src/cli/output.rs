use action_flow::ActionOutcome;
use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Human,
    Json,
}

pub fn print_outcome(outcome: &ActionOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            let status = if outcome.ok { "OK" } else { "FAILED" };
            println!("{status}: {}", outcome.message);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
    }
    Ok(())
}
