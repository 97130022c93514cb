//! anomtrain CLI -- generate, solve, and play transaction anomaly
//! exercises.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "anomtrain",
    about = "Generator and grader for database transaction anomaly exercises"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Batch-generate exercise sessions as JSON worksheets
    Generate(GenerateArgs),
    /// Classify an explicit step sequence against the configured rule sets
    Solve(SolveArgs),
    /// Run an interactive training session on the terminal
    Play(PlayArgs),
    /// Print the JSON Schema for the configuration format to stdout
    Schema,
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Schedule specification file (JSON); defaults to the stock trainer
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of sessions to generate
    #[arg(long, default_value_t = 1)]
    pub n_sessions: u64,
    /// Output directory for generated session files
    #[arg(long)]
    pub output_dir: PathBuf,
}

#[derive(Debug, Parser)]
pub struct SolveArgs {
    /// Schedule specification file (JSON); defaults to the stock trainer
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Step tokens in schedule order, e.g. "T1,read" "T2,write"
    #[arg(required = true)]
    pub steps: Vec<String>,
}

#[derive(Debug, Parser)]
pub struct PlayArgs {
    /// Schedule specification file (JSON); defaults to the stock trainer
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Session file to resume from and persist to
    #[arg(long, default_value = "anomtrain-session.json")]
    pub session_file: PathBuf,
}

#[cfg(test)]
mod tests {
    use anomtrain_gen::ScheduleSpec;

    #[test]
    fn config_schema_covers_the_rule_set_shape() {
        let schema = schemars::schema_for!(ScheduleSpec);
        let rendered = serde_json::to_string(&schema).unwrap();
        assert!(rendered.contains("rule_sets"));
        assert!(rendered.contains("label"));
        assert!(rendered.contains("blacklist"));
    }
}
