//! Unified ruleforge CLI.
//!
//! - `ruleforge build` - Compile rule lists into every configured target
//! - `ruleforge check` - Report grammar errors without writing artifacts

use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// ruleforge unified CLI.
#[derive(Parser)]
#[command(
    name = "ruleforge",
    version,
    about = "Compile a routing-rule DSL into Clash, Surge, Quantumult X, sing-box and v2ray rule sets",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile rule lists and write artifacts plus report.json.
    #[command(name = "build", alias = "compile")]
    Build(ruleforge_build::BuildArgs),

    /// Parse rule lists and fail on grammar errors.
    #[command(name = "check", alias = "lint")]
    Check(ruleforge_build::CheckArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build(args) => ruleforge_build::run_build(args).await,
        Commands::Check(args) => ruleforge_build::run_check(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
