pub mod handlers;
pub mod worklog;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use dcawk_core::error::Result;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Fetch {
            env,
            out,
            base_url,
            config,
        } => handlers::handle_fetch(env.into(), out, &base_url, &config).map(|_| ()),
        Commands::Compare { prod, test, out } => {
            handlers::handle_compare(&prod, &test, &out).map(|_| ())
        }
        Commands::Analyze { prod, test, out } => handlers::handle_analyze(&prod, &test, &out),
        Commands::Replay {
            diff,
            base_url,
            config,
        } => handlers::handle_replay(&diff, &base_url, &config).map(|_| ()),
        Commands::Workflow {
            base_url,
            config,
            prod,
            test,
            diff,
            report,
            log,
        } => handlers::handle_workflow(base_url, config, prod, test, diff, report, log),
    }
}
