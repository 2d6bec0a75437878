use clap::{Parser, Subcommand, ValueEnum};
use dcawk_core::DEFAULT_BASE_URL;
use dcawk_core::Environment;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "DCA workbook reconciliation CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EnvArg {
    Prod,
    Test,
}

impl From<EnvArg> for Environment {
    fn from(value: EnvArg) -> Self {
        match value {
            EnvArg::Prod => Environment::Prod,
            EnvArg::Test => Environment::Test,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract one environment's records into a snapshot CSV
    Fetch {
        /// environment to pull from
        #[arg(value_enum)]
        env: EnvArg,

        /// snapshot path; defaults to xdcawk_<env>.csv
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// JSON file holding prod_api_key / test_api_key
        #[arg(long, default_value = "api_config.json")]
        config: PathBuf,
    },

    /// Diff the production snapshot against the test snapshot by composite key
    Compare {
        #[arg(long, default_value = "xdcawk_prod.csv")]
        prod: PathBuf,

        #[arg(long, default_value = "xdcawk_test.csv")]
        test: PathBuf,

        /// diff CSV output (same schema, header always written)
        #[arg(long, default_value = "xdcawk_diff.csv")]
        out: PathBuf,
    },

    /// Report duplicate keys per snapshot and cross-set frequency mismatches
    Analyze {
        #[arg(long, default_value = "xdcawk_prod.csv")]
        prod: PathBuf,

        #[arg(long, default_value = "xdcawk_test.csv")]
        test: PathBuf,

        /// plain-text report output
        #[arg(long, default_value = "xdcawk_duplicates.txt")]
        out: PathBuf,
    },

    /// Re-submit diff rows into the test environment
    Replay {
        #[arg(long, default_value = "xdcawk_diff.csv")]
        diff: PathBuf,

        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        #[arg(long, default_value = "api_config.json")]
        config: PathBuf,
    },

    /// Full run: fetch both environments, compare, check counts, then a follow-up menu
    Workflow {
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        #[arg(long, default_value = "api_config.json")]
        config: PathBuf,

        #[arg(long, default_value = "xdcawk_prod.csv")]
        prod: PathBuf,

        #[arg(long, default_value = "xdcawk_test.csv")]
        test: PathBuf,

        #[arg(long, default_value = "xdcawk_diff.csv")]
        diff: PathBuf,

        #[arg(long, default_value = "xdcawk_duplicates.txt")]
        report: PathBuf,

        /// plain-text run log
        #[arg(long, default_value = "dcawk_run.log")]
        log: PathBuf,
    },
}
