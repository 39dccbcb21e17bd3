pub mod clear;
pub mod context;
pub mod init;
pub mod predict;
pub mod rules;
pub mod status;
pub mod teach;

use clap::{Parser, Subcommand};

use finmon::context::ChatKind;
use finmon::error::Result;
use finmon::predictor::MatchPolicy;
use finmon::settings::{load_settings, Backend, Settings};
use finmon::store::{self, RuleStore};

/// Loads settings and opens the configured rule store.
pub(crate) fn open_store() -> Result<(Settings, Box<dyn RuleStore>)> {
    let settings = load_settings();
    let store = store::open(&settings)?;
    Ok((settings, store))
}

#[derive(Parser)]
#[command(name = "finmon", about = "Teach FinMon your spending categories.")]
pub struct Cli {
    /// Show debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and storage backend.
    Init {
        /// Path for FinMon data (default: ~/Documents/finmon)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Where learned rules are stored
        #[arg(long, value_enum)]
        backend: Option<Backend>,
    },
    /// Teach the correct category for a transaction description.
    Teach {
        /// Transaction description, e.g. 'SQ *STARBUCKS'
        description: String,
        /// Correct category
        #[arg(long)]
        category: String,
        /// Why this category is right
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Predict a category from learned rules.
    Predict {
        /// Transaction description
        description: String,
        /// Show which rule matched
        #[arg(long)]
        explain: bool,
        /// Tie-break between matching rules (default: from settings)
        #[arg(long, value_enum)]
        policy: Option<MatchPolicy>,
    },
    /// Inspect and move learned rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Forget every learned rule.
    Clear,
    /// Print the learned-rule context sent to the chat assistant.
    Context {
        /// Wrap the context in a full chat request for this message
        #[arg(long)]
        message: Option<String>,
        /// Chat persona the request is addressed to
        #[arg(long, value_enum, default_value = "professor")]
        kind: ChatKind,
        /// Only include the N most recently taught rules
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show settings and rule count.
    Status,
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// List learned rules, oldest first.
    List,
    /// Write learned rules as JSON.
    Export {
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<String>,
    },
    /// Teach every rule from an exported JSON file.
    Import {
        /// Path to a JSON export
        file: String,
    },
}
