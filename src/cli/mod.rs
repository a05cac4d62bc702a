pub mod accounts;
pub mod import;
pub mod init;
pub mod ledger;
pub mod status;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hearth", about = "Household ledger with bank-statement CSV import.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up hearth: choose a data directory and initialize the database.
    Init {
        /// Path for hearth data (default: ~/Documents/hearth)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Import a bank-statement CSV into the ledger.
    Import {
        /// Path to the exported CSV
        file: String,
        /// Statement format key (umpqua_checking, fnbo_card); detected from
        /// the file when omitted
        #[arg(long)]
        format: Option<String>,
        /// Skip rows that fail to parse instead of aborting the batch
        #[arg(long = "skip-bad-rows")]
        skip_bad_rows: bool,
    },
    /// Show posted ledger entries.
    Ledger {
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
    },
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add a new account.
    Add {
        /// Account name, e.g. 'City Utilities'
        name: String,
        /// Account type: income, bill, household, credit_card, loan, other, unknown
        #[arg(long = "type", default_value = "unknown")]
        account_type: String,
        /// Substring matched against statement descriptions (defaults to the name)
        #[arg(long = "match-string")]
        match_string: Option<String>,
    },
    /// List all accounts.
    List,
}
