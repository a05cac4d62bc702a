use clap::Parser;

use hearth::cli::{self, AccountsCommands, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add {
                name,
                account_type,
                match_string,
            } => cli::accounts::add(&name, &account_type, match_string.as_deref()),
            AccountsCommands::List => cli::accounts::list(),
        },
        Commands::Import {
            file,
            format,
            skip_bad_rows,
        } => cli::import::run(&file, format.as_deref(), skip_bad_rows),
        Commands::Ledger { month } => cli::ledger::run(month.as_deref()),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
