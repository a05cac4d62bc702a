use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join("hearth.db");

    println!("{}", "hearth status".bold());
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let conn = get_connection(&db_path)?;

        let accounts: i64 = conn.query_row("SELECT count(*) FROM accounts", [], |r| r.get(0))?;
        let unknown: i64 = conn.query_row(
            "SELECT count(*) FROM accounts WHERE account_type = 'unknown'",
            [],
            |r| r.get(0),
        )?;
        let entries: i64 = conn.query_row("SELECT count(*) FROM ledger", [], |r| r.get(0))?;
        let imports: i64 = conn.query_row("SELECT count(*) FROM imports", [], |r| r.get(0))?;

        println!();
        println!("Accounts:       {accounts} ({unknown} unclassified)");
        println!("Ledger entries: {entries}");
        println!("Imports:        {imports}");

        let last: Option<(String, String)> = conn
            .query_row(
                "SELECT filename, import_date FROM imports ORDER BY id DESC LIMIT 1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .ok();
        if let Some((filename, date)) = last {
            println!("Last import:    {filename} ({date})");
        }
    } else {
        println!();
        println!("Database not found. Run `hearth init` to set up.");
    }

    Ok(())
}
