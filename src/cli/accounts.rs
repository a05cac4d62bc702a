use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::{HearthError, Result};
use crate::matcher::insert_account;
use crate::models::AccountType;
use crate::settings::get_data_dir;

pub fn add(name: &str, account_type: &str, match_string: Option<&str>) -> Result<()> {
    let account_type = AccountType::parse(account_type)
        .ok_or_else(|| HearthError::InvalidAccount(format!("unknown account type: {account_type}")))?;
    let conn = get_connection(&get_data_dir().join("hearth.db"))?;
    insert_account(&conn, name, account_type, match_string.unwrap_or(name))?;
    println!("Added account: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("hearth.db"))?;
    let mut stmt = conn.prepare(
        "SELECT id, name, account_type, match_string, active, last_transaction_at \
         FROM accounts ORDER BY id",
    )?;
    let rows: Vec<(i64, String, String, String, bool, Option<String>)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Type", "Match String", "Active", "Last Activity"]);
    for (id, name, acct_type, match_string, active, last) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(name),
            Cell::new(acct_type),
            Cell::new(match_string),
            Cell::new(if active { "yes" } else { "no" }),
            Cell::new(last.unwrap_or_default()),
        ]);
    }
    println!("Accounts\n{table}");
    Ok(())
}
