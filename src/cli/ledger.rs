use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::settings::get_data_dir;

pub fn run(month: Option<&str>) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("hearth.db"))?;

    let mut sql = String::from(
        "SELECT l.date, f.name, t.name, l.amount, l.memo, l.classification \
         FROM ledger l \
         JOIN accounts f ON l.from_account_id = f.id \
         JOIN accounts t ON l.to_account_id = t.id",
    );
    let mut params: Vec<String> = Vec::new();
    if let Some(m) = month {
        sql.push_str(" WHERE l.date LIKE ?1");
        params.push(format!("{m}%"));
    }
    sql.push_str(" ORDER BY l.date DESC, l.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows: Vec<(String, String, String, f64, String, Option<String>)> = stmt
        .query_map(rusqlite::params_from_iter(&params), |row| {
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
    table.set_header(vec!["Date", "From", "To", "Amount", "Memo", "Classification"]);
    let count = rows.len();
    for (date, from, to, amount, memo, classification) in rows {
        table.add_row(vec![
            Cell::new(date),
            Cell::new(from),
            Cell::new(to),
            Cell::new(money(amount)),
            Cell::new(memo),
            Cell::new(classification.unwrap_or_default()),
        ]);
    }
    println!("Ledger ({count} entries)\n{table}");
    Ok(())
}
