use crate::error::{HearthError, Result};
use crate::format::ColumnLayout;
use crate::models::RawRow;

pub const FIXED_COLUMNS: &[&str] = &["Post Date", "Amount", "Description"];

/// A fully read statement: the column names in file order plus every data
/// row. Rows keep their values in file-column order so the identity hash can
/// be computed positionally.
#[derive(Debug)]
pub struct Statement {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl Statement {
    pub fn field<'a>(&self, row: &'a RawRow, name: &str) -> Option<&'a str> {
        let idx = self.columns.iter().position(|c| c == name)?;
        row.values.get(idx).map(|v| v.as_str())
    }
}

/// Parse decoded statement text into rows under the given layout. A leading
/// byte-order mark is stripped. Rows whose field count disagrees with the
/// layout reject the whole file as malformed.
pub fn read_statement(content: &str, layout: ColumnLayout) -> Result<Statement> {
    let content = content.trim_start_matches('\u{feff}');
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut columns: Vec<String> = match layout {
        ColumnLayout::Headered => Vec::new(),
        ColumnLayout::FixedThreeColumn => FIXED_COLUMNS.iter().map(|c| c.to_string()).collect(),
    };
    let mut rows = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| HearthError::MalformedInput(e.to_string()))?;
        let values: Vec<String> = record.iter().map(|f| f.to_string()).collect();

        if layout == ColumnLayout::Headered && columns.is_empty() {
            columns = values;
            continue;
        }
        if values.len() != columns.len() {
            return Err(HearthError::MalformedInput(format!(
                "row {} has {} fields, expected {}",
                i + 1,
                values.len(),
                columns.len()
            )));
        }
        rows.push(RawRow { values });
    }

    if columns.is_empty() {
        return Err(HearthError::MalformedInput("empty statement".to_string()));
    }
    Ok(Statement { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headered_statement() {
        let content = "Status,Description,Debit,Credit,Post Date\n\
                       ,HILLTOP MARKET,18.60,,4/9/2025\n\
                       Pending,AMAZON,5.00,,4/10/2025\n";
        let stmt = read_statement(content, ColumnLayout::Headered).unwrap();
        assert_eq!(stmt.columns.len(), 5);
        assert_eq!(stmt.rows.len(), 2);
        assert_eq!(stmt.field(&stmt.rows[0], "Description"), Some("HILLTOP MARKET"));
        assert_eq!(stmt.field(&stmt.rows[1], "Status"), Some("Pending"));
        assert_eq!(stmt.field(&stmt.rows[0], "Nope"), None);
    }

    #[test]
    fn test_fixed_three_column_statement() {
        let content = "4/9/2025,-45.99,AMAZON MKTPL\n4/10/2025,12.00,REFUND\n";
        let stmt = read_statement(content, ColumnLayout::FixedThreeColumn).unwrap();
        assert_eq!(stmt.rows.len(), 2);
        assert_eq!(stmt.field(&stmt.rows[0], "Post Date"), Some("4/9/2025"));
        assert_eq!(stmt.field(&stmt.rows[0], "Amount"), Some("-45.99"));
        assert_eq!(stmt.field(&stmt.rows[1], "Description"), Some("REFUND"));
    }

    #[test]
    fn test_bom_is_stripped() {
        let content = "\u{feff}Status,Description,Debit,Credit,Post Date\n,X,1.00,,4/9/2025\n";
        let stmt = read_statement(content, ColumnLayout::Headered).unwrap();
        assert_eq!(stmt.columns[0], "Status");
    }

    #[test]
    fn test_inconsistent_column_count_rejected() {
        let content = "Status,Description,Debit\n,X,1.00,extra\n";
        assert!(matches!(
            read_statement(content, ColumnLayout::Headered),
            Err(HearthError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_fixed_layout_rejects_wide_rows() {
        let content = "4/9/2025,-45.99,AMAZON,extra\n";
        assert!(read_statement(content, ColumnLayout::FixedThreeColumn).is_err());
    }

    #[test]
    fn test_empty_headered_file_rejected() {
        assert!(read_statement("", ColumnLayout::Headered).is_err());
    }

    #[test]
    fn test_quoted_fields_with_commas() {
        let content = "4/9/2025,\"1,234.56\",\"SMITH, JONES LLC\"\n";
        let stmt = read_statement(content, ColumnLayout::FixedThreeColumn).unwrap();
        assert_eq!(stmt.field(&stmt.rows[0], "Amount"), Some("1,234.56"));
        assert_eq!(stmt.field(&stmt.rows[0], "Description"), Some("SMITH, JONES LLC"));
    }

    #[test]
    fn test_rows_preserve_file_order() {
        let content = "4/9/2025,-1.00,FIRST\n4/8/2025,-2.00,SECOND\n";
        let stmt = read_statement(content, ColumnLayout::FixedThreeColumn).unwrap();
        assert_eq!(stmt.field(&stmt.rows[0], "Description"), Some("FIRST"));
        assert_eq!(stmt.field(&stmt.rows[1], "Description"), Some("SECOND"));
    }
}
