use scraper::{ElementRef, Html, Selector};

use crate::ScrapeError;

/// Header names and trimmed cell text of one HTML table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoldingsTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|_| ScrapeError::Selector(css.to_string()))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Extract the first `<table>` of the document.
///
/// Headers are every `<th>` in the table. Data rows are the `<tr>` elements
/// after the first one that contain at least one `<td>`. When headers exist
/// every row must have exactly as many cells.
pub fn extract_first_table(html: &str) -> Result<Option<HoldingsTable>, ScrapeError> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let th_sel = selector("th")?;
    let tr_sel = selector("tr")?;
    let td_sel = selector("td")?;

    let table = match document.select(&table_sel).next() {
        Some(table) => table,
        None => return Ok(None),
    };

    let headers: Vec<String> = table.select(&th_sel).map(cell_text).collect();

    let mut rows = Vec::new();
    for (index, tr) in table.select(&tr_sel).enumerate().skip(1) {
        let cells: Vec<String> = tr.select(&td_sel).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }
        if !headers.is_empty() && cells.len() != headers.len() {
            return Err(ScrapeError::RaggedRow {
                row: index,
                expected: headers.len(),
                found: cells.len(),
            });
        }
        rows.push(cells);
    }

    Ok(Some(HoldingsTable { headers, rows }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <h1>Real-time insider buys</h1>
          <table id="grid">
            <tr><th> Symbol </th><th>Stock</th><th>Value</th></tr>
            <tr><td>  AAPL</td><td><a href="/s/aapl">Apple Inc.</a>  </td><td>$1,200,000</td></tr>
            <tr><td>MSFT</td><td>Microsoft
                Corp.</td><td>$950,000 </td></tr>
            <tr class="spacer"></tr>
            <tr><td>BRK.B</td><td>Berkshire <b>Hathaway</b></td><td>$80,000</td></tr>
          </table>
          <table><tr><th>Other</th></tr><tr><td>ignored</td></tr></table>
        </body></html>
    "#;

    #[test]
    fn test_extracts_first_table() {
        let table = extract_first_table(PAGE).unwrap().unwrap();

        assert_eq!(table.headers, vec!["Symbol", "Stock", "Value"]);
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows.iter().all(|r| r.len() == table.headers.len()));
        assert_eq!(table.rows[0], vec!["AAPL", "Apple Inc.", "$1,200,000"]);
        assert_eq!(table.rows[2], vec!["BRK.B", "Berkshire Hathaway", "$80,000"]);
    }

    #[test]
    fn test_inner_whitespace_is_kept() {
        let table = extract_first_table(PAGE).unwrap().unwrap();
        assert!(table.rows[1][1].starts_with("Microsoft"));
        assert!(table.rows[1][1].ends_with("Corp."));
        assert_eq!(table.rows[1][2], "$950,000");
    }

    #[test]
    fn test_no_table() {
        let result = tokio_test::assert_ok!(extract_first_table("<html><body><p>Maintenance</p></body></html>"));
        assert!(result.is_none());
    }

    #[test]
    fn test_header_only_table() {
        let table = extract_first_table("<table><tr><th>A</th><th>B</th></tr></table>")
            .unwrap()
            .unwrap();
        assert_eq!(table.headers, vec!["A", "B"]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let html = "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td></tr></table>";
        match extract_first_table(html) {
            Err(ScrapeError::RaggedRow { row, expected, found }) => {
                assert_eq!((row, expected, found), (1, 2, 1));
            }
            other => panic!("expected ragged row error, got {:?}", other),
        }
    }
}
