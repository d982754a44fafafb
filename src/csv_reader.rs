// CSV ingestion for the dashboard table

use anyhow::{Context, Result};
use std::io::{self, Read};
use std::path::Path;

/// Raw CSV contents: one header row plus string cells
#[derive(Debug, Clone)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read CSV data from stdin
pub fn read_csv_from_stdin() -> Result<CsvData> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read stdin")?;
    parse_csv(input.as_bytes())
}

/// Read CSV data from a file on disk
pub fn read_csv_from_path(path: &Path) -> Result<CsvData> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open '{}'", path.display()))?;
    parse_csv(file)
}

/// Parse CSV from any reader. Short rows are padded with empty cells so
/// every row has one cell per header.
pub fn parse_csv<R: Read>(reader: R) -> Result<CsvData> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        anyhow::bail!("CSV input has no header row");
    }

    let mut rows = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to parse CSV record {}", idx + 1))?;
        let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    if rows.is_empty() {
        anyhow::bail!("CSV input must contain at least one data row");
    }

    Ok(CsvData { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let csv = "a,b\n1,2\n3,4\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.headers, vec!["a", "b"]);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[1], vec!["3", "4"]);
    }

    #[test]
    fn test_parse_pads_short_rows() {
        let csv = "a,b,c\n1\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.rows[0], vec!["1", "", ""]);
    }

    #[test]
    fn test_parse_quoted_header_with_spaces() {
        let csv = "\"Red blood Cells\",Platelets\n0.1,0.2\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.headers[0], "Red blood Cells");
    }

    #[test]
    fn test_parse_empty_body() {
        let err = parse_csv("a,b\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("at least one data row"));
    }
}
