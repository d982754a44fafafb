use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Cell spellings treated as missing when inferring column types
const MISSING_TOKENS: &[&str] = &["", "NA", "NaN", "nan", "null", "None"];

/// Untyped tabular input: headers plus string cells, as read from CSV or JSON
#[derive(Debug, Clone)]
pub struct PlotData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PlotData {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_csv(csv: crate::csv_reader::CsvData) -> Self {
        Self {
            headers: csv.headers,
            rows: csv.rows,
        }
    }

    /// Create PlotData from a JSON Array of Objects. Headers are the union of
    /// keys in order of first appearance.
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        if array.is_empty() {
            return Err(anyhow!("Input data array is empty"));
        }

        let mut headers: Vec<String> = Vec::new();
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;
            for key in obj.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(array.len());
        for item in array {
            // Already validated as objects above
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;

            let mut row = Vec::with_capacity(headers.len());
            for header in &headers {
                let cell = match obj.get(header) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(Value::Null) | None => String::new(),
                    _ => return Err(anyhow!("Unsupported value type for field '{}'", header)),
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }
}

/// Inferred primitive type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    Float,
    Int,
    Text,
}

/// Typed cell storage. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Float(Vec<Option<f64>>),
    Int(Vec<Option<i64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float(v) => v.len(),
            ColumnData::Int(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        match self {
            ColumnData::Float(_) => DType::Float,
            ColumnData::Int(_) => DType::Int,
            ColumnData::Text(_) => DType::Text,
        }
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Float(v) => v.get(row).map_or(true, |c| c.is_none()),
            ColumnData::Int(v) => v.get(row).map_or(true, |c| c.is_none()),
            ColumnData::Text(v) => v.get(row).map_or(true, |c| c.is_none()),
        }
    }

    /// Numeric view of a cell; text cells are never numeric
    pub fn numeric(&self, row: usize) -> Option<f64> {
        match self {
            ColumnData::Float(v) => v.get(row).copied().flatten(),
            ColumnData::Int(v) => v.get(row).copied().flatten().map(|i| i as f64),
            ColumnData::Text(_) => None,
        }
    }

    /// Display form of a cell, used for grouping and legends
    pub fn label(&self, row: usize) -> Option<String> {
        match self {
            ColumnData::Float(v) => v.get(row).copied().flatten().map(|f| f.to_string()),
            ColumnData::Int(v) => v.get(row).copied().flatten().map(|i| i.to_string()),
            ColumnData::Text(v) => v.get(row).cloned().flatten(),
        }
    }

    fn take(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Float(v) => ColumnData::Float(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Int(v) => ColumnData::Int(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Text(v) => ColumnData::Text(rows.iter().map(|&r| v[r].clone()).collect()),
        }
    }

    fn non_missing(&self) -> usize {
        (0..self.len()).filter(|&i| !self.is_missing(i)).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Infer the column type from raw string cells
    pub fn infer(name: impl Into<String>, cells: &[&str]) -> Self {
        let present: Vec<&str> = cells.iter().copied().filter(|c| !is_missing_token(c)).collect();

        let data = if !present.is_empty() && present.iter().all(|c| c.parse::<i64>().is_ok()) {
            ColumnData::Int(cells.iter().map(|c| c.parse::<i64>().ok()).collect())
        } else if !present.is_empty() && present.iter().all(|c| c.parse::<f64>().is_ok()) {
            ColumnData::Float(
                cells
                    .iter()
                    .map(|c| c.parse::<f64>().ok().filter(|f| !f.is_nan()))
                    .collect(),
            )
        } else {
            ColumnData::Text(
                cells
                    .iter()
                    .map(|c| if is_missing_token(c) { None } else { Some(c.to_string()) })
                    .collect(),
            )
        };

        Self::new(name, data)
    }

    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self.data, ColumnData::Text(_))
    }

    pub fn numeric_values(&self) -> Vec<Option<f64>> {
        (0..self.len()).map(|i| self.data.numeric(i)).collect()
    }

    pub fn min(&self) -> Option<f64> {
        self.numeric_values().into_iter().flatten().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.numeric_values().into_iter().flatten().reduce(f64::max)
    }

    /// Sorted distinct non-missing values, in display form. Numeric columns
    /// sort by value, text columns lexicographically.
    pub fn distinct_sorted(&self) -> Vec<String> {
        match &self.data {
            ColumnData::Text(v) => {
                let set: BTreeSet<&String> = v.iter().flatten().collect();
                set.into_iter().cloned().collect()
            }
            _ => {
                let mut values: Vec<f64> = self.numeric_values().into_iter().flatten().collect();
                values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
                values.dedup();
                let mut labels: Vec<String> = Vec::with_capacity(values.len());
                for v in values {
                    let label = match self.data {
                        ColumnData::Int(_) => (v as i64).to_string(),
                        _ => v.to_string(),
                    };
                    labels.push(label);
                }
                labels
            }
        }
    }
}

fn is_missing_token(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell.trim())
}

/// In-memory columnar table. All columns have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
            anyhow::bail!(
                "Column '{}' has {} rows, expected {}",
                bad.name,
                bad.len(),
                n_rows
            );
        }
        Ok(Self { columns, n_rows })
    }

    /// Build a typed table from raw input. Columns without a single
    /// non-missing value are dropped.
    pub fn from_plot_data(data: &PlotData) -> Self {
        let mut columns = Vec::with_capacity(data.headers.len());
        for (idx, header) in data.headers.iter().enumerate() {
            let cells: Vec<&str> = data
                .rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect();
            let column = Column::infer(header.clone(), &cells);
            if column.data.non_missing() == 0 {
                log::debug!("Dropping empty column '{}'", header);
                continue;
            }
            columns.push(column);
        }

        Self {
            columns,
            n_rows: data.rows.len(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look a column up by exact name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn dtype(&self, name: &str) -> Option<DType> {
        self.column(name).map(Column::dtype)
    }

    pub fn columns_of_type(&self, dtype: DType) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.dtype() == dtype)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Numeric values of a column; `None` when the column is absent or text
    pub fn numeric(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.column(name)
            .filter(|c| c.is_numeric())
            .map(Column::numeric_values)
    }

    /// New table holding `rows` (in the given order), reindexed 0..N-1
    pub fn take(&self, rows: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.take(rows)))
                .collect(),
            n_rows: rows.len(),
        }
    }

    /// Insert a column, replacing any existing column with the same name
    pub fn with_column(mut self, column: Column) -> Result<Table> {
        if !self.columns.is_empty() && column.len() != self.n_rows {
            anyhow::bail!(
                "Column '{}' has {} rows, table has {}",
                column.name,
                column.len(),
                self.n_rows
            );
        }
        if self.columns.is_empty() {
            self.n_rows = column.len();
        }
        match self.columns.iter().position(|c| c.name == column.name) {
            Some(idx) => self.columns[idx] = column,
            None => self.columns.push(column),
        }
        Ok(self)
    }

    /// Drop every row with a missing value in `anchor`
    pub fn drop_rows_missing(&self, anchor: &str) -> Result<Table> {
        let column = self
            .column(anchor)
            .ok_or_else(|| anyhow!("Anchor column '{}' not found", anchor))?;
        let keep: Vec<usize> = (0..self.n_rows).filter(|&r| !column.data.is_missing(r)).collect();
        Ok(self.take(&keep))
    }

    /// Add a 0/1 encoding of `column` (1 where the value equals `positive`)
    pub fn add_binary_encoding(&self, column: &str, positive: &str, name: &str) -> Result<Table> {
        let source = self
            .column(column)
            .ok_or_else(|| anyhow!("Column '{}' not found", column))?;
        let encoded: Vec<Option<i64>> = (0..self.n_rows)
            .map(|r| source.data.label(r).map(|v| i64::from(v == positive)))
            .collect();
        self.clone()
            .with_column(Column::new(name, ColumnData::Int(encoded)))
    }

    /// Reshape wide to long: one `(variable, value)` entry per row and
    /// selected variable. Row order is preserved within each variable.
    /// Text columns and unknown names contribute missing values.
    pub fn melt(&self, value_vars: &[String]) -> LongTable {
        let mut long = LongTable::default();
        for var in value_vars {
            let values = self.numeric(var).unwrap_or_else(|| vec![None; self.n_rows]);
            for v in values {
                long.variable.push(var.clone());
                long.value.push(v);
            }
        }
        long
    }
}

/// Long ("melted") layout: parallel `variable` / `value` vectors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LongTable {
    pub variable: Vec<String>,
    pub value: Vec<Option<f64>>,
}

impl LongTable {
    pub fn len(&self) -> usize {
        self.variable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variable.is_empty()
    }

    /// Values of one variable, in original row order
    pub fn values_of(&self, variable: &str) -> Vec<Option<f64>> {
        self.variable
            .iter()
            .zip(self.value.iter())
            .filter(|(var, _)| var.as_str() == variable)
            .map(|(_, v)| *v)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_data() -> PlotData {
        PlotData::new(
            vec!["a".into(), "n".into(), "g".into(), "empty".into()],
            vec![
                vec!["1.5".into(), "3".into(), "x".into(), "".into()],
                vec!["".into(), "1".into(), "y".into(), "".into()],
                vec!["2.5".into(), "2".into(), "x".into(), "NA".into()],
            ],
        )
    }

    #[test]
    fn test_infer_types_and_drop_empty() {
        let table = Table::from_plot_data(&make_data());
        assert_eq!(table.column_names(), vec!["a", "n", "g"]);
        assert_eq!(table.dtype("a"), Some(DType::Float));
        assert_eq!(table.dtype("n"), Some(DType::Int));
        assert_eq!(table.dtype("g"), Some(DType::Text));
        assert_eq!(table.n_rows(), 3);
    }

    #[test]
    fn test_column_lookup_is_exact() {
        let table = Table::from_plot_data(&make_data());
        assert!(table.column("g").is_some());
        assert!(table.column("G").is_none());
        assert!(table.numeric("A").is_none());
    }

    #[test]
    fn test_missing_cells() {
        let table = Table::from_plot_data(&make_data());
        assert_eq!(table.numeric("a").unwrap(), vec![Some(1.5), None, Some(2.5)]);
        assert!(table.numeric("g").is_none());
    }

    #[test]
    fn test_distinct_sorted() {
        let table = Table::from_plot_data(&make_data());
        assert_eq!(table.column("g").unwrap().distinct_sorted(), vec!["x", "y"]);
        assert_eq!(table.column("n").unwrap().distinct_sorted(), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_min_max() {
        let table = Table::from_plot_data(&make_data());
        let col = table.column("a").unwrap();
        assert_eq!(col.min(), Some(1.5));
        assert_eq!(col.max(), Some(2.5));
    }

    #[test]
    fn test_take_reindexes() {
        let table = Table::from_plot_data(&make_data());
        let taken = table.take(&[2, 0]);
        assert_eq!(taken.n_rows(), 2);
        assert_eq!(taken.numeric("n").unwrap(), vec![Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_drop_rows_missing_anchor() {
        let table = Table::from_plot_data(&make_data());
        let anchored = table.drop_rows_missing("a").unwrap();
        assert_eq!(anchored.n_rows(), 2);
        assert!(table.drop_rows_missing("nope").is_err());
    }

    #[test]
    fn test_binary_encoding() {
        let table = Table::from_plot_data(&make_data());
        let encoded = table.add_binary_encoding("g", "x", "g_bin").unwrap();
        assert_eq!(
            encoded.numeric("g_bin").unwrap(),
            vec![Some(1.0), Some(0.0), Some(1.0)]
        );
    }

    #[test]
    fn test_with_column_replaces() {
        let table = Table::from_plot_data(&make_data());
        let replaced = table
            .with_column(Column::new("g", ColumnData::Int(vec![Some(1), Some(2), Some(3)])))
            .unwrap();
        assert_eq!(replaced.n_cols(), 3);
        assert_eq!(replaced.dtype("g"), Some(DType::Int));
    }

    #[test]
    fn test_with_column_length_mismatch() {
        let table = Table::from_plot_data(&make_data());
        let res = table.with_column(Column::new("z", ColumnData::Int(vec![Some(1)])));
        assert!(res.is_err());
    }

    #[test]
    fn test_melt() {
        let table = Table::from_plot_data(&make_data());
        let long = table.melt(&["a".to_string(), "n".to_string()]);
        assert_eq!(long.len(), 6);
        assert_eq!(long.values_of("n"), vec![Some(3.0), Some(1.0), Some(2.0)]);
        assert_eq!(long.values_of("a"), vec![Some(1.5), None, Some(2.5)]);
    }

    #[test]
    fn test_from_json() {
        let value: Value = serde_json::json!([
            {"a": 1, "b": "x"},
            {"a": 2.5, "c": null}
        ]);
        let data = PlotData::from_json(&value).unwrap();
        assert_eq!(data.headers, vec!["a", "b", "c"]);
        assert_eq!(data.rows[1], vec!["2.5", "", ""]);
        let table = Table::from_plot_data(&data);
        assert_eq!(table.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(PlotData::from_json(&serde_json::json!({"a": 1})).is_err());
    }
}
