use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Cell – a single field of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed table field, inferred from its text.
#[derive(Debug, Clone)]
pub enum Cell {
    Integer(i64),
    Float(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Infer the cell type from a (trimmed) field.
    pub fn infer(s: &str) -> Self {
        if s.is_empty() {
            return Cell::Empty;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return Cell::Float(f);
        }
        Cell::Text(s.to_string())
    }

    /// Numeric view of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Cell::Text(_))
    }

    /// The field as written back to a file. Floats keep a fractional part or
    /// exponent so they read back as floats.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Integer(i) => i.to_string(),
            Cell::Float(v) => format!("{v:?}"),
            Cell::Text(s) => s.clone(),
            Cell::Empty => String::new(),
        }
    }
}

// -- Manual Eq/Ord so floats compare by total order --

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        use Cell::*;
        fn discriminant(c: &Cell) -> u8 {
            match c {
                Empty => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
            }
        }
        match (self, other) {
            (Empty, Empty) => Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Integer(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

// ---------------------------------------------------------------------------
// DatasetMeta – curve title and axis labels
// ---------------------------------------------------------------------------

/// Optional labels carried by `# key: value` preamble lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetMeta {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
}

impl DatasetMeta {
    /// Directive keys in the order they are written.
    pub const KEYS: [&'static str; 3] = ["title", "x_label", "y_label"];

    /// Set a directive by key; returns `false` for unknown keys.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        let slot = match key.to_ascii_lowercase().as_str() {
            "title" => &mut self.title,
            "x_label" => &mut self.x_label,
            "y_label" => &mut self.y_label,
            _ => return false,
        };
        *slot = Some(value.to_string());
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "title" => self.title.as_deref(),
            "x_label" => self.x_label.as_deref(),
            "y_label" => self.y_label.as_deref(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the normalized rectangular table
// ---------------------------------------------------------------------------

/// A non-empty rectangular table. Construct via [`Dataset::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
    has_header: bool,
    pub meta: DatasetMeta,
}

impl Dataset {
    /// Build a dataset, enforcing non-emptiness and rectangularity.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>, has_header: bool) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::malformed("table has no columns"));
        }
        if rows.is_empty() {
            return Err(Error::malformed("table has no data rows"));
        }
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
        {
            return Err(Error::malformed(format!(
                "row {} has {} fields, expected {}",
                i + 1,
                row.len(),
                columns.len()
            )));
        }
        Ok(Dataset {
            columns,
            rows,
            has_header,
            meta: DatasetMeta::default(),
        })
    }

    pub fn with_meta(mut self, meta: DatasetMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Column names, positional (`column_N`) when the source had no header.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Indices of columns whose every non-empty cell is numeric.
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.width())
            .filter(|&c| {
                let mut any = false;
                for row in &self.rows {
                    match &row[c] {
                        Cell::Empty => {}
                        Cell::Text(_) => return false,
                        _ => any = true,
                    }
                }
                any
            })
            .collect()
    }

    /// Extract two numeric columns as a plottable series.
    ///
    /// Rows where either cell is empty are skipped; any text cell is an error.
    pub fn xy(&self, x_col: usize, y_col: usize) -> Result<XySeries> {
        for col in [x_col, y_col] {
            if col >= self.width() {
                return Err(Error::malformed(format!(
                    "column {} out of range (table has {} columns)",
                    col + 1,
                    self.width()
                )));
            }
        }

        let mut series = XySeries::default();
        let mut skipped = 0usize;
        for (i, row) in self.rows.iter().enumerate() {
            let (xc, yc) = (&row[x_col], &row[y_col]);
            if matches!(xc, Cell::Empty) || matches!(yc, Cell::Empty) {
                skipped += 1;
                continue;
            }
            let x = numeric(xc, i, &self.columns[x_col])?;
            let y = numeric(yc, i, &self.columns[y_col])?;
            series.x.push(x);
            series.y.push(y);
        }
        if skipped > 0 {
            log::debug!("Skipped {skipped} rows with empty cells");
        }
        if series.is_empty() {
            return Err(Error::malformed(format!(
                "columns '{}' and '{}' have no complete numeric rows",
                self.columns[x_col], self.columns[y_col]
            )));
        }
        Ok(series)
    }
}

fn numeric(cell: &Cell, row: usize, col: &str) -> Result<f64> {
    cell.as_f64().ok_or_else(|| {
        Error::malformed(format!(
            "row {}, column '{col}': '{cell}' is not a number",
            row + 1
        ))
    })
}

// ---------------------------------------------------------------------------
// XySeries – the points handed to the plot and the fitter
// ---------------------------------------------------------------------------

/// Parallel x/y vectors of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XySeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl XySeries {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}
