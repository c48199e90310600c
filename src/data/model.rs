use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Value – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Frequency tables and duplicate detection key on `Value`, so it must be
/// `Ord` and `Hash`.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

// -- Manual Eq/Ord so we can put Value in BTreeMap / HashMap --

/// `-0.0` compares and hashes as `0.0`.
fn canonical(f: f64) -> f64 {
    if f == 0.0 { 0.0 } else { f }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => canonical(*a).total_cmp(&canonical(*b)),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => canonical(*f).to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Null => write!(f, "NaN"),
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – inferred type of a column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
}

impl ColumnKind {
    /// Integer and floating-point columns make up the numeric subset.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    /// The Pandas dtype name shown in the column listing.
    pub fn dtype_label(self) -> &'static str {
        match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Boolean => "bool",
            ColumnKind::Text => "object",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dtype_label())
    }
}

// ---------------------------------------------------------------------------
// Column – one named, typed, nullable sequence of cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
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

    pub fn kind(&self) -> ColumnKind {
        match &self.data {
            ColumnData::Integer(_) => ColumnKind::Integer,
            ColumnData::Float(_) => ColumnKind::Float,
            ColumnData::Boolean(_) => ColumnKind::Boolean,
            ColumnData::Text(_) => ColumnKind::Text,
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Integer(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    /// The cell at `row` as a dynamically-typed [`Value`].
    pub fn value(&self, row: usize) -> Value {
        match &self.data {
            ColumnData::Integer(v) => v[row].map_or(Value::Null, Value::Integer),
            ColumnData::Float(v) => v[row].map_or(Value::Null, Value::Float),
            ColumnData::Boolean(v) => v[row].map_or(Value::Null, Value::Bool),
            ColumnData::Text(v) => v[row]
                .as_ref()
                .map_or(Value::Null, |s| Value::Text(s.clone())),
        }
    }

    pub fn null_count(&self) -> usize {
        match &self.data {
            ColumnData::Integer(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Float(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Boolean(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Text(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    /// Cells as `f64`, `None` for nulls. Returns `None` for non-numeric columns.
    pub fn numeric_cells(&self) -> Option<Vec<Option<f64>>> {
        match &self.data {
            ColumnData::Integer(v) => Some(v.iter().map(|c| c.map(|i| i as f64)).collect()),
            ColumnData::Float(v) => Some(v.clone()),
            ColumnData::Boolean(_) | ColumnData::Text(_) => None,
        }
    }

    /// Non-null numeric values in row order. Empty for non-numeric columns.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.numeric_cells()
            .map(|cells| cells.into_iter().flatten().collect())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table. Column names are unique; all columns share the
/// same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Display name of the source (usually the file name).
    pub source: String,
    pub columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Build a dataset from columns of equal length.
    pub fn new(source: impl Into<String>, columns: Vec<Column>) -> Self {
        let row_count = columns.first().map_or(0, Column::len);
        debug_assert!(columns.iter().all(|c| c.len() == row_count));
        Dataset {
            source: source.into(),
            columns,
            row_count,
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`, like `DataFrame.shape`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count, self.columns.len())
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns whose inferred type is integer or floating-point.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.kind().is_numeric())
    }

    /// One full row as dynamically-typed values.
    pub fn row(&self, row: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.value(row)).collect()
    }
}
