use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Column, ColumnData, Dataset, Value};

/// Cell spellings that Pandas' `read_csv` treats as missing by default.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];
/// Failure to turn a byte stream into a [`Dataset`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no columns to parse from input")]
    NoColumns,
    #[error("line {line}: expected {expected} fields, saw {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("invalid delimited text: {0}")]
    Csv(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma-separated, header row first
/// * `.tsv`          – tab-separated, header row first
/// * `.json`         – `[{ "col": value, ... }, ...]`
/// * `.parquet`      – flat scalar columns
pub fn load_file(path: &Path) -> Result<Dataset> {
    let source = display_name(path);
    match extension(path).as_str() {
        "parquet" | "pq" => load_parquet(path, &source),
        _ => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("reading {}", path.display()))?;
            load_bytes(&source, &bytes)
        }
    }
}

/// Load a dataset from an in-memory buffer (e.g. a drag-and-dropped file).
/// `name` is used both for format dispatch and as the dataset's source name.
pub fn load_bytes(name: &str, bytes: &[u8]) -> Result<Dataset> {
    match extension(Path::new(name)).as_str() {
        "csv" | "txt" => Ok(parse_csv(name, bytes, b',')?),
        "tsv" => Ok(parse_csv(name, bytes, b'\t')?),
        "json" => load_json(name, bytes),
        "parquet" | "pq" => bail!("Parquet files must be opened from disk"),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse delimited text with a header row into a [`Dataset`].
///
/// Short records are padded with nulls; long records are rejected.
/// Each column's type is inferred from its non-null cells.
pub fn parse_csv(source: &str, bytes: &[u8], delimiter: u8) -> Result<Dataset, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(ParseError::NoColumns);
    }
    let names = unique_names(headers);
    let width = names.len();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
    for result in reader.records() {
        let record = result?;
        if record.len() > width {
            return Err(ParseError::TooManyFields {
                line: record.position().map_or(0, |p| p.line()),
                expected: width,
                found: record.len(),
            });
        }
        for (col_idx, column) in cells.iter_mut().enumerate() {
            let cell = record.get(col_idx).filter(|raw| !is_na(raw));
            column.push(cell.map(str::to_string));
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, column)| infer_column(name, column))
        .collect();
    Ok(Dataset::new(source, columns))
}

fn is_na(raw: &str) -> bool {
    NA_TOKENS.contains(&raw.trim())
}

/// Blank headers become `Unnamed: <i>`; repeats get `.1`, `.2`, ... suffixes.
fn unique_names(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    headers
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            let base = if raw.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                raw
            };
            let mut name = base.clone();
            let mut suffix = 1;
            while seen.contains(&name) {
                name = format!("{base}.{suffix}");
                suffix += 1;
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

/// `f64::from_str` also accepts spellings like `NAN` or `-nan`; those are
/// text unless listed in [`NA_TOKENS`].
fn parse_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Pick the narrowest type every non-null cell parses as:
/// integer, then float, then boolean, falling back to text.
fn infer_column(name: String, cells: Vec<Option<String>>) -> Column {
    if cells.is_empty() {
        return Column::new(name, ColumnData::Text(cells));
    }
    if cells.iter().all(Option::is_none) {
        return Column::new(name, ColumnData::Float(vec![None; cells.len()]));
    }

    fn trimmed(c: &Option<String>) -> Option<&str> {
        c.as_deref().map(str::trim)
    }

    if cells.iter().flatten().all(|s| s.trim().parse::<i64>().is_ok()) {
        let data = cells
            .iter()
            .map(|c| trimmed(c).and_then(|s| s.parse().ok()))
            .collect();
        return Column::new(name, ColumnData::Integer(data));
    }
    if cells.iter().flatten().all(|s| parse_float(s.trim()).is_some()) {
        let data = cells.iter().map(|c| trimmed(c).and_then(parse_float)).collect();
        return Column::new(name, ColumnData::Float(data));
    }
    if cells.iter().flatten().all(|s| parse_bool(s.trim()).is_some()) {
        let data = cells.iter().map(|c| trimmed(c).and_then(parse_bool)).collect();
        return Column::new(name, ColumnData::Boolean(data));
    }
    Column::new(name, ColumnData::Text(cells))
}

/// Build a typed column from already-typed cells (JSON, Parquet).
/// Integers mixed with floats widen to float; any other mix becomes text.
fn column_from_values(name: String, values: Vec<Value>) -> Column {
    let present = || values.iter().filter(|v| !v.is_null());

    let data = if present().all(|v| matches!(v, Value::Integer(_))) && present().next().is_some()
    {
        ColumnData::Integer(
            values
                .iter()
                .map(|v| match v {
                    Value::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect(),
        )
    } else if present().all(|v| matches!(v, Value::Integer(_) | Value::Float(_))) {
        ColumnData::Float(
            values
                .iter()
                .map(|v| match v {
                    Value::Integer(i) => Some(*i as f64),
                    Value::Float(f) => Some(*f),
                    _ => None,
                })
                .collect(),
        )
    } else if present().all(|v| matches!(v, Value::Bool(_))) {
        ColumnData::Boolean(
            values
                .iter()
                .map(|v| match v {
                    Value::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect(),
        )
    } else {
        ColumnData::Text(
            values
                .iter()
                .map(|v| (!v.is_null()).then(|| v.to_string()))
                .collect(),
        )
    };
    Column::new(name, data)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "age": 31, "city": "Lyon", "score": 0.82 },
///   { "age": null, "city": "Oslo", "score": 0.41 }
/// ]
/// ```
///
/// A key missing from a record is a null in that row.
fn load_json(source: &str, bytes: &[u8]) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }
    if names.is_empty() {
        bail!(ParseError::NoColumns);
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let values = records
                .iter()
                .map(|rec| rec.get(&name).map_or(Value::Null, json_to_value))
                .collect();
            column_from_values(name, values)
        })
        .collect();

    Ok(Dataset::new(source, columns))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Integer and floating-point columns of
/// any width become `Integer` / `Float`; every other Arrow type (dates,
/// timestamps, dictionaries, decimals, ...) is formatted cell by cell.
fn load_parquet(path: &Path, source: &str) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut values: Vec<Vec<Value>> = vec![Vec::new(); names.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, column) in values.iter_mut().enumerate() {
            column.extend(array_values(batch.column(col_idx))?);
        }
    }

    let columns = names
        .into_iter()
        .zip(values)
        .map(|(name, vals)| column_from_values(name, vals))
        .collect();
    Ok(Dataset::new(source, columns))
}

/// Convert one Arrow column chunk into cells.
fn array_values(array: &ArrayRef) -> Result<Vec<Value>> {
    let data_type = array.data_type();
    if data_type.is_integer() {
        let widened = cast(array, &DataType::Int64)
            .with_context(|| format!("widening {data_type} to Int64"))?;
        return Ok(widened
            .as_primitive::<Int64Type>()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Integer))
            .collect());
    }
    if data_type.is_floating() {
        let widened = cast(array, &DataType::Float64)
            .with_context(|| format!("widening {data_type} to Float64"))?;
        return Ok(widened
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| v.map_or(Value::Null, float_value))
            .collect());
    }
    if let Some(bools) = array.as_boolean_opt() {
        return Ok(bools
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Bool))
            .collect());
    }

    let options = FormatOptions::default();
    let formatter = ArrayFormatter::try_new(array.as_ref(), &options)
        .with_context(|| format!("formatting {data_type} column"))?;
    Ok((0..array.len())
        .map(|row| {
            if array.is_null(row) {
                Value::Null
            } else {
                Value::Text(formatter.value(row).to_string())
            }
        })
        .collect())
}

/// Pandas writes missing floats as NaN rather than Parquet nulls.
fn float_value(v: f64) -> Value {
    if v.is_nan() { Value::Null } else { Value::Float(v) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnKind;

    fn parse(text: &str) -> Dataset {
        parse_csv("test.csv", text.as_bytes(), b',').expect("valid csv")
    }

    #[test]
    fn infers_column_kinds() {
        let ds = parse("id,score,flag,city\n1,1.5,true,Lyon\n2,2,False,Oslo\n");
        let kinds: Vec<ColumnKind> = ds.columns.iter().map(Column::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnKind::Integer,
                ColumnKind::Float,
                ColumnKind::Boolean,
                ColumnKind::Text
            ]
        );
        assert_eq!(ds.shape(), (2, 4));
    }

    #[test]
    fn na_tokens_become_nulls() {
        let ds = parse("a,b\n1,NA\n,x\nNaN,null\n4,y\n");
        let a = ds.column("a").expect("column a");
        assert_eq!(a.kind(), ColumnKind::Integer);
        assert_eq!(a.null_count(), 2);
        let b = ds.column("b").expect("column b");
        assert_eq!(b.kind(), ColumnKind::Text);
        assert_eq!(b.null_count(), 2);
    }

    #[test]
    fn all_null_column_is_float() {
        let ds = parse("a,b\n1,\n2,\n");
        assert_eq!(ds.column("b").map(Column::kind), Some(ColumnKind::Float));
    }

    #[test]
    fn header_only_yields_text_columns() {
        let ds = parse("a,b\n");
        assert_eq!(ds.shape(), (0, 2));
        assert!(ds.columns.iter().all(|c| c.kind() == ColumnKind::Text));
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let ds = parse("age,city,age,\n1,a,2,3\n");
        assert_eq!(ds.column_names(), vec!["age", "city", "age.1", "Unnamed: 3"]);
    }

    #[test]
    fn short_rows_are_padded() {
        let ds = parse("a,b,c\n1,2,3\n4\n");
        assert_eq!(ds.shape(), (2, 3));
        assert_eq!(ds.column("c").map(Column::null_count), Some(1));
    }

    #[test]
    fn long_rows_are_rejected() {
        let err = parse_csv("bad.csv", b"a,b\n1,2\n3,4,5\n", b',').unwrap_err();
        match err {
            ParseError::TooManyFields {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_input_has_no_columns() {
        assert!(matches!(
            parse_csv("empty.csv", b"", b','),
            Err(ParseError::NoColumns)
        ));
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let err = parse_csv("bin.csv", b"a,b\n\xff\xfe,1\n", b',').unwrap_err();
        assert!(matches!(err, ParseError::Csv(_)));
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let ds = load_bytes("data.tsv", b"x\ty\n1\t2\n").expect("valid tsv");
        assert_eq!(ds.shape(), (1, 2));
        assert_eq!(ds.source, "data.tsv");
    }

    #[test]
    fn json_records_are_loaded() {
        let json = br#"[{"n": 1, "f": 1.5, "s": "a"}, {"n": 2, "f": 2, "s": null}]"#;
        let ds = load_bytes("rows.json", json).expect("valid json");
        assert_eq!(ds.shape(), (2, 3));
        assert_eq!(ds.column("n").map(Column::kind), Some(ColumnKind::Integer));
        assert_eq!(ds.column("f").map(Column::kind), Some(ColumnKind::Float));
        assert_eq!(ds.column("s").map(Column::null_count), Some(1));
    }

    #[test]
    fn parquet_columns_keep_their_values() {
        use arrow::array::{Date32Array, Float32Array, Int16Array, StringArray, UInt8Array};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;
        use std::sync::Arc;

        let schema = Arc::new(Schema::new(vec![
            Field::new("qty", DataType::Int16, false),
            Field::new("rank", DataType::UInt8, true),
            Field::new("price", DataType::Float32, true),
            Field::new("day", DataType::Date32, false),
            Field::new("city", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int16Array::from(vec![1, 2, 3])),
                Arc::new(UInt8Array::from(vec![Some(7), None, Some(9)])),
                Arc::new(Float32Array::from(vec![Some(1.5), Some(f32::NAN), None])),
                Arc::new(Date32Array::from(vec![19000, 19001, 19002])),
                Arc::new(StringArray::from(vec![Some("Lyon"), None, Some("Oslo")])),
            ],
        )
        .unwrap();

        let path = std::env::temp_dir()
            .join(format!("rusty_eda_loader_{}.parquet", std::process::id()));
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).expect("valid parquet");
        let _ = std::fs::remove_file(&path);

        assert_eq!(ds.shape(), (3, 5));
        let qty = ds.column("qty").unwrap();
        assert_eq!(qty.kind(), ColumnKind::Integer);
        assert_eq!(qty.value(2), Value::Integer(3));

        let rank = ds.column("rank").unwrap();
        assert_eq!(rank.kind(), ColumnKind::Integer);
        assert_eq!(rank.null_count(), 1);

        let price = ds.column("price").unwrap();
        assert_eq!(price.kind(), ColumnKind::Float);
        assert_eq!(price.value(0), Value::Float(1.5));
        assert_eq!(price.null_count(), 2);

        let day = ds.column("day").unwrap();
        assert_eq!(day.kind(), ColumnKind::Text);
        assert_eq!(day.value(0), Value::Text("2022-01-08".into()));

        assert_eq!(ds.column("city").map(Column::null_count), Some(1));
        assert_eq!(crate::data::profile::count_duplicate_rows(&ds), 0);
    }

    #[test]
    fn nan_spellings_are_missing_or_text() {
        let ds = parse("v,w\n1,1\n-nan,2\n3,#N/A N/A\n1.#QNAN,4\n");
        let v = ds.column("v").unwrap();
        assert_eq!(v.kind(), ColumnKind::Integer);
        assert_eq!(v.null_count(), 2);
        assert_eq!(ds.column("w").map(Column::null_count), Some(1));

        // Not a pandas NA token, so the column cannot be numeric.
        let ds = parse("v\n1\nNAN\n3\n");
        let v = ds.column("v").unwrap();
        assert_eq!(v.kind(), ColumnKind::Text);
        assert_eq!(v.null_count(), 0);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_bytes("data.xlsx", b"").unwrap_err();
        assert!(err.to_string().contains("xlsx"));
    }
}
