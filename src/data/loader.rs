use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{SaleRecord, SalesTable};
use super::parse::{parse_amount, parse_calendar_date, parse_timestamp};
use crate::config::ColumnMapping;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load and concatenate sources using the default column names.
pub fn load<P: AsRef<Path>>(sources: &[P]) -> Result<SalesTable, LoadError> {
    load_with(sources, &ColumnMapping::default())
}

/// Load and concatenate sources in the given order.
///
/// Records keep source order, then row order within each source. Any
/// failing source aborts the whole load.
pub fn load_with<P: AsRef<Path>>(
    sources: &[P],
    columns: &ColumnMapping,
) -> Result<SalesTable, LoadError> {
    if sources.is_empty() {
        return Err(LoadError::NoSources);
    }

    let mut records = Vec::new();
    for source in sources {
        let path = source.as_ref();
        let rows = load_file(path, columns)?;

        let unparsed = rows.iter().filter(|r| r.timestamp.is_none()).count();
        log::info!("loaded {} records from {}", rows.len(), path.display());
        if unparsed > 0 {
            log::warn!(
                "{}: {unparsed} records have an unparsable '{}' value \
                 and will not match date filters",
                path.display(),
                columns.timestamp
            );
        }
        records.extend(rows);
    }

    Ok(SalesTable::from_records(records))
}

/// Load the records of a single file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one transaction per line
/// * `.json`    – `[{ "datetime": "...", "coffee_name": "...", ... }, ...]`
/// * `.parquet` – any column types arrow can cast to text (timestamps, product)
///   and to float (amount)
pub fn load_file(path: &Path, columns: &ColumnMapping) -> Result<Vec<SaleRecord>, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path, columns),
        "json" => load_json(path, columns),
        "parquet" | "pq" => load_parquet(path, columns),
        _ => Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            ext,
        }),
    }
}

// ---------------------------------------------------------------------------
// Row validation shared by all formats
// ---------------------------------------------------------------------------

/// One source row before validation. `row` is 1-based over data rows.
struct RawRow<'a> {
    row: usize,
    timestamp: Option<NaiveDateTime>,
    date: Option<NaiveDate>,
    product: Option<&'a str>,
    amount: Result<f64, String>,
}

impl RawRow<'_> {
    fn into_record(self, path: &Path) -> Result<SaleRecord, LoadError> {
        let invalid = |message: String| LoadError::InvalidRow {
            path: path.to_path_buf(),
            row: self.row,
            message,
        };

        let product = self
            .product
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| invalid("missing product name".to_string()))?;
        let amount = self.amount.map_err(invalid)?;

        Ok(SaleRecord::new(self.timestamp, self.date, product, amount))
    }
}

fn amount_from_text(raw: Option<&str>) -> Result<f64, String> {
    match raw {
        None => Err("missing amount".to_string()),
        Some(s) => parse_amount(s).ok_or_else(|| format!("amount '{s}' is not a number")),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, extra columns ignored.
fn load_csv(path: &Path, columns: &ColumnMapping) -> Result<Vec<SaleRecord>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_reader(file);
    let headers = reader.headers().map_err(csv_err)?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| LoadError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
    };

    let ts_idx = position(&columns.timestamp)?;
    let date_idx = position(&columns.date)?;
    let product_idx = position(&columns.product)?;
    let amount_idx = position(&columns.amount)?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;
        let raw = RawRow {
            row: i + 1,
            timestamp: record.get(ts_idx).and_then(parse_timestamp),
            date: record.get(date_idx).and_then(parse_calendar_date),
            product: record.get(product_idx),
            amount: amount_from_text(record.get(amount_idx)),
        };
        records.push(raw.into_record(path)?);
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "datetime": "2024-03-01 10:15:50.520", "date": "2024-03-01",
///     "coffee_name": "Latte", "money": 38.7 },
///   { "datetime": 1709288150520, "date": 1709251200000,
///     "coffee_name": "Latte", "money": 38.7 },
///   ...
/// ]
/// ```
///
/// Timestamps and dates may be strings or integer epoch milliseconds (UTC),
/// which is how pandas writes datetime columns by default.
fn load_json(path: &Path, columns: &ColumnMapping) -> Result<Vec<SaleRecord>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let rows = root.as_array().ok_or_else(|| LoadError::InvalidRow {
        path: path.to_path_buf(),
        row: 0,
        message: "expected a top-level JSON array".to_string(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, value) in rows.iter().enumerate() {
        let obj = value.as_object().ok_or_else(|| LoadError::InvalidRow {
            path: path.to_path_buf(),
            row: i + 1,
            message: "row is not a JSON object".to_string(),
        })?;

        let amount = match obj.get(&columns.amount) {
            Some(JsonValue::Number(n)) => n
                .as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("amount {n} is not representable")),
            Some(JsonValue::String(s)) => amount_from_text(Some(s.as_str())),
            Some(JsonValue::Null) | None => Err("missing amount".to_string()),
            Some(other) => Err(format!("amount {other} is not a number")),
        };

        let raw = RawRow {
            row: i + 1,
            timestamp: obj.get(&columns.timestamp).and_then(json_timestamp),
            date: obj.get(&columns.date).and_then(json_date),
            product: obj.get(&columns.product).and_then(JsonValue::as_str),
            amount,
        };
        records.push(raw.into_record(path)?);
    }

    Ok(records)
}

fn json_timestamp(value: &JsonValue) -> Option<NaiveDateTime> {
    match value {
        JsonValue::String(s) => parse_timestamp(s),
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}

fn json_date(value: &JsonValue) -> Option<NaiveDate> {
    match value {
        JsonValue::String(s) => parse_calendar_date(s),
        other => json_timestamp(other).map(|ts| ts.date()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing sales data.
///
/// Timestamp, date and product columns are cast to UTF-8 (so native
/// `Timestamp`/`Date32` columns work as well as strings) and the amount
/// column is cast to `Float64`.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path, columns: &ColumnMapping) -> Result<Vec<SaleRecord>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parquet_err = |source| LoadError::Parquet {
        path: path.to_path_buf(),
        source,
    };
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(parquet_err)?;

    // Files without row groups yield no batches, so check the schema up front.
    let schema = builder.schema();
    for name in [&columns.timestamp, &columns.date, &columns.product, &columns.amount] {
        if schema.field_with_name(name).is_err() {
            return Err(LoadError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            });
        }
    }
    let reader = builder.build().map_err(parquet_err)?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|source| LoadError::Parquet {
            path: path.to_path_buf(),
            source: source.into(),
        })?;

        let ts_col = column_as(path, &batch, &columns.timestamp, &DataType::Utf8)?;
        let date_col = column_as(path, &batch, &columns.date, &DataType::Utf8)?;
        let product_col = column_as(path, &batch, &columns.product, &DataType::Utf8)?;
        let amount_col = column_as(path, &batch, &columns.amount, &DataType::Float64)?;

        let ts = ts_col.as_string::<i32>();
        let date = date_col.as_string::<i32>();
        let product = product_col.as_string::<i32>();
        let amount = amount_col.as_primitive::<Float64Type>();

        let offset = records.len();
        for row in 0..batch.num_rows() {
            let raw = RawRow {
                row: offset + row + 1,
                timestamp: cell(ts, row).and_then(parse_timestamp),
                date: cell(date, row).and_then(parse_calendar_date),
                product: cell(product, row),
                amount: if amount.is_null(row) {
                    Err("missing amount".to_string())
                } else {
                    Some(amount.value(row))
                        .filter(|v| v.is_finite())
                        .ok_or_else(|| "amount is not finite".to_string())
                },
            };
            records.push(raw.into_record(path)?);
        }
    }

    Ok(records)
}

/// Look up a column by name and cast it to `to`.
fn column_as(
    path: &Path,
    batch: &RecordBatch,
    name: &str,
    to: &DataType,
) -> Result<ArrayRef, LoadError> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })?;
    cast(col, to).map_err(|source| LoadError::Arrow {
        path: path.to_path_buf(),
        column: name.to_string(),
        source,
    })
}

fn cell(arr: &StringArray, row: usize) -> Option<&str> {
    (!arr.is_null(row)).then(|| arr.value(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use crate::data::model::MonthPeriod;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    const HEADER: &str = "date,datetime,cash_type,card,money,coffee_name\n";

    #[test]
    fn csv_keeps_unparsable_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "a.csv",
            &format!(
                "{HEADER}2024-03-01,2024-03-01 10:15:50.520,card,ANON-1,38.7,Latte\n\
                 2024-03-01,not a time,cash,,28.9,Americano\n"
            ),
        );

        let rows = load_file(&path, &ColumnMapping::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_name, "Latte");
        assert_eq!(rows[0].amount, 38.7);
        assert!(rows[0].timestamp.is_some());
        assert_eq!(rows[1].timestamp, None);
        assert_eq!(rows[1].month_period, None);
        assert_eq!(rows[1].calendar_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn csv_rejects_non_numeric_amount() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "a.csv",
            &format!("{HEADER}2024-03-01,2024-03-01 10:15:50,card,x,lots,Latte\n"),
        );
        let err = load_file(&path, &ColumnMapping::default()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidRow { row: 1, .. }), "{err}");
    }

    #[test]
    fn csv_rejects_missing_product() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "a.csv",
            &format!("{HEADER}2024-03-01,2024-03-01 10:15:50,card,x,3.5,\n"),
        );
        let err = load_file(&path, &ColumnMapping::default()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidRow { .. }));
    }

    #[test]
    fn csv_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "a.csv", "datetime,coffee_name,money\n");
        let err = load_file(&path, &ColumnMapping::default()).unwrap_err();
        match err {
            LoadError::MissingColumn { column, .. } => assert_eq!(column, "date"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn custom_column_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "a.csv",
            "ts,day,item,price\n2024-01-01 08:00:00,2024-01-01,Tea,4\n",
        );
        let columns = ColumnMapping {
            timestamp: "ts".into(),
            date: "day".into(),
            product: "item".into(),
            amount: "price".into(),
        };
        let rows = load_file(&path, &columns).unwrap();
        assert_eq!(rows[0].product_name, "Tea");
        assert_eq!(rows[0].amount, 4.0);
    }

    #[test]
    fn json_accepts_numbers_and_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "b.json",
            r#"[
                {"datetime": "2024-03-01T10:15:50", "date": "2024-03-01",
                 "coffee_name": "Mocha", "money": 33.8},
                {"datetime": null, "date": "2024-03-02",
                 "coffee_name": "Latte", "money": "28.9"}
            ]"#,
        );
        let rows = load_file(&path, &ColumnMapping::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, 33.8);
        assert!(rows[0].timestamp.is_some());
        assert_eq!(rows[1].amount, 28.9);
        assert_eq!(rows[1].timestamp, None);
    }

    #[test]
    fn json_accepts_epoch_milliseconds() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "pandas.json",
            r#"[{"datetime": 1709288150520, "date": 1709251200000,
                 "coffee_name": "Latte", "money": 38.7}]"#,
        );
        let rows = load_file(&path, &ColumnMapping::default()).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_milli_opt(10, 15, 50, 520)
            .unwrap();
        assert_eq!(rows[0].timestamp, Some(expected));
        assert_eq!(rows[0].calendar_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(rows[0].month_period, MonthPeriod::new(2024, 3));
    }

    #[test]
    fn json_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "b.json", r#"{"coffee_name": "Latte"}"#);
        assert!(load_file(&path, &ColumnMapping::default()).is_err());
    }

    #[test]
    fn empty_parquet_still_needs_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.parquet");
        let schema = Arc::new(Schema::new(vec![Field::new(
            "unrelated",
            DataType::Utf8,
            true,
        )]));
        let file = std::fs::File::create(&path).unwrap();
        let writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.close().unwrap();

        let err = load_file(&path, &ColumnMapping::default()).unwrap_err();
        match err {
            LoadError::MissingColumn { column, .. } => assert_eq!(column, "datetime"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("sales.xlsx"), &ColumnMapping::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { ref ext, .. } if ext == "xlsx"));
    }

    #[test]
    fn missing_source_aborts_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(
            &dir,
            "a.csv",
            &format!("{HEADER}2024-03-01,2024-03-01 10:15:50,card,x,3.5,Latte\n"),
        );
        let missing = dir.path().join("missing.csv");
        let err = load(&[good, missing]).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn no_sources() {
        let sources: [&str; 0] = [];
        assert!(matches!(load(&sources), Err(LoadError::NoSources)));
    }
}
