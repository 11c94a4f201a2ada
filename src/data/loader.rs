use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Number, Value as JsonValue};

use super::model::{InflationDataset, RawRecord};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and normalize an inflation dataset. Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `[{ "País": "Chile", "Año": 2020, "Inflación Anual": 0.03 }, ...]`
/// * `.csv`     – header row with the same column names
/// * `.parquet` – one scalar column per field
pub fn load_file(path: &Path) -> Result<InflationDataset> {
    let raw = load_raw(path)?;
    Ok(InflationDataset::from_raw(&raw))
}

/// Read raw rows without normalizing them.
pub fn load_raw(path: &Path) -> Result<Vec<RawRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_json(&text)
}

/// Parse a top-level JSON array. Entries that are not objects are skipped,
/// the same way malformed rows are dropped later on.
pub fn parse_json(text: &str) -> Result<Vec<RawRecord>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let JsonValue::Array(items) = root else {
        bail!("Expected top-level JSON array");
    };

    let total = items.len();
    let records: Vec<RawRecord> = items
        .into_iter()
        .filter_map(|item| match item {
            JsonValue::Object(obj) => Some(obj),
            _ => None,
        })
        .collect();
    if records.len() < total {
        log::debug!("Skipped {} non-object JSON entries", total - records.len());
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Every cell becomes a JSON string; the normalizer coerces numbers.
/// Empty cells become `null` so the next alias gets a chance.
fn load_csv(path: &Path) -> Result<Vec<RawRecord>> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<RawRecord>> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row: RawRecord = headers
            .iter()
            .zip(record.iter())
            .map(|(key, cell)| {
                let value = if cell.trim().is_empty() {
                    JsonValue::Null
                } else {
                    JsonValue::String(cell.to_string())
                };
                (key.clone(), value)
            })
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file whose columns are the record fields.
///
/// Works with files written by **Pandas** (`df.to_parquet()`),
/// **Polars** (`df.write_parquet()`) and `generate_sample`.
fn load_parquet(path: &Path) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

        for row in 0..batch.num_rows() {
            let record: RawRecord = names
                .iter()
                .zip(batch.columns())
                .map(|(name, col)| (name.clone(), cell_to_json(col, row)))
                .collect();
            rows.push(record);
        }
    }
    Ok(rows)
}

fn float_to_json(v: f64) -> JsonValue {
    Number::from_f64(v).map(JsonValue::Number).unwrap_or(JsonValue::Null)
}

/// Extract a single cell from an Arrow column as JSON.
fn cell_to_json(col: &ArrayRef, row: usize) -> JsonValue {
    if col.is_null(row) {
        return JsonValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => JsonValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => JsonValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => JsonValue::from(col.as_primitive::<Int32Type>().value(row)),
        DataType::Int64 => JsonValue::from(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => float_to_json(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => float_to_json(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => JsonValue::Bool(col.as_boolean().value(row)),
        other => {
            log::debug!("Ignoring parquet cell of type {other:?}");
            JsonValue::Null
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    #[test]
    fn test_parse_json_skips_non_objects() {
        let rows = parse_json(r#"[{"País": "Chile"}, 3, null, {"Pais": "Perú"}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["Pais"], "Perú");
    }

    #[test]
    fn test_parse_json_rejects_non_array() {
        assert!(parse_json(r#"{"País": "Chile"}"#).is_err());
        assert!(parse_json("not json").is_err());
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inflation_data.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            r#"[
                {{"País": "Chile", "Año": 2020, "Inflación Anual": 0.03}},
                {{"País": "Chile", "Año": 2021, "Inflación Anual": 5.0}},
                {{"País": "", "Año": 2021, "Inflación Anual": 5.0}}
            ]"#
        )
        .unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.dropped, 1);
        assert_eq!(ds.domain.years, vec![2020, 2021]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_file(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_raw(Path::new("data.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn test_read_csv_rows() {
        let data = "Pais,Ano,Inflacion Anual\nChile,2020,0.03\nPerú,,0.05\n";
        let rows = read_csv(csv::Reader::from_reader(data.as_bytes())).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Ano"], "2020");
        assert!(rows[1]["Ano"].is_null());

        let ds = InflationDataset::from_raw(&rows);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].country, "Chile");
    }

    #[test]
    fn test_load_parquet_file() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("País", DataType::Utf8, true),
            Field::new("Año", DataType::Int64, true),
            Field::new("Inflación Anual", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Chile"), Some("Perú"), None])),
                Arc::new(Int64Array::from(vec![2020, 2021, 2021])),
                Arc::new(Float64Array::from(vec![Some(0.03), None, Some(0.1)])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inflation.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let rows = load_raw(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["Año"], 2020);
        assert!(rows[1]["Inflación Anual"].is_null());

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].country, "Chile");
    }
}
