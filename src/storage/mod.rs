//! Columnar I/O.
//!
//! Reads the input drug column from a Parquet file and writes the result
//! table (nullable probability column plus, unless disabled, the raw
//! response text) back out as Parquet. File errors propagate and terminate
//! the run.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use arrow2::array::{Array, Float64Array, Utf8Array};
use arrow2::chunk::Chunk;
use arrow2::datatypes::{DataType, Field, Schema};
use arrow2::io::parquet::read;
use arrow2::io::parquet::write as pq;

/// Output filename per run mode. Chain-of-thought runs get their own file
/// so the two variants never overwrite each other.
pub fn output_path(dir: &Path, reasoning: bool) -> PathBuf {
    let name = if reasoning {
        "drug_t2d_probas_cot.parquet"
    } else {
        "drug_t2d_probas.parquet"
    };
    dir.join(name)
}

/// Read one UTF-8 column from a Parquet file into memory.
///
/// The whole column is materialised as a list, in row order. Null cells
/// become empty strings so the row count is preserved end-to-end.
pub fn read_drug_column(path: &Path, column: &str) -> Result<Vec<String>> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;

    let metadata = read::read_metadata(&mut file)
        .with_context(|| format!("Failed to read Parquet metadata: {}", path.display()))?;
    let schema = read::infer_schema(&metadata)?;

    let schema = schema.filter(|_index, field| field.name == column);
    if schema.fields.is_empty() {
        bail!("Input file {} has no column named '{column}'", path.display());
    }

    let reader = read::FileReader::new(file, metadata.row_groups, schema, None, None, None);

    let mut drugs = Vec::new();
    let mut null_cells = 0usize;

    for maybe_chunk in reader {
        let chunk = maybe_chunk.context("Failed to decode Parquet row group")?;
        let array = &chunk.columns()[0];
        extend_from_utf8(array.as_ref(), &mut drugs, &mut null_cells)
            .with_context(|| format!("Column '{column}' is not a string column"))?;
    }

    if null_cells > 0 {
        warn!(null_cells, "Input column contains nulls, treated as empty strings");
    }

    info!(rows = drugs.len(), column, path = %path.display(), "Input column loaded");
    Ok(drugs)
}

fn extend_from_utf8(
    array: &dyn Array,
    out: &mut Vec<String>,
    null_cells: &mut usize,
) -> Result<()> {
    if let Some(utf8) = array.as_any().downcast_ref::<Utf8Array<i32>>() {
        for value in utf8.iter() {
            push_cell(value, out, null_cells);
        }
    } else if let Some(utf8) = array.as_any().downcast_ref::<Utf8Array<i64>>() {
        for value in utf8.iter() {
            push_cell(value, out, null_cells);
        }
    } else {
        bail!("expected a UTF-8 array, found {:?}", array.data_type());
    }
    Ok(())
}

fn push_cell(value: Option<&str>, out: &mut Vec<String>, null_cells: &mut usize) {
    match value {
        Some(s) => out.push(s.to_string()),
        None => {
            *null_cells += 1;
            out.push(String::new());
        }
    }
}

/// Write the result table: one row per input drug, order-aligned.
///
/// `responses` is included as a second column when present; probabilities
/// that failed to parse are written as nulls.
pub fn write_estimates(
    path: &Path,
    probabilities: &[Option<f64>],
    responses: Option<&[String]>,
) -> Result<()> {
    let mut fields = vec![Field::new("prob", DataType::Float64, true)];
    let mut columns: Vec<Box<dyn Array>> =
        vec![Box::new(Float64Array::from(probabilities.to_vec()))];

    if let Some(responses) = responses {
        fields.push(Field::new("response", DataType::Utf8, false));
        columns.push(Box::new(Utf8Array::<i32>::from_slice(responses)));
    }

    let schema = Schema::from(fields);
    let chunk = Chunk::try_new(columns)?;

    let options = pq::WriteOptions {
        write_statistics: true,
        compression: pq::CompressionOptions::Zstd(None),
        version: pq::Version::V2,
        data_pagesize_limit: None,
    };

    let encodings: Vec<Vec<pq::Encoding>> = schema
        .fields
        .iter()
        .map(|_| vec![pq::Encoding::Plain])
        .collect();

    let row_groups =
        pq::RowGroupIterator::try_new(std::iter::once(Ok(chunk)), &schema, options, encodings)?;

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = pq::FileWriter::try_new(&mut file, schema, options)?;
    for row_group in row_groups {
        writer.write(row_group?)?;
    }
    writer.end(None)?;

    info!(
        rows = probabilities.len(),
        with_responses = responses.is_some(),
        path = %path.display(),
        "Result table written"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
