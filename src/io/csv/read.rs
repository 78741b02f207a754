//! CSV reading operations.

use std::{collections::HashSet, fs::File, io::{Cursor, Read}, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, StringChunked}};

use crate::{error::ZoneError, io::csv::ResultRow};

/// Adjacency matrix as read from disk: header ids and one flag row per id, in header order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AdjacencyTable {
    pub(crate) beats: Vec<String>,
    pub(crate) rows: Vec<Vec<bool>>,
}

/// Reads a CSV file with no header row, keeping every cell as a string.
/// An empty file gives an empty frame.
pub(crate) fn read_headerless_csv(path: &Path) -> Result<DataFrame> {
    let text = read_text(path)?;
    read_headerless_csv_string(&text)
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Reads a headerless CSV from a string, keeping every cell as a string.
/// Input with no non-blank line gives an empty frame.
pub(crate) fn read_headerless_csv_string(csv: &str) -> Result<DataFrame> {
    if csv.trim().is_empty() { return Ok(DataFrame::empty()) }
    string_options()
        .into_reader_with_file_handle(Cursor::new(csv.as_bytes().to_vec()))
        .finish()
        .context("[io::csv::read] Failed to read CSV from string")
}

/// Reads a `<beat>,<workload>` listing from disk.
pub(crate) fn read_workload_csv(path: &Path) -> Result<DataFrame> {
    let text = read_text(path)?;
    read_workload_csv_string(&text)
        .with_context(|| format!("[io::csv::read] Failed to read workloads from {:?}", path))
}

/// Reads a `<beat>,<workload>` listing. Records with a non-blank cell past the
/// second field are rejected here, before the reader truncates them.
pub(crate) fn read_workload_csv_string(csv: &str) -> Result<DataFrame> {
    ensure_record_width(csv, 2, "workload")?;
    read_headerless_csv_string(csv)
}

fn read_text(path: &Path) -> Result<String> {
    let mut text = String::new();
    File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?
        .read_to_string(&mut text)
        .with_context(|| format!("[io::csv::read] Failed to read CSV file: {}", path.display()))?;
    Ok(text)
}

/// Fail on the first line holding a non-blank field past `width`.
fn ensure_record_width(csv: &str, width: usize, source: &'static str) -> Result<()> {
    for (line, text) in csv.lines().enumerate() {
        if let Some(extra) = text.split(',').skip(width).map(str::trim).find(|field| !field.is_empty()) {
            return Err(ZoneError::parse(source, line + 1, format!("unexpected extra field '{extra}', expected {width} fields")).into());
        }
    }
    Ok(())
}

/// Options shared by every reader: no header, no type inference, ragged rows
/// truncated to the width of the first line.
fn string_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|po| po.with_truncate_ragged_lines(true))
}

/// Borrow every column of an all-string DataFrame.
fn string_columns(df: &DataFrame) -> Result<Vec<&StringChunked>> {
    df.get_columns().iter()
        .map(|column| column.str().context("[io::csv::read] Expected string columns"))
        .collect()
}

/// Trimmed cell value; missing and blank cells read as `""`.
#[inline]
fn cell<'a>(columns: &[&'a StringChunked], col: usize, row: usize) -> &'a str {
    columns.get(col).and_then(|c| c.get(row)).map(str::trim).unwrap_or("")
}

/// Parse an adjacency matrix table.
///
/// The first row lists the beat ids (blank cells ignored). Every later row with
/// a non-empty first cell is a matrix row: its label must match the header id at
/// the same position, and the following cells are adjacency flags. Only `1` marks
/// adjacency; `0` and blank cells do not, and any other value is treated as `0`
/// with a warning.
pub(crate) fn parse_adjacency(df: &DataFrame) -> Result<AdjacencyTable> {
    const SOURCE: &str = "adjacency";
    let columns = string_columns(df)?;
    let height = df.height();
    if height == 0 { return Err(ZoneError::parse(SOURCE, 1, "table is empty").into()) }

    let mut beats = Vec::new();
    let mut seen = HashSet::new();
    for col in 0..columns.len() {
        let id = cell(&columns, col, 0);
        if id.is_empty() { continue }
        if !seen.insert(id) {
            return Err(ZoneError::parse(SOURCE, 1, format!("duplicate beat id '{id}' in header")).into());
        }
        beats.push(id.to_string());
    }
    if beats.is_empty() { return Err(ZoneError::parse(SOURCE, 1, "header lists no beat ids").into()) }

    let n = beats.len();
    let mut rows = Vec::with_capacity(n);
    for row in 1..height {
        let label = cell(&columns, 0, row);
        if label.is_empty() { continue }

        let record = row + 1;
        let Some(expected) = beats.get(rows.len()) else {
            return Err(ZoneError::parse(SOURCE, record, format!("more matrix rows than the {n} header ids")).into());
        };
        if label != expected {
            return Err(ZoneError::parse(SOURCE, record, format!("row label '{label}' does not match header id '{expected}'")).into());
        }

        let flags = (1..=n).map(|col| match cell(&columns, col, row) {
            "1" => true,
            "0" | "" => false,
            other => {
                tracing::warn!("[io::csv::read] adjacency record {record}, column {col}: '{other}' is not 0/1, treating as 0");
                false
            }
        }).collect();
        rows.push(flags);
    }

    if rows.len() != n {
        return Err(ZoneError::parse(SOURCE, height, format!("found {} matrix rows, expected {n}", rows.len())).into());
    }

    Ok(AdjacencyTable { beats, rows })
}

/// Parse `<beat>,<workload>` records. Fully blank lines are skipped.
pub(crate) fn parse_workloads(df: &DataFrame) -> Result<Vec<(String, f64)>> {
    const SOURCE: &str = "workload";
    let columns = string_columns(df)?;

    let mut workloads = Vec::with_capacity(df.height());
    let mut seen = HashSet::new();
    for row in 0..df.height() {
        let record = row + 1;
        let (id, value) = (cell(&columns, 0, row), cell(&columns, 1, row));
        if id.is_empty() && value.is_empty() { continue }
        if id.is_empty() {
            return Err(ZoneError::parse(SOURCE, record, "empty beat id").into());
        }
        if value.is_empty() {
            return Err(ZoneError::parse(SOURCE, record, format!("missing workload for beat '{id}'")).into());
        }
        let workload = parse_workload(value)
            .map_err(|message| ZoneError::parse(SOURCE, record, message))?;
        if !seen.insert(id) {
            return Err(ZoneError::parse(SOURCE, record, format!("duplicate beat id '{id}'")).into());
        }
        workloads.push((id.to_string(), workload));
    }

    Ok(workloads)
}

/// Parse a workload value, which must be a finite, non-negative number.
fn parse_workload(value: &str) -> Result<f64, String> {
    let workload = value.parse::<f64>().map_err(|_| format!("workload '{value}' is not a number"))?;
    if !workload.is_finite() { return Err(format!("workload '{value}' is not finite")) }
    if workload < 0.0 { return Err(format!("workload '{value}' is negative")) }
    Ok(workload)
}

/// Parse a result table: a `,beat,zone,workload` header line followed by
/// `<no>,<beat>,<zone>,<workload>` records. Columns are read by position.
pub(crate) fn parse_result_table(df: &DataFrame) -> Result<Vec<ResultRow>> {
    const SOURCE: &str = "result";
    let columns = string_columns(df)?;
    if df.height() == 0 { return Err(ZoneError::parse(SOURCE, 1, "table is empty").into()) }
    let header = (0..4).map(|col| cell(&columns, col, 0)).collect::<Vec<_>>();
    if header != ["", "beat", "zone", "workload"] {
        return Err(ZoneError::parse(SOURCE, 1, format!("expected header ',beat,zone,workload', found '{}'", header.join(","))).into());
    }

    (1..df.height()).map(|row| -> Result<ResultRow> {
        let record = row + 1;
        let no = cell(&columns, 0, row).parse::<usize>()
            .map_err(|_| ZoneError::parse(SOURCE, record, format!("row number '{}' is not an integer", cell(&columns, 0, row))))?;
        let beat = cell(&columns, 1, row);
        if beat.is_empty() { return Err(ZoneError::parse(SOURCE, record, "empty beat id").into()) }
        let zone = cell(&columns, 2, row).parse::<u32>()
            .map_err(|_| ZoneError::parse(SOURCE, record, format!("zone '{}' is not an integer", cell(&columns, 2, row))))?;
        let workload = parse_workload(cell(&columns, 3, row))
            .map_err(|message| ZoneError::parse(SOURCE, record, message))?;
        Ok(ResultRow { no, beat: beat.to_string(), zone, workload })
    }).collect()
}
