//! CSV writing operations.

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::{CsvWriter, NamedFrom}, series::Series};

/// Header line of a result table. The first column (row number) is unnamed.
pub(crate) const RESULT_HEADER: &str = ",beat,zone,workload";

/// One line of a result table.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResultRow {
    pub(crate) no: usize,
    pub(crate) beat: String,
    pub(crate) zone: u32,
    pub(crate) workload: f64,
}

/// Write result rows to a CSV file.
pub(crate) fn write_result_table(rows: &[ResultRow], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::csv::write] Failed to create CSV file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_result_table_to(&mut writer, rows)
        .with_context(|| format!("[io::csv::write] Failed to write CSV to {:?}", path))?;
    writer.flush()
        .with_context(|| format!("[io::csv::write] Failed to flush CSV to {:?}", path))
}

/// Write result rows to a CSV string.
pub(crate) fn write_result_table_string(rows: &[ResultRow]) -> Result<String> {
    let mut buffer = Vec::new();
    write_result_table_to(&mut buffer, rows)
        .context("[io::csv::write] Failed to write CSV to string")?;
    String::from_utf8(buffer)
        .context("[io::csv::write] CSV output is not valid UTF-8")
}

/// Write the header line, then the rows with workloads fixed to 6 decimals.
fn write_result_table_to<W: Write>(writer: &mut W, rows: &[ResultRow]) -> Result<()> {
    writeln!(writer, "{RESULT_HEADER}")?;

    let mut df = DataFrame::new(vec![
        Series::new("no".into(), rows.iter().map(|row| row.no as u64).collect::<Vec<_>>()).into(),
        Series::new("beat".into(), rows.iter().map(|row| row.beat.as_str()).collect::<Vec<_>>()).into(),
        Series::new("zone".into(), rows.iter().map(|row| row.zone).collect::<Vec<_>>()).into(),
        Series::new("workload".into(), rows.iter().map(|row| row.workload).collect::<Vec<_>>()).into(),
    ])?;

    CsvWriter::new(writer)
        .include_header(false)
        .with_float_precision(Some(6))
        .finish(&mut df)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv::{parse_result_table, read_headerless_csv};

    fn sample_rows() -> Vec<ResultRow> {
        vec![
            ResultRow { no: 1, beat: "A01".into(), zone: 0, workload: 10.0 },
            ResultRow { no: 2, beat: "B02".into(), zone: 3, workload: 1234.56789 },
        ]
    }

    #[test]
    fn string_output_matches_reference_layout() {
        let text = write_result_table_string(&sample_rows()).unwrap();
        assert_eq!(text, ",beat,zone,workload\n1,A01,0,10.000000\n2,B02,3,1234.567890\n");
    }

    #[test]
    fn empty_table_is_header_only() {
        assert_eq!(write_result_table_string(&[]).unwrap(), ",beat,zone,workload\n");
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opt_result.csv");
        write_result_table(&sample_rows(), &path).unwrap();

        let rows = parse_result_table(&read_headerless_csv(&path).unwrap()).unwrap();
        assert_eq!(rows[0], sample_rows()[0]);
        assert_eq!(rows[1].beat, "B02");
        assert!((rows[1].workload - 1234.56789).abs() < 1e-9);
    }
}
