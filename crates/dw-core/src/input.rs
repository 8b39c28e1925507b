//! Loading snapshot series documents.
//!
//! The input is the structured JSON form of the snapshot model, written by
//! an external thread-dump parser. Raw dump text is not accepted here.

use dw_common::schema::is_compatible;
use dw_common::{Error, Result, SnapshotSeries};
use std::io::Read;
use std::path::Path;

/// Read a series from a file, or from stdin when `path` is `-`.
pub fn load_series(path: &Path) -> Result<SnapshotSeries> {
    if path == Path::new("-") {
        return read_series(std::io::stdin().lock());
    }
    let file = std::fs::File::open(path)?;
    let series = read_series(std::io::BufReader::new(file))?;
    tracing::debug!(
        path = %path.display(),
        dumps = series.len(),
        "loaded snapshot series"
    );
    Ok(series)
}

/// Parse a series from any reader.
pub fn read_series<R: Read>(reader: R) -> Result<SnapshotSeries> {
    let series: SnapshotSeries = serde_json::from_reader(reader).map_err(malformed)?;
    check_series(series)
}

/// Parse a series from a string.
pub fn parse_series(json: &str) -> Result<SnapshotSeries> {
    let series: SnapshotSeries = serde_json::from_str(json).map_err(malformed)?;
    check_series(series)
}

/// Decode failures are input errors; only a failing reader is I/O.
fn malformed(err: serde_json::Error) -> Error {
    if err.is_io() {
        Error::Io(err.into())
    } else {
        Error::Input(format!("malformed snapshot series: {}", err))
    }
}

fn check_series(series: SnapshotSeries) -> Result<SnapshotSeries> {
    if !is_compatible(&series.schema_version) {
        return Err(Error::UnsupportedSchema {
            version: series.schema_version,
        });
    }
    if let Some((index, thread)) = series.snapshots.iter().enumerate().find_map(|(i, s)| {
        s.threads
            .iter()
            .find(|t| !t.cpu_usage.is_finite() || t.cpu_usage < 0.0)
            .map(|t| (i, t))
    }) {
        return Err(Error::Input(format!(
            "snapshot {} thread {}: cpu_usage must be a non-negative number, got {}",
            index, thread.id, thread.cpu_usage
        )));
    }
    let unordered = series
        .snapshots
        .windows(2)
        .filter(|pair| pair[1].timestamp < pair[0].timestamp)
        .count();
    if unordered > 0 {
        tracing::warn!(
            unordered,
            "snapshot timestamps are not ascending; analysing in file order"
        );
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_series() {
        let series = parse_series(r#"{"snapshots": []}"#).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn rejects_other_major_version() {
        let err = parse_series(r#"{"schema_version": "2.0.0", "snapshots": []}"#).unwrap_err();
        assert!(matches!(err, Error::UnsupportedSchema { .. }));
        assert_eq!(err.code(), 21);
    }

    #[test]
    fn rejects_negative_cpu() {
        let err = parse_series(
            r#"{"snapshots": [{"timestamp": "2026-01-15T14:30:00Z",
                "threads": [{"id": 3, "cpu_usage": -1.0}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Input(_)));
        assert!(err.to_string().contains("thread 3"));
    }

    #[test]
    fn malformed_json_is_input_error() {
        let err = parse_series("{").unwrap_err();
        assert!(matches!(err, Error::Input(_)));
        assert!(err.to_string().contains("malformed snapshot series"));

        let err = read_series("{\"snapshots\": 7}".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }

    #[test]
    fn out_of_order_timestamps_are_accepted() {
        let series = parse_series(
            r#"{"snapshots": [
                {"timestamp": "2026-01-15T14:31:00Z"},
                {"timestamp": "2026-01-15T14:30:00Z"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(series.len(), 2);
    }
}
