use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::scoring::domain::segment::SegmentRecord;

use super::csv::escape_field;

const HEADER: &str = "provider_name,segment_id,start_timestamp_sec,final_text_timestamp_iso,\
latency_ms,hypothesis_text,reference_text,S,I,D,N";

#[derive(Error, Debug)]
pub enum MetricsCsvError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write metrics to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Write per-segment benchmark results as CSV. Unmeasured fields (open
/// segments, segments without a reference) are left empty, not zeroed.
pub fn write_metrics_csv(
    path: &Path,
    provider_name: &str,
    records: &[SegmentRecord],
) -> Result<(), MetricsCsvError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| MetricsCsvError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let file = fs::File::create(path).map_err(|source| MetricsCsvError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    write_rows(&mut writer, provider_name, records).map_err(|source| MetricsCsvError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_rows(
    writer: &mut impl Write,
    provider_name: &str,
    records: &[SegmentRecord],
) -> std::io::Result<()> {
    writeln!(writer, "{HEADER}")?;
    for record in records {
        let (s, i, d, n) = match record.alignment {
            Some(a) => (
                a.substitutions.to_string(),
                a.insertions.to_string(),
                a.deletions.to_string(),
                a.reference_words.to_string(),
            ),
            None => Default::default(),
        };
        let latency = record
            .latency_ms
            .map(|ms| ms.to_string())
            .unwrap_or_default();
        writeln!(
            writer,
            "{},{},{:.3},{},{},{},{},{},{},{},{}",
            escape_field(provider_name),
            record.segment_id,
            record.start_offset_sec,
            record.finalized_iso,
            latency,
            escape_field(&record.hypothesis_text),
            escape_field(&record.reference_text),
            s,
            i,
            d,
            n,
        )?;
    }
    writer.flush()
}
