use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::scoring::domain::reference_map::ReferenceMap;

use super::csv::parse_records;

#[derive(Error, Debug)]
pub enum ReferenceCsvError {
    #[error("failed to read reference csv {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("reference csv {path} has no header row")]
    MissingHeader { path: PathBuf },
    #[error("reference csv {path} needs `segment_id` and `reference_text` columns")]
    MissingColumns { path: PathBuf },
    #[error("invalid segment id {value:?} in reference csv row {row}")]
    InvalidSegmentId { value: String, row: usize },
}

/// Load a `segment_id,reference_text` CSV into a [`ReferenceMap`].
///
/// Column order is taken from the header. Rows shorter than the reference
/// column are skipped with a warning rather than failing the load.
pub fn load_reference_csv(path: &Path) -> Result<ReferenceMap, ReferenceCsvError> {
    let content = fs::read_to_string(path).map_err(|source| ReferenceCsvError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_records(&content);
    let header = records.first().ok_or_else(|| ReferenceCsvError::MissingHeader {
        path: path.to_path_buf(),
    })?;

    let id_col = column_index(header, "segment_id");
    let text_col = column_index(header, "reference_text");
    let (id_col, text_col) = match (id_col, text_col) {
        (Some(i), Some(t)) => (i, t),
        _ => {
            return Err(ReferenceCsvError::MissingColumns {
                path: path.to_path_buf(),
            })
        }
    };

    let mut map = ReferenceMap::new();
    for (row_index, record) in records.iter().enumerate().skip(1) {
        if record.len() <= id_col.max(text_col) {
            log::warn!("reference csv row {} is too short; skipped", row_index + 1);
            continue;
        }
        let raw_id = record[id_col].trim();
        let id: u64 = raw_id
            .parse()
            .map_err(|_| ReferenceCsvError::InvalidSegmentId {
                value: raw_id.to_string(),
                row: row_index + 1,
            })?;
        map.insert(id, record[text_col].clone());
    }
    Ok(map)
}

fn column_index(header: &[String], name: &str) -> Option<usize> {
    header.iter().position(|h| h.trim() == name)
}
