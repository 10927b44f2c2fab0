use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::info;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no data to export")]
    Empty,
    #[error("failed to encode csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Comma-separated rows prefixed with a UTF-8 BOM so spreadsheet tools
/// pick the right encoding. The header comes from the serialized field
/// names.
pub fn to_csv_bytes<T: Serialize>(rows: &[T]) -> Result<Vec<u8>, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))
}

/// Writes `<file_name>.csv` into `dir` and returns its path.
pub async fn export_csv<T: Serialize>(
    rows: &[T],
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf, ExportError> {
    let bytes = to_csv_bytes(rows)?;
    let path = dir.join(format!("{file_name}.csv"));
    fs::write(&path, bytes).await?;
    info!(path = %path.display(), rows = rows.len(), "csv exported");
    Ok(path)
}
