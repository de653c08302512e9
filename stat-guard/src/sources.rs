//! File loading through DataFusion: CSV, Parquet, and newline-delimited
//! JSON, dispatched by file extension.

use datafusion::prelude::{CsvReadOptions, NdJsonReadOptions, ParquetReadOptions, SessionContext};
use std::path::Path;
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{GuardError, Result};

/// Loads a dataset from a file, picking the format from the extension.
///
/// Recognized extensions: `csv`, `parquet`, and `json`/`ndjson`/`jsonl`
/// (newline-delimited JSON). Anything else is a configuration error.
pub async fn load_path(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path).await,
        "parquet" => load_parquet(path).await,
        "json" | "ndjson" | "jsonl" => load_ndjson(path).await,
        other => Err(GuardError::UnsupportedFileFormat(other.to_string())),
    }
}

/// Loads a CSV file with header inference.
pub async fn load_csv(path: &Path) -> Result<Dataset> {
    let ctx = SessionContext::new();
    let df = ctx
        .read_csv(path_str(path)?, CsvReadOptions::default().has_header(true))
        .await?;
    collect(path, df).await
}

/// Loads a Parquet file.
pub async fn load_parquet(path: &Path) -> Result<Dataset> {
    let ctx = SessionContext::new();
    let df = ctx
        .read_parquet(path_str(path)?, ParquetReadOptions::default())
        .await?;
    collect(path, df).await
}

/// Loads a newline-delimited JSON file.
pub async fn load_ndjson(path: &Path) -> Result<Dataset> {
    let ctx = SessionContext::new();
    // the listing extension filter must match the actual file suffix
    let ext = format!(
        ".{}",
        path.extension().and_then(|e| e.to_str()).unwrap_or("json")
    );
    let df = ctx
        .read_json(
            path_str(path)?,
            NdJsonReadOptions::default().file_extension(&ext),
        )
        .await?;
    collect(path, df).await
}

async fn collect(path: &Path, df: datafusion::dataframe::DataFrame) -> Result<Dataset> {
    let schema = df.schema().inner().clone();
    let batches = df.collect().await?;
    let dataset = Dataset::from_batches(schema, &batches)?;
    debug!(
        path = %path.display(),
        rows = dataset.num_rows(),
        columns = dataset.num_columns(),
        "dataset loaded"
    );
    Ok(dataset)
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        GuardError::invalid_config(format!("path is not valid UTF-8: {}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[tokio::test]
    async fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "metric,arm").unwrap();
        writeln!(f, "1.5,control").unwrap();
        writeln!(f, "2.5,treatment").unwrap();
        writeln!(f, ",control").unwrap();

        let data = load_path(&path).await.unwrap();
        assert_eq!(data.num_rows(), 3);
        assert!(data.has_column("metric"));
        assert!(data.has_column("arm"));
        assert_eq!(data.null_count("metric"), 1);
    }

    #[tokio::test]
    async fn test_load_ndjson() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.ndjson");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, r#"{{"metric": 1.0, "arm": "a"}}"#).unwrap();
        writeln!(f, r#"{{"metric": 2.0, "arm": "b"}}"#).unwrap();

        let data = load_path(&path).await.unwrap();
        assert_eq!(data.num_rows(), 2);
        assert_eq!(data.numeric_dropna("metric"), vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_unknown_extension_rejected() {
        let err = load_path("data.xlsx").await.unwrap_err();
        assert!(matches!(err, GuardError::UnsupportedFileFormat(f) if f == "xlsx"));
    }
}
