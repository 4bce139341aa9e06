//! JSON + CSV file store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::storage::csv::{csv_row, CSV_HEADER};
use crate::storage::StoreResult;

pub const JSON_FILE: &str = "performance_metrics.json";
pub const CSV_FILE: &str = "performance_metrics.csv";

/// Appends documents to the JSON array and CSV files under `dir`.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn json_path(&self) -> PathBuf {
        self.dir.join(JSON_FILE)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.dir.join(CSV_FILE)
    }

    /// Append one document to both files.
    pub async fn append(&self, document: &Value) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        fs::create_dir_all(&self.dir).await?;

        let mut documents = self.read_documents().await?;
        documents.push(document.clone());
        let body = serde_json::to_vec_pretty(&documents)?;

        // Write-then-rename keeps the JSON file whole.
        let staging = self.dir.join(format!("{}.tmp", JSON_FILE));
        fs::write(&staging, body).await?;
        fs::rename(&staging, self.json_path()).await?;

        let csv_path = self.csv_path();
        let mut rows = String::new();
        if !fs::try_exists(&csv_path).await? {
            rows.push_str(CSV_HEADER);
            rows.push('\n');
        }
        rows.push_str(&csv_row(document));
        rows.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&csv_path)
            .await?;
        file.write_all(rows.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(
            path = %self.json_path().display(),
            records = documents.len(),
            "Document stored"
        );
        Ok(())
    }

    /// All stored documents, oldest first.
    pub async fn documents(&self) -> StoreResult<Vec<Value>> {
        let _guard = self.write_lock.lock().await;
        self.read_documents().await
    }

    pub async fn count(&self) -> StoreResult<usize> {
        Ok(self.documents().await?.len())
    }

    async fn read_documents(&self) -> StoreResult<Vec<Value>> {
        match fs::read(self.json_path()).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}
