//! In-memory doubles for flow tests
//!
//! These stand in for MongoDB, S3 and the probes so the flows can be exercised without
//! network access.

use async_trait::async_trait;
use futures::StreamExt;
use mediarecon_core::{MediaPatch, MediaRecord, UpdateOutcome};
use mediarecon_db::{DbError, DbResult, MediaRepository, MediaStream};
use mediarecon_processing::{ImageDimensions, ImageProbe, MediaInfo, MediaProbe, ProbeError};
use mediarecon_storage::{Storage, StorageError, StorageResult, UploadReceipt};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

fn db_failure(message: &str) -> DbError {
    DbError::Mongo(mongodb::error::Error::from(std::io::Error::other(
        message.to_string(),
    )))
}

/// Media collection held in memory with `$set` semantics for updates.
#[derive(Default)]
pub struct MockMediaRepository {
    records: Mutex<Vec<MediaRecord>>,
    updates: Mutex<Vec<(String, MediaPatch)>>,
    failing_updates: Mutex<HashSet<String>>,
    fail_scan: Mutex<bool>,
    fail_cursor_after: Mutex<Option<usize>>,
}

impl MockMediaRepository {
    pub fn new(records: Vec<MediaRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    pub fn fail_update_for(&self, key: &str) {
        self.failing_updates.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_scan(&self) {
        *self.fail_scan.lock().unwrap() = true;
    }

    /// Cursor yields `n` records and then an error.
    pub fn fail_cursor_after(&self, n: usize) {
        *self.fail_cursor_after.lock().unwrap() = Some(n);
    }

    pub fn updates(&self) -> Vec<(String, MediaPatch)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn record(&self, key: &str) -> Option<MediaRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.key == key)
            .cloned()
    }
}

#[async_trait]
impl MediaRepository for MockMediaRepository {
    async fn count_missing_dimensions(&self) -> DbResult<u64> {
        if *self.fail_scan.lock().unwrap() {
            return Err(db_failure("connection reset during count"));
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.needs_dimensions())
            .count() as u64)
    }

    async fn find_missing_dimensions(&self) -> DbResult<MediaStream> {
        let mut selected: Vec<DbResult<MediaRecord>> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.needs_dimensions())
            .cloned()
            .map(Ok)
            .collect();
        if let Some(n) = *self.fail_cursor_after.lock().unwrap() {
            selected.truncate(n);
            selected.push(Err(db_failure("cursor killed")));
        }
        Ok(futures::stream::iter(selected).boxed())
    }

    async fn update_by_key(&self, key: &str, patch: &MediaPatch) -> DbResult<UpdateOutcome> {
        self.updates
            .lock()
            .unwrap()
            .push((key.to_string(), patch.clone()));

        if self.failing_updates.lock().unwrap().contains(key) {
            return Err(db_failure("write concern error"));
        }

        let mut records = self.records.lock().unwrap();
        Ok(match records.iter_mut().find(|r| r.key == key) {
            Some(record) => UpdateOutcome {
                matched_count: 1,
                modified_count: u64::from(record.apply(patch)),
            },
            None => UpdateOutcome::default(),
        })
    }
}

/// Image probe answering from a fixed table keyed by URL. Unknown URLs fail.
#[derive(Default)]
pub struct MockImageProbe {
    answers: HashMap<String, ImageDimensions>,
    calls: Mutex<Vec<String>>,
}

impl MockImageProbe {
    pub fn with(mut self, url: &str, dimensions: ImageDimensions) -> Self {
        self.answers.insert(url.to_string(), dimensions);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageProbe for MockImageProbe {
    async fn probe(&self, url: &str) -> Result<ImageDimensions, ProbeError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.answers
            .get(url)
            .copied()
            .ok_or_else(|| ProbeError::InvalidImage(format!("unreachable: {}", url)))
    }
}

/// Media probe answering by file name. Unknown files fail like a non-media input would.
#[derive(Default)]
pub struct MockMediaProbe {
    answers: HashMap<String, MediaInfo>,
    calls: Mutex<Vec<String>>,
}

impl MockMediaProbe {
    pub fn with(mut self, file_name: &str, info: MediaInfo) -> Self {
        self.answers.insert(file_name.to_string(), info);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaProbe for MockMediaProbe {
    async fn probe_file(&self, path: &Path) -> Result<MediaInfo, ProbeError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.calls.lock().unwrap().push(name.clone());
        self.answers.get(&name).cloned().ok_or_else(|| {
            ProbeError::Io(std::io::Error::other(format!(
                "{}: Invalid data found when processing input",
                name
            )))
        })
    }
}

/// Object store recording every upload.
#[derive(Default)]
pub struct MockStorage {
    uploads: Mutex<Vec<(String, usize)>>,
    failing_keys: Mutex<HashSet<String>>,
}

impl MockStorage {
    pub fn fail_upload_for(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn etag_for(key: &str) -> String {
        format!("\"etag-{}\"", key)
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn upload_public(&self, key: &str, data: Vec<u8>) -> StorageResult<UploadReceipt> {
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(StorageError::UploadFailed(format!("access denied for {}", key)));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((key.to_string(), data.len()));
        Ok(UploadReceipt {
            key: key.to_string(),
            etag: Some(Self::etag_for(key)),
            url: format!("https://uploads.example.com/{}", key),
        })
    }
}

/// Log sink for asserting on emitted lines.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Subscriber writing plain text into this sink. Install it with
    /// `tracing::subscriber::set_default` inside a current-thread test.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
