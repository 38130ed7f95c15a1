//! Audit sinks for storing governance events

use std::path::PathBuf;

use async_trait::async_trait;
use modegov_types::AuditEvent;
use parking_lot::RwLock;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use super::filter::AuditFilter;
use crate::error::Result;

/// Trait for audit sinks.
///
/// Sinks are append-only from the engine's perspective: events are never
/// edited or deleted.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append an event, returning it as stored.
    async fn append(&self, event: AuditEvent) -> Result<AuditEvent>;

    /// Query events matching a filter, oldest first.
    async fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditEvent>>;

    /// Total number of stored events.
    async fn count(&self) -> Result<u64>;
}

/// In-memory audit sink.
pub struct MemoryAuditSink {
    events: RwLock<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of all stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().clone()
    }
}

impl Default for MemoryAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, event: AuditEvent) -> Result<AuditEvent> {
        self.events.write().push(event.clone());
        Ok(event)
    }

    async fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditEvent>> {
        Ok(filter.apply(&self.events.read()))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.events.read().len() as u64)
    }
}

/// File-based audit sink with append-only JSON-lines writes.
pub struct FileAuditSink {
    path: PathBuf,
    count: RwLock<u64>,
}

impl FileAuditSink {
    /// Open a sink, counting any events already on disk.
    pub async fn new(path: PathBuf) -> Result<Self> {
        let count = if path.exists() {
            Self::read_events(&path).await?.len() as u64
        } else {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            0
        };

        debug!(path = %path.display(), existing = count, "opened audit log");

        Ok(Self {
            path,
            count: RwLock::new(count),
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn read_events(path: &PathBuf) -> Result<Vec<AuditEvent>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(path).await?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut events = Vec::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let event: AuditEvent = serde_json::from_str(&line)?;
            events.push(event);
        }

        Ok(events)
    }
}

#[async_trait]
impl AuditSink for FileAuditSink {
    async fn append(&self, event: AuditEvent) -> Result<AuditEvent> {
        let json = serde_json::to_string(&event)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(json.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;

        *self.count.write() += 1;
        Ok(event)
    }

    async fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditEvent>> {
        let events = Self::read_events(&self.path).await?;
        Ok(filter.apply(&events))
    }

    async fn count(&self) -> Result<u64> {
        Ok(*self.count.read())
    }
}

/// No-op sink for when audit persistence is disabled.
///
/// Always injected instead of an optional sink, so governance code never
/// branches on an absent backend.
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn append(&self, event: AuditEvent) -> Result<AuditEvent> {
        Ok(event)
    }

    async fn query(&self, _filter: &AuditFilter) -> Result<Vec<AuditEvent>> {
        Ok(Vec::new())
    }

    async fn count(&self) -> Result<u64> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modegov_types::EventType;

    fn changed_event(reason: &str) -> AuditEvent {
        AuditEvent::builder(EventType::ModeChanged).reason(reason).build()
    }

    #[tokio::test]
    async fn memory_sink_appends_and_counts() {
        let sink = MemoryAuditSink::new();
        sink.append(changed_event("one")).await.unwrap();
        sink.append(changed_event("two")).await.unwrap();

        assert_eq!(sink.count().await.unwrap(), 2);
        let results = sink.query(&AuditFilter::all()).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn memory_sink_query_respects_filter() {
        let sink = MemoryAuditSink::new();
        sink.append(changed_event("one")).await.unwrap();
        sink.append(
            AuditEvent::builder(EventType::PreflightOk).reason("ok").build(),
        )
        .await
        .unwrap();

        let filter = AuditFilter::all().event_types(vec![EventType::ModeChanged]);
        let results = sink.query(&filter).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].event_type, EventType::ModeChanged);
    }

    #[tokio::test]
    async fn file_sink_persists_across_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("audit.jsonl");

        {
            let sink = FileAuditSink::new(path.clone()).await.unwrap();
            sink.append(changed_event("one")).await.unwrap();
            sink.append(changed_event("two")).await.unwrap();
        }

        {
            let sink = FileAuditSink::new(path.clone()).await.unwrap();
            assert_eq!(sink.count().await.unwrap(), 2);

            sink.append(changed_event("three")).await.unwrap();
            assert_eq!(sink.count().await.unwrap(), 3);

            let events = sink.query(&AuditFilter::all()).await.unwrap();
            assert_eq!(events.len(), 3);
        }
    }

    #[tokio::test]
    async fn noop_sink_accepts_everything_and_stores_nothing() {
        let sink = NoopAuditSink;
        sink.append(changed_event("one")).await.unwrap();
        assert_eq!(sink.count().await.unwrap(), 0);
        assert!(sink.query(&AuditFilter::all()).await.unwrap().is_empty());
    }
}
