//! Durable queue of results waiting to be delivered.
//!
//! The outbox is a JSON-lines log. Every change is appended and synced to
//! disk before the call returns. Loading replays the log:
//! pending = queued − delivered − rejected, in the order queued.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storage::dto::result::RecordResultRequest;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{JudgeError, Result};
use crate::retry::RetryPolicy;
use crate::sink::ResultSink;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum OutboxRecord {
    Queued {
        request: RecordResultRequest,
        queued_at: DateTime<Utc>,
    },
    Delivered {
        client_id: Uuid,
        result_id: Uuid,
        at: DateTime<Utc>,
    },
    Rejected {
        client_id: Uuid,
        reason: String,
        at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingResult {
    pub client_id: Uuid,
    pub request: RecordResultRequest,
    pub queued_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlushReport {
    pub delivered: usize,
    /// Already stored by the server from an earlier attempt.
    pub duplicates: usize,
    pub rejected: Vec<(Uuid, String)>,
    /// Entries still pending once the flush stopped.
    pub remaining: usize,
    /// Why the flush stopped early, if it did.
    pub stopped: Option<String>,
}

pub struct Outbox {
    path: PathBuf,
    file: File,
    pending: Vec<PendingResult>,
}

impl Outbox {
    /// Opens the outbox at `path`, creating it when missing.
    ///
    /// A torn final line, left by a write interrupted mid-way, is cut off.
    /// Damage anywhere else is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let (records, valid_len) = replay(&content)?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        if valid_len < content.len() {
            warn!(
                path = %path.display(),
                dropped_bytes = content.len() - valid_len,
                "Discarding torn record at the end of the outbox"
            );
            file.set_len(valid_len as u64)?;
            file.sync_data()?;
        } else if !content.is_empty() && !content.ends_with('\n') {
            (&file).write_all(b"\n")?;
            file.sync_data()?;
        }

        let mut outbox = Self {
            path,
            file,
            pending: Vec::new(),
        };
        for record in records {
            outbox.apply(record);
        }

        debug!(
            path = %outbox.path.display(),
            pending = outbox.pending.len(),
            "Outbox loaded"
        );
        Ok(outbox)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pending(&self) -> &[PendingResult] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queues a result. A client id is generated when the request has none;
    /// the id is what lets the server recognise a resend.
    pub fn enqueue(&mut self, mut request: RecordResultRequest) -> Result<Uuid> {
        let client_id = *request.client_id.get_or_insert_with(Uuid::new_v4);

        if self.pending.iter().any(|p| p.client_id == client_id) {
            return Err(JudgeError::ValidationError(format!(
                "result {client_id} is already queued"
            )));
        }

        self.append(OutboxRecord::Queued {
            request,
            queued_at: Utc::now(),
        })?;

        info!(%client_id, "Result queued");
        Ok(client_id)
    }

    pub fn mark_delivered(&mut self, client_id: Uuid, result_id: Uuid) -> Result<()> {
        self.append(OutboxRecord::Delivered {
            client_id,
            result_id,
            at: Utc::now(),
        })
    }

    pub fn mark_rejected(&mut self, client_id: Uuid, reason: &str) -> Result<()> {
        self.append(OutboxRecord::Rejected {
            client_id,
            reason: reason.to_string(),
            at: Utc::now(),
        })
    }

    /// Sends pending entries in queue order.
    ///
    /// Entries the API refuses are marked rejected and skipped. The flush
    /// stops at the first entry whose retries run out, or when the API
    /// refuses the key, leaving that entry and everything after it pending.
    pub async fn flush<S>(&mut self, sink: &S, policy: &RetryPolicy) -> Result<FlushReport>
    where
        S: ResultSink + ?Sized,
    {
        let mut report = FlushReport::default();
        let queue = self.pending.clone();

        for entry in queue {
            match policy.run(|| sink.submit(&entry.request)).await {
                Ok(response) => {
                    self.mark_delivered(entry.client_id, response.result.result_id)?;
                    if response.duplicate {
                        report.duplicates += 1;
                    } else {
                        report.delivered += 1;
                    }
                }
                Err(e) if e.is_auth_failure() => {
                    warn!(client_id = %entry.client_id, error = %e, "API key refused, nothing marked");
                    report.stopped = Some(e.to_string());
                    break;
                }
                Err(e) if !e.is_retryable() => {
                    let reason = e.to_string();
                    warn!(client_id = %entry.client_id, %reason, "Result rejected");
                    self.mark_rejected(entry.client_id, &reason)?;
                    report.rejected.push((entry.client_id, reason));
                }
                Err(e) => {
                    warn!(client_id = %entry.client_id, error = %e, "Giving up for now");
                    report.stopped = Some(e.to_string());
                    break;
                }
            }
        }

        report.remaining = self.pending.len();
        info!(
            delivered = report.delivered,
            duplicates = report.duplicates,
            rejected = report.rejected.len(),
            remaining = report.remaining,
            "Outbox flushed"
        );
        Ok(report)
    }

    /// Rewrites the log so it holds only the pending entries. The new file
    /// replaces the old one atomically. Returns the number of lines dropped.
    pub fn compact(&mut self) -> Result<usize> {
        let before = fs::read_to_string(&self.path)?.lines().count();
        let tmp_path = self.path.with_extension("compact.tmp");

        {
            let tmp = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(&tmp);
            for entry in &self.pending {
                let record = OutboxRecord::Queued {
                    request: entry.request.clone(),
                    queued_at: entry.queued_at,
                };
                serde_json::to_writer(&mut writer, &record)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
            drop(writer);
            tmp.sync_all()?;
        }

        fs::rename(&tmp_path, &self.path)?;
        self.file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)?;

        let dropped = before.saturating_sub(self.pending.len());
        info!(path = %self.path.display(), dropped, kept = self.pending.len(), "Outbox compacted");
        Ok(dropped)
    }

    fn append(&mut self, record: OutboxRecord) -> Result<()> {
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        self.file.write_all(&line)?;
        self.file.sync_data()?;

        self.apply(record);
        Ok(())
    }

    fn apply(&mut self, record: OutboxRecord) {
        match record {
            OutboxRecord::Queued { request, queued_at } => {
                let Some(client_id) = request.client_id else {
                    warn!("Skipping queued record without a client id");
                    return;
                };
                if self.pending.iter().all(|p| p.client_id != client_id) {
                    self.pending.push(PendingResult {
                        client_id,
                        request,
                        queued_at,
                    });
                }
            }
            OutboxRecord::Delivered { client_id, .. } | OutboxRecord::Rejected { client_id, .. } => {
                self.pending.retain(|p| p.client_id != client_id);
            }
        }
    }
}

/// Parses the log. Returns the records and the length of the intact prefix.
fn replay(content: &str) -> Result<(Vec<OutboxRecord>, usize)> {
    let mut records = Vec::new();
    let mut offset = 0;

    for (index, line) in content.split_inclusive('\n').enumerate() {
        let complete = line.ends_with('\n');
        let text = line.trim();

        if text.is_empty() {
            offset += line.len();
            continue;
        }

        match serde_json::from_str::<OutboxRecord>(text) {
            Ok(record) => {
                records.push(record);
                offset += line.len();
            }
            Err(_) if !complete => return Ok((records, offset)),
            Err(e) => {
                warn!(line = index + 1, error = %e, "Corrupt outbox record");
                return Err(e.into());
            }
        }
    }

    Ok((records, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use storage::dto::result::RecordResultResponse;
    use storage::models::{AthleteResult, ResultStatus};

    /// In-memory API: stores by client id, refuses listed athletes with 400,
    /// fails every call with 503 while `down` is set and with 401 while
    /// `unauthorized` is set.
    #[derive(Default)]
    struct FakeSink {
        stored: Mutex<HashMap<Uuid, Uuid>>,
        calls: Mutex<Vec<Uuid>>,
        refused_athletes: HashSet<Uuid>,
        down: bool,
        unauthorized: bool,
    }

    #[async_trait]
    impl ResultSink for FakeSink {
        async fn submit(&self, request: &RecordResultRequest) -> Result<RecordResultResponse> {
            let client_id = request.client_id.unwrap();
            self.calls.lock().unwrap().push(client_id);

            if self.unauthorized {
                return Err(JudgeError::ApiError {
                    status: 401,
                    message: "Invalid API key".to_string(),
                });
            }
            if self.down {
                return Err(JudgeError::ApiError {
                    status: 503,
                    message: "Service Unavailable".to_string(),
                });
            }
            if self.refused_athletes.contains(&request.athlete_id) {
                return Err(JudgeError::ApiError {
                    status: 400,
                    message: "Invalid result".to_string(),
                });
            }

            let mut stored = self.stored.lock().unwrap();
            let duplicate = stored.contains_key(&client_id);
            let result_id = *stored.entry(client_id).or_insert_with(Uuid::new_v4);

            Ok(RecordResultResponse {
                result: AthleteResult {
                    result_id,
                    client_id,
                    athlete_id: request.athlete_id,
                    competition_id: request.competition_id,
                    value: request.value.parse().unwrap_or_default(),
                    status: request.status,
                    notes: request.notes.clone(),
                    judge_id: Some("judge-1".to_string()),
                    recorded_at: NaiveDate::from_ymd_opt(2025, 6, 14)
                        .unwrap()
                        .and_hms_opt(10, 0, 0)
                        .unwrap(),
                },
                superseded: false,
                duplicate,
            })
        }
    }

    fn request(athlete_id: Uuid, value: &str) -> RecordResultRequest {
        RecordResultRequest {
            athlete_id,
            competition_id: Uuid::from_u128(99),
            value: value.to_string(),
            status: ResultStatus::Active,
            notes: None,
            client_id: None,
        }
    }

    fn quick() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            base_ms: 1,
            max_ms: 1,
        }
    }

    #[test]
    fn test_pending_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outbox.jsonl");

        let (first, second) = {
            let mut outbox = Outbox::open(&path).unwrap();
            let first = outbox.enqueue(request(Uuid::from_u128(1), "95")).unwrap();
            let second = outbox.enqueue(request(Uuid::from_u128(2), "92")).unwrap();
            outbox.mark_delivered(first, Uuid::new_v4()).unwrap();
            (first, second)
        };

        let outbox = Outbox::open(&path).unwrap();
        let pending: Vec<Uuid> = outbox.pending().iter().map(|p| p.client_id).collect();
        assert_eq!(pending, vec![second]);
        assert_ne!(first, second);
        assert_eq!(outbox.pending()[0].request.value, "92");
    }

    #[test]
    fn test_keeps_client_supplied_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut outbox = Outbox::open(dir.path().join("outbox.jsonl")).unwrap();

        let mut req = request(Uuid::from_u128(1), "10");
        let id = Uuid::from_u128(42);
        req.client_id = Some(id);

        assert_eq!(outbox.enqueue(req.clone()).unwrap(), id);
        assert!(matches!(
            outbox.enqueue(req),
            Err(JudgeError::ValidationError(_))
        ));
        assert_eq!(outbox.pending().len(), 1);
    }

    #[test]
    fn test_torn_last_line_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outbox.jsonl");

        {
            let mut outbox = Outbox::open(&path).unwrap();
            outbox.enqueue(request(Uuid::from_u128(1), "95")).unwrap();
        }
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(br#"{"record":"queued","request":{"athl"#).unwrap();
        drop(file);

        let mut outbox = Outbox::open(&path).unwrap();
        assert_eq!(outbox.pending().len(), 1);

        outbox.enqueue(request(Uuid::from_u128(2), "92")).unwrap();
        let outbox = Outbox::open(&path).unwrap();
        assert_eq!(outbox.pending().len(), 2);
    }

    #[test]
    fn test_corrupt_middle_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outbox.jsonl");
        fs::write(&path, "not json\n{}\n").unwrap();

        assert!(matches!(Outbox::open(&path), Err(JudgeError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_flush_delivers_in_order_and_never_resends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outbox.jsonl");
        let sink = FakeSink::default();

        let mut outbox = Outbox::open(&path).unwrap();
        let a = outbox.enqueue(request(Uuid::from_u128(1), "95")).unwrap();
        let b = outbox.enqueue(request(Uuid::from_u128(2), "92")).unwrap();

        let report = outbox.flush(&sink, &quick()).await.unwrap();
        assert_eq!(report.delivered, 2);
        assert_eq!(report.remaining, 0);
        assert_eq!(report.stopped, None);
        assert_eq!(*sink.calls.lock().unwrap(), vec![a, b]);

        let mut reloaded = Outbox::open(&path).unwrap();
        assert!(reloaded.is_empty());
        reloaded.flush(&sink, &quick()).await.unwrap();
        assert_eq!(sink.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_client_error_rejects_entry_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let refused = Uuid::from_u128(1);
        let sink = FakeSink {
            refused_athletes: HashSet::from([refused]),
            ..Default::default()
        };

        let mut outbox = Outbox::open(dir.path().join("outbox.jsonl")).unwrap();
        let bad = outbox.enqueue(request(refused, "-3")).unwrap();
        outbox.enqueue(request(Uuid::from_u128(2), "92")).unwrap();

        let report = outbox.flush(&sink, &quick()).await.unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, bad);
        assert!(outbox.is_empty());
        // one call each: a 400 is not retried
        assert_eq!(sink.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_api_keeps_everything_pending() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FakeSink {
            down: true,
            ..Default::default()
        };

        let mut outbox = Outbox::open(dir.path().join("outbox.jsonl")).unwrap();
        outbox.enqueue(request(Uuid::from_u128(1), "95")).unwrap();
        outbox.enqueue(request(Uuid::from_u128(2), "92")).unwrap();

        let report = outbox.flush(&sink, &quick()).await.unwrap();
        assert_eq!(report.delivered, 0);
        assert_eq!(report.remaining, 2);
        assert!(report.stopped.is_some());
        // stops at the first exhausted entry
        assert_eq!(sink.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_refused_key_keeps_everything_pending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outbox.jsonl");
        let sink = FakeSink {
            unauthorized: true,
            ..Default::default()
        };

        let mut outbox = Outbox::open(&path).unwrap();
        for athlete in 1..=3 {
            outbox.enqueue(request(Uuid::from_u128(athlete), "95")).unwrap();
        }

        let report = outbox.flush(&sink, &quick()).await.unwrap();
        assert!(report.rejected.is_empty());
        assert_eq!(report.remaining, 3);
        assert!(report.stopped.as_deref().unwrap().contains("401"));
        // a refused key is not retried and later entries are not tried
        assert_eq!(sink.calls.lock().unwrap().len(), 1);

        assert_eq!(outbox.compact().unwrap(), 0);
        assert_eq!(Outbox::open(&path).unwrap().pending().len(), 3);
    }

    #[tokio::test]
    async fn test_resend_after_lost_ack_is_a_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FakeSink::default();

        let mut outbox = Outbox::open(dir.path().join("outbox.jsonl")).unwrap();
        let id = outbox.enqueue(request(Uuid::from_u128(1), "95")).unwrap();
        let req = outbox.pending()[0].request.clone();

        // the server stored it but the response never arrived
        sink.submit(&req).await.unwrap();

        let report = outbox.flush(&sink, &quick()).await.unwrap();
        assert_eq!(report.duplicates, 1);
        assert_eq!(sink.stored.lock().unwrap().len(), 1);
        assert!(sink.stored.lock().unwrap().contains_key(&id));
    }

    #[test]
    fn test_compact_keeps_only_pending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outbox.jsonl");

        let mut outbox = Outbox::open(&path).unwrap();
        let a = outbox.enqueue(request(Uuid::from_u128(1), "95")).unwrap();
        let b = outbox.enqueue(request(Uuid::from_u128(2), "92")).unwrap();
        outbox.mark_rejected(a, "Invalid result").unwrap();

        assert_eq!(outbox.compact().unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 1);

        outbox.enqueue(request(Uuid::from_u128(3), "87")).unwrap();
        let reloaded = Outbox::open(&path).unwrap();
        let pending: Vec<Uuid> = reloaded.pending().iter().map(|p| p.client_id).collect();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0], b);
    }
}
