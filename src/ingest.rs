//! JSON-lines record ingestion.
//!
//! Each non-blank line is decoded into a [`Message`] and sent down an mpsc
//! channel. Lines that fail to decode are logged and skipped; they never stop
//! the stream.

use anyhow::Context;
use rvsnoop_core::Message;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

/// Bound on records in flight between the reader and the classifier.
pub const CHANNEL_CAPACITY: usize = 1024;

/// Totals reported once the input is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub records: usize,
    pub skipped: usize,
}

/// Decode one line. `None` for blank lines.
pub fn parse_line(line: &str) -> Option<serde_json::Result<Message>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(serde_json::from_str(line))
}

/// Read `reader` to the end, forwarding every decodable record to `tx`.
///
/// Stops early, without error, if the receiving side hangs up.
pub async fn read_records<R>(reader: R, tx: mpsc::Sender<Message>) -> anyhow::Result<IngestStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = IngestStats::default();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await.context("reading record input")? {
        line_no += 1;
        match parse_line(&line) {
            None => {}
            Some(Ok(record)) => {
                stats.records += 1;
                if tx.send(record).await.is_err() {
                    tracing::debug!(line = line_no, "classifier hung up; stopping ingest");
                    break;
                }
            }
            Some(Err(e)) => {
                stats.skipped += 1;
                tracing::warn!(line = line_no, error = %e, "skipping malformed record");
            }
        }
    }

    Ok(stats)
}
