// ABOUTME: Deploy log fan-out to the caller's output and the app's log sink.
// ABOUTME: App log writes never block; a background task drains them into the sink.

use std::io::{self, Write};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

use crate::event::EventHandle;
use crate::store::StoreError;

/// Source tag for log lines emitted while deploying.
pub const DEPLOY_LOG_SOURCE: &str = "deploy";

/// A single line of application log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub app: String,
    pub message: String,
    pub source: String,
    pub date: DateTime<Utc>,
}

/// Destination for application logs.
#[async_trait]
pub trait AppLogSink: Send + Sync {
    async fn add_log(&self, entry: LogEntry) -> Result<(), StoreError>;
}

/// Collects log entries in memory.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogSink {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl AppLogSink for MemoryLogSink {
    async fn add_log(&self, entry: LogEntry) -> Result<(), StoreError> {
        self.entries.lock().push(entry);
        Ok(())
    }
}

/// Discards log output. Used when no app log sink is configured.
#[derive(Debug, Default)]
pub struct NullLogSink;

#[async_trait]
impl AppLogSink for NullLogSink {
    async fn add_log(&self, _entry: LogEntry) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Non-blocking writer that queues each write as an app log entry.
#[derive(Debug, Clone)]
pub struct AppLogWriter {
    app: String,
    tx: UnboundedSender<LogEntry>,
}

/// Background task draining an [`AppLogWriter`] channel into a sink.
#[derive(Debug)]
pub struct LogPump {
    task: JoinHandle<()>,
}

impl LogPump {
    /// Wait until every queued entry reached the sink. Completes once all
    /// writers feeding this pump have been dropped.
    pub async fn finish(self) {
        if let Err(e) = self.task.await {
            tracing::warn!("app log pump stopped abnormally: {}", e);
        }
    }
}

/// Create a writer for `app` and the pump that forwards its output to `sink`.
///
/// Must be called from within a tokio runtime.
pub fn app_log_channel(app: &str, sink: Arc<dyn AppLogSink>) -> (AppLogWriter, LogPump) {
    let (tx, mut rx) = unbounded_channel::<LogEntry>();
    let task = tokio::spawn(async move {
        while let Some(entry) = rx.recv().await {
            if let Err(e) = sink.add_log(entry).await {
                tracing::warn!("failed to store app log entry: {}", e);
            }
        }
    });
    (
        AppLogWriter {
            app: app.to_string(),
            tx,
        },
        LogPump { task },
    )
}

impl Write for AppLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let message = String::from_utf8_lossy(buf);
        let message = message.trim_end_matches(['\r', '\n']);
        if !message.is_empty() {
            let entry = LogEntry {
                app: self.app.clone(),
                message: message.to_string(),
                source: DEPLOY_LOG_SOURCE.to_string(),
                date: Utc::now(),
            };
            if self.tx.send(entry).is_err() {
                tracing::debug!("app log channel closed, dropping log entry");
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Wraps a writer and swallows its errors, so a broken client connection
/// cannot fail the deploy.
pub struct NoErrorWriter<W> {
    inner: W,
}

impl<W: Write> NoErrorWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for NoErrorWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Err(e) = self.inner.write_all(buf) {
            tracing::debug!("ignoring output write error: {}", e);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = self.inner.flush();
        Ok(())
    }
}

/// Copies every write to the caller's output (errors ignored) and the app log.
pub struct FanOutWriter {
    output: Option<NoErrorWriter<Box<dyn Write + Send>>>,
    app: AppLogWriter,
}

impl FanOutWriter {
    pub fn new(output: Option<Box<dyn Write + Send>>, app: AppLogWriter) -> Self {
        Self {
            output: output.map(NoErrorWriter::new),
            app,
        }
    }
}

impl Write for FanOutWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(output) = self.output.as_mut() {
            output.write(buf)?;
        }
        self.app.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(output) = self.output.as_mut() {
            output.flush()?;
        }
        self.app.flush()
    }
}

/// Log fan-out attached to an event for the duration of a deploy.
///
/// Dropping the attachment detaches the writer from the event, which closes
/// the app log channel; [`LogAttachment::close`] additionally waits for the
/// queued entries to be stored.
pub struct LogAttachment {
    event: EventHandle,
    pump: Option<LogPump>,
}

impl LogAttachment {
    pub fn attach(
        event: &EventHandle,
        app: &str,
        output: Option<Box<dyn Write + Send>>,
        sink: Arc<dyn AppLogSink>,
    ) -> Self {
        let (writer, pump) = app_log_channel(app, sink);
        event.set_log_writer(Box::new(FanOutWriter::new(output, writer)));
        Self {
            event: event.clone(),
            pump: Some(pump),
        }
    }

    pub async fn close(mut self) {
        drop(self.event.take_log_writer());
        if let Some(pump) = self.pump.take() {
            pump.finish().await;
        }
    }
}

impl Drop for LogAttachment {
    fn drop(&mut self) {
        drop(self.event.take_log_writer());
    }
}
