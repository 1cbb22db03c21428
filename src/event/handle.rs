// ABOUTME: Live handle to an event that is still being recorded.
// ABOUTME: Provisioners stream deploy logs through it while the deploy runs.

use std::io::{self, Write};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;

use super::Event;
use crate::types::EventId;

type LogWriter = Box<dyn Write + Send>;

struct Inner {
    event: Mutex<Event>,
    writer: Mutex<Option<LogWriter>>,
}

/// Shared, cloneable handle to an in-flight event.
///
/// Log output is appended to the event itself and, when a log writer is
/// attached, forwarded to it.
#[derive(Clone)]
pub struct EventHandle {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for EventHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandle")
            .field("id", &self.inner.event.lock().unique_id)
            .finish()
    }
}

impl EventHandle {
    pub fn new(event: Event) -> Self {
        Self {
            inner: Arc::new(Inner {
                event: Mutex::new(event),
                writer: Mutex::new(None),
            }),
        }
    }

    pub fn id(&self) -> EventId {
        self.inner.event.lock().unique_id.clone()
    }

    /// Attach a writer that receives every log write, replacing any previous one.
    pub fn set_log_writer(&self, writer: LogWriter) {
        *self.inner.writer.lock() = Some(writer);
    }

    /// Detach the current log writer, if any.
    pub fn take_log_writer(&self) -> Option<LogWriter> {
        self.inner.writer.lock().take()
    }

    pub fn has_log_writer(&self) -> bool {
        self.inner.writer.lock().is_some()
    }

    /// Append raw log output to the event and the attached writer.
    pub fn write_log(&self, buf: &[u8]) -> io::Result<()> {
        self.inner
            .event
            .lock()
            .log
            .push_str(&String::from_utf8_lossy(buf));
        if let Some(writer) = self.inner.writer.lock().as_mut() {
            writer.write_all(buf)?;
        }
        Ok(())
    }

    /// A `Write` adapter over [`EventHandle::write_log`].
    pub fn log_writer(&self) -> EventLog<'_> {
        EventLog { handle: self }
    }

    pub fn set_start_data<T: Serialize>(&self, data: &T) -> serde_json::Result<()> {
        let value = serde_json::to_value(data)?;
        self.inner.event.lock().start_custom_data = Some(value);
        Ok(())
    }

    pub fn set_other_data<T: Serialize>(&self, data: &T) -> serde_json::Result<()> {
        let value = serde_json::to_value(data)?;
        self.inner.event.lock().other_custom_data = Some(value);
        Ok(())
    }

    /// Mark the event as finished now, with an optional error and end payload.
    pub fn finish<T: Serialize>(
        &self,
        error: Option<&str>,
        end_data: Option<&T>,
    ) -> serde_json::Result<()> {
        let end_value = end_data.map(serde_json::to_value).transpose()?;
        let mut event = self.inner.event.lock();
        event.end_time = Some(Utc::now());
        event.error = error.unwrap_or_default().to_string();
        if end_value.is_some() {
            event.end_custom_data = end_value;
        }
        Ok(())
    }

    /// A copy of the event as recorded so far.
    pub fn snapshot(&self) -> Event {
        self.inner.event.lock().clone()
    }
}

/// Borrowing `Write` adapter for an [`EventHandle`].
pub struct EventLog<'a> {
    handle: &'a EventHandle,
}

impl Write for EventLog<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.handle.write_log(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(writer) = self.handle.inner.writer.lock().as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}
