//! Human-readable audit log of filesystem changes.
//!
//! The organizer and undo engine report through `tracing`. [`AuditLayer`]
//! turns those events into lines of the form
//! `[2024-08-15 09:30:00] INFO - File notes.txt moved to ...`
//! and appends them to a writer, normally `file_manager.log`.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// Default audit log file name, resolved against the working directory.
pub const DEFAULT_AUDIT_FILE: &str = "file_manager.log";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A tracing layer that writes one line per event.
pub struct AuditLayer<W: Write + Send + 'static> {
    writer: Mutex<W>,
}

impl<W: Write + Send + 'static> AuditLayer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<S, W> Layer<S> for AuditLayer<W>
where
    S: Subscriber,
    W: Write + Send + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let line = format_line(
            &chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            event.metadata().level(),
            &visitor.message,
        );

        // A failed audit write must never interrupt a file operation.
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.write_all(line.as_bytes());
            let _ = writer.flush();
        }
    }
}

fn format_line(timestamp: &str, level: &Level, message: &str) -> String {
    format!("[{}] {} - {}\n", timestamp, level, message)
}

/// Collects the `message` field plus any extra fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.message, " {}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.message, " {}={}", field.name(), value);
        }
    }
}

/// Installs a global subscriber appending audit lines to the file at `path`.
///
/// Events below `level` are discarded.
pub fn init_audit_log(path: &Path, level: Level) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let subscriber = tracing_subscriber::registry()
        .with(AuditLayer::new(file).with_filter(LevelFilter::from_level(level)));

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| io::Error::other(e.to_string()))
}
