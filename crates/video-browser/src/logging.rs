//! Tracing layer that feeds the in-app log panel.
//!
//! The terminal is owned by the TUI, so events are formatted into single
//! lines and sent over a channel instead of being written to stdout.

use crossbeam_channel::{Receiver, Sender, unbounded};
use time::{OffsetDateTime, UtcOffset};
use tracing::{Level, Subscriber};
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub(crate) struct ChannelLayer {
    tx: Sender<String>,
    offset: UtcOffset,
}

impl ChannelLayer {
    /// `offset` is applied to every timestamp; resolve it before spawning threads.
    pub(crate) fn new(tx: Sender<String>, offset: UtcOffset) -> Self {
        Self { tx, offset }
    }
}

fn format_line(at: OffsetDateTime, level: &Level, message: &str) -> String {
    format!(
        "{:02}:{:02}:{:02} {:>5} {}",
        at.hour(),
        at.minute(),
        at.second(),
        level,
        message
    )
}

impl<S> Layer<S> for ChannelLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let mut message = visitor.message.unwrap_or_else(|| "log event".to_string());
        if !visitor.fields.is_empty() {
            message = format!("{message} {}", visitor.fields.join(" "));
        }
        let now = OffsetDateTime::now_utc().to_offset(self.offset);
        let _ = self
            .tx
            .send(format_line(now, event.metadata().level(), &message));
    }
}

#[derive(Default)]
struct LineVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let formatted = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(formatted.trim_matches('"').to_string());
        } else {
            self.fields.push(format!("{}={}", field.name(), formatted));
        }
    }
}

/// Install the global subscriber and return the receiving end for the UI.
pub(crate) fn init() -> Receiver<String> {
    let (tx, rx) = unbounded();
    // The local offset can only be read while the process is single-threaded.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,video_browser=info")
        }))
        .with(ChannelLayer::new(tx, offset))
        .init();
    rx
}
