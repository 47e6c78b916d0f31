//! Provides a [`tracing_subscriber::Layer`] ([`LoggerLayer`]) forwarding [`tracing`] events to a
//! [`Logger`].

use std::{fmt, sync::Arc};

use tracing::{
    field::{Field, Visit},
    Event, Subscriber,
};
use tracing_subscriber::{layer::Context, registry::LookupSpan, Layer};

use crate::{Level, Location, Logger};

const MESSAGE: &str = "message";

/// Function name used for events emitted outside of any span.
const NO_SPAN: &str = "?";

/// A [`tracing_subscriber::Layer`] writing every event through a [`Logger`], so that log lines
/// from libraries instrumented with [`tracing`] land in the same rotated file.
///
/// The event's source file and line become the record's location, and the name of the
/// innermost entered span stands in for the function name. Fields other than the message are
/// appended as `key=value` pairs.
///
/// ```
/// use std::sync::Arc;
///
/// use rolling_logger::{Logger, LoggerLayer, Options};
/// use tracing_subscriber::layer::SubscriberExt;
///
/// let logger = Arc::new(Logger::without_file(Options::default()));
/// let subscriber = tracing_subscriber::registry().with(LoggerLayer::new(logger));
/// tracing::subscriber::with_default(subscriber, || {
///     tracing::info!(attempt = 3, "reconnecting");
/// });
/// ```
#[derive(Clone, Debug)]
pub struct LoggerLayer {
    logger: Arc<Logger>,
}

impl LoggerLayer {
    /// Creates a layer writing to `logger`.
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for LoggerLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Level::from(*metadata.level());
        if level < self.logger.level() {
            return;
        }

        let function = ctx
            .lookup_current()
            .map_or(NO_SPAN, |span| span.name());
        let location = Location::new(
            metadata.file().unwrap_or(metadata.target()),
            function,
            metadata.line().unwrap_or_default(),
        );

        let mut fields = EventFields::default();
        event.record(&mut fields);
        self.logger.emit(level, location, &fields.render());
    }
}

/// The message and the remaining key-value fields of one event.
#[derive(Debug, Default)]
struct EventFields {
    message: Option<String>,
    values: Vec<(&'static str, String)>,
}

impl EventFields {
    fn record_value(&mut self, name: &'static str, value: String) {
        match name {
            // Skip fields which are already handled
            name if name.starts_with("log.") => (),
            name => {
                let name = name.strip_prefix("r#").unwrap_or(name);
                self.values.push((name, value));
            }
        }
    }

    fn render(self) -> String {
        let mut rendered = self.message.unwrap_or_default();
        for (name, value) in self.values {
            if !rendered.is_empty() {
                rendered.push(' ');
            }
            rendered.push_str(name);
            rendered.push('=');
            rendered.push_str(&value);
        }
        rendered
    }
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == MESSAGE {
            self.message = Some(value.to_string());
        } else {
            self.record_value(field.name(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == MESSAGE {
            if self.message.is_none() {
                // Only use debug if `record_str()` hasn't set it
                self.message = Some(format!("{value:?}"));
            }
        } else {
            self.record_value(field.name(), format!("{value:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;
    use crate::Options;

    fn capture(level: Level, emit: impl FnOnce()) -> Vec<String> {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("bridge.log");
        let logger = Arc::new(
            Logger::open(
                &path,
                Options {
                    log_level: level,
                    console_disabled: true,
                    ..Options::default()
                },
            )
            .expect("failed to open logger"),
        );

        let subscriber =
            tracing_subscriber::registry().with(LoggerLayer::new(Arc::clone(&logger)));
        tracing::subscriber::with_default(subscriber, emit);
        logger.close().expect("close failed");

        std::fs::read_to_string(&path)
            .expect("log file should be readable")
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn events_are_written_with_fields_and_span_name() {
        let lines = capture(Level::Info, || {
            let span = tracing::info_span!("checkout");
            let _entered = span.enter();
            tracing::warn!(order_id = 42, r#type = "card", "payment declined");
        });

        assert_eq!(lines.len(), 1);
        let line = lines.first().expect("one line expected");
        assert!(line.contains("[WARN]"), "unexpected line: {line}");
        assert!(line.contains("layer.rs:"), "unexpected line: {line}");
        assert!(line.contains(" checkout()>"), "unexpected line: {line}");
        assert!(
            line.ends_with("payment declined order_id=42 type=card"),
            "unexpected line: {line}"
        );
    }

    #[test]
    fn events_below_the_logger_level_are_dropped() {
        let lines = capture(Level::Warn, || {
            tracing::debug!("noise");
            tracing::info!("still noise");
            tracing::error!(code = 7, "broken");
        });

        assert_eq!(lines.len(), 1);
        let line = lines.first().expect("one line expected");
        assert!(line.contains("[ERROR]"));
        assert!(line.contains(" ?()> broken code=7"));
    }
}
