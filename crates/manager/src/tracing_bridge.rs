//! crates/manager/src/tracing_bridge.rs
//! Bridge between the tracing crate and a [`LogManager`].
//!
//! [`ManagerLayer`] is a tracing-subscriber layer that turns events into log
//! records, so libraries instrumented with the standard tracing macros end up
//! in the same destinations as direct `write` calls.
//!
//! # Mapping
//!
//! | tracing | record |
//! |---|---|
//! | target | tag |
//! | `ERROR` / `WARN` / `INFO` / `DEBUG` / `TRACE` | Error / Warning / Info / Debug / Verbose |
//! | `message` field, then other fields as `name=value` | message |
//! | file, module path, line | location |
//!
//! Events emitted by this crate are skipped; they describe destination
//! failures and would loop back into the failing destination.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use manager::{LogManager, ManagerLayer};
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! let manager = Arc::new(LogManager::new());
//! let subscriber = tracing_subscriber::registry().with(ManagerLayer::new(Arc::clone(&manager)));
//! tracing::subscriber::with_default(subscriber, || {
//!     tracing::info!(target: "midi", port = 2, "opened");
//! });
//! ```

use std::fmt::{self, Write as _};
use std::sync::Arc;

use logging::{Location, LogRecord, Severity};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::manager::LogManager;

/// A tracing layer that forwards events to a [`LogManager`].
#[derive(Clone, Debug)]
pub struct ManagerLayer {
    manager: Arc<LogManager>,
}

impl ManagerLayer {
    /// Creates a layer feeding `manager`.
    #[must_use]
    pub const fn new(manager: Arc<LogManager>) -> Self {
        Self { manager }
    }

    /// Map a tracing level to a record severity.
    const fn level_to_severity(level: &Level) -> Severity {
        match *level {
            Level::ERROR => Severity::Error,
            Level::WARN => Severity::Warning,
            Level::INFO => Severity::Info,
            Level::DEBUG => Severity::Debug,
            Level::TRACE => Severity::Verbose,
        }
    }

    fn is_own_target(target: &str) -> bool {
        const OWN: &str = env!("CARGO_CRATE_NAME");
        target == OWN
            || target
                .strip_prefix(OWN)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

impl<S> Layer<S> for ManagerLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if Self::is_own_target(metadata.target()) || !self.manager.is_active() {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let location = Location::new(
            metadata.file().unwrap_or_default(),
            metadata.module_path().unwrap_or_default(),
            metadata.line().unwrap_or_default(),
        );
        let record = LogRecord::new(metadata.target(), visitor.finish())
            .with_level(Self::level_to_severity(metadata.level()))
            .with_location(location);
        self.manager.log(record);
    }
}

/// Visitor to extract the message and fields from a tracing event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.message);
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }
}
