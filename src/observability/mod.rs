//! Observability for recordfs
//!
//! Structured JSON logging of typed events. Logging is read-only with
//! respect to the store: it never changes the outcome of an operation.
//!
//! ```ignore
//! use recordfs::observability::{Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Trace);
//! Logger::info(Event::DatabaseOpen, &[("root", "./Database")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
