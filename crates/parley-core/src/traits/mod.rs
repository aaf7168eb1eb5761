//! Core traits defined in `parley-core` and implemented by other crates.

pub mod audit_sink;

pub use audit_sink::{AuditAction, AuditEvent, AuditSink};
