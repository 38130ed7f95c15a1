//! Audit infrastructure
//!
//! Events are appended by the governance engine and never edited or
//! deleted. Export produces the exact byte content that is hashed, so an
//! independent digest of the returned content reproduces the hash.

pub mod export;
pub mod filter;
pub mod sink;

pub use export::{AuditExport, AuditExporter};
pub use filter::AuditFilter;
pub use sink::{AuditSink, FileAuditSink, MemoryAuditSink, NoopAuditSink};
