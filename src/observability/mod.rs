//! Observability subsystem for docward
//!
//! Provides:
//! - Structured logging (one JSON object per line, deterministic key order)
//! - Typed observable events
//! - Recorder collaborators consuming validation warnings and provisioning
//!   step outcomes
//!
//! # Principles
//!
//! 1. Observability is read-only; it never influences outcomes
//! 2. A recording failure never fails the operation being observed
//! 3. Synchronous, no background threads
//! 4. Deterministic output

mod events;
mod logger;
mod recorder;

pub use events::{EventKind, ObservedEvent};
pub use logger::{Logger, Severity};
pub use recorder::{FileRecorder, LogRecorder, MemoryRecorder, Recorder};
