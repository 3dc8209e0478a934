//! Diagnostic creation, severity management, and terminal rendering.
//!
//! Timing passes report everything user-visible through structured
//! [`Diagnostic`] messages: informational notes (target frequency, checksum,
//! verbose budget listings) and warnings (negative budgets, unreachable
//! combinational outputs). The thread-safe [`DiagnosticSink`] accumulates them
//! and [`TerminalRenderer`] formats them for a terminal.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
