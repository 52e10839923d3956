//! A11y Analyzer - accessibility conformance report analysis.
//!
//! Parses VPAT/ACR documents (PDF, DOCX, HTML), rates every gap by severity
//! with a deterministic keyword heuristic, optionally reassesses it with an
//! AI classification backend, and summarizes the report.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod models;
pub mod parsers;
pub mod providers;
pub mod server;
pub mod severity;

pub use analysis::{AnalysisError, Analyzer, ProviderSelection};
pub use models::{AnalysisResult, Finding, Severity};
