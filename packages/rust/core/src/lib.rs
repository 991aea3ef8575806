//! End-to-end analysis pipeline for PageLens.
//!
//! Wires the extractor, summarizer, enrichment orchestrator, and report
//! renderer into a single [`pipeline::analyze`] operation driven by an
//! [`pipeline::AnalysisEngine`].

pub mod pipeline;

pub use pipeline::{Analysis, AnalysisEngine, ProgressReporter, SilentProgress, analyze};
