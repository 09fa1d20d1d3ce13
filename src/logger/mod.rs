//! JSONL diagnostics log with graceful degradation.

pub mod jsonl;
