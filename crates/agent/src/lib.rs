//! The optional AI summary collaborator.
//!
//! Everything here degrades deterministically: with no client configured,
//! or when the client errors or times out, callers get the same canned
//! fallback sentence the UI would otherwise show. The heuristics in
//! `pricedrop-core` never depend on this crate.

pub mod summarizer;

pub use summarizer::{SummaryClient, SummaryOutcome, SummaryRuntime, FALLBACK_SUMMARY};
