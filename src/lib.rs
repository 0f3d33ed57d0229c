#![forbid(unsafe_code)]
//! # crimper
//!
//! Strongly-typed core for LIMS EPP automations ("External Program
//! Plugins"): the small scripts a lab information system triggers from
//! buttons and workflow hooks. Each operation reads a **step snapshot**
//! (the object graph one step touches, as JSON), performs a narrow task
//! and writes its results back: UDF values into the snapshot, file
//! artifacts next to it.
//!
//! ## Highlights
//! - 🧮 **Formula engine**: spreadsheet-like UDF formulas with priority
//!   placeholders, recursive history lookups and a dedicated
//!   recursive-descent evaluator (no general-purpose eval anywhere).
//! - 🧬 **Index reconciliation**: reagent labels expand through static
//!   kit reference tables into literal index sequences, validated by
//!   pairwise edit distance before any samplesheet is rendered.
//! - 📄 **Instrument sheets**: run-manifest flavors (untrimmed, trimmed,
//!   PhiX-only, empty) bundled as a zip, nanopore samplesheets, ZPL
//!   barcode-label streams.
//!
//! ## Example
//! ```rust
//! // Expand a dual-index kit label and check two inline indices:
//! let idxs = crimper::indexes::expand_label("SI-TT-A1").unwrap();
//! assert_eq!(idxs.len(), 1);
//! assert_eq!(crimper::distance::edit_distance("ACGTACGT", "ACGTACGA"), 1);
//! // Evaluate a formula right-hand side:
//! let v = crimper::arith::eval("ng_ul(10, 'ng/ul', 300) * 5").unwrap();
//! assert_eq!(v, crimper::arith::Value::Num(50.0));
//! ```

pub mod arith;
pub mod distance;
pub mod epplog;
pub mod errors;
pub mod formula;
pub mod indexes;
pub mod manifest;
pub mod minknow;
pub mod model;
pub mod ops;
pub mod placement;
pub mod traceback;
pub mod units;
pub mod zebra;
pub mod data {
    pub mod ont;
    pub mod phix;
    pub mod smartseq;
    pub mod tenx;
}

pub use errors::{Error, Result};
pub use model::{Snapshot, UdfValue};

/// Crate version string (from `CARGO_PKG_VERSION`).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod api_tests {
    use super::*;

    #[test]
    fn snapshot_round_trips_through_json() {
        let snap = model::test_support::snapshot_with_pair();
        let text = serde_json::to_string(&snap).unwrap();
        let back = Snapshot::from_reader(text.as_bytes()).unwrap();
        assert_eq!(back.step.id, snap.step.id);
        assert_eq!(back.artifacts.len(), snap.artifacts.len());
    }
}
