//! Crate-wide error taxonomy.
//!
//! Three failure families exist and they are deliberately kept apart:
//! - fatal input errors (malformed formula text, unparsable labels,
//!   broken snapshot documents) abort the whole run;
//! - resolution misses ([`TracebackError`]) abandon only the current unit
//!   of work and are reported by the caller at warning level;
//! - per-flavor sheet errors (index collisions, too-short indices) kill one
//!   manifest flavor while the others may still render.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error reading or writing \"{file}\": {source}")]
    FileIo {
        file: String,
        source: std::io::Error,
    },

    #[error("Could not parse snapshot \"{file}\": {source}")]
    Snapshot {
        file: String,
        source: serde_json::Error,
    },

    #[error("Formula \"{formula}\" could not be parsed: {reason}")]
    Formula { formula: String, reason: String },

    #[error("Could not evaluate \"{expr}\": {reason}")]
    Eval { expr: String, reason: String },

    #[error("Concentration units '{0}' not recognized")]
    UnknownUnits(String),

    #[error("Size not provided for conversion between mass and molarity")]
    MissingSize,

    #[error("Could not parse index from '{0}'")]
    UnknownLabel(String),

    #[error("NoIndex cases not allowed")]
    NoIndexLabel,

    #[error("Identical indices detected between '{sample_a}' and '{sample_b}' in lane {lane}")]
    IdenticalIndices {
        sample_a: String,
        sample_b: String,
        lane: String,
    },

    #[error("Could not generate {flavor} manifest: {reason}")]
    Sheet { flavor: String, reason: String },

    #[error("Samplesheet validation failed: {0}")]
    SheetConstraint(String),

    #[error("Step is missing required field '{0}'")]
    MissingStepField(String),

    #[error("Snapshot references unknown {kind} id '{id}'")]
    DanglingRef { kind: &'static str, id: String },

    #[error("{0}")]
    Invalid(String),
}

/// Why a recursive UDF lookup came up empty.
///
/// None of these are fatal on their own: the formula engine logs them and
/// moves on to the next input/output pairing.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TracebackError {
    #[error("artifact '{0}' has no parent step linked and can't be traced back further")]
    ChainExhausted(String),

    #[error("parent step has no input artifacts linked to the output artifact, can't traceback")]
    NoLinkedInput,

    #[error("parent step has multiple input artifacts linked to the same output artifact, can't traceback")]
    AmbiguousLink,

    #[error("traceback exceeded {0} hops, assuming a malformed processing history")]
    HopLimit(usize),
}

impl Error {
    /// Attach a file name to an I/O error.
    pub fn io(file: impl fmt::Display, source: std::io::Error) -> Self {
        Error::FileIo {
            file: file.to_string(),
            source,
        }
    }
}
