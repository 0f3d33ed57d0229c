//! Recursive UDF resolution through a sample's processing history.
//!
//! Starting from an artifact, walk backward by following the unique input
//! linked to it as the output of its parent step, checking the requested
//! UDF name(s) at every hop. The walk stops at the first hop where one of
//! the names is defined, or fails with a [`TracebackError`] describing why
//! the chain ended.
//!
//! Well-formed history is a DAG, but a malformed snapshot must not hang a
//! run: the walk is bounded by [`MAX_HOPS`] and a visited set.

use log::{info, warn};

use crate::errors::{Result, TracebackError};
use crate::model::{Artifact, Snapshot, UdfValue};

/// Safety bound on chain length; real processing histories are far shorter.
pub const MAX_HOPS: usize = 64;

/// A successful recursive lookup.
#[derive(Clone, Debug)]
pub struct Found {
    /// Which of the requested names resolved.
    pub name: String,
    pub value: UdfValue,
    /// Artifact the value was found on.
    pub artifact_id: String,
    pub artifact_name: String,
    /// Step that produced that artifact, if any.
    pub step_name: Option<String>,
    /// 0 = the starting artifact itself.
    pub hops: usize,
}

/// Recursively look for the first defined UDF out of `names`.
///
/// With `include_current` false, hop 0 is traversed but not read, so the
/// result is the last value recorded *before* the current artifact.
pub fn fetch_last(
    snapshot: &Snapshot,
    start: &Artifact,
    names: &[&str],
    include_current: bool,
) -> std::result::Result<Found, TracebackError> {
    let mut current = start;
    let mut visited: Vec<String> = Vec::new();

    for hop in 0.. {
        if hop >= MAX_HOPS || visited.contains(&current.id) {
            return Err(TracebackError::HopLimit(MAX_HOPS));
        }
        visited.push(current.id.clone());

        let parent = current
            .parent_step
            .as_deref()
            .and_then(|id| snapshot.historic_step(id));

        if hop == 0 && !include_current {
            info!(
                "Target UDF lookup skips the starting artifact '{}' ({})",
                current.name, current.id
            );
        } else if let Some((name, value)) = current.udf.get_chain(names) {
            info!(
                "Found target UDF '{}' with value '{}' in {} artifact '{}' ({})",
                name,
                value,
                parent.map_or("input", |_| "output"),
                current.name,
                current.id
            );
            return Ok(Found {
                name: name.to_string(),
                value: value.clone(),
                artifact_id: current.id.clone(),
                artifact_name: current.name.clone(),
                step_name: parent.map(|s| s.type_name.clone()),
                hops: hop,
            });
        }

        let Some(parent) = parent else {
            return Err(TracebackError::ChainExhausted(current.name.clone()));
        };
        info!(
            "Tracing '{}' ({}) back through step '{}' ({})",
            current.name, current.id, parent.type_name, parent.id
        );

        let linked = snapshot
            .linked_inputs(parent, &current.id)
            .map_err(|_| TracebackError::NoLinkedInput)?;
        current = match linked.as_slice() {
            &[one] => one,
            &[] => return Err(TracebackError::NoLinkedInput),
            _ => return Err(TracebackError::AmbiguousLink),
        };
    }
    unreachable!("loop exits via return");
}

/// Convenience wrapper: resolve and log a miss at warning level instead of
/// returning an error. Used by callers for which a miss only skips the
/// current unit of work.
pub fn fetch_last_or_warn(
    snapshot: &Snapshot,
    start: &Artifact,
    names: &[&str],
    include_current: bool,
) -> Option<Found> {
    match fetch_last(snapshot, start, names, include_current) {
        Ok(found) => Some(found),
        Err(e) => {
            warn!(
                "Could not find matching UDF(s) [{}] for artifact '{}' ({}): {}",
                names.join(", "),
                start.name,
                start.id,
                e
            );
            None
        }
    }
}

/// Build a `Result` variant for callers that treat a miss as fatal.
pub fn fetch_last_required(
    snapshot: &Snapshot,
    start: &Artifact,
    names: &[&str],
    include_current: bool,
) -> Result<Found> {
    fetch_last(snapshot, start, names, include_current).map_err(|e| {
        crate::errors::Error::Invalid(format!(
            "could not find matching UDF(s) [{}] for artifact '{}' ({}): {}",
            names.join(", "),
            start.name,
            start.id,
            e
        ))
    })
}
