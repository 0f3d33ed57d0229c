//! Pairwise index-distance validation.
//!
//! The implementation is intentionally dependency-free: index strings are
//! short (<= ~24 nt) and there are at most a few hundred rows per lane, so
//! a plain Levenshtein matrix is plenty.
//!
//! Policy: distance 0 between two different rows in a lane can never be
//! demultiplexed and is fatal; small nonzero distances are reported as
//! warnings with a base-by-base alignment; and the downstream
//! demultiplexer's allowed-mismatch settings are tightened from 1 to 0
//! whenever any same-position pairwise distance in the lane is at or
//! below 2.

use itertools::Itertools;
use log::warn;

use crate::errors::{Error, Result};
use crate::indexes::revcomp;

/// Warn threshold used for whole-lane sweeps.
pub const LANE_WARN_THRESHOLD: usize = 2;
/// Warn threshold used for individual pair checks.
pub const PAIR_WARN_THRESHOLD: usize = 3;

/// The slice of a manifest row that distance checking needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedRow {
    pub sample_name: String,
    pub index1: String,
    pub index2: String,
    pub lane: String,
}

/// Compute Levenshtein edit distance between two ASCII strings (DNA
/// alphabet).
#[inline]
pub fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            let ins = curr[j] + 1;
            let del = prev[j + 1] + 1;
            let sub = prev[j] + cost;
            curr[j + 1] = ins.min(del).min(sub);
        }
        prev.clone_from(&curr);
    }
    prev[b.len()]
}

/// Visualize a base-by-base match between sequences of equal length.
pub fn show_match(seq1: &str, seq2: &str) -> String {
    debug_assert_eq!(seq1.len(), seq2.len());
    let marks: String = seq1
        .bytes()
        .zip(seq2.bytes())
        .map(|(a, b)| if a == b { '|' } else { 'X' })
        .collect();
    format!("{seq1}\n{marks}\n{seq2}")
}

/// Distance check between two rows' index pairs.
///
/// With `check_flips`, all sixteen reverse-complement orientation
/// combinations of the four sequences are tried and the minimum distance
/// is reported, flagging swapped-orientation collisions that plain
/// comparison misses.
pub fn check_pair_distance(
    row: &IndexedRow,
    row_comp: &IndexedRow,
    check_flips: bool,
    threshold: usize,
) -> Result<()> {
    let (dist, compared, flip_conf) = if check_flips {
        let mut flips: Vec<(usize, String, String)> = Vec::with_capacity(16);
        for (s1i1, n1) in [(row.index1.clone(), "Index1"), (revcomp(&row.index1), "Index1_rc")] {
            for (s1i2, n2) in [(row.index2.clone(), "Index2"), (revcomp(&row.index2), "Index2_rc")]
            {
                for (s2i1, n3) in [
                    (row_comp.index1.clone(), "Index1"),
                    (revcomp(&row_comp.index1), "Index1_rc"),
                ] {
                    for (s2i2, n4) in [
                        (row_comp.index2.clone(), "Index2"),
                        (revcomp(&row_comp.index2), "Index2_rc"),
                    ] {
                        flips.push((
                            edit_distance(&s1i1, &s2i1) + edit_distance(&s1i2, &s2i2),
                            format!("{s1i1}-{s1i2} {s2i1}-{s2i2}"),
                            format!("{n1}-{n2} {n3}-{n4}"),
                        ));
                    }
                }
            }
        }
        let best = flips
            .into_iter()
            .min_by_key(|(d, _, _)| *d)
            .expect("sixteen flips");
        (best.0, best.1, Some(best.2))
    } else {
        let a = format!("{}{}", row.index1, row.index2);
        let b = format!("{}{}", row_comp.index1, row_comp.index2);
        let dist = edit_distance(&a, &b);
        (
            dist,
            format!(
                "{}-{} {}-{}",
                row.index1, row.index2, row_comp.index1, row_comp.index2
            ),
            None,
        )
    };

    if dist <= threshold {
        let mut lines = vec![format!(
            "Hamming distance {dist} between {} and {}",
            row.sample_name, row_comp.sample_name
        )];
        if let Some(conf) = &flip_conf {
            lines.push(format!(
                "Given: {}-{} <-> {}-{}",
                row.index1, row.index2, row_comp.index1, row_comp.index2
            ));
            lines.push(format!("Distance: {dist} when flipped to {conf}"));
        }
        if row.index1.len() + row.index2.len() == row_comp.index1.len() + row_comp.index2.len() {
            let (a, b) = compared
                .split_once(' ')
                .expect("two compared sequence groups");
            // Strip the pair separator so the alignment is over the
            // concatenated index strings.
            lines.push(show_match(&a.replace('-', ""), &b.replace('-', "")));
        }
        warn!("{}", lines.join("\n"));

        if dist == 0 {
            return Err(Error::IdenticalIndices {
                sample_a: row.sample_name.clone(),
                sample_b: row_comp.sample_name.clone(),
                lane: row.lane.clone(),
            });
        }
    }
    Ok(())
}

/// Check index distances between all unordered pairs of rows (one lane's
/// worth, controls included).
pub fn check_lane_distances(rows: &[IndexedRow], threshold: usize) -> Result<()> {
    for (a, b) in rows.iter().tuple_combinations() {
        check_pair_distance(a, b, false, threshold)?;
    }
    Ok(())
}

/// Demultiplexer mismatch thresholds for one lane's rows.
///
/// Defaults to 1 allowed mismatch per index read; index1 and index2 are
/// evaluated independently and each drops to 0 when any pairwise distance
/// at that position is <= 2. A total distance of 0 is a collision.
pub fn mismatch_thresholds(rows: &[IndexedRow]) -> Result<(u8, u8)> {
    let mut i1 = 1u8;
    let mut i2 = 1u8;
    let mut min_total = usize::MAX;

    for (a, b) in rows.iter().tuple_combinations() {
        let d1 = edit_distance(&a.index1, &b.index1);
        let d2 = edit_distance(&a.index2, &b.index2);
        min_total = min_total.min(d1 + d2);
        if d1 <= 2 {
            i1 = 0;
        }
        if d2 <= 2 {
            i2 = 0;
        }
    }

    if min_total == 0 {
        return Err(Error::Invalid(
            "total index distance of 0 detected".to_string(),
        ));
    }
    if i1 == 0 {
        warn!(
            "Minimum distance between Index1 sequences is at or below 2. Reducing allowed mismatches from 1 to 0."
        );
    }
    if i2 == 0 {
        warn!(
            "Minimum distance between Index2 sequences is at or below 2. Reducing allowed mismatches from 1 to 0."
        );
    }
    Ok((i1, i2))
}
