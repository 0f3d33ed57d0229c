//! Reagent-label classification and index expansion.
//!
//! A LIMS reagent label is either a kit well code (`SI-TT-A1`,
//! `SMARTSEQ3-1A`) or carries the index sequence(s) inline
//! (`ACGTACGT-TGCATGCA`, sometimes wrapped in a descriptive name). The
//! classifier tries the kit patterns **before** the inline-sequence
//! patterns: kit codes contain index-like letters and would otherwise be
//! mis-parsed as literal sequence text.
//!
//! Expansion turns one label into one or more index values. Dual-index
//! kits store index2 reverse-complemented relative to the reference table,
//! the orientation the downstream instrument expects by default.

use regex::Regex;

use crate::data::{smartseq, tenx};
use crate::errors::{Error, Result};

/// One expanded index value: a bare index1, or an index pair. `index2` is
/// empty for single-index entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexPair {
    pub index1: String,
    pub index2: String,
}

impl IndexPair {
    pub fn single(index1: impl Into<String>) -> Self {
        IndexPair {
            index1: index1.into(),
            index2: String::new(),
        }
    }

    pub fn dual(index1: impl Into<String>, index2: impl Into<String>) -> Self {
        IndexPair {
            index1: index1.into(),
            index2: index2.into(),
        }
    }
}

/// How a label was recognized. The manifest builder needs this to attach
/// kit-specific settings and to pick the index2 orientation policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelClass {
    /// Combinatorial single-index kit well, e.g. `SI-GA-A1`.
    TenxSingle(String),
    /// Combinatorial dual-index kit well, e.g. `SI-TT-A1`.
    TenxDual(String),
    /// Plate-well combinatorial kit, e.g. `SMARTSEQ3-1A`.
    Smartseq(String),
    /// Inline `idx1-idx2` pair.
    InlinePair(String, String),
    /// Inline bare sequence.
    InlineSingle(String),
}

fn tenx_single_re() -> Regex {
    Regex::new(r"SI-(?:GA|NA)-[A-H][1-9][0-2]?").expect("static pattern")
}

fn tenx_dual_re() -> Regex {
    Regex::new(r"SI-(?:TT|NT|NN|TN|TS)-[A-H][1-9][0-2]?").expect("static pattern")
}

fn smartseq_re() -> Regex {
    Regex::new(r"SMARTSEQ[1-9]?-[1-9][0-9]?[A-P]").expect("static pattern")
}

fn inline_re() -> Regex {
    Regex::new(r"([ACGT]{4,}N*)-?([ACGT]*)").expect("static pattern")
}

/// True when the label matches a combinatorial single-index kit (these
/// need the index1-to-separate-fastq instrument setting).
pub fn is_tenx_single(label: &str) -> bool {
    tenx_single_re().is_match(label)
}

/// True when the label names any combinatorial kit (dual 10X or plate
/// well), which always keeps the kit's index2 orientation convention.
pub fn is_combinatorial_kit(label: &str) -> bool {
    tenx_single_re().is_match(label) || tenx_dual_re().is_match(label) || smartseq_re().is_match(label)
}

/// Classify a reagent label. Pattern order is fixed and load-bearing.
pub fn classify(label: &str) -> Result<LabelClass> {
    if let Some(m) = tenx_single_re().find(label) {
        return Ok(LabelClass::TenxSingle(m.as_str().to_string()));
    }
    if let Some(m) = tenx_dual_re().find(label) {
        return Ok(LabelClass::TenxDual(m.as_str().to_string()));
    }
    if let Some(m) = smartseq_re().find(label) {
        return Ok(LabelClass::Smartseq(m.as_str().to_string()));
    }
    let squeezed = label.replace(',', "").to_ascii_uppercase();
    if squeezed == "NOINDEX" || squeezed.is_empty() {
        return Err(Error::NoIndexLabel);
    }
    if let Some(caps) = inline_re().captures(label) {
        let idx1 = caps[1].to_string();
        let idx2 = caps[2].to_string();
        if idx2.is_empty() {
            return Ok(LabelClass::InlineSingle(idx1));
        }
        return Ok(LabelClass::InlinePair(idx1, idx2));
    }
    Err(Error::UnknownLabel(label.to_string()))
}

/// Expand a reagent label into its index value(s).
///
/// - single combinatorial wells expand to their whole quad;
/// - dual combinatorial wells yield one pair with index2
///   reverse-complemented relative to the reference table;
/// - plate wells yield the i7 x i5 cartesian product, i5
///   reverse-complemented;
/// - inline pairs keep index1 and reverse-complement index2;
/// - `NoIndex` and empty labels are disallowed here and raise.
pub fn expand_label(label: &str) -> Result<Vec<IndexPair>> {
    match classify(label)? {
        LabelClass::TenxSingle(well) => {
            let quad = tenx::single_quad(&well)
                .ok_or_else(|| Error::UnknownLabel(label.to_string()))?;
            Ok(quad.sequences.iter().map(|s| IndexPair::single(*s)).collect())
        }
        LabelClass::TenxDual(well) => {
            let pair = tenx::dual_pair(&well)
                .ok_or_else(|| Error::UnknownLabel(label.to_string()))?;
            Ok(vec![IndexPair::dual(pair.i7, revcomp(pair.i5))])
        }
        LabelClass::Smartseq(code) => {
            let well = smartseq::smartseq_well(&code)
                .ok_or_else(|| Error::UnknownLabel(label.to_string()))?;
            let mut out = Vec::with_capacity(well.i7.len() * well.i5.len());
            for i7 in well.i7 {
                for i5 in well.i5 {
                    out.push(IndexPair::dual(*i7, revcomp(i5)));
                }
            }
            Ok(out)
        }
        LabelClass::InlinePair(idx1, idx2) => Ok(vec![IndexPair::dual(idx1, revcomp(&idx2))]),
        LabelClass::InlineSingle(idx1) => Ok(vec![IndexPair::single(idx1)]),
    }
}

/// Reverse-complement a DNA string (ACGTN alphabet, case preserved as
/// uppercase).
pub fn revcomp(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|c| match c {
            'A' => 'T',
            'C' => 'G',
            'G' => 'C',
            'T' => 'A',
            other => other,
        })
        .collect()
}

/// Remove parenthesized content and potentially problematic characters
/// from an identifier destined for an instrument samplesheet.
pub fn sanitize_string(input: &str) -> String {
    let parenthesized = Regex::new(r"\([^()]*\)").expect("static pattern");
    let disallowed = Regex::new(r"[^a-zA-Z0-9_-]").expect("static pattern");
    let squeeze = Regex::new(r"__+").expect("static pattern");

    let s = parenthesized.replace_all(input, "");
    let s = disallowed.replace_all(&s, "_");
    let s = squeeze.replace_all(&s, "_");
    s.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revcomp_is_involutive() {
        assert_eq!(revcomp("ACGT"), "ACGT");
        assert_eq!(revcomp("AACCGGTT"), "AACCGGTT");
        assert_eq!(revcomp("ATTGCC"), "GGCAAT");
        assert_eq!(revcomp(&revcomp("GATTACA")), "GATTACA");
    }

    #[test]
    fn kit_codes_win_over_inline_sequences() {
        // "GA" inside the kit code must not be read as sequence text.
        assert!(matches!(
            classify("SI-GA-A1").unwrap(),
            LabelClass::TenxSingle(w) if w == "SI-GA-A1"
        ));
        assert!(matches!(
            classify("SI-TT-B1 (GTAACATGCG-AGTGGAACCT)").unwrap(),
            LabelClass::TenxDual(w) if w == "SI-TT-B1"
        ));
    }

    #[test]
    fn single_quad_expands_to_four_rows() {
        let idxs = expand_label("SI-GA-A1").unwrap();
        assert_eq!(idxs.len(), 4);
        assert!(idxs.iter().all(|p| p.index2.is_empty()));
        assert_eq!(idxs[0].index1, "GGTTTACT");
    }

    #[test]
    fn dual_kit_index2_is_reverse_complemented() {
        let pair = crate::data::tenx::dual_pair("SI-TT-A1").unwrap();
        let idxs = expand_label("SI-TT-A1").unwrap();
        assert_eq!(idxs.len(), 1);
        assert_eq!(idxs[0].index1, pair.i7);
        assert_eq!(idxs[0].index2, revcomp(pair.i5));
        assert_ne!(idxs[0].index2, pair.i5);
    }

    #[test]
    fn smartseq_expands_cartesian_product() {
        let well = crate::data::smartseq::smartseq_well("SMARTSEQ3-1A").unwrap();
        let idxs = expand_label("SMARTSEQ3-1A").unwrap();
        assert_eq!(idxs.len(), well.i7.len() * well.i5.len());
        assert_eq!(idxs[0].index2, revcomp(well.i5[0]));
    }

    #[test]
    fn inline_labels_expand_directly() {
        let idxs = expand_label("ACGTACGT").unwrap();
        assert_eq!(idxs, vec![IndexPair::single("ACGTACGT")]);

        let idxs = expand_label("ACGTACGT-TTGGCCAA").unwrap();
        assert_eq!(idxs, vec![IndexPair::dual("ACGTACGT", revcomp("TTGGCCAA"))]);

        // Trailing N's mark UMI bases and stay on index1.
        let idxs = expand_label("ACGTACGTNNN").unwrap();
        assert_eq!(idxs[0].index1, "ACGTACGTNNN");
    }

    #[test]
    fn noindex_labels_are_rejected() {
        assert!(matches!(classify("NoIndex").unwrap_err(), Error::NoIndexLabel));
        assert!(matches!(classify("NOINDEX").unwrap_err(), Error::NoIndexLabel));
        assert!(matches!(classify("").unwrap_err(), Error::NoIndexLabel));
    }

    #[test]
    fn unparsable_labels_are_rejected() {
        assert!(matches!(
            classify("happy little label").unwrap_err(),
            Error::UnknownLabel(_)
        ));
    }

    #[test]
    fn sanitize_strips_parentheses_and_specials() {
        assert_eq!(sanitize_string("P123 (v2)"), "P123");
        assert_eq!(sanitize_string("a  b//c"), "a_b_c");
        assert_eq!(sanitize_string("__x__"), "x");
    }
}
