//! SMART-seq3 combinatorial plate-well index sets.
//!
//! A plate well (e.g. `SMARTSEQ3-1A`) carries *sets* of i7 and i5
//! sequences; expansion is the cartesian product of the two sets, so one
//! labeled sample yields several sheet rows. i5 is given in the forward
//! orientation and reverse-complemented at expansion time.

/// Index sets for one plate well.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SmartseqWell {
    pub well: &'static str,
    pub i7: &'static [&'static str],
    pub i5: &'static [&'static str],
}

/// Stocked wells of the SMARTSEQ3 plate (columns 1-2, rows A-H).
pub const SMARTSEQ3_WELLS: &[SmartseqWell] = &[
    SmartseqWell { well: "SMARTSEQ3-1A", i7: &["GATCTGATTC", "TAAGTATGTT"], i5: &["TCAGCATGGC", "CACGGACCTA"] },
    SmartseqWell { well: "SMARTSEQ3-1B", i7: &["AACCCTTTCG", "GCATATTAAG"], i5: &["TCGTACCAGT", "TGTATAAAGT"] },
    SmartseqWell { well: "SMARTSEQ3-1C", i7: &["ACGACAAGCC", "TATCACCCTC"], i5: &["TAATGTGCGT", "GCTTTTCTGG"] },
    SmartseqWell { well: "SMARTSEQ3-1D", i7: &["AGGAATGAGT", "TTTAACAAGC"], i5: &["GTGAATGTGA", "AGACTTCCAA"] },
    SmartseqWell { well: "SMARTSEQ3-1E", i7: &["GATCATATGT", "CCGCGCCGAT"], i5: &["CTCCTTGCAA", "CCCAGCCAGT"] },
    SmartseqWell { well: "SMARTSEQ3-1F", i7: &["CCGATCTGGT", "CCGACTTTTC"], i5: &["AACAAAGCGG", "AGGGGATGGG"] },
    SmartseqWell { well: "SMARTSEQ3-1G", i7: &["GAGAAGCACT", "TAGGGACGGC"], i5: &["TTCAAGGTGG", "TCTTCAAGCT"] },
    SmartseqWell { well: "SMARTSEQ3-1H", i7: &["ACTCCGACGG", "GCTGTCTGAT"], i5: &["GTGGCTGGTG", "ACGCCCCGCT"] },
    SmartseqWell { well: "SMARTSEQ3-2A", i7: &["TTACCCTACG", "TTATGACGCT"], i5: &["TGGAAGTTCC", "GCTATCTAGT"] },
    SmartseqWell { well: "SMARTSEQ3-2B", i7: &["TGCTTAGAAA", "TTGCACTAGG"], i5: &["TCTGATTTTA", "GATATGAAAA"] },
    SmartseqWell { well: "SMARTSEQ3-2C", i7: &["GACAGGTTTC", "GCAACTAGGC"], i5: &["ATGACCTCAA", "TCGCTTTTAA"] },
    SmartseqWell { well: "SMARTSEQ3-2D", i7: &["CGATCCCTTG", "TTCGGAGAGG"], i5: &["GCCACATTAT", "ATGGGAGCAA"] },
    SmartseqWell { well: "SMARTSEQ3-2E", i7: &["GGCCCGTCCC", "GCACGATGAT"], i5: &["CATAGAGAGA", "TAACCACACG"] },
    SmartseqWell { well: "SMARTSEQ3-2F", i7: &["TTTTCGTGAG", "AGGGTTGAAA"], i5: &["ATGTTCGCCA", "ACTGTTTGTC"] },
    SmartseqWell { well: "SMARTSEQ3-2G", i7: &["CTGTTGGCAG", "TGATGGTACG"], i5: &["AAAGTTAACC", "TCGACAGCAC"] },
    SmartseqWell { well: "SMARTSEQ3-2H", i7: &["TCCGCCCTGG", "TTGCACCTGA"], i5: &["GTGGCGACCT", "ATGGTACATG"] },
];

/// Look up a plate well by its full code (e.g. `"SMARTSEQ3-1A"`).
pub fn smartseq_well(code: &str) -> Option<&'static SmartseqWell> {
    SMARTSEQ3_WELLS.iter().find(|w| w.well == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wells_expand_to_cartesian_products() {
        let w = smartseq_well("SMARTSEQ3-1A").unwrap();
        assert_eq!(w.i7.len() * w.i5.len(), 4);
        assert!(smartseq_well("SMARTSEQ3-9Z").is_none());
    }
}
