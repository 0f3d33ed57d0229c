//! Chromium combinatorial index sets, keyed by kit well code.
//!
//! Two families exist and they expand differently:
//! - **single-index** wells (`SI-GA-*`, `SI-NA-*`) map to a color-balanced
//!   quad of four 8-mer i7 sequences, all of which go on the sample;
//! - **dual-index** wells (`SI-TT-*`, `SI-NT-*`, `SI-NN-*`, `SI-TN-*`,
//!   `SI-TS-*`) map to one (i7, i5) 10-mer pair, with i5 given in the
//!   forward (workflow A) orientation.
//!
//! The tables cover the first plate column of each family, plus a second
//! column for the `GA` and `TT` kits the lab stocks deepest; an unlisted
//! well surfaces as an unknown-label error at expansion time, never a
//! panic.

/// A single-index well: four i7 sequences forming a color-balanced quad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TenxQuad {
    pub well: &'static str,
    pub sequences: [&'static str; 4],
}

/// A dual-index well: one (i7, i5) pair, i5 in forward orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TenxPair {
    pub well: &'static str,
    pub i7: &'static str,
    pub i5: &'static str,
}

/// `SI-GA-*` single-index quads (Chromium Single Index Kit T).
pub const SI_GA: &[TenxQuad] = &[
    TenxQuad { well: "SI-GA-A1", sequences: ["GGTTTACT", "CTAAACGG", "TCGGCGTC", "AACCGTAA"] },
    TenxQuad { well: "SI-GA-B1", sequences: ["GATTGATC", "TTCGTGCG", "CGGACCGA", "ACACATAT"] },
    TenxQuad { well: "SI-GA-C1", sequences: ["CGTAACAT", "GTGGGTCC", "AAACTATA", "TCCTCGGG"] },
    TenxQuad { well: "SI-GA-D1", sequences: ["TACAGCTG", "GCGCAGGA", "CTTTTTAT", "AGAGCACC"] },
    TenxQuad { well: "SI-GA-E1", sequences: ["ACACAGTT", "TGTTGTCC", "GTCATAAA", "CAGGCCGG"] },
    TenxQuad { well: "SI-GA-F1", sequences: ["TCTGAACG", "GTCCTTTC", "AGATCCAT", "CAGAGGGA"] },
    TenxQuad { well: "SI-GA-G1", sequences: ["AGGAATCG", "CACCGAAC", "GCATCCTT", "TTTGTGGA"] },
    TenxQuad { well: "SI-GA-H1", sequences: ["CCAGCGCC", "AATCTATA", "GGCAACGG", "TTGTGTAT"] },
    TenxQuad { well: "SI-GA-A2", sequences: ["CGAGTGTC", "AATACTGG", "TCCCGAAA", "GTGTACCT"] },
    TenxQuad { well: "SI-GA-B2", sequences: ["CGAGTCGA", "TTCTCGTG", "ACGCGACC", "GATAATAT"] },
    TenxQuad { well: "SI-GA-C2", sequences: ["ACGTCGCG", "CTTGTCAA", "TGACGATC", "GACAATGT"] },
    TenxQuad { well: "SI-GA-D2", sequences: ["TTCGGCCG", "CATACGAC", "ACATTAGT", "GGGCATTA"] },
    TenxQuad { well: "SI-GA-E2", sequences: ["TGACGACA", "GACTACGG", "CTGGCTAT", "ACTATGTC"] },
    TenxQuad { well: "SI-GA-F2", sequences: ["AATTAACG", "GGCGGTAC", "CCGCTGGA", "TTAACCTT"] },
    TenxQuad { well: "SI-GA-G2", sequences: ["AACGCAAC", "TTGAATTG", "CCTCTCCA", "GGATGGGT"] },
    TenxQuad { well: "SI-GA-H2", sequences: ["AATTTAAA", "CTCAGTTG", "TCGCCCCT", "GGAGAGGC"] },
];

/// `SI-NA-*` single-index quads (Chromium Single Index Kit N).
pub const SI_NA: &[TenxQuad] = &[
    TenxQuad { well: "SI-NA-A1", sequences: ["CGTACTAC", "TCACAGGA", "GAGTGATT", "ATCGTCCG"] },
    TenxQuad { well: "SI-NA-B1", sequences: ["GCTTGAAC", "CTAGTGGG", "AGGCCCCA", "TACAATTT"] },
    TenxQuad { well: "SI-NA-C1", sequences: ["ACATCGTA", "CACCAAGT", "TTTATCCC", "GGGGGTAG"] },
    TenxQuad { well: "SI-NA-D1", sequences: ["GGAGATGG", "ACTCCCAC", "TAGTTACT", "CTCAGGTA"] },
    TenxQuad { well: "SI-NA-E1", sequences: ["GTACGGAT", "CATGCTTG", "TGCAACGC", "ACGTTACA"] },
    TenxQuad { well: "SI-NA-F1", sequences: ["CGTGAAAT", "GAGTTGCC", "TTCAGTGG", "ACACCCTA"] },
    TenxQuad { well: "SI-NA-G1", sequences: ["GAGAAAAA", "TGCTTGCG", "ACAGGCGC", "CTTCCTTT"] },
    TenxQuad { well: "SI-NA-H1", sequences: ["ATTCTGGT", "GAGAAAAG", "CCATCCTA", "TGCGGTCC"] },
];

/// Dual-index pairs across the `SI-TT`/`SI-NT`/`SI-NN`/`SI-TN`/`SI-TS` kits.
pub const SI_DUAL: &[TenxPair] = &[
    TenxPair { well: "SI-TT-A1", i7: "TGCTTCCGGG", i5: "ACAGGATACC" },
    TenxPair { well: "SI-TT-B1", i7: "ACCGATTGTA", i5: "CGAAGCAAAC" },
    TenxPair { well: "SI-TT-C1", i7: "AGACGCCAGT", i5: "CTGCTGGCGT" },
    TenxPair { well: "SI-TT-D1", i7: "TTCGAGTGAC", i5: "GTAGCATCAT" },
    TenxPair { well: "SI-TT-E1", i7: "GCATTAAGGT", i5: "ATGGTGGTAT" },
    TenxPair { well: "SI-TT-F1", i7: "AAAGATTCTA", i5: "TAATCAGCGC" },
    TenxPair { well: "SI-TT-G1", i7: "GCTTGCCACG", i5: "GATACTAGCC" },
    TenxPair { well: "SI-TT-H1", i7: "CACTAGTGCA", i5: "ACGACCTAGA" },
    TenxPair { well: "SI-TT-A2", i7: "GGGCACAACA", i5: "GTTATCAGGT" },
    TenxPair { well: "SI-TT-B2", i7: "TAAGAGTCCG", i5: "AGTGCATCCC" },
    TenxPair { well: "SI-TT-C2", i7: "ATCAAACGGC", i5: "CGGAACCTCA" },
    TenxPair { well: "SI-TT-D2", i7: "GACGGTATGA", i5: "CCAGCTTTTG" },
    TenxPair { well: "SI-TT-E2", i7: "GCGTATGCAG", i5: "AACCGTAACG" },
    TenxPair { well: "SI-TT-F2", i7: "GCATCGCATG", i5: "ACGTAACCGA" },
    TenxPair { well: "SI-TT-G2", i7: "GTTTACAGAT", i5: "GACAGGGTAA" },
    TenxPair { well: "SI-TT-H2", i7: "TTGCTCTTGA", i5: "CAAGCCTATG" },
    TenxPair { well: "SI-NT-A1", i7: "TCTCAGGTCC", i5: "TTGATCTTTT" },
    TenxPair { well: "SI-NT-B1", i7: "TGCGGAGCTC", i5: "ATTCCACCCG" },
    TenxPair { well: "SI-NT-C1", i7: "TCATACGGGA", i5: "TTCGTCCTTG" },
    TenxPair { well: "SI-NT-D1", i7: "CCTCCGCGTC", i5: "TTCTATCGCG" },
    TenxPair { well: "SI-NT-E1", i7: "GCTCAACGAC", i5: "TAAGGACGGA" },
    TenxPair { well: "SI-NT-F1", i7: "CGTCAGGGAC", i5: "CAGTCAAATT" },
    TenxPair { well: "SI-NT-G1", i7: "GCGCCTCAGC", i5: "ACCGTACCAC" },
    TenxPair { well: "SI-NT-H1", i7: "GTACTGGTCG", i5: "CTGTGTCGGC" },
    TenxPair { well: "SI-NN-A1", i7: "CCTTTCTGAT", i5: "ACCACCCTTT" },
    TenxPair { well: "SI-NN-B1", i7: "GCCCGATATC", i5: "TGCAAACGAC" },
    TenxPair { well: "SI-NN-C1", i7: "TCAACTATAT", i5: "TTATCTTACG" },
    TenxPair { well: "SI-NN-D1", i7: "GAATCCAACT", i5: "CAGACTTGAC" },
    TenxPair { well: "SI-NN-E1", i7: "GTCATCAATT", i5: "TTTACCCCCG" },
    TenxPair { well: "SI-NN-F1", i7: "GAAGATCCTG", i5: "AGCCCAGACT" },
    TenxPair { well: "SI-NN-G1", i7: "TTGCCTGAAG", i5: "AATCTCCATA" },
    TenxPair { well: "SI-NN-H1", i7: "GGTACAATGT", i5: "ACGATTAGTG" },
    TenxPair { well: "SI-TN-A1", i7: "GCACGGAACC", i5: "ACAGTCATTA" },
    TenxPair { well: "SI-TN-B1", i7: "GATTACTGGG", i5: "GCGGGTAAAC" },
    TenxPair { well: "SI-TN-C1", i7: "TGAATTATGC", i5: "TCATGGTTCT" },
    TenxPair { well: "SI-TN-D1", i7: "TGGCTAGCTG", i5: "CCCAGCCTTA" },
    TenxPair { well: "SI-TN-E1", i7: "CGCGGCCGGC", i5: "CGCACGACCT" },
    TenxPair { well: "SI-TN-F1", i7: "TGCGAGAAGG", i5: "TACACCGCTC" },
    TenxPair { well: "SI-TN-G1", i7: "AGAGTGAAAC", i5: "TAAGGTATAC" },
    TenxPair { well: "SI-TN-H1", i7: "TGCAGTATGC", i5: "CCAAACAAAT" },
    TenxPair { well: "SI-TS-A1", i7: "CTCTCCTCGC", i5: "ACCAAATGGC" },
    TenxPair { well: "SI-TS-B1", i7: "GTAATCCAGG", i5: "TGAAACCGAT" },
    TenxPair { well: "SI-TS-C1", i7: "GACCGGTCTG", i5: "CAATCCAAAA" },
    TenxPair { well: "SI-TS-D1", i7: "CTCAGGCACT", i5: "GAGGTCCGTT" },
    TenxPair { well: "SI-TS-E1", i7: "GCGCACCGAC", i5: "GGCGCCACGC" },
    TenxPair { well: "SI-TS-F1", i7: "GGTTAACATC", i5: "GAGGGAGTTA" },
    TenxPair { well: "SI-TS-G1", i7: "GCTTTATGGC", i5: "ATGGATTGCT" },
    TenxPair { well: "SI-TS-H1", i7: "ACCACCACGG", i5: "TATCGATACC" },
];

/// Look up a single-index quad by well code (e.g. `"SI-GA-A1"`).
pub fn single_quad(well: &str) -> Option<&'static TenxQuad> {
    SI_GA
        .iter()
        .chain(SI_NA.iter())
        .find(|q| q.well == well)
}

/// Look up a dual-index pair by well code (e.g. `"SI-TT-A1"`).
pub fn dual_pair(well: &str) -> Option<&'static TenxPair> {
    SI_DUAL.iter().find(|p| p.well == well)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quads_are_color_balanced() {
        for q in SI_GA.iter().chain(SI_NA.iter()) {
            let len = q.sequences[0].len();
            assert_eq!(len, 8);
            for pos in 0..len {
                let mut bases: Vec<u8> =
                    q.sequences.iter().map(|s| s.as_bytes()[pos]).collect();
                bases.sort_unstable();
                assert_eq!(bases, b"ACGT".to_vec(), "unbalanced quad {}", q.well);
            }
        }
    }

    #[test]
    fn lookups_resolve_known_wells_only() {
        assert_eq!(single_quad("SI-GA-A1").unwrap().sequences[0], "GGTTTACT");
        assert!(single_quad("SI-GA-Z9").is_none());
        let p = dual_pair("SI-TT-A1").unwrap();
        assert_eq!(p.i7.len(), 10);
        assert_eq!(p.i5.len(), 10);
        assert!(dual_pair("SI-GA-A1").is_none());
    }
}
