//! Nanopore native barcode labels as configured in the LIMS.
//!
//! Labels are transcribed verbatim from the LIMS reagent-label category
//! "Nanopore native barcodes v2"; the shape is
//! `<number>_<well>_NB<number> (<sequence>)`. [`ont_label_re`] captures the
//! well, the barcode number and the sequence.

use regex::Regex;

/// Capture groups: (1) barcode well, (2) barcode number, (3) sequence.
pub const ONT_LABEL_PATTERN: &str = r"\d{2}_([A-H][0-1]?\d)_NB(\d{2}) \(([ACGT]+)\)$";

/// Compiled form of [`ONT_LABEL_PATTERN`].
pub fn ont_label_re() -> Regex {
    Regex::new(ONT_LABEL_PATTERN).expect("static pattern")
}

/// One native barcode as labeled in the LIMS.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OntBarcode {
    /// Full LIMS label, e.g. `"01_A1_NB01 (CACAAAGACACCGACAACTTTCTT)"`.
    pub label: &'static str,
    /// Plate well, e.g. `"A1"`.
    pub well: &'static str,
    /// Barcode number, 1-based.
    pub num: u8,
    /// Barcode core sequence.
    pub sequence: &'static str,
}

/// All native barcodes, ordered by number.
pub const ONT_BARCODES: &[OntBarcode] = &[
    OntBarcode { label: "01_A1_NB01 (CACAAAGACACCGACAACTTTCTT)", well: "A1", num: 1, sequence: "CACAAAGACACCGACAACTTTCTT" },
    OntBarcode { label: "02_B1_NB02 (ACAGACGACTACAAACGGAATCGA)", well: "B1", num: 2, sequence: "ACAGACGACTACAAACGGAATCGA" },
    OntBarcode { label: "03_C1_NB03 (CCTGGTAACTGGGACACAAGACTC)", well: "C1", num: 3, sequence: "CCTGGTAACTGGGACACAAGACTC" },
    OntBarcode { label: "04_D1_NB04 (TAGGGAAACACGATAGAATCCGAA)", well: "D1", num: 4, sequence: "TAGGGAAACACGATAGAATCCGAA" },
    OntBarcode { label: "05_E1_NB05 (AAGGTTACACAAACCCTGGACAAG)", well: "E1", num: 5, sequence: "AAGGTTACACAAACCCTGGACAAG" },
    OntBarcode { label: "06_F1_NB06 (GACTACTTTCTGCCTTTGCGAGAA)", well: "F1", num: 6, sequence: "GACTACTTTCTGCCTTTGCGAGAA" },
    OntBarcode { label: "07_G1_NB07 (AAGGATTCATTCCCACGGTAACAC)", well: "G1", num: 7, sequence: "AAGGATTCATTCCCACGGTAACAC" },
    OntBarcode { label: "08_H1_NB08 (ACGTAACTTGGTTTGTTCCCTGAA)", well: "H1", num: 8, sequence: "ACGTAACTTGGTTTGTTCCCTGAA" },
    OntBarcode { label: "09_A2_NB09 (AACCAAGACTCGCTGTGCCTAGTT)", well: "A2", num: 9, sequence: "AACCAAGACTCGCTGTGCCTAGTT" },
    OntBarcode { label: "10_B2_NB10 (GAGAGGACAAAGGTTTCAACGCTT)", well: "B2", num: 10, sequence: "GAGAGGACAAAGGTTTCAACGCTT" },
    OntBarcode { label: "11_C2_NB11 (TCCATTCCCTCCGATAGATGAAAC)", well: "C2", num: 11, sequence: "TCCATTCCCTCCGATAGATGAAAC" },
    OntBarcode { label: "12_D2_NB12 (TCCGATTCTGCTTCTTTCTACCTG)", well: "D2", num: 12, sequence: "TCCGATTCTGCTTCTTTCTACCTG" },
    OntBarcode { label: "13_E2_NB13 (AGAACGACTTCCATACTCGTGTGA)", well: "E2", num: 13, sequence: "AGAACGACTTCCATACTCGTGTGA" },
    OntBarcode { label: "14_F2_NB14 (AACGAGTCTCTTGGGACCCATAGA)", well: "F2", num: 14, sequence: "AACGAGTCTCTTGGGACCCATAGA" },
    OntBarcode { label: "15_G2_NB15 (AGGTCTACCTCGCTAACACCACTG)", well: "G2", num: 15, sequence: "AGGTCTACCTCGCTAACACCACTG" },
    OntBarcode { label: "16_H2_NB16 (CGTCAACTGACAGTGGTTCGTACT)", well: "H2", num: 16, sequence: "CGTCAACTGACAGTGGTTCGTACT" },
    OntBarcode { label: "17_A3_NB17 (ACCCTCCAGGAAAGTACCTCTGAT)", well: "A3", num: 17, sequence: "ACCCTCCAGGAAAGTACCTCTGAT" },
    OntBarcode { label: "18_B3_NB18 (CCAAACCCAACAACCTAGATAGGC)", well: "B3", num: 18, sequence: "CCAAACCCAACAACCTAGATAGGC" },
    OntBarcode { label: "19_C3_NB19 (GTTCCTCGTGCAGTGTCAAGAGAT)", well: "C3", num: 19, sequence: "GTTCCTCGTGCAGTGTCAAGAGAT" },
    OntBarcode { label: "20_D3_NB20 (TTGCGTCCTGTTACGAGAACTCAT)", well: "D3", num: 20, sequence: "TTGCGTCCTGTTACGAGAACTCAT" },
    OntBarcode { label: "21_E3_NB21 (GAGCCTCTCATTGTCCGTTCTCTA)", well: "E3", num: 21, sequence: "GAGCCTCTCATTGTCCGTTCTCTA" },
    OntBarcode { label: "22_F3_NB22 (ACCACTGCCATGTATCAAAGTACG)", well: "F3", num: 22, sequence: "ACCACTGCCATGTATCAAAGTACG" },
    OntBarcode { label: "23_G3_NB23 (CTTACTACCCAGTGAACCTCCTCG)", well: "G3", num: 23, sequence: "CTTACTACCCAGTGAACCTCCTCG" },
    OntBarcode { label: "24_H3_NB24 (GCATAGTTCTGCATGATGGGTTAG)", well: "H3", num: 24, sequence: "GCATAGTTCTGCATGATGGGTTAG" },
    OntBarcode { label: "25_A4_NB25 (GTAAGTTGGGTATGCAACGCAATG)", well: "A4", num: 25, sequence: "GTAAGTTGGGTATGCAACGCAATG" },
    OntBarcode { label: "26_B4_NB26 (CATACAGCGACTACGCATTCTCAT)", well: "B4", num: 26, sequence: "CATACAGCGACTACGCATTCTCAT" },
    OntBarcode { label: "27_C4_NB27 (CGACGGTTAGATTCACCTCTTACA)", well: "C4", num: 27, sequence: "CGACGGTTAGATTCACCTCTTACA" },
    OntBarcode { label: "28_D4_NB28 (TGAAACCTAAGAAGGCACCGTATC)", well: "D4", num: 28, sequence: "TGAAACCTAAGAAGGCACCGTATC" },
    OntBarcode { label: "29_E4_NB29 (CTAGACACCTTGGGTTGACAGACC)", well: "E4", num: 29, sequence: "CTAGACACCTTGGGTTGACAGACC" },
    OntBarcode { label: "30_F4_NB30 (TCAGTGAGGATCTACTTCGACCCA)", well: "F4", num: 30, sequence: "TCAGTGAGGATCTACTTCGACCCA" },
    OntBarcode { label: "31_G4_NB31 (TGCGTACAGCAATCAGTTACATTG)", well: "G4", num: 31, sequence: "TGCGTACAGCAATCAGTTACATTG" },
    OntBarcode { label: "32_H4_NB32 (CCAGTAGAAGTCCGACAACGTCAT)", well: "H4", num: 32, sequence: "CCAGTAGAAGTCCGACAACGTCAT" },
    OntBarcode { label: "33_A5_NB33 (CAGACTTGGTACGGTTGGGTAACT)", well: "A5", num: 33, sequence: "CAGACTTGGTACGGTTGGGTAACT" },
    OntBarcode { label: "34_B5_NB34 (GGACGAAGAACTCAAGTCAAAGGC)", well: "B5", num: 34, sequence: "GGACGAAGAACTCAAGTCAAAGGC" },
    OntBarcode { label: "35_C5_NB35 (CTACTTACGAAGCTGAGGGACTGC)", well: "C5", num: 35, sequence: "CTACTTACGAAGCTGAGGGACTGC" },
    OntBarcode { label: "36_D5_NB36 (ATGTCCCAGTTAGAGGAGGAAACA)", well: "D5", num: 36, sequence: "ATGTCCCAGTTAGAGGAGGAAACA" },
    OntBarcode { label: "37_E5_NB37 (GCTTGCGATTGATGCTTAGTATCA)", well: "E5", num: 37, sequence: "GCTTGCGATTGATGCTTAGTATCA" },
    OntBarcode { label: "38_F5_NB38 (ACCACAGGAGGACGATACAGAGAA)", well: "F5", num: 38, sequence: "ACCACAGGAGGACGATACAGAGAA" },
    OntBarcode { label: "39_G5_NB39 (CCACAGTGTCAACTAGAGCCTCTC)", well: "G5", num: 39, sequence: "CCACAGTGTCAACTAGAGCCTCTC" },
    OntBarcode { label: "40_H5_NB40 (TAGTTTGGATGACCAAGGATAGCC)", well: "H5", num: 40, sequence: "TAGTTTGGATGACCAAGGATAGCC" },
    OntBarcode { label: "41_A6_NB41 (GGAGTTCGTCCAGAGAAGTACACG)", well: "A6", num: 41, sequence: "GGAGTTCGTCCAGAGAAGTACACG" },
    OntBarcode { label: "42_B6_NB42 (CTACGTGTAAGGCATACCTGCCAG)", well: "B6", num: 42, sequence: "CTACGTGTAAGGCATACCTGCCAG" },
    OntBarcode { label: "43_C6_NB43 (CTTTCGTTGTTGACTCGACGGTAG)", well: "C6", num: 43, sequence: "CTTTCGTTGTTGACTCGACGGTAG" },
    OntBarcode { label: "44_D6_NB44 (AGTAGAAAGGGTTCCTTCCCACTC)", well: "D6", num: 44, sequence: "AGTAGAAAGGGTTCCTTCCCACTC" },
    OntBarcode { label: "45_E6_NB45 (GATCCAACAGAGATGCCTTCAGTG)", well: "E6", num: 45, sequence: "GATCCAACAGAGATGCCTTCAGTG" },
    OntBarcode { label: "46_F6_NB46 (GCTGTGTTCCACTTCATTCTCCTG)", well: "F6", num: 46, sequence: "GCTGTGTTCCACTTCATTCTCCTG" },
    OntBarcode { label: "47_G6_NB47 (GTGCAACTTTCCCACAGGTAGTTC)", well: "G6", num: 47, sequence: "GTGCAACTTTCCCACAGGTAGTTC" },
    OntBarcode { label: "48_H6_NB48 (CATCTGGAACGTGGTACACCTGTA)", well: "H6", num: 48, sequence: "CATCTGGAACGTGGTACACCTGTA" },
    OntBarcode { label: "49_A7_NB49 (ACTGGTGCAGCTTTGAACATCTAG)", well: "A7", num: 49, sequence: "ACTGGTGCAGCTTTGAACATCTAG" },
    OntBarcode { label: "50_B7_NB50 (ATGGACTTTGGTAACTTCCTGCGT)", well: "B7", num: 50, sequence: "ATGGACTTTGGTAACTTCCTGCGT" },
    OntBarcode { label: "51_C7_NB51 (GTTGAATGAGCCTACTGGGTCCTC)", well: "C7", num: 51, sequence: "GTTGAATGAGCCTACTGGGTCCTC" },
    OntBarcode { label: "52_D7_NB52 (TGAGAGACAAGATTGTTCGTGGAC)", well: "D7", num: 52, sequence: "TGAGAGACAAGATTGTTCGTGGAC" },
    OntBarcode { label: "53_E7_NB53 (AGATTCAGACCGTCTCATGCAAAG)", well: "E7", num: 53, sequence: "AGATTCAGACCGTCTCATGCAAAG" },
    OntBarcode { label: "54_F7_NB54 (CAAGAGCTTTGACTAAGGAGCATG)", well: "F7", num: 54, sequence: "CAAGAGCTTTGACTAAGGAGCATG" },
    OntBarcode { label: "55_G7_NB55 (TGGAAGATGAGACCCTGATCTACG)", well: "G7", num: 55, sequence: "TGGAAGATGAGACCCTGATCTACG" },
    OntBarcode { label: "56_H7_NB56 (TCACTACTCAACAGGTGGCATGAA)", well: "H7", num: 56, sequence: "TCACTACTCAACAGGTGGCATGAA" },
    OntBarcode { label: "57_A8_NB57 (GCTAGGTCAATCTCCTTCGGAAGT)", well: "A8", num: 57, sequence: "GCTAGGTCAATCTCCTTCGGAAGT" },
    OntBarcode { label: "58_B8_NB58 (CAGGTTACTCCTCCGTGAGTCTGA)", well: "B8", num: 58, sequence: "CAGGTTACTCCTCCGTGAGTCTGA" },
    OntBarcode { label: "59_C8_NB59 (TCAATCAAGAAGGGAAAGCAAGGT)", well: "C8", num: 59, sequence: "TCAATCAAGAAGGGAAAGCAAGGT" },
    OntBarcode { label: "60_D8_NB60 (CATGTTCAACCAAGGCTTCTATGG)", well: "D8", num: 60, sequence: "CATGTTCAACCAAGGCTTCTATGG" },
    OntBarcode { label: "61_E8_NB61 (AGAGGGTACTATGTGCCTCAGCAC)", well: "E8", num: 61, sequence: "AGAGGGTACTATGTGCCTCAGCAC" },
    OntBarcode { label: "62_F8_NB62 (CACCCACACTTACTTCAGGACGTA)", well: "F8", num: 62, sequence: "CACCCACACTTACTTCAGGACGTA" },
    OntBarcode { label: "63_G8_NB63 (TTCTGAAGTTCCTGGGTCTTGAAC)", well: "G8", num: 63, sequence: "TTCTGAAGTTCCTGGGTCTTGAAC" },
    OntBarcode { label: "64_H8_NB64 (GACAGACACCGTTCATCGACTTTC)", well: "H8", num: 64, sequence: "GACAGACACCGTTCATCGACTTTC" },
    OntBarcode { label: "65_A9_NB65 (TTCTCAGTCTTCCTCCAGACAAGG)", well: "A9", num: 65, sequence: "TTCTCAGTCTTCCTCCAGACAAGG" },
    OntBarcode { label: "66_B9_NB66 (CCGATCCTTGTGGCTTCTAACTTC)", well: "B9", num: 66, sequence: "CCGATCCTTGTGGCTTCTAACTTC" },
    OntBarcode { label: "67_C9_NB67 (GTTTGTCATACTCGTGTGCTCACC)", well: "C9", num: 67, sequence: "GTTTGTCATACTCGTGTGCTCACC" },
    OntBarcode { label: "68_D9_NB68 (GAATCTAAGCAAACACGAAGGTGG)", well: "D9", num: 68, sequence: "GAATCTAAGCAAACACGAAGGTGG" },
    OntBarcode { label: "69_E9_NB69 (TACAGTCCGAGCCTCATGTGATCT)", well: "E9", num: 69, sequence: "TACAGTCCGAGCCTCATGTGATCT" },
    OntBarcode { label: "70_F9_NB70 (ACCGAGATCCTACGAATGGAGTGT)", well: "F9", num: 70, sequence: "ACCGAGATCCTACGAATGGAGTGT" },
    OntBarcode { label: "71_G9_NB71 (CCTGGGAGCATCAGGTAGTAACAG)", well: "G9", num: 71, sequence: "CCTGGGAGCATCAGGTAGTAACAG" },
    OntBarcode { label: "72_H9_NB72 (TAGCTGACTGTCTTCCATACCGAC)", well: "H9", num: 72, sequence: "TAGCTGACTGTCTTCCATACCGAC" },
    OntBarcode { label: "73_A10_NB73 (AAGAAACAGGATGACAGAACCCTC)", well: "A10", num: 73, sequence: "AAGAAACAGGATGACAGAACCCTC" },
    OntBarcode { label: "74_B10_NB74 (TACAAGCATCCCAACACTTCCACT)", well: "B10", num: 74, sequence: "TACAAGCATCCCAACACTTCCACT" },
    OntBarcode { label: "75_C10_NB75 (GACCATTGTGATGAACCCTGTTGT)", well: "C10", num: 75, sequence: "GACCATTGTGATGAACCCTGTTGT" },
    OntBarcode { label: "76_D10_NB76 (ATGCTTGTTACATCAACCCTGGAC)", well: "D10", num: 76, sequence: "ATGCTTGTTACATCAACCCTGGAC" },
    OntBarcode { label: "77_E10_NB77 (CGACCTGTTTCTCAGGGATACAAC)", well: "E10", num: 77, sequence: "CGACCTGTTTCTCAGGGATACAAC" },
    OntBarcode { label: "78_F10_NB78 (AACAACCGAACCTTTGAATCAGAA)", well: "F10", num: 78, sequence: "AACAACCGAACCTTTGAATCAGAA" },
    OntBarcode { label: "79_G10_NB79 (TCTCGGAGATAGTTCTCACTGCTG)", well: "G10", num: 79, sequence: "TCTCGGAGATAGTTCTCACTGCTG" },
    OntBarcode { label: "80_H10_NB80 (CGGATGAACATAGGATAGCGATTC)", well: "H10", num: 80, sequence: "CGGATGAACATAGGATAGCGATTC" },
    OntBarcode { label: "81_A11_NB81 (CCTCATCTTGTGAAGTTGTTTCGG)", well: "A11", num: 81, sequence: "CCTCATCTTGTGAAGTTGTTTCGG" },
    OntBarcode { label: "82_B11_NB82 (ACGGTATGTCGAGTTCCAGGACTA)", well: "B11", num: 82, sequence: "ACGGTATGTCGAGTTCCAGGACTA" },
    OntBarcode { label: "83_C11_NB83 (TGGCTTGATCTAGGTAAGGTCGAA)", well: "C11", num: 83, sequence: "TGGCTTGATCTAGGTAAGGTCGAA" },
    OntBarcode { label: "84_D11_NB84 (GTAGTGGACCTAGAACCTGTGCCA)", well: "D11", num: 84, sequence: "GTAGTGGACCTAGAACCTGTGCCA" },
    OntBarcode { label: "85_E11_NB85 (AACGGAGGAGTTAGTTGGATGATC)", well: "E11", num: 85, sequence: "AACGGAGGAGTTAGTTGGATGATC" },
    OntBarcode { label: "86_F11_NB86 (AGGTGATCCCAACAAGCGTAAGTA)", well: "F11", num: 86, sequence: "AGGTGATCCCAACAAGCGTAAGTA" },
    OntBarcode { label: "87_G11_NB87 (TACATGCTCCTGTTGTTAGGGAGG)", well: "G11", num: 87, sequence: "TACATGCTCCTGTTGTTAGGGAGG" },
    OntBarcode { label: "88_H11_NB88 (TCTTCTACTACCGATCCGAAGCAG)", well: "H11", num: 88, sequence: "TCTTCTACTACCGATCCGAAGCAG" },
    OntBarcode { label: "89_A12_NB89 (ACAGCATCAATGTTTGGCTAGTTG)", well: "A12", num: 89, sequence: "ACAGCATCAATGTTTGGCTAGTTG" },
    OntBarcode { label: "90_B12_NB90 (GATGTAGAGGGTACGGTTTGAGGC)", well: "B12", num: 90, sequence: "GATGTAGAGGGTACGGTTTGAGGC" },
    OntBarcode { label: "91_C12_NB91 (GGCTCCATAGGAACTCACGCTACT)", well: "C12", num: 91, sequence: "GGCTCCATAGGAACTCACGCTACT" },
    OntBarcode { label: "92_D12_NB92 (TTGTGAGTGGAAAGATACAGGACC)", well: "D12", num: 92, sequence: "TTGTGAGTGGAAAGATACAGGACC" },
    OntBarcode { label: "93_E12_NB93 (AGTTTCCATCACTTCAGACTTGGG)", well: "E12", num: 93, sequence: "AGTTTCCATCACTTCAGACTTGGG" },
    OntBarcode { label: "94_F12_NB94 (GATTGTCCTCAAACTGCCACCTAC)", well: "F12", num: 94, sequence: "GATTGTCCTCAAACTGCCACCTAC" },
    OntBarcode { label: "95_G12_NB95 (CCTGTCTGGAAGAAGAATGGACTT)", well: "G12", num: 95, sequence: "CCTGTCTGGAAGAAGAATGGACTT" },
    OntBarcode { label: "96_H12_NB96 (CTGAACGGTCATAGAGTCCACCAT)", well: "H12", num: 96, sequence: "CTGAACGGTCATAGAGTCCACCAT" },
];

/// Look up a native barcode by its full LIMS label.
pub fn ont_barcode(label: &str) -> Option<&'static OntBarcode> {
    ONT_BARCODES.iter().find(|b| b.label == label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_with_the_published_pattern() {
        let re = ont_label_re();
        for bc in ONT_BARCODES {
            let caps = re.captures(bc.label).expect("label matches pattern");
            assert_eq!(&caps[1], bc.well);
            assert_eq!(caps[2].parse::<u8>().unwrap(), bc.num);
            assert_eq!(&caps[3], bc.sequence);
        }
    }

    #[test]
    fn numbers_are_dense_and_unique() {
        assert_eq!(ONT_BARCODES.len(), 96);
        for (i, bc) in ONT_BARCODES.iter().enumerate() {
            assert_eq!(bc.num as usize, i + 1);
        }
    }
}
