//! PhiX control library index sets for the sequencing-run manifest.
//!
//! Keys are the exact options of the LIMS dropdown UDF naming the loaded
//! control kit; each set contributes one manifest row per index pair.

/// One control set: the LIMS dropdown option, the short sample name used
/// in the manifest, and the control index pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhixSet {
    pub option: &'static str,
    pub nickname: &'static str,
    pub indices: &'static [(&'static str, &'static str)],
}

/// All supported control sets.
pub const PHIX_SETS: &[PhixSet] = &[
    PhixSet {
        option: "PhiX Control Library, Adept",
        nickname: "PhiX_Adept",
        indices: &[
            ("ATGTCGCTAG", "CTAGCTCGTA"),
            ("CACAGATCGT", "ACGAGAGTCT"),
            ("GCACATAGTC", "GACTACTAGC"),
            ("TGTGTCGACA", "TGTCTGACAG"),
        ],
    },
    PhixSet {
        option: "Cloudbreak PhiX Control Library, Elevate",
        nickname: "PhiX_Elevate",
        indices: &[
            ("ACGTGTAGC", "GCTAGTGCA"),
            ("CACATGCTG", "AGACACTGT"),
            ("GTACACGAT", "CTCGTACAG"),
            ("TGTGCATCA", "TAGTCGATC"),
        ],
    },
    PhixSet {
        option: "Cloudbreak Freestyle PhiX Control, Third Party",
        nickname: "PhiX_Third",
        indices: &[
            ("ATGTCGCTAG", "CTAGCTCGTA"),
            ("CACAGATCGT", "ACGAGAGTCT"),
            ("GCACATAGTC", "GACTACTAGC"),
            ("TGTGTCGACA", "TGTCTGACAG"),
        ],
    },
];

/// Look up a control set by the LIMS dropdown option.
pub fn phix_set(option: &str) -> Option<&'static PhixSet> {
    PHIX_SETS.iter().find(|s| s.option == option)
}
