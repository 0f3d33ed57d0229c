//! Concentration and amount conversions for nucleic-acid libraries.
//!
//! All conversions assume double-stranded material at the average molar
//! mass of 660 g/mol per base pair. These functions are the complete
//! allow-list callable from UDF formulas; nothing else is evaluated.

use crate::errors::{Error, Result};

/// Average molar mass of one double-stranded base pair, g/mol.
pub const BP_MOLAR_MASS: f64 = 660.0;

/// ng/ul → nM, given the fragment size in bp.
pub fn ng_ul_to_nm(conc: f64, size_bp: f64) -> f64 {
    conc / (size_bp * BP_MOLAR_MASS) * 1e6
}

/// nM → ng/ul, given the fragment size in bp.
pub fn nm_to_ng_ul(conc: f64, size_bp: f64) -> f64 {
    conc * size_bp * BP_MOLAR_MASS / 1e6
}

/// ng → fmol, given the fragment size in bp.
pub fn ng_to_fmol(ng: f64, size_bp: f64) -> f64 {
    ng / (size_bp * BP_MOLAR_MASS) * 1e6
}

/// fmol → ng, given the fragment size in bp.
pub fn fmol_to_ng(fmol: f64, size_bp: f64) -> f64 {
    fmol * size_bp * BP_MOLAR_MASS / 1e6
}

/// Force a concentration to be in ng/ul.
///
/// `size_bp` is only required when the value actually needs converting.
/// An unrecognized unit string is a fatal input error, not a skip.
pub fn ng_ul(conc: f64, conc_units: &str, size_bp: Option<f64>) -> Result<f64> {
    match conc_units {
        "ng/ul" => Ok(conc),
        "nM" => {
            let size = size_bp.ok_or(Error::MissingSize)?;
            Ok(nm_to_ng_ul(conc, size))
        }
        other => Err(Error::UnknownUnits(other.to_string())),
    }
}

/// Force a concentration to be in nM.
pub fn nm(conc: f64, conc_units: &str, size_bp: Option<f64>) -> Result<f64> {
    match conc_units {
        "nM" => Ok(conc),
        "ng/ul" => {
            let size = size_bp.ok_or(Error::MissingSize)?;
            Ok(ng_ul_to_nm(conc, size))
        }
        other => Err(Error::UnknownUnits(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mass_and_molar_conversions_invert() {
        let nm_val = ng_ul_to_nm(10.0, 300.0);
        assert!((nm_to_ng_ul(nm_val, 300.0) - 10.0).abs() < 1e-9);
        let fmol = ng_to_fmol(50.0, 300.0);
        assert!((fmol_to_ng(fmol, 300.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn coercion_is_identity_for_matching_units() {
        assert_eq!(ng_ul(10.0, "ng/ul", None).unwrap(), 10.0);
        assert_eq!(nm(25.0, "nM", None).unwrap(), 25.0);
    }

    #[test]
    fn conversion_without_size_fails() {
        assert!(matches!(
            ng_ul(10.0, "nM", None).unwrap_err(),
            Error::MissingSize
        ));
    }

    #[test]
    fn unknown_units_are_fatal() {
        assert!(matches!(
            nm(10.0, "pg/ml", Some(300.0)).unwrap_err(),
            Error::UnknownUnits(_)
        ));
    }
}
