//! The UDF formula engine.
//!
//! A step carries a multi-line text UDF whose rows are assignment formulas:
//!
//! ```text
//! outp['Amount (ng)'] = ng_ul(outp['Concentration'], outp['Conc. Units'], outp['Size (bp)']) * outp['Volume (ul)']
//! outp['Amount (fmol)'] == ng_to_fmol(outp['Amount (ng)'], outp['Size (bp)'])
//! ```
//!
//! A placeholder is `scope['name']` or `scope['name1','name2',...]` with an
//! optional `_` prefix requesting recursive resolution through processing
//! history. `scope` is `inp` (input artifact), `outp` (output artifact) or
//! `step`. Multiple names are a priority list: the first defined name wins.
//! `=` always assigns; `==` assigns only when the target is still unset,
//! which lets several formulas targeting the same UDF be stacked in
//! priority order.
//!
//! Failure semantics: malformed formula text is fatal for the whole run;
//! a placeholder that does not resolve for one input/output pairing only
//! skips that pairing, logged at warning level.

use std::fmt;
use std::path::Path;

use log::{info, warn};
use regex::Regex;

use crate::arith::{self, Value, ALLOWED_FUNCTIONS, ALLOWED_STRINGS};
use crate::errors::{Error, Result};
use crate::model::{Snapshot, Step, UdfValue};
use crate::traceback;

/// Which attribute store a placeholder reads or writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Input,
    Output,
    Step,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Input => write!(f, "inp"),
            Scope::Output => write!(f, "outp"),
            Scope::Step => write!(f, "step"),
        }
    }
}

/// A parsed UDF placeholder.
#[derive(Clone, Debug)]
pub struct Placeholder {
    /// Verbatim text, for logging.
    pub raw: String,
    pub scope: Scope,
    pub recursive: bool,
    /// Priority-ordered candidate UDF names, at least one.
    pub names: Vec<String>,
}

/// A parsed formula: target placeholder, reads and the slotted right-hand
/// side ready for value substitution.
#[derive(Clone, Debug)]
pub struct Formula {
    pub raw: String,
    /// Whole formula with placeholders replaced by `{}` slots.
    pub slotted: String,
    /// Right-hand side with one slot per element of `reads`.
    pub rhs_slotted: String,
    pub target: Placeholder,
    pub reads: Vec<Placeholder>,
    /// True for `==` (write only when the target is unset).
    pub conditional: bool,
}

fn placeholder_re() -> Regex {
    Regex::new(r"_?(inp|outp|step)\[[^\]]*?\]").expect("static pattern")
}

fn parse_placeholder(raw: &str) -> Result<Placeholder> {
    let recursive = raw.starts_with('_');
    // The scope tag sits before the bracket; matching on the whole text
    // would trip over UDF names like 'input volume'.
    let head = raw.split('[').next().unwrap_or(raw).trim_start_matches('_');
    let scope = match head {
        "inp" => Scope::Input,
        "outp" => Scope::Output,
        "step" => Scope::Step,
        other => {
            return Err(Error::Formula {
                formula: raw.to_string(),
                reason: format!("unknown placeholder scope '{other}'"),
            })
        }
    };
    let name_re = Regex::new(r"'([^']*)'").expect("static pattern");
    let names: Vec<String> = name_re
        .captures_iter(raw)
        .map(|c| c[1].to_string())
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return Err(Error::Formula {
            formula: raw.to_string(),
            reason: "placeholder names no quoted UDF name".to_string(),
        });
    }
    if recursive && scope == Scope::Step {
        return Err(Error::Formula {
            formula: raw.to_string(),
            reason: "recursive UDF references are only allowed for artifacts".to_string(),
        });
    }
    Ok(Placeholder {
        raw: raw.to_string(),
        scope,
        recursive,
        names,
    })
}

/// Parse one formula line.
///
/// Besides extracting the placeholders this validates that nothing but
/// pure arithmetic remains once placeholders, allow-listed function names,
/// allow-listed unit strings and commas are removed. This guard keeps
/// the subsequent evaluation from ever seeing free-form text.
pub fn parse_formula(raw: &str) -> Result<Formula> {
    info!("Parsing formula:\n\t{raw}");
    let fatal = |reason: String| Error::Formula {
        formula: raw.to_string(),
        reason,
    };

    let re = placeholder_re();
    let placeholders: Vec<Placeholder> = re
        .find_iter(raw)
        .map(|m| parse_placeholder(m.as_str()))
        .collect::<Result<_>>()?;
    let slotted = re.replace_all(raw, "{}").to_string();

    if slotted.matches("{}").count() != placeholders.len() {
        return Err(fatal(format!(
            "number of extracted UDF references ({}) does not match number of format placeholders ({})",
            placeholders.len(),
            slotted.matches("{}").count()
        )));
    }

    // Injection guard: longest function names are stripped first so that
    // e.g. `ng_ul_to_nM` is not eaten piecemeal by `ng_ul` and `nM`.
    let mut residue = slotted.clone();
    let mut functions: Vec<&str> = ALLOWED_FUNCTIONS.to_vec();
    functions.sort_by_key(|f| std::cmp::Reverse(f.len()));
    for f in functions {
        residue = residue.replace(f, "");
    }
    for s in ALLOWED_STRINGS {
        residue = residue.replace(s, "");
    }
    residue = residue.replace(',', "");
    let pure_math = Regex::new(r"^[=\d\+\-\*/\(\)\{\}\s\.]*$").expect("static pattern");
    if !pure_math.is_match(&residue) {
        return Err(fatal(
            "formula appears to contain disallowed characters".to_string(),
        ));
    }

    // The first placeholder is the assignment target.
    let split_re = Regex::new(r"^\s*\{\}\s*(==|=)\s*(.+)$").expect("static pattern");
    let caps = split_re.captures(&slotted).ok_or_else(|| {
        fatal("left-hand side must be a single isolated UDF placeholder".to_string())
    })?;
    let conditional = &caps[1] == "==";
    let rhs_slotted = caps[2].trim().to_string();

    let mut iter = placeholders.into_iter();
    let target = iter.next().ok_or_else(|| {
        fatal("formula contains no UDF placeholders".to_string())
    })?;
    let reads: Vec<Placeholder> = iter.collect();

    if target.recursive {
        return Err(fatal("assignment target cannot be recursive".to_string()));
    }
    if target.names.len() != 1 {
        return Err(fatal(
            "assignment target must name exactly one UDF".to_string(),
        ));
    }
    if rhs_slotted.matches("{}").count() != reads.len() {
        return Err(fatal(
            "all read placeholders must sit on the right-hand side".to_string(),
        ));
    }

    Ok(Formula {
        raw: raw.to_string(),
        slotted,
        rhs_slotted,
        target,
        reads,
        conditional,
    })
}

/// Extract formula rows from a step text UDF. Blank rows and `#` comment
/// rows are skipped; an empty or missing field is a fatal input error.
pub fn formulas_from_field(step: &Step, field: &str) -> Result<Vec<String>> {
    let contents = step
        .udf
        .get(field)
        .and_then(|v| v.as_str().map(str::to_string))
        .ok_or_else(|| Error::MissingStepField(field.to_string()))?;
    if contents.trim().is_empty() {
        return Err(Error::MissingStepField(field.to_string()));
    }
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|row| !row.is_empty() && !row.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// One unit of work for formula application, held by artifact id so the
/// snapshot can be mutated between pairings.
#[derive(Clone, Debug)]
struct PairIds {
    input: Option<String>,
    output: Option<String>,
}

/// Outcome counts of applying one formula across a step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub written: usize,
    pub already_set: usize,
    pub skipped: usize,
}

impl std::ops::AddAssign for ApplyStats {
    fn add_assign(&mut self, rhs: Self) {
        self.written += rhs.written;
        self.already_set += rhs.already_set;
        self.skipped += rhs.skipped;
    }
}

/// Resolve a read placeholder for one pairing. `Ok(None)` is the
/// non-fatal "unresolvable" outcome that skips the pairing.
fn resolve(
    snapshot: &Snapshot,
    pair: &PairIds,
    ph: &Placeholder,
) -> Result<Option<UdfValue>> {
    let names: Vec<&str> = ph.names.iter().map(String::as_str).collect();
    let artifact_id = match ph.scope {
        Scope::Input => Some(pair.input.as_deref().ok_or_else(|| Error::Formula {
            formula: ph.raw.clone(),
            reason: "input artifact not provided".to_string(),
        })?),
        Scope::Output => Some(pair.output.as_deref().ok_or_else(|| Error::Formula {
            formula: ph.raw.clone(),
            reason: "output artifact not provided".to_string(),
        })?),
        Scope::Step => None,
    };

    let value = match artifact_id {
        None => snapshot.step.udf.get_chain(&names).map(|(_, v)| v.clone()),
        Some(id) => {
            let art = snapshot.artifact(id)?;
            if ph.recursive {
                traceback::fetch_last(snapshot, art, &names, true)
                    .ok()
                    .map(|found| found.value)
            } else {
                art.udf.get_chain(&names).map(|(_, v)| v.clone())
            }
        }
    };

    if value.is_none() {
        warn!("Could not resolve UDF {} for this pairing", ph.raw);
    }
    Ok(value)
}

/// Render a resolved value for substitution into the expression text.
/// Strings are re-quoted so the evaluator treats them as literals.
fn render_value(v: &UdfValue) -> String {
    match v {
        UdfValue::Int(i) => i.to_string(),
        UdfValue::Float(f) => f.to_string(),
        UdfValue::Str(s) => format!("'{s}'"),
    }
}

fn fill_slots(slotted: &str, values: &[String]) -> Result<String> {
    let parts: Vec<&str> = slotted.split("{}").collect();
    if parts.len() != values.len() + 1 {
        return Err(Error::Formula {
            formula: slotted.to_string(),
            reason: "slot/value count mismatch".to_string(),
        });
    }
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        out.push_str(part);
        if let Some(v) = values.get(i) {
            out.push_str(v);
        }
    }
    Ok(out)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Apply one parsed formula to one pairing. Returns the per-pairing stats.
fn apply_to_pair(
    snapshot: &mut Snapshot,
    pair: &PairIds,
    formula: &Formula,
) -> Result<ApplyStats> {
    // Resolve all reads first; any miss abandons this pairing quietly.
    let mut values = Vec::with_capacity(formula.reads.len());
    for ph in &formula.reads {
        match resolve(snapshot, pair, ph)? {
            Some(v) => values.push(v),
            None => {
                warn!("Skipping calculation");
                return Ok(ApplyStats {
                    skipped: 1,
                    ..Default::default()
                });
            }
        }
    }

    let rendered: Vec<String> = values.iter().map(render_value).collect();
    let expr = fill_slots(&formula.rhs_slotted, &rendered)?;
    let result = arith::eval(&expr)?;

    info!("        Formula:  {}", formula.raw);
    info!(
        "    Calculation:  {} = {}",
        match &result {
            Value::Num(n) => format!("{:.2}", n),
            Value::Str(s) => s.clone(),
        },
        expr
    );

    let value = match result {
        Value::Num(n) => UdfValue::Float(round2(n)),
        Value::Str(s) => UdfValue::Str(s),
    };

    // Locate the target store.
    let target_name = &formula.target.names[0];
    let store = match formula.target.scope {
        Scope::Step => &mut snapshot.step.udf,
        Scope::Input => {
            let id = pair.input.clone().ok_or_else(|| Error::Formula {
                formula: formula.raw.clone(),
                reason: "input artifact not provided".to_string(),
            })?;
            &mut snapshot.artifact_mut(&id)?.udf
        }
        Scope::Output => {
            let id = pair.output.clone().ok_or_else(|| Error::Formula {
                formula: formula.raw.clone(),
                reason: "output artifact not provided".to_string(),
            })?;
            &mut snapshot.artifact_mut(&id)?.udf
        }
    };

    if formula.conditional && store.is_set(target_name) {
        info!(
            "Target UDF '{}' is already set, assignment considered satisfied",
            target_name
        );
        return Ok(ApplyStats {
            already_set: 1,
            ..Default::default()
        });
    }
    store.set(target_name, value);
    Ok(ApplyStats {
        written: 1,
        ..Default::default()
    })
}

/// Apply one parsed formula across all pairings of the current step,
/// persisting the snapshot after every write.
pub fn apply_formula(
    snapshot: &mut Snapshot,
    snapshot_path: Option<&Path>,
    formula: &Formula,
) -> Result<ApplyStats> {
    let step = snapshot.step.clone();
    let pairs: Vec<PairIds> = {
        let full: Vec<PairIds> = snapshot
            .analyte_io_pairs(&step)?
            .iter()
            .filter(|p| p.input.is_some() && p.output.is_some())
            .map(|p| PairIds {
                input: p.input.map(|a| a.id.clone()),
                output: p.output.map(|a| a.id.clone()),
            })
            .collect();
        if !full.is_empty() {
            info!("Step type: Standard input-output");
            full
        } else {
            info!("Step type: No-output");
            snapshot
                .analyte_inputs(&step)?
                .iter()
                .map(|a| PairIds {
                    input: Some(a.id.clone()),
                    output: None,
                })
                .collect()
        }
    };

    let mut stats = ApplyStats::default();
    for pair in &pairs {
        match (&pair.input, &pair.output) {
            (Some(i), Some(o)) => {
                let in_name = &snapshot.artifact(i)?.name;
                let out_name = &snapshot.artifact(o)?.name;
                info!(
                    "Calculations for input-output '{in_name}' ({i}) --> '{out_name}' ({o})"
                );
            }
            (Some(i), None) => {
                info!("Calculations for input '{}' ({i})", snapshot.artifact(i)?.name);
            }
            _ => {}
        }
        let outcome = apply_to_pair(snapshot, pair, formula)?;
        if outcome.written > 0 {
            if let Some(path) = snapshot_path {
                snapshot.save(path)?;
            }
        }
        stats += outcome;
    }
    Ok(stats)
}

/// Full run: read the formula field, parse every row (fatal on the first
/// malformed one), apply them in order.
pub fn run_udf_formulas(
    snapshot: &mut Snapshot,
    snapshot_path: Option<&Path>,
    formula_field: &str,
) -> Result<ApplyStats> {
    let rows = formulas_from_field(&snapshot.step, formula_field)?;
    let mut stats = ApplyStats::default();
    for row in rows {
        let formula = parse_formula(&row)?;
        stats += apply_formula(snapshot, snapshot_path, &formula)?;
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::snapshot_with_pair;
    use crate::model::UdfValue;

    fn outp(snapshot: &Snapshot) -> &crate::model::Artifact {
        snapshot.artifact("out1").unwrap()
    }

    fn set_out(snapshot: &mut Snapshot, name: &str, v: UdfValue) {
        snapshot.artifacts.get_mut("out1").unwrap().udf.set(name, v);
    }

    #[test]
    fn parses_placeholders_and_slots() {
        let f = parse_formula(
            "outp['Amount (ng)'] = ng_ul(outp['Concentration'], outp['Conc. Units'], outp['Size (bp)']) * outp['Volume (ul)']",
        )
        .unwrap();
        assert!(!f.conditional);
        assert_eq!(f.target.names, vec!["Amount (ng)".to_string()]);
        assert_eq!(f.reads.len(), 4);
        assert_eq!(
            f.rhs_slotted,
            "ng_ul({}, {}, {}) * {}"
        );
    }

    #[test]
    fn rejects_disallowed_text() {
        let err = parse_formula("outp['x'] = os.system('rm -rf /')").unwrap_err();
        assert!(matches!(err, Error::Formula { .. }));
        let err = parse_formula("outp['x'] = exec(1)").unwrap_err();
        assert!(matches!(err, Error::Formula { .. }));
    }

    #[test]
    fn recursive_step_placeholder_is_rejected() {
        assert!(parse_formula("outp['x'] = _step['y'] + 1").is_err());
    }

    #[test]
    fn recursive_target_is_rejected() {
        assert!(parse_formula("_outp['x'] = 1 + 1").is_err());
    }

    #[test]
    fn priority_list_takes_first_defined_name() {
        let mut snap = snapshot_with_pair();
        set_out(&mut snap, "Size (bp)", UdfValue::Int(300));
        set_out(&mut snap, "Fragment size", UdfValue::Int(111));
        let f = parse_formula("outp['Picked'] = outp['Average size','Size (bp)','Fragment size'] * 1").unwrap();
        apply_formula(&mut snap, None, &f).unwrap();
        assert_eq!(
            outp(&snap).udf.get("Picked"),
            Some(&UdfValue::Float(300.0))
        );
    }

    #[test]
    fn amount_formula_yields_50_ng() {
        let mut snap = snapshot_with_pair();
        set_out(&mut snap, "Concentration", UdfValue::Int(10));
        set_out(&mut snap, "Conc. Units", UdfValue::Str("ng/ul".to_string()));
        set_out(&mut snap, "Size (bp)", UdfValue::Int(300));
        set_out(&mut snap, "Volume (ul)", UdfValue::Int(5));
        let f = parse_formula(
            "outp['Amount (ng)'] = ng_ul(outp['Concentration'], outp['Conc. Units'], outp['Size (bp)']) * outp['Volume (ul)']",
        )
        .unwrap();
        let stats = apply_formula(&mut snap, None, &f).unwrap();
        assert_eq!(stats.written, 1);
        assert_eq!(
            outp(&snap).udf.get("Amount (ng)"),
            Some(&UdfValue::Float(50.0))
        );
    }

    #[test]
    fn unresolved_read_skips_pairing_without_error() {
        let mut snap = snapshot_with_pair();
        let f = parse_formula("outp['Amount (ng)'] = outp['Concentration'] * 2").unwrap();
        let stats = apply_formula(&mut snap, None, &f).unwrap();
        assert_eq!(stats.skipped, 1);
        assert!(!outp(&snap).udf.is_set("Amount (ng)"));
    }

    #[test]
    fn conditional_assignment_is_idempotent() {
        let mut snap = snapshot_with_pair();
        set_out(&mut snap, "Volume (ul)", UdfValue::Int(5));
        let f = parse_formula("outp['Loaded'] == outp['Volume (ul)'] * 2").unwrap();

        let first = apply_formula(&mut snap, None, &f).unwrap();
        assert_eq!(first.written, 1);
        assert_eq!(outp(&snap).udf.get("Loaded"), Some(&UdfValue::Float(10.0)));

        // Change the input; a second run must leave the target untouched.
        set_out(&mut snap, "Volume (ul)", UdfValue::Int(50));
        let second = apply_formula(&mut snap, None, &f).unwrap();
        assert_eq!(second.already_set, 1);
        assert_eq!(outp(&snap).udf.get("Loaded"), Some(&UdfValue::Float(10.0)));
    }

    #[test]
    fn plain_assignment_overwrites() {
        let mut snap = snapshot_with_pair();
        set_out(&mut snap, "Volume (ul)", UdfValue::Int(5));
        set_out(&mut snap, "Loaded", UdfValue::Float(1.0));
        let f = parse_formula("outp['Loaded'] = outp['Volume (ul)'] * 2").unwrap();
        apply_formula(&mut snap, None, &f).unwrap();
        assert_eq!(outp(&snap).udf.get("Loaded"), Some(&UdfValue::Float(10.0)));
    }

    #[test]
    fn results_round_to_two_decimals() {
        let mut snap = snapshot_with_pair();
        set_out(&mut snap, "Concentration", UdfValue::Float(10.0));
        set_out(&mut snap, "Size (bp)", UdfValue::Int(300));
        let f =
            parse_formula("outp['nM'] = nM(outp['Concentration'], 'ng/ul', outp['Size (bp)'])")
                .unwrap();
        apply_formula(&mut snap, None, &f).unwrap();
        // 10 / (300 * 660) * 1e6 = 50.5050... -> 50.51
        assert_eq!(outp(&snap).udf.get("nM"), Some(&UdfValue::Float(50.51)));
    }

    #[test]
    fn string_results_are_written_verbatim() {
        let mut snap = snapshot_with_pair();
        set_out(&mut snap, "Conc. Units", UdfValue::Str("nM".to_string()));
        let f = parse_formula("outp['Units out'] = outp['Conc. Units']").unwrap();
        apply_formula(&mut snap, None, &f).unwrap();
        assert_eq!(
            outp(&snap).udf.get("Units out"),
            Some(&UdfValue::Str("nM".to_string()))
        );
    }

    #[test]
    fn formula_field_rows_skip_comments_and_blanks() {
        let mut snap = snapshot_with_pair();
        snap.step.udf.set(
            "UDF formulas",
            UdfValue::Str("# header\n\noutp['a'] = 1 + 1\n".to_string()),
        );
        let rows = formulas_from_field(&snap.step, "UDF formulas").unwrap();
        assert_eq!(rows, vec!["outp['a'] = 1 + 1".to_string()]);
        assert!(formulas_from_field(&snap.step, "Missing field").is_err());
    }
}
