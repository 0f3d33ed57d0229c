//! Sequencing-run manifest generation.
//!
//! For a sequencing-run step the output analytes are the loaded lanes;
//! each is a pool whose samples carry reagent labels. Row assembly expands
//! every label into its index value(s), attaches lane/project/recipe and
//! kit-specific settings, appends PhiX control rows, validates pairwise
//! index distances per lane and renders several manifest *flavors* from
//! the same validated row set:
//!
//! - `untrimmed`: indices at raw length;
//! - `trimmed`: indices truncated to the configured index-read cycles;
//! - `phix`: trimmed, controls only;
//! - `empty`: section headers without samples, for controls-only runs.
//!
//! A flavor whose precondition fails (indices shorter than the cycle
//! count, index collisions after trimming) is skipped with a logged error
//! and an empty file in the bundle; the other flavors still render.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use zip::write::SimpleFileOptions;

use crate::distance::{self, IndexedRow, LANE_WARN_THRESHOLD};
use crate::data::phix;
use crate::errors::{Error, Result};
use crate::indexes::{self, IndexPair};
use crate::model::{Snapshot, UdfValue};

/// Manifest flavors, rendered in bundle order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flavor {
    Untrimmed,
    Trimmed,
    Phix,
    Empty,
}

impl Flavor {
    pub const ALL: [Flavor; 4] = [Flavor::Untrimmed, Flavor::Trimmed, Flavor::Phix, Flavor::Empty];

    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::Untrimmed => "untrimmed",
            Flavor::Trimmed => "trimmed",
            Flavor::Phix => "phix",
            Flavor::Empty => "empty",
        }
    }
}

/// One assembled manifest row.
#[derive(Clone, Debug, PartialEq)]
pub struct ManifestRow {
    pub sample_name: String,
    pub index1: String,
    pub index2: String,
    pub lane: String,
    pub project: String,
    pub recipe: String,
    pub label: String,
    pub settings: String,
}

impl ManifestRow {
    fn indexed(&self) -> IndexedRow {
        IndexedRow {
            sample_name: self.sample_name.clone(),
            index1: self.index1.clone(),
            index2: self.index2.clone(),
            lane: self.lane.clone(),
        }
    }
}

/// A validated manifest ready for flavor rendering.
#[derive(Clone, Debug)]
pub struct RunManifest {
    pub root_name: String,
    pub step_name: String,
    pub step_id: String,
    pub idx1_cycles: Option<usize>,
    pub idx2_cycles: Option<usize>,
    pub rows: Vec<ManifestRow>,
}

/// Turn key/value settings into the single manifest settings column.
/// Separator characters are not allowed in either side.
pub fn settings_column(pairs: &[(&str, &str)]) -> Result<String> {
    for (k, v) in pairs {
        for ch in [',', ':', ' '] {
            if k.contains(ch) || v.contains(ch) {
                return Err(Error::Invalid(format!(
                    "character '{ch}' not allowed in manifest columns"
                )));
            }
        }
    }
    Ok(pairs
        .iter()
        .map(|(k, v)| format!("{k}:{v}"))
        .collect::<Vec<_>>()
        .join(" "))
}

/// The flowcell id is the shared name of the output container(s).
pub fn flowcell_id(snapshot: &Snapshot) -> Result<String> {
    let containers = snapshot.output_containers(&snapshot.step)?;
    let mut names: Vec<&str> = containers.iter().map(|c| c.name.as_str()).collect();
    names.dedup();
    match names.as_slice() {
        [one] => {
            if one.contains('-') {
                warn!(
                    "Container name {one} contains a dash, did you forget to set the name of the LIMS container to the flowcell ID?"
                );
            }
            Ok(one.to_string())
        }
        _ => Err(Error::SheetConstraint("expected one flowcell ID".to_string())),
    }
}

fn udf_usize(udf: Option<&UdfValue>) -> Option<usize> {
    udf.and_then(UdfValue::as_f64).map(|f| f as usize)
}

impl RunManifest {
    /// Assemble and validate the manifest rows for the current step.
    pub fn build(snapshot: &Snapshot, root_name: impl Into<String>) -> Result<Self> {
        let step = &snapshot.step;
        let pools = snapshot.analyte_outputs(step)?;
        if pools.is_empty() || pools.len() > 2 {
            return Err(Error::SheetConstraint(
                "expected one or two output analytes".to_string(),
            ));
        }

        // Lane assignment comes from the container well.
        let mut pool_lanes: Vec<(&crate::model::Artifact, String)> = Vec::new();
        for &pool in &pools {
            let lane = pool
                .location
                .as_ref()
                .map(|(_, well)| well.split(':').next().unwrap_or(well).to_string())
                .ok_or_else(|| {
                    Error::SheetConstraint(format!("pool '{}' has no placement", pool.name))
                })?;
            pool_lanes.push((pool, lane));
        }
        let mut lanes: Vec<String> = pool_lanes.iter().map(|(_, l)| l.clone()).collect();
        lanes.sort_unstable();
        lanes.dedup();
        if !(lanes == ["1"] || lanes == ["1", "2"]) {
            return Err(Error::SheetConstraint(
                "expected a single-lane or dual-lane flowcell".to_string(),
            ));
        }
        pool_lanes.sort_by(|a, b| a.1.cmp(&b.1));

        let idx2_cycles = udf_usize(step.udf.get("Index Read 2"));
        let mut rows: Vec<ManifestRow> = Vec::new();

        for (pool, lane) in &pool_lanes {
            let mut labels = pool.reagent_labels.clone();
            labels.sort_unstable();
            labels.dedup();
            if labels.len() != pool.reagent_labels.len() {
                return Err(Error::SheetConstraint(format!(
                    "detected non-unique reagent labels in lane {lane}"
                )));
            }

            let phix_loaded = pool
                .udf
                .get("% phiX")
                .and_then(UdfValue::as_f64)
                .unwrap_or(0.0);
            let phix_set_name = pool
                .udf
                .get("Element PhiX Set")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            if phix_loaded != 0.0 && phix_set_name.is_empty() {
                return Err(Error::SheetConstraint(
                    "PhiX controls loaded but no kit specified".to_string(),
                ));
            }
            if phix_loaded == 0.0 && !phix_set_name.is_empty() {
                return Err(Error::SheetConstraint(
                    "PhiX controls specified but not loaded".to_string(),
                ));
            }

            for sample_id in &pool.samples {
                let sample = snapshot.sample(sample_id)?;
                let (project, recipe, user_library) =
                    match snapshot.sample_project(sample)? {
                        Some(project) => {
                            let name = project.name.replace('.', "__").replace(',', "");
                            let recipe = project
                                .udf
                                .get("Sequencing setup")
                                .map(|v| v.to_string())
                                .unwrap_or_else(|| "0-0".to_string());
                            let user_library = project
                                .udf
                                .get("Library construction method")
                                .and_then(|v| v.as_str())
                                == Some("Finished library (by user)");
                            (name, recipe, user_library)
                        }
                        None => ("Control".to_string(), "0-0".to_string(), false),
                    };

                let label = snapshot.sample_label(pool, sample_id)?;
                for idx in indexes::expand_label(label)? {
                    let IndexPair { index1, mut index2 } = idx;
                    if index2.is_empty() {
                        // A long index2 read with no index2 in the label
                        // means the second index read is a UMI.
                        match idx2_cycles {
                            Some(cycles) if cycles > 12 => index2 = "N".repeat(cycles),
                            _ => {}
                        }
                    } else if !user_library || indexes::is_combinatorial_kit(label) {
                        info!("Reverse-complementing index2 of {}.", sample.name);
                        index2 = indexes::revcomp(&index2);
                    }

                    let settings = if indexes::is_tenx_single(label) {
                        // 8-base single-index kits want index 1 written to
                        // a separate FastQ file.
                        settings_column(&[("I1Fastq", "True")])?
                    } else {
                        String::new()
                    };

                    rows.push(ManifestRow {
                        sample_name: sample.name.clone(),
                        index1,
                        index2,
                        lane: lane.clone(),
                        project: project.clone(),
                        recipe: recipe.clone(),
                        label: label.to_string(),
                        settings,
                    });
                }
            }

            // Control rows for the lane.
            if phix_loaded != 0.0 {
                let set = phix::phix_set(&phix_set_name).ok_or_else(|| {
                    Error::SheetConstraint(format!("unknown PhiX set '{phix_set_name}'"))
                })?;
                for (i1, i2) in set.indices {
                    rows.push(ManifestRow {
                        sample_name: set.nickname.to_string(),
                        index1: i1.to_string(),
                        index2: i2.to_string(),
                        lane: lane.clone(),
                        project: "Control".to_string(),
                        recipe: "0-0".to_string(),
                        label: String::new(),
                        settings: String::new(),
                    });
                }
            }
        }

        rows.sort_by(|a, b| (a.lane.as_str(), a.sample_name.as_str())
            .cmp(&(b.lane.as_str(), b.sample_name.as_str())));

        // Collision check per lane, across samples and controls, before
        // anything is rendered.
        for lane in lanes {
            let lane_rows: Vec<IndexedRow> = rows
                .iter()
                .filter(|r| r.lane == lane)
                .map(ManifestRow::indexed)
                .collect();
            distance::check_lane_distances(&lane_rows, LANE_WARN_THRESHOLD)?;
        }

        Ok(RunManifest {
            root_name: root_name.into(),
            step_name: step.type_name.clone(),
            step_id: step.id.clone(),
            idx1_cycles: udf_usize(step.udf.get("Index Read 1")),
            idx2_cycles,
            rows,
        })
    }

    fn samples_csv(rows: &[ManifestRow]) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record([
            "SampleName",
            "Index1",
            "Index2",
            "Lane",
            "Project",
            "Recipe",
            "lims_label",
            "settings",
        ])
        .map_err(|e| Error::Invalid(format!("could not write manifest CSV: {e}")))?;
        for r in rows {
            wtr.write_record([
                r.sample_name.as_str(),
                r.index1.as_str(),
                r.index2.as_str(),
                r.lane.as_str(),
                r.project.as_str(),
                r.recipe.as_str(),
                r.label.as_str(),
                r.settings.as_str(),
            ])
            .map_err(|e| Error::Invalid(format!("could not write manifest CSV: {e}")))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| Error::Invalid(format!("could not write manifest CSV: {e}")))?;
        String::from_utf8(bytes).map_err(|e| Error::Invalid(e.to_string()))
    }

    /// Truncate indices to the configured cycle counts. Indices shorter
    /// than the cycle count fail the flavor; longer ones trim with a log
    /// entry.
    fn trim_rows(&self, flavor: Flavor, mut rows: Vec<ManifestRow>) -> Result<Vec<ManifestRow>> {
        let (Some(c1), Some(c2)) = (self.idx1_cycles, self.idx2_cycles) else {
            return Err(Error::Sheet {
                flavor: flavor.as_str().to_string(),
                reason: "index cycle counts are not set on the step".to_string(),
            });
        };
        for (pick, cycles, name) in [
            (0usize, c1, "Index1"),
            (1usize, c2, "Index2"),
        ] {
            let get = |r: &ManifestRow| if pick == 0 { r.index1.clone() } else { r.index2.clone() };
            let short: Vec<&ManifestRow> =
                rows.iter().filter(|r| get(r).len() < cycles).collect();
            if !short.is_empty() {
                for r in &short {
                    error!(
                        "'{}' has {name} '{}' of length {} shorter than {cycles} cycles.",
                        r.sample_name,
                        get(r),
                        get(r).len()
                    );
                }
                return Err(Error::Sheet {
                    flavor: flavor.as_str().to_string(),
                    reason: "indexes are shorter than the number of index cycles".to_string(),
                });
            }
            for r in rows.iter_mut() {
                let idx = if pick == 0 { &mut r.index1 } else { &mut r.index2 };
                if idx.len() > cycles {
                    info!(
                        "Trimming '{}' {name} '{}' of length {} to {cycles} cycles.",
                        r.sample_name,
                        idx,
                        idx.len()
                    );
                    idx.truncate(cycles);
                }
            }
        }
        Ok(rows)
    }

    /// Demultiplexer mismatch thresholds across all lanes of a row set.
    fn thresholds(&self, flavor: Flavor, rows: &[ManifestRow]) -> Result<(u8, u8)> {
        let mut lanes: Vec<&str> = rows.iter().map(|r| r.lane.as_str()).collect();
        lanes.sort_unstable();
        lanes.dedup();
        let mut t = (1u8, 1u8);
        for lane in lanes {
            let lane_rows: Vec<IndexedRow> = rows
                .iter()
                .filter(|r| r.lane == lane)
                .map(ManifestRow::indexed)
                .collect();
            let (i1, i2) =
                distance::mismatch_thresholds(&lane_rows).map_err(|e| Error::Sheet {
                    flavor: flavor.as_str().to_string(),
                    reason: e.to_string(),
                })?;
            t = (t.0.min(i1), t.1.min(i2));
        }
        Ok(t)
    }

    /// File name for one flavor.
    pub fn file_name(&self, flavor: Flavor) -> String {
        format!("{}_{}.csv", self.root_name, flavor.as_str())
    }

    /// Render one flavor. `Ok(None)` means the flavor's precondition
    /// failed, which was logged; the run carries on with the others.
    pub fn render(&self, flavor: Flavor) -> Result<Option<String>> {
        info!("Building {} manifest...", flavor.as_str());
        let file_name = self.file_name(flavor);

        let run_values = format!(
            "[RUNVALUES]\nKeyName, Value\nlims_step_name, {}\nlims_step_id, {}\nmanifest_file, {}",
            self.step_name, self.step_id, file_name
        );
        let mut settings = "[SETTINGS]\nSettingName, Value".to_string();

        let samples_section = match flavor {
            Flavor::Untrimmed => format!("[SAMPLES]\n{}", Self::samples_csv(&self.rows)?),
            Flavor::Trimmed | Flavor::Phix => {
                let mut rows = self.rows.clone();
                if flavor == Flavor::Phix {
                    rows.retain(|r| r.project == "Control");
                }
                let rows = match self.trim_rows(flavor, rows) {
                    Ok(rows) => rows,
                    Err(e) => {
                        error!("{e}. Skipping.");
                        return Ok(None);
                    }
                };
                match self.thresholds(flavor, &rows) {
                    Ok((i1, i2)) => {
                        settings.push_str(&format!(
                            "\nI1MismatchThreshold, {i1}\nI2MismatchThreshold, {i2}"
                        ));
                    }
                    Err(e) => {
                        error!("{e}. Could not generate {} manifest without index collisions. Skipping.", flavor.as_str());
                        return Ok(None);
                    }
                }
                format!("[SAMPLES]\n{}", Self::samples_csv(&rows)?)
            }
            Flavor::Empty => String::new(),
        };

        Ok(Some(format!("{run_values}\n\n{settings}\n\n{samples_section}")))
    }

    /// Render every flavor and bundle them into `<root_name>.zip` in
    /// `dir`. Flavors that failed their precondition become empty zip
    /// entries, with a warning.
    pub fn write_bundle(&self, dir: &Path) -> Result<PathBuf> {
        let zip_path = dir.join(format!("{}.zip", self.root_name));
        let file =
            File::create(&zip_path).map_err(|e| Error::io(zip_path.display(), e))?;
        let mut bundle = zip::ZipWriter::new(file);

        for flavor in Flavor::ALL {
            let name = self.file_name(flavor);
            bundle
                .start_file(name.as_str(), SimpleFileOptions::default())
                .map_err(|e| Error::Invalid(format!("could not write bundle: {e}")))?;
            match self.render(flavor)? {
                Some(contents) => bundle
                    .write_all(contents.as_bytes())
                    .map_err(|e| Error::io(&name, e))?,
                None => warn!("Not writing {name} due to missing contents."),
            }
        }
        bundle
            .finish()
            .map_err(|e| Error::Invalid(format!("could not finish bundle: {e}")))?;
        Ok(zip_path)
    }
}

/// Parse a rendered manifest back into its logical rows. Used by audit
/// tooling and tests to confirm a written sheet round-trips.
pub fn parse_samples_section(contents: &str) -> Result<Vec<ManifestRow>> {
    let Some(at) = contents.find("[SAMPLES]\n") else {
        return Ok(Vec::new());
    };
    let csv_text = &contents[at + "[SAMPLES]\n".len()..];
    let mut rdr = csv::Reader::from_reader(csv_text.as_bytes());
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| Error::Invalid(format!("bad manifest row: {e}")))?;
        if record.len() != 8 {
            return Err(Error::Invalid(format!(
                "expected 8 manifest columns, found {}",
                record.len()
            )));
        }
        rows.push(ManifestRow {
            sample_name: record[0].to_string(),
            index1: record[1].to_string(),
            index2: record[2].to_string(),
            lane: record[3].to_string(),
            project: record[4].to_string(),
            recipe: record[5].to_string(),
            label: record[6].to_string(),
            settings: record[7].to_string(),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Artifact, ArtifactKind, Container, IoPair, Project, Sample, Snapshot, Step, UdfStore,
        UdfValue,
    };
    use std::collections::BTreeMap;

    fn run_snapshot(labels: &[(&str, &str)], phix: bool) -> Snapshot {
        let mut samples = BTreeMap::new();
        let mut pool_samples = Vec::new();
        let mut pool_labels = Vec::new();
        for (i, (sample_name, label)) in labels.iter().enumerate() {
            let id = format!("smp{i}");
            samples.insert(
                id.clone(),
                Sample {
                    id: id.clone(),
                    name: sample_name.to_string(),
                    project: Some("pro1".to_string()),
                    udf: UdfStore::default(),
                },
            );
            pool_samples.push(id);
            pool_labels.push(label.to_string());
        }

        let mut pool_udf = UdfStore::default();
        if phix {
            pool_udf.set("% phiX", UdfValue::Float(1.0));
            pool_udf.set(
                "Element PhiX Set",
                UdfValue::Str("PhiX Control Library, Adept".to_string()),
            );
        }

        let mut artifacts = BTreeMap::new();
        artifacts.insert(
            "pool1".to_string(),
            Artifact {
                id: "pool1".to_string(),
                name: "Pool A".to_string(),
                kind: ArtifactKind::Analyte,
                udf: pool_udf,
                samples: pool_samples,
                reagent_labels: pool_labels,
                location: Some(("fc1".to_string(), "1:1".to_string())),
                parent_step: None,
            },
        );

        let mut projects = BTreeMap::new();
        let mut project_udf = UdfStore::default();
        project_udf.set("Sequencing setup", UdfValue::Str("151-151".to_string()));
        projects.insert(
            "pro1".to_string(),
            Project {
                id: "pro1".to_string(),
                name: "Proj.One".to_string(),
                udf: project_udf,
            },
        );

        let mut containers = BTreeMap::new();
        containers.insert(
            "fc1".to_string(),
            Container {
                id: "fc1".to_string(),
                name: "FC001".to_string(),
            },
        );

        let mut step_udf = UdfStore::default();
        step_udf.set("Index Read 1", UdfValue::Int(8));
        step_udf.set("Index Read 2", UdfValue::Int(8));

        Snapshot {
            step: Step {
                id: "24-200".to_string(),
                type_name: "Run Setup".to_string(),
                technician: "Kim Lab".to_string(),
                udf: step_udf,
                io_pairs: vec![IoPair {
                    input: None,
                    output: Some("pool1".to_string()),
                }],
            },
            steps: BTreeMap::new(),
            artifacts,
            samples,
            projects,
            containers,
        }
    }

    #[test]
    fn builds_rows_with_project_and_recipe() {
        let snap = run_snapshot(&[("P1_101", "AAGGTTCC"), ("P1_102", "TTCCAAGG")], false);
        let m = RunManifest::build(&snap, "manifest_test").unwrap();
        assert_eq!(m.rows.len(), 2);
        assert_eq!(m.rows[0].project, "Proj__One");
        assert_eq!(m.rows[0].recipe, "151-151");
        assert_eq!(m.rows[0].lane, "1");
    }

    #[test]
    fn phix_rows_join_the_lane() {
        let snap = run_snapshot(&[("P1_101", "AAGGTTCC")], true);
        let m = RunManifest::build(&snap, "manifest_test").unwrap();
        let controls: Vec<_> = m.rows.iter().filter(|r| r.project == "Control").collect();
        assert_eq!(controls.len(), 4);
        assert!(controls.iter().all(|r| r.sample_name == "PhiX_Adept"));
    }

    #[test]
    fn identical_indices_abort_before_rendering() {
        let snap = run_snapshot(&[("P1_101", "ACGTACGT"), ("P1_102", "ACGTACGT")], false);
        let err = RunManifest::build(&snap, "manifest_test").unwrap_err();
        assert!(matches!(err, Error::IdenticalIndices { .. }));
    }

    #[test]
    fn close_indices_warn_but_build() {
        let snap = run_snapshot(&[("P1_101", "ACGTACGT"), ("P1_102", "ACGTACGA")], false);
        assert!(RunManifest::build(&snap, "manifest_test").is_ok());
    }

    #[test]
    fn phix_set_without_loading_is_rejected() {
        let mut snap = run_snapshot(&[("P1_101", "AAGGTTCC")], false);
        snap.artifacts.get_mut("pool1").unwrap().udf.set(
            "Element PhiX Set",
            UdfValue::Str("PhiX Control Library, Adept".to_string()),
        );
        assert!(matches!(
            RunManifest::build(&snap, "m").unwrap_err(),
            Error::SheetConstraint(_)
        ));
    }

    #[test]
    fn tenx_single_label_expands_with_settings() {
        let snap = run_snapshot(&[("P1_101", "SI-GA-A1")], false);
        let mut snap = snap;
        // The quad needs a wider second index read to make sense; keep
        // defaults minimal here.
        snap.step.udf.set("Index Read 2", UdfValue::Int(0));
        let m = RunManifest::build(&snap, "m").unwrap();
        assert_eq!(m.rows.len(), 4);
        assert!(m.rows.iter().all(|r| r.settings == "I1Fastq:True"));
        assert!(m.rows.iter().all(|r| r.index2.is_empty()));
    }

    #[test]
    fn umi_read_is_n_filled_for_bare_indices() {
        let mut snap = run_snapshot(&[("P1_101", "AAGGTTCCAA")], false);
        snap.step.udf.set("Index Read 2", UdfValue::Int(16));
        let m = RunManifest::build(&snap, "m").unwrap();
        assert_eq!(m.rows[0].index2, "N".repeat(16));
    }

    #[test]
    fn untrimmed_renders_and_round_trips() {
        let snap = run_snapshot(&[("P1_101", "AAGGTTCC"), ("P1_102", "TTCCAAGG")], false);
        let m = RunManifest::build(&snap, "manifest_test").unwrap();
        let contents = m.render(Flavor::Untrimmed).unwrap().unwrap();
        assert!(contents.starts_with("[RUNVALUES]"));
        assert!(contents.contains("[SETTINGS]"));
        let rows = parse_samples_section(&contents).unwrap();
        assert_eq!(rows.len(), m.rows.len());
        for (a, b) in rows.iter().zip(m.rows.iter()) {
            assert_eq!((&a.sample_name, &a.index1, &a.lane), (&b.sample_name, &b.index1, &b.lane));
        }
    }

    #[test]
    fn trimmed_truncates_long_indices() {
        let mut snap = run_snapshot(&[("P1_101", "AAGGTTCCAAGG"), ("P1_102", "TTCCAAGGAACC")], false);
        snap.step.udf.set("Index Read 1", UdfValue::Int(8));
        snap.step.udf.set("Index Read 2", UdfValue::Int(0));
        let m = RunManifest::build(&snap, "m").unwrap();
        let contents = m.render(Flavor::Trimmed).unwrap().unwrap();
        let rows = parse_samples_section(&contents).unwrap();
        assert!(rows.iter().all(|r| r.index1.len() == 8));
        assert!(contents.contains("I1MismatchThreshold"));
    }

    #[test]
    fn short_indices_skip_the_trimmed_flavor_only() {
        let mut snap = run_snapshot(&[("P1_101", "AAGGTTCC"), ("P1_102", "TTCCAAGG")], false);
        snap.step.udf.set("Index Read 1", UdfValue::Int(10));
        snap.step.udf.set("Index Read 2", UdfValue::Int(0));
        let m = RunManifest::build(&snap, "m").unwrap();
        assert!(m.render(Flavor::Trimmed).unwrap().is_none());
        assert!(m.render(Flavor::Untrimmed).unwrap().is_some());
        assert!(m.render(Flavor::Empty).unwrap().is_some());
    }

    #[test]
    fn empty_flavor_has_no_samples_section() {
        let snap = run_snapshot(&[("P1_101", "AAGGTTCC")], false);
        let m = RunManifest::build(&snap, "m").unwrap();
        let contents = m.render(Flavor::Empty).unwrap().unwrap();
        assert!(!contents.contains("[SAMPLES]"));
        assert!(parse_samples_section(&contents).unwrap().is_empty());
    }

    #[test]
    fn bundle_contains_all_flavors() {
        let snap = run_snapshot(&[("P1_101", "AAGGTTCC"), ("P1_102", "TTCCAAGG")], false);
        let m = RunManifest::build(&snap, "manifest_test").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let zip_path = m.write_bundle(dir.path()).unwrap();
        let file = File::open(&zip_path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 4);
        for flavor in Flavor::ALL {
            assert!(archive.by_name(&m.file_name(flavor)).is_ok());
        }
    }

    #[test]
    fn flowcell_id_is_the_container_name() {
        let snap = run_snapshot(&[("P1_101", "AAGGTTCC")], false);
        assert_eq!(flowcell_id(&snap).unwrap(), "FC001");
    }
}
