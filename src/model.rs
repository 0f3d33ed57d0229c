//! In-memory model of the LIMS object graph a single step operates on.
//!
//! The external LIMS remains the system of record; one run reads a **step
//! snapshot** (a JSON document holding the current step, its input/output
//! pairings and every artifact, sample, project and container they touch,
//! plus the processing history needed for traceback), mutates individual
//! UDFs, and persists the document back. Building the whole graph up front
//! keeps the recursive traceback logic testable without any live API.
//!
//! Invariants carried here:
//! - a UDF key may be **absent**, which is distinct from any falsy value;
//! - at most one distinct output maps from a given input/output pair.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// A scalar UDF value as the LIMS stores it.
///
/// Integers are tried before floats during deserialization so that a `5`
/// survives a round-trip as an integer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UdfValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl UdfValue {
    /// Numeric view, accepting both int and float values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            UdfValue::Int(i) => Some(*i as f64),
            UdfValue::Float(f) => Some(*f),
            UdfValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            UdfValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for UdfValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UdfValue::Int(i) => write!(f, "{i}"),
            UdfValue::Float(x) => write!(f, "{x}"),
            UdfValue::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for UdfValue {
    fn from(f: f64) -> Self {
        UdfValue::Float(f)
    }
}

impl From<i64> for UdfValue {
    fn from(i: i64) -> Self {
        UdfValue::Int(i)
    }
}

impl From<&str> for UdfValue {
    fn from(s: &str) -> Self {
        UdfValue::Str(s.to_string())
    }
}

impl From<String> for UdfValue {
    fn from(s: String) -> Self {
        UdfValue::Str(s)
    }
}

/// An ordered UDF dictionary attached to an artifact, step or project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UdfStore(pub BTreeMap<String, UdfValue>);

impl UdfStore {
    pub fn get(&self, name: &str) -> Option<&UdfValue> {
        self.0.get(name)
    }

    /// First defined name of a priority list wins; later names are ignored
    /// regardless of their values.
    pub fn get_chain<'a>(&self, names: &[&'a str]) -> Option<(&'a str, &UdfValue)> {
        names
            .iter()
            .find_map(|name| self.0.get(*name).map(|v| (*name, v)))
    }

    pub fn set(&mut self, name: &str, value: UdfValue) {
        self.0.insert(name.to_string(), value);
    }

    /// Defined-ness check. Absence is distinct from any falsy value.
    pub fn is_set(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Artifact kind as the LIMS types it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Analyte,
    ResultFile,
}

/// An artifact: a physical sample or pool at a point in processing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    pub name: String,
    pub kind: ArtifactKind,
    #[serde(default)]
    pub udf: UdfStore,
    /// Submitted samples contained in this artifact (several for a pool).
    #[serde(default)]
    pub samples: Vec<String>,
    /// Reagent labels, parallel to `samples` for pools.
    #[serde(default)]
    pub reagent_labels: Vec<String>,
    /// `(container id, well)` placement, if the artifact sits on a container.
    #[serde(default)]
    pub location: Option<(String, String)>,
    /// The step that produced this artifact, if any.
    #[serde(default)]
    pub parent_step: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sample {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub udf: UdfStore,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub udf: UdfStore,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    pub name: String,
}

/// One unit of work within a step: zero-or-one input paired with
/// zero-or-one output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IoPair {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

/// A protocol step execution instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    /// Step type as configured in the LIMS (e.g. "AVITI Run v1.0").
    pub type_name: String,
    #[serde(default)]
    pub technician: String,
    #[serde(default)]
    pub udf: UdfStore,
    #[serde(default)]
    pub io_pairs: Vec<IoPair>,
}

/// A resolved analyte input/output pairing. Either side may be absent for
/// no-output (QC-style) or no-input steps, never both.
#[derive(Clone, Copy, Debug)]
pub struct AnalytePair<'a> {
    pub input: Option<&'a Artifact>,
    pub output: Option<&'a Artifact>,
}

impl<'a> AnalytePair<'a> {
    /// Name used for deterministic ordering: output name, falling back to
    /// the input name.
    fn sort_name(&self) -> &str {
        self.output
            .or(self.input)
            .map(|a| a.name.as_str())
            .unwrap_or("")
    }
}

/// The full snapshot document for one run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// The step this invocation operates on.
    pub step: Step,
    /// Historic steps by id, for traceback.
    #[serde(default)]
    pub steps: BTreeMap<String, Step>,
    pub artifacts: BTreeMap<String, Artifact>,
    #[serde(default)]
    pub samples: BTreeMap<String, Sample>,
    #[serde(default)]
    pub projects: BTreeMap<String, Project>,
    #[serde(default)]
    pub containers: BTreeMap<String, Container>,
}

impl Snapshot {
    pub fn from_reader(r: impl Read) -> serde_json::Result<Self> {
        serde_json::from_reader(r)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path.display(), e))?;
        Self::from_reader(BufReader::new(file)).map_err(|e| Error::Snapshot {
            file: path.display().to_string(),
            source: e,
        })
    }

    /// Persist the document atomically (write to a sibling temp file, then
    /// rename over the original). Called after every UDF write, mirroring
    /// the immediate per-entity write-back of the live system.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp = path.with_extension("json.tmp");
        {
            let file = File::create(&tmp).map_err(|e| Error::io(tmp.display(), e))?;
            serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| {
                Error::Snapshot {
                    file: tmp.display().to_string(),
                    source: e,
                }
            })?;
        }
        fs::rename(&tmp, path).map_err(|e| Error::io(path.display(), e))
    }

    pub fn artifact(&self, id: &str) -> Result<&Artifact> {
        self.artifacts.get(id).ok_or_else(|| Error::DanglingRef {
            kind: "artifact",
            id: id.to_string(),
        })
    }

    pub fn artifact_mut(&mut self, id: &str) -> Result<&mut Artifact> {
        self.artifacts
            .get_mut(id)
            .ok_or_else(|| Error::DanglingRef {
                kind: "artifact",
                id: id.to_string(),
            })
    }

    pub fn sample(&self, id: &str) -> Result<&Sample> {
        self.samples.get(id).ok_or_else(|| Error::DanglingRef {
            kind: "sample",
            id: id.to_string(),
        })
    }

    pub fn project(&self, id: &str) -> Result<&Project> {
        self.projects.get(id).ok_or_else(|| Error::DanglingRef {
            kind: "project",
            id: id.to_string(),
        })
    }

    pub fn container(&self, id: &str) -> Result<&Container> {
        self.containers.get(id).ok_or_else(|| Error::DanglingRef {
            kind: "container",
            id: id.to_string(),
        })
    }

    /// Historic step lookup for traceback.
    pub fn historic_step(&self, id: &str) -> Option<&Step> {
        if self.step.id == id {
            Some(&self.step)
        } else {
            self.steps.get(id)
        }
    }

    /// Analyte input/output pairings of a step, in deterministic order.
    ///
    /// A pairing qualifies when both present ends are analytes; result-file
    /// slots (measurement files, log slots) are not units of work.
    pub fn analyte_io_pairs<'a>(&'a self, step: &Step) -> Result<Vec<AnalytePair<'a>>> {
        let mut pairs = Vec::new();
        for io in &step.io_pairs {
            let input = io.input.as_deref().map(|id| self.artifact(id)).transpose()?;
            let output = io
                .output
                .as_deref()
                .map(|id| self.artifact(id))
                .transpose()?;
            let analyte = |a: Option<&Artifact>| {
                a.map_or(true, |art| art.kind == ArtifactKind::Analyte)
            };
            if (input.is_some() || output.is_some()) && analyte(input) && analyte(output) {
                pairs.push(AnalytePair { input, output });
            }
        }
        pairs.sort_by(|a, b| a.sort_name().cmp(b.sort_name()));
        Ok(pairs)
    }

    /// All analyte inputs of a step, deterministically ordered by id.
    pub fn analyte_inputs<'a>(&'a self, step: &Step) -> Result<Vec<&'a Artifact>> {
        let mut arts = Vec::new();
        for io in &step.io_pairs {
            if let Some(id) = io.input.as_deref() {
                let art = self.artifact(id)?;
                if art.kind == ArtifactKind::Analyte && !arts.iter().any(|a: &&Artifact| a.id == art.id)
                {
                    arts.push(art);
                }
            }
        }
        arts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(arts)
    }

    /// All analyte outputs of a step, deterministically ordered by id.
    pub fn analyte_outputs<'a>(&'a self, step: &Step) -> Result<Vec<&'a Artifact>> {
        let mut arts = Vec::new();
        for io in &step.io_pairs {
            if let Some(id) = io.output.as_deref() {
                let art = self.artifact(id)?;
                if art.kind == ArtifactKind::Analyte && !arts.iter().any(|a: &&Artifact| a.id == art.id)
                {
                    arts.push(art);
                }
            }
        }
        arts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(arts)
    }

    /// True when the step has no analyte outputs (QC-style steps).
    pub fn no_outputs(&self, step: &Step) -> Result<bool> {
        Ok(self.analyte_outputs(step)?.is_empty())
    }

    /// Input artifacts linked to the given output within a step. Traceback
    /// requires exactly one.
    pub fn linked_inputs<'a>(
        &'a self,
        step: &Step,
        output_id: &str,
    ) -> Result<Vec<&'a Artifact>> {
        let mut linked = Vec::new();
        for io in &step.io_pairs {
            if io.output.as_deref() == Some(output_id) {
                if let Some(input_id) = io.input.as_deref() {
                    linked.push(self.artifact(input_id)?);
                }
            }
        }
        Ok(linked)
    }

    /// Distinct output containers of a step, ordered by container id.
    pub fn output_containers<'a>(&'a self, step: &Step) -> Result<Vec<&'a Container>> {
        let mut out: Vec<&Container> = Vec::new();
        for art in self.analyte_outputs(step)? {
            if let Some((cid, _)) = &art.location {
                let c = self.container(cid)?;
                if !out.iter().any(|x| x.id == c.id) {
                    out.push(c);
                }
            }
        }
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    /// Well → artifact placements for one container, over the step outputs.
    pub fn placements<'a>(
        &'a self,
        step: &Step,
        container_id: &str,
    ) -> Result<Vec<(&'a str, &'a Artifact)>> {
        let mut wells = Vec::new();
        for art in self.analyte_outputs(step)? {
            if let Some((cid, well)) = &art.location {
                if cid == container_id {
                    wells.push((well.as_str(), art));
                }
            }
        }
        Ok(wells)
    }

    /// Sample → reagent label mapping within a pool artifact.
    ///
    /// The snapshot stores labels parallel to the pool's sample list; a
    /// missing or ragged pairing is a fatal input error, not a skip.
    pub fn sample_label<'a>(&self, pool: &'a Artifact, sample_id: &str) -> Result<&'a str> {
        let idx = pool
            .samples
            .iter()
            .position(|s| s == sample_id)
            .ok_or_else(|| Error::DanglingRef {
                kind: "sample",
                id: sample_id.to_string(),
            })?;
        pool.reagent_labels
            .get(idx)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::Invalid(format!(
                    "pool '{}' has no reagent label recorded for sample '{}'",
                    pool.name, sample_id
                ))
            })
    }

    /// Project of a sample, if it belongs to one (controls do not).
    pub fn sample_project(&self, sample: &Sample) -> Result<Option<&Project>> {
        sample
            .project
            .as_deref()
            .map(|pid| self.project(pid))
            .transpose()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Minimal one-pair snapshot used across module tests.
    pub fn snapshot_with_pair() -> Snapshot {
        let mut artifacts = BTreeMap::new();
        artifacts.insert(
            "in1".to_string(),
            Artifact {
                id: "in1".to_string(),
                name: "P1_101".to_string(),
                kind: ArtifactKind::Analyte,
                udf: UdfStore::default(),
                samples: vec!["smp1".to_string()],
                reagent_labels: vec![],
                location: None,
                parent_step: None,
            },
        );
        artifacts.insert(
            "out1".to_string(),
            Artifact {
                id: "out1".to_string(),
                name: "P1_101_lib".to_string(),
                kind: ArtifactKind::Analyte,
                udf: UdfStore::default(),
                samples: vec!["smp1".to_string()],
                reagent_labels: vec![],
                location: None,
                parent_step: Some("24-100".to_string()),
            },
        );
        let mut samples = BTreeMap::new();
        samples.insert(
            "smp1".to_string(),
            Sample {
                id: "smp1".to_string(),
                name: "P1_101".to_string(),
                project: None,
                udf: UdfStore::default(),
            },
        );
        Snapshot {
            step: Step {
                id: "24-100".to_string(),
                type_name: "Test Step".to_string(),
                technician: "Kim Lab".to_string(),
                udf: UdfStore::default(),
                io_pairs: vec![IoPair {
                    input: Some("in1".to_string()),
                    output: Some("out1".to_string()),
                }],
            },
            steps: BTreeMap::new(),
            artifacts,
            samples,
            projects: BTreeMap::new(),
            containers: BTreeMap::new(),
        }
    }
}
