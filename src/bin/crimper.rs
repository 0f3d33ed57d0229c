use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crimper::epplog::{self, artifact_file_name, run_epp};
use crimper::manifest::{flowcell_id, RunManifest};
use crimper::minknow::MinknowSheet;
use crimper::{formula, ops, placement, zebra};

/// Crimper CLI: LIMS EPP operations over a step snapshot
#[derive(Parser)]
#[command(name = "crimper")]
#[command(version)]
#[command(about = "LIMS EPP toolkit: UDF formulas, index reconciliation, run samplesheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Arguments every EPP shares: the step snapshot and the log artifact.
#[derive(Args)]
struct CommonArgs {
    /// Step snapshot JSON (read, and updated in place on UDF writes)
    #[arg(long)]
    snapshot: PathBuf,
    /// Path for the run log file artifact
    #[arg(long)]
    log: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the UDF formulas configured on the step
    UdfFormulas {
        #[command(flatten)]
        common: CommonArgs,
        /// Step text UDF holding the formulas
        #[arg(long, default_value = "UDF formulas")]
        formula_field: String,
    },

    /// Convert Concentration from ng/ul to nM on measurement artifacts
    MolarConcentration {
        #[command(flatten)]
        common: CommonArgs,
        /// Rewrite the step's analyte inputs instead of its outputs
        #[arg(long)]
        aggregate: bool,
    },

    /// Pull the last known value of an artifact UDF forward from history
    FetchLastKnownField {
        #[command(flatten)]
        common: CommonArgs,
        /// Step UDF naming the artifact UDF to fetch
        #[arg(long)]
        step_udf: String,
    },

    /// Copy analyte UDFs to the submitted samples
    CopyField {
        #[command(flatten)]
        common: CommonArgs,
        /// Source UDF name(s)
        #[arg(short = 's', long = "source-udf", required = true, num_args = 1..)]
        source_udf: Vec<String>,
        /// Destination UDF name(s); defaults to the source names
        #[arg(short = 'd', long = "dest-udf", num_args = 1..)]
        dest_udf: Vec<String>,
        /// Changelog file recording who changed what
        #[arg(short = 'c', long)]
        status_changelog: Option<PathBuf>,
    },

    /// Generate the sequencing-run manifest bundle
    RunManifest {
        #[command(flatten)]
        common: CommonArgs,
        /// Directory receiving the manifest zip
        #[arg(long)]
        file: PathBuf,
    },

    /// Generate the MinKNOW samplesheet
    MinknowSamplesheet {
        #[command(flatten)]
        common: CommonArgs,
        /// Directory receiving the samplesheet CSV
        #[arg(long)]
        file: PathBuf,
    },

    /// Emit ZPL barcode labels for the step's output containers
    ZebraBarcodes {
        #[command(flatten)]
        common: CommonArgs,
        /// Directory receiving the ZPL command stream
        #[arg(long)]
        file: PathBuf,
        /// Test run: build and save the stream, skip the printer queue
        #[arg(long)]
        test: bool,
    },

    /// Check index placement on output plates, posting warnings to Comments
    CheckIndexPlacement {
        #[command(flatten)]
        common: CommonArgs,
    },
}

fn out_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("could not create {}", dir.display()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let status = match cli.command {
        Commands::UdfFormulas {
            common,
            formula_field,
        } => run_epp(
            "udf_formulas",
            &common.snapshot,
            &common.log,
            |snapshot, path| {
                let stats = formula::run_udf_formulas(snapshot, Some(path), &formula_field)?;
                Ok(format!(
                    "Wrote {} value(s), {} already satisfied, {} pairing(s) skipped.",
                    stats.written, stats.already_set, stats.skipped
                ))
            },
        ),

        Commands::MolarConcentration { common, aggregate } => run_epp(
            "molar_concentration",
            &common.snapshot,
            &common.log,
            |snapshot, path| Ok(ops::molar_concentration(snapshot, Some(path), aggregate)?),
        ),

        Commands::FetchLastKnownField { common, step_udf } => run_epp(
            "fetch_last_known_field",
            &common.snapshot,
            &common.log,
            |snapshot, path| Ok(ops::fetch_last_known_field(snapshot, Some(path), &step_udf)?),
        ),

        Commands::CopyField {
            common,
            source_udf,
            dest_udf,
            status_changelog,
        } => run_epp(
            "copy_field",
            &common.snapshot,
            &common.log,
            |snapshot, path| {
                Ok(ops::copy_field(
                    snapshot,
                    Some(path),
                    &source_udf,
                    &dest_udf,
                    status_changelog.as_deref(),
                )?)
            },
        ),

        Commands::RunManifest { common, file } => run_epp(
            "run_manifest",
            &common.snapshot,
            &common.log,
            |snapshot, _path| {
                out_dir(&file)?;
                let fc = flowcell_id(snapshot)?;
                let root = format!(
                    "AVITI_run_manifest_{fc}_{}_{}_{}",
                    snapshot.step.id,
                    epplog::timestamp(),
                    snapshot.step.technician.replace(' ', "")
                );
                let manifest = RunManifest::build(snapshot, root)?;
                let zip_path = manifest.write_bundle(&file)?;
                Ok(format!("Wrote run manifest bundle {}.", zip_path.display()))
            },
        ),

        Commands::MinknowSamplesheet { common, file } => run_epp(
            "minknow_samplesheet",
            &common.snapshot,
            &common.log,
            |snapshot, _path| {
                out_dir(&file)?;
                let sheet = MinknowSheet::build(snapshot)?;
                let name =
                    artifact_file_name("ONT_samplesheet", snapshot, &epplog::timestamp(), "csv");
                let path = file.join(name);
                sheet.write_csv(&path)?;
                Ok(format!("Wrote MinKNOW samplesheet {}.", path.display()))
            },
        ),

        Commands::ZebraBarcodes { common, file, test } => run_epp(
            "zebra_barcodes",
            &common.snapshot,
            &common.log,
            |snapshot, _path| {
                out_dir(&file)?;
                let date = chrono::Local::now().format("%Y-%m-%d").to_string();
                let zpl = zebra::step_labels(snapshot, &date)?;
                let name = artifact_file_name("barcodes", snapshot, &epplog::timestamp(), "txt");
                let path = file.join(name);
                fs::write(&path, zpl.join("\n"))
                    .with_context(|| format!("could not write {}", path.display()))?;
                if test {
                    log::info!("Test run, not sending labels to the printer queue.");
                }
                Ok(format!(
                    "Wrote {} ZPL lines to {}.",
                    zpl.len(),
                    path.display()
                ))
            },
        ),

        Commands::CheckIndexPlacement { common } => run_epp(
            "check_index_placement",
            &common.snapshot,
            &common.log,
            |snapshot, path| {
                let messages = placement::verify_index_placement(snapshot)?;
                if messages.is_empty() {
                    Ok("No issue detected with indexes or placement.".to_string())
                } else {
                    for m in &messages {
                        log::warn!("{m}");
                    }
                    placement::post_to_comments(snapshot, &messages);
                    snapshot.save(path)?;
                    Ok(format!("{} placement issue(s) posted to Comments.", messages.len()))
                }
            },
        ),
    };

    ExitCode::from(status.code() as u8)
}
