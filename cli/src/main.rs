//! CURATOR — legacy metadata standardization CLI.
//!
//! Usage:
//!   curator transform --schema-file schema.json --patch-dir rules/ \
//!       --input-file submission.json --output-dir out/
//!   curator transform --config curator.toml --input-dir submissions/ --output-dir out/
//!   curator validate-rules --patch-dir rules/
//!   curator check --schema-file schema.json --input-file out/submission.transformed.json

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use curator_contracts::{CuratorError, CuratorResult};
use curator_pipeline::{PipelineConfig, Transformer};
use curator_rules::RuleSet;
use curator_schema::TargetSchema;

// ── CLI definition ────────────────────────────────────────────────────────────

/// CURATOR — standardizes legacy biomedical metadata against a target
/// schema, with conditional patch rules, dictionary mappings, and full
/// provenance output.
#[derive(Parser)]
#[command(
    name = "curator",
    about = "Legacy metadata standardization pipeline",
    long_about = "Transforms legacy metadata documents through conditional patching,\n\
                  field and value mapping, and target-schema compliance, emitting the\n\
                  transformed record with a JSON Patch and a full processing log."
)]
struct Cli {
    /// Raise log verbosity to info (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transform one input document, or every document in a directory.
    Transform(TransformArgs),
    /// Load and validate rule files, reporting the first defect precisely.
    ValidateRules(ValidateRulesArgs),
    /// Report a transformed record's compliance with the target schema.
    Check(CheckArgs),
}

#[derive(Args)]
struct TransformArgs {
    /// TOML pipeline configuration; replaces the per-source flags.
    #[arg(long, conflicts_with_all = [
        "field_mapping_file", "field_mapping_dir", "value_mapping_dir",
        "schema_file", "patch_dir", "patch_file",
    ])]
    config: Option<PathBuf>,

    /// Single field-mapping dictionary file.
    #[arg(long)]
    field_mapping_file: Option<PathBuf>,

    /// Directory of field-mapping dictionaries, merged first-wins.
    #[arg(long, conflicts_with = "field_mapping_file")]
    field_mapping_dir: Option<PathBuf>,

    /// Directory of value-mapping dictionaries.
    #[arg(long)]
    value_mapping_dir: Option<PathBuf>,

    /// The target schema file.
    #[arg(long, required_unless_present = "config")]
    schema_file: Option<PathBuf>,

    /// Directory of rule files, loaded recursively in path order.
    #[arg(long)]
    patch_dir: Option<PathBuf>,

    /// Single rule file, applied after the directory's rules.
    #[arg(long)]
    patch_file: Option<PathBuf>,

    /// One input document to transform.
    #[arg(long, conflicts_with = "input_dir", required_unless_present = "input_dir")]
    input_file: Option<PathBuf>,

    /// Directory of input documents (*.json, non-recursive).
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Where transformed documents are written; created if missing.
    #[arg(long)]
    output_dir: PathBuf,
}

#[derive(Args)]
struct ValidateRulesArgs {
    /// Directory of rule files, validated recursively.
    #[arg(long, required_unless_present = "patch_file")]
    patch_dir: Option<PathBuf>,

    /// Single rule file.
    #[arg(long)]
    patch_file: Option<PathBuf>,
}

#[derive(Args)]
struct CheckArgs {
    /// The target schema file.
    #[arg(long)]
    schema_file: PathBuf,

    /// A transformed document, or a bare record object.
    #[arg(long)]
    input_file: PathBuf,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Transform(args) => run_transform(&args),
        Command::ValidateRules(args) => run_validate_rules(&args),
        Command::Check(args) => run_check(&args),
    };

    match result {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("curator: {e}");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .compact()
        .init();
}

// ── transform ─────────────────────────────────────────────────────────────────

fn run_transform(args: &TransformArgs) -> CuratorResult<i32> {
    let config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig {
            field_mapping_file: args.field_mapping_file.clone(),
            field_mapping_dir: args.field_mapping_dir.clone(),
            value_mapping_dir: args.value_mapping_dir.clone(),
            schema_file: args.schema_file.clone().ok_or_else(|| CuratorError::Config {
                reason: "--schema-file is required without --config".to_string(),
            })?,
            patch_dir: args.patch_dir.clone(),
            patch_file: args.patch_file.clone(),
        },
    };
    let transformer = config.build()?;

    std::fs::create_dir_all(&args.output_dir).map_err(|e| CuratorError::FileProcessing {
        reason: format!(
            "failed to create output directory '{}': {e}",
            args.output_dir.display()
        ),
    })?;

    if let Some(input) = &args.input_file {
        transform_one(&transformer, input, &args.output_dir)?;
        println!("transformed {}", input.display());
        return Ok(0);
    }

    // Bulk mode: per-file failures are reported and counted, the rest of
    // the batch still runs.
    let input_dir = args.input_dir.as_deref().ok_or_else(|| CuratorError::Config {
        reason: "either --input-file or --input-dir is required".to_string(),
    })?;
    let inputs = list_json_files(input_dir)?;
    if inputs.is_empty() {
        println!("no .json files in {}", input_dir.display());
        return Ok(0);
    }

    let mut failed = 0usize;
    for input in &inputs {
        match transform_one(&transformer, input, &args.output_dir) {
            Ok(()) => println!("transformed {}", input.display()),
            Err(e) => {
                eprintln!("curator: {}: {e}", input.display());
                failed += 1;
            }
        }
    }

    println!(
        "{} of {} documents transformed",
        inputs.len() - failed,
        inputs.len()
    );
    Ok(if failed > 0 { 1 } else { 0 })
}

/// Transform `input` and write `<stem>.transformed.json` to `output_dir`.
fn transform_one(transformer: &Transformer, input: &Path, output_dir: &Path) -> CuratorResult<()> {
    let doc = transformer.transform_file(input)?;

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let output = output_dir.join(format!("{stem}.transformed.json"));

    let pretty = serde_json::to_string_pretty(&doc).map_err(|e| CuratorError::FileProcessing {
        reason: format!("failed to encode output for '{}': {e}", input.display()),
    })?;
    std::fs::write(&output, pretty).map_err(|e| CuratorError::FileProcessing {
        reason: format!("failed to write '{}': {e}", output.display()),
    })?;
    Ok(())
}

/// List every `*.json` file directly in `dir`, sorted lexicographically.
fn list_json_files(dir: &Path) -> CuratorResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| CuratorError::FileProcessing {
        reason: format!("failed to read input directory '{}': {e}", dir.display()),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CuratorError::FileProcessing {
            reason: format!("failed to read input directory '{}': {e}", dir.display()),
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

// ── validate-rules ────────────────────────────────────────────────────────────

fn run_validate_rules(args: &ValidateRulesArgs) -> CuratorResult<i32> {
    let mut rules = RuleSet::empty();
    if let Some(dir) = &args.patch_dir {
        rules = rules.merge(RuleSet::load_dir(dir)?);
    }
    if let Some(file) = &args.patch_file {
        rules = rules.merge(RuleSet::load_file(file)?);
    }

    println!("{} rules valid", rules.count());
    Ok(0)
}

// ── check ─────────────────────────────────────────────────────────────────────

fn run_check(args: &CheckArgs) -> CuratorResult<i32> {
    let schema = TargetSchema::load_file(&args.schema_file)?;

    let contents =
        std::fs::read_to_string(&args.input_file).map_err(|e| CuratorError::FileProcessing {
            reason: format!("failed to read '{}': {e}", args.input_file.display()),
        })?;
    let raw: serde_json::Value =
        serde_json::from_str(&contents).map_err(|e| CuratorError::FileProcessing {
            reason: format!("invalid JSON in '{}': {e}", args.input_file.display()),
        })?;

    // A transformed document carries the record under `modified_metadata`;
    // a bare record object is checked as-is.
    let record = match &raw {
        serde_json::Value::Object(doc) => match doc.get("modified_metadata") {
            Some(serde_json::Value::Object(record)) => record.clone(),
            _ => doc.clone(),
        },
        other => {
            return Err(CuratorError::FileProcessing {
                reason: format!(
                    "'{}' must contain a JSON object, got {}",
                    args.input_file.display(),
                    curator_contracts::type_name(other)
                ),
            })
        }
    };

    let report = schema.compliance_report(&record);
    let pretty =
        serde_json::to_string_pretty(&report).map_err(|e| CuratorError::FileProcessing {
            reason: format!("failed to encode report: {e}"),
        })?;
    println!("{pretty}");

    if report.is_compliant() {
        println!("record is compliant");
        Ok(0)
    } else {
        eprintln!(
            "record is not compliant: {} missing required, {} violations",
            report.missing_required.len(),
            report.violations.len()
        );
        Ok(1)
    }
}
