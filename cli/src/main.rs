use std::fs;
use std::path::{Path, PathBuf};

use action_schema_config::{SchemaFile, load_records, parse_assignments};
use action_schema_core::{SchemaRegistry, ValidationErrors, Validator};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

const SCHEMA_FILE_VERSION: &str = "1.0";

#[derive(Debug, Parser)]
#[command(name = "action-validate")]
#[command(about = "Validate action records against declarative schemas")]
struct Cli {
    /// Schema file (YAML or JSON) replacing the built-in bookstore schemas.
    #[arg(long, global = true)]
    schemas: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate one record given as NAME=VALUE arguments.
    Check(CheckArgs),
    /// Validate every record of a JSON array file (optionally gzipped).
    CheckFile(CheckFileArgs),
    /// List the known actions and their fields.
    Actions,
    /// Write the active schemas to a YAML or JSON schema file.
    ExportSchemas(ExportArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Action name (e.g. addBook).
    action: String,
    /// Directory used to resolve relative `_json=PATH` includes.
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,
    /// Field assignments: NAME=VALUE, NAME=[V1; V2], or _json=PATH.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    assignments: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckFileArgs {
    /// Action name (e.g. addBook).
    action: String,
    /// JSON file holding an array of records (`.gz` allowed).
    data_file: PathBuf,
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Output path; `.yml`/`.yaml` selects YAML, anything else JSON.
    #[arg(long)]
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_validator(cli.schemas.as_deref()).and_then(|validator| match cli.command {
        Command::Check(args) => run_check(&validator, args),
        Command::CheckFile(args) => run_check_file(&validator, args),
        Command::Actions => run_actions(&validator),
        Command::ExportSchemas(args) => run_export_schemas(&validator, args),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_validator(schemas: Option<&Path>) -> Result<Validator, String> {
    let registry = match schemas {
        Some(path) => SchemaFile::load(path)
            .and_then(|file| file.to_registry())
            .map_err(|err| format!("Failed to load schemas '{}': {err}", path.display()))?,
        None => SchemaRegistry::bookstore(),
    };
    tracing::debug!(actions = registry.len(), "schema registry ready");
    Ok(Validator::new(registry))
}

fn print_json(value: &Value) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(value)
        .map_err(|err| format!("Failed to serialize output: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn report(errors: &ValidationErrors) {
    for error in errors {
        eprintln!("{error}");
    }
}

fn run_check(validator: &Validator, args: CheckArgs) -> Result<(), String> {
    let (record, rest) =
        parse_assignments(&args.assignments, &args.data_dir).map_err(|e| e.to_string())?;
    if !rest.is_empty() {
        return Err(format!("unknown arguments {}", rest.join(" ")));
    }

    match validator.validate(&args.action, &record) {
        Ok(canonical) => print_json(&Value::Object(canonical)),
        Err(errors) => {
            report(&errors);
            Err(format!("{} validation error(s)", errors.len()))
        }
    }
}

fn run_check_file(validator: &Validator, args: CheckFileArgs) -> Result<(), String> {
    let records = load_records(&args.data_file)
        .map_err(|err| format!("cannot read {}: {err}", args.data_file.display()))?;

    let results = validator.validate_many(&args.action, &records);

    let mut accepted = Vec::new();
    let mut failed = 0;
    for (i, result) in results.into_iter().enumerate() {
        match result {
            Ok(canonical) => accepted.push(Value::Object(canonical)),
            Err(errors) => {
                failed += 1;
                for error in &errors {
                    eprintln!("record {i}: {error}");
                }
            }
        }
    }

    print_json(&Value::Array(accepted))?;
    if failed > 0 {
        return Err(format!(
            "{failed} of {} record(s) failed validation",
            records.len()
        ));
    }
    Ok(())
}

fn run_actions(validator: &Validator) -> Result<(), String> {
    for schema in validator.registry().iter() {
        let policy = if schema.allows_unknown_fields() {
            " (unknown fields allowed)"
        } else {
            ""
        };
        println!("{}{policy}", schema.name());
        for rule in schema.fields() {
            let required = if rule.required { "required" } else { "optional" };
            println!("  {:<20} {:<24} {required}", rule.name, rule.label);
        }
        if schema.record_check().is_some() {
            println!("  + record check");
        }
    }
    Ok(())
}

fn run_export_schemas(validator: &Validator, args: ExportArgs) -> Result<(), String> {
    let mut file = SchemaFile::from_registry(validator.registry(), SCHEMA_FILE_VERSION)
        .map_err(|e| e.to_string())?;
    file.generated_at = Some(chrono::Utc::now().to_rfc3339());

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }

    file.save(&args.output)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;

    println!(
        "Exported {} action schema(s) into '{}'.",
        file.actions.len(),
        args.output.display()
    );
    Ok(())
}
