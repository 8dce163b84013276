//! Swagger Reader CLI
//!
//! Command-line interface for generating API descriptions from resource
//! manifests, validating payloads against them, and linting manifests.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use swagger_reader::{
    lint, load_document, load_json, load_manifest_auto, validate_payload, FileStatus, Reader,
    ReaderConfig, Severity, ValidateError,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swagger-reader")]
#[command(about = "Generate Swagger API descriptions from resource manifests")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read one or more manifests into a single document
    Generate {
        /// Manifest sources: file paths or URLs (http:// or https://)
        #[arg(required = true)]
        sources: Vec<String>,

        /// Reader config file (info, basePath, seed tags and parameters)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Existing document to extend instead of starting empty
        #[arg(long)]
        document: Option<PathBuf>,

        /// Include resources and operations marked hidden
        #[arg(long)]
        include_hidden: bool,

        /// Default media types accepted by operations (repeatable)
        #[arg(long)]
        consumes: Vec<String>,

        /// Default media types returned by operations (repeatable)
        #[arg(long)]
        produces: Vec<String>,

        /// Output file (stdout if not specified)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a payload against a definition of a generated document
    Validate {
        /// Payload file to validate
        payload: PathBuf,

        /// Generated document holding the definitions
        #[arg(long)]
        document: PathBuf,

        /// Definition name to validate against
        #[arg(long)]
        shape: String,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Lint manifest files (syntax, type expressions, unreachable operations)
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Only show files and diagnostics that need attention
        #[arg(long, short)]
        quiet: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            sources,
            config,
            document,
            include_hidden,
            consumes,
            produces,
            output,
            pretty,
        } => run_generate(GenerateArgs {
            sources,
            config,
            document,
            include_hidden,
            consumes,
            produces,
            output,
            pretty,
        }),

        Commands::Validate {
            payload,
            document,
            shape,
            json,
        } => run_validate(&payload, &document, &shape, json),

        Commands::Lint {
            path,
            format,
            strict,
            quiet,
        } => run_lint(&path, format, strict, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

struct GenerateArgs {
    sources: Vec<String>,
    config: Option<PathBuf>,
    document: Option<PathBuf>,
    include_hidden: bool,
    consumes: Vec<String>,
    produces: Vec<String>,
    output: Option<PathBuf>,
    pretty: bool,
}

fn run_generate(args: GenerateArgs) -> Result<(), u8> {
    let config = match &args.config {
        Some(path) => ReaderConfig::load(path).map_err(|e| {
            eprintln!("Error loading config: {}", e);
            e.exit_code() as u8
        })?,
        None => ReaderConfig::default(),
    };

    // Command-line flags extend the config file.
    let mut options = config.read_options();
    options.include_hidden |= args.include_hidden;
    if !args.consumes.is_empty() {
        options.default_consumes = args.consumes;
    }
    if !args.produces.is_empty() {
        options.default_produces = args.produces;
    }

    let document = match &args.document {
        Some(path) => load_document(path).map_err(|e| {
            eprintln!("Error loading document: {}", e);
            e.exit_code() as u8
        })?,
        None => config.document(),
    };

    let mut reader = Reader::new(Some(document));
    for source in &args.sources {
        let manifest = load_manifest_auto(source).map_err(|e| {
            eprintln!("Error loading {}: {}", source, e);
            e.exit_code() as u8
        })?;
        reader.read_manifest(&manifest, &options).map_err(|e| {
            eprintln!("Error reading {}: {}", source, e);
            e.exit_code() as u8
        })?;
        info!(%source, resources = manifest.resources.len(), "read manifest");
    }

    write_json(reader.document(), args.pretty, args.output.as_deref())
}

fn write_json<T: Serialize>(value: &T, pretty: bool, output: Option<&Path>) -> Result<(), u8> {
    let json_output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_validate(
    payload_path: &Path,
    document_path: &Path,
    shape: &str,
    json_output: bool,
) -> Result<(), u8> {
    let payload = load_json(payload_path).map_err(|e| {
        report_error(json_output, &format!("loading payload: {}", e));
        e.exit_code() as u8
    })?;

    let document = load_document(document_path).map_err(|e| {
        report_error(json_output, &format!("loading document: {}", e));
        e.exit_code() as u8
    })?;

    match validate_payload(&document, shape, &payload) {
        Ok(()) => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(ValidateError::Invalid { errors }) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}

fn run_lint(path: &Path, format: OutputFormat, strict: bool, quiet: bool) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let result = lint(path, strict);
    let passed = result.is_ok() && (!strict || result.warnings == 0);

    match format {
        OutputFormat::Json => write_json(&result, true, None)?,
        OutputFormat::Text => {
            if !quiet {
                println!("Linting {} ...\n", path.display());
            }

            for file_result in &result.results {
                let status_icon = match file_result.status {
                    FileStatus::Ok => "\x1b[32m✓\x1b[0m",
                    FileStatus::Warning => "\x1b[33m⚠\x1b[0m",
                    FileStatus::Error => "\x1b[31m✗\x1b[0m",
                };
                if !quiet || file_result.status != FileStatus::Ok {
                    println!("  {} {}", status_icon, file_result.file.display());
                }

                for diag in &file_result.diagnostics {
                    if quiet && diag.severity != Severity::Error {
                        continue;
                    }
                    let (color, label) = match diag.severity {
                        Severity::Error => ("\x1b[31m", "error"),
                        Severity::Warning => ("\x1b[33m", "warning"),
                    };
                    println!(
                        "    {}{}[{}]\x1b[0m: {} - {}",
                        color, label, diag.code, diag.path, diag.message
                    );
                }
            }

            println!();
            if passed {
                println!(
                    "\x1b[32m✓ {} files checked, all passed\x1b[0m",
                    result.files_checked
                );
            } else {
                println!(
                    "\x1b[31m✗ {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                    result.files_checked,
                    result.passed,
                    result.failed,
                    result.errors,
                    result.warnings
                );
            }
        }
    }

    if passed {
        Ok(())
    } else {
        Err(1)
    }
}
