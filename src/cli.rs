use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tidycsv::config::{
    AppSettings, get_config_path, load_app_config, load_app_config_from, save_app_config_to,
};
use tidycsv::pipeline::{CleaningRequest, Operation, OperationSet, run_cleaning};

#[derive(Parser)]
#[command(name = "tidycsv", about = "Clean a CSV file and report what changed")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean a CSV file and save the result
    Clean {
        /// Input CSV file
        #[arg(short, long, required_unless_present = "request")]
        input: Option<PathBuf>,

        /// Output CSV file
        #[arg(short, long, required_unless_present = "request")]
        output: Option<PathBuf>,

        /// Operation to apply; repeat or comma-separate. Run order is fixed.
        #[arg(long = "op", value_delimiter = ',')]
        ops: Vec<Operation>,

        /// Apply all five operations
        #[arg(long, conflicts_with = "ops")]
        all: bool,

        /// Fail instead of replacing an existing output file
        #[arg(long)]
        no_overwrite: bool,

        /// Rows scanned for type inference (default: whole file)
        #[arg(long)]
        infer_schema_length: Option<usize>,

        /// Settings file to use instead of the per-user one
        #[arg(long, env = "TIDYCSV_CONFIG")]
        config: Option<PathBuf>,

        /// JSON cleaning request; other flags override its fields
        #[arg(long)]
        request: Option<PathBuf>,

        /// Write the merged request to this JSON file before running
        #[arg(long)]
        save_request: Option<PathBuf>,
    },
    /// List the available operations in the order they run
    Operations,
    /// Show the saved settings, updating them first if any flag is given
    Config {
        /// Operations `clean` uses when given neither --op nor --all
        #[arg(long = "default-op", value_delimiter = ',')]
        default_ops: Vec<Operation>,

        /// Forget the saved default operations
        #[arg(long, conflicts_with = "default_ops")]
        clear_default_ops: bool,

        /// Rows scanned for type inference
        #[arg(long, conflicts_with = "full_inference")]
        infer_schema_length: Option<usize>,

        /// Scan the whole file for type inference
        #[arg(long)]
        full_inference: bool,

        /// Whether `clean` may replace an existing output file
        #[arg(long)]
        overwrite: Option<bool>,

        /// Settings file to use instead of the per-user one
        #[arg(long, env = "TIDYCSV_CONFIG")]
        config: Option<PathBuf>,
    },
}

pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Clean {
            input,
            output,
            ops,
            all,
            no_overwrite,
            infer_schema_length,
            config,
            request,
            save_request,
        } => {
            let settings = match config {
                Some(path) => load_app_config_from(&path),
                None => load_app_config(),
            };
            let request = build_request(
                &settings,
                RequestArgs {
                    input,
                    output,
                    ops,
                    all,
                    no_overwrite,
                    infer_schema_length,
                    request,
                },
            )?;
            if let Some(path) = save_request {
                request
                    .to_file(&path)
                    .with_context(|| format!("Failed to save request {}", path.display()))?;
                tracing::info!("Saved cleaning request to {}", path.display());
            }
            handle_clean(&request)
        }
        Commands::Operations => {
            handle_operations();
            Ok(())
        }
        Commands::Config {
            default_ops,
            clear_default_ops,
            infer_schema_length,
            full_inference,
            overwrite,
            config,
        } => handle_config(
            config.unwrap_or_else(get_config_path),
            SettingsUpdate {
                default_ops,
                clear_default_ops,
                infer_schema_length,
                full_inference,
                overwrite,
            },
        ),
    }
}

struct RequestArgs {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    ops: Vec<Operation>,
    all: bool,
    no_overwrite: bool,
    infer_schema_length: Option<usize>,
    request: Option<PathBuf>,
}

/// Merge settings, an optional saved request and command-line flags, in
/// increasing order of precedence.
fn build_request(settings: &AppSettings, args: RequestArgs) -> Result<CleaningRequest> {
    let mut request = match &args.request {
        Some(path) => CleaningRequest::from_file(path)
            .with_context(|| format!("Failed to load request {}", path.display()))?,
        None => {
            let mut request = CleaningRequest::new(
                PathBuf::new(),
                PathBuf::new(),
                settings.default_operation_set(),
            );
            request.load = settings.load_options();
            request.write = settings.write_options();
            request
        }
    };

    if let Some(input) = args.input {
        request.input = input;
    }
    if let Some(output) = args.output {
        request.output = output;
    }
    if args.all {
        request.operations = OperationSet::all();
    } else if !args.ops.is_empty() {
        request.operations = args.ops.into_iter().collect();
    }
    if args.no_overwrite {
        request.write.overwrite = false;
    }
    if args.infer_schema_length.is_some() {
        request.load.infer_schema_length = args.infer_schema_length;
    }

    Ok(request)
}

fn handle_clean(request: &CleaningRequest) -> Result<()> {
    let report = run_cleaning(request)?;
    for line in report.log.lines() {
        println!("{line}");
    }
    Ok(())
}

struct SettingsUpdate {
    default_ops: Vec<Operation>,
    clear_default_ops: bool,
    infer_schema_length: Option<usize>,
    full_inference: bool,
    overwrite: Option<bool>,
}

/// Apply the requested changes. Returns `true` if anything was asked for.
fn apply_settings_update(settings: &mut AppSettings, update: SettingsUpdate) -> bool {
    let mut changed = false;
    if update.clear_default_ops {
        settings.default_operations.clear();
        changed = true;
    } else if !update.default_ops.is_empty() {
        // Stored in run order, without repeats
        let ops: OperationSet = update.default_ops.into_iter().collect();
        settings.default_operations = ops.iter().collect();
        changed = true;
    }
    if update.full_inference {
        settings.infer_schema_length = None;
        changed = true;
    } else if update.infer_schema_length.is_some() {
        settings.infer_schema_length = update.infer_schema_length;
        changed = true;
    }
    if let Some(overwrite) = update.overwrite {
        settings.overwrite_output = overwrite;
        changed = true;
    }
    changed
}

fn handle_config(path: PathBuf, update: SettingsUpdate) -> Result<()> {
    let mut settings = load_app_config_from(&path);
    if apply_settings_update(&mut settings, update) {
        save_app_config_to(&settings, &path)
            .with_context(|| format!("Failed to save settings {}", path.display()))?;
        tracing::info!("Saved settings to {}", path.display());
    }
    println!("{}", path.display());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

fn handle_operations() {
    for op in Operation::ALL {
        println!("{:<20} {}", op.as_str(), op.label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    fn clean_args(argv: &[&str]) -> RequestArgs {
        let cli = Cli::try_parse_from(argv).expect("arguments parse");
        match cli.command {
            Commands::Clean {
                input,
                output,
                ops,
                all,
                no_overwrite,
                infer_schema_length,
                request,
                ..
            } => RequestArgs {
                input,
                output,
                ops,
                all,
                no_overwrite,
                infer_schema_length,
                request,
            },
            _ => panic!("expected clean"),
        }
    }

    #[test]
    fn test_ops_flags_parse() -> Result<()> {
        let args = clean_args(&[
            "tidycsv",
            "clean",
            "-i",
            "in.csv",
            "-o",
            "out.csv",
            "--op",
            "handle_outliers,remove_null",
            "--op",
            "remove_na",
        ]);
        let request = build_request(&AppSettings::default(), args)?;
        assert_eq!(
            request.operations.iter().collect::<Vec<_>>(),
            vec![
                Operation::RemoveNull,
                Operation::RemoveNa,
                Operation::HandleOutliers
            ]
        );
        assert_eq!(request.input, PathBuf::from("in.csv"));
        Ok(())
    }

    #[test]
    fn test_unknown_op_rejected() {
        let parsed = Cli::try_parse_from([
            "tidycsv", "clean", "-i", "a.csv", "-o", "b.csv", "--op", "shuffle",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_settings_supply_defaults() -> Result<()> {
        let settings = AppSettings {
            default_operations: vec![Operation::RemoveDuplicates],
            infer_schema_length: Some(100),
            overwrite_output: true,
        };
        let args = clean_args(&["tidycsv", "clean", "-i", "a.csv", "-o", "b.csv", "--no-overwrite"]);
        let request = build_request(&settings, args)?;

        assert!(request.operations.contains(Operation::RemoveDuplicates));
        assert_eq!(request.operations.len(), 1);
        assert_eq!(request.load.infer_schema_length, Some(100));
        assert!(!request.write.overwrite);
        Ok(())
    }

    #[test]
    fn test_all_flag() -> Result<()> {
        let args = clean_args(&["tidycsv", "clean", "-i", "a.csv", "-o", "b.csv", "--all"]);
        let request = build_request(&AppSettings::default(), args)?;
        assert_eq!(request.operations, OperationSet::all());
        Ok(())
    }

    #[test]
    fn test_no_ops_and_no_defaults_is_empty() -> Result<()> {
        let args = clean_args(&["tidycsv", "clean", "-i", "a.csv", "-o", "b.csv"]);
        let request = build_request(&AppSettings::default(), args)?;
        assert!(request.operations.is_empty());
        Ok(())
    }

    #[test]
    fn test_saved_request_round_trips() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let args = clean_args(&[
            "tidycsv", "clean", "-i", "a.csv", "-o", "b.csv", "--op", "remove_na", "--no-overwrite",
        ]);
        let request = build_request(&AppSettings::default(), args)?;
        let path = dir.path().join("request.json");
        request.to_file(&path)?;

        let args = clean_args(&[
            "tidycsv",
            "clean",
            "--request",
            path.to_str().expect("utf-8 path"),
            "-o",
            "c.csv",
        ]);
        let reloaded = build_request(&AppSettings::default(), args)?;
        assert_eq!(reloaded.input, PathBuf::from("a.csv"));
        assert_eq!(reloaded.output, PathBuf::from("c.csv"));
        assert_eq!(reloaded.operations, request.operations);
        assert!(!reloaded.write.overwrite);
        Ok(())
    }

    fn config_update(argv: &[&str]) -> (Option<PathBuf>, SettingsUpdate) {
        let cli = Cli::try_parse_from(argv).expect("arguments parse");
        match cli.command {
            Commands::Config {
                default_ops,
                clear_default_ops,
                infer_schema_length,
                full_inference,
                overwrite,
                config,
            } => (
                config,
                SettingsUpdate {
                    default_ops,
                    clear_default_ops,
                    infer_schema_length,
                    full_inference,
                    overwrite,
                },
            ),
            _ => panic!("expected config"),
        }
    }

    #[test]
    fn test_config_updates_are_saved() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings").join("config.json");
        let path_arg = path.to_str().expect("utf-8 path");

        let (config, update) = config_update(&[
            "tidycsv",
            "config",
            "--config",
            path_arg,
            "--default-op",
            "handle_outliers,remove_null,remove_null",
            "--infer-schema-length",
            "250",
            "--overwrite",
            "false",
        ]);
        assert_eq!(config.as_deref(), Some(path.as_path()));
        handle_config(path.clone(), update)?;

        let saved = load_app_config_from(&path);
        assert_eq!(
            saved.default_operations,
            vec![Operation::RemoveNull, Operation::HandleOutliers]
        );
        assert_eq!(saved.infer_schema_length, Some(250));
        assert!(!saved.overwrite_output);

        let (_, update) = config_update(&[
            "tidycsv",
            "config",
            "--clear-default-ops",
            "--full-inference",
        ]);
        handle_config(path.clone(), update)?;
        let saved = load_app_config_from(&path);
        assert!(saved.default_operations.is_empty());
        assert_eq!(saved.infer_schema_length, None);
        assert!(!saved.overwrite_output);
        Ok(())
    }

    #[test]
    fn test_config_without_flags_writes_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");
        let (_, update) = config_update(&["tidycsv", "config"]);
        handle_config(path.clone(), update)?;
        assert!(!path.exists());
        Ok(())
    }
}
