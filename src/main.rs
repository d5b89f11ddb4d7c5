use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tee_fit::config::{self, ConfigError};
use tee_fit::evaluate::{evaluate_all, StyleRun};
use tee_fit::scoring::{FitModel, ModelConfig};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_OUTPUT: i32 = 3;
const EXIT_CONFIG: i32 = 4;

const DEFAULT_BODY: &str = "data/body_measurements.csv";
const DEFAULT_SHIRTS: &str = "data/shirt_data.csv";
const DEFAULT_OUT: &str = "outputs/fit_results.csv";

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    /// Ranked table for humans
    #[default]
    Table,
    /// Tab-separated values for scripting
    Tsv,
    /// JSON with per-aspect breakdown
    Json,
}

#[derive(Args, Debug, Default)]
struct EvaluateArgs {
    /// Body measurements CSV (Measurement,Value rows or a single row)
    #[arg(long)]
    body: Option<PathBuf>,

    /// Shirt measurements CSV, one shirt per row
    #[arg(long)]
    shirts: Option<PathBuf>,

    /// Where to write the results CSV
    #[arg(long)]
    out: Option<PathBuf>,

    /// Style profile overlay (without the .yaml extension)
    #[arg(long)]
    style_profile: Option<String>,

    /// Console output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score shirts against body measurements (default if no subcommand)
    Evaluate(EvaluateArgs),
    /// List available style profiles
    Styles,
    /// Print the effective configuration as YAML
    ShowConfig {
        /// Merge this style profile over the base config
        #[arg(long)]
        style_profile: Option<String>,
    },
    /// Write the default config and style profiles to the config directory
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "tee-fit")]
#[command(about = "T-shirt fit scoring CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging and detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding config/ and style_profiles/
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn exit_config_error(e: ConfigError) -> ! {
    eprintln!("Config error: {}", e);
    std::process::exit(EXIT_CONFIG);
}

fn load_model(root: &Path, style_profile: Option<&str>) -> (ModelConfig, FitModel) {
    let config =
        config::load_model_config(root, style_profile).unwrap_or_else(|e| exit_config_error(e));
    let model = FitModel::from_config(&config).unwrap_or_else(|e| exit_config_error(e));
    (config, model)
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = tee_fit::telemetry::init(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Evaluate(EvaluateArgs::default()));
    let root = config::resolve_config_root(cli.config_dir);

    match command {
        Commands::Evaluate(args) => run_evaluate(&root, args, cli.verbose),
        Commands::Styles => {
            let names = match config::list_style_profiles(&root) {
                Ok(names) => names,
                Err(e) => {
                    eprintln!("Config error: {:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            if names.is_empty() {
                println!("No style profiles found in {}", root.display());
            }
            for name in names {
                println!("{}", name);
            }
        }
        Commands::ShowConfig { style_profile } => {
            let (config, _model) = load_model(&root, style_profile.as_deref());
            match serde_saphyr::to_string(&config) {
                Ok(yaml) => print!("{}", yaml),
                Err(e) => {
                    eprintln!("Failed to serialize config: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            }
        }
        Commands::Init { force } => match config::write_default_config(&root, force) {
            Ok(written) if written.is_empty() => {
                println!(
                    "Config already present in {}. Use --force to overwrite.",
                    root.display()
                );
            }
            Ok(written) => {
                for path in written {
                    println!("Wrote {}", path.display());
                }
            }
            Err(e) => {
                eprintln!("Failed to write config: {:#}", e);
                std::process::exit(EXIT_OUTPUT);
            }
        },
    }

    std::process::exit(EXIT_SUCCESS);
}

fn run_evaluate(root: &Path, args: EvaluateArgs, verbose: bool) {
    let start_time = Instant::now();
    let body_path = args.body.unwrap_or_else(|| PathBuf::from(DEFAULT_BODY));
    let shirts_path = args.shirts.unwrap_or_else(|| PathBuf::from(DEFAULT_SHIRTS));
    let out_path = args.out.unwrap_or_else(|| PathBuf::from(DEFAULT_OUT));

    // Config errors abort before any input is read
    let (_, core) = load_model(root, None);
    let style = args.style_profile.map(|name| {
        let (_, model) = load_model(root, Some(&name));
        StyleRun { name, model }
    });

    if verbose {
        eprintln!("Config root: {}", root.display());
        eprintln!("Scoring {} aspects", core.aspects().len());
    }

    if !body_path.exists() || !shirts_path.exists() {
        eprintln!("Missing input data. Please check the provided paths.");
        std::process::exit(EXIT_INPUT);
    }

    let body = tee_fit::data::load_body_measurements(&body_path).unwrap_or_else(|e| {
        eprintln!("Input error: {:#}", e);
        std::process::exit(EXIT_INPUT);
    });
    let garments = tee_fit::data::load_garments(&shirts_path).unwrap_or_else(|e| {
        eprintln!("Input error: {:#}", e);
        std::process::exit(EXIT_INPUT);
    });

    let records = evaluate_all(&body, &garments, &core, style.as_ref());

    if let Err(e) = tee_fit::output::write_results_csv(&out_path, &records, style.is_some()) {
        eprintln!("Output error: {:#}", e);
        std::process::exit(EXIT_OUTPUT);
    }

    let use_colors = tee_fit::output::should_use_colors();
    match args.format {
        OutputFormat::Table if verbose && !records.is_empty() => {
            for record in &records {
                println!("{}", tee_fit::output::format_fit_detail(record, use_colors));
                println!();
            }
        }
        OutputFormat::Table => {
            println!("{}", tee_fit::output::format_fit_table(&records, use_colors));
        }
        OutputFormat::Tsv => {
            let output = tee_fit::output::format_tsv(&records);
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        OutputFormat::Json => match tee_fit::output::format_json(&records) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Output error: {}", e);
                std::process::exit(EXIT_OUTPUT);
            }
        },
    }

    if verbose {
        eprintln!();
        eprintln!(
            "Total: {} shirts in {:?}, results written to {}",
            records.len(),
            start_time.elapsed(),
            out_path.display()
        );
    }
}
