//! degeneromics - multi-omics marker discovery CLI
//!
//! Command-line interface for preprocessing, PCA, volcano-plot marker
//! detection and multi-omics integration.

use clap::{Parser, Subcommand, ValueEnum};
use degeneromics::data::MarkerRows;
use degeneromics::error::Result;
use degeneromics::io::{read_table, table_to_csv};
use degeneromics::markers::{detect_markers, MarkerParams};
use degeneromics::missing::MissingPolicy;
use degeneromics::normalize::{NormalizationMethod, OmicsLayer};
use degeneromics::pipeline::{
    integrate_layers, integrate_layers_on_key, run_preprocessing, Pipeline, PipelineConfig,
};
use degeneromics::profile::profile_missingness;
use degeneromics::reduce::{perform_pca, DEFAULT_COMPONENTS};
use log::info;
use std::path::{Path, PathBuf};

/// Output format for marker results
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary and top hits
    Text,
    /// Full marker set as JSON
    Json,
}

/// Statistical core for neurodegenerative multi-omics analysis
#[derive(Parser)]
#[command(name = "degeneromics")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug or trace
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve missing values and normalize a table
    Preprocess {
        /// Input table (.csv or .xlsx)
        #[arg(short, long)]
        input: PathBuf,

        /// Normalization: log2, log10, zscore, minmax or standard
        #[arg(short, long, default_value = "log2")]
        method: NormalizationMethod,

        /// Missing-value policy: mean, median or drop (anything else keeps the data)
        #[arg(long, default_value = "mean")]
        missing: String,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Run PCA on a normalized table
    Pca {
        /// Input table (.csv or .xlsx)
        #[arg(short, long)]
        input: PathBuf,

        /// Number of principal components
        #[arg(short = 'k', long, default_value_t = DEFAULT_COMPONENTS)]
        components: usize,

        /// Output CSV path for the component scores
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Detect differential markers between the two groups of a table
    Markers {
        /// Input table with a Group column (.csv or .xlsx)
        #[arg(short, long)]
        input: PathBuf,

        /// P-value threshold (default: 0.05)
        #[arg(long, default_value = "0.05")]
        p_threshold: f64,

        /// Fold-change threshold (default: 2.0)
        #[arg(long, default_value = "2.0")]
        fc_threshold: f64,

        /// Output CSV path for the marker table
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export every feature (volcano points), not only Up/Down markers
        #[arg(long)]
        all: bool,

        /// Format for the report on stdout
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Normalize three omics layers, merge them and run PCA
    Integrate {
        /// Transcriptomics table
        #[arg(short, long)]
        transcriptomics: PathBuf,

        /// Metabolomics table
        #[arg(short, long)]
        metabolomics: PathBuf,

        /// Lipidomics table
        #[arg(short, long)]
        lipidomics: PathBuf,

        /// Align rows on this sample column instead of by position
        #[arg(long)]
        key: Option<String>,

        /// Number of principal components
        #[arg(short = 'k', long, default_value_t = DEFAULT_COMPONENTS)]
        components: usize,

        /// Output CSV path for the component scores
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Run a pipeline from a YAML configuration file
    Run {
        /// Path to pipeline configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Input table (.csv or .xlsx)
        #[arg(short, long)]
        input: PathBuf,

        /// Prefix for output files (<prefix>_table.csv, _pca.csv, _markers.csv, _volcano.csv)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate an example pipeline configuration
    Example {
        /// Output path for YAML config
        #[arg(short, long, default_value = "pipeline.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = cli
        .log_level
        .parse::<log::LevelFilter>()
        .unwrap_or_else(|_| {
            eprintln!(
                "Warning: Invalid log level '{}' provided. Defaulting to info.",
                cli.log_level
            );
            log::LevelFilter::Info
        });
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_micros()
        .init();

    let result = match cli.command {
        Commands::Preprocess {
            input,
            method,
            missing,
            output,
        } => cmd_preprocess(&input, method, &missing, &output),

        Commands::Pca {
            input,
            components,
            output,
        } => cmd_pca(&input, components, &output),

        Commands::Markers {
            input,
            p_threshold,
            fc_threshold,
            output,
            all,
            format,
        } => cmd_markers(
            &input,
            p_threshold,
            fc_threshold,
            output.as_deref(),
            all,
            format,
        ),

        Commands::Integrate {
            transcriptomics,
            metabolomics,
            lipidomics,
            key,
            components,
            output,
        } => cmd_integrate(
            &transcriptomics,
            &metabolomics,
            &lipidomics,
            key.as_deref(),
            components,
            &output,
        ),

        Commands::Run {
            config,
            input,
            output,
        } => cmd_run(&config, &input, &output),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Resolve missing values and normalize
fn cmd_preprocess(
    input: &Path,
    method: NormalizationMethod,
    missing: &str,
    output: &Path,
) -> Result<()> {
    let table = read_table(input)?;
    info!(
        "Loaded {} rows x {} columns from {:?}",
        table.n_rows(),
        table.n_columns(),
        input
    );
    eprint!("{}", profile_missingness(&table));

    let policy = MissingPolicy::from_name(missing);
    let processed = run_preprocessing(&table, policy, method);

    std::fs::write(output, table_to_csv(&processed)?)?;
    eprintln!(
        "Wrote {} rows ({}, missing={}) to {:?}",
        processed.n_rows(),
        method.description(),
        policy,
        output
    );
    Ok(())
}

/// Run PCA on a table
fn cmd_pca(input: &Path, components: usize, output: &Path) -> Result<()> {
    let table = read_table(input)?;
    let pca = perform_pca(&table, components)?;

    std::fs::write(output, table_to_csv(&pca.scores)?)?;
    eprint!("{}", pca);
    eprintln!("Wrote component scores to {:?}", output);
    Ok(())
}

/// Detect volcano-plot markers
fn cmd_markers(
    input: &Path,
    p_threshold: f64,
    fc_threshold: f64,
    output: Option<&Path>,
    all: bool,
    format: OutputFormat,
) -> Result<()> {
    let table = read_table(input)?;
    let params = MarkerParams::new(p_threshold, fc_threshold)?;
    let markers = detect_markers(&table, &params)?;

    if let Some(path) = output {
        let rows = if all { MarkerRows::All } else { MarkerRows::Table };
        std::fs::write(path, markers.to_csv(rows)?)?;
        info!("Wrote markers to {:?}", path);
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&markers)?);
        }
        OutputFormat::Text => {
            println!("{} vs {}", markers.group_a, markers.group_b);
            print!("{}", markers.summary());
            if !markers.coercion.is_clean() {
                print!("{}", markers.coercion);
            }
            let top: Vec<_> = markers
                .sorted_by_pvalue()
                .into_iter()
                .filter(|r| r.regulation.is_significant())
                .take(10)
                .collect();
            if !top.is_empty() {
                println!("\nTop markers:");
                for r in top {
                    println!(
                        "  {}: log2FC={:.3}, p={:.4e} ({})",
                        r.feature, r.log2_fc, r.p_value, r.regulation
                    );
                }
            }
        }
    }
    Ok(())
}

/// Integrate three omics layers and run PCA
fn cmd_integrate(
    transcriptomics: &Path,
    metabolomics: &Path,
    lipidomics: &Path,
    key: Option<&str>,
    components: usize,
    output: &Path,
) -> Result<()> {
    let layers = vec![
        (OmicsLayer::Transcriptomics, read_table(transcriptomics)?),
        (OmicsLayer::Metabolomics, read_table(metabolomics)?),
        (OmicsLayer::Lipidomics, read_table(lipidomics)?),
    ];

    let pca = match key {
        Some(key) => integrate_layers_on_key(&layers, key, components)?,
        None => integrate_layers(&layers, components)?,
    };

    std::fs::write(output, table_to_csv(&pca.scores)?)?;
    eprint!("{}", pca);
    eprintln!("Integration and PCA completed, scores written to {:?}", output);
    Ok(())
}

/// Run a pipeline from configuration
fn cmd_run(config_path: &Path, input: &Path, prefix: &Path) -> Result<()> {
    info!("Loading pipeline configuration from {:?}", config_path);
    let config_str = std::fs::read_to_string(config_path)?;
    let config = PipelineConfig::from_yaml(&config_str)?;

    let table = read_table(input)?;
    info!("Loaded {} rows x {} columns", table.n_rows(), table.n_columns());

    let pipeline = Pipeline::from_config(&config);
    let output = pipeline.run(&table)?;

    if let Some(pca) = &output.pca {
        eprint!("{}", pca);
    }
    if let Some(markers) = &output.markers {
        eprint!("{}", markers.summary());
    }
    for (suffix, bytes) in output.csv_exports()? {
        let path = with_suffix(prefix, suffix);
        std::fs::write(&path, bytes)?;
        eprintln!("Wrote {:?}", path);
    }
    Ok(())
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push("_");
    name.push(suffix);
    PathBuf::from(name)
}

/// Generate example configuration
fn cmd_example(output_path: &Path) -> Result<()> {
    let pipeline = Pipeline::new()
        .name("example-volcano")
        .resolve_missing(MissingPolicy::Mean)
        .normalize(NormalizationMethod::Log2)
        .pca(DEFAULT_COMPONENTS)
        .markers(0.05, 2.0);

    let config = pipeline.to_config(Some(
        "Mean imputation, log2 normalization, PCA and volcano-plot marker detection",
    ));
    let yaml = config.to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example pipeline to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}
