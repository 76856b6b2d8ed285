use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quarterly_panel::data::load_observations;
use quarterly_panel::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quarterly-panel")]
#[command(about = "Builds quarter-aligned panels from daily, monthly and quarterly series", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //build the quarterly panel described by a configuration file
    Build {
        //path to pipeline json configuration
        #[arg(long)]
        config: PathBuf,

        //output path for the wide panel csv (overrides the configuration)
        #[arg(long)]
        output_csv: Option<PathBuf>,

        //output path for the long panel csv (overrides the configuration)
        #[arg(long)]
        output_long_csv: Option<PathBuf>,

        //first quarter to keep in the output (eg 2015Q1)
        #[arg(long)]
        from: Option<QuarterKey>,

        //last quarter to keep in the output (eg 2025Q2)
        #[arg(long)]
        to: Option<QuarterKey>,

        //skip printing the panel table
        #[arg(long)]
        quiet: bool,
    },

    //write the default configuration to a file
    InitConfig {
        #[arg(long, default_value = "pipeline.json")]
        output: PathBuf,
    },

    //normalize a single csv series to quarterly and print it
    Normalize {
        //path to csv data file
        #[arg(long)]
        input: PathBuf,

        //native frequency (daily, monthly, quarterly)
        #[arg(long)]
        frequency: Frequency,

        //aggregation rule (last, mean, sum)
        #[arg(long)]
        rule: AggregationRule,

        //series name
        #[arg(long, default_value = "value")]
        name: String,

        #[arg(long, default_value = "date")]
        date_column: String,

        #[arg(long, default_value = "value")]
        value_column: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            config,
            output_csv,
            output_long_csv,
            from,
            to,
            quiet,
        } => {
            run_build(config, output_csv, output_long_csv, from, to, quiet)?;
        }
        Commands::InitConfig { output } => {
            PipelineConfiguration::default()
                .to_json_file(&output)
                .context(format!("Failed to write configuration to {:?}", output))?;
            println!("Default configuration written to {:?}", output);
        }
        Commands::Normalize {
            input,
            frequency,
            rule,
            name,
            date_column,
            value_column,
        } => {
            run_normalize(input, frequency, rule, name, &date_column, &value_column)?;
        }
    }

    Ok(())
}

fn run_build(
    config_path: PathBuf,
    output_csv: Option<PathBuf>,
    output_long_csv: Option<PathBuf>,
    from: Option<QuarterKey>,
    to: Option<QuarterKey>,
    quiet: bool,
) -> Result<()> {
    println!("Quarterly Panel Builder");
    println!("=======================\n");

    let config = PipelineConfiguration::from_json_file(&config_path)
        .context(format!("Failed to load configuration from {:?}", config_path))?;

    let output_csv = output_csv.or_else(|| config.output_csv.clone());
    let output_long_csv = output_long_csv.or_else(|| config.output_long_csv.clone());

    let source = CsvSource::new(&config.data_dir);
    let mut cache = SeriesCache::new();
    let pipeline = PanelPipeline::new(config);
    let result = pipeline.run(&source, &mut cache)?;

    let panel = result.panel.slice(from, to);
    if panel.is_empty() {
        log::warn!("Panel has no rows in the requested window");
    }

    if !quiet {
        pretty_print_panel(&panel);
        println!();
    }

    let summary = PanelSummary::from_panel(&pipeline.config().region, &panel);
    summary.pretty_print_table();

    if let Some(path) = output_csv {
        ensure_parent(&path)?;
        write_panel_csv(&panel, &path)?;
        println!("\nPanel saved to {:?}", path);
    }

    if let Some(path) = output_long_csv {
        ensure_parent(&path)?;
        write_long_csv(&panel, &path)?;
        println!("Long panel saved to {:?}", path);
    }

    Ok(())
}

fn run_normalize(
    input: PathBuf,
    frequency: Frequency,
    rule: AggregationRule,
    name: String,
    date_column: &str,
    value_column: &str,
) -> Result<()> {
    let observations = load_observations(&input, date_column, value_column)
        .context(format!("Failed to load data from {:?}", input))?;
    let series = SeriesRecord::new(name, frequency, rule, observations)?;
    log::info!(
        "Loaded {} {} observations for '{}'",
        series.len(),
        frequency,
        series.name()
    );

    let quarterly = normalize(&series, Frequency::Quarterly)?;
    let panel = fuse(std::slice::from_ref(&quarterly))?;
    pretty_print_panel(&panel);

    Ok(())
}

fn ensure_parent(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create output directory {:?}", parent))?;
    }
    Ok(())
}
