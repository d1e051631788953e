use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::analysis::classification::{category_column, classify};
use crate::analysis::gene_labels::create_gene_labels;
use crate::analysis::volcano_plot::build_plot;
use crate::cli::Cli;
use crate::config::VolcanoConfig;
use crate::data_handling::expression_table::ExpressionTable;
use crate::helper_functions::dataframe_to_csv;
use crate::models::Dataset;

mod analysis;
mod cli;
mod config;
mod data_handling;
mod helper_functions;
mod models;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    info!("Starting volcano plot for {}", cli.input.display());

    // Parameters first: a bad config should fail before any data is read
    let config = VolcanoConfig::resolve(cli).context("failed to resolve configuration")?;
    let cutoff = config.cutoff()?;
    let bounds = config.axis_bounds()?;
    let genes_of_interest = config.genes_of_interest()?;
    let style = config.plot_style()?;

    let table = ExpressionTable { path: cli.input.clone() };
    let mut df = table
        .load_derived()
        .with_context(|| format!("failed to load {}", cli.input.display()))?;

    let classification = classify(&df, cutoff)?;
    let labels = create_gene_labels(genes_of_interest, &df).context("failed to place gene labels")?;
    info!("Labelling {} genes", labels.len());

    build_plot(&classification, &labels, &style, bounds)
        .draw(&cli.out)
        .with_context(|| format!("failed to write {}", cli.out.display()))?;

    if let Some(table_out) = &cli.table_out {
        let categories = category_column(&df, cutoff)?;
        df.with_column(categories)?;
        dataframe_to_csv(&mut df, table_out, true)
            .with_context(|| format!("failed to write {}", table_out.display()))?;
    }

    info!("Done");
    Ok(())
}
