//! Terminal viewer for step-by-step math visualizations.

mod cli;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, HELP, Input, parse_input};
use std::{path::Path, sync::Arc};
use terminal::{TerminalPlayer, render};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use visualmath_core::{
    CuratedCatalog, NavigationPolicy, StepSequenceViewer, TopicCatalog, catalog::EXAMPLE_TOPICS,
    step::sequence_schema,
};

fn build_catalog(dir: Option<&Path>) -> Result<CuratedCatalog> {
    let mut catalog = CuratedCatalog::builtin();
    if let Some(dir) = dir {
        catalog
            .extend_from_dir(dir)
            .with_context(|| format!("Failed to load catalog from {}", dir.display()))?;
    }
    Ok(catalog)
}

async fn prompt_topic(lines: &mut Lines<BufReader<Stdin>>) -> Result<String> {
    println!("Try: {}", EXAMPLE_TOPICS.join(", "));
    println!("Enter a math concept:");
    lines
        .next_line()
        .await?
        .context("No topic entered before end of input")
}

async fn run_viewer(
    catalog: &CuratedCatalog,
    topic: Option<String>,
    policy: NavigationPolicy,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let input = match topic {
        Some(topic) => topic,
        None => prompt_topic(&mut lines).await?,
    };

    let sequence = catalog.select(&input)?;
    if !catalog.is_curated(sequence.topic()) {
        if let Some(suggestion) = catalog.suggest(sequence.topic()) {
            println!("No curated lesson for '{}'. Did you mean '{}'?", sequence.topic(), suggestion);
        }
    }
    info!(topic = %sequence.topic(), steps = sequence.len(), %policy, "Opening viewer");

    let mut viewer = StepSequenceViewer::new(sequence, policy, Arc::new(TerminalPlayer))?;
    println!("{}", render(&viewer));

    while let Some(line) = lines.next_line().await? {
        let moved = match parse_input(&line) {
            Ok(Input::Next) => viewer.advance(),
            Ok(Input::Previous) => viewer.retreat(),
            Ok(Input::Jump(index)) => match viewer.jump_to(index) {
                Ok(moved) => moved,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            },
            Ok(Input::Help) => {
                println!("{}", HELP);
                continue;
            }
            Ok(Input::Quit) => break,
            Err(e) => {
                println!("{} ({})", e, HELP);
                continue;
            }
        };
        debug!(moved, position = viewer.position(), "Handled input");
        println!("{}", render(&viewer));
        // Let the clip announcement for the new step print before the next prompt.
        tokio::task::yield_now().await;
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let policy = cli.policy();
    match cli.command {
        Some(Commands::Topics { catalog }) => {
            let catalog = build_catalog(catalog.as_deref())?;
            println!("Examples:");
            for topic in EXAMPLE_TOPICS {
                println!("  {}", topic);
            }
            println!("Curated:");
            for topic in catalog.curated_topics() {
                println!("  {}", topic);
            }
        }
        Some(Commands::Schema) => {
            println!("{}", serde_json::to_string_pretty(&sequence_schema())?);
        }
        None => {
            let catalog = build_catalog(cli.catalog.as_deref())?;
            run_viewer(&catalog, cli.topic, policy).await?;
        }
    }
    Ok(())
}
