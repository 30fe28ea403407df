// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Floormark command line.
//!
//! Builds the room index for a dataset, resolves room names against it and
//! turns model annotation payloads into annotation sets.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use floormark::io::serialization::{self, Format};
use floormark::{FloorplanConfig, FloorplanView};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "floormark")]
#[command(about = "Room lookup and annotation ingest for floorplans", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (.yaml, .yml or .json)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the pixel bounds of every room
    Index {
        /// Room dataset (.json or .yaml)
        rooms: PathBuf,
    },
    /// Look up a room by a loosely phrased name
    Resolve {
        /// Room dataset (.json or .yaml)
        rooms: PathBuf,
        /// Room name as a person or model might phrase it
        query: String,
    },
    /// Convert a model reply or intent payload into annotations
    Ingest {
        /// Room dataset (.json or .yaml)
        rooms: PathBuf,
        /// Model reply containing an annotation block, or a bare JSON payload
        payload: PathBuf,
        /// Write annotations here instead of stdout; format follows the extension
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Format::Json,
            OutputFormat::Yaml => Format::Yaml,
        }
    }
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    Ok(text)
}

fn init_logging(config: &FloorplanConfig) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(config.log_level.to_level_filter());
    // RUST_LOG overrides the configured level
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn open_view(config: FloorplanConfig, rooms: &Path) -> Result<FloorplanView> {
    let dataset = serialization::import_rooms(rooms)?;
    let mut view = FloorplanView::new(config);
    view.load_rooms(&dataset)
        .with_context(|| format!("Failed to place rooms from {}", rooms.display()))?;
    Ok(view)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => FloorplanConfig::load(path)?,
        None => FloorplanConfig::default(),
    };
    init_logging(&config);

    match cli.command {
        Commands::Index { rooms } => {
            let view = open_view(config, &rooms)?;
            let Some(floorplan) = view.floorplan() else {
                bail!("No floorplan loaded");
            };
            let entries: Vec<_> = floorplan.index.rooms().collect();
            println!("{}", render(&entries, cli.format)?);
        }
        Commands::Resolve { rooms, query } => {
            let view = open_view(config, &rooms)?;
            let Some(floorplan) = view.floorplan() else {
                bail!("No floorplan loaded");
            };
            match floorplan.index.find_by_name(&query, &view.config().vocabulary) {
                Some(found) => {
                    log::info!("'{}' matched '{}' ({:?})", query, found.room.room_name, found.kind);
                    println!("{}", render(found.room, cli.format)?);
                }
                None => bail!("No room matches '{}'", query),
            }
        }
        Commands::Ingest {
            rooms,
            payload,
            output,
        } => {
            let mut view = open_view(config, &rooms)?;
            let text = std::fs::read_to_string(&payload)
                .with_context(|| format!("Failed to read payload {}", payload.display()))?;
            let applied = match view.apply_model_text(&text) {
                Ok(Some(count)) => count,
                Ok(None) => view.apply_payload(&text)?,
                Err(e) => return Err(e.into()),
            };
            log::info!("Produced {} annotations", applied);

            match output {
                Some(path) => serialization::export_annotations(view.annotations(), &path)?,
                None => println!(
                    "{}",
                    serialization::annotations_to_string(view.annotations(), cli.format.into())?
                ),
            }
        }
    }

    Ok(())
}
