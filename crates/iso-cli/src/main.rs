//! `isogrid`: inspect scene files and manage a directory of named slots.

use clap::{Parser, Subcommand};
use iso_core::emitter::emit_document;
use iso_core::{EditorConfig, LintSeverity, SceneDocument, lint_document};
use iso_render::order::{draw_list, surface_extent};
use iso_store::{DirStore, SlotStore, export_file, import_file};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "isogrid", version, about = "Isometric scene inspector and slot manager")]
struct Cli {
    /// Editor configuration (JSON). Unspecified keys use defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scene file and report lint findings.
    Check { file: PathBuf },
    /// Print grid size, surface extent and element counts.
    Info { file: PathBuf },
    /// Print the back-to-front draw list.
    Order { file: PathBuf },
    /// Write an empty scene using the configured default grid.
    New { file: PathBuf },
    /// Manage named slots stored in a directory.
    Slots {
        #[arg(long, default_value = ".isogrid")]
        dir: PathBuf,
        #[command(subcommand)]
        command: SlotCommand,
    },
}

#[derive(Subcommand)]
enum SlotCommand {
    List,
    /// Print a slot's JSON.
    Show { name: String },
    Delete { name: String },
    /// Validate a scene file and store it as a slot.
    Import { name: String, file: PathBuf },
    /// Write a slot out to a scene file.
    Export { name: String, file: PathBuf },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Check { file } => check(&file)?,
        Commands::Info { file } => info(&import_file(&file)?)?,
        Commands::Order { file } => order(&import_file(&file)?)?,
        Commands::New { file } => {
            let doc = emit_document(&config.default_grid, &[]);
            export_file(&file, &doc)?;
            println!("wrote {}", file.display());
        }
        Commands::Slots { dir, command } => {
            let mut slots = SlotStore::new(DirStore::open(dir)?);
            match command {
                SlotCommand::List => {
                    for entry in slots.list()? {
                        println!("{}\t{}", entry.name, entry.timestamp.to_rfc3339());
                    }
                }
                SlotCommand::Show { name } => println!("{}", slots.load_json(&name)?),
                SlotCommand::Delete { name } => {
                    slots.delete(&name)?;
                    println!("deleted {name}");
                }
                SlotCommand::Import { name, file } => {
                    let text = std::fs::read_to_string(&file)?;
                    let entry = slots.import_json(&name, &text)?;
                    println!("saved {} at {}", entry.name, entry.timestamp.to_rfc3339());
                }
                SlotCommand::Export { name, file } => {
                    export_file(&file, &slots.load(&name)?)?;
                    println!("wrote {}", file.display());
                }
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let config = EditorConfig::from_json(&std::fs::read_to_string(path)?)?;
    log::debug!("config loaded from {}", path.display());
    Ok(config)
}

fn check(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let doc = import_file(file)?;
    let diagnostics = lint_document(&doc);
    for diag in &diagnostics {
        let level = match diag.severity {
            LintSeverity::Warning => "warning",
            LintSeverity::Info => "info",
        };
        let ids: Vec<&str> = diag.elements.iter().map(|id| id.as_str()).collect();
        println!("{level}[{}] {}: {}", diag.rule, ids.join(", "), diag.message);
    }
    println!(
        "{}: ok ({} elements, {} findings)",
        file.display(),
        doc.elements.len(),
        diagnostics.len()
    );
    Ok(())
}

fn info(doc: &SceneDocument) -> Result<(), Box<dyn std::error::Error>> {
    let grid = doc.metadata.grid_config()?;
    let extent = surface_extent(&grid);
    println!("version:  {}", doc.version);
    println!("saved:    {}", doc.timestamp.to_rfc3339());
    println!("grid:     {} x {} cells", grid.grid_width, grid.grid_height);
    println!("tiles:    {} x {} px", grid.tile_width, grid.tile_height);
    println!("surface:  {} x {} px", extent.width, extent.height);
    println!("elements: {}", doc.elements.len());
    for (label, count) in doc.type_counts() {
        println!("  {label:<10} {count}");
    }
    Ok(())
}

fn order(doc: &SceneDocument) -> Result<(), Box<dyn std::error::Error>> {
    let grid = doc.metadata.grid_config()?;
    for item in draw_list(&doc.elements, &grid) {
        let marker = if item.in_bounds { "" } else { "  (out of bounds)" };
        println!(
            "z={:<4} {:<12} {:<10} cell {} at ({}, {}){marker}",
            item.z,
            item.id.as_str(),
            item.element_type.label(),
            item.cell,
            item.anchor.x,
            item.anchor.y,
        );
    }
    Ok(())
}
