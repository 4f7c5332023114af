//! Import a SweetHome3D archive into an in-memory scene and report on it.
//!
//! Usage:
//!   sh3d-import house.zip
//!   sh3d-import house.zip --scale 0.01 --no-structure
//!   sh3d-import house.zip --config import.json --json

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use sh3d_core::scene::{CollectionSummary, SceneSummary};
use sh3d_core::{import_archive, ImportConfig, ImportReport, Scene};

#[derive(Parser)]
#[command(name = "sh3d-import")]
#[command(about = "Import a SweetHome3D zip export into a scene", version)]
struct Cli {
    /// Zip archive holding Home.xml and its models
    archive: PathBuf,

    /// JSON file with import settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scene units per centimeter
    #[arg(long)]
    scale: Option<f32>,

    /// Where to unpack the archive (default: <archive dir>/xml)
    #[arg(long)]
    extract_dir: Option<PathBuf>,

    /// Skip the house structure mesh
    #[arg(long)]
    no_structure: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

/// Everything printed with `--json`.
#[derive(Serialize)]
struct Output<'a> {
    report: &'a ImportReport,
    scene: SceneSummary,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let name = scene_name(&cli.archive);
    let mut scene = Scene::new(name);
    let report = import_archive(&mut scene, &cli.archive, &config)
        .with_context(|| format!("Failed to import {}", cli.archive.display()))?;

    if cli.json {
        let output = Output {
            report: &report,
            scene: scene.summary(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(&scene, &report);
    }
    Ok(())
}

/// Config file (or defaults) with command line overrides applied.
fn build_config(cli: &Cli) -> Result<ImportConfig> {
    let mut config = match &cli.config {
        Some(path) => ImportConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => ImportConfig::default(),
    };

    if let Some(scale) = cli.scale {
        config.scale = scale;
    }
    if let Some(dir) = &cli.extract_dir {
        config.extraction_dir = Some(dir.clone());
    }
    if cli.no_structure {
        config.import_structure = false;
    }

    config.validate()?;
    log::debug!("Import config: {:?}", config);
    Ok(config)
}

fn scene_name(archive: &Path) -> String {
    archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Home".to_string())
}

fn print_summary(scene: &Scene, report: &ImportReport) {
    let summary = scene.summary();

    println!("\n=== Scene: {} ===", summary.name);
    println!("Objects: {}", summary.objects);
    println!("Meshes: {}", summary.prototypes);
    println!("Materials: {}", summary.materials);
    println!("Images: {}", summary.images);
    println!("Total triangles: {}", summary.triangles);

    println!("\n--- Import ---");
    println!("  Templates: {}", report.templates);
    println!("  Instances: {}", report.instances);
    println!("  Structure parts: {}", report.structure_parts);
    println!("  Groups: {}", report.groups);
    println!("  Lights (not created): {}", report.lights);
    println!("  Skipped elements: {}", report.skipped);

    println!("\n--- Collections ---");
    print_collection(&summary.collections, 1);

    if let Some([min, max]) = summary.bounds {
        println!("\n--- World Bounds ---");
        println!("  Min: ({:.2}, {:.2}, {:.2})", min[0], min[1], min[2]);
        println!("  Max: ({:.2}, {:.2}, {:.2})", max[0], max[1], max[2]);
    }
}

fn print_collection(collection: &CollectionSummary, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}{} ({} objects)", indent, collection.name, collection.objects.len());

    for object in &collection.objects {
        let [x, y, z] = object.location;
        let [w, d, h] = object.dimensions;
        println!(
            "{}  - {} at ({:.2}, {:.2}, {:.2}) size {:.2} x {:.2} x {:.2}",
            indent, object.name, x, y, z, w, d, h
        );
    }
    for child in &collection.children {
        print_collection(child, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_over_defaults() {
        let cli = Cli::parse_from([
            "sh3d-import",
            "house.zip",
            "--scale",
            "0.1",
            "--extract-dir",
            "/tmp/unpacked",
            "--no-structure",
        ]);
        let config = build_config(&cli).unwrap();

        assert_eq!(config.scale, 0.1);
        assert_eq!(config.extraction_dir, Some(PathBuf::from("/tmp/unpacked")));
        assert!(!config.import_structure);
        assert_eq!(config.document_name, "Home.xml");
    }

    #[test]
    fn test_invalid_scale_is_rejected() {
        let cli = Cli::parse_from(["sh3d-import", "house.zip", "--scale", "0"]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_scene_name_from_archive() {
        assert_eq!(scene_name(Path::new("/homes/cottage.zip")), "cottage");
    }
}
