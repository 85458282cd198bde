//! CLI tool to convert a JSON content tree to an Automerge tree document.
//!
//! Usage:
//!   board2automerge --input map.json [--output map.automerge] [--validate] [--stats]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sceneboard::{share, ContentIdea, StoryboardConfig, StoryboardManager, TreeDocument};

#[derive(Parser, Debug)]
#[command(
    name = "board2automerge",
    about = "Convert a JSON content tree to Automerge binary format",
    version
)]
struct Args {
    /// Input JSON file path (nested content tree)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file path (defaults to input path with .automerge extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Root attribute holding the storyboard name list
    #[arg(long, env = "SCENEBOARD_STORYBOARDS_ATTR", default_value = sceneboard::config::DEFAULT_STORYBOARDS_ATTRIBUTE)]
    storyboards_attr: String,

    /// Per-node attribute holding scene descriptors
    #[arg(long, env = "SCENEBOARD_SCENES_ATTR", default_value = sceneboard::config::DEFAULT_SCENES_ATTRIBUTE)]
    scenes_attr: String,

    /// Validate output by reloading and re-projecting the scenes
    #[arg(long, default_value = "false")]
    validate: bool,

    /// Print storyboards and the active storyboard's scenes
    #[arg(long, default_value = "false")]
    stats: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = StoryboardConfig::new(args.storyboards_attr.clone(), args.scenes_attr.clone());

    // 1. Validate input exists
    let input_path = &args.input;
    if !input_path.exists() {
        anyhow::bail!("Input file does not exist: {}", input_path.display());
    }

    // 2. Read and parse the content tree
    let json_content = std::fs::read_to_string(input_path).context("Failed to read input file")?;
    let content: ContentIdea = serde_json::from_str(&json_content).context("Failed to parse JSON")?;

    // 3. Build the Automerge document
    let mut doc = TreeDocument::from_content(&content).context("Failed to build tree document")?;
    let num_nodes = doc.len();
    let binary = doc.save();
    tracing::info!(nodes = num_nodes, bytes = binary.len(), "built tree document");

    // 4. Determine output path and write
    let output_path = args.output.clone().unwrap_or_else(|| {
        let mut path = input_path.clone();
        path.set_extension("automerge");
        path
    });
    std::fs::write(&output_path, &binary).context("Failed to write output file")?;

    let mut manager = StoryboardManager::new(config.clone());
    manager.set_document(share(doc));
    let scenes = manager.scenes();

    // 5. Optional validation
    if args.validate {
        let loaded = TreeDocument::from_bytes(&binary).context("Failed to load binary for validation")?;
        if loaded.len() != num_nodes {
            anyhow::bail!(
                "Validation failed: node count mismatch (expected {}, got {})",
                num_nodes,
                loaded.len()
            );
        }

        let mut reloaded = StoryboardManager::new(config);
        reloaded.set_document(share(loaded));
        if reloaded.storyboard_names() != manager.storyboard_names() {
            anyhow::bail!("Validation failed: storyboard names differ after reload");
        }
        if reloaded.scenes() != scenes {
            anyhow::bail!(
                "Validation failed: scene mismatch (expected {}, got {})",
                scenes.len(),
                reloaded.scenes().len()
            );
        }

        println!("✓ Validation passed!");
    }

    // 6. Optional stats
    if args.stats {
        let names = manager.storyboard_names();
        println!();
        println!("Conversion statistics:");
        println!("  Root: {} ({})", content.title, content.id);
        println!("  Nodes: {}", num_nodes);
        println!();
        println!("  Input JSON:    {:>10} bytes", json_content.len());
        println!("  Output binary: {:>10} bytes", binary.len());
        println!();
        println!("  Storyboards: {}", names.len());
        for (i, name) in names.iter().enumerate() {
            let marker = if i == 0 { "*" } else { " " };
            println!("   {} {}", marker, name);
        }
        if let Some(active) = manager.active_storyboard_name() {
            println!();
            println!("  Scenes in '{}': {}", active, scenes.len());
            for scene in &scenes {
                println!("    {:>10}  #{:<6} {}", scene.index, scene.idea_id, scene.title);
            }
            println!("  Next scene index: {}", manager.next_scene_index());
            if manager.needs_renumbering() {
                println!("  Warning: index gaps exhausted, renumbering recommended");
            }
        }
    }

    println!();
    println!(
        "Successfully converted {} → {}",
        input_path.display(),
        output_path.display()
    );

    Ok(())
}
