//! Example: Parse a home document and list its pieces.
//!
//! Run with: cargo run --example inspect_home -- path/to/Home.xml

use std::env;
use std::fs;

use sh3d_core::home::{parse_home, HomeNode};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: inspect_home <path-to-Home.xml>");
        return;
    }

    let path = &args[1];
    println!("Reading home document: {}", path);

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            return;
        }
    };

    match parse_home(&content) {
        Ok(home) => {
            println!("\n=== Home: {} ===", home.name.as_deref().unwrap_or("(unnamed)"));
            println!("Structure: {}", home.structure.as_deref().unwrap_or("(none)"));

            println!("\n--- Levels ---");
            for level in home.levels() {
                println!("  {} at {:.1} cm", level.id, level.elevation);
            }

            println!("\n--- Pieces ---");
            for piece in home.pieces() {
                println!(
                    "  {} ({:?}) at ({:.1}, {:.1}) size {:.1} x {:.1} x {:.1} - {}",
                    piece.name,
                    piece.category,
                    piece.x,
                    piece.y,
                    piece.width,
                    piece.depth,
                    piece.height,
                    piece.model
                );
            }

            let other = home
                .nodes
                .iter()
                .filter(|n| matches!(n, HomeNode::Other(_)))
                .count();
            println!("\nUnhandled top-level elements: {}", other);
        }
        Err(e) => {
            eprintln!("Error parsing home document: {}", e);
        }
    }
}
