//! Preview command implementation
//!
//! Runs the composition pipeline and prints the result without writing a
//! MIDI file. Useful for auditioning a seed or debugging a config.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::ExitCode;

use chordforge_engine::{compose, theory};

use super::load_config;

/// Run the preview command.
///
/// # Returns
/// Exit code: 0 success, 1 composition error.
pub fn run(config_path: Option<&str>, seed: Option<u32>, json_output: bool) -> Result<ExitCode> {
    let config = load_config(config_path, seed)?;

    let composition = match compose(&config) {
        Ok(composition) => composition,
        Err(err) => {
            if json_output {
                println!(
                    "{}",
                    serde_json::json!({ "success": false, "errors": [err.to_string()] })
                );
            } else {
                println!("{} {}", "FAILED".red().bold(), err);
            }
            return Ok(ExitCode::from(1));
        }
    };

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&composition).context("failed to serialize composition")?
        );
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{} {} ({} beats, seed {})",
        "Key:".cyan().bold(),
        composition.key_name,
        composition.total_beats,
        config.seed
    );
    for warning in &composition.warnings {
        println!("  {} {}", "!".yellow(), warning);
    }

    println!("{}", "Chords:".cyan().bold());
    for block in &composition.chords {
        let notes: Vec<String> = block
            .pitches
            .iter()
            .map(|&p| theory::midi_to_note_name(p))
            .collect();
        println!(
            "  {:>7.2}  {:<12} {}",
            block.start_beats,
            block.name,
            notes.join(" ")
        );
    }

    for (label, part) in [
        ("Bass", &composition.bass),
        ("Arp", &composition.arp),
        ("Melody", &composition.melody),
    ] {
        if let Some(events) = part {
            println!(
                "{} {} notes",
                format!("{}:", label).cyan().bold(),
                events.len()
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}
