//! Generate command implementation
//!
//! Runs the composition pipeline for a config and writes the result to a
//! Standard MIDI File.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use chordforge_engine::compose;
use chordforge_spec::GenerationConfig;

use crate::midi;

use super::load_config;

/// Machine-readable result of a generate run.
#[derive(Serialize)]
struct GenerateOutput {
    success: bool,
    output: Option<String>,
    key: Option<String>,
    seed: u32,
    total_beats: Option<f64>,
    tracks: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
}

/// Run the generate command.
///
/// # Returns
/// Exit code: 0 success, 1 composition error.
pub fn run(
    config_path: Option<&str>,
    output: &str,
    seed: Option<u32>,
    json_output: bool,
) -> Result<ExitCode> {
    let config = load_config(config_path, seed)?;
    if json_output {
        run_json(&config, output)
    } else {
        run_human(&config, output)
    }
}

fn track_names(composition: &chordforge_engine::Composition) -> Vec<String> {
    let mut tracks = vec!["chords".to_string()];
    if composition.bass.is_some() {
        tracks.push("bass".to_string());
    }
    if composition.arp.is_some() {
        tracks.push("arp".to_string());
    }
    if composition.melody.is_some() {
        tracks.push("melody".to_string());
    }
    tracks
}

/// Run generate with human-readable (colored) output.
fn run_human(config: &GenerationConfig, output: &str) -> Result<ExitCode> {
    println!(
        "{} {} ({} bars, seed {})",
        "Generating:".cyan().bold(),
        config.key_name(),
        config.num_bars,
        config.seed
    );

    let composition = match compose(config) {
        Ok(composition) => composition,
        Err(err) => {
            println!("{} {}", "FAILED".red().bold(), err);
            return Ok(ExitCode::from(1));
        }
    };

    for warning in &composition.warnings {
        println!("  {} {}", "!".yellow(), warning);
    }

    midi::write_midi(
        &composition,
        config.bpm,
        config.embed_tempo,
        Path::new(output),
    )?;

    println!(
        "{} wrote {} ({} beats, tracks: {})",
        "SUCCESS".green().bold(),
        output,
        composition.total_beats,
        track_names(&composition).join(", ")
    );
    Ok(ExitCode::SUCCESS)
}

/// Run generate with machine-readable JSON diagnostics.
fn run_json(config: &GenerationConfig, output: &str) -> Result<ExitCode> {
    let result = match compose(config) {
        Ok(composition) => {
            midi::write_midi(
                &composition,
                config.bpm,
                config.embed_tempo,
                Path::new(output),
            )?;
            GenerateOutput {
                success: true,
                output: Some(output.to_string()),
                key: Some(composition.key_name.clone()),
                seed: config.seed,
                total_beats: Some(composition.total_beats),
                tracks: track_names(&composition),
                warnings: composition.warnings.clone(),
                errors: Vec::new(),
            }
        }
        Err(err) => GenerateOutput {
            success: false,
            output: None,
            key: None,
            seed: config.seed,
            total_beats: None,
            tracks: Vec::new(),
            warnings: Vec::new(),
            errors: vec![err.to_string()],
        },
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("failed to serialize output")?
    );
    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
