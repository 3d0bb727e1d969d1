//! ChordForge CLI - Command-line interface for procedural MIDI generation
//!
//! This binary provides commands for generating chord progressions with
//! optional bass, arpeggio, and melody tracks, and writing them to Standard
//! MIDI Files.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;

mod commands;
mod midi;

/// ChordForge - Procedural Chord Progression and MIDI Generator
#[derive(Parser)]
#[command(name = "chordforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a composition and write it to a MIDI file
    Generate {
        /// Path to a generation config file (JSON); defaults when omitted
        #[arg(short, long)]
        config: Option<String>,

        /// Output MIDI file path
        #[arg(short, long, default_value = "output.mid")]
        output: String,

        /// Override the config seed
        #[arg(long)]
        seed: Option<u32>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Generate a composition and print it without writing a file
    Preview {
        /// Path to a generation config file (JSON); defaults when omitted
        #[arg(short, long)]
        config: Option<String>,

        /// Override the config seed
        #[arg(long)]
        seed: Option<u32>,

        /// Print the full composition as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            config,
            output,
            seed,
            json,
        } => commands::generate::run(config.as_deref(), &output, seed, json),
        Commands::Preview { config, seed, json } => {
            commands::preview::run(config.as_deref(), seed, json)
        }
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::from(2)
        }
    }
}
