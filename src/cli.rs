//! CLI interface for the CV parser

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cv-parser")]
#[command(about = "Turn CV text into structured candidate data")]
#[command(long_about = "Parse CVs into contact details, skills, work history and education using a staged pipeline with an optional embedding model for section detection")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse one or more CV files
    Parse {
        /// CV files (plain text; PDF and DOCX are recognized but not extracted)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to a file, or into a directory when several CVs are given
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Show skill provenance and responsibilities
        #[arg(short, long)]
        detailed: bool,

        /// Keyword-only section detection
        #[arg(long)]
        no_embeddings: bool,
    },

    /// Show how a CV is split into sections
    Sections {
        /// CV file
        file: PathBuf,

        /// Keyword-only section detection
        #[arg(long)]
        no_embeddings: bool,
    },

    /// Skill taxonomy inspection
    Skills {
        #[command(subcommand)]
        action: SkillsAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum SkillsAction {
    /// List canonical skills by category
    List {
        /// Only show this category
        #[arg(short = 'k', long)]
        category: Option<String>,
    },

    /// Show the canonical form of a skill term
    Normalize {
        /// Skill as it might appear in a CV
        term: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}
