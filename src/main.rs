//! cv-parser: structured data from CV text

use clap::Parser;
use colored::Colorize;
use cv_parser::cli::{self, Cli, Commands, ConfigAction, SkillsAction};
use cv_parser::config::Config;
use cv_parser::error::{CvParserError, Result};
use cv_parser::input::InputManager;
use cv_parser::output::formatter::{save_report_to_file, suggest_filename};
use cv_parser::output::{ParseReport, ReportGenerator};
use cv_parser::parser::{CvParsingPipeline, SkillTaxonomy};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Parse {
            files,
            output,
            save,
            detailed,
            no_embeddings,
        } => {
            let format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(CvParserError::InvalidInput)?,
                None => config.output.format,
            };
            if no_embeddings {
                config.embeddings.enabled = false;
            }

            let parser = CvParsingPipeline::from_config(&config)?;
            let generator = ReportGenerator::with_options(
                config.output.color_output && save.is_none(),
                detailed || config.output.detailed,
                true,
                true,
            );
            info!("Parsing {} file(s) with {}", files.len(), parser.pipeline());

            let progress = (files.len() > 1).then(|| {
                let pb = ProgressBar::new(files.len() as u64);
                pb.set_style(
                    ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                pb
            });

            let mut input = InputManager::new();
            let mut rendered: Vec<(&PathBuf, String)> = Vec::with_capacity(files.len());
            for file in &files {
                if let Some(pb) = &progress {
                    pb.set_message(file.display().to_string());
                }

                let started = Instant::now();
                let cv = parser.parse_file_with(&mut input, file).await;
                let report = ParseReport::new(
                    cv,
                    Some(file.display().to_string()),
                    started.elapsed().as_millis() as u64,
                );
                rendered.push((file, generator.generate_report(&report, &format)?));

                if let Some(pb) = &progress {
                    pb.inc(1);
                }
            }
            if let Some(pb) = progress {
                pb.finish_and_clear();
            }

            for (file, content) in rendered {
                match &save {
                    Some(dir) if files.len() > 1 => {
                        let path = dir.join(suggest_filename(&format, &file.to_string_lossy(), false));
                        save_report_to_file(&content, &path)?;
                        println!("💾 Saved {}", path.display());
                    }
                    Some(path) => {
                        save_report_to_file(&content, path)?;
                        println!("💾 Saved {}", path.display());
                    }
                    None => println!("{}", content),
                }
            }
        }

        Commands::Sections { file, no_embeddings } => {
            if no_embeddings {
                config.embeddings.enabled = false;
            }
            let parser = CvParsingPipeline::from_config(&config)?;
            let text = InputManager::new().read_text(&file).await?;
            let context = parser.execute(&text)?;

            println!("{}", format!("📑 Sections in {}", file.display()).bold());
            for (kind, body) in context.sections.iter() {
                println!(
                    "\n{} {} {}",
                    "▓".green().bold(),
                    kind.as_str().to_uppercase().green().bold(),
                    format!("({} lines)", body.lines().count()).bright_black()
                );
                println!("{}", body);
            }

            println!("\n{}", "Stage metadata".bold());
            for (stage, values) in &context.metadata {
                for (key, value) in values {
                    println!("  {}.{} = {}", stage, key, value);
                }
            }

            if !context.warnings.is_empty() {
                println!("\n{}", "Warnings".yellow().bold());
                for warning in &context.warnings {
                    println!("  ⚠️  {}", warning);
                }
            }
        }

        Commands::Skills { action } => {
            let taxonomy = SkillTaxonomy::from_config(&config.taxonomy)?;
            match action {
                SkillsAction::List { category } => {
                    let mut shown = 0;
                    for (name, skills) in taxonomy.categories() {
                        if category.as_deref().is_some_and(|wanted| !wanted.eq_ignore_ascii_case(name)) {
                            continue;
                        }
                        println!("{} {}", "▓".green().bold(), name.green().bold());
                        println!("  {}", skills.join(", "));
                        shown += 1;
                    }
                    if shown == 0 {
                        if let Some(category) = category {
                            println!("No category named '{}'", category);
                        }
                    }
                    println!("\n{} canonical skills in the taxonomy", taxonomy.len());
                }

                SkillsAction::Normalize { term } => match taxonomy.canonical(&term) {
                    Some(canonical) => {
                        println!("{} → {}", term, canonical.cyan().bold());
                        if let Some(category) = taxonomy.category_of(canonical) {
                            println!("Category: {}", category);
                        }
                    }
                    None => match taxonomy.match_candidate(&term) {
                        Some(canonical) => println!("{} ≈ {} (partial match)", term, canonical.cyan().bold()),
                        None => println!("'{}' is not in the taxonomy; normalizes to '{}'", term, taxonomy.normalize(&term)),
                    },
                },
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                println!("File: {}", config_path.display());
                match &config.taxonomy.path {
                    Some(path) => println!("Taxonomy: {}", path.display()),
                    None => println!("Taxonomy: built-in"),
                }
                println!(
                    "Embeddings: {} ({})",
                    if config.embeddings.enabled { "enabled" } else { "disabled" },
                    config.embeddings.model
                );
                println!("\nSegmentation:");
                println!("  Header max length: {}", config.segmentation.header_max_len);
                println!("  Similarity threshold: {:.2}", config.segmentation.similarity_threshold);
                println!("\nHeuristics:");
                println!("  Job title keywords: {}", config.heuristics.job_title_keywords.len());
                println!("  Company suffixes: {}", config.heuristics.company_suffixes.len());
                println!("\nOutput: {:?} (detailed: {}, color: {})",
                    config.output.format, config.output.detailed, config.output.color_output);
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save_to(config_path)?;
                println!("✅ Configuration reset successfully!");
            }
        },
    }

    Ok(())
}
