//! codeintel CLI.
//!
//! Stateless per invocation: query commands index the target tree
//! in-process first, then run the query against the fresh snapshot.
//! `--json` switches any command's output to machine-readable JSON.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use codeintel::config::{SETTINGS_DIR, SETTINGS_FILE, Settings};
use codeintel::parsing::Language;
use codeintel::{IndexService, logging};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "codeintel")]
#[command(about = "Codebase intelligence: symbol index, dependency graph, structural queries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .codeintel/settings.toml with the default configuration
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },

    /// Index a source tree and report statistics
    Index {
        /// Root directory to index
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Comma-separated extensions to index (overrides config)
        #[arg(long, value_delimiter = ',')]
        extensions: Option<Vec<String>>,

        /// Comma-separated directory names to skip (overrides config)
        #[arg(long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,
    },

    /// Search indexed symbols by free-text relevance
    Search {
        query: String,

        /// Root directory to index and search
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Restrict results to files under this relative path
        #[arg(long)]
        scope: Option<PathBuf>,

        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Find code blocks similar to a snippet
    Similar {
        /// The code snippet to match (omit when using --file)
        snippet: Option<String>,

        /// Read the snippet from a file instead
        #[arg(long, conflicts_with = "snippet")]
        file: Option<PathBuf>,

        /// Root directory to index and search
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Restrict candidates to one language (python, javascript, typescript)
        #[arg(long)]
        lang: Option<Language>,

        /// Minimum Jaccard similarity in [0.0, 1.0]
        #[arg(long)]
        threshold: Option<f32>,
    },

    /// Show what a symbol depends on and what depends on it
    Deps {
        name: String,

        /// Disambiguate by defining file (relative to the root)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Root directory to index
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },

    /// Show everything transitively affected by changing a symbol
    Impact {
        name: String,

        /// Disambiguate by defining file (relative to the root)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Root directory to index
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },

    /// List definitions nothing in the index references
    DeadCode {
        /// Root directory to index
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Restrict findings to files under this relative path
        #[arg(long)]
        scope: Option<PathBuf>,
    },

    /// Jump to the definition(s) of a symbol
    Goto {
        name: String,

        /// Root directory to index
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },

    /// List every definition that calls a symbol
    Refs {
        name: String,

        /// Disambiguate by defining file (relative to the root)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Root directory to index
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load configuration")?;
    logging::init_with_config(&settings.logging);
    let settings = Arc::new(settings);

    match cli.command {
        Commands::Init { force } => init_settings(force),
        Commands::Config => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(settings.as_ref())?);
            } else {
                print!("{}", toml::to_string_pretty(settings.as_ref())?);
            }
            Ok(())
        }
        Commands::Index {
            path,
            extensions,
            exclude,
        } => {
            let service = IndexService::new(settings);
            let stats =
                service.index_codebase(&path, extensions.as_deref(), exclude.as_deref())?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!(
                    "Indexed {} files ({} extracted, {} reused, {} removed)",
                    stats.total_files,
                    stats.indexed_files,
                    stats.reused_files,
                    stats.removed_files
                );
                println!("{} symbols in {}ms", stats.total_symbols, stats.elapsed_ms);
            }
            Ok(())
        }
        Commands::Search {
            query,
            path,
            scope,
            limit,
        } => {
            let service = build_index(settings, &path)?;
            let response = service.semantic_search(&query, scope.as_deref(), limit)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response.results)?);
            } else if response.results.is_empty() {
                println!("No matches for '{query}'");
            } else {
                for hit in &response.results {
                    println!(
                        "{}:{} [{:.2}] {}",
                        hit.file_path.display(),
                        hit.line_number,
                        hit.relevance_score,
                        hit.matched_text
                    );
                }
            }
            Ok(())
        }
        Commands::Similar {
            snippet,
            file,
            path,
            lang,
            threshold,
        } => {
            let snippet = match (snippet, file) {
                (Some(s), _) => s,
                (None, Some(f)) => fs::read_to_string(&f)
                    .with_context(|| format!("failed to read snippet file {}", f.display()))?,
                (None, None) => bail!("provide a snippet or --file"),
            };
            let service = build_index(settings, &path)?;
            let blocks = service.find_similar_patterns(&snippet, lang, threshold)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&blocks)?);
            } else if blocks.is_empty() {
                println!("No similar blocks found");
            } else {
                for block in &blocks {
                    println!(
                        "{}:{} [{:.2}]",
                        block.file_path.display(),
                        block.start_line,
                        block.similarity
                    );
                }
            }
            Ok(())
        }
        Commands::Deps { name, file, path } => {
            let service = build_index(settings, &path)?;
            let report = service.analyze_dependencies(&name, file.as_deref())?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.symbol);
                println!("  depends on ({}):", report.dependency_count);
                for dep in &report.depends_on {
                    println!("    {dep}");
                }
                println!("  depended on by ({}):", report.dependent_count);
                for owner in &report.depended_by {
                    println!("    {owner}");
                }
                if report.has_external_references {
                    println!("  (some calls did not resolve inside the index)");
                }
            }
            Ok(())
        }
        Commands::Impact { name, file, path } => {
            let service = build_index(settings, &path)?;
            let report = service.impact_analysis(&name, file.as_deref())?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Changing {} affects {} symbol(s) in {} file(s)",
                    report.symbol,
                    report.impact_score,
                    report.affected_files.len()
                );
                for symbol in &report.affected_symbols {
                    println!("  {symbol}");
                }
            }
            Ok(())
        }
        Commands::DeadCode { path, scope } => {
            let service = build_index(settings, &path)?;
            let findings = service.detect_dead_code(scope.as_deref())?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&findings)?);
            } else if findings.is_empty() {
                println!("No unreferenced definitions found");
            } else {
                for finding in &findings {
                    println!(
                        "{}:{} {} ({})",
                        finding.file_path.display(),
                        finding.line_number,
                        finding.name,
                        finding.reason
                    );
                }
            }
            Ok(())
        }
        Commands::Goto { name, path } => {
            let service = build_index(settings, &path)?;
            let locations = service.find_definition(&name)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&locations)?);
            } else if locations.is_empty() {
                println!("No definition of '{name}' found");
            } else {
                for location in &locations {
                    println!(
                        "{}:{} {}",
                        location.file_path.display(),
                        location.line_number,
                        location.definition_text
                    );
                }
            }
            Ok(())
        }
        Commands::Refs { name, file, path } => {
            let service = build_index(settings, &path)?;
            let references = service.find_references(&name, file.as_deref())?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&references)?);
            } else if references.is_empty() {
                println!("No references to '{name}' found");
            } else {
                for reference in &references {
                    println!(
                        "{}:{} {}",
                        reference.file_path.display(),
                        reference.line_number,
                        reference.symbol
                    );
                }
            }
            Ok(())
        }
    }
}

/// Index the tree so query commands run against a fresh snapshot.
fn build_index(settings: Arc<Settings>, path: &std::path::Path) -> Result<IndexService> {
    let service = IndexService::new(settings);
    let stats = service
        .index_codebase(path, None, None)
        .with_context(|| format!("failed to index {}", path.display()))?;
    tracing::debug!(
        "pre-query index: {} files, {} symbols",
        stats.total_files,
        stats.total_symbols
    );
    Ok(service)
}

fn init_settings(force: bool) -> Result<()> {
    let dir = PathBuf::from(SETTINGS_DIR);
    let target = dir.join(SETTINGS_FILE);
    if target.exists() && !force {
        bail!(
            "{} already exists; use --force to overwrite",
            target.display()
        );
    }
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    fs::write(&target, Settings::default_toml())
        .with_context(|| format!("failed to write {}", target.display()))?;
    println!("Wrote {}", target.display());
    Ok(())
}
