use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;

use mediascope_core::{
    IncomingRecord, LibraryRecord, MatchConfig, check_unique_external_ids,
};
use mediascope_resolve::{
    ImportReport, MergeDecision, Resolution, Resolver, normalize_title, score_with_prefix,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "mediascope",
    about = "Match imported anime and manga records against your library",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting MEDIASCOPE_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Matching config file (defaults to ~/.config/mediascope/matching.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the comparison key of each title.
    Normalize {
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Compare two titles.
    Score { a: String, b: String },

    /// Resolve incoming records against a library snapshot.
    Resolve {
        /// JSON array of incoming records.
        #[arg(long)]
        incoming: PathBuf,
        /// JSON array of library records.
        #[arg(long)]
        corpus: PathBuf,
    },

    /// Matching config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

// ─── Config Actions ──────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum ConfigAction {
    /// Show effective config values.
    Show,
    /// Print the config file path.
    Path,
    /// Write the default config file.
    Init {
        #[arg(long)]
        force: bool,
    },
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let json_output = cli.json || std::env::var("MEDIASCOPE_JSON").as_deref() == Ok("1");
    let config_path = cli.config.clone().unwrap_or_else(MatchConfig::config_path);

    match cli.command {
        // ── Normalize ──────────────────────────────────────────────────────

        Commands::Normalize { text } => {
            let keys: Vec<(String, String)> = text
                .into_iter()
                .map(|t| {
                    let key = normalize_title(&t);
                    (t, key)
                })
                .collect();
            let dur = start.elapsed().as_millis();

            if json_output {
                let items: Vec<_> = keys
                    .iter()
                    .map(|(input, key)| serde_json::json!({ "input": input, "key": key }))
                    .collect();
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": items },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                for (_, key) in &keys {
                    println!("{key}");
                }
            }
        }

        // ── Score ──────────────────────────────────────────────────────────

        Commands::Score { a, b } => {
            let config = MatchConfig::load_from(&config_path)?;
            let key_a = normalize_title(&a);
            let key_b = normalize_title(&b);
            let score = score_with_prefix(&key_a, &key_b, config.strict_prefix_length);
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "a": key_a, "b": key_b, "score": score },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("{key_a}  vs  {key_b}");
                println!("  similarity:  {:.2}%", score.similarity);
                println!("  prefix:      {}", score.consecutive_count);
                println!("  strict:      {}", score.is_strict_match);
                let fuzzy = score.is_strict_match && score.similarity >= config.fuzzy_similarity_threshold;
                println!("  fuzzy match: {fuzzy}");
            }
        }

        // ── Resolve ────────────────────────────────────────────────────────

        Commands::Resolve { incoming, corpus } => {
            let config = MatchConfig::load_from(&config_path)?;
            let incoming: Vec<IncomingRecord> = read_json(&incoming)?;
            let corpus: Vec<LibraryRecord> = read_json(&corpus)?;
            check_unique_external_ids(&corpus)?;

            let resolutions = Resolver::with_config(config).resolve_batch(&incoming, &corpus);
            let report = ImportReport::from_resolutions(&resolutions);
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "resolutions": resolutions, "report": report },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                for resolution in &resolutions {
                    println!("{}", describe(resolution, &incoming[resolution.index]));
                }
                println!();
                println!("Import summary:");
                println!("  Total:            {}", report.total);
                println!("  Auto-merged:      {}", report.auto_merged);
                println!("  Review suggested: {}", report.review_suggested);
                println!("  Created:          {}", report.created);
                println!("  Id conflicts:     {}", report.near_misses.len());
            }
        }

        // ── Config ─────────────────────────────────────────────────────────

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = MatchConfig::load_from(&config_path)?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":config,"meta":{"duration_ms":dur}}))?;
                } else {
                    for (k, v) in config_key_values(&config) {
                        println!("{k} = {v}");
                    }
                }
            }
            ConfigAction::Path => {
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({
                        "status":"ok",
                        "data":{"path":config_path,"exists":config_path.exists()},
                        "meta":{"duration_ms":dur}
                    }))?;
                } else {
                    println!("{}", config_path.display());
                }
            }
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    anyhow::bail!(
                        "{} already exists (use --force to overwrite)",
                        config_path.display()
                    );
                }
                MatchConfig::default().save_to(&config_path)?;
                tracing::info!(path = %config_path.display(), "wrote default matching config");
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"path":config_path},"meta":{"duration_ms":dur}}))?;
                } else {
                    println!("Wrote {}", config_path.display());
                }
            }
        },
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn describe(resolution: &Resolution, record: &IncomingRecord) -> String {
    let title = record
        .titles
        .first()
        .map(|t| t.text.as_str())
        .unwrap_or("<untitled>");
    let outcome = match &resolution.decision {
        MergeDecision::AutoMerge { record_id } => format!("merge   → {record_id}"),
        MergeDecision::ReviewSuggested {
            record_id,
            similarity,
            matched_title,
        } => format!("review  ? {record_id}  {matched_title} ({similarity:.2}%)"),
        MergeDecision::CreateNew { near_miss: None } => "create".to_string(),
        MergeDecision::CreateNew {
            near_miss: Some(miss),
        } => format!(
            "create  ! {} shares the title but has id {} (incoming {})",
            miss.record_id, miss.existing_external_id, miss.incoming_external_id
        ),
    };
    format!("#{:<4} {title:<40}  {outcome}", resolution.index)
}

fn config_key_values(config: &MatchConfig) -> BTreeMap<&'static str, String> {
    let mut map = BTreeMap::new();
    map.insert("fuzzy_similarity_threshold", config.fuzzy_similarity_threshold.to_string());
    map.insert("strict_prefix_length", config.strict_prefix_length.to_string());
    map.insert("auto_merge_max_priority", config.auto_merge_max_priority.to_string());
    map.insert("alternate_separators", format!("{:?}", config.alternate_separators));
    map.insert("category_prefilter", config.category_prefilter.to_string());
    map
}
