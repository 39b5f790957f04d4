//! Trip planner - AI-assisted Japan travel itineraries
//!
//! CLI entry point for plan generation and knowledge base maintenance.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use knowledgestore::{KnowledgeStore, OpenAIEmbeddings, TextChunker};
use tripplanner::cli::{Cli, Command, OutputFormat, get_log_path};
use tripplanner::config::Config;
use tripplanner::domain::TripRequest;
use tripplanner::llm::create_client;
use tripplanner::research::{Encyclopedia, SerpApiClient, WebSearch, WikipediaClient};
use tripplanner::workflow::{PlannerEngine, PlanningResult};

/// Closing note appended to every rendered plan
const DISCLAIMER: &str = "免責事項: このプランはAIによって生成されたものです。実際の旅行計画を立てる際は、最新の情報や状況を確認することをお勧めします。特に予算や営業時間、交通状況などは変動する可能性があります。";

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    // Create log directory
    let log_dir = get_log_path()
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level_str = cli_log_level.or(config_log_level);
    let level = if let Some(s) = level_str {
        match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        }
    } else {
        tracing::Level::INFO
    };

    let log_file = fs::File::create(get_log_path()).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref())
        .context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!(model = %config.llm.model, "Trip planner loaded config");

    // Dispatch command
    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Plan {
            origin,
            destination,
            budget,
            duration,
            purposes,
            format,
        } => {
            debug!(%origin, %destination, "main: matched Plan command");
            let request = TripRequest {
                origin,
                destination,
                budget,
                duration,
                purpose: purposes.join(", "),
            };
            cmd_plan(&config, request, format).await
        }
        Command::Reindex { dir } => {
            debug!(?dir, "main: matched Reindex command");
            cmd_reindex(&config, dir).await
        }
        Command::Search {
            query,
            top_k,
            dir,
            format,
        } => {
            debug!(%query, top_k, "main: matched Search command");
            cmd_search(&config, &query, top_k, dir, format).await
        }
    }
}

/// Build the embedding client and knowledge store from config
///
/// Embeddings authenticate with the same key as chat completions.
fn build_knowledge_store(config: &Config) -> Result<Arc<KnowledgeStore>> {
    debug!(model = %config.knowledge.embedding_model, "build_knowledge_store: called");
    let api_key = std::env::var(&config.llm.api_key_env).map_err(|_| {
        eyre::eyre!(
            "LLM API key not found. Set the {} environment variable.",
            config.llm.api_key_env
        )
    })?;

    let embedder = OpenAIEmbeddings::new(
        api_key,
        &config.knowledge.embedding_model,
        &config.llm.base_url,
        config.knowledge.timeout(),
    )?;

    let chunker = TextChunker::new(config.knowledge.chunk_size, config.knowledge.chunk_overlap);
    Ok(Arc::new(KnowledgeStore::with_chunker(
        Arc::new(embedder),
        chunker,
    )))
}

/// Generate a travel plan end to end
async fn cmd_plan(config: &Config, request: TripRequest, format: OutputFormat) -> Result<()> {
    debug!(destination = %request.destination, ?format, "cmd_plan: called");
    config.validate()?;

    let llm = create_client(&config.llm).context("Failed to create LLM client")?;

    let encyclopedia: Arc<dyn Encyclopedia> = Arc::new(WikipediaClient::new(
        &config.research.wikipedia_lang,
        config.research.timeout(),
    )?);

    // Web search only runs when its key is present
    let web_search: Option<Arc<dyn WebSearch>> =
        match std::env::var(&config.research.serpapi_key_env) {
            Ok(key) if !key.trim().is_empty() => {
                debug!("cmd_plan: web search enabled");
                Some(Arc::new(SerpApiClient::new(
                    key,
                    &config.research.serpapi_base_url,
                    config.research.timeout(),
                )?))
            }
            _ => {
                info!(
                    var = %config.research.serpapi_key_env,
                    "Web search disabled, set the key variable to enable it"
                );
                None
            }
        };

    let store = build_knowledge_store(config)?;
    let stats = store
        .initialize(&config.knowledge.dir)
        .await
        .context("Failed to build the knowledge base index")?;
    debug!(
        documents = stats.document_count,
        chunks = stats.chunk_count,
        "cmd_plan: knowledge base ready"
    );

    let engine = PlannerEngine::new(llm, encyclopedia, web_search, store)
        .with_top_k(config.knowledge.top_k);

    if matches!(format, OutputFormat::Text) {
        println!("{}", "旅行プランを生成しています...".dimmed());
    }

    match engine.generate_plan(request).await {
        PlanningResult::Complete {
            travel_plan,
            additional_info,
        } => match format {
            OutputFormat::Json => {
                debug!("cmd_plan: format is Json");
                let json = serde_json::json!({
                    "travel_plans": travel_plan,
                    "additional_info": additional_info,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            OutputFormat::Text => {
                debug!("cmd_plan: format is Text");
                println!();
                println!("{} {}", "✓".green(), "旅行プランが生成されました！".green().bold());
                println!();
                println!("{}", "提案された旅行プラン".bold());
                println!();
                println!("{}", travel_plan);
                if !additional_info.is_empty() {
                    println!();
                    println!("{}", "追加情報".bold());
                    println!();
                    println!("{}", additional_info);
                }
                println!();
                println!("{}", DISCLAIMER.dimmed());
            }
        },
        PlanningResult::Failed { error } => {
            debug!(%error, "cmd_plan: planning failed");
            match format {
                OutputFormat::Json => {
                    let json = serde_json::json!({ "error": error });
                    println!("{}", serde_json::to_string_pretty(&json)?);
                }
                OutputFormat::Text => {
                    println!("{} {}", "✗".red(), error);
                }
            }
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Rebuild the knowledge base index and report statistics
async fn cmd_reindex(config: &Config, dir: Option<PathBuf>) -> Result<()> {
    debug!(?dir, "cmd_reindex: called");
    config.validate()?;

    let store = build_knowledge_store(config)?;
    let dir = dir.unwrap_or_else(|| config.knowledge.dir.clone());

    let stats = store
        .initialize(&dir)
        .await
        .context("Failed to build the knowledge base index")?;

    println!(
        "{} Indexed knowledge base: {}",
        "✓".green(),
        dir.display().to_string().cyan()
    );
    println!("  Documents: {}", stats.document_count);
    println!("  Chunks: {}", stats.chunk_count);

    Ok(())
}

/// Search the knowledge base and print the hits
async fn cmd_search(
    config: &Config,
    query: &str,
    top_k: usize,
    dir: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    debug!(%query, top_k, "cmd_search: called");
    config.validate()?;

    let store = build_knowledge_store(config)?;
    let dir = dir.unwrap_or_else(|| config.knowledge.dir.clone());
    store
        .initialize(&dir)
        .await
        .context("Failed to build the knowledge base index")?;

    let hits = store.query(query, top_k).await?;

    match format {
        OutputFormat::Json => {
            debug!("cmd_search: format is Json");
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        OutputFormat::Text => {
            debug!("cmd_search: format is Text");
            if hits.is_empty() {
                println!("No results found");
            } else {
                for hit in hits {
                    println!(
                        "{} {}",
                        hit.source.yellow(),
                        format!("{:.3}", hit.similarity_score).dimmed()
                    );
                    println!("{}", hit.content);
                    println!();
                }
            }
        }
    }

    Ok(())
}
