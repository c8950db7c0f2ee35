use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use dcx::analysis::error::as_notice;
use dcx::analysis::network::ThresholdRange;
use dcx::config::{ClassifierBackend, Config};
use dcx::dataset::models::Review;
use dcx::dataset::{browse, loader, regions, ReviewTable};
use dcx::db::{self, queries};
use dcx::output::{export, terminal};
use dcx::pipeline::store as pipeline;
use dcx::sentiment::{self, SentimentClassifier, SentimentResult};
use dcx::session::{AnalysisKind, CachedResult, Session};
use dcx::topics::lda::GibbsLdaTrainer;

/// Relevance weight for topic term lists (1.0 = plain probability).
const TOPIC_LAMBDA: f64 = 0.6;
const TOPIC_TERMS: usize = 10;

/// dcx: review analytics for local stores.
///
/// Word frequencies, co-occurrence networks, topics and sentiment for one
/// store's customer reviews, compared against the rest of its region.
#[derive(Parser)]
#[command(name = "dcx", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Which dataset to read.
#[derive(Args, Clone)]
struct Source {
    /// Region name (see `dcx regions`)
    #[arg(long, short)]
    region: String,

    /// Read this CSV instead of the region's cached dataset
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the known regions and whether their datasets are cached
    Regions,

    /// List a region's stores, most reviewed first
    Stores {
        #[command(flatten)]
        source: Source,

        /// How many stores to show
        #[arg(long, default_value = "30")]
        limit: usize,
    },

    /// Show a store's reviews and photo links, newest first
    Reviews {
        #[command(flatten)]
        source: Source,
        store: String,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Word frequencies for the review text and each keyword column
    Words {
        #[command(flatten)]
        source: Source,
        store: String,

        /// Words shown per column
        #[arg(long, default_value = "20")]
        top: usize,

        /// Write word cloud and treemap data to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Co-occurrence network of frequent words
    Network {
        #[command(flatten)]
        source: Source,
        store: String,

        /// Minimum word frequency (default: middle of the allowed range)
        #[arg(long)]
        threshold: Option<usize>,

        /// Nodes and pairs listed
        #[arg(long, default_value = "15")]
        top: usize,

        /// Write the graph and node positions to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// LDA topics over a sample of the store's reviews
    Topics {
        #[command(flatten)]
        source: Source,
        store: String,

        /// Write the topic explorer data to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Sentiment per keyword column, compared with the region
    Sentiment {
        #[command(flatten)]
        source: Source,
        store: String,

        /// Re-run the classifier even if a stored result exists
        #[arg(long)]
        refresh: bool,

        /// Write the result and comparison to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Show a region's sentiment baseline from stored results
    Baseline {
        #[arg(long, short)]
        region: String,

        /// Delete the region's stored results instead
        #[arg(long)]
        clear: bool,
    },

    /// Interactive session: pick a store, lock it, and switch between views
    Explore {
        #[command(flatten)]
        source: Source,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dcx=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Regions => {
            terminal::display_regions(&regions::default_regions(), &config.data_dir);
            println!("\n  Data directory: {}", config.data_dir.display());
        }

        Commands::Stores { source, limit } => {
            let table = load_table(&config, &source).await?;
            terminal::display_stores(table.region(), &table.stores_by_review_count(), limit);
        }

        Commands::Reviews {
            source,
            store,
            limit,
        } => {
            let table = load_table(&config, &source).await?;
            require_store(&table, &store)?;
            terminal::display_reviews(&store, &browse::store_reviews(&table, &store), limit);
        }

        Commands::Words {
            source,
            store,
            top,
            json,
        } => {
            let table = load_table(&config, &source).await?;
            let reviews = require_store(&table, &store)?;
            let columns = pipeline::store_words(&reviews, &config.token_filter());

            terminal::display_word_tables(&store, &columns, top);

            if let Some(path) = json {
                let data = export::words_export(&store, &columns, &config.analysis_settings());
                export::write_json(&path, &data)?;
                println!("\nWrote {}", path.display());
            }
        }

        Commands::Network {
            source,
            store,
            threshold,
            top,
            json,
        } => {
            let table = load_table(&config, &source).await?;
            let reviews = require_store(&table, &store)?;
            let result = pipeline::store_network(
                &reviews,
                threshold,
                &config.token_filter(),
                &config.analysis_settings(),
            );

            if let Some(view) = notice_or(result.map_err(anyhow::Error::from))? {
                terminal::display_network(&store, &view.graph, &view.range, top);

                if let Some(path) = json {
                    let data = export::NetworkExport {
                        store: &store,
                        threshold_range: view.range,
                        graph: &view.graph,
                        positions: &view.positions,
                    };
                    export::write_json(&path, &data)?;
                    println!("\nWrote {}", path.display());
                }
            }
        }

        Commands::Topics {
            source,
            store,
            json,
        } => {
            let table = load_table(&config, &source).await?;
            let reviews = require_store(&table, &store)?;
            let settings = config.analysis_settings();
            let trainer = GibbsLdaTrainer::new(settings.topic_passes, settings.seed);

            println!("Training {} topics...", settings.topic_count);
            let result =
                pipeline::store_topics(&reviews, &config.token_filter(), &settings, &trainer);

            if let Some(view) = notice_or(result)? {
                terminal::display_topics(
                    &store,
                    view.corpus.documents.len(),
                    &view.model.summaries(TOPIC_LAMBDA, TOPIC_TERMS),
                );

                if let Some(path) = json {
                    let data = export::topics_export(
                        &store,
                        &view.corpus,
                        &view.model,
                        TOPIC_LAMBDA,
                        TOPIC_TERMS,
                    );
                    export::write_json(&path, &data)?;
                    println!("\nWrote {}", path.display());
                }
            }
        }

        Commands::Sentiment {
            source,
            store,
            refresh,
            json,
        } => {
            let table = load_table(&config, &source).await?;
            let reviews = require_store(&table, &store)?;
            let conn = db::initialize(&config.db_path)?;

            let stored = if refresh {
                None
            } else {
                queries::get_sentiment(&conn, table.region(), &store)?
            };

            let result = match stored {
                Some(stored) => {
                    println!(
                        "{}",
                        format!(
                            "Using stored result from {} (--refresh to re-run)",
                            stored.analyzed_at
                        )
                        .dimmed()
                    );
                    Some(stored.result)
                }
                None => {
                    config.require_classifier()?;
                    let classifier = create_classifier(&config)?;
                    let outcome = run_sentiment(classifier.as_ref(), &store, &reviews).await;
                    let result = notice_or(outcome)?;
                    if let Some(result) = &result {
                        queries::upsert_sentiment(
                            &conn,
                            table.region(),
                            result,
                            config.classifier_backend.as_str(),
                        )?;
                    }
                    result
                }
            };

            if let Some(result) = result {
                let comparison = pipeline::region_comparison(&conn, table.region(), &result)?;
                terminal::display_sentiment(&result, comparison.as_ref());

                if let Some(path) = json {
                    match &comparison {
                        Some(comparison) => export::write_json(&path, comparison)?,
                        None => export::write_json(&path, &result)?,
                    }
                    println!("\nWrote {}", path.display());
                }
            }
        }

        Commands::Baseline { region, clear } => {
            let conn = db::initialize(&config.db_path)?;

            if clear {
                let removed = queries::clear_region_sentiment(&conn, &region)?;
                println!("Removed {removed} stored results for {region}.");
                return Ok(());
            }

            match pipeline::region_baseline(&conn, &region)? {
                Some(baseline) => {
                    terminal::display_baseline(&baseline);
                    let stored = queries::list_region_sentiment(&conn, &region)?;
                    println!();
                    for s in &stored {
                        println!(
                            "  {:<40} {:>6.1}  {}",
                            s.result.store,
                            s.result.total,
                            format!("({}, {})", s.classifier.as_deref().unwrap_or("?"), s.analyzed_at)
                                .dimmed()
                        );
                    }
                }
                None => {
                    println!("No stored sentiment results for {region}.");
                    println!("Run `dcx sentiment --region \"{region}\" <store>` first.");
                }
            }
        }

        Commands::Explore { source } => {
            let table = load_table(&config, &source).await?;
            explore(&config, &table).await?;
        }
    }

    Ok(())
}

/// Load the dataset for a region, from an explicit CSV or the region registry.
async fn load_table(config: &Config, source: &Source) -> Result<ReviewTable> {
    let table = match &source.csv {
        Some(path) => loader::load_csv(path, &source.region)?,
        None => {
            let known = regions::default_regions();
            let region = regions::find_region(&known, &source.region)?;
            regions::load_region(region, &config.data_dir).await?
        }
    };
    info!(region = table.region(), reviews = table.len(), "Loaded dataset");
    Ok(table)
}

/// A store's reviews, or an error naming how to find valid store names.
fn require_store<'a>(table: &'a ReviewTable, store: &str) -> Result<Vec<&'a Review>> {
    let reviews = table.for_store(store);
    if reviews.is_empty() {
        anyhow::bail!(
            "Store '{}' not found in {}. Run `dcx stores --region \"{}\"` to list stores.",
            store,
            table.region(),
            table.region()
        );
    }
    Ok(reviews)
}

/// Print analysis notices and carry on; pass every other error up.
fn notice_or<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) => match as_notice(&err) {
            Some(notice) => {
                terminal::display_notice(notice);
                Ok(None)
            }
            None => Err(err),
        },
    }
}

/// Create the sentiment classifier for the configured backend.
fn create_classifier(config: &Config) -> Result<Box<dyn SentimentClassifier>> {
    match config.classifier_backend {
        ClassifierBackend::Onnx => {
            info!("Using local ONNX sentiment classifier");
            let classifier = sentiment::onnx::OnnxSentimentClassifier::load(&config.model_dir)?;
            Ok(Box::new(classifier))
        }
        ClassifierBackend::Api => {
            info!(model = %config.api_model, "Using hosted inference API classifier");
            let classifier = sentiment::api::ApiSentimentClassifier::new(
                config.api_model.clone(),
                config.api_token.clone(),
            );
            Ok(Box::new(classifier))
        }
    }
}

/// Run a sentiment pass with a progress bar.
async fn run_sentiment(
    classifier: &dyn SentimentClassifier,
    store: &str,
    reviews: &[&Review],
) -> Result<SentimentResult> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Sentiment [{bar:30}] {pos}/{len} ({eta})")
            .context("Invalid progress bar template")?,
    );

    let result = sentiment::analyze_sentiment(store, reviews, classifier, |progress| {
        pb.set_length(progress.total as u64);
        pb.set_position(progress.completed as u64);
    })
    .await;

    pb.finish_and_clear();
    result
}

const EXPLORE_HELP: &str = "\
  stores              list stores, most reviewed first
  store <name>        select a store
  lock                lock the selection (enables tabs)
  tab <view>          words | network | topics | sentiment | reviews
  run [threshold]     run the current tab (network takes a minimum frequency)
  status              show the current selection
  reset               start over
  quit";

/// Interactive loop over one region's dataset.
async fn explore(config: &Config, table: &ReviewTable) -> Result<()> {
    let mut session = Session::new();
    session.select_region(table.region())?;
    let mut classifier: Option<Box<dyn SentimentClassifier>> = None;

    println!("{}", format!("Exploring {}", table.region()).bold());
    println!("{EXPLORE_HELP}");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\ndcx> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let (command, arg) = match line.trim().split_once(' ') {
            Some((c, a)) => (c, a.trim()),
            None => (line.trim(), ""),
        };

        let outcome = match command {
            "" => Ok(()),
            "quit" | "exit" => break,
            "help" => {
                println!("{EXPLORE_HELP}");
                Ok(())
            }
            "stores" => {
                terminal::display_stores(table.region(), &table.stores_by_review_count(), 30);
                Ok(())
            }
            "store" => require_store(table, arg).and_then(|_| session.select_store(arg)),
            "lock" => session.lock(),
            "tab" => match AnalysisKind::parse(arg) {
                Some(kind) => session.select_tab(kind),
                None => Err(anyhow::anyhow!("Unknown tab '{arg}'")),
            },
            "run" => run_tab(config, table, &mut session, &mut classifier, arg).await,
            "status" => {
                println!(
                    "  region: {}  store: {}  locked: {}  tab: {}  cached: {}",
                    session.region().unwrap_or("-"),
                    session.store().unwrap_or("-"),
                    session.is_locked(),
                    session.tab().map(|t| t.as_str()).unwrap_or("-"),
                    session.cache().len()
                );
                Ok(())
            }
            "reset" => {
                session.reset();
                session.select_region(table.region())
            }
            other => Err(anyhow::anyhow!("Unknown command '{other}' (try `help`)")),
        };

        if let Err(err) = outcome {
            println!("  {} {}", "Error:".red(), err);
        }
    }

    Ok(())
}

/// Run the session's current tab, reusing a cached result when there is one.
async fn run_tab(
    config: &Config,
    table: &ReviewTable,
    session: &mut Session,
    classifier: &mut Option<Box<dyn SentimentClassifier>>,
    arg: &str,
) -> Result<()> {
    let key = session
        .current_key()
        .context("Lock a store and pick a tab first")?;
    let reviews = require_store(table, &key.store)?;
    let filter = config.token_filter();
    let settings = config.analysis_settings();

    let threshold = if arg.is_empty() {
        None
    } else {
        Some(arg.parse::<usize>().context("Threshold must be a whole number")?)
    };

    let range = ThresholdRange::for_reviews(reviews.len());
    let wanted = pipeline::resolve_threshold(&range, threshold);

    if let Some(cached) = session.cache().get(&key) {
        if cached.matches_threshold(wanted) {
            println!("{}", "(cached)".dimmed());
            if let CachedResult::Sentiment(result) = cached {
                let conn = db::initialize(&config.db_path)?;
                let comparison = pipeline::region_comparison(&conn, table.region(), result)?;
                terminal::display_sentiment(result, comparison.as_ref());
            } else {
                display_cached(&key.store, reviews.len(), cached);
            }
            return Ok(());
        }
    }

    let computed = match key.kind {
        AnalysisKind::Reviews => {
            terminal::display_reviews(&key.store, &browse::store_reviews(table, &key.store), 20);
            None
        }
        AnalysisKind::Words => Some(CachedResult::Words(pipeline::store_words(&reviews, &filter))),
        AnalysisKind::Network => {
            let result = pipeline::store_network(&reviews, Some(wanted), &filter, &settings);
            notice_or(result.map_err(anyhow::Error::from))?
                .map(|view| CachedResult::Network(Box::new(view.graph)))
        }
        AnalysisKind::Topics => {
            let trainer = GibbsLdaTrainer::new(settings.topic_passes, settings.seed);
            notice_or(pipeline::store_topics(&reviews, &filter, &settings, &trainer))?
                .map(|view| CachedResult::Topics(Box::new(view.model)))
        }
        AnalysisKind::Sentiment => {
            if classifier.is_none() {
                config.require_classifier()?;
                *classifier = Some(create_classifier(config)?);
            }
            let Some(active) = classifier.as_deref() else {
                anyhow::bail!("No sentiment classifier available");
            };

            let outcome = run_sentiment(active, &key.store, &reviews).await;
            if let Some(result) = notice_or(outcome)? {
                let conn = db::initialize(&config.db_path)?;
                let comparison = pipeline::record_and_compare(
                    &conn,
                    table.region(),
                    &result,
                    config.classifier_backend.as_str(),
                )?;
                terminal::display_sentiment(&result, comparison.as_ref());
                session
                    .cache_mut()
                    .insert(key.clone(), CachedResult::Sentiment(result));
            }
            None
        }
    };

    if let Some(result) = computed {
        display_cached(&key.store, reviews.len(), &result);
        session.cache_mut().insert(key, result);
    }
    Ok(())
}

fn display_cached(store_name: &str, review_count: usize, cached: &CachedResult) {
    match cached {
        CachedResult::Words(columns) => terminal::display_word_tables(store_name, columns, 20),
        CachedResult::Network(graph) => terminal::display_network(
            store_name,
            graph,
            &ThresholdRange::for_reviews(review_count),
            15,
        ),
        CachedResult::Topics(model) => terminal::display_topics(
            store_name,
            model.document_topics.len(),
            &model.summaries(TOPIC_LAMBDA, TOPIC_TERMS),
        ),
        CachedResult::Sentiment(result) => terminal::display_sentiment(result, None),
    }
}
