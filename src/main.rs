use std::time::Duration;

use clap::{Parser, ValueEnum};
use reqwest::Client;
use tracing::{info, warn};

use scholar::format::{format_history, format_outcome};
use scholar::{
    ArxivClient, ChatClient, Config, History, SearchError, SearchOutcome, SmartSearch, SortBy,
    Strategy,
};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// All strategies in turn, restructuring the topic if nothing is found
    Smart,
    Balanced,
    Broad,
    Precise,
}

impl Mode {
    fn strategy(self) -> Option<Strategy> {
        match self {
            Mode::Smart => None,
            Mode::Balanced => Some(Strategy::Balanced),
            Mode::Broad => Some(Strategy::Broad),
            Mode::Precise => Some(Strategy::Precise),
        }
    }
}

/// Search arXiv for research topics, letting an LLM write the queries.
///
/// The chat API is configured through SCHOLAR_API_KEY (or OPENAI_API_KEY),
/// SCHOLAR_MODEL and SCHOLAR_BASE_URL.
#[derive(Parser)]
#[command(name = "scholar", version, about)]
struct Cli {
    /// Research topics, searched one after another
    #[arg(required = true)]
    topics: Vec<String>,

    /// Search mode
    #[arg(long, value_enum, default_value_t = Mode::Smart)]
    mode: Mode,

    /// Do not rephrase topics that find nothing (smart mode only)
    #[arg(long)]
    no_restructure: bool,

    /// Papers requested per search, 1-100 [env: SCHOLAR_MAX_RESULTS]
    #[arg(long)]
    max_results: Option<usize>,

    /// relevance, lastUpdatedDate or submittedDate [env: SCHOLAR_SORT_BY]
    #[arg(long)]
    sort_by: Option<SortBy>,

    /// Chat model used to write queries [env: SCHOLAR_MODEL]
    #[arg(long)]
    model: Option<String>,

    /// OpenAI-compatible API root [env: SCHOLAR_BASE_URL]
    #[arg(long)]
    base_url: Option<String>,

    /// Give up on a topic after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Print outcomes as JSON instead of Markdown
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(n) = self.max_results {
            config = config.with_max_results(n);
        }
        if let Some(sort_by) = self.sort_by {
            config.sort_by = sort_by;
        }
        if let Some(model) = &self.model {
            config.model_name = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scholar=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.apply_to(Config::from_env()?);

    let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
    let llm = ChatClient::from_config(http.clone(), &config)
        .inspect_err(|e| tracing::error!("chat client not available: {e}"))?;
    let arxiv = ArxivClient::new(http);
    let search = SmartSearch::new(&llm, &arxiv, config.search_options());

    info!(model = %llm.model(), topics = cli.topics.len(), "starting scholar");

    let mut history = History::new();
    for topic in &cli.topics {
        let topic = topic.trim();
        if topic.is_empty() {
            warn!("skipping empty topic");
            continue;
        }

        let run = run_topic(&search, topic, &cli);
        let result = match cli.timeout {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), run)
                .await
                .unwrap_or_else(|_| {
                    warn!(%topic, secs, "search timed out");
                    Ok(None)
                }),
            None => run.await,
        };

        match result {
            Ok(Some(outcome)) => {
                history.record(topic, &outcome);
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                } else {
                    println!("{}", format_outcome(&outcome, topic));
                }
            }
            Ok(None) => eprintln!("Search for \"{topic}\" timed out."),
            Err(e) => {
                tracing::error!(%topic, error = %e, "search failed");
                eprintln!("Search for \"{topic}\" failed: {e}");
            }
        }
    }

    if history.len() > 1 && !cli.json {
        println!("{}", format_history(&history));
    }
    info!(searches = history.len(), "done");
    Ok(())
}

async fn run_topic(
    search: &SmartSearch<'_, ChatClient, ArxivClient>,
    topic: &str,
    cli: &Cli,
) -> Result<Option<SearchOutcome>, SearchError> {
    let outcome = match cli.mode.strategy() {
        None => search.smart_search(topic, !cli.no_restructure).await,
        Some(strategy) => search.single_strategy_search(topic, strategy).await?,
    };
    Ok(Some(outcome))
}
