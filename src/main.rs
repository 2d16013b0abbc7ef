use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use verse_search::config;
use verse_search::search::{SearchOptions, SearchQuery, StoreVerseProvider, VerseSearch};
use verse_search::store::{DocumentStore, HttpStore};

const USAGE: &str = "Usage: verse-search [--config PATH] [--doc-set ID] [--collection ID] \
[--whole-words] [--limit N] <phrase>...";

/// Command line arguments / 命令行参数
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config_path: Option<PathBuf>,
    doc_set: Option<String>,
    collection: Option<String>,
    whole_words: bool,
    limit: usize,
    phrase: String,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut words = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |name: &str| args.next().ok_or_else(|| anyhow!("{} needs a value", name));
        match arg.as_str() {
            "--config" => cli.config_path = Some(PathBuf::from(value("--config")?)),
            "--doc-set" => cli.doc_set = Some(value("--doc-set")?),
            "--collection" => cli.collection = Some(value("--collection")?),
            "--whole-words" => cli.whole_words = true,
            "--limit" => {
                cli.limit = value("--limit")?
                    .parse()
                    .context("--limit must be a number")?
            }
            "-h" | "--help" => bail!(USAGE),
            other if other.starts_with("--") => bail!("Unknown option {}\n{}", other, USAGE),
            _ => words.push(arg),
        }
    }

    cli.phrase = words.join(" ");
    Ok(cli)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verse_search=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = parse_args(std::env::args().skip(1))?;

    // Load configuration / 加载配置
    let config_path = cli.config_path.clone().unwrap_or_else(config::default_config_path);
    let app_config = config::load_config(&config_path).map_err(|e| anyhow!(e))?;
    let directives = app_config.directives().map_err(|e| anyhow!(e))?;

    let store: Arc<dyn DocumentStore> = Arc::new(HttpStore::new(&app_config.store)?);
    tracing::info!("Searching {:?} via {}", cli.phrase, app_config.store.endpoint);

    let whole_words = cli.whole_words || app_config.search.whole_words;
    let provider = StoreVerseProvider::new(
        store,
        VerseSearch {
            phrase: cli.phrase.clone(),
            whole_words,
            directives: directives.clone(),
            doc_set: cli.doc_set.unwrap_or(app_config.scripture.doc_set),
            collection: cli.collection.unwrap_or(app_config.scripture.collection),
        },
    );

    let mut query = SearchQuery::new(
        &cli.phrase,
        provider,
        SearchOptions {
            whole_words,
            directives,
        },
    )?
    .with_page_size(app_config.search.page_size);

    let results = query.get_results(cli.limit).await?;
    tracing::info!("Found {} matching verses", results.len());

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
