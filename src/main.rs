use clap::Parser;
use serde_json::json;

use scrapefeed::cli::{Cli, Commands, RunOptions};
use scrapefeed::config::Config;
use scrapefeed::domain::{RunReport, RunStatus};
use scrapefeed::errors::{FeederError, FeederResult};
use scrapefeed::logging::init_logging;
use scrapefeed::services::{FeedGenerator, GenerateRequest, MergeOptions};
use scrapefeed::sources::{HttpFetcher, SourceRegistry};
use scrapefeed::storage::{FeedStore, FileFeedStore};

type Generator = FeedGenerator<HttpFetcher, FileFeedStore>;

fn main() {
    match run() {
        Ok(status) => std::process::exit(status.exit_code()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(RunStatus::Failed.exit_code());
        }
    }
}

fn run() -> FeederResult<RunStatus> {
    let cli = Cli::parse();
    init_logging();

    let mut config = Config::from_env()?;
    if let Some(dir) = cli.feeds_dir {
        config.feeds_dir = dir;
    }

    let registry = SourceRegistry::new()?;
    let store = FileFeedStore::new(&config.feeds_dir);

    match cli.command {
        Commands::List => cmd_list(&registry, &store),
        Commands::Run {
            feed,
            file,
            options,
        } => {
            let generator = build_generator(&config, registry, store, options)?;
            let request = GenerateRequest {
                local_file: file,
                allow_empty: options.allow_empty,
                ..GenerateRequest::new(&feed)
            };
            let result = generator.generate(&request);
            Ok(print_result(&feed, &result, options.json))
        }
        Commands::All { pages_dir, options } => {
            let generator = build_generator(&config, registry, store, options)?;
            let status = generator
                .generate_all(options.allow_empty, pages_dir.as_deref())
                .iter()
                .map(|(identity, result)| print_result(identity.as_str(), result, options.json))
                .max()
                .unwrap_or(RunStatus::Success);
            Ok(status)
        }
    }
}

fn build_generator(
    config: &Config,
    registry: SourceRegistry,
    store: FileFeedStore,
    options: RunOptions,
) -> FeederResult<Generator> {
    let fetcher = HttpFetcher::new(&config.user_agent, config.timeout)?;
    let merge = MergeOptions {
        retention: config.retention,
        prefer_latest: config.prefer_latest || options.prefer_latest,
    };

    Ok(FeedGenerator::new(registry, fetcher, store, merge))
}

fn cmd_list(registry: &SourceRegistry, store: &FileFeedStore) -> FeederResult<RunStatus> {
    println!("Registered feeds:\n");
    for source in registry.iter() {
        let definition = source.definition();
        println!("  {} ({})", definition.identity, definition.title);
        println!("    Source: {}", definition.url);
        println!("    Output: {}", store.path_for(source.identity()).display());
    }

    Ok(RunStatus::Success)
}

fn print_result(feed: &str, result: &FeederResult<RunReport>, as_json: bool) -> RunStatus {
    match result {
        Ok(report) => {
            let status = report.status();
            if as_json {
                match serde_json::to_string(report) {
                    Ok(line) => println!("{}", line),
                    Err(e) => eprintln!("{}: could not encode report: {}", feed, e),
                }
            } else {
                println!("{}", report.format());
                for skipped in &report.skipped {
                    println!(
                        "  skipped candidate {}: missing {} ({})",
                        skipped.position, skipped.field, skipped.context
                    );
                }
            }
            status
        }
        Err(e) => {
            let status = failure_status(e);
            if as_json {
                println!(
                    "{}",
                    json!({
                        "feed": feed,
                        "status": status.as_str(),
                        "kind": e.kind(),
                        "error": e.to_string(),
                    })
                );
            }
            eprintln!("{}: {}: {}", feed, e.kind(), e);
            status
        }
    }
}

fn failure_status(error: &FeederError) -> RunStatus {
    if error.is_warning() {
        RunStatus::NoArticles
    } else {
        RunStatus::Failed
    }
}
