//! Artwork command - resolve artwork locators through the shared cache.
//!
//! Each locator is requested by several concurrent callers, the way several
//! visible rows ask for the same cover. The summary shows how many network
//! or disk fetches that actually cost.

use std::sync::Arc;

use console::style;
use songcapture::app::AppConfig;
use songcapture::artwork::{Artwork, ResolveError};
use songcapture::config::format_size;
use tokio::task::JoinSet;

use super::common::create_spinner;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the artwork command.
pub struct ArtworkArgs {
    pub locators: Vec<String>,
    pub callers: usize,
}

/// Run the artwork command.
pub fn run(args: ArtworkArgs, verbose: bool) -> Result<(), CliError> {
    if args.locators.is_empty() {
        return Err(CliError::Config("at least one locator is required".to_string()));
    }
    let callers = args.callers.max(1);

    let runner = CliRunner::new(verbose)?;
    runner.log_startup("artwork");

    let app = runner.create_app(AppConfig::from_config_file(runner.config()))?;
    let loader = app.artwork().clone();
    let shutdown = runner.shutdown();

    let spinner = create_spinner(&format!(
        "Resolving {} locator(s) with {} caller(s) each...",
        args.locators.len(),
        callers
    ));

    let results: Vec<(String, Result<Arc<Artwork>, ResolveError>)> = runner.block_on(async {
        let mut tasks = JoinSet::new();
        for (position, locator) in args.locators.iter().enumerate() {
            for _ in 0..callers {
                let loader = loader.clone();
                let shutdown = shutdown.clone();
                let locator = locator.clone();
                tasks.spawn(async move {
                    let result = loader.resolve_with_cancel(&locator, &shutdown).await;
                    (position, result)
                });
            }
        }

        // Keep the first result per locator; every caller sees the same outcome.
        let mut first: Vec<Option<Result<Arc<Artwork>, ResolveError>>> =
            vec![None; args.locators.len()];
        while let Some(joined) = tasks.join_next().await {
            let (position, result) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    spinner.println(format!("{} task failed: {}", style("!").yellow(), e));
                    continue;
                }
            };
            if first[position].is_none() {
                first[position] = Some(result);
            }
        }

        args.locators
            .iter()
            .cloned()
            .zip(first)
            .map(|(locator, result)| {
                let result = result
                    .unwrap_or_else(|| Err(ResolveError::TaskFailed("no caller finished".to_string())));
                (locator, result)
            })
            .collect()
    });
    spinner.finish_and_clear();

    let mut failed = 0;
    for (locator, result) in &results {
        match result {
            Ok(artwork) => println!(
                "{} {}  {}x{}  {}",
                style("✓").green(),
                locator,
                artwork.width(),
                artwork.height(),
                format_size(artwork.byte_len())
            ),
            Err(e) => {
                failed += 1;
                println!("{} {}  {}", style("✗").red(), locator, e);
            }
        }
    }

    let requests = args.locators.len() * callers;
    let fetches = loader.fetches_started() as usize;
    let stats = loader.stats();
    println!();
    println!("Requests: {}", requests);
    println!(
        "Fetches:  {} ({} coalesced)",
        fetches,
        requests.saturating_sub(fetches)
    );
    println!(
        "Cached:   {} image(s), {}",
        loader.cached_count(),
        format_size(stats.size_bytes as usize)
    );

    if failed > 0 {
        return Err(CliError::Artwork {
            failed,
            total: results.len(),
        });
    }
    Ok(())
}
