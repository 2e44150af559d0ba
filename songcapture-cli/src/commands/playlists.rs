//! Playlists command - page through a service's playlists.
//!
//! Rows are displayed one at a time, the way a list view would show them
//! while the user scrolls. Each displayed row goes through the prefetch
//! trigger, so pages load exactly when a real list would load them.

use console::style;
use songcapture::playlist::{Playlist, Service};
use songcapture::repository::LoadOutcome;
use tracing::debug;

use super::common::{create_spinner, resolve_app_config, ServiceArg};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Consecutive failed loads before giving up.
const MAX_CONSECUTIVE_FAILURES: usize = 3;

/// Arguments for the playlists command.
pub struct PlaylistsArgs {
    pub service: ServiceArg,
    pub limit: Option<usize>,
    pub page_size: Option<usize>,
    pub threshold: Option<usize>,
    pub select: Vec<usize>,
}

/// Run the playlists command.
pub fn run(args: PlaylistsArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("playlists");

    let app_config = resolve_app_config(runner.config(), args.page_size, args.threshold)?;
    let app = runner.create_app(app_config)?;
    let service = Service::from(args.service);
    let trigger = app.prefetch_trigger(service);
    let repository = app.repository();
    let shutdown = runner.shutdown();

    println!(
        "{} playlists (page size {}, prefetch threshold {})",
        style(service.title()).bold(),
        app.config().repository.page_size,
        app.config().prefetch.threshold
    );
    println!();

    let spinner = create_spinner("Loading playlists...");
    let mut displayed = 0;
    let mut pages = 0;
    let mut failures = 0;

    let result: Result<(), CliError> = runner.block_on(async {
        loop {
            if shutdown.is_cancelled() {
                break;
            }
            if args.limit.is_some_and(|limit| displayed >= limit) {
                break;
            }

            let snapshot = repository.current_snapshot(service)?;
            if displayed >= snapshot.len() && !snapshot.can_load_more() {
                break;
            }

            let index = displayed.min(snapshot.len().saturating_sub(1));
            if let Some(handle) = trigger.on_row_displayed(index) {
                spinner.set_message(format!("Loading page {}...", pages + 1));
                let joined = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    joined = handle => joined,
                };
                match joined.map_err(|e| CliError::Runtime(e.to_string()))? {
                    Ok(LoadOutcome::Loaded { new_items, .. }) => {
                        pages += 1;
                        failures = 0;
                        debug!(page = pages, new_items, "Page loaded");
                    }
                    Ok(LoadOutcome::Skipped(reason)) => {
                        debug!(?reason, "Load skipped");
                    }
                    Err(e) => {
                        failures += 1;
                        spinner.println(format!(
                            "{} {} (attempt {}/{})",
                            style("!").yellow(),
                            e,
                            failures,
                            MAX_CONSECUTIVE_FAILURES
                        ));
                        if failures >= MAX_CONSECUTIVE_FAILURES {
                            return Err(e.into());
                        }
                    }
                }
                continue;
            }

            match snapshot.playlist_at(displayed) {
                Some(playlist) => {
                    spinner.println(format_row(displayed, playlist, args.select.contains(&displayed)));
                    displayed += 1;
                }
                // Nothing to show and no load was triggered.
                None => break,
            }
        }
        Ok(())
    });
    spinner.finish_and_clear();
    result?;

    let snapshot = repository.current_snapshot(service)?;
    println!();
    println!(
        "Displayed {} of {} loaded playlists in {} page(s){}",
        displayed,
        snapshot.len(),
        pages,
        if snapshot.can_load_more() {
            ", more available"
        } else {
            ""
        }
    );

    if !args.select.is_empty() {
        let selection = app.selection();
        for index in &args.select {
            match snapshot.playlist_at(*index) {
                Some(playlist) => selection.set_selected(&playlist.id, true),
                None => println!("{} no row {} to select", style("!").yellow(), index),
            }
        }
        let saved = app.save_selection(service)?;
        println!("Saved {} playlist(s) to the library", saved);
        for playlist in app.library().all_playlists() {
            println!("  {}", playlist.name);
        }
    }

    Ok(())
}

fn format_row(index: usize, playlist: &Playlist, selected: bool) -> String {
    let marker = if selected { "*" } else { " " };
    let artwork = if playlist.artwork.is_some() { "" } else { " (no artwork)" };
    format!(
        "{} {:>5}  {}{}",
        style(marker).green(),
        style(index).dim(),
        playlist.name,
        style(artwork).dim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use songcapture::playlist::PlaylistId;

    #[test]
    fn test_format_row_contains_name() {
        let playlist = Playlist::new(PlaylistId::new(Service::AppleMusic, "p.1"), "Road Trip");
        let row = format_row(3, &playlist, false);
        assert!(row.contains("Road Trip"));
        assert!(row.contains('3'));
        assert!(row.contains("no artwork"));
    }

    #[test]
    fn test_format_row_with_artwork() {
        let playlist = Playlist::new(PlaylistId::new(Service::AppleMusic, "p.1"), "Focus")
            .with_artwork("https://artwork.test/1.jpg");
        let row = format_row(0, &playlist, true);
        assert!(row.contains("Focus"));
        assert!(!row.contains("no artwork"));
    }
}
