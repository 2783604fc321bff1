//! Startup: load shared reference data, then hand over to the browser.

use std::sync::Arc;

use anyhow::{Context, Result};
use marquee_api::tmdb::{ApiConfiguration, MovieApi};
use tracing::{info, instrument, warn};

use crate::tui::genres::GenreIndex;
use crate::tui::list::ListSettings;

/// Reference data every list render needs.
#[derive(Debug, Clone, Default)]
pub struct Prerequisites {
    /// Genre id to name mapping.
    pub genres: GenreIndex,
    /// Image base URLs and poster sizes.
    pub config: ApiConfiguration,
}

/// Fetches genres and the API configuration concurrently.
///
/// # Errors
///
/// Returns an error if either request fails.
#[instrument(skip_all)]
pub async fn load_prerequisites<A: MovieApi + Sync>(api: &A) -> Result<Prerequisites> {
    let (genres, config) = futures::future::try_join(api.genres(), api.configuration())
        .await
        .context("failed to load genres and API configuration")?;

    let genres = GenreIndex::from(genres);
    if genres.is_empty() {
        warn!("genre list is empty, genres render as N/A");
    }
    info!(
        genres = genres.len(),
        poster_sizes = config.images.poster_sizes.len(),
        "prerequisites loaded"
    );
    Ok(Prerequisites { genres, config })
}

/// Loads prerequisites and runs the interactive browser until the user quits.
///
/// # Errors
///
/// Returns an error if prerequisites cannot be loaded (the browser does not
/// start) or the terminal fails.
#[instrument(skip_all)]
pub async fn run<A>(api: Arc<A>, settings: ListSettings) -> Result<()>
where
    A: MovieApi + Send + Sync + 'static,
{
    let prerequisites = load_prerequisites(api.as_ref()).await?;
    crate::tui::run_browser(api, prerequisites, settings).await
}
