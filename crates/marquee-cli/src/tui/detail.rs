//! Expanded movie panel: trailer link, similar titles and reviews.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use marquee_api::tmdb::{MovieApi, MovieSummary, Review, Video};
use tracing::{debug, instrument};

use super::timer::Deadline;

/// Delay between the panel content landing and the "shown" marker.
pub const REVEAL_DELAY: Duration = Duration::from_millis(250);

/// Number of reviews rendered in the panel.
const MAX_REVIEWS: usize = 2;

/// Placeholder shown while the panel data is in flight.
pub const LOADING_TEXT: &str = "Loading...";

/// Extra data fetched when a movie is expanded. Never cached across opens.
#[derive(Debug, Clone, Default)]
pub struct MovieDetailBundle {
    /// User reviews.
    pub reviews: Vec<Review>,
    /// Attached videos.
    pub videos: Vec<Video>,
    /// Similar titles.
    pub similar_movies: Vec<MovieSummary>,
}

/// Fetches reviews, videos and similar movies concurrently.
///
/// # Errors
///
/// Returns the first failure among the three requests.
#[instrument(skip_all, fields(movie_id = movie_id))]
pub async fn fetch_bundle<A: MovieApi + Sync>(api: &A, movie_id: u64) -> Result<MovieDetailBundle> {
    let (reviews, videos, similar) = futures::future::try_join3(
        api.movie_reviews(movie_id),
        api.movie_videos(movie_id),
        api.similar_movies(movie_id),
    )
    .await
    .with_context(|| format!("failed to load details for movie {movie_id}"))?;

    debug!(
        reviews = reviews.results.len(),
        videos = videos.results.len(),
        similar = similar.results.len(),
        "details loaded"
    );

    Ok(MovieDetailBundle {
        reviews: reviews.results,
        videos: videos.results,
        similar_movies: similar.results,
    })
}

/// Embeddable YouTube trailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerEmbed {
    /// YouTube video key.
    pub key: String,
    /// Autoplaying embed URL.
    pub url: String,
}

/// One rendered review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    /// `by {author}:` line.
    pub byline: String,
    /// Review body.
    pub content: String,
}

/// Rendered reviews section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewsSection {
    /// Section heading.
    pub heading: &'static str,
    /// At most two reviews.
    pub items: Vec<ReviewItem>,
}

/// Rendered similar movies section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarSection {
    /// Section heading.
    pub heading: &'static str,
    /// Comma-joined titles ending with a period.
    pub text: String,
}

/// The first `Trailer` video hosted on YouTube.
#[must_use]
pub fn render_trailer(videos: &[Video]) -> Option<TrailerEmbed> {
    let trailer = videos
        .iter()
        .find(|v| v.video_type == "Trailer" && v.site == "YouTube")?;
    Some(TrailerEmbed {
        key: trailer.key.clone(),
        url: format!("https://www.youtube.com/embed/{}?autoplay=1", trailer.key),
    })
}

/// Reviews heading and the first two reviews; nothing when there are none.
#[must_use]
pub fn render_reviews(reviews: &[Review]) -> Option<ReviewsSection> {
    if reviews.is_empty() {
        return None;
    }
    Some(ReviewsSection {
        heading: "Reviews",
        items: reviews
            .iter()
            .take(MAX_REVIEWS)
            .map(|r| ReviewItem {
                byline: format!("by {}:", r.author),
                content: r.content.clone(),
            })
            .collect(),
    })
}

/// Similar movies heading and titles; nothing when there are none.
#[must_use]
pub fn render_similar(movies: &[MovieSummary]) -> Option<SimilarSection> {
    if movies.is_empty() {
        return None;
    }
    let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
    Some(SimilarSection {
        heading: "Similar Movies",
        text: format!("{}.", titles.join(", ")),
    })
}

/// Sub-views of a loaded panel, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailSections {
    pub trailer: Option<TrailerEmbed>,
    pub similar: Option<SimilarSection>,
    pub reviews: Option<ReviewsSection>,
}

impl From<&MovieDetailBundle> for DetailSections {
    fn from(bundle: &MovieDetailBundle) -> Self {
        Self {
            trailer: render_trailer(&bundle.videos),
            similar: render_similar(&bundle.similar_movies),
            reviews: render_reviews(&bundle.reviews),
        }
    }
}

/// Panel lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Loading,
    Ready(DetailSections),
    Failed(String),
}

/// Detail panel for the active movie.
#[derive(Debug)]
pub struct DetailPanel {
    movie_id: u64,
    ticket: u64,
    state: DetailState,
    shown: bool,
    reveal: Deadline<()>,
}

impl DetailPanel {
    /// Creates a panel in the loading state. `ticket` identifies this load.
    #[must_use]
    pub fn new(movie_id: u64, ticket: u64) -> Self {
        Self {
            movie_id,
            ticket,
            state: DetailState::Loading,
            shown: false,
            reveal: Deadline::default(),
        }
    }

    #[must_use]
    pub const fn movie_id(&self) -> u64 {
        self.movie_id
    }

    #[must_use]
    pub const fn ticket(&self) -> u64 {
        self.ticket
    }

    #[must_use]
    pub const fn state(&self) -> &DetailState {
        &self.state
    }

    /// Whether the reveal delay has elapsed after rendering.
    #[must_use]
    pub const fn is_shown(&self) -> bool {
        self.shown
    }

    /// Applies a load result. Returns `false` if `ticket` belongs to an older load.
    pub fn on_loaded(&mut self, ticket: u64, result: Result<MovieDetailBundle>, now: Instant) -> bool {
        if ticket != self.ticket {
            debug!(movie_id = self.movie_id, ticket, "discarding stale detail result");
            return false;
        }
        match result {
            Ok(bundle) => {
                self.state = DetailState::Ready(DetailSections::from(&bundle));
                self.reveal.schedule(now + REVEAL_DELAY, ());
            }
            Err(err) => {
                self.state = DetailState::Failed(format!("{err:#}"));
            }
        }
        true
    }

    /// Applies the "shown" marker once the reveal delay has passed.
    pub fn on_tick(&mut self, now: Instant) {
        if self.reveal.fire(now).is_some() {
            self.shown = true;
        }
    }

    /// Restarts loading under a new ticket after a failure.
    /// Returns `false` if the panel has not failed.
    pub fn restart(&mut self, ticket: u64) -> bool {
        if !matches!(self.state, DetailState::Failed(_)) {
            return false;
        }
        self.ticket = ticket;
        self.state = DetailState::Loading;
        self.shown = false;
        self.reveal.cancel();
        true
    }

    /// Trailer embed URL of a loaded panel.
    #[must_use]
    pub fn trailer_url(&self) -> Option<&str> {
        match &self.state {
            DetailState::Ready(sections) => sections.trailer.as_ref().map(|t| t.url.as_str()),
            _ => None,
        }
    }
}
