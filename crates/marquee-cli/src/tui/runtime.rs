//! Executes controller commands as tokio tasks and routes results back.

use std::sync::Arc;

use anyhow::Result;
use crossterm::event::Event;
use marquee_api::tmdb::{MovieApi, MoviePage, SearchMovieParams};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument};

use super::detail::{MovieDetailBundle, fetch_bundle};
use super::list::{Command, PageRequest};

/// Everything the event loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    /// Terminal input.
    Input(Event),
    /// A list page request resolved.
    PageLoaded {
        request: PageRequest,
        result: Result<MoviePage>,
    },
    /// A detail panel load resolved.
    DetailsLoaded {
        movie_id: u64,
        ticket: u64,
        result: Result<MovieDetailBundle>,
    },
}

/// Fetches the page described by `request`: search when a keyword is set,
/// now-playing otherwise.
///
/// # Errors
///
/// Returns an error if the request fails.
#[instrument(skip_all, fields(page = request.page, search = !request.keyword.is_empty()))]
pub async fn fetch_page<A: MovieApi + Sync>(api: &A, request: &PageRequest) -> Result<MoviePage> {
    if request.keyword.is_empty() {
        api.now_playing(request.page).await
    } else {
        let params = SearchMovieParams::new(request.keyword.as_str()).page(request.page);
        api.search_movie(&params).await
    }
}

/// Spawns one task per command; each task reports back through `events`.
#[derive(Debug)]
pub struct CommandRunner<A> {
    api: Arc<A>,
    events: UnboundedSender<AppEvent>,
}

impl<A> CommandRunner<A>
where
    A: MovieApi + Send + Sync + 'static,
{
    pub const fn new(api: Arc<A>, events: UnboundedSender<AppEvent>) -> Self {
        Self { api, events }
    }

    /// Spawns every command.
    pub fn run_all(&self, commands: Vec<Command>) {
        for command in commands {
            self.run(command);
        }
    }

    /// Spawns a single command.
    pub fn run(&self, command: Command) {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        match command {
            Command::FetchPage(request) => {
                tokio::spawn(async move {
                    let result = fetch_page(api.as_ref(), &request).await;
                    if events.send(AppEvent::PageLoaded { request, result }).is_err() {
                        debug!("event loop closed, dropping page result");
                    }
                });
            }
            Command::LoadDetails { movie_id, ticket } => {
                tokio::spawn(async move {
                    let result = fetch_bundle(api.as_ref(), movie_id).await;
                    let event = AppEvent::DetailsLoaded {
                        movie_id,
                        ticket,
                        result,
                    };
                    if events.send(event).is_err() {
                        debug!(movie_id, "event loop closed, dropping detail result");
                    }
                });
            }
        }
    }
}
