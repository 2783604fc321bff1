//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB API v3 endpoints
//! and retrieves movie listings, genres, and per-movie extras.

mod api;
mod client;
mod endpoint;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalMovieApi, MovieApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
pub use endpoint::{API_KEY_PARAM, DEFAULT_BASE_URL, EndpointBuilder};
#[allow(clippy::module_name_repetitions)]
pub use types::{
    ApiConfiguration, Genre, GenreList, ImagesConfiguration, MovieDetails, MoviePage,
    MovieSummary, Review, ReviewPage, SearchMovieParams, TmdbErrorResponse, Video, VideoList,
};
