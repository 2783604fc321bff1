//! API client library for marquee.
//!
//! Provides the TMDB v3 client used by the movie browser.

/// TMDB API client.
pub mod tmdb;
