//! In-memory `MovieApi` for unit tests.

use std::sync::Mutex;

use anyhow::{Result, bail};
use marquee_api::tmdb::{
    ApiConfiguration, Genre, GenreList, ImagesConfiguration, MovieApi, MovieDetails, MoviePage,
    MovieSummary, Review, ReviewPage, SearchMovieParams, Video, VideoList,
};

/// Fake API returning canned data and recording every call.
#[derive(Debug, Default)]
pub struct FakeApi {
    /// Operation name that fails (e.g. `"movie_videos"`).
    pub fail: Option<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn failing(operation: &'static str) -> Self {
        Self {
            fail: Some(operation),
            ..Self::default()
        }
    }

    /// Calls recorded so far, e.g. `["now_playing:1", "search_movie:dune:2"]`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, operation: &'static str, call: String) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        if self.fail == Some(operation) {
            bail!("{operation} unavailable");
        }
        Ok(())
    }
}

pub fn movie(id: u64, title: &str) -> MovieSummary {
    MovieSummary {
        id,
        title: String::from(title),
        overview: String::new(),
        genre_ids: vec![1],
        poster_path: None,
        vote_average: 0.0,
        release_date: None,
    }
}

impl MovieApi for FakeApi {
    async fn configuration(&self) -> Result<ApiConfiguration> {
        self.record("configuration", String::from("configuration"))?;
        Ok(ApiConfiguration {
            images: ImagesConfiguration {
                base_url: String::from("http://image.tmdb.org/t/p/"),
                secure_base_url: String::from("https://image.tmdb.org/t/p/"),
                poster_sizes: vec![
                    String::from("w92"),
                    String::from("w154"),
                    String::from("w185"),
                    String::from("w342"),
                ],
            },
        })
    }

    async fn now_playing(&self, page: u32) -> Result<MoviePage> {
        self.record("now_playing", format!("now_playing:{page}"))?;
        Ok(MoviePage {
            page,
            results: vec![movie(u64::from(page) * 10, "Now Playing")],
            total_pages: 3,
            total_results: 3,
        })
    }

    async fn search_movie(&self, params: &SearchMovieParams) -> Result<MoviePage> {
        self.record(
            "search_movie",
            format!("search_movie:{}:{}", params.query, params.page),
        )?;
        Ok(MoviePage {
            page: params.page,
            results: vec![movie(438_631, &params.query)],
            total_pages: 1,
            total_results: 1,
        })
    }

    async fn genres(&self) -> Result<GenreList> {
        self.record("genres", String::from("genres"))?;
        Ok(GenreList {
            genres: vec![
                Genre {
                    id: 1,
                    name: String::from("genre 1"),
                },
                Genre {
                    id: 2,
                    name: String::from("genre 2"),
                },
            ],
        })
    }

    async fn movie_details(&self, movie_id: u64) -> Result<MovieDetails> {
        self.record("movie_details", format!("movie_details:{movie_id}"))?;
        bail!("movie details are not served by the fake")
    }

    async fn movie_reviews(&self, movie_id: u64) -> Result<ReviewPage> {
        self.record("movie_reviews", format!("movie_reviews:{movie_id}"))?;
        Ok(ReviewPage {
            page: 1,
            results: vec![Review {
                author: String::from("critic"),
                content: String::from("Worth it."),
                url: None,
            }],
            total_results: 1,
        })
    }

    async fn movie_videos(&self, movie_id: u64) -> Result<VideoList> {
        self.record("movie_videos", format!("movie_videos:{movie_id}"))?;
        Ok(VideoList {
            results: vec![Video {
                key: String::from("k"),
                site: String::from("YouTube"),
                video_type: String::from("Trailer"),
                name: String::from("Official Trailer"),
            }],
        })
    }

    async fn similar_movies(&self, movie_id: u64) -> Result<MoviePage> {
        self.record("similar_movies", format!("similar_movies:{movie_id}"))?;
        Ok(MoviePage {
            page: 1,
            results: vec![movie(2, "Other")],
            total_pages: 1,
            total_results: 1,
        })
    }
}
