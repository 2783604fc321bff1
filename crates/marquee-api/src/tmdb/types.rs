//! TMDB API response types and search parameters.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer};

/// Parses `YYYY-MM-DD`, treating null, empty, or malformed dates as absent.
fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
}

// --- Configuration ---

/// Response from the `configuration` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfiguration {
    /// Image CDN settings.
    #[serde(default)]
    pub images: ImagesConfiguration,
}

/// Image CDN settings within the API configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagesConfiguration {
    /// Plain HTTP image base URL.
    #[serde(default)]
    pub base_url: String,
    /// HTTPS image base URL.
    #[serde(default)]
    pub secure_base_url: String,
    /// Available poster widths (e.g. "w92", "w342", "original").
    #[serde(default)]
    pub poster_sizes: Vec<String>,
}

/// Index of the poster size used for list cards.
const LIST_POSTER_SIZE_INDEX: usize = 3;

impl ApiConfiguration {
    /// Builds the full image URL for a poster path at the given size.
    #[must_use]
    pub fn poster_url(&self, poster_path: &str, size: &str) -> String {
        format!(
            "{}/{}/{}",
            self.images.secure_base_url.trim_end_matches('/'),
            size,
            poster_path.trim_start_matches('/'),
        )
    }

    /// Returns the poster size used for list cards, falling back to the largest listed one.
    #[must_use]
    pub fn list_poster_size(&self) -> Option<&str> {
        self.images
            .poster_sizes
            .get(LIST_POSTER_SIZE_INDEX)
            .or_else(|| self.images.poster_sizes.last())
            .map(String::as_str)
    }
}

// --- Movie lists ---

/// Paginated movie list (`movie/now_playing`, `search/movie`, `movie/{id}/similar`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoviePage {
    /// Current page number.
    #[serde(default)]
    pub page: u32,
    /// Movies on this page.
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
}

impl MoviePage {
    /// Whether this is the final page of the query.
    ///
    /// An empty result set reports `total_pages == 0` and counts as the last page.
    #[must_use]
    pub const fn is_last_page(&self) -> bool {
        self.page >= self.total_pages
    }
}

/// A single movie entry in a list response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieSummary {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    #[serde(default)]
    pub title: String,
    /// Overview text.
    #[serde(default)]
    pub overview: String,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
    /// Release date.
    #[serde(default, deserialize_with = "deserialize_date")]
    pub release_date: Option<NaiveDate>,
}

impl MovieSummary {
    /// Release year, if the date is known.
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|d| d.year())
    }
}

// --- Genres ---

/// Response from `genre/movie/list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenreList {
    /// Available genres.
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// Genre entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Genre {
    /// Genre ID.
    pub id: u32,
    /// Genre name.
    pub name: String,
}

// --- Movie details ---

/// Response from `movie/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetails {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    #[serde(default)]
    pub title: String,
    /// Tagline.
    #[serde(default)]
    pub tagline: Option<String>,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Release status (e.g. "Released").
    #[serde(default)]
    pub status: Option<String>,
    /// Release date.
    #[serde(default, deserialize_with = "deserialize_date")]
    pub release_date: Option<NaiveDate>,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
    /// Official homepage.
    #[serde(default)]
    pub homepage: Option<String>,
}

// --- Reviews ---

/// Response from `movie/{id}/reviews`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPage {
    /// Current page number.
    #[serde(default)]
    pub page: u32,
    /// Reviews on this page.
    #[serde(default)]
    pub results: Vec<Review>,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
}

/// A single user review.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Review {
    /// Review author.
    #[serde(default)]
    pub author: String,
    /// Review body.
    #[serde(default)]
    pub content: String,
    /// Review page URL.
    #[serde(default)]
    pub url: Option<String>,
}

// --- Videos ---

/// Response from `movie/{id}/videos`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoList {
    /// Videos attached to the movie.
    #[serde(default)]
    pub results: Vec<Video>,
}

/// A video attached to a movie.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Video {
    /// Site-specific video key.
    #[serde(default)]
    pub key: String,
    /// Hosting site (e.g. "YouTube").
    #[serde(default)]
    pub site: String,
    /// Video type (e.g. "Trailer", "Teaser").
    #[serde(rename = "type", default)]
    pub video_type: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

// --- Error Response ---

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
    /// Success flag (always false for errors).
    #[serde(default)]
    pub success: bool,
}

// --- Search Parameters ---

/// Parameters for `search/movie` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMovieParams {
    /// Search query (required).
    pub query: String,
    /// Result page (1-500, default: 1).
    pub page: u32,
}

impl SearchMovieParams {
    /// Creates new search params with the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
        }
    }

    /// Sets the result page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn test_movie_summary_tolerates_missing_fields() {
        // Arrange
        let json = r#"{"id":42,"title":"Untitled","poster_path":null,"release_date":""}"#;

        // Act
        let movie: MovieSummary = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(movie.id, 42);
        assert!(movie.genre_ids.is_empty());
        assert!(movie.poster_path.is_none());
        assert!(movie.release_date.is_none());
        assert!(movie.release_year().is_none());
    }

    #[test]
    fn test_release_year() {
        // Arrange
        let json = r#"{"id":1,"title":"Dune","release_date":"2021-09-15"}"#;

        // Act
        let movie: MovieSummary = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(movie.release_year(), Some(2021));
    }

    #[test]
    fn test_is_last_page() {
        // Arrange
        let middle = MoviePage {
            page: 1,
            total_pages: 3,
            ..MoviePage::default()
        };
        let last = MoviePage {
            page: 3,
            total_pages: 3,
            ..MoviePage::default()
        };
        let empty = MoviePage {
            page: 1,
            total_pages: 0,
            ..MoviePage::default()
        };

        // Act & Assert
        assert!(!middle.is_last_page());
        assert!(last.is_last_page());
        assert!(empty.is_last_page());
    }

    #[test]
    fn test_poster_url_joins_without_double_slashes() {
        // Arrange
        let config = ApiConfiguration {
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
        };

        // Act
        let url = config.poster_url("/abc.jpg", "w342");

        // Assert
        assert_eq!(url, "https://image.tmdb.org/t/p/w342/abc.jpg");
        assert_eq!(config.list_poster_size(), Some("w342"));
    }

    #[test]
    fn test_list_poster_size_falls_back_to_last() {
        // Arrange
        let config = ApiConfiguration {
            images: ImagesConfiguration {
                poster_sizes: vec![String::from("w92"), String::from("original")],
                ..ImagesConfiguration::default()
            },
        };

        // Act & Assert
        assert_eq!(config.list_poster_size(), Some("original"));
        assert_eq!(ApiConfiguration::default().list_poster_size(), None);
    }

    #[test]
    fn test_video_type_field_is_renamed() {
        // Arrange
        let json = r#"{"key":"abc","site":"YouTube","type":"Trailer","size":1080}"#;

        // Act
        let video: Video = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(video.video_type, "Trailer");
        assert_eq!(video.site, "YouTube");
    }

    #[test]
    fn test_search_params_builder() {
        // Arrange & Act
        let params = SearchMovieParams::new("alien").page(3);

        // Assert
        assert_eq!(params.query, "alien");
        assert_eq!(params.page, 3);
    }
}
