//! Genre id to name lookup.

use std::collections::HashMap;

use marquee_api::tmdb::GenreList;

/// Placeholder shown for genre ids missing from the index.
const UNKNOWN_GENRE: &str = "N/A";

/// Read-only mapping from genre id to genre name, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct GenreIndex {
    names: HashMap<u32, String>,
}

impl GenreIndex {
    /// Returns the name for `id`, if known.
    #[must_use]
    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Number of known genres.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the index holds no genres.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Renders genre ids as a comma-separated list of names, keeping input order.
    #[must_use]
    pub fn render(&self, ids: &[u32]) -> String {
        ids.iter()
            .map(|id| self.name(*id).unwrap_or(UNKNOWN_GENRE))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<GenreList> for GenreIndex {
    fn from(list: GenreList) -> Self {
        Self {
            names: list.genres.into_iter().map(|g| (g.id, g.name)).collect(),
        }
    }
}
