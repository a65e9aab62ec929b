use serde::Deserialize;

/// Marker the catalog uses for missing values.
pub(crate) const NOT_AVAILABLE: &str = "N/A";

/// One row of a search result set.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSummary {
    pub id: String,
    pub title: String,
    pub year: String,
    /// `None` when the catalog has no poster for the title.
    pub poster: Option<String>,
}

/// Full record for a single title.
///
/// Runtime and rating are kept as the raw strings the catalog returns
/// (`"148 min"`, `"8.8"`); they are normalized only when a title is added to
/// the watched list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogDetail {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster: Option<String>,
    pub runtime: String,
    pub imdb_rating: String,
    pub plot: String,
    pub released: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
}

pub(crate) fn poster_from_wire(raw: Option<String>) -> Option<String> {
    raw.filter(|p| !p.is_empty() && p != NOT_AVAILABLE)
}

// ----------------------------------------------------------------------------
// Wire format
// ----------------------------------------------------------------------------

/// `?s=` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(rename = "Response")]
    pub response: Option<String>,
    #[serde(rename = "Search", default)]
    pub search: Vec<SearchItem>,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchItem {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
}

impl From<SearchItem> for CatalogSummary {
    fn from(item: SearchItem) -> Self {
        Self {
            id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster: poster_from_wire(item.poster),
        }
    }
}

/// `?i=` response body. Every field is optional because failure bodies only
/// carry `Response` and `Error`.
#[derive(Debug, Deserialize)]
pub(crate) struct DetailResponse {
    #[serde(rename = "Response")]
    pub response: Option<String>,
    #[serde(rename = "Error")]
    pub error: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
    #[serde(rename = "Runtime")]
    pub runtime: Option<String>,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "Plot")]
    pub plot: Option<String>,
    #[serde(rename = "Released")]
    pub released: Option<String>,
    #[serde(rename = "Actors")]
    pub actors: Option<String>,
    #[serde(rename = "Director")]
    pub director: Option<String>,
    #[serde(rename = "Genre")]
    pub genre: Option<String>,
}

impl DetailResponse {
    /// Converts a successful body, falling back to `requested_id` when the
    /// body omits `imdbID`.
    pub(crate) fn into_detail(self, requested_id: &str) -> CatalogDetail {
        CatalogDetail {
            id: self.imdb_id.unwrap_or_else(|| requested_id.to_string()),
            title: self.title.unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            poster: poster_from_wire(self.poster),
            runtime: self.runtime.unwrap_or_default(),
            imdb_rating: self.imdb_rating.unwrap_or_default(),
            plot: self.plot.unwrap_or_default(),
            released: self.released.unwrap_or_default(),
            actors: self.actors.unwrap_or_default(),
            director: self.director.unwrap_or_default(),
            genre: self.genre.unwrap_or_default(),
        }
    }
}
