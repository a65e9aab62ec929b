//! The user's watched list.
//!
//! [`WatchedCollection`] is the in-memory list with its mutators and the
//! derived summary; [`WatchedStore`] moves it in and out of the durable slot.

pub(crate) mod store;

pub use store::{WatchedStore, WatchedStoreError, WATCHED_SLOT};

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogDetail;

/// A title the user has rated and confirmed.
///
/// Field names match the stored JSON layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedItem {
    #[serde(rename = "imdbID")]
    pub id: String,
    pub title: String,
    pub year: String,
    #[serde(default)]
    pub poster: Option<String>,
    /// Always finite. A stored `null` reads back as 0.0.
    #[serde(rename = "imdbRating", default, deserialize_with = "rating_or_zero")]
    pub imdb_rating: f64,
    #[serde(rename = "userRating")]
    pub user_rating: u8,
    /// Minutes.
    #[serde(default)]
    pub runtime: u32,
    #[serde(rename = "countRatingDecisions", default)]
    pub rating_decisions: u32,
}

impl WatchedItem {
    /// Builds a watched record from a loaded detail and the user's rating.
    ///
    /// A rating of `"N/A"` (or anything non-numeric or non-finite, such as
    /// `"NaN"`) becomes `0.0`, and a runtime without a leading number becomes
    /// 0 minutes.
    pub fn from_detail(detail: &CatalogDetail, user_rating: u8, rating_decisions: u32) -> Self {
        Self {
            id: detail.id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster: detail.poster.clone(),
            imdb_rating: detail
                .imdb_rating
                .trim()
                .parse()
                .ok()
                .filter(|r: &f64| r.is_finite())
                .unwrap_or(0.0),
            user_rating,
            runtime: parse_runtime_minutes(&detail.runtime),
            rating_decisions,
        }
    }
}

// serde_json writes non-finite floats as `null`; one such record must not
// make the whole list unreadable.
fn rating_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|r| r.is_finite()).unwrap_or(0.0))
}

/// Parses the leading number of a runtime string: `"148 min"` → 148.
///
/// ```
/// use popcorn::watched::parse_runtime_minutes;
///
/// assert_eq!(parse_runtime_minutes("148 min"), 148);
/// assert_eq!(parse_runtime_minutes("N/A"), 0);
/// ```
pub fn parse_runtime_minutes(raw: &str) -> u32 {
    raw.split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .unwrap_or(0)
}

/// Aggregates shown above the watched list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WatchedSummary {
    pub count: usize,
    pub avg_imdb_rating: f64,
    pub avg_user_rating: f64,
    pub total_runtime: u32,
}

/// Ordered watched list.
///
/// `revision` increases on every effective mutation; the application compares
/// it with the last persisted revision to decide when to write.
#[derive(Debug, Clone, Default)]
pub struct WatchedCollection {
    items: Vec<WatchedItem>,
    revision: u64,
}

impl WatchedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<WatchedItem>) -> Self {
        Self { items, revision: 0 }
    }

    /// Appends `item`.
    ///
    /// No deduplication happens here; the detail view hides the add action
    /// for titles already in the list.
    pub fn add(&mut self, item: WatchedItem) {
        if self.contains(&item.id) {
            tracing::warn!(id = %item.id, "Adding a title that is already in the watched list");
        }
        tracing::debug!(id = %item.id, rating = item.user_rating, "Watched item added");
        self.items.push(item);
        self.revision += 1;
    }

    /// Removes every record with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.revision += 1;
            tracing::debug!(id = %id, "Watched item removed");
        }
        removed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&WatchedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WatchedItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[WatchedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Count, mean ratings and total runtime. Means of an empty list are 0.
    pub fn summary(&self) -> WatchedSummary {
        let count = self.items.len();
        if count == 0 {
            return WatchedSummary::default();
        }
        let n = count as f64;
        WatchedSummary {
            count,
            avg_imdb_rating: self.items.iter().map(|i| i.imdb_rating).sum::<f64>() / n,
            avg_user_rating: self.items.iter().map(|i| f64::from(i.user_rating)).sum::<f64>() / n,
            total_runtime: self.items.iter().map(|i| i.runtime).sum(),
        }
    }
}

impl<'a> IntoIterator for &'a WatchedCollection {
    type Item = &'a WatchedItem;
    type IntoIter = std::slice::Iter<'a, WatchedItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
pub(crate) fn sample_item(id: &str, user_rating: u8) -> WatchedItem {
    WatchedItem {
        id: id.to_string(),
        title: format!("Title {}", id),
        year: "2010".to_string(),
        poster: None,
        imdb_rating: 7.5,
        user_rating,
        runtime: 120,
        rating_decisions: 1,
    }
}
