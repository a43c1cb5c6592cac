//! Core data types for the rezka client
//!
//! Contains the catalog and stream records exchanged with the backend and
//! the typed outcome every fetch produces.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RezkaError;

/// A JSON value the backend sends either as a string or as a number
///
/// Years, ratings and translation ids show up in both shapes depending on
/// which scraper produced them; the original shape is kept on the way back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

/// A movie card from a catalog listing or search
///
/// Only `url` and `title` are guaranteed. Fields the client does not know
/// about are kept in `extra` and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Link to the movie page (absolute or backend-relative)
    pub url: String,

    /// Display title
    pub title: String,

    /// Poster image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,

    /// Release year (e.g. `1988` or `"1988"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Scalar>,

    /// Site rating (e.g. `"8.1"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Scalar>,

    /// Quality badge (e.g. `"HD"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fixed catalog listings served by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Popular,
    New,
    NowWatching,
}

impl Category {
    /// Endpoint path relative to the mirror origin
    pub fn path(self) -> &'static str {
        match self {
            Category::Popular => "/popular/",
            Category::New => "/new/",
            Category::NowWatching => "/watching/",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Popular => "popular",
            Category::New => "new",
            Category::NowWatching => "now watching",
        };
        f.write_str(name)
    }
}

/// Parameters for a stream metadata lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRequest {
    /// Movie page link as returned in [`MovieSummary::url`]
    pub url: String,
    /// Translation id; the backend picks the first one when absent
    #[serde(default)]
    pub translation: Option<String>,
    /// Resolution label such as `"720p"`
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub episode: Option<String>,
}

impl StreamRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = Some(translation.into());
        self
    }

    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    /// Select a series episode
    pub fn episode(mut self, season: impl Into<String>, episode: impl Into<String>) -> Self {
        self.season = Some(season.into());
        self.episode = Some(episode.into());
        self
    }
}

/// Stream metadata for one movie or episode
///
/// Carries the available audio translations, the resolutions on offer and
/// a direct video URL per resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Resolution label -> direct video URL
    #[serde(default)]
    pub stream: BTreeMap<String, String>,

    /// Translation display name -> translation id, in backend order
    #[serde(default)]
    pub translations: IndexMap<String, Scalar>,

    #[serde(default)]
    pub available_resolutions: Vec<String>,

    /// Display name of the selected translation
    #[serde(default)]
    pub current_translation: Option<Scalar>,

    pub current_resolution: String,

    /// Movie page link the descriptor belongs to
    pub url: String,

    #[serde(default)]
    pub is_series: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_season: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_episode: Option<Scalar>,
}

impl StreamDescriptor {
    /// Available resolutions, highest first
    ///
    /// Ordered by the leading integer of each label (`"1080p Ultra"` -> 1080).
    /// Labels without one keep their relative order at the end.
    pub fn sorted_resolutions(&self) -> Vec<String> {
        let mut resolutions = self.available_resolutions.clone();
        resolutions.sort_by(|a, b| leading_number(b).cmp(&leading_number(a)));
        resolutions
    }

    /// Direct URL for a resolution label
    pub fn stream_url(&self, resolution: &str) -> Option<&str> {
        self.stream.get(resolution).map(String::as_str)
    }

    /// Direct URL for the resolution the backend selected
    pub fn current_stream_url(&self) -> Option<&str> {
        self.stream_url(&self.current_resolution)
    }

    /// Translation id for a display name
    pub fn translation_id(&self, name: &str) -> Option<String> {
        self.translations.get(name).map(Scalar::to_string)
    }

    /// Translation id of the selected translation
    pub fn current_translation_id(&self) -> Option<String> {
        let name = self.current_translation.as_ref()?.to_string();
        self.translation_id(&name)
    }
}

fn leading_number(label: &str) -> Option<u32> {
    let digits: String = label
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Returns the message of a backend `{"error": "..."}` payload
///
/// Detail lookups pass such payloads through; callers use this to inspect them.
pub fn backend_error(value: &Value) -> Option<&str> {
    value.get("error").and_then(Value::as_str)
}

/// Outcome of a single backend fetch
///
/// The UI-facing session methods collapse `Failed` and `Empty` into an empty
/// or absent value; the `try_` variants return this so the difference stays
/// observable.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// The backend returned usable data
    Fetched(T),
    /// The request or decoding failed
    Failed(RezkaError),
    /// Nothing to return (no request made, or an empty listing)
    Empty,
}

impl<T> FetchOutcome<T> {
    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FetchOutcome::Empty)
    }

    /// The failure, if any
    pub fn error(&self) -> Option<&RezkaError> {
        match self {
            FetchOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Collapse into `Some` only for fetched data
    pub fn into_option(self) -> Option<T> {
        match self {
            FetchOutcome::Fetched(data) => Some(data),
            FetchOutcome::Failed(_) | FetchOutcome::Empty => None,
        }
    }
}

impl<T> FetchOutcome<Vec<T>> {
    /// Collapse into a list, empty unless fetched
    pub fn into_items(self) -> Vec<T> {
        self.into_option().unwrap_or_default()
    }
}
