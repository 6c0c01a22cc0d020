// Wire model for the ArtWeave API (sets, paintings, comparisons).
//
// The deployed server wraps its list responses in an envelope and nests the
// comparison summary inside `overview`, while older deployments returned bare
// arrays. The payload types below accept both shapes and expose one flat view.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Sets
// ---------------------------------------------------------------------------

/// A named, fixed collection of paintings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSummary {
    pub set_id: String,
    pub label: String,
    pub count: u32,
}

/// Body of `GET /api/sets`: either a bare array or `{ "sets": [...] }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SetsPayload {
    Bare(Vec<SetSummary>),
    Wrapped { sets: Vec<SetSummary> },
}

impl Default for SetsPayload {
    fn default() -> Self {
        SetsPayload::Bare(Vec::new())
    }
}

impl SetsPayload {
    pub fn into_sets(self) -> Vec<SetSummary> {
        match self {
            SetsPayload::Bare(sets) | SetsPayload::Wrapped { sets } => sets,
        }
    }
}

// ---------------------------------------------------------------------------
// Paintings
// ---------------------------------------------------------------------------

/// A single artwork record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Painting {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Accessibility text. The compare endpoint omits it, so it may be empty;
    /// use [`Painting::alt_text`] for display.
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl Painting {
    /// Accessibility text, derived from title and artist when the server
    /// did not provide one.
    pub fn alt_text(&self) -> String {
        if !self.alt.trim().is_empty() {
            return self.alt.clone();
        }
        if self.artist.is_empty() || self.artist == "Unknown" {
            self.title.clone()
        } else {
            format!("{} by {}", self.title, self.artist)
        }
    }

    /// Year for display, or "unknown year".
    pub fn year_label(&self) -> &str {
        self.year.as_deref().unwrap_or("unknown year")
    }
}

/// Body of `GET /api/paintings`: either a bare array or
/// `{ "set_id": ..., "paintings": [...] }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PaintingsPayload {
    Bare(Vec<Painting>),
    Wrapped {
        #[serde(default)]
        set_id: Option<String>,
        paintings: Vec<Painting>,
    },
}

impl Default for PaintingsPayload {
    fn default() -> Self {
        PaintingsPayload::Bare(Vec::new())
    }
}

impl PaintingsPayload {
    pub fn into_paintings(self) -> Vec<Painting> {
        match self {
            PaintingsPayload::Bare(paintings) | PaintingsPayload::Wrapped { paintings, .. } => {
                paintings
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Body of `POST /api/compare`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompareRequest {
    pub painting_a_id: String,
    pub painting_b_id: String,
}

/// The two artworks being compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareOverview {
    #[serde(rename = "artworkA")]
    pub artwork_a: Painting,
    #[serde(rename = "artworkB")]
    pub artwork_b: Painting,
    /// Present when the server nests the summary here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawCompareResponse {
    #[serde(default)]
    overview: Option<CompareOverview>,
    #[serde(default)]
    summary: Option<String>,
}

/// A generated comparison of two paintings. Never cached.
///
/// `overview` is `None` only for a 204 response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCompareResponse")]
pub struct CompareResponse {
    pub overview: Option<CompareOverview>,
    pub summary: String,
}

impl From<RawCompareResponse> for CompareResponse {
    fn from(raw: RawCompareResponse) -> Self {
        let nested = raw.overview.as_ref().and_then(|o| o.summary.clone());
        let summary = raw.summary.or(nested).unwrap_or_default();
        CompareResponse {
            overview: raw.overview.map(|o| CompareOverview { summary: None, ..o }),
            summary,
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
