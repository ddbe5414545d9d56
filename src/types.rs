//! Core data types
//!
//! This module defines the records that flow through the dimension engine:
//! watch events in, trait vectors out, plus the user documents and output
//! payloads built around them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Neutral component value used when a subject has no usable signal
pub const NEUTRAL_COMPONENT: f64 = 0.33;

/// One of the three trait dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Cognition,
    Empathy,
    Pleasure,
}

impl Dimension {
    /// All dimensions in tie-break priority order
    pub const ALL: [Dimension; 3] = [Dimension::Cognition, Dimension::Empathy, Dimension::Pleasure];

    /// English label
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Cognition => "cognition",
            Dimension::Empathy => "empathy",
            Dimension::Pleasure => "pleasure",
        }
    }

    /// Display label used by the front end (求知 / 共情 / 愉悦)
    pub fn label_zh(&self) -> &'static str {
        match self {
            Dimension::Cognition => "求知",
            Dimension::Empathy => "共情",
            Dimension::Pleasure => "愉悦",
        }
    }

    /// Archetype name for a subject dominated by this dimension
    pub fn archetype(&self) -> &'static str {
        match self {
            Dimension::Cognition => "Seeker",
            Dimension::Empathy => "Empath",
            Dimension::Pleasure => "Hedonist",
        }
    }
}

/// A single observed watch interaction
///
/// Reads the data-source field names (`watchPercent`, `isNightWatch`, ...)
/// and also accepts `watchFraction`/`isNightTime` and the snake_case names it
/// writes, so output records can be read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct WatchEvent {
    /// Content category label
    pub category: String,
    /// Fraction of the content viewed, clamped to [0, 1]
    #[serde(
        rename(deserialize = "watchPercent"),
        alias = "watchFraction",
        alias = "watch_fraction",
        default,
        deserialize_with = "deserialize_fraction"
    )]
    pub watch_fraction: f64,
    /// Whether the subject liked the content
    #[serde(default)]
    pub liked: bool,
    /// Whether the subject commented on the content
    #[serde(default)]
    pub commented: bool,
    /// Whether the event happened in the late-night window
    #[serde(
        rename(deserialize = "isNightWatch"),
        alias = "isNightTime",
        alias = "is_night_time",
        default
    )]
    pub is_night_time: bool,
    #[serde(alias = "video_id", default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    /// Content duration in seconds
    #[serde(
        rename(deserialize = "duration"),
        alias = "duration_sec",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_sec: Option<u32>,
    #[serde(alias = "watched_at", default, skip_serializing_if = "Option::is_none")]
    pub watched_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl WatchEvent {
    /// Create an event with no engagement flags set
    pub fn new(category: impl Into<String>, watch_fraction: f64) -> Self {
        Self {
            category: category.into(),
            watch_fraction: clamp_fraction(watch_fraction),
            liked: false,
            commented: false,
            is_night_time: false,
            video_id: None,
            duration_sec: None,
            watched_at: None,
            comment: None,
        }
    }

    pub fn liked(mut self, liked: bool) -> Self {
        self.liked = liked;
        self
    }

    pub fn commented(mut self, commented: bool) -> Self {
        self.commented = commented;
        self
    }

    pub fn at_night(mut self, is_night_time: bool) -> Self {
        self.is_night_time = is_night_time;
        self
    }

    pub fn watched_at(mut self, at: DateTime<Utc>) -> Self {
        self.watched_at = Some(at);
        self
    }
}

/// Clamp a fraction or trait component into [0, 1]; NaN maps to 0
pub fn clamp_fraction(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn deserialize_fraction<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_fraction(raw))
}

/// Derived cognition / empathy / pleasure profile for one subject
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitVector {
    pub cognition: f64,
    pub empathy: f64,
    pub pleasure: f64,
}

impl Default for TraitVector {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl TraitVector {
    /// Equal split returned for empty or fully unrecognized input
    pub const NEUTRAL: TraitVector = TraitVector {
        cognition: NEUTRAL_COMPONENT,
        empathy: NEUTRAL_COMPONENT,
        pleasure: NEUTRAL_COMPONENT,
    };

    pub const ZERO: TraitVector = TraitVector {
        cognition: 0.0,
        empathy: 0.0,
        pleasure: 0.0,
    };

    pub const fn new(cognition: f64, empathy: f64, pleasure: f64) -> Self {
        Self {
            cognition,
            empathy,
            pleasure,
        }
    }

    /// Component value for a dimension
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Cognition => self.cognition,
            Dimension::Empathy => self.empathy,
            Dimension::Pleasure => self.pleasure,
        }
    }

    pub fn dot(&self, other: &TraitVector) -> f64 {
        self.cognition * other.cognition + self.empathy * other.empathy + self.pleasure * other.pleasure
    }

    /// Euclidean norm
    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Each component clamped into [0, 1]; NaN maps to 0
    pub fn clamped(&self) -> Self {
        Self {
            cognition: clamp_fraction(self.cognition),
            empathy: clamp_fraction(self.empathy),
            pleasure: clamp_fraction(self.pleasure),
        }
    }
}

/// Display color derived from a trait vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Edge-case markers attached to mocked users
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct UserMeta {
    #[serde(alias = "is_new_user", default)]
    pub is_new_user: bool,
    #[serde(alias = "is_silent_user", default)]
    pub is_silent_user: bool,
    #[serde(alias = "is_active_user", default)]
    pub is_active_user: bool,
    #[serde(alias = "is_single_pref", default)]
    pub is_single_pref: bool,
    #[serde(alias = "is_night_owl", default)]
    pub is_night_owl: bool,
}

/// A user as stored in the data-source document (`users.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    pub id: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_type: Option<String>,
    /// Watch events, oldest first
    #[serde(default)]
    pub watch_history: Vec<WatchEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "_meta", alias = "meta", default)]
    pub meta: UserMeta,
}

/// A user with derived dimensions, ready for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedUser {
    pub id: String,
    pub nickname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona_type: Option<String>,
    pub dimensions: TraitVector,
    pub dominant: Dimension,
    /// Descriptive persona title
    pub persona: String,
    /// Short paragraph describing the viewing profile
    pub summary: String,
    pub color: Rgb,
    pub watch_history: Vec<WatchEvent>,
    pub meta: UserMeta,
}

/// Compact per-user summary used to draw a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringSnapshot {
    pub user_id: String,
    /// Cognition share, 0-100
    pub cognition: u8,
    /// Empathy share, 0-100
    pub empathy: u8,
    /// Pleasure share, 0-100
    pub pleasure: u8,
    pub color: Rgb,
    pub total_videos: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
}

// ============================================================================
// Matching Types
// ============================================================================

/// How far apart two subjects are on one dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapLevel {
    /// Difference below 0.2
    Aligned,
    /// Difference below 0.4
    Complementary,
    Divergent,
}

/// Per-dimension comparison between two trait vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionGap {
    pub dimension: Dimension,
    /// Absolute difference between the two components
    pub difference: f64,
    pub level: GapLevel,
}

/// Descriptive text attached to a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narration {
    pub summary: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    pub chemistry: String,
}

/// Full compatibility analysis for a pair of users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalysis {
    pub user_a: String,
    pub user_b: String,
    /// Cosine similarity of the two trait vectors (0-1)
    pub similarity: f64,
    /// Similarity as a rounded percentage
    pub percentage: u8,
    pub dominant_a: Dimension,
    pub dominant_b: Dimension,
    pub gaps: Vec<DimensionGap>,
    pub common_categories: Vec<String>,
    pub summary: String,
    pub highlights: Vec<String>,
    pub chemistry: String,
    /// Whether the text came from an external narrator rather than the local fallback
    pub narrated: bool,
}

// ============================================================================
// Output Payloads
// ============================================================================

/// Producer metadata embedded in every payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Processed users plus their string snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilesPayload {
    pub schema_version: String,
    pub producer: Producer,
    pub computed_at_utc: String,
    pub profiles: Vec<ProcessedUser>,
    pub strings: Vec<StringSnapshot>,
}

/// A single match analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPayload {
    pub schema_version: String,
    pub producer: Producer,
    pub computed_at_utc: String,
    pub analysis: MatchAnalysis,
}
