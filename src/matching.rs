//! Match analysis
//!
//! Compares two processed users: cosine similarity drives the score, the
//! per-dimension gaps and shared categories drive the descriptive text.
//!
//! Descriptive text can come from an external [`MatchNarrator`] (typically a
//! language model behind its own timeout). When none is configured or it
//! fails, a locally generated narration is used instead. The score never
//! depends on the narrator.

use crate::dimension::{cosine_similarity, Category};
use crate::error::UniverseError;
use crate::types::{
    Dimension, DimensionGap, GapLevel, MatchAnalysis, Narration, ProcessedUser, WatchEvent,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Number of leading history entries considered when looking for shared categories
pub const COMMON_CATEGORY_WINDOW: usize = 15;

/// Gaps below this are [`GapLevel::Aligned`]
pub const ALIGNED_GAP: f64 = 0.2;

/// Gaps below this (and not aligned) are [`GapLevel::Complementary`]
pub const COMPLEMENTARY_GAP: f64 = 0.4;

/// Gaps below this earn a highlight in the local narration
pub const HIGHLIGHT_GAP: f64 = 0.3;

/// Number of highlights every analysis carries
pub const HIGHLIGHT_COUNT: usize = 3;

/// Everything a narrator needs to describe a pair
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub user_a: &'a ProcessedUser,
    pub user_b: &'a ProcessedUser,
    pub similarity: f64,
    pub gaps: &'a [DimensionGap],
    pub common_categories: &'a [String],
}

/// External producer of descriptive match text
pub trait MatchNarrator {
    fn narrate(&self, context: &MatchContext<'_>) -> Result<Narration, UniverseError>;
}

/// One candidate in a similarity ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    pub user_id: String,
    pub similarity: f64,
    pub percentage: u8,
}

/// Classify an absolute difference
pub fn gap_level(difference: f64) -> GapLevel {
    if difference < ALIGNED_GAP {
        GapLevel::Aligned
    } else if difference < COMPLEMENTARY_GAP {
        GapLevel::Complementary
    } else {
        GapLevel::Divergent
    }
}

/// Per-dimension gaps between two users, in dimension order
pub fn dimension_gaps(a: &ProcessedUser, b: &ProcessedUser) -> Vec<DimensionGap> {
    Dimension::ALL
        .into_iter()
        .map(|dimension| {
            let difference = (a.dimensions.get(dimension) - b.dimensions.get(dimension)).abs();
            DimensionGap {
                dimension,
                difference,
                level: gap_level(difference),
            }
        })
        .collect()
}

/// Canonical label for a category, so slugs and data-file labels compare equal
fn canonical_category(label: &str) -> &str {
    Category::from_label(label).map_or(label, |c| c.label())
}

fn distinct_categories(history: &[WatchEvent]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for event in history.iter().take(COMMON_CATEGORY_WINDOW) {
        let category = canonical_category(&event.category);
        if !seen.contains(&category) {
            seen.push(category);
        }
    }
    seen
}

/// Categories both users watched within their first entries, in `a`'s order.
///
/// Known categories are reported by their data-file label whichever form the
/// history used.
pub fn common_categories(a: &[WatchEvent], b: &[WatchEvent]) -> Vec<String> {
    let categories_b = distinct_categories(b);
    distinct_categories(a)
        .into_iter()
        .filter(|c| categories_b.contains(c))
        .map(str::to_string)
        .collect()
}

fn display_name(user: &ProcessedUser) -> &str {
    if user.nickname.is_empty() {
        &user.id
    } else {
        &user.nickname
    }
}

fn gap_for(gaps: &[DimensionGap], dimension: Dimension) -> Option<&DimensionGap> {
    gaps.iter().find(|g| g.dimension == dimension)
}

fn pairing_highlight(context: &MatchContext<'_>) -> String {
    format!(
        "{} meets {}",
        context.user_a.dominant.archetype(),
        context.user_b.dominant.archetype()
    )
}

/// Narration built only from the numbers, used when no narrator answers
pub fn local_narration(context: &MatchContext<'_>) -> Narration {
    let name_a = display_name(context.user_a);
    let name_b = display_name(context.user_b);

    let close = |dimension| {
        gap_for(context.gaps, dimension)
            .map(|g| g.difference < HIGHLIGHT_GAP)
            .unwrap_or(false)
    };

    let mut highlights = Vec::with_capacity(HIGHLIGHT_COUNT);
    if close(Dimension::Cognition) {
        if context.user_a.dominant == Dimension::Cognition {
            highlights.push("Both love exploring knowledge".to_string());
        } else {
            highlights.push("Both think things through".to_string());
        }
    }
    if close(Dimension::Empathy) {
        highlights.push("Strong emotional resonance".to_string());
    }
    if close(Dimension::Pleasure) {
        highlights.push("Aligned pursuit of joy".to_string());
    }
    if let Some(category) = context.common_categories.first() {
        highlights.push(format!("Both enjoy {category}"));
    }
    while highlights.len() < HIGHLIGHT_COUNT {
        highlights.push(pairing_highlight(context));
    }
    highlights.truncate(HIGHLIGHT_COUNT);

    let cognition_phrase = match gap_for(context.gaps, Dimension::Cognition).map(|g| g.level) {
        Some(GapLevel::Aligned) => "cognitive frequencies in tune",
        Some(GapLevel::Complementary) => "complementary ways of thinking",
        _ => "sharply different ways of thinking",
    };

    Narration {
        summary: format!("{name_a} and {name_b} strike a resonance"),
        highlights,
        chemistry: format!(
            "{name_a}'s {} string meets {name_b}'s {} string; with {cognition_phrase}, \
             the two begin to vibrate together and weave a harmony of their own.",
            context.user_a.dominant.archetype(),
            context.user_b.dominant.archetype(),
        ),
    }
}

impl Narration {
    /// Extract a narration from free-form model output.
    ///
    /// The outermost `{ ... }` span is parsed; surrounding prose or code fences
    /// are ignored. Extra fields such as a model-suggested percentage are dropped.
    pub fn from_model_output(output: &str) -> Result<Narration, UniverseError> {
        let start = output
            .find('{')
            .ok_or_else(|| UniverseError::NarrationError("no JSON object in output".to_string()))?;
        let end = output
            .rfind('}')
            .filter(|&end| end > start)
            .ok_or_else(|| UniverseError::NarrationError("unterminated JSON object".to_string()))?;

        serde_json::from_str(&output[start..=end])
            .map_err(|e| UniverseError::NarrationError(format!("malformed narration: {e}")))
    }
}

/// Keep narrator text but make sure exactly three highlights are present
fn fit_highlights(mut narration: Narration, fallback: &Narration) -> Narration {
    narration.highlights.retain(|h| !h.trim().is_empty());
    for extra in &fallback.highlights {
        if narration.highlights.len() >= HIGHLIGHT_COUNT {
            break;
        }
        if !narration.highlights.contains(extra) {
            narration.highlights.push(extra.clone());
        }
    }
    while narration.highlights.len() < HIGHLIGHT_COUNT {
        narration.highlights.push(fallback.highlights[0].clone());
    }
    narration.highlights.truncate(HIGHLIGHT_COUNT);
    narration
}

/// Analyze a pair of users.
///
/// `similarity` and `percentage` always come from [`cosine_similarity`];
/// the narrator only contributes text.
pub fn analyze_match(
    a: &ProcessedUser,
    b: &ProcessedUser,
    narrator: Option<&dyn MatchNarrator>,
) -> MatchAnalysis {
    let similarity = cosine_similarity(&a.dimensions, &b.dimensions);
    let gaps = dimension_gaps(a, b);
    let common = common_categories(&a.watch_history, &b.watch_history);

    let context = MatchContext {
        user_a: a,
        user_b: b,
        similarity,
        gaps: &gaps,
        common_categories: &common,
    };
    let fallback = local_narration(&context);

    let (narration, narrated) = match narrator.map(|n| n.narrate(&context)) {
        Some(Ok(text)) => (fit_highlights(text, &fallback), true),
        Some(Err(e)) => {
            warn!(user_a = %a.id, user_b = %b.id, error = %e, "narrator failed, using local narration");
            (fallback, false)
        }
        None => (fallback, false),
    };

    let percentage = (similarity * 100.0).round() as u8;
    debug!(user_a = %a.id, user_b = %b.id, similarity, percentage, narrated, "analyzed match");

    MatchAnalysis {
        user_a: a.id.clone(),
        user_b: b.id.clone(),
        similarity,
        percentage,
        dominant_a: a.dominant,
        dominant_b: b.dominant,
        gaps,
        common_categories: common,
        summary: narration.summary,
        highlights: narration.highlights,
        chemistry: narration.chemistry,
        narrated,
    }
}

/// Rank candidates by similarity to `subject`, most similar first.
///
/// The subject itself is excluded; equal scores are ordered by user id.
pub fn rank_matches(subject: &ProcessedUser, candidates: &[ProcessedUser]) -> Vec<RankedMatch> {
    let mut ranked: Vec<RankedMatch> = candidates
        .iter()
        .filter(|c| c.id != subject.id)
        .map(|c| {
            let similarity = cosine_similarity(&subject.dimensions, &c.dimensions);
            RankedMatch {
                user_id: c.id.clone(),
                similarity,
                percentage: (similarity * 100.0).round() as u8,
            }
        })
        .collect();

    ranked.sort_by(|x, y| {
        y.similarity
            .total_cmp(&x.similarity)
            .then_with(|| x.user_id.cmp(&y.user_id))
    });
    ranked
}
