//! Dimension engine
//!
//! Converts categorized, weighted watch events into a normalized
//! cognition / empathy / pleasure vector and compares vectors by cosine
//! similarity.
//!
//! Pipeline: WatchEvent → behavior weight → category-weighted sum → normalize → TraitVector

pub mod calculator;
pub mod profile;
pub mod weighting;

pub use calculator::{
    compute_trait_vector, cosine_similarity, dominant_trait, persona_title, similarity_percentage,
};
pub use profile::{Category, CategoryProfile, CategoryWeights};
pub use weighting::{BehaviorRule, BehaviorSignal, BehaviorWeighting};
