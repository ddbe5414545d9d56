//! Xian Universe - Deterministic trait-vector engine for watch histories
//!
//! Each user's watch history is reduced to a three-component trait vector
//! (cognition, empathy, pleasure) through a deterministic pipeline:
//! category lookup → behavior weighting → weighted average → clamp.
//! Vectors are then compared with cosine similarity to score matches.
//!
//! ## Modules
//!
//! - **Dimension Engine**: category table, behavior weighting, vector math
//! - **Matching**: pairwise analysis and similarity ranking
//! - **Classifier**: keyword categorization of videos
//! - **Pipeline**: users document in, versioned JSON payloads out

pub mod adapter;
pub mod classifier;
pub mod color;
pub mod config;
pub mod dimension;
pub mod encoder;
pub mod error;
pub mod matching;
pub mod pipeline;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use adapter::profile_summary;
pub use classifier::{classify_video, Classification, Confidence};
pub use config::EngineConfig;
pub use dimension::{
    compute_trait_vector, cosine_similarity, dominant_trait, persona_title, similarity_percentage,
    BehaviorWeighting, CategoryProfile,
};
pub use error::UniverseError;
pub use matching::{analyze_match, rank_matches, MatchNarrator, RankedMatch};
pub use pipeline::{match_users, users_to_profiles, UniverseProcessor};
pub use types::{Dimension, MatchAnalysis, ProcessedUser, RawUser, TraitVector, WatchEvent};

/// Library version embedded in all payloads
pub const XIAN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for payloads
pub const PRODUCER_NAME: &str = "xian-universe";
