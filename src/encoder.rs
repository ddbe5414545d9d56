//! Payload encoding
//!
//! Wraps processed users and match analyses in versioned payloads that carry
//! producer metadata and a computation timestamp.

use crate::error::UniverseError;
use crate::types::{
    MatchAnalysis, MatchPayload, ProcessedUser, Producer, ProfilesPayload, StringSnapshot,
};
use crate::{PRODUCER_NAME, XIAN_VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Current payload schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Encoder for output payloads
pub struct UniverseEncoder {
    instance_id: String,
}

impl Default for UniverseEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl UniverseEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    fn producer(&self) -> Producer {
        Producer {
            name: PRODUCER_NAME.to_string(),
            version: XIAN_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        }
    }

    /// Encode profiles and their string snapshots.
    ///
    /// Snapshots must be aligned with profiles by user id.
    pub fn encode_profiles(
        &self,
        profiles: Vec<ProcessedUser>,
        strings: Vec<StringSnapshot>,
    ) -> Result<ProfilesPayload, UniverseError> {
        if profiles.len() != strings.len() {
            return Err(UniverseError::EncodingError(format!(
                "{} profiles but {} string snapshots",
                profiles.len(),
                strings.len()
            )));
        }
        if let Some((p, s)) = profiles
            .iter()
            .zip(&strings)
            .find(|(p, s)| p.id != s.user_id)
        {
            return Err(UniverseError::EncodingError(format!(
                "snapshot for {} is out of order (expected {})",
                s.user_id, p.id
            )));
        }

        Ok(ProfilesPayload {
            schema_version: SCHEMA_VERSION.to_string(),
            producer: self.producer(),
            computed_at_utc: Utc::now().to_rfc3339(),
            profiles,
            strings,
        })
    }

    pub fn encode_match(&self, analysis: MatchAnalysis) -> MatchPayload {
        MatchPayload {
            schema_version: SCHEMA_VERSION.to_string(),
            producer: self.producer(),
            computed_at_utc: Utc::now().to_rfc3339(),
            analysis,
        }
    }

    /// Encode profiles to a JSON string
    pub fn profiles_to_json(
        &self,
        profiles: Vec<ProcessedUser>,
        strings: Vec<StringSnapshot>,
    ) -> Result<String, UniverseError> {
        let payload = self.encode_profiles(profiles, strings)?;
        serde_json::to_string_pretty(&payload).map_err(UniverseError::JsonError)
    }

    /// Encode a match analysis to a JSON string
    pub fn match_to_json(&self, analysis: MatchAnalysis) -> Result<String, UniverseError> {
        serde_json::to_string_pretty(&self.encode_match(analysis)).map_err(UniverseError::JsonError)
    }
}
