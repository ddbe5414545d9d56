//! Pipeline orchestration
//!
//! Public API for Xian Universe: users document → dimensions → payload JSON.

use crate::adapter::{parse_users, process_user, snapshot};
use crate::config::EngineConfig;
use crate::encoder::UniverseEncoder;
use crate::error::UniverseError;
use crate::matching::{analyze_match, rank_matches, MatchNarrator, RankedMatch};
use crate::types::{ProcessedUser, RawUser};
use tracing::{debug, info};

/// Convert a users document into a profiles payload using the standard tables.
///
/// # Arguments
/// * `users_json` - JSON array of users with watch histories
///
/// # Returns
/// Profiles payload JSON (one profile and one string snapshot per user)
///
/// # Example
/// ```ignore
/// let payload = users_to_profiles(&std::fs::read_to_string("users.json")?)?;
/// ```
pub fn users_to_profiles(users_json: &str) -> Result<String, UniverseError> {
    let mut processor = UniverseProcessor::new();
    processor.load_users(users_json)?;
    processor.profiles()
}

/// Analyze two users of a document using the standard tables and local narration.
///
/// # Arguments
/// * `users_json` - JSON array of users with watch histories
/// * `id_a`, `id_b` - ids of the users to compare
///
/// # Returns
/// Match payload JSON
pub fn match_users(users_json: &str, id_a: &str, id_b: &str) -> Result<String, UniverseError> {
    let mut processor = UniverseProcessor::new();
    processor.load_users(users_json)?;
    processor.match_pair(id_a, id_b, None)
}

/// Stateful processor holding a configuration and a set of loaded users.
///
/// Use this when the same users are profiled, matched and ranked repeatedly,
/// or when the category table is customized.
pub struct UniverseProcessor {
    config: EngineConfig,
    encoder: UniverseEncoder,
    raw: Vec<RawUser>,
    processed: Vec<ProcessedUser>,
}

impl Default for UniverseProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl UniverseProcessor {
    /// Create a processor with the standard tables
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            encoder: UniverseEncoder::new(),
            raw: Vec::new(),
            processed: Vec::new(),
        }
    }

    /// Create a processor with a custom configuration
    pub fn with_config(config: EngineConfig) -> Result<Self, UniverseError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load a users document.
    ///
    /// Users whose id is already loaded are replaced in place; new users are
    /// appended. Returns the number of users in the document.
    pub fn load_users(&mut self, users_json: &str) -> Result<usize, UniverseError> {
        let users = parse_users(users_json)?;
        let count = users.len();

        for user in users {
            let processed = process_user(&user, &self.config);
            match self.raw.iter().position(|u| u.id == user.id) {
                Some(index) => {
                    self.raw[index] = user;
                    self.processed[index] = processed;
                }
                None => {
                    self.raw.push(user);
                    self.processed.push(processed);
                }
            }
        }

        info!(loaded = count, total = self.raw.len(), "loaded users");
        Ok(count)
    }

    /// Look up a processed user
    pub fn user(&self, id: &str) -> Option<&ProcessedUser> {
        self.processed.iter().find(|u| u.id == id)
    }

    fn require(&self, id: &str) -> Result<&ProcessedUser, UniverseError> {
        self.user(id)
            .ok_or_else(|| UniverseError::UnknownUser(id.to_string()))
    }

    /// Profiles payload JSON for every loaded user, in load order
    pub fn profiles(&self) -> Result<String, UniverseError> {
        let strings = self
            .raw
            .iter()
            .map(|u| snapshot(u, &self.config))
            .collect();
        self.encoder
            .profiles_to_json(self.processed.clone(), strings)
    }

    /// Match payload JSON for two loaded users
    pub fn match_pair(
        &self,
        id_a: &str,
        id_b: &str,
        narrator: Option<&dyn MatchNarrator>,
    ) -> Result<String, UniverseError> {
        let a = self.require(id_a)?;
        let b = self.require(id_b)?;
        self.encoder.match_to_json(analyze_match(a, b, narrator))
    }

    /// The `top` loaded users most similar to `id`
    pub fn rank(&self, id: &str, top: usize) -> Result<Vec<RankedMatch>, UniverseError> {
        let subject = self.require(id)?;
        let mut ranked = rank_matches(subject, &self.processed);
        ranked.truncate(top);
        debug!(user = id, returned = ranked.len(), "ranked matches");
        Ok(ranked)
    }

    /// Save the configuration to JSON
    pub fn save_config(&self) -> Result<String, UniverseError> {
        self.config.to_json()
    }

    /// Replace the configuration and recompute every loaded user
    pub fn load_config(&mut self, json: &str) -> Result<(), UniverseError> {
        self.config = EngineConfig::from_json(json)?;
        self.processed = self
            .raw
            .iter()
            .map(|u| process_user(u, &self.config))
            .collect();
        Ok(())
    }

    pub fn user_count(&self) -> usize {
        self.raw.len()
    }

    /// Drop all loaded users, keeping the configuration
    pub fn clear(&mut self) {
        self.raw.clear();
        self.processed.clear();
    }
}
