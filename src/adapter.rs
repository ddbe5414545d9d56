//! User document adapter
//!
//! Parses the data-source document (a JSON array of users with watch
//! histories) and attaches derived dimensions.

use crate::color::trait_color;
use crate::config::EngineConfig;
use crate::dimension::{
    compute_trait_vector, dominant_trait, persona_title, Category, CategoryProfile,
};
use crate::error::UniverseError;
use crate::types::{ProcessedUser, RawUser, StringSnapshot, TraitVector, WatchEvent};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Parse a users document
pub fn parse_users(json: &str) -> Result<Vec<RawUser>, UniverseError> {
    serde_json::from_str(json)
        .map_err(|e| UniverseError::ParseError(format!("Failed to parse users document: {}", e)))
}

/// Attach dimensions, persona and color to a raw user
pub fn process_user(raw: &RawUser, config: &EngineConfig) -> ProcessedUser {
    let dimensions = compute_trait_vector(
        &raw.watch_history,
        &config.category_profile,
        &config.behavior_weighting,
    );

    ProcessedUser {
        id: raw.id.clone(),
        nickname: raw.nickname.clone(),
        avatar: raw.avatar.clone(),
        persona_type: raw.persona_type.clone(),
        dimensions,
        dominant: dominant_trait(&dimensions),
        persona: persona_title(&dimensions).to_string(),
        summary: profile_summary(&dimensions, &raw.watch_history),
        color: trait_color(&dimensions),
        watch_history: raw.watch_history.clone(),
        meta: raw.meta.clone(),
    }
}

/// Components above this get a trait sentence in the summary
const SUMMARY_TRAIT_THRESHOLD: f64 = 0.4;

const SUMMARY_CLOSING: &str = "Looking for someone whose soul resonates with yours.";

const SUMMARY_FALLBACK: &str = "You are a one-of-a-kind individual with a rich inner world";

fn category_line(category: Category) -> Option<&'static str> {
    match category {
        Category::Knowledge => Some("You are a curious explorer who pursues truth and wisdom"),
        Category::EmotionalStory => Some("You have a sensitive heart that is moved by sincere emotion"),
        Category::Comedy => Some("You keep an optimistic outlook; laughter seasons your life"),
        Category::Pets => Some("You are full of love, and gentleness is your greatest trait"),
        Category::Gaming => Some("You enjoy competition and never give up easily"),
        Category::Music => Some("You have a unique artistic sense; music is your soulmate"),
        _ => None,
    }
}

/// Most watched category, first seen wins ties. Labels are canonicalized.
fn top_category(history: &[WatchEvent]) -> Option<Category> {
    let mut counts: HashMap<Category, usize> = HashMap::new();
    let mut order: Vec<Category> = Vec::new();
    for category in history.iter().filter_map(|e| Category::from_label(&e.category)) {
        let count = counts.entry(category).or_insert(0);
        if *count == 0 {
            order.push(category);
        }
        *count += 1;
    }

    let mut best: Option<(Category, usize)> = None;
    for category in order {
        let count = counts.get(&category).copied().unwrap_or(0);
        if best.map_or(true, |(_, n)| count > n) {
            best = Some((category, count));
        }
    }
    best.map(|(category, _)| category)
}

/// Short paragraph describing a viewing profile.
///
/// One sentence per component above 0.4, then one for the most watched
/// category when it has a line, then a closing sentence.
pub fn profile_summary(dimensions: &TraitVector, history: &[WatchEvent]) -> String {
    let mut sentences: Vec<&str> = Vec::new();
    if dimensions.cognition > SUMMARY_TRAIT_THRESHOLD {
        sentences.push("You have a strong thirst for knowledge and love exploring the unknown");
    }
    if dimensions.empathy > SUMMARY_TRAIT_THRESHOLD {
        sentences.push("You are empathetic and easily resonate with others");
    }
    if dimensions.pleasure > SUMMARY_TRAIT_THRESHOLD {
        sentences.push("You know how to enjoy life and find fun in everyday moments");
    }
    if let Some(line) = top_category(history).and_then(category_line) {
        sentences.push(line);
    }
    if sentences.is_empty() {
        sentences.push(SUMMARY_FALLBACK);
    }

    format!("{}. {}", sentences.join(". "), SUMMARY_CLOSING)
}

/// Process every user in document order
pub fn process_users(raw: &[RawUser], config: &EngineConfig) -> Vec<ProcessedUser> {
    let users: Vec<ProcessedUser> = raw.iter().map(|u| process_user(u, config)).collect();
    debug!(users = users.len(), "processed users");
    users
}

/// Compact string summary for a user
pub fn snapshot(raw: &RawUser, config: &EngineConfig) -> StringSnapshot {
    let dimensions = compute_trait_vector(
        &raw.watch_history,
        &config.category_profile,
        &config.behavior_weighting,
    );
    let (cognition, empathy, pleasure) = percentage_split(&dimensions);

    let last_active = raw
        .watch_history
        .iter()
        .filter_map(|e| e.watched_at)
        .max()
        .or(raw.created_at);

    StringSnapshot {
        user_id: raw.id.clone(),
        cognition,
        empathy,
        pleasure,
        color: trait_color(&dimensions),
        total_videos: raw.watch_history.len() as u32,
        last_active,
    }
}

/// Share of each component in the vector total, as rounded percentages
fn percentage_split(vector: &TraitVector) -> (u8, u8, u8) {
    let total = vector.cognition + vector.empathy + vector.pleasure;
    if total <= 0.0 {
        return (33, 33, 33);
    }
    let pct = |v: f64| ((v / total) * 100.0).round() as u8;
    (pct(vector.cognition), pct(vector.empathy), pct(vector.pleasure))
}

/// Problem found by a dry-run check of a users document
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserIssue {
    #[error("user {user_id}: event {index} has unknown category '{category}'")]
    UnknownCategory {
        user_id: String,
        index: usize,
        category: String,
    },

    #[error("user {user_id}: empty watch history")]
    EmptyHistory { user_id: String },

    #[error("duplicate user id {user_id}")]
    DuplicateId { user_id: String },
}

/// Report issues the engine would silently absorb (skipped events, neutral defaults)
pub fn validate_users(users: &[RawUser], profile: &CategoryProfile) -> Vec<UserIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for user in users {
        if !seen.insert(user.id.as_str()) {
            issues.push(UserIssue::DuplicateId {
                user_id: user.id.clone(),
            });
        }

        if user.watch_history.is_empty() {
            issues.push(UserIssue::EmptyHistory {
                user_id: user.id.clone(),
            });
        }

        for (index, event) in user.watch_history.iter().enumerate() {
            if !profile.contains(&event.category) {
                issues.push(UserIssue::UnknownCategory {
                    user_id: user.id.clone(),
                    index,
                    category: event.category.clone(),
                });
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dimension, Rgb, WatchEvent};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn sample_users_json() -> &'static str {
        r#"[
            {
                "id": "user_001",
                "nickname": "用户001",
                "avatar": "https://api.dicebear.com/7.x/avataaars/svg?seed=user_001",
                "personaType": "extreme_cog",
                "watchHistory": [
                    { "videoId": "video_0001", "category": "知识科普", "watchPercent": 0.95, "duration": 120, "liked": true, "commented": true, "watchedAt": "2024-01-10T21:00:00.000Z", "isNightWatch": false },
                    { "videoId": "video_0002", "category": "教程技能", "watchPercent": 0.5, "duration": 300, "liked": false, "commented": false, "watchedAt": "2024-01-12T02:00:00.000Z", "isNightWatch": true }
                ],
                "createdAt": "2023-06-01T00:00:00.000Z",
                "_meta": { "isNewUser": true, "isSilentUser": false, "isActiveUser": false, "isSinglePref": false, "isNightOwl": false }
            },
            {
                "id": "user_002",
                "nickname": "用户002",
                "watchHistory": [],
                "createdAt": "2023-07-01T00:00:00.000Z"
            }
        ]"#
    }

    #[test]
    fn test_parse_users() {
        let users = parse_users(sample_users_json()).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].watch_history.len(), 2);
        assert!(users[0].meta.is_new_user);
        assert!(users[1].avatar.is_none());
    }

    #[test]
    fn test_parse_users_invalid() {
        assert!(matches!(
            parse_users("{ not an array"),
            Err(UniverseError::ParseError(_))
        ));
    }

    #[test]
    fn test_process_user() {
        let users = parse_users(sample_users_json()).unwrap();
        let processed = process_user(&users[0], &EngineConfig::default());

        assert_eq!(processed.id, "user_001");
        assert_eq!(processed.dominant, Dimension::Cognition);
        assert!(processed.dimensions.cognition > 0.8);
        assert_eq!(processed.persona, "Logical Thinker");
        assert_eq!(processed.watch_history.len(), 2);
        assert!(processed.meta.is_new_user);
    }

    #[test]
    fn test_process_user_fills_summary() {
        let users = parse_users(sample_users_json()).unwrap();
        let processed = process_user(&users[0], &EngineConfig::default());
        assert_eq!(
            processed.summary,
            "You have a strong thirst for knowledge and love exploring the unknown. \
             You are a curious explorer who pursues truth and wisdom. \
             Looking for someone whose soul resonates with yours."
        );
    }

    #[test]
    fn test_profile_summary_traits_and_top_category() {
        let history = vec![
            WatchEvent::new("knowledge", 0.5),
            WatchEvent::new("宠物萌宠", 0.5),
            WatchEvent::new("pets", 0.5),
        ];
        let summary = profile_summary(&TraitVector::new(0.1, 0.5, 0.45), &history);
        assert_eq!(
            summary,
            "You are empathetic and easily resonate with others. \
             You know how to enjoy life and find fun in everyday moments. \
             You are full of love, and gentleness is your greatest trait. \
             Looking for someone whose soul resonates with yours."
        );
    }

    #[test]
    fn test_profile_summary_fallback() {
        // neutral vector and a category with no line of its own
        let history = vec![WatchEvent::new("美食探店", 0.5)];
        assert_eq!(
            profile_summary(&TraitVector::NEUTRAL, &history),
            "You are a one-of-a-kind individual with a rich inner world. \
             Looking for someone whose soul resonates with yours."
        );
        assert_eq!(
            profile_summary(&TraitVector::NEUTRAL, &[]),
            profile_summary(&TraitVector::NEUTRAL, &history)
        );
    }

    #[test]
    fn test_process_users_keeps_document_order() {
        let users = parse_users(sample_users_json()).unwrap();
        let processed = process_users(&users, &EngineConfig::default());
        let ids: Vec<&str> = processed.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["user_001", "user_002"]);
    }

    #[test]
    fn test_empty_history_gets_neutral_profile() {
        let users = parse_users(sample_users_json()).unwrap();
        let processed = process_user(&users[1], &EngineConfig::default());

        assert_eq!(processed.dimensions, TraitVector::NEUTRAL);
        assert_eq!(processed.dominant, Dimension::Cognition);
        assert_eq!(processed.color, Rgb { r: 84, g: 84, b: 84 });
    }

    #[test]
    fn test_snapshot() {
        let users = parse_users(sample_users_json()).unwrap();
        let config = EngineConfig::default();

        let snap = snapshot(&users[0], &config);
        assert_eq!(snap.user_id, "user_001");
        assert_eq!(snap.total_videos, 2);
        assert_eq!(
            snap.last_active,
            Some(Utc.with_ymd_and_hms(2024, 1, 12, 2, 0, 0).unwrap())
        );
        let total = snap.cognition as u32 + snap.empathy as u32 + snap.pleasure as u32;
        assert!((99..=101).contains(&total));

        let empty = snapshot(&users[1], &config);
        assert_eq!((empty.cognition, empty.empathy, empty.pleasure), (33, 33, 33));
        assert_eq!(
            empty.last_active,
            Some(Utc.with_ymd_and_hms(2023, 7, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_percentage_split() {
        assert_eq!(percentage_split(&TraitVector::new(0.6, 0.1, 0.3)), (60, 10, 30));
        assert_eq!(percentage_split(&TraitVector::ZERO), (33, 33, 33));
    }

    #[test]
    fn test_validate_users() {
        let mut users = parse_users(sample_users_json()).unwrap();
        users[0].watch_history.push(WatchEvent::new("cooking", 0.5));
        users.push(users[0].clone());

        let issues = validate_users(&users, &CategoryProfile::standard());

        assert!(issues.contains(&UserIssue::EmptyHistory {
            user_id: "user_002".to_string()
        }));
        assert!(issues.contains(&UserIssue::DuplicateId {
            user_id: "user_001".to_string()
        }));
        assert!(issues.contains(&UserIssue::UnknownCategory {
            user_id: "user_001".to_string(),
            index: 2,
            category: "cooking".to_string(),
        }));
        assert_eq!(issues.len(), 4);
    }
}
