//! Content category table
//!
//! Maps each content category to a fixed (cognition, empathy, pleasure) split.
//! The table is configuration data: built once, never mutated by the engine.

use crate::error::UniverseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The closed set of content categories seen in watch histories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Knowledge,
    News,
    Tutorial,
    EmotionalStory,
    Music,
    Pets,
    Comedy,
    Gaming,
    Food,
    Inspirational,
    SocialIssues,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Knowledge,
        Category::News,
        Category::Tutorial,
        Category::EmotionalStory,
        Category::Music,
        Category::Pets,
        Category::Comedy,
        Category::Gaming,
        Category::Food,
        Category::Inspirational,
        Category::SocialIssues,
    ];

    /// Label used in the data-source documents
    pub fn label(&self) -> &'static str {
        match self {
            Category::Knowledge => "知识科普",
            Category::News => "新闻资讯",
            Category::Tutorial => "教程技能",
            Category::EmotionalStory => "情感故事",
            Category::Music => "音乐MV",
            Category::Pets => "宠物萌宠",
            Category::Comedy => "搞笑段子",
            Category::Gaming => "游戏直播",
            Category::Food => "美食探店",
            Category::Inspirational => "励志鸡汤",
            Category::SocialIssues => "社会议题",
        }
    }

    /// ASCII slug
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Knowledge => "knowledge",
            Category::News => "news",
            Category::Tutorial => "tutorial",
            Category::EmotionalStory => "emotional_story",
            Category::Music => "music",
            Category::Pets => "pets",
            Category::Comedy => "comedy",
            Category::Gaming => "gaming",
            Category::Food => "food",
            Category::Inspirational => "inspirational",
            Category::SocialIssues => "social_issues",
        }
    }

    /// Resolve either a data-file label or a slug
    pub fn from_label(label: &str) -> Option<Category> {
        let trimmed = label.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label() == trimmed || c.slug().eq_ignore_ascii_case(trimmed))
    }

    /// Built-in weights for this category
    pub fn standard_weights(&self) -> CategoryWeights {
        let (cognition, empathy, pleasure) = match self {
            Category::Knowledge => (0.9, 0.1, 0.0),
            Category::News => (0.7, 0.2, 0.1),
            Category::Tutorial => (0.8, 0.1, 0.1),
            Category::EmotionalStory => (0.1, 0.8, 0.1),
            Category::Music => (0.1, 0.6, 0.3),
            Category::Pets => (0.0, 0.5, 0.5),
            Category::Comedy => (0.0, 0.1, 0.9),
            Category::Gaming => (0.1, 0.2, 0.7),
            Category::Food => (0.2, 0.2, 0.6),
            Category::Inspirational => (0.3, 0.5, 0.2),
            Category::SocialIssues => (0.5, 0.4, 0.1),
        };
        CategoryWeights {
            cognition,
            empathy,
            pleasure,
        }
    }
}

/// How strongly one category signals each trait
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub cognition: f64,
    pub empathy: f64,
    pub pleasure: f64,
}

impl CategoryWeights {
    pub const fn new(cognition: f64, empathy: f64, pleasure: f64) -> Self {
        Self {
            cognition,
            empathy,
            pleasure,
        }
    }

    pub fn sum(&self) -> f64 {
        self.cognition + self.empathy + self.pleasure
    }
}

/// Lookup table from category label to weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryProfile {
    weights: BTreeMap<String, CategoryWeights>,
}

impl Default for CategoryProfile {
    fn default() -> Self {
        Self::standard()
    }
}

impl CategoryProfile {
    /// Empty profile; every event is treated as unknown
    pub fn empty() -> Self {
        Self {
            weights: BTreeMap::new(),
        }
    }

    /// The built-in eleven-category table, keyed by data-file label
    pub fn standard() -> Self {
        let weights = Category::ALL
            .into_iter()
            .map(|c| (c.label().to_string(), c.standard_weights()))
            .collect();
        Self { weights }
    }

    /// Add or replace an entry
    pub fn with_category(mut self, label: impl Into<String>, weights: CategoryWeights) -> Self {
        self.weights.insert(label.into(), weights);
        self
    }

    /// Weights for a label.
    ///
    /// Exact labels win; otherwise the label is resolved through [`Category`]
    /// so slugs find entries keyed by data-file labels and vice versa.
    pub fn lookup(&self, label: &str) -> Option<CategoryWeights> {
        if let Some(w) = self.weights.get(label) {
            return Some(*w);
        }
        let category = Category::from_label(label)?;
        self.weights
            .get(category.label())
            .or_else(|| self.weights.get(category.slug()))
            .copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.lookup(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryWeights)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reject negative or non-finite weights
    pub fn validate(&self) -> Result<(), UniverseError> {
        for (label, w) in &self.weights {
            for value in [w.cognition, w.empathy, w.pleasure] {
                if !value.is_finite() || value < 0.0 {
                    return Err(UniverseError::InvalidConfig(format!(
                        "category '{label}' has invalid weight {value}"
                    )));
                }
            }
        }
        Ok(())
    }
}
