//! Trait vector calculation and comparison
//!
//! Weighted sum → normalize → cosine similarity. All functions are pure and
//! total: degenerate input degrades to a documented default instead of failing.

use crate::dimension::profile::CategoryProfile;
use crate::dimension::weighting::BehaviorWeighting;
use crate::types::{Dimension, TraitVector, WatchEvent};
use tracing::{debug, warn};

/// Reduce a watch history into a trait vector.
///
/// Events whose category is not in `profile` are skipped entirely. If no event
/// contributes weight the neutral split [`TraitVector::NEUTRAL`] is returned.
pub fn compute_trait_vector(
    events: &[WatchEvent],
    profile: &CategoryProfile,
    weighting: &BehaviorWeighting,
) -> TraitVector {
    let mut cognition = Vec::with_capacity(events.len());
    let mut empathy = Vec::with_capacity(events.len());
    let mut pleasure = Vec::with_capacity(events.len());
    let mut weights = Vec::with_capacity(events.len());

    for event in events {
        let Some(category) = profile.lookup(&event.category) else {
            warn!(category = %event.category, "skipping event with unknown category");
            continue;
        };

        let weight = weighting.weight(event);
        cognition.push(category.cognition * weight);
        empathy.push(category.empathy * weight);
        pleasure.push(category.pleasure * weight);
        weights.push(weight);
    }

    let total_weight = ordered_sum(&mut weights);
    if !total_weight.is_finite() {
        warn!(total_weight, "non-finite total weight, using neutral vector");
        return TraitVector::NEUTRAL;
    }
    if total_weight <= 0.0 {
        debug!(events = events.len(), "no weighted signal, using neutral vector");
        return TraitVector::NEUTRAL;
    }

    let vector = TraitVector::new(
        ordered_sum(&mut cognition) / total_weight,
        ordered_sum(&mut empathy) / total_weight,
        ordered_sum(&mut pleasure) / total_weight,
    )
    .clamped();

    debug!(
        events = events.len(),
        counted = weights.len(),
        total_weight,
        cognition = vector.cognition,
        empathy = vector.empathy,
        pleasure = vector.pleasure,
        "computed trait vector"
    );
    vector
}

/// Sum in ascending order so any permutation of the terms gives the same bits
fn ordered_sum(terms: &mut [f64]) -> f64 {
    terms.sort_by(f64::total_cmp);
    terms.iter().sum()
}

/// Cosine similarity of two trait vectors.
///
/// Returns 0.0 when either vector has zero magnitude. For non-negative
/// components the result lies in [0, 1].
pub fn cosine_similarity(a: &TraitVector, b: &TraitVector) -> f64 {
    let magnitude_a = a.magnitude();
    let magnitude_b = b.magnitude();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    let similarity = a.dot(b) / (magnitude_a * magnitude_b);
    if similarity.is_nan() {
        return 0.0;
    }
    similarity.clamp(0.0, 1.0)
}

/// Similarity as a display percentage (0-100)
pub fn similarity_percentage(a: &TraitVector, b: &TraitVector) -> u8 {
    (cosine_similarity(a, b) * 100.0).round() as u8
}

/// Largest component of a trait vector.
///
/// Ties resolve in fixed priority order: cognition, then empathy, then pleasure.
pub fn dominant_trait(vector: &TraitVector) -> Dimension {
    if vector.cognition >= vector.empathy && vector.cognition >= vector.pleasure {
        return Dimension::Cognition;
    }
    if vector.empathy >= vector.cognition && vector.empathy >= vector.pleasure {
        return Dimension::Empathy;
    }
    Dimension::Pleasure
}

/// Descriptive persona title for a trait vector.
///
/// Picks one of three titles for the dominant dimension; a stronger dominant
/// component selects a later title.
pub fn persona_title(vector: &TraitVector) -> &'static str {
    let dominant = dominant_trait(vector);
    let titles: [&'static str; 3] = match dominant {
        Dimension::Cognition => ["Rational Explorer", "Knowledge Seeker", "Logical Thinker"],
        Dimension::Empathy => ["Emotional Resonator", "Warm Connector", "Soul Perceiver"],
        Dimension::Pleasure => ["Joy Chaser", "Easygoing Hedonist", "Life Optimist"],
    };

    let value = vector.get(dominant).clamp(0.0, 1.0);
    let index = (value * 2.99).floor() as usize;
    titles.get(index).copied().unwrap_or(titles[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::profile::CategoryWeights;
    use crate::dimension::weighting::{BehaviorRule, BehaviorSignal};
    use pretty_assertions::assert_eq;

    fn scenario_profile() -> CategoryProfile {
        CategoryProfile::empty()
            .with_category("knowledge", CategoryWeights::new(0.9, 0.1, 0.0))
            .with_category("comedy", CategoryWeights::new(0.0, 0.1, 0.9))
    }

    fn mixed_history() -> Vec<WatchEvent> {
        vec![
            WatchEvent::new("知识科普", 0.95).liked(true),
            WatchEvent::new("搞笑段子", 0.2).commented(true),
            WatchEvent::new("情感故事", 0.85).at_night(true),
            WatchEvent::new("音乐MV", 0.4).liked(true).commented(true),
            WatchEvent::new("社会议题", 0.6),
            WatchEvent::new("游戏直播", 0.99).at_night(true).liked(true),
            WatchEvent::new("宠物萌宠", 0.1),
        ]
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_concrete_scenario() {
        let events = vec![
            WatchEvent::new("knowledge", 0.9).liked(true),
            WatchEvent::new("comedy", 0.5),
        ];

        let v = compute_trait_vector(&events, &scenario_profile(), &BehaviorWeighting::standard());
        assert_close(v.cognition, 0.675);
        assert_close(v.empathy, 0.1);
        assert_close(v.pleasure, 0.225);
    }

    #[test]
    fn test_empty_input_is_neutral() {
        let v = compute_trait_vector(&[], &CategoryProfile::standard(), &BehaviorWeighting::standard());
        assert_eq!(v, TraitVector::NEUTRAL);
        assert_eq!(v, TraitVector::new(0.33, 0.33, 0.33));
    }

    #[test]
    fn test_unknown_categories_are_skipped() {
        let profile = CategoryProfile::standard();
        let weighting = BehaviorWeighting::standard();

        let only_unknown = vec![
            WatchEvent::new("cooking", 1.0).liked(true),
            WatchEvent::new("", 0.5),
        ];
        assert_eq!(
            compute_trait_vector(&only_unknown, &profile, &weighting),
            compute_trait_vector(&[], &profile, &weighting)
        );

        let known = vec![WatchEvent::new("knowledge", 0.9).liked(true)];
        let mut with_noise = known.clone();
        with_noise.push(WatchEvent::new("cooking", 1.0).commented(true));
        assert_eq!(
            compute_trait_vector(&known, &profile, &weighting),
            compute_trait_vector(&with_noise, &profile, &weighting)
        );
    }

    #[test]
    fn test_order_independence() {
        let profile = CategoryProfile::standard();
        let weighting = BehaviorWeighting::standard();
        let events = mixed_history();
        let expected = compute_trait_vector(&events, &profile, &weighting);

        let mut reversed = events.clone();
        reversed.reverse();
        assert_eq!(compute_trait_vector(&reversed, &profile, &weighting), expected);

        for shift in 1..events.len() {
            let mut rotated = events.clone();
            rotated.rotate_left(shift);
            assert_eq!(compute_trait_vector(&rotated, &profile, &weighting), expected);
        }

        let mut swapped = events.clone();
        swapped.swap(0, 5);
        swapped.swap(2, 3);
        assert_eq!(compute_trait_vector(&swapped, &profile, &weighting), expected);
    }

    #[test]
    fn test_bounded_output() {
        let profile = CategoryProfile::standard();
        let weighting = BehaviorWeighting::standard();
        let histories = vec![
            mixed_history(),
            vec![WatchEvent::new("knowledge", 1.0); 12],
            vec![WatchEvent::new("comedy", 0.0).at_night(true)],
            vec![
                WatchEvent::new("pets", 0.8).liked(true).commented(true),
                WatchEvent::new("news", 0.3),
            ],
        ];

        for history in histories {
            let v = compute_trait_vector(&history, &profile, &weighting);
            for d in Dimension::ALL {
                let value = v.get(d);
                assert!((0.0..=1.0).contains(&value), "{d:?} = {value}");
            }
        }
    }

    #[test]
    fn test_non_finite_inputs_stay_bounded() {
        let nan_profile = CategoryProfile::empty()
            .with_category("x", CategoryWeights::new(f64::NAN, 0.5, 0.5));
        let v = compute_trait_vector(
            &[WatchEvent::new("x", 0.5)],
            &nan_profile,
            &BehaviorWeighting::standard(),
        );
        assert_eq!(v, TraitVector::new(0.0, 0.5, 0.5));

        let runaway = BehaviorWeighting {
            rules: vec![BehaviorRule::new(BehaviorSignal::Liked, f64::INFINITY)],
        };
        let v = compute_trait_vector(
            &[WatchEvent::new("knowledge", 0.5).liked(true)],
            &scenario_profile(),
            &runaway,
        );
        assert_eq!(v, TraitVector::NEUTRAL);
    }

    #[test]
    fn test_single_category_reproduces_its_weights() {
        let events = vec![
            WatchEvent::new("knowledge", 1.0).liked(true),
            WatchEvent::new("知识科普", 0.1),
        ];
        let v = compute_trait_vector(&events, &CategoryProfile::standard(), &BehaviorWeighting::standard());
        assert_close(v.cognition, 0.9);
        assert_close(v.empathy, 0.1);
        assert_close(v.pleasure, 0.0);
    }

    #[test]
    fn test_engagement_shifts_profile() {
        let profile = CategoryProfile::standard();
        let weighting = BehaviorWeighting::standard();

        let shallow = vec![WatchEvent::new("knowledge", 0.2), WatchEvent::new("comedy", 0.2)];
        let engaged = vec![
            WatchEvent::new("knowledge", 0.2),
            WatchEvent::new("comedy", 0.9).liked(true).commented(true),
        ];

        let a = compute_trait_vector(&shallow, &profile, &weighting);
        let b = compute_trait_vector(&engaged, &profile, &weighting);
        assert_close(a.cognition, a.pleasure);
        assert!(b.pleasure > b.cognition);
    }

    #[test]
    fn test_cosine_similarity_bounds_and_symmetry() {
        let vectors = [
            TraitVector::new(0.675, 0.1, 0.225),
            TraitVector::new(0.1, 0.8, 0.1),
            TraitVector::new(0.0, 0.1, 0.9),
            TraitVector::NEUTRAL,
            TraitVector::new(1.0, 0.0, 0.0),
        ];

        for a in &vectors {
            assert_close(cosine_similarity(a, a), 1.0);
            for b in &vectors {
                let ab = cosine_similarity(a, b);
                let ba = cosine_similarity(b, a);
                assert_eq!(ab, ba);
                assert!((0.0..=1.0).contains(&ab));
            }
        }
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = TraitVector::new(1.0, 0.0, 0.0);
        let b = TraitVector::new(0.0, 0.0, 1.0);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_similarity_is_scale_invariant() {
        let a = TraitVector::new(0.2, 0.4, 0.1);
        let b = TraitVector::new(0.4, 0.8, 0.2);
        assert_close(cosine_similarity(&a, &b), 1.0);
    }

    #[test]
    fn test_zero_vector_guard() {
        let zero = TraitVector::ZERO;
        let other = TraitVector::new(0.3, 0.3, 0.4);

        assert_eq!(cosine_similarity(&zero, &other), 0.0);
        assert_eq!(cosine_similarity(&other, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
        assert_eq!(similarity_percentage(&zero, &other), 0);
    }

    #[test]
    fn test_similarity_percentage() {
        assert_eq!(similarity_percentage(&TraitVector::NEUTRAL, &TraitVector::NEUTRAL), 100);

        let a = TraitVector::new(1.0, 0.0, 0.0);
        let b = TraitVector::new(1.0, 1.0, 0.0);
        // cos = 1/sqrt(2) = 0.7071
        assert_eq!(similarity_percentage(&a, &b), 71);
    }

    #[test]
    fn test_dominant_trait_tie_break() {
        assert_eq!(dominant_trait(&TraitVector::new(0.5, 0.5, 0.0)), Dimension::Cognition);
        assert_eq!(dominant_trait(&TraitVector::NEUTRAL), Dimension::Cognition);
        assert_eq!(dominant_trait(&TraitVector::new(0.1, 0.45, 0.45)), Dimension::Empathy);
        assert_eq!(dominant_trait(&TraitVector::new(0.4, 0.1, 0.4)), Dimension::Cognition);
        assert_eq!(dominant_trait(&TraitVector::new(0.1, 0.2, 0.7)), Dimension::Pleasure);
        assert_eq!(dominant_trait(&TraitVector::new(0.2, 0.7, 0.1)), Dimension::Empathy);
    }

    #[test]
    fn test_persona_title() {
        assert_eq!(persona_title(&TraitVector::new(0.2, 0.1, 0.1)), "Rational Explorer");
        assert_eq!(persona_title(&TraitVector::new(0.5, 0.3, 0.2)), "Knowledge Seeker");
        assert_eq!(persona_title(&TraitVector::new(0.9, 0.1, 0.0)), "Logical Thinker");
        assert_eq!(persona_title(&TraitVector::new(0.1, 0.8, 0.1)), "Soul Perceiver");
        assert_eq!(persona_title(&TraitVector::new(0.0, 0.1, 1.0)), "Life Optimist");
    }
}
