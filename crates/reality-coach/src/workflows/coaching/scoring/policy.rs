use std::collections::BTreeMap;

use super::config::ScoringConfig;
use super::WeightedAnswer;
use crate::workflows::coaching::domain::Bucket;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StopDecision {
    pub(crate) should_stop: bool,
    pub(crate) reason: Option<String>,
}

impl StopDecision {
    fn stop(reason: String) -> Self {
        Self {
            should_stop: true,
            reason: Some(reason),
        }
    }

    fn keep_going() -> Self {
        Self {
            should_stop: false,
            reason: None,
        }
    }
}

/// Adaptive stop policy, evaluated after every answer. Rules fire in strict
/// order; the first match wins.
pub(crate) fn evaluate_stop(
    answers: &[WeightedAnswer],
    confidence: f32,
    config: &ScoringConfig,
) -> StopDecision {
    // 1. Hard fail: enough deal-breakers concentrated in one bucket.
    let mut deal_breakers_by_bucket: BTreeMap<Bucket, usize> = BTreeMap::new();
    for answer in answers
        .iter()
        .filter(|answer| answer.weight >= config.critical_weight && !answer.value)
    {
        *deal_breakers_by_bucket.entry(answer.bucket).or_insert(0) += 1;
    }
    for (bucket, count) in &deal_breakers_by_bucket {
        if *count >= config.deal_breaker_threshold {
            return StopDecision::stop(format!(
                "Hard fail: {count} deal-breakers in {}",
                bucket.label()
            ));
        }
    }

    // 2. Hard pass: every answered critical question passed, once the minimum
    // question count is reached. Vacuously satisfied with no critical answers.
    let all_criticals_passed = answers
        .iter()
        .filter(|answer| answer.weight >= config.critical_weight)
        .all(|answer| answer.value);
    if all_criticals_passed && answers.len() >= config.min_questions {
        return StopDecision::stop("Hard pass: all critical questions passed".to_string());
    }

    // 3. Confidence stop.
    if confidence >= config.confidence_threshold && answers.len() >= config.min_questions {
        let pct = (confidence * 100.0).round() as u32;
        return StopDecision::stop(format!("High confidence: {pct}%"));
    }

    // 4. Hard cap.
    if answers.len() >= config.max_questions {
        return StopDecision::stop("Maximum questions reached".to_string());
    }

    StopDecision::keep_going()
}
