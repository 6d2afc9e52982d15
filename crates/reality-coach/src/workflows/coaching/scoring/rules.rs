use super::config::ScoringConfig;
use super::{BucketScores, FitColor, WeightedAnswer};
use crate::workflows::coaching::domain::Bucket;

#[derive(Debug, Default, Clone, Copy)]
struct BucketTally {
    total: i64,
    score: i64,
}

impl BucketTally {
    fn absorb(&mut self, answer: &WeightedAnswer, config: &ScoringConfig) {
        let weight = i64::from(answer.weight);
        self.total += weight;

        // Yes = +weight, no = -weight; a "no" on a critical question costs double.
        let penalty = if answer.weight >= config.critical_weight && !answer.value {
            2
        } else {
            1
        };
        self.score += if answer.value { weight } else { -weight * penalty };
    }

    fn normalized(self) -> u8 {
        if self.total == 0 {
            // Neutral when the bucket has no answers yet.
            return 50;
        }

        let normalized = ((self.score as f64 / self.total as f64) + 1.0) * 50.0;
        normalized.round().clamp(0.0, 100.0) as u8
    }
}

pub(crate) fn bucket_scores(answers: &[WeightedAnswer], config: &ScoringConfig) -> BucketScores {
    let mut personality = BucketTally::default();
    let mut daily = BucketTally::default();
    let mut commitment = BucketTally::default();
    let mut lifestyle = BucketTally::default();

    for answer in answers {
        match answer.bucket {
            Bucket::Personality => personality.absorb(answer, config),
            Bucket::Daily => daily.absorb(answer, config),
            Bucket::Commitment => commitment.absorb(answer, config),
            Bucket::Lifestyle => lifestyle.absorb(answer, config),
            // Entry and unsexy answers inform questioning and deal-breaker
            // detection but carry no bucket score.
            Bucket::Entry | Bucket::Unsexy => {}
        }
    }

    BucketScores {
        personality: personality.normalized(),
        daily: daily.normalized(),
        commitment: commitment.normalized(),
        lifestyle: lifestyle.normalized(),
    }
}

pub(crate) fn fit_score(scores: &BucketScores, config: &ScoringConfig) -> u8 {
    let mut weighted = 0f64;
    let mut total_weight = 0f64;

    for bucket in Bucket::SCORED {
        let score = scores
            .score_for(bucket)
            .expect("scored bucket always has a score");
        let weight = config
            .bucket_weights
            .weight_for(bucket)
            .expect("scored bucket always has a weight");
        weighted += f64::from(score) * f64::from(weight);
        total_weight += f64::from(weight);
    }

    (weighted / total_weight).round() as u8
}

pub(crate) fn color_for(fit_score: u8, config: &ScoringConfig) -> FitColor {
    if fit_score >= config.green_floor {
        FitColor::Green
    } else if fit_score >= config.amber_floor {
        FitColor::Amber
    } else {
        FitColor::Red
    }
}

/// Per-bucket findings in scored-bucket order, then the session-wide
/// deal-breaker finding. Each condition fires at most once.
pub(crate) fn mismatches(
    scores: &BucketScores,
    answers: &[WeightedAnswer],
    config: &ScoringConfig,
) -> Vec<String> {
    let mut findings = Vec::new();

    for bucket in Bucket::SCORED {
        let score = scores
            .score_for(bucket)
            .expect("scored bucket always has a score");
        let threshold = config
            .mismatch_thresholds
            .threshold_for(bucket)
            .expect("scored bucket always has a threshold");
        if score < threshold {
            findings.push(format!(
                "{} fit is low ({}%)",
                bucket.display_name(),
                score
            ));
        }
    }

    let deal_breakers = answers
        .iter()
        .filter(|answer| answer.weight >= config.critical_weight && !answer.value)
        .count();
    if deal_breakers >= config.deal_breaker_threshold {
        findings.push(format!(
            "Multiple deal-breaker questions answered \"no\" ({deal_breakers})"
        ));
    }

    findings
}

/// 0 with no answers; otherwise the accumulated weight over its own
/// `confidence_divisor` fraction, capped at 1. The answered and possible
/// pools are the same sum, so this saturates as soon as any weight lands.
pub(crate) fn confidence(answers: &[WeightedAnswer], config: &ScoringConfig) -> f32 {
    if answers.is_empty() {
        return 0.0;
    }

    let answered_weight: f32 = answers.iter().map(|answer| f32::from(answer.weight)).sum();
    let total_possible_weight = answered_weight;

    (answered_weight / (total_possible_weight * config.confidence_divisor)).min(1.0)
}
