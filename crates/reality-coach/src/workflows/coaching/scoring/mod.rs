mod config;
mod policy;
mod rules;

pub use config::{BucketThresholds, BucketWeights, ScoringConfig};

use serde::{Deserialize, Serialize};

use super::domain::Bucket;

/// Stateless engine turning a session's accumulated answers into scores, a
/// color verdict, mismatch findings, and a stop decision. Pure: no side
/// effects, no storage access.
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, answers: &[WeightedAnswer]) -> ScoringResult {
        let bucket_scores = rules::bucket_scores(answers, &self.config);
        let fit_score = rules::fit_score(&bucket_scores, &self.config);
        let color = rules::color_for(fit_score, &self.config);
        let mismatches = rules::mismatches(&bucket_scores, answers, &self.config);
        let confidence = rules::confidence(answers, &self.config);
        let stop = policy::evaluate_stop(answers, confidence, &self.config);

        ScoringResult {
            fit_score,
            color,
            bucket_scores,
            mismatches,
            confidence,
            should_stop: stop.should_stop,
            stop_reason: stop.reason,
        }
    }
}

/// Scoring input: one answer joined with its question's bucket and weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightedAnswer {
    pub bucket: Bucket,
    pub weight: u8,
    pub value: bool,
}

/// Traffic-light verdict tier derived from the fit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitColor {
    Green,
    Amber,
    Red,
}

impl FitColor {
    pub const fn label(self) -> &'static str {
        match self {
            FitColor::Green => "green",
            FitColor::Amber => "amber",
            FitColor::Red => "red",
        }
    }
}

/// One percentage per scored bucket. Unanswered buckets sit at the neutral 50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketScores {
    pub personality: u8,
    pub daily: u8,
    pub commitment: u8,
    pub lifestyle: u8,
}

impl BucketScores {
    /// `None` for the unscored buckets.
    pub const fn score_for(self, bucket: Bucket) -> Option<u8> {
        match bucket {
            Bucket::Personality => Some(self.personality),
            Bucket::Daily => Some(self.daily),
            Bucket::Commitment => Some(self.commitment),
            Bucket::Lifestyle => Some(self.lifestyle),
            Bucket::Entry | Bucket::Unsexy => None,
        }
    }

    pub const fn neutral() -> Self {
        Self {
            personality: 50,
            daily: 50,
            commitment: 50,
            lifestyle: 50,
        }
    }
}

/// Snapshot of a session's standing after an answer: scores, findings, and
/// the adaptive stop decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub fit_score: u8,
    pub color: FitColor,
    pub bucket_scores: BucketScores,
    pub mismatches: Vec<String>,
    pub confidence: f32,
    pub should_stop: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}
