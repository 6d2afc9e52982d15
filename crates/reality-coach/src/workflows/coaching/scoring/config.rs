use serde::{Deserialize, Serialize};

use crate::workflows::coaching::domain::Bucket;

/// Relative weight of each scored bucket in the overall fit score. The
/// standard set sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketWeights {
    pub personality: u32,
    pub daily: u32,
    pub commitment: u32,
    pub lifestyle: u32,
}

impl BucketWeights {
    /// `None` for the unscored buckets.
    pub const fn weight_for(self, bucket: Bucket) -> Option<u32> {
        match bucket {
            Bucket::Personality => Some(self.personality),
            Bucket::Daily => Some(self.daily),
            Bucket::Commitment => Some(self.commitment),
            Bucket::Lifestyle => Some(self.lifestyle),
            Bucket::Entry | Bucket::Unsexy => None,
        }
    }
}

/// Per-bucket score floor below which a mismatch finding is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketThresholds {
    pub personality: u8,
    pub daily: u8,
    pub commitment: u8,
    pub lifestyle: u8,
}

impl BucketThresholds {
    pub const fn threshold_for(self, bucket: Bucket) -> Option<u8> {
        match bucket {
            Bucket::Personality => Some(self.personality),
            Bucket::Daily => Some(self.daily),
            Bucket::Commitment => Some(self.commitment),
            Bucket::Lifestyle => Some(self.lifestyle),
            Bucket::Entry | Bucket::Unsexy => None,
        }
    }
}

/// Immutable dial set for the scoring engine and the adaptive stop policy.
/// Injected rather than compiled in so tests can override individual dials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub bucket_weights: BucketWeights,
    pub mismatch_thresholds: BucketThresholds,
    /// Questions at or above this weight are critical: a "no" doubles the
    /// penalty and counts as a deal-breaker.
    pub critical_weight: u8,
    /// Deal-breaker count (per bucket for the hard fail, session-wide for the
    /// mismatch finding) that triggers.
    pub deal_breaker_threshold: usize,
    pub confidence_threshold: f32,
    /// Fraction of the accumulated weight treated as the saturation point of
    /// the confidence estimate.
    pub confidence_divisor: f32,
    pub min_questions: usize,
    pub max_questions: usize,
    /// Fit scores at or above this are green.
    pub green_floor: u8,
    /// Fit scores at or above this (and below the green floor) are amber.
    pub amber_floor: u8,
}

impl ScoringConfig {
    /// The production dial set.
    pub fn standard() -> Self {
        Self {
            bucket_weights: BucketWeights {
                personality: 35,
                daily: 25,
                commitment: 20,
                lifestyle: 20,
            },
            mismatch_thresholds: BucketThresholds {
                personality: 60,
                daily: 50,
                commitment: 40,
                lifestyle: 50,
            },
            critical_weight: 8,
            deal_breaker_threshold: 3,
            confidence_threshold: 0.9,
            confidence_divisor: 0.8,
            min_questions: 12,
            max_questions: 20,
            green_floor: 75,
            amber_floor: 50,
        }
    }
}
