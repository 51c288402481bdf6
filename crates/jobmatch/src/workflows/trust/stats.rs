use super::domain::{EvaluationRecord, TrustLevel, TrustStats};
use crate::workflows::identity::UserId;

const REHIRE_THRESHOLD: u8 = 4;

/// Level thresholds, checked top down: (minimum average, minimum evaluations).
const LEVELS: [(TrustLevel, f64, usize); 3] = [
    (TrustLevel::VeryHigh, 4.5, 10),
    (TrustLevel::High, 4.0, 5),
    (TrustLevel::Medium, 3.5, 0),
];

pub fn trust_level(average_rating: f64, total_evaluations: usize) -> TrustLevel {
    LEVELS
        .iter()
        .find(|(_, min_average, min_count)| {
            average_rating >= *min_average && total_evaluations >= *min_count
        })
        .map(|(level, _, _)| *level)
        .unwrap_or(TrustLevel::Low)
}

/// Aggregate the evaluations received by `user_id`; records about other users are ignored.
pub fn compute_stats(user_id: &UserId, evaluations: &[EvaluationRecord]) -> TrustStats {
    let received: Vec<&EvaluationRecord> = evaluations
        .iter()
        .filter(|record| &record.evaluated_id == user_id)
        .collect();
    if received.is_empty() {
        return TrustStats::empty();
    }

    let total = received.len();
    let sum: u32 = received
        .iter()
        .map(|record| u32::from(record.rating.value()))
        .sum();
    let rehires = received
        .iter()
        .filter(|record| record.rating.value() >= REHIRE_THRESHOLD)
        .count();

    let average_rating = f64::from(sum) / total as f64;
    TrustStats {
        average_rating,
        total_evaluations: total,
        rehire_rate: 100.0 * rehires as f64 / total as f64,
        last_work_date: received.iter().map(|record| record.created_at).max(),
        trust_level: trust_level(average_rating, total),
    }
}
