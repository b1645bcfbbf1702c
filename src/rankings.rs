use crate::models::{EntityAggregate, PerformanceEntry};

// All rankings use `sort_by`, which is stable: entities with equal scores
// keep the order in which they were first seen in the input.

pub fn fatigue_ranking(aggregates: &[EntityAggregate], limit: usize) -> Vec<EntityAggregate> {
    let mut ranked = aggregates.to_vec();
    ranked.sort_by(|a, b| b.low_activity_frame_count.cmp(&a.low_activity_frame_count));
    ranked.truncate(limit);
    ranked
}

pub fn performance_entries(aggregates: &[EntityAggregate]) -> Vec<PerformanceEntry> {
    aggregates
        .iter()
        .map(|aggregate| PerformanceEntry {
            entity_id: aggregate.entity_id,
            frames_appeared: aggregate.frame_count,
            distance_moved: aggregate.total_movement,
        })
        .collect()
}

pub fn rank_by_distance(entries: &[PerformanceEntry], limit: usize) -> Vec<PerformanceEntry> {
    let mut ranked = entries.to_vec();
    ranked.sort_by(|a, b| b.distance_moved.total_cmp(&a.distance_moved));
    ranked.truncate(limit);
    ranked
}

pub fn rank_by_frames(entries: &[PerformanceEntry], limit: usize) -> Vec<PerformanceEntry> {
    let mut ranked = entries.to_vec();
    ranked.sort_by(|a, b| b.frames_appeared.cmp(&a.frames_appeared));
    ranked.truncate(limit);
    ranked
}
