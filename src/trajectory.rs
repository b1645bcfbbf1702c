use std::collections::HashMap;

use tracing::debug;

use crate::models::{DetectionRecord, Trajectory};

/// Groups detections by entity, dropping the unassigned id.
///
/// Trajectories come back in the order their entity was first seen in
/// `records`, and each one is sorted by frame with a stable sort so rows
/// sharing a frame keep their input order. Every later tie-break in the
/// pipeline relies on this ordering.
pub fn build_trajectories(records: &[DetectionRecord], unassigned_id: i64) -> Vec<Trajectory> {
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut trajectories: Vec<Trajectory> = Vec::new();
    let mut dropped = 0usize;

    for record in records {
        if record.entity_id == unassigned_id {
            dropped += 1;
            continue;
        }

        let slot = *index.entry(record.entity_id).or_insert_with(|| {
            trajectories.push(Trajectory {
                entity_id: record.entity_id,
                records: Vec::new(),
            });
            trajectories.len() - 1
        });
        trajectories[slot].records.push(record.clone());
    }

    for trajectory in trajectories.iter_mut() {
        trajectory.records.sort_by_key(|record| record.frame_index);
    }

    debug!(
        entities = trajectories.len(),
        unassigned_rows = dropped,
        "built trajectories"
    );
    trajectories
}
