use crate::models::{EntityAggregate, EntityKinematics, Trajectory};

/// Step distances between consecutive centers. The first element is always
/// 0, so the series has exactly one entry per record.
pub fn displacement_series(trajectory: &Trajectory) -> Vec<f64> {
    let mut series = Vec::with_capacity(trajectory.len());
    let mut previous = None;

    for center in trajectory.centers() {
        let step = match previous {
            Some(prev) => center.distance_to(&prev),
            None => 0.0,
        };
        series.push(step);
        previous = Some(center);
    }

    series
}

pub fn count_below(series: &[f64], threshold: f64) -> usize {
    series.iter().filter(|step| **step < threshold).count()
}

pub fn extract(trajectory: &Trajectory, low_activity_threshold: f64) -> EntityKinematics {
    let displacements = displacement_series(trajectory);
    let aggregate = EntityAggregate {
        entity_id: trajectory.entity_id,
        total_movement: displacements.iter().sum(),
        frame_count: displacements.len(),
        low_activity_frame_count: count_below(&displacements, low_activity_threshold),
    };

    EntityKinematics {
        aggregate,
        displacements,
    }
}
