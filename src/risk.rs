use crate::config::{AnalysisConfig, InjurySelectionPolicy};
use crate::kinematics::count_below;
use crate::models::{EntityKinematics, InjuryCandidate};

/// Low-activity samples among the last `window` displacements (the whole
/// series when it is shorter).
pub fn trailing_stop_count(displacements: &[f64], window: usize, threshold: f64) -> usize {
    let start = displacements.len().saturating_sub(window);
    count_below(&displacements[start..], threshold)
}

/// Flags an entity that covered a lot of ground and then mostly stopped.
pub fn assess(kinematics: &EntityKinematics, config: &AnalysisConfig) -> Option<InjuryCandidate> {
    let total_movement = kinematics.aggregate.total_movement;
    let stops = trailing_stop_count(
        &kinematics.displacements,
        config.injury_window,
        config.low_activity_threshold,
    );

    if total_movement > config.injury_movement_threshold && stops >= config.injury_stop_threshold {
        Some(InjuryCandidate {
            entity_id: kinematics.aggregate.entity_id,
            total_movement,
            trailing_stop_count: stops,
        })
    } else {
        None
    }
}

/// Candidates in the order their entities were first seen.
pub fn injury_candidates(
    kinematics: &[EntityKinematics],
    config: &AnalysisConfig,
) -> Vec<InjuryCandidate> {
    kinematics
        .iter()
        .filter_map(|entity| assess(entity, config))
        .collect()
}

pub fn select_candidates(
    candidates: &[InjuryCandidate],
    policy: InjurySelectionPolicy,
) -> Vec<InjuryCandidate> {
    match policy {
        InjurySelectionPolicy::FirstEncountered => candidates.iter().take(1).cloned().collect(),
        InjurySelectionPolicy::All => candidates.to_vec(),
        InjurySelectionPolicy::MostSevere => {
            let mut best: Option<&InjuryCandidate> = None;
            for candidate in candidates {
                let replace = match best {
                    None => true,
                    Some(current) => {
                        candidate.trailing_stop_count > current.trailing_stop_count
                            || (candidate.trailing_stop_count == current.trailing_stop_count
                                && candidate.total_movement > current.total_movement)
                    }
                };
                if replace {
                    best = Some(candidate);
                }
            }
            best.into_iter().cloned().collect()
        }
    }
}
