use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::kinematics;
use crate::models::{
    DetectionRecord, EntityAggregate, EntityKinematics, InjuryCandidate, MatchSummary,
    PerformanceEntry, VisualizationRequest,
};
use crate::rankings;
use crate::report;
use crate::risk;

/// Everything one run derives from a detection table.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub kinematics: Vec<EntityKinematics>,
    pub fatigue: Vec<EntityAggregate>,
    pub performance: Vec<PerformanceEntry>,
    pub top_distance: Vec<PerformanceEntry>,
    pub top_frames: Vec<PerformanceEntry>,
    pub injury_candidates: Vec<InjuryCandidate>,
    pub reported_injuries: Vec<InjuryCandidate>,
    pub summary: MatchSummary,
    pub requests: Vec<VisualizationRequest>,
}

impl AnalysisReport {
    pub fn entity_count(&self) -> usize {
        self.kinematics.len()
    }

    pub fn require_entities(&self) -> Result<(), AnalysisError> {
        if self.kinematics.is_empty() {
            Err(AnalysisError::EmptyTrajectoryTable)
        } else {
            Ok(())
        }
    }
}

pub fn analyze(records: &[DetectionRecord], config: &AnalysisConfig) -> AnalysisReport {
    let trajectories = crate::trajectory::build_trajectories(records, config.unassigned_entity_id);

    let kinematics: Vec<EntityKinematics> = trajectories
        .iter()
        .map(|trajectory| kinematics::extract(trajectory, config.low_activity_threshold))
        .collect();
    let aggregates: Vec<EntityAggregate> = kinematics
        .iter()
        .map(|entity| entity.aggregate.clone())
        .collect();

    let fatigue = rankings::fatigue_ranking(&aggregates, config.ranking_limit);
    let performance = rankings::performance_entries(&aggregates);
    let top_distance = rankings::rank_by_distance(&performance, config.ranking_limit);
    let top_frames = rankings::rank_by_frames(&performance, config.ranking_limit);

    let injury_candidates = risk::injury_candidates(&kinematics, config);
    let reported_injuries = risk::select_candidates(&injury_candidates, config.injury_policy);
    for candidate in &injury_candidates {
        debug!(
            entity_id = candidate.entity_id,
            total_movement = candidate.total_movement,
            trailing_stops = candidate.trailing_stop_count,
            "injury candidate flagged"
        );
    }

    let summary = report::match_summary(&performance);

    let mut analysis = AnalysisReport {
        kinematics,
        fatigue,
        performance,
        top_distance,
        top_frames,
        injury_candidates,
        reported_injuries,
        summary,
        requests: Vec::new(),
    };
    analysis.requests = report::visualization_requests(&analysis, config);

    info!(
        entities = analysis.entity_count(),
        injury_candidates = analysis.injury_candidates.len(),
        requests = analysis.requests.len(),
        "analysis complete"
    );
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InjurySelectionPolicy;
    use crate::models::{BoundingBox, ChartKind};

    fn at(frame_index: u64, entity_id: i64, x: f64) -> DetectionRecord {
        DetectionRecord {
            frame_index,
            entity_id,
            bbox: BoundingBox {
                x1: x,
                y1: 0.0,
                x2: x,
                y2: 0.0,
            },
        }
    }

    /// `frames` records whose centers move in equal steps to cover `distance`.
    fn walk(entity_id: i64, frames: usize, distance: f64) -> Vec<DetectionRecord> {
        let step = if frames > 1 {
            distance / (frames - 1) as f64
        } else {
            0.0
        };
        (0..frames)
            .map(|i| at(i as u64, entity_id, step * i as f64))
            .collect()
    }

    fn three_entity_table() -> Vec<DetectionRecord> {
        let mut records = Vec::new();
        records.extend(walk(1, 5, 10.0));
        records.push(at(0, -1, 0.0));
        records.extend(walk(2, 40, 500.0));
        records.push(at(3, -1, 99.0));
        records.extend(walk(3, 2, 1.0));
        records
    }

    #[test]
    fn end_to_end_three_entities() {
        let analysis = analyze(&three_entity_table(), &AnalysisConfig::default());

        assert_eq!(analysis.summary.entity_count, 3);
        let best = analysis.summary.best_performer.as_ref().unwrap();
        assert_eq!(best.entity_id, 2);
        assert_eq!(best.frames_appeared, 40);
        assert_eq!(analysis.top_frames[0].entity_id, 2);
        assert_eq!(analysis.summary.worst_performer.as_ref().unwrap().entity_id, 3);
        assert!((analysis.summary.mean_frame_count - 47.0 / 3.0).abs() < 1e-9);
        assert!((analysis.summary.mean_distance - 511.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn best_performer_is_head_of_distance_ranking() {
        let analysis = analyze(&three_entity_table(), &AnalysisConfig::default());
        assert_eq!(
            analysis.summary.best_performer.as_ref(),
            analysis.top_distance.first()
        );
    }

    #[test]
    fn huge_finite_coordinates_do_not_poison_rankings() {
        let mut records = vec![at(0, 5, 1e308), at(1, 5, 1e308)];
        records.extend(walk(100, 2, 10.0));
        records.extend(walk(101, 2, 20.0));
        records.extend(walk(102, 2, 30.0));

        let analysis = analyze(&records, &AnalysisConfig::default());
        assert_eq!(analysis.kinematics[0].displacements, vec![0.0, 0.0]);
        assert!(analysis
            .kinematics
            .iter()
            .flat_map(|entity| entity.displacements.iter())
            .all(|step| step.is_finite() && *step >= 0.0));

        let ids: Vec<i64> = analysis.top_distance.iter().map(|e| e.entity_id).collect();
        assert_eq!(ids, vec![102, 101, 100, 5]);
        assert_eq!(analysis.summary.best_performer.as_ref().unwrap().entity_id, 102);
        assert_eq!(analysis.summary.worst_performer.as_ref().unwrap().entity_id, 5);
    }

    #[test]
    fn requests_come_in_report_order_without_injury() {
        let analysis = analyze(&three_entity_table(), &AnalysisConfig::default());
        let kinds: Vec<ChartKind> = analysis.requests.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ChartKind::Fatigue,
                ChartKind::Distance,
                ChartKind::FramePresence,
                ChartKind::MatchSummary,
            ]
        );
        assert!(analysis.injury_candidates.is_empty());
    }

    #[test]
    fn injury_chart_is_inserted_before_summary() {
        let mut records = three_entity_table();
        // runs 200 units in 10 frames, then stands still for 25
        records.extend(walk(7, 11, 200.0));
        records.extend((11..36).map(|frame| at(frame, 7, 200.0)));

        let analysis = analyze(&records, &AnalysisConfig::default());
        assert_eq!(analysis.injury_candidates.len(), 1);
        let kinds: Vec<ChartKind> = analysis.requests.iter().map(|r| r.kind).collect();
        assert_eq!(kinds[3], ChartKind::Injury);
        assert_eq!(kinds[4], ChartKind::MatchSummary);
        assert_eq!(analysis.requests[3].categories, vec!["7".to_string()]);
        assert_eq!(analysis.requests[3].values, vec![25.0]);
    }

    #[test]
    fn policy_controls_reported_injuries_only() {
        let mut records = Vec::new();
        records.extend(walk(1, 11, 200.0));
        records.extend((11..32).map(|frame| at(frame, 1, 200.0)));
        records.extend(walk(2, 11, 300.0));
        records.extend((11..40).map(|frame| at(frame, 2, 300.0)));

        let config = AnalysisConfig {
            injury_policy: InjurySelectionPolicy::MostSevere,
            ..AnalysisConfig::default()
        };
        let analysis = analyze(&records, &config);
        assert_eq!(analysis.injury_candidates.len(), 2);
        assert_eq!(analysis.reported_injuries.len(), 1);
        assert_eq!(analysis.reported_injuries[0].entity_id, 2);

        let first = analyze(&records, &AnalysisConfig::default());
        assert_eq!(first.reported_injuries[0].entity_id, 1);
    }

    #[test]
    fn only_unassigned_rows_produce_no_requests() {
        let records = vec![at(0, -1, 0.0), at(1, -1, 5.0)];
        let analysis = analyze(&records, &AnalysisConfig::default());
        assert!(analysis.requests.is_empty());
        assert_eq!(analysis.summary.entity_count, 0);
        assert_eq!(analysis.summary.best_performer, None);
        assert_eq!(
            analysis.require_entities(),
            Err(AnalysisError::EmptyTrajectoryTable)
        );
    }

    #[test]
    fn empty_input_is_valid() {
        let analysis = analyze(&[], &AnalysisConfig::default());
        assert!(analysis.requests.is_empty());
        assert_eq!(analysis.summary.mean_distance, 0.0);
    }
}
