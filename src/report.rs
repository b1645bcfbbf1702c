use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::analysis::AnalysisReport;
use crate::config::{AnalysisConfig, InjurySelectionPolicy};
use crate::models::{
    ChartKind, InjuryCandidate, MatchSummary, Orientation, PerformanceEntry, VisualizationRequest,
};

const ENTITY_AXIS_LABEL: &str = "Player ID";

/// Match-wide statistics over the full performance population. Ties for
/// best and worst go to the entity seen first.
pub fn match_summary(entries: &[PerformanceEntry]) -> MatchSummary {
    if entries.is_empty() {
        return MatchSummary {
            entity_count: 0,
            mean_frame_count: 0.0,
            mean_distance: 0.0,
            best_performer: None,
            worst_performer: None,
        };
    }

    let count = entries.len() as f64;
    let total_frames: usize = entries.iter().map(|entry| entry.frames_appeared).sum();
    let total_distance: f64 = entries.iter().map(|entry| entry.distance_moved).sum();

    let mut best = &entries[0];
    let mut worst = &entries[0];
    for entry in entries.iter().skip(1) {
        if entry.distance_moved.total_cmp(&best.distance_moved).is_gt() {
            best = entry;
        }
        if entry.distance_moved.total_cmp(&worst.distance_moved).is_lt() {
            worst = entry;
        }
    }

    MatchSummary {
        entity_count: entries.len(),
        mean_frame_count: total_frames as f64 / count,
        mean_distance: total_distance / count,
        best_performer: Some(best.clone()),
        worst_performer: Some(worst.clone()),
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One chart per report section, in fixed order. Nothing is produced for an
/// empty run, and the injury chart is left out when no entity was flagged.
pub fn visualization_requests(
    analysis: &AnalysisReport,
    config: &AnalysisConfig,
) -> Vec<VisualizationRequest> {
    if analysis.entity_count() == 0 {
        return Vec::new();
    }

    let limit = config.ranking_limit;
    let mut requests = vec![
        bar_chart(
            ChartKind::Fatigue,
            format!("Top {limit} Players with Fatigue Indicators"),
            "Low Activity Frames",
            analysis
                .fatigue
                .iter()
                .map(|a| (a.entity_id, a.low_activity_frame_count as f64)),
        ),
        bar_chart(
            ChartKind::Distance,
            format!("Top {limit} Players by Distance Moved"),
            "Distance Moved",
            analysis
                .top_distance
                .iter()
                .map(|e| (e.entity_id, e.distance_moved)),
        ),
        bar_chart(
            ChartKind::FramePresence,
            format!("Top {limit} Players by Frame Presence"),
            "Frames Appeared",
            analysis
                .top_frames
                .iter()
                .map(|e| (e.entity_id, e.frames_appeared as f64)),
        ),
    ];

    if let Some(request) = injury_chart(&analysis.reported_injuries, config.injury_window) {
        requests.push(request);
    }
    requests.push(summary_chart(&analysis.summary));
    requests
}

fn bar_chart(
    kind: ChartKind,
    title: String,
    y_label: &str,
    bars: impl Iterator<Item = (i64, f64)>,
) -> VisualizationRequest {
    let (categories, values) = bars.map(|(id, value)| (id.to_string(), value)).unzip();
    VisualizationRequest {
        kind,
        orientation: Orientation::Vertical,
        title,
        x_label: ENTITY_AXIS_LABEL.to_string(),
        y_label: y_label.to_string(),
        categories,
        values,
        value_axis_max: None,
        annotations: Vec::new(),
    }
}

fn injury_chart(candidates: &[InjuryCandidate], window: usize) -> Option<VisualizationRequest> {
    if candidates.is_empty() {
        return None;
    }

    let mut request = bar_chart(
        ChartKind::Injury,
        "Potential Injury Detected".to_string(),
        &format!("Stoppage in Last {window} Frames"),
        candidates
            .iter()
            .map(|c| (c.entity_id, c.trailing_stop_count as f64)),
    );
    request.value_axis_max = Some(window as f64);
    request.annotations = candidates
        .iter()
        .map(|c| format!("{} stops", c.trailing_stop_count))
        .collect();
    Some(request)
}

fn summary_chart(summary: &MatchSummary) -> VisualizationRequest {
    let mut categories = vec![
        "Total Players".to_string(),
        "Avg Frames".to_string(),
        "Avg Distance".to_string(),
    ];
    let mut values = vec![
        summary.entity_count as f64,
        round2(summary.mean_frame_count),
        round2(summary.mean_distance),
    ];

    if let Some(best) = &summary.best_performer {
        categories.push(format!("Top Player (ID {})", best.entity_id));
        values.push(round2(best.distance_moved));
    }
    if let Some(worst) = &summary.worst_performer {
        categories.push(format!("Lowest Player (ID {})", worst.entity_id));
        values.push(round2(worst.distance_moved));
    }

    VisualizationRequest {
        kind: ChartKind::MatchSummary,
        orientation: Orientation::Horizontal,
        title: "Match Statistics Summary".to_string(),
        x_label: "Value".to_string(),
        y_label: String::new(),
        categories,
        values,
        value_axis_max: None,
        annotations: Vec::new(),
    }
}

/// The JSON document handed to the rendering side.
#[derive(Debug, Serialize)]
pub struct ReportEnvelope<'a> {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source: &'a str,
    pub rows_read: usize,
    pub rejected_records: usize,
    pub injury_policy: InjurySelectionPolicy,
    pub summary: &'a MatchSummary,
    pub injury_candidates: &'a [InjuryCandidate],
    pub requests: &'a [VisualizationRequest],
}

impl<'a> ReportEnvelope<'a> {
    pub fn new(
        analysis: &'a AnalysisReport,
        config: &AnalysisConfig,
        source: &'a str,
        rows_read: usize,
        rejected_records: usize,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            source,
            rows_read,
            rejected_records,
            injury_policy: config.injury_policy,
            summary: &analysis.summary,
            injury_candidates: &analysis.injury_candidates,
            requests: &analysis.requests,
        }
    }
}

pub fn build_markdown(
    source: &str,
    generated_at: DateTime<Utc>,
    rejected_records: usize,
    analysis: &AnalysisReport,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Match Movement Report");
    let _ = writeln!(
        output,
        "Generated from {} at {}",
        source,
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    if rejected_records > 0 {
        let _ = writeln!(output, "{rejected_records} malformed detection rows were skipped.");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Match Statistics");
    let summary = &analysis.summary;
    if summary.entity_count == 0 {
        let _ = writeln!(output, "No tracked entities found.");
        return output;
    }
    let _ = writeln!(output, "- Total players: {}", summary.entity_count);
    let _ = writeln!(output, "- Avg frames: {:.2}", summary.mean_frame_count);
    let _ = writeln!(output, "- Avg distance: {:.2}", summary.mean_distance);
    if let Some(best) = &summary.best_performer {
        let _ = writeln!(
            output,
            "- Top player: {} ({:.2})",
            best.entity_id, best.distance_moved
        );
    }
    if let Some(worst) = &summary.worst_performer {
        let _ = writeln!(
            output,
            "- Lowest player: {} ({:.2})",
            worst.entity_id, worst.distance_moved
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Fatigue Indicators");
    for aggregate in &analysis.fatigue {
        let _ = writeln!(
            output,
            "- Player {}: {} low activity frames of {} (moved {:.2})",
            aggregate.entity_id,
            aggregate.low_activity_frame_count,
            aggregate.frame_count,
            aggregate.total_movement
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Distance Moved");
    for entry in &analysis.top_distance {
        let _ = writeln!(output, "- Player {}: {:.2}", entry.entity_id, entry.distance_moved);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Frame Presence");
    let _ = writeln!(
        output,
        "Showing {} of {} players.",
        analysis.top_frames.len(),
        analysis.performance.len()
    );
    for entry in &analysis.top_frames {
        let _ = writeln!(output, "- Player {}: {} frames", entry.entity_id, entry.frames_appeared);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Potential Injuries");
    if analysis.reported_injuries.is_empty() {
        let _ = writeln!(output, "No players flagged.");
    } else {
        for candidate in &analysis.reported_injuries {
            let _ = writeln!(
                output,
                "- Player {}: {} stops near the end after moving {:.2}",
                candidate.entity_id,
                candidate.trailing_stop_count,
                round2(candidate.total_movement)
            );
        }
    }

    output
}
