use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Halves before adding so finite corners always give a finite center.
    pub fn center(&self) -> Point {
        Point {
            x: self.x1 / 2.0 + self.x2 / 2.0,
            y: self.y1 / 2.0 + self.y2 / 2.0,
        }
    }
}

/// One tracked box in one frame, as handed over by the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub frame_index: u64,
    pub entity_id: i64,
    pub bbox: BoundingBox,
}

/// Records of a single entity ordered by frame. Never empty.
#[derive(Debug, Clone)]
pub struct Trajectory {
    pub entity_id: i64,
    pub records: Vec<DetectionRecord>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn centers(&self) -> impl Iterator<Item = Point> + '_ {
        self.records.iter().map(|record| record.bbox.center())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityAggregate {
    pub entity_id: i64,
    pub total_movement: f64,
    pub frame_count: usize,
    pub low_activity_frame_count: usize,
}

/// Aggregate plus the displacement series it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityKinematics {
    pub aggregate: EntityAggregate,
    pub displacements: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceEntry {
    pub entity_id: i64,
    pub frames_appeared: usize,
    pub distance_moved: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InjuryCandidate {
    pub entity_id: i64,
    pub total_movement: f64,
    pub trailing_stop_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub entity_count: usize,
    pub mean_frame_count: f64,
    pub mean_distance: f64,
    pub best_performer: Option<PerformanceEntry>,
    pub worst_performer: Option<PerformanceEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Fatigue,
    Distance,
    FramePresence,
    Injury,
    MatchSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// What the renderer should draw. Categories and values are parallel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationRequest {
    pub kind: ChartKind,
    pub orientation: Orientation,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_axis_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
}
