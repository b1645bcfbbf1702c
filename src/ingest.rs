use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::IngestError;
use crate::models::{BoundingBox, DetectionRecord};

/// One row of the tracker export before validation. Any field may be
/// missing or unparseable; the capitalised column names of the tracker CSV are
/// accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDetection {
    #[serde(alias = "Frame", default, deserialize_with = "csv::invalid_option")]
    pub frame_index: Option<i64>,
    #[serde(alias = "Player ID", default, deserialize_with = "csv::invalid_option")]
    pub entity_id: Option<i64>,
    #[serde(alias = "X1", default, deserialize_with = "csv::invalid_option")]
    pub x1: Option<f64>,
    #[serde(alias = "Y1", default, deserialize_with = "csv::invalid_option")]
    pub y1: Option<f64>,
    #[serde(alias = "X2", default, deserialize_with = "csv::invalid_option")]
    pub x2: Option<f64>,
    #[serde(alias = "Y2", default, deserialize_with = "csv::invalid_option")]
    pub y2: Option<f64>,
}

#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub records: Vec<DetectionRecord>,
    pub rejected: Vec<IngestError>,
}

impl IngestOutcome {
    pub fn rows_read(&self) -> usize {
        self.records.len() + self.rejected.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    fn push(&mut self, result: Result<DetectionRecord, IngestError>) {
        match result {
            Ok(record) => self.records.push(record),
            Err(err) => {
                warn!(error = %err, "rejecting detection row");
                self.rejected.push(err);
            }
        }
    }
}

pub fn load_csv(path: &Path) -> Result<IngestOutcome, IngestError> {
    let reader = reader_builder().from_path(path)?;
    let outcome = read_all(reader)?;
    debug!(
        path = %path.display(),
        rows = outcome.rows_read(),
        rejected = outcome.rejected_count(),
        "loaded detection table"
    );
    Ok(outcome)
}

pub fn read_detections<R: Read>(input: R) -> Result<IngestOutcome, IngestError> {
    read_all(reader_builder().from_reader(input))
}

/// Validates rows that did not come from CSV. Lines are 1-based row positions.
pub fn validate_rows(rows: &[RawDetection]) -> IngestOutcome {
    let mut outcome = IngestOutcome::default();
    for (index, raw) in rows.iter().enumerate() {
        outcome.push(validate_row(index as u64 + 1, raw));
    }
    outcome
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.trim(csv::Trim::All).flexible(true);
    builder
}

fn read_all<R: Read>(mut reader: csv::Reader<R>) -> Result<IngestOutcome, IngestError> {
    let headers = reader.headers()?.clone();
    let mut outcome = IngestOutcome::default();

    for (index, result) in reader.records().enumerate() {
        // Header is line 1.
        let fallback_line = index as u64 + 2;
        let record = match result {
            Ok(record) => record,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                let line = err
                    .position()
                    .map(|position| position.line())
                    .unwrap_or(fallback_line);
                outcome.push(Err(IngestError::MalformedRecord {
                    line,
                    reason: err.to_string(),
                }));
                continue;
            }
        };
        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or(fallback_line);

        let row = record
            .deserialize::<RawDetection>(Some(&headers))
            .map_err(|err| IngestError::MalformedRecord {
                line,
                reason: err.to_string(),
            })
            .and_then(|raw| validate_row(line, &raw));
        outcome.push(row);
    }

    Ok(outcome)
}

fn validate_row(line: u64, raw: &RawDetection) -> Result<DetectionRecord, IngestError> {
    let malformed = |reason: String| IngestError::MalformedRecord { line, reason };

    let frame = raw
        .frame_index
        .ok_or_else(|| malformed("missing or malformed field frame_index".to_string()))?;
    let frame_index =
        u64::try_from(frame).map_err(|_| malformed(format!("negative frame_index {frame}")))?;
    let entity_id = raw
        .entity_id
        .ok_or_else(|| malformed("missing or malformed field entity_id".to_string()))?;

    let coordinate = |name: &str, value: Option<f64>| -> Result<f64, IngestError> {
        match value {
            None => Err(malformed(format!("missing or malformed field {name}"))),
            Some(v) if !v.is_finite() => Err(malformed(format!("non-finite {name} ({v})"))),
            Some(v) => Ok(v),
        }
    };

    Ok(DetectionRecord {
        frame_index,
        entity_id,
        bbox: BoundingBox {
            x1: coordinate("x1", raw.x1)?,
            y1: coordinate("y1", raw.y1)?,
            x2: coordinate("x2", raw.x2)?,
            y2: coordinate("y2", raw.y2)?,
        },
    })
}
