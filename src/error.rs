use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Error, Debug, PartialEq)]
pub enum AnalysisError {
    #[error("no tracked entities remain after filtering unassigned detections")]
    EmptyTrajectoryTable,
}
