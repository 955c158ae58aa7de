use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Format error at line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("Location ({row}, {col}) is outside the {rows}x{cols} grid")]
    Position {
        row: isize,
        col: isize,
        rows: usize,
        cols: usize,
    },

    #[error("No mutation left to move score {score} into [{lower}, {upper}]")]
    UnsatisfiableBound { score: f64, lower: f64, upper: f64 },

    #[error("Found {found} clusters, {required} required")]
    InsufficientClusters { found: usize, required: usize },

    #[error("No accessible location on the map")]
    NoAccessibleLocation,

    #[error("Layer {key}: {reason}")]
    Layer { key: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScenarioError {
    /// Whether the caller should discard the attempt and resample the map
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScenarioError::UnsatisfiableBound { .. }
                | ScenarioError::InsufficientClusters { .. }
                | ScenarioError::NoAccessibleLocation
        )
    }
}

pub type Result<T> = std::result::Result<T, ScenarioError>;
