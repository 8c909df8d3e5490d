use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Level not found: {0}")]
    LevelNotFound(u32),

    #[error("Level {0} has no rooms")]
    NoRooms(u32),

    #[error("Provider call failed: {0}")]
    Provider(String),

    #[error("Malformed area record: {0}")]
    Decode(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Invalid map data at row {row}: {message}")]
    InvalidMapData { row: usize, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
