use thiserror::Error;

pub type Result<T> = std::result::Result<T, SketchError>;

#[derive(Debug, Error)]
pub enum SketchError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed level file: {0}")]
    Level(#[from] serde_json::Error),
    #[error("unknown word [{0}]")]
    UnknownWord(String),
    #[error("level dimensions {width}x{height} are not playable")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("placement at {x},{y} lies outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    #[error("unknown element [{0}]")]
    UnknownElement(String),
    #[error("malformed formula [{0}]")]
    Formula(String),
    #[error("world generation worker failed: {0}")]
    Worker(String),
    #[error("could not install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}
