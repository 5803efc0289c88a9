use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("expected a {expected} byte frame, got {actual} bytes")]
    WrongLength { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown trend policy \"{0}\" (expected strict or majority)")]
    UnknownPolicy(String),
    #[error("unsupported window capacity {0}")]
    UnsupportedWindow(usize),
}

#[derive(Debug, Error)]
pub enum DownlinkError {
    #[error("failed to open serial port: {0}")]
    Serial(#[from] serialport::Error),
    #[error("failed to write frame: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum FlightLogError {
    #[error("failed to read flight log: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: expected time and altitude columns")]
    MissingColumns { line: usize },
    #[error("line {line}: not a number: {value}")]
    InvalidNumber { line: usize, value: String },
    #[error("invalid noise standard deviation {0}")]
    InvalidNoise(f32),
}
