//! Error types.
use std::fmt::{Display, Formatter, Result as FmtResult};

/// The linkage cannot be solved at the requested position.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The displacement is out of the reachable range of the arms
    Unreachable {
        /// Requested wheel displacement
        displacement: f64,
    },
    /// Coincident points or a zero-length link
    Degenerate(&'static str),
    /// The upper and lower arm lines never intersect
    Parallel,
}

impl Display for GeometryError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Unreachable { displacement } => {
                write!(f, "displacement {displacement} is out of the reachable range")
            }
            Self::Degenerate(what) => write!(f, "degenerate linkage: {what}"),
            Self::Parallel => write!(f, "arm lines are parallel, no instant center"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Error of the library.
#[derive(Debug)]
pub enum Error {
    /// Malformed or missing configuration, length mismatches
    Config(String),
    /// Unsolvable geometry
    Geometry(GeometryError),
    /// Reading file error
    Io(std::io::Error),
    /// CSV format error
    Csv(csv::Error),
    /// Unexpected failure inside one optimization trial
    Trial {
        /// Restart index
        restart: usize,
        /// Start point of the trial
        start: Vec<f64>,
        /// Reason
        reason: String,
    },
}

impl Error {
    pub(crate) fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Return true if the error is a configuration error.
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Geometry(e) => write!(f, "geometry error: {e}"),
            Self::Io(e) => write!(f, "reading file error: {e}"),
            Self::Csv(e) => write!(f, "csv error: {e}"),
            Self::Trial { restart, start, reason } => {
                write!(f, "restart {restart} failed from {start:?}: {reason}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Geometry(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Config(_) | Self::Trial { .. } => None,
        }
    }
}

impl From<GeometryError> for Error {
    fn from(e: GeometryError) -> Self {
        Self::Geometry(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}
