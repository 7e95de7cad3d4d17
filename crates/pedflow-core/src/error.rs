use crate::detect::UnknownFormatError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("Invalid grid: {message}")]
    InvalidGrid { message: String },

    #[error("Empty dataset: {what}")]
    EmptyDataset { what: &'static str },

    #[error("Malformed sample at line {line}: {message}")]
    MalformedSample { line: usize, message: String },

    #[error("Invalid frame window: begin frame {begin} is after end frame {end}")]
    InvalidFrameWindow { begin: i64, end: i64 },

    #[error(transparent)]
    UnknownFormat(#[from] UnknownFormatError),

    #[error("Invalid analysis config JSON: {message}")]
    InvalidConfigJson { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("Geometry XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Geometry contains no wall polygon")]
    NoWalls,

    #[error("Geometry <{element}> at line {line} is missing attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
        line: u32,
    },

    #[error("Geometry attribute `{attribute}` at line {line} is not a finite number: {value:?}")]
    InvalidCoordinate {
        attribute: &'static str,
        value: String,
        line: u32,
    },
}

impl Error {
    pub(crate) fn invalid_grid(message: impl Into<String>) -> Self {
        Self::InvalidGrid {
            message: message.into(),
        }
    }

    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedSample {
            line,
            message: message.into(),
        }
    }
}
