//! Everything that can stop a single generator run.
//! None of these errors are transient, so nothing is retried:
//! the run is aborted and the error is reported as is.

use std::{error::Error as StdError, fmt, io};

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The source raster is empty or its buffer does not match its dimensions.
    InvalidInput(String),

    /// An option holds a value the pipeline cannot work with.
    InvalidOptions {
        option: &'static str,
        reason: String,
    },

    /// Dynamic normalization was requested, but every sample
    /// holds the same distance, so there is no range to rescale.
    DegenerateField {
        distance: f32,
    },

    /// A field dimension does not fit into the single-byte header.
    DimensionOutOfRange {
        dimension: &'static str,
        value: u32,
    },

    /// A field file does not contain exactly `2 + width * height` bytes.
    SizeMismatch {
        expected: usize,
        actual: usize,
    },

    /// Reading the source or writing the destination failed.
    Io {
        stage: &'static str,
        source: io::Error,
    },

    /// The source image could not be decoded.
    #[cfg(feature = "piston_image")]
    Image(image::ImageError),
}

impl Error {
    pub(crate) fn io(stage: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Error::Io { stage, source }
    }

    /// Whether this error is about the layout of a field file or its header.
    pub fn is_format_error(&self) -> bool {
        match self {
            Error::DimensionOutOfRange { .. } | Error::SizeMismatch { .. } => true,
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput(reason) =>
                write!(f, "classify: invalid source image: {}", reason),

            Error::InvalidOptions { option, reason } =>
                write!(f, "options: invalid `{}`: {}", option, reason),

            Error::DegenerateField { distance } => write!(
                f, "normalize: every sample has the distance {}, \
                    dynamic normalization needs at least two different distances",
                distance
            ),

            Error::DimensionOutOfRange { dimension, value } => write!(
                f, "format: field {} is {}, but must be within 1 and 255",
                dimension, value
            ),

            Error::SizeMismatch { expected, actual } => write!(
                f, "format: field file should contain {} bytes, but contains {} bytes",
                expected, actual
            ),

            Error::Io { stage, source } =>
                write!(f, "{}: {}", stage, source),

            #[cfg(feature = "piston_image")]
            Error::Image(error) =>
                write!(f, "decode: {}", error),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),

            #[cfg(feature = "piston_image")]
            Error::Image(error) => Some(error),

            _ => None,
        }
    }
}

#[cfg(feature = "piston_image")]
impl From<image::ImageError> for Error {
    fn from(error: image::ImageError) -> Self {
        match error {
            image::ImageError::IoError(source) => Error::Io { stage: "read source", source },
            other => Error::Image(other),
        }
    }
}
