use std::path::PathBuf;
use thiserror::Error;

use crate::name::UnitName;

pub type Result<T> = std::result::Result<T, Error>;

/// Structural problem found while decoding a class file or one of its descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FormatError(pub(crate) String);

impl FormatError {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    pub fn reason(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("\"{}\" is neither a directory nor a zip archive: {reason}", .path.display())]
    InvalidLocation { path: PathBuf, reason: String },

    #[error("classpath location \"{}\" not found", .0.display())]
    LocationNotFound(PathBuf),

    #[error("\"{entry}\" not found in {}", .location.display())]
    EntryNotFound { entry: String, location: PathBuf },

    #[error("classpath element {} is closed", .0.display())]
    Closed(PathBuf),

    #[error("class {0} not found on the classpath")]
    UnitNotFound(UnitName),

    #[error("root class {0} is missing from the classpath")]
    MissingRoot(UnitName),

    #[error("{name} is not a valid class file: {source}")]
    BadFormat {
        name: UnitName,
        #[source]
        source: FormatError,
    },

    #[error("failed to read {name} from {}: {source}", .location.display())]
    UnreadableUnit {
        name: UnitName,
        location: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("zip error in {}: {source}", .location.display())]
    Zip {
        location: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn bad_format(name: &UnitName, source: FormatError) -> Self {
        Error::BadFormat {
            name: name.clone(),
            source,
        }
    }
}
