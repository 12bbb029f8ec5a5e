use std::num::ParseFloatError;

use thiserror::Error as ThisError;

#[derive(ThisError, Eq, PartialEq, Debug)]
pub enum Error {
    #[error("missing separator \"{0}\"")]
    MissingSeparator(char),
    #[error("too many parts")]
    TooManyParts,
    #[error("server content type cannot be a wildcard")]
    InvalidWildcard,
    #[error("malformed content type")]
    InvalidHeader,
    #[error("quality param not allowed")]
    QualityNotAllowed,
    #[error("invalid quality param")]
    InvalidQuality { source: ParseFloatError },
    #[error("quality param must be a finite number")]
    NonFiniteQuality,
    #[error("no supported content types")]
    NoSupportedTypes,
}
