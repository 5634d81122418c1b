//! Definition of errors.

use std::error::Error;
use std::fmt;

/// A specialized Result type for Cadenza.
pub type Result<T, E = CadenzaError> = std::result::Result<T, E>;

/// The error type for Cadenza.
#[derive(Debug)]
pub enum CadenzaError {
    /// The error variant for [`InvalidArgumentError`].
    InvalidArgument(InvalidArgumentError),

    /// The error variant for [`InvalidDerivationError`].
    InvalidDerivation(InvalidDerivationError),

    /// The error variant for [`InvalidFormatError`].
    InvalidFormat(InvalidFormatError),

    /// The error variant for [`DecodeError`](bincode::error::DecodeError).
    BincodeDecode(bincode::error::DecodeError),

    /// The error variant for [`EncodeError`](bincode::error::EncodeError).
    BincodeEncode(bincode::error::EncodeError),

    /// The error variant for [`std::io::Error`].
    StdIo(std::io::Error),
}

impl CadenzaError {
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_derivation<S>(transition: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidDerivation(InvalidDerivationError {
            transition,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    /// Checks if the error signals a broken derivation, the only class the
    /// trainer may recover from when instance skipping is enabled.
    pub fn is_derivation_error(&self) -> bool {
        matches!(self, Self::InvalidDerivation(_))
    }
}

impl fmt::Display for CadenzaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidArgument(e) => e.fmt(f),
            Self::InvalidDerivation(e) => e.fmt(f),
            Self::InvalidFormat(e) => e.fmt(f),
            Self::BincodeDecode(e) => e.fmt(f),
            Self::BincodeEncode(e) => e.fmt(f),
            Self::StdIo(e) => e.fmt(f),
        }
    }
}

impl Error for CadenzaError {}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// Error used when a transition is applied to a configuration that violates
/// its preconditions, or when the oracle has no applicable action.
#[derive(Debug)]
pub struct InvalidDerivationError {
    /// Display name of the transition attempted.
    pub(crate) transition: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidDerivationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "InvalidDerivationError: {}: {}",
            self.transition, self.msg
        )
    }
}

impl Error for InvalidDerivationError {}

/// Error used when an input format is invalid.
#[derive(Debug)]
pub struct InvalidFormatError {
    /// Name of the input.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

impl From<bincode::error::DecodeError> for CadenzaError {
    fn from(error: bincode::error::DecodeError) -> Self {
        Self::BincodeDecode(error)
    }
}

impl From<bincode::error::EncodeError> for CadenzaError {
    fn from(error: bincode::error::EncodeError) -> Self {
        Self::BincodeEncode(error)
    }
}

impl From<std::io::Error> for CadenzaError {
    fn from(error: std::io::Error) -> Self {
        Self::StdIo(error)
    }
}
