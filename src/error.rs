//! Error handling
use thiserror::Error;

/// Primary error type.
///
/// Some members of this enum implement ``From``
/// in order to redirect other error types.
#[derive(Error, Debug, PartialEq)]
pub enum CoalseqError {
    /// Bad input to a generator, such as a sample
    /// size that is too small or a negative rate.
    /// Nothing has been simulated when this is returned.
    #[error("Invalid argument: {value}")]
    InvalidArgument {
        /// What was wrong
        value: String,
    },
    /// A redirection of a [``crate::TablesError``]
    #[error("{value}")]
    TablesError {
        /// The redirected error
        #[from]
        value: crate::TablesError,
    },
    /// A redirection of a [``crate::TreesError``]
    #[error("{value}")]
    TreesError {
        /// The redirected error
        #[from]
        value: crate::TreesError,
    },
    /// A redirection of a [``coalseq_core::Error``]
    #[error("{value}")]
    CoreError {
        /// The redirected error
        #[from]
        value: coalseq_core::Error,
    },
}

impl CoalseqError {
    pub(crate) fn invalid_argument<S: Into<String>>(value: S) -> Self {
        Self::InvalidArgument {
            value: value.into(),
        }
    }
}
