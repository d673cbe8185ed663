use floedb_pack::PackError;
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a legacy-origin not-found error.
    pub(crate) fn legacy_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, ErrorOrigin::Legacy, message)
    }

    /// Construct a block-origin internal error.
    pub(crate) fn block_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Block, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<PackError> for InternalError {
    fn from(err: PackError) -> Self {
        let class = match err {
            PackError::Serialize(_) | PackError::Deserialize(_) => ErrorClass::Internal,
            PackError::SizeLimitExceeded { .. } => ErrorClass::Unsupported,
            PackError::UnbalancedClose
            | PackError::UnclosedCompound { .. }
            | PackError::DanglingKey => ErrorClass::InvariantViolation,
            _ => ErrorClass::Corruption,
        };

        Self::new(class, ErrorOrigin::Pack, err.to_string())
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Corruption,
    NotFound,
    Internal,
    Unsupported,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Corruption => "corruption",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Pack,
    Block,
    Legacy,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pack => "pack",
            Self::Block => "block",
            Self::Legacy => "legacy",
        };
        write!(f, "{label}")
    }
}

///
/// ContractViolation
///
/// Programming errors that correct engine code never triggers. They are not
/// returned; [`contract_violation`] panics with them.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ContractViolation {
    #[error("borrowed payload of {len} bytes exceeds the {max} byte reference limit")]
    ReferenceTooLarge { len: usize, max: usize },

    #[error("range accessor called on {storage} value")]
    NotARange { storage: &'static str },

    #[error("register {register} out of bounds for a block with {registers} registers")]
    RegisterOutOfBounds { register: usize, registers: usize },

    #[error("row {row} out of bounds for a block with {rows} rows")]
    RowOutOfBounds { row: usize, rows: usize },
}

/// Log and panic on a violated caller contract.
#[cold]
#[track_caller]
pub(crate) fn contract_violation(violation: ContractViolation) -> ! {
    tracing::error!(violation = %violation, "contract violation");
    panic!("contract violation: {violation}");
}

///
/// TESTS
///
