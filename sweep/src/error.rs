use std::error;
use std::fmt;

/// Convenient result type for sweep operations using [`SweepError`] as the error type.
///
/// This type alias reduces boilerplate when working with fallible sweep operations.
/// Most functions in this crate return this type.
pub type SweepResult<T> = Result<T, SweepError>;

/// Main error type for sweep operations.
///
/// [`SweepError`] can represent single errors, errors with additional detail,
/// or multiple aggregated errors, which keeps rich error information available
/// while staying ergonomic at call sites.
#[derive(Debug, Clone)]
pub struct SweepError {
    repr: ErrorRepr,
}

/// Internal representation of error data.
///
/// Users should not interact with this type directly but use [`SweepError`]
/// methods instead.
#[derive(Debug, Clone)]
enum ErrorRepr {
    /// Error with kind and static description
    WithDescription(ErrorKind, &'static str),
    /// Error with kind, static description, and dynamic detail
    WithDescriptionAndDetail(ErrorKind, &'static str, String),
    /// Multiple aggregated errors
    Many(Vec<SweepError>),
}

/// Specific categories of errors that can occur during a sweep.
///
/// Error kinds are organized by pipeline stage and failure mode so callers
/// can pick an appropriate handling strategy.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    // Enumeration errors, always fatal to the run.
    EnumerationFailed,
    EnumerationCanceled,

    // Per-object errors, recorded but never fatal.
    DeleteFailed,

    // Worker lifecycle errors.
    DeleteWorkerPanic,

    // Configuration & state errors.
    ConfigError,
    InvalidState,

    // Unknown / uncategorized.
    Unknown,
}

impl SweepError {
    /// Creates a [`SweepError`] containing multiple aggregated errors.
    ///
    /// Useful when multiple operations fail and all failures should be
    /// reported rather than just the first one.
    pub fn many(errors: Vec<SweepError>) -> SweepError {
        SweepError {
            repr: ErrorRepr::Many(errors),
        }
    }

    /// Returns the [`ErrorKind`] of this error.
    ///
    /// For multiple errors, returns the kind of the first error or
    /// [`ErrorKind::Unknown`] if the error list is empty.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => kind,
            ErrorRepr::Many(ref errors) => errors
                .first()
                .map(|err| err.kind())
                .unwrap_or(ErrorKind::Unknown),
        }
    }

    /// Returns all [`ErrorKind`]s present in this error.
    ///
    /// For single errors, returns a vector with one element. For multiple
    /// errors, returns a flattened vector of all error kinds.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => vec![kind],
            ErrorRepr::Many(ref errors) => errors
                .iter()
                .flat_map(|err| err.kinds())
                .collect::<Vec<_>>(),
        }
    }

    /// Returns the detailed error information if available.
    ///
    /// For multiple errors, returns the detail of the first error that has one.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::WithDescriptionAndDetail(_, _, ref detail) => Some(detail.as_str()),
            ErrorRepr::Many(ref errors) => errors.iter().find_map(|e| e.detail()),
            _ => None,
        }
    }
}

impl PartialEq for SweepError {
    fn eq(&self, other: &SweepError) -> bool {
        match (&self.repr, &other.repr) {
            (ErrorRepr::WithDescription(kind_a, _), ErrorRepr::WithDescription(kind_b, _)) => {
                kind_a == kind_b
            }
            (
                ErrorRepr::WithDescriptionAndDetail(kind_a, _, _),
                ErrorRepr::WithDescriptionAndDetail(kind_b, _, _),
            ) => kind_a == kind_b,
            (ErrorRepr::Many(errors_a), ErrorRepr::Many(errors_b)) => {
                errors_a.len() == errors_b.len()
                    && errors_a.iter().zip(errors_b.iter()).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.repr {
            ErrorRepr::WithDescription(kind, desc) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;

                Ok(())
            }
            ErrorRepr::WithDescriptionAndDetail(kind, desc, ref detail) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;
                f.write_str(" -> ")?;
                detail.fmt(f)?;

                Ok(())
            }
            ErrorRepr::Many(ref errors) => {
                if errors.is_empty() {
                    write!(f, "Multiple errors occurred (empty)")?;
                } else if errors.len() == 1 {
                    errors[0].fmt(f)?;
                } else {
                    write!(f, "Multiple errors occurred ({} total):", errors.len())?;
                    for (i, error) in errors.iter().enumerate() {
                        write!(f, "\n  {}: {}", i + 1, error)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl error::Error for SweepError {}

/// Creates a [`SweepError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for SweepError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> SweepError {
        SweepError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

/// Creates a [`SweepError`] from an error kind, static description, and dynamic detail.
impl From<(ErrorKind, &'static str, String)> for SweepError {
    fn from((kind, desc, detail): (ErrorKind, &'static str, String)) -> SweepError {
        SweepError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, desc, detail),
        }
    }
}

/// Creates a [`SweepError`] from a vector of errors for aggregation.
impl<E> From<Vec<E>> for SweepError
where
    E: Into<SweepError>,
{
    fn from(errors: Vec<E>) -> SweepError {
        SweepError {
            repr: ErrorRepr::Many(errors.into_iter().map(Into::into).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep_error;

    #[test]
    fn error_kind_is_preserved() {
        let err = sweep_error!(ErrorKind::DeleteFailed, "Failed to delete object");
        assert_eq!(err.kind(), ErrorKind::DeleteFailed);
        assert_eq!(err.detail(), None);
    }

    #[test]
    fn error_detail_is_preserved() {
        let err = sweep_error!(
            ErrorKind::EnumerationFailed,
            "Failed to list objects",
            "page 2 returned a server error"
        );
        assert_eq!(err.kind(), ErrorKind::EnumerationFailed);
        assert_eq!(err.detail(), Some("page 2 returned a server error"));
    }

    #[test]
    fn many_flattens_kinds() {
        let err = SweepError::many(vec![
            sweep_error!(ErrorKind::DeleteFailed, "first"),
            sweep_error!(ErrorKind::DeleteWorkerPanic, "second"),
        ]);
        assert_eq!(err.kind(), ErrorKind::DeleteFailed);
        assert_eq!(
            err.kinds(),
            vec![ErrorKind::DeleteFailed, ErrorKind::DeleteWorkerPanic]
        );
    }

    #[test]
    fn display_renders_kind_and_detail() {
        let err = sweep_error!(ErrorKind::DeleteFailed, "Failed to delete object", "gone");
        assert_eq!(
            err.to_string(),
            "DeleteFailed: Failed to delete object -> gone"
        );
    }
}
