//! Macros for sweep error handling.
//!
//! Convenience macros for creating and returning [`crate::error::SweepError`]
//! instances with reduced boilerplate.

/// Creates a [`crate::error::SweepError`] from error kind and description.
///
/// Accepts either a static description alone or a description plus dynamic
/// detail.
#[macro_export]
macro_rules! sweep_error {
    ($kind:expr, $desc:expr) => {
        $crate::error::SweepError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        $crate::error::SweepError::from(($kind, $desc, $detail.to_string()))
    };
}

/// Creates and returns a [`crate::error::SweepError`] from the current function.
///
/// Combines error creation with early return for error conditions that should
/// immediately terminate execution.
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return Err($crate::sweep_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return Err($crate::sweep_error!($kind, $desc, $detail))
    };
}
