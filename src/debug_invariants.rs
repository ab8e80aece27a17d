use crate::laminar_error::LaminarError;

/// Trait for validating data structure invariants.
///
/// Implemented by [`Triangulation`](crate::topology::triangulation::Triangulation)
/// and [`Lamination`](crate::lamination::Lamination); constructors that skip
/// validation on trusted paths call [`debug_invariants!`] instead.
pub trait DebugInvariants {
    /// Assert invariants in debug builds or when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), LaminarError>;
}

/// Helper macro to run a fallible check and panic on error when invariant
/// checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
