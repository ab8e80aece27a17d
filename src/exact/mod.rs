//! Exact arithmetic: integer matrices, rational polynomials, real algebraic
//! numbers, and the eigenvector oracle built on them.

pub mod eigen;
pub mod matrix;
pub mod number_field;
pub mod polynomial;
pub mod weight;

pub use eigen::{ExactEigenSolver, SturmEigenSolver};
pub use matrix::ExactMatrix;
pub use number_field::{AlgebraicNumber, NumberField};
pub use polynomial::Polynomial;
pub use weight::Weight;
