//! Linear operator abstraction (C1)
//!
//! The solver never touches a concrete matrix type directly; it only asks an
//! [`Operator`] to apply `A` and (optionally) `B`, and to compute the
//! `B`-inner product and `B`-norm it needs for orthogonalization. This is the
//! same shape as the teacher's `LinearOperator` trait (`apply_mut` plus
//! default-method conveniences), generalized to cover the generalized
//! eigenproblem's `B` action.
//!
//! Concrete implementors shipped here are dense (`MatrixOperator`,
//! `GeneralizedMatrixOperator`) plus a closure adapter (`FnOperator`); a
//! sparse or shift-invert operator is exactly the kind of thing an external
//! collaborator is expected to provide by implementing this trait.

use nalgebra::DMatrix;
use nalgebra::DVector;

use crate::types::Real;

/// Capability set an eigensolver needs from its linear operator(s).
///
/// `apply_b`, `dot_b` and `norm_b` default to the standard (`B = I`) case, so
/// a standard-problem implementor only has to provide `dim` and `apply_a`.
pub trait Operator<T: Real> {
    /// Dimension `n` of the underlying vector space. Fixed for the lifetime
    /// of a solve.
    fn dim(&self) -> usize;

    /// `y := A * x`
    fn apply_a(&self, x: &DVector<T>) -> DVector<T>;

    /// `y := B * x`. Defaults to the identity (standard eigenproblem).
    fn apply_b(&self, x: &DVector<T>) -> DVector<T> {
        x.clone()
    }

    /// `⟨x, y⟩_B := xᵀ B y`. Defaults to the Euclidean inner product.
    fn dot_b(&self, x: &DVector<T>, y: &DVector<T>) -> T {
        x.dot(y)
    }

    /// `‖x‖_B := sqrt(⟨x, x⟩_B)`. Defaults to the Euclidean norm.
    fn norm_b(&self, x: &DVector<T>) -> T {
        self.dot_b(x, x).sqrt()
    }
}

/// Standard eigenproblem `A x = lambda x` backed by a dense matrix.
pub struct MatrixOperator<T: Real> {
    a: DMatrix<T>,
}

impl<T: Real> MatrixOperator<T> {
    pub fn new(a: DMatrix<T>) -> Self {
        assert!(a.is_square(), "operator matrix must be square");
        Self { a }
    }
}

impl<T: Real> Operator<T> for MatrixOperator<T> {
    fn dim(&self) -> usize {
        self.a.nrows()
    }

    fn apply_a(&self, x: &DVector<T>) -> DVector<T> {
        &self.a * x
    }
}

/// Generalized eigenproblem `A x = lambda B x` with `B` symmetric positive
/// definite, backed by dense matrices.
pub struct GeneralizedMatrixOperator<T: Real> {
    a: DMatrix<T>,
    b: DMatrix<T>,
}

impl<T: Real> GeneralizedMatrixOperator<T> {
    pub fn new(a: DMatrix<T>, b: DMatrix<T>) -> Self {
        assert!(a.is_square(), "operator matrix A must be square");
        assert_eq!(a.shape(), b.shape(), "A and B must have matching shape");
        Self { a, b }
    }
}

impl<T: Real> Operator<T> for GeneralizedMatrixOperator<T> {
    fn dim(&self) -> usize {
        self.a.nrows()
    }

    fn apply_a(&self, x: &DVector<T>) -> DVector<T> {
        &self.a * x
    }

    fn apply_b(&self, x: &DVector<T>) -> DVector<T> {
        &self.b * x
    }

    fn dot_b(&self, x: &DVector<T>, y: &DVector<T>) -> T {
        x.dot(&(&self.b * y))
    }
}

/// Adapts a pair of closures (and an explicit dimension) to [`Operator`], for
/// matrix-free standard problems.
pub struct FnOperator<T: Real, F: Fn(&DVector<T>) -> DVector<T>> {
    dim: usize,
    apply_a: F,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Real, F: Fn(&DVector<T>) -> DVector<T>> FnOperator<T, F> {
    pub fn new(dim: usize, apply_a: F) -> Self {
        Self {
            dim,
            apply_a,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T: Real, F: Fn(&DVector<T>) -> DVector<T>> Operator<T> for FnOperator<T, F> {
    fn dim(&self) -> usize {
        self.dim
    }

    fn apply_a(&self, x: &DVector<T>) -> DVector<T> {
        (self.apply_a)(x)
    }
}
