//! The m-step Krylov factorization F = (V, H, f, p)
//!
//! This is the B-orthonormal analogue of the teacher's `Arnoldi` iterator
//! (`arnoldi.rs`) and `MGS` orthogonalizer (`mgs.rs`) fused into one
//! mutable, restartable object, because the outer Krylov-Schur driver needs
//! to resume an existing factorization from column `p` rather than running
//! a fresh iterator to completion each time.

use nalgebra::{DMatrix, DVector};

use crate::operator::Operator;
use crate::types::Real;

/// `V` (n x m, B-orthonormal in its first `p` columns), `H` (m x m upper
/// Hessenberg, valid in its leading `p` x `p` block), the residual vector
/// `f`, and the current length `p`.
pub struct KrylovFactorization<T: Real> {
    pub v: DMatrix<T>,
    pub h: DMatrix<T>,
    pub f: DVector<T>,
    pub p: usize,
    /// `‖f‖_B`, i.e. the subdiagonal entry the next extension step would
    /// write — kept around so the Ritz analyzer can use it without
    /// recomputing a `B`-norm.
    pub beta: T,
    n: usize,
    m: usize,
    num_operations: u64,
}

impl<T: Real> KrylovFactorization<T> {
    /// Allocate an uninitialized factorization for an n-dimensional problem
    /// with maximum Krylov length `m`. Call [`init`](Self::init) before use.
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            v: DMatrix::zeros(n, m),
            h: DMatrix::zeros(m, m),
            f: DVector::zeros(n),
            p: 0,
            beta: T::zero(),
            n,
            m,
            num_operations: 0,
        }
    }

    /// Reset to length zero with a normalized starting residual, per 4.2/6:
    /// `init(v0)` "zero-lengths the convergence state, resets counters,
    /// normalizes v0 into the factorization."
    pub fn init(&mut self, v0: DVector<T>, operator: &impl Operator<T>) {
        assert_eq!(v0.len(), self.n, "initial vector has the wrong dimension");
        self.v.fill(T::zero());
        self.h.fill(T::zero());
        self.p = 0;
        self.num_operations = 0;
        let norm = operator.norm_b(&v0);
        self.f = v0 / norm;
        self.beta = operator.norm_b(&self.f);
    }

    pub fn num_operations(&self) -> u64 {
        self.num_operations
    }

    fn breakdown_threshold(&self, operator: &impl Operator<T>) -> T {
        T::from_usize(operator.dim()).unwrap().sqrt() * T::default_epsilon()
    }

    /// Grow the factorization from its current length to `target_p`,
    /// counting operator applications. Returns `true` if a breakdown was hit
    /// (the residual collapsed below machine-precision-scaled threshold,
    /// signalling an exhausted invariant subspace); the caller must then stop
    /// with zero converged eigenpairs.
    pub fn extend(&mut self, target_p: usize, operator: &impl Operator<T>) -> bool {
        assert!(self.p < target_p && target_p <= self.m);

        for j in self.p..target_p {
            let norm = operator.norm_b(&self.f);
            if norm < self.breakdown_threshold(operator) {
                self.p = j;
                self.beta = norm;
                return true;
            }

            let v_j = &self.f / norm;
            self.v.set_column(j, &v_j);
            if j > 0 {
                self.h[(j, j - 1)] = norm;
            }

            let w0 = operator.apply_a(&v_j);
            self.num_operations += 1;
            let norm0 = operator.norm_b(&w0);

            let mut coeffs = vec![T::zero(); j + 1];
            let mut w = w0;
            for i in 0..=j {
                let vi = self.v.column(i).clone_owned();
                let c = operator.dot_b(&vi, &w);
                w -= &vi * c;
                coeffs[i] = c;
            }

            // One round of iterative refinement when cancellation ate more
            // than the classical 1/sqrt(2) fraction of the norm.
            let norm1 = operator.norm_b(&w);
            if norm0 > T::zero() && norm1 < norm0 / T::from_f64(2.0_f64.sqrt()).unwrap() {
                for i in 0..=j {
                    let vi = self.v.column(i).clone_owned();
                    let c = operator.dot_b(&vi, &w);
                    w -= &vi * c;
                    coeffs[i] += c;
                }
            }

            for (i, c) in coeffs.into_iter().enumerate() {
                self.h[(i, j)] = c;
            }
            self.f = w;
        }

        self.p = target_p;
        self.beta = operator.norm_b(&self.f);
        false
    }
}
