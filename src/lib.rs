//! Krylov-Schur iteration for a handful of extremal eigenpairs of a large
//! linear operator.
//!
//! This crate computes `k` extremal eigenpairs of an operator `A` (or the
//! generalized problem `(A, B)` with `B` symmetric positive definite) given
//! only as a matrix-vector action, by repeatedly extending an `m`-step
//! Krylov factorization and restarting it from a reordered real Schur form
//! (G. W. Stewart's Krylov-Schur algorithm). It targets callers whose
//! operator may be too large, sparse, or implicit to diagonalize directly,
//! and who want a stable, restarted alternative to implicitly-restarted
//! Arnoldi iteration.
//!
//! Modules, leaves first:
//!
//! - [`operator`] (C1): the `Operator<T>` capability set (`apply_a`,
//!   `apply_b`, `dot_b`, `norm_b`, `dim`) an eigensolver needs, plus dense
//!   implementors.
//! - [`krylov`] (C2): the `B`-orthonormal Arnoldi-style factorization
//!   engine, resumable from any partial length.
//! - [`ritz`] (C3): real Schur analysis of the projected Hessenberg matrix,
//!   eigenvector back-substitution, and implicit residual bounds.
//! - [`select`] (C4): ranking of Ritz values by a selection rule, and the
//!   separate export-ordering rule.
//! - [`reorder`] (C5): Schur-form reordering that moves a chosen subset of
//!   blocks to the leading position while keeping 2x2 conjugate-pair blocks
//!   atomic.
//! - [`convergence`] (C6): per-Ritz residual thresholds, converged counts,
//!   and the next restart size.
//! - [`solver`] (C7): the outer driver (`KrylovSchur`) that sequences the
//!   above into `init`/`compute`.
//! - [`error`]: the crate's `Result`/error enum.
//! - [`types`]: the `Real` scalar bound shared by every module.
//! - [`generate`]: the reproducible default initial-vector generator.

#![allow(clippy::many_single_char_names, clippy::type_complexity)]

pub mod convergence;
pub mod error;
pub mod generate;
pub mod krylov;
pub mod operator;
pub mod reorder;
pub mod ritz;
pub mod select;
pub mod solver;
pub mod types;

pub use crate::error::{KrylovSchurError, Result};
pub use crate::krylov::KrylovFactorization;
pub use crate::operator::{FnOperator, GeneralizedMatrixOperator, MatrixOperator, Operator};
pub use crate::select::{SelectionRule, SortRule};
pub use crate::solver::{KrylovSchur, SolverStatus};
pub use crate::types::Real;
