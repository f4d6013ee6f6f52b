//! Krylov subspace construction (C2)

pub mod factorization;

pub use factorization::KrylovFactorization;
