//! Outer driver (C7): sequences C2-C6, performs restart truncation, and
//! exports the final eigenpairs, via a small builder-pattern API mirroring
//! the teacher's `TruncatedEig` (`precision`/`maxiter`/`orthogonal_to`
//! consuming-`self` setters).

use nalgebra::{Complex, DMatrix, DVector};

use crate::convergence;
use crate::error::{KrylovSchurError, Result};
use crate::generate;
use crate::krylov::KrylovFactorization;
use crate::operator::Operator;
use crate::reorder;
use crate::ritz::{self, RitzInfo};
use crate::select::{self, SelectionRule, SortRule};
use crate::types::Real;

/// Lifecycle state of a [`KrylovSchur`] solver, mirroring the teacher's
/// small status enums rather than a boolean "done" flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    NotComputed,
    Running,
    Successful,
    NotConverging,
}

/// Krylov-Schur eigensolver for a handful of extremal eigenpairs of a large
/// operator `A` (optionally generalized against `B`), built by repeatedly
/// extending an `m`-step Krylov factorization and restarting it from a
/// reordered Schur form.
pub struct KrylovSchur<T: Real, Op: Operator<T>> {
    operator: Op,
    k: usize,
    m: usize,
    selection: SelectionRule,
    sort_rule: SortRule,
    maxit: usize,
    tol: T,
    fact: KrylovFactorization<T>,
    status: SolverStatus,
    num_iterations: usize,
    nconv: usize,
    eigenvalues: Vec<T>,
    eigenvectors: DMatrix<T>,
}

impl<T: Real, Op: Operator<T>> KrylovSchur<T, Op> {
    /// Construct a solver for `k` wanted eigenpairs using an `m`-step
    /// Krylov subspace. Fails eagerly if `k` or `m` are out of their
    /// documented range.
    pub fn new(operator: Op, k: usize, m: usize) -> Result<Self> {
        let n = operator.dim();
        if k < 1 || k >= n {
            return Err(KrylovSchurError::InvalidArgument {
                message: format!("k must be in [1, n-1] = [1, {}], got {k}", n.saturating_sub(1)),
            });
        }
        if m <= k || m > n {
            return Err(KrylovSchurError::InvalidArgument {
                message: format!("m must be in (k, n] = ({k}, {n}], got {m}"),
            });
        }
        Ok(Self {
            fact: KrylovFactorization::new(n, m),
            operator,
            k,
            m,
            selection: SelectionRule::LargestMagnitude,
            sort_rule: SortRule::LargestAlgebraic,
            maxit: 1000,
            tol: T::from_f64(1e-10).unwrap(),
            status: SolverStatus::NotComputed,
            num_iterations: 0,
            nconv: 0,
            eigenvalues: Vec::new(),
            eigenvectors: DMatrix::zeros(n, 0),
        })
    }

    /// Restart-subset selection rule used while iterating. Default
    /// `LargestMagnitude`.
    pub fn selection(mut self, rule: SelectionRule) -> Self {
        self.selection = rule;
        self
    }

    /// Final export ordering. Default `LargestAlgebraic`.
    pub fn sort(mut self, rule: SortRule) -> Self {
        self.sort_rule = rule;
        self
    }

    /// Maximum outer iterations. Default `1000`.
    pub fn maxit(mut self, maxit: usize) -> Self {
        self.maxit = maxit;
        self
    }

    /// Convergence tolerance. Default `1e-10`.
    pub fn tol(mut self, tol: T) -> Self {
        self.tol = tol;
        self
    }

    /// Supply (or auto-generate) the initial residual vector and reset all
    /// convergence state and counters.
    pub fn init(&mut self, v0: Option<DVector<T>>) -> Result<&mut Self> {
        let n = self.operator.dim();
        let v0 = match v0 {
            Some(v) if v.len() == n => v,
            Some(_) => {
                return Err(KrylovSchurError::InvalidArgument {
                    message: "initial vector has the wrong dimension".to_string(),
                })
            }
            None => generate::default_initial_vector(n),
        };
        self.fact.init(v0, &self.operator);
        self.status = SolverStatus::Running;
        self.num_iterations = 0;
        self.nconv = 0;
        self.eigenvalues.clear();
        self.eigenvectors = DMatrix::zeros(n, 0);
        Ok(self)
    }

    /// Run the outer Krylov-Schur loop to convergence or `maxit`, whichever
    /// comes first. Returns `min(k, nconv)`.
    pub fn compute(&mut self) -> Result<usize> {
        if self.status == SolverStatus::NotComputed {
            return Err(KrylovSchurError::NotInitialized);
        }

        let n = self.operator.dim();
        let mut nconv_prev = 0usize;
        let mut nconv = 0usize;
        let mut ind: Vec<usize> = Vec::new();
        let mut ritz: Option<RitzInfo<T>> = None;
        let mut exit_on_convergence = false;

        for iter in 0..self.maxit.max(1) {
            self.num_iterations = iter + 1;

            #[cfg(feature = "logging")]
            log::debug!(target: "krylov_schur", "extending factorization p={} -> m={}", self.fact.p, self.m);

            let stopped = self.fact.extend(self.m, &self.operator);
            if stopped {
                #[cfg(feature = "logging")]
                log::debug!(target: "krylov_schur", "breakdown: residual norm {:?}", self.fact.beta);
                self.status = SolverStatus::Successful;
                self.nconv = 0;
                self.eigenvalues.clear();
                self.eigenvectors = DMatrix::zeros(n, 0);
                return Ok(0);
            }

            let h_block = self.fact.h.view((0, 0), (self.m, self.m)).clone_owned();
            let this_ritz = ritz::analyze(&h_block, self.fact.beta)?;

            ind = select::rank(&this_ritz.values, self.selection);
            let take = self.k.min(ind.len());
            let d_top: Vec<Complex<T>> = ind[..take].iter().map(|&i| this_ritz.values[i]).collect();
            let r_top: Vec<T> = ind[..take].iter().map(|&i| this_ritz.residuals[i]).collect();
            nconv = convergence::num_converged(&d_top, &r_top, self.tol);

            #[cfg(feature = "logging")]
            log::trace!(target: "krylov_schur", "iteration {}: nconv={}", self.num_iterations, nconv);

            let is_last = iter + 1 == self.maxit;
            if nconv >= self.k || is_last {
                exit_on_convergence = nconv >= self.k;
                ritz = Some(this_ritz);
                break;
            }

            let mut nev = convergence::next_nev(self.k, self.m, nconv, nconv_prev);
            nconv_prev = nconv;

            let mut sigma = vec![false; self.m];
            for &i in ind.iter().take(nev) {
                sigma[i] = true;
            }
            let blk = ritz::blocks(&this_ritz.t);
            for &(start, len) in &blk {
                if len == 2 && sigma[start] != sigma[start + 1] {
                    sigma[start] = true;
                    sigma[start + 1] = true;
                    nev += 1;
                }
            }

            let mut x = this_ritz.x.clone();
            let mut t = this_ritz.t.clone();
            reorder::ordschur(&mut x, &mut t, &mut sigma);

            let xk = x.columns(0, nev).clone_owned();
            let mut h_new = DMatrix::<T>::zeros(self.m, self.m);
            h_new.view_mut((0, 0), (nev, nev)).copy_from(&t.view((0, 0), (nev, nev)));
            let old_last_row = self.fact.h.row(self.m - 1).clone_owned();
            let new_row = &old_last_row * &xk;
            for j in 0..nev {
                h_new[(nev, j)] = new_row[(0, j)];
            }
            let v_new = self.fact.v.columns(0, self.m).clone_owned() * &xk;

            self.fact.v.columns_mut(0, nev).copy_from(&v_new);
            self.fact.h = h_new;
            self.fact.p = nev;
        }

        let ritz = ritz.expect("loop always breaks with a Ritz analysis attached");

        // The last-iteration export quirk: when the loop exits because
        // `nconv >= k`, the eigenvalues are written from the ranking
        // already computed by `selection` this iteration, not a fresh
        // `sort_rule` re-rank (see DESIGN.md, Open Question #3).
        let final_ind = if exit_on_convergence {
            ind
        } else {
            select::rank_sort(&ritz.values, self.sort_rule)
        };

        let export = self.k.min(nconv);
        let mut eigenvalues = Vec::with_capacity(export);
        let mut eigenvectors = DMatrix::<T>::zeros(n, export);
        let v_m = self.fact.v.columns(0, self.m).clone_owned();
        for (col, &idx) in final_ind.iter().take(export).enumerate() {
            eigenvalues.push(ritz.values[idx].re);
            let u_col = ritz.u_re.column(idx);
            eigenvectors.set_column(col, &(&v_m * u_col));
        }

        self.eigenvalues = eigenvalues;
        self.eigenvectors = eigenvectors;
        self.nconv = nconv;
        self.status = if nconv >= self.k {
            SolverStatus::Successful
        } else {
            SolverStatus::NotConverging
        };

        #[cfg(feature = "logging")]
        log::info!(
            target: "krylov_schur",
            "compute finished: nconv={} status={:?} iterations={} operations={}",
            self.nconv, self.status, self.num_iterations, self.fact.num_operations()
        );

        Ok(export)
    }

    pub fn info(&self) -> SolverStatus {
        self.status
    }

    pub fn num_iterations(&self) -> usize {
        self.num_iterations
    }

    pub fn num_operations(&self) -> u64 {
        self.fact.num_operations()
    }

    pub fn eigenvalues(&self) -> &[T] {
        &self.eigenvalues
    }

    /// `n x min(nvec, nconv)` matrix of eigenvectors, columns ordered to
    /// match [`eigenvalues`](Self::eigenvalues).
    pub fn eigenvectors(&self, nvec: usize) -> DMatrix<T> {
        let take = nvec.min(self.eigenvectors.ncols());
        self.eigenvectors.columns(0, take).clone_owned()
    }
}
