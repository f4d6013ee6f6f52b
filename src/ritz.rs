//! Real Schur analysis of the projected Hessenberg matrix (C3)
//!
//! Given `H[:m,:m]` this computes its real Schur pair `(X, T)` via
//! [`nalgebra::linalg::Schur`] (the dense-LA collaborator), the complex
//! eigenvalues of `T`, the (complex) Schur-vector matrix `U = X * E` where
//! `E` holds the eigenvectors of `T`, and the implicit residual bound each
//! Ritz pair carries before the factorization is extended any further.
//!
//! `E` is computed in-crate by block back-substitution on the quasi-upper-
//! triangular `T` — the real-Schur analogue of LAPACK's `dtrevc` — since
//! `nalgebra::Schur` exposes eigenvalues but not eigenvectors directly.

use nalgebra::{Complex, DMatrix};

use crate::error::{KrylovSchurError, Result};
use crate::types::Real;

/// Real Schur pair of `H[:m,:m]` plus derived Ritz data.
pub struct RitzInfo<T: Real> {
    /// Orthogonal Schur-vector matrix of `H`.
    pub x: DMatrix<T>,
    /// Quasi-triangular Schur form of `H`.
    pub t: DMatrix<T>,
    /// Complex eigenvalues of `T` (equivalently of `H`), in Schur order.
    pub values: Vec<Complex<T>>,
    /// Real part of `U = X * E`, `E` the eigenvectors of `T`.
    pub u_re: DMatrix<T>,
    /// Imaginary part of `U`.
    pub u_im: DMatrix<T>,
    /// Implicit residual bound `r[j] = |beta| * |U[m-1, j]|`.
    pub residuals: Vec<T>,
}

/// Diagonal blocks of a quasi-triangular matrix as `(start, len)` pairs
/// covering `0..m`; `len` is 2 for a complex conjugate pair, 1 otherwise.
pub(crate) fn blocks<T: Real>(t: &DMatrix<T>) -> Vec<(usize, usize)> {
    let m = t.nrows();
    let mut out = Vec::new();
    let mut i = 0;
    while i < m {
        if i + 1 < m && t[(i + 1, i)] != T::zero() {
            out.push((i, 2));
            i += 2;
        } else {
            out.push((i, 1));
            i += 1;
        }
    }
    out
}

/// Analyze `h` (the `m x m` leading block of the factorization's
/// Hessenberg matrix), given `beta = ||f||_B` for the residual bound.
pub fn analyze<T: Real>(h: &DMatrix<T>, beta: T) -> Result<RitzInfo<T>> {
    let m = h.nrows();
    let schur = nalgebra::linalg::Schur::new(h.clone());
    let values: Vec<Complex<T>> = schur.complex_eigenvalues().iter().copied().collect();
    let (x, t) = schur.unpack();

    let (e_re, e_im) = eigenvectors_of_quasi_triangular(&t)?;
    let u_re = &x * &e_re;
    let u_im = &x * &e_im;

    let mut residuals = Vec::with_capacity(m);
    for j in 0..m {
        let re = u_re[(m - 1, j)];
        let im = u_im[(m - 1, j)];
        residuals.push(beta.abs() * (re * re + im * im).sqrt());
    }

    Ok(RitzInfo { x, t, values, u_re, u_im, residuals })
}

/// Right eigenvectors of a real quasi-triangular matrix `t`, one column per
/// index of `t`, computed by block back-substitution from the bottom-right
/// corner upward. 1x1 blocks give a real eigenvector; 2x2 blocks give a
/// complex-conjugate pair sharing the block's two columns.
fn eigenvectors_of_quasi_triangular<T: Real>(t: &DMatrix<T>) -> Result<(DMatrix<T>, DMatrix<T>)> {
    let m = t.nrows();
    let blk = blocks(t);
    let mut e_re = DMatrix::<T>::zeros(m, m);
    let mut e_im = DMatrix::<T>::zeros(m, m);

    for &(start, len) in &blk {
        if len == 1 {
            let lambda_re = t[(start, start)];
            let mut col_re = vec![T::zero(); m];
            let mut col_im = vec![T::zero(); m];
            col_re[start] = T::one();
            back_substitute(t, &blk, start, (lambda_re, T::zero()), &mut col_re, &mut col_im)?;
            for i in 0..m {
                e_re[(i, start)] = col_re[i];
            }
        } else {
            let (a, b) = complex_pair_eigenvalue(t, start);
            let t11 = t[(start, start)];
            let t12 = t[(start, start + 1)];

            // Solve the block's own 2x2 system `(T_block - lambda I) z = 0`
            // with `z[1] = 1`: `(t11 - lambda) z0 + t12 = 0`.
            let (dr, di) = (t11 - a, -b);
            let denom = dr * dr + di * di;
            let (z0_re, z0_im) = if denom > T::zero() {
                (-(t12 * dr) / denom, (t12 * di) / denom)
            } else {
                (T::one(), T::zero())
            };

            let mut col_re = vec![T::zero(); m];
            let mut col_im = vec![T::zero(); m];
            col_re[start] = z0_re;
            col_im[start] = z0_im;
            col_re[start + 1] = T::one();
            col_im[start + 1] = T::zero();

            back_substitute(t, &blk, start, (a, b), &mut col_re, &mut col_im)?;

            for i in 0..m {
                e_re[(i, start)] = col_re[i];
                e_im[(i, start)] = col_im[i];
                // Conjugate pair: same real part, negated imaginary part.
                e_re[(i, start + 1)] = col_re[i];
                e_im[(i, start + 1)] = -col_im[i];
            }
        }
    }

    Ok((e_re, e_im))
}

/// Eigenvalue `a +/- b*i` carried by the 2x2 block at `t[start..start+2,
/// start..start+2]`.
fn complex_pair_eigenvalue<T: Real>(t: &DMatrix<T>, start: usize) -> (T, T) {
    let t11 = t[(start, start)];
    let t12 = t[(start, start + 1)];
    let t21 = t[(start + 1, start)];
    let t22 = t[(start + 1, start + 1)];
    let two = T::from_f64(2.0).unwrap();
    let half_trace = (t11 + t22) / two;
    let det = t11 * t22 - t12 * t21;
    let disc = half_trace * half_trace - det;
    // disc <= 0 for a genuine complex-conjugate block; clamp defensively.
    let b = if disc < T::zero() { (-disc).sqrt() } else { T::zero() };
    (half_trace, b)
}

/// Fill in rows above `target` (the block whose eigenvector is being built)
/// by back-substitution on the quasi-triangular system
/// `(T - lambda I) x = 0`, working block by block from `target - 1` down to
/// `0`.
fn back_substitute<T: Real>(
    t: &DMatrix<T>,
    blk: &[(usize, usize)],
    target: usize,
    lambda: (T, T),
    col_re: &mut [T],
    col_im: &mut [T],
) -> Result<()> {
    let m = col_re.len();
    let eps = T::default_epsilon();
    let (lr, li) = lambda;

    for &(start, len) in blk.iter().rev() {
        if start >= target {
            continue;
        }
        if len == 1 {
            let mut sr = T::zero();
            let mut si = T::zero();
            for j in (start + 1)..m {
                sr += t[(start, j)] * col_re[j];
                si += t[(start, j)] * col_im[j];
            }
            // Solve (t[start,start] - lambda) * x = -s for complex x.
            let dr = t[(start, start)] - lr;
            let di = -li;
            let denom = dr * dr + di * di;
            if denom < eps * eps {
                return Err(KrylovSchurError::NumericalFailure {
                    message: format!("singular pivot while back-substituting eigenvector at row {start}"),
                });
            }
            let nr = -sr;
            let ni = -si;
            col_re[start] = (nr * dr + ni * di) / denom;
            col_im[start] = (ni * dr - nr * di) / denom;
        } else {
            let mut s0r = T::zero();
            let mut s0i = T::zero();
            let mut s1r = T::zero();
            let mut s1i = T::zero();
            for j in (start + 2)..m {
                s0r += t[(start, j)] * col_re[j];
                s0i += t[(start, j)] * col_im[j];
                s1r += t[(start + 1, j)] * col_re[j];
                s1i += t[(start + 1, j)] * col_im[j];
            }
            // (A - lambda I) x = rhs, A real 2x2, rhs complex, solved by
            // Cramer's rule in complex arithmetic.
            let (a11r, a11i) = (t[(start, start)] - lr, -li);
            let a12 = t[(start, start + 1)];
            let a21 = t[(start + 1, start)];
            let (a22r, a22i) = (t[(start + 1, start + 1)] - lr, -li);
            let (detr, deti) = cmul(a11r, a11i, a22r, a22i);
            let (detr, deti) = (detr - a12 * a21, deti);
            let det_mag2 = detr * detr + deti * deti;
            if det_mag2 < eps * eps {
                return Err(KrylovSchurError::NumericalFailure {
                    message: format!("singular 2x2 pivot while back-substituting eigenvector at row {start}"),
                });
            }
            let (rhs0r, rhs0i) = (-s0r, -s0i);
            let (rhs1r, rhs1i) = (-s1r, -s1i);
            let (num0r, num0i) = csub(cmul(rhs0r, rhs0i, a22r, a22i), (a12 * rhs1r, a12 * rhs1i));
            let (num1r, num1i) = csub(cmul(a11r, a11i, rhs1r, rhs1i), (a21 * rhs0r, a21 * rhs0i));
            col_re[start] = (num0r * detr + num0i * deti) / det_mag2;
            col_im[start] = (num0i * detr - num0r * deti) / det_mag2;
            col_re[start + 1] = (num1r * detr + num1i * deti) / det_mag2;
            col_im[start + 1] = (num1i * detr - num1r * deti) / det_mag2;
        }
    }
    Ok(())
}

fn cmul<T: Real>(ar: T, ai: T, br: T, bi: T) -> (T, T) {
    (ar * br - ai * bi, ar * bi + ai * br)
}

fn csub<T: Real>(a: (T, T), b: (T, T)) -> (T, T) {
    (a.0 - b.0, a.1 - b.1)
}
