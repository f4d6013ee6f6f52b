//! Schur-form reordering (C5)
//!
//! Permutes a real Schur pair `(X, T)` so that the columns flagged by
//! `sigma` occupy the leading block, by a sequence of adjacent block
//! transpositions realized with orthogonal (Givens-rotation-style) updates
//! — the hand-rolled analogue of LAPACK's `dtrexc`. Kept in-crate rather
//! than borrowed from the dense-LA collaborator, because the reordering
//! algorithm itself is the spec's core logic.
//!
//! 2x2 blocks (complex conjugate pairs) are swapped as a unit: the caller
//! must have already forced both members of a pair into `sigma` together
//! (see `solver::KrylovSchur::compute`), and this module asserts that
//! invariant in debug builds before moving anything.

use nalgebra::DMatrix;

use crate::ritz::blocks;
use crate::types::Real;

/// In-place permutation of `(x, t)` so that the blocks flagged in `sigma`
/// (expanded to keep 2x2 blocks atomic by the caller) occupy the leading
/// positions, preserving their relative order, and likewise for the
/// unflagged blocks.
pub fn ordschur<T: Real>(x: &mut DMatrix<T>, t: &mut DMatrix<T>, sigma: &mut [bool]) {
    loop {
        let blk = blocks(t);
        debug_assert!(
            blk.iter().all(|&(s, l)| l != 2 || sigma[s] == sigma[s + 1]),
            "ordschur precondition violated: a 2x2 block is only partially selected"
        );

        // Find the first adjacent pair of blocks that is out of order (an
        // unselected block immediately followed by a selected one) and
        // swap them. Repeat until no such pair remains: this is exactly a
        // bubble-sort stable partition over blocks, which reproduces the
        // destination permutation the spec describes (selected blocks
        // numbered first in original relative order, unselected after).
        let mut swapped = false;
        for w in 0..blk.len().saturating_sub(1) {
            let (s0, l0) = blk[w];
            let (s1, l1) = blk[w + 1];
            if !sigma[s0] && sigma[s1] {
                swap_adjacent_blocks(x, t, blk[w], blk[w + 1]);
                // `sigma` is indexed by absolute column position; the
                // content that used to occupy block 1 (selected) now
                // starts at s0 and vice versa, so the flags must move
                // with their content, not with the index.
                for i in 0..l1 {
                    sigma[s0 + i] = true;
                }
                for i in 0..l0 {
                    sigma[s0 + l1 + i] = false;
                }
                swapped = true;
                break;
            }
        }
        if !swapped {
            break;
        }
    }
}

/// Swap two adjacent diagonal blocks `a = (start_a, len_a)` and
/// `b = (start_b, len_b)` (with `start_b == start_a + len_a`) of `t`,
/// updating `x` to match, using the block-exchange technique of Bai &
/// Demmel: solve the Sylvester equation coupling the two blocks, then
/// orthogonally complete the resulting subspace basis via Gram-Schmidt.
fn swap_adjacent_blocks<T: Real>(x: &mut DMatrix<T>, t: &mut DMatrix<T>, a: (usize, usize), b: (usize, usize)) {
    let (start_a, len_a) = a;
    let (start_b, len_b) = b;
    debug_assert_eq!(start_b, start_a + len_a);
    let width = len_a + len_b;
    let start = start_a;

    let m = t.nrows();
    let a_mat = t.view((start_a, start_a), (len_a, len_a)).clone_owned();
    let b_mat = t.view((start_b, start_b), (len_b, len_b)).clone_owned();
    let c_mat = t.view((start_a, start_b), (len_a, len_b)).clone_owned();

    // Solve A Y - Y B = -C for Y (len_a x len_b).
    let y = solve_sylvester(&a_mat, &b_mat, &c_mat);

    // N = [-Y; I_lb], orthonormalize its columns, then complete to a full
    // `width x width` orthogonal basis: the first `len_b` columns span the
    // invariant subspace of `B`'s eigenvalues, so applying this orthogonal
    // matrix as a similarity transform brings the `B` block to the front.
    let mut n = DMatrix::<T>::zeros(width, len_b);
    for col in 0..len_b {
        for row in 0..len_a {
            n[(row, col)] = -y[(row, col)];
        }
        n[(len_a + col, col)] = T::one();
    }
    let q = orthogonal_completion(&n);

    // Apply the similarity transform to the local (width x width) block of
    // t, and to the corresponding columns of x.
    let local_t = t.view((start, start), (width, width)).clone_owned();
    let new_local_t = q.transpose() * &local_t * &q;
    t.view_mut((start, start), (width, width)).copy_from(&new_local_t);

    // Off-diagonal coupling with the rest of the matrix also needs the
    // rotation applied on the corresponding side.
    if start > 0 {
        let left = t.view((0, start), (start, width)).clone_owned();
        let new_left = &left * &q;
        t.view_mut((0, start), (start, width)).copy_from(&new_left);
    }
    if start + width < m {
        let below = t.view((start, start + width), (width, m - start - width)).clone_owned();
        let new_below = q.transpose() * &below;
        t.view_mut((start, start + width), (width, m - start - width)).copy_from(&new_below);
    }

    let xcols = x.view((0, start), (x.nrows(), width)).clone_owned();
    let new_xcols = &xcols * &q;
    x.view_mut((0, start), (x.nrows(), width)).copy_from(&new_xcols);
}

/// Solve the Sylvester equation `A Y - Y B = -C` for `Y` (`la x lb`), via
/// the Kronecker-sum linear system `vec(A Y) - vec(Y B) = -vec(C)`,
/// `(I_lb (x) A - B^T (x) I_la) vec(Y) = -vec(C)`. `la, lb` are at most 2
/// here, so the assembled system is at most 4x4.
fn solve_sylvester<T: Real>(a: &DMatrix<T>, b: &DMatrix<T>, c: &DMatrix<T>) -> DMatrix<T> {
    let la = a.nrows();
    let lb = b.nrows();
    let n = la * lb;
    let mut k = DMatrix::<T>::zeros(n, n);
    for col in 0..lb {
        for row in 0..la {
            let out_idx = col * la + row;
            for r in 0..la {
                k[(out_idx, col * la + r)] += a[(row, r)];
            }
            for s in 0..lb {
                k[(out_idx, s * la + row)] -= b[(s, col)];
            }
        }
    }
    let mut rhs = nalgebra::DVector::<T>::zeros(n);
    for col in 0..lb {
        for row in 0..la {
            rhs[col * la + row] = -c[(row, col)];
        }
    }
    let y_vec = k
        .lu()
        .solve(&rhs)
        .expect("Sylvester system for disjoint Ritz blocks should be non-singular");
    let mut y = DMatrix::<T>::zeros(la, lb);
    for col in 0..lb {
        for row in 0..la {
            y[(row, col)] = y_vec[col * la + row];
        }
    }
    y
}

/// Extend the orthonormal columns of `n` (`width x k`, `k <= width`) to a
/// full `width x width` orthogonal matrix via modified Gram-Schmidt against
/// the standard basis.
fn orthogonal_completion<T: Real>(n: &DMatrix<T>) -> DMatrix<T> {
    let width = n.nrows();
    let k = n.ncols();
    let mut cols: Vec<nalgebra::DVector<T>> = Vec::with_capacity(width);

    for col in 0..k {
        let mut v = n.column(col).clone_owned();
        for prev in &cols {
            let proj = prev.dot(&v);
            v -= prev * proj;
        }
        let norm = v.dot(&v).sqrt();
        cols.push(v / norm);
    }

    let mut e = 0usize;
    while cols.len() < width {
        let mut v = nalgebra::DVector::<T>::zeros(width);
        v[e] = T::one();
        e += 1;
        for prev in &cols {
            let proj = prev.dot(&v);
            v -= prev * proj;
        }
        let norm = v.dot(&v).sqrt();
        if norm > T::default_epsilon().sqrt() {
            cols.push(v / norm);
        }
    }

    let mut q = DMatrix::<T>::zeros(width, width);
    for (j, col) in cols.into_iter().enumerate() {
        q.set_column(j, &col);
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swaps_two_1x1_blocks_to_front() {
        let mut t = DMatrix::from_row_slice(3, 3, &[
            1.0, 1.0, 1.0,
            0.0, 2.0, 1.0,
            0.0, 0.0, 3.0,
        ]);
        let mut x = DMatrix::<f64>::identity(3, 3);
        let mut sigma = vec![false, false, true];

        ordschur(&mut x, &mut t, &mut sigma);

        // x^T t x should have eigenvalue 3 leading.
        assert!((t[(0, 0)] - 3.0).abs() < 1e-8 || (t[(1, 1)] - 3.0).abs() < 1e-8);

        // Similarity is preserved: x * t * x^T should reproduce the
        // original spectrum (trace is invariant).
        let trace: f64 = t.diagonal().iter().sum();
        assert!((trace - 6.0).abs() < 1e-8);

        // x stays orthogonal.
        let gram = x.transpose() * &x;
        for i in 0..3 {
            for j in 0..3 {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert!((gram[(i, j)] - expect).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn preserves_2x2_block_when_moving_it_to_front() {
        let mut t = DMatrix::from_row_slice(3, 3, &[
            4.0, 0.0, 0.0,
            0.0, 1.0, -2.0,
            0.0, 3.0, 1.0,
        ]);
        let mut x = DMatrix::<f64>::identity(3, 3);
        let mut sigma = vec![false, true, true];

        ordschur(&mut x, &mut t, &mut sigma);

        let blk = blocks(&t);
        assert!(blk.iter().any(|&(s, l)| s == 0 && l == 2), "2x2 block should now lead: {blk:?}");
    }
}
