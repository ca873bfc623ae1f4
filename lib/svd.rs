//! Singular value decomposition with a rank-bounded truncation policy.
//!
//! Factorizations here always compute *full* (not reduced) left and right
//! factor matrices, so that a bond matrix padded with zero singular values
//! keeps every reshape downstream well-defined regardless of how hard the
//! truncation bites.

use ndarray as nd;
use ndarray_linalg::{
    SVDInto,
    types::{ Lapack, Scalar },
};
/// Full-rank SVD factors of a bipartite matrix, with singular values
/// recorded both raw and as a truncated rectangular bond matrix.
#[derive(Clone, Debug)]
pub struct Factors<A: Scalar> {
    /// Left singular vectors, `m × m`.
    pub u: nd::Array2<A>,
    /// Rectangular diagonal bond matrix, `m × n`, holding the singular
    /// values that survive truncation.
    pub s: nd::Array2<A>,
    /// All singular values, untruncated, length `min(m, n)`.
    pub svals: nd::Array1<A::Real>,
    /// Hermitian adjoint of the right singular vectors, `n × n`.
    pub vh: nd::Array2<A>,
}

/// Compute the full SVD of `q`, truncating the bond matrix to `rank_bound`.
///
/// The effective rank is `min(rank_bound, min(m, n))`: every singular value
/// at or past it is dropped from the bond matrix, while [`Factors::svals`]
/// keeps the complete set. A zero `rank_bound`, or one exceeding the
/// matrix's smaller dimension, is legal and silently clamped.
#[inline]
pub fn factorize<A>(q: nd::Array2<A>, rank_bound: usize) -> Factors<A>
where A: Scalar + Lapack
{
    let (m, n) = q.dim();
    let (Some(u), svals, Some(vh)) = q.svd_into(true, true).unwrap()
        else { unreachable!() };
    let trunc = rank_bound.min(svals.len());
    let mut s: nd::Array2<A> = nd::Array::zeros((m, n));
    for (j, sj) in svals.iter().enumerate().take(trunc) {
        s[[j, j]] = A::from_real(*sj);
    }
    Factors { u, s, svals, vh }
}

/// Zero every diagonal entry of a bond matrix from `rank_bound` on.
#[inline]
pub fn zero_tail<A>(bond: &mut nd::Array2<A>, rank_bound: usize)
where A: Scalar
{
    let r = bond.nrows().min(bond.ncols());
    for j in rank_bound.min(r)..r {
        bond[[j, j]] = A::zero();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn full_factors() {
        let q: nd::Array2<f64> = nd::array![
            [3.0, 0.0, 0.0, 0.0],
            [0.0, 2.0, 0.0, 0.0],
        ];
        let f = factorize(q, usize::MAX);
        assert_eq!(f.u.dim(), (2, 2));
        assert_eq!(f.s.dim(), (2, 4));
        assert_eq!(f.vh.dim(), (4, 4));
        assert_eq!(f.svals.len(), 2);
        assert!((f.svals[0] - 3.0).abs() < 1e-12);
        assert!((f.svals[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn truncation_zeroes_the_tail() {
        let q: nd::Array2<f64> = nd::array![
            [3.0, 0.0, 0.0],
            [0.0, 2.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let f = factorize(q, 2);
        assert!((f.s[[0, 0]] - 3.0).abs() < 1e-12);
        assert!((f.s[[1, 1]] - 2.0).abs() < 1e-12);
        assert_eq!(f.s[[2, 2]], 0.0);
        // the raw values survive alongside the truncated bond matrix
        assert!((f.svals[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_rank_bound_clears_the_bond() {
        let q: nd::Array2<f64> = nd::array![[1.0, 0.0], [0.0, 1.0]];
        let f = factorize(q, 0);
        assert!(f.s.iter().all(|x| *x == 0.0));
        assert_eq!(f.svals.len(), 2);
    }

    #[test]
    fn factors_recompose() {
        let q: nd::Array2<f64> = nd::array![
            [1.0, 2.0, 0.5],
            [0.0, 1.0, -1.0],
        ];
        let f = factorize(q.clone(), usize::MAX);
        let recon = f.u.dot(&f.s).dot(&f.vh);
        for (a, b) in recon.iter().zip(q.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn tail_zeroing_clamps() {
        let mut bond: nd::Array2<f64> = nd::Array::eye(3);
        zero_tail(&mut bond, 10);
        assert_eq!(bond, nd::Array::eye(3));
        zero_tail(&mut bond, 1);
        assert_eq!(bond[[0, 0]], 1.0);
        assert_eq!(bond[[1, 1]], 0.0);
        assert_eq!(bond[[2, 2]], 0.0);
    }
}
