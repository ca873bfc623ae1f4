//! Sequential SVD sweeps factoring a dense wavefunction tensor into an MPS
//! chain.
//!
//! Both sweeps walk the chain left to right, at each step reshaping the
//! carried residual into a bipartite matrix, factorizing it, and threading
//! the left factor into the chain as a site tensor with the singular values
//! as the adjacent bond matrix. [`decompose`] truncates each bond as it is
//! produced and carries the full right factor forward; in
//! [`canonical_decompose`] the singular values are instead absorbed into the
//! right factor, and each bond is finalized one step late, after its raw
//! values have served to pseudo-invert the correction applied to the next
//! site; this leaves every left block of the chain an isometry up to the
//! truncation rank.

use ndarray as nd;
use ndarray_linalg::types::{ Lapack, Scalar };
use num_traits::Float;
use crate::{
    axes::{ self, dim_pow },
    chain::{ Chain, MpsResult },
    svd::{ self, Factors },
};

/// Singular values at or below this floor are treated as exactly zero when
/// inverting a bond matrix, to keep the pseudo-inverse from blowing up.
pub const SVAL_FLOOR: f64 = 1e-3;

fn standardize<A>(psi: nd::ArrayD<A>) -> nd::ArrayD<A>
where A: Scalar
{
    if psi.is_standard_layout() {
        psi
    } else {
        psi.as_standard_layout().to_owned()
    }
}

/// Factor a wavefunction tensor into a chain of 2*n* − 1 alternating site
/// tensors and bond matrices.
///
/// At each bond, all singular values from `rank_bound` on are zeroed. If
/// `rank_bound` is at least as large as every bond's full rank, the original
/// tensor is recovered exactly (up to floating point) by
/// [`Chain::contract`]; smaller bounds trade accuracy for lower effective
/// bond dimension.
///
/// Fails if the axes of `psi` do not all share one extent.
#[inline]
pub fn decompose<A>(psi: nd::ArrayD<A>, rank_bound: usize)
    -> MpsResult<Chain<A>>
where A: Scalar + Lapack
{
    let (d, n) = axes::validate_uniform(psi.shape())?;
    let psi = standardize(psi);
    if n == 1 {
        return Ok(Chain::from_parts(d, vec![psi], Vec::new()));
    }
    let mut sites: Vec<nd::ArrayD<A>> = Vec::with_capacity(n);
    let mut bonds: Vec<nd::Array2<A>> = Vec::with_capacity(n - 1);

    // first cut: split the leading physical index from the rest
    let q = psi.into_shape(axes::forward_split(d, n, 0).dims()).unwrap();
    let Factors { u, s, vh, .. } = svd::factorize(q, rank_bound);
    sites.push(u.into_dyn());
    bonds.push(s);
    let mut resid = vh;

    // interior cuts regroup the previous step's full right factor
    for i in 1..n - 1 {
        let q = resid.into_shape(axes::forward_split(d, n, i).dims()).unwrap();
        let Factors { u, s, vh, .. } = svd::factorize(q, rank_bound);
        let site = u.into_shape(
            nd::IxDyn(&[dim_pow(d, n - i), d, dim_pow(d, n + 1 - i)]))
            .unwrap();
        sites.push(site);
        bonds.push(s);
        resid = vh;
    }

    // the last right factor is the final site tensor as-is
    sites.push(resid.into_dyn());
    Ok(Chain::from_parts(d, sites, bonds))
}

// Raw factors carried across one sweep step: the bond matrix is finalized
// (truncated) only after the next step has consumed the untruncated values
// for its pseudo-inverse correction.
struct PrevStep<A: Scalar> {
    raw: nd::Array1<A::Real>,
    bond: nd::Array2<A>,
}

// Transposed diagonal pseudo-inverse of a bond matrix with the given raw
// singular values. Values at or below `SVAL_FLOOR` invert to zero, and
// entries from `rank_bound` on are zeroed outright.
fn diag_pinv<A>(
    raw: &nd::Array1<A::Real>,
    rank_bound: usize,
    shape: (usize, usize),
) -> nd::Array2<A>
where A: Scalar
{
    let floor = A::real(SVAL_FLOOR);
    let mut pinv: nd::Array2<A> = nd::Array::zeros(shape);
    let m = raw.len().min(shape.0).min(shape.1).min(rank_bound);
    for (j, sj) in raw.iter().enumerate().take(m) {
        if *sj > floor {
            pinv[[j, j]] = A::from_real(Float::recip(*sj));
        }
    }
    pinv
}

/// Like [`decompose`], but produce a left-canonical chain.
///
/// Singular values are absorbed into the right factor at each cut, and each
/// site tensor after the first is corrected by the pseudo-inverse of the
/// bond to its left, reconstructed from that bond's untruncated singular
/// values with anything at or below [`SVAL_FLOOR`] mapped to zero. Bonds are
/// truncated to `rank_bound` one step behind the sweep; the final bond keeps
/// its full set of singular values.
///
/// Fails if the axes of `psi` do not all share one extent.
#[inline]
pub fn canonical_decompose<A>(psi: nd::ArrayD<A>, rank_bound: usize)
    -> MpsResult<Chain<A>>
where A: Scalar + Lapack
{
    let (d, n) = axes::validate_uniform(psi.shape())?;
    let psi = standardize(psi);
    if n == 1 {
        return Ok(Chain::from_parts(d, vec![psi], Vec::new()));
    }
    let mut sites: Vec<nd::ArrayD<A>> = Vec::with_capacity(n);
    let mut bonds: Vec<nd::Array2<A>> = Vec::with_capacity(n - 1);

    let q = psi.into_shape(axes::canonical_split(d, n, 0).dims()).unwrap();
    let f0 = svd::factorize(q, usize::MAX);
    sites.push(f0.u.into_dyn());
    let mut last = f0.vh;
    let mut prev = PrevStep { raw: f0.svals, bond: f0.s };

    for i in 1..n - 1 {
        // the carried residual is the previous right factor weighted by its
        // singular values
        let resid = prev.bond.dot(&last);
        let q = resid.into_shape(axes::canonical_split(d, n, i).dims())
            .unwrap();
        let f = svd::factorize(q, usize::MAX);

        // lagged correction: pseudo-invert the previous bond and fold the
        // inverse into this step's left factor, then finalize that bond at
        // the truncation rank
        let pinv: nd::Array2<A> = diag_pinv(
            &prev.raw,
            rank_bound,
            (prev.bond.ncols(), prev.bond.nrows()),
        );
        let mut bond = prev.bond;
        svd::zero_tail(&mut bond, rank_bound);
        bonds.push(bond);

        let u = f.u.into_shape((dim_pow(d, i), dim_pow(d, i + 2))).unwrap();
        let site = pinv.dot(&u)
            .into_shape(nd::IxDyn(&[pinv.nrows(), d, dim_pow(d, i + 1)]))
            .unwrap();
        sites.push(site);

        last = f.vh;
        prev = PrevStep { raw: f.svals, bond: f.s };
    }

    // the final bond keeps its full singular values, and the last bare
    // right factor becomes the final site tensor
    bonds.push(prev.bond);
    sites.push(last.into_dyn());
    Ok(Chain::from_parts(d, sites, bonds))
}
