//! Index bookkeeping for the decomposition sweeps and the contractor:
//! validating input shapes, computing the bipartition used to reshape a
//! residual into a matrix at each sweep step, and generating the fused
//! shapes for pairwise tensor contraction.
//!
//! No numerical work happens here.

use crate::chain::{ MpsError::*, MpsResult };

/// Verify that every axis of `shape` matches the leading axis, returning the
/// shared physical dimension `d` and the site count `n`.
///
/// Fails with [`ShapeMismatch`][crate::chain::MpsError::ShapeMismatch] on the
/// first non-matching axis, before any numerical work can run.
#[inline]
pub fn validate_uniform(shape: &[usize]) -> MpsResult<(usize, usize)> {
    let Some((&d, rest)) = shape.split_first() else { return Err(EmptySystem); };
    if d == 0 { return Err(UnphysicalIndex); }
    if let Some((axis, &len))
        = rest.iter().enumerate().find(|(_, len)| **len != d)
    {
        return Err(ShapeMismatch { axis: axis + 1, len, expected: d });
    }
    Ok((d, shape.len()))
}

/// Row/column extents of the bipartite matrix formed at one sweep step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Split {
    /// Fused row extent.
    pub rows: usize,
    /// Fused column extent.
    pub cols: usize,
}

impl Split {
    /// The split as reshape dimensions.
    #[inline]
    pub fn dims(self) -> (usize, usize) { (self.rows, self.cols) }
}

#[inline]
pub(crate) fn dim_pow(d: usize, exp: usize) -> usize { d.pow(exp as u32) }

/// Bipartition for step `i` of the plain sweep.
///
/// Step 0 splits the leading physical index from the rest of the
/// wavefunction; interior steps regroup the previous step's full right
/// factor, whose row and column spaces each carry `d^(n - i)` values.
#[inline]
pub fn forward_split(d: usize, n: usize, i: usize) -> Split {
    if i == 0 {
        Split { rows: d, cols: dim_pow(d, n - 1) }
    } else {
        Split { rows: dim_pow(d, n + 1 - i), cols: dim_pow(d, n - 1 - i) }
    }
}

/// Bipartition for step `i` of the canonicalizing sweep, which regroups the
/// previous step's right factor *weighted by its singular values*, a
/// `d^i × d^(n - i)` matrix; hence the differing exponents from
/// [`forward_split`].
#[inline]
pub fn canonical_split(d: usize, n: usize, i: usize) -> Split {
    if i == 0 {
        Split { rows: d, cols: dim_pow(d, n - 1) }
    } else {
        Split { rows: dim_pow(d, i + 1), cols: dim_pow(d, n - i - 1) }
    }
}

// Matrix shapes fusing the trailing axis of `a` with the leading axis of
// `b`, along with the shape of the contracted result; all other axes keep
// their relative order. The shared extents must agree exactly.
pub(crate) fn fuse_shapes(a: &[usize], b: &[usize])
    -> ((usize, usize), (usize, usize), Vec<usize>)
{
    let (lead, last) = a.split_at(a.len() - 1);
    let (first, trail) = b.split_at(1);
    assert_eq!(last[0], first[0], "contraction over mismatched bond extents");
    let rows: usize = lead.iter().product();
    let cols: usize = trail.iter().product();
    let out: Vec<usize> = lead.iter().chain(trail).copied().collect();
    ((rows, last[0]), (first[0], cols), out)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::chain::MpsError;

    #[test]
    fn uniform_extents() {
        assert_eq!(validate_uniform(&[2, 2, 2]).unwrap(), (2, 3));
        assert_eq!(validate_uniform(&[5]).unwrap(), (5, 1));
        assert!(matches!(
            validate_uniform(&[2, 2, 3]),
            Err(MpsError::ShapeMismatch { axis: 2, len: 3, expected: 2 }),
        ));
        assert!(matches!(validate_uniform(&[]), Err(MpsError::EmptySystem)));
        assert!(matches!(
            validate_uniform(&[0, 0]),
            Err(MpsError::UnphysicalIndex),
        ));
    }

    #[test]
    fn sweep_splits() {
        assert_eq!(forward_split(2, 3, 0), Split { rows: 2, cols: 4 });
        assert_eq!(forward_split(2, 3, 1), Split { rows: 8, cols: 2 });
        assert_eq!(forward_split(2, 4, 2), Split { rows: 8, cols: 2 });
        assert_eq!(canonical_split(2, 3, 0), Split { rows: 2, cols: 4 });
        assert_eq!(canonical_split(2, 3, 1), Split { rows: 4, cols: 2 });
        assert_eq!(canonical_split(2, 4, 2), Split { rows: 8, cols: 2 });
    }

    #[test]
    fn fused_contraction_shapes() {
        let (l, r, out) = fuse_shapes(&[2, 2, 8], &[8, 2]);
        assert_eq!(l, (4, 8));
        assert_eq!(r, (8, 2));
        assert_eq!(out, vec![2, 2, 2]);

        let (l, r, out) = fuse_shapes(&[2, 4], &[4, 2, 8]);
        assert_eq!(l, (2, 4));
        assert_eq!(r, (4, 16));
        assert_eq!(out, vec![2, 2, 8]);
    }
}
