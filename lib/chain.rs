//! The chain data model (alternating site tensors and bond matrices), plus
//! the contraction operations mapping a chain back to a dense tensor.
//!
//! A chain produced from an *n*-site wavefunction has 2*n* − 1 positions,
//! with site tensors at even positions and bond matrices at odd positions:
//!
//! ```text
//! U[0] --- S[0] --- U[1] --- S[1] --- ... --- S[n-2] --- U[n-1]
//!  |                 |                                     |
//!  | <- physical     | <- physical                         | <- physical
//!       index 0           index 1                               index n-1
//! ```
//!
//! [`Chain::reduce_to_physical`] folds every bond matrix into a neighboring
//! site, leaving a shorter chain of *n* physical tensors whose contraction
//! equals the full chain's.

use std::fmt;
use itertools::Itertools;
use ndarray as nd;
use ndarray_linalg::types::Scalar;
use thiserror::Error;
use crate::axes;

#[derive(Debug, Error)]
pub enum MpsError {
    /// Returned when attempting to decompose a zero-rank tensor.
    #[error("error in decomposition: cannot decompose an empty tensor")]
    EmptySystem,

    /// Returned when attempting to decompose a tensor carrying a
    /// zero-dimensional physical index.
    #[error("error in decomposition: unphysical zero-dimensional index")]
    UnphysicalIndex,

    /// Returned when a tensor's axes do not all share one extent.
    #[error("error in decomposition: axis {axis} has extent {len}, expected {expected}")]
    ShapeMismatch {
        /// Offending axis.
        axis: usize,
        /// Its extent.
        len: usize,
        /// The extent of the leading axis.
        expected: usize,
    },
}
pub type MpsResult<T> = Result<T, MpsError>;

/// Convention for folding bond matrices into neighboring site tensors when
/// reducing a chain to physical sites only.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Boundary {
    /// Periodic boundaries: each bond is absorbed into the site on its left.
    Periodic,
    /// Open boundaries: each bond is absorbed into the site on its right.
    Open,
}

/// A single chain position: either a site tensor carrying a physical index,
/// or a diagonal bond matrix of singular values.
#[derive(Clone, Debug, PartialEq)]
pub enum ChainTensor<A> {
    /// Site tensor. Rank 2 at either end of the chain, rank 3 in the
    /// interior with axis signature `[left bond, physical, right bond]`.
    Site(nd::ArrayD<A>),
    /// Rectangular diagonal matrix of singular values.
    Bond(nd::Array2<A>),
}

impl<A> ChainTensor<A> {
    /// Return `true` if `self` is a site tensor.
    #[inline]
    pub fn is_site(&self) -> bool { matches!(self, Self::Site(_)) }

    /// Return `true` if `self` is a bond matrix.
    #[inline]
    pub fn is_bond(&self) -> bool { matches!(self, Self::Bond(_)) }

    /// Return the tensor's shape.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Site(g) => g.shape(),
            Self::Bond(s) => s.shape(),
        }
    }

    /// Return a dynamic-dimensional view of the tensor.
    #[inline]
    pub fn view(&self) -> nd::ArrayViewD<'_, A> {
        match self {
            Self::Site(g) => g.view(),
            Self::Bond(s) => s.view().into_dyn(),
        }
    }
}

/// An ordered chain of site tensors and bond matrices factored from a
/// wavefunction.
///
/// Positions run 0..2n−2 with sites at even and bonds at odd positions;
/// chains returned by [`reduce_to_physical`][Self::reduce_to_physical] hold
/// site tensors only. The chain exclusively owns its tensors, and all
/// contraction operations are read-only.
#[derive(Clone, Debug, PartialEq)]
pub struct Chain<A> {
    // Alternating positions.
    pub(crate) tensors: Vec<ChainTensor<A>>,
    // Shared physical dimension.
    pub(crate) d: usize,
    // Number of physical sites.
    pub(crate) n: usize,
}

impl<A> Chain<A> {
    pub(crate) fn from_parts(
        d: usize,
        sites: Vec<nd::ArrayD<A>>,
        bonds: Vec<nd::Array2<A>>,
    ) -> Self {
        let n = sites.len();
        let tensors: Vec<ChainTensor<A>>
            = sites.into_iter().map(ChainTensor::Site)
            .interleave(bonds.into_iter().map(ChainTensor::Bond))
            .collect();
        let chain = Self { tensors, d, n };
        chain.check_links();
        chain
    }

    // adjacent positions must agree on their shared bond extent
    fn check_links(&self) {
        for (t, u) in self.tensors.iter().tuple_windows() {
            debug_assert_eq!(
                t.shape().last(), u.shape().first(),
                "chain links out of alignment",
            );
        }
    }

    /// Number of chain positions.
    #[inline]
    pub fn len(&self) -> usize { self.tensors.len() }

    /// Return `true` if the chain has no positions.
    #[inline]
    pub fn is_empty(&self) -> bool { self.tensors.is_empty() }

    /// Number of physical sites.
    #[inline]
    pub fn n(&self) -> usize { self.n }

    /// Shared physical dimension of all sites.
    #[inline]
    pub fn physical_dim(&self) -> usize { self.d }

    /// Return the tensor at position `pos`.
    #[inline]
    pub fn get(&self, pos: usize) -> Option<&ChainTensor<A>> {
        self.tensors.get(pos)
    }

    /// Iterate over all positions in order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, ChainTensor<A>> {
        self.tensors.iter()
    }

    /// Return the `k`-th site tensor.
    #[inline]
    pub fn site(&self, k: usize) -> Option<&nd::ArrayD<A>> {
        self.tensors.iter()
            .filter_map(|t| match t {
                ChainTensor::Site(g) => Some(g),
                ChainTensor::Bond(_) => None,
            })
            .nth(k)
    }

    /// Return the `k`-th bond matrix.
    #[inline]
    pub fn bond(&self, k: usize) -> Option<&nd::Array2<A>> {
        self.tensors.iter()
            .filter_map(|t| match t {
                ChainTensor::Bond(s) => Some(s),
                ChainTensor::Site(_) => None,
            })
            .nth(k)
    }
}

impl<'a, A> IntoIterator for &'a Chain<A> {
    type Item = &'a ChainTensor<A>;
    type IntoIter = std::slice::Iter<'a, ChainTensor<A>>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

// fuse the trailing axis of `acc` with the leading axis of `rhs`
fn bond_product<A>(acc: nd::ArrayD<A>, rhs: nd::ArrayViewD<'_, A>)
    -> nd::ArrayD<A>
where A: Scalar
{
    let (lsh, rsh, out) = axes::fuse_shapes(acc.shape(), rhs.shape());
    let l = acc.into_shape(lsh).unwrap();
    let r = rhs.into_shape(rsh).unwrap();
    l.dot(&r).into_shape(out).unwrap()
}

impl<A> Chain<A>
where A: Scalar
{
    /// Contract all positions left to right into a single dense tensor.
    ///
    /// For a full chain the result's rank equals the site count `n`; for a
    /// reduced chain it equals the number of retained physical tensors.
    #[inline]
    pub fn contract(&self) -> nd::ArrayD<A> {
        self.contract_through(self.tensors.len() - 1)
    }

    // contract positions 0..=pos left to right
    pub(crate) fn contract_through(&self, pos: usize) -> nd::ArrayD<A> {
        let mut iter = self.tensors[..=pos].iter();
        let first = iter.next().expect("chain has at least one position");
        iter.fold(
            first.view().to_owned(),
            |acc, t| bond_product(acc, t.view()),
        )
    }

    /// Fold every bond matrix into a neighboring site tensor, leaving a
    /// chain of physical site tensors only.
    ///
    /// Under [`Boundary::Periodic`] each bond joins the site on its left and
    /// the final site carries no bond; under [`Boundary::Open`] each bond
    /// joins the site on its right and the first site carries none. Either
    /// way the reduced chain has one position per physical site and
    /// contracts to the same tensor as `self`.
    #[inline]
    pub fn reduce_to_physical(&self, bc: Boundary) -> Self {
        let sites: Vec<&nd::ArrayD<A>>
            = self.tensors.iter()
            .filter_map(|t| match t {
                ChainTensor::Site(g) => Some(g),
                ChainTensor::Bond(_) => None,
            })
            .collect();
        let bonds: Vec<&nd::Array2<A>>
            = self.tensors.iter()
            .filter_map(|t| match t {
                ChainTensor::Bond(s) => Some(s),
                ChainTensor::Site(_) => None,
            })
            .collect();
        let phys: Vec<nd::ArrayD<A>>
            = match bc {
                Boundary::Periodic => {
                    sites.iter().enumerate()
                        .map(|(k, g)| {
                            match bonds.get(k) {
                                Some(s) =>
                                    bond_product(
                                        (*g).clone(), s.view().into_dyn()),
                                None => (*g).clone(),
                            }
                        })
                        .collect()
                },
                Boundary::Open => {
                    sites.iter().enumerate()
                        .map(|(k, g)| {
                            match k.checked_sub(1).and_then(|j| bonds.get(j)) {
                                Some(s) =>
                                    bond_product(
                                        (*s).clone().into_dyn(), g.view()),
                                None => (*g).clone(),
                            }
                        })
                        .collect()
                },
            };
        Self::from_parts(self.d, phys, Vec::new())
    }
}

impl<A> fmt::Display for Chain<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut site = 0;
        let mut bond = 0;
        for t in self.tensors.iter() {
            match t {
                ChainTensor::Site(g) => {
                    writeln!(f, "U[{}] :: {:?}", site, g.shape())?;
                    site += 1;
                },
                ChainTensor::Bond(s) => {
                    writeln!(f, "S[{}] :: {:?}", bond, s.shape())?;
                    bond += 1;
                },
            }
        }
        Ok(())
    }
}
