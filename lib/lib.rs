//! Factor dense many-body wavefunction tensors into matrix product states
//! (MPS) by repeated singular value decomposition, and contract such chains
//! back into dense tensors.
//!
//! An *n*-site wavefunction whose indices all share one physical dimension
//! *d* is decomposed into a chain of 2*n* − 1 positions, alternating between
//! site tensors `U[k]` and diagonal bond matrices `S[k]` holding the
//! singular values found at each bipartition of the state:
//!
//! ```text
//! U[0] --- S[0] --- U[1] --- S[1] --- ... --- S[n-2] --- U[n-1]
//!  |                 |                                     |
//!  | <- physical     | <- physical                         | <- physical
//!       index 0           index 1                               index n-1
//! ```
//!
//! Zeroing all singular values past a caller-chosen rank bound yields a
//! controlled-accuracy approximation of the original tensor; with a bound at
//! or above every bond's full rank, contraction recovers the input exactly
//! up to floating point. Two sweeps are available: [`decompose`] leaves the
//! factors exactly as the SVD produces them, while [`canonical_decompose`]
//! absorbs singular values into the right factor at each cut and corrects
//! each site by the pseudo-inverse of the bond to its left, so that every
//! left block of the result is an isometry up to the truncation rank.
//!
//! # Example
//!
//! ```
//! use ndarray as nd;
//! use rand::{ Rng, SeedableRng, rngs::StdRng };
//! use mps_chain::{ decompose, Boundary };
//!
//! // a random normalized three-qubit state
//! let mut rng = StdRng::seed_from_u64(10);
//! let mut psi: nd::ArrayD<f64>
//!     = nd::ArrayD::from_shape_fn(
//!         nd::IxDyn(&[2, 2, 2]), |_| rng.gen_range(-1.0..1.0));
//! let norm = psi.iter().map(|a| a * a).sum::<f64>().sqrt();
//! psi.mapv_inplace(|a| a / norm);
//!
//! // a rank bound of 8 exceeds every bond's full rank, so nothing is
//! // truncated
//! let chain = decompose(psi.clone(), 8).unwrap();
//! assert_eq!(chain.len(), 5);
//!
//! let recon = chain.contract();
//! let err = (&recon - &psi).iter().map(|a| a * a).sum::<f64>().sqrt();
//! assert!(err < 1e-10);
//!
//! // fold the bond matrices into neighboring sites, leaving physical
//! // tensors only
//! let phys = chain.reduce_to_physical(Boundary::Open);
//! assert_eq!(phys.len(), 3);
//! assert!(phys.iter().all(|t| t.is_site()));
//! ```

pub mod axes;
pub mod svd;
pub mod chain;
pub mod decomp;

pub use chain::{ Boundary, Chain, ChainTensor, MpsError, MpsResult };
pub use decomp::{ canonical_decompose, decompose, SVAL_FLOOR };
