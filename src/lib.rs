//! `tastools` is a small toolkit for planning and analysing triple-axis
//! neutron spectrometer experiments
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use tastools_utils as utils;

#[cfg(feature = "angles")]
#[cfg_attr(docsrs, doc(cfg(feature = "angles")))]
#[doc(inline)]
pub use tastools_angles as angles;

#[cfg(feature = "reso")]
#[cfg_attr(docsrs, doc(cfg(feature = "reso")))]
#[doc(inline)]
pub use tastools_reso as reso;
