//! # coatingtk Materials
//!
//! Concrete implementations of the [`Material`](coatingtk_core::Material)
//! and [`MaterialLookup`](coatingtk_core::MaterialLookup) contracts.
//!
//! | Model | Parameters |
//! |-------|------------|
//! | Constant index | `n` |
//! | Sellmeier (three-term) | `B[3]`, `C[3]` (µm²) |
//!
//! Materials may carry mechanical properties (Young's modulus, Poisson
//! ratio, loss angle) for thermal-noise analyses.

pub mod dispersion;
pub mod library;

pub use dispersion::{Dispersion, DispersiveMaterial};
pub use library::{LibraryError, MaterialDef, MaterialLibrary};
