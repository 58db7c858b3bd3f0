//! The spatial weights engine.
//!
//! This module provides:
//! - **errors**: Error types for construction and mutation failures
//! - **weights**: Core weights container with ordering, iteration, and the
//!   transformation cache
//! - **transform**: The closed set of weight normalization schemes
//! - **characteristics**: Derived moments and cardinality statistics
//! - **asymmetry**: Detection of non-reciprocated and mismatched edges

pub mod asymmetry;
pub mod characteristics;
pub mod errors;
pub mod transform;
pub mod weights;
