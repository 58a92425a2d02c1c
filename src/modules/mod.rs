//! Modules layer - Infrastructure components
//!
//! Contains the storage facade that wires the pool to the feature repositories.

pub mod storage;
