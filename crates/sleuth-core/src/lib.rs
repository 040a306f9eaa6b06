//! # sleuth-core
//!
//! Core types and error types for Sleuth.
//!
//! This crate provides the foundational types shared across all Sleuth crates:
//! - Entity structs for the investigation pipeline (hypotheses, issues,
//!   sample descriptors, scripts, execution outcomes, investigations)
//! - Enums for categories, column types, and the investigation state machine
//! - The read-only in-memory [`dataset::Dataset`] table and its dense
//!   delimited-text encoding
//! - Capability traits for the external collaborators (text generation,
//!   remote execution, dataset access, progress reporting, heuristics)
//! - Cross-cutting error types

pub mod capability;
pub mod dataset;
pub mod entities;
pub mod enums;
pub mod errors;
