//! # Reconciler Provider Library
//!
//! A sample provider built on `reconciler-framework`: three resource types, the in-memory
//! cloud service they talk to, and the wiring that puts them behind a registry. Exposed as a
//! library so integration tests can drive it.

pub mod cloud;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod resources;
