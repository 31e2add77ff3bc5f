//! sigbench: indicator-driven signal scoring and Monte Carlo trade validation.
//!
//! Hexagonal architecture: numeric core in [`domain`], collaborator traits in
//! [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
