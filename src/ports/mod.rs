//! Port traits: the boundaries between the numeric core and its collaborators.

pub mod config_port;
pub mod data_port;
pub mod notify_port;
pub mod prediction_port;
