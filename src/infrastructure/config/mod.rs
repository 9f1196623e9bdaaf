//! Infrastructure configuration modules.

pub mod logging;
pub mod network;
pub mod settings;
