//! Application runtime composition modules.

pub(crate) mod config_manager;
pub(crate) mod exit_handler;
pub(crate) mod runtime;
