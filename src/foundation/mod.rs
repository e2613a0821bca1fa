pub(crate) mod config;
pub(crate) mod core;
pub(crate) mod diagnostics;
pub(crate) mod error;
