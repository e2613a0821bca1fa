//! Typed variable runtime: declarations, expressions, bindings and handlers.

pub(crate) mod context;
pub(crate) mod expression;
pub(crate) mod handlers;
pub(crate) mod interpolate;
pub(crate) mod variables;
