//! The document-model boundary: element data, the mutation trait and an in-memory model.

pub(crate) mod element;
pub(crate) mod memory;
pub(crate) mod model;
