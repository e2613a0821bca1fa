//! Slide splitting and navigation state.

pub(crate) mod controller;
