//! Animation timeline: curves, tracks, the engine and the host timer seam.

pub(crate) mod ease;
pub(crate) mod engine;
pub(crate) mod lerp;
pub(crate) mod scheduler;
pub(crate) mod track;
