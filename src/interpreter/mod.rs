//! Command interpreter: a pure-ish build step producing intents, then one apply step.

pub(crate) mod apply;
pub(crate) mod plan;
