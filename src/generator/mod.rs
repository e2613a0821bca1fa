//! DSL generator used for export and round-trips.

pub(crate) mod dsl;
