//! Session-oriented scripting API.

pub(crate) mod script_session;
