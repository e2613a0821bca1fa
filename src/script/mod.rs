//! Script front end: tokens, literal values, the command set and the static checker.

pub(crate) mod checker;
pub(crate) mod command;
pub(crate) mod tokenizer;
pub(crate) mod values;
