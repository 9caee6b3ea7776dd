//! Turns repository method invocations into native queries for a range of
//!  NoSQL backends. A method is classified as a builtin primitive, a literal
//!  query or a query derived from its name; derived queries are parsed into a
//!  condition tree and translated for the configured [translate::Dialect], and
//!  whatever the [port::ExecutionPort] returns is shaped into the declared
//!  result.

pub mod binder;
pub mod classify;
pub mod condition;
pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod error;
#[doc(hidden)]
pub mod fuzz_helper;
pub mod lex;
pub mod method_name;
pub mod port;
pub mod shape;
pub mod translate;
pub mod value;
pub mod wildcard;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
