//! Standard library built-in objects.
//!
//! Object, Function, Array, String, Boolean, Number, Math, Date, RegExp,
//! the Error family, JSON, the global functions and URI handling, plus the
//! host functions test harnesses rely on.

pub mod core;
pub mod object;
pub mod function;
pub mod array;
pub mod string;
pub mod boolean;
pub mod number;
pub mod math;
pub mod date;
pub mod regexp;
pub mod error;
pub mod json;
pub mod global;
pub mod uri;
pub mod host;

pub use core::register_core_builtins;
