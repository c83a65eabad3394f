//! The runtime proper: data structures, the built-in library and the
//! `esa_*` entry points used by compiled code.

pub mod api;
pub mod config;
pub mod ds;
pub mod runtime;
pub mod std_lib;
pub mod text;
pub mod types;
