//! Text handling shared by the runtime: Unicode predicates, UTF-8/UTF-16
//! transcoding and a code-unit string builder.

pub mod builder;
pub mod unicode;
pub mod utf;
