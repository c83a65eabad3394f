//! Abstract operations of the language: conversions, comparisons,
//! operators and environment lookups.

pub mod lex_env;
pub mod number_format;
pub mod object;
pub mod operators;
pub mod test_and_comparison;
pub mod type_conversion;
