mod api;
#[cfg(test)]
mod numeric_string_unit_tests;

pub use api::{ParsedDate, RuntimeParser};
