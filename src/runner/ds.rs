//! Runtime data structures: values, strings, objects and their kinds,
//! environments, execution contexts and call frames.

pub mod arguments_object;
pub mod array_object;
pub mod env_record;
pub mod error;
pub mod execution_context;
pub mod frame;
pub mod function_object;
pub mod heap;
pub mod lex_env;
pub mod misc;
pub mod object;
pub mod object_property;
pub mod operations;
pub mod realm;
pub mod regexp_object;
pub mod string;
pub mod string_object;
pub mod value;
