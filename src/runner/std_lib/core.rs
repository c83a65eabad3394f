//! Core built-ins registration.
//!
//! Populates the realm's prototype skeletons and binds every built-in on
//! the global object. The order matters: later built-ins look up
//! `Object.prototype` and `Function.prototype` members installed earlier.

use log::debug;

use crate::runner::ds::error::JErrorType;
use crate::runner::types::EvalContext;

use super::array;
use super::boolean;
use super::date;
use super::error;
use super::function;
use super::global;
use super::host;
use super::json;
use super::math;
use super::number;
use super::object;
use super::regexp;
use super::string;
use super::uri;

/// Register all core built-in objects on the global object of `ctx`.
pub fn register_core_builtins(ctx: &mut EvalContext) -> Result<(), JErrorType> {
    object::register(ctx)?;
    function::register(ctx)?;
    array::register(ctx)?;
    string::register(ctx)?;
    boolean::register(ctx)?;
    number::register(ctx)?;
    math::register(ctx)?;
    date::register(ctx)?;
    regexp::register(ctx)?;
    error::register(ctx)?;
    json::register(ctx)?;
    global::register(ctx)?;
    uri::register(ctx)?;
    host::register(ctx)?;
    debug!("core built-ins registered");
    Ok(())
}
