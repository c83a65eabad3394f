//! # esrt - ECMAScript 5.1 runtime for ahead-of-time compiled programs
//!
//! A compiler translates JavaScript into native functions that call back into
//! this library through the `esa_*` primitives. The library provides:
//! - NaN-boxed values, UTF-16 strings and the ES5 object model
//! - Lexical environments, execution contexts and a shared value stack
//! - The type conversion, comparison and operator algorithms
//! - The ES5 built-in library, including JSON, Date, RegExp and URI handling
//!
//! ## Running compiled code
//!
//! Every compiled function has the signature `(ctx, argc, fp, vp) -> bool`.
//! It reads its arguments from the stack slots starting at `fp`, writes its
//! result into the frame, and returns `false` after leaving an exception in
//! the pending-exception slot.
//!
//! ```
//! use esrt::runner::api::{esa_b_add, esa_frm_arg, esa_frm_set_result};
//! use esrt::runner::config::RuntimeConfig;
//! use esrt::runner::ds::frame::StackPtr;
//! use esrt::runner::ds::value::JsValue;
//! use esrt::runner::runtime;
//! use esrt::runner::types::EvalContext;
//!
//! fn global_data(_ctx: &mut EvalContext) -> bool {
//!     true
//! }
//!
//! // 1 + "2"
//! fn global_main(ctx: &mut EvalContext, argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
//!     let mut sum = JsValue::undefined();
//!     if !esa_b_add(ctx, &JsValue::number(1.0), &JsValue::str("2"), &mut sum) {
//!         return false;
//!     }
//!     esa_frm_set_result(ctx, fp, vp, sum);
//!     let _ = esa_frm_arg(ctx, argc, fp, 0);
//!     true
//! }
//!
//! let mut ctx = runtime::init(RuntimeConfig::default(), global_data).unwrap();
//! let result = runtime::run(&mut ctx, global_main).unwrap();
//! assert_eq!(result.as_string().to_string(), "12");
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - grammars for numeric strings, `parseFloat` prefixes and
//!   date strings
//! - **[`runner`]** - the runtime
//!   - **[`runner::ds`]** - values, objects, environments and abstract operations
//!   - **[`runner::std_lib`]** - built-in objects
//!   - **[`runner::api`]** - the `esa_*` primitives
//!   - **[`runner::runtime`]** - init, run and exit codes

#[macro_use]
extern crate lazy_static;

pub mod parser;
pub mod runner;
