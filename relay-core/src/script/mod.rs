//! Sandboxed script execution
//!
//! User scripts are Lua function bodies receiving `(payload, context)`.
//! The sandbox grants nothing else beyond the `lib` utility namespace.

pub mod evaluate;
pub mod runtime;
pub mod stdlib;

pub use evaluate::{evaluate_script, NO_SCRIPT_MESSAGE};
pub use runtime::ScriptRuntime;
