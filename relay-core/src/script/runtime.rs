//! Lua runtime for transform and scheduling scripts
//!
//! Provides a sandboxed Lua environment. A script is the body of a function
//! receiving `(payload, context)`; those two arguments and the `lib` table
//! are the only capabilities granted.

use anyhow::{Context, Result};
use mlua::{Function, Lua, StdLib, Value};
use std::sync::Arc;

use crate::lookup::LookupResolver;

use super::stdlib::register_stdlib;

/// Deepest result structure a script may return; cyclic tables would
/// otherwise recurse without bound and take the host down with a stack
/// overflow.
const MAX_RESULT_DEPTH: usize = 64;

/// A sandboxed Lua runtime for executing user scripts
pub struct ScriptRuntime {
    lua: Lua,
}

impl ScriptRuntime {
    /// Create a new sandboxed runtime
    pub fn new(lookups: Arc<dyn LookupResolver>) -> Result<Self> {
        // Limited standard libraries (no io, os, debug, package)
        let lua = Lua::new_with(
            StdLib::TABLE | StdLib::STRING | StdLib::MATH | StdLib::UTF8,
            mlua::LuaOptions::default(),
        )
        .context("Failed to create Lua runtime")?;

        // Preview payloads are small; 256MB is plenty
        lua.set_memory_limit(256 * 1024 * 1024)?;

        register_stdlib(&lua, lookups).context("Failed to register stdlib")?;

        Ok(ScriptRuntime { lua })
    }

    /// Compile a script body into `function(payload, context) <body> end`.
    ///
    /// Syntax errors in the body surface here.
    pub fn load_body(&self, body: &str) -> mlua::Result<Function> {
        let wrapped = format!("return function(payload, context)\n{}\nend", body);
        self.lua.load(&wrapped).eval::<Function>()
    }

    /// Invoke a compiled script with JSON payload and context
    pub fn call(
        &self,
        func: &Function,
        payload: &serde_json::Value,
        context: &serde_json::Value,
    ) -> mlua::Result<serde_json::Value> {
        let payload_table = self.json_to_lua(payload)?;
        let context_table = self.json_to_lua(context)?;

        let result: Value = func.call((payload_table, context_table))?;
        self.lua_to_json(result)
    }

    /// Convert JSON value to Lua value
    pub fn json_to_lua(&self, value: &serde_json::Value) -> mlua::Result<Value> {
        match value {
            serde_json::Value::Null => Ok(Value::Nil),
            serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Number(f))
                } else {
                    Ok(Value::Nil)
                }
            }
            serde_json::Value::String(s) => Ok(Value::String(self.lua.create_string(s)?)),
            serde_json::Value::Array(arr) => {
                let table = self.lua.create_table()?;
                for (i, item) in arr.iter().enumerate() {
                    table.set(i + 1, self.json_to_lua(item)?)?;
                }
                Ok(Value::Table(table))
            }
            serde_json::Value::Object(obj) => {
                let table = self.lua.create_table()?;
                for (key, val) in obj {
                    table.set(key.as_str(), self.json_to_lua(val)?)?;
                }
                Ok(Value::Table(table))
            }
        }
    }

    /// Convert Lua value to JSON.
    ///
    /// Structures nested past [`MAX_RESULT_DEPTH`] (in practice: cyclic
    /// tables) become a runtime error instead of unbounded recursion.
    pub fn lua_to_json(&self, value: Value) -> mlua::Result<serde_json::Value> {
        self.lua_to_json_at(value, 0)
    }

    fn lua_to_json_at(&self, value: Value, depth: usize) -> mlua::Result<serde_json::Value> {
        if depth > MAX_RESULT_DEPTH {
            return Err(mlua::Error::RuntimeError(format!(
                "script result exceeds {} levels of nesting (cyclic table?)",
                MAX_RESULT_DEPTH
            )));
        }

        match value {
            Value::Nil => Ok(serde_json::Value::Null),
            Value::Boolean(b) => Ok(serde_json::Value::Bool(b)),
            Value::Integer(i) => Ok(serde_json::json!(i)),
            Value::Number(n) => Ok(serde_json::json!(n)),
            Value::String(s) => Ok(serde_json::Value::String(s.to_str()?.to_string())),
            Value::Table(t) => {
                // Sequential integer keys starting at 1 mean an array
                let len = t.len()?;
                if len > 0 {
                    let mut arr = Vec::new();
                    let mut is_array = true;
                    for i in 1..=len {
                        match t.get::<Value>(i) {
                            Ok(v) => arr.push(self.lua_to_json_at(v, depth + 1)?),
                            Err(_) => {
                                is_array = false;
                                break;
                            }
                        }
                    }
                    if is_array {
                        return Ok(serde_json::Value::Array(arr));
                    }
                }

                let mut obj = serde_json::Map::new();
                for pair in t.pairs::<Value, Value>() {
                    let (k, v) = pair?;
                    let key = match k {
                        Value::String(s) => s.to_str()?.to_string(),
                        Value::Integer(i) => i.to_string(),
                        _ => continue,
                    };
                    obj.insert(key, self.lua_to_json_at(v, depth + 1)?);
                }
                Ok(serde_json::Value::Object(obj))
            }
            _ => Ok(serde_json::Value::Null),
        }
    }

    /// Get access to the underlying Lua instance
    pub fn lua(&self) -> &Lua {
        &self.lua
    }
}
