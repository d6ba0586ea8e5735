//! Standard library functions for user scripts
//!
//! Implements the `lib.*` namespace available to transform and scheduling
//! scripts: string case transforms, date arithmetic over RFC 3339
//! timestamps, and lookup-table resolution through the injected resolver.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use mlua::{Function, Lua, Result as LuaResult, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::lookup::LookupResolver;

/// Register the `lib` table with all standard library functions
pub fn register_stdlib(lua: &Lua, lookups: Arc<dyn LookupResolver>) -> LuaResult<()> {
    let lib = lua.create_table()?;

    // String functions
    lib.set("lower", create_lower_fn(lua)?)?;
    lib.set("upper", create_upper_fn(lua)?)?;
    lib.set("trim", create_trim_fn(lua)?)?;
    lib.set("split", create_split_fn(lua)?)?;
    lib.set("contains", create_contains_fn(lua)?)?;
    lib.set("starts_with", create_starts_with_fn(lua)?)?;
    lib.set("ends_with", create_ends_with_fn(lua)?)?;

    // Date functions
    lib.set("now", create_now_fn(lua)?)?;
    lib.set("parse_date", create_parse_date_fn(lua)?)?;
    lib.set("format_date", create_format_date_fn(lua)?)?;
    lib.set("add_days", create_add_days_fn(lua)?)?;
    lib.set("add_hours", create_add_hours_fn(lua)?)?;
    lib.set("add_minutes", create_add_minutes_fn(lua)?)?;

    // Lookup table resolution (with injected resolver)
    lib.set("lookup", create_lookup_fn(lua, lookups)?)?;

    // GUID functions
    lib.set("guid", create_guid_fn(lua)?)?;
    lib.set("is_guid", create_is_guid_fn(lua)?)?;

    // Type check functions
    lib.set("is_nil", create_is_nil_fn(lua)?)?;
    lib.set("is_string", create_is_string_fn(lua)?)?;
    lib.set("is_number", create_is_number_fn(lua)?)?;
    lib.set("is_table", create_is_table_fn(lua)?)?;
    lib.set("is_boolean", create_is_boolean_fn(lua)?)?;

    lua.globals().set("lib", lib)?;
    Ok(())
}

// =============================================================================
// String functions
// =============================================================================

/// lib.lower(s) -> string
fn create_lower_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, s: String| Ok(s.to_lowercase()))
}

/// lib.upper(s) -> string
fn create_upper_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, s: String| Ok(s.to_uppercase()))
}

/// lib.trim(s) -> string
fn create_trim_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, s: String| Ok(s.trim().to_string()))
}

/// lib.split(s, sep) -> table
fn create_split_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|lua, (s, sep): (String, String)| {
        let result = lua.create_table()?;
        for (i, part) in s.split(&sep).enumerate() {
            result.set(i + 1, part)?;
        }
        Ok(result)
    })
}

/// lib.contains(s, needle) -> boolean
fn create_contains_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, (s, needle): (String, String)| Ok(s.contains(&needle)))
}

/// lib.starts_with(s, prefix) -> boolean
fn create_starts_with_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, (s, prefix): (String, String)| Ok(s.starts_with(&prefix)))
}

/// lib.ends_with(s, suffix) -> boolean
fn create_ends_with_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, (s, suffix): (String, String)| Ok(s.ends_with(&suffix)))
}

// =============================================================================
// Date functions (RFC 3339 strings)
// =============================================================================

fn parse_rfc3339(s: &str) -> LuaResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .map_err(|e| mlua::Error::RuntimeError(format!("invalid date '{}': {}", s, e)))
}

/// lib.now() -> string (current UTC time, RFC 3339)
fn create_now_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, ()| Ok(Utc::now().to_rfc3339()))
}

/// lib.parse_date(s) -> string|nil (normalized RFC 3339, nil if unparsable)
fn create_parse_date_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, s: String| {
        Ok(DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|d| d.to_rfc3339()))
    })
}

/// lib.format_date(s, fmt) -> string (strftime formatting)
fn create_format_date_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, (s, fmt): (String, String)| {
        let date = parse_rfc3339(&s)?;

        // Reject invalid strftime specifiers up front; formatting them
        // panics inside Display otherwise.
        use chrono::format::{Item, StrftimeItems};
        if StrftimeItems::new(&fmt).any(|item| matches!(item, Item::Error)) {
            return Err(mlua::Error::RuntimeError(format!(
                "invalid date format '{}'",
                fmt
            )));
        }

        Ok(date.format(&fmt).to_string())
    })
}

/// lib.add_days(s, n) -> string
fn create_add_days_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, (s, n): (String, i64)| {
        Ok((parse_rfc3339(&s)? + Duration::days(n)).to_rfc3339())
    })
}

/// lib.add_hours(s, n) -> string
fn create_add_hours_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, (s, n): (String, i64)| {
        Ok((parse_rfc3339(&s)? + Duration::hours(n)).to_rfc3339())
    })
}

/// lib.add_minutes(s, n) -> string
fn create_add_minutes_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, (s, n): (String, i64)| {
        Ok((parse_rfc3339(&s)? + Duration::minutes(n)).to_rfc3339())
    })
}

// =============================================================================
// Lookup resolution
// =============================================================================

/// lib.lookup(code, lookup_type) -> string|nil
fn create_lookup_fn(lua: &Lua, lookups: Arc<dyn LookupResolver>) -> LuaResult<Function> {
    lua.create_function(move |_, (code, lookup_type): (String, String)| {
        Ok(lookups.resolve(&code, &lookup_type))
    })
}

// =============================================================================
// GUID functions
// =============================================================================

/// lib.guid() -> string
fn create_guid_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, ()| Ok(Uuid::new_v4().to_string()))
}

/// lib.is_guid(s) -> boolean
fn create_is_guid_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, s: String| Ok(Uuid::parse_str(&s).is_ok()))
}

// =============================================================================
// Type check functions
// =============================================================================

fn create_is_nil_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, v: Value| Ok(matches!(v, Value::Nil)))
}

fn create_is_string_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, v: Value| Ok(matches!(v, Value::String(_))))
}

fn create_is_number_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, v: Value| {
        Ok(matches!(v, Value::Integer(_) | Value::Number(_)))
    })
}

fn create_is_table_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, v: Value| Ok(matches!(v, Value::Table(_))))
}

fn create_is_boolean_fn(lua: &Lua) -> LuaResult<Function> {
    lua.create_function(|_, v: Value| Ok(matches!(v, Value::Boolean(_))))
}
