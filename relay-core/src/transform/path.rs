//! Source path resolution from inbound payloads

/// Resolve a dot-separated path into a JSON payload.
///
/// For simple paths like "name", returns payload["name"].
/// For nested paths like "patient.name", navigates object by object.
/// Any missing or non-object intermediate yields `None` rather than an
/// error: mapping is total over any input shape.
pub fn resolve_path<'a>(
    payload: &'a serde_json::Value,
    path: &str,
) -> Option<&'a serde_json::Value> {
    if path.is_empty() {
        return None;
    }

    let mut current = payload;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }

    Some(current)
}
