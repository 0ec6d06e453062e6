//! Path normalization.
//!
//! Keys are forward-slash delimited, carry no leading slash, and have `.`
//! and `..` resolved lexically. The root normalizes to the empty string.

/// Normalize a path into its cache key.
///
/// `..` segments that would climb above the root are dropped, so
/// `../../a` and `/a` both yield `a`. Nothing touches a real filesystem.
pub fn normalize(path: &str, case_insensitive: bool) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    let key = segments.join("/");
    if case_insensitive {
        key.to_lowercase()
    } else {
        key
    }
}

/// Join `path` under `prefix` and normalize the result (without case folding).
///
/// `path` is normalized on its own first, so `..` cannot climb out of `prefix`.
pub fn join(prefix: &str, path: &str) -> String {
    normalize(&format!("{prefix}/{}", normalize(path, false)), false)
}

/// Last segment of a normalized key, `"."` for the root.
pub fn base_name(key: &str) -> &str {
    match key.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => ".",
    }
}
