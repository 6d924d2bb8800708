//! Forward-slash path strings.
//!
//! Everything this tool writes for downstream consumers (file index keys,
//! server URLs) uses `/` as the separator no matter which platform produced
//! it.

use std::path::{Component, Path};

/// Replaces every backslash with a forward slash.
pub(crate) fn slash_normalize(s: &str) -> String {
    s.replace('\\', "/")
}

/// Renders a relative path with `/` between its components.
///
/// Returns `None` if any component is not valid UTF-8, since such a name
/// cannot be represented as a JSON key.
pub(crate) fn relative_slash_path(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_str()?),
            Component::CurDir => {}
            _ => parts.push(component.as_os_str().to_str()?),
        }
    }
    Some(slash_normalize(&parts.join("/")))
}

/// Joins `id` onto a base URL as a directory component and terminates it
/// with `/`.
///
/// No separator is inserted when the base already ends in one. The result is
/// slash-normalized, so a base written with backslashes still yields a usable
/// URL.
pub(crate) fn join_url_dir(base: &str, id: &str) -> String {
    let joined = if base.is_empty() || base.ends_with('/') || base.ends_with('\\') {
        format!("{base}{id}/")
    } else {
        format!("{base}/{id}/")
    };
    slash_normalize(&joined)
}
