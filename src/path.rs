//! Path resolution against the session directory.
//!
//! Purely lexical: nothing here touches the filesystem, so a resolved path
//! may not exist. Callers find that out when they use it.

use std::path::{Component, Path, PathBuf};

/// Resolve `input` against the absolute directory `base`.
///
/// Absolute inputs ignore `base`. The result is normalized: `.` segments are
/// dropped and `..` removes the previous component, stopping at the root.
pub fn resolve(base: &Path, input: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    if input.is_absolute() {
        normalize(input)
    } else {
        normalize(&base.join(input))
    }
}

/// Lexically normalize a path without following symlinks.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // pop() on a bare root leaves it in place
                out.pop();
            }
            Component::Normal(segment) => out.push(segment),
        }
    }
    out
}
