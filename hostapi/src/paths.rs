//! Resolution of guest-supplied relative paths under a sandbox root.

use std::path::{Component, Path, PathBuf};

use crate::error::HostError;

/// Join `relative` onto `root`, refusing anything that could escape it:
/// absolute paths, `..` components, drive prefixes and empty paths.
pub fn resolve_under(root: &Path, relative: &str) -> Result<PathBuf, HostError> {
    let rel = Path::new(relative);
    let mut out = root.to_path_buf();
    let mut pushed = false;
    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                out.push(part);
                pushed = true;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(HostError::Rejected(format!("path escapes sandbox: {relative}")));
            }
        }
    }
    if !pushed {
        return Err(HostError::Rejected(format!("empty path: {relative:?}")));
    }
    Ok(out)
}
