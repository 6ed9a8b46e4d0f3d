use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{ensure, Context, Result};
use percent_encoding::percent_decode_str;

use crate::handler::RequestError;

/// The directory every served file must live under.
///
/// Always absolute and free of `.`/`..` components, so a plain
/// component-wise prefix test is enough to decide containment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRoot {
    path: PathBuf,
}

impl DocumentRoot {
    /// Use an absolute path as the root after lexical normalization.
    ///
    /// The filesystem is not consulted: the directory does not need to
    /// exist, and symlinks are left alone.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure!(
            path.is_absolute(),
            "document root must be an absolute path: {}",
            path.display()
        );
        Ok(DocumentRoot {
            path: normalize(PathBuf::new(), path),
        })
    }

    /// Resolve an existing directory into a canonical root.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let canonical = fs::canonicalize(path)
            .with_context(|| format!("Failed to resolve document root {}", path.display()))?;
        ensure!(
            canonical.is_dir(),
            "document root is not a directory: {}",
            canonical.display()
        );
        Ok(DocumentRoot { path: canonical })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Map a request target onto a path under the root.
    ///
    /// Only the path component of the target is used; it is percent-decoded,
    /// stripped of every leading `/`, joined onto the root and normalized. A
    /// result that is not the root or a descendant of it is rejected before
    /// anything touches the filesystem.
    pub fn resolve(&self, target: &str) -> Result<PathBuf, RequestError> {
        let decoded = percent_decode_str(target_path(target))
            .decode_utf8()
            .map_err(|_| RequestError::InvalidTarget(target.to_string()))?;
        let relative = decoded.trim_start_matches('/');

        let resolved = normalize(self.path.clone(), Path::new(relative));
        if !resolved.starts_with(&self.path) {
            return Err(RequestError::PathTraversal(target.to_string()));
        }

        Ok(resolved)
    }
}

/// The path component of a request target: everything before `?` or `#`.
pub fn target_path(target: &str) -> &str {
    match target.find(['?', '#']) {
        Some(end) => &target[..end],
        None => target,
    }
}

/// Join `relative` onto `base`, collapsing `.` and `..` without touching the
/// filesystem. `..` never climbs above the filesystem root. Root and prefix
/// components only count while `normalized` has no root yet, so a rooted
/// `base` can never be restarted by `relative`.
fn normalize(base: PathBuf, relative: &Path) -> PathBuf {
    let mut normalized = base;
    for component in relative.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                if !normalized.has_root() {
                    normalized.push(component.as_os_str());
                }
            }
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(segment) => normalized.push(segment),
        }
    }
    normalized
}
