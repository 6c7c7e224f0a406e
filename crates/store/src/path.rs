//! Node name and path validation.
//!
//! Content store paths are `/`-separated node names starting at the store
//! root, e.g. `/BestPub/Incoming/Content/9780203807217`.

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path};

/// Validates a single node name.
///
/// ```
/// use bestpub_store::validate_name;
/// assert!(validate_name("9780203807217").is_ok());
/// assert!(validate_name("package.opf").is_ok());
/// assert!(validate_name("a/b").is_err());
/// assert!(validate_name("..").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<&str> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        exn::bail!(ErrorKind::InvalidName(name.to_string()));
    }
    Ok(name)
}

/// Splits a store path into node names, resolving `.` and `..` without ever
/// leaving the root. The root itself is the empty list.
///
/// ```
/// use bestpub_store::split_path;
/// assert_eq!(split_path("/BestPub/Incoming/").unwrap(), vec!["BestPub", "Incoming"]);
/// assert_eq!(split_path("a/../b").unwrap(), vec!["b"]);
/// assert!(split_path("/").unwrap().is_empty());
/// assert!(split_path("../etc").is_err());
/// ```
pub fn split(path: &str) -> Result<Vec<String>> {
    let mut components = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(s) => {
                let Some(s) = s.to_str() else {
                    exn::bail!(ErrorKind::InvalidPath(path.to_string()));
                };
                // Null bytes pass through Path::components() on Unix.
                validate_name(s).map_err(|_| exn::Exn::from(ErrorKind::InvalidPath(path.to_string())))?;
                components.push(s.to_string());
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.to_string())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.to_string()));
                }
            },
        }
    }
    Ok(components)
}
