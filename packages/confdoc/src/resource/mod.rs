//! Resource abstraction: turning location strings into documents.
//!
//! A [`Resource`] identifies one document, a [`ResourceLoader`] resolves
//! location strings (possibly with wildcards or search-root prefixes) into
//! resources and reads their content.

mod filesystem;
mod memory;

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::config::{ALL_SEARCH_ROOTS_PREFIX, SEARCH_ROOT_PREFIX};
use crate::error::{ReaderError, Result};

pub use filesystem::DefaultResourceLoader;
pub use memory::InMemoryResourceLoader;

/// One loadable document.
///
/// Identity is the URL when there is one, otherwise the description. Two
/// locations resolving to the same file compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    url: Option<Url>,
    description: String,
}

impl Resource {
    /// Create a resource for a URL.
    #[must_use]
    pub fn from_url(url: Url) -> Self {
        let description = match url.scheme() {
            "file" => match url.to_file_path() {
                Ok(path) => format!("file [{}]", path.display()),
                Err(()) => format!("URL [{url}]"),
            },
            "http" | "https" => format!("URL [{url}]"),
            _ => format!("resource [{url}]"),
        };
        Self {
            url: Some(url),
            description,
        }
    }

    /// Create a resource for a filesystem path.
    ///
    /// Existing paths are canonicalized so the same file reached through
    /// different relative paths is one resource.
    pub fn from_path(path: &Path) -> Result<Self> {
        let absolute = match std::fs::canonicalize(path) {
            Ok(canonical) => canonical,
            Err(_) => std::path::absolute(path)?,
        };
        let url = Url::from_file_path(&absolute)
            .map_err(|()| ReaderError::UnsupportedLocation(absolute.display().to_string()))?;
        Ok(Self::from_url(url))
    }

    /// Create a resource for a document that was handed over as a string.
    ///
    /// Such a resource has no URL, so relative imports inside it cannot be
    /// resolved.
    #[must_use]
    pub fn inline(name: &str) -> Self {
        Self {
            url: None,
            description: format!("inline document [{name}]"),
        }
    }

    /// URL of the resource, if it has one.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Location string: the URL, or the description for inline documents.
    #[must_use]
    pub fn location(&self) -> &str {
        self.url
            .as_ref()
            .map_or(self.description.as_str(), Url::as_str)
    }

    /// Human-readable description, e.g. `file [/etc/app/beans.xml]`.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Filesystem path for `file:` resources.
    #[must_use]
    pub fn file_path(&self) -> Option<PathBuf> {
        self.url
            .as_ref()
            .filter(|url| url.scheme() == "file")
            .and_then(|url| url.to_file_path().ok())
    }

    /// Resolve a path relative to this resource.
    ///
    /// # Errors
    /// Fails for resources without a URL.
    pub fn create_relative(&self, relative: &str) -> Result<Resource> {
        let base = self.url_or_error()?;
        Ok(Self::from_url(base.join(relative)?))
    }

    /// URL of the resource, or an error for resources without one.
    ///
    /// # Errors
    /// Fails for inline resources.
    pub fn url_or_error(&self) -> Result<&Url> {
        self.url
            .as_ref()
            .ok_or_else(|| ReaderError::NoBaseLocation(self.description.clone()))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Strategy for resolving locations and reading resources.
pub trait ResourceLoader: Send + Sync {
    /// Resolve a location into resources.
    ///
    /// Locations with wildcards or the `classpath*:` prefix may yield any
    /// number of resources, including none. Plain locations yield exactly
    /// one resource, whose existence is checked when it is read.
    fn resources(&self, location: &str) -> Result<Vec<Resource>>;

    /// Check whether a resource exists.
    fn exists(&self, resource: &Resource) -> bool;

    /// Read the full content of a resource.
    fn read_to_string(&self, resource: &Resource) -> Result<String>;
}

/// Decide whether an import location is absolute.
///
/// Search-root prefixes are always absolute. Otherwise the location is
/// absolute when it parses as a URL with a scheme; anything that fails to
/// parse is treated as relative.
///
/// # Examples
/// ```
/// use confdoc::resource::is_absolute_location;
///
/// assert!(is_absolute_location("classpath*:conf/*.xml"));
/// assert!(is_absolute_location("file:///etc/app/beans.xml"));
/// assert!(!is_absolute_location("other.xml"));
/// assert!(!is_absolute_location("../shared/db.xml"));
/// ```
pub fn is_absolute_location(location: &str) -> bool {
    if location.starts_with(ALL_SEARCH_ROOTS_PREFIX) || location.starts_with(SEARCH_ROOT_PREFIX)
    {
        return true;
    }
    Url::parse(location).is_ok()
}

/// Apply a relative path to a base path, replacing the last segment.
///
/// # Examples
/// ```
/// use confdoc::resource::apply_relative_path;
///
/// assert_eq!(apply_relative_path("file:/conf/app.xml", "db.xml"), "file:/conf/db.xml");
/// assert_eq!(apply_relative_path("file:/conf/app.xml", "/db.xml"), "file:/conf/db.xml");
/// assert_eq!(apply_relative_path("app.xml", "db.xml"), "db.xml");
/// ```
pub fn apply_relative_path(path: &str, relative: &str) -> String {
    match path.rfind('/') {
        Some(separator) => {
            let mut new_path = path[..separator].to_string();
            if !relative.starts_with('/') {
                new_path.push('/');
            }
            new_path.push_str(relative);
            new_path
        }
        None => relative.to_string(),
    }
}

/// Split a wildcard path into the literal directory prefix and the pattern.
fn split_pattern(path: &str) -> (&str, &str) {
    let wildcard = path
        .find(['*', '?', '[', '{'])
        .unwrap_or(path.len());
    match path[..wildcard].rfind('/') {
        Some(separator) => (&path[..separator.max(1)], &path[separator + 1..]),
        None => ("", path),
    }
}
