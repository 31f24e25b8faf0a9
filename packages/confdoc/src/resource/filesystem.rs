//! Filesystem, search-root and HTTP resource loading.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use globset::GlobBuilder;
use reqwest::blocking::Client;
use url::Url;
use walkdir::WalkDir;

use super::{split_pattern, Resource, ResourceLoader};
use crate::config::{has_wildcard, ALL_SEARCH_ROOTS_PREFIX, SEARCH_ROOT_PREFIX};
use crate::error::{ReaderError, Result};
use crate::http::{create_client, download_text};

/// Loader for `file:` URLs, plain paths, `http(s):` URLs and search roots.
///
/// Search roots play the role of a classpath: `classpath:conf/app.xml`
/// resolves against the first root containing the file, while
/// `classpath*:conf/app.xml` yields the file from every root that has it.
/// Wildcards (`*`, `**`, `?`, `[..]`, `{a,b}`) are supported in the last
/// part of any file location.
///
/// The HTTP client is created on first use and shared by clones.
#[derive(Debug, Clone, Default)]
pub struct DefaultResourceLoader {
    search_roots: Vec<PathBuf>,
    client: OnceLock<Client>,
}

impl DefaultResourceLoader {
    /// Create a loader without search roots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a search root.
    #[must_use]
    pub fn with_search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_roots.push(root.into());
        self
    }

    /// Add several search roots.
    #[must_use]
    pub fn with_search_roots(mut self, roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.search_roots.extend(roots.into_iter().map(Into::into));
        self
    }

    /// Configured search roots in lookup order.
    #[must_use]
    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    fn http_client(&self) -> Result<&Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = create_client()?;
        Ok(self.client.get_or_init(|| client))
    }

    fn path_resources(&self, path: &Path) -> Result<Vec<Resource>> {
        let text = path.to_string_lossy();
        if has_wildcard(&text) {
            let (base, pattern) = split_pattern(&text);
            let base = if base.is_empty() { "." } else { base };
            find_matching(Path::new(base), pattern)
        } else {
            Ok(vec![Resource::from_path(path)?])
        }
    }

    fn root_resources(&self, root: &Path, relative: &str) -> Result<Vec<Resource>> {
        let path = root.join(relative);
        if has_wildcard(relative) {
            self.path_resources(&path)
        } else if path.is_file() {
            Ok(vec![Resource::from_path(&path)?])
        } else {
            Ok(Vec::new())
        }
    }
}

impl ResourceLoader for DefaultResourceLoader {
    fn resources(&self, location: &str) -> Result<Vec<Resource>> {
        if let Some(relative) = location.strip_prefix(ALL_SEARCH_ROOTS_PREFIX) {
            let relative = relative.trim_start_matches('/');
            let mut found = Vec::new();
            for root in &self.search_roots {
                found.extend(self.root_resources(root, relative)?);
            }
            tracing::trace!(location, matches = found.len(), "Resolved search-root pattern");
            return Ok(found);
        }

        if let Some(relative) = location.strip_prefix(SEARCH_ROOT_PREFIX) {
            let relative = relative.trim_start_matches('/');
            for root in &self.search_roots {
                let found = self.root_resources(root, relative)?;
                if !found.is_empty() {
                    return Ok(found);
                }
            }
            if has_wildcard(relative) {
                return Ok(Vec::new());
            }
            return Err(ReaderError::ResourceNotFound(format!(
                "search-root resource [{relative}]"
            )));
        }

        match Url::parse(location) {
            Ok(url) => match url.scheme() {
                "file" => {
                    let path = url
                        .to_file_path()
                        .map_err(|()| ReaderError::UnsupportedLocation(location.to_string()))?;
                    self.path_resources(&path)
                }
                "http" | "https" => Ok(vec![Resource::from_url(url)]),
                _ => Err(ReaderError::UnsupportedLocation(location.to_string())),
            },
            Err(_) => self.path_resources(Path::new(location)),
        }
    }

    fn exists(&self, resource: &Resource) -> bool {
        match resource.url() {
            Some(url) if url.scheme() == "file" => {
                resource.file_path().is_some_and(|path| path.is_file())
            }
            Some(url) => matches!(url.scheme(), "http" | "https"),
            None => false,
        }
    }

    fn read_to_string(&self, resource: &Resource) -> Result<String> {
        let url = resource.url_or_error()?;
        match url.scheme() {
            "file" => {
                let path = resource
                    .file_path()
                    .ok_or_else(|| ReaderError::UnsupportedLocation(url.to_string()))?;
                std::fs::read_to_string(&path).map_err(|e| match e.kind() {
                    ErrorKind::NotFound => {
                        ReaderError::ResourceNotFound(resource.description().to_string())
                    }
                    _ => ReaderError::Io(e),
                })
            }
            "http" | "https" => download_text(self.http_client()?, url.as_str()),
            _ => Err(ReaderError::UnsupportedLocation(url.to_string())),
        }
    }
}

/// Find files below `base` whose relative path matches `pattern`.
fn find_matching(base: &Path, pattern: &str) -> Result<Vec<Resource>> {
    if !base.is_dir() {
        tracing::trace!(base = %base.display(), "Pattern base directory does not exist");
        return Ok(Vec::new());
    }

    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher();

    let mut found = Vec::new();
    for entry in WalkDir::new(base).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(base) else {
            continue;
        };
        if matcher.is_match(relative) {
            found.push(Resource::from_path(entry.path())?);
        }
    }
    Ok(found)
}
