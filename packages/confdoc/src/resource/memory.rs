//! In-memory documents, addressed as `memory:/path/to/doc.xml`.

use globset::GlobBuilder;
use indexmap::IndexMap;
use url::Url;

use super::{Resource, ResourceLoader};
use crate::config::{has_wildcard, ALL_SEARCH_ROOTS_PREFIX, SEARCH_ROOT_PREFIX};
use crate::error::{ReaderError, Result};

/// URL scheme of in-memory documents.
pub const MEMORY_SCHEME: &str = "memory";

/// Loader serving documents from a map, for embedding and tests.
///
/// Plain paths, `memory:` URLs and both search-root prefixes all address the
/// same document set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceLoader {
    documents: IndexMap<Url, String>,
}

impl InMemoryResourceLoader {
    /// Create an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document under a path.
    #[must_use]
    pub fn with_document(mut self, path: &str, content: impl Into<String>) -> Self {
        match memory_url(path) {
            Ok(url) => {
                self.documents.insert(url, content.into());
            }
            Err(err) => tracing::warn!(path, error = %err, "Ignoring document with invalid path"),
        }
        self
    }

    /// The resource for a stored path.
    ///
    /// # Errors
    /// Fails when the path cannot be expressed as a URL.
    pub fn resource(&self, path: &str) -> Result<Resource> {
        Ok(Resource::from_url(memory_url(path)?))
    }

    fn path_of(location: &str) -> Result<String> {
        if let Some(rest) = location
            .strip_prefix(ALL_SEARCH_ROOTS_PREFIX)
            .or_else(|| location.strip_prefix(SEARCH_ROOT_PREFIX))
        {
            return Ok(format!("/{}", rest.trim_start_matches('/')));
        }
        match Url::parse(location) {
            Ok(url) if url.scheme() == MEMORY_SCHEME => Ok(url.path().to_string()),
            Ok(_) => Err(ReaderError::UnsupportedLocation(location.to_string())),
            Err(_) => Ok(format!("/{}", location.trim_start_matches('/'))),
        }
    }
}

impl ResourceLoader for InMemoryResourceLoader {
    fn resources(&self, location: &str) -> Result<Vec<Resource>> {
        let path = Self::path_of(location)?;
        if !has_wildcard(&path) {
            return Ok(vec![Resource::from_url(memory_url(&path)?)]);
        }

        let matcher = GlobBuilder::new(&path)
            .literal_separator(true)
            .build()?
            .compile_matcher();
        Ok(self
            .documents
            .keys()
            .filter(|url| matcher.is_match(url.path()))
            .cloned()
            .map(Resource::from_url)
            .collect())
    }

    fn exists(&self, resource: &Resource) -> bool {
        resource
            .url()
            .is_some_and(|url| self.documents.contains_key(url))
    }

    fn read_to_string(&self, resource: &Resource) -> Result<String> {
        let url = resource.url_or_error()?;
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| ReaderError::ResourceNotFound(resource.description().to_string()))
    }
}

fn memory_url(path: &str) -> Result<Url> {
    Ok(Url::parse(&format!(
        "{MEMORY_SCHEME}:/{}",
        path.trim_start_matches('/')
    ))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader() -> InMemoryResourceLoader {
        InMemoryResourceLoader::new()
            .with_document("conf/app.xml", "<beans/>")
            .with_document("conf/db.xml", "<beans><bean id=\"db\"/></beans>")
            .with_document("other/x.xml", "<beans/>")
    }

    #[test]
    fn test_plain_location() {
        let loader = loader();
        let resources = loader.resources("conf/app.xml").unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].location(), "memory:/conf/app.xml");
        assert!(loader.exists(&resources[0]));
    }

    #[test]
    fn test_prefixes_address_same_documents() {
        let loader = loader();
        let a = loader.resources("classpath:conf/db.xml").unwrap();
        let b = loader.resources("classpath*:/conf/db.xml").unwrap();
        let c = loader.resources("memory:/conf/db.xml").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_wildcard_matches_in_insertion_order() {
        let loader = loader();
        let resources = loader.resources("classpath*:conf/*.xml").unwrap();
        let locations: Vec<&str> = resources.iter().map(Resource::location).collect();
        assert_eq!(locations, vec!["memory:/conf/app.xml", "memory:/conf/db.xml"]);
    }

    #[test]
    fn test_missing_document() {
        let loader = loader();
        let resource = loader.resource("missing.xml").unwrap();
        assert!(!loader.exists(&resource));
        assert!(matches!(
            loader.read_to_string(&resource).unwrap_err(),
            ReaderError::ResourceNotFound(_)
        ));
    }

    #[test]
    fn test_foreign_scheme_rejected() {
        let err = loader().resources("https://example.com/x.xml").unwrap_err();
        assert!(matches!(err, ReaderError::UnsupportedLocation(_)));
    }
}
