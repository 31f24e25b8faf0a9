//! Environment: profile activation and `${...}` placeholder resolution.

use std::collections::HashMap;
use std::path::Path;

use serde_yaml_ng::Value as YamlValue;

use crate::config::{DEFAULT_PROFILE, PLACEHOLDER_PATTERN};
use crate::error::{ReaderError, Result};

/// Services the reader needs from its environment.
pub trait Environment: Send + Sync {
    /// Replace every `${key}` / `${key:default}` placeholder in `text`.
    ///
    /// # Errors
    /// Fails when a placeholder has neither a value nor a default.
    fn resolve_required_placeholders(&self, text: &str) -> Result<String>;

    /// Check whether at least one of the given profiles is active.
    ///
    /// A label prefixed with `!` matches when that profile is *not* active.
    fn accepts_profiles(&self, profiles: &[String]) -> bool;
}

/// Environment backed by an explicit profile list and a property map.
///
/// Property lookups fall back to process environment variables unless
/// disabled with [`StandardEnvironment::without_system_environment`].
#[derive(Debug, Clone)]
pub struct StandardEnvironment {
    active_profiles: Vec<String>,
    default_profiles: Vec<String>,
    properties: HashMap<String, String>,
    use_system_environment: bool,
}

impl StandardEnvironment {
    /// Create an environment with no active profiles and the `default` profile.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active_profiles: Vec::new(),
            default_profiles: vec![DEFAULT_PROFILE.to_string()],
            properties: HashMap::new(),
            use_system_environment: true,
        }
    }

    /// Activate profiles.
    #[must_use]
    pub fn with_active_profiles(
        mut self,
        profiles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.active_profiles
            .extend(profiles.into_iter().map(Into::into));
        self
    }

    /// Replace the profiles that apply when none is active.
    #[must_use]
    pub fn with_default_profiles(
        mut self,
        profiles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.default_profiles = profiles.into_iter().map(Into::into).collect();
        self
    }

    /// Set a single property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Set several properties.
    #[must_use]
    pub fn with_properties(
        mut self,
        properties: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        self.properties
            .extend(properties.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Do not consult process environment variables.
    #[must_use]
    pub fn without_system_environment(mut self) -> Self {
        self.use_system_environment = false;
        self
    }

    /// Merge properties from a YAML document.
    ///
    /// Nested mappings are flattened with dots (`db: {url: x}` becomes
    /// `db.url`), sequences are joined with commas.
    ///
    /// # Errors
    /// Fails when the document is not valid YAML.
    pub fn with_yaml_properties(mut self, yaml: &str) -> Result<Self> {
        let value: YamlValue = serde_yaml_ng::from_str(yaml)?;
        flatten_yaml("", &value, &mut self.properties);
        Ok(self)
    }

    /// Merge properties from a YAML file.
    ///
    /// # Errors
    /// Fails when the file cannot be read or is not valid YAML.
    pub fn with_yaml_file(self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loading environment properties");
        self.with_yaml_properties(&content)
    }

    /// Currently active profiles.
    #[must_use]
    pub fn active_profiles(&self) -> &[String] {
        &self.active_profiles
    }

    /// Look up a property, falling back to the process environment.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned().or_else(|| {
            self.use_system_environment
                .then(|| std::env::var(key).ok())
                .flatten()
        })
    }

    fn is_profile_active(&self, profile: &str) -> bool {
        if self.active_profiles.is_empty() {
            self.default_profiles.iter().any(|p| p == profile)
        } else {
            self.active_profiles.iter().any(|p| p == profile)
        }
    }

    fn resolve(&self, text: &str, visiting: &mut Vec<String>) -> Result<String> {
        let mut resolved = String::with_capacity(text.len());
        let mut last = 0;

        for caps in PLACEHOLDER_PATTERN.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let key = caps.get(1).map_or("", |m| m.as_str().trim());
            resolved.push_str(&text[last..whole.start()]);

            if visiting.iter().any(|k| k == key) {
                return Err(ReaderError::CircularPlaceholder(key.to_string()));
            }

            let value = match self.property(key) {
                Some(value) => {
                    visiting.push(key.to_string());
                    let value = self.resolve(&value, visiting)?;
                    visiting.pop();
                    value
                }
                None => match caps.get(2) {
                    Some(default) => default.as_str().to_string(),
                    None => {
                        return Err(ReaderError::UnresolvablePlaceholder {
                            placeholder: key.to_string(),
                            text: text.to_string(),
                        })
                    }
                },
            };

            resolved.push_str(&value);
            last = whole.end();
        }

        resolved.push_str(&text[last..]);
        Ok(resolved)
    }
}

impl Default for StandardEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for StandardEnvironment {
    fn resolve_required_placeholders(&self, text: &str) -> Result<String> {
        self.resolve(text, &mut Vec::new())
    }

    fn accepts_profiles(&self, profiles: &[String]) -> bool {
        profiles.iter().any(|profile| match profile.strip_prefix('!') {
            Some(negated) => !self.is_profile_active(negated),
            None => self.is_profile_active(profile),
        })
    }
}

fn flatten_yaml(prefix: &str, value: &YamlValue, out: &mut HashMap<String, String>) {
    let scalar = match value {
        YamlValue::Mapping(mapping) => {
            for (key, nested) in mapping {
                let key = match key {
                    YamlValue::String(s) => s.clone(),
                    YamlValue::Number(n) => n.to_string(),
                    YamlValue::Bool(b) => b.to_string(),
                    _ => continue,
                };
                let full_key = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_yaml(&full_key, nested, out);
            }
            return;
        }
        YamlValue::Tagged(tagged) => return flatten_yaml(prefix, &tagged.value, out),
        YamlValue::Null => String::new(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::String(s) => s.clone(),
        YamlValue::Sequence(items) => items
            .iter()
            .filter_map(|item| match item {
                YamlValue::String(s) => Some(s.clone()),
                YamlValue::Number(n) => Some(n.to_string()),
                YamlValue::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(","),
    };
    if !prefix.is_empty() {
        out.insert(prefix.to_string(), scalar);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> StandardEnvironment {
        StandardEnvironment::new().without_system_environment()
    }

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_profile_applies_when_none_active() {
        let env = env();
        assert!(env.accepts_profiles(&labels(&["default"])));
        assert!(!env.accepts_profiles(&labels(&["prod"])));
    }

    #[test]
    fn test_active_profiles_replace_default() {
        let env = env().with_active_profiles(["dev"]);
        assert!(env.accepts_profiles(&labels(&["dev"])));
        assert!(env.accepts_profiles(&labels(&["prod", "dev"])));
        assert!(!env.accepts_profiles(&labels(&["default"])));
        assert!(!env.accepts_profiles(&labels(&["prod"])));
    }

    #[test]
    fn test_negated_profile() {
        let env = env().with_active_profiles(["dev"]);
        assert!(env.accepts_profiles(&labels(&["!prod"])));
        assert!(!env.accepts_profiles(&labels(&["!dev"])));
    }

    #[test]
    fn test_resolve_placeholders() {
        let env = env().with_property("conf.dir", "/etc/app");
        assert_eq!(
            env.resolve_required_placeholders("${conf.dir}/db.xml").unwrap(),
            "/etc/app/db.xml"
        );
        assert_eq!(
            env.resolve_required_placeholders("plain.xml").unwrap(),
            "plain.xml"
        );
    }

    #[test]
    fn test_resolve_placeholder_default() {
        let env = env();
        assert_eq!(
            env.resolve_required_placeholders("${missing:fallback}.xml")
                .unwrap(),
            "fallback.xml"
        );
    }

    #[test]
    fn test_unresolvable_placeholder_is_error() {
        let env = env();
        let err = env
            .resolve_required_placeholders("${missing}/db.xml")
            .unwrap_err();
        assert!(matches!(
            err,
            ReaderError::UnresolvablePlaceholder { ref placeholder, .. } if placeholder == "missing"
        ));
    }

    #[test]
    fn test_nested_property_values_resolve() {
        let env = env()
            .with_property("base", "/srv")
            .with_property("conf", "${base}/conf");
        assert_eq!(
            env.resolve_required_placeholders("${conf}/a.xml").unwrap(),
            "/srv/conf/a.xml"
        );
    }

    #[test]
    fn test_circular_placeholder_detected() {
        let env = env().with_property("a", "${b}").with_property("b", "${a}");
        let err = env.resolve_required_placeholders("${a}").unwrap_err();
        assert!(matches!(err, ReaderError::CircularPlaceholder(_)));
    }

    #[test]
    fn test_yaml_properties_are_flattened() {
        let yaml = "db:\n  url: jdbc:test\n  pool: 5\nprofiles: [a, b]\n";
        let env = env().with_yaml_properties(yaml).unwrap();
        assert_eq!(env.property("db.url").as_deref(), Some("jdbc:test"));
        assert_eq!(env.property("db.pool").as_deref(), Some("5"));
        assert_eq!(env.property("profiles").as_deref(), Some("a,b"));
    }
}
