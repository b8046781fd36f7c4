use quire_sanitize::Policy;
use quire_source::ChapterPaths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Fully-resolved configuration, after every layer has been merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chapters: ChaptersConfig,
    pub cache: CacheConfig,
    pub source: SourceConfig,
    pub sanitization: SanitizationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaptersConfig {
    /// Number of chapters; valid identifiers are `1..=total`.
    pub total: u32,
    pub directory: PathBuf,
    pub prefix: String,
    pub extension: String,
    /// Chapter numbers are zero-padded to this many digits.
    pub width: usize,
    /// Title used (followed by the chapter number) when a chapter has no heading.
    pub default_title: String,
}
impl Default for ChaptersConfig {
    fn default() -> Self {
        Self {
            total: 21,
            directory: PathBuf::from("chapters"),
            prefix: "chapter-".to_string(),
            extension: ".html".to_string(),
            width: 2,
            default_title: "Chapter".to_string(),
        }
    }
}
impl ChaptersConfig {
    pub fn paths(&self) -> ChapterPaths {
        ChapterPaths::new(&self.directory, &self.prefix, &self.extension, self.width)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
}
impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Where chapter markup is fetched from.
///
/// At most one of `root` and `url` may be set. With neither, chapters are
/// read relative to the current working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub root: Option<PathBuf>,
    pub url: Option<String>,
    /// Refuse to fetch anything that isn't an `.html`/`.htm` file.
    pub html_only: bool,
}
impl Default for SourceConfig {
    fn default() -> Self {
        Self { root: None, url: None, html_only: true }
    }
}

/// Overrides for the sanitization allow-list.
///
/// Leaving `allowed_tags` unset keeps the built-in chapter policy (and its
/// attributes, unless `allowed_attributes` is also set).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizationConfig {
    pub allowed_tags: Option<Vec<String>>,
    pub allowed_attributes: Option<BTreeMap<String, Vec<String>>>,
}
impl SanitizationConfig {
    pub fn policy(&self) -> Policy {
        match (&self.allowed_tags, &self.allowed_attributes) {
            (None, None) => Policy::default(),
            (Some(tags), None) => Policy::from_tags(tags),
            (tags, Some(attributes)) => {
                let tags: Vec<String> = match tags {
                    Some(tags) => tags.clone(),
                    None => Policy::default().tags().map(|tag| tag.as_str().to_string()).collect(),
                };
                Policy::new(tags, attributes.iter().map(|(tag, names)| (tag.clone(), names.clone())))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_sanitize::Name;
    use std::path::Path;

    #[test]
    fn test_default_paths() {
        let paths = ChaptersConfig::default().paths();
        assert_eq!(paths.resolve(7).unwrap(), Path::new("chapters/chapter-07.html"));
    }

    #[test]
    fn test_default_policy() {
        assert_eq!(SanitizationConfig::default().policy(), Policy::default());
    }

    #[test]
    fn test_tags_only_policy() {
        let config = SanitizationConfig {
            allowed_tags: Some(vec!["p".to_string(), "a".to_string()]),
            allowed_attributes: None,
        };
        let policy = config.policy();
        assert!(policy.is_tag_allowed(&Name::new("a")));
        assert!(!policy.is_tag_allowed(&Name::new("div")));
        assert!(policy.allowed_attributes_for(&Name::new("a")).is_empty());
    }

    #[test]
    fn test_attributes_only_policy_keeps_default_tags() {
        let config = SanitizationConfig {
            allowed_tags: None,
            allowed_attributes: Some(BTreeMap::from([("p".to_string(), vec!["class".to_string()])])),
        };
        let policy = config.policy();
        assert!(policy.is_tag_allowed(&Name::new("blockquote")));
        assert!(policy.allowed_attributes_for(&Name::new("p")).contains(&Name::new("class")));
        assert!(policy.allowed_attributes_for(&Name::new("a")).is_empty());
    }
}
