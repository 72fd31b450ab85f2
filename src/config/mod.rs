use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Configuration {
    pub catalog: Option<CatalogConfig>,
    pub storage: Option<StorageConfig>,
    pub comments: Option<CommentsConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// JSON or YAML file replacing the bundled catalog.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommentsConfig {
    pub author: Option<String>,
}

impl Configuration {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Configuration = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn catalog_path(&self) -> Option<&Path> {
        self.catalog.as_ref().and_then(|c| c.path.as_deref())
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.storage
            .as_ref()
            .and_then(|s| s.dir.clone())
            .unwrap_or_else(|| PathBuf::from(".leetmovie"))
    }

    pub fn comment_author(&self) -> String {
        self.comments
            .as_ref()
            .and_then(|c| c.author.clone())
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| "You".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config: Configuration = serde_yaml::from_str("{}").unwrap();
        assert!(config.catalog_path().is_none());
        assert_eq!(config.storage_dir(), PathBuf::from(".leetmovie"));
        assert_eq!(config.comment_author(), "You");
    }

    #[test]
    fn test_parses_all_sections() {
        let yaml = r#"
catalog:
  path: data/titles.yaml
storage:
  dir: /tmp/leetmovie
comments:
  author: Ada
"#;
        let config: Configuration = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.catalog_path(), Some(Path::new("data/titles.yaml")));
        assert_eq!(config.storage_dir(), PathBuf::from("/tmp/leetmovie"));
        assert_eq!(config.comment_author(), "Ada");
    }

    #[test]
    fn test_blank_author_falls_back() {
        let config: Configuration = serde_yaml::from_str("comments:\n  author: '  '\n").unwrap();
        assert_eq!(config.comment_author(), "You");
    }
}
