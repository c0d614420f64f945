use std::path::{Path, PathBuf};

use crate::{Config, Error, Result};

/// Represents a strata.toml file with both raw content and parsed config.
#[derive(Debug)]
pub struct StrataToml {
    path: PathBuf,
    content: String,
    config: Config,
}

impl StrataToml {
    /// Open and parse a strata.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::new(Error::Io {
                path: path.clone(),
                source: e,
            })
        })?;
        let filename = path.display().to_string();
        let config = Config::from_str_with_filename(&content, &filename)?;

        Ok(Self {
            path,
            content,
            config,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the raw content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the parsed config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Directory relative paths in the config are resolved against.
    pub fn base_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// Resolve a config-relative path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir().join(path)
        }
    }

    /// Source files listed in the config, resolved against the config directory.
    pub fn sources(&self) -> Vec<PathBuf> {
        self.config
            .module
            .sources
            .iter()
            .map(|s| self.resolve(s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_open_resolves_sources() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("strata.toml");
        fs::write(
            &path,
            "[module]\nsources = [\"src/main.st\"]\n\n[frontend]\nmodule_name = \"app\"\n",
        )
        .unwrap();

        let file = StrataToml::open(&path).expect("config should open");

        assert_eq!(file.path(), path.as_path());
        assert_eq!(file.config().frontend.module_name, "app");
        assert_eq!(file.sources(), vec![temp.path().join("src/main.st")]);
        assert!(file.content().contains("[module]"));
    }

    #[test]
    fn test_open_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = StrataToml::open(temp.path().join("strata.toml")).unwrap_err();
        assert!(matches!(*err, Error::Io { .. }));
    }

    #[test]
    fn test_base_dir_of_bare_filename() {
        let file = StrataToml {
            path: PathBuf::from("strata.toml"),
            content: String::new(),
            config: Config::default(),
        };
        assert_eq!(file.base_dir(), Path::new("."));
        assert_eq!(
            file.resolve(Path::new("src/main.st")),
            PathBuf::from("./src/main.st")
        );
    }
}
