use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub notes_path: PathBuf,

    /// Glob patterns selecting which note files to scan. Empty means all.
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns removing files after `include` has been applied.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Regular expressions matched against each line of every scanned file.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded notes path
        config.notes_path = Self::expand_path(&config.notes_path).unwrap_or(config.notes_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-trellis");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

/// Include/exclude filtering of note paths, built from the config globs.
///
/// Paths are matched as the slash-separated keys produced by the notes
/// scanner, not as OS paths.
#[derive(Debug)]
pub struct FileFilter {
    include: Vec<glob::Pattern>,
    exclude: Vec<glob::Pattern>,
}

impl FileFilter {
    /// Compile include and exclude globs. Malformed patterns are logged and
    /// dropped rather than failing the whole run.
    pub fn new(include: &[String], exclude: &[String]) -> Self {
        Self {
            include: compile_globs(include),
            exclude: compile_globs(exclude),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.include, &config.exclude)
    }

    pub fn matches(&self, path: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|p| p.matches(path)) {
            return false;
        }
        !self.exclude.iter().any(|p| p.matches(path))
    }
}

fn compile_globs(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|raw| match glob::Pattern::new(raw) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                log::warn!("ignoring malformed glob pattern {raw:?}: {err}");
                None
            }
        })
        .collect()
}

/// Compiled line-matching regexes from the config's `patterns` list.
#[derive(Debug)]
pub struct PatternSet {
    regexes: Vec<regex::Regex>,
}

impl PatternSet {
    /// Compile a list of regex sources. An expression that fails to compile
    /// is logged at warn level and contributes no matches.
    pub fn compile(sources: &[String]) -> Self {
        let regexes = sources
            .iter()
            .filter_map(|raw| match regex::Regex::new(raw) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    log::warn!("ignoring malformed line pattern {raw:?}: {err}");
                    None
                }
            })
            .collect();
        Self { regexes }
    }

    pub fn is_empty(&self) -> bool {
        self.regexes.is_empty()
    }

    /// Zero-based numbers of the lines in `text` matched by any pattern.
    pub fn match_lines(&self, text: &str) -> Vec<usize> {
        if self.regexes.is_empty() {
            return Vec::new();
        }
        text.lines()
            .enumerate()
            .filter(|(_, line)| self.regexes.iter().any(|r| r.is_match(line)))
            .map(|(line_no, _)| line_no)
            .collect()
    }
}
