//! Line-oriented `key=value` config files

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::config::{Config, ConfigExt, DEBUG_KEY};
use crate::error::{Error, Result};
use crate::key::keys_match;

/// Leading characters that mark a line as a comment
const COMMENT_STARTS: [char; 4] = [' ', '\t', '\n', '#'];

/// Config stored as one `key<delimiter>value` pair per line.
///
/// Every read goes back to the file and every write rewrites it whole, so
/// the file on disk is always the source of truth.
#[derive(Debug, Clone)]
pub struct TextConfig {
    path: PathBuf,
    delimiter: char,
    debug: bool,
}

impl TextConfig {
    pub const DEFAULT_FILE: &'static str = "Config.txt";
    pub const DEFAULT_DELIMITER: char = '=';

    /// Open `path` with the default `=` delimiter, creating the file if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_delimiter(path, Self::DEFAULT_DELIMITER)
    }

    /// Open `Config.txt` in the current directory
    pub fn open_default() -> Result<Self> {
        let dir = std::env::current_dir().map_err(|e| Error::io(Path::new("."), e))?;
        Self::open(dir.join(Self::DEFAULT_FILE))
    }

    /// Open `path` with a custom delimiter.
    ///
    /// The whole file is validated before anything is read from it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn with_delimiter(path: impl AsRef<Path>, delimiter: char) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!("creating empty config file");
            fs::File::create(&path).map_err(|e| Error::io(&path, e))?;
        }
        let mut config = Self {
            path,
            delimiter,
            debug: false,
        };
        config.validate()?;
        config.debug = config.get_as_or(DEBUG_KEY, false)?;
        Ok(config)
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    fn validate(&self) -> Result<()> {
        for (index, line) in self.read_lines()?.iter().enumerate() {
            if !is_significant(line) {
                continue;
            }
            let reason = if !line.contains(self.delimiter) {
                format!("key/value pairs should be delimited with '{}'", self.delimiter)
            } else if line.split(self.delimiter).count() != 2 {
                "config files should be written with key/value pairs".to_string()
            } else {
                continue;
            };
            return Err(Error::malformed(&self.path, index, reason));
        }
        Ok(())
    }

    /// Split a significant line into trimmed key and trimmed value
    fn split_pair<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        if !is_significant(line) {
            return None;
        }
        let (key, value) = line.split_once(self.delimiter)?;
        Some((key.trim(), value.trim()))
    }

    fn read_lines(&self) -> Result<Vec<String>> {
        let text = fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;
        Ok(text.lines().map(str::to_string).collect())
    }

    fn write_lines(&self, lines: &[String]) -> Result<()> {
        let mut text = lines.join("\n");
        if !lines.is_empty() {
            text.push('\n');
        }
        fs::write(&self.path, text).map_err(|e| Error::io(&self.path, e))
    }
}

impl Config for TextConfig {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .read_lines()?
            .iter()
            .filter_map(|line| self.split_pair(line))
            .find(|(k, v)| keys_match(k, key) && !v.is_empty())
            .map(|(_, v)| v.to_string()))
    }

    fn set_str(&mut self, key: &str, value: &str) -> Result<()> {
        let key = key.trim();
        let mut lines = self.read_lines()?;
        if value.contains(self.delimiter) || value.contains('\n') {
            return Err(Error::malformed(
                &self.path,
                lines.len(),
                format!("value for {key} cannot contain '{}' or a line break", self.delimiter),
            ));
        }

        let entry = format!("{key}{}{value}", self.delimiter);
        let existing = lines.iter_mut().find(|line| {
            self.split_pair(line)
                .is_some_and(|(k, _)| keys_match(k, key))
        });
        match existing {
            Some(line) => *line = entry,
            None => lines.push(entry),
        }
        debug!(key, "writing config property");
        self.write_lines(&lines)
    }

    fn delete_property(&mut self, key: &str) -> Result<()> {
        let mut lines = self.read_lines()?;
        let position = lines.iter().position(|line| {
            self.split_pair(line)
                .is_some_and(|(k, _)| keys_match(k, key))
        });
        if let Some(index) = position {
            lines.remove(index);
            debug!(key, "deleting config property");
            self.write_lines(&lines)?;
        }
        Ok(())
    }

    fn debug(&self) -> bool {
        self.debug
    }

    fn set_debug(&mut self, debug: bool) -> Result<()> {
        self.set(DEBUG_KEY, debug)?;
        self.debug = debug;
        Ok(())
    }

    fn properties(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .read_lines()?
            .iter()
            .filter_map(|line| self.split_pair(line))
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Empty lines and lines starting with whitespace or `#` carry no property
fn is_significant(line: &str) -> bool {
    line.chars()
        .next()
        .is_some_and(|first| !COMMENT_STARTS.contains(&first))
}
