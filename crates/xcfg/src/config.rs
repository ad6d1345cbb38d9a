//! Key/value configuration over text or XML files
//!
//! [`Config`] is the object-safe core every backend implements; typed reads
//! and generic writes come from the blanket [`ConfigExt`] so they also work on
//! `Box<dyn Config>`.

pub mod text;
pub mod xml;

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::value::{parse_enum, parse_value, ConfigEnum, FromConfigValue};

pub use text::TextConfig;
pub use xml::XmlConfig;

/// Key of the reserved debug flag
pub const DEBUG_KEY: &str = "debug";

/// A string-keyed property store
pub trait Config {
    /// Value of `key`, or `None` when absent or empty
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the first entry for `key` or append a new one
    fn set_str(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove the first entry for `key`; absent keys are ignored
    fn delete_property(&mut self, key: &str) -> Result<()>;

    /// Cached value of the `debug` property
    fn debug(&self) -> bool;

    /// Write the `debug` property and update the cached flag
    fn set_debug(&mut self, debug: bool) -> Result<()>;

    /// All properties in file order
    fn properties(&self) -> Result<Vec<(String, String)>>;

    /// File backing this config
    fn path(&self) -> &Path;

    /// Persist pending changes. Backends that write on every change do nothing.
    fn save(&mut self) -> Result<()> {
        Ok(())
    }

    /// Drop in-memory state and read the backing file again
    fn reload(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Typed reads and generic writes for every [`Config`]
pub trait ConfigExt: Config {
    /// Value of `key` or `default`
    fn get_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// Value converted to `T`; `KeyNotFound` when absent
    fn get_as<T: FromConfigValue>(&self, key: &str) -> Result<T> {
        match self.get(key)? {
            Some(value) => parse_value(&value),
            None => Err(Error::key_not_found(key)),
        }
    }

    /// Value converted to `T`, or `default` when absent.
    /// A present but malformed value is still an error.
    fn get_as_or<T: FromConfigValue>(&self, key: &str, default: T) -> Result<T> {
        match self.get(key)? {
            Some(value) => parse_value(&value),
            None => Ok(default),
        }
    }

    /// Value parsed as enum `T`; `KeyNotFound` when absent
    fn get_enum<T: ConfigEnum>(&self, key: &str, ignore_case: bool) -> Result<T> {
        match self.get(key)? {
            Some(value) => parse_enum(&value, ignore_case),
            None => Err(Error::key_not_found(key)),
        }
    }

    /// Value parsed as enum `T`, or `default` when absent
    fn get_enum_or<T: ConfigEnum>(&self, key: &str, default: T, ignore_case: bool) -> Result<T> {
        match self.get(key)? {
            Some(value) => parse_enum(&value, ignore_case),
            None => Ok(default),
        }
    }

    /// [`set_str`](Config::set_str) for any displayable value
    fn set(&mut self, key: &str, value: impl fmt::Display) -> Result<()> {
        self.set_str(key, &value.to_string())
    }
}

impl<C: Config + ?Sized> ConfigExt for C {}

/// Open the config for a program directory.
///
/// Uses `Config.xml` when it exists, otherwise `Config.txt`, creating the
/// text file if needed.
pub fn open_in(dir: impl AsRef<Path>) -> Result<Box<dyn Config>> {
    let dir = dir.as_ref();
    let xml_path = dir.join(XmlConfig::DEFAULT_FILE);
    if xml_path.exists() {
        debug!(path = %xml_path.display(), "using xml config");
        return Ok(Box::new(XmlConfig::open(xml_path)?));
    }
    let text_path = dir.join(TextConfig::DEFAULT_FILE);
    debug!(path = %text_path.display(), "using text config");
    Ok(Box::new(TextConfig::open(text_path)?))
}
