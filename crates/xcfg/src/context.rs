//! Per-program state: the opened config and the problems found while running

use std::fmt;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::config::{self, Config};
use crate::error::Result;
use crate::logging;
use crate::value::ConfigEnum;

crate::config_enum! {
    /// How bad a [`Problem`] is, from least to most severe
    #[derive(PartialOrd, Ord, Hash)]
    pub enum Severity {
        Debug,
        Info,
        Warning,
        Severe,
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.variant_name().to_uppercase())
    }
}

/// A runtime issue worth reporting at the end of a run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    pub severity: Severity,
    pub message: String,
    /// Rendered underlying error, if any
    pub source: Option<String>,
}

impl Problem {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl fmt::Display) -> Self {
        self.source = Some(source.to_string());
        self
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

/// Problems in the order they were recorded.
///
/// Every recorded problem is also emitted as a tracing event at the level
/// matching its severity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProblemList {
    problems: Vec<Problem>,
}

impl ProblemList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem and log it
    pub fn push(&mut self, problem: Problem) {
        emit(&problem);
        self.problems.push(problem);
    }

    pub fn add(&mut self, severity: Severity, message: impl Into<String>) {
        self.push(Problem::new(severity, message));
    }

    pub fn add_with_source(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        source: impl fmt::Display,
    ) {
        self.push(Problem::new(severity, message).with_source(source));
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn clear(&mut self) {
        self.problems.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Problem> {
        self.problems.iter()
    }

    /// Highest severity recorded so far
    pub fn worst(&self) -> Option<Severity> {
        self.problems.iter().map(|p| p.severity).max()
    }
}

impl<'a> IntoIterator for &'a ProblemList {
    type Item = &'a Problem;
    type IntoIter = std::slice::Iter<'a, Problem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ProblemList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, problem) in self.problems.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{problem}")?;
        }
        Ok(())
    }
}

fn emit(problem: &Problem) {
    let source = problem.source.as_deref().unwrap_or_default();
    match problem.severity {
        Severity::Debug => debug!(source, "{}", problem.message),
        Severity::Info => info!(source, "{}", problem.message),
        Severity::Warning => warn!(source, "{}", problem.message),
        Severity::Severe => error!(source, "{}", problem.message),
    }
}

/// Config and problem list for one program run, passed around by reference
pub struct ProgramContext {
    config: Box<dyn Config>,
    problems: ProblemList,
}

impl ProgramContext {
    /// Open the config found in `dir` and set up logging from its debug flag.
    ///
    /// `Config.xml` is preferred over `Config.txt`; see [`config::open_in`].
    pub fn init(dir: impl AsRef<Path>) -> Result<Self> {
        let config = config::open_in(dir)?;
        logging::init(config.debug());
        debug!(path = %config.path().display(), "program context ready");
        Ok(Self::with_config(config))
    }

    /// Wrap an already opened config without touching logging
    pub fn with_config(config: Box<dyn Config>) -> Self {
        Self {
            config,
            problems: ProblemList::new(),
        }
    }

    pub fn config(&self) -> &dyn Config {
        self.config.as_ref()
    }

    pub fn config_mut(&mut self) -> &mut dyn Config {
        self.config.as_mut()
    }

    pub fn problems(&self) -> &ProblemList {
        &self.problems
    }

    pub fn problems_mut(&mut self) -> &mut ProblemList {
        &mut self.problems
    }

    /// Debug flag of the underlying config
    pub fn debug(&self) -> bool {
        self.config.debug()
    }
}

impl fmt::Debug for ProgramContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramContext")
            .field("config", &self.config.path())
            .field("debug", &self.config.debug())
            .field("problems", &self.problems)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigExt;
    use std::fs;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_severity_order_and_names() -> TestResult {
        assert!(Severity::Severe > Severity::Warning);
        assert!(Severity::Info > Severity::Debug);
        assert_eq!(Severity::Warning.to_string(), "WARNING");
        assert_eq!(Severity::parse_variant("severe", true)?, Severity::Severe);
        Ok(())
    }

    #[test]
    fn test_problem_display() {
        let plain = Problem::new(Severity::Info, "started");
        assert_eq!(plain.to_string(), "[INFO] started");
        let sourced = Problem::new(Severity::Severe, "could not save").with_source("disk full");
        assert_eq!(
            sourced.to_string(),
            "[SEVERE] could not save: disk full"
        );
    }

    #[test]
    fn test_problem_list() {
        let mut problems = ProblemList::new();
        assert!(problems.is_empty());
        assert_eq!(problems.worst(), None);

        problems.add(Severity::Warning, "slow");
        problems.add_with_source(Severity::Severe, "failed", "boom");
        problems.add(Severity::Info, "done");
        assert_eq!(problems.len(), 3);
        assert_eq!(problems.worst(), Some(Severity::Severe));
        assert_eq!(
            problems.to_string(),
            "[WARNING] slow\n[SEVERE] failed: boom\n[INFO] done"
        );
        let messages: Vec<&str> = problems.iter().map(|p| p.message.as_str()).collect();
        assert_eq!(messages, ["slow", "failed", "done"]);

        problems.clear();
        assert!(problems.is_empty());
    }

    #[test]
    fn test_init_reads_debug_flag() -> TestResult {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("Config.txt"), "debug=true\nname=demo\n")?;
        let mut context = ProgramContext::init(dir.path())?;
        assert!(context.debug());
        assert_eq!(context.config().get_or("name", "")?, "demo");

        context.config_mut().set("name", "renamed")?;
        context.problems_mut().add(Severity::Debug, "renamed");
        assert_eq!(context.problems().len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("Config.txt"))?,
            "debug=true\nname=renamed\n"
        );
        Ok(())
    }
}
