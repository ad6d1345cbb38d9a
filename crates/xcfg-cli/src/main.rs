use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use xcfg::xml::writer;
use xcfg::{Config, Document, TextConfig, WriteOptions, XmlConfig};

#[derive(Debug, Parser)]
#[command(
    name = "xcfg",
    version,
    about = "Read and edit key/value config files (text or XML)"
)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the value of a property
    Get {
        file: PathBuf,
        key: String,
        #[command(flatten)]
        backend: BackendArgs,
    },
    /// Overwrite or append a property
    Set {
        file: PathBuf,
        key: String,
        value: String,
        #[command(flatten)]
        backend: BackendArgs,
    },
    /// Remove a property
    Delete {
        file: PathBuf,
        key: String,
        #[command(flatten)]
        backend: BackendArgs,
    },
    /// Print every property as key=value
    List {
        file: PathBuf,
        #[command(flatten)]
        backend: BackendArgs,
    },
    /// Print the first node with a matching key anywhere in an XML document
    Find { file: PathBuf, key: String },
    /// Re-serialize an XML document
    Fmt {
        file: PathBuf,
        /// Write everything on one line
        #[arg(long)]
        compact: bool,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct BackendArgs {
    /// Section holding the properties (XML files only)
    #[arg(long, value_name = "NAME")]
    parent: Option<String>,
    /// Key/value delimiter (text files only)
    #[arg(long, default_value_t = TextConfig::DEFAULT_DELIMITER)]
    delimiter: char,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    xcfg::logging::init(cli.verbose);

    match cli.command {
        Command::Get { file, key, backend } => {
            ensure_exists(&file)?;
            let config = open_config(&file, &backend)?;
            match config.get(&key)? {
                Some(value) => println!("{value}"),
                None => bail!("{key} is not set in {}", file.display()),
            }
        }
        Command::Set {
            file,
            key,
            value,
            backend,
        } => {
            let mut config = open_config(&file, &backend)?;
            config
                .set_str(&key, &value)
                .with_context(|| format!("failed to set {key} in {}", file.display()))?;
        }
        Command::Delete { file, key, backend } => {
            ensure_exists(&file)?;
            let mut config = open_config(&file, &backend)?;
            config
                .delete_property(&key)
                .with_context(|| format!("failed to delete {key} from {}", file.display()))?;
        }
        Command::List { file, backend } => {
            ensure_exists(&file)?;
            let config = open_config(&file, &backend)?;
            let delimiter = if is_xml(&file) { '=' } else { backend.delimiter };
            for (key, value) in config.properties()? {
                println!("{key}{delimiter}{value}");
            }
        }
        Command::Find { file, key } => {
            let doc = open_document(&file)?;
            let Some(node) = doc.find_node(&key) else {
                bail!("no node named {key} in {}", file.display());
            };
            let mut output = String::new();
            writer::write_node(node, 0, WriteOptions::pretty(), &mut output);
            println!("{}", output.trim_start());
        }
        Command::Fmt {
            file,
            compact,
            output,
        } => {
            let doc = open_document(&file)?;
            let options = if compact {
                WriteOptions::compact()
            } else {
                WriteOptions::pretty()
            };
            write_output(output.as_deref(), &doc.to_xml(options))?;
        }
    }
    Ok(())
}

fn is_xml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("{} does not exist", path.display());
    }
    Ok(())
}

fn open_config(path: &Path, backend: &BackendArgs) -> Result<Box<dyn Config>> {
    let config: Box<dyn Config> = if is_xml(path) {
        debug!(path = %path.display(), parent = ?backend.parent, "opening xml config");
        let config = match &backend.parent {
            Some(parent) => XmlConfig::with_parent(path, parent),
            None => XmlConfig::open(path),
        };
        Box::new(config.with_context(|| format!("failed to open {}", path.display()))?)
    } else {
        debug!(path = %path.display(), delimiter = %backend.delimiter, "opening text config");
        let config = TextConfig::with_delimiter(path, backend.delimiter)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Box::new(config)
    };
    Ok(config)
}

fn open_document(path: &Path) -> Result<Document> {
    if !is_xml(path) {
        bail!("{} is not an XML file", path.display());
    }
    ensure_exists(path)?;
    Document::open(path).with_context(|| format!("failed to parse {}", path.display()))
}

fn write_output(path: Option<&Path>, data: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            writeln!(stdout, "{data}").context("failed to write stdout")?;
            Ok(())
        }
    }
}
