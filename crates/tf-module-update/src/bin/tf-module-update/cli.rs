//! tf-module-update cli interface

use clap::{Args, Parser, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;
use tf_module_update::source::{ModuleSource, SourceError};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; tf-module-update ... }
    #[clap(short = 'C', long = "directory")]
    pub directory: Vec<PathBuf>,

    #[clap(flatten)]
    pub from: FromArgs,

    #[clap(flatten)]
    pub to: ToArgs,

    /// Write changed files
    ///
    /// Without this flag changes are only reported.
    #[clap(short = 'w', long = "write")]
    pub write: bool,

    /// Least severe messages to report (trace, debug, info, warn, error)
    #[arg(short = 'l', long = "log-level", default_value_t = tracing::Level::INFO)]
    pub log_level: tracing::Level,

    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,

    /// Files and directories to process
    ///
    /// Directories are searched recursively for *.tf files, hidden entries are skipped.
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,
}

/// Which module sources to update
#[derive(Args, Debug, Default)]
#[command(next_help_heading = "Filter")]
pub struct FromArgs {
    /// Full module source to match, individual --from-* flags override its parts
    #[clap(id = "from-url", long = "from-url")]
    pub url: Option<String>,

    #[clap(id = "from-scheme", long = "from-scheme")]
    pub scheme: Option<String>,

    #[clap(id = "from-host", long = "from-host")]
    pub host: Option<String>,

    #[clap(id = "from-module", long = "from-module")]
    pub module: Option<String>,

    #[clap(id = "from-submodule", long = "from-submodule")]
    pub submodule: Option<String>,

    #[clap(id = "from-revision", long = "from-revision")]
    pub revision: Option<String>,
}

/// What matching module sources become
#[derive(Args, Debug, Default)]
#[command(next_help_heading = "Replacement")]
pub struct ToArgs {
    /// Full replacement module source, individual --to-* flags override its parts
    #[clap(id = "to-url", long = "to-url")]
    pub url: Option<String>,

    #[clap(id = "to-scheme", long = "to-scheme")]
    pub scheme: Option<String>,

    #[clap(id = "to-host", long = "to-host")]
    pub host: Option<String>,

    #[clap(id = "to-module", long = "to-module")]
    pub module: Option<String>,

    #[clap(id = "to-submodule", long = "to-submodule")]
    pub submodule: Option<String>,

    #[clap(id = "to-revision", long = "to-revision")]
    pub revision: Option<String>,
}

impl FromArgs {
    pub fn source(&self) -> Result<ModuleSource, SourceError> {
        source(
            self.url.as_deref(),
            [
                &self.scheme,
                &self.host,
                &self.module,
                &self.submodule,
                &self.revision,
            ],
        )
    }
}

impl ToArgs {
    pub fn source(&self) -> Result<ModuleSource, SourceError> {
        source(
            self.url.as_deref(),
            [
                &self.scheme,
                &self.host,
                &self.module,
                &self.submodule,
                &self.revision,
            ],
        )
    }
}

/// Parse `url` and put every given part on top of it
fn source(url: Option<&str>, parts: [&Option<String>; 5]) -> Result<ModuleSource, SourceError> {
    let base = match url {
        Some(url) => ModuleSource::parse(url)?,
        None => ModuleSource::default(),
    };

    let [scheme, host, module, submodule, revision] =
        parts.map(|part| part.clone().unwrap_or_default());
    let overlay = ModuleSource {
        scheme,
        host,
        module,
        submodule,
        revision: revision.into(),
        ..Default::default()
    };

    Ok(base.merge(&overlay))
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}
