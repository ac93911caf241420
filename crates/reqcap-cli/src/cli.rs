use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "reqcap",
    about = "Merge derived OSGi Require-Capability headers into bundle manifests",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge a derived Require-Capability header into an existing one
    Merge(MergeArgs),
    /// Parse a header and print its capability clauses
    Normalize(NormalizeArgs),
    /// Run the full manifest processor over a compiled output directory
    Process(ProcessArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// Require-Capability value already on the manifest
    #[arg(long)]
    pub existing: Option<String>,
    /// Require-Capability value computed by analysis
    #[arg(long)]
    pub derived: Option<String>,
    /// Additional manifest attribute, NAME=VALUE
    #[arg(long = "attr", value_parser = parse_attr)]
    pub attrs: Vec<(String, String)>,
}

#[derive(Args)]
pub struct NormalizeArgs {
    pub header: String,
}

#[derive(Args)]
pub struct ProcessArgs {
    /// Directory holding the compiled classes
    #[arg(long)]
    pub output_dir: PathBuf,
    /// Project identifier used in diagnostics
    #[arg(long, default_value = "project")]
    pub id: String,
    /// Dependency file to put on the analysis classpath
    #[arg(long = "artifact")]
    pub artifacts: Vec<PathBuf>,
    /// Extra classpath location; unreadable ones are skipped
    #[arg(long = "classpath")]
    pub classpath: Vec<PathBuf>,
    /// Require-Capability value reported by the analyzer
    #[arg(long)]
    pub derived: Option<String>,
    /// Require-Capability value already on the manifest
    #[arg(long)]
    pub existing: Option<String>,
    /// Additional manifest attribute, NAME=VALUE
    #[arg(long = "attr", value_parser = parse_attr)]
    pub attrs: Vec<(String, String)>,
    /// Force derivation on
    #[arg(long, conflicts_with = "no_derive")]
    pub derive: bool,
    /// Force derivation off
    #[arg(long)]
    pub no_derive: bool,
}

impl ProcessArgs {
    /// The derive flag given on the command line, if any.
    pub fn derive_flag(&self) -> Option<bool> {
        match (self.derive, self.no_derive) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

fn parse_attr(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty attribute name in '{s}'"));
    }
    Ok((name.to_string(), value.to_string()))
}
