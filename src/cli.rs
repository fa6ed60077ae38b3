use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "main-dex-list")]
#[command(about = "Compute the classes that must be packaged in the primary dex file")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Resolve the closure of a root set against a classpath.
    Build {
        /// Jar or directory whose class files are the roots.
        #[arg(value_name = "ROOTS")]
        roots: Option<PathBuf>,

        /// Classpath to search, separated like PATH.
        #[arg(value_name = "CLASSPATH")]
        classpath: Option<String>,

        /// Additional root class, in `a.b.C` or `a/b/C.class` form.
        #[arg(long = "root", value_name = "CLASS")]
        root_names: Vec<String>,

        /// File listing root classes, one per line.
        #[arg(long, value_name = "FILE")]
        roots_file: Option<PathBuf>,

        #[arg(short = 'f', long, value_enum)]
        format: Option<OutputFormat>,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print every file contained in one classpath entry.
    List { location: PathBuf },
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
