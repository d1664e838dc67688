use clap::{ArgAction, Parser};

#[derive(Debug, Clone, Parser)]
#[command(name = "class-scanner")]
#[command(about = "Scan Java class files, JARs and class directories and report their structure")]
pub struct Cli {
    /// Class files, JAR archives or class directories to scan
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,

    /// Show detailed class information
    #[arg(long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress standard output and log messages
    #[arg(long, action = ArgAction::Count)]
    pub quiet: u8,

    /// Keep only classes whose name starts with this prefix (repeatable)
    #[arg(long, value_name = "PACKAGE")]
    pub package: Vec<String>,

    /// Write methods to this CSV/TSV file
    #[arg(long, value_name = "FILE")]
    pub methods_csv: Vec<String>,

    /// Write fields to this CSV/TSV file
    #[arg(long, value_name = "FILE")]
    pub fields_csv: Vec<String>,

    /// Write constructors to this CSV/TSV file
    #[arg(long, value_name = "FILE")]
    pub constructors_csv: Vec<String>,

    /// Output format: csv or tsv (default: csv)
    #[arg(long, value_name = "FORMAT")]
    pub format: Vec<String>,

    /// Character encoding for CSV files (default: UTF-8)
    #[arg(long, value_name = "CHARSET")]
    pub charset: Vec<String>,
}

impl Cli {
    pub fn is_verbose(&self) -> bool {
        self.verbose > 0
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }
}

/// First occurrence of a single-valued option.
pub fn first_value(values: &[String]) -> Option<&str> {
    values.first().map(String::as_str)
}
