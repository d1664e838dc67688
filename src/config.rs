use encoding_rs::{Encoding, UTF_8};
use std::path::PathBuf;
use tracing::warn;

use crate::cli::{Cli, first_value};
use crate::scan::find_processable_paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputKind {
    Methods,
    Fields,
    Constructors,
}

impl OutputKind {
    pub fn label(self) -> &'static str {
        match self {
            OutputKind::Methods => "Methods",
            OutputKind::Fields => "Fields",
            OutputKind::Constructors => "Constructors",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvFormat {
    #[default]
    Csv,
    Tsv,
}

impl CsvFormat {
    pub fn delimiter(self) -> u8 {
        match self {
            CsvFormat::Csv => b',',
            CsvFormat::Tsv => b'\t',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CsvFormat::Csv => "CSV",
            CsvFormat::Tsv => "TSV",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTarget {
    pub kind: OutputKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Accepted input paths, literally as given on the command line.
    pub inputs: Vec<String>,
    pub verbose: bool,
    pub quiet: bool,
    pub package_filters: Vec<String>,
    pub csv_targets: Vec<CsvTarget>,
    pub format: CsvFormat,
    pub encoding: &'static Encoding,
}

impl ScanConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        let csv_targets: Vec<CsvTarget> = [
            (OutputKind::Methods, &cli.methods_csv),
            (OutputKind::Fields, &cli.fields_csv),
            (OutputKind::Constructors, &cli.constructors_csv),
        ]
        .into_iter()
        .filter_map(|(kind, values)| {
            first_value(values).map(|path| CsvTarget {
                kind,
                path: PathBuf::from(path),
            })
        })
        .collect();

        // Format and charset only matter, and only warn, when a file is written.
        let (format, encoding) = if csv_targets.is_empty() {
            (CsvFormat::Csv, UTF_8)
        } else {
            (
                resolve_format_or_default(first_value(&cli.format).unwrap_or("csv")),
                resolve_charset_or_default(first_value(&cli.charset).unwrap_or("UTF-8")),
            )
        };

        Self {
            inputs: find_processable_paths(&cli.paths),
            verbose: cli.is_verbose(),
            quiet: cli.is_quiet(),
            package_filters: cli.package.iter().map(|p| p.trim().to_string()).collect(),
            csv_targets,
            format,
            encoding,
        }
    }

    /// Raw prefix match on the qualified name; `com.examplefoo.A` matches `com.example`.
    pub fn matches_package_filter(&self, class_name: &str) -> bool {
        self.package_filters.is_empty()
            || self
                .package_filters
                .iter()
                .any(|pkg| class_name.starts_with(pkg.as_str()))
    }
}

pub fn resolve_format(name: &str) -> Option<CsvFormat> {
    match name.to_ascii_lowercase().as_str() {
        "csv" => Some(CsvFormat::Csv),
        "tsv" => Some(CsvFormat::Tsv),
        _ => None,
    }
}

pub fn resolve_format_or_default(name: &str) -> CsvFormat {
    resolve_format(name).unwrap_or_else(|| {
        warn!("Unknown format '{name}', using CSV");
        CsvFormat::Csv
    })
}

pub fn resolve_charset(name: &str) -> Option<&'static Encoding> {
    Encoding::for_label(name.trim().as_bytes())
}

pub fn resolve_charset_or_default(name: &str) -> &'static Encoding {
    resolve_charset(name).unwrap_or_else(|| {
        warn!("Invalid charset '{name}', using UTF-8");
        UTF_8
    })
}
