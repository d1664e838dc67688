//! # class-scanner
//!
//! Reads Java class files, JAR archives and class directories, and reports
//! their structure (classes, fields, methods, constructors, annotations) to
//! the console or to CSV/TSV files.
//!
//! ## Architecture
//!
//! - **cli**: Command-line surface
//! - **config**: Resolution of the parsed command line into a `ScanConfig`
//! - **scan**: Input path acceptance and class-file discovery in directories
//! - **catalog**: Class entries inside JAR/ZIP archives
//! - **classfile**: Class-file binary reader
//! - **signature**: Descriptor and generic signature rendering
//! - **structure**: Class/member records and modifier rendering
//! - **introspect**: The `ClassIntrospector` seam and its bytecode implementation
//! - **csv_out**: CSV/TSV writers with per-destination header tracking
//! - **console**: Plain and verbose console listings
//! - **runner**: Per-input scan, filter, sort and report orchestration

pub mod catalog;
pub mod classfile;
pub mod cli;
pub mod config;
pub mod console;
pub mod csv_out;
pub mod introspect;
pub mod runner;
pub mod scan;
pub mod signature;
pub mod structure;
