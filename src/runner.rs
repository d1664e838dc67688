use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::config::ScanConfig;
use crate::console::{print_class_name, print_verbose_class};
use crate::csv_out::{CsvSettings, CsvTargetState, write_rows};
use crate::introspect::ClassIntrospector;
use crate::structure::ClassRecord;

/// Scans each input path in turn and reports it to CSV targets and the console.
///
/// Header state for CSV destinations lives here, so one runner is one run.
pub struct ScanRunner<'a, I, W> {
    config: &'a ScanConfig,
    introspector: I,
    out: W,
    csv_state: CsvTargetState,
}

impl<'a, I: ClassIntrospector, W: Write> ScanRunner<'a, I, W> {
    pub fn new(config: &'a ScanConfig, introspector: I, out: W) -> Self {
        Self {
            config,
            introspector,
            out,
            csv_state: CsvTargetState::new(),
        }
    }

    /// Stops at the first failure; inputs after it are not processed.
    pub fn run(&mut self) -> Result<()> {
        let config = self.config;
        for input in &config.inputs {
            self.process_input(input)?;
        }
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn process_input(&mut self, input: &str) -> Result<()> {
        let path = Path::new(input);
        let label = if path.is_dir() { "directory" } else { "file" };
        info!("=== Analyzing {label} : {input} ===");

        let discovered = self
            .introspector
            .enumerate_classes(path)
            .with_context(|| format!("Failed to scan {input}"))?;
        if discovered.is_empty() {
            info!("No classes found in {label}.");
            return Ok(());
        }

        let classes = self.filter_and_sort(discovered);
        info!("Found {} classes:", classes.len());

        let settings = CsvSettings {
            format: self.config.format,
            encoding: self.config.encoding,
        };
        for target in &self.config.csv_targets {
            write_rows(
                &mut self.csv_state,
                target.kind,
                &target.path,
                settings,
                input,
                &classes,
            )?;
            info!(
                "{} {} generated: {} (encoding: {})",
                target.kind.label(),
                settings.format.label(),
                target.path.display(),
                settings.encoding.name()
            );
        }

        if !self.config.quiet {
            for class in &classes {
                if self.config.verbose {
                    print_verbose_class(&mut self.out, class)?;
                } else {
                    print_class_name(&mut self.out, class)?;
                }
            }
            self.out.flush()?;
        }
        Ok(())
    }

    fn filter_and_sort(&self, discovered: Vec<ClassRecord>) -> Vec<ClassRecord> {
        let mut classes: Vec<ClassRecord> = discovered
            .into_iter()
            .filter(|c| self.config.matches_package_filter(&c.name))
            .collect();
        classes.sort_by(|a, b| a.name.cmp(&b.name));
        classes
    }
}
