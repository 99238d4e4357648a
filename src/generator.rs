//! Generation driver
//!
//! Reads the whole input, runs every line through classification, record
//! parsing and resolution, then renders and writes both artifacts. Nothing
//! is written unless every step before it succeeded.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::{FailurePolicy, GeneratorConfig};
use crate::diagnostics::Diagnostic;
use crate::dsl::{classify, parse_record, LineClass};
use crate::error::{GeneratorError, Result};
use crate::render::{Artifacts, DocumentAssembler, RenderOptions, TemplateSet};
use crate::resolve::{resolve, ResolvedEquation};

/// Resolved equations in input order plus everything that was dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    pub equations: Vec<ResolvedEquation>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Generator<'a> {
    templates: &'a TemplateSet,
    policy: FailurePolicy,
}

impl<'a> Generator<'a> {
    pub fn new(templates: &'a TemplateSet, policy: FailurePolicy) -> Self {
        Self { templates, policy }
    }

    /// Turn a whole document into resolved equations.
    pub fn process(&self, document: &str) -> Result<GenerationReport> {
        let mut report = GenerationReport::default();

        for (index, raw) in document.lines().enumerate() {
            let line_number = index + 1;
            let line = match classify(line_number, raw) {
                LineClass::Blank => continue,
                LineClass::Skipped(diagnostic) => {
                    warn!("{diagnostic}");
                    report.diagnostics.push(diagnostic);
                    continue;
                }
                LineClass::Record(line) => line,
            };

            match parse_record(&line).and_then(|record| resolve(&record)) {
                Ok(equation) => {
                    let unresolved = equation.unresolved_symbols();
                    if !unresolved.is_empty() {
                        warn!(
                            "line {line_number}: `{}` keeps free symbols outside its parameters: {}",
                            equation.name,
                            unresolved.into_iter().collect::<Vec<_>>().join(", ")
                        );
                    }
                    debug!("line {line_number}: {} = {}", equation.name, equation.expression);
                    report.equations.push(equation);
                }
                Err(err) if err.is_record_level() && self.policy == FailurePolicy::BestEffort => {
                    let diagnostic = Diagnostic::RejectedRecord {
                        line_number,
                        reason: err.to_string(),
                    };
                    warn!("{diagnostic}");
                    report.diagnostics.push(diagnostic);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(report)
    }

    pub fn render(&self, report: &GenerationReport, options: &RenderOptions) -> Result<Artifacts> {
        DocumentAssembler::new(self.templates).render(&report.equations, options)
    }
}

/// Result of a full run.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: GenerationReport,
    pub artifacts: Artifacts,
    /// Paths written, empty on a dry run.
    pub written: Vec<PathBuf>,
}

/// Read the configured input, render both artifacts and, unless `dry_run`,
/// overwrite the configured outputs.
pub fn run(config: &GeneratorConfig, dry_run: bool) -> Result<RunOutcome> {
    let templates = TemplateSet::load(&config.templates)?;
    let document = std::fs::read_to_string(&config.input)
        .map_err(|e| GeneratorError::io(&config.input, e))?;

    let generator = Generator::new(&templates, config.policy);
    let report = generator.process(&document)?;
    let options = RenderOptions::for_paths(&config.input, &config.output.declarations);
    let artifacts = generator.render(&report, &options)?;

    let written = if dry_run {
        info!("Dry run: nothing written");
        Vec::new()
    } else {
        artifacts.write(&config.output)?;
        vec![
            config.output.declarations.clone(),
            config.output.definitions.clone(),
        ]
    };

    info!(
        "Generated {} functions from {} ({} lines skipped or rejected)",
        report.equations.len(),
        config.input.display(),
        report.diagnostics.len()
    );

    Ok(RunOutcome {
        report,
        artifacts,
        written,
    })
}
