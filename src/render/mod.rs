//! Artifact rendering
//!
//! Both artifacts are rendered from one [`TemplateSet`] and the same list of
//! resolved equations, so the declarations and definitions can never
//! disagree about which functions exist or what their signatures are.

use serde::Serialize;
use std::path::Path;
use tera::{Context, Tera};
use tracing::debug;

use crate::config::{OutputPaths, TemplatePaths};
use crate::error::{GeneratorError, Result};
use crate::resolve::ResolvedEquation;
use crate::symbolic::Expr;

pub const DECLARATIONS_TEMPLATE: &str = "declarations.h";
pub const DEFINITIONS_TEMPLATE: &str = "definitions.cpp";

const BUILTIN_DECLARATIONS: &str = include_str!("templates/declarations.h.tera");
const BUILTIN_DEFINITIONS: &str = include_str!("templates/definitions.cpp.tera");

/// The pair of templates a run renders with. Built once, then borrowed.
pub struct TemplateSet {
    tera: Tera,
}

impl TemplateSet {
    pub fn builtin() -> Result<Self> {
        Self::from_sources(BUILTIN_DECLARATIONS, BUILTIN_DEFINITIONS)
    }

    pub fn from_sources(declarations: &str, definitions: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]); // generated C++, never HTML
        tera.add_raw_templates(vec![
            (DECLARATIONS_TEMPLATE, declarations),
            (DEFINITIONS_TEMPLATE, definitions),
        ])?;
        Ok(Self { tera })
    }

    /// Built-in templates, with any configured file taking the place of the
    /// matching built-in.
    pub fn load(paths: &TemplatePaths) -> Result<Self> {
        let declarations = read_or(paths.declarations.as_deref(), BUILTIN_DECLARATIONS)?;
        let definitions = read_or(paths.definitions.as_deref(), BUILTIN_DEFINITIONS)?;
        Self::from_sources(&declarations, &definitions)
    }
}

fn read_or(path: Option<&Path>, builtin: &str) -> Result<String> {
    match path {
        Some(path) => {
            debug!("Loading template {}", path.display());
            std::fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))
        }
        None => Ok(builtin.to_string()),
    }
}

/// Values shared by both templates that do not depend on the equations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub source_file: String,
    pub declarations_file: String,
    pub header_guard: String,
}

impl RenderOptions {
    pub fn for_paths(input: &Path, declarations: &Path) -> Self {
        let file_name = |path: &Path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        };
        let stem = declarations
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            source_file: file_name(input),
            declarations_file: file_name(declarations),
            header_guard: header_guard(&stem),
        }
    }
}

/// `SolverFunctions` becomes `SolverFunctionsH`.
fn header_guard(stem: &str) -> String {
    let mut guard: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if guard.is_empty() || guard.starts_with(|c: char| c.is_ascii_digit()) {
        guard.insert(0, '_');
    }
    guard.push('H');
    guard
}

/// One equation as the templates see it.
#[derive(Debug, Clone, Serialize)]
pub struct EquationView {
    pub index: usize,
    pub name: String,
    pub parameters: Vec<String>,
    pub expression: String,
    /// One C++ expression per parameter, in parameter order.
    pub gradient: Vec<String>,
}

impl EquationView {
    fn new(index: usize, equation: &ResolvedEquation) -> Result<Self> {
        let cpp = |expr: &Expr| {
            expr.to_cpp()
                .map_err(|source| GeneratorError::ExpressionCompile {
                    function: equation.name.clone(),
                    text: expr.to_string(),
                    source,
                })
        };
        Ok(Self {
            index,
            name: equation.name.clone(),
            parameters: equation.parameters.clone(),
            expression: cpp(&equation.expression)?,
            gradient: equation
                .gradient()
                .iter()
                .map(cpp)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

/// The rendered text of both artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub declarations: String,
    pub definitions: String,
}

impl Artifacts {
    /// Overwrite both destinations.
    ///
    /// Destination directories are checked before anything is written, so a
    /// missing directory leaves both files untouched.
    pub fn write(&self, paths: &OutputPaths) -> Result<()> {
        for path in [&paths.declarations, &paths.definitions] {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.is_dir() {
                    return Err(GeneratorError::io(
                        parent,
                        std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            "output directory does not exist",
                        ),
                    ));
                }
            }
        }

        std::fs::write(&paths.declarations, &self.declarations)
            .map_err(|e| GeneratorError::io(&paths.declarations, e))?;
        std::fs::write(&paths.definitions, &self.definitions)
            .map_err(|e| GeneratorError::io(&paths.definitions, e))?;
        Ok(())
    }
}

pub struct DocumentAssembler<'a> {
    templates: &'a TemplateSet,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(templates: &'a TemplateSet) -> Self {
        Self { templates }
    }

    pub fn render(
        &self,
        equations: &[ResolvedEquation],
        options: &RenderOptions,
    ) -> Result<Artifacts> {
        let views: Vec<EquationView> = equations
            .iter()
            .enumerate()
            .map(|(index, equation)| EquationView::new(index, equation))
            .collect::<Result<_>>()?;

        let mut context = Context::new();
        context.insert("equations", &views);
        context.insert("source_file", &options.source_file);
        context.insert("declarations_file", &options.declarations_file);
        context.insert("header_guard", &options.header_guard);

        let declarations = self.templates.tera.render(DECLARATIONS_TEMPLATE, &context)?;
        let definitions = self.templates.tera.render(DEFINITIONS_TEMPLATE, &context)?;
        debug!(
            "Rendered {} equations ({} + {} bytes)",
            views.len(),
            declarations.len(),
            definitions.len()
        );

        Ok(Artifacts {
            declarations,
            definitions,
        })
    }
}
