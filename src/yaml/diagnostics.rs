//! Diagnostics for YAML syntax and shape errors
//!
//! Errors carry the source text so miette can point at the offending line.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A YAML document that failed to parse or did not match the expected shape
#[derive(Debug, Error, Diagnostic)]
#[error("Invalid YAML in {filename}: {message}")]
#[diagnostic(
    code(bimtk::yaml::syntax),
    help("check indentation, quoting and field names near the marked location")
)]
pub struct YamlSyntaxError {
    pub filename: String,
    pub message: String,
    pub line: Option<usize>,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl YamlSyntaxError {
    pub fn from_serde_error(err: &serde_yml::Error, content: &str, filename: &str) -> Self {
        let location = err.location();
        let span = location.as_ref().map(|loc| {
            let offset = loc.index().min(content.len().saturating_sub(1));
            SourceSpan::from((offset, 1))
        });

        Self {
            filename: filename.to_string(),
            message: err.to_string(),
            line: location.map(|loc| loc.line()),
            src: NamedSource::new(filename, content.to_string()),
            span,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("IO error: {0}")]
    #[diagnostic(code(bimtk::yaml::io))]
    Io(#[from] std::io::Error),
}
