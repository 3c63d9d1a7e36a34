//! Model data loading
//!
//! A model is a JSON or YAML file holding `ModelData`. A directory loads every
//! model file beneath it, in file-name order, merged into one element list.

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::entities::model::ModelData;
use crate::yaml::{parse_yaml_file, YamlError};

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("Model not found: {0}")]
    #[diagnostic(code(bimtk::load::not_found))]
    NotFound(PathBuf),

    #[error("Unsupported model format: {0}")]
    #[diagnostic(
        code(bimtk::load::format),
        help("Model files must end in .json, .yaml or .yml")
    )]
    UnsupportedFormat(PathBuf),

    #[error("No model files found in {0}")]
    #[diagnostic(code(bimtk::load::empty_dir))]
    EmptyDirectory(PathBuf),

    #[error("Invalid JSON in {path}: {source}")]
    #[diagnostic(code(bimtk::load::json))]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlError),

    #[error("IO error reading {path}: {source}")]
    #[diagnostic(code(bimtk::load::io))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Format {
    Json,
    Yaml,
}

fn format_of(path: &Path) -> Option<Format> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "json" => Some(Format::Json),
        "yaml" | "yml" => Some(Format::Yaml),
        _ => None,
    }
}

fn load_file(path: &Path) -> Result<ModelData, LoadError> {
    match format_of(path) {
        Some(Format::Json) => {
            let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str(&content).map_err(|source| LoadError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
        Some(Format::Yaml) => Ok(parse_yaml_file(path)?),
        None => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn walk_error(dir: &Path, err: walkdir::Error) -> LoadError {
    let path = err.path().unwrap_or(dir).to_path_buf();
    let source = match err.into_io_error() {
        Some(io) => io,
        None => std::io::Error::other("filesystem loop"),
    };
    LoadError::Io { path, source }
}

fn load_dir(dir: &Path) -> Result<ModelData, LoadError> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(dir, e))?;
        if entry.file_type().is_file() && format_of(entry.path()).is_some() {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        return Err(LoadError::EmptyDirectory(dir.to_path_buf()));
    }

    let mut merged = ModelData::default();
    for file in &files {
        let model = load_file(file)?;
        tracing::debug!(path = %file.display(), elements = model.elements.len(), "model file loaded");
        if merged.name.is_empty() {
            merged.name = model.name;
            merged.description = model.description;
        }
        merged.elements.extend(model.elements);
    }

    if merged.name.is_empty() {
        merged.name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    Ok(merged)
}

/// Load a model file, or every model file under a directory
pub fn load_model(path: &Path) -> Result<ModelData, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        load_dir(path)
    } else {
        load_file(path)
    }
}
