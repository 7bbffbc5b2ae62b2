//! Corpus file loading.
//!
//! Reads an already cleaned corpus stored either as JSON Lines (one
//! document object per line) or as a single JSON array of documents.

use crate::error::{Error, Result};
use crate::models::Document;
use std::path::Path;
use tracing::{debug, info};

/// On-disk layout of a corpus file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    JsonLines,
    JsonArray,
}

/// Guess the layout from the first non-whitespace character.
pub fn detect_format(content: &str) -> CorpusFormat {
    match content.trim_start().chars().next() {
        Some('[') => CorpusFormat::JsonArray,
        _ => CorpusFormat::JsonLines,
    }
}

/// Parse corpus content in either layout.
///
/// A malformed row fails the whole load with its 1-indexed line number.
pub fn parse_corpus(content: &str) -> Result<Vec<Document>> {
    let format = detect_format(content);
    debug!(?format, "Parsing corpus");

    match format {
        CorpusFormat::JsonArray => parse_array(content),
        CorpusFormat::JsonLines => parse_lines(content),
    }
}

fn parse_array(content: &str) -> Result<Vec<Document>> {
    let documents: Vec<Document> = serde_json::from_str(content).map_err(|e| Error::Corpus {
        line: e.line(),
        message: e.to_string(),
    })?;

    if let Some(index) = documents.iter().position(|d| d.genre.trim().is_empty()) {
        return Err(Error::Corpus {
            line: 0,
            message: format!("array element {} has an empty genre", index),
        });
    }
    Ok(documents)
}

fn parse_lines(content: &str) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let document: Document = serde_json::from_str(line).map_err(|e| Error::Corpus {
            line: number + 1,
            message: e.to_string(),
        })?;
        if document.genre.trim().is_empty() {
            return Err(Error::Corpus {
                line: number + 1,
                message: "empty genre".to_string(),
            });
        }
        documents.push(document);
    }
    Ok(documents)
}

/// Read and parse a corpus file.
pub fn load_corpus(path: &Path) -> Result<Vec<Document>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
        source: e,
        path: path.to_path_buf(),
    })?;

    let documents = parse_corpus(&content)?;
    info!(
        path = %path.display(),
        "Loaded {} documents",
        documents.len()
    );
    Ok(documents)
}

/// Async variant of [`load_corpus`] reading through `tokio::fs`.
pub async fn load_corpus_async(path: &Path) -> Result<Vec<Document>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Io {
            source: e,
            path: path.to_path_buf(),
        })?;

    let documents = parse_corpus(&content)?;
    info!(
        path = %path.display(),
        "Loaded {} documents",
        documents.len()
    );
    Ok(documents)
}
