//! File-fetch collaborator.
//!
//! The engine only ever asks a loader for raw query text and the sibling
//! `endpoint.txt` resource; where those bytes come from is the loader's
//! business. `LocalLoader` serves them from a directory on disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Query file extensions a loader recognizes.
const QUERY_EXTENSIONS: &[&str] = &["rq", "sparql"];

/// Source of query files and sibling resources.
pub trait FileLoader: Send + Sync {
    /// Raw text of the query file registered under `name`.
    fn raw_query(&self, name: &str) -> Result<String>;

    /// Contents of the sibling `endpoint.txt` resource.
    fn endpoint_text(&self) -> Result<String>;

    /// Names of all available queries.
    fn query_names(&self) -> Result<Vec<String>>;
}

/// Loader over a local directory of `.rq`/`.sparql` files.
#[derive(Debug, Clone)]
pub struct LocalLoader {
    base: PathBuf,
}

impl LocalLoader {
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        Self { base: base.as_ref().to_path_buf() }
    }
}

impl FileLoader for LocalLoader {
    fn raw_query(&self, name: &str) -> Result<String> {
        if name.contains('/') || name.contains("..") {
            return Err(Error::NotFound(format!("invalid query name '{}'", name)));
        }
        for ext in QUERY_EXTENSIONS {
            let path = self.base.join(format!("{}.{}", name, ext));
            if path.is_file() {
                return Ok(fs::read_to_string(path)?);
            }
        }
        Err(Error::NotFound(format!("no query named '{}'", name)))
    }

    fn endpoint_text(&self) -> Result<String> {
        Ok(fs::read_to_string(self.base.join("endpoint.txt"))?)
    }

    fn query_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base)? {
            let path = entry?.path();
            let is_query = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| QUERY_EXTENSIONS.contains(&e))
                .unwrap_or(false);
            if is_query {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
