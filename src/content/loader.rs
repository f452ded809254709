//! Content loader - discovers and reads documents from the source directory

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{ContentError, ContentRecord};

/// Finds documents under a source directory
pub struct ContentLoader {
    source_dir: PathBuf,
    extensions: Vec<String>,
}

impl ContentLoader {
    pub fn new<P: AsRef<Path>>(source_dir: P, extensions: &[String]) -> Self {
        Self {
            source_dir: source_dir.as_ref().to_path_buf(),
            extensions: extensions.to_vec(),
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// All document paths, sorted. Entries under `_`- or `.`-prefixed
    /// directories are skipped.
    pub fn discover(&self) -> Vec<PathBuf> {
        if !self.source_dir.exists() {
            tracing::warn!("Source directory {:?} does not exist", self.source_dir);
            return Vec::new();
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(&self.source_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name().to_str()))
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!("Skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && self.is_document(e.path()))
            .map(|e| e.into_path())
            .collect();

        paths.sort();
        tracing::debug!("Discovered {} documents in {:?}", paths.len(), self.source_dir);
        paths
    }

    /// Read and parse one document
    pub fn load(&self, path: &Path) -> Result<ContentRecord, ContentError> {
        let content = fs::read_to_string(path)?;
        ContentRecord::parse(&content)
    }

    /// Path relative to the source directory, with `/` separators
    pub fn relative_source(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.source_dir).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|ext| ext.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }
}

fn is_hidden(name: Option<&str>) -> bool {
    name.map(|n| n.starts_with('_') || n.starts_with('.'))
        .unwrap_or(false)
}

/// Output path of a page, relative to the public directory.
///
/// `blog/recipe.md` becomes `blog/recipe/index.html`; an `index.md`
/// renders into its own directory.
pub fn output_path(source: &str) -> PathBuf {
    let without_ext = match source.rfind('.') {
        Some(pos) if !source[pos..].contains('/') => &source[..pos],
        _ => source,
    };

    let dir = if without_ext == "index" {
        ""
    } else if let Some(parent) = without_ext.strip_suffix("/index") {
        parent
    } else {
        without_ext
    };

    let mut path = PathBuf::new();
    for part in dir.split('/').filter(|p| !p.is_empty()) {
        path.push(part);
    }
    path.push("index.html");
    path
}
