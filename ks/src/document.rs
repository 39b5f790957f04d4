//! Loading knowledge documents from a source directory

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::StoreError;

/// Recognized document extensions
const EXTENSIONS: [&str; 2] = ["md", "txt"];

/// One source document, loaded whole before chunking
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeDocument {
    /// File name the content came from, reported as the hit source
    pub source: String,
    /// Full document text
    pub content: String,
}

/// Load every document in `dir`, creating the directory if missing
///
/// The scan is non-recursive and sorted by file name so rebuilds are
/// deterministic. A file that cannot be read is logged and skipped; a
/// missing or empty directory yields an empty list.
pub fn load_documents(dir: &Path) -> Result<Vec<KnowledgeDocument>, StoreError> {
    debug!(dir = %dir.display(), "Scanning knowledge directory");
    fs::create_dir_all(dir)?;

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if EXTENSIONS.contains(&ext) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(%source, chars = content.chars().count(), "Loaded document");
                documents.push(KnowledgeDocument { source, content });
            }
            Err(e) => {
                warn!(%source, error = %e, "Skipping unreadable document");
            }
        }
    }

    debug!(document_count = documents.len(), "Finished loading documents");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_documents_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b_kyoto.md"), "京都の情報").unwrap();
        std::fs::write(dir.path().join("a_onsen.txt"), "温泉の情報").unwrap();
        std::fs::write(dir.path().join("ignore.json"), "{}").unwrap();

        let docs = load_documents(dir.path()).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].source, "a_onsen.txt");
        assert_eq!(docs[1].source, "b_kyoto.md");
        assert_eq!(docs[0].content, "温泉の情報");
    }

    #[test]
    fn test_load_documents_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("knowledge_base");

        let docs = load_documents(&nested).unwrap();

        assert!(docs.is_empty());
        assert!(nested.is_dir());
    }

    #[test]
    fn test_load_documents_skips_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad.md"), [0xff, 0xfe, 0x80]).unwrap();
        std::fs::write(dir.path().join("good.md"), "正しいテキスト").unwrap();

        let docs = load_documents(dir.path()).unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "good.md");
    }
}
