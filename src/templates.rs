//! Catalog of style templates available to generation requests.

use crate::common::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

const TEMPLATE_SUFFIX: &str = ".pptx";

/// One style template on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    /// File name without the `.pptx` suffix
    pub name: String,
    pub path: PathBuf,
    pub filename: String,
}

/// List the `.pptx` files in `dir`, sorted by file name.
///
/// The directory is read afresh on every call, and created when missing.
pub fn list_templates(dir: &Path) -> Result<Vec<TemplateInfo>> {
    std::fs::create_dir_all(dir)?;

    let mut templates = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Ok(filename) = entry.file_name().into_string() else {
            continue;
        };
        let Some(name) = filename.strip_suffix(TEMPLATE_SUFFIX) else {
            continue;
        };
        templates.push(TemplateInfo {
            name: name.to_string(),
            path: entry.path(),
            filename: filename.clone(),
        });
    }

    templates.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lists_pptx_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["ocean.pptx", "autumn.pptx", "notes.txt", "draft.pptx.bak"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.pptx")).unwrap();

        let templates = list_templates(dir.path()).unwrap();
        let names: Vec<_> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["autumn", "ocean"]);
        assert_eq!(templates[1].filename, "ocean.pptx");
        assert_eq!(templates[1].path, dir.path().join("ocean.pptx"));
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let catalog = dir.path().join("templates");
        assert!(list_templates(&catalog).unwrap().is_empty());
        assert!(catalog.is_dir());
    }

    #[test]
    fn test_rereads_on_every_call() {
        let dir = TempDir::new().unwrap();
        assert!(list_templates(dir.path()).unwrap().is_empty());
        std::fs::write(dir.path().join("fresh.pptx"), b"").unwrap();
        assert_eq!(list_templates(dir.path()).unwrap().len(), 1);
    }
}
