//! Directory Loading
//!
//! Reads descriptor files from disk into [`SourceDocument`]s. This is the
//! collaborator that feeds [`crate::batch::BatchParser`]; nothing here
//! interprets file contents.

use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::ParseConfig;
use crate::descriptor::SourceDocument;

/// Load every matching file under `dir`, sorted by relative path.
///
/// Documents are named by their path relative to `dir` with `/` separators.
pub fn load_documents(dir: &Path, config: &ParseConfig) -> anyhow::Result<Vec<SourceDocument>> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let accepted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| config.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
            .unwrap_or(false);
        if !accepted {
            continue;
        }

        let relative = path.strip_prefix(dir)?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if config.skip_prefixes.iter().any(|prefix| name.starts_with(prefix.as_str())) {
            debug!(file = %name, "skipping file under excluded prefix");
            continue;
        }

        let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        documents.push(SourceDocument::text(name, content));
    }

    debug!(count = documents.len(), dir = %dir.display(), "loaded descriptor documents");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_and_names() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("entities")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();

        fs::write(root.join("entities/user.json"), "{\"name\":\"User\"}").unwrap();
        fs::write(root.join("entities/order.entity.js"), "new EntitySchema({ name: 'Order' })").unwrap();
        fs::write(root.join("README.md"), "# docs").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "").unwrap();

        let docs = load_documents(root, &ParseConfig::default()).unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["entities/order.entity.js", "entities/user.json"]);
        assert!(docs[0].is_module());
    }

    #[test]
    fn test_custom_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("b.js"), "").unwrap();

        let config = ParseConfig {
            extensions: vec!["json".to_string()],
            ..ParseConfig::default()
        };
        let docs = load_documents(dir.path(), &config).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "a.json");
    }
}
