//! Version-declaration document editor.
//!
//! `sources-version.yaml` is a flat key → version-string mapping. Every key
//! is visited every run; the operator may accept the current value or type a
//! replacement. The document is rewritten whole with deterministic key
//! ordering (BTreeMap), which keeps the diff reviewable — byte preservation
//! of unrecognized content is not a goal here, unlike the spec-file editor.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::io::atomic_write;
use crate::prompt::Prompter;

/// Prompt for a replacement value for every key in the document and write it
/// back. Returns the resulting mapping.
pub fn edit_versions(path: &Path, prompter: &dyn Prompter) -> Result<BTreeMap<String, String>> {
    let text = std::fs::read_to_string(path)?;
    // Permissive load: a bare `1.0` is a YAML float, but it is still a
    // version string to us.
    let current: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(&text)?;

    let mut updated = BTreeMap::new();
    for (key, value) in &current {
        let value = scalar_to_string(value);
        let new_value = prompter.ask(&format!("New value for '{key}'"), Some(&value))?;
        updated.insert(key.clone(), new_value);
    }

    atomic_write(path, serde_yaml::to_string(&updated)?.as_bytes())?;
    Ok(updated)
}

fn scalar_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .unwrap_or_default()
            .trim_end()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::testing::ScriptedPrompter;
    use tempfile::TempDir;

    fn write_doc(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("sources-version.yaml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn every_key_is_visited_and_key_set_preserved() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "server: 1.4.2\nui: 2.0.0\n");
        let prompter = ScriptedPrompter::new(["1.4.3", ""]);

        let updated = edit_versions(&path, &prompter).unwrap();

        assert_eq!(updated.len(), 2);
        assert_eq!(updated["server"], "1.4.3");
        assert_eq!(updated["ui"], "2.0.0");
    }

    #[test]
    fn rewrite_uses_sorted_key_order() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "zeta: 9.9.1\nalpha: 1.0.0\n");
        let prompter = ScriptedPrompter::new(["", ""]);

        edit_versions(&path, &prompter).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "alpha: 1.0.0\nzeta: 9.9.1\n");
    }

    #[test]
    fn bare_numeric_versions_are_loaded_permissively() {
        let dir = TempDir::new().unwrap();
        // `2` is a YAML integer, but it is still a version string to us.
        let path = write_doc(&dir, "server: 2\n");
        let prompter = ScriptedPrompter::new(["2.0.1"]);

        let updated = edit_versions(&path, &prompter).unwrap();
        assert_eq!(updated["server"], "2.0.1");
    }

    #[test]
    fn rewritten_document_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "server: 1.4.2\n");
        let prompter = ScriptedPrompter::new(["2.0.0"]);
        edit_versions(&path, &prompter).unwrap();

        let reread: BTreeMap<String, String> =
            serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reread["server"], "2.0.0");
    }
}
