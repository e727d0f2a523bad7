//! RPM spec file field editing.
//!
//! The spec file is treated as an opaque ordered sequence of lines; only the
//! value token of a recognized field directive is ever rewritten. Editing is
//! a two-pass algorithm — pattern-match scan, then indexed line replacement —
//! so every byte outside a rewritten value token survives verbatim,
//! including line terminators and a missing final newline. Zero-change edits
//! never touch the file.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{RelmanError, Result};
use crate::io::atomic_write;
use crate::prompt::Prompter;

static VERSION_RE: OnceLock<Regex> = OnceLock::new();

fn version_re() -> &'static Regex {
    VERSION_RE.get_or_init(|| Regex::new(r"^(Version:\s*)(.+)$").unwrap())
}

/// One line split into its body and terminator (`\n`, `\r\n`, or nothing for
/// an unterminated final line).
fn split_line(raw: &str) -> (&str, &str) {
    if let Some(body) = raw.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = raw.strip_suffix('\n') {
        (body, "\n")
    } else {
        (raw, "")
    }
}

// ---------------------------------------------------------------------------
// Version: directive
// ---------------------------------------------------------------------------

/// Prompt for a new `Version:` value. Returns `None` (and leaves the file
/// untouched) when the operator keeps the current value; the new version
/// otherwise. A spec file without a `Version:` line is a fatal error — the
/// operator has to fix the document out-of-band.
pub fn update_version_field(path: &Path, prompter: &dyn Prompter) -> Result<Option<String>> {
    let content = std::fs::read_to_string(path)?;
    let mut lines: Vec<String> = content.split_inclusive('\n').map(String::from).collect();

    let mut found = None;
    for (number, raw) in lines.iter().enumerate() {
        let (body, terminator) = split_line(raw);
        if let Some(caps) = version_re().captures(body) {
            found = Some((
                number,
                caps[1].to_string(),
                caps[2].to_string(),
                terminator.to_string(),
            ));
            break;
        }
    }

    let Some((number, label, old_version, terminator)) = found else {
        return Err(RelmanError::VersionFieldNotFound {
            path: path.to_path_buf(),
        });
    };

    let new_version = prompter.ask("New version for spec file", Some(&old_version))?;
    if new_version == old_version {
        return Ok(None);
    }

    lines[number] = format!("{label}{new_version}{terminator}");
    atomic_write(path, lines.concat().as_bytes())?;
    Ok(Some(new_version))
}

// ---------------------------------------------------------------------------
// %global directives
// ---------------------------------------------------------------------------

/// Prompt for replacement values for each declared `%global <name> <value>`
/// directive found in the file.
///
/// A line is attributed to at most one field (first declared field wins),
/// then scanning continues with the next line. The file is rewritten only
/// when at least one value actually changed. Returns the resulting value of
/// every matched field plus the changed flag.
pub fn update_global_fields(
    path: &Path,
    fields: &[&str],
    prompter: &dyn Prompter,
) -> Result<(BTreeMap<String, String>, bool)> {
    let content = std::fs::read_to_string(path)?;
    let mut lines: Vec<String> = content.split_inclusive('\n').map(String::from).collect();

    let patterns: Vec<(&str, Regex)> = fields
        .iter()
        .map(|field| {
            let pattern = format!(r"^(%global {} )(\S*)", regex::escape(field));
            (*field, Regex::new(&pattern).expect("valid field pattern"))
        })
        .collect();

    let mut new_values = BTreeMap::new();
    let mut dirty = false;

    for number in 0..lines.len() {
        let (body, terminator) = split_line(&lines[number]);
        let (body, terminator) = (body.to_string(), terminator.to_string());
        for (field, pattern) in &patterns {
            let Some(caps) = pattern.captures(&body) else {
                continue;
            };
            let old_value = caps[2].to_string();
            let new_value = prompter.ask(&format!("Enter '{field}' value"), Some(&old_value))?;
            if new_value != old_value {
                let value_end = caps.get(2).expect("value group").end();
                lines[number] =
                    format!("{}{}{}{}", &caps[1], new_value, &body[value_end..], terminator);
                dirty = true;
            }
            new_values.insert(field.to_string(), new_value);
            // Only one field can claim a line.
            break;
        }
    }

    if dirty {
        atomic_write(path, lines.concat().as_bytes())?;
    }
    Ok((new_values, dirty))
}

// ---------------------------------------------------------------------------
// Upstream refresh
// ---------------------------------------------------------------------------

/// Replace the spec file's entire contents with the upstream document at
/// `url`. Any non-success status is fatal; field editing on a half-refreshed
/// file would be worse than stopping.
pub fn refresh_from_upstream(path: &Path, url: &str) -> Result<()> {
    let response = reqwest::blocking::get(url)?;
    let status = response.status();
    if !status.is_success() {
        return Err(RelmanError::UpstreamFetchFailed {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    atomic_write(path, response.text()?.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::testing::ScriptedPrompter;
    use tempfile::TempDir;

    const SPEC: &str = "\
%global product_name_lower lodestone
%global version_installer 1.2.0
Name:    lodestone-installer
Version: 1.2.0
Release: 1%{?dist}

%description
Installs things.
";

    fn write_spec(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("lodestone-installer.spec");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn unchanged_version_is_a_no_write_no_op() {
        let dir = TempDir::new().unwrap();
        let path = write_spec(&dir, SPEC);
        let before = std::fs::metadata(&path).unwrap().modified().unwrap();

        let prompter = ScriptedPrompter::new([""]);
        let result = update_version_field(&path, &prompter).unwrap();

        assert_eq!(result, None);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), SPEC);
        assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn changed_version_rewrites_only_the_value_token() {
        let dir = TempDir::new().unwrap();
        let path = write_spec(&dir, SPEC);

        let prompter = ScriptedPrompter::new(["1.3.0"]);
        let result = update_version_field(&path, &prompter).unwrap();

        assert_eq!(result.as_deref(), Some("1.3.0"));
        let after = std::fs::read_to_string(&path).unwrap();
        assert_eq!(after, SPEC.replace("Version: 1.2.0", "Version: 1.3.0"));
    }

    #[test]
    fn missing_version_line_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_spec(&dir, "%global foo bar\nName: x\n");

        let prompter = ScriptedPrompter::new(Vec::<String>::new());
        let err = update_version_field(&path, &prompter).unwrap_err();
        assert!(matches!(err, RelmanError::VersionFieldNotFound { .. }));
    }

    #[test]
    fn version_edit_preserves_missing_final_newline() {
        let dir = TempDir::new().unwrap();
        let path = write_spec(&dir, "Name: x\nVersion: 1.0\nRelease: 1");

        let prompter = ScriptedPrompter::new(["2.0"]);
        update_version_field(&path, &prompter).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Name: x\nVersion: 2.0\nRelease: 1"
        );
    }

    #[test]
    fn zero_changed_globals_leave_the_file_byte_identical() {
        let dir = TempDir::new().unwrap();
        let path = write_spec(&dir, SPEC);

        let prompter = ScriptedPrompter::new(["", ""]);
        let (values, dirty) =
            update_global_fields(&path, &["product_name_lower", "version_installer"], &prompter)
                .unwrap();

        assert!(!dirty);
        assert_eq!(values["version_installer"], "1.2.0");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), SPEC);
    }

    #[test]
    fn one_changed_global_touches_only_its_value_token() {
        let dir = TempDir::new().unwrap();
        let path = write_spec(&dir, SPEC);

        let prompter = ScriptedPrompter::new(["", "1.3.0"]);
        let (values, dirty) =
            update_global_fields(&path, &["product_name_lower", "version_installer"], &prompter)
                .unwrap();

        assert!(dirty);
        assert_eq!(values["version_installer"], "1.3.0");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            SPEC.replace(
                "%global version_installer 1.2.0",
                "%global version_installer 1.3.0"
            )
        );
    }

    #[test]
    fn a_line_is_claimed_by_the_first_matching_field_only() {
        let dir = TempDir::new().unwrap();
        let path = write_spec(&dir, "%global server_image quay.io/x:1\n");

        // The same field declared twice: the line must be attributed once.
        let prompter = ScriptedPrompter::new(["quay.io/x:2"]);
        let (values, dirty) =
            update_global_fields(&path, &["server_image", "server_image"], &prompter).unwrap();

        assert!(dirty);
        assert_eq!(values["server_image"], "quay.io/x:2");
        assert_eq!(prompter.questions.borrow().len(), 1);
    }

    #[test]
    fn trailing_content_after_the_value_token_survives() {
        let dir = TempDir::new().unwrap();
        let path = write_spec(&dir, "%global ui_image quay.io/ui:1 # pinned\n");

        let prompter = ScriptedPrompter::new(["quay.io/ui:2"]);
        let (_, dirty) = update_global_fields(&path, &["ui_image"], &prompter).unwrap();

        assert!(dirty);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "%global ui_image quay.io/ui:2 # pinned\n"
        );
    }

    #[test]
    fn upstream_refresh_replaces_the_file() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/installer.spec")
            .with_status(200)
            .with_body("Name: refreshed\nVersion: 9.9.9\n")
            .create();

        let dir = TempDir::new().unwrap();
        let path = write_spec(&dir, SPEC);
        refresh_from_upstream(&path, &format!("{}/installer.spec", server.url())).unwrap();

        mock.assert();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Name: refreshed\nVersion: 9.9.9\n"
        );
    }

    #[test]
    fn upstream_refresh_fails_on_non_success_status() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/installer.spec")
            .with_status(404)
            .create();

        let dir = TempDir::new().unwrap();
        let path = write_spec(&dir, SPEC);
        let url = format!("{}/installer.spec", server.url());
        let err = refresh_from_upstream(&path, &url).unwrap_err();

        match err {
            RelmanError::UpstreamFetchFailed { status, .. } => assert_eq!(status, 404),
            other => panic!("expected upstream fetch failure, got {other:?}"),
        }
        // The existing file is untouched on failure.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), SPEC);
    }
}
