//! Kerberos session setup.
//!
//! The rest of the workflow only needs an authenticated principal before the
//! first network-touching git operation. This is the one place with a
//! built-in retry loop: `kinit` is re-attempted until it succeeds or the
//! operator aborts the process.

use crate::error::Result;
use crate::process::{CommandRunner, CommandSpec};
use crate::prompt::{warn, Prompter};

/// Ensure a valid ticket exists and return the session principal.
///
/// An already-valid ticket skips `kinit` entirely; the configured username
/// (prompted for when unset) is still returned so URL templates can be
/// filled in.
pub fn ensure_session(
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
    default_username: Option<&str>,
) -> Result<String> {
    let klist = CommandSpec::new(["klist", "-s"]).quiet();
    if runner.status(&klist)? == 0 {
        warn("Skipping kinit because a ticket is already present.");
        if let Some(username) = default_username {
            return Ok(username.to_string());
        }
        return prompter.ask_required("kerberos username", None);
    }

    loop {
        let username = prompter.ask_required("kerberos username", default_username)?;
        if runner.status(&CommandSpec::new(["kinit", username.as_str()]))? == 0 {
            return Ok(username);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ScriptedRunner;
    use crate::prompt::testing::ScriptedPrompter;

    #[test]
    fn existing_ticket_skips_kinit() {
        let runner = ScriptedRunner::new(vec![("klist -s", 0, "")]);
        let prompter = ScriptedPrompter::new(Vec::<String>::new());

        let username = ensure_session(&runner, &prompter, Some("alice")).unwrap();

        assert_eq!(username, "alice");
        assert!(runner.call_lines().iter().all(|c| !c.starts_with("kinit")));
    }

    #[test]
    fn kinit_retries_until_success() {
        let runner = ScriptedRunner::new(vec![
            ("klist -s", 1, ""),
            ("kinit bob", 1, ""),
            ("kinit alice", 0, ""),
        ]);
        let prompter = ScriptedPrompter::new(["bob", "alice"]);

        let username = ensure_session(&runner, &prompter, None).unwrap();

        assert_eq!(username, "alice");
        let kinits: Vec<_> = runner
            .call_lines()
            .into_iter()
            .filter(|c| c.starts_with("kinit"))
            .collect();
        assert_eq!(kinits, vec!["kinit bob".to_string(), "kinit alice".to_string()]);
    }
}
