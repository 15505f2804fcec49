//! Confirmation prompts for destructive operations

use dialoguer::Confirm;

/// Ask the user to confirm `prompt`
///
/// Returns `true` without prompting when `skip` is set (`--yes` or `--batch`).
/// The default answer is no.
pub fn confirm_action(prompt: &str, skip: bool) -> Result<bool, dialoguer::Error> {
    if skip {
        return Ok(true);
    }
    Confirm::new().with_prompt(prompt).default(false).interact()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_confirms_without_prompting() {
        assert!(confirm_action("Delete 3 data?", true).unwrap());
    }
}
