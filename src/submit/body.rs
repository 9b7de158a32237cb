//! PR title/body helpers

/// Command shown in the checkout footer
pub fn checkout_command(pr_number: u64) -> String {
    format!("erk pr checkout {pr_number}")
}

/// Footer appended to PR bodies
pub fn checkout_footer(pr_number: u64) -> String {
    format!(
        "---\n\nTo checkout this PR in a fresh worktree and environment locally, run:\n\n```\n{}\n```\n",
        checkout_command(pr_number)
    )
}

/// Append the checkout footer unless the body already has the command
pub fn ensure_checkout_footer(body: &str, pr_number: u64) -> String {
    let command = checkout_command(pr_number);
    if body.lines().any(|line| line.trim() == command) {
        return body.to_string();
    }
    let trimmed = body.trim_end();
    if trimmed.is_empty() {
        checkout_footer(pr_number)
    } else {
        format!("{trimmed}\n\n{}", checkout_footer(pr_number))
    }
}

/// Prepend a `Closes #N` line unless the body already references the issue
pub fn ensure_issue_reference(body: &str, issue_number: Option<u64>) -> String {
    let Some(issue) = issue_number else {
        return body.to_string();
    };
    let reference = format!("Closes #{issue}");
    if body.contains(&reference) {
        return body.to_string();
    }
    if body.trim().is_empty() {
        reference
    } else {
        format!("{reference}\n\n{body}")
    }
}

/// Split a commit message into PR title and body
///
/// Falls back to `fallback_title` when the message is empty.
pub fn split_commit_message(message: &str, fallback_title: &str) -> (String, String) {
    let message = message.trim();
    let (title, body) = message.split_once('\n').unwrap_or((message, ""));
    let title = title.trim();
    let title = if title.is_empty() { fallback_title } else { title };
    (title.to_string(), body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footer_appended_once() {
        let body = ensure_checkout_footer("Adds login.", 42);
        assert!(body.starts_with("Adds login.\n\n---"));
        assert_eq!(body.matches("erk pr checkout 42").count(), 1);

        let again = ensure_checkout_footer(&body, 42);
        assert_eq!(again, body);
    }

    #[test]
    fn test_footer_on_empty_body() {
        insta::assert_snapshot!(ensure_checkout_footer("", 7).trim_end(), @r"
        ---

        To checkout this PR in a fresh worktree and environment locally, run:

        ```
        erk pr checkout 7
        ```
        ");
    }

    #[test]
    fn test_footer_for_other_pr_is_not_a_match() {
        let body = ensure_checkout_footer("x", 42);
        let other = ensure_checkout_footer(&body, 4);
        assert!(other.lines().any(|l| l == "erk pr checkout 4"));
    }

    #[test]
    fn test_issue_reference() {
        assert_eq!(ensure_issue_reference("body", None), "body");
        assert_eq!(ensure_issue_reference("body", Some(9)), "Closes #9\n\nbody");
        assert_eq!(ensure_issue_reference("Closes #9\n\nbody", Some(9)), "Closes #9\n\nbody");
        assert_eq!(ensure_issue_reference("", Some(9)), "Closes #9");
    }

    #[test]
    fn test_split_commit_message() {
        assert_eq!(
            split_commit_message("Add login\n\nWires the form.\n", "feat"),
            ("Add login".to_string(), "Wires the form.".to_string())
        );
        assert_eq!(
            split_commit_message("  \n", "feat"),
            ("feat".to_string(), String::new())
        );
    }
}
