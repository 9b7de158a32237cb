//! Terminal styling for erk output
//!
//! Everything here writes ANSI unconditionally. Output goes through
//! `anstream`, which strips escapes when the stream isn't a color terminal
//! or `NO_COLOR` is set.
//!
//! | Method        | Look   | Used for                              |
//! |---------------|--------|---------------------------------------|
//! | `.accent()`   | Cyan   | Slot names, PR numbers, commands      |
//! | `.success()`  | Green  | Completed steps, available slots      |
//! | `.error()`    | Red    | Error tags, broken assignments        |
//! | `.warn()`     | Yellow | Forced pushes, stray worktrees        |
//! | `.muted()`    | Dim    | Empty slots, timestamps, hints        |
//! | `.emphasis()` | Bold   | Phases, headers, branch names         |

use erk::pool::{SlotStatus, SyncIssueCode};
use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Style};
use std::fmt::{self, Display};
use std::sync::OnceLock;

const ACCENT: Style = Style::new().cyan();
const SUCCESS: Style = Style::new().green();
const ERROR: Style = Style::new().red();
const WARN: Style = Style::new().yellow();
const MUTED: Style = Style::new().dimmed();
const EMPHASIS: Style = Style::new().bold();

/// A value rendered with a fixed style
#[derive(Clone, Debug)]
pub struct Styled<T> {
    value: T,
    style: Style,
}

impl<T: Display> Display for Styled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value.style(self.style))
    }
}

const fn styled<T>(value: T, style: Style) -> Styled<T> {
    Styled { value, style }
}

/// Semantic styling for anything printable
pub trait Stylize: Display {
    /// Cyan
    fn accent(&self) -> Styled<&Self> {
        styled(self, ACCENT)
    }

    /// Green
    fn success(&self) -> Styled<&Self> {
        styled(self, SUCCESS)
    }

    /// Red
    fn error(&self) -> Styled<&Self> {
        styled(self, ERROR)
    }

    /// Yellow
    fn warn(&self) -> Styled<&Self> {
        styled(self, WARN)
    }

    /// Dimmed
    fn muted(&self) -> Styled<&Self> {
        styled(self, MUTED)
    }

    /// Bold
    fn emphasis(&self) -> Styled<&Self> {
        styled(self, EMPHASIS)
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Success checkmark
pub const CHECK: &str = "✓";
/// Failure cross
pub const CROSS: &str = "✗";
/// Step arrow
pub const ARROW: &str = "→";
/// Free slot marker
pub const BULLET: &str = "○";
/// Drift marker
pub const WARN_SIGN: &str = "!";

/// Green checkmark
pub const fn check() -> Styled<&'static str> {
    styled(CHECK, SUCCESS)
}

/// Red cross
pub const fn cross() -> Styled<&'static str> {
    styled(CROSS, ERROR)
}

/// Cyan arrow
pub const fn arrow() -> Styled<&'static str> {
    styled(ARROW, ACCENT)
}

// ============================================================================
// Pool output
// ============================================================================

/// Wire label of a slot status (`assigned`, `available`, `empty`)
pub const fn slot_status_label(status: &SlotStatus) -> &'static str {
    match status {
        SlotStatus::Assigned(_) => "assigned",
        SlotStatus::Available => "available",
        SlotStatus::Empty => "empty",
    }
}

/// Marker and label for a slot row in `pool status`
pub fn slot_status_marker(status: &SlotStatus) -> (Styled<&'static str>, Styled<&'static str>) {
    let label = slot_status_label(status);
    match status {
        SlotStatus::Assigned(_) => (check(), styled(label, ACCENT)),
        SlotStatus::Available => (styled(BULLET, SUCCESS), styled(label, SUCCESS)),
        SlotStatus::Empty => (styled(BULLET, MUTED), styled(label, MUTED)),
    }
}

/// How bad a drift finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// An assignment no longer matches reality
    Broken,
    /// Leftover worktree or directory the pool doesn't track
    Stray,
}

/// Severity of a `pool check` finding
pub const fn issue_severity(code: SyncIssueCode) -> Severity {
    match code {
        SyncIssueCode::OrphanState
        | SyncIssueCode::MissingBranch
        | SyncIssueCode::BranchMismatch
        | SyncIssueCode::GitRegistryMissing => Severity::Broken,
        SyncIssueCode::OrphanDir | SyncIssueCode::UntrackedWorktree => Severity::Stray,
    }
}

/// Marker and code for a `pool check` line
pub const fn issue_marker(code: SyncIssueCode) -> (Styled<&'static str>, Styled<&'static str>) {
    match issue_severity(code) {
        Severity::Broken => (cross(), styled(code.as_str(), ERROR)),
        Severity::Stray => (styled(WARN_SIGN, WARN), styled(code.as_str(), WARN)),
    }
}

// ============================================================================
// Links and spinners
// ============================================================================

/// Clickable OSC 8 link on stdout, or the bare URL where unsupported
pub fn hyperlink_url(url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        terminal_link::Link::new(url, url).to_string()
    } else {
        url.to_string()
    }
}

/// Spinner shown while polling GitHub
pub fn spinner_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("hardcoded spinner template is valid")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_labels() {
        assert_eq!(slot_status_label(&SlotStatus::Assigned("feat".into())), "assigned");
        assert_eq!(slot_status_label(&SlotStatus::Available), "available");
        assert_eq!(slot_status_label(&SlotStatus::Empty), "empty");
    }

    #[test]
    fn test_broken_assignments_outrank_strays() {
        assert_eq!(issue_severity(SyncIssueCode::OrphanState), Severity::Broken);
        assert_eq!(issue_severity(SyncIssueCode::BranchMismatch), Severity::Broken);
        assert_eq!(issue_severity(SyncIssueCode::OrphanDir), Severity::Stray);
        assert_eq!(issue_severity(SyncIssueCode::UntrackedWorktree), Severity::Stray);
    }

    #[test]
    fn test_styled_keeps_text() {
        let (_, code) = issue_marker(SyncIssueCode::OrphanDir);
        assert!(code.to_string().contains("orphan-dir"));
        assert!("feat".accent().to_string().contains("feat"));
    }
}
