//! Maps a (status, conclusion) pair onto the badge shown next to runs, jobs and steps.

use crate::app::{Conclusion, RunStatus};
use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    Running,
    Queued,
    Passed,
    Failed,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Unknown,
}

impl Badge {
    /// Short label, always 12 columns or fewer.
    pub fn label(self) -> &'static str {
        match self {
            Self::Running => "* running",
            Self::Queued => "~ queued",
            Self::Passed => "+ passed",
            Self::Failed => "x failed",
            Self::Cancelled => "- cancelled",
            Self::Skipped => "- skipped",
            Self::TimedOut => "! timed out",
            Self::ActionRequired => "! action req",
            Self::Unknown => "? unknown",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Running | Self::ActionRequired => Color::Yellow,
            Self::Passed => Color::Green,
            Self::Failed | Self::TimedOut => Color::Red,
            Self::Queued | Self::Cancelled | Self::Skipped | Self::Unknown => Color::DarkGray,
        }
    }
}

/// Width reserved for the badge column in the run list.
pub const BADGE_WIDTH: usize = 12;

/// Status takes precedence over conclusion while the item is active; completed
/// and unrecognized statuses defer to the conclusion.
pub fn classify(status: RunStatus, conclusion: Option<Conclusion>) -> Badge {
    match status {
        RunStatus::InProgress => Badge::Running,
        RunStatus::Queued | RunStatus::Pending | RunStatus::Waiting | RunStatus::Requested => {
            Badge::Queued
        }
        RunStatus::Completed | RunStatus::Unknown => match conclusion {
            Some(Conclusion::Success) => Badge::Passed,
            Some(Conclusion::Failure) => Badge::Failed,
            Some(Conclusion::Cancelled) => Badge::Cancelled,
            Some(Conclusion::Skipped) => Badge::Skipped,
            Some(Conclusion::TimedOut) => Badge::TimedOut,
            Some(Conclusion::ActionRequired) => Badge::ActionRequired,
            Some(Conclusion::Neutral | Conclusion::Stale | Conclusion::Unknown) | None => {
                Badge::Unknown
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_progress_wins_over_conclusion() {
        assert_eq!(
            classify(RunStatus::InProgress, Some(Conclusion::Failure)),
            Badge::Running
        );
    }

    #[test]
    fn waiting_family_is_queued() {
        for status in [
            RunStatus::Queued,
            RunStatus::Pending,
            RunStatus::Waiting,
            RunStatus::Requested,
        ] {
            assert_eq!(classify(status, None), Badge::Queued);
        }
    }

    #[test]
    fn completed_maps_conclusions() {
        let cases = [
            (Conclusion::Success, Badge::Passed),
            (Conclusion::Failure, Badge::Failed),
            (Conclusion::Cancelled, Badge::Cancelled),
            (Conclusion::Skipped, Badge::Skipped),
            (Conclusion::TimedOut, Badge::TimedOut),
            (Conclusion::ActionRequired, Badge::ActionRequired),
            (Conclusion::Neutral, Badge::Unknown),
        ];
        for (conclusion, badge) in cases {
            assert_eq!(classify(RunStatus::Completed, Some(conclusion)), badge);
        }
    }

    #[test]
    fn completed_without_conclusion_is_unknown() {
        assert_eq!(classify(RunStatus::Completed, None), Badge::Unknown);
    }

    #[test]
    fn unrecognized_status_defers_to_conclusion() {
        assert_eq!(
            classify(RunStatus::Unknown, Some(Conclusion::Success)),
            Badge::Passed
        );
        assert_eq!(classify(RunStatus::Unknown, None), Badge::Unknown);
    }

    #[test]
    fn labels_fit_badge_column() {
        use unicode_width::UnicodeWidthStr;
        for badge in [
            Badge::Running,
            Badge::Queued,
            Badge::Passed,
            Badge::Failed,
            Badge::Cancelled,
            Badge::Skipped,
            Badge::TimedOut,
            Badge::ActionRequired,
            Badge::Unknown,
        ] {
            assert!(badge.label().width() <= BADGE_WIDTH, "{badge:?}");
        }
    }
}
