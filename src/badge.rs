//! Compliance badge: maps a submission status to its visual treatment.

use std::fmt;

use crate::model::SubmissionStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BadgeIcon {
    Check,
    Cross,
}

impl BadgeIcon {
    #[must_use]
    pub fn glyph(self) -> char {
        match self {
            Self::Check => '✔',
            Self::Cross => '✘',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BadgeColor {
    Green,
    Red,
}

impl BadgeColor {
    /// ANSI SGR foreground code.
    #[must_use]
    pub fn ansi_code(self) -> u8 {
        match self {
            Self::Green => 32,
            Self::Red => 31,
        }
    }
}

/// Icon + color pairing for one status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Badge {
    pub status: SubmissionStatus,
    pub icon: BadgeIcon,
    pub color: BadgeColor,
}

/// Total over [`SubmissionStatus`].
#[must_use]
pub fn badge_for(status: SubmissionStatus) -> Badge {
    let (icon, color) = match status {
        SubmissionStatus::Compliant => (BadgeIcon::Check, BadgeColor::Green),
        SubmissionStatus::NonCompliant => (BadgeIcon::Cross, BadgeColor::Red),
    };
    Badge { status, icon, color }
}

impl Badge {
    /// Terminal rendering wrapped in ANSI color escapes.
    #[must_use]
    pub fn paint(&self) -> String {
        format!("\u{1b}[{}m{self}\u{1b}[0m", self.color.ansi_code())
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon.glyph(), self.status)
    }
}
