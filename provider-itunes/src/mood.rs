use serde::{Deserialize, Serialize};
use std::fmt;

/// Mood presets offered on the discovery screen.
///
/// Each mood is a canned catalog search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Chill,
    Romantic,
    Focused,
}

impl Mood {
    /// Every mood in display order.
    pub const ALL: [Mood; 6] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Energetic,
        Mood::Chill,
        Mood::Romantic,
        Mood::Focused,
    ];

    pub fn search_term(self) -> &'static str {
        match self {
            Mood::Happy => "pop",
            Mood::Sad => "blues",
            Mood::Energetic => "rock",
            Mood::Chill => "ambient",
            Mood::Romantic => "romance",
            Mood::Focused => "classical",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Energetic => "Energetic",
            Mood::Chill => "Chill",
            Mood::Romantic => "Romantic",
            Mood::Focused => "Focused",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Sad => "😢",
            Mood::Energetic => "⚡",
            Mood::Chill => "😌",
            Mood::Romantic => "❤️",
            Mood::Focused => "🎯",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
