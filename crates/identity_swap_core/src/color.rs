use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Blue,
    Green,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::Blue, Color::Green];

    pub fn opposite(self) -> Self {
        match self {
            Self::Blue => Self::Green,
            Self::Green => Self::Blue,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Green => "green",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kind of workload definition every service should run after the swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    ToMirror,
    ToStandard,
}

impl Direction {
    pub fn from_mirror_flag(mirror: bool) -> Self {
        if mirror {
            Self::ToMirror
        } else {
            Self::ToStandard
        }
    }

    /// Mirror flag of the definitions the plan targets.
    pub fn targets_mirror(self) -> bool {
        matches!(self, Self::ToMirror)
    }

    /// Mirror flag every currently assigned definition must carry.
    pub fn requires_current_mirror(self) -> bool {
        !self.targets_mirror()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToMirror => "to_mirror",
            Self::ToStandard => "to_standard",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
