use serde::{Deserialize, Serialize};

/// The spatial/semantic category a tile (or a selected candidate) belongs to.
///
/// Assignment over tiles is total and exclusive: every tile carries exactly
/// one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Accent,
    Foreground,
    Motion,
    Bed,
}

impl Role {
    /// Fixed processing priority: accent first, bed last.
    pub const PRIORITY: [Role; 4] = [Role::Accent, Role::Foreground, Role::Motion, Role::Bed];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Accent => "accent",
            Role::Foreground => "foreground",
            Role::Motion => "motion",
            Role::Bed => "bed",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the three hint averages dominates a coarse cell.
///
/// Accent is excluded on purpose: accent is a single-tile outlier signal and
/// never describes a neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tendency {
    Motion,
    Object,
    Bed,
}

impl Tendency {
    /// The tendency a non-accent role is checked against.
    pub fn for_role(role: Role) -> Option<Tendency> {
        match role {
            Role::Accent => None,
            Role::Foreground => Some(Tendency::Object),
            Role::Motion => Some(Tendency::Motion),
            Role::Bed => Some(Tendency::Bed),
        }
    }
}
