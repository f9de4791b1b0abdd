//! Enumeration types shared across the Crawl workspace.

use serde::{Deserialize, Serialize};

/// What a room object is, as declared by the `type` field of a room file.
///
/// The kind decides how the object enters the physics simulation and
/// whether the level tracks it as the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// A static prop with no special behavior.
    Generic,
    /// The player character. Dynamic, never sleeps.
    Player,
    /// Solid level geometry. Static. Tile layouts produce these.
    Wall,
    /// A loose box that falls and can be pushed. Dynamic.
    Crate,
}

impl ObjectKind {
    /// Whether objects of this kind are moved by the simulation.
    pub const fn is_dynamic(self) -> bool {
        matches!(self, Self::Player | Self::Crate)
    }

    /// Lowercase name as written in room files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Player => "player",
            Self::Wall => "wall",
            Self::Crate => "crate",
        }
    }
}

impl core::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_from_lowercase() {
        let kind: Result<ObjectKind, _> = serde_json::from_str("\"player\"");
        assert_eq!(kind.ok(), Some(ObjectKind::Player));
        let kind: Result<ObjectKind, _> = serde_json::from_str("\"crate\"");
        assert_eq!(kind.ok(), Some(ObjectKind::Crate));
    }

    #[test]
    fn unknown_kind_rejected() {
        let kind: Result<ObjectKind, _> = serde_json::from_str("\"dragon\"");
        assert!(kind.is_err());
    }

    #[test]
    fn only_players_and_crates_move() {
        assert!(ObjectKind::Player.is_dynamic());
        assert!(ObjectKind::Crate.is_dynamic());
        assert!(!ObjectKind::Wall.is_dynamic());
        assert!(!ObjectKind::Generic.is_dynamic());
    }
}
