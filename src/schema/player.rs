use serde::{Deserialize, Serialize};
use std::fmt;

use super::traits::{HiddenTraits, Trait};

/// Newtype wrapper for player IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Permanently hidden quality score (0..=100).
///
/// Deliberately not a [`Trait`]: nothing in the revelation engine accepts
/// or produces this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ItFactor(pub u8);

/// The roster-side handle the engine works against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub hidden_traits: HiddenTraits,
    #[serde(default)]
    pub it_factor: ItFactor,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, traits: &[Trait]) -> Self {
        Self {
            id,
            name: name.into(),
            hidden_traits: HiddenTraits::from_traits(traits),
            it_factor: ItFactor::default(),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.name
    }

    /// Returns true if the player truly has the trait, revealed or not.
    pub fn has_trait(&self, t: Trait) -> bool {
        self.hidden_traits.has(t)
    }

    /// Traits the user is allowed to see.
    pub fn revealed_traits(&self) -> &[Trait] {
        &self.hidden_traits.revealed_to_user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_creation() {
        let player = Player::new(PlayerId(7), "Dante Reyes", &[Trait::Clutch, Trait::Diva]);
        assert_eq!(player.display_name(), "Dante Reyes");
        assert!(player.has_trait(Trait::Clutch));
        assert!(player.has_trait(Trait::Diva));
        assert!(player.revealed_traits().is_empty());
        assert_eq!(player.it_factor, ItFactor(0));
    }

    #[test]
    fn player_id_display() {
        assert_eq!(PlayerId(42).to_string(), "42");
    }
}
