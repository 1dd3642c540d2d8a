use serde::{Deserialize, Serialize};

/// Whether a trait helps or hurts the player carrying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraitPolarity {
    Positive,
    Negative,
}

/// A hidden behavioural attribute of a player.
///
/// The set is closed: the "It factor" quality score lives on
/// [`Player`](super::player::Player) as its own type and has no variant
/// here, so it can never flow into triggers, evidence, or news.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Trait {
    // Positive
    Clutch,
    IronMan,
    Leader,
    FilmJunkie,
    CoolUnderPressure,
    Motor,
    TeamFirst,
    SchemeVersatile,
    // Negative
    Chokes,
    InjuryProne,
    HotHead,
    Lazy,
    LockerRoomCancer,
    GlassHands,
    Disappears,
    SystemDependent,
    Diva,
}

impl Trait {
    pub const POSITIVE: [Trait; 8] = [
        Trait::Clutch,
        Trait::IronMan,
        Trait::Leader,
        Trait::FilmJunkie,
        Trait::CoolUnderPressure,
        Trait::Motor,
        Trait::TeamFirst,
        Trait::SchemeVersatile,
    ];

    pub const NEGATIVE: [Trait; 9] = [
        Trait::Chokes,
        Trait::InjuryProne,
        Trait::HotHead,
        Trait::Lazy,
        Trait::LockerRoomCancer,
        Trait::GlassHands,
        Trait::Disappears,
        Trait::SystemDependent,
        Trait::Diva,
    ];

    pub const ALL: [Trait; 17] = [
        Trait::Clutch,
        Trait::IronMan,
        Trait::Leader,
        Trait::FilmJunkie,
        Trait::CoolUnderPressure,
        Trait::Motor,
        Trait::TeamFirst,
        Trait::SchemeVersatile,
        Trait::Chokes,
        Trait::InjuryProne,
        Trait::HotHead,
        Trait::Lazy,
        Trait::LockerRoomCancer,
        Trait::GlassHands,
        Trait::Disappears,
        Trait::SystemDependent,
        Trait::Diva,
    ];

    /// Stable camelCase identifier, e.g. "injuryProne".
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clutch => "clutch",
            Self::IronMan => "ironMan",
            Self::Leader => "leader",
            Self::FilmJunkie => "filmJunkie",
            Self::CoolUnderPressure => "coolUnderPressure",
            Self::Motor => "motor",
            Self::TeamFirst => "teamFirst",
            Self::SchemeVersatile => "schemeVersatile",
            Self::Chokes => "chokes",
            Self::InjuryProne => "injuryProne",
            Self::HotHead => "hotHead",
            Self::Lazy => "lazy",
            Self::LockerRoomCancer => "lockerRoomCancer",
            Self::GlassHands => "glassHands",
            Self::Disappears => "disappears",
            Self::SystemDependent => "systemDependent",
            Self::Diva => "diva",
        }
    }

    /// Display label for a trait that has already been revealed.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Clutch => "Clutch",
            Self::IronMan => "Iron Man",
            Self::Leader => "Leader",
            Self::FilmJunkie => "Film Junkie",
            Self::CoolUnderPressure => "Cool Under Pressure",
            Self::Motor => "Motor",
            Self::TeamFirst => "Team First",
            Self::SchemeVersatile => "Scheme Versatile",
            Self::Chokes => "Chokes",
            Self::InjuryProne => "Injury Prone",
            Self::HotHead => "Hot Head",
            Self::Lazy => "Lazy",
            Self::LockerRoomCancer => "Locker Room Cancer",
            Self::GlassHands => "Glass Hands",
            Self::Disappears => "Disappears",
            Self::SystemDependent => "System Dependent",
            Self::Diva => "Diva",
        }
    }

    pub fn polarity(&self) -> TraitPolarity {
        if Self::POSITIVE.contains(self) {
            TraitPolarity::Positive
        } else {
            TraitPolarity::Negative
        }
    }

    /// The declared opposite, if this trait belongs to one of the six pairs.
    pub fn opposite(&self) -> Option<Trait> {
        match self {
            Self::Clutch => Some(Self::Chokes),
            Self::Chokes => Some(Self::Clutch),
            Self::IronMan => Some(Self::InjuryProne),
            Self::InjuryProne => Some(Self::IronMan),
            Self::Motor => Some(Self::Lazy),
            Self::Lazy => Some(Self::Motor),
            Self::Leader => Some(Self::LockerRoomCancer),
            Self::LockerRoomCancer => Some(Self::Leader),
            Self::TeamFirst => Some(Self::Diva),
            Self::Diva => Some(Self::TeamFirst),
            Self::CoolUnderPressure => Some(Self::HotHead),
            Self::HotHead => Some(Self::CoolUnderPressure),
            _ => None,
        }
    }
}

/// The hidden-trait record carried by a player.
///
/// `positive` and `negative` are the truth and are never shown as labels;
/// only `revealed_to_user` may be displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenTraits {
    pub positive: Vec<Trait>,
    pub negative: Vec<Trait>,
    #[serde(default)]
    pub revealed_to_user: Vec<Trait>,
}

impl HiddenTraits {
    /// Builds a record from a flat list, sorting each trait by polarity.
    pub fn from_traits(traits: &[Trait]) -> Self {
        let mut hidden = Self::default();
        for t in traits {
            match t.polarity() {
                TraitPolarity::Positive => hidden.positive.push(*t),
                TraitPolarity::Negative => hidden.negative.push(*t),
            }
        }
        hidden
    }

    /// Returns true if the player truly carries the trait.
    pub fn has(&self, t: Trait) -> bool {
        self.positive.contains(&t) || self.negative.contains(&t)
    }

    pub fn is_revealed(&self, t: Trait) -> bool {
        self.revealed_to_user.contains(&t)
    }

    /// Adds the trait to the revealed set. Returns false if it was already there.
    pub fn reveal(&mut self, t: Trait) -> bool {
        if self.is_revealed(t) {
            return false;
        }
        self.revealed_to_user.push(t);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarity_sets_are_disjoint_and_complete() {
        for t in Trait::POSITIVE {
            assert_eq!(t.polarity(), TraitPolarity::Positive);
            assert!(!Trait::NEGATIVE.contains(&t));
        }
        for t in Trait::NEGATIVE {
            assert_eq!(t.polarity(), TraitPolarity::Negative);
        }
        assert_eq!(Trait::POSITIVE.len() + Trait::NEGATIVE.len(), Trait::ALL.len());
    }

    #[test]
    fn opposites_are_symmetric() {
        let mut pairs = 0;
        for t in Trait::ALL {
            if let Some(o) = t.opposite() {
                assert_eq!(o.opposite(), Some(t));
                assert_ne!(o.polarity(), t.polarity());
                pairs += 1;
            }
        }
        assert_eq!(pairs, 12);
    }

    #[test]
    fn unpaired_traits_have_no_opposite() {
        assert_eq!(Trait::FilmJunkie.opposite(), None);
        assert_eq!(Trait::GlassHands.opposite(), None);
        assert_eq!(Trait::SystemDependent.opposite(), None);
    }

    #[test]
    fn hidden_traits_from_flat_list() {
        let hidden = HiddenTraits::from_traits(&[Trait::Clutch, Trait::HotHead, Trait::Motor]);
        assert_eq!(hidden.positive, vec![Trait::Clutch, Trait::Motor]);
        assert_eq!(hidden.negative, vec![Trait::HotHead]);
        assert!(hidden.has(Trait::HotHead));
        assert!(!hidden.has(Trait::Lazy));
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut hidden = HiddenTraits::from_traits(&[Trait::Leader]);
        assert!(hidden.reveal(Trait::Leader));
        assert!(!hidden.reveal(Trait::Leader));
        assert_eq!(hidden.revealed_to_user, vec![Trait::Leader]);
    }
}
