use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use super::event::GameEventType;
use super::player::PlayerId;
use super::traits::Trait;

/// Discretised belief strength, ordered weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Hint,
    Suspected,
    Moderate,
    Strong,
    Confirmed,
}

impl ConfidenceLevel {
    /// All levels in ascending order.
    pub const ASCENDING: [ConfidenceLevel; 5] = [
        Self::Hint,
        Self::Suspected,
        Self::Moderate,
        Self::Strong,
        Self::Confirmed,
    ];

    /// Maps a probability onto a level using fixed breakpoints
    /// 0.4 / 0.6 / 0.8 / 1.0. Values above 1.0 are confirmed.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 1.0 {
            Self::Confirmed
        } else if probability >= 0.8 {
            Self::Strong
        } else if probability >= 0.6 {
            Self::Moderate
        } else if probability >= 0.4 {
            Self::Suspected
        } else {
            Self::Hint
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Hint => "hint",
            Self::Suspected => "suspected",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
            Self::Confirmed => "confirmed",
        }
    }

    /// This level followed by every stronger one, weakest first.
    pub fn and_stronger(self) -> impl Iterator<Item = ConfidenceLevel> {
        Self::ASCENDING.into_iter().filter(move |level| *level >= self)
    }
}

/// Where in the calendar an observation happened, plus a per-player
/// sequence number that orders observations within the same week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObservationStamp {
    pub season: u16,
    pub week: u8,
    pub sequence: u64,
}

/// A durable record of one evidence-bearing occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventObservation {
    pub event_type: GameEventType,
    pub stamp: ObservationStamp,
    pub is_playoff: bool,
    pub is_high_pressure: bool,
    pub related_trait: Option<Trait>,
    /// Contextual amplification times trigger probability, in (0, 1.875].
    /// Not 1.5: every playoff occurrence also counts as high pressure, so
    /// the playoff and pressure multipliers always stack to 1.5 × 1.25.
    pub weight: f64,
    pub description: String,
}

/// Aggregated evidence for one trait on one player.
///
/// `probability` and `confidence` are derived; they are recomputed on
/// every weight change and can only be read from outside the crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitEvidence {
    pub trait_kind: Trait,
    pub supporting_observations: u32,
    pub contradicting_observations: u32,
    pub(crate) weighted_evidence: f64,
    pub(crate) probability: f64,
    pub(crate) confidence: ConfidenceLevel,
    pub last_observed: Option<ObservationStamp>,
    /// Newest first, never longer than [`TraitEvidence::MAX_RECENT`].
    pub(crate) recent_observations: VecDeque<String>,
}

impl TraitEvidence {
    pub const MAX_RECENT: usize = 5;

    pub fn new(trait_kind: Trait) -> Self {
        Self {
            trait_kind,
            supporting_observations: 0,
            contradicting_observations: 0,
            weighted_evidence: 0.0,
            probability: 0.0,
            confidence: ConfidenceLevel::Hint,
            last_observed: None,
            recent_observations: VecDeque::with_capacity(Self::MAX_RECENT),
        }
    }

    pub fn weighted_evidence(&self) -> f64 {
        self.weighted_evidence
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn confidence(&self) -> ConfidenceLevel {
        self.confidence
    }

    pub fn recent_observations(&self) -> &VecDeque<String> {
        &self.recent_observations
    }
}

/// Season-level rollup used to backfill trigger-condition counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceStats {
    /// Seasons closed out with an evidence decay pass.
    pub seasons_observed: u32,
    /// Distinct game weeks with an in-game occurrence. Reset each season.
    #[serde(default)]
    pub games_played: u32,
    pub injuries: u32,
    /// Reset each season.
    pub games_missed: u32,
    pub consecutive_full_seasons: u32,
    pub clutch_plays: u32,
    pub clutch_failures: u32,
    pub penalties: u32,
    pub ejections: u32,
    pub ball_security_issues: u32,
    #[serde(default)]
    pub(crate) last_game: Option<(u16, u8)>,
}

impl PerformanceStats {
    /// Clears the counters that only describe the current season.
    pub fn start_new_season(&mut self) {
        self.games_played = 0;
        self.games_missed = 0;
        self.last_game = None;
    }
}

/// Everything the engine has learned about one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPatternData {
    pub player_id: PlayerId,
    pub(crate) observations: Vec<EventObservation>,
    pub(crate) evidence: BTreeMap<Trait, TraitEvidence>,
    pub(crate) confirmed_traits: Vec<Trait>,
    pub stats: PerformanceStats,
    pub(crate) next_sequence: u64,
}

impl PlayerPatternData {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            observations: Vec::new(),
            evidence: BTreeMap::new(),
            confirmed_traits: Vec::new(),
            stats: PerformanceStats::default(),
            next_sequence: 0,
        }
    }

    /// Every observation recorded so far, oldest first.
    pub fn observations(&self) -> &[EventObservation] {
        &self.observations
    }

    pub fn confirmed_traits(&self) -> &[Trait] {
        &self.confirmed_traits
    }

    pub fn is_confirmed(&self, t: Trait) -> bool {
        self.confirmed_traits.contains(&t)
    }
}
