/// Pattern recognition: weighted evidence accumulation, confidence
/// derivation, opposite-trait mirroring, and seasonal decay.

use log::{debug, info};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::core::triggers::{self, RevelationTrigger};
use crate::schema::event::{GameEventContext, GameEventType};
use crate::schema::evidence::{
    ConfidenceLevel, EventObservation, ObservationStamp, PlayerPatternData, TraitEvidence,
};
use crate::schema::player::PlayerId;
use crate::schema::traits::Trait;

/// Steepness `k` of the evidence-to-probability logistic curve.
pub const LOGISTIC_STEEPNESS: f64 = 0.5;
/// Midpoint `x0`: about three net weighted observations give 50%.
pub const LOGISTIC_MIDPOINT: f64 = 3.0;
/// Probability ceiling while fewer than two supporting observations exist.
pub const SINGLE_INCIDENT_CAP: f64 = 0.3;
pub const MIN_SUPPORTING_OBSERVATIONS: u32 = 2;
/// Share of a supporting weight posted against the opposite trait.
pub const OPPOSITE_WEIGHT_FACTOR: f64 = 0.5;
/// Share of a posted contradicting weight subtracted from the evidence.
pub const CONTRADICTION_FACTOR: f64 = 0.5;
pub const PLAYOFF_MULTIPLIER: f64 = 1.5;
pub const HIGH_PRESSURE_MULTIPLIER: f64 = 1.25;
pub const DEFAULT_DECAY_FACTOR: f64 = 0.8;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("pattern data for player {0} failed validation")]
    Invalid(PlayerId),
}

/// Contextual amplification of one observation: 1.0, times 1.5 in the
/// playoffs, times 1.25 under high pressure (playoffs or 4th quarter on).
pub fn base_observation_weight(context: &GameEventContext) -> f64 {
    let mut weight = 1.0;
    if context.is_playoff {
        weight *= PLAYOFF_MULTIPLIER;
    }
    if context.is_high_pressure() {
        weight *= HIGH_PRESSURE_MULTIPLIER;
    }
    weight
}

/// Logistic transform of net weighted evidence, capped while the trait
/// has fewer than two supporting observations.
pub fn evidence_probability(weighted_evidence: f64, supporting_observations: u32) -> f64 {
    let probability =
        1.0 / (1.0 + (-LOGISTIC_STEEPNESS * (weighted_evidence - LOGISTIC_MIDPOINT)).exp());
    if supporting_observations < MIN_SUPPORTING_OBSERVATIONS {
        probability.min(SINGLE_INCIDENT_CAP)
    } else {
        probability
    }
}

impl TraitEvidence {
    fn post(&mut self, supporting: bool, weight: f64, description: &str, stamp: ObservationStamp) {
        if supporting {
            self.supporting_observations += 1;
            self.weighted_evidence += weight;
            self.push_recent(description.to_string());
        } else {
            self.contradicting_observations += 1;
            self.weighted_evidence -= weight * CONTRADICTION_FACTOR;
            self.push_recent(format!("(contrary) {}", description));
        }
        self.last_observed = Some(stamp);
        self.recompute();
    }

    fn push_recent(&mut self, description: String) {
        self.recent_observations.push_front(description);
        self.recent_observations.truncate(Self::MAX_RECENT);
    }

    fn decay(&mut self, factor: f64) {
        self.weighted_evidence *= factor;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.probability = evidence_probability(self.weighted_evidence, self.supporting_observations);
        self.confidence = ConfidenceLevel::from_probability(self.probability);
    }
}

impl PlayerPatternData {
    /// Records an occurrence against every trigger whose condition holds,
    /// regardless of which traits the player really has. Returns the
    /// traits that received supporting evidence.
    pub fn record_observation(&mut self, context: &GameEventContext, description: Option<&str>) -> Vec<Trait> {
        self.update_performance_stats(context);
        let context = self.backfill_context(context);
        let description = description.map(str::to_string).unwrap_or_else(|| context.describe());

        let mut recorded = Vec::new();
        for trigger in triggers::triggers_for_event(context.event_type) {
            if trigger.check_condition(&context) {
                self.record_trait_observation(trigger, &context, &description);
                recorded.push(trigger.trait_kind);
            }
        }
        recorded
    }

    /// Records one trigger's observation: supporting evidence for its trait
    /// and mirrored contradicting evidence for the opposite. Returns the
    /// weight that was posted.
    pub fn record_trait_observation(
        &mut self,
        trigger: &RevelationTrigger,
        context: &GameEventContext,
        description: &str,
    ) -> f64 {
        let weight = base_observation_weight(context) * trigger.calculate_probability(context);
        let stamp = self.next_stamp(context);

        self.observations.push(EventObservation {
            event_type: context.event_type,
            stamp,
            is_playoff: context.is_playoff,
            is_high_pressure: context.is_high_pressure(),
            related_trait: Some(trigger.trait_kind),
            weight,
            description: description.to_string(),
        });

        self.update_trait_evidence(trigger.trait_kind, true, weight, description, stamp);
        if let Some(opposite) = trigger.trait_kind.opposite() {
            self.update_trait_evidence(opposite, false, weight * OPPOSITE_WEIGHT_FACTOR, description, stamp);
        }
        weight
    }

    /// Posts one supporting or contradicting update and recomputes the
    /// trait's probability and confidence.
    pub fn update_trait_evidence(
        &mut self,
        trait_kind: Trait,
        supporting: bool,
        weight: f64,
        description: &str,
        stamp: ObservationStamp,
    ) {
        let evidence = self
            .evidence
            .entry(trait_kind)
            .or_insert_with(|| TraitEvidence::new(trait_kind));
        evidence.post(supporting, weight, description, stamp);
        debug!(
            "player {} {} {} w={:.3} -> evidence {:.3} p={:.3} ({})",
            self.player_id,
            if supporting { "+" } else { "-" },
            trait_kind.name(),
            weight,
            evidence.weighted_evidence,
            evidence.probability,
            evidence.confidence.name()
        );
    }

    /// Folds one occurrence into the season rollup.
    pub fn update_performance_stats(&mut self, context: &GameEventContext) {
        let stats = &mut self.stats;
        if context.event_type.is_in_game() {
            let game = (context.season, context.week);
            if stats.last_game != Some(game) {
                stats.games_played += 1;
                stats.last_game = Some(game);
            }
        }
        match context.event_type {
            GameEventType::GameWinningPlay | GameEventType::BigGamePerformance => {
                if context.is_high_pressure() || context.is_big_game() {
                    stats.clutch_plays += 1;
                }
            }
            GameEventType::Touchdown => {
                if context.is_playoff || context.is_two_minute_situation() {
                    stats.clutch_plays += 1;
                }
            }
            GameEventType::CrucialDrop => {
                stats.ball_security_issues += 1;
                if context.is_high_pressure() {
                    stats.clutch_failures += 1;
                }
            }
            GameEventType::Fumble => stats.ball_security_issues += 1,
            GameEventType::QuietBigGame => stats.clutch_failures += 1,
            GameEventType::InjuryOccurred => {
                stats.injuries += 1;
                let missed = u32::from(context.games_missed.unwrap_or(0));
                stats.games_missed += missed;
                if missed > 0 {
                    stats.consecutive_full_seasons = 0;
                }
            }
            GameEventType::FullSeasonPlayed => stats.consecutive_full_seasons += 1,
            GameEventType::PersonalFoul => stats.penalties += 1,
            GameEventType::Ejection => {
                stats.penalties += 1;
                stats.ejections += 1;
            }
            _ => {}
        }
    }

    /// Fills season counters the simulation loop left empty from the
    /// rollup. Counters the context already carries win.
    pub fn backfill_context(&self, context: &GameEventContext) -> GameEventContext {
        let mut filled = context.clone();
        if filled.games_missed.is_none() && context.event_type == GameEventType::InjuryOccurred {
            filled.games_missed = Some(clamp_u16(self.stats.games_missed));
        }
        if filled.consecutive_full_seasons.is_none() && context.event_type == GameEventType::FullSeasonPlayed {
            filled.consecutive_full_seasons = Some(clamp_u16(self.stats.consecutive_full_seasons));
        }
        filled
    }

    /// Scales every trait's weighted evidence by `factor` and recomputes,
    /// then closes the season's counters. Meant to run once per season.
    pub fn apply_evidence_decay(&mut self, factor: f64) {
        for evidence in self.evidence.values_mut() {
            evidence.decay(factor);
        }
        self.stats.seasons_observed += 1;
        self.stats.start_new_season();
        info!(
            "player {}: decayed evidence for {} traits by {}",
            self.player_id,
            self.evidence.len(),
            factor
        );
    }

    pub fn trait_evidence(&self, trait_kind: Trait) -> Option<&TraitEvidence> {
        self.evidence.get(&trait_kind)
    }

    /// All evidence, most probable first.
    pub fn all_evidence(&self) -> Vec<&TraitEvidence> {
        let mut all: Vec<&TraitEvidence> = self.evidence.values().collect();
        all.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        all
    }

    /// Evidence at moderate confidence or above, most probable first.
    pub fn high_confidence_traits(&self) -> Vec<&TraitEvidence> {
        self.all_evidence()
            .into_iter()
            .filter(|e| e.confidence >= ConfidenceLevel::Moderate)
            .collect()
    }

    pub fn should_confirm_trait(&self, trait_kind: Trait) -> bool {
        !self.is_confirmed(trait_kind)
            && self
                .evidence
                .get(&trait_kind)
                .is_some_and(|e| e.confidence == ConfidenceLevel::Confirmed)
    }

    /// Marks the trait permanently confirmed. Returns false if it already was.
    pub fn confirm_trait(&mut self, trait_kind: Trait) -> bool {
        if self.is_confirmed(trait_kind) {
            return false;
        }
        self.confirmed_traits.push(trait_kind);
        info!("player {}: confirmed {}", self.player_id, trait_kind.name());
        true
    }

    fn next_stamp(&mut self, context: &GameEventContext) -> ObservationStamp {
        let stamp = ObservationStamp {
            season: context.season,
            week: context.week,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        stamp
    }
}

fn clamp_u16(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Structural check for pattern data, mainly for restored snapshots.
pub fn validate_player_pattern_data(data: &PlayerPatternData) -> bool {
    let evidence_ok = data.evidence.iter().all(|(key, ev)| {
        *key == ev.trait_kind
            && ev.weighted_evidence.is_finite()
            && (0.0..=1.0).contains(&ev.probability)
            && ev.recent_observations.len() <= TraitEvidence::MAX_RECENT
            && (ev.probability - evidence_probability(ev.weighted_evidence, ev.supporting_observations)).abs()
                < 1e-9
            && ev.confidence == ConfidenceLevel::from_probability(ev.probability)
    });
    let observations_ok = data
        .observations
        .iter()
        .all(|o| o.weight > 0.0 && o.weight.is_finite() && o.stamp.sequence < data.next_sequence);
    let mut confirmed = data.confirmed_traits.clone();
    confirmed.sort();
    confirmed.dedup();
    evidence_ok && observations_ok && confirmed.len() == data.confirmed_traits.len()
}

/// Owned registry of per-player pattern data.
///
/// Created empty, filled lazily on first access per player, reset with
/// [`PatternStore::clear_all`], and restored with [`PatternStore::load`]
/// or [`PatternStore::from_ron`].
#[derive(Debug, Clone, Default)]
pub struct PatternStore {
    players: FxHashMap<PlayerId, PlayerPatternData>,
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, player_id: PlayerId) -> Option<&PlayerPatternData> {
        self.players.get(&player_id)
    }

    /// Returns the player's data, creating it on first access.
    pub fn get_or_create(&mut self, player_id: PlayerId) -> &mut PlayerPatternData {
        self.players
            .entry(player_id)
            .or_insert_with(|| PlayerPatternData::new(player_id))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn clear_all(&mut self) {
        self.players.clear();
    }

    /// Replaces one player's data, returning what was there before.
    pub fn load(&mut self, data: PlayerPatternData) -> Option<PlayerPatternData> {
        self.players.insert(data.player_id, data)
    }

    /// Serialises every player's data, ordered by player id.
    pub fn to_ron(&self) -> Result<String, SnapshotError> {
        let mut all: Vec<&PlayerPatternData> = self.players.values().collect();
        all.sort_by_key(|d| d.player_id);
        Ok(ron::ser::to_string_pretty(&all, ron::ser::PrettyConfig::default())?)
    }

    /// Restores a store from [`PatternStore::to_ron`] output. Any player
    /// failing [`validate_player_pattern_data`] rejects the whole snapshot.
    pub fn from_ron(input: &str) -> Result<Self, SnapshotError> {
        let all: Vec<PlayerPatternData> = ron::from_str(input)?;
        let mut store = Self::new();
        for data in all {
            if !validate_player_pattern_data(&data) {
                return Err(SnapshotError::Invalid(data.player_id));
            }
            store.load(data);
        }
        Ok(store)
    }
}
