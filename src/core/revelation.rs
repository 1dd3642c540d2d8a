/// The revelation orchestrator: Event → Evidence → (maybe) Revelation → News.
///
/// Evidence accumulates on every qualifying event. Whether a story runs is
/// a second, random gate, so identical histories do not always surface on
/// the same game. Only confirmed evidence ever changes what the user sees.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::narrative::{validate_news_event, NewsGenerator, TemplateBank};
use crate::core::patterns::{validate_player_pattern_data, PatternStore, DEFAULT_DECAY_FACTOR};
use crate::core::random::{RandomSource, SeededRandom};
use crate::core::template::TemplateError;
use crate::core::triggers;
use crate::schema::event::{GameEventContext, GameEventType};
use crate::schema::evidence::{ConfidenceLevel, PlayerPatternData, TraitEvidence};
use crate::schema::news::NewsEvent;
use crate::schema::player::{Player, PlayerId};
use crate::schema::traits::Trait;

/// Week stamped on season wrap-up news; sorts after every regular week.
pub const SEASON_WRAP_UP_WEEK: u8 = u8::MAX;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

/// Tunables for one engine, or for a single call via
/// [`RevelationEngine::process_game_event_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevelationOptions {
    /// Scales the per-event draw probability.
    pub revelation_multiplier: f64,
    /// Reveal traits to the user once evidence is confirmed.
    pub auto_reveal_confirmed: bool,
    /// Weaker draws are tracked but produce no story.
    pub min_news_confidence: ConfidenceLevel,
    /// Applied to all evidence by the end-of-season sweep.
    pub decay_factor: f64,
}

impl Default for RevelationOptions {
    fn default() -> Self {
        Self {
            revelation_multiplier: 1.0,
            auto_reveal_confirmed: true,
            min_news_confidence: ConfidenceLevel::Suspected,
            decay_factor: DEFAULT_DECAY_FACTOR,
        }
    }
}

impl RevelationOptions {
    pub fn load_from_ron(path: &Path) -> Result<RevelationOptions, EngineError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parses and validates. Missing fields take their defaults.
    pub fn parse_ron(input: &str) -> Result<RevelationOptions, EngineError> {
        let options: RevelationOptions = ron::from_str(input)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.revelation_multiplier.is_finite() || self.revelation_multiplier < 0.0 {
            return Err(EngineError::InvalidOption(format!(
                "revelation_multiplier must be non-negative, got {}",
                self.revelation_multiplier
            )));
        }
        if !(self.decay_factor > 0.0 && self.decay_factor <= 1.0) {
            return Err(EngineError::InvalidOption(format!(
                "decay_factor must be in (0, 1], got {}",
                self.decay_factor
            )));
        }
        Ok(())
    }
}

/// A trait that surfaced on a successful draw or in the season sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealedTrait {
    pub trait_kind: Trait,
    pub confidence: ConfidenceLevel,
    /// Evidence had reached confirmed confidence.
    pub confirmed: bool,
    pub evidence: TraitEvidence,
}

/// Summary of one event fed through the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedEvent {
    pub event_type: GameEventType,
    pub season: u16,
    pub week: u8,
    pub description: String,
    /// Traits that received supporting evidence from this event.
    pub observed_traits: Vec<Trait>,
}

/// Output of one engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct RevelationResult {
    pub processed_events: Vec<ProcessedEvent>,
    pub revealed_traits: Vec<RevealedTrait>,
    pub news: Vec<NewsEvent>,
    /// The player's pattern data after the call.
    pub pattern_data: PlayerPatternData,
}

/// Structural check for a result bundle.
pub fn validate_revelation_result(result: &RevelationResult) -> bool {
    let player_id = result.pattern_data.player_id;

    let news_ok = result
        .news
        .iter()
        .all(|n| validate_news_event(n) && n.player_id == player_id);

    let revealed_ok = result.revealed_traits.iter().all(|r| {
        r.evidence.trait_kind == r.trait_kind
            && r.evidence.confidence() == r.confidence
            && r.confirmed == (r.confidence == ConfidenceLevel::Confirmed)
    });

    let mut kinds: Vec<Trait> = result.revealed_traits.iter().map(|r| r.trait_kind).collect();
    kinds.sort();
    kinds.dedup();
    let unique_ok = kinds.len() == result.revealed_traits.len();

    news_ok && revealed_ok && unique_ok && validate_player_pattern_data(&result.pattern_data)
}

/// The orchestrator. Built via [`RevelationEngine::builder`].
pub struct RevelationEngine {
    store: PatternStore,
    news: NewsGenerator,
    options: RevelationOptions,
    rng: Box<dyn RandomSource>,
}

/// Builder for constructing a [`RevelationEngine`].
pub struct RevelationEngineBuilder {
    seed: u64,
    options: Option<RevelationOptions>,
    options_path: Option<PathBuf>,
    templates_path: Option<PathBuf>,
    /// Directly provided templates (for testing without files).
    templates: Option<TemplateBank>,
    random: Option<Box<dyn RandomSource>>,
    store: Option<PatternStore>,
}

impl RevelationEngine {
    pub fn builder() -> RevelationEngineBuilder {
        RevelationEngineBuilder {
            seed: 0,
            options: None,
            options_path: None,
            templates_path: None,
            templates: None,
            random: None,
            store: None,
        }
    }

    pub fn options(&self) -> &RevelationOptions {
        &self.options
    }

    pub fn store(&self) -> &PatternStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PatternStore {
        &mut self.store
    }

    /// Hands back the store, e.g. to snapshot it after a simulation.
    pub fn into_store(self) -> PatternStore {
        self.store
    }

    pub fn pattern_data(&self, player_id: PlayerId) -> Option<&PlayerPatternData> {
        self.store.get(player_id)
    }

    /// Runs one event with the engine's own options.
    pub fn process_game_event(
        &mut self,
        player: &mut Player,
        context: &GameEventContext,
        team_name: &str,
    ) -> RevelationResult {
        let options = self.options.clone();
        self.process_game_event_with(player, context, team_name, &options)
    }

    /// Runs one event with per-call options.
    pub fn process_game_event_with(
        &mut self,
        player: &mut Player,
        context: &GameEventContext,
        team_name: &str,
        options: &RevelationOptions,
    ) -> RevelationResult {
        let data = self.store.get_or_create(player.id);
        data.update_performance_stats(context);
        let context = data.backfill_context(context);
        let description = context.describe();

        let mut observed_traits = Vec::new();
        let mut revealed_traits = Vec::new();
        let mut news = Vec::new();

        for trigger in triggers::triggers_for_event(context.event_type) {
            let trait_kind = trigger.trait_kind;
            // Evidence only comes from behaviour the player really has.
            if !player.has_trait(trait_kind) || !trigger.check_condition(&context) {
                continue;
            }

            let data = self.store.get_or_create(player.id);
            data.record_trait_observation(trigger, &context, &description);
            observed_traits.push(trait_kind);

            if player.hidden_traits.is_revealed(trait_kind) {
                continue;
            }

            let adjusted =
                (trigger.calculate_probability(&context) * options.revelation_multiplier).clamp(0.0, 1.0);
            if !self.rng.chance(adjusted) {
                debug!(
                    "player {}: {} draw failed at p={:.3}",
                    player.id,
                    trait_kind.name(),
                    adjusted
                );
                continue;
            }

            let Some(evidence) = data.trait_evidence(trait_kind).cloned() else {
                continue;
            };
            let confidence = evidence.confidence();
            let confirmed = confidence == ConfidenceLevel::Confirmed;

            if confirmed && options.auto_reveal_confirmed {
                player.hidden_traits.reveal(trait_kind);
                data.confirm_trait(trait_kind);
                info!("player {}: revealed {}", player.id, trait_kind.name());
            }

            if confidence >= options.min_news_confidence {
                match self.news.generate_trait_news(
                    self.rng.as_mut(),
                    player.id,
                    player.display_name(),
                    team_name,
                    &evidence,
                    &context,
                    None,
                ) {
                    Some(item) => news.push(item),
                    None => warn!(
                        "no news template for {} at {} or above",
                        trait_kind.name(),
                        confidence.name()
                    ),
                }
            }

            revealed_traits.push(RevealedTrait {
                trait_kind,
                confidence,
                confirmed,
                evidence,
            });
        }

        RevelationResult {
            processed_events: vec![ProcessedEvent {
                event_type: context.event_type,
                season: context.season,
                week: context.week,
                description,
                observed_traits,
            }],
            revealed_traits,
            news,
            pattern_data: self.snapshot(player.id),
        }
    }

    /// Processes events in order, one result per event.
    pub fn process_multiple_events(
        &mut self,
        player: &mut Player,
        contexts: &[GameEventContext],
        team_name: &str,
    ) -> Vec<RevelationResult> {
        contexts
            .iter()
            .map(|context| self.process_game_event(player, context, team_name))
            .collect()
    }

    /// Season wrap-up: surfaces every confirmed, still hidden trait the
    /// player has, then decays all evidence. Decay runs even when nothing
    /// is revealed.
    pub fn process_end_of_season_revelations(
        &mut self,
        player: &mut Player,
        season: u16,
        team_name: &str,
    ) -> RevelationResult {
        let options = self.options.clone();
        let context = GameEventContext::new(GameEventType::FullSeasonPlayed, season, SEASON_WRAP_UP_WEEK);
        let data = self.store.get_or_create(player.id);

        let pending: Vec<TraitEvidence> = data
            .all_evidence()
            .into_iter()
            .filter(|e| {
                e.confidence() == ConfidenceLevel::Confirmed
                    && player.has_trait(e.trait_kind)
                    && !player.hidden_traits.is_revealed(e.trait_kind)
            })
            .cloned()
            .collect();

        let mut revealed_traits = Vec::new();
        let mut news = Vec::new();
        for evidence in pending {
            let trait_kind = evidence.trait_kind;
            if options.auto_reveal_confirmed {
                player.hidden_traits.reveal(trait_kind);
                data.confirm_trait(trait_kind);
                info!("player {}: season {} wrap-up revealed {}", player.id, season, trait_kind.name());
            }

            match self.news.generate_trait_news(
                self.rng.as_mut(),
                player.id,
                player.display_name(),
                team_name,
                &evidence,
                &context,
                None,
            ) {
                Some(item) => news.push(item),
                None => warn!("no confirmed news template for {}", trait_kind.name()),
            }

            revealed_traits.push(RevealedTrait {
                trait_kind,
                confidence: evidence.confidence(),
                confirmed: true,
                evidence,
            });
        }

        data.apply_evidence_decay(options.decay_factor);

        RevelationResult {
            processed_events: Vec::new(),
            revealed_traits,
            news,
            pattern_data: self.snapshot(player.id),
        }
    }

    /// Plain news for an occurrence, with no trait attached.
    pub fn game_event_news(&mut self, player: &Player, context: &GameEventContext, team_name: &str) -> NewsEvent {
        self.news.generate_game_event_news(
            self.rng.as_mut(),
            player.id,
            player.display_name(),
            team_name,
            context,
            None,
        )
    }

    /// Evidence at suspected or above for traits the user has not seen yet,
    /// strongest first. Covers every trait with evidence, held or not.
    pub fn trait_hints(&self, player: &Player) -> Vec<&TraitEvidence> {
        self.store
            .get(player.id)
            .map(|data| {
                data.all_evidence()
                    .into_iter()
                    .filter(|e| {
                        e.confidence() >= ConfidenceLevel::Suspected
                            && !player.hidden_traits.is_revealed(e.trait_kind)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The player's revealed traits with whatever evidence backs them.
    pub fn revealed_traits(&self, player: &Player) -> Vec<RevealedTrait> {
        let data = self.store.get(player.id);
        player
            .revealed_traits()
            .iter()
            .map(|&trait_kind| {
                let evidence = data
                    .and_then(|d| d.trait_evidence(trait_kind))
                    .cloned()
                    .unwrap_or_else(|| TraitEvidence::new(trait_kind));
                RevealedTrait {
                    trait_kind,
                    confidence: evidence.confidence(),
                    confirmed: data.is_some_and(|d| d.is_confirmed(trait_kind)),
                    evidence,
                }
            })
            .collect()
    }

    fn snapshot(&self, player_id: PlayerId) -> PlayerPatternData {
        self.store
            .get(player_id)
            .cloned()
            .unwrap_or_else(|| PlayerPatternData::new(player_id))
    }
}

impl RevelationEngineBuilder {
    /// Seed for the default [`SeededRandom`]. Ignored with `with_random`.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn options(mut self, options: RevelationOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn options_path(mut self, path: impl AsRef<Path>) -> Self {
        self.options_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Extra templates loaded over the default (or provided) bank.
    pub fn templates_path(mut self, path: impl AsRef<Path>) -> Self {
        self.templates_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Provide templates directly (replaces the default bank).
    pub fn with_templates(mut self, bank: TemplateBank) -> Self {
        self.templates = Some(bank);
        self
    }

    pub fn with_random(mut self, random: Box<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    /// Start from existing pattern data, e.g. a restored snapshot.
    pub fn with_store(mut self, store: PatternStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<RevelationEngine, EngineError> {
        let options = match (self.options, self.options_path) {
            (Some(options), _) => options,
            (None, Some(path)) => RevelationOptions::load_from_ron(&path)?,
            (None, None) => RevelationOptions::default(),
        };
        options.validate()?;

        let mut bank = match self.templates {
            Some(bank) => bank,
            None => TemplateBank::default_bank()?,
        };
        if let Some(path) = self.templates_path {
            bank.merge(TemplateBank::load_from_ron(&path)?);
        }

        let rng: Box<dyn RandomSource> = match self.random {
            Some(random) => random,
            None => Box::new(SeededRandom::new(self.seed)),
        };

        Ok(RevelationEngine {
            store: self.store.unwrap_or_default(),
            news: NewsGenerator::new(bank),
            options,
            rng,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::FixedRandom;

    fn engine(random: FixedRandom) -> RevelationEngine {
        RevelationEngine::builder()
            .with_random(Box::new(random))
            .build()
            .unwrap()
    }

    fn late_winner(week: u8) -> GameEventContext {
        GameEventContext::new(GameEventType::GameWinningPlay, 2030, week)
            .with_playoff(true)
            .with_game_clock(4, 45, -3)
    }

    #[test]
    fn options_defaults_and_validation() {
        let options = RevelationOptions::default();
        assert_eq!(options.revelation_multiplier, 1.0);
        assert!(options.auto_reveal_confirmed);
        assert_eq!(options.min_news_confidence, ConfidenceLevel::Suspected);
        assert_eq!(options.decay_factor, 0.8);
        assert!(options.validate().is_ok());

        let bad = RevelationOptions {
            revelation_multiplier: -1.0,
            ..RevelationOptions::default()
        };
        assert!(matches!(bad.validate(), Err(EngineError::InvalidOption(_))));
        let bad = RevelationOptions {
            decay_factor: 0.0,
            ..RevelationOptions::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn options_parse_partial_ron() {
        let options = RevelationOptions::parse_ron("(revelation_multiplier: 0.5)").unwrap();
        assert_eq!(options.revelation_multiplier, 0.5);
        assert_eq!(options.decay_factor, 0.8);
        assert!(RevelationOptions::parse_ron("(decay_factor: 1.5)").is_err());
    }

    #[test]
    fn builder_rejects_invalid_options() {
        let result = RevelationEngine::builder()
            .options(RevelationOptions {
                decay_factor: 2.0,
                ..RevelationOptions::default()
            })
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn only_held_traits_gather_evidence() {
        let mut engine = engine(FixedRandom::never());
        let mut player = Player::new(PlayerId(1), "Theo Grant", &[Trait::Clutch]);
        let result = engine.process_game_event(&mut player, &late_winner(3), "Harbor City");

        assert_eq!(result.processed_events[0].observed_traits, vec![Trait::Clutch]);
        let data = engine.pattern_data(PlayerId(1)).unwrap();
        assert!(data.trait_evidence(Trait::Clutch).is_some());
        // The opposite picks up contradicting evidence; the composure trigger does not fire.
        assert_eq!(data.trait_evidence(Trait::Chokes).unwrap().contradicting_observations, 1);
        assert!(data.trait_evidence(Trait::CoolUnderPressure).is_none());
        assert!(result.revealed_traits.is_empty());
        assert!(validate_revelation_result(&result));
    }

    #[test]
    fn weak_evidence_is_tracked_without_news() {
        let mut engine = engine(FixedRandom::always());
        let mut player = Player::new(PlayerId(2), "Ana Voss", &[Trait::Clutch]);
        let result = engine.process_game_event(&mut player, &late_winner(3), "Harbor City");

        assert_eq!(result.revealed_traits.len(), 1);
        assert_eq!(result.revealed_traits[0].confidence, ConfidenceLevel::Hint);
        assert!(result.news.is_empty());
        assert!(player.revealed_traits().is_empty());
    }

    #[test]
    fn multiplier_zero_blocks_every_draw() {
        let mut engine = engine(FixedRandom::always());
        let mut player = Player::new(PlayerId(3), "Jo Park", &[Trait::Clutch]);
        let options = RevelationOptions {
            revelation_multiplier: 0.0,
            ..RevelationOptions::default()
        };
        for week in 1..=10 {
            let result = engine.process_game_event_with(&mut player, &late_winner(week), "T", &options);
            assert!(result.revealed_traits.is_empty());
        }
        assert_eq!(
            engine.pattern_data(PlayerId(3)).unwrap().trait_evidence(Trait::Clutch).unwrap().supporting_observations,
            10
        );
    }

    #[test]
    fn end_of_season_decays_even_without_revelations() {
        let mut engine = engine(FixedRandom::never());
        let mut player = Player::new(PlayerId(4), "Lee Moss", &[Trait::Clutch]);
        for week in 1..=4 {
            engine.process_game_event(&mut player, &late_winner(week), "T");
        }
        let before = engine.pattern_data(PlayerId(4)).unwrap().trait_evidence(Trait::Clutch).unwrap().weighted_evidence();

        let result = engine.process_end_of_season_revelations(&mut player, 2030, "T");
        assert!(result.revealed_traits.is_empty());
        let after = result.pattern_data.trait_evidence(Trait::Clutch).unwrap().weighted_evidence();
        assert!((after - before * 0.8).abs() < 1e-9);
        assert_eq!(result.pattern_data.stats.seasons_observed, 1);
    }

    #[test]
    fn hints_hide_revealed_traits() {
        let mut engine = engine(FixedRandom::never());
        let mut player = Player::new(PlayerId(5), "Rae Cole", &[Trait::Clutch]);
        for week in 1..=8 {
            engine.process_game_event(&mut player, &late_winner(week), "T");
        }
        let hints: Vec<Trait> = engine.trait_hints(&player).iter().map(|e| e.trait_kind).collect();
        assert_eq!(hints, vec![Trait::Clutch]);

        player.hidden_traits.reveal(Trait::Clutch);
        assert!(engine.trait_hints(&player).is_empty());
        let revealed = engine.revealed_traits(&player);
        assert_eq!(revealed.len(), 1);
        assert!(!revealed[0].confirmed);
    }

    #[test]
    fn game_event_news_carries_no_trait() {
        let mut engine = engine(FixedRandom::always());
        let player = Player::new(PlayerId(6), "Sol Hart", &[Trait::HotHead]);
        let ctx = GameEventContext::new(GameEventType::Ejection, 2030, 7);
        let item = engine.game_event_news(&player, &ctx, "T");
        assert!(item.related_trait.is_none());
        assert!(item.headline.contains("Sol Hart"));
    }
}
