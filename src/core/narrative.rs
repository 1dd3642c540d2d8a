/// News generation: turns trait evidence and game occurrences into feed items.
///
/// Templates come from a RON bank keyed by (trait, confidence) and by event
/// type. Rendering never exposes the trait identifier; the item carries it
/// in `related_trait` for the UI to use once the player confirms it.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::core::random::RandomSource;
use crate::core::template::{Slots, Template, TemplateError};
use crate::schema::event::{GameEventContext, GameEventType};
use crate::schema::evidence::{ConfidenceLevel, TraitEvidence};
use crate::schema::news::{NewsCategory, NewsEvent, NewsPriority};
use crate::schema::player::PlayerId;
use crate::schema::traits::Trait;

const DEFAULT_TEMPLATES: &str = include_str!("../../news_data/templates.ron");

/// Headline and body alternatives for one trait at one confidence level.
#[derive(Debug, Clone)]
pub struct TraitTemplate {
    pub trait_kind: Trait,
    pub confidence: ConfidenceLevel,
    pub category: NewsCategory,
    pub priority: NewsPriority,
    pub headlines: Vec<Template>,
    pub bodies: Vec<Template>,
}

/// Headline and body alternatives for a plain game occurrence.
#[derive(Debug, Clone)]
pub struct EventTemplate {
    pub headlines: Vec<Template>,
    pub bodies: Vec<Template>,
}

/// All templates the generator can draw from.
#[derive(Debug, Clone)]
pub struct TemplateBank {
    trait_templates: HashMap<(Trait, ConfidenceLevel), TraitTemplate>,
    event_templates: HashMap<GameEventType, EventTemplate>,
    generic_event: EventTemplate,
}

#[derive(Debug, Deserialize)]
struct RonTraitTemplate {
    trait_kind: Trait,
    confidence: ConfidenceLevel,
    category: NewsCategory,
    priority: NewsPriority,
    headlines: Vec<String>,
    bodies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RonEventTemplate {
    event_type: GameEventType,
    headlines: Vec<String>,
    bodies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RonTextPair {
    headlines: Vec<String>,
    bodies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RonBank {
    #[serde(default)]
    trait_templates: Vec<RonTraitTemplate>,
    #[serde(default)]
    event_templates: Vec<RonEventTemplate>,
    generic_event: RonTextPair,
}

fn parse_alternatives(texts: &[String], what: &str) -> Result<Vec<Template>, TemplateError> {
    if texts.is_empty() {
        return Err(TemplateError::Parse(format!("{} has no alternatives", what)));
    }
    texts.iter().map(|t| Template::parse(t)).collect()
}

impl TemplateBank {
    /// Load a template bank from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<TemplateBank, TemplateError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a template bank from a RON string.
    pub fn parse_ron(input: &str) -> Result<TemplateBank, TemplateError> {
        let raw: RonBank = ron::from_str(input)?;

        let mut trait_templates = HashMap::new();
        for t in raw.trait_templates {
            let what = format!("{}/{}", t.trait_kind.name(), t.confidence.name());
            let template = TraitTemplate {
                trait_kind: t.trait_kind,
                confidence: t.confidence,
                category: t.category,
                priority: t.priority,
                headlines: parse_alternatives(&t.headlines, &format!("{} headlines", what))?,
                bodies: parse_alternatives(&t.bodies, &format!("{} bodies", what))?,
            };
            if trait_templates.insert((t.trait_kind, t.confidence), template).is_some() {
                return Err(TemplateError::Parse(format!("duplicate template for {}", what)));
            }
        }

        let mut event_templates = HashMap::new();
        for e in raw.event_templates {
            let what = e.event_type.name();
            let template = EventTemplate {
                headlines: parse_alternatives(&e.headlines, &format!("{} headlines", what))?,
                bodies: parse_alternatives(&e.bodies, &format!("{} bodies", what))?,
            };
            if event_templates.insert(e.event_type, template).is_some() {
                return Err(TemplateError::Parse(format!("duplicate template for {}", what)));
            }
        }

        let generic_event = EventTemplate {
            headlines: parse_alternatives(&raw.generic_event.headlines, "generic headlines")?,
            bodies: parse_alternatives(&raw.generic_event.bodies, "generic bodies")?,
        };

        Ok(TemplateBank {
            trait_templates,
            event_templates,
            generic_event,
        })
    }

    /// The bank shipped with the crate.
    pub fn default_bank() -> Result<TemplateBank, TemplateError> {
        Self::parse_ron(DEFAULT_TEMPLATES)
    }

    /// Merge another bank into this one. Entries from `other` replace
    /// entries with the same key; its generic template wins too.
    pub fn merge(&mut self, other: TemplateBank) {
        self.trait_templates.extend(other.trait_templates);
        self.event_templates.extend(other.event_templates);
        self.generic_event = other.generic_event;
    }

    /// Finds the template for `trait_kind` at `confidence`, falling back to
    /// stronger levels only. A weaker template would understate the evidence.
    pub fn find_trait_template(&self, trait_kind: Trait, confidence: ConfidenceLevel) -> Option<&TraitTemplate> {
        confidence
            .and_stronger()
            .find_map(|level| self.trait_templates.get(&(trait_kind, level)))
    }

    pub fn event_template(&self, event_type: GameEventType) -> &EventTemplate {
        self.event_templates.get(&event_type).unwrap_or(&self.generic_event)
    }

    pub fn has_event_template(&self, event_type: GameEventType) -> bool {
        self.event_templates.contains_key(&event_type)
    }

    /// Every trait template, in no particular order.
    pub fn trait_templates(&self) -> impl Iterator<Item = &TraitTemplate> {
        self.trait_templates.values()
    }

    /// Every event template including the generic fallback.
    pub fn event_templates(&self) -> impl Iterator<Item = &EventTemplate> {
        self.event_templates.values().chain(std::iter::once(&self.generic_event))
    }

    /// Trait/confidence pairs that have no template at that level.
    pub fn missing_levels(&self, levels: &[ConfidenceLevel]) -> Vec<(Trait, ConfidenceLevel)> {
        Trait::ALL
            .iter()
            .flat_map(|t| levels.iter().map(move |l| (*t, *l)))
            .filter(|key| !self.trait_templates.contains_key(key))
            .collect()
    }
}

/// Fixed category and priority for plain occurrence news.
pub fn event_category_priority(event_type: GameEventType) -> (NewsCategory, NewsPriority) {
    use GameEventType::*;
    match event_type {
        GameWinningPlay => (NewsCategory::GameRecap, NewsPriority::High),
        Touchdown => (NewsCategory::GameRecap, NewsPriority::Medium),
        BigGamePerformance => (NewsCategory::Performance, NewsPriority::High),
        QuietBigGame => (NewsCategory::Performance, NewsPriority::Medium),
        CrucialDrop => (NewsCategory::GameRecap, NewsPriority::Medium),
        Fumble => (NewsCategory::GameRecap, NewsPriority::Low),
        InjuryOccurred => (NewsCategory::Injury, NewsPriority::High),
        FullSeasonPlayed => (NewsCategory::Milestone, NewsPriority::Low),
        PlayedThroughInjury => (NewsCategory::Injury, NewsPriority::Medium),
        PracticeAltercation => (NewsCategory::LockerRoom, NewsPriority::High),
        PersonalFoul => (NewsCategory::Discipline, NewsPriority::Low),
        Ejection => (NewsCategory::Discipline, NewsPriority::High),
        MediaIncident => (NewsCategory::LockerRoom, NewsPriority::High),
        PublicComplaint => (NewsCategory::LockerRoom, NewsPriority::Medium),
        TeamRally => (NewsCategory::LockerRoom, NewsPriority::Medium),
        HustlePlay => (NewsCategory::Performance, NewsPriority::Low),
        MissedPractice => (NewsCategory::Discipline, NewsPriority::Medium),
        _ => (NewsCategory::GameRecap, NewsPriority::Medium),
    }
}

/// Renders news items and stamps them with per-player ids.
#[derive(Debug, Clone)]
pub struct NewsGenerator {
    bank: TemplateBank,
    next_sequence: u64,
}

impl NewsGenerator {
    pub fn new(bank: TemplateBank) -> Self {
        Self { bank, next_sequence: 0 }
    }

    pub fn bank(&self) -> &TemplateBank {
        &self.bank
    }

    /// Items generated so far.
    pub fn generated(&self) -> u64 {
        self.next_sequence
    }

    /// News hinting at `evidence`'s trait. Returns `None` when no template
    /// exists at the evidence's confidence or above.
    #[allow(clippy::too_many_arguments)]
    pub fn generate_trait_news(
        &mut self,
        rng: &mut dyn RandomSource,
        player_id: PlayerId,
        player_name: &str,
        team_name: &str,
        evidence: &TraitEvidence,
        context: &GameEventContext,
        metadata: Option<&HashMap<String, String>>,
    ) -> Option<NewsEvent> {
        let confidence = evidence.confidence();
        let template = self.bank.find_trait_template(evidence.trait_kind, confidence)?;

        let metadata = merged_metadata(context, metadata);
        let slots = Slots {
            player_name,
            team_name,
            metadata: &metadata,
        };
        let headline = pick(rng, &template.headlines).render(&slots);
        let body = pick(rng, &template.bodies).render(&slots);
        let (category, priority) = (template.category, template.priority);

        let sequence = self.next_sequence();
        Some(NewsEvent {
            id: news_id(player_id, sequence),
            headline,
            body,
            category,
            priority,
            related_trait: Some(evidence.trait_kind),
            hint_strength: Some(confidence),
            player_id,
            player_name: player_name.to_string(),
            team_name: team_name.to_string(),
            season: context.season,
            week: context.week,
            sequence,
            confirms_trait_revelation: confidence == ConfidenceLevel::Confirmed,
        })
    }

    /// Plain news for an occurrence, carrying no trait information.
    pub fn generate_game_event_news(
        &mut self,
        rng: &mut dyn RandomSource,
        player_id: PlayerId,
        player_name: &str,
        team_name: &str,
        context: &GameEventContext,
        metadata: Option<&HashMap<String, String>>,
    ) -> NewsEvent {
        let template = self.bank.event_template(context.event_type);
        let metadata = merged_metadata(context, metadata);
        let slots = Slots {
            player_name,
            team_name,
            metadata: &metadata,
        };
        let headline = pick(rng, &template.headlines).render(&slots);
        let body = pick(rng, &template.bodies).render(&slots);
        let (category, priority) = event_category_priority(context.event_type);

        let sequence = self.next_sequence();
        NewsEvent {
            id: news_id(player_id, sequence),
            headline,
            body,
            category,
            priority,
            related_trait: None,
            hint_strength: None,
            player_id,
            player_name: player_name.to_string(),
            team_name: team_name.to_string(),
            season: context.season,
            week: context.week,
            sequence,
            confirms_trait_revelation: false,
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }
}

fn pick<'a>(rng: &mut dyn RandomSource, alternatives: &'a [Template]) -> &'a Template {
    // Banks reject empty alternative lists at load time.
    let index = rng.pick(alternatives.len()).min(alternatives.len() - 1);
    &alternatives[index]
}

fn news_id(player_id: PlayerId, sequence: u64) -> String {
    format!("news-{}-{}", player_id, sequence)
}

/// Calendar keys first, caller-supplied keys override.
fn merged_metadata(context: &GameEventContext, extra: Option<&HashMap<String, String>>) -> HashMap<String, String> {
    let mut metadata = HashMap::from([
        ("season".to_string(), context.season.to_string()),
        ("week".to_string(), context.week.to_string()),
    ]);
    if let Some(extra) = extra {
        metadata.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    metadata
}

/// Orders a batch by priority rank, then newest first.
pub fn sort_news_by_priority(news: &mut [NewsEvent]) {
    news.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| (b.season, b.week, b.sequence).cmp(&(a.season, a.week, a.sequence)))
    });
}

pub fn filter_by_category(news: &[NewsEvent], category: NewsCategory) -> Vec<&NewsEvent> {
    news.iter().filter(|n| n.category == category).collect()
}

/// Items at `min_priority` or more urgent.
pub fn filter_by_min_priority(news: &[NewsEvent], min_priority: NewsPriority) -> Vec<&NewsEvent> {
    news.iter()
        .filter(|n| n.priority.rank() <= min_priority.rank())
        .collect()
}

pub fn trait_hint_news(news: &[NewsEvent]) -> Vec<&NewsEvent> {
    news.iter().filter(|n| n.is_trait_hint()).collect()
}

/// Structural check: every text field non-empty, and hint fields that agree
/// with each other.
pub fn validate_news_event(news: &NewsEvent) -> bool {
    let text_ok = [&news.id, &news.player_name, &news.team_name, &news.headline, &news.body]
        .iter()
        .all(|text| !text.trim().is_empty());
    let hint_ok = news.related_trait.is_some() == news.hint_strength.is_some();
    let confirm_ok =
        !news.confirms_trait_revelation || news.hint_strength == Some(ConfidenceLevel::Confirmed);
    text_ok && hint_ok && confirm_ok
}
