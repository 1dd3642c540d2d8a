/// Trigger registry: which events can supply evidence for which trait.
///
/// The table is static and query-only. Most events match nothing; an
/// empty result is the normal case, not an error.

use crate::schema::event::{GameEventContext, GameEventType};
use crate::schema::traits::Trait;

/// Pure predicate over an event context.
pub type ConditionFn = fn(&GameEventContext) -> bool;
/// Trait-specific additive bonus on top of the common situational ones.
pub type BonusFn = fn(&GameEventContext) -> f64;

/// A static rule connecting event types to one trait.
#[derive(Debug)]
pub struct RevelationTrigger {
    pub trait_kind: Trait,
    pub event_types: &'static [GameEventType],
    pub base_probability: f64,
    pub playoff_bonus: f64,
    pub late_game_bonus: f64,
    pub close_game_bonus: f64,
    condition: ConditionFn,
    extra_bonus: BonusFn,
}

impl RevelationTrigger {
    pub fn applies_to(&self, event_type: GameEventType) -> bool {
        self.event_types.contains(&event_type)
    }

    /// True when the event is one this trigger listens to and the
    /// situation satisfies its condition.
    pub fn check_condition(&self, context: &GameEventContext) -> bool {
        self.applies_to(context.event_type) && (self.condition)(context)
    }

    /// Base probability plus playoff, late-game, close-score and
    /// trait-specific bonuses, clamped to [0, 1].
    pub fn calculate_probability(&self, context: &GameEventContext) -> f64 {
        let mut probability = self.base_probability;
        if context.is_playoff {
            probability += self.playoff_bonus;
        }
        if context.is_late_game() {
            probability += self.late_game_bonus;
        }
        if context.is_one_score_game() {
            probability += self.close_game_bonus;
        }
        probability += (self.extra_bonus)(context);
        probability.clamp(0.0, 1.0)
    }
}

fn always(_: &GameEventContext) -> bool {
    true
}

fn no_bonus(_: &GameEventContext) -> f64 {
    0.0
}

fn clutch_condition(ctx: &GameEventContext) -> bool {
    match ctx.event_type {
        GameEventType::GameWinningPlay => ctx.is_two_minute_situation() && ctx.is_one_score_game(),
        GameEventType::Touchdown => {
            ctx.is_playoff || (ctx.is_two_minute_situation() && ctx.is_one_score_game())
        }
        GameEventType::BigGamePerformance => ctx.is_big_game(),
        _ => false,
    }
}

fn chokes_condition(ctx: &GameEventContext) -> bool {
    match ctx.event_type {
        GameEventType::CrucialDrop | GameEventType::Fumble => {
            ctx.is_playoff || (ctx.is_late_game() && ctx.is_one_score_game())
        }
        GameEventType::QuietBigGame => ctx.is_playoff,
        _ => false,
    }
}

fn composure_condition(ctx: &GameEventContext) -> bool {
    match ctx.event_type {
        GameEventType::GameWinningPlay => ctx.is_two_minute_situation(),
        GameEventType::BigGamePerformance => ctx.is_playoff,
        _ => false,
    }
}

fn durability_condition(ctx: &GameEventContext) -> bool {
    match ctx.event_type {
        GameEventType::FullSeasonPlayed => ctx.consecutive_full_seasons.is_some_and(|n| n >= 2),
        GameEventType::PlayedThroughInjury => true,
        _ => false,
    }
}

fn durability_bonus(ctx: &GameEventContext) -> f64 {
    let seasons = ctx.consecutive_full_seasons.unwrap_or(0);
    (f64::from(seasons.saturating_sub(2)) * 0.05).min(0.2)
}

fn games_missed_bonus(ctx: &GameEventContext) -> f64 {
    match ctx.games_missed.unwrap_or(0) {
        0..=3 => 0.0,
        4..=7 => 0.15,
        _ => 0.25,
    }
}

fn temper_condition(ctx: &GameEventContext) -> bool {
    match ctx.event_type {
        GameEventType::PersonalFoul => ctx.is_late_game() || ctx.is_big_game(),
        GameEventType::PracticeAltercation | GameEventType::Ejection => true,
        _ => false,
    }
}

fn ejection_bonus(ctx: &GameEventContext) -> f64 {
    if ctx.event_type == GameEventType::Ejection {
        0.15
    } else {
        0.0
    }
}

fn big_game_condition(ctx: &GameEventContext) -> bool {
    ctx.is_big_game()
}

fn primetime_bonus(ctx: &GameEventContext) -> f64 {
    if ctx.is_primetime {
        0.1
    } else {
        0.0
    }
}

static TRIGGERS: [RevelationTrigger; 17] = [
    RevelationTrigger {
        trait_kind: Trait::Clutch,
        event_types: &[
            GameEventType::GameWinningPlay,
            GameEventType::Touchdown,
            GameEventType::BigGamePerformance,
        ],
        base_probability: 0.4,
        playoff_bonus: 0.2,
        late_game_bonus: 0.15,
        close_game_bonus: 0.1,
        condition: clutch_condition,
        extra_bonus: no_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::Chokes,
        event_types: &[
            GameEventType::CrucialDrop,
            GameEventType::Fumble,
            GameEventType::QuietBigGame,
        ],
        base_probability: 0.35,
        playoff_bonus: 0.2,
        late_game_bonus: 0.15,
        close_game_bonus: 0.1,
        condition: chokes_condition,
        extra_bonus: no_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::CoolUnderPressure,
        event_types: &[GameEventType::GameWinningPlay, GameEventType::BigGamePerformance],
        base_probability: 0.35,
        playoff_bonus: 0.2,
        late_game_bonus: 0.15,
        close_game_bonus: 0.1,
        condition: composure_condition,
        extra_bonus: no_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::IronMan,
        event_types: &[GameEventType::FullSeasonPlayed, GameEventType::PlayedThroughInjury],
        base_probability: 0.4,
        playoff_bonus: 0.15,
        late_game_bonus: 0.1,
        close_game_bonus: 0.0,
        condition: durability_condition,
        extra_bonus: durability_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::InjuryProne,
        event_types: &[GameEventType::InjuryOccurred],
        base_probability: 0.35,
        playoff_bonus: 0.15,
        late_game_bonus: 0.0,
        close_game_bonus: 0.0,
        condition: always,
        extra_bonus: games_missed_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::Leader,
        event_types: &[GameEventType::TeamRally],
        base_probability: 0.45,
        playoff_bonus: 0.2,
        late_game_bonus: 0.1,
        close_game_bonus: 0.1,
        condition: always,
        extra_bonus: no_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::LockerRoomCancer,
        event_types: &[
            GameEventType::PracticeAltercation,
            GameEventType::MediaIncident,
            GameEventType::PublicComplaint,
        ],
        base_probability: 0.3,
        playoff_bonus: 0.15,
        late_game_bonus: 0.0,
        close_game_bonus: 0.0,
        condition: always,
        extra_bonus: no_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::HotHead,
        event_types: &[
            GameEventType::PracticeAltercation,
            GameEventType::PersonalFoul,
            GameEventType::Ejection,
        ],
        base_probability: 0.45,
        playoff_bonus: 0.2,
        late_game_bonus: 0.1,
        close_game_bonus: 0.1,
        condition: temper_condition,
        extra_bonus: ejection_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::Motor,
        event_types: &[GameEventType::HustlePlay],
        base_probability: 0.45,
        playoff_bonus: 0.15,
        late_game_bonus: 0.1,
        close_game_bonus: 0.0,
        condition: always,
        extra_bonus: no_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::Lazy,
        event_types: &[GameEventType::MissedPractice],
        base_probability: 0.4,
        playoff_bonus: 0.2,
        late_game_bonus: 0.0,
        close_game_bonus: 0.0,
        condition: always,
        extra_bonus: no_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::TeamFirst,
        event_types: &[GameEventType::AcceptedReducedRole],
        base_probability: 0.55,
        playoff_bonus: 0.15,
        late_game_bonus: 0.0,
        close_game_bonus: 0.0,
        condition: always,
        extra_bonus: no_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::Diva,
        event_types: &[GameEventType::PublicComplaint, GameEventType::MediaIncident],
        base_probability: 0.45,
        playoff_bonus: 0.15,
        late_game_bonus: 0.0,
        close_game_bonus: 0.0,
        condition: always,
        extra_bonus: primetime_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::FilmJunkie,
        event_types: &[GameEventType::FilmStudy],
        base_probability: 0.5,
        playoff_bonus: 0.15,
        late_game_bonus: 0.0,
        close_game_bonus: 0.0,
        condition: always,
        extra_bonus: no_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::SchemeVersatile,
        event_types: &[GameEventType::SchemeChangeThrived],
        base_probability: 0.5,
        playoff_bonus: 0.15,
        late_game_bonus: 0.0,
        close_game_bonus: 0.0,
        condition: always,
        extra_bonus: no_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::SystemDependent,
        event_types: &[GameEventType::SchemeChangeStruggled],
        base_probability: 0.5,
        playoff_bonus: 0.15,
        late_game_bonus: 0.0,
        close_game_bonus: 0.0,
        condition: always,
        extra_bonus: no_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::GlassHands,
        event_types: &[GameEventType::CrucialDrop, GameEventType::Fumble],
        base_probability: 0.4,
        playoff_bonus: 0.15,
        late_game_bonus: 0.1,
        close_game_bonus: 0.1,
        condition: always,
        extra_bonus: no_bonus,
    },
    RevelationTrigger {
        trait_kind: Trait::Disappears,
        event_types: &[GameEventType::QuietBigGame],
        base_probability: 0.4,
        playoff_bonus: 0.2,
        late_game_bonus: 0.0,
        close_game_bonus: 0.0,
        condition: big_game_condition,
        extra_bonus: no_bonus,
    },
];

/// The full trigger table.
pub fn all_triggers() -> &'static [RevelationTrigger] {
    &TRIGGERS
}

/// Triggers listening to the event type, in table order.
pub fn triggers_for_event(event_type: GameEventType) -> Vec<&'static RevelationTrigger> {
    TRIGGERS.iter().filter(|t| t.applies_to(event_type)).collect()
}

/// The trigger that supplies evidence for `trait_kind`, if any.
pub fn trigger_for_trait(trait_kind: Trait) -> Option<&'static RevelationTrigger> {
    TRIGGERS.iter().find(|t| t.trait_kind == trait_kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn late_close(event_type: GameEventType) -> GameEventContext {
        GameEventContext::new(event_type, 1, 10).with_game_clock(4, 90, 3)
    }

    #[test]
    fn every_trait_has_a_trigger() {
        for t in Trait::ALL {
            assert!(trigger_for_trait(t).is_some(), "no trigger for {}", t.name());
        }
        assert_eq!(all_triggers().len(), Trait::ALL.len());
    }

    #[test]
    fn base_probabilities_in_range() {
        for trigger in all_triggers() {
            assert!((0.3..=0.6).contains(&trigger.base_probability));
            assert!((0.15..=0.25).contains(&trigger.playoff_bonus));
            assert!(!trigger.event_types.is_empty());
        }
    }

    #[test]
    fn unrelated_event_matches_nothing_for_trait() {
        let found: Vec<Trait> = triggers_for_event(GameEventType::FilmStudy)
            .iter()
            .map(|t| t.trait_kind)
            .collect();
        assert_eq!(found, vec![Trait::FilmJunkie]);
    }

    #[test]
    fn game_winning_play_feeds_two_traits() {
        let found: Vec<Trait> = triggers_for_event(GameEventType::GameWinningPlay)
            .iter()
            .map(|t| t.trait_kind)
            .collect();
        assert_eq!(found, vec![Trait::Clutch, Trait::CoolUnderPressure]);
    }

    #[test]
    fn clutch_requires_late_close_game() {
        let clutch = trigger_for_trait(Trait::Clutch).unwrap();
        assert!(clutch.check_condition(&late_close(GameEventType::GameWinningPlay)));

        let blowout = GameEventContext::new(GameEventType::GameWinningPlay, 1, 10).with_game_clock(4, 90, 21);
        assert!(!clutch.check_condition(&blowout));

        let early = GameEventContext::new(GameEventType::GameWinningPlay, 1, 10).with_game_clock(4, 600, 3);
        assert!(!clutch.check_condition(&early));
    }

    #[test]
    fn clutch_accepts_playoff_touchdown_and_big_games() {
        let clutch = trigger_for_trait(Trait::Clutch).unwrap();
        let td = GameEventContext::new(GameEventType::Touchdown, 1, 18).with_playoff(true);
        assert!(clutch.check_condition(&td));
        let regular_td = GameEventContext::new(GameEventType::Touchdown, 1, 3);
        assert!(!clutch.check_condition(&regular_td));
        let primetime = GameEventContext::new(GameEventType::BigGamePerformance, 1, 5).with_primetime(true);
        assert!(clutch.check_condition(&primetime));
    }

    #[test]
    fn condition_rejects_foreign_event_type() {
        let clutch = trigger_for_trait(Trait::Clutch).unwrap();
        assert!(!clutch.check_condition(&late_close(GameEventType::HustlePlay)));
    }

    #[test]
    fn probability_bonuses_are_additive() {
        let clutch = trigger_for_trait(Trait::Clutch).unwrap();
        let plain = GameEventContext::new(GameEventType::BigGamePerformance, 1, 5);
        assert!((clutch.calculate_probability(&plain) - 0.4).abs() < 1e-9);

        let late = late_close(GameEventType::GameWinningPlay);
        assert!((clutch.calculate_probability(&late) - 0.65).abs() < 1e-9);

        let playoff_late = late.with_playoff(true);
        assert!((clutch.calculate_probability(&playoff_late) - 0.85).abs() < 1e-9);
    }

    #[test]
    fn probability_is_clamped() {
        let hot_head = trigger_for_trait(Trait::HotHead).unwrap();
        let ctx = GameEventContext::new(GameEventType::Ejection, 1, 19)
            .with_playoff(true)
            .with_game_clock(4, 30, 1);
        // 0.45 + 0.2 + 0.1 + 0.1 + 0.15, plus a little float noise
        let p = hot_head.calculate_probability(&ctx);
        assert!(p <= 1.0 && p > 0.99);

        let diva = trigger_for_trait(Trait::Diva).unwrap();
        let loud = GameEventContext::new(GameEventType::PublicComplaint, 1, 19)
            .with_playoff(true)
            .with_primetime(true);
        assert!(diva.calculate_probability(&loud) <= 1.0);
    }

    #[test]
    fn iron_man_needs_two_full_seasons() {
        let iron = trigger_for_trait(Trait::IronMan).unwrap();
        let one = GameEventContext::new(GameEventType::FullSeasonPlayed, 1, 17).with_consecutive_full_seasons(1);
        let two = GameEventContext::new(GameEventType::FullSeasonPlayed, 2, 17).with_consecutive_full_seasons(2);
        let unknown = GameEventContext::new(GameEventType::FullSeasonPlayed, 2, 17);
        assert!(!iron.check_condition(&one));
        assert!(iron.check_condition(&two));
        assert!(!iron.check_condition(&unknown));

        let five = GameEventContext::new(GameEventType::FullSeasonPlayed, 5, 17).with_consecutive_full_seasons(5);
        assert!((iron.calculate_probability(&five) - 0.55).abs() < 1e-9);
    }

    #[test]
    fn long_injuries_raise_probability() {
        let prone = trigger_for_trait(Trait::InjuryProne).unwrap();
        let minor = GameEventContext::new(GameEventType::InjuryOccurred, 1, 4).with_games_missed(1);
        let major = GameEventContext::new(GameEventType::InjuryOccurred, 1, 4).with_games_missed(9);
        assert!(prone.calculate_probability(&major) > prone.calculate_probability(&minor));
    }

    #[test]
    fn disappearing_needs_a_big_game() {
        let disappears = trigger_for_trait(Trait::Disappears).unwrap();
        assert!(!disappears.check_condition(&GameEventContext::new(GameEventType::QuietBigGame, 1, 2)));
        assert!(disappears.check_condition(
            &GameEventContext::new(GameEventType::QuietBigGame, 1, 2).with_primetime(true)
        ));
    }
}
