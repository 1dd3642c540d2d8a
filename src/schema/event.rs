use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Discrete occurrences reported by the game simulation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEventType {
    GameWinningPlay,
    Touchdown,
    BigGamePerformance,
    QuietBigGame,
    CrucialDrop,
    Fumble,
    InjuryOccurred,
    FullSeasonPlayed,
    PlayedThroughInjury,
    PracticeAltercation,
    PersonalFoul,
    Ejection,
    MediaIncident,
    PublicComplaint,
    TeamRally,
    HustlePlay,
    MissedPractice,
    FilmStudy,
    AcceptedReducedRole,
    SchemeChangeThrived,
    SchemeChangeStruggled,
}

impl GameEventType {
    pub const ALL: [GameEventType; 21] = [
        Self::GameWinningPlay,
        Self::Touchdown,
        Self::BigGamePerformance,
        Self::QuietBigGame,
        Self::CrucialDrop,
        Self::Fumble,
        Self::InjuryOccurred,
        Self::FullSeasonPlayed,
        Self::PlayedThroughInjury,
        Self::PracticeAltercation,
        Self::PersonalFoul,
        Self::Ejection,
        Self::MediaIncident,
        Self::PublicComplaint,
        Self::TeamRally,
        Self::HustlePlay,
        Self::MissedPractice,
        Self::FilmStudy,
        Self::AcceptedReducedRole,
        Self::SchemeChangeThrived,
        Self::SchemeChangeStruggled,
    ];

    /// Stable camelCase identifier, e.g. "gameWinningPlay".
    pub fn name(&self) -> &'static str {
        match self {
            Self::GameWinningPlay => "gameWinningPlay",
            Self::Touchdown => "touchdown",
            Self::BigGamePerformance => "bigGamePerformance",
            Self::QuietBigGame => "quietBigGame",
            Self::CrucialDrop => "crucialDrop",
            Self::Fumble => "fumble",
            Self::InjuryOccurred => "injuryOccurred",
            Self::FullSeasonPlayed => "fullSeasonPlayed",
            Self::PlayedThroughInjury => "playedThroughInjury",
            Self::PracticeAltercation => "practiceAltercation",
            Self::PersonalFoul => "personalFoul",
            Self::Ejection => "ejection",
            Self::MediaIncident => "mediaIncident",
            Self::PublicComplaint => "publicComplaint",
            Self::TeamRally => "teamRally",
            Self::HustlePlay => "hustlePlay",
            Self::MissedPractice => "missedPractice",
            Self::FilmStudy => "filmStudy",
            Self::AcceptedReducedRole => "acceptedReducedRole",
            Self::SchemeChangeThrived => "schemeChangeThrived",
            Self::SchemeChangeStruggled => "schemeChangeStruggled",
        }
    }

    /// Occurrences that happen on the field during a game, as opposed to
    /// practice, media, or season-level reports.
    pub fn is_in_game(&self) -> bool {
        matches!(
            self,
            Self::GameWinningPlay
                | Self::Touchdown
                | Self::BigGamePerformance
                | Self::QuietBigGame
                | Self::CrucialDrop
                | Self::Fumble
                | Self::PlayedThroughInjury
                | Self::PersonalFoul
                | Self::Ejection
                | Self::TeamRally
                | Self::HustlePlay
                | Self::SchemeChangeThrived
                | Self::SchemeChangeStruggled
        )
    }

    /// Short lowercase phrase used in observation descriptions.
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::GameWinningPlay => "game-winning play",
            Self::Touchdown => "touchdown",
            Self::BigGamePerformance => "big-game performance",
            Self::QuietBigGame => "quiet outing in a big game",
            Self::CrucialDrop => "crucial drop",
            Self::Fumble => "fumble",
            Self::InjuryOccurred => "injury",
            Self::FullSeasonPlayed => "played every game of the season",
            Self::PlayedThroughInjury => "played through an injury",
            Self::PracticeAltercation => "practice altercation",
            Self::PersonalFoul => "personal foul",
            Self::Ejection => "ejection",
            Self::MediaIncident => "media incident",
            Self::PublicComplaint => "public complaint",
            Self::TeamRally => "rallied the team",
            Self::HustlePlay => "hustle play",
            Self::MissedPractice => "missed practice",
            Self::FilmStudy => "extra film study",
            Self::AcceptedReducedRole => "accepted a reduced role",
            Self::SchemeChangeThrived => "thrived after a scheme change",
            Self::SchemeChangeStruggled => "struggled after a scheme change",
        }
    }
}

/// One occurrence as reported by the simulation loop.
///
/// Immutable once built; the `with_*` methods consume and return a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEventContext {
    pub event_type: GameEventType,
    pub season: u16,
    pub week: u8,
    #[serde(default)]
    pub is_playoff: bool,
    #[serde(default)]
    pub is_primetime: bool,
    /// 1-4, 5+ for overtime.
    #[serde(default)]
    pub quarter: Option<u8>,
    #[serde(default)]
    pub time_remaining_secs: Option<u16>,
    /// Player's team score minus opponent score.
    #[serde(default)]
    pub score_differential: Option<i16>,
    #[serde(default)]
    pub games_missed: Option<u16>,
    #[serde(default)]
    pub consecutive_full_seasons: Option<u16>,
}

impl GameEventContext {
    pub fn new(event_type: GameEventType, season: u16, week: u8) -> Self {
        Self {
            event_type,
            season,
            week,
            is_playoff: false,
            is_primetime: false,
            quarter: None,
            time_remaining_secs: None,
            score_differential: None,
            games_missed: None,
            consecutive_full_seasons: None,
        }
    }

    pub fn with_playoff(mut self, is_playoff: bool) -> Self {
        self.is_playoff = is_playoff;
        self
    }

    pub fn with_primetime(mut self, is_primetime: bool) -> Self {
        self.is_primetime = is_primetime;
        self
    }

    /// Sets quarter, seconds remaining in it, and the score differential.
    pub fn with_game_clock(mut self, quarter: u8, time_remaining_secs: u16, score_differential: i16) -> Self {
        self.quarter = Some(quarter);
        self.time_remaining_secs = Some(time_remaining_secs);
        self.score_differential = Some(score_differential);
        self
    }

    pub fn with_games_missed(mut self, games_missed: u16) -> Self {
        self.games_missed = Some(games_missed);
        self
    }

    pub fn with_consecutive_full_seasons(mut self, seasons: u16) -> Self {
        self.consecutive_full_seasons = Some(seasons);
        self
    }

    /// Fourth quarter or overtime.
    pub fn is_late_game(&self) -> bool {
        self.quarter.is_some_and(|q| q >= 4)
    }

    /// Fourth quarter or overtime with two minutes or less on the clock.
    pub fn is_two_minute_situation(&self) -> bool {
        self.is_late_game() && self.time_remaining_secs.is_some_and(|t| t <= 120)
    }

    /// Margin of eight points or fewer either way.
    pub fn is_one_score_game(&self) -> bool {
        self.score_differential.is_some_and(|d| d.abs() <= 8)
    }

    pub fn is_high_pressure(&self) -> bool {
        self.is_playoff || self.is_late_game()
    }

    pub fn is_big_game(&self) -> bool {
        self.is_playoff || self.is_primetime
    }

    /// Default human-readable description, e.g.
    /// "Week 14: game-winning play, 4th quarter, playoffs".
    pub fn describe(&self) -> String {
        let mut out = format!("Week {}: {}", self.week, self.event_type.phrase());
        if let Some(q) = self.quarter {
            if q >= 5 {
                out.push_str(", overtime");
            } else {
                let _ = write!(out, ", {}", ordinal_quarter(q));
            }
        }
        if let Some(d) = self.score_differential {
            if d != 0 {
                let _ = write!(out, ", {} by {}", if d > 0 { "up" } else { "down" }, d.abs());
            } else {
                out.push_str(", tied");
            }
        }
        if self.is_playoff {
            out.push_str(", playoffs");
        } else if self.is_primetime {
            out.push_str(", primetime");
        }
        out
    }
}

fn ordinal_quarter(q: u8) -> String {
    let suffix = match q {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{}{} quarter", q, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_creation() {
        let ctx = GameEventContext::new(GameEventType::GameWinningPlay, 2, 14)
            .with_playoff(true)
            .with_game_clock(4, 45, -3);
        assert_eq!(ctx.season, 2);
        assert_eq!(ctx.week, 14);
        assert!(ctx.is_playoff);
        assert_eq!(ctx.quarter, Some(4));
        assert_eq!(ctx.games_missed, None);
    }

    #[test]
    fn situational_predicates() {
        let late = GameEventContext::new(GameEventType::CrucialDrop, 1, 3).with_game_clock(4, 90, 7);
        assert!(late.is_late_game());
        assert!(late.is_two_minute_situation());
        assert!(late.is_one_score_game());
        assert!(late.is_high_pressure());
        assert!(!late.is_big_game());

        let early = GameEventContext::new(GameEventType::CrucialDrop, 1, 3).with_game_clock(2, 90, 21);
        assert!(!early.is_late_game());
        assert!(!early.is_two_minute_situation());
        assert!(!early.is_one_score_game());
        assert!(!early.is_high_pressure());
    }

    #[test]
    fn missing_clock_is_not_pressure() {
        let ctx = GameEventContext::new(GameEventType::Touchdown, 1, 1);
        assert!(!ctx.is_late_game());
        assert!(!ctx.is_one_score_game());
        assert!(!ctx.is_high_pressure());
        assert!(ctx.clone().with_playoff(true).is_high_pressure());
    }

    #[test]
    fn describe_includes_situation() {
        let ctx = GameEventContext::new(GameEventType::GameWinningPlay, 3, 14)
            .with_playoff(true)
            .with_game_clock(4, 30, -2);
        assert_eq!(ctx.describe(), "Week 14: game-winning play, 4th quarter, down by 2, playoffs");

        let ot = GameEventContext::new(GameEventType::Touchdown, 3, 2).with_game_clock(5, 300, 0);
        assert_eq!(ot.describe(), "Week 2: touchdown, overtime, tied");
    }

    #[test]
    fn event_names_are_unique() {
        let mut names: Vec<&str> = GameEventType::ALL.iter().map(|e| e.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), GameEventType::ALL.len());
    }
}
