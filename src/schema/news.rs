use serde::{Deserialize, Serialize};

use super::evidence::ConfidenceLevel;
use super::player::PlayerId;
use super::traits::Trait;

/// Feed section a news item is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NewsCategory {
    GameRecap,
    Performance,
    Injury,
    Discipline,
    LockerRoom,
    Milestone,
    Rumor,
}

impl NewsCategory {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GameRecap => "game_recap",
            Self::Performance => "performance",
            Self::Injury => "injury",
            Self::Discipline => "discipline",
            Self::LockerRoom => "locker_room",
            Self::Milestone => "milestone",
            Self::Rumor => "rumor",
        }
    }
}

/// Editorial priority. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NewsPriority {
    Urgent,
    High,
    Medium,
    Low,
}

impl NewsPriority {
    /// 0 for urgent through 3 for low.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Urgent => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

/// A rendered narrative item for the news feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsEvent {
    pub id: String,
    pub headline: String,
    pub body: String,
    pub category: NewsCategory,
    pub priority: NewsPriority,
    pub related_trait: Option<Trait>,
    pub hint_strength: Option<ConfidenceLevel>,
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_name: String,
    pub season: u16,
    pub week: u8,
    /// Orders items generated within the same week; higher is newer.
    pub sequence: u64,
    pub confirms_trait_revelation: bool,
}

impl NewsEvent {
    /// Returns true if the item carries a trait hint.
    pub fn is_trait_hint(&self) -> bool {
        self.related_trait.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_rank_matches_ordering() {
        let mut priorities = vec![NewsPriority::Low, NewsPriority::Urgent, NewsPriority::Medium, NewsPriority::High];
        priorities.sort();
        assert_eq!(
            priorities,
            vec![NewsPriority::Urgent, NewsPriority::High, NewsPriority::Medium, NewsPriority::Low]
        );
        for pair in priorities.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
    }

    #[test]
    fn category_names() {
        assert_eq!(NewsCategory::GameRecap.name(), "game_recap");
        assert_eq!(NewsCategory::LockerRoom.name(), "locker_room");
    }
}
