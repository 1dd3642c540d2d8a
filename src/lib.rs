//! Revelation Engine: gradual disclosure of hidden player traits.
//!
//! Players carry hidden behavioural traits the user cannot see. Game events
//! feed weighted evidence into per-player pattern data; once evidence is
//! strong enough, news stories hint at what people have noticed, and
//! confirmed patterns are finally revealed. Trait names never appear in
//! generated text.
//!
//! ```no_run
//! use revelation_engine::core::revelation::RevelationEngine;
//! use revelation_engine::schema::event::{GameEventContext, GameEventType};
//! use revelation_engine::schema::player::{Player, PlayerId};
//! use revelation_engine::schema::traits::Trait;
//!
//! let mut engine = RevelationEngine::builder().seed(7).build().unwrap();
//! let mut player = Player::new(PlayerId(12), "Theo Grant", &[Trait::Clutch]);
//! let event = GameEventContext::new(GameEventType::GameWinningPlay, 2031, 9)
//!     .with_game_clock(4, 40, -3);
//! let result = engine.process_game_event(&mut player, &event, "Harbor City");
//! for item in &result.news {
//!     println!("{}", item.headline);
//! }
//! ```

pub mod core;
pub mod schema;
