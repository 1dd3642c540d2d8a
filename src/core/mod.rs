//! Engine behaviour: triggers, evidence math, news rendering and the orchestrator.

pub mod narrative;
pub mod patterns;
pub mod random;
pub mod revelation;
pub mod template;
pub mod triggers;
