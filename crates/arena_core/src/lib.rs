//! # Arena Core
//!
//! Deterministic battle simulation for a two-sided lane arena.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO beyond parsing in-memory RON text
//! - No wall clock; the host supplies simulated time
//! - No randomness
//! - No floating-point math in the simulation (uses fixed-point)
//!
//! The host owns the loop: it sets the arena layout, deploys cards and
//! calls [`simulation::Battle::tick`] (or [`simulation::Battle::advance_frame`])
//! once per frame, then reads entity and state snapshots back out.
//!
//! ## Crate Structure
//!
//! - [`simulation`] - Battle root and tick loop
//! - [`behavior`] - Troop and tower targeting, movement and attack
//! - [`spell`] - Area spells
//! - [`pathfinding`] - River and bridge steering
//! - [`victory`] - Crowns, tiebreaks and outcome
//! - [`catalog`] - Archetype stat lookup
//! - [`archetype`] - Archetypes and the constructor table
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod archetype;
pub mod behavior;
pub mod catalog;
pub mod clock;
pub mod components;
pub mod config;
pub mod data;
pub mod economy;
pub mod entity;
pub mod error;
pub mod layout;
pub mod math;
pub mod pathfinding;
pub mod simulation;
pub mod spell;
pub mod victory;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::archetype::{card_name, card_number, Archetype};
    pub use crate::catalog::{ArchetypeStats, StatCatalog};
    pub use crate::components::*;
    pub use crate::config::BattleConfig;
    pub use crate::entity::{Entity, EntityId, EntityKind, TowerKind};
    pub use crate::error::{BattleError, Result};
    pub use crate::layout::{ArenaLayout, TowerPlacement};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::simulation::{Battle, BattleState, TickEvents, TowerDestroyed};
    pub use crate::victory::{Outcome, VictoryReason};
}
