//! # onni-core
//!
//! Data model for the world-state refresh cache.
//!
//! The upstream game server publishes a single JSON document (the "world
//! state") that changes every few seconds. This crate owns:
//!
//! - [`Snapshot`]: the one cached value, holding the raw upstream document,
//!   its parsed projection and freshness metadata
//! - [`WorldState`]: the normalized, strongly-typed projection served to clients
//! - [`parse_worldstate`]: the only way to go from raw document to projection
//!
//! Storage, caching and fetching live in other crates; nothing here performs I/O.

pub mod error;
pub mod snapshot;
pub mod worldstate;

pub use error::{ParseError, Result};
pub use snapshot::{SNAPSHOT_ID, Snapshot};
pub use worldstate::{
    Alert, BoostKind, ConclaveChallenge, DailyDeal, Event, FeaturedDojo, GlobalBoost, Invasion,
    Link, Message, MissionInfo, MissionReward, OpenWorldJob, PrimeResurgence, PrimeResurgenceItem,
    RelicEra, ResurgenceSchedule, RewardItem, SeasonChallenge, SeasonInfo, Sortie, SortieMission,
    SyndicateMission, TraderItem, VoidFissure, VoidTrader, WorldState, has_marker, parse_worldstate,
};
