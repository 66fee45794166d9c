//! Simulation core
//!
//! All gameplay logic lives here. This module has no rendering or platform
//! dependencies:
//! - Time comes in as explicit deltas
//! - Seeded RNG only
//! - Timers are handed to the host as epoch-stamped tickets

pub mod collision;
pub mod session;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timers;

pub use collision::{CollisionResult, item_basket_collision};
pub use session::{GameEvent, NavigationReason, Simulation};
pub use state::{Entity, GamePhase, GameState, ItemKind, Player};
pub use tick::{TickOutcome, advance};
pub use timers::{DeferredAction, Scheduled, Ticket};
