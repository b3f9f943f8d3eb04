//! Routing decision engine. Picks the landing screen from session state
//! and server-reported profile/cycle flags.

pub mod engine;
pub mod state;
pub mod watch;

pub use engine::RoutingEngine;
pub use state::{CycleDecision, RouteState, decide_after_login};
pub use watch::spawn_cycle_watch;
