//! Deterministic maze simulation
//!
//! Everything that touches the grid lives here:
//! - Seeded RNG only (`Pcg32`), so a seed reproduces a maze exactly
//! - One ray caster shared by collision and depth sampling
//! - No rendering or platform dependencies

pub mod agent;
pub mod braid;
pub mod carve;
pub mod generator;
pub mod grid;
pub mod raycast;

pub use agent::{Agent, AgentTuning, Axis, Blocked, Intent, MIN_CLEARANCE};
pub use braid::braid;
pub use carve::{CarveOutcome, Carver, Coord, Direction, carve};
pub use generator::{GenerationJob, GenerationOutcome, GenerationRequest, Generated};
pub use grid::{CellFlags, Grid, validate_size};
pub use raycast::cast_ray;
