//! Deterministic simulation module
//!
//! All flight logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by source, dock and probe ID)
//! - One registry per session, owned by [`SimState`]
//! - No rendering or platform dependencies

pub mod body;
pub mod bounds;
pub mod craft;
pub mod dock;
pub mod field;
pub mod predictor;
pub mod probe;
pub mod registry;
pub mod state;
pub mod tick;

pub use body::{Body, BodyParams};
pub use bounds::Bounds;
pub use craft::{Craft, CraftEvent, LaunchGate, LossReason, SteeringFilter};
pub use dock::{Dock, DockId, DockSet, FieldOverride};
pub use field::{FieldKind, FieldLaw, FieldSource, PatchEdge, SourceId, Spin};
pub use predictor::{TrajectoryPredictor, simulate_path};
pub use probe::{Probe, ProbeId, ProbeStatus, ProbeType};
pub use registry::FieldRegistry;
pub use state::SimState;
pub use tick::{SimEvent, TickInput, tick};
