//! Heaplink Core — heap snapshot domain model, result types, and energy helpers

pub mod model;
pub mod evolution;
pub mod diff;
pub mod link;
pub mod energy;
pub mod error;


pub use model::{Runtime, Node, Edge, Stack, EnergyMetrics, Subgraph};
pub use evolution::{CodeEvolution, CodeChangeSpan, ModificationType, ModificationSource};
pub use diff::{MatchingResult, MatchedPair, ModifiedPair, DeltaRecord};
pub use link::{CausalPair, Confidence, CodeLinkContainer};
pub use energy::{AccessEnergy, AccessEnergyDelta, access_energy, access_energy_difference};
pub use error::CoreError;
