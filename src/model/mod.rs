pub use biots_core::{Environment, GenomeLogic, NetworkEvaluator, SensoryInput};
pub mod config {
    pub use biots_core::config::*;
}
pub mod genome {
    pub use biots_core::genome::*;
}
pub mod lifecycle {
    pub use biots_core::lifecycle::*;
}
pub mod population {
    pub use biots_core::population::*;
}
pub mod world {
    pub use biots_core::world::*;
}
pub mod persistence {
    pub use biots_io::*;
}

pub mod evaluator;
pub mod soup;
