pub mod interface;
pub mod local_f5;
pub mod pool;

pub use interface::{SynthesisEngine, SynthesisResult, SynthesisSpec, TtsError};
pub use local_f5::LocalF5Engine;
pub use pool::EnginePool;
