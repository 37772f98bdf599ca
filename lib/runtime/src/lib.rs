pub mod manager;
mod rebuild;

pub use manager::{EngineManager, EngineSource, EngineStatus};
