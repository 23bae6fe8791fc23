mod events;
mod loader;

pub use events::{apply_batch, EventStream, StreamPhase, StreamSettings};
pub use loader::ConfigurationLoader;
