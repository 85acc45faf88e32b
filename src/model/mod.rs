pub mod gene;
pub mod transcript;
pub mod types;

pub use gene::Gene;
pub use transcript::Transcript;
pub use types::{GeneId, TranscriptId};
