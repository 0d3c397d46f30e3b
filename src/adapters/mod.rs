// Adapters layer: reference collaborators behind the domain ports.

pub mod imports;
pub mod registry;
pub mod synthesizer;
pub mod todo;

pub use imports::SourceImportManager;
pub use registry::MigrationPlan;
pub use synthesizer::SignalInputSynthesizer;
pub use todo::TodoCommentAnnotator;
