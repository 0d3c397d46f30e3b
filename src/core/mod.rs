pub mod apply;
pub mod engine;
pub mod migrate;
pub mod replacement;

pub use crate::domain::model::{Program, ProjectFile, RegistryEntry};
pub use crate::domain::ports::{
    ConfigProvider, DeclarationRegistry, ImportRegistrar, Storage, TextSynthesizer, TodoAnnotator,
};
pub use crate::utils::error::Result;
