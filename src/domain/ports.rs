use crate::core::replacement::Replacement;
use crate::domain::model::{
    Declaration, IncompatibilityInfo, InputMetadata, Program, ProjectFile, RegistryEntry,
};
use crate::utils::error::Result;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn project_root(&self) -> &str;
    fn plan_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn report_filename(&self) -> &str;
    fn insert_todos_for_skipped_fields(&self) -> bool;
    fn legacy_symbol(&self) -> &str;
    fn signal_symbol(&self) -> &str;
    fn core_module(&self) -> &str;
    fn dry_run(&self) -> bool;
    fn monitoring_enabled(&self) -> bool;
}

/// Already-classified declarations, iterated in registry order.
pub trait DeclarationRegistry {
    fn entries(&self) -> impl Iterator<Item = &RegistryEntry> + '_;
}

/// Import bookkeeping for one program. Both commands are idempotent and removing an
/// absent binding is a no-op.
pub trait ImportRegistrar {
    fn register_import(&mut self, file: &ProjectFile, symbol: &str, module: &str);
    fn remove_import(&mut self, file: &ProjectFile, symbol: &str, module: &str);
}

/// Turns one compatible declaration into its signal input source text.
pub trait TextSynthesizer {
    fn synthesize(
        &self,
        declaration: &Declaration,
        metadata: &InputMetadata,
        program: &Program,
        imports: &mut dyn ImportRegistrar,
    ) -> Result<String>;
}

/// Produces the edits that explain why a declaration was skipped. Edits must sit
/// outside the declaration's own range and come back in source order.
pub trait TodoAnnotator {
    fn annotate(
        &self,
        declaration: &Declaration,
        program: &Program,
        incompatibility: &IncompatibilityInfo,
    ) -> Vec<Replacement>;
}
