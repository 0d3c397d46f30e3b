use crate::core::replacement::{Replacement, TextUpdate};
use crate::domain::model::{Declaration, IncompatibilityInfo, Program};
use crate::domain::ports::TodoAnnotator;

/// Leaves a `// TODO` comment above each skipped input, aligned with the member.
#[derive(Debug, Clone, Default)]
pub struct TodoCommentAnnotator;

impl TodoCommentAnnotator {
    pub fn comment_text(incompatibility: &IncompatibilityInfo, indent: &str) -> String {
        let mut text = String::from("// TODO: Skipped for migration because:\n");
        text.push_str(&format!("{}//  {}\n", indent, incompatibility.reason.message()));
        if let Some(context) = incompatibility.context.as_deref() {
            text.push_str(&format!("{}//  ({})\n", indent, context.trim()));
        }
        text.push_str(indent);
        text
    }
}

impl TodoAnnotator for TodoCommentAnnotator {
    fn annotate(
        &self,
        declaration: &Declaration,
        program: &Program,
        incompatibility: &IncompatibilityInfo,
    ) -> Vec<Replacement> {
        // 找不到原始檔時不插入任何註解，屬正常情況
        let Some(source) = program.file(&declaration.file) else {
            tracing::warn!(
                "No source for {}, leaving '{}' without a TODO",
                declaration.file,
                declaration.id
            );
            return Vec::new();
        };

        let position = declaration.range.start;
        let indent = source.indentation_at(position);
        vec![Replacement::new(
            declaration.file.clone(),
            TextUpdate::insert(position, Self::comment_text(incompatibility, indent)),
        )]
    }
}
