use crate::domain::model::{Declaration, ImportSpecifier, InputMetadata, Program};
use crate::domain::ports::{ImportRegistrar, TextSynthesizer};
use crate::utils::error::{MigrateError, Result};

/// Modifiers that survive the rewrite; everything else is dropped and `readonly` re-added.
const KEPT_MODIFIERS: [&str; 4] = ["public", "protected", "private", "override"];

/// Writes `readonly name = input<T>(init, {alias, transform});`.
#[derive(Debug, Clone)]
pub struct SignalInputSynthesizer {
    signal_import: ImportSpecifier,
}

impl SignalInputSynthesizer {
    pub fn new(signal_import: ImportSpecifier) -> Self {
        Self { signal_import }
    }

    fn modifiers(&self, metadata: &InputMetadata) -> String {
        let mut prefix = String::new();
        for modifier in &metadata.modifiers {
            if KEPT_MODIFIERS.contains(&modifier.as_str()) {
                prefix.push_str(modifier);
                prefix.push(' ');
            }
        }
        prefix.push_str("readonly ");
        prefix
    }

    fn type_argument(&self, metadata: &InputMetadata) -> Option<String> {
        let declared = metadata.type_annotation.as_deref()?.trim();
        // `foo?: T` 在非 required 的情況下必須保留 undefined
        let needs_undefined = metadata.question_mark
            && !metadata.required
            && !declared.split('|').any(|part| part.trim() == "undefined");
        if needs_undefined && declared.contains("=>") {
            // 函式型別需加括號，否則 undefined 會併入回傳型別
            Some(format!("({}) | undefined", declared))
        } else if needs_undefined {
            Some(format!("{} | undefined", declared))
        } else {
            Some(declared.to_string())
        }
    }

    fn options_object(&self, declaration: &Declaration, metadata: &InputMetadata) -> Option<String> {
        let mut fields = Vec::new();
        if let Some(alias) = metadata.alias.as_deref() {
            if alias != declaration.name {
                fields.push(format!("alias: '{}'", alias));
            }
        }
        if let Some(transform) = metadata.transform.as_deref() {
            fields.push(format!("transform: {}", transform.trim()));
        }

        if fields.is_empty() {
            None
        } else {
            Some(format!("{{{}}}", fields.join(", ")))
        }
    }
}

impl Default for SignalInputSynthesizer {
    fn default() -> Self {
        Self::new(ImportSpecifier::new("input", "@angular/core"))
    }
}

impl TextSynthesizer for SignalInputSynthesizer {
    fn synthesize(
        &self,
        declaration: &Declaration,
        metadata: &InputMetadata,
        _program: &Program,
        imports: &mut dyn ImportRegistrar,
    ) -> Result<String> {
        if metadata.required && metadata.type_annotation.is_none() {
            return Err(MigrateError::contract(
                &declaration.id,
                "required input without an explicit type",
            ));
        }

        let type_argument = self.type_argument(metadata);
        let options = self.options_object(declaration, metadata);

        let mut args = Vec::new();
        if !metadata.required {
            match (metadata.initializer.as_deref(), &options) {
                (Some(initializer), _) => args.push(initializer.trim().to_string()),
                (None, Some(_)) => args.push("undefined".to_string()),
                (None, None) => {}
            }
        }
        if let Some(options) = options {
            args.push(options);
        }

        let symbol = &self.signal_import.symbol;
        let callee = if metadata.required {
            format!("{}.required", symbol)
        } else {
            symbol.clone()
        };
        let generic = type_argument
            .map(|ty| format!("<{}>", ty))
            .unwrap_or_default();

        imports.register_import(
            &declaration.file,
            &self.signal_import.symbol,
            &self.signal_import.module,
        );

        Ok(format!(
            "{}{} = {}{}({});",
            self.modifiers(metadata),
            declaration.name,
            callee,
            generic,
            args.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{MemberForm, ProjectFile, TextRange};

    #[derive(Default)]
    struct Registered(Vec<(String, String, String)>);

    impl ImportRegistrar for Registered {
        fn register_import(&mut self, file: &ProjectFile, symbol: &str, module: &str) {
            self.0
                .push((file.to_string(), symbol.to_string(), module.to_string()));
        }

        fn remove_import(&mut self, _file: &ProjectFile, _symbol: &str, _module: &str) {}
    }

    fn declaration(name: &str) -> Declaration {
        Declaration {
            id: format!("cmp.ts@Cmp.{}", name),
            file: ProjectFile::new("cmp.ts"),
            class_name: "Cmp".to_string(),
            name: name.to_string(),
            range: TextRange::new(0, 10),
            form: MemberForm::Property,
        }
    }

    fn synthesize(name: &str, metadata: InputMetadata) -> Result<String> {
        let mut imports = Registered::default();
        SignalInputSynthesizer::default().synthesize(
            &declaration(name),
            &metadata,
            &Program::new(),
            &mut imports,
        )
    }

    #[test]
    fn test_initializer_and_type() {
        let text = synthesize(
            "name",
            InputMetadata {
                initializer: Some("'guest'".to_string()),
                type_annotation: Some("string".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(text, "readonly name = input<string>('guest');");
    }

    #[test]
    fn test_inferred_type_without_annotation() {
        let text = synthesize(
            "disabled",
            InputMetadata {
                initializer: Some("false".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(text, "readonly disabled = input(false);");
    }

    #[test]
    fn test_required_with_alias() {
        let text = synthesize(
            "user",
            InputMetadata {
                required: true,
                alias: Some("currentUser".to_string()),
                type_annotation: Some("User".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            text,
            "readonly user = input.required<User>({alias: 'currentUser'});"
        );
    }

    #[test]
    fn test_required_without_type_is_contract_violation() {
        let err = synthesize(
            "user",
            InputMetadata {
                required: true,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, MigrateError::ContractViolation { .. }));
    }

    #[test]
    fn test_question_mark_adds_undefined_once() {
        let optional = synthesize(
            "label",
            InputMetadata {
                question_mark: true,
                type_annotation: Some("string".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(optional, "readonly label = input<string | undefined>();");

        let already = synthesize(
            "label",
            InputMetadata {
                question_mark: true,
                type_annotation: Some("string | undefined".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(already, "readonly label = input<string | undefined>();");
    }

    #[test]
    fn test_optional_function_type_is_parenthesized() {
        let text = synthesize(
            "cb",
            InputMetadata {
                question_mark: true,
                type_annotation: Some("() => void".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(text, "readonly cb = input<(() => void) | undefined>();");
    }

    #[test]
    fn test_options_without_initializer_pass_undefined() {
        let text = synthesize(
            "size",
            InputMetadata {
                type_annotation: Some("number".to_string()),
                transform: Some("numberAttribute".to_string()),
                alias: Some("size".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            text,
            "readonly size = input<number>(undefined, {transform: numberAttribute});"
        );
    }

    #[test]
    fn test_modifiers_are_filtered() {
        let text = synthesize(
            "id",
            InputMetadata {
                initializer: Some("0".to_string()),
                modifiers: vec![
                    "protected".to_string(),
                    "readonly".to_string(),
                    "declare".to_string(),
                ],
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(text, "protected readonly id = input(0);");
    }

    #[test]
    fn test_registers_signal_import() {
        let mut imports = Registered::default();
        SignalInputSynthesizer::default()
            .synthesize(
                &declaration("name"),
                &InputMetadata::default(),
                &Program::new(),
                &mut imports,
            )
            .unwrap();
        assert_eq!(
            imports.0,
            vec![(
                "cmp.ts".to_string(),
                "input".to_string(),
                "@angular/core".to_string()
            )]
        );
    }
}
