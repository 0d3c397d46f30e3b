use crate::core::replacement::{check_updates_disjoint, TextUpdate};
use crate::domain::model::ProjectFile;
use crate::utils::error::{MigrateError, Result};

/// Splice `updates` into `text`. Offsets refer to the original text; insertions at the
/// same position keep their append order and land before a replacement starting there.
pub fn apply_text_updates(
    file: &ProjectFile,
    text: &str,
    updates: &[TextUpdate],
) -> Result<String> {
    for update in updates {
        validate_update(file, text, update)?;
    }
    check_updates_disjoint(file, updates)?;

    let mut ordered: Vec<&TextUpdate> = updates.iter().collect();
    // sort_by_key 是穩定排序，同位置插入維持原先順序
    ordered.sort_by_key(|u| (u.position, u.end));

    let mut result = String::with_capacity(
        text.len() + updates.iter().map(|u| u.to_insert.len()).sum::<usize>(),
    );
    let mut cursor = 0;
    for update in ordered {
        result.push_str(&text[cursor..update.position]);
        result.push_str(&update.to_insert);
        cursor = update.end;
    }
    result.push_str(&text[cursor..]);

    Ok(result)
}

fn validate_update(file: &ProjectFile, text: &str, update: &TextUpdate) -> Result<()> {
    let in_bounds = update.position <= update.end && update.end <= text.len();
    if !in_bounds || !text.is_char_boundary(update.position) || !text.is_char_boundary(update.end)
    {
        return Err(MigrateError::InvalidRange {
            file: file.to_string(),
            start: update.position,
            end: update.end,
            len: text.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TextRange;

    fn file() -> ProjectFile {
        ProjectFile::new("cmp.ts")
    }

    #[test]
    fn test_apply_replacement_and_insertion_at_same_start() {
        let text = "class A {\n  @Input() name = '';\n}\n";
        let start = text.find("@Input").unwrap();
        let end = text.find(";\n}").unwrap() + 1;

        let updates = vec![
            TextUpdate::replace(TextRange::new(start, end), "readonly name = input('');"),
            TextUpdate::insert(start, "// note\n  "),
        ];

        let output = apply_text_updates(&file(), text, &updates).unwrap();
        assert_eq!(output, "class A {\n  // note\n  readonly name = input('');\n}\n");
    }

    #[test]
    fn test_insertions_at_same_position_keep_order() {
        let updates = vec![TextUpdate::insert(0, "a"), TextUpdate::insert(0, "b")];
        let output = apply_text_updates(&file(), "x", &updates).unwrap();
        assert_eq!(output, "abx");
    }

    #[test]
    fn test_apply_is_independent_of_append_order() {
        let text = "0123456789";
        let forward = vec![
            TextUpdate::replace(TextRange::new(1, 3), "A"),
            TextUpdate::replace(TextRange::new(5, 8), "B"),
        ];
        let backward: Vec<TextUpdate> = forward.iter().rev().cloned().collect();
        assert_eq!(
            apply_text_updates(&file(), text, &forward).unwrap(),
            apply_text_updates(&file(), text, &backward).unwrap()
        );
        assert_eq!(apply_text_updates(&file(), text, &forward).unwrap(), "0A34B89");
    }

    #[test]
    fn test_out_of_bounds_range_is_rejected() {
        let updates = vec![TextUpdate::replace(TextRange::new(2, 50), "x")];
        let err = apply_text_updates(&file(), "short", &updates).unwrap_err();
        assert!(matches!(err, MigrateError::InvalidRange { len: 5, .. }));
    }

    #[test]
    fn test_non_char_boundary_is_rejected() {
        let updates = vec![TextUpdate::insert(1, "x")];
        assert!(apply_text_updates(&file(), "é", &updates).is_err());
    }

    #[test]
    fn test_overlapping_updates_are_rejected() {
        let updates = vec![
            TextUpdate::replace(TextRange::new(0, 4), "x"),
            TextUpdate::replace(TextRange::new(2, 6), "y"),
        ];
        let err = apply_text_updates(&file(), "0123456789", &updates).unwrap_err();
        assert!(matches!(err, MigrateError::OverlappingEdits { .. }));
    }
}
