//! `describe_changes`: a human-readable bullet list of a change set.

use nexus_connector::SchemaChange;

/// Renders `changes` as a newline-separated bullet list, in the order
/// given.
pub fn describe_changes(changes: &[SchemaChange]) -> String {
    changes
        .iter()
        .map(|c| format!("- {}", c.describe()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_schema::{Field, FieldType};
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_one_bullet_per_change() {
        let changes = vec![
            SchemaChange::CreateTable {
                table: "User".to_string(),
                fields: vec![Field::new("id", FieldType::Int).primary_key()],
            },
            SchemaChange::DropTable { table: "Old".to_string() },
        ];
        let out = describe_changes(&changes);
        assert_eq!(
            out,
            "- create table 'User' (1 fields)\n- drop table 'Old'"
        );
    }

    #[test]
    fn empty_change_list_renders_empty_string() {
        assert_eq!(describe_changes(&[]), "");
    }
}
