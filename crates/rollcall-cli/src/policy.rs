//! Policy table rendering.

use rollcall_runtime::PolicyEntry;

/// Renders the table as aligned text columns.
///
/// ```text
/// PROCEDURE            KIND      ACCESS
/// activity.create      mutation  ADMIN
/// activity.getAll      query     ADMIN, OPERATOR, READER
/// ```
pub fn render_table(entries: &[PolicyEntry]) -> String {
    const HEADER: [&str; 3] = ["PROCEDURE", "KIND", "ACCESS"];

    let rows: Vec<[String; 3]> = entries
        .iter()
        .map(|entry| {
            let access = if entry.public {
                "PUBLIC".to_string()
            } else {
                entry.roles.join(", ")
            };
            [entry.procedure.clone(), entry.kind.to_string(), access]
        })
        .collect();

    let width = |col: usize| {
        rows.iter()
            .map(|row| row[col].len())
            .chain(std::iter::once(HEADER[col].len()))
            .max()
            .unwrap_or(0)
    };
    let (w0, w1) = (width(0), width(1));

    let mut out = format!("{:<w0$}  {:<w1$}  {}", HEADER[0], HEADER[1], HEADER[2]);
    for [procedure, kind, access] in &rows {
        out.push('\n');
        out.push_str(&format!("{procedure:<w0$}  {kind:<w1$}  {access}"));
    }
    out
}

/// Renders the table as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(entries: &[PolicyEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_runtime::ProcedureKind;

    fn entry(procedure: &str, kind: ProcedureKind, roles: &[&'static str]) -> PolicyEntry {
        PolicyEntry {
            procedure: procedure.into(),
            kind,
            public: roles.is_empty(),
            roles: roles.to_vec(),
        }
    }

    #[test]
    fn table_is_aligned() {
        let table = render_table(&[
            entry("activity.create", ProcedureKind::Mutation, &["ADMIN"]),
            entry("health.ping", ProcedureKind::Query, &[]),
        ]);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "PROCEDURE        KIND      ACCESS");
        assert_eq!(lines[1], "activity.create  mutation  ADMIN");
        assert_eq!(lines[2], "health.ping      query     PUBLIC");
    }

    #[test]
    fn json_lists_roles() {
        let json = render_json(&[entry(
            "volunteer.create",
            ProcedureKind::Mutation,
            &["ADMIN", "OPERATOR"],
        )])
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["procedure"], "volunteer.create");
        assert_eq!(value[0]["kind"], "mutation");
        assert_eq!(value[0]["roles"], serde_json::json!(["ADMIN", "OPERATOR"]));
    }
}
