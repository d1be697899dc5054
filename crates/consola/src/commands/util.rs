//! Shared helpers for command handlers.

use std::io::{IsTerminal, Read};

use serde::de::DeserializeOwned;

use consola_core::table::{ColumnFilter, ColumnSort};

use crate::cli::BodyArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal and without `--yes` the operation is refused.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()?)
}

/// Read the JSON body of `create`/`update` into the entity's input type.
pub fn read_body<T: DeserializeOwned>(body: &BodyArgs) -> Result<T, CliError> {
    let raw = match (&body.from_file, &body.data) {
        (Some(path), _) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        (Some(path), _) => std::fs::read_to_string(path)?,
        (None, Some(data)) => data.clone(),
        (None, None) => {
            return Err(CliError::Validation {
                field: "body".into(),
                reason: "pass --from-file or --data".into(),
            });
        }
    };
    Ok(serde_json::from_str(&raw)?)
}

/// `field=value` as given to `--filter`.
pub fn parse_filter(raw: &str) -> Result<ColumnFilter, CliError> {
    let (field, value) = raw.split_once('=').ok_or_else(|| CliError::Validation {
        field: "filter".into(),
        reason: format!("expected FIELD=VALUE, got '{raw}'"),
    })?;
    let field = field.trim();
    if field.is_empty() {
        return Err(CliError::Validation {
            field: "filter".into(),
            reason: format!("missing field name in '{raw}'"),
        });
    }
    Ok(ColumnFilter::new(field, value.trim()))
}

/// `column`, `column:asc` or `column:desc` as given to `--sort`.
pub fn parse_sort(raw: &str) -> Result<ColumnSort, CliError> {
    let (column, dir) = raw.split_once(':').unwrap_or((raw, "asc"));
    match dir.to_ascii_lowercase().as_str() {
        "asc" => Ok(ColumnSort::asc(column.trim())),
        "desc" => Ok(ColumnSort::desc(column.trim())),
        other => Err(CliError::Validation {
            field: "sort".into(),
            reason: format!("direction must be asc or desc, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn filter_splits_on_first_equals() {
        let f = parse_filter("nome=a=b").unwrap();
        assert_eq!(f.id, "nome");
        assert_eq!(f.value, "a=b");
    }

    #[test]
    fn filter_without_equals_is_rejected() {
        assert!(matches!(
            parse_filter("nome"),
            Err(CliError::Validation { .. })
        ));
    }

    #[test]
    fn sort_defaults_to_ascending() {
        let s = parse_sort("nome").unwrap();
        assert_eq!(s, ColumnSort::asc("nome"));
        assert_eq!(parse_sort("nome:DESC").unwrap(), ColumnSort::desc("nome"));
        assert!(parse_sort("nome:up").is_err());
    }

    #[test]
    fn body_from_inline_json() {
        let body = BodyArgs {
            from_file: None,
            data: Some(r#"{"nome": "Finanças"}"#.into()),
        };
        let v: serde_json::Value = read_body(&body).unwrap();
        assert_eq!(v["nome"], "Finanças");
    }
}
