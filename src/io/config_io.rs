use std::fs;
use std::path::Path;

use crate::io::project_io::{CONFIG_FILE, ProjectError, atomic_write};
use crate::model::config::DocketConfig;

/// Keys `dk config set` accepts, as `section.key`
pub const SETTABLE_KEYS: &[&str] = &[
    "board.name",
    "ids.task",
    "ids.comment",
    "ids.asset",
    "comments.max_depth",
    "mail.opener",
];

/// Read the config, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing.
pub fn read_config(docket_dir: &Path) -> Result<(DocketConfig, toml_edit::DocumentMut), ProjectError> {
    let config_path = docket_dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| ProjectError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: DocketConfig = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(docket_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ProjectError> {
    let config_path = docket_dir.join(CONFIG_FILE);
    atomic_write(&config_path, doc.to_string().as_bytes()).map_err(|e| ProjectError::WriteError {
        path: config_path,
        source: e,
    })
}

/// Error from `set_value`
#[derive(Debug, thiserror::Error)]
pub enum ConfigSetError {
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    #[error("{key} must be a positive integer, got {value:?}")]
    NotAPositiveInteger { key: String, value: String },
    #[error("{0} cannot be empty")]
    Empty(String),
}

/// Set `section.key` in the config document. The value is stored as a string
/// except for `comments.max_depth`, which must be a positive integer.
pub fn set_value(doc: &mut toml_edit::DocumentMut, key: &str, value: &str) -> Result<(), ConfigSetError> {
    if !SETTABLE_KEYS.contains(&key) {
        return Err(ConfigSetError::UnknownKey(key.to_string()));
    }
    let Some((section, field)) = key.split_once('.') else {
        return Err(ConfigSetError::UnknownKey(key.to_string()));
    };
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigSetError::Empty(key.to_string()));
    }

    let item = if key == "comments.max_depth" {
        match value.parse::<i64>() {
            Ok(n) if n > 0 => toml_edit::value(n),
            _ => {
                return Err(ConfigSetError::NotAPositiveInteger {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
    } else {
        toml_edit::value(value)
    };

    if !doc.contains_key(section) {
        doc[section] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc[section][field] = item;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"# Matter board
[board]
name = "Smith v. Jones"

[ids]
task = "SJ"   # short for the matter
"#
    }

    #[test]
    fn round_trip_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), sample_config()).unwrap();

        let (config, doc) = read_config(tmp.path()).unwrap();
        assert_eq!(config.ids.task, "SJ");
        write_config(tmp.path(), &doc).unwrap();

        let written = fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(written, sample_config());
    }

    #[test]
    fn set_existing_key_keeps_comments() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_value(&mut doc, "board.name", "Smith v. Jones (appeal)").unwrap();
        let result = doc.to_string();
        assert!(result.contains("# Matter board"));
        assert!(result.contains("name = \"Smith v. Jones (appeal)\""));
    }

    #[test]
    fn set_creates_missing_section() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_value(&mut doc, "comments.max_depth", "5").unwrap();
        set_value(&mut doc, "mail.opener", "thunderbird").unwrap();
        let config: DocketConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.comments.max_depth, 5);
        assert_eq!(config.mail.opener, "thunderbird");
        assert_eq!(config.ids.task, "SJ");
    }

    #[test]
    fn set_rejects_bad_input() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        assert!(matches!(
            set_value(&mut doc, "ui.theme", "dark"),
            Err(ConfigSetError::UnknownKey(_))
        ));
        assert!(matches!(
            set_value(&mut doc, "comments.max_depth", "0"),
            Err(ConfigSetError::NotAPositiveInteger { .. })
        ));
        assert!(matches!(
            set_value(&mut doc, "comments.max_depth", "deep"),
            Err(ConfigSetError::NotAPositiveInteger { .. })
        ));
        assert!(matches!(
            set_value(&mut doc, "ids.task", "  "),
            Err(ConfigSetError::Empty(_))
        ));
        assert_eq!(doc.to_string(), sample_config());
    }
}
