use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dbreflect_core::{NamingConvention, TypeMapping};
use dbreflect_introspect::ImportOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Contents of a `dbreflect.toml` file. Every table is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbreflectConfig {
    pub import: ImportOptions,
    pub naming: NamingConvention,
    pub type_map: Vec<TypeMapping>,
}

pub fn load_config(path: &Path) -> ConfigResult<DbreflectConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> ConfigResult<DbreflectConfig> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, DbreflectConfig::default());
        assert!(config.import.include_tables);
        assert_eq!(config.import.property_names, vec!["MS_Description"]);
    }

    #[test]
    fn reads_import_naming_and_type_map() {
        let config = parse_config(
            r#"
            [import]
            schemas = ["dbo", "sales"]
            exclude = ["dbo.__MigrationHistory"]
            include_scalar_functions = false
            strict = true

            [naming]
            procedure_prefix = "usp_"
            parameter_prefix = "@"

            [[type_map]]
            sql_type = "int"
            target_type = "int"
            nullable_target_type = "int?"

            [[type_map]]
            sql_type = "nvarchar"
            target_type = "string"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.import.schemas,
            Some(vec!["dbo".to_string(), "sales".to_string()])
        );
        assert_eq!(config.import.exclude, vec!["dbo.__MigrationHistory"]);
        assert!(!config.import.include_scalar_functions);
        assert!(config.import.include_views);
        assert!(config.import.strict);
        assert_eq!(config.naming.procedure_prefix, "usp_");
        assert_eq!(config.naming.procedure_suffix, "");
        assert_eq!(config.type_map.len(), 2);
        assert_eq!(config.type_map[0].nullable_target_type.as_deref(), Some("int?"));
        assert_eq!(config.type_map[1].nullable_target_type, None);
    }

    #[test]
    fn unknown_option_types_are_rejected() {
        let err = parse_config("[import]\nstrict = \"yes\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlDecode(_)));
    }
}
