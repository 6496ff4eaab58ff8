//! Policy file loading and validation.

use crate::error::ConfigError;
use crate::types::BusmapConfig;
use busmap_common::Frequency;
use std::collections::BTreeSet;
use std::path::Path;

/// Loads and validates a `busmap.toml` policy from `path`.
pub fn load_config(path: &Path) -> Result<BusmapConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    log::debug!("loaded policy from {}", path.display());
    load_config_from_str(&content)
}

/// Parses and validates a `busmap.toml` policy from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<BusmapConfig, ConfigError> {
    let config: BusmapConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Returns the policy used when no `busmap.toml` is found.
///
/// Only DDR and HBUS own fixed clocks here. Accelerators are named per design,
/// so their ranges must be declared under `[clocks.exempt.<PREFIX>]`; without
/// an entry they are held to the profile's frequency set.
pub fn builtin_config() -> BusmapConfig {
    BusmapConfig::default()
}

/// Validates that names are present, table bindings are unambiguous and every
/// frequency string parses.
fn validate_config(config: &BusmapConfig) -> Result<(), ConfigError> {
    if config.system.name.is_empty() {
        return Err(ConfigError::MissingField("system.name".to_string()));
    }
    if config.system.table.is_empty() {
        return Err(ConfigError::MissingField("system.table".to_string()));
    }
    if config.profiles.is_empty() {
        return Err(ConfigError::MissingField("profiles".to_string()));
    }

    let mut tables = BTreeSet::new();
    tables.insert(config.system.table.as_str());
    for (name, bus) in &config.buses {
        if name == &config.system.name {
            return Err(ConfigError::ValidationError(format!(
                "bus '{name}' has the same name as the system table"
            )));
        }
        if bus.table.is_empty() {
            return Err(ConfigError::MissingField(format!("buses.{name}.table")));
        }
        if !tables.insert(bus.table.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "table '{}' is bound more than once",
                bus.table
            )));
        }
    }

    for (name, profile) in &config.profiles {
        if profile.frequencies.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{name}' lists no frequencies"
            )));
        }
        check_frequencies(&format!("profiles.{name}"), &profile.frequencies)?;
    }
    for (prefix, exempt) in &config.clocks.exempt {
        check_frequencies(&format!("clocks.exempt.{prefix}"), &exempt.frequencies)?;
    }
    Ok(())
}

fn check_frequencies(section: &str, frequencies: &[String]) -> Result<(), ConfigError> {
    for freq in frequencies {
        freq.parse::<Frequency>().map_err(|e| {
            ConfigError::ValidationError(format!("{section}: {e}"))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.system.name, "SYS");
        assert_eq!(config.buses.len(), 3);
        assert!(config.profiles.contains_key("embedded"));
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[system]
name = "SOC"
table = "system.csv"
supported_cores = ["CORE_IBEX"]

[buses.MBUS]
table = "main.csv"
clock_map = true

[buses.XBUS]
table = "accel.csv"
loopback = true

[profiles.lab]
frequencies = ["25MHz", "100MHz"]

[clocks]
main_domain_devices = ["BRAM", "PLIC"]

[clocks.exempt.DDR]
frequencies = ["333MHz"]

[map]
unique_prefixes = ["BRAM", "ROM"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.system.name, "SOC");
        assert_eq!(config.system.supported_cores, vec!["CORE_IBEX"]);
        assert_eq!(config.buses.len(), 2);
        assert!(config.buses["XBUS"].loopback);
        assert!(!config.buses["XBUS"].clock_map);
        assert_eq!(config.profiles.len(), 1);
        assert_eq!(config.clocks.exempt.len(), 1);
        assert_eq!(config.map.unique_prefixes.len(), 2);
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn unknown_section_errors() {
        let err = load_config_from_str("[generator]\nlinker = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn empty_system_name_errors() {
        let err = load_config_from_str("[system]\nname = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn duplicate_table_binding_errors() {
        let toml = r#"
[buses.MBUS]
table = "bus.csv"

[buses.PBUS]
table = "bus.csv"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn bus_named_like_system_errors() {
        let toml = r#"
[buses.SYS]
table = "bus.csv"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn bad_frequency_errors() {
        let toml = r#"
[profiles.embedded]
frequencies = ["fast"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        match err {
            ConfigError::ValidationError(msg) => assert!(msg.contains("profiles.embedded")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_profile_errors() {
        let toml = r#"
[profiles.embedded]
frequencies = []
"#;
        assert!(load_config_from_str(toml).is_err());
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("busmap.toml");
        std::fs::write(&path, "[map]\nunique_prefixes = []\n").unwrap();
        let config = load_config(&path).unwrap();
        assert!(config.map.unique_prefixes.is_empty());
    }

    #[test]
    fn io_error_from_missing_file() {
        let err = load_config(Path::new("/nonexistent/busmap.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
