//! Profile resolution: merging the global policy sections with one clock profile.

use crate::error::ConfigError;
use crate::types::BusmapConfig;
use busmap_common::Frequency;
use std::collections::{BTreeMap, BTreeSet};

/// Per-bus flags consumed by the validators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusPolicy {
    /// File name of the bus table.
    pub table: String,
    /// Whether the bus carries the main and per-range clock domains.
    pub clock_map: bool,
    /// Whether the bus is exempt from parent-window containment.
    pub loopback: bool,
}

/// The record identity a table file name binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBinding {
    /// Record name ("MBUS", "SYS", ...).
    pub name: String,
    /// `true` for the system table, `false` for a bus table.
    pub system: bool,
}

/// A fully resolved policy: global sections plus the selected clock profile.
///
/// Frequencies are parsed here, so consumers compare [`Frequency`] values
/// rather than strings.
#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    /// The selected profile name.
    pub profile: String,
    /// Record name of the system table.
    pub system_name: String,
    /// File name of the system table.
    pub system_table: String,
    /// Values `CORE_SELECTOR` may take.
    pub supported_cores: BTreeSet<String>,
    /// The profile's supported clock frequencies.
    pub frequencies: BTreeSet<Frequency>,
    /// Clock owners keyed by range-name prefix.
    pub exemptions: BTreeMap<String, BTreeSet<Frequency>>,
    /// Range-name prefixes of devices that must run on the main clock.
    pub main_domain_devices: Vec<String>,
    /// Range-name prefixes allowed at most once per bus.
    pub unique_prefixes: Vec<String>,
    /// Bus flags keyed by bus name.
    pub buses: BTreeMap<String, BusPolicy>,
}

/// Resolves the named clock profile against `config`.
pub fn resolve_profile(
    config: &BusmapConfig,
    profile: &str,
) -> Result<ValidationPolicy, ConfigError> {
    let selected = config
        .profiles
        .get(profile)
        .ok_or_else(|| ConfigError::UnknownProfile(profile.to_string()))?;

    let frequencies = parse_set(&format!("profiles.{profile}"), &selected.frequencies)?;

    let mut exemptions = BTreeMap::new();
    for (prefix, exempt) in &config.clocks.exempt {
        let set = parse_set(&format!("clocks.exempt.{prefix}"), &exempt.frequencies)?;
        exemptions.insert(prefix.clone(), set);
    }

    let buses = config
        .buses
        .iter()
        .map(|(name, bus)| {
            (
                name.clone(),
                BusPolicy {
                    table: bus.table.clone(),
                    clock_map: bus.clock_map,
                    loopback: bus.loopback,
                },
            )
        })
        .collect();

    log::debug!(
        "resolved profile '{profile}' with {} supported frequencies",
        frequencies.len()
    );

    Ok(ValidationPolicy {
        profile: profile.to_string(),
        system_name: config.system.name.clone(),
        system_table: config.system.table.clone(),
        supported_cores: config.system.supported_cores.iter().cloned().collect(),
        frequencies,
        exemptions,
        main_domain_devices: config.clocks.main_domain_devices.clone(),
        unique_prefixes: config.map.unique_prefixes.clone(),
        buses,
    })
}

fn parse_set(section: &str, values: &[String]) -> Result<BTreeSet<Frequency>, ConfigError> {
    values
        .iter()
        .map(|v| {
            v.parse::<Frequency>()
                .map_err(|e| ConfigError::ValidationError(format!("{section}: {e}")))
        })
        .collect()
}

impl ValidationPolicy {
    /// Returns the record identity bound to a table file name.
    pub fn binding_for(&self, file_name: &str) -> Option<TableBinding> {
        if file_name == self.system_table {
            return Some(TableBinding {
                name: self.system_name.clone(),
                system: true,
            });
        }
        self.buses
            .iter()
            .find(|(_, bus)| bus.table == file_name)
            .map(|(name, _)| TableBinding {
                name: name.clone(),
                system: false,
            })
    }

    /// Returns the flags of a bus, if it is declared.
    pub fn bus(&self, name: &str) -> Option<&BusPolicy> {
        self.buses.get(name)
    }

    /// Returns `true` if `bus` is exempt from parent-window containment.
    pub fn is_loopback(&self, bus: &str) -> bool {
        self.bus(bus).is_some_and(|b| b.loopback)
    }

    /// Returns `true` if `bus` carries the main and per-range clock domains.
    pub fn carries_clock_map(&self, bus: &str) -> bool {
        self.bus(bus).is_some_and(|b| b.clock_map)
    }

    /// Returns `true` if `core` is a supported `CORE_SELECTOR` value.
    pub fn supports_core(&self, core: &str) -> bool {
        self.supported_cores.contains(core)
    }

    /// Returns `true` if `freq` belongs to the profile's frequency set.
    pub fn supports_frequency(&self, freq: Frequency) -> bool {
        self.frequencies.contains(&freq)
    }

    /// Returns the clock-owner prefix matching `range_name` and its fixed frequencies.
    ///
    /// The longest matching prefix wins.
    pub fn exemption_for(&self, range_name: &str) -> Option<(&str, &BTreeSet<Frequency>)> {
        self.exemptions
            .iter()
            .filter(|(prefix, _)| range_name.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(prefix, set)| (prefix.as_str(), set))
    }

    /// Returns `true` if `range_name` belongs to the main-clock-domain device class.
    pub fn in_main_domain(&self, range_name: &str) -> bool {
        self.main_domain_devices
            .iter()
            .any(|prefix| range_name.starts_with(prefix.as_str()))
    }

    /// Returns the reserved unique prefix `range_name` starts with, if any.
    pub fn unique_prefix_of(&self, range_name: &str) -> Option<&str> {
        self.unique_prefixes
            .iter()
            .find(|prefix| range_name.starts_with(prefix.as_str()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{builtin_config, load_config_from_str};

    fn embedded() -> ValidationPolicy {
        resolve_profile(&builtin_config(), "embedded").unwrap()
    }

    #[test]
    fn resolve_embedded_frequencies() {
        let policy = embedded();
        assert_eq!(policy.profile, "embedded");
        assert!(policy.supports_frequency(Frequency::from_mhz(100)));
        assert!(!policy.supports_frequency(Frequency::from_mhz(250)));
    }

    #[test]
    fn resolve_hpc_adds_250() {
        let policy = resolve_profile(&builtin_config(), "hpc").unwrap();
        assert!(policy.supports_frequency(Frequency::from_mhz(250)));
    }

    #[test]
    fn unknown_profile_errors() {
        let err = resolve_profile(&builtin_config(), "datacenter").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile(ref p) if p == "datacenter"));
    }

    #[test]
    fn table_bindings() {
        let policy = embedded();
        assert_eq!(
            policy.binding_for("config_main_bus.csv"),
            Some(TableBinding {
                name: "MBUS".to_string(),
                system: false
            })
        );
        assert_eq!(
            policy.binding_for("config_system.csv"),
            Some(TableBinding {
                name: "SYS".to_string(),
                system: true
            })
        );
        assert_eq!(policy.binding_for("config_unknown.csv"), None);
    }

    #[test]
    fn bus_flags() {
        let policy = embedded();
        assert!(policy.is_loopback("HBUS"));
        assert!(!policy.is_loopback("PBUS"));
        assert!(policy.carries_clock_map("MBUS"));
        assert!(!policy.carries_clock_map("PBUS"));
        assert!(!policy.is_loopback("NOBUS"));
    }

    #[test]
    fn clock_classes_match_by_prefix() {
        let policy = embedded();
        let (prefix, freqs) = policy.exemption_for("DDR4CH0").unwrap();
        assert_eq!(prefix, "DDR");
        assert!(freqs.contains(&Frequency::from_mhz(300)));
        assert!(policy.exemption_for("UART").is_none());
        assert!(policy.in_main_domain("BRAM"));
        assert!(policy.in_main_domain("DM_mem"));
        assert!(!policy.in_main_domain("GPIO_out"));
    }

    #[test]
    fn longest_exemption_prefix_wins() {
        let toml = r#"
[clocks.exempt.HBUS]
frequencies = ["300MHz"]

[clocks.exempt.HBUS_CMAC]
frequencies = ["322MHz"]
"#;
        let config = load_config_from_str(toml).unwrap();
        let policy = resolve_profile(&config, "embedded").unwrap();
        assert_eq!(policy.exemption_for("HBUS_CMAC0").unwrap().0, "HBUS_CMAC");
        assert_eq!(policy.exemption_for("HBUS").unwrap().0, "HBUS");
    }

    #[test]
    fn accelerator_needs_declared_exemption() {
        assert!(embedded().exemption_for("HLS_GEMM0").is_none());

        let toml = r#"
[clocks.exempt.DDR]
frequencies = ["300MHz"]

[clocks.exempt.HLS_GEMM]
frequencies = ["250MHz"]
"#;
        let config = load_config_from_str(toml).unwrap();
        let policy = resolve_profile(&config, "embedded").unwrap();
        let (prefix, freqs) = policy.exemption_for("HLS_GEMM0").unwrap();
        assert_eq!(prefix, "HLS_GEMM");
        assert!(freqs.contains(&Frequency::from_mhz(250)));
        assert!(policy.exemption_for("DDR").is_some());
        assert!(policy.exemption_for("HBUS").is_none());
    }

    #[test]
    fn unique_prefix_lookup() {
        let policy = embedded();
        assert_eq!(policy.unique_prefix_of("BRAM_1"), Some("BRAM"));
        assert_eq!(policy.unique_prefix_of("UART"), None);
        assert!(policy.supports_core("CORE_CV64A6"));
        assert!(!policy.supports_core("CORE_ARM"));
    }
}
