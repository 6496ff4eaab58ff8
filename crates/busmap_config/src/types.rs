//! Policy types deserialized from `busmap.toml`.
//!
//! Every section is optional; a missing section or field takes the value the
//! stock SoC flow uses (three buses, two clock profiles, DDR/HBUS clock owners).

use serde::Deserialize;
use std::collections::BTreeMap;

/// The top-level policy parsed from `busmap.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusmapConfig {
    /// The system-level table and the cores it may select.
    #[serde(default)]
    pub system: SystemConfig,
    /// Bus tables keyed by bus name (e.g. "MBUS", "PBUS").
    #[serde(default = "default_buses")]
    pub buses: BTreeMap<String, BusConfig>,
    /// Named clock profiles (e.g. "embedded", "hpc").
    #[serde(default = "default_profiles")]
    pub profiles: BTreeMap<String, ProfileConfig>,
    /// Clock-domain classes shared by every profile.
    #[serde(default)]
    pub clocks: ClockConfig,
    /// Address-map naming rules.
    #[serde(default)]
    pub map: MapConfig,
}

impl Default for BusmapConfig {
    fn default() -> Self {
        Self {
            system: SystemConfig::default(),
            buses: default_buses(),
            profiles: default_profiles(),
            clocks: ClockConfig::default(),
            map: MapConfig::default(),
        }
    }
}

/// The `[system]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    /// Record name given to the system table.
    pub name: String,
    /// File name of the system table.
    pub table: String,
    /// Values `CORE_SELECTOR` may take.
    pub supported_cores: Vec<String>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: "SYS".to_string(),
            table: "config_system.csv".to_string(),
            supported_cores: [
                "CORE_PICORV32",
                "CORE_CV32E40P",
                "CORE_IBEX",
                "CORE_MICROBLAZEV_32",
                "CORE_MICROBLAZEV_64",
                "CORE_CV64A6",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// A `[buses.<NAME>]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusConfig {
    /// File name of the bus table.
    pub table: String,
    /// Whether the bus carries `MAIN_CLOCK_DOMAIN` and `RANGE_CLOCK_DOMAINS`.
    #[serde(default)]
    pub clock_map: bool,
    /// Whether the bus also maps back into its parent, exempting it from containment.
    #[serde(default)]
    pub loopback: bool,
}

impl BusConfig {
    fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            clock_map: false,
            loopback: false,
        }
    }
}

fn default_buses() -> BTreeMap<String, BusConfig> {
    let mut buses = BTreeMap::new();
    buses.insert(
        "MBUS".to_string(),
        BusConfig {
            clock_map: true,
            ..BusConfig::new("config_main_bus.csv")
        },
    );
    buses.insert(
        "PBUS".to_string(),
        BusConfig::new("config_peripheral_bus.csv"),
    );
    buses.insert(
        "HBUS".to_string(),
        BusConfig {
            loopback: true,
            ..BusConfig::new("config_highperformance_bus.csv")
        },
    );
    buses
}

/// A `[profiles.<name>]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Supported clock frequencies as strings (e.g. `"100MHz"`), parsed on resolution.
    pub frequencies: Vec<String>,
}

fn profile(frequencies: &[&str]) -> ProfileConfig {
    ProfileConfig {
        frequencies: frequencies.iter().map(|s| s.to_string()).collect(),
    }
}

fn default_profiles() -> BTreeMap<String, ProfileConfig> {
    let mut profiles = BTreeMap::new();
    profiles.insert(
        "embedded".to_string(),
        profile(&["10MHz", "20MHz", "50MHz", "100MHz"]),
    );
    profiles.insert(
        "hpc".to_string(),
        profile(&["10MHz", "20MHz", "50MHz", "100MHz", "250MHz"]),
    );
    profiles
}

/// The `[clocks]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClockConfig {
    /// Range-name prefixes of devices that must run on the main clock.
    pub main_domain_devices: Vec<String>,
    /// Clock owners keyed by range-name prefix, with their fixed frequencies.
    ///
    /// Declaring the table replaces the DDR/HBUS defaults, so a policy that
    /// adds an accelerator lists those two again.
    pub exempt: BTreeMap<String, ExemptClock>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        let mut exempt = BTreeMap::new();
        exempt.insert(
            "DDR".to_string(),
            ExemptClock {
                frequencies: vec!["300MHz".to_string()],
            },
        );
        exempt.insert(
            "HBUS".to_string(),
            ExemptClock {
                frequencies: vec!["300MHz".to_string(), "322MHz".to_string()],
            },
        );
        Self {
            main_domain_devices: vec![
                "BRAM".to_string(),
                "DM_mem".to_string(),
                "PLIC".to_string(),
            ],
            exempt,
        }
    }
}

/// A `[clocks.exempt.<PREFIX>]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExemptClock {
    /// The frequencies this clock owner may run at.
    pub frequencies: Vec<String>,
}

/// The `[map]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// Range-name prefixes that may appear at most once per bus.
    pub unique_prefixes: Vec<String>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            unique_prefixes: vec!["BRAM".to_string()],
        }
    }
}
