use config::{Config, ConfigError, Environment, File};
use domain::{CounterSpec, TicketLayout};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_kind")]
    pub kind: StorageKind,
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_storage_kind() -> StorageKind {
    StorageKind::Sqlite
}
fn default_storage_path() -> String {
    "data/queue_printer.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: default_storage_kind(),
            path: default_storage_path(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RadioKind {
    /// Bluetooth serial ports exposed by the OS (RFCOMM ttys, SPP COM ports)
    Serial,
    /// Scripted devices, tickets written to a file or kept in memory
    Simulated,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SimulatedDeviceConfig {
    pub address: String,
    pub name: Option<String>,
    #[serde(default)]
    pub bonded: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SimulatedRadioConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub permission_granted: bool,
    #[serde(default)]
    pub devices: Vec<SimulatedDeviceConfig>,
    /// Delay between two discovery events
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,
    /// Append every printed payload to this file
    pub output_path: Option<String>,
}

fn default_true() -> bool {
    true
}
fn default_step_ms() -> u64 {
    200
}

impl Default for SimulatedRadioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            permission_granted: true,
            devices: Vec::new(),
            step_ms: default_step_ms(),
            output_path: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RadioConfig {
    #[serde(default = "default_radio_kind")]
    pub kind: RadioKind,
    #[serde(default = "default_scan_window")]
    pub scan_window_secs: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// List every serial port, not only Bluetooth ones
    #[serde(default)]
    pub include_all_ports: bool,
    #[serde(default)]
    pub simulated: SimulatedRadioConfig,
}

fn default_radio_kind() -> RadioKind {
    RadioKind::Serial
}
fn default_scan_window() -> u64 {
    12
}
fn default_poll_interval() -> u64 {
    1000
}
fn default_baud_rate() -> u32 {
    9600
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            kind: default_radio_kind(),
            scan_window_secs: default_scan_window(),
            poll_interval_ms: default_poll_interval(),
            baud_rate: default_baud_rate(),
            include_all_ports: false,
            simulated: SimulatedRadioConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub send_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_timeout_secs(),
            send_timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentConfig {
    #[serde(default = "CounterSpec::defaults")]
    pub counters: Vec<CounterSpec>,
    #[serde(default)]
    pub ticket: TicketLayout,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub radio: RadioConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            counters: CounterSpec::defaults(),
            ticket: TicketLayout::default(),
            storage: StorageConfig::default(),
            radio: RadioConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl AgentConfig {
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Local config file, e.g. config/default.toml
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            // Per-environment overrides, e.g. config/stall.toml with RUN_MODE=stall
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // Environment variables (e.g. QUEUE__STORAGE__PATH=/var/lib/queue.db)
            .add_source(Environment::with_prefix("QUEUE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
