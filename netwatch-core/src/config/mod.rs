//! Configuration model
//!
//! Declares the monitored targets and global settings. Values arrive here
//! already parsed from TOML; [`MonitorConfig::validate`] enforces the
//! cross-target invariants the type system cannot express.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub mod toml_config;

/// Name under which the internet-monitor target is registered
pub const INTERNET_MONITOR_NAME: &str = "INTERNET";

/// Global runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Seconds between controller ticks; overridable from the CLI
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: f64,

    /// Gates diagnostic logging only, no behavioral effect
    #[serde(default)]
    pub verbose: bool,
}

fn default_check_interval() -> f64 {
    1.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval(),
            verbose: false,
        }
    }
}

/// Per-VPN operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VpnMode {
    /// Connect unless an exclude-IP prefix matches a local address
    Auto,
    /// Keep the tunnel up unconditionally
    Connect,
    /// Keep the tunnel down unconditionally
    Disconnect,
}

/// A plain reachability target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostTarget {
    pub name: String,
    /// Hostname or IP address to ping
    pub address: String,
}

/// The dedicated upstream-connectivity target
///
/// Registered under the fixed name `INTERNET`; VPN controllers use its
/// state as the precondition for connect attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternetTarget {
    pub address: String,
}

/// A VPN-controlled link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VpnTarget {
    pub name: String,

    /// IP prefix assigned to the tunnel interface when connected
    pub assigned_ip: String,

    /// Local-address prefixes on which the VPN must stay down (auto mode)
    #[serde(default)]
    pub exclude_ips: Vec<String>,

    /// Optional in-tunnel liveness target; resolved against configured
    /// hosts by address, otherwise probed privately
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping_ip: Option<String>,

    /// Command line launching the tunnel
    pub connect: String,

    /// Command line tearing the tunnel down
    pub disconnect: String,

    pub mode: VpnMode,
}

/// One monitored target declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TargetConfig {
    Host(HostTarget),
    InternetMonitor(InternetTarget),
    Vpn(VpnTarget),
}

impl TargetConfig {
    /// Name the target registers under
    pub fn name(&self) -> &str {
        match self {
            TargetConfig::Host(host) => &host.name,
            TargetConfig::InternetMonitor(_) => INTERNET_MONITOR_NAME,
            TargetConfig::Vpn(vpn) => &vpn.name,
        }
    }
}

/// A display group of targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub targets: Vec<TargetConfig>,
}

/// Complete monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub settings: Settings,

    pub groups: Vec<GroupConfig>,
}

impl MonitorConfig {
    /// Validate cross-target invariants
    ///
    /// Checks that `(group, name)` keys are unique, that at most one
    /// internet-monitor is declared, and that no required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut internet_monitors = 0usize;
        let mut seen = std::collections::HashSet::new();

        if self.settings.check_interval_secs <= 0.0 {
            return Err(ConfigError::ValidationError {
                message: "check_interval_secs must be positive".to_string(),
            });
        }

        for (group, group_config) in self.groups.iter().enumerate() {
            for target in &group_config.targets {
                let name = target.name();
                if name.is_empty() {
                    return Err(ConfigError::MissingField {
                        field: "name".to_string(),
                    });
                }
                if !seen.insert((group, name.to_string())) {
                    return Err(ConfigError::DuplicateTarget {
                        group,
                        name: name.to_string(),
                    });
                }

                match target {
                    TargetConfig::Host(host) => {
                        if host.address.is_empty() {
                            return Err(ConfigError::MissingField {
                                field: "address".to_string(),
                            });
                        }
                    }
                    TargetConfig::InternetMonitor(internet) => {
                        internet_monitors += 1;
                        if internet_monitors > 1 {
                            return Err(ConfigError::DuplicateInternetMonitor);
                        }
                        if internet.address.is_empty() {
                            return Err(ConfigError::MissingField {
                                field: "address".to_string(),
                            });
                        }
                    }
                    TargetConfig::Vpn(vpn) => {
                        if vpn.assigned_ip.is_empty() {
                            return Err(ConfigError::MissingField {
                                field: "assigned_ip".to_string(),
                            });
                        }
                        if vpn.connect.is_empty() || vpn.disconnect.is_empty() {
                            return Err(ConfigError::MissingField {
                                field: "connect/disconnect".to_string(),
                            });
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
