//! Resource declaration file parser.
//!
//! ```toml
//! [agent]
//! default_role = "*"
//!
//! [[resources]]
//! name = "cpus"
//! scalar = 8.0
//!
//! [[resources]]
//! name = "ports"
//! ranges = [[31000, 32000]]
//!
//! [[resources]]
//! name = "disk"
//! role = "db"
//! principal = "dba"
//! scalar = 2048.0
//! disk = { persistence_id = "pg-data", container_path = "/var/lib/pg", mode = "rw" }
//! ```

use std::path::Path;

use anyhow::Context;
use resledger_core::{
    DEFAULT_ROLE, DiskInfo, Persistence, Range, Ranges, ReservationInfo, Resource,
    ResourceErrorKind, Resources, Scalar, Set, Value, Volume, VolumeMode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigResult;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentSection>,
    #[serde(default)]
    pub resources: Vec<ResourceDecl>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentSection {
    /// Role for declarations that do not name one. Defaults to `*`.
    pub default_role: Option<String>,
}

/// One declared resource. Exactly one of `scalar`, `ranges`, `set` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Dynamic reservation principal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranges: Option<Vec<[u64; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub revocable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<DiskDecl>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistence_id: Option<String>,
    /// Presence of a container path declares a volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ModeDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeDecl {
    Ro,
    Rw,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl From<ModeDecl> for VolumeMode {
    fn from(mode: ModeDecl) -> Self {
        match mode {
            ModeDecl::Ro => VolumeMode::Ro,
            ModeDecl::Rw => VolumeMode::Rw,
        }
    }
}

impl From<VolumeMode> for ModeDecl {
    fn from(mode: VolumeMode) -> Self {
        match mode {
            VolumeMode::Ro => ModeDecl::Ro,
            VolumeMode::Rw => ModeDecl::Rw,
        }
    }
}

impl DiskDecl {
    fn to_disk_info(&self) -> DiskInfo {
        DiskInfo {
            persistence: self
                .persistence_id
                .as_ref()
                .map(|id| Persistence { id: id.clone() }),
            volume: self.container_path.as_ref().map(|path| Volume {
                container_path: path.clone(),
                host_path: self.host_path.clone(),
                mode: self.mode.map(VolumeMode::from),
            }),
        }
    }

    fn from_disk_info(disk: &DiskInfo) -> Self {
        let volume = disk.volume.as_ref();
        DiskDecl {
            persistence_id: disk.persistence.as_ref().map(|p| p.id.clone()),
            container_path: volume.map(|v| v.container_path.clone()),
            host_path: volume.and_then(|v| v.host_path.clone()),
            mode: volume.and_then(|v| v.mode).map(ModeDecl::from),
        }
    }
}

impl ResourceDecl {
    /// Build and validate the declared resource. Validation failures carry
    /// the offending resource.
    pub fn to_resource(&self, default_role: &str) -> ConfigResult<Resource> {
        let value = match (self.scalar, &self.ranges, &self.set) {
            (Some(v), None, None) => Value::Scalar(Scalar::new(v)),
            (None, Some(r), None) => Value::Ranges(
                r.iter()
                    .map(|&[begin, end]| Range::new(begin, end))
                    .collect::<Ranges>(),
            ),
            (None, None, Some(s)) => Value::Set(Set::new(s.clone())),
            _ => {
                return Err(ResourceErrorKind::IllegalType
                    .error(format!(
                        "\"{}\" must declare exactly one of scalar, ranges, set",
                        self.name
                    ))
                    .into());
            }
        };

        let resource = Resource {
            name: self.name.clone(),
            role: self
                .role
                .clone()
                .unwrap_or_else(|| default_role.to_string()),
            reservation: self.principal.as_ref().map(ReservationInfo::new),
            disk: self.disk.as_ref().map(DiskDecl::to_disk_info),
            revocable: self.revocable,
            value,
        };
        if let Err(err) = resource.validate() {
            return Err(err.with_resource(resource).into());
        }
        Ok(resource)
    }

    pub fn from_resource(resource: &Resource) -> Self {
        let mut decl = ResourceDecl {
            name: resource.name.clone(),
            role: Some(resource.role.clone()),
            principal: resource.reservation.as_ref().map(|r| r.principal.clone()),
            revocable: resource.revocable,
            disk: resource.disk.as_ref().map(DiskDecl::from_disk_info),
            ..Default::default()
        };
        match &resource.value {
            Value::Scalar(s) => decl.scalar = Some(s.value()),
            Value::Ranges(r) => decl.ranges = Some(r.iter().map(|r| [r.begin, r.end]).collect()),
            Value::Set(s) => decl.set = Some(s.items().to_vec()),
        }
        decl
    }
}

impl LedgerConfig {
    /// Load a declaration file. `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Snapshot a ledger as declarations, one per entry.
    ///
    /// TOML integers are signed 64-bit, so a snapshot holding a range bound
    /// above `i64::MAX` fails in [`LedgerConfig::to_toml_string`]. JSON has
    /// no such limit.
    pub fn from_resources(resources: &Resources) -> Self {
        LedgerConfig {
            agent: None,
            resources: resources.iter().map(ResourceDecl::from_resource).collect(),
        }
    }

    pub fn default_role(&self) -> &str {
        self.agent
            .as_ref()
            .and_then(|a| a.default_role.as_deref())
            .unwrap_or(DEFAULT_ROLE)
    }

    /// Build the ledger. Any invalid declaration fails the whole load;
    /// declarations with the same identity are merged.
    pub fn to_resources(&self) -> ConfigResult<Resources> {
        let default_role = self.default_role();
        let mut ledger = Resources::new();
        for decl in &self.resources {
            let resource = decl.to_resource(default_role)?;
            if resource.is_empty() {
                warn!(resource = %resource, "declared resource is empty, skipping");
                continue;
            }
            if ledger.iter().any(|r| r.addable(&resource)) {
                warn!(
                    name = %resource.name,
                    role = %resource.role,
                    "duplicate declaration merged into existing entry"
                );
            }
            ledger.add1(&resource);
        }
        info!(
            declared = self.resources.len(),
            entries = ledger.len(),
            "loaded resource declarations"
        );
        Ok(ledger)
    }
}

/// Load a declaration file straight into a ledger.
pub fn load_resources(path: &Path) -> anyhow::Result<Resources> {
    let config = LedgerConfig::from_file(path)?;
    let ledger = config
        .to_resources()
        .with_context(|| format!("Invalid resources in {}", path.display()))?;
    Ok(ledger)
}
