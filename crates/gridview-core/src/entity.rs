//! Backend entities and the snapshots that carry them.
//!
//! A [`Snapshot`] is the complete set of entities reported by one poll. Entities are plain data:
//! the reconciler never mutates them, it only decides which graph node each one belongs to.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Running,
    Stopped,
    Error,
    Initializing,
}

impl EntityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityStatus::Running => "running",
            EntityStatus::Stopped => "stopped",
            EntityStatus::Error => "error",
            EntityStatus::Initializing => "initializing",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Gateway,
    Worker,
    Resource,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Gateway => "gateway",
            EntityKind::Worker => "worker",
            EntityKind::Resource => "resource",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Http,
    Stdio,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayEntity {
    pub name: String,
    pub status: EntityStatus,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerEntity {
    pub name: String,
    pub status: EntityStatus,
    #[serde(default)]
    pub transport: Transport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_count: Option<u32>,
    /// Names of the resources this worker depends on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntity {
    pub name: String,
    pub status: EntityStatus,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Entity {
    Gateway(GatewayEntity),
    Worker(WorkerEntity),
    Resource(ResourceEntity),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Gateway(e) => &e.name,
            Entity::Worker(e) => &e.name,
            Entity::Resource(e) => &e.name,
        }
    }

    pub fn status(&self) -> EntityStatus {
        match self {
            Entity::Gateway(e) => e.status,
            Entity::Worker(e) => e.status,
            Entity::Resource(e) => e.status,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Gateway(_) => EntityKind::Gateway,
            Entity::Worker(_) => EntityKind::Worker,
            Entity::Resource(_) => EntityKind::Resource,
        }
    }

    /// Where the entity is reached: endpoint or container for workers, image for resources.
    pub fn source_display(&self) -> Option<&str> {
        match self {
            Entity::Gateway(_) => None,
            Entity::Worker(w) => w.endpoint.as_deref().or(w.container_id.as_deref()),
            Entity::Resource(r) => Some(r.image.as_str()).filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub entities: Vec<Entity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            fetched_at: None,
        }
    }

    /// Parses and validates a JSON snapshot document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(text).map_err(|e| Error::malformed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Parses and validates a YAML snapshot document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let snapshot: Snapshot =
            serde_yaml::from_str(text).map_err(|e| Error::malformed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Checks that names are non-empty and unique, and that there is at most one gateway.
    pub fn validate(&self) -> Result<()> {
        let mut seen: IndexMap<&str, EntityKind> = IndexMap::new();
        let mut gateways = 0usize;
        for entity in &self.entities {
            let name = entity.name();
            if name.trim().is_empty() {
                return Err(Error::malformed(format!(
                    "{} entity with an empty name",
                    entity.kind()
                )));
            }
            if let Some(prev) = seen.insert(name, entity.kind()) {
                return Err(Error::malformed(format!(
                    "duplicate entity name {name:?} ({prev} and {})",
                    entity.kind()
                )));
            }
            if entity.kind() == EntityKind::Gateway {
                gateways += 1;
            }
        }
        if gateways > 1 {
            return Err(Error::malformed(format!(
                "expected at most one gateway, found {gateways}"
            )));
        }
        Ok(())
    }

    pub fn gateway(&self) -> Option<&GatewayEntity> {
        self.entities.iter().find_map(|e| match e {
            Entity::Gateway(g) => Some(g),
            _ => None,
        })
    }

    pub fn workers(&self) -> impl Iterator<Item = &WorkerEntity> {
        self.entities.iter().filter_map(|e| match e {
            Entity::Worker(w) => Some(w),
            _ => None,
        })
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceEntity> {
        self.entities.iter().filter_map(|e| match e {
            Entity::Resource(r) => Some(r),
            _ => None,
        })
    }

    /// Entities keyed by name, in snapshot order.
    pub fn index(&self) -> IndexMap<&str, &Entity> {
        self.entities.iter().map(|e| (e.name(), e)).collect()
    }
}
