//! Node box sizes by entity kind.

use crate::entity::EntityKind;
use crate::geom::BoxSize;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GATEWAY_SIZE: BoxSize = BoxSize::new(288.0, 168.0);
pub const DEFAULT_WORKER_SIZE: BoxSize = BoxSize::new(256.0, 140.0);
pub const DEFAULT_RESOURCE_SIZE: BoxSize = BoxSize::new(256.0, 140.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSizes {
    pub gateway: BoxSize,
    pub worker: BoxSize,
    pub resource: BoxSize,
}

impl Default for NodeSizes {
    fn default() -> Self {
        Self {
            gateway: DEFAULT_GATEWAY_SIZE,
            worker: DEFAULT_WORKER_SIZE,
            resource: DEFAULT_RESOURCE_SIZE,
        }
    }
}

impl NodeSizes {
    pub fn for_kind(&self, kind: EntityKind) -> BoxSize {
        match kind {
            EntityKind::Gateway => self.gateway,
            EntityKind::Worker => self.worker,
            EntityKind::Resource => self.resource,
        }
    }
}
