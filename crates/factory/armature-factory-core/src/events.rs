//! Semantic events emitted by factory operations.
//!
//! Events queue up on the context until the host drains them, typically once
//! per frame after `advance_time`.

use serde::{Deserialize, Serialize};

use crate::ids::{ArmatureId, AtlasId, MaterialHandle};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FactoryEvent {
    ArmatureBuilt {
        armature: ArmatureId,
        name: String,
        parent: Option<ArmatureId>,
    },
    ArmatureDisposed {
        armature: ArmatureId,
    },
    MaterialGenerated {
        atlas: AtlasId,
        material: MaterialHandle,
        ui_mode: bool,
    },
    /// A dataset's persisted assets changed and should be saved by the host.
    DatasetModified {
        dataset: String,
    },
}
