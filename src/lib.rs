//! Grab/release decisions for a tracked interactor.
//!
//! This crate defines:
//! - [`GrabInteractor`]: the grab state controller that turns grab requests, control input and
//!   contact events into start/stop gate publishes.
//! - [`CollisionGate`]: the publish points the host's acceptance logic listens to.
//! - [`GrabbedSet`]: the observable set of currently held [`Interactable`]s.
//! - [`VelocitySourceSelector`]: per-query selection of a valid motion source for throws.
//!
//! Everything runs synchronously inside one host update step. Shared state uses
//! `Rc<RefCell<_>>`; callers on several threads must serialize access themselves.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod action;
pub mod collision;
pub mod config;
pub mod error;
pub mod event;
pub mod gate;
pub mod interactor;
pub mod precognition;
pub mod registry;
pub mod spatial;
pub mod velocity;

pub use action::{ActionEvent, BooleanAction, ControlInput};
pub use collision::{
    build_collision_payload, ActiveCollisions, Collider, ColliderHierarchy, ColliderId,
    ColliderMap, CollisionManifold, CollisionRecord, ContactPoint,
};
pub use config::InteractorConfig;
pub use error::GrabError;
pub use event::{Listeners, SubscriptionId};
pub use gate::{CollisionGate, GateKind, GatePayload, SourceAnchor};
pub use interactor::{GrabInteractor, GrabIntent, GrabState};
pub use precognition::PrecognitionGate;
pub use registry::{GrabbedSet, GrabbedSetHandle, SetEvent};
pub use spatial::{Pose, Vector3D};
pub use velocity::{
    FixedVelocitySource, ThrowConfig, ThrowVelocity, VelocitySource, VelocitySourceSelector,
};

/// Identity of a scene object (interactable, attach point, collider owner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an interactable reacts to the grab input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GrabType {
    /// Held only while the control input stays pressed.
    #[default]
    Momentary,
    /// Picked up by one press and dropped by the next.
    Toggle,
}

/// An object that can be grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interactable {
    pub object: ObjectId,
    pub grab_type: GrabType,
}

impl Interactable {
    pub fn new(object: ObjectId, grab_type: GrabType) -> Self {
        Self { object, grab_type }
    }

    pub fn momentary(object: ObjectId) -> Self {
        Self::new(object, GrabType::Momentary)
    }

    pub fn toggle(object: ObjectId) -> Self {
        Self::new(object, GrabType::Toggle)
    }
}
