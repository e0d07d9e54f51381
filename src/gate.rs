//! Start/stop collision gates: publish points carrying the current contact snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collision::ActiveCollisions;
use crate::event::{Listeners, SubscriptionId};
use crate::spatial::Pose;
use crate::velocity::ThrowVelocity;
use crate::ObjectId;

/// Which side of a grab a gate announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateKind {
    Start,
    Stop,
}

impl GateKind {
    /// The action state in which this gate publishes: pressed for start, released for stop.
    pub fn publishes_when(self, pressed: bool) -> bool {
        match self {
            GateKind::Start => pressed,
            GateKind::Stop => !pressed,
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateKind::Start => f.write_str("start"),
            GateKind::Stop => f.write_str("stop"),
        }
    }
}

/// The interactor's attach point every payload is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceAnchor {
    pub object: ObjectId,
    pub pose: Pose,
}

/// What listeners receive on publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatePayload {
    pub kind: GateKind,
    pub source: Option<SourceAnchor>,
    pub active: ActiveCollisions,
    /// Release throw, stamped on stop-gate payloads when a velocity selector is configured.
    pub throw: Option<ThrowVelocity>,
}

pub struct CollisionGate {
    payload: GatePayload,
    listeners: Listeners<GatePayload>,
    publish_count: u64,
}

impl CollisionGate {
    pub fn new(kind: GateKind) -> Self {
        Self {
            payload: GatePayload {
                kind,
                source: None,
                active: ActiveCollisions::default(),
                throw: None,
            },
            listeners: Listeners::new(),
            publish_count: 0,
        }
    }

    pub fn kind(&self) -> GateKind {
        self.payload.kind
    }

    pub fn set_source(&mut self, anchor: SourceAnchor) {
        self.payload.source = Some(anchor);
    }

    /// Replaces the current contact snapshot.
    pub fn set_active_collisions(&mut self, active: ActiveCollisions) {
        self.payload.active = active;
    }

    pub fn clear_active_collisions(&mut self) {
        self.payload.active = ActiveCollisions::default();
    }

    pub fn has_active_collisions(&self) -> bool {
        !self.payload.active.is_empty()
    }

    pub(crate) fn set_throw(&mut self, throw: Option<ThrowVelocity>) {
        self.payload.throw = throw;
    }

    pub fn payload(&self) -> &GatePayload {
        &self.payload
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&GatePayload) + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Emits the current payload to every listener, once. Returns the listener count.
    pub fn publish(&mut self) -> usize {
        self.publish_count += 1;
        debug!(
            gate = %self.payload.kind,
            target = ?self.payload.active.target(),
            collisions = self.payload.active.len(),
            "publishing grab gate"
        );
        self.listeners.emit(&self.payload)
    }

    /// Number of times [`CollisionGate::publish`] has run.
    pub fn publish_count(&self) -> u64 {
        self.publish_count
    }
}

impl fmt::Debug for CollisionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionGate")
            .field("kind", &self.payload.kind)
            .field("collisions", &self.payload.active.len())
            .field("listeners", &self.listeners.len())
            .field("publish_count", &self.publish_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{Collider, ColliderId, CollisionRecord};
    use crate::spatial::Vector3D;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn snapshot(object: u64) -> ActiveCollisions {
        ActiveCollisions::single(CollisionRecord {
            forward_source: ObjectId(object),
            is_trigger: false,
            collision: None,
            collider: Collider {
                id: ColliderId(object),
                owner: ObjectId(object),
                is_trigger: false,
            },
        })
    }

    #[test]
    fn publishes_current_snapshot_with_anchor() {
        let mut gate = CollisionGate::new(GateKind::Start);
        let anchor = SourceAnchor {
            object: ObjectId(99),
            pose: Pose::from_position(Vector3D::splat(1.0)),
        };
        gate.set_source(anchor);
        gate.set_active_collisions(snapshot(3));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        gate.subscribe(move |p: &GatePayload| sink.borrow_mut().push(p.clone()));

        assert_eq!(gate.publish(), 1);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, GateKind::Start);
        assert_eq!(seen[0].source, Some(anchor));
        assert_eq!(seen[0].active.target(), Some(ObjectId(3)));
    }

    #[test]
    fn each_publish_emits_exactly_once() {
        let mut gate = CollisionGate::new(GateKind::Stop);
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        gate.subscribe(move |_| *counter.borrow_mut() += 1);

        gate.publish();
        gate.set_active_collisions(snapshot(1));
        gate.set_active_collisions(snapshot(2));
        gate.publish();

        assert_eq!(*hits.borrow(), 2);
        assert_eq!(gate.publish_count(), 2);
    }

    #[test]
    fn clearing_snapshot_leaves_gate_empty() {
        let mut gate = CollisionGate::new(GateKind::Start);
        gate.set_active_collisions(snapshot(1));
        assert!(gate.has_active_collisions());
        gate.clear_active_collisions();
        assert!(!gate.has_active_collisions());
    }

    #[test]
    fn gate_kind_publish_phase() {
        assert!(GateKind::Start.publishes_when(true));
        assert!(!GateKind::Start.publishes_when(false));
        assert!(GateKind::Stop.publishes_when(false));
        assert!(!GateKind::Stop.publishes_when(true));
    }
}
