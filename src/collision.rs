//! Contact snapshots handed from the collision system to the collision gates.
//!
//! The collision system itself is external. This module only models the data it reports and
//! the single question the interactor asks it: "which collider lives under this object?".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GrabError;
use crate::spatial::Vector3D;
use crate::ObjectId;

/// Identity of a collider owned by the collision system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColliderId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collider {
    pub id: ColliderId,
    /// Object the collider is attached to.
    pub owner: ObjectId,
    pub is_trigger: bool,
}

/// A single contact point reported by the collision system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactPoint {
    /// Contact position in world space.
    pub position: Vector3D,
    /// Penetration depth.
    pub penetration: f32,
}

/// Collision geometry for one contact between two bodies.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollisionManifold {
    pub normal: Vector3D,
    pub contacts: Vec<ContactPoint>,
}

/// One entry of a contact snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionRecord {
    /// The object the contact is forwarded on behalf of (the grab target).
    pub forward_source: ObjectId,
    pub is_trigger: bool,
    pub collision: Option<CollisionManifold>,
    pub collider: Collider,
}

/// The contact snapshot a gate publishes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActiveCollisions {
    pub records: Vec<CollisionRecord>,
}

impl ActiveCollisions {
    pub fn single(record: CollisionRecord) -> Self {
        Self {
            records: vec![record],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Forwarding source of the first record, i.e. the object this snapshot targets.
    pub fn target(&self) -> Option<ObjectId> {
        self.records.first().map(|r| r.forward_source)
    }
}

/// Collider discovery provided by the collision system.
pub trait ColliderHierarchy {
    /// Returns the first collider found on `object` or any of its descendants.
    fn collider_in_children(&self, object: ObjectId) -> Option<Collider>;
}

/// In-memory object hierarchy with attached colliders.
///
/// Lookups search the object itself first, then its children depth-first in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ColliderMap {
    colliders: HashMap<ObjectId, Vec<Collider>>,
    children: HashMap<ObjectId, Vec<ObjectId>>,
}

impl ColliderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach_collider(&mut self, collider: Collider) {
        self.colliders
            .entry(collider.owner)
            .or_default()
            .push(collider);
    }

    pub fn add_child(&mut self, parent: ObjectId, child: ObjectId) {
        self.children.entry(parent).or_default().push(child);
    }
}

impl ColliderHierarchy for ColliderMap {
    fn collider_in_children(&self, object: ObjectId) -> Option<Collider> {
        let mut stack = vec![object];
        while let Some(current) = stack.pop() {
            if let Some(found) = self.colliders.get(&current).and_then(|c| c.first()) {
                return Some(*found);
            }
            if let Some(children) = self.children.get(&current) {
                // Reversed so the first child is visited first.
                stack.extend(children.iter().rev().copied());
            }
        }
        None
    }
}

/// Builds the single-record snapshot for a grab attempt on `forward_source`.
///
/// An explicit `collider` wins; otherwise one is discovered through `hierarchy`. Fails with
/// [`GrabError::MissingCollider`] when neither yields a collider.
pub fn build_collision_payload(
    forward_source: ObjectId,
    collision: Option<CollisionManifold>,
    collider: Option<Collider>,
    hierarchy: &dyn ColliderHierarchy,
) -> Result<ActiveCollisions, GrabError> {
    let collider = match collider {
        Some(c) => c,
        None => hierarchy
            .collider_in_children(forward_source)
            .ok_or(GrabError::MissingCollider {
                object: forward_source,
            })?,
    };

    debug!(
        object = %forward_source,
        collider = collider.id.0,
        is_trigger = collider.is_trigger,
        "built collision payload"
    );

    Ok(ActiveCollisions::single(CollisionRecord {
        forward_source,
        is_trigger: collider.is_trigger,
        collision,
        collider,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collider(id: u64, owner: u64, is_trigger: bool) -> Collider {
        Collider {
            id: ColliderId(id),
            owner: ObjectId(owner),
            is_trigger,
        }
    }

    #[test]
    fn explicit_collider_takes_priority() {
        let mut map = ColliderMap::new();
        map.attach_collider(collider(1, 10, false));

        let explicit = collider(2, 10, true);
        let payload = build_collision_payload(ObjectId(10), None, Some(explicit), &map)
            .expect("explicit collider");

        assert_eq!(payload.len(), 1);
        assert_eq!(payload.records[0].collider, explicit);
        assert!(payload.records[0].is_trigger);
        assert_eq!(payload.target(), Some(ObjectId(10)));
    }

    #[test]
    fn discovers_collider_on_nested_child() {
        let mut map = ColliderMap::new();
        map.add_child(ObjectId(1), ObjectId(2));
        map.add_child(ObjectId(1), ObjectId(3));
        map.add_child(ObjectId(2), ObjectId(4));
        map.attach_collider(collider(40, 4, false));
        map.attach_collider(collider(30, 3, true));

        // Depth-first: 1 -> 2 -> 4 is visited before 3.
        let found = map.collider_in_children(ObjectId(1)).expect("collider");
        assert_eq!(found.id, ColliderId(40));
    }

    #[test]
    fn own_collider_found_before_children() {
        let mut map = ColliderMap::new();
        map.add_child(ObjectId(1), ObjectId(2));
        map.attach_collider(collider(20, 2, false));
        map.attach_collider(collider(10, 1, false));

        assert_eq!(
            map.collider_in_children(ObjectId(1)).map(|c| c.id),
            Some(ColliderId(10))
        );
    }

    #[test]
    fn missing_collider_is_an_error() {
        let mut map = ColliderMap::new();
        map.add_child(ObjectId(1), ObjectId(2));

        let err = build_collision_payload(ObjectId(1), None, None, &map).unwrap_err();
        assert!(matches!(
            err,
            GrabError::MissingCollider { object } if object == ObjectId(1)
        ));
    }

    #[test]
    fn manifold_is_carried_through() {
        let mut map = ColliderMap::new();
        map.attach_collider(collider(1, 5, false));
        let manifold = CollisionManifold {
            normal: Vector3D::new(0.0, 1.0, 0.0),
            contacts: vec![ContactPoint {
                position: Vector3D::new(1.0, 2.0, 3.0),
                penetration: 0.01,
            }],
        };

        let payload =
            build_collision_payload(ObjectId(5), Some(manifold.clone()), None, &map).unwrap();
        assert_eq!(payload.records[0].collision, Some(manifold));
    }
}
