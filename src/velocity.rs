//! Picks a motion-sampling source per query and derives the release throw.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::spatial::Vector3D;

/// A motion-sampling strategy (hardware-reported, derived from pose history, ...).
pub trait VelocitySource {
    /// Whether the source currently has valid data.
    fn is_active(&self) -> bool;
    fn velocity(&self) -> Vector3D;
    fn angular_velocity(&self) -> Vector3D;
}

/// Ordered, non-owning list of sources; list order is priority order.
///
/// Each query rescans the list and takes the first active source, so a higher-priority
/// source that is momentarily invalid yields to the next one without reordering anything.
#[derive(Default)]
pub struct VelocitySourceSelector {
    sources: Vec<Rc<dyn VelocitySource>>,
    last_active: Cell<Option<usize>>,
}

impl VelocitySourceSelector {
    pub fn new(sources: Vec<Rc<dyn VelocitySource>>) -> Self {
        Self {
            sources,
            last_active: Cell::new(None),
        }
    }

    pub fn push(&mut self, source: Rc<dyn VelocitySource>) {
        self.sources.push(source);
    }

    pub fn clear(&mut self) {
        self.sources.clear();
        self.last_active.set(None);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Linear velocity of the first active source, or zero when none is active.
    pub fn velocity(&self) -> Vector3D {
        self.select()
            .map(|s| s.velocity())
            .unwrap_or_else(Vector3D::zeros)
    }

    /// Angular velocity of the first active source, or zero when none is active.
    pub fn angular_velocity(&self) -> Vector3D {
        self.select()
            .map(|s| s.angular_velocity())
            .unwrap_or_else(Vector3D::zeros)
    }

    /// The source chosen by the most recent [`velocity`](Self::velocity) or
    /// [`angular_velocity`](Self::angular_velocity) call.
    pub fn active_source(&self) -> Option<Rc<dyn VelocitySource>> {
        self.last_active
            .get()
            .and_then(|i| self.sources.get(i))
            .cloned()
    }

    /// Position of [`active_source`](Self::active_source) in the list.
    pub fn active_index(&self) -> Option<usize> {
        self.last_active.get()
    }

    fn select(&self) -> Option<&Rc<dyn VelocitySource>> {
        let found = self.sources.iter().position(|s| s.is_active());
        trace!(index = ?found, candidates = self.sources.len(), "velocity source selected");
        self.last_active.set(found);
        found.map(|i| &self.sources[i])
    }
}

impl fmt::Debug for VelocitySourceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VelocitySourceSelector")
            .field("sources", &self.sources.len())
            .field("last_active", &self.last_active.get())
            .finish()
    }
}

/// A source whose readings are pushed in by the host each frame.
#[derive(Debug, Default)]
pub struct FixedVelocitySource {
    active: Cell<bool>,
    velocity: Cell<Vector3D>,
    angular_velocity: Cell<Vector3D>,
}

impl FixedVelocitySource {
    pub fn new(active: bool, velocity: Vector3D, angular_velocity: Vector3D) -> Self {
        Self {
            active: Cell::new(active),
            velocity: Cell::new(velocity),
            angular_velocity: Cell::new(angular_velocity),
        }
    }

    pub fn set_active(&self, active: bool) {
        self.active.set(active);
    }

    pub fn set_velocity(&self, velocity: Vector3D) {
        self.velocity.set(velocity);
    }

    pub fn set_angular_velocity(&self, angular_velocity: Vector3D) {
        self.angular_velocity.set(angular_velocity);
    }
}

impl VelocitySource for FixedVelocitySource {
    fn is_active(&self) -> bool {
        self.active.get()
    }

    fn velocity(&self) -> Vector3D {
        self.velocity.get()
    }

    fn angular_velocity(&self) -> Vector3D {
        self.angular_velocity.get()
    }
}

/// Per-axis multipliers applied to the sampled velocities on release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrowConfig {
    pub linear_multiplier: [f32; 3],
    pub angular_multiplier: [f32; 3],
}

impl Default for ThrowConfig {
    fn default() -> Self {
        Self {
            linear_multiplier: [1.0; 3],
            angular_multiplier: [1.0; 3],
        }
    }
}

impl ThrowConfig {
    pub fn is_finite(&self) -> bool {
        self.linear_multiplier
            .iter()
            .chain(self.angular_multiplier.iter())
            .all(|m| m.is_finite())
    }
}

/// Velocities handed to the released object.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThrowVelocity {
    pub linear: Vector3D,
    pub angular: Vector3D,
}

impl ThrowVelocity {
    pub fn sample(selector: &VelocitySourceSelector, config: &ThrowConfig) -> Self {
        Self {
            linear: selector
                .velocity()
                .component_mul(&Vector3D::from(config.linear_multiplier)),
            angular: selector
                .angular_velocity()
                .component_mul(&Vector3D::from(config.angular_multiplier)),
        }
    }
}
