//! The grab state controller.
//!
//! [`GrabInteractor`] owns the grab action, the precognition window and both collision gates.
//! It decides *when* a start or stop gate is published; whether a grab is actually accepted
//! is decided by whoever listens to those gates, and shows up in the shared
//! [`GrabbedSet`](crate::registry::GrabbedSet) one publish later.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::action::{BooleanAction, ControlInput};
use crate::collision::{
    build_collision_payload, ActiveCollisions, Collider, ColliderHierarchy, CollisionManifold,
};
use crate::config::InteractorConfig;
use crate::error::GrabError;
use crate::gate::{CollisionGate, GateKind, SourceAnchor};
use crate::precognition::PrecognitionGate;
use crate::registry::GrabbedSetHandle;
use crate::velocity::{ThrowVelocity, VelocitySourceSelector};
use crate::{GrabType, Interactable, ObjectId};

/// Holding state from this interactor's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrabState {
    Idle,
    Holding,
}

/// One grab attempt. Built per call, never retained.
#[derive(Debug, Clone, PartialEq)]
pub struct GrabIntent {
    pub target: Interactable,
    pub collision: Option<CollisionManifold>,
    pub collider: Option<Collider>,
}

impl GrabIntent {
    pub fn new(target: Interactable) -> Self {
        Self {
            target,
            collision: None,
            collider: None,
        }
    }
}

pub struct GrabInteractor {
    config: InteractorConfig,
    action: BooleanAction,
    precognition: PrecognitionGate,
    start_gate: CollisionGate,
    stop_gate: CollisionGate,
    grabbed: GrabbedSetHandle,
    colliders: Rc<dyn ColliderHierarchy>,
    velocity: Option<VelocitySourceSelector>,
    /// Contact currently reported by the collision system.
    touching: Option<ActiveCollisions>,
    /// Last value read from the bound control input.
    last_input: bool,
}

impl GrabInteractor {
    pub fn new(grabbed: GrabbedSetHandle, colliders: Rc<dyn ColliderHierarchy>) -> Self {
        Self::with_config(InteractorConfig::default(), grabbed, colliders)
    }

    pub fn with_config(
        config: InteractorConfig,
        grabbed: GrabbedSetHandle,
        colliders: Rc<dyn ColliderHierarchy>,
    ) -> Self {
        let mut precognition = PrecognitionGate::new(config.min_precognition);
        precognition.arm(config.grab_precognition);

        Self {
            config,
            action: BooleanAction::new(),
            precognition,
            start_gate: CollisionGate::new(GateKind::Start),
            stop_gate: CollisionGate::new(GateKind::Stop),
            grabbed,
            colliders,
            velocity: None,
            touching: None,
            last_input: false,
        }
    }

    /// Builds an interactor from a JSON settings document.
    pub fn from_json_config(
        raw: &str,
        grabbed: GrabbedSetHandle,
        colliders: Rc<dyn ColliderHierarchy>,
    ) -> Result<Self, GrabError> {
        let config = InteractorConfig::from_json_str(raw)?;
        Ok(Self::with_config(config, grabbed, colliders))
    }

    /// Makes `source` the only control feeding the grab action. `None` is ignored.
    pub fn bind_grab_input(&mut self, source: Option<Rc<dyn ControlInput>>) {
        self.action.bind(source);
    }

    /// Installs the velocity selector used for release throws.
    pub fn set_velocity_selector(&mut self, selector: Option<VelocitySourceSelector>) {
        self.velocity = selector;
    }

    /// Anchors both gates' payloads to the interactor's attach point.
    pub fn configure_publishers(&mut self, attach_point: SourceAnchor) {
        self.start_gate.set_source(attach_point);
        self.stop_gate.set_source(attach_point);
        debug!(attach_point = %attach_point.object, "grab publishers anchored");
    }

    /// Re-arms the precognition window; values under the floor are clamped.
    pub fn configure_precognition(&mut self, duration: f32) {
        self.precognition.arm(duration);
        self.config.grab_precognition = self.precognition.start_time();
    }

    /// Attempts to grab `interactable`. A `None` target is ignored.
    ///
    /// Whatever is currently held is released first, so a grab never stacks on an
    /// unreleased one.
    pub fn grab(
        &mut self,
        interactable: Option<Interactable>,
        collision: Option<CollisionManifold>,
        collider: Option<Collider>,
    ) -> Result<(), GrabError> {
        let Some(target) = interactable else {
            debug!("grab without a target ignored");
            return Ok(());
        };
        self.grab_intent(GrabIntent {
            target,
            collision,
            collider,
        })
    }

    #[instrument(level = "debug", skip_all, fields(target = %intent.target.object))]
    pub fn grab_intent(&mut self, intent: GrabIntent) -> Result<(), GrabError> {
        // Build before releasing anything so a failed attempt leaves no trace.
        let active = build_collision_payload(
            intent.target.object,
            intent.collision,
            intent.collider,
            self.colliders.as_ref(),
        )?;

        self.ungrab();
        self.load_gates(active);
        self.process_grab_action(Some(GateKind::Start), true);
        if intent.target.grab_type == GrabType::Toggle {
            self.process_grab_action(Some(GateKind::Start), false);
        }
        debug!(grab_type = ?intent.target.grab_type, "grab requested");
        Ok(())
    }

    /// Releases the first held object. Does nothing when nothing is held.
    #[instrument(level = "debug", skip_all)]
    pub fn ungrab(&mut self) {
        let Some(held) = self.first_grabbed() else {
            debug!("nothing grabbed, ungrab ignored");
            return;
        };

        self.retarget_gate(GateKind::Stop, held.object);
        if held.grab_type == GrabType::Toggle {
            // Toggle holds are switched off by a press before the release is announced.
            self.retarget_gate(GateKind::Start, held.object);
            self.process_grab_action(Some(GateKind::Start), true);
        }
        self.process_grab_action(Some(GateKind::Stop), false);
        debug!(object = %held.object, "ungrab requested");
    }

    /// Records contact with `interactable` reported by the collision system.
    ///
    /// If the grab action is already pressed, nothing is held and the precognition window is
    /// still open, the contact completes the anticipated grab.
    pub fn touch(
        &mut self,
        interactable: Option<Interactable>,
        collision: Option<CollisionManifold>,
        collider: Option<Collider>,
    ) -> Result<(), GrabError> {
        let Some(target) = interactable else {
            return Ok(());
        };
        let active =
            build_collision_payload(target.object, collision, collider, self.colliders.as_ref())?;
        self.touching = Some(active.clone());

        if self.action.value() && self.precognition.is_open() && !self.is_holding() {
            debug!(object = %target.object, "contact inside precognition window");
            self.load_gates(active);
            self.process_grab_action(Some(GateKind::Start), true);
        }
        Ok(())
    }

    /// Forgets the current contact.
    pub fn untouch(&mut self) {
        self.touching = None;
    }

    /// One host frame: advances the precognition window and samples the bound control input.
    ///
    /// Only a change in the sampled input reaches the action, so a grab made through
    /// [`grab`](Self::grab) is not undone by an idle, unpressed control.
    pub fn update(&mut self, delta: f32) {
        self.precognition.tick(delta);
        let Some(pressed) = self.action.sample_source() else {
            return;
        };
        if pressed != self.last_input {
            self.last_input = pressed;
            self.process_input(pressed);
        }
    }

    /// Feeds a control edge into the grab action, as the bound input would.
    pub fn process_input(&mut self, pressed: bool) {
        if pressed == self.action.value() {
            return;
        }

        let held = self.first_grabbed();
        if pressed {
            match (held, self.touching.clone()) {
                (Some(h), _) if h.grab_type == GrabType::Toggle => self.ungrab(),
                (_, Some(active)) => {
                    self.load_gates(active);
                    self.process_grab_action(Some(GateKind::Start), true);
                }
                (_, None) => {
                    // No contact yet; a touch inside the window will finish the grab.
                    self.process_grab_action(None, true);
                    if self.action.value() {
                        self.precognition.restart();
                    }
                }
            }
        } else {
            match held {
                Some(h) if h.grab_type == GrabType::Momentary => {
                    self.retarget_gate(GateKind::Stop, h.object);
                    self.process_grab_action(Some(GateKind::Stop), false);
                }
                _ => self.process_grab_action(None, false),
            }
        }
    }

    /// Delivers `desired` to the action and publishes `gate` if the action ended up in that
    /// gate's phase. `None` delivers without publishing. The precognition countdown is paused
    /// for the duration.
    fn process_grab_action(&mut self, gate: Option<GateKind>, desired: bool) {
        self.precognition.disable();
        if self.action.value() != desired {
            self.action.receive(desired);
        }
        // Re-read: a filter may have vetoed or rewritten the value.
        if let Some(kind) = gate.filter(|k| k.publishes_when(self.action.value())) {
            self.publish(kind);
        }
        self.precognition.enable();
    }

    fn publish(&mut self, kind: GateKind) {
        match kind {
            GateKind::Start => {
                self.start_gate.publish();
            }
            GateKind::Stop => {
                let throw = self.release_velocity();
                self.stop_gate.set_throw(throw);
                self.stop_gate.publish();
            }
        }
    }

    fn load_gates(&mut self, active: ActiveCollisions) {
        self.stop_gate.set_active_collisions(active.clone());
        self.start_gate.set_active_collisions(active);
    }

    /// Points the `kind` gate at `object` if it currently targets something else.
    fn retarget_gate(&mut self, kind: GateKind, object: ObjectId) {
        let gate = match kind {
            GateKind::Start => &mut self.start_gate,
            GateKind::Stop => &mut self.stop_gate,
        };
        if gate.payload().active.target() == Some(object) {
            return;
        }
        match build_collision_payload(object, None, None, self.colliders.as_ref()) {
            Ok(active) => gate.set_active_collisions(active),
            Err(err) => debug!(%err, gate = %kind, "keeping previous snapshot"),
        }
    }

    fn first_grabbed(&self) -> Option<Interactable> {
        self.grabbed.borrow().first().copied()
    }

    /// Throw velocities for a release right now, if a selector is configured.
    pub fn release_velocity(&self) -> Option<ThrowVelocity> {
        self.velocity
            .as_ref()
            .map(|selector| ThrowVelocity::sample(selector, &self.config.throw))
    }

    pub fn is_holding(&self) -> bool {
        !self.grabbed.borrow().is_empty()
    }

    pub fn state(&self) -> GrabState {
        if self.is_holding() {
            GrabState::Holding
        } else {
            GrabState::Idle
        }
    }

    pub fn grabbed_objects(&self) -> Vec<Interactable> {
        self.grabbed.borrow().iter().copied().collect()
    }

    pub fn config(&self) -> &InteractorConfig {
        &self.config
    }

    pub fn action(&self) -> &BooleanAction {
        &self.action
    }

    /// Mutable access for subscribing listeners or installing an input filter.
    pub fn action_mut(&mut self) -> &mut BooleanAction {
        &mut self.action
    }

    pub fn precognition(&self) -> &PrecognitionGate {
        &self.precognition
    }

    pub fn start_gate(&self) -> &CollisionGate {
        &self.start_gate
    }

    pub fn start_gate_mut(&mut self) -> &mut CollisionGate {
        &mut self.start_gate
    }

    pub fn stop_gate(&self) -> &CollisionGate {
        &self.stop_gate
    }

    pub fn stop_gate_mut(&mut self) -> &mut CollisionGate {
        &mut self.stop_gate
    }

    pub fn velocity_selector(&self) -> Option<&VelocitySourceSelector> {
        self.velocity.as_ref()
    }
}

impl fmt::Debug for GrabInteractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrabInteractor")
            .field("config", &self.config)
            .field("action", &self.action)
            .field("precognition", &self.precognition)
            .field("start_gate", &self.start_gate)
            .field("stop_gate", &self.stop_gate)
            .field("grabbed", &self.grabbed.borrow().len())
            .field("touching", &self.touching.as_ref().and_then(|a| a.target()))
            .finish()
    }
}
