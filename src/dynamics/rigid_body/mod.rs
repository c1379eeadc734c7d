//! Rigid bodies and their physical properties.

pub mod mass_properties;

mod physics_material;

pub use mass_properties::MassProperties;
pub use physics_material::{CoefficientCombine, DEFAULT_FRICTION, DEFAULT_RESTITUTION};

use derive_more::{Display, From};
use indexmap::IndexSet;

use crate::{
    PhysicsError,
    collision::broad_phase::NodeId,
    data_structures::pair_key::PairKey,
    dynamics::solver::joints::JointId,
    prelude::*,
};

/// A stable identifier of a [`RigidBody`] in a [`PhysicsWorld`](crate::PhysicsWorld).
#[derive(Clone, Copy, Debug, Display, From, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyId(pub u32);

impl BodyId {
    /// The identifier of a body that has not been registered yet.
    pub const PLACEHOLDER: Self = Self(u32::MAX);

    /// The slot of the body in the world's body storage.
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The type of a [`RigidBody`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum RigidBodyType {
    /// Moved by gravity, forces, contacts and joints.
    #[default]
    Dynamic,
    /// Never moves on its own. Static bodies have infinite mass and inertia.
    Static,
}

/// A non-deformable body with a convex [`Collider`].
///
/// The body's position is its center of mass, because colliders are centered on their
/// centroid. Mass and angular inertia are derived from the collider area and the
/// [density](RigidBody::density) unless overridden.
///
/// Writing the position, rotation, velocity or forces of a body wakes it up.
#[derive(Clone, Debug)]
pub struct RigidBody {
    pub(crate) id: BodyId,
    body_type: RigidBodyType,
    pub(crate) transform: BodyTransform,
    /// The collider as created, before scaling.
    shape: Collider,
    /// `shape` with the transform's scale applied.
    collider: Collider,
    density: Scalar,
    mass_properties: MassProperties,
    pub(crate) linear_velocity: Vector,
    pub(crate) angular_velocity: Scalar,
    force: Vector,
    torque: Scalar,
    friction: Scalar,
    restitution: Scalar,
    pub(crate) manifold_keys: IndexSet<PairKey>,
    pub(crate) joint_ids: IndexSet<JointId>,
    pub(crate) island_id: Option<usize>,
    pub(crate) resting_time: Scalar,
    pub(crate) sleeping: bool,
    pub(crate) proxy: Option<NodeId>,
}

impl RigidBody {
    /// Creates a dynamic body with a density of `1.0` at the origin.
    pub fn new(collider: Collider) -> Self {
        let mass_properties = MassProperties::from_collider(&collider, 1.0);
        Self {
            id: BodyId::PLACEHOLDER,
            body_type: RigidBodyType::Dynamic,
            transform: BodyTransform::IDENTITY,
            collider: collider.clone(),
            shape: collider,
            density: 1.0,
            mass_properties,
            linear_velocity: Vector::ZERO,
            angular_velocity: 0.0,
            force: Vector::ZERO,
            torque: 0.0,
            friction: DEFAULT_FRICTION,
            restitution: DEFAULT_RESTITUTION,
            manifold_keys: IndexSet::new(),
            joint_ids: IndexSet::new(),
            island_id: None,
            resting_time: 0.0,
            sleeping: false,
            proxy: None,
        }
    }

    /// Creates a dynamic circle body.
    pub fn circle(radius: Scalar) -> Result<Self, PhysicsError> {
        Collider::circle(radius).map(Self::new)
    }

    /// Creates a dynamic box body with the given full `width` and `height`.
    pub fn rectangle(width: Scalar, height: Scalar) -> Result<Self, PhysicsError> {
        Collider::rectangle(width, height).map(Self::new)
    }

    /// Creates a dynamic convex polygon body. See [`Collider::polygon`].
    pub fn polygon(vertices: impl Into<Vec<Vector>>) -> Result<Self, PhysicsError> {
        Collider::polygon(vertices).map(Self::new)
    }

    pub fn with_body_type(mut self, body_type: RigidBodyType) -> Self {
        self.body_type = body_type;
        self.update_mass_properties();
        self
    }

    /// Makes the body static.
    pub fn into_static(self) -> Self {
        self.with_body_type(RigidBodyType::Static)
    }

    pub fn with_position(mut self, position: Vector) -> Self {
        self.transform.translation = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Scalar) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector) -> Self {
        self.set_scale(scale);
        self
    }

    pub fn with_linear_velocity(mut self, velocity: Vector) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, velocity: Scalar) -> Self {
        self.angular_velocity = velocity;
        self
    }

    pub fn with_friction(mut self, friction: Scalar) -> Self {
        self.set_friction(friction);
        self
    }

    pub fn with_restitution(mut self, restitution: Scalar) -> Self {
        self.set_restitution(restitution);
        self
    }

    pub fn with_density(mut self, density: Scalar) -> Result<Self, PhysicsError> {
        self.set_density(density)?;
        Ok(self)
    }

    /// The ID assigned at registration, or [`BodyId::PLACEHOLDER`] for an unregistered body.
    #[inline]
    pub fn id(&self) -> BodyId {
        self.id
    }

    #[inline]
    pub fn is_registered(&self) -> bool {
        self.id != BodyId::PLACEHOLDER
    }

    #[inline]
    pub fn body_type(&self) -> RigidBodyType {
        self.body_type
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.body_type == RigidBodyType::Dynamic
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.body_type == RigidBodyType::Static
    }

    #[inline]
    pub fn transform(&self) -> &BodyTransform {
        &self.transform
    }

    #[inline]
    pub fn position(&self) -> Vector {
        self.transform.translation
    }

    /// The rotation in radians.
    #[inline]
    pub fn rotation(&self) -> Scalar {
        self.transform.rotation
    }

    #[inline]
    pub fn scale(&self) -> Vector {
        self.transform.scale
    }

    #[inline]
    pub fn linear_velocity(&self) -> Vector {
        self.linear_velocity
    }

    #[inline]
    pub fn angular_velocity(&self) -> Scalar {
        self.angular_velocity
    }

    /// The force accumulated since the last step.
    #[inline]
    pub fn force(&self) -> Vector {
        self.force
    }

    /// The torque accumulated since the last step.
    #[inline]
    pub fn torque(&self) -> Scalar {
        self.torque
    }

    #[inline]
    pub fn mass(&self) -> Scalar {
        self.mass_properties.mass()
    }

    #[inline]
    pub fn inverse_mass(&self) -> Scalar {
        self.mass_properties.inverse_mass()
    }

    #[inline]
    pub fn inertia(&self) -> Scalar {
        self.mass_properties.inertia()
    }

    #[inline]
    pub fn inverse_inertia(&self) -> Scalar {
        self.mass_properties.inverse_inertia()
    }

    #[inline]
    pub fn mass_properties(&self) -> MassProperties {
        self.mass_properties
    }

    #[inline]
    pub fn density(&self) -> Scalar {
        self.density
    }

    #[inline]
    pub fn friction(&self) -> Scalar {
        self.friction
    }

    #[inline]
    pub fn restitution(&self) -> Scalar {
        self.restitution
    }

    /// The collider with the body's scale applied.
    #[inline]
    pub fn collider(&self) -> &Collider {
        &self.collider
    }

    /// The collider as it was created, before scaling.
    #[inline]
    pub fn shape(&self) -> &Collider {
        &self.shape
    }

    /// The collider placed at the body's transform.
    #[inline]
    pub fn world_shape(&self) -> WorldShape<'_> {
        WorldShape::new(&self.collider, &self.transform)
    }

    /// The tight world-space bounding box of the body.
    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.collider.aabb(&self.transform)
    }

    /// Checks whether the world-space `point` lies inside the body.
    #[inline]
    pub fn contains_point(&self, point: Vector) -> bool {
        self.collider.contains_point(&self.transform, point)
    }

    /// The velocity of the body at a world-space `point`.
    #[inline]
    pub fn velocity_at_point(&self, point: Vector) -> Vector {
        self.linear_velocity + cross_scalar_vector(self.angular_velocity, point - self.position())
    }

    #[inline]
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// How long the body has been moving slower than the rest tolerances, in seconds.
    #[inline]
    pub fn resting_time(&self) -> Scalar {
        self.resting_time
    }

    /// The index of the island the body belonged to in the last step.
    #[inline]
    pub fn island_id(&self) -> Option<usize> {
        self.island_id
    }

    /// The contact manifolds the body took part in during the last step.
    #[inline]
    pub fn manifold_keys(&self) -> &IndexSet<PairKey> {
        &self.manifold_keys
    }

    /// The joints attached to the body.
    #[inline]
    pub fn joint_ids(&self) -> &IndexSet<JointId> {
        &self.joint_ids
    }

    /// Wakes the body up and resets its resting timer.
    pub fn wake_up(&mut self) {
        self.sleeping = false;
        self.resting_time = 0.0;
    }

    pub(crate) fn put_to_sleep(&mut self) {
        self.sleeping = true;
        self.linear_velocity = Vector::ZERO;
        self.angular_velocity = 0.0;
    }

    pub fn set_position(&mut self, position: Vector) {
        self.transform.translation = position;
        self.wake_up();
    }

    pub fn set_rotation(&mut self, rotation: Scalar) {
        self.transform.rotation = rotation;
        self.wake_up();
    }

    pub fn set_linear_velocity(&mut self, velocity: Vector) {
        self.linear_velocity = velocity;
        self.wake_up();
    }

    pub fn set_angular_velocity(&mut self, velocity: Scalar) {
        self.angular_velocity = velocity;
        self.wake_up();
    }

    /// Sets the friction coefficient, clamped to be non-negative.
    pub fn set_friction(&mut self, friction: Scalar) {
        self.friction = friction.max(0.0);
    }

    /// Sets the restitution coefficient, clamped to `[0, 1]`.
    pub fn set_restitution(&mut self, restitution: Scalar) {
        self.restitution = restitution.clamp(0.0, 1.0);
    }

    /// Sets the density and recomputes the mass and angular inertia from the collider.
    pub fn set_density(&mut self, density: Scalar) -> Result<(), PhysicsError> {
        if !(density.is_finite() && density > 0.0) {
            return Err(PhysicsError::InvalidDensity(density));
        }
        self.density = density;
        self.update_mass_properties();
        Ok(())
    }

    /// Overrides the mass. Ignored for static bodies.
    pub fn set_mass(&mut self, mass: Scalar) -> Result<(), PhysicsError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(PhysicsError::InvalidDimension(mass));
        }
        if self.is_dynamic() {
            self.mass_properties = self.mass_properties.with_mass(mass);
        }
        Ok(())
    }

    /// Overrides the angular inertia. Ignored for static bodies.
    pub fn set_inertia(&mut self, inertia: Scalar) -> Result<(), PhysicsError> {
        if !(inertia.is_finite() && inertia > 0.0) {
            return Err(PhysicsError::InvalidDimension(inertia));
        }
        if self.is_dynamic() {
            self.mass_properties = self.mass_properties.with_inertia(inertia);
        }
        Ok(())
    }

    /// Rescales the collider and recomputes the mass properties.
    pub fn set_scale(&mut self, scale: Vector) {
        self.transform.scale = scale;
        self.collider = self.shape.scaled(scale);
        self.update_mass_properties();
        self.wake_up();
    }

    /// Applies a force at the center of mass. The force is cleared after the next step.
    pub fn apply_force(&mut self, force: Vector) {
        self.force += force;
        self.wake_up();
    }

    /// Applies a force at a world-space `point`, which also produces a torque.
    pub fn apply_force_at_point(&mut self, force: Vector, point: Vector) {
        self.force += force;
        self.torque += cross(point - self.position(), force);
        self.wake_up();
    }

    pub fn apply_torque(&mut self, torque: Scalar) {
        self.torque += torque;
        self.wake_up();
    }

    /// Applies an impulse at a world-space `point`, changing the velocity immediately.
    pub fn apply_linear_impulse(&mut self, impulse: Vector, point: Vector) {
        if !self.is_dynamic() {
            return;
        }
        self.linear_velocity += impulse * self.inverse_mass();
        self.angular_velocity += self.inverse_inertia() * cross(point - self.position(), impulse);
        self.wake_up();
    }

    pub(crate) fn clear_forces(&mut self) {
        self.force = Vector::ZERO;
        self.torque = 0.0;
    }

    fn update_mass_properties(&mut self) {
        self.mass_properties = match self.body_type {
            RigidBodyType::Dynamic => MassProperties::from_collider(&self.collider, self.density),
            RigidBodyType::Static => MassProperties::INFINITE,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mass_from_density_and_area() {
        let body = RigidBody::rectangle(2.0, 3.0)
            .unwrap()
            .with_density(2.0)
            .unwrap();
        assert_relative_eq!(body.mass(), 12.0);
        assert_relative_eq!(body.inertia(), 12.0 * (4.0 + 9.0) / 12.0, epsilon = 1e-4);

        let circle = RigidBody::circle(1.0).unwrap();
        assert_relative_eq!(circle.mass(), PI);
        assert_relative_eq!(circle.inertia(), 0.5 * PI);

        assert_eq!(
            RigidBody::circle(1.0).unwrap().with_density(-1.0).err(),
            Some(PhysicsError::InvalidDensity(-1.0))
        );
    }

    #[test]
    fn static_bodies_have_zero_inverse_mass() {
        let body = RigidBody::rectangle(1.0, 1.0).unwrap().into_static();
        assert!(body.mass().is_infinite());
        assert_eq!(body.inverse_mass(), 0.0);
        assert_eq!(body.inverse_inertia(), 0.0);
    }

    #[test]
    fn scaling_updates_mass() {
        let body = RigidBody::rectangle(1.0, 1.0)
            .unwrap()
            .with_scale(Vector::new(2.0, 3.0));
        assert_relative_eq!(body.mass(), 6.0);
        assert_relative_eq!(body.aabb().max.y, 1.5);
        assert_relative_eq!(body.shape().area(), 1.0);
    }

    #[test]
    fn writes_wake_the_body() {
        let mut body = RigidBody::circle(0.5).unwrap();
        body.put_to_sleep();
        body.resting_time = 3.0;
        assert!(body.is_sleeping());

        body.apply_force(Vector::X);
        assert!(!body.is_sleeping());
        assert_eq!(body.resting_time(), 0.0);

        body.put_to_sleep();
        body.set_linear_velocity(Vector::Y);
        assert!(!body.is_sleeping());
    }

    #[test]
    fn force_at_point_produces_torque() {
        let mut body = RigidBody::circle(1.0).unwrap().with_position(Vector::new(1.0, 0.0));
        body.apply_force_at_point(Vector::Y, Vector::new(2.0, 0.0));
        assert_eq!(body.force(), Vector::Y);
        assert_relative_eq!(body.torque(), 1.0);

        body.clear_forces();
        assert_eq!(body.torque(), 0.0);
    }

    #[test]
    fn restitution_is_clamped() {
        let body = RigidBody::circle(1.0).unwrap().with_restitution(1.5).with_friction(-1.0);
        assert_eq!(body.restitution(), 1.0);
        assert_eq!(body.friction(), 0.0);
    }
}
