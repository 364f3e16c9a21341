/// Scene objects: a textured model placed in the world by a transform
use std::f32::consts::TAU;

use nalgebra::{Matrix4, Unit, Vector3};
use tracing::{debug, info};

use crate::maths;
use crate::model::Model;
use crate::render::{uniforms, ShaderHandle};
use crate::transform::{EulerAngles, Orientation, Transform};

/// Seconds between periodic position logs of an animated prop
const DEBUG_INTERVAL: f32 = 0.2;

/// Something the scene updates and draws once per frame
pub trait SceneObject {
    fn name(&self) -> &str;

    fn transform(&self) -> &Transform;

    /// Advance by `dt` seconds. Only mutates this object.
    fn update(&mut self, dt: f32);

    /// Upload `model` and `MVP`, bind textures and draw the mesh.
    fn draw(&self, shader: ShaderHandle, view: &Matrix4<f32>, projection: &Matrix4<f32>);

    /// Apply held directional keys. Ignored by objects that are not steerable.
    fn process_input(&mut self, _input: &PlayerInput, _dt: f32) {}

    /// Return to the initial state. Ignored by objects without one.
    fn reset(&mut self) {}
}

/// A model, its placement and its tint
#[derive(Debug)]
pub struct Prop {
    name: String,
    model: Model,
    pub transform: Transform,
    pub color: Vector3<f32>,
}

impl Prop {
    pub fn new(name: impl Into<String>, model: Model, transform: Transform) -> Self {
        Self {
            name: name.into(),
            model,
            transform,
            color: Vector3::repeat(1.0),
        }
    }

    pub fn with_color(mut self, color: Vector3<f32>) -> Self {
        self.color = color;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn draw(&self, shader: ShaderHandle, view: &Matrix4<f32>, projection: &Matrix4<f32>) {
        let model_matrix = self.transform.model_matrix();
        let mvp = maths::mvp_matrix(&model_matrix, view, projection);

        let mut rasterizer = self.model.context().borrow_mut();
        rasterizer.set_uniform_mat4(shader, uniforms::MODEL, &model_matrix);
        rasterizer.set_uniform_mat4(shader, uniforms::MVP, &mvp);
        rasterizer.set_uniform_vec3(shader, uniforms::OBJECT_COLOR, &self.color);
        self.model.draw(&mut *rasterizer, shader);
    }
}

/// A prop that never moves (court, rim)
#[derive(Debug)]
pub struct StaticProp {
    prop: Prop,
}

impl StaticProp {
    pub fn new(prop: Prop) -> Self {
        Self { prop }
    }
}

impl SceneObject for StaticProp {
    fn name(&self) -> &str {
        self.prop.name()
    }

    fn transform(&self) -> &Transform {
        &self.prop.transform
    }

    fn update(&mut self, _dt: f32) {}

    fn draw(&self, shader: ShaderHandle, view: &Matrix4<f32>, projection: &Matrix4<f32>) {
        self.prop.draw(shader, view, projection);
    }
}

/// Vertical bounce plus constant spin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceAnimation {
    pub amplitude: f32,
    /// Seconds per full oscillation
    pub period: f32,
    pub spin_axis: Unit<Vector3<f32>>,
    /// Degrees per second
    pub spin_rate: f32,
}

impl Default for BounceAnimation {
    fn default() -> Self {
        Self {
            amplitude: 2.0,
            period: 2.0,
            spin_axis: Vector3::y_axis(),
            spin_rate: 90.0,
        }
    }
}

impl BounceAnimation {
    /// `amplitude * sin(2π t / period)`; zero for a non-positive period.
    pub fn height_at(&self, t: f32) -> f32 {
        if self.period <= 0.0 {
            return 0.0;
        }
        self.amplitude * (TAU * t / self.period).sin()
    }
}

/// A prop that bounces about its initial height while spinning.
///
/// The animation clock belongs to the instance, so two animated props never
/// share timing state.
#[derive(Debug)]
pub struct AnimatedProp {
    prop: Prop,
    animation: BounceAnimation,
    initial: Transform,
    clock: f32,
    height: f32,
    debug_timer: f32,
}

impl AnimatedProp {
    /// Spin is composed on a quaternion, so any Euler orientation is converted.
    pub fn new(mut prop: Prop, animation: BounceAnimation) -> Self {
        prop.transform.orientation = prop.transform.orientation.to_quaternion();
        let initial = prop.transform;
        Self {
            prop,
            animation,
            initial,
            clock: 0.0,
            height: 0.0,
            debug_timer: 0.0,
        }
    }

    pub fn animation(&self) -> &BounceAnimation {
        &self.animation
    }

    /// Seconds since creation or the last reset
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Current offset above the initial position
    pub fn height(&self) -> f32 {
        self.height
    }
}

impl SceneObject for AnimatedProp {
    fn name(&self) -> &str {
        self.prop.name()
    }

    fn transform(&self) -> &Transform {
        &self.prop.transform
    }

    fn update(&mut self, dt: f32) {
        self.clock += dt;
        self.height = self.animation.height_at(self.clock);
        self.prop.transform.position.y = self.initial.position.y + self.height;
        self.prop
            .transform
            .orientation
            .spin(&self.animation.spin_axis, self.animation.spin_rate * dt);

        self.debug_timer += dt;
        if self.debug_timer > DEBUG_INTERVAL {
            let p = self.prop.transform.position;
            debug!(name = %self.prop.name, x = p.x, y = p.y, z = p.z, "position");
            self.debug_timer = 0.0;
        }
    }

    fn draw(&self, shader: ShaderHandle, view: &Matrix4<f32>, projection: &Matrix4<f32>) {
        self.prop.draw(shader, view, projection);
    }

    fn reset(&mut self) {
        self.prop.transform = self.initial;
        self.clock = 0.0;
        self.height = 0.0;
        self.debug_timer = 0.0;
        info!(name = %self.prop.name, "reset");
    }
}

/// Directional keys held during a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl PlayerInput {
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// A prop steered by the keyboard along world axes.
///
/// Forward is -Z. Yaw is kept in [0, 360).
#[derive(Debug)]
pub struct PlayerProp {
    prop: Prop,
    /// Units per second
    pub speed: f32,
    /// Degrees per second
    pub turn_rate: f32,
}

impl PlayerProp {
    pub fn new(mut prop: Prop) -> Self {
        if !matches!(prop.transform.orientation, Orientation::Euler(_)) {
            prop.transform.orientation = Orientation::Euler(EulerAngles::zero());
        }
        Self {
            prop,
            speed: 2.0,
            turn_rate: 45.0,
        }
    }

    pub fn yaw(&self) -> f32 {
        match self.prop.transform.orientation {
            Orientation::Euler(angles) => angles.y,
            Orientation::Quaternion(_) => 0.0,
        }
    }
}

impl SceneObject for PlayerProp {
    fn name(&self) -> &str {
        self.prop.name()
    }

    fn transform(&self) -> &Transform {
        &self.prop.transform
    }

    fn update(&mut self, _dt: f32) {}

    fn draw(&self, shader: ShaderHandle, view: &Matrix4<f32>, projection: &Matrix4<f32>) {
        self.prop.draw(shader, view, projection);
    }

    fn process_input(&mut self, input: &PlayerInput, dt: f32) {
        let axis = |positive: bool, negative: bool| match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };
        let direction = Vector3::new(
            axis(input.right, input.left),
            axis(input.up, input.down),
            axis(input.backward, input.forward),
        );
        self.prop.transform.position += direction * self.speed * dt;

        let turn = axis(input.turn_left, input.turn_right) * self.turn_rate * dt;
        if let Orientation::Euler(angles) = &mut self.prop.transform.orientation {
            // rem_euclid rounds tiny negative sums up to exactly 360
            let yaw = (angles.y + turn).rem_euclid(360.0);
            angles.y = if yaw >= 360.0 { 0.0 } else { yaw };
        }
    }
}
