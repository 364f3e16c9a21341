/// Frame orchestration: camera, light and the objects drawn each frame
use nalgebra::Vector3;
use tracing::{info, warn};

use crate::camera::Camera;
use crate::config::{Placement, PropConfig, SceneConfig};
use crate::error::LoadError;
use crate::geometry::Mesh;
use crate::model::Model;
use crate::props::{AnimatedProp, PlayerInput, PlayerProp, Prop, SceneObject, StaticProp};
use crate::render::{uniforms, ShaderHandle, SharedRasterizer};
use crate::texture::{Texture, TextureRole, TextureSet};
use crate::transform::{Orientation, Transform};

pub struct Scene {
    pub camera: Camera,
    pub light_position: Vector3<f32>,
    objects: Vec<Box<dyn SceneObject>>,
}

impl Scene {
    pub fn new(camera: Camera, light_position: Vector3<f32>) -> Self {
        Self {
            camera,
            light_position,
            objects: Vec::new(),
        }
    }

    /// Build the court, hoop, ball and (optionally) player described by `config`.
    pub fn from_config(context: &SharedRasterizer, config: &SceneConfig) -> Result<Self, LoadError> {
        let mut scene = Self::new(config.camera.build(), config.light());

        let court = build_prop(context, "court", &config.court, Placement::court(), || {
            Mesh::floor(50.0)
        })?;
        scene.add(StaticProp::new(court));

        let rim = build_prop(context, "rim", &config.rim, Placement::rim(), hoop_mesh)?;
        scene.add(StaticProp::new(rim));

        let ball = build_prop(context, "ball", &config.ball, Placement::ball(), || {
            Mesh::uv_sphere(0.1, 16, 16)
        })?;
        scene.add(AnimatedProp::new(ball, config.bounce.animation()));

        if config.spawn_player {
            let player = build_prop(context, "player", &config.player, Placement::player(), || {
                let mut mesh = Mesh::new();
                mesh.append(&Mesh::cuboid(0.5, 1.8, 0.3), &Vector3::new(0.0, 0.9, 0.0));
                mesh
            })?;
            scene.add(PlayerProp::new(player));
        }

        info!(objects = scene.objects.len(), "scene built");
        Ok(scene)
    }

    pub fn add(&mut self, object: impl SceneObject + 'static) {
        self.objects.push(Box::new(object));
    }

    pub fn objects(&self) -> &[Box<dyn SceneObject>] {
        &self.objects
    }

    pub fn object(&self, name: &str) -> Option<&dyn SceneObject> {
        self.objects
            .iter()
            .find(|object| object.name() == name)
            .map(|object| object.as_ref())
    }

    pub fn update(&mut self, dt: f32) {
        for object in &mut self.objects {
            object.update(dt);
        }
    }

    pub fn process_player_input(&mut self, input: &PlayerInput, dt: f32) {
        for object in &mut self.objects {
            object.process_input(input, dt);
        }
    }

    /// Reset every object that has an initial state.
    pub fn reset(&mut self) {
        for object in &mut self.objects {
            object.reset();
        }
    }

    /// Upload the per-frame uniforms once, then draw every object in order.
    pub fn draw(&self, context: &SharedRasterizer, shader: ShaderHandle) {
        let view = self.camera.view_matrix();
        let projection = self.camera.projection_matrix();
        {
            let mut rasterizer = context.borrow_mut();
            rasterizer.set_uniform_mat4(shader, uniforms::VIEW, &view);
            rasterizer.set_uniform_mat4(shader, uniforms::PROJECTION, &projection);
            rasterizer.set_uniform_vec3(shader, uniforms::LIGHT_POS, &self.light_position);
            rasterizer.set_uniform_vec3(shader, uniforms::VIEW_POS, &self.camera.position.coords);
        }

        for object in &self.objects {
            object.draw(shader, &view, &projection);
        }
    }
}

fn build_prop(
    context: &SharedRasterizer,
    name: &str,
    config: &PropConfig,
    defaults: Placement,
    builtin: impl FnOnce() -> Mesh,
) -> Result<Prop, LoadError> {
    let placement = config.placement(defaults);

    let model = match &config.model {
        Some(path) => Model::load(context, path)?,
        None => Model::from_mesh(context, builtin()),
    };

    let diffuse = match &config.diffuse {
        Some(path) => Texture::load_or_solid(context, path, placement.placeholder),
        None => Texture::solid(context, placement.placeholder),
    };
    let mut textures = TextureSet::new().with(TextureRole::Diffuse, diffuse);
    if let Some(path) = &config.normal {
        match Texture::load(context, path) {
            Ok(normal) => textures.insert(TextureRole::Normal, normal),
            Err(error) => warn!(%error, prop = name, "normal map skipped, sampling diffuse instead"),
        }
    }

    let transform = Transform::at(placement.position)
        .with_orientation(Orientation::Euler(placement.rotation))
        .with_uniform_scale(placement.scale);

    Ok(Prop::new(name, model.with_textures(textures), transform).with_color(placement.color))
}

/// Backboard with the rim ring in front of it, origin at the board's front face.
fn hoop_mesh() -> Mesh {
    let mut mesh = Mesh::new();
    mesh.append(&Mesh::cuboid(1.8, 1.2, 0.05), &Vector3::new(0.0, 0.0, -0.025));
    mesh.append(&Mesh::ring(0.45, 0.05, 32), &Vector3::new(0.0, -0.15, 0.6));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::{recording, Call};
    use crate::transform::EulerAngles;
    use std::fs;

    #[test]
    fn test_default_scene() {
        let (recorder, context) = recording();
        let scene = Scene::from_config(&context, &SceneConfig::default()).unwrap();

        let names: Vec<_> = scene.objects().iter().map(|o| o.name()).collect();
        assert_eq!(names, ["court", "rim", "ball", "player"]);
        assert!(matches!(
            scene.object("ball").unwrap().transform().orientation,
            Orientation::Quaternion(_)
        ));
        assert_eq!(
            scene.object("rim").unwrap().transform().position,
            Vector3::new(0.0, 3.0, -5.0)
        );
        assert_eq!(recorder.borrow().released_meshes(), 0);
    }

    #[test]
    fn test_without_player() {
        let (_recorder, context) = recording();
        let config = SceneConfig {
            spawn_player: false,
            ..SceneConfig::default()
        };
        let scene = Scene::from_config(&context, &config).unwrap();
        assert_eq!(scene.objects().len(), 3);
        assert!(scene.object("player").is_none());
    }

    #[test]
    fn test_draw_sets_frame_uniforms_then_draws_each_object() {
        let (recorder, context) = recording();
        let scene = Scene::from_config(&context, &SceneConfig::default()).unwrap();
        scene.draw(&context, ShaderHandle(1));

        let recorder = recorder.borrow();
        assert_eq!(recorder.mat4["view"], scene.camera.view_matrix());
        assert_eq!(recorder.mat4["projection"], scene.camera.projection_matrix());
        assert_eq!(recorder.vec3["lightPos"], Vector3::new(2.0, 5.0, 5.0));
        assert_eq!(recorder.vec3["viewPos"], Vector3::new(0.0, 1.0, 5.0));

        let draws = recorder
            .calls
            .iter()
            .filter(|call| matches!(call, Call::Draw(..)))
            .count();
        assert_eq!(draws, 4);
        // player is last: its model matrix is the one left in the slot
        assert_eq!(
            recorder.mat4["model"],
            scene.object("player").unwrap().transform().model_matrix()
        );
    }

    #[test]
    fn test_update_routes_input_and_reset() {
        let (_recorder, context) = recording();
        let mut scene = Scene::from_config(&context, &SceneConfig::default()).unwrap();
        let before = *scene.object("ball").unwrap().transform();

        scene.update(0.5);
        let input = PlayerInput {
            right: true,
            ..PlayerInput::default()
        };
        scene.process_player_input(&input, 1.0);

        let ball = scene.object("ball").unwrap().transform().position;
        assert!((ball.y - 4.5).abs() < 1e-4);
        assert!((scene.object("player").unwrap().transform().position.x - 2.0).abs() < 1e-5);
        assert_eq!(
            *scene.object("court").unwrap().transform(),
            Transform::default()
                .with_uniform_scale(0.2)
                .with_orientation(Orientation::Euler(EulerAngles::zero()))
        );

        scene.reset();
        assert_eq!(*scene.object("ball").unwrap().transform(), before);
    }

    #[test]
    fn test_missing_normal_map_shares_diffuse() {
        let (recorder, context) = recording();
        let dir = tempfile::tempdir().unwrap();
        let config = SceneConfig {
            ball: PropConfig {
                normal: Some(dir.path().join("missing_normal.png")),
                ..PropConfig::default()
            },
            spawn_player: false,
            ..SceneConfig::default()
        };
        let scene = Scene::from_config(&context, &config).unwrap();
        drop(scene);

        // one diffuse per prop, each released exactly once
        let recorder = recorder.borrow();
        let mut released = recorder.released_textures();
        released.sort_by_key(|h| h.0);
        released.dedup();
        assert_eq!(released.len(), 3);
        assert_eq!(recorder.released_textures().len(), 3);
        assert_eq!(recorder.released_meshes(), 3);
    }

    #[test]
    fn test_broken_model_aborts_construction() {
        let (recorder, context) = recording();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("court.obj");
        fs::write(&path, "v 0 0 0\nf 1/1/1 1/1/1 1/1/1\n").unwrap();

        let config = SceneConfig {
            rim: PropConfig {
                model: Some(path),
                ..PropConfig::default()
            },
            ..SceneConfig::default()
        };
        assert!(matches!(
            Scene::from_config(&context, &config),
            Err(LoadError::Format { line: 2, .. })
        ));
        // the court built before the failure is released again
        let recorder = recorder.borrow();
        assert_eq!(recorder.released_meshes(), 1);
        assert_eq!(recorder.released_textures().len(), 1);
    }

    #[test]
    fn test_hoop_mesh_layout() {
        let hoop = hoop_mesh();
        assert_eq!(hoop.triangle_count(), 12 + 64);
        assert!(hoop.positions()[..36].iter().all(|p| p.z <= 0.0));
        assert!(hoop.positions()[36..]
            .iter()
            .all(|p| (p.y + 0.15).abs() < 1e-6 && p.z > 0.0));
    }
}
