/// Example: Load and render an OBJ model in the terminal
///
/// Usage: cargo run --example view_model -- path/to/model.obj [texture.png]
use std::env;

use courtside_core::props::{Prop, StaticProp};
use courtside_core::texture::{Texture, TextureRole, TextureSet};
use courtside_core::{Camera, Model, Scene, Transform};
use courtside_terminal::TerminalApp;
use nalgebra::{Point3, Vector3};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let Some(model_path) = args.get(1).cloned() else {
        eprintln!("Usage: {} <obj-file> [texture]", args[0]);
        std::process::exit(2);
    };
    let texture_path = args.get(2).cloned();

    println!("Loading OBJ file: {}", model_path);

    let mut app = TerminalApp::with_scene(|context| {
        let model = Model::load(context, &model_path)?;
        println!("Loaded {} triangles", model.mesh().triangle_count());

        let diffuse = match &texture_path {
            Some(path) => Texture::load_or_solid(context, path, [255, 255, 255]),
            None => Texture::solid(context, [255, 255, 255]),
        };
        let model = model.with_textures(TextureSet::new().with(TextureRole::Diffuse, diffuse));

        let camera = Camera::new(Point3::new(0.0, 0.0, 3.0), -90.0, 0.0);
        let mut scene = Scene::new(camera, Vector3::new(2.0, 5.0, 5.0));
        scene.add(StaticProp::new(Prop::new("model", model, Transform::default())));
        Ok(scene)
    })?;

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));
    app.run()?;

    Ok(())
}
