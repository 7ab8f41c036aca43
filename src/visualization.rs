//! 3D viewer for archived structures using kiss3d.

use kiss3d::prelude::*;

use stacker::{Cube, Structure};

/// Returns the display color for a height level.
///
/// Levels cycle through a fixed palette so stacked layers stay distinguishable.
fn level_color(z: i32) -> Color {
    match z.rem_euclid(6) {
        0 => Color::new(0.8, 0.5, 0.3, 1.0), // clay
        1 => Color::new(0.9, 0.8, 0.3, 1.0), // sand
        2 => Color::new(0.4, 0.8, 0.4, 1.0), // moss
        3 => Color::new(0.3, 0.7, 0.9, 1.0), // sky
        4 => Color::new(0.6, 0.4, 0.9, 1.0), // violet
        _ => Color::new(0.9, 0.4, 0.6, 1.0), // rose
    }
}

/// A rendered cube in the 3D scene.
struct RenderedCube {
    node: SceneNode3d,
    /// Position with no layer spread applied.
    base_position: Vec3,
    /// Height level in solver coordinates.
    level: i32,
}

/// Maps solver coordinates (z up) to world coordinates (Y up), centred on `center`.
fn world_position(cube: &Cube, center: Vec3) -> Vec3 {
    Vec3::new(cube.x as f32, cube.z as f32, -(cube.y as f32)) - center
}

/// Builds the 3D scene for a structure.
fn build_scene(scene: &mut SceneNode3d, structure: &Structure) -> Vec<RenderedCube> {
    /// Size of each rendered cube (slightly smaller than 1.0 for visible gaps).
    const CUBE_SIZE: f32 = 0.9;

    let cubes = structure.sorted_cubes();
    let center = if cubes.is_empty() {
        Vec3::ZERO
    } else {
        let sum = cubes
            .iter()
            .map(|cube| world_position(cube, Vec3::ZERO))
            .fold(Vec3::ZERO, |acc, pos| acc + pos);
        sum / cubes.len() as f32
    };

    cubes
        .iter()
        .map(|cube| {
            let base_position = world_position(cube, center);
            let node = scene
                .add_cube(CUBE_SIZE, CUBE_SIZE, CUBE_SIZE)
                .set_color(level_color(cube.z))
                .set_position(base_position);
            RenderedCube {
                node,
                base_position,
                level: cube.z,
            }
        })
        .collect()
}

fn window_title(index: usize, structures: &[Structure]) -> String {
    format!(
        "Structure {}/{} (score {:.2}) - [Left/Right] navigate, [Up/Down] spread, [R] reset",
        index + 1,
        structures.len(),
        structures[index].score()
    )
}

/// Displays structures, best first, in an interactive 3D viewer.
pub fn display(structures: Vec<Structure>) {
    pollster::block_on(display_async(structures));
}

async fn display_async(structures: Vec<Structure>) {
    if structures.is_empty() {
        println!("No structures to display");
        return;
    }

    let count = structures.len();
    let mut current = 0;

    let mut window = Window::new(&window_title(current, &structures)).await;

    let mut camera = OrbitCamera3d::default();
    camera.set_dist(20.0);

    let mut scene = SceneNode3d::empty();
    scene
        .add_light(Light::point(100.0))
        .set_position(Vec3::new(10.0, 15.0, 10.0));

    let mut rendered_cubes = build_scene(&mut scene, &structures[current]);

    // vertical gap added between levels (0.0 = compact)
    let mut spread: f32 = 0.0;
    const SPREAD_STEP: f32 = 0.05;
    let mut needs_rebuild = false;

    loop {
        for event in window.events().iter() {
            if let kiss3d::event::WindowEvent::Key(key, action, _) = event.value {
                use kiss3d::event::{Action, Key};
                if action == Action::Press {
                    match key {
                        Key::Up => spread += SPREAD_STEP,
                        Key::Down => spread = (spread - SPREAD_STEP).max(0.0),
                        Key::R => spread = 0.0,
                        Key::Right => {
                            current = (current + 1) % count;
                            needs_rebuild = true;
                        }
                        Key::Left => {
                            current = current.checked_sub(1).unwrap_or(count - 1);
                            needs_rebuild = true;
                        }
                        _ => {}
                    }
                }
            }
        }

        if needs_rebuild {
            for mut cube in rendered_cubes.drain(..) {
                cube.node.remove();
            }
            rendered_cubes = build_scene(&mut scene, &structures[current]);
            window.set_title(&window_title(current, &structures));
            needs_rebuild = false;
        }

        for cube in &mut rendered_cubes {
            let lift = Vec3::new(0.0, cube.level as f32 * spread * 2.0, 0.0);
            cube.node.set_position(cube.base_position + lift);
        }

        if !window.render_3d(&mut scene, &mut camera).await {
            break;
        }
    }
}
