use glam::{Vec3, vec3};

use super::scene::{Aabb, Material, Scene};

/// A scene plus the camera pose it is meant to be viewed from.
pub struct NamedScene {
    pub id: &'static str,
    pub scene: Scene,
    pub camera_position: Vec3,
    pub camera_forward: Vec3,
}

pub fn load_scenes() -> Vec<NamedScene> {
    vec![showcase(), cornell(), orbs()]
}

/// One of everything: a floor, a glass sphere, two cubes, a pyramid and a
/// warm light overhead.
fn showcase() -> NamedScene {
    let mut scene = Scene::default();

    // 0: floor
    scene.materials.push(Material {
        albedo: vec3(0.9, 0.9, 0.9),
        roughness: 0.8,
        reflection_strength: 0.05,
        ..Default::default()
    });
    // 1: glass
    scene.materials.push(Material {
        albedo: vec3(0.9, 0.9, 1.0),
        roughness: 0.0,
        reflection_strength: 0.3,
        reflection_tint: vec3(0.95, 0.95, 1.0),
        transparency: 0.95,
        ior: 1.52,
        ..Default::default()
    });
    // 2: red metal
    scene.materials.push(Material {
        albedo: vec3(0.9, 0.1, 0.1),
        roughness: 0.1,
        metallic: 1.0,
        reflection_strength: 0.8,
        ..Default::default()
    });
    // 3: green
    scene.materials.push(Material {
        albedo: vec3(0.1, 0.9, 0.1),
        roughness: 0.4,
        reflection_strength: 0.2,
        ..Default::default()
    });
    // 4: light
    scene.materials.push(Material {
        emission_color: vec3(1.0, 0.9, 0.7),
        emission_power: 25.0,
        ..Default::default()
    });

    scene.add_plane(Vec3::Y, 0.0, 0);
    scene.add_sphere(vec3(0.0, 1.0, 0.0), 1.0, 1);
    scene.add_cube(vec3(3.0, 1.0, 0.0), 1.0, 2);
    scene.add_cube(vec3(-3.0, 0.5, 0.0), 1.0, 3);
    scene.add_pyramid(vec3(0.0, 0.0, -2.0), 2.0, 2.0, 3);
    scene.add_sphere(vec3(0.0, 5.0, 0.0), 0.5, 4);

    NamedScene {
        id: "showcase",
        scene,
        camera_position: vec3(0.0, 2.0, 8.0),
        camera_forward: vec3(0.0, -0.15, -1.0),
    }
}

/// Classic box interior lit by a panel under the ceiling, open toward the
/// camera.
fn cornell() -> NamedScene {
    let mut scene = Scene::default();

    // 0: white walls
    scene.materials.push(Material {
        albedo: vec3(0.85, 0.85, 0.85),
        reflection_strength: 0.0,
        ..Default::default()
    });
    // 1: red wall
    scene.materials.push(Material {
        albedo: vec3(0.85, 0.25, 0.25),
        reflection_strength: 0.0,
        ..Default::default()
    });
    // 2: blue wall
    scene.materials.push(Material {
        albedo: vec3(0.25, 0.35, 0.85),
        reflection_strength: 0.0,
        ..Default::default()
    });
    // 3: light panel
    scene.materials.push(Material {
        emission_color: vec3(0.98, 1.0, 0.9),
        emission_power: 10.0,
        ..Default::default()
    });
    // 4: glass
    scene.materials.push(Material {
        albedo: vec3(0.95, 0.95, 1.0),
        roughness: 0.0,
        reflection_strength: 0.2,
        transparency: 0.95,
        ior: 1.5,
        ..Default::default()
    });

    scene.add_plane(Vec3::Y, 0.0, 0); // floor
    scene.add_plane(Vec3::NEG_Y, 4.0, 0); // ceiling
    scene.add_plane(Vec3::X, 3.0, 1); // left, red
    scene.add_plane(Vec3::NEG_X, 3.0, 2); // right, blue
    scene.add_plane(Vec3::Z, 3.0, 0); // back

    scene.aabbs.push(Aabb {
        min: vec3(-1.0, 3.9, -1.0),
        max: vec3(1.0, 4.0, 1.0),
        material_index: 3,
    });
    scene.aabbs.push(Aabb {
        min: vec3(-1.9, 0.0, -1.6),
        max: vec3(-0.7, 2.3, -0.4),
        material_index: 0,
    });
    scene.add_cube(vec3(1.3, 0.5, 0.6), 1.0, 0);
    scene.add_sphere(vec3(0.2, 0.7, 1.4), 0.7, 4);

    NamedScene {
        id: "cornell",
        scene,
        camera_position: vec3(0.0, 2.0, 9.5),
        camera_forward: Vec3::NEG_Z,
    }
}

/// A roughness/metallic sweep over a row of spheres.
fn orbs() -> NamedScene {
    let mut scene = Scene::default();

    // 0: floor
    scene.materials.push(Material {
        albedo: vec3(0.6, 0.6, 0.65),
        roughness: 0.9,
        reflection_strength: 0.05,
        ..Default::default()
    });

    let count: usize = 7;
    for i in 0..count {
        let t = i as f32 / (count - 1) as f32;
        scene.materials.push(Material {
            albedo: vec3(0.9, 0.6, 0.2),
            roughness: t,
            metallic: 1.0,
            reflection_strength: 0.9,
            ..Default::default()
        });
        scene.add_sphere(vec3(-4.5 + 1.5 * i as f32, 0.7, 0.0), 0.7, 1 + i);
    }

    // overhead light
    scene.materials.push(Material {
        emission_color: Vec3::ONE,
        emission_power: 15.0,
        ..Default::default()
    });
    scene.add_sphere(vec3(0.0, 6.0, 2.0), 1.0, 1 + count);

    NamedScene {
        id: "orbs",
        scene,
        camera_position: vec3(0.0, 2.2, 8.5),
        camera_forward: vec3(0.0, -0.12, -1.0),
    }
}
