use glam::{Vec3, Vec4, vec3, vec4};

use super::intersect::{
    HIT_EPSILON, aabb_face_normal, intersect_aabb, intersect_plane, intersect_sphere,
    intersect_triangle,
};
use super::scene::{Aabb, Material, Plane, Sphere, Triangle};
use super::scenes::load_scenes;
use super::*;

const SKY_WORD: u32 = 0xFFE5B299;

fn test_camera(width: u32, height: u32, position: Vec3, forward: Vec3) -> Camera {
    let mut camera = Camera::new(45.0, 0.1, 100.0);
    camera.on_resize(width, height);
    camera.look_at(position, forward);
    camera
}

fn emitter_material() -> Material {
    Material {
        albedo: Vec3::ZERO,
        roughness: 0.0,
        metallic: 0.0,
        emission_color: Vec3::ONE,
        emission_power: 1.0,
        reflection_strength: 0.0,
        reflection_tint: Vec3::ZERO,
        transparency: 0.0,
        ior: 1.0,
    }
}

#[test]
fn random_float_is_deterministic() {
    let mut seed_a = 12345u32;
    let mut seed_b = 12345u32;

    let a = random_float(&mut seed_a);
    let b = random_float(&mut seed_b);

    assert_eq!(a, b);
    assert_eq!(seed_a, seed_b);

    for _ in 0..1000 {
        let value = random_float(&mut seed_a);
        assert!((0.0..=1.0).contains(&value));
    }
}

#[test]
fn in_unit_sphere_returns_unit_vectors() {
    let mut seed = 1u32;
    for _ in 0..64 {
        let v = in_unit_sphere(&mut seed);
        assert!((v.length() - 1.0).abs() < 1e-6, "not unit length: {v}");
    }

    // same seed, same vector
    let mut seed_a = 77u32;
    let mut seed_b = 77u32;
    assert_eq!(in_unit_sphere(&mut seed_a), in_unit_sphere(&mut seed_b));
}

#[test]
fn sphere_intersection_matches_the_quadratic() {
    let sphere = Sphere {
        position: vec3(0.0, 0.0, -3.0),
        radius: 1.0,
        material_index: 0,
    };

    let ray = Ray {
        origin: Vec3::ZERO,
        direction: Vec3::NEG_Z,
    };
    let t = intersect_sphere(&ray, &sphere).unwrap();
    assert!((t - 2.0).abs() < 1e-6);

    // pointing away
    let behind = Ray {
        origin: Vec3::ZERO,
        direction: Vec3::Z,
    };
    assert_eq!(intersect_sphere(&behind, &sphere), None);

    // the near root is behind an origin inside the sphere
    let inside = Ray {
        origin: vec3(0.0, 0.0, -3.0),
        direction: Vec3::NEG_Z,
    };
    assert_eq!(intersect_sphere(&inside, &sphere), None);

    let miss = Ray {
        origin: vec3(0.0, 2.5, 0.0),
        direction: Vec3::NEG_Z,
    };
    assert_eq!(intersect_sphere(&miss, &sphere), None);
}

#[test]
fn plane_intersection_handles_parallel_rays() {
    let plane = Plane {
        normal: Vec3::Y,
        distance: 0.0,
        material_index: 0,
    };

    let ray = Ray {
        origin: vec3(0.0, 1.0, 0.0),
        direction: Vec3::NEG_Y,
    };
    let t = intersect_plane(&ray, &plane).unwrap();
    assert!((t - 1.0).abs() < 1e-6);

    let parallel = Ray {
        origin: vec3(0.0, 1.0, 0.0),
        direction: Vec3::X,
    };
    assert_eq!(intersect_plane(&parallel, &plane), None);

    let away = Ray {
        origin: vec3(0.0, 1.0, 0.0),
        direction: Vec3::Y,
    };
    assert_eq!(intersect_plane(&away, &plane), None);
}

#[test]
fn aabb_intersection_covers_inside_and_axis_parallel_rays() {
    let aabb = Aabb {
        min: Vec3::splat(-1.0),
        max: Vec3::ONE,
        material_index: 0,
    };

    // from outside, two axes parallel to the slabs
    let ray = Ray {
        origin: vec3(0.0, 0.0, 3.0),
        direction: Vec3::NEG_Z,
    };
    let t = intersect_aabb(&ray, &aabb).unwrap();
    assert!((t - 2.0).abs() < 1e-6);

    // from inside the box the exit face is reported
    let inside = Ray {
        origin: Vec3::ZERO,
        direction: Vec3::NEG_Z,
    };
    let t = intersect_aabb(&inside, &aabb).unwrap();
    assert!((t - 1.0).abs() < 1e-6);

    // box entirely behind the origin
    let behind = Ray {
        origin: vec3(0.0, 0.0, 3.0),
        direction: Vec3::Z,
    };
    assert_eq!(intersect_aabb(&behind, &aabb), None);

    let diagonal_miss = Ray {
        origin: vec3(4.0, 4.0, 3.0),
        direction: vec3(0.0, 1.0, -1.0).normalize(),
    };
    assert_eq!(intersect_aabb(&diagonal_miss, &aabb), None);
}

#[test]
fn aabb_face_normals_follow_the_face_priority() {
    let aabb = Aabb {
        min: Vec3::splat(-1.0),
        max: Vec3::ONE,
        material_index: 0,
    };

    assert_eq!(aabb_face_normal(&aabb, vec3(-1.0, 0.2, 0.3)), Vec3::NEG_X);
    assert_eq!(aabb_face_normal(&aabb, vec3(1.0, 0.2, 0.3)), Vec3::X);
    assert_eq!(aabb_face_normal(&aabb, vec3(0.2, -1.0, 0.3)), Vec3::NEG_Y);
    assert_eq!(aabb_face_normal(&aabb, vec3(0.2, 1.0, 0.3)), Vec3::Y);
    assert_eq!(aabb_face_normal(&aabb, vec3(0.2, 0.3, -1.0)), Vec3::NEG_Z);
    assert_eq!(aabb_face_normal(&aabb, vec3(0.2, 0.3, 1.0)), Vec3::Z);

    // corners match several faces; -X wins
    assert_eq!(aabb_face_normal(&aabb, Vec3::splat(-1.0)), Vec3::NEG_X);
    assert_eq!(aabb_face_normal(&aabb, Vec3::ONE), Vec3::X);
}

#[test]
fn triangle_intersection_rejects_outside_barycentrics() {
    let triangle = Triangle::new(
        vec3(-2.0, -2.0, -1.0),
        vec3(2.0, -2.0, -1.0),
        vec3(0.0, 2.0, -1.0),
        0,
    );

    let ray = Ray {
        origin: Vec3::ZERO,
        direction: Vec3::NEG_Z,
    };
    let (t, normal) = intersect_triangle(&ray, &triangle).unwrap();
    assert!((t - 1.0).abs() < 1e-6);
    assert!((normal - Vec3::Z).length() < 1e-6);

    // outside the first barycentric
    let outside = Ray {
        origin: vec3(3.0, 0.0, 0.0),
        direction: Vec3::NEG_Z,
    };
    assert_eq!(intersect_triangle(&outside, &triangle), None);

    // degenerate triangles never report a hit
    let degenerate = Triangle::new(Vec3::ZERO, Vec3::ZERO, vec3(0.0, 1.0, 0.0), 0);
    assert_eq!(intersect_triangle(&ray, &degenerate), None);
}

#[test]
fn trace_ray_returns_the_nearest_hit() {
    let mut scene = Scene::default();
    scene.materials.push(Material::default());
    scene.materials.push(Material::default());
    scene.materials.push(Material::default());
    scene.add_sphere(vec3(0.0, 0.0, -6.0), 0.5, 0);
    scene.add_sphere(vec3(0.0, 0.0, -2.0), 0.5, 1);

    let ray = Ray {
        origin: Vec3::ZERO,
        direction: Vec3::NEG_Z,
    };
    let payload = trace_ray(&scene, &ray).unwrap();
    assert_eq!(payload.kind, PrimitiveKind::Sphere);
    assert_eq!(payload.material_index, 1);
    assert!((payload.hit_distance - 1.5).abs() < 1e-6);
    assert!((payload.world_position - vec3(0.0, 0.0, -1.5)).length() < 1e-6);
    assert!((payload.world_normal - Vec3::Z).length() < 1e-6);

    // a triangle in front of both spheres wins
    scene.triangles.push(Triangle::new(
        vec3(-2.0, -2.0, -1.0),
        vec3(2.0, -2.0, -1.0),
        vec3(0.0, 2.0, -1.0),
        2,
    ));
    let payload = trace_ray(&scene, &ray).unwrap();
    assert_eq!(payload.kind, PrimitiveKind::Triangle);
    assert_eq!(payload.material_index, 2);
    assert!((payload.hit_distance - 1.0).abs() < 1e-6);

    // nothing in this direction
    let away = Ray {
        origin: Vec3::ZERO,
        direction: Vec3::Z,
    };
    assert_eq!(trace_ray(&scene, &away), None);
}

#[test]
fn rgba_packing_truncates_channels() {
    assert_eq!(convert_to_rgba(Vec4::ZERO), 0);
    assert_eq!(convert_to_rgba(Vec4::ONE), 0xFFFFFFFF);
    assert_eq!(convert_to_rgba(vec4(0.6, 0.7, 0.9, 1.0)), SKY_WORD);

    // truncation, not rounding
    assert_eq!(convert_to_rgba(vec4(0.999, 0.0, 0.0, 0.0)), 254);
}

#[test]
fn empty_scene_renders_the_sky() {
    let scene = Scene::default();
    let camera = test_camera(4, 4, vec3(0.0, 0.0, 2.0), Vec3::NEG_Z);

    let mut renderer = Renderer::new(Settings {
        accumulate: false,
        slow_random: false,
        samples_per_pixel: 1,
    });
    renderer.on_resize(4, 4);
    renderer.render(&scene, &camera);

    for &pixel in renderer.final_image() {
        assert_eq!(pixel, SKY_WORD);
    }
}

#[test]
fn pure_emitter_fills_the_center_pixel() {
    let mut scene = Scene::default();
    scene.materials.push(emitter_material());
    scene.add_sphere(Vec3::ZERO, 0.5, 0);

    let camera = test_camera(4, 4, vec3(0.0, 0.0, 2.0), Vec3::NEG_Z);

    let mut renderer = Renderer::new(Settings {
        accumulate: false,
        slow_random: false,
        samples_per_pixel: 1,
    });
    renderer.on_resize(4, 4);
    renderer.render(&scene, &camera);
    assert_eq!(renderer.final_image()[2 + 2 * 4], 0xFFFFFFFF);

    // with anti-aliasing, every jittered sample still hits the emitter, so
    // the mean over the samples stays at full white
    renderer.settings.samples_per_pixel = 4;
    renderer.render(&scene, &camera);
    assert_eq!(renderer.final_image()[2 + 2 * 4], 0xFFFFFFFF);
}

#[test]
fn diffuse_sphere_bounces_into_the_sky() {
    let mut scene = Scene::default();
    scene.materials.push(Material {
        albedo: vec3(1.0, 0.0, 0.0),
        roughness: 1.0,
        metallic: 0.0,
        reflection_strength: 0.0,
        ..Default::default()
    });
    scene.add_sphere(Vec3::ZERO, 0.5, 0);

    let camera = test_camera(4, 4, vec3(0.0, 0.0, 2.0), Vec3::NEG_Z);

    let mut renderer = Renderer::new(Settings {
        accumulate: false,
        slow_random: false,
        samples_per_pixel: 1,
    });
    renderer.on_resize(4, 4);
    renderer.render(&scene, &camera);

    // the diffuse bounce off a lone convex sphere always escapes to the sky,
    // so the center pixel is exactly albedo * sky: floor(0.6 * 255) = 153 red
    assert_eq!(renderer.final_image()[2 + 2 * 4], 0xFF000099);
}

#[test]
fn dielectric_gate_attenuates_the_sky() {
    let mut scene = Scene::default();
    scene.materials.push(Material {
        albedo: Vec3::ONE,
        roughness: 0.0,
        metallic: 0.0,
        reflection_strength: 0.0,
        reflection_tint: Vec3::ONE,
        transparency: 0.95,
        ior: 1.5,
        ..Default::default()
    });
    scene.add_plane(Vec3::Y, 0.0, 0);

    // looking down at the transparent plane at an angle
    let camera = test_camera(4, 4, vec3(0.0, 2.0, 2.0), vec3(0.0, -0.7, -1.0));

    let mut renderer = Renderer::new(Settings {
        accumulate: true,
        slow_random: false,
        samples_per_pixel: 1,
    });
    renderer.on_resize(4, 4);
    for _ in 0..64 {
        renderer.render(&scene, &camera);
    }

    // Most samples pass the Fresnel gate into the refraction branch and are
    // absorbed by the surface; only the occasional Schlick reflection escapes
    // to the sky. Accumulated over 64 frames the pixel has to end up far
    // darker than an unobstructed sky pixel.
    let pixel = renderer.final_image()[2 + 2 * 4];
    let green = (pixel >> 8) & 0xFF;
    assert_ne!(pixel, SKY_WORD);
    assert!(green < 90, "glass pixel too bright: {pixel:#010X}");
}

#[test]
fn accumulation_advances_and_resets_the_frame_index() {
    let mut scene = Scene::default();
    scene.materials.push(emitter_material());
    scene.add_sphere(Vec3::ZERO, 0.5, 0);

    let camera = test_camera(4, 4, vec3(0.0, 0.0, 2.0), Vec3::NEG_Z);

    let mut renderer = Renderer::new(Settings {
        accumulate: true,
        slow_random: false,
        samples_per_pixel: 1,
    });
    renderer.on_resize(4, 4);

    assert_eq!(renderer.frame_index(), 1);
    for expected in 2..=4 {
        renderer.render(&scene, &camera);
        assert_eq!(renderer.frame_index(), expected);
    }

    renderer.reset_frame_index();
    assert_eq!(renderer.frame_index(), 1);

    // without accumulation the frame index stays pinned and repeated renders
    // of an unchanged scene are bit-identical
    renderer.settings.accumulate = false;
    renderer.settings.samples_per_pixel = 2;
    renderer.render(&scene, &camera);
    let first = renderer.final_image().to_vec();
    assert_eq!(renderer.frame_index(), 1);

    renderer.render(&scene, &camera);
    assert_eq!(renderer.final_image(), first.as_slice());
}

#[test]
fn resize_to_the_same_size_is_a_noop() {
    let mut scene = Scene::default();
    scene.materials.push(emitter_material());
    scene.add_sphere(Vec3::ZERO, 0.5, 0);

    let camera = test_camera(8, 6, vec3(0.0, 0.0, 2.0), Vec3::NEG_Z);

    let mut renderer = Renderer::new(Settings {
        accumulate: true,
        slow_random: false,
        samples_per_pixel: 1,
    });
    assert!(renderer.on_resize(8, 6));
    renderer.render(&scene, &camera);

    let image = renderer.final_image().to_vec();
    let data_ptr = renderer.final_image().as_ptr();
    let frame_index = renderer.frame_index();

    assert!(!renderer.on_resize(8, 6));
    assert_eq!(renderer.final_image().as_ptr(), data_ptr);
    assert_eq!(renderer.final_image(), image.as_slice());
    assert_eq!(renderer.frame_index(), frame_index);

    // a genuine resize reallocates
    assert!(renderer.on_resize(6, 8));
    assert_eq!(renderer.final_image().len(), 48);
}

#[test]
fn parallel_and_serial_dispatch_are_bit_identical() {
    let named = load_scenes().remove(0);
    let camera = test_camera(8, 6, named.camera_position, named.camera_forward);

    let settings = Settings {
        accumulate: false,
        slow_random: false,
        samples_per_pixel: 2,
    };

    let mut renderer = Renderer::new(settings);
    renderer.on_resize(8, 6);
    renderer.render(&named.scene, &camera);

    // the same pixels, walked serially
    let frame = Frame {
        scene: &named.scene,
        camera: &camera,
        settings,
        frame_index: 1,
        width: 8,
        height: 6,
    };
    for y in 0..6u32 {
        for x in 0..8u32 {
            let color = frame.per_pixel(x, y).clamp(Vec4::ZERO, Vec4::ONE);
            let expected = convert_to_rgba(color);
            assert_eq!(
                renderer.final_image()[(x + y * 8) as usize],
                expected,
                "pixel ({x}, {y}) diverged"
            );
        }
    }
}

#[test]
fn accumulation_converges_toward_the_running_mean() {
    let mut scene = Scene::default();
    scene.materials.push(Material {
        albedo: vec3(0.8, 0.3, 0.3),
        roughness: 1.0,
        reflection_strength: 0.0,
        ..Default::default()
    });
    scene.materials.push(Material {
        albedo: vec3(0.7, 0.7, 0.7),
        roughness: 1.0,
        reflection_strength: 0.0,
        ..Default::default()
    });
    scene.add_sphere(Vec3::ZERO, 0.5, 0);
    scene.add_plane(Vec3::Y, 0.5, 1);

    let camera = test_camera(4, 4, vec3(0.0, 0.5, 2.0), vec3(0.0, -0.2, -1.0));

    let mut renderer = Renderer::new(Settings {
        accumulate: true,
        slow_random: false,
        samples_per_pixel: 1,
    });
    renderer.on_resize(4, 4);

    let mean = |renderer: &Renderer, frames: u32| -> Vec<Vec3> {
        renderer
            .accumulation
            .iter()
            .map(|sum| (*sum / frames as f32).truncate())
            .collect()
    };

    let mut early = Vec::new();
    let mut late = Vec::new();
    for frame in 1..=2048u32 {
        renderer.render(&scene, &camera);
        match frame {
            16 => early = mean(&renderer, 16),
            256 => late = mean(&renderer, 256),
            _ => {}
        }
    }
    let reference = mean(&renderer, 2048);

    let rms = |image: &[Vec3]| -> f64 {
        let sum: f64 = image
            .iter()
            .zip(&reference)
            .map(|(a, b)| (*a - *b).length_squared() as f64)
            .sum();
        (sum / image.len() as f64).sqrt()
    };

    assert!(
        rms(&early) > rms(&late),
        "16-frame error {} should exceed 256-frame error {}",
        rms(&early),
        rms(&late)
    );
}

#[test]
fn built_in_scenes_reference_valid_materials() {
    for named in load_scenes() {
        let scene = &named.scene;
        let materials = scene.materials.len();
        assert!(materials > 0, "{} has no materials", named.id);

        for sphere in &scene.spheres {
            assert!(sphere.material_index < materials);
            assert!(sphere.radius > 0.0);
        }
        for plane in &scene.planes {
            assert!(plane.material_index < materials);
            assert!((plane.normal.length() - 1.0).abs() < 1e-6);
        }
        for aabb in &scene.aabbs {
            assert!(aabb.material_index < materials);
            assert!(aabb.min.cmple(aabb.max).all());
        }
        for triangle in &scene.triangles {
            assert!(triangle.material_index < materials);
            assert!((triangle.n0.length() - 1.0).abs() < 1e-6);
        }

        assert!(named.camera_forward.length() > 0.0);
    }
}

#[test]
fn camera_caches_one_ray_per_pixel() {
    let camera = test_camera(4, 4, vec3(0.0, 0.0, 2.0), Vec3::NEG_Z);

    let directions = camera.ray_directions();
    assert_eq!(directions.len(), 16);
    for direction in directions {
        assert!((direction.length() - 1.0).abs() < 1e-5);
    }

    // pixel (2, 2) maps to ndc (0, 0), straight down the view axis
    assert!((directions[2 + 2 * 4] - Vec3::NEG_Z).length() < 1e-5);
}

#[test]
fn camera_movement_invalidates_the_pose() {
    let mut camera = test_camera(4, 4, vec3(0.0, 0.0, 2.0), Vec3::NEG_Z);

    let idle = crate::camera::CameraInput::default();
    assert!(!camera.on_update(0.016, &idle));

    let forward = crate::camera::CameraInput {
        forward: true,
        ..Default::default()
    };
    assert!(camera.on_update(0.016, &forward));
    assert!(camera.position().z < 2.0);
}

#[test]
fn hit_epsilon_shields_bounce_origins() {
    // a bounce origin shifted off a plane by the surface offset must not
    // re-hit that plane
    let plane = Plane {
        normal: Vec3::Y,
        distance: 0.0,
        material_index: 0,
    };
    let grazing = Ray {
        origin: vec3(0.0, SURFACE_OFFSET, 0.0),
        direction: vec3(1.0, -0.00005, 0.0).normalize(),
    };
    assert_eq!(intersect_plane(&grazing, &plane), None);
    assert!(HIT_EPSILON <= SURFACE_OFFSET);
}
