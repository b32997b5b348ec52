pub mod scene;
pub mod scenes;

mod intersect;
mod utils;

#[cfg(test)]
mod test;

use glam::{Vec3, Vec4, vec4};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use scene::{PrimitiveKind, Scene};
use utils::{convert_to_rgba, in_unit_sphere, in_unit_sphere_slow, random_float};

const MAX_BOUNCES: u32 = 5;
const SKY_COLOR: Vec3 = Vec3::new(0.6, 0.7, 0.9);

/// Bounce origins are shifted off the surface by this much to escape the
/// primitive that was just hit.
const SURFACE_OFFSET: f32 = 1e-4;

/// Paths whose throughput drops below this contribute nothing visible.
const MIN_CONTRIBUTION: f32 = 1e-3;

/// Decorrelates the sample streams within one pixel.
const SAMPLE_SEED_STRIDE: u32 = 719_393;

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitPayload {
    pub hit_distance: f32,
    pub material_index: usize,
    pub world_position: Vec3,
    pub world_normal: Vec3,
    pub kind: PrimitiveKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Average frames over time instead of restarting every frame.
    pub accumulate: bool,
    /// Use the non-deterministic generator for the diffuse bounce.
    pub slow_random: bool,
    /// Anti-aliasing samples per pixel, 1..=16.
    pub samples_per_pixel: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            accumulate: true,
            slow_random: false,
            samples_per_pixel: 1,
        }
    }
}

/// Progressive path tracer. Owns the packed output image and the running
/// radiance sums; borrows the scene and camera for the duration of a render.
pub struct Renderer {
    width: u32,
    height: u32,
    image_data: Vec<u32>,
    accumulation: Vec<Vec4>,
    frame_index: u32,
    pub settings: Settings,
}

impl Renderer {
    pub fn new(settings: Settings) -> Self {
        Self {
            width: 0,
            height: 0,
            image_data: Vec::new(),
            accumulation: Vec::new(),
            frame_index: 1,
            settings,
        }
    }

    /// Reallocates the target buffers. Returns true when the dimensions
    /// actually changed so the caller can restart accumulation.
    pub fn on_resize(&mut self, width: u32, height: u32) -> bool {
        if self.width == width && self.height == height {
            return false;
        }

        self.width = width;
        self.height = height;
        let len = (width * height) as usize;
        self.image_data = vec![0; len];
        self.accumulation = vec![Vec4::ZERO; len];
        true
    }

    /// Renders one frame into the image buffer. Every pixel is independent;
    /// rows are dispatched in parallel and so are the columns within a row.
    pub fn render(&mut self, scene: &Scene, camera: &Camera) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        if self.frame_index == 1 {
            self.accumulation.fill(Vec4::ZERO);
        }

        let frame = Frame {
            scene,
            camera,
            settings: self.settings,
            frame_index: self.frame_index,
            width: self.width,
            height: self.height,
        };

        let width = self.width as usize;
        self.accumulation
            .par_chunks_exact_mut(width)
            .zip(self.image_data.par_chunks_exact_mut(width))
            .enumerate()
            .for_each(|(y, (accumulation_row, image_row))| {
                accumulation_row
                    .par_iter_mut()
                    .zip(image_row.par_iter_mut())
                    .enumerate()
                    .for_each(|(x, (accumulated, pixel))| {
                        *accumulated += frame.per_pixel(x as u32, y as u32);

                        let color = *accumulated / frame.frame_index as f32;
                        *pixel = convert_to_rgba(color.clamp(Vec4::ZERO, Vec4::ONE));
                    });
            });

        if self.settings.accumulate {
            self.frame_index += 1;
        } else {
            self.frame_index = 1;
        }
    }

    pub fn reset_frame_index(&mut self) {
        self.frame_index = 1;
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    /// Latest packed little-endian RGBA frame, row 0 at the bottom.
    pub fn final_image(&self) -> &[u32] {
        &self.image_data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Read-only per-frame context shared by all pixel jobs.
struct Frame<'a> {
    scene: &'a Scene,
    camera: &'a Camera,
    settings: Settings,
    frame_index: u32,
    width: u32,
    height: u32,
}

impl Frame<'_> {
    /// Monte-Carlo estimate of the radiance arriving through one pixel,
    /// averaged over the configured sample count. Alpha is fixed at 1.
    fn per_pixel(&self, x: u32, y: u32) -> Vec4 {
        let mut final_color = Vec3::ZERO;

        let base_seed = (x + y * self.width).wrapping_mul(self.frame_index);

        for sample in 0..self.settings.samples_per_pixel {
            let mut seed = base_seed.wrapping_add(sample.wrapping_mul(SAMPLE_SEED_STRIDE));

            let mut ray = Ray {
                origin: self.camera.position(),
                direction: if self.settings.samples_per_pixel > 1 {
                    self.jittered_direction(x, y, &mut seed)
                } else {
                    self.camera.ray_directions()[(x + y * self.width) as usize]
                },
            };

            let mut light = Vec3::ZERO;
            let mut contribution = Vec3::ONE;

            for bounce in 0..MAX_BOUNCES {
                seed = seed.wrapping_add(bounce);

                let Some(payload) = trace_ray(self.scene, &ray) else {
                    light += SKY_COLOR * contribution;
                    break;
                };

                let material = &self.scene.materials[payload.material_index];
                light += material.emission() * contribution;

                let mut normal = payload.world_normal;
                ray.origin = payload.world_position + normal * SURFACE_OFFSET;

                if material.transparency > 0.0 {
                    let cos_theta = (-ray.direction).dot(normal).min(1.0);
                    let mut reflectance = fresnel_schlick(cos_theta, material.ior);
                    reflectance += material.reflection_strength * (1.0 - reflectance);

                    if random_float(&mut seed) < reflectance {
                        ray.direction = ray
                            .direction
                            .reflect(normal + material.roughness * in_unit_sphere(&mut seed));
                        contribution *= material.reflection_tint;
                    } else {
                        let mut eta = 1.0 / material.ior;
                        if normal.dot(ray.direction) > 0.0 {
                            // back-face hit: the ray leaves the medium
                            normal = -normal;
                            eta = material.ior;
                        }

                        let cos_i = (-ray.direction).dot(normal);
                        let sin_t2 = eta * eta * (1.0 - cos_i * cos_i);

                        if sin_t2 < 1.0 {
                            let cos_t = (1.0 - sin_t2).sqrt();
                            ray.direction = (eta * ray.direction
                                + (eta * cos_i - cos_t) * normal)
                                .normalize();
                            contribution *= Vec3::ONE.lerp(material.albedo, material.transparency);
                        } else {
                            // total internal reflection
                            ray.direction = ray.direction.reflect(normal);
                            contribution *= material.reflection_tint;
                        }
                    }
                } else if random_float(&mut seed)
                    < material.reflection_strength * material.metallic
                {
                    ray.direction = ray
                        .direction
                        .reflect(normal + material.roughness * in_unit_sphere(&mut seed));
                    contribution *= material.albedo * material.reflection_tint;
                } else {
                    let jitter = if self.settings.slow_random {
                        in_unit_sphere_slow()
                    } else {
                        in_unit_sphere(&mut seed)
                    };
                    ray.direction = (normal + jitter).normalize();
                    contribution *= material.albedo;
                }

                if contribution.length() < MIN_CONTRIBUTION {
                    break;
                }
            }

            final_color += light;
        }

        final_color /= self.settings.samples_per_pixel as f32;
        final_color.extend(1.0)
    }

    /// Primary ray direction through (x, y) with a sub-pixel jitter drawn
    /// from the pixel's seed stream.
    fn jittered_direction(&self, x: u32, y: u32, seed: &mut u32) -> Vec3 {
        let offset_x = random_float(seed) - 0.5;
        let offset_y = random_float(seed) - 0.5;

        let ndc_x = ((x as f32 + offset_x) / self.width as f32) * 2.0 - 1.0;
        let ndc_y = ((y as f32 + offset_y) / self.height as f32) * 2.0 - 1.0;

        let target = self.camera.inverse_projection() * vec4(ndc_x, ndc_y, 1.0, 1.0);
        let direction = (target.truncate() / target.w).normalize();
        (self.camera.inverse_view() * direction.extend(0.0))
            .truncate()
            .normalize()
    }
}

/// Linear scan over every primitive array, keeping the nearest hit.
pub(crate) fn trace_ray(scene: &Scene, ray: &Ray) -> Option<HitPayload> {
    let mut hit_distance = f32::MAX;
    let mut closest = None;
    let mut triangle_normal = Vec3::ZERO;

    for (index, sphere) in scene.spheres.iter().enumerate() {
        if let Some(t) = intersect::intersect_sphere(ray, sphere) {
            if t < hit_distance {
                hit_distance = t;
                closest = Some((PrimitiveKind::Sphere, index));
            }
        }
    }

    for (index, plane) in scene.planes.iter().enumerate() {
        if let Some(t) = intersect::intersect_plane(ray, plane) {
            if t < hit_distance {
                hit_distance = t;
                closest = Some((PrimitiveKind::Plane, index));
            }
        }
    }

    for (index, aabb) in scene.aabbs.iter().enumerate() {
        if let Some(t) = intersect::intersect_aabb(ray, aabb) {
            if t < hit_distance {
                hit_distance = t;
                closest = Some((PrimitiveKind::Aabb, index));
            }
        }
    }

    for (index, triangle) in scene.triangles.iter().enumerate() {
        if let Some((t, normal)) = intersect::intersect_triangle(ray, triangle) {
            if t < hit_distance {
                hit_distance = t;
                closest = Some((PrimitiveKind::Triangle, index));
                triangle_normal = normal;
            }
        }
    }

    let (kind, index) = closest?;
    Some(closest_hit(
        scene,
        ray,
        hit_distance,
        kind,
        index,
        triangle_normal,
    ))
}

fn closest_hit(
    scene: &Scene,
    ray: &Ray,
    hit_distance: f32,
    kind: PrimitiveKind,
    index: usize,
    triangle_normal: Vec3,
) -> HitPayload {
    let world_position = ray.origin + ray.direction * hit_distance;

    let (world_normal, material_index) = match kind {
        PrimitiveKind::Sphere => {
            let sphere = &scene.spheres[index];
            (
                (world_position - sphere.position).normalize(),
                sphere.material_index,
            )
        }
        PrimitiveKind::Plane => {
            let plane = &scene.planes[index];
            (plane.normal, plane.material_index)
        }
        PrimitiveKind::Aabb => {
            let aabb = &scene.aabbs[index];
            (
                intersect::aabb_face_normal(aabb, world_position),
                aabb.material_index,
            )
        }
        PrimitiveKind::Triangle => (triangle_normal, scene.triangles[index].material_index),
    };

    HitPayload {
        hit_distance,
        material_index,
        world_position,
        world_normal,
        kind,
    }
}

/// Schlick's approximation of the dielectric reflectance at normal-relative
/// angle `cos_theta`.
fn fresnel_schlick(cos_theta: f32, ior: f32) -> f32 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cos_theta).powi(5)
}
