use glam::Vec3;

use super::Ray;
use super::scene::{Aabb, Plane, Sphere, Triangle};

/// Hits closer than this are treated as self-intersections and rejected; the
/// integrator shifts bounce origins off the surface by the same amount.
pub const HIT_EPSILON: f32 = 1e-4;

pub fn intersect_sphere(ray: &Ray, sphere: &Sphere) -> Option<f32> {
    let origin = ray.origin - sphere.position;

    let a = ray.direction.dot(ray.direction);
    let b = 2.0 * origin.dot(ray.direction);
    let c = origin.dot(origin) - sphere.radius * sphere.radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    // nearest front-face root of the quadratic
    let closest_t = (-b - discriminant.sqrt()) / (2.0 * a);
    if closest_t < HIT_EPSILON {
        return None;
    }

    Some(closest_t)
}

pub fn intersect_plane(ray: &Ray, plane: &Plane) -> Option<f32> {
    let denom = ray.direction.dot(plane.normal);

    // parallel to the plane
    if denom.abs() < HIT_EPSILON {
        return None;
    }

    let t = -(ray.origin.dot(plane.normal) + plane.distance) / denom;
    if t < HIT_EPSILON {
        return None;
    }

    Some(t)
}

/// Slab test against an axis-aligned box.
pub fn intersect_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let inv_dir = ray.direction.recip();
    let mut t_min = (aabb.min - ray.origin) * inv_dir;
    let mut t_max = (aabb.max - ray.origin) * inv_dir;

    // Axis-parallel rays never cross their slab planes.
    if ray.direction.x == 0.0 {
        t_min.x = f32::NEG_INFINITY;
        t_max.x = f32::INFINITY;
    }
    if ray.direction.y == 0.0 {
        t_min.y = f32::NEG_INFINITY;
        t_max.y = f32::INFINITY;
    }
    if ray.direction.z == 0.0 {
        t_min.z = f32::NEG_INFINITY;
        t_max.z = f32::INFINITY;
    }

    if t_min.x > t_max.x {
        std::mem::swap(&mut t_min.x, &mut t_max.x);
    }
    if t_min.y > t_max.y {
        std::mem::swap(&mut t_min.y, &mut t_max.y);
    }
    if t_min.z > t_max.z {
        std::mem::swap(&mut t_min.z, &mut t_max.z);
    }

    let t_near = t_min.max_element();
    let t_far = t_max.min_element();

    if t_near > t_far || t_far < HIT_EPSILON {
        return None;
    }

    // t_near behind the origin means the ray starts inside; take the exit face
    Some(if t_near > HIT_EPSILON { t_near } else { t_far })
}

/// Face normal of an axis-aligned box at a surface point. On edges the first
/// match wins, in the order -X, +X, -Y, +Y, -Z, +Z.
pub fn aabb_face_normal(aabb: &Aabb, point: Vec3) -> Vec3 {
    if (point.x - aabb.min.x).abs() < HIT_EPSILON {
        Vec3::NEG_X
    } else if (point.x - aabb.max.x).abs() < HIT_EPSILON {
        Vec3::X
    } else if (point.y - aabb.min.y).abs() < HIT_EPSILON {
        Vec3::NEG_Y
    } else if (point.y - aabb.max.y).abs() < HIT_EPSILON {
        Vec3::Y
    } else if (point.z - aabb.min.z).abs() < HIT_EPSILON {
        Vec3::NEG_Z
    } else if (point.z - aabb.max.z).abs() < HIT_EPSILON {
        Vec3::Z
    } else {
        Vec3::ZERO
    }
}

/// Möller-Trumbore. Returns the hit distance and the barycentric-interpolated
/// surface normal.
pub fn intersect_triangle(ray: &Ray, triangle: &Triangle) -> Option<(f32, Vec3)> {
    let edge1 = triangle.v1 - triangle.v0;
    let edge2 = triangle.v2 - triangle.v0;
    let pvec = ray.direction.cross(edge2);

    let det = edge1.dot(pvec);
    if det.abs() < HIT_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = ray.origin - triangle.v0;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < HIT_EPSILON {
        return None;
    }

    let w = 1.0 - u - v;
    let normal = (w * triangle.n0 + u * triangle.n1 + v * triangle.n2).normalize();

    Some((t, normal))
}
