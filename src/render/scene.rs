use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub albedo: Vec3,
    pub roughness: f32,
    pub metallic: f32,
    pub emission_color: Vec3,
    pub emission_power: f32,
    pub reflection_strength: f32,
    pub reflection_tint: Vec3,
    /// 0.0 = opaque, 1.0 = fully transparent
    pub transparency: f32,
    /// 1.0 = air, 1.33 = water, 1.5 = glass, 2.4 = diamond
    pub ior: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            albedo: Vec3::ONE,
            roughness: 1.0,
            metallic: 0.0,
            emission_color: Vec3::ZERO,
            emission_power: 0.0,
            reflection_strength: 0.5,
            reflection_tint: Vec3::ONE,
            transparency: 0.0,
            ior: 1.5,
        }
    }
}

impl Material {
    pub fn emission(&self) -> Vec3 {
        self.emission_color * self.emission_power
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub position: Vec3,
    pub radius: f32,
    pub material_index: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    /// Unit length; points p on the plane satisfy dot(p, normal) + distance == 0.
    pub normal: Vec3,
    pub distance: f32,
    pub material_index: usize,
}

/// Axis-aligned box spanning `min` to `max`, component-wise min <= max.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
    pub material_index: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    pub n0: Vec3,
    pub n1: Vec3,
    pub n2: Vec3,
    pub material_index: usize,
}

impl Triangle {
    /// Builds a triangle with all vertex normals set to the face normal.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material_index: usize) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize();
        Self {
            v0,
            v1,
            v2,
            n0: normal,
            n1: normal,
            n2: normal,
            material_index,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    Sphere,
    Plane,
    Aabb,
    Triangle,
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub spheres: Vec<Sphere>,
    pub planes: Vec<Plane>,
    pub aabbs: Vec<Aabb>,
    pub triangles: Vec<Triangle>,
    pub materials: Vec<Material>,
}

impl Scene {
    pub fn add_sphere(&mut self, center: Vec3, radius: f32, material_index: usize) {
        self.spheres.push(Sphere {
            position: center,
            radius,
            material_index,
        });
    }

    pub fn add_plane(&mut self, normal: Vec3, distance: f32, material_index: usize) {
        self.planes.push(Plane {
            normal: normal.normalize(),
            distance,
            material_index,
        });
    }

    pub fn add_cube(&mut self, center: Vec3, size: f32, material_index: usize) {
        let half = Vec3::splat(size * 0.5);
        self.aabbs.push(Aabb {
            min: center - half,
            max: center + half,
            material_index,
        });
    }

    /// Square base plus four faces meeting in an apex above the base center.
    pub fn add_pyramid(
        &mut self,
        base_center: Vec3,
        base_size: f32,
        height: f32,
        material_index: usize,
    ) {
        let half = base_size * 0.5;
        let back_left = base_center + Vec3::new(-half, 0.0, -half);
        let back_right = base_center + Vec3::new(half, 0.0, -half);
        let front_left = base_center + Vec3::new(-half, 0.0, half);
        let front_right = base_center + Vec3::new(half, 0.0, half);
        let apex = base_center + Vec3::new(0.0, height, 0.0);

        self.triangles
            .push(Triangle::new(front_left, back_left, back_right, material_index));
        self.triangles
            .push(Triangle::new(front_left, back_right, front_right, material_index));
        self.triangles
            .push(Triangle::new(front_left, front_right, apex, material_index));
        self.triangles
            .push(Triangle::new(front_right, back_right, apex, material_index));
        self.triangles
            .push(Triangle::new(back_right, back_left, apex, material_index));
        self.triangles
            .push(Triangle::new(back_left, front_left, apex, material_index));
    }
}
