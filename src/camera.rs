use glam::{Mat4, Vec3, vec3, vec4};

const MOVE_SPEED: f32 = 5.0;
const TURN_SPEED: f32 = 1.2;
const MAX_PITCH: f32 = 1.5;

/// Held-key snapshot the host forwards every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CameraInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub yaw_left: bool,
    pub yaw_right: bool,
    pub pitch_up: bool,
    pub pitch_down: bool,
}

/// Interactive pinhole camera. Keeps the inverse view/projection matrices and
/// a per-pixel primary ray cache in sync with its pose and viewport.
pub struct Camera {
    vertical_fov: f32,
    near_clip: f32,
    far_clip: f32,

    position: Vec3,
    yaw: f32,
    pitch: f32,

    projection: Mat4,
    view: Mat4,
    inverse_projection: Mat4,
    inverse_view: Mat4,

    /// Primary ray directions, indexed x + y * width.
    ray_directions: Vec<Vec3>,
    viewport_width: u32,
    viewport_height: u32,
}

impl Camera {
    pub fn new(vertical_fov: f32, near_clip: f32, far_clip: f32) -> Self {
        let mut camera = Self {
            vertical_fov,
            near_clip,
            far_clip,
            position: vec3(0.0, 0.0, 6.0),
            yaw: 0.0,
            pitch: 0.0,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            inverse_projection: Mat4::IDENTITY,
            inverse_view: Mat4::IDENTITY,
            ray_directions: Vec::new(),
            viewport_width: 0,
            viewport_height: 0,
        };
        camera.recalculate_view();
        camera
    }

    /// Applies one frame of movement. Returns true when the pose changed, in
    /// which case the caller should restart accumulation.
    pub fn on_update(&mut self, ts: f32, input: &CameraInput) -> bool {
        let forward = self.forward();
        let right = forward.cross(Vec3::Y).normalize();

        let mut moved = false;

        let mut translation = Vec3::ZERO;
        if input.forward {
            translation += forward;
        }
        if input.backward {
            translation -= forward;
        }
        if input.right {
            translation += right;
        }
        if input.left {
            translation -= right;
        }
        if input.up {
            translation += Vec3::Y;
        }
        if input.down {
            translation -= Vec3::Y;
        }
        if translation != Vec3::ZERO {
            self.position += translation * MOVE_SPEED * ts;
            moved = true;
        }

        if input.yaw_left {
            self.yaw -= TURN_SPEED * ts;
            moved = true;
        }
        if input.yaw_right {
            self.yaw += TURN_SPEED * ts;
            moved = true;
        }
        if input.pitch_up {
            self.pitch = (self.pitch + TURN_SPEED * ts).min(MAX_PITCH);
            moved = true;
        }
        if input.pitch_down {
            self.pitch = (self.pitch - TURN_SPEED * ts).max(-MAX_PITCH);
            moved = true;
        }

        if moved {
            self.recalculate_view();
            self.recalculate_ray_directions();
        }

        moved
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width == self.viewport_width && height == self.viewport_height {
            return;
        }

        self.viewport_width = width;
        self.viewport_height = height;
        self.recalculate_projection();
        self.recalculate_ray_directions();
    }

    /// Repositions the camera, e.g. when switching scenes.
    pub fn look_at(&mut self, position: Vec3, forward: Vec3) {
        let forward = forward.normalize();
        self.position = position;
        self.pitch = forward.y.clamp(-1.0, 1.0).asin().clamp(-MAX_PITCH, MAX_PITCH);
        self.yaw = forward.x.atan2(-forward.z);
        self.recalculate_view();
        self.recalculate_ray_directions();
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn inverse_projection(&self) -> Mat4 {
        self.inverse_projection
    }

    pub fn inverse_view(&self) -> Mat4 {
        self.inverse_view
    }

    pub fn ray_directions(&self) -> &[Vec3] {
        &self.ray_directions
    }

    fn forward(&self) -> Vec3 {
        vec3(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    fn recalculate_projection(&mut self) {
        let aspect = self.viewport_width as f32 / self.viewport_height as f32;
        self.projection = Mat4::perspective_rh(
            self.vertical_fov.to_radians(),
            aspect,
            self.near_clip,
            self.far_clip,
        );
        self.inverse_projection = self.projection.inverse();
    }

    fn recalculate_view(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y);
        self.inverse_view = self.view.inverse();
    }

    fn recalculate_ray_directions(&mut self) {
        let (width, height) = (self.viewport_width, self.viewport_height);
        if width == 0 || height == 0 {
            return;
        }

        self.ray_directions.resize((width * height) as usize, Vec3::ZERO);
        for y in 0..height {
            for x in 0..width {
                let ndc_x = (x as f32 / width as f32) * 2.0 - 1.0;
                let ndc_y = (y as f32 / height as f32) * 2.0 - 1.0;

                let target = self.inverse_projection * vec4(ndc_x, ndc_y, 1.0, 1.0);
                let direction = (self.inverse_view
                    * (target.truncate() / target.w).normalize().extend(0.0))
                .truncate();
                self.ray_directions[(x + y * width) as usize] = direction;
            }
        }
    }
}
