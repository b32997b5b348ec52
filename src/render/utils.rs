use glam::{Vec3, Vec4, vec3};

/// PCG hash over a 32-bit state word.
pub fn pcg_hash(input: u32) -> u32 {
    let state = input.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277_803_737);
    (word >> 22) ^ word
}

/// Advances the seed and returns a float in [0, 1].
pub fn random_float(seed: &mut u32) -> f32 {
    *seed = pcg_hash(*seed);
    *seed as f32 / u32::MAX as f32
}

/// Random unit vector. The normalized cube sample lands on the sphere
/// surface, not inside it; the diffuse bounce relies on that distribution.
pub fn in_unit_sphere(seed: &mut u32) -> Vec3 {
    vec3(
        random_float(seed) * 2.0 - 1.0,
        random_float(seed) * 2.0 - 1.0,
        random_float(seed) * 2.0 - 1.0,
    )
    .normalize()
}

/// Like [`in_unit_sphere`], but drawn from the thread-local generator.
/// Selectable through the settings as an A/B knob; not reproducible.
pub fn in_unit_sphere_slow() -> Vec3 {
    vec3(
        rand::random::<f32>() * 2.0 - 1.0,
        rand::random::<f32>() * 2.0 - 1.0,
        rand::random::<f32>() * 2.0 - 1.0,
    )
    .normalize()
}

/// Packs a clamped linear color into a little-endian RGBA word. Channels are
/// truncated, not rounded.
pub fn convert_to_rgba(color: Vec4) -> u32 {
    let r = (color.x * 255.0) as u8 as u32;
    let g = (color.y * 255.0) as u8 as u32;
    let b = (color.z * 255.0) as u8 as u32;
    let a = (color.w * 255.0) as u8 as u32;

    (a << 24) | (b << 16) | (g << 8) | r
}
