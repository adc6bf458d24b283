#![allow(dead_code)]

pub mod build {
    use bevy::math::Vec3;

    /// Degrees per second applied while a rotate control is held.
    pub const ROTATE_RATE_DEG: f32 = 100.0;

    /// Virtual cursor speed in logical pixels per second (gamepad scheme).
    pub const CURSOR_SPEED: f32 = 150.0;

    /// Right-stick deflection below this is ignored by the virtual cursor.
    pub const STICK_THRESHOLD: f32 = 0.5;

    /// Where the preview parks when the pointer ray misses the world.
    pub const OFF_WORLD: Vec3 = Vec3::new(0.0, -1000.0, 0.0);
}
