use glam::{Mat4, Vec3};

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_SPEED: f32 = 2.5;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;
pub const DEFAULT_ZOOM: f32 = 45.0;

/// Pitch bound in degrees when constraining; keeps the view off the poles.
pub const PITCH_LIMIT: f32 = 89.0;
pub const ZOOM_MIN: f32 = 1.0;
pub const ZOOM_MAX: f32 = 45.0;

/// Direction of a keyboard-driven camera move.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    /// Along world up, regardless of where the camera looks.
    Up,
    Down,
}

/// Euler-angle fly camera.
///
/// Angles are in degrees. `front`, `right` and `up` are derived from yaw/pitch
/// and are always an orthonormal basis.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,

    yaw: f32,
    pitch: f32,

    movement_speed: f32,
    mouse_sensitivity: f32,
    zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.5, 0.5, 4.0), Vec3::Y, DEFAULT_YAW, DEFAULT_PITCH)
    }
}

impl Camera {
    pub fn new(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up,
            yaw,
            pitch,
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            zoom: DEFAULT_ZOOM,
        };
        camera.update_vectors();
        camera
    }

    /// Scalar-component constructor.
    #[allow(clippy::too_many_arguments)]
    pub fn from_components(
        pos_x: f32,
        pos_y: f32,
        pos_z: f32,
        up_x: f32,
        up_y: f32,
        up_z: f32,
        yaw: f32,
        pitch: f32,
    ) -> Self {
        Self::new(
            Vec3::new(pos_x, pos_y, pos_z),
            Vec3::new(up_x, up_y, up_z),
            yaw,
            pitch,
        )
    }

    /// Camera at `position` with default orientation.
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Vec3::Y, DEFAULT_YAW, DEFAULT_PITCH)
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    pub fn set_movement_speed(&mut self, speed: f32) {
        self.movement_speed = speed;
    }

    pub fn set_mouse_sensitivity(&mut self, sensitivity: f32) {
        self.mouse_sensitivity = sensitivity;
    }

    // ── matrices ──────────────────────────────────────────────────────────

    /// Right-handed look-at from `position` toward `position + front`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Right-handed perspective with `zoom` as the vertical field of view and
    /// a [0, 1] depth range.
    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, near, far)
    }

    // ── input ─────────────────────────────────────────────────────────────

    /// Moves the camera by `movement_speed * dt` in `direction`.
    pub fn process_keyboard(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.movement_speed * dt;
        let offset = match direction {
            CameraMovement::Forward => self.front,
            CameraMovement::Backward => -self.front,
            CameraMovement::Right => self.right,
            CameraMovement::Left => -self.right,
            CameraMovement::Up => self.world_up,
            CameraMovement::Down => -self.world_up,
        };
        self.position += offset * velocity;
    }

    /// Turns the camera by pointer offsets. Positive `y_offset` looks up.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    /// Narrows (positive `y_offset`) or widens the field of view.
    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPS
    }

    fn assert_orthonormal(c: &Camera) {
        assert!((c.front().length() - 1.0).abs() < EPS, "front {:?}", c.front());
        assert!((c.right().length() - 1.0).abs() < EPS, "right {:?}", c.right());
        assert!((c.up().length() - 1.0).abs() < EPS, "up {:?}", c.up());
        assert!(c.front().dot(c.right()).abs() < EPS);
        assert!(c.front().dot(c.up()).abs() < EPS);
        assert!(c.right().dot(c.up()).abs() < EPS);
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn default_looks_down_negative_z() {
        let c = Camera::default();
        assert_eq!(c.position(), Vec3::new(0.5, 0.5, 4.0));
        assert!(approx(c.front(), Vec3::NEG_Z));
        assert!(approx(c.right(), Vec3::X));
        assert!(approx(c.up(), Vec3::Y));
        assert_eq!(c.zoom(), 45.0);
        assert_eq!(c.movement_speed(), 2.5);
    }

    #[test]
    fn scalar_constructor_matches_vector_constructor() {
        let a = Camera::from_components(1.0, 2.0, 3.0, 0.0, 1.0, 0.0, -45.0, 10.0);
        let b = Camera::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y, -45.0, 10.0);
        assert_eq!(a, b);
    }

    #[test]
    fn basis_is_computed_at_construction() {
        let c = Camera::new(Vec3::ZERO, Vec3::Y, 30.0, 40.0);
        assert_orthonormal(&c);
        assert!(c.front().y > 0.6);
    }

    // ── view matrix ───────────────────────────────────────────────────────

    #[test]
    fn view_matrix_at_0_0_3() {
        let c = Camera::at(Vec3::new(0.0, 0.0, 3.0));
        assert!(approx(c.front(), Vec3::new(0.0, 0.0, -1.0)));

        let expected = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, 2.0), Vec3::Y);
        assert!(c.view_matrix().abs_diff_eq(expected, EPS));
    }

    #[test]
    fn view_matrix_moves_eye_to_origin() {
        let c = Camera::at(Vec3::new(0.0, 0.0, 3.0));
        let eye = c.view_matrix().transform_point3(Vec3::new(0.0, 0.0, 3.0));
        assert!(approx(eye, Vec3::ZERO));
    }

    #[test]
    fn projection_uses_zoom_as_fovy() {
        let mut c = Camera::default();
        c.process_mouse_scroll(15.0);
        let expected = Mat4::perspective_rh(30f32.to_radians(), 1.5, 0.1, 100.0);
        assert!(c.projection_matrix(1.5, 0.1, 100.0).abs_diff_eq(expected, EPS));
    }

    // ── keyboard ──────────────────────────────────────────────────────────

    #[test]
    fn forward_moves_by_front_times_speed() {
        let mut c = Camera::default();
        let start = c.position();
        c.process_keyboard(CameraMovement::Forward, 1.0);
        assert!(approx(c.position(), start + c.front() * 2.5));
    }

    #[test]
    fn opposite_moves_cancel() {
        let mut c = Camera::new(Vec3::ZERO, Vec3::Y, 12.0, -20.0);
        c.process_keyboard(CameraMovement::Left, 0.3);
        c.process_keyboard(CameraMovement::Right, 0.3);
        c.process_keyboard(CameraMovement::Forward, 0.7);
        c.process_keyboard(CameraMovement::Backward, 0.7);
        assert!(approx(c.position(), Vec3::ZERO));
    }

    #[test]
    fn up_follows_world_up_not_view_up() {
        let mut c = Camera::new(Vec3::ZERO, Vec3::Y, -90.0, 45.0);
        c.process_keyboard(CameraMovement::Up, 1.0);
        assert!(approx(c.position(), Vec3::new(0.0, 2.5, 0.0)));
        c.process_keyboard(CameraMovement::Down, 2.0);
        assert!(approx(c.position(), Vec3::new(0.0, -2.5, 0.0)));
    }

    #[test]
    fn zero_dt_does_not_move() {
        let mut c = Camera::default();
        c.process_keyboard(CameraMovement::Forward, 0.0);
        assert_eq!(c.position(), Camera::default().position());
    }

    // ── mouse ─────────────────────────────────────────────────────────────

    #[test]
    fn offsets_are_scaled_by_sensitivity() {
        let mut c = Camera::default();
        c.process_mouse_movement(100.0, 50.0, true);
        assert!((c.yaw() - (-80.0)).abs() < EPS);
        assert!((c.pitch() - 5.0).abs() < EPS);
    }

    #[test]
    fn pitch_is_clamped_when_constrained() {
        let mut c = Camera::default();
        c.process_mouse_movement(0.0, 5000.0, true);
        assert_eq!(c.pitch(), PITCH_LIMIT);
        c.process_mouse_movement(0.0, -50000.0, true);
        assert_eq!(c.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn pitch_is_free_when_unconstrained() {
        let mut c = Camera::default();
        c.process_mouse_movement(0.0, 1000.0, false);
        assert!((c.pitch() - 100.0).abs() < EPS);
    }

    #[test]
    fn basis_stays_orthonormal_across_angles() {
        let mut c = Camera::default();
        for i in 0..200 {
            let dx = ((i * 37) % 91) as f32 - 45.0;
            let dy = ((i * 53) % 77) as f32 - 38.0;
            c.process_mouse_movement(dx * 7.0, dy * 5.0, true);
            assert_orthonormal(&c);
            assert!(c.pitch() >= -PITCH_LIMIT && c.pitch() <= PITCH_LIMIT);
        }
    }

    // ── scroll ────────────────────────────────────────────────────────────

    #[test]
    fn zoom_stays_in_range() {
        let mut c = Camera::default();
        c.process_mouse_scroll(10.0);
        assert_eq!(c.zoom(), 35.0);
        c.process_mouse_scroll(100.0);
        assert_eq!(c.zoom(), ZOOM_MIN);
        c.process_mouse_scroll(-100.0);
        assert_eq!(c.zoom(), ZOOM_MAX);
    }
}
