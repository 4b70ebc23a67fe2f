//! Orthographic gallery camera. The frustum spans the viewport in pixels
//! divided by `zoom`, so resizing the window widens the visible world rather
//! than stretching it.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::config::CameraConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Map client pixel coordinates (origin top-left) into normalized device
    /// coordinates with +Y up.
    pub fn to_ndc(&self, client_x: f32, client_y: f32) -> Vec2 {
        Vec2::new(
            (client_x / self.width) * 2.0 - 1.0,
            -(client_y / self.height) * 2.0 + 1.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    zoom: f32,
    near: f32,
    far: f32,
    viewport: Viewport,
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    pub fn new(config: &CameraConfig, viewport: Viewport) -> Self {
        let position = Vec3::new(0.0, 0.0, config.distance);
        let mut camera = Self {
            position,
            zoom: config.zoom.max(f32::EPSILON),
            near: config.near,
            far: config.far,
            viewport,
            view: Mat4::look_at_rh(position, Vec3::ZERO, Vec3::Y),
            projection: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.update_projection();
    }

    fn update_projection(&mut self) {
        let half_w = self.viewport.width * 0.5 / self.zoom;
        let half_h = self.viewport.height * 0.5 / self.zoom;
        self.projection =
            Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, self.near, self.far);
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Ray through the given NDC point, starting on the near plane.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray> {
        let inverse = self.view_projection().inverse();
        let near = unproject(inverse, Vec4::new(ndc.x, ndc.y, 0.0, 1.0))?;
        let far = unproject(inverse, Vec4::new(ndc.x, ndc.y, 1.0, 1.0))?;
        let direction = (far - near).normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        Some(Ray {
            origin: near,
            direction,
        })
    }

    pub fn project(&self, position: Vec3) -> Option<Vec2> {
        let clip = self.view_projection() * position.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !ndc.x.is_finite() || !ndc.y.is_finite() {
            return None;
        }
        Some(Vec2::new(ndc.x, ndc.y))
    }
}

fn unproject(inverse: Mat4, clip: Vec4) -> Option<Vec3> {
    let world = inverse * clip;
    if world.w.abs() <= f32::EPSILON {
        return None;
    }
    let point = world.truncate() / world.w;
    point.is_finite().then_some(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(&CameraConfig::default(), Viewport::new(1200.0, 600.0))
    }

    #[test]
    fn ndc_maps_corners() {
        let viewport = Viewport::new(800.0, 400.0);
        assert_eq!(viewport.to_ndc(0.0, 0.0), Vec2::new(-1.0, 1.0));
        assert_eq!(viewport.to_ndc(800.0, 400.0), Vec2::new(1.0, -1.0));
        assert_eq!(viewport.to_ndc(400.0, 200.0), Vec2::ZERO);
    }

    #[test]
    fn center_ray_looks_down_negative_z() {
        let ray = camera().ray_from_ndc(Vec2::ZERO).expect("ray");
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-5);
        assert!(ray.origin.x.abs() < 1e-4 && ray.origin.y.abs() < 1e-4);
    }

    #[test]
    fn ortho_rays_are_parallel_and_scaled_by_zoom() {
        let camera = camera();
        let ray = camera.ray_from_ndc(Vec2::new(1.0, 1.0)).expect("ray");
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-5);
        // 1200px / 2 / zoom 120 = 5 world units to the right edge.
        assert!((ray.origin.x - 5.0).abs() < 1e-3, "{:?}", ray.origin);
        assert!((ray.origin.y - 2.5).abs() < 1e-3, "{:?}", ray.origin);
    }

    #[test]
    fn project_round_trips_through_ray() {
        let camera = camera();
        let point = Vec3::new(1.5, -0.75, 0.0);
        let ndc = camera.project(point).expect("projects");
        let ray = camera.ray_from_ndc(ndc).expect("ray");
        let t = (point.z - ray.origin.z) / ray.direction.z;
        assert!((ray.at(t) - point).length() < 1e-3);
    }
}
