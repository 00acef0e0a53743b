use crate::coords::Vec2;

/// Smallest perspective divisor used when projecting; keeps geometry finite
/// if content swings past the camera.
const MIN_W: f32 = 0.05;

/// Which side of a flap the recorded geometry belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FlapFace {
    /// Geometry laid out at rest position; rotated by `angle_deg`.
    Front,
    /// Geometry laid out where it lands face-down after a half turn;
    /// rotated by `angle_deg - 180`.
    ///
    /// This is the mirrored back face of a flap rotated by `angle_deg`: content
    /// reads upright once the flap completes its rotation.
    Back,
}

/// 3D rotation about a horizontal hinge with perspective foreshortening.
///
/// The hinge is the horizontal line through `pivot.y`. Positive angles swing
/// geometry above the hinge toward the viewer and down across it. Perspective
/// is centered on `pivot` with the camera `depth` logical pixels in front of
/// the surface. `depth <= 0` disables perspective.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlipTransform {
    pub pivot: Vec2,
    pub angle_deg: f32,
    pub depth: f32,
    pub face: FlapFace,
}

impl FlipTransform {
    #[inline]
    pub const fn new(pivot: Vec2, angle_deg: f32, depth: f32, face: FlapFace) -> Self {
        Self { pivot, angle_deg, depth, face }
    }

    /// Rotation actually applied to the recorded geometry, in radians.
    #[inline]
    pub fn rotation_rad(&self) -> f32 {
        match self.face {
            FlapFace::Front => self.angle_deg.to_radians(),
            FlapFace::Back => (self.angle_deg - 180.0).to_radians(),
        }
    }

    /// Projects a local point to screen space.
    ///
    /// Mirrors the vertex-stage projection in the shape shaders.
    pub fn project(&self, p: Vec2) -> Vec2 {
        let phi = self.rotation_rad();
        let dy = p.y - self.pivot.y;
        let y = dy * phi.cos();
        let z = -dy * phi.sin();
        let w = if self.depth > 0.0 {
            ((self.depth - z) / self.depth).max(MIN_W)
        } else {
            1.0
        };
        Vec2::new(
            self.pivot.x + (p.x - self.pivot.x) / w,
            self.pivot.y + y / w,
        )
    }

    /// Packs `(pivot.x, pivot.y, rotation, depth)` for upload.
    #[inline]
    pub(crate) fn to_gpu(self) -> [f32; 4] {
        [self.pivot.x, self.pivot.y, self.rotation_rad(), self.depth.max(0.0)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn near(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    fn hinge(angle: f32, face: FlapFace) -> FlipTransform {
        FlipTransform::new(Vec2::new(50.0, 100.0), angle, 400.0, face)
    }

    #[test]
    fn front_at_rest_is_identity() {
        let t = hinge(0.0, FlapFace::Front);
        let p = Vec2::new(20.0, 60.0);
        assert!(near(t.project(p), p));
    }

    #[test]
    fn back_face_lands_flat_after_half_turn() {
        let t = hinge(180.0, FlapFace::Back);
        let p = Vec2::new(20.0, 140.0);
        assert!(near(t.project(p), p));
    }

    #[test]
    fn perpendicular_flap_collapses_onto_hinge() {
        for face in [FlapFace::Front, FlapFace::Back] {
            let t = hinge(90.0, face);
            let top = t.project(Vec2::new(50.0, 60.0));
            let bottom = t.project(Vec2::new(50.0, 140.0));
            assert!((top.y - 100.0).abs() < EPS, "{face:?}: {top:?}");
            assert!((bottom.y - 100.0).abs() < EPS, "{face:?}: {bottom:?}");
        }
    }

    #[test]
    fn front_half_turn_mirrors_across_hinge() {
        let t = hinge(180.0, FlapFace::Front);
        let p = t.project(Vec2::new(50.0, 60.0));
        assert!(near(p, Vec2::new(50.0, 140.0)), "{p:?}");
    }

    #[test]
    fn swinging_edge_is_foreshortened_toward_viewer() {
        // The free edge of a top flap at 45° is nearer the camera, so it
        // spreads wider than the hinge edge.
        let t = hinge(45.0, FlapFace::Front);
        let free = t.project(Vec2::new(90.0, 60.0));
        let hinge_edge = t.project(Vec2::new(90.0, 100.0));
        assert!(free.x > hinge_edge.x);
        assert!((hinge_edge.x - 90.0).abs() < EPS);
    }

    #[test]
    fn zero_depth_is_orthographic() {
        let t = FlipTransform::new(Vec2::new(0.0, 0.0), 60.0, 0.0, FlapFace::Front);
        let p = t.project(Vec2::new(30.0, -10.0));
        assert!(near(p, Vec2::new(30.0, -5.0)), "{p:?}");
    }
}
