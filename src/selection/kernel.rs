use glam::{Mat4, Vec2, Vec3};

use super::rect::NormalizedBounds;

/// Project `point` through `projection_view` into `[0, 1]` screen space.
///
/// Returns `None` when the clip-space `w` is not strictly positive (the
/// point is behind or on the eye plane), before any division happens.
#[inline]
#[must_use]
pub fn project_to_screen(point: Vec3, projection_view: &Mat4) -> Option<Vec2> {
    let clip = *projection_view * point.extend(1.0);
    if clip.w.is_nan() || clip.w <= 0.0 {
        return None;
    }
    let ndc = Vec2::new(clip.x, clip.y) / clip.w;
    Some(ndc * 0.5 + Vec2::splat(0.5))
}

/// Whether `point` lands inside `bounds` under `projection_view`.
///
/// Pure: the same inputs always give the same answer. Points with
/// `w <= 0` are excluded even if their divided coordinates would fall
/// inside the rectangle.
#[inline]
#[must_use]
pub fn classify(
    point: Vec3,
    projection_view: &Mat4,
    bounds: &NormalizedBounds,
) -> bool {
    project_to_screen(point, projection_view).is_some_and(|s| bounds.contains(s))
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;

    /// World x/y that the identity matrix maps to screen position `s`.
    fn world_for_screen(s: f32) -> f32 {
        2.0f32.mul_add(s, -1.0)
    }

    fn diagonal_points() -> Vec<Vec3> {
        [0.1, 0.4, 0.6, 0.9]
            .iter()
            .map(|&s| Vec3::new(world_for_screen(s), world_for_screen(s), 0.5))
            .collect()
    }

    #[test]
    fn selects_lower_left_quadrant() {
        let bounds =
            NormalizedBounds::from_corners(Vec2::ZERO, Vec2::splat(0.5));
        let hits: Vec<usize> = diagonal_points()
            .iter()
            .enumerate()
            .filter(|(_, p)| classify(**p, &Mat4::IDENTITY, &bounds))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(hits, vec![0, 1]);
    }

    #[test]
    fn negative_w_is_excluded_even_inside_rect() {
        // Last row of the matrix sets w = -1 for every point; x and y are
        // negated as well so that x/w lands back inside [0, 1].
        let flip = Mat4::from_cols(
            Vec4::new(-1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, -1.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, -1.0),
        );
        let p = Vec3::new(world_for_screen(0.4), world_for_screen(0.4), 0.5);
        let clip = flip * p.extend(1.0);
        assert_eq!(clip.w, -1.0);
        let divided = Vec2::new(clip.x, clip.y) / clip.w * 0.5 + 0.5;
        assert!(NormalizedBounds::FULL.contains(divided));

        assert!(!classify(p, &flip, &NormalizedBounds::FULL));
        assert!(classify(p, &Mat4::IDENTITY, &NormalizedBounds::FULL));
    }

    #[test]
    fn zero_w_is_excluded_without_dividing() {
        let collapse = Mat4::from_cols(
            Vec4::X,
            Vec4::Y,
            Vec4::Z,
            Vec4::new(0.0, 0.0, 0.0, 0.0),
        );
        let p = Vec3::ZERO;
        assert_eq!((collapse * p.extend(1.0)).w, 0.0);
        assert!(project_to_screen(p, &collapse).is_none());
        assert!(!classify(p, &collapse, &NormalizedBounds::FULL));
    }

    #[test]
    fn classify_is_deterministic() {
        let pv = Mat4::perspective_rh(45f32.to_radians(), 1.5, 0.1, 100.0)
            * Mat4::look_at_rh(Vec3::new(3.0, 4.0, 5.0), Vec3::ZERO, Vec3::Y);
        let bounds =
            NormalizedBounds::from_corners(Vec2::splat(0.2), Vec2::splat(0.7));
        for p in diagonal_points() {
            let first = classify(p, &pv, &bounds);
            assert!((0..10).all(|_| classify(p, &pv, &bounds) == first));
        }
    }

    #[test]
    fn perspective_camera_centers_its_target() {
        let pv = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 100.0)
            * Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let screen = project_to_screen(Vec3::ZERO, &pv).unwrap();
        assert!((screen - Vec2::splat(0.5)).length() < 1e-5);
        // Behind the eye
        assert!(project_to_screen(Vec3::new(0.0, 0.0, 20.0), &pv).is_none());
    }
}
