use super::Landmark;

/// 3点から頂点 `vertex` における角度を計算する (度, 0〜180)
///
/// x/y のみ使用し、深度 z は無視する。どちらかのベクトル長が 0 の場合は 0.0 を返す。
/// 単位ベクトルの外積と内積から atan2 で求めるため、1 を超える余弦は生じない。
pub fn joint_angle(a: &Landmark, vertex: &Landmark, c: &Landmark) -> f32 {
    let (x1, y1) = (a.x - vertex.x, a.y - vertex.y);
    let (x2, y2) = (c.x - vertex.x, c.y - vertex.y);

    // hypot は大きな座標でもオーバーフローしない
    let len1 = x1.hypot(y1);
    let len2 = x2.hypot(y2);
    if len1 == 0.0 || len2 == 0.0 || !len1.is_finite() || !len2.is_finite() {
        return 0.0;
    }

    let (ux1, uy1) = (x1 / len1, y1 / len1);
    let (ux2, uy2) = (x2 / len2, y2 / len2);
    let dot = ux1 * ux2 + uy1 * uy2;
    let cross = ux1 * uy2 - uy1 * ux2;

    let degrees = cross.abs().atan2(dot).to_degrees();
    if degrees.is_nan() {
        0.0
    } else {
        degrees.clamp(0.0, 180.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lm(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y, 0.0, 1.0)
    }

    fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_right_angle() {
        let angle = joint_angle(&lm(0.5, 2.0), &lm(1.0, 2.0), &lm(1.0, 3.0));
        assert!(approx_eq(angle, 90.0, 1e-4));
    }

    #[test]
    fn test_straight_line() {
        let angle = joint_angle(&lm(0.5, 1.0), &lm(0.5, 2.0), &lm(0.5, 3.0));
        assert!(approx_eq(angle, 180.0, 1e-3));
    }

    #[test]
    fn test_folded_back() {
        let angle = joint_angle(&lm(1.0, 0.0), &lm(0.0, 0.0), &lm(2.0, 0.0));
        assert_eq!(angle, 0.0);
    }

    #[test]
    fn test_forty_five() {
        let angle = joint_angle(&lm(1.0, 0.0), &lm(0.0, 0.0), &lm(1.0, 1.0));
        assert!(approx_eq(angle, 45.0, 1e-4));
    }

    #[test]
    fn test_coincident_points() {
        let p = lm(0.3, 0.7);
        assert_eq!(joint_angle(&p, &p, &p), 0.0);
    }

    #[test]
    fn test_vertex_equals_one_end() {
        assert_eq!(joint_angle(&lm(0.3, 0.7), &lm(0.3, 0.7), &lm(0.9, 0.1)), 0.0);
        assert_eq!(joint_angle(&lm(0.9, 0.1), &lm(0.3, 0.7), &lm(0.3, 0.7)), 0.0);
    }

    #[test]
    fn test_depth_ignored() {
        let flat = joint_angle(&lm(0.0, 1.0), &lm(0.0, 0.0), &lm(1.0, 0.0));
        let deep = joint_angle(
            &Landmark::new(0.0, 1.0, 5.0, 1.0),
            &Landmark::new(0.0, 0.0, -3.0, 1.0),
            &Landmark::new(1.0, 0.0, 0.7, 1.0),
        );
        assert_eq!(flat, deep);
    }

    #[test]
    fn test_always_in_range() {
        let coords = [-1.0e6_f32, -3.5, -1.0, -1.0e-6, 0.0, 1.0e-6, 0.25, 1.0, 7.0, 1.0e6];
        for &ax in &coords {
            for &by in &coords {
                for &cx in &coords {
                    let angle = joint_angle(&lm(ax, 0.3), &lm(0.1, by), &lm(cx, -0.2));
                    assert!(!angle.is_nan());
                    assert!((0.0..=180.0).contains(&angle), "angle {} out of range", angle);
                }
            }
        }
    }

    #[test]
    fn test_large_coordinates() {
        let angle = joint_angle(&lm(0.0, 1.0e20), &lm(0.0, 0.0), &lm(1.0e20, 0.0));
        assert!(approx_eq(angle, 90.0, 1e-3));

        let angle = joint_angle(&lm(-3.0e30, 0.0), &lm(0.0, 0.0), &lm(3.0e30, 0.0));
        assert!(approx_eq(angle, 180.0, 1e-3));
    }

    #[test]
    fn test_nan_input_is_zero() {
        let angle = joint_angle(&lm(f32::NAN, 0.0), &lm(0.0, 0.0), &lm(1.0, 0.0));
        assert_eq!(angle, 0.0);
    }
}
