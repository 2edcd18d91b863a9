//! Projective transform fitting for garment placement.
//!
//! A garment reference image is assumed frontal and upright, so its four
//! corners map onto the wearer's torso anchors (shoulders and hips). The
//! 3x3 homography is solved exactly from the four correspondences with the
//! Direct Linear Transform: each point pair contributes two equations to an
//! 8x8 system, solved by Gaussian elimination with partial pivoting. No
//! iterative refinement and no conditioning check: near-degenerate anchors
//! from bad pose data produce a visibly wrong warp rather than an error.

use crate::landmarks::AnchorSet;

/// An 8-degree-of-freedom projective mapping, stored row-major with its
/// precomputed inverse (warping samples through the inverse).
#[derive(Debug, Clone)]
pub struct PerspectiveTransform {
    matrix: [f64; 9],
    inverse: [f64; 9],
}

impl PerspectiveTransform {
    /// Compute the transform from 4 source points to 4 destination points.
    pub fn from_points(src: [(f64, f64); 4], dst: [(f64, f64); 4]) -> Self {
        Self {
            matrix: solve_homography(src, dst),
            inverse: solve_homography(dst, src),
        }
    }

    /// Fit a garment of the given size onto the destination anchors.
    ///
    /// Source correspondence points are the garment corners in fixed order
    /// top-left, top-right, bottom-right, bottom-left, matching
    /// left-shoulder, right-shoulder, right-hip, left-hip.
    pub fn fit_quad(garment_width: u32, garment_height: u32, anchors: &AnchorSet) -> Self {
        let w = (garment_width - 1) as f64;
        let h = (garment_height - 1) as f64;
        let src = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
        Self::from_points(src, anchors.points())
    }

    /// Map a source point into destination space.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        project(&self.matrix, x, y)
    }

    /// Map a destination point back into source space.
    pub fn apply_inverse(&self, x: f64, y: f64) -> (f64, f64) {
        project(&self.inverse, x, y)
    }

    /// Row-major matrix entries, normalized so h9 = 1.
    pub fn matrix(&self) -> &[f64; 9] {
        &self.matrix
    }
}

fn project(h: &[f64; 9], x: f64, y: f64) -> (f64, f64) {
    let w = h[6] * x + h[7] * y + h[8];
    (
        (h[0] * x + h[1] * y + h[2]) / w,
        (h[3] * x + h[4] * y + h[5]) / w,
    )
}

/// Solve the 4-point homography via DLT.
///
/// For each correspondence (x,y) -> (x',y'):
///   x*h1 + y*h2 + h3 - x'*x*h7 - x'*y*h8 = x'
///   x*h4 + y*h5 + h6 - y'*x*h7 - y'*y*h8 = y'
/// with h9 fixed to 1.
fn solve_homography(src: [(f64, f64); 4], dst: [(f64, f64); 4]) -> [f64; 9] {
    let mut a = [[0.0f64; 8]; 8];
    let mut b = [0.0f64; 8];

    for i in 0..4 {
        let (x, y) = src[i];
        let (xp, yp) = dst[i];

        a[i * 2] = [x, y, 1.0, 0.0, 0.0, 0.0, -xp * x, -xp * y];
        b[i * 2] = xp;

        a[i * 2 + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -yp * x, -yp * y];
        b[i * 2 + 1] = yp;
    }

    let h = solve_linear_system(&mut a, &mut b);
    [h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0]
}

/// Gaussian elimination with partial pivoting on an 8x8 system.
fn solve_linear_system(a: &mut [[f64; 8]; 8], b: &mut [f64; 8]) -> [f64; 8] {
    let n = 8;

    for col in 0..n {
        let mut max_row = col;
        let mut max_val = a[col][col].abs();
        for row in (col + 1)..n {
            if a[row][col].abs() > max_val {
                max_val = a[row][col].abs();
                max_row = row;
            }
        }
        if max_row != col {
            a.swap(col, max_row);
            b.swap(col, max_row);
        }

        let pivot = a[col][col];
        if pivot.abs() < 1e-12 {
            // Degenerate correspondence; the caller gets an identity-like
            // mapping and a visibly wrong warp instead of a panic.
            log::warn!("near-singular perspective correspondence");
            return [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        }

        for row in (col + 1)..n {
            let factor = a[row][col] / pivot;
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution
    let mut x = [0.0f64; 8];
    for col in (0..n).rev() {
        let mut sum = b[col];
        for k in (col + 1)..n {
            sum -= a[col][k] * x[k];
        }
        x[col] = sum / a[col][col];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::AnchorSet;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_identity_from_coincident_corners() {
        let corners = [(0.0, 0.0), (299.0, 0.0), (299.0, 299.0), (0.0, 299.0)];
        let t = PerspectiveTransform::from_points(corners, corners);

        let expected = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        for (got, want) in t.matrix().iter().zip(expected.iter()) {
            assert!((got - want).abs() < EPS, "matrix {:?}", t.matrix());
        }
    }

    #[test]
    fn test_corners_map_to_anchors() {
        let anchors = AnchorSet {
            left_shoulder: (120.0, 150.0),
            right_shoulder: (280.0, 150.0),
            right_hip: (270.0, 400.0),
            left_hip: (130.0, 400.0),
        };
        let t = PerspectiveTransform::fit_quad(300, 300, &anchors);

        let src = [(0.0, 0.0), (299.0, 0.0), (299.0, 299.0), (0.0, 299.0)];
        for (corner, anchor) in src.iter().zip(anchors.points().iter()) {
            let (x, y) = t.apply(corner.0, corner.1);
            assert!((x - anchor.0).abs() < 1e-6 && (y - anchor.1).abs() < 1e-6);
        }
    }

    #[test]
    fn test_inverse_round_trip() {
        let anchors = AnchorSet {
            left_shoulder: (120.0, 150.0),
            right_shoulder: (280.0, 150.0),
            right_hip: (270.0, 400.0),
            left_hip: (130.0, 400.0),
        };
        let t = PerspectiveTransform::fit_quad(300, 300, &anchors);

        for &(x, y) in &[(12.0, 34.0), (150.0, 150.0), (250.0, 40.0)] {
            let (fx, fy) = t.apply(x, y);
            let (bx, by) = t.apply_inverse(fx, fy);
            assert!((bx - x).abs() < 1e-6 && (by - y).abs() < 1e-6);
        }
    }
}
