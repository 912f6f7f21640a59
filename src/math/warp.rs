// Copyright @yucwang 2023

use super::constants::{ INV_FOUR_PI, PI, TWO_PI, Float, Vector2f, Vector3f };

pub fn sample_uniform_disk_concentric(u: &Vector2f) -> Vector2f {
    let r1: Float = 2.0 * u.x - 1.0;
    let r2: Float = 2.0 * u.y - 1.0;

    let phi: Float;
    let r:   Float;

    if r1 == 0. && r2 == 0. {
        r = 0.0;
        phi = 0.0;
    } else if r1 * r1 > r2 * r2 {
        r = r1;
        phi = (PI / 4.0) * (r2 / r1);
    } else {
        r = r2;
        phi = (PI / 2.0) - (r1 / r2) * (PI / 4.0);
    }

    let (sin_phi, cos_phi) = phi.sin_cos();

    Vector2f::new(r * cos_phi, r * sin_phi)
}

/// Maps `u` onto a regular polygon with `blades` sides rotated by `angle`
/// radians. `u.x` selects the blade sector and the position along its edge,
/// `u.y` the radial distance.
pub fn sample_polygon_aperture(u: &Vector2f, blades: u32, angle: Float) -> Vector2f {
    let blades = blades.max(1) as Float;
    let lens_y = u.x * blades;
    let side = lens_y.floor();
    let offset = lens_y - side;
    let distance = u.y.max(0.0).sqrt();

    let a0 = side * TWO_PI / blades + angle;
    let a1 = (side + 1.0) * TWO_PI / blades + angle;

    let eye_x = (a0.cos() * (1.0 - offset) + a1.cos() * offset) * distance;
    let eye_y = (a0.sin() * (1.0 - offset) + a1.sin() * offset) * distance;

    Vector2f::new(eye_x, eye_y)
}

pub fn sample_uniform_sphere(u: &Vector2f) -> Vector3f {
    let z: Float = 1.0 - 2.0 * u.x;
    let r: Float = (1.0 - z * z).max(0.0).sqrt();
    let phi: Float = TWO_PI * u.y;

    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn sample_uniform_sphere_pdf() -> Float {
    INV_FOUR_PI
}

/// Uniform-area sample of the annulus `inner <= r <= 1` in the z = 0 plane.
pub fn sample_uniform_ring(u: &Vector2f, inner: Float) -> Vector2f {
    let inner2 = inner * inner;
    let r = (inner2 + (1.0 - inner2) * u.x).sqrt();
    let phi = TWO_PI * u.y;

    Vector2f::new(r * phi.cos(), r * phi.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concentric_disk_stays_inside_unit_disk() {
        for i in 0..16 {
            for j in 0..16 {
                let u = Vector2f::new(i as Float / 16.0, j as Float / 16.0);
                let p = sample_uniform_disk_concentric(&u);
                assert!(p.norm() <= 1.0 + 1e-5);
            }
        }
        let center = sample_uniform_disk_concentric(&Vector2f::new(0.5, 0.5));
        assert_eq!(center, Vector2f::new(0.0, 0.0));
    }

    #[test]
    fn test_polygon_aperture_hits_vertices() {
        // The start of each sector at full radius is a polygon vertex.
        let p = sample_polygon_aperture(&Vector2f::new(0.0, 1.0), 6, 0.0);
        assert!((p - Vector2f::new(1.0, 0.0)).norm() < 1e-5);

        let p = sample_polygon_aperture(&Vector2f::new(1.0 / 6.0, 1.0), 6, 0.0);
        let expected = Vector2f::new((TWO_PI / 6.0).cos(), (TWO_PI / 6.0).sin());
        assert!((p - expected).norm() < 1e-4);

        let center = sample_polygon_aperture(&Vector2f::new(0.3, 0.0), 5, 0.2);
        assert!(center.norm() < 1e-6);
    }

    #[test]
    fn test_uniform_sphere_is_unit() {
        let p = sample_uniform_sphere(&Vector2f::new(0.3, 0.7));
        assert!((p.norm() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ring_respects_inner_radius() {
        let p = sample_uniform_ring(&Vector2f::new(0.0, 0.25), 0.5);
        assert!((p.norm() - 0.5).abs() < 1e-5);
        let p = sample_uniform_ring(&Vector2f::new(0.999, 0.25), 0.5);
        assert!(p.norm() <= 1.0);
    }
}
