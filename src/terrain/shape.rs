//! Land/water shape functions
//!
//! A shape decides, point by point, whether a location starts out as water.
//! Shapes are materialized from the run RNG before the terrain pipeline so
//! their parameters (bump counts, noise grids) are part of the deterministic
//! draw order.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::ShapeConfig;
use crate::geom::Rect;

/// Decides which points of the map start out as water.
pub trait WaterShape {
    fn is_water(&self, p: DVec2, bounds: &Rect) -> bool;
}

/// Irregular radial island: a sinusoid-modulated disc with a single inlet.
#[derive(Debug, Clone)]
pub struct RadialShape {
    /// 1.0 means no small islands; 2.0 leads to a lot.
    island_factor: f64,
    bumps: u32,
    start_angle: f64,
    dip_angle: f64,
    dip_width: f64,
}

impl RadialShape {
    const ISLAND_FACTOR: f64 = 1.07;

    /// Draw the island parameters from the run RNG.
    pub fn from_rng(rng: &mut ChaCha8Rng) -> Self {
        Self {
            island_factor: Self::ISLAND_FACTOR,
            bumps: rng.gen_range(1..=5),
            start_angle: rng.gen::<f64>() * TAU,
            dip_angle: rng.gen::<f64>() * TAU,
            dip_width: rng.gen::<f64>() * 0.5 + 0.2,
        }
    }
}

impl WaterShape for RadialShape {
    fn is_water(&self, p: DVec2, bounds: &Rect) -> bool {
        let q = DVec2::new(
            2.0 * (p.x / bounds.width - 0.5),
            2.0 * (p.y / bounds.height - 0.5),
        );

        let angle = q.y.atan2(q.x);
        let length = 0.5 * (q.x.abs().max(q.y.abs()) + q.length());
        let bumps = self.bumps as f64;

        let mut r1 = 0.5
            + 0.40 * (self.start_angle + bumps * angle + ((bumps + 3.0) * angle).cos()).sin();
        let mut r2 = 0.7
            - 0.20 * (self.start_angle + bumps * angle - ((bumps + 2.0) * angle).sin()).sin();
        if (angle - self.dip_angle).abs() < self.dip_width
            || (angle - self.dip_angle + TAU).abs() < self.dip_width
            || (angle - self.dip_angle - TAU).abs() < self.dip_width
        {
            r1 = 0.2;
            r2 = 0.2;
        }
        !(length < r1 || (length > r1 * self.island_factor && length < r2))
    }
}

/// Value-noise continents: smoothed white noise split at the densest decile.
#[derive(Debug, Clone)]
pub struct PerlinShape {
    noise: Vec<Vec<f64>>,
    median: f64,
}

impl PerlinShape {
    /// Build the noise grid from the run RNG.
    ///
    /// The white noise base is only filled inside a margin band so the map
    /// edges always come out as water; `octave_count` smoothing passes are
    /// blended with persistence 0.5.
    pub fn from_rng(
        rng: &mut ChaCha8Rng,
        octave_count: u32,
        noise_width: usize,
        noise_height: usize,
    ) -> Self {
        let white = Self::white_noise(rng, noise_width + 1, noise_height + 1);
        let noise = Self::blend_octaves(&white, octave_count);
        let median = Self::densest_decile(&noise);
        Self { noise, median }
    }

    fn white_noise(rng: &mut ChaCha8Rng, width: usize, height: usize) -> Vec<Vec<f64>> {
        let mut noise = vec![vec![0.0; height]; width];
        let i_end = (width as f64 * 0.96) as usize;
        let j_end = (height as f64 * 0.96) as usize;
        for row in noise.iter_mut().take(i_end).skip(width / 25) {
            for cell in row.iter_mut().take(j_end).skip(height / 25) {
                *cell = rng.gen::<f64>();
            }
        }
        noise
    }

    fn smooth(base: &[Vec<f64>], octave: u32) -> Vec<Vec<f64>> {
        let width = base.len();
        let height = base[0].len();
        let period = 1usize << octave;
        let frequency = 1.0 / period as f64;

        let mut out = vec![vec![0.0; height]; width];
        for i in 0..width {
            let i0 = (i / period) * period;
            let i1 = (i0 + period) % width;
            let hblend = (i - i0) as f64 * frequency;
            for j in 0..height {
                let j0 = (j / period) * period;
                let j1 = (j0 + period) % height;
                let vblend = (j - j0) as f64 * frequency;

                let top = lerp(base[i0][j0], base[i1][j0], hblend);
                let bottom = lerp(base[i0][j1], base[i1][j1], hblend);
                out[i][j] = lerp(top, bottom, vblend);
            }
        }
        out
    }

    fn blend_octaves(base: &[Vec<f64>], octave_count: u32) -> Vec<Vec<f64>> {
        let width = base.len();
        let height = base[0].len();
        if octave_count == 0 {
            return base.to_vec();
        }

        let smoothed: Vec<Vec<Vec<f64>>> =
            (0..octave_count).map(|o| Self::smooth(base, o)).collect();

        let persistence = 0.5;
        let mut blended = vec![vec![0.0; height]; width];
        let mut amplitude = 1.0;
        let mut total_amplitude = 0.0;
        for octave in (0..octave_count as usize).rev() {
            amplitude *= persistence;
            total_amplitude += amplitude;
            for i in 0..width {
                for j in 0..height {
                    blended[i][j] += smoothed[octave][i][j] * amplitude;
                }
            }
        }
        for row in &mut blended {
            for cell in row {
                *cell /= total_amplitude;
            }
        }
        blended
    }

    /// Threshold at the densest decile of the histogram, shifted to its
    /// middle. This puts the waterline where most of the noise mass sits.
    fn densest_decile(noise: &[Vec<f64>]) -> f64 {
        let mut count = [0u64; 10];
        for row in noise {
            for &value in row {
                for k in 1..=count.len() {
                    if value * 10.0 < k as f64 {
                        count[k - 1] += 1;
                        break;
                    }
                }
            }
        }
        let mut densest = 0;
        for i in 1..count.len() {
            if count[i] > count[densest] {
                densest = i;
            }
        }
        (densest as f64 + 0.5) / 10.0
    }
}

impl WaterShape for PerlinShape {
    fn is_water(&self, p: DVec2, bounds: &Rect) -> bool {
        let width = self.noise.len();
        let height = self.noise[0].len();
        let x = ((p.x / bounds.width * (width - 1) as f64) as usize).min(width - 1);
        let y = ((p.y / bounds.height * (height - 1) as f64) as usize).min(height - 1);
        self.noise[x][y] < self.median
    }
}

/// A five-lobed blob with two eyes, useful as a fixed test shape.
#[derive(Debug, Clone, Default)]
pub struct BlobShape;

impl WaterShape for BlobShape {
    fn is_water(&self, p: DVec2, bounds: &Rect) -> bool {
        let q = DVec2::new(
            2.0 * (p.x / bounds.width - 0.5),
            2.0 * (p.y / bounds.height - 0.5),
        );
        let eye1 = DVec2::new(q.x - 0.2, q.y / 2.0 + 0.2).length() < 0.05;
        let eye2 = DVec2::new(q.x + 0.2, q.y / 2.0 + 0.2).length() < 0.05;
        let body = q.length() < 0.8 - 0.18 * (5.0 * q.y.atan2(q.x)).sin();
        !body || eye1 || eye2
    }
}

/// The built-in shapes, materialized from a [`ShapeConfig`].
pub enum IslandShape {
    Radial(RadialShape),
    Perlin(PerlinShape),
    Blob(BlobShape),
}

impl IslandShape {
    /// Materialize the configured shape, drawing parameters from `rng`.
    pub fn materialize(config: ShapeConfig, rng: &mut ChaCha8Rng) -> IslandShape {
        match config {
            ShapeConfig::Radial => IslandShape::Radial(RadialShape::from_rng(rng)),
            ShapeConfig::Perlin {
                octave_count,
                noise_width,
                noise_height,
            } => IslandShape::Perlin(PerlinShape::from_rng(
                rng,
                octave_count,
                noise_width,
                noise_height,
            )),
            ShapeConfig::Blob => IslandShape::Blob(BlobShape),
        }
    }
}

impl WaterShape for IslandShape {
    fn is_water(&self, p: DVec2, bounds: &Rect) -> bool {
        match self {
            IslandShape::Radial(s) => s.is_water(p, bounds),
            IslandShape::Perlin(s) => s.is_water(p, bounds),
            IslandShape::Blob(s) => s.is_water(p, bounds),
        }
    }
}

#[inline]
fn lerp(x0: f64, x1: f64, alpha: f64) -> f64 {
    x0 * (1.0 - alpha) + x1 * alpha
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn bounds() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 1000.0)
    }

    #[test]
    fn test_radial_center_is_land_corners_are_water() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let shape = RadialShape::from_rng(&mut rng);
        let b = bounds();
        assert!(!shape.is_water(DVec2::new(500.0, 500.0), &b));
        assert!(shape.is_water(DVec2::new(0.0, 0.0), &b));
        assert!(shape.is_water(DVec2::new(1000.0, 0.0), &b));
        assert!(shape.is_water(DVec2::new(0.0, 1000.0), &b));
        assert!(shape.is_water(DVec2::new(1000.0, 1000.0), &b));
    }

    #[test]
    fn test_radial_is_deterministic() {
        let b = bounds();
        let mut rng0 = ChaCha8Rng::seed_from_u64(99);
        let mut rng1 = ChaCha8Rng::seed_from_u64(99);
        let s0 = RadialShape::from_rng(&mut rng0);
        let s1 = RadialShape::from_rng(&mut rng1);
        for x in (0..1000).step_by(97) {
            for y in (0..1000).step_by(89) {
                let p = DVec2::new(x as f64, y as f64);
                assert_eq!(s0.is_water(p, &b), s1.is_water(p, &b));
            }
        }
    }

    #[test]
    fn test_blob_shape() {
        let b = bounds();
        let blob = BlobShape;
        // Body center is land; the eyes and the far corners are water.
        assert!(!blob.is_water(DVec2::new(500.0, 500.0), &b));
        assert!(blob.is_water(DVec2::new(0.0, 0.0), &b));
        // eye1 at normalized (0.2, -0.4): x = 600, y = 300
        assert!(blob.is_water(DVec2::new(600.0, 300.0), &b));
        assert!(blob.is_water(DVec2::new(400.0, 300.0), &b));
    }

    #[test]
    fn test_perlin_margins_are_water() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let shape = PerlinShape::from_rng(&mut rng, 4, 256, 256);
        let b = bounds();
        // The unfilled margin band of the base noise stays below threshold.
        assert!(shape.is_water(DVec2::new(1.0, 1.0), &b));
        assert!(shape.is_water(DVec2::new(999.0, 999.0), &b));
    }

    #[test]
    fn test_perlin_has_both_land_and_water() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let shape = PerlinShape::from_rng(&mut rng, 4, 128, 128);
        let b = bounds();
        let mut land = 0;
        let mut water = 0;
        for x in (0..1000).step_by(13) {
            for y in (0..1000).step_by(17) {
                if shape.is_water(DVec2::new(x as f64, y as f64), &b) {
                    water += 1;
                } else {
                    land += 1;
                }
            }
        }
        assert!(land > 0);
        assert!(water > 0);
    }
}
