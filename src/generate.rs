// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Random obfuscation mask generation.
//!
//! A mask is salt-and-pepper noise with a number of filled circles drawn
//! on top. Radii are exponentially distributed around a mean and always
//! leave at least one pixel between the circle and the edge of the
//! shorter side.

use ndarray::prelude::*;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256StarStar;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::mask::Mask;

/// Mask generation parameters. Build with [`MaskParams::builder`].
#[derive(Debug, Clone, PartialEq)]
pub struct MaskParams {
    width: u32,
    height: u32,
    circles: usize,
    radius: f64,
    noise: f64,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            width: 40,
            height: 30,
            circles: 1,
            radius: 10.0,
            noise: 0.2,
        }
    }
}

impl MaskParams {
    pub fn builder() -> MaskParamsBuilder {
        MaskParamsBuilder::new()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Largest radius a circle may have, `floor(min(w, h) / 2) - 1`.
    pub fn max_radius(&self) -> i64 {
        i64::from(self.width.min(self.height) / 2) - 1
    }
}

#[derive(Debug, Clone, Default)]
pub struct MaskParamsBuilder {
    params: MaskParams,
}

impl MaskParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(mut self, width: u32) -> Self {
        self.params.width = width;
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.params.height = height;
        self
    }

    /// Number of circles.
    pub fn circles(mut self, circles: usize) -> Self {
        self.params.circles = circles;
        self
    }

    /// Mean circle radius.
    pub fn radius(mut self, radius: f64) -> Self {
        self.params.radius = radius;
        self
    }

    /// Probability of each pixel being set by noise.
    pub fn noise(mut self, noise: f64) -> Self {
        self.params.noise = noise;
        self
    }

    pub fn build(self) -> MaskParams {
        self.params
    }
}

/// Filled circle drawn onto a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Circle {
    pub x: i64,
    pub y: i64,
    pub radius: u32,
}

impl Circle {
    /// Whether `(x, y)` is inside or on the circle.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        let (dx, dy) = (x - self.x, y - self.y);
        let r = i64::from(self.radius);
        dx * dx + dy * dy <= r * r
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedMask {
    pub mask: Mask,
    pub circles: Vec<Circle>,
}

/// Creates the random generator used for a seed string.
///
/// The seed is hashed, so any string is a valid seed.
pub fn seeded_rng(seed: &str) -> Xoshiro256StarStar {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    Xoshiro256StarStar::from_seed(hasher.finalize().into())
}

/// Generates a mask.
///
/// The result only depends on `params` and the state of `random`.
pub fn generate_mask<R: Rng>(params: &MaskParams, random: &mut R) -> Result<GeneratedMask> {
    if !(0.0..=1.0).contains(&params.noise) {
        return Err(Error::InvalidNoise(params.noise));
    }
    if !(params.radius.is_finite() && params.radius >= 0.0) {
        return Err(Error::InvalidRadius(params.radius));
    }
    let max_radius = params.max_radius();
    if params.circles > 0 && max_radius < 1 {
        return Err(Error::CanvasTooSmall {
            width: params.width,
            height: params.height,
        });
    }

    let (w, h) = (params.width as usize, params.height as usize);
    let mut bits = <Array2<bool>>::default((h, w));

    for b in bits.iter_mut() {
        *b = random.gen_bool(params.noise);
    }

    let mut circles = Vec::with_capacity(params.circles);
    for _ in 0..params.circles {
        let radius = sample_radius(params.radius, max_radius as u32, random);
        let r = f64::from(radius);
        let circle = Circle {
            x: random.gen_range(r..=params.width as f64 - r).round() as i64,
            y: random.gen_range(r..=params.height as f64 - r).round() as i64,
            radius,
        };
        draw_circle(bits.view_mut(), &circle);
        debug!(?circle, "placed circle");
        circles.push(circle);
    }

    Ok(GeneratedMask {
        mask: Mask::from_bits(bits),
        circles,
    })
}

/// Rounded-up exponential draw, redrawn until it's at most `max`.
fn sample_radius<R: Rng>(mean: f64, max: u32, random: &mut R) -> u32 {
    loop {
        // Inverse CDF, 1 - u is in (0, 1]
        let r = (-mean * (1.0 - random.gen::<f64>()).ln()).ceil();
        if r <= f64::from(max) {
            return r as u32;
        }
    }
}

/// Sets every pixel of the circle, clipped to the canvas.
fn draw_circle(mut bits: ArrayViewMut2<'_, bool>, circle: &Circle) {
    let r = i64::from(circle.radius);
    let (h, w) = (bits.nrows() as i64, bits.ncols() as i64);
    let (x0, x1) = ((circle.x - r).max(0), (circle.x + r).min(w - 1));
    let (y0, y1) = ((circle.y - r).max(0), (circle.y + r).min(h - 1));
    if x0 > x1 || y0 > y1 {
        return;
    }

    let mut window = bits.slice_mut(s![y0 as usize..=y1 as usize, x0 as usize..=x1 as usize]);
    azip!((index (y, x), b in &mut window) {
        if circle.contains(x0 + x as i64, y0 + y as i64) {
            *b = true;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_mask() {
        let params = MaskParams::builder().circles(4).radius(5.0).build();
        let a = generate_mask(&params, &mut seeded_rng("0")).unwrap();
        let b = generate_mask(&params, &mut seeded_rng("0")).unwrap();
        assert_eq!(a.mask, b.mask);
        assert_eq!(a.circles, b.circles);

        let c = generate_mask(&params, &mut seeded_rng("1")).unwrap();
        assert_ne!(a.mask, c.mask);
    }

    #[test]
    fn dimensions_match() {
        let params = MaskParams::builder().width(17).height(9).build();
        let out = generate_mask(&params, &mut seeded_rng("dims")).unwrap();
        assert_eq!(out.mask.width(), 17);
        assert_eq!(out.mask.height(), 9);
    }

    #[test]
    fn radius_never_exceeds_limit() {
        let params = MaskParams::builder()
            .width(40)
            .height(12)
            .circles(200)
            .radius(30.0)
            .noise(0.0)
            .build();
        assert_eq!(params.max_radius(), 5);
        for seed in 0..10 {
            let out = generate_mask(&params, &mut seeded_rng(&seed.to_string())).unwrap();
            assert_eq!(out.circles.len(), 200);
            assert!(out.circles.iter().all(|c| c.radius <= 5));
        }
    }

    #[test]
    fn circles_are_filled() {
        let params = MaskParams::builder()
            .width(64)
            .height(64)
            .circles(3)
            .radius(8.0)
            .noise(0.0)
            .build();
        let out = generate_mask(&params, &mut seeded_rng("fill")).unwrap();
        for y in 0..64 {
            for x in 0..64 {
                let inside = out.circles.iter().any(|c| c.contains(x, y));
                assert_eq!(out.mask.get(x as u32, y as u32), inside, "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn noise_extremes() {
        let full = MaskParams::builder().circles(0).noise(1.0).build();
        let out = generate_mask(&full, &mut seeded_rng("n")).unwrap();
        assert_eq!(out.mask.count(), 40 * 30);

        let none = MaskParams::builder().circles(0).noise(0.0).build();
        let out = generate_mask(&none, &mut seeded_rng("n")).unwrap();
        assert_eq!(out.mask.count(), 0);
    }

    #[test]
    fn rejects_bad_params() {
        let params = MaskParams::builder().noise(1.5).build();
        assert!(matches!(
            generate_mask(&params, &mut seeded_rng("")),
            Err(Error::InvalidNoise(_))
        ));

        let params = MaskParams::builder().width(3).height(100).build();
        assert!(matches!(
            generate_mask(&params, &mut seeded_rng("")),
            Err(Error::CanvasTooSmall { .. })
        ));

        // No circles, so a tiny canvas is fine
        let params = MaskParams::builder().width(1).height(1).circles(0).build();
        assert!(generate_mask(&params, &mut seeded_rng("")).is_ok());
    }

    #[test]
    fn draw_circle_clips() {
        let mut bits = Array2::default((5, 5));
        draw_circle(bits.view_mut(), &Circle { x: 5, y: 2, radius: 2 });
        assert!(bits[[2, 4]]);
        assert!(bits[[2, 3]]);
        assert!(!bits[[2, 2]]);
        assert!(!bits[[0, 4]]);
    }
}
