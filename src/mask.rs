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

use std::path::Path;

use image::{DynamicImage, GrayImage, Luma};
use ndarray::parallel::prelude::*;
use ndarray::prelude::*;
use tracing::warn;

use crate::error::{Error, Result};
use crate::io::{open_image, save_bilevel};

/// Obfuscation mask.
///
/// A `true` pixel is obfuscated. Bits are indexed `[[y, x]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    bits: Array2<bool>,
}

impl Mask {
    /// Creates an all-clear mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bits: Array2::default((height as usize, width as usize)),
        }
    }

    pub fn from_bits(bits: Array2<bool>) -> Self {
        Self { bits }
    }

    /// Treats every pixel with a nonzero color channel as obfuscated.
    ///
    /// Samples are tested at their native depth, so a 16-bit value of 1
    /// still counts. Alpha is ignored.
    pub fn from_image(im: &DynamicImage) -> Self {
        let color = im.color();
        let channels = color.channel_count() as usize;
        let shown = if color.has_alpha() {
            channels - 1
        } else {
            channels
        };

        let nonzero = if let Some(s) = im.as_flat_samples_u8() {
            nonzero_pixels(s.samples, channels, shown)
        } else if let Some(s) = im.as_flat_samples_u16() {
            nonzero_pixels(s.samples, channels, shown)
        } else if let Some(s) = im.as_flat_samples_f32() {
            nonzero_pixels(s.samples, channels, shown)
        } else {
            nonzero_pixels(im.to_rgb8().as_raw(), 3, 3)
        };

        let bits = Array2::from_shape_vec((im.height() as usize, im.width() as usize), nonzero)
            .expect("One flag per pixel");
        Self { bits }
    }

    /// Loads a mask file.
    ///
    /// Masks that aren't stored as one-bit are still accepted, with a
    /// warning, and any nonzero pixel counts as obfuscated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let loaded = open_image(path)?;
        if !loaded.is_one_bit() {
            warn!(
                "{} doesn't have one-bit depth, rounding all non-zero pixels to 1",
                path.display()
            );
        }
        Ok(Self::from_image(&loaded.image))
    }

    /// Saves the mask, obfuscated pixels white.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_bilevel(path, &self.to_luma8())
    }

    pub fn width(&self) -> u32 {
        self.bits.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.bits.nrows() as u32
    }

    /// Returns `false` for pixels outside of the mask.
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits
            .get((y as usize, x as usize))
            .copied()
            .unwrap_or(false)
    }

    pub fn bits(&self) -> ArrayView2<'_, bool> {
        self.bits.view()
    }

    /// Number of obfuscated pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Mask with every pixel flipped.
    pub fn inverted(&self) -> Self {
        Self {
            bits: self.bits.mapv(|b| !b),
        }
    }

    /// Converts to grayscale, obfuscated pixels 255 and the rest 0.
    pub fn to_luma8(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([if self.get(x, y) { 255 } else { 0 }])
        })
    }

    /// Nearest-neighbour upscale by `(sx, sy)`, then crop to `width`x`height`
    /// anchored at the origin.
    ///
    /// Whatever the stretched mask doesn't cover is left clear.
    pub fn stretch(&self, sx: u32, sy: u32, width: u32, height: u32) -> Result<Self> {
        if sx == 0 || sy == 0 {
            return Err(Error::InvalidStretch { x: sx, y: sy });
        }

        let (sw, sh) = (
            u64::from(self.width()) * u64::from(sx),
            u64::from(self.height()) * u64::from(sy),
        );
        if sw < u64::from(width) || sh < u64::from(height) {
            warn!(
                "stretched mask is {sw}x{sh}, smaller than {width}x{height}, uncovered pixels stay clear"
            );
        }

        let (sx, sy) = (sx as usize, sy as usize);
        let src = &self.bits;
        let mut bits = <Array2<bool>>::default((height as usize, width as usize));
        par_azip!((index (y, x), b in &mut bits) {
            *b = src.get((y / sy, x / sx)).copied().unwrap_or(false);
        });
        Ok(Self { bits })
    }
}

/// One flag per pixel, set if any of its first `shown` channels is nonzero.
fn nonzero_pixels<T>(samples: &[T], channels: usize, shown: usize) -> Vec<bool>
where
    T: PartialEq + Default,
{
    let zero = T::default();
    samples
        .chunks_exact(channels)
        .map(|px| px[..shown].iter().any(|v| *v != zero))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, LumaA, Rgb, Rgb32FImage, RgbImage};

    #[test]
    fn from_image_rounds_nonzero() {
        let mut im = GrayImage::new(3, 1);
        im.put_pixel(1, 0, Luma([1]));
        im.put_pixel(2, 0, Luma([200]));
        let mask = Mask::from_image(&DynamicImage::ImageLuma8(im));
        assert_eq!(mask.bits(), array![[false, true, true]]);
    }

    #[test]
    fn from_image_checks_every_channel() {
        let mut im = RgbImage::new(2, 1);
        im.put_pixel(0, 0, Rgb([0, 0, 3]));
        let mask = Mask::from_image(&DynamicImage::ImageRgb8(im));
        assert!(mask.get(0, 0));
        assert!(!mask.get(1, 0));
    }

    #[test]
    fn from_image_keeps_sixteen_bit_depth() {
        let im = ImageBuffer::from_pixel(2, 1, Luma([1u16]));
        let mask = Mask::from_image(&DynamicImage::ImageLuma16(im));
        assert_eq!(mask.bits(), array![[true, true]]);

        let mut im = ImageBuffer::from_pixel(2, 1, Luma([0u16]));
        im.put_pixel(1, 0, Luma([u16::MAX]));
        let mask = Mask::from_image(&DynamicImage::ImageLuma16(im));
        assert_eq!(mask.bits(), array![[false, true]]);
    }

    #[test]
    fn from_image_keeps_small_floats() {
        let mut im = Rgb32FImage::new(2, 1);
        im.put_pixel(0, 0, Rgb([0.0, 1e-4, 0.0]));
        let mask = Mask::from_image(&DynamicImage::ImageRgb32F(im));
        assert_eq!(mask.bits(), array![[true, false]]);
    }

    #[test]
    fn from_image_ignores_alpha() {
        let mut im = ImageBuffer::from_pixel(3, 1, LumaA([0u8, 255]));
        im.put_pixel(1, 0, LumaA([7, 0]));
        im.put_pixel(2, 0, LumaA([255, 255]));
        let mask = Mask::from_image(&DynamicImage::ImageLumaA8(im));
        assert_eq!(mask.bits(), array![[false, true, true]]);
    }

    #[test]
    fn stretch_repeats_blocks() {
        let mask = Mask::from_bits(array![[true, false], [false, true]]);
        let out = mask.stretch(3, 2, 6, 4).unwrap();
        assert_eq!(out.width(), 6);
        assert_eq!(out.height(), 4);
        for y in 0..4 {
            for x in 0..6 {
                assert_eq!(out.get(x, y), mask.get(x / 3, y / 2), "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn stretch_crops_and_pads() {
        let mask = Mask::from_bits(Array2::from_elem((2, 2), true));
        let cropped = mask.stretch(4, 4, 5, 3).unwrap();
        assert_eq!(cropped.count(), 15);

        let padded = mask.stretch(1, 1, 4, 4).unwrap();
        assert_eq!(padded.count(), 4);
        assert!(!padded.get(3, 3));
    }

    #[test]
    fn stretch_rejects_zero() {
        let mask = Mask::new(2, 2);
        assert!(matches!(
            mask.stretch(0, 1, 2, 2),
            Err(Error::InvalidStretch { x: 0, y: 1 })
        ));
    }

    #[test]
    fn luma_roundtrip() {
        let mask = Mask::from_bits(array![[true, false, false], [false, false, true]]);
        let im = DynamicImage::ImageLuma8(mask.to_luma8());
        assert_eq!(Mask::from_image(&im), mask);
    }
}
