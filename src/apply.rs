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

//! Covers the obfuscated areas of an image with a solid color.

use std::path::Path;

use clap::ValueEnum;
use image::{save_buffer, ColorType, DynamicImage, Rgba, RgbaImage};
use ndarray::prelude::*;
use ndarray::Zip;
use tracing::info;

use crate::error::{Error, Result};
use crate::mask::Mask;

/// Color painted over obfuscated pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FillColor {
    Black,
    White,
    #[default]
    Gray,
}

impl FillColor {
    pub fn rgba(self) -> Rgba<u8> {
        match self {
            Self::Black => Rgba([0, 0, 0, 255]),
            Self::White => Rgba([255, 255, 255, 255]),
            Self::Gray => Rgba([128, 128, 128, 255]),
        }
    }
}

/// Raw composited image, in the color type of its source.
#[derive(Debug, Clone)]
pub struct MaskedImage {
    color: ColorType,
    /// Bytes with shape `(height, width, bytes per pixel)`
    data: Array3<u8>,
}

impl MaskedImage {
    pub fn width(&self) -> u32 {
        self.data.shape()[1] as u32
    }

    pub fn height(&self) -> u32 {
        self.data.shape()[0] as u32
    }

    pub fn color(&self) -> ColorType {
        self.color
    }

    /// Pixel bytes, same layout as [`DynamicImage::as_bytes`].
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_slice().expect("Should be standard-layout")
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_buffer(
            path,
            self.as_bytes(),
            self.width(),
            self.height(),
            self.color,
        )?;
        Ok(())
    }
}

/// Solid image of `fill` with the size and color type of `im`.
fn solid_like(im: &DynamicImage, fill: FillColor) -> Result<DynamicImage> {
    let solid = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        im.width(),
        im.height(),
        fill.rgba(),
    ));
    Ok(match im.color() {
        ColorType::L8 => DynamicImage::ImageLuma8(solid.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(solid.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(solid.to_rgb8()),
        ColorType::Rgba8 => solid,
        ColorType::L16 => DynamicImage::ImageLuma16(solid.to_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(solid.to_luma_alpha16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(solid.to_rgb16()),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(solid.to_rgba16()),
        ColorType::Rgb32F => DynamicImage::ImageRgb32F(solid.to_rgb32f()),
        ColorType::Rgba32F => DynamicImage::ImageRgba32F(solid.to_rgba32f()),
        other => return Err(Error::UnsupportedColor(other)),
    })
}

/// Picks `fg` where `keep` is set and `bg` elsewhere.
fn composite(fg: &DynamicImage, bg: &DynamicImage, keep: &Mask) -> Result<Array3<u8>> {
    let shape = (
        fg.height() as usize,
        fg.width() as usize,
        fg.color().bytes_per_pixel() as usize,
    );
    let fg = <ArrayView3<u8>>::from_shape(shape, fg.as_bytes())?;
    let bg = <ArrayView3<u8>>::from_shape(shape, bg.as_bytes())?;

    let mut out = fg.to_owned();
    Zip::from(out.lanes_mut(Axis(2)))
        .and(bg.lanes(Axis(2)))
        .and(keep.bits())
        .for_each(|mut px, b, &k| {
            if !k {
                px.assign(&b);
            }
        });
    Ok(out)
}

/// Obfuscates `im` with a low resolution mask.
///
/// The mask is stretched by `(sx, sy)` and cropped to the image. Pixels
/// under a set mask bit become `fill`, the rest are copied unchanged.
pub fn apply_mask(
    im: &DynamicImage,
    mask: &Mask,
    (sx, sy): (u32, u32),
    fill: FillColor,
) -> Result<MaskedImage> {
    let obfuscated = mask.stretch(sx, sy, im.width(), im.height())?;
    info!(
        pixels = obfuscated.count(),
        total = u64::from(im.width()) * u64::from(im.height()),
        "obfuscating"
    );

    let background = solid_like(im, fill)?;
    let keep = obfuscated.inverted();
    let data = composite(im, &background, &keep)?;

    Ok(MaskedImage {
        color: im.color(),
        data,
    })
}
