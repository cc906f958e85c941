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

//! Dumps image samples as hex text, one block per row:
//!
//! ```text
//! // 0
//! 00 1f ff
//!
//! // 1
//! ...
//! ```

use std::io::{self, Write};

use image::{DynamicImage, GrayImage, Luma};
use ndarray::prelude::*;

use crate::error::Result;

pub const CANVAS_WIDTH: u32 = 320;
pub const CANVAS_HEIGHT: u32 = 240;

/// Converts to 8-bit grayscale and pastes at the origin of a black
/// `width`x`height` canvas. Larger images are cropped.
pub fn fit_to_canvas(im: &DynamicImage, width: u32, height: u32) -> GrayImage {
    let luma = im.to_luma8();
    GrayImage::from_fn(width, height, |x, y| {
        luma.get_pixel_checked(x, y).copied().unwrap_or(Luma([0]))
    })
}

/// 8-bit samples with shape `(height, width, channels)`, keeping the
/// image's channel layout.
pub fn samples_u8(im: &DynamicImage) -> Result<Array3<u8>> {
    let channels = im.color().channel_count() as usize;
    let raw = match channels {
        1 => im.to_luma8().into_raw(),
        2 => im.to_luma_alpha8().into_raw(),
        3 => im.to_rgb8().into_raw(),
        _ => im.to_rgba8().into_raw(),
    };
    let channels = channels.min(4);
    Ok(Array3::from_shape_vec(
        (im.height() as usize, im.width() as usize, channels),
        raw,
    )?)
}

/// Writes the hex dump of `(height, width, channels)` samples.
pub fn write_hex_rows<W: Write>(out: &mut W, samples: ArrayView3<'_, u8>) -> io::Result<()> {
    for (i, row) in samples.outer_iter().enumerate() {
        writeln!(out, "// {i}")?;
        for (j, v) in row.iter().enumerate() {
            if j > 0 {
                out.write_all(b" ")?;
            }
            write!(out, "{v:02x}")?;
        }
        writeln!(out)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Dumps an image, optionally fitted to a canvas first.
pub fn dump_image<W: Write>(
    out: &mut W,
    im: &DynamicImage,
    canvas: Option<(u32, u32)>,
) -> Result<()> {
    let samples = match canvas {
        Some((w, h)) => samples_u8(&DynamicImage::ImageLuma8(fit_to_canvas(im, w, h)))?,
        None => samples_u8(im)?,
    };
    write_hex_rows(out, samples.view())?;
    Ok(())
}
