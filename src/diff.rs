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

use image::DynamicImage;
use ndarray::prelude::*;

use crate::error::{Error, Result};

/// Flattens all samples of an image, row-major with channels interleaved.
///
/// Samples keep their stored value (no normalization between bit depths).
pub fn flat_samples(im: &DynamicImage) -> Result<Array1<f64>> {
    if let Some(s) = im.as_flat_samples_u8() {
        Ok(s.samples.iter().map(|&v| f64::from(v)).collect())
    } else if let Some(s) = im.as_flat_samples_u16() {
        Ok(s.samples.iter().map(|&v| f64::from(v)).collect())
    } else if let Some(s) = im.as_flat_samples_f32() {
        Ok(s.samples.iter().map(|&v| f64::from(v)).collect())
    } else {
        Err(Error::UnsupportedColor(im.color()))
    }
}

/// Euclidean norm of the difference between two images' samples.
pub fn image_distance(a: &DynamicImage, b: &DynamicImage) -> Result<f64> {
    let (a, b) = (flat_samples(a)?, flat_samples(b)?);
    if a.len() != b.len() {
        return Err(Error::SampleCountMismatch(a.len(), b.len()));
    }

    let d = a - b;
    Ok(d.dot(&d).sqrt())
}
