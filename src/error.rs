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

//! Error type shared by all tools.
//!
//! Degraded-but-usable input (a mask that isn't one-bit, a width that
//! doesn't divide into words) is not an error; it is logged and processed.

use thiserror::Error;

/// Error returned by the library operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Noise density outside of `[0, 1]`
    #[error("noise density must be within [0, 1], got {0}")]
    InvalidNoise(f64),

    /// Negative or non-finite mean radius
    #[error("mean circle radius must be a non-negative number, got {0}")]
    InvalidRadius(f64),

    /// Canvas cannot hold a circle with one pixel of margin
    #[error("{width}x{height} canvas is too small to place circles")]
    CanvasTooSmall { width: u32, height: u32 },

    /// Zero stretch factor
    #[error("stretch factors must be nonzero, got {x}x{y}")]
    InvalidStretch { x: u32, y: u32 },

    /// Active bits are zero or wider than the word
    #[error("cannot use {active} bits of a {width}-bit word")]
    InvalidWordLayout { width: usize, active: usize },

    /// Negative or non-finite clamp limit
    #[error("clamp limit must be a non-negative number, got {0}")]
    InvalidClamp(f64),

    /// Images being compared have different sample counts
    #[error("sample count mismatch: {0} vs {1}")]
    SampleCountMismatch(usize, usize),

    /// Color layout the operation can't handle
    #[error("unsupported color type: {0:?}")]
    UnsupportedColor(image::ColorType),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias using [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
