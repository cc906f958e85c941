//! Fixture tools for an image obfuscation pipeline.
//!
//! Each module is one tool:
//!
//! * [generate] makes random obfuscation masks.
//! * [diff] measures the distance between two images.
//! * [hexdump] prints image samples as hex text.
//! * [apply] covers the masked areas of an image.
//! * [bitfile] packs a mask into a Verilog bit file.
//! * [zigzag] builds the 8x8 zigzag scan table.
//! * [dct] builds an 8x8 block with high-magnitude DCT coefficients.
//!
//! Masks are one-bit images where a set pixel means "obfuscate",
//! see [Mask].

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
//

pub mod apply;
pub mod bitfile;
pub mod dct;
pub mod diff;
mod error;
pub mod generate;
pub mod hexdump;
pub mod io;
mod mask;
pub mod zigzag;

#[doc(inline)]
pub use crate::error::{Error, Result};
#[doc(inline)]
pub use crate::mask::Mask;
