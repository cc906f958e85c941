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

//! Verilog style bit files.
//!
//! A bit file holds one word per line, most significant bit first. Only
//! the low `active` bits of each word carry mask pixels; the rest are
//! padded with a fill character. With 8-bit words, 3 active bits and
//! pixels `abc...mno`:
//!
//! ```text
//! xxxxxcba
//! xxxxxfed
//!   ...
//! xxxxxonm
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use ndarray::prelude::*;
use tracing::warn;

use crate::error::{Error, Result};
use crate::mask::Mask;

/// Character allowed in a bit file word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BitChar {
    #[value(name = "0")]
    Zero,
    #[value(name = "1")]
    One,
    #[default]
    X,
    Z,
}

impl BitChar {
    pub fn as_char(self) -> char {
        match self {
            Self::Zero => '0',
            Self::One => '1',
            Self::X => 'x',
            Self::Z => 'z',
        }
    }
}

impl From<bool> for BitChar {
    fn from(v: bool) -> Self {
        if v {
            Self::One
        } else {
            Self::Zero
        }
    }
}

impl fmt::Display for BitChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Word width, data bits per word and the fill for the unused bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordLayout {
    width: usize,
    active: usize,
    fill: BitChar,
}

impl WordLayout {
    /// `active` defaults to the whole word.
    pub fn new(width: usize, active: Option<usize>, fill: BitChar) -> Result<Self> {
        let active = active.unwrap_or(width);
        if active == 0 || active > width {
            return Err(Error::InvalidWordLayout { width, active });
        }
        Ok(Self {
            width,
            active,
            fill,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn fill(&self) -> BitChar {
        self.fill
    }
}

/// Words of a bit file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitfile {
    words: Vec<String>,
}

impl Bitfile {
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for word in &self.words {
            writeln!(out, "{word}")?;
        }
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out)?;
        out.flush()?;
        Ok(())
    }
}

/// Packs mask pixels into words.
///
/// Pixels are taken row-major, `layout.active()` at a time, and the first
/// pixel of each group becomes the least significant bit. A width that
/// doesn't divide into groups makes words straddle rows, and a trailing
/// partial group is dropped.
pub fn pack_mask(mask: &Mask, layout: &WordLayout) -> Result<Bitfile> {
    let active = layout.active;
    if mask.width() as usize % active != 0 {
        warn!(
            "mask image width {} is not a multiple of {} active bits",
            mask.width(),
            active
        );
    }

    let flat: Array1<bool> = mask.bits().iter().copied().collect();
    let count = flat.len() / active;
    let rest = flat.len() % active;
    if rest != 0 {
        warn!("dropping {rest} trailing pixels that don't fill a word");
    }

    let groups = flat
        .slice_move(s![..count * active])
        .into_shape((count, active))?;

    let pad: String = std::iter::repeat(layout.fill.as_char())
        .take(layout.width - active)
        .collect();
    let words = groups
        .outer_iter()
        .map(|g| {
            let mut word = pad.clone();
            word.extend(g.iter().rev().map(|&b| BitChar::from(b).as_char()));
            word
        })
        .collect();

    Ok(Bitfile { words })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(bits: &[bool]) -> Mask {
        Mask::from_bits(Array2::from_shape_vec((1, bits.len()), bits.to_vec()).unwrap())
    }

    #[test]
    fn all_zero() {
        let mask = Mask::new(8 * 3, 1);
        let layout = WordLayout::new(8, None, BitChar::Zero).unwrap();
        let out = pack_mask(&mask, &layout).unwrap();
        assert_eq!(out.words(), ["00000000"; 3]);
    }

    #[test]
    fn first_pixel_is_lsb() {
        let mask = row(&[true, false, false, false, false, false, false, false]);
        let layout = WordLayout::new(8, Some(8), BitChar::X).unwrap();
        let out = pack_mask(&mask, &layout).unwrap();
        assert_eq!(out.words(), ["00000001"]);
    }

    #[test]
    fn padding() {
        // abcdef = 1 1 0 0 0 1
        let mask = row(&[true, true, false, false, false, true]);
        let layout = WordLayout::new(8, Some(3), BitChar::Z).unwrap();
        let out = pack_mask(&mask, &layout).unwrap();
        assert_eq!(out.words(), ["zzzzz011", "zzzzz100"]);
    }

    #[test]
    fn straddles_rows_and_truncates() {
        let mask = Mask::from_bits(array![
            [true, false, false],
            [false, true, true],
            [true, true, false]
        ]);
        let layout = WordLayout::new(4, None, BitChar::X).unwrap();
        let out = pack_mask(&mask, &layout).unwrap();
        // 1000 1111, the ninth pixel is dropped
        assert_eq!(out.words(), ["0001", "1111"]);
    }

    #[test]
    fn invalid_layouts() {
        assert!(matches!(
            WordLayout::new(8, Some(9), BitChar::X),
            Err(Error::InvalidWordLayout { width: 8, active: 9 })
        ));
        assert!(WordLayout::new(8, Some(0), BitChar::X).is_err());
        assert!(WordLayout::new(0, None, BitChar::X).is_err());
    }

    #[test]
    fn writes_lines() {
        let mask = row(&[false, true]);
        let layout = WordLayout::new(4, Some(2), BitChar::One).unwrap();
        let mut out = Vec::new();
        pack_mask(&mask, &layout).unwrap().write_to(&mut out).unwrap();
        assert_eq!(out, b"1110\n");
    }
}
