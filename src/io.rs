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

//! Image loading and saving.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{DynamicImage, ExtendedColorType, GrayImage, ImageDecoder, ImageEncoder, ImageReader};
use tracing::debug;

use crate::error::Result;

/// Decoded image, together with the color type stored in the file.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub image: DynamicImage,
    pub original_color: ExtendedColorType,
}

impl LoadedImage {
    /// True if the file stored one bit per pixel (PBM, 1-bit PNG, ...).
    pub fn is_one_bit(&self) -> bool {
        self.original_color == ExtendedColorType::L1
    }
}

/// Opens and decodes an image, guessing its format from the content.
pub fn open_image(path: impl AsRef<Path>) -> Result<LoadedImage> {
    let path = path.as_ref();
    let decoder = ImageReader::new(BufReader::new(File::open(path)?))
        .with_guessed_format()?
        .into_decoder()?;
    let original_color = decoder.original_color_type();
    let image = DynamicImage::from_decoder(decoder)?;

    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        color = ?original_color,
        "loaded image"
    );

    Ok(LoadedImage {
        image,
        original_color,
    })
}

/// Saves a black/white image.
///
/// `.pbm` paths get a binary one-bit PBM. Anything else is written as
/// 8-bit grayscale in the format implied by the extension.
/// Nonzero samples are white.
pub fn save_bilevel(path: impl AsRef<Path>, im: &GrayImage) -> Result<()> {
    let path = path.as_ref();
    let is_pbm = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pbm"));

    if is_pbm {
        // PnmEncoder writes zero samples as black bits and one as white
        let bits: Vec<u8> = im.as_raw().iter().map(|&v| u8::from(v != 0)).collect();
        let mut buf = Vec::new();
        PnmEncoder::new(&mut buf)
            .with_subtype(PnmSubtype::Bitmap(SampleEncoding::Binary))
            .write_image(&bits, im.width(), im.height(), ExtendedColorType::L8)?;
        fs::write(path, buf)?;
    } else {
        let mut out = im.clone();
        out.pixels_mut()
            .for_each(|p| p.0[0] = if p.0[0] != 0 { 255 } else { 0 });
        out.save(path)?;
    }

    debug!(path = %path.display(), pbm = is_pbm, "saved bilevel image");
    Ok(())
}
