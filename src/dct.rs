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


//! Floating point 8x8 DCT and the high-magnitude test block.
//!
//! Blocks are indexed `[[y, x]]` in the spatial domain and `[[v, u]]` in
//! the frequency domain. Both transforms are orthonormal, so each one
//! undoes the other.

use std::io::{self, Write};

use ndarray::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};
use crate::zigzag::BLOCK_SIZE;

pub const DEFAULT_COEFFICIENT: f64 = 1023.0;
pub const DEFAULT_LIMIT: f64 = 127.0;

/// `basis()[[u, x]]` is the scaled cosine of frequency `u` at sample `x`.
fn basis() -> Array2<f64> {
    let n = BLOCK_SIZE as f64;
    Array2::from_shape_fn((BLOCK_SIZE, BLOCK_SIZE), |(u, x)| {
        let scale = if u == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
        let angle = (2 * x + 1) as f64 * u as f64 * std::f64::consts::PI / (2.0 * n);
        scale * angle.cos()
    })
}

/// Forward DCT of a spatial block.
pub fn fdct(block: &ArrayView2<'_, f64>) -> Array2<f64> {
    let m = basis();
    m.dot(block).dot(&m.t())
}

/// Inverse DCT of a coefficient block.
pub fn idct(coefficients: &ArrayView2<'_, f64>) -> Array2<f64> {
    let m = basis();
    m.t().dot(coefficients).dot(&m)
}

/// Every stage of building a block whose coefficients compress badly.
#[derive(Debug, Clone)]
pub struct WorstCase {
    /// Block with every coefficient set
    pub coefficients: Array2<f64>,
    /// Inverse transform of `coefficients`
    pub spatial: Array2<f64>,
    /// `spatial` clamped into the sample range
    pub clamped: Array2<f64>,
    /// Forward transform of `clamped`
    pub recovered: Array2<f64>,
}

/// Fills a block with `coefficient`, transforms it back to samples and
/// clamps those into `[-limit, limit]`. The clamped block is what gets
/// fed to an encoder; `recovered` shows the coefficients it will see.
pub fn worst_case_block(coefficient: f64, limit: f64) -> Result<WorstCase> {
    if !(limit.is_finite() && limit >= 0.0) {
        return Err(Error::InvalidClamp(limit));
    }

    let coefficients = Array2::from_elem((BLOCK_SIZE, BLOCK_SIZE), coefficient);
    let spatial = idct(&coefficients.view());
    let clamped = spatial.mapv(|v| v.clamp(-limit, limit));
    let recovered = fdct(&clamped.view());

    debug!(
        clipped = spatial.iter().filter(|v| v.abs() > limit).count(),
        "built worst case block"
    );
    Ok(WorstCase {
        coefficients,
        spatial,
        clamped,
        recovered,
    })
}

/// Writes a block as rows of `%+8.2f` columns.
pub fn write_block<W: Write>(out: &mut W, block: &ArrayView2<'_, f64>) -> io::Result<()> {
    for row in block.outer_iter() {
        for v in row {
            write!(out, "{v:+8.2} ")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Writes every stage of [`WorstCase`] under a heading.
pub fn write_report<W: Write>(out: &mut W, case: &WorstCase) -> io::Result<()> {
    let stages = [
        ("data_in", &case.coefficients),
        ("idct(data_in)", &case.spatial),
        ("clamp(idct(data_in))", &case.clamped),
        ("fdct(clamp(idct(data_in)))", &case.recovered),
    ];
    for (title, block) in stages {
        writeln!(out, "{title}")?;
        write_block(out, &block.view())?;
        writeln!(out)?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &Array2<f64>, b: &Array2<f64>) {
        azip!((&x in a, &y in b) assert!((x - y).abs() < 1e-9, "{x} != {y}"));
    }

    #[test]
    fn constant_block_is_dc_only() {
        let block = Array2::from_elem((8, 8), 10.0);
        let c = fdct(&block.view());
        assert!((c[[0, 0]] - 80.0).abs() < 1e-9);
        assert!(c.iter().skip(1).all(|v| v.abs() < 1e-9));
        assert_close(&idct(&c.view()), &block);
    }

    #[test]
    fn transforms_invert_each_other() {
        let block =
            Array2::from_shape_fn((8, 8), |(y, x)| ((x * 37 + y * 11) % 255) as f64 - 128.0);
        assert_close(&idct(&fdct(&block.view()).view()), &block);
        assert_close(&fdct(&idct(&block.view()).view()), &block);
    }

    #[test]
    fn single_coefficient_is_a_cosine() {
        let mut c = Array2::zeros((8, 8));
        c[[0, 1]] = 2.0;
        let block = idct(&c.view());
        for x in 0..8 {
            let expected = 2.0 * 0.5 * (8f64).recip().sqrt()
                * ((2 * x + 1) as f64 * std::f64::consts::PI / 16.0).cos();
            for y in 0..8 {
                assert!((block[[y, x]] - expected).abs() < 1e-9, "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn worst_case_stages() {
        let case = worst_case_block(DEFAULT_COEFFICIENT, DEFAULT_LIMIT).unwrap();
        assert!(case.coefficients.iter().all(|&v| v == 1023.0));
        assert!((case.spatial[[0, 0]] - 7139.88).abs() < 0.01);
        assert!((case.spatial[[5, 5]] - 0.93).abs() < 0.01);

        assert!(case.clamped.iter().all(|v| v.abs() <= 127.0));
        assert_eq!(case.clamped[[0, 0]], 127.0);
        assert_eq!(case.clamped[[0, 1]], -127.0);
        assert_eq!(case.clamped[[5, 5]], case.spatial[[5, 5]]);

        let dc = case.clamped.sum() / 8.0;
        assert!((case.recovered[[0, 0]] - dc).abs() < 1e-9);
        assert_close(&idct(&case.recovered.view()), &case.clamped);
    }

    #[test]
    fn rejects_bad_limit() {
        assert!(matches!(
            worst_case_block(1.0, -1.0),
            Err(Error::InvalidClamp(_))
        ));
        assert!(worst_case_block(1.0, f64::NAN).is_err());
    }

    #[test]
    fn block_format() {
        let block = Array2::from_shape_fn((8, 8), |(y, x)| if x == 0 { -1.5 } else { y as f64 });
        let mut out = Vec::new();
        write_block(&mut out, &block.view()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert!(lines[0].starts_with("   -1.50    +0.00    +0.00 "));
        assert!(lines[7].starts_with("   -1.50    +7.00 "));
    }

    #[test]
    fn report_has_every_stage() {
        let case = worst_case_block(4.0, 1.0).unwrap();
        let mut out = Vec::new();
        write_report(&mut out, &case).unwrap();
        let text = String::from_utf8(out).unwrap();
        let titles: Vec<&str> = text
            .lines()
            .filter(|l| !l.is_empty() && !l.starts_with(' '))
            .collect();
        assert_eq!(
            titles,
            [
                "data_in",
                "idct(data_in)",
                "clamp(idct(data_in))",
                "fdct(clamp(idct(data_in)))"
            ]
        );
        assert_eq!(text.lines().count(), 4 * (1 + 8 + 2));
    }
}
