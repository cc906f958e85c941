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

//! 8x8 zigzag scan order.
//!
//! `ZIGZAG[i]` is the row-major index of the `i`th block element visited
//! by the diagonal zigzag scan.

use std::io::{self, Write};

pub const BLOCK_SIZE: usize = 8;
pub const BLOCK_LEN: usize = BLOCK_SIZE * BLOCK_SIZE;

pub const ZIGZAG: [usize; BLOCK_LEN] = zigzag_table();

/// Walks the block diagonally from `(1, 0)`, first heading down-left.
/// On hitting an edge the walk steps along that edge and turns around.
const fn zigzag_table() -> [usize; BLOCK_LEN] {
    const LAST: isize = BLOCK_SIZE as isize - 1;

    let mut table = [0; BLOCK_LEN];
    let (mut x, mut y, mut dir) = (1isize, 0isize, -1isize);

    let mut i = 1;
    while i < BLOCK_LEN {
        table[i] = (x + BLOCK_SIZE as isize * y) as usize;

        let (nx, ny) = (x + dir, y - dir);
        if nx < 0 && ny > LAST {
            x += 1;
            dir = -dir;
        } else if nx < 0 && dir == -1 {
            y += 1;
            dir = -dir;
        } else if ny < 0 && dir == 1 {
            x += 1;
            dir = -dir;
        } else if nx > LAST && dir == 1 {
            y += 1;
            dir = -dir;
        } else if ny > LAST && dir == -1 {
            x += 1;
            dir = -dir;
        } else {
            x = nx;
            y = ny;
        }

        i += 1;
    }

    table
}

/// Zigzag table as a list.
pub fn zigzag_indices() -> Vec<usize> {
    ZIGZAG.to_vec()
}

/// Writes the table unrolled as `X[i] = Y[j];` statements.
pub fn write_assignments<W: Write>(out: &mut W) -> io::Result<()> {
    for (i, j) in ZIGZAG.iter().enumerate() {
        writeln!(out, "X[{i}] = Y[{j}];")?;
    }
    Ok(())
}

/// Writes the table as `[0, 1, 8, ...]`.
pub fn write_list<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{:?}", ZIGZAG)
}
