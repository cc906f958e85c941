//! Command line front end for jfpjc-tools
//! Run with `--help` for more instruction

// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Error};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use jfpjc_tools::apply::{apply_mask, FillColor};
use jfpjc_tools::bitfile::{pack_mask, BitChar, WordLayout};
use jfpjc_tools::dct::{self, DEFAULT_COEFFICIENT, DEFAULT_LIMIT};
use jfpjc_tools::diff::image_distance;
use jfpjc_tools::generate::{generate_mask, seeded_rng, MaskParams};
use jfpjc_tools::hexdump::{dump_image, CANVAS_HEIGHT, CANVAS_WIDTH};
use jfpjc_tools::io::open_image;
use jfpjc_tools::{zigzag, Mask};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a random obfuscation mask (set pixels are obfuscated)
    GenMask {
        /// Output file, `.pbm` for a one-bit bitmap
        output: PathBuf,

        /// Width of the mask
        #[arg(long, default_value_t = 40)]
        width: u32,

        /// Height of the mask
        #[arg(long, default_value_t = 30)]
        height: u32,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: String,

        /// Number of circles
        #[arg(long, default_value_t = 1)]
        circles: usize,

        /// Mean circle radius, radii are exponentially distributed
        #[arg(long, default_value_t = 10.0)]
        radius_circles: f64,

        /// Density of salt and pepper noise, from 0 (none) to 1 (everything)
        #[arg(long, default_value_t = 0.2)]
        noise: f64,
    },

    /// Print the Euclidean norm of the difference of two images
    Diff {
        first: PathBuf,
        second: PathBuf,
    },

    /// Print image samples as hex, one row at a time
    ToHex {
        input: PathBuf,

        /// Paste onto a grayscale canvas first
        #[arg(long)]
        fit: bool,

        /// Canvas width
        #[arg(long, default_value_t = CANVAS_WIDTH)]
        canvas_width: u32,

        /// Canvas height
        #[arg(long, default_value_t = CANVAS_HEIGHT)]
        canvas_height: u32,
    },

    /// Cover the obfuscated areas of an image with a solid color
    ApplyMask {
        /// Input image
        image: PathBuf,

        /// Mask, set pixels are obfuscated
        mask: PathBuf,

        /// Output file
        output: PathBuf,

        /// Horizontal mask stretch factor
        #[arg(long, default_value_t = 8)]
        stretch_factor_x: u32,

        /// Vertical mask stretch factor
        #[arg(long, default_value_t = 8)]
        stretch_factor_y: u32,

        /// Color covering obfuscated pixels
        #[arg(long, value_enum, default_value_t)]
        obfuscation_color: FillColor,
    },

    /// Convert a one-bit mask into a Verilog bit file
    PackMask {
        /// Mask image
        input: PathBuf,

        /// Bit file to write
        output: PathBuf,

        /// Bits per word
        #[arg(long, default_value_t = 8)]
        bitwidth: usize,

        /// Low bits of each word holding pixels [default: bitwidth]
        #[arg(long)]
        lsbs_to_use: Option<usize>,

        /// Value of the unused high bits
        #[arg(long, value_enum, default_value_t)]
        msb_fill: BitChar,
    },

    /// Print the 8x8 zigzag scan table
    Zigzag {
        #[arg(long, value_enum, default_value_t)]
        format: ZigzagFormat,
    },

    /// Print an 8x8 block that produces high-magnitude DCT coefficients
    DctBlock {
        /// Value of every coefficient before the inverse transform
        #[arg(long, default_value_t = DEFAULT_COEFFICIENT, allow_negative_numbers = true)]
        coefficient: f64,

        /// Samples are clamped to [-limit, limit]
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: f64,
    },
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ZigzagFormat {
    /// `X[i] = Y[j];` per line
    #[default]
    Assignments,
    /// A single list
    List,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set subscriber for tracing logs: {}", e);
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::GenMask {
            output,
            width,
            height,
            seed,
            circles,
            radius_circles,
            noise,
        } => {
            let params = MaskParams::builder()
                .width(width)
                .height(height)
                .circles(circles)
                .radius(radius_circles)
                .noise(noise)
                .build();
            let generated = generate_mask(&params, &mut seeded_rng(&seed))?;
            generated
                .mask
                .save(&output)
                .with_context(|| format!("Unable to write mask {}", output.display()))?;
            info!(
                obfuscated = generated.mask.count(),
                circles = generated.circles.len(),
                "wrote {}",
                output.display()
            );
        }

        Command::Diff { first, second } => {
            let a = open_image(&first)
                .with_context(|| format!("Unable to open image {}", first.display()))?;
            let b = open_image(&second)
                .with_context(|| format!("Unable to open image {}", second.display()))?;
            println!("{}", image_distance(&a.image, &b.image)?);
        }

        Command::ToHex {
            input,
            fit,
            canvas_width,
            canvas_height,
        } => {
            let im = open_image(&input)
                .with_context(|| format!("Unable to open image {}", input.display()))?;
            let canvas = fit.then_some((canvas_width, canvas_height));
            let mut out = BufWriter::new(io::stdout().lock());
            dump_image(&mut out, &im.image, canvas)?;
            out.flush()?;
        }

        Command::ApplyMask {
            image,
            mask,
            output,
            stretch_factor_x,
            stretch_factor_y,
            obfuscation_color,
        } => {
            let im = open_image(&image)
                .with_context(|| format!("Unable to open image {}", image.display()))?;
            let mask = Mask::open(&mask)
                .with_context(|| format!("Unable to open mask {}", mask.display()))?;
            let masked = apply_mask(
                &im.image,
                &mask,
                (stretch_factor_x, stretch_factor_y),
                obfuscation_color,
            )?;
            masked
                .save(&output)
                .with_context(|| format!("Unable to write image {}", output.display()))?;
        }

        Command::PackMask {
            input,
            output,
            bitwidth,
            lsbs_to_use,
            msb_fill,
        } => {
            let layout = WordLayout::new(bitwidth, lsbs_to_use, msb_fill)?;
            let mask = Mask::open(&input)
                .with_context(|| format!("Unable to open mask {}", input.display()))?;
            let bitfile = pack_mask(&mask, &layout)?;
            bitfile
                .save(&output)
                .with_context(|| format!("Unable to write bit file {}", output.display()))?;
            info!(words = bitfile.words().len(), "wrote {}", output.display());
        }

        Command::Zigzag { format } => {
            let mut out = io::stdout().lock();
            match format {
                ZigzagFormat::Assignments => zigzag::write_assignments(&mut out)?,
                ZigzagFormat::List => zigzag::write_list(&mut out)?,
            }
        }

        Command::DctBlock { coefficient, limit } => {
            let case = dct::worst_case_block(coefficient, limit)?;
            let mut out = BufWriter::new(io::stdout().lock());
            dct::write_report(&mut out, &case)?;
            out.flush()?;
        }
    }

    Ok(())
}
