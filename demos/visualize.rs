use std::path::PathBuf;

use clap::Parser;
use kurbo::BezPath;

use segsweep::{debug_svg, section_lines_with_eps, Segments, DEFAULT_EPS};

/// Finds the intersections of the straight parts of an SVG path, and draws them.
#[derive(Parser)]
struct Cli {
    /// Where to write the picture.
    #[arg(long)]
    output: PathBuf,

    /// A file containing SVG path data, like "M0,0 L2,2 M0,2 L2,0".
    #[arg(long)]
    input: PathBuf,

    #[arg(long, default_value_t = DEFAULT_EPS)]
    eps: f64,
}

pub fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let input = std::fs::read_to_string(&args.input)?;
    let path = BezPath::from_svg(input.trim())?;
    let segments = Segments::from_bez_path(&path);

    let intersections = section_lines_with_eps(segments.as_slice(), args.eps)?;
    for int in &intersections {
        println!("{:?}: {:?}", int.point, int.lines);
    }

    let document = debug_svg::render(segments.as_slice(), &intersections);
    svg::save(&args.output, &document)?;

    Ok(())
}
