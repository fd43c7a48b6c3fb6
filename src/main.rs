mod layout;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use xivmap::{coord_to_pixel, pixel_to_coord, MapOptions, MapRenderer, Point};

use crate::layout::Layout;

#[derive(Debug, Parser)]
#[command(version, about = "Draw icons and labels onto 2048x2048 game maps")]
struct Arguments {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render a layout file onto a background map
    #[command(arg_required_else_help = true)]
    Render {
        #[arg(short, long)]
        background: PathBuf,

        #[arg(short, long)]
        layout: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Overrides the layout's size factor
        #[arg(long)]
        size_factor: Option<f64>,

        /// Overrides the layout's icon scale
        #[arg(long)]
        icon_scale: Option<f64>,
    },

    /// Convert canvas pixels to map coordinates (one value or an x y pair)
    #[command(arg_required_else_help = true)]
    PixelToCoord {
        #[arg(required = true, num_args = 1..=2, allow_negative_numbers = true)]
        values: Vec<f64>,

        #[arg(long, default_value_t = 100.0)]
        size_factor: f64,
    },

    /// Convert map coordinates to canvas pixels (one value or an x y pair)
    #[command(arg_required_else_help = true)]
    CoordToPixel {
        #[arg(required = true, num_args = 1..=2, allow_negative_numbers = true)]
        values: Vec<f64>,

        #[arg(long, default_value_t = 100.0)]
        size_factor: f64,
    },
}

fn convert(values: &[f64], size_factor: f64, f: fn(Point, f64) -> Point) -> Result<()> {
    MapOptions::default().with_size_factor(size_factor).validate()?;
    match values {
        [value] => println!("{}", f(Point::new(*value, *value), size_factor).x),
        [x, y] => {
            let point = f(Point::new(*x, *y), size_factor);
            println!("{} {}", point.x, point.y);
        }
        _ => unreachable!("clap limits values to one or two"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let arguments = Arguments::parse();
    let level = if arguments.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match arguments.command {
        Commands::Render {
            background,
            layout,
            output,
            size_factor,
            icon_scale,
        } => {
            let layout = Layout::load(&layout)?;
            let mut options = layout.options.unwrap_or_default();
            if let Some(size_factor) = size_factor {
                options = options.with_size_factor(size_factor);
            }
            if let Some(icon_scale) = icon_scale {
                options = options.with_icon_scale(icon_scale);
            }

            let mut map = MapRenderer::new(&background, options)?;
            layout.render(&mut map).await?;
            map.write(&output)
                .await
                .with_context(|| format!("unable to write {}", output.display()))?;
            log::info!("wrote {}", output.display());
        }
        Commands::PixelToCoord {
            values,
            size_factor,
        } => convert(&values, size_factor, pixel_to_coord)?,
        Commands::CoordToPixel {
            values,
            size_factor,
        } => convert(&values, size_factor, coord_to_pixel)?,
    }
    Ok(())
}
