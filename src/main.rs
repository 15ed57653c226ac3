//! # gridcanvas CLI
//!
//! Usage:
//!   gridcanvas a.png b.png c.png d.png -o grid.png --x-labels "before,after"
//!   gridcanvas *.jpg -o grid.jpg --config grid.json --spacing 20
//!   gridcanvas --example-config > grid.json

use gridcanvas::{Align, CellSize, Color, FitMode, GridConfig, LabelOrientation, ResampleFilter};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;
use tracing::Level;

const USAGE: &str = "\
Usage: gridcanvas [IMAGES...] -o OUTPUT [OPTIONS]

Layout:
  --rows R                 Number of rows
  --cols C                 Number of columns
  --spacing PX             Gap between cells (grown to fit captions)
  --cell-size WxH          Uniform cell size (default: largest input)
  --fit stretch|contain    How images fill their cells
  --filter NAME            nearest, triangle, catmull-rom, gaussian, lanczos3

Labels (comma-separated):
  --labels CSV             One caption per image
  --x-labels CSV           One header per column
  --y-labels CSV           One header per row
  --labels-align A         left, center or right (default center)
  --x-labels-align A       (default left)
  --y-labels-align A       (default left)
  --labels-max-lines N     (default 1)
  --x-labels-max-lines N   (default 2)
  --y-labels-max-lines N   (default 2)
  --y-labels-rotated       Draw row headers rotated along the row

Style:
  --font-size PX           (default 12)
  --font-path PATH         TrueType/OpenType font file
  --background-color C     Name, #hex or rgb()/rgba() (default white)
  --text-color C           (default black)

Other:
  --config FILE.json       Base configuration; flags override it
  --example-config         Print an example configuration and exit
  -v, --verbose            Debug logging on stderr
  -h, --help               Show this help";

/// Parsed command line.
#[derive(Debug)]
struct CliArgs {
    images: Vec<String>,
    output: PathBuf,
    config: GridConfig,
    verbose: bool,
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{}", USAGE);
        return;
    }
    if args.iter().any(|a| a == "--example-config") {
        print!("{}", example_config_json());
        return;
    }

    let base = match config_path(&args) {
        Ok(None) => GridConfig::default(),
        Ok(Some(path)) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("✗ {}", e);
                process::exit(1);
            }
        },
        Err(e) => usage_error(&e),
    };

    let cli = match parse_args(&args, base) {
        Ok(cli) => cli,
        Err(e) => usage_error(&e),
    };

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = gridcanvas::grid(cli.images.iter().map(String::as_str), &cli.config)
        .and_then(|grid| grid.save(&cli.output).map(|_| grid));
    match result {
        Ok(grid) => {
            let (w, h) = grid.size();
            eprintln!(
                "✓ Grid saved to {} ({}x{}, {})",
                cli.output.display(),
                w,
                h,
                grid.mode()
            );
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            process::exit(1);
        }
    }
}

fn usage_error(message: &str) -> ! {
    eprintln!("✗ {}", message);
    eprintln!("Run with --help for usage.");
    process::exit(2);
}

fn load_config(path: &Path) -> Result<GridConfig, String> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config '{}': {}", path.display(), e))?;
    GridConfig::from_json(&json).map_err(|e| e.to_string())
}

/// Find `--config FILE` ahead of the full parse so flags can override it.
fn config_path(args: &[String]) -> Result<Option<PathBuf>, String> {
    match args.iter().position(|a| a == "--config") {
        None => Ok(None),
        Some(i) => args
            .get(i + 1)
            .map(|p| Some(PathBuf::from(p)))
            .ok_or_else(|| "--config needs a value".to_string()),
    }
}

fn parse_args(args: &[String], mut config: GridConfig) -> Result<CliArgs, String> {
    let mut images = Vec::new();
    let mut output = None;
    let mut verbose = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = || {
            iter.next()
                .map(String::as_str)
                .ok_or_else(|| format!("{} needs a value", arg))
        };
        match arg.as_str() {
            "-o" | "--output" => output = Some(PathBuf::from(value()?)),
            "--config" => {
                value()?;
            }
            "--rows" => config.rows = Some(number(arg, value()?)?),
            "--cols" => config.cols = Some(number(arg, value()?)?),
            "--spacing" => config.spacing = number(arg, value()?)?,
            "--font-size" => config.font_size = number(arg, value()?)?,
            "--labels" => config.labels = Some(csv(value()?)),
            "--x-labels" => config.x_labels = Some(csv(value()?)),
            "--y-labels" => config.y_labels = Some(csv(value()?)),
            "--labels-align" => config.labels_align = parsed::<Align>(value()?)?,
            "--x-labels-align" => config.x_labels_align = parsed::<Align>(value()?)?,
            "--y-labels-align" => config.y_labels_align = parsed::<Align>(value()?)?,
            "--labels-max-lines" => config.labels_max_lines = number(arg, value()?)?,
            "--x-labels-max-lines" => config.x_labels_max_lines = number(arg, value()?)?,
            "--y-labels-max-lines" => config.y_labels_max_lines = number(arg, value()?)?,
            "--background-color" => config.background_color = parsed::<Color>(value()?)?,
            "--text-color" => config.text_color = parsed::<Color>(value()?)?,
            "--font-path" => config.font_path = Some(PathBuf::from(value()?)),
            "--cell-size" => config.cell_size = Some(parsed::<CellSize>(value()?)?),
            "--fit" => config.fit = parsed::<FitMode>(value()?)?,
            "--filter" => config.filter = parsed::<ResampleFilter>(value()?)?,
            "--y-labels-rotated" => config.y_labels_orientation = LabelOrientation::Rotated,
            "-v" | "--verbose" => verbose = true,
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("Unknown option '{}'", flag));
            }
            image => images.push(image.to_string()),
        }
    }

    let output = output.ok_or_else(|| "Missing output path (-o OUTPUT)".to_string())?;
    Ok(CliArgs {
        images,
        output,
        config,
        verbose,
    })
}

fn number<T: FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("{} expects a non-negative integer, got '{}'", flag, value))
}

fn parsed<T>(value: &str) -> Result<T, String>
where
    T: FromStr<Err = gridcanvas::GridError>,
{
    value.parse().map_err(|e: gridcanvas::GridError| e.to_string())
}

/// Split a comma-separated label list, trimming each entry.
fn csv(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.trim().to_string()).collect()
}

fn example_config_json() -> &'static str {
    r##"{
  "rows": 2,
  "cols": 3,
  "spacing": 10,
  "labels": ["sunrise", "noon", "dusk", "night", "storm", "fog"],
  "labelsMaxLines": 2,
  "labelsAlign": "center",
  "xLabels": ["Camera A", "Camera B", "Camera C"],
  "xLabelsAlign": "center",
  "yLabels": ["Day", "Weather"],
  "yLabelsAlign": "right",
  "yLabelsOrientation": "horizontal",
  "fontSize": 14,
  "backgroundColor": "#f4f4f4",
  "textColor": "#202020",
  "cellSize": { "width": 256, "height": 192 },
  "fit": "contain",
  "filter": "lanczos3"
}
"##
}
