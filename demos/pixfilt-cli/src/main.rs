use argh::FromArgs;
use std::{path::PathBuf, time::Instant};

use pixfilt::{
    image::CpuAllocator,
    imgproc::{
        op::{apply_filter_with, FilterOp, DEFAULT_PARAM, TOOL_NAMES},
        parallel::ExecutionStrategy,
    },
    io::{functional as F, jpeg::DEFAULT_JPEG_QUALITY, ImageFormat},
};

#[derive(FromArgs)]
/// Apply a filter to a PNG or JPEG image
struct Args {
    /// the tool to run: gauss, median, edge_detection or grayscale
    #[argh(positional)]
    tool: String,

    /// path to the input image
    #[argh(positional)]
    input: PathBuf,

    /// the sigma for gauss or the radius for median
    #[argh(positional)]
    param: Option<f32>,

    /// path to the output image, defaults to output.png or output.jpg
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// the jpeg quality in [1, 100]
    #[argh(option, default = "DEFAULT_JPEG_QUALITY")]
    quality: u8,

    /// the number of worker threads
    #[argh(option)]
    threads: Option<usize>,

    /// run the filter on the current thread only
    #[argh(switch)]
    serial: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    if !(1..=100).contains(&args.quality) {
        return Err(format!("quality must be in [1, 100], got {}", args.quality).into());
    }

    if let Some(threads) = args.threads {
        if threads == 0 {
            return Err("the number of threads must be at least 1".into());
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let op = FilterOp::from_tool(&args.tool, args.param.unwrap_or(DEFAULT_PARAM))
        .map_err(|e| format!("{e}. Available tools: {}", TOOL_NAMES.join(", ")))?;

    let input_format = ImageFormat::from_path(&args.input)?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("output.{}", input_format.extension())));
    let output_format = ImageFormat::from_path(&output)?;

    let strategy = if args.serial {
        ExecutionStrategy::Serial
    } else {
        ExecutionStrategy::Auto
    };

    let mut image = F::read_image(&args.input)?;
    log::info!(
        "loaded {} ({}x{}, {} channels)",
        args.input.display(),
        image.width(),
        image.height(),
        image.num_channels()
    );

    let start = Instant::now();
    apply_filter_with(&mut image, &op, strategy, &CpuAllocator)?;
    log::info!("applied {op} in {:?}", start.elapsed());

    F::write_image_with_quality(&output, &image, output_format, args.quality)?;
    log::info!("saved {}", output.display());

    Ok(())
}
