use argh::FromArgs;
use plessey::{
    image::Image,
    imgproc::{
        features::{HarrisCornerDetector, HarrisParams},
        parallel::ExecutionStrategy,
    },
};

/// Detects Harris/Plessey corners on a synthetic test pattern
#[derive(Debug, FromArgs)]
struct Args {
    /// side length of the square test image
    #[argh(option, short = 's', default = "64")]
    size: usize,

    /// test pattern: square or checkerboard
    #[argh(option, short = 'p', default = "Pattern::Square", from_str_fn(to_pattern))]
    pattern: Pattern,

    /// trace weight of the response
    #[argh(option, short = 'a', default = "0.05")]
    alpha: f32,

    /// minimum response of a corner
    #[argh(option, short = 't', default = "1000.0")]
    threshold: f32,

    /// margin in pixels where no corner is reported
    #[argh(option, short = 'b', default = "5")]
    border: usize,

    /// minimum distance between reported corners
    #[argh(option, short = 'd', default = "3.0")]
    min_distance: f32,

    /// disable the minimum distance cleanup
    #[argh(switch)]
    no_cleanup: bool,

    /// keep at most this many corners
    #[argh(option, short = 'n')]
    max_corners: Option<usize>,

    /// process image rows in parallel
    #[argh(switch)]
    parallel: bool,

    /// print the corners as json
    #[argh(switch)]
    json: bool,
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Square,
    Checkerboard,
}

fn to_pattern(value: &str) -> Result<Pattern, String> {
    match value {
        "square" => Ok(Pattern::Square),
        "checkerboard" => Ok(Pattern::Checkerboard),
        _ => Err(format!("unsupported pattern: {value}")),
    }
}

fn synthesize(pattern: Pattern, size: usize) -> Result<Image<u8>, Box<dyn std::error::Error>> {
    let data = match pattern {
        Pattern::Square => {
            let (lo, hi) = (size / 4, size - size / 4);
            (0..size * size)
                .map(|i| {
                    let (x, y) = (i % size, i / size);
                    if (lo..hi).contains(&x) && (lo..hi).contains(&y) {
                        255
                    } else {
                        0
                    }
                })
                .collect()
        }
        Pattern::Checkerboard => {
            let cell = (size / 8).max(1);
            (0..size * size)
                .map(|i| {
                    let (x, y) = (i % size, i / size);
                    if (x / cell + y / cell) % 2 == 0 {
                        20
                    } else {
                        230
                    }
                })
                .collect()
        }
    };
    Ok(Image::new([size, size].into(), data)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let image = synthesize(args.pattern, args.size)?;
    log::info!("synthesized a {:?} pattern of size {}", args.pattern, image.size());

    let strategy = if args.parallel {
        ExecutionStrategy::ParallelRows
    } else {
        ExecutionStrategy::Serial
    };

    let params = HarrisParams::default()
        .with_alpha(args.alpha)
        .with_threshold(args.threshold)
        .with_border(args.border)
        .with_min_distance(args.min_distance)
        .with_cleanup(!args.no_cleanup)
        .with_max_corners(args.max_corners)
        .with_strategy(strategy);

    let detector = HarrisCornerDetector::new(params)?;
    let corners = detector.detect(&image)?;
    log::info!("found {} corners", corners.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&corners)?);
    } else {
        for corner in &corners {
            println!("{:>6.1} {:>6.1} {:>14.3}", corner.u, corner.v, corner.score);
        }
    }

    Ok(())
}
