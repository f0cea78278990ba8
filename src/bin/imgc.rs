use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use imgc::io::{self, DEFAULT_JPEG_QUALITY};
use imgc::{KMeansConfig, MAX_CLUSTERS, MIN_CLUSTERS, Seeding, Stopwatch, quantize_image};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Reduce images to k colours with k-means and save them as JPEG.
#[derive(Parser, Debug)]
#[command(name = "imgc", author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Number of colours (clusters)
    #[arg(
        short = 'k',
        long,
        value_parser = clap::value_parser!(u16).range(MIN_CLUSTERS as i64..=MAX_CLUSTERS as i64)
    )]
    clusters: u16,

    /// Output directory, created if missing
    #[arg(short = 'd', long)]
    out_dir: PathBuf,

    /// JPEG quality (0-100)
    #[arg(
        short = 'q',
        long = "jpeg-quality",
        default_value_t = DEFAULT_JPEG_QUALITY,
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    quality: u8,

    /// Upper bound on Lloyd iterations per attempt
    #[arg(long, default_value_t = 20)]
    max_iterations: usize,

    /// Stop iterating once summed squared centroid movement falls below this
    #[arg(long, default_value_t = 1.0)]
    epsilon: f64,

    /// Independent seedings; the most compact one is kept
    #[arg(long, default_value_t = 3)]
    attempts: usize,

    /// Seeding strategy: spread or uniform
    #[arg(long, default_value = "spread")]
    seeding: Seeding,

    /// Fixed random seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Run attempts one after another instead of on the thread pool
    #[arg(long)]
    sequential: bool,

    /// Print a JSON summary per image
    #[arg(long)]
    report: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let k = args.clusters as usize;
    let config = KMeansConfig::default()
        .with_max_iterations(args.max_iterations)
        .with_epsilon(args.epsilon)
        .with_attempts(args.attempts)
        .with_seeding(args.seeding)
        .with_parallel(!args.sequential);
    config.validate().context("invalid clustering options")?;

    io::ensure_directory(&args.out_dir).context("ensure output directory")?;

    for input in &args.inputs {
        info!(input = %input.display(), k, quality = args.quality, "compressing");
        let mut stopwatch = Stopwatch::new();

        let image = io::load_color_image(input).context("load image")?;
        info!(width = image.width(), height = image.height(), "loaded");
        stopwatch.tick("load");

        let seed = args.seed.unwrap_or_else(imgc::random_seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let quantized = quantize_image(&image, k, &config, &mut rng, &mut stopwatch)
            .with_context(|| format!("quantize {}", input.display()))?;

        let out_path = io::output_path(input, &args.out_dir, k, args.quality);
        io::save_jpeg(&out_path, &quantized.image, args.quality).context("save jpeg")?;
        stopwatch.tick("write");

        println!("[OK] Saved: {}", out_path.display());
        println!("{}", stopwatch.summary());

        if args.report {
            let timings: serde_json::Map<String, serde_json::Value> = stopwatch
                .events()
                .iter()
                .map(|e| (e.label.clone(), serde_json::json!(e.elapsed.as_millis() as u64)))
                .collect();
            let report = serde_json::json!({
                "input": input.display().to_string(),
                "output": out_path.display().to_string(),
                "k": k,
                "seed": seed,
                "compactness": quantized.result.compactness,
                "iterations": quantized.result.iterations,
                "attempt": quantized.result.attempt,
                "palette": quantized.result.hex_palette(),
                "timings_ms": timings,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
