use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use cop2dted::convert::{Converter, GdalToolkit};
use cop2dted::download::{DownloadConfig, Downloader, COPERNICUS_BUCKET_URL};
use cop2dted::{CoverageArea, CoverageRunner, TileStatus};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

mod logging;
mod report;

/// Download Copernicus DEM tiles and convert them to DTED Level 2
#[derive(Parser, Debug)]
#[command(name = "cop2dted")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Minimum latitude (inclusive)
    #[arg(long = "lat_min", default_value_t = 53, allow_hyphen_values = true)]
    lat_min: i32,

    /// Maximum latitude (exclusive)
    #[arg(long = "lat_max", default_value_t = 57, allow_hyphen_values = true)]
    lat_max: i32,

    /// Minimum longitude (inclusive)
    #[arg(long = "lon_min", default_value_t = 20, allow_hyphen_values = true)]
    lon_min: i32,

    /// Maximum longitude (exclusive)
    #[arg(long = "lon_max", default_value_t = 28, allow_hyphen_values = true)]
    lon_max: i32,

    /// Base output directory
    #[arg(long, default_value = "./DTED_Lithuania")]
    output: PathBuf,

    /// Directory for downloaded and intermediate rasters
    #[arg(long, env = "COP2DTED_CACHE_DIR", default_value = ".")]
    cache_dir: PathBuf,

    /// Bucket (or mirror) serving the Copernicus tiles
    #[arg(long, env = "COP2DTED_BUCKET_URL", default_value = COPERNICUS_BUCKET_URL)]
    bucket_url: String,

    /// Download timeout in seconds (default: wait indefinitely)
    #[arg(long, env = "COP2DTED_TIMEOUT")]
    timeout: Option<u64>,

    /// gdal_translate executable
    #[arg(long, env = "COP2DTED_GDAL_TRANSLATE", default_value = "gdal_translate")]
    gdal_translate: String,

    /// gdal_fillnodata executable
    #[arg(
        long,
        env = "COP2DTED_GDAL_FILLNODATA",
        default_value = "gdal_fillnodata.py"
    )]
    gdal_fillnodata: String,

    /// Number of tiles processed in parallel
    #[arg(
        short,
        long,
        env = "COP2DTED_JOBS",
        default_value_t = 1,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    jobs: u16,

    /// Show a progress bar
    #[arg(short, long)]
    progress: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let area = CoverageArea::new(cli.lat_min, cli.lat_max, cli.lon_min, cli.lon_max);

    if !cli.json {
        println!("{}", report::banner(Local::now(), &area, &cli.output));
    }

    let progress = if cli.progress {
        Some(progress_bar(area.tile_count())?)
    } else {
        None
    };
    logging::init(progress.clone());

    run(cli, &area, progress)
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn run(cli: Cli, area: &CoverageArea, progress: Option<ProgressBar>) -> Result<()> {
    let mut config = DownloadConfig::with_bucket_url(cli.bucket_url);
    if let Some(timeout) = cli.timeout {
        config = config.with_timeout(timeout);
    }
    let fetcher =
        Downloader::new(config, &cli.cache_dir).context("Failed to create tile downloader")?;

    let toolkit = GdalToolkit::default()
        .with_translate(cli.gdal_translate)
        .with_fillnodata(cli.gdal_fillnodata);
    let converter = Converter::new(toolkit, &cli.cache_dir);

    let mut runner =
        CoverageRunner::new(fetcher, converter, &cli.output).jobs(usize::from(cli.jobs));

    if let Some(bar) = progress.clone() {
        runner = runner.on_tile(move |outcome| {
            let label = match outcome.status {
                TileStatus::Converted => "ok",
                TileStatus::FetchFailed => "fetch failed",
                TileStatus::ConvertFailed => "convert failed",
            };
            bar.set_message(format!("{} {}", outcome.coord, label));
            bar.inc(1);
        });
    }

    let summary = runner.run(area);

    if let Some(pb) = progress {
        pb.finish_with_message("done");
    }

    report::print_summary(&summary, area, &cli.output, cli.json)
}
