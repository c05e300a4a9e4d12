//! Print the tiles a coverage run would process, without fetching anything.
//!
//! Run with: cargo run --example plan -- 53 57 20 28 ./DTED_Lithuania

use cop2dted::filename::object_key;
use cop2dted::{CoverageArea, LatitudeBand};
use std::env;
use std::path::PathBuf;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let bounds: Vec<i32> = args.iter().take(4).filter_map(|s| s.parse().ok()).collect();

    let area = match bounds.as_slice() {
        [lat_min, lat_max, lon_min, lon_max] => {
            CoverageArea::new(*lat_min, *lat_max, *lon_min, *lon_max)
        }
        _ => {
            eprintln!("Usage: cargo run --example plan -- LAT_MIN LAT_MAX LON_MIN LON_MAX [OUTPUT]");
            std::process::exit(1);
        }
    };
    let output = PathBuf::from(args.get(4).map(String::as_str).unwrap_or("./DTED"));

    println!("Coverage: {} ({} tiles)", area, area.tile_count());
    println!("{:-<100}", "");

    for coord in area.tiles() {
        println!(
            "{:>10}  {:?}  {:>4} cols  {}  ->  {}",
            coord.to_string(),
            LatitudeBand::from_lat(coord.lat),
            coord.grid_width(),
            object_key(&coord.tile_name()),
            coord.output_path(&output).display()
        );
    }
}
