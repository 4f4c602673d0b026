//! Example: wildfire assessment on synthetic scenes
//!
//! Builds a short pre-fire season and a post-fire scene over a 64×64 area
//! with a circular burn scar and a cloud bank, then runs:
//! 1. Exclusion masks and NDVI for every pre-fire scene
//! 2. VCI of the latest pre-fire scene against the season
//! 3. dNBR between the latest pre-fire and the post-fire scene
//! 4. Classification of all three indices

use burnmap_algorithms::imagery::{assess, AssessmentInput, ClassSummary, Observation};
use burnmap_core::sentinel2::{NIR, RED, SWIR};
use burnmap_core::{Raster, Scene};
use ndarray::Array3;

const SIZE: usize = 64;

fn main() {
    let pre_fire: Vec<Observation> = [1.0, 0.95, 0.8, 0.7]
        .iter()
        .enumerate()
        .map(|(i, &greenness)| Observation::new(season_scene(greenness, false), scl(i == 1)))
        .collect();
    let post_fire = Observation::new(season_scene(0.7, true), scl(false));

    let input = AssessmentInput {
        latest_pre_fire: pre_fire.len() - 1,
        pre_fire,
        post_fire,
        mask_burn_ratio: false,
    };

    let result = match assess(&input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Assessment failed: {}", e);
            return;
        }
    };

    println!("Area: {} x {}", SIZE, SIZE);
    println!("VCI history: {} scenes", result.history_used);
    for (i, fraction) in result.pre_fire_masked.iter().enumerate() {
        if let Some(f) = fraction {
            println!("  Pre-fire scene {}: {:.1}% masked", i, 100.0 * f);
        }
    }

    let report = result.report();
    print_summary(&report.ndvi);
    print_summary(&report.vci);
    print_summary(&report.dnbr);
}

/// Vegetated scene scaled by `greenness`, optionally with a burn scar.
fn season_scene(greenness: f64, burned: bool) -> Scene<f64> {
    let mut data = Array3::zeros((SIZE, SIZE, 12));
    let center = SIZE as f64 / 2.0;

    for row in 0..SIZE {
        for col in 0..SIZE {
            let dr = row as f64 - center;
            let dc = col as f64 - center;
            let in_scar = burned && (dr * dr + dc * dc).sqrt() < SIZE as f64 / 4.0;
            // Slight texture so classes are not uniform
            let texture = ((row * 7 + col * 13) % 50) as f64;

            let (nir, red, swir) = if in_scar {
                (1100.0 + texture, 950.0, 2900.0 - texture)
            } else {
                (4200.0 * greenness + texture, 700.0, 1500.0)
            };
            data[(row, col, NIR)] = nir;
            data[(row, col, RED)] = red;
            data[(row, col, SWIR)] = swir;
        }
    }
    Scene::from_array(data)
}

/// Vegetation everywhere, optionally with a band of high-probability cloud.
fn scl(cloudy: bool) -> Raster<u8> {
    let mut scl = Raster::filled(SIZE, SIZE, 4u8);
    if cloudy {
        for row in 0..SIZE / 4 {
            for col in 0..SIZE {
                let _ = scl.set(row, col, 9);
            }
        }
    }
    scl
}

fn print_summary(summary: &ClassSummary) {
    println!(
        "\n{} ({} unclassified of {}):",
        summary.index, summary.unclassified, summary.total_pixels
    );
    for c in summary.classes.iter().filter(|c| c.count > 0) {
        println!("  {:>2} {:<24} {:>6.1}%", c.class, c.label, 100.0 * c.fraction);
    }
}
