//! Render a short organ tune to a WAV file.
//!
//! Usage: `cargo run --example render_wav [path]` (default `tune.wav`).

use std::error::Error;
use std::f64::consts::PI;
use tonegraph::dsl::{function_wave, piecewise_over, Patch, Signal};
use tonegraph::note::{A, B, C, D, E, F, G};
use tonegraph::units::{Frequency, UnitExt};
use tonegraph::wav;
use tonegraph::RenderConfig;

fn organ(phase: f64) -> f64 {
    0.4 * ((phase * 2.0 * PI).sin() + (phase * 4.0 * PI).sin() + (phase * 8.0 * PI).sin())
}

fn approx_square(phase: f64) -> f64 {
    (phase * 2.0 * PI).sin() + (phase * 6.0 * PI).sin() / 3.0 + (phase * 10.0 * PI).sin() / 5.0
}

fn tune() -> Result<Signal, Box<dyn Error>> {
    let melody: [Frequency; 24] = [
        E.at(5.0), D.at(5.0), F.sharp_at(4.0), F.sharp_at(4.0), G.sharp_at(4.0), G.sharp_at(4.0),
        C.sharp_at(5.0), B.at(4.0), D.at(4.0), D.at(4.0), E.at(4.0), E.at(4.0),
        B.at(4.0), A.at(4.0), C.sharp_at(4.0), C.sharp_at(4.0), E.at(4.0), E.at(4.0),
        A.at(4.0), A.at(4.0), A.at(4.0), A.at(4.0), A.at(4.0), A.at(4.0),
    ];
    let harmony = [B.at(2.0), E.at(3.0), A.at(2.0), A.at(2.0)];

    let lead = function_wave(piecewise_over(3.0.sec(), melody)?, organ);
    let bass = function_wave(piecewise_over(3.0.sec(), harmony)?, approx_square);
    Ok(0.5 * lead + 0.25 * bass)
}

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "tune.wav".to_string());
    let config = RenderConfig::with_duration(3.0.sec());

    let mut patch = Patch::compile(&tune()?)?;
    let samples = patch.samples(config.sample_rate, config.duration)?;
    wav::write_file(&path, samples, config.sample_rate)?;

    println!(
        "wrote {} samples at {} to {path}",
        config.sample_count()?,
        config.sample_rate
    );
    Ok(())
}
