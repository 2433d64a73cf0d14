//! A walk through the construction surface: units, notes, waveforms and
//! composition. Run with `cargo run --example tour`.

use std::error::Error;
use std::f64::consts::PI;
use tonegraph::dsl::{
    function_wave, noise, piecewise, piecewise_linear_over, piecewise_over, pulse,
    sample_and_hold, sawtooth, sine, square, triangle, Patch, Signal,
};
use tonegraph::note::{flat, octave_down, octave_up, sharp, A, C, E, G};
use tonegraph::units::{Frequency, UnitExt};
use tonegraph::RenderConfig;

fn approx_square(phase: f64) -> f64 {
    (phase * 2.0 * PI).sin() + (phase * 6.0 * PI).sin() / 3.0 + (phase * 10.0 * PI).sin() / 5.0
}

fn major_seventh(root: Frequency) -> Signal {
    sine(root) + sine(root + 4.0.semitones()) + sine(root + 7.0.semitones()) + sine(root + 11.0.semitones())
}

fn units() -> Result<(), Box<dyn Error>> {
    println!("{}", 440.0.hz());
    println!("{}", 1.2.khz());
    println!("{} {} {}", 5.0.sec(), 33.0.msec(), 3.0.minutes());

    println!("{}", 1000.0.hz() == 1.0.khz());
    println!("{}", 60.0.sec() == 1.0.minutes());
    println!("{}", 59.0.sec() < 1.0.minutes());

    println!("{}", 50.0.hz() + 20.0.hz());
    println!("{}", 20.0.sec() - 500.0.msec());
    println!("{} {} {}", 100.0.hz() * 2.0, 5.0 * 60.0.sec(), (10.0.minutes() / 12.0)?);

    println!("{} {}", (1.0 / 10.0.hz())?, (1.0 / 3.0.sec())?);
    println!("{}", 5.0.hz() * 20.0.sec());
    Ok(())
}

fn notes() {
    println!("Middle C is {}", C.at(4.0));
    println!("C#4 is {}", C.sharp_at(4.0));
    println!("up a fifth: {}", C.at(4.0) + 7.0.semitones());
    println!("up an octave: {}", C.at(4.0) + 1.0.octaves());
    println!("B flat: {}", C.at(4.0) - 1.0.semitones());
    println!(
        "{} {} {} {} {}",
        sharp(C.at(5.0)),
        sharp(C.sharp_at(5.0)),
        flat(E.at(5.0)),
        octave_up(C.at(5.0)),
        octave_down(E.at(4.0)),
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    units()?;
    notes();

    let config = RenderConfig {
        sample_rate: 22050.0.hz(),
        duration: 1.0.sec(),
    };
    let voices: Vec<(&str, Signal)> = vec![
        ("sine", sine(A.at(4.0))),
        ("saw", sawtooth(440.0.hz())),
        ("triangle", triangle(440.0.hz())),
        ("pulse", pulse(440.0.hz(), 0.25)),
        ("square", square(440.0.hz())),
        ("fourier square", function_wave(440.0.hz(), approx_square)),
        ("softer square", 0.25 * square(440.0.hz())),
        ("unison", 0.5 * triangle(440.0.hz()) + 0.5 * sawtooth(440.0.hz())),
        ("octave", sawtooth(440.0.hz()) + sawtooth(880.0.hz())),
        ("supersaw", sawtooth(440.0.hz()) + sawtooth(439.0.hz())),
        ("am", sawtooth(440.0.hz()) * sawtooth(2.0.hz())),
        ("fm", sawtooth(440.0.hz() + 100.0 * sine(1.0.hz()))),
        ("eight-bit noise", sample_and_hold(500.0.hz(), noise())),
        (
            "beeps and boops",
            square(440.0.hz() + 100.0 * sample_and_hold(10.0.hz(), noise())),
        ),
        (
            "c major",
            sine(C.at(4.0)) + sine(E.at(4.0)) + sine(G.at(4.0)),
        ),
        ("cmaj7", 0.25 * major_seventh(C.at(4.0))),
        (
            "lo-fi triangle",
            piecewise(C.at(4.0), [0.0, 0.5, 1.0, 0.5, 0.0, -0.5, -1.0, -0.5])?,
        ),
        (
            "arpeggio",
            square(piecewise(2.0.hz(), [C.at(4.0), E.at(4.0), G.at(4.0)])?),
        ),
        (
            "fast arpeggio",
            square(piecewise_over(0.1.sec(), [C.at(4.0), E.at(4.0), G.at(4.0)])?),
        ),
        (
            "wavy",
            square(piecewise_linear_over(
                0.5.sec(),
                [C.at(4.0), E.at(4.0), E.at(3.0), C.at(5.0)],
            )?),
        ),
    ];

    for (name, signal) in &voices {
        let mut patch = Patch::compile(signal)?;
        let wav = patch.to_wav(&config)?;
        let peak = patch
            .render(&config)?
            .into_iter()
            .fold(0.0f64, |peak, s| peak.max(s.abs()));
        println!(
            "{name:>16}: {} nodes, {} bytes, peak {peak:.3}",
            patch.graph().len(),
            wav.len()
        );
    }
    Ok(())
}
