use tracing::info;
use tracing_subscriber;

use clap::{value_t, App, Arg};

use std::path::Path;

use synod_sim::driver::{sweep, Settings};
use synod_sim::Result;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_level(false)
        .with_target(false)
        .compact()
        .with_max_level(tracing::Level::INFO)
        .init();

    let matches = App::new("synod")
        .version("0.1")
        .author("zero.fx labs ltd.")
        .about("Runs leaderless binary consensus experiments with crash faults")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("CONFIG")
                .takes_value(true)
                .required(false),
        )
        .arg(
            Arg::with_name("participants")
                .short("n")
                .long("participants")
                .value_name("N")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("faulty")
                .short("f")
                .long("faulty")
                .value_name("F")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("crash-probability")
                .short("a")
                .long("crash-probability")
                .value_name("A")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("hold-delay")
                .short("t")
                .long("hold-delay")
                .value_name("MILLIS")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("iterations")
                .short("i")
                .long("iterations")
                .value_name("ITERATIONS")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("seed")
                .short("s")
                .long("seed")
                .value_name("SEED")
                .takes_value(true),
        )
        .get_matches();

    let mut settings = Settings::load(matches.value_of("config").map(Path::new))?;
    if matches.is_present("participants") {
        let n = value_t!(matches.value_of("participants"), usize).unwrap_or_else(|e| e.exit());
        settings.participants = vec![n];
    }
    if matches.is_present("faulty") {
        let f = value_t!(matches.value_of("faulty"), usize).unwrap_or_else(|e| e.exit());
        settings.faulty = Some(f);
    }
    if matches.is_present("crash-probability") {
        let a = value_t!(matches.value_of("crash-probability"), f64).unwrap_or_else(|e| e.exit());
        settings.crash_probabilities = vec![a];
    }
    if matches.is_present("hold-delay") {
        let t = value_t!(matches.value_of("hold-delay"), u64).unwrap_or_else(|e| e.exit());
        settings.hold_delays_ms = vec![t];
    }
    if matches.is_present("iterations") {
        settings.iterations =
            value_t!(matches.value_of("iterations"), usize).unwrap_or_else(|e| e.exit());
    }
    if matches.is_present("seed") {
        settings.seed = Some(value_t!(matches.value_of("seed"), u64).unwrap_or_else(|e| e.exit()));
    }

    let reports = sweep(&settings, |label, report| println!("{}: {}", label, report))?;
    info!(target: "synod", "{} runs completed", reports.len());

    Ok(())
}
