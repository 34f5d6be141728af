//! `gen_frames` binary: print synthetic FLEX frame lines, suitable for piping
//! into `pagerframe`.

use std::{
    io::{self, BufWriter, Write},
    process::ExitCode,
    thread,
    time::Duration,
};

use clap::Parser;
use pagerframe::synth::FrameGenerator;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::error;

/// Command line arguments for the `gen_frames` binary.
#[derive(Debug, Parser)]
#[command(name = "gen_frames", version, about = "Generate synthetic pager frame lines")]
struct Args {
    /// Stop after this many lines and print them without delay.
    #[arg(long, short = 'n')]
    count: Option<u64>,
    /// Seed for a reproducible stream.
    #[arg(long)]
    seed: Option<u64>,
    /// Upper bound of the random pause between lines, in milliseconds.
    #[arg(long, default_value_t = 3_000)]
    max_delay_ms: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let args = Args::parse();
    let mut generator = args
        .seed
        .map_or_else(FrameGenerator::from_entropy, FrameGenerator::from_seed);
    let mut delays = StdRng::from_entropy();

    match emit(&args, &mut generator, &mut delays) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "failed to write frames");
            ExitCode::FAILURE
        }
    }
}

fn emit(args: &Args, generator: &mut FrameGenerator<StdRng>, delays: &mut StdRng) -> io::Result<()> {
    let stdout = io::stdout();
    if let Some(count) = args.count {
        let mut out = BufWriter::new(stdout.lock());
        for _ in 0..count {
            writeln!(out, "{}", generator.next_line())?;
        }
        return out.flush();
    }

    let mut out = stdout.lock();
    loop {
        writeln!(out, "{}", generator.next_line())?;
        out.flush()?;
        let pause = delays.gen_range(0..=args.max_delay_ms);
        thread::sleep(Duration::from_millis(pause));
    }
}
