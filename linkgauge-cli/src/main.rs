//! LinkGauge command-line aggregator.
//!
//! Replays a trace of inbound node traffic (one JSON message per line,
//! from a file or stdin) through the aggregation engine. Acknowledgments
//! and window feedback are broadcast to stdout in the same line format;
//! the optional live view goes to stderr.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use linkgauge_core::{Dispatcher, Transport};

use crate::replay::LineTransport;

mod replay;
mod view;

#[derive(Parser)]
#[command(name = "linkgauge", version, about = "Sensor network quality aggregator")]
struct Cli {
    /// Inbound message trace, one JSON message per line ("-" for stdin)
    input: PathBuf,

    /// Show messages and a per-node quality table on stderr
    #[arg(short, long)]
    visualize: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> io::Result<()> {
    let reader: Box<dyn BufRead> = if cli.input.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(&cli.input)?))
    };

    let transport = LineTransport::new(reader, io::stdout().lock());
    let mut dispatcher = Dispatcher::new(transport);

    while let Some(message) = dispatcher.transport_mut().poll() {
        if cli.visualize {
            view::observe(&message);
        }
        // Rejections are logged inside the dispatcher; the replay keeps
        // going exactly like the live aggregator would.
        let _ = dispatcher.handle(message);
    }

    let metrics = *dispatcher.metrics();
    info!(
        "done: {} messages from {} nodes, {} acks, {} feedback, {} rejected",
        metrics.messages_handled,
        dispatcher.registry().len(),
        metrics.acks_sent,
        metrics.feedback_sent,
        metrics.malformed_rejected
    );

    if cli.visualize {
        view::summary(dispatcher.registry());
    }

    Ok(())
}
