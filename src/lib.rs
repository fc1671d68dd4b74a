pub mod commands;
pub mod config;
pub mod pipeline;
pub mod summary;

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;

pub use commands::{ProcessOutcome, ProcessRequest};
pub use config::PipelineConfig;
pub use pipeline::{match_id_from_path, ScoreboardReader};
pub use summary::RunSummary;

fn cli() -> Command {
    Command::new("scoreboard-reader")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reads a post-match scoreboard screenshot into a JSON match record")
        .arg(
            Arg::new("image")
                .value_name("IMAGE")
                .help("Scoreboard screenshot")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("players")
                .long("players")
                .short('p')
                .value_name("FILE")
                .help("Expected players, one per line ('-' for stdin); replaces the player whitelist")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("JSON config overriding paths, layout and thresholds")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("FILE")
                .help("Where to write the record (default: <image>.json)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("match-id")
                .long("match-id")
                .value_name("ID")
                .help("Match id (default: the digits of the image file name)")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log per-region details")
                .action(ArgAction::SetTrue),
        )
}

fn request_from(matches: &ArgMatches) -> ProcessRequest {
    ProcessRequest {
        image: matches.get_one::<PathBuf>("image").cloned().unwrap_or_default(),
        players: matches.get_one::<PathBuf>("players").cloned(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        output: matches.get_one::<PathBuf>("output").cloned(),
        match_id: matches.get_one::<u64>("match-id").copied(),
    }
}

pub fn run() -> ExitCode {
    let matches = cli().get_matches();

    let default_filter = if matches.get_flag("verbose") {
        "scoreboard_reader=debug,sb_vision=debug,sb_reconcile=debug,sb_data=debug"
    } else {
        "scoreboard_reader=info,sb_vision=info,sb_reconcile=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let request = request_from(&matches);
    match commands::process(&request) {
        Ok(outcome) => {
            println!("OK {} -> {}", request.image.display(), outcome.output.display());
            println!("{}", outcome.summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("FAILED {}: {:#}", request.image.display(), e);
            ExitCode::FAILURE
        }
    }
}
