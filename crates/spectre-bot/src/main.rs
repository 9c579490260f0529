use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use spectre_ai::Planner;
use spectre_bot::protocol::{self, ProtocolError, StunTracker, Tokenizer};
use spectre_core::action::Action;
use spectre_core::config::GameConfig;

/// Arena bot speaking the turn-based text protocol on stdin/stdout.
#[derive(Parser)]
#[command(name = "spectre-bot")]
struct Args {
    /// Replay a captured input dump instead of reading stdin.
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Log filter (overrides RUST_LOG), e.g. "spectre_ai=debug".
    #[arg(long)]
    log: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_deref());

    match &args.replay {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening replay {path:?}"))?;
            run(BufReader::new(file), true)
        }
        None => run(io::stdin().lock(), false),
    }
}

fn run<R: BufRead>(reader: R, replay: bool) -> anyhow::Result<()> {
    let mut tokens = Tokenizer::new(reader);
    let rules = GameConfig::default();
    let header = protocol::read_header(&mut tokens)?;
    info!(
        busters = header.busters_per_player,
        ghosts = header.ghost_count,
        team = header.my_team_id,
        "game started"
    );

    let mut planner = Planner::new(rules.clone(), header.my_team_id, header.ghost_count);
    let mut stuns = StunTracker::new(rules.stun_cooldown);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut turn = 0u32;

    loop {
        let observation = match protocol::read_turn(&mut tokens, &header, &stuns, turn) {
            Ok(observation) => observation,
            // The stream closing between turns is the normal end of game.
            Err(ProtocolError::UnexpectedEof) if replay || turn > 0 => {
                info!(turn, "input closed, game over");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        for (buster, action) in planner.decide(&observation) {
            if matches!(action, Action::Stun { .. }) {
                stuns.record(buster, turn);
            }
            writeln!(out, "{}", protocol::encode_action(&action, ""))?;
        }
        out.flush()?;
        turn += 1;
    }
}

fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::from_default_env(),
    };
    // Stdout belongs to the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
