use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use salmon_rules::{EngineConfig, Game, Move, SelfCheckPolicy, STARTING_PLACEMENT};

/// Plays random legal moves from a placement and prints every ply.
#[derive(Parser, Debug)]
#[command(name = "salmon-rules", version, about)]
struct Args {
    /// Rank-by-rank placement; uppercase letters are White
    #[arg(long, default_value = STARTING_PLACEMENT)]
    placement: String,

    /// Maximum number of plies to play
    #[arg(long, default_value_t = 40)]
    plies: usize,

    /// Seed for move selection; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Reject every move that leaves the mover's king attacked
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let policy = if args.strict {
        SelfCheckPolicy::Strict
    } else {
        SelfCheckPolicy::KingOnly
    };
    let config = EngineConfig::new().with_self_check(policy);
    let mut game = Game::from_placement(&args.placement, config)
        .with_context(|| format!("could not load placement {:?}", args.placement))?;

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("playing up to {} plies with seed {}", args.plies, seed);
    let mut rng = StdRng::seed_from_u64(seed);

    println!("{}", game.position());
    for _ in 0..args.plies {
        if game.is_over() {
            break;
        }
        let side = game.side_to_move();
        let candidates: Vec<Move> = game.moves_for_side(side).copied().collect();
        let Some(mv) = candidates.choose(&mut rng) else {
            println!("{} has no moves", side);
            break;
        };

        let status = game.apply_move(mv).context("generated move was refused")?;
        println!("{}. {} ({})", game.history().len(), mv, status);
        println!("{}", game.position());
    }

    println!("final placement: {}", game.position().to_placement());
    Ok(())
}
