//! Headless autoplay runner (default binary).
//!
//! Loads a level (or a random default board), then keeps popping a random playable
//! group until the move budget, the step cap or the board's moves run out. Prints a
//! line per pop and the final board; optionally appends every engine event to a JSONL log.

use anyhow::{Context, Result};

use tile_blast::config::RunnerConfig;
use tile_blast::core::{GridState, GroupInfo, PopOutcome, Rules, SimpleRng};
use tile_blast::level::LevelDefinition;
use tile_blast::log::EventLog;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = RunnerConfig::parse(&args)?;
    run(&config)
}

fn run(config: &RunnerConfig) -> Result<()> {
    let mut level = match &config.level_path {
        Some(path) => LevelDefinition::load(path)?,
        None => LevelDefinition::random(&Rules::default()),
    };
    if let Some(seed) = config.seed {
        level.seed = seed;
    }
    if let Some(moves) = config.moves {
        level.move_count = Some(moves);
    }

    let mut log = match &config.log_path {
        Some(path) => Some(EventLog::open(path)?),
        None => None,
    };

    let rules = level.rules(0)?;
    let spawns = level.spawns(0)?;
    let mut state = GridState::new(rules.clone()).context("runner: invalid rules")?;
    state
        .initialize_board(rules.width, rules.height, &spawns)
        .context("runner: invalid level layout")?;

    println!(
        "[Runner] level {:?}: {}x{}, {} kinds, seed {}, moves {}",
        level.name,
        rules.width,
        rules.height,
        rules.kind_count,
        rules.seed,
        rules
            .move_limit
            .map_or_else(|| String::from("unlimited"), |m| m.to_string()),
    );
    if let Some(largest) = state.last_analysis().largest_group() {
        println!(
            "[Runner] opening board: largest group {} x kind {} at {}",
            largest.size, largest.kind, largest.seed
        );
    }
    flush_events(&mut state, log.as_mut())?;

    let mut picker = SimpleRng::new(rules.seed ^ 0x9E37_79B9);
    let mut popped_tiles = 0usize;

    for step in 1..=config.max_steps {
        if state.is_finished() {
            println!("[Runner] move budget spent");
            break;
        }

        let groups: Vec<GroupInfo> = state.last_analysis().playable_groups().copied().collect();
        if groups.is_empty() {
            println!("[Runner] no playable group left");
            break;
        }
        let pick = groups[picker.next_range(groups.len() as u32) as usize];

        let reshuffles_before = state.reshuffle_count();
        match state.pop_group(pick.seed)? {
            PopOutcome::Popped { kind, size } => {
                popped_tiles += size;
                if !config.quiet {
                    println!(
                        "[Runner] move {}: popped {} x kind {} at {} ({} tier){}",
                        step,
                        size,
                        kind,
                        pick.seed,
                        pick.tier.as_str(),
                        if state.reshuffle_count() > reshuffles_before {
                            ", board reshuffled"
                        } else {
                            ""
                        },
                    );
                }
            }
            other => {
                eprintln!("[Runner] move {}: pop at {} rejected: {:?}", step, pick.seed, other);
                break;
            }
        }
        flush_events(&mut state, log.as_mut())?;
    }

    let snapshot = state.snapshot();
    println!(
        "[Runner] done: {} moves, {} tiles popped, {} reshuffles, board hash {:016x}",
        state.moves_used(),
        popped_tiles,
        state.reshuffle_count(),
        snapshot.board_hash,
    );
    if !config.quiet {
        for row in state.board().to_rows() {
            println!("[Runner]   {}", row);
        }
    }

    if let Some(log) = log.as_mut() {
        log.flush()?;
        println!("[Runner] wrote {} events", log.seq());
    }
    Ok(())
}

fn flush_events(state: &mut GridState, log: Option<&mut EventLog>) -> Result<()> {
    let events = state.drain_events();
    if let Some(log) = log {
        log.record_all(&events)?;
    }
    Ok(())
}
