//! Braid Maze entry point
//!
//! Headless demo: generates a maze, drives the agent for a few simulated
//! seconds and prints the result. Windowing and drawing belong to a host.

use std::time::{Duration, Instant};

use braid_maze::sim::{Blocked, CellFlags};
use braid_maze::{Session, Settings, ViewMode};

/// Simulated seconds of agent movement
const DEMO_SECONDS: u32 = 10;

fn main() {
    env_logger::init();
    log::info!("Braid Maze (native) starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), braid_maze::MazeError> {
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let mut session = Session::new(settings)?;
    session.generate()?;
    if session.wait_for_maze().is_none() {
        log::warn!("Generation was cancelled");
        return Ok(());
    }

    session.set_view_mode(ViewMode::Overhead);
    drive(&mut session);

    print_maze(&session);
    let pos = session.agent().position();
    println!(
        "agent at ({:.2}, {:.2}) facing {:.2} rad, solved: {}",
        pos.x,
        pos.y,
        session.agent().orientation(),
        session.solution_revealed()
    );
    Ok(())
}

/// Push forward, turning while a wall blocks the way
fn drive(session: &mut Session) {
    let tick = Duration::from_secs_f32(1.0 / 30.0);
    let mut now = Instant::now();
    let mut turning = 0u32;

    for _ in 0..DEMO_SECONDS * 30 {
        let forward = turning == 0;
        session.set_intent(forward, false, turning > 0, false);
        now += tick;
        match session.update_agent(tick.as_secs_f32(), now) {
            Some(Blocked { x, y, corner }) if x || y || corner => turning = 12,
            _ => turning = turning.saturating_sub(1),
        }
    }
}

fn print_maze(session: &Session) {
    let Some(grid) = session.grid() else {
        return;
    };
    let agent = session.agent().cell();
    let border = "#".repeat(grid.width() + 2);
    println!("{border}");
    for y in 0..grid.height() as i32 {
        let row: String = (0..grid.width() as i32)
            .map(|x| {
                if (x, y) == agent {
                    '@'
                } else if grid.check(x, y, CellFlags::TRUE_PATH) {
                    '*'
                } else if grid.check(x, y, CellFlags::PATH) {
                    '.'
                } else {
                    '#'
                }
            })
            .collect();
        println!("#{row}#");
    }
    println!("{border}");
}
