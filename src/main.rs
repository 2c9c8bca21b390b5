//! Ledgewalker headless demo
//!
//! Runs the simulation for a scripted half minute and logs what happened.
//! Useful as a smoke run and as a minimal embedding example; a real game
//! wraps `World::tick` in its own render loop.

use glam::Vec2;

use ledgewalker::consts::SIM_DT;
use ledgewalker::level::{build_world, demo_level};
use ledgewalker::sim::GameEvent;
use ledgewalker::{Scoreboard, TickInput, Tuning};

fn main() {
    env_logger::init();

    let seed = 0xC0FFEE;
    let tuning = Tuning::default();
    let mut world = build_world(&demo_level(), &tuning, seed);
    let mut board = Scoreboard::new();

    log::info!("demo run starting, seed {seed:#x}");

    let ticks = (30.0 / SIM_DT) as u64;
    for t in 0..ticks {
        // Scripted input: pace right/left in ~4s phases, hop and shoot at
        // the aim point ahead of the player every so often
        let phase = (t / 480) % 2 == 0;
        let player_center = world.player().map(|p| p.center()).unwrap_or(Vec2::ZERO);
        let input = TickInput {
            left: !phase,
            right: phase,
            jump: t % 180 == 0,
            fire: t % 90 == 0,
            aim: player_center + Vec2::new(if phase { 200.0 } else { -200.0 }, 0.0),
        };

        world.tick(&input, SIM_DT);

        let events = world.take_events();
        for event in &events {
            match event {
                GameEvent::Spawned { id, name } => log::debug!("spawned {name} as #{id}"),
                GameEvent::Damaged { id, amount } => log::debug!("#{id} took {amount} damage"),
                GameEvent::FoeKilled { name, score } => log::info!("killed a {name} (+{score})"),
                GameEvent::PlayerKilled => log::info!("player went down"),
            }
        }
        board.record(&events);
    }

    let alive = world.entities.iter().filter(|e| e.is_enemy()).count();
    log::info!(
        "demo over: score {}, {} kills, {} foes still up",
        board.score,
        board.total_kills(),
        alive
    );
}
