//! Little Echoes entry point
//!
//! Native builds run the simulation headless: the autopilot (or an idle
//! player) plays for the configured time at 60 frames per second, and a
//! JSON summary is printed at the end.

use serde::Serialize;

use little_echoes::audio::LogAudio;
use little_echoes::sim::Mode;
use little_echoes::{Game, Settings};

/// Frame time of the headless loop
const FRAME_DT: f32 = 1.0 / 60.0;

/// End-of-run report
#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    mode: Mode,
    score: u64,
    health: i32,
    waves_cleared: u32,
    enemies: usize,
    items_left: usize,
    level_time: f64,
}

fn main() {
    env_logger::init();
    log::info!("Little Echoes (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match Settings::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => Settings::load(),
    };

    let mut game = Game::new(&settings, Box::new(LogAudio::new()));
    game.request_start();

    let frames = (settings.run_seconds / FRAME_DT).ceil() as u64;
    for _ in 0..frames {
        game.frame(FRAME_DT);
        if game.mode() != Mode::Playing {
            break;
        }
    }

    let state = &game.state;
    let summary = Summary {
        seed: state.seed,
        mode: state.mode,
        score: state.score(),
        health: state.player.health,
        waves_cleared: state.waves_cleared,
        enemies: state.enemies.len(),
        items_left: state.uncollected_items().count(),
        level_time: state.level_time,
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to encode summary: {}", e),
    }
}
