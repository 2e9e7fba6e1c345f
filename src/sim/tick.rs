//! Per-frame simulation step
//!
//! Routes actions through the mode state machine, then (only while playing)
//! advances the session: player, items, enemies, wave check.

use glam::Vec2;
use rand::Rng;

use super::enemy::Enemy;
use super::mode::{Action, Mode};
use super::state::{GameEvent, GameState, Item, MoveInput};
use crate::audio::{Sound, Track};
use crate::consts::*;
use crate::distance;

/// Autopilot ignores axis offsets smaller than this
const AUTOPILOT_DEADZONE: f32 = 4.0;

/// Damage dealt by touching an enemy
const CONTACT_DAMAGE: i32 = 1;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held directional keys
    pub movement: MoveInput,
    /// Start a new game (menu button)
    pub start: bool,
    /// Escape back to the menu
    pub back: bool,
    /// Exit (menu button)
    pub exit: bool,
    /// Toggle music on/off
    pub toggle_music: bool,
    /// Demo mode - steer toward the nearest item
    pub autopilot: bool,
}

impl TickInput {
    /// Forget one-shot actions once a tick has consumed them
    pub fn clear_actions(&mut self) {
        self.start = false;
        self.back = false;
        self.exit = false;
        self.toggle_music = false;
    }
}

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Music is audio-only state and stays toggleable after quitting
    if input.toggle_music {
        toggle_music(state);
    }
    if state.mode == Mode::Quit {
        return;
    }
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

    if input.start {
        apply_action(state, Action::Start);
    }
    if input.back {
        apply_action(state, Action::Back);
    }
    if input.exit {
        apply_action(state, Action::Exit);
    }

    if state.mode.is_simulating() {
        update_session(state, input, dt);
    }
}

/// Flip the music flag; starts or stops the loop accordingly
pub fn toggle_music(state: &mut GameState) {
    state.music_enabled = !state.music_enabled;
    log::info!(
        "Music {}",
        if state.music_enabled { "on" } else { "off" }
    );
    if state.music_enabled {
        state.emit(GameEvent::MusicStarted(Track::Background));
    } else {
        state.emit(GameEvent::MusicStopped);
    }
    if state.mode.accepts_menu_clicks() {
        state.emit(GameEvent::SoundRequested(Sound::MenuClick));
    }
}

/// Run `action` through the mode table and apply its side effects
pub fn apply_action(state: &mut GameState, action: Action) {
    let Some(to) = state.mode.on_action(action) else {
        return;
    };
    match action {
        Action::Start => {
            if state.mode == Mode::GameOver {
                state.set_mode(Mode::Menu);
            }
            state.emit(GameEvent::SoundRequested(Sound::MenuClick));
            start_new_game(state);
        }
        Action::Back => {
            state.set_mode(to);
            state.emit(GameEvent::MusicStopped);
        }
        Action::Exit => {
            state.emit(GameEvent::SoundRequested(Sound::MenuClick));
            state.set_mode(to);
        }
    }
}

/// Reset the session and begin playing
pub fn start_new_game(state: &mut GameState) {
    state.reset_session();
    log::info!(
        "New game: {} enemies, {} items",
        state.enemies.len(),
        state.items.len()
    );
    state.set_mode(Mode::Playing);
    state.emit(GameEvent::MusicStarted(Track::Background));
}

fn update_session(state: &mut GameState, input: &TickInput, dt: f32) {
    state.level_time += f64::from(dt);
    let now = state.now();

    let movement = if input.autopilot {
        autopilot_movement(state)
    } else {
        input.movement
    };
    state.player.update(dt, &movement);

    // Items
    let player_rect = state.player.rect();
    for item in state.items.iter_mut().filter(|it| !it.collected) {
        item.update(dt);
        if item.rect().overlaps(&player_rect) {
            item.collected = true;
            state.player.score += ITEM_REWARD;
            log::debug!("Item collected at {:?}, score {}", item.pos, state.player.score);
            state.events.push(GameEvent::ItemCollected { pos: item.pos });
            state.events.push(GameEvent::SoundRequested(Sound::Pickup));
        }
    }

    // Enemies
    let player_pos = state.player.pos;
    let mut player_died = false;
    for enemy in state.enemies.iter_mut() {
        enemy.update(dt, player_pos, now, &mut state.rng);

        if enemy.rect().overlaps(&player_rect)
            && state.player.take_damage(CONTACT_DAMAGE, now)
        {
            let health = state.player.health;
            log::debug!("Player hit at t={:.2}, health {}", now, health);
            state.events.push(GameEvent::SoundRequested(Sound::Hit));
            state.events.push(GameEvent::PlayerHit { health });
            if state.player.is_dead() {
                player_died = true;
            }
        }
    }
    if player_died {
        log::info!("Game over at t={:.2}, score {}", now, state.player.score);
        state.set_mode(Mode::GameOver);
        state.emit(GameEvent::MusicStopped);
    }

    // Wave refresh: every item collected
    if state.items.iter().all(|it| it.collected) {
        state.player.score += WAVE_BONUS;
        let extra = spawn_enemies(&mut state.rng, WAVE_EXTRA_ENEMIES, state.player.pos);
        state.enemies.extend(extra);
        state.items = generate_items(&mut state.rng, REFRESH_ITEM_COUNT);
        state.waves_cleared += 1;
        log::info!(
            "Wave {} cleared: {} enemies, score {}",
            state.waves_cleared,
            state.enemies.len(),
            state.player.score
        );
        state.emit(GameEvent::WaveCleared {
            waves: state.waves_cleared,
        });
    }
}

/// Directional keys that walk the player toward the nearest uncollected item
fn autopilot_movement(state: &GameState) -> MoveInput {
    let pos = state.player.pos;
    let Some(target) = state
        .uncollected_items()
        .map(|it| it.pos)
        .min_by(|a, b| {
            distance(*a, pos)
                .partial_cmp(&distance(*b, pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    else {
        return MoveInput::default();
    };

    let delta = target - pos;
    MoveInput {
        left: delta.x < -AUTOPILOT_DEADZONE,
        right: delta.x > AUTOPILOT_DEADZONE,
        up: delta.y < -AUTOPILOT_DEADZONE,
        down: delta.y > AUTOPILOT_DEADZONE,
    }
}

/// Scatter `count` items over the playfield, away from the edges
pub fn generate_items<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Item> {
    let max_x = PLAYFIELD_WIDTH as i32 - ITEM_MARGIN;
    let max_y = PLAYFIELD_HEIGHT as i32 - ITEM_MARGIN;
    (0..count)
        .map(|_| {
            let x = rng.random_range(ITEM_MARGIN..=max_x);
            let y = rng.random_range(ITEM_MARGIN..=max_y);
            Item::new(Vec2::new(x as f32, y as f32), rng)
        })
        .collect()
}

/// Spawn `count` enemies, each with its own territory centered away from
/// the player
pub fn spawn_enemies<R: Rng + ?Sized>(rng: &mut R, count: usize, player_pos: Vec2) -> Vec<Enemy> {
    let max_x = PLAYFIELD_WIDTH as i32 - ENEMY_SPAWN_MARGIN;
    let max_y = PLAYFIELD_HEIGHT as i32 - ENEMY_SPAWN_MARGIN;
    (0..count)
        .map(|_| {
            let center = loop {
                let c = Vec2::new(
                    rng.random_range(ENEMY_SPAWN_MARGIN..=max_x) as f32,
                    rng.random_range(ENEMY_SPAWN_MARGIN..=max_y) as f32,
                );
                if distance(c, player_pos) > ENEMY_SPAWN_CLEARANCE {
                    break c;
                }
            };
            let radius = rng.random_range(ENEMY_MIN_PATROL..=ENEMY_MAX_PATROL) as f32;
            let mut enemy = Enemy::new(center, radius, rng);
            // Start somewhere inside the territory rather than dead center
            let half = radius / 2.0;
            enemy.pos = center
                + Vec2::new(
                    rng.random_range(-half..=half),
                    rng.random_range(-half..=half),
                );
            enemy
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playfield_center;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FRAME: f32 = 0.016;

    fn start() -> TickInput {
        TickInput {
            start: true,
            ..Default::default()
        }
    }

    fn playing_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        tick(&mut state, &start(), 0.0);
        assert_eq!(state.mode, Mode::Playing);
        state.drain_events();
        state
    }

    fn item_at(pos: Vec2) -> Item {
        Item {
            pos,
            collected: false,
            pulse_timer: 0.0,
        }
    }

    #[test]
    fn test_start_from_menu() {
        let mut state = GameState::new(1);
        tick(&mut state, &start(), FRAME);
        assert_eq!(state.mode, Mode::Playing);
        assert_eq!(state.enemies.len(), ENEMY_COUNT);
        assert_eq!(state.items.len(), INITIAL_ITEM_COUNT);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::SoundRequested(Sound::MenuClick)));
        assert!(events.contains(&GameEvent::MusicStarted(Track::Background)));
        assert!(events.contains(&GameEvent::ModeChanged {
            from: Mode::Menu,
            to: Mode::Playing
        }));
    }

    #[test]
    fn test_session_frozen_outside_playing() {
        let mut state = GameState::new(1);
        let enemies_before: Vec<Vec2> = state.enemies.iter().map(|e| e.pos).collect();
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), FRAME);
        }
        assert_eq!(state.level_time, 0.0);
        let enemies_after: Vec<Vec2> = state.enemies.iter().map(|e| e.pos).collect();
        assert_eq!(enemies_before, enemies_after);
    }

    #[test]
    fn test_level_time_accumulates() {
        let mut state = playing_state(3);
        state.player.invulnerable_until = f64::MAX;
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), 0.1);
        }
        assert!((state.level_time - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_clock_keeps_advancing_in_long_sessions() {
        let mut state = playing_state(3);
        state.enemies.clear();
        state.level_time = 1.0e7;
        state.player.invulnerable_until = state.level_time + 0.5;
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!((state.level_time - 1.0e7 - 1.0).abs() < 1e-3);
        assert!(!state.player.is_invulnerable(state.now()));
    }

    #[test]
    fn test_negative_and_nan_dt_are_ignored() {
        let mut state = playing_state(3);
        state.player.invulnerable_until = f64::MAX;
        tick(&mut state, &TickInput::default(), -1.0);
        tick(&mut state, &TickInput::default(), f32::NAN);
        assert_eq!(state.level_time, 0.0);
    }

    #[test]
    fn test_pickup_at_spawn() {
        let mut state = playing_state(5);
        state.enemies.clear();
        state.items = vec![
            item_at(playfield_center()),
            item_at(Vec2::new(60.0, 60.0)),
        ];
        let score = state.score();

        tick(&mut state, &TickInput::default(), FRAME);

        assert!(state.items[0].collected);
        assert!(!state.items[1].collected);
        assert_eq!(state.score(), score + ITEM_REWARD);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::SoundRequested(Sound::Pickup)));
        assert!(events.contains(&GameEvent::ItemCollected {
            pos: playfield_center()
        }));
    }

    #[test]
    fn test_last_pickup_triggers_wave() {
        let mut state = playing_state(5);
        state.enemies.clear();
        state.items = vec![item_at(playfield_center())];
        let score = state.score();

        tick(&mut state, &TickInput::default(), FRAME);

        assert_eq!(state.score(), score + ITEM_REWARD + WAVE_BONUS);
        assert_eq!(state.items.len(), REFRESH_ITEM_COUNT);
        assert_eq!(state.enemies.len(), WAVE_EXTRA_ENEMIES);
        assert_eq!(state.waves_cleared, 1);
    }

    #[test]
    fn test_wave_refresh_appends_enemies() {
        let mut state = playing_state(8);
        state.player.invulnerable_until = f64::MAX;
        for item in &mut state.items {
            item.collected = true;
        }
        let n = state.enemies.len();
        let first_enemy = state.enemies[0].territory_center;
        let score = state.score();

        tick(&mut state, &TickInput::default(), FRAME);

        assert_eq!(state.enemies.len(), n + WAVE_EXTRA_ENEMIES);
        assert_eq!(state.enemies[0].territory_center, first_enemy);
        assert_eq!(state.items.len(), REFRESH_ITEM_COUNT);
        assert!(state.items.iter().all(|it| !it.collected));
        assert_eq!(state.score(), score + WAVE_BONUS);
        assert!(state
            .drain_events()
            .contains(&GameEvent::WaveCleared { waves: 1 }));
    }

    #[test]
    fn test_lethal_contact_ends_game() {
        let mut state = playing_state(9);
        state.player.health = 1;
        state.player.invulnerable_until = 0.0;
        let mut rng = Pcg32::seed_from_u64(1);
        let mut enemy = Enemy::new(playfield_center(), 100.0, &mut rng);
        enemy.pos = playfield_center();
        state.enemies = vec![enemy];

        tick(&mut state, &TickInput::default(), FRAME);

        assert_eq!(state.mode, Mode::GameOver);
        assert_eq!(state.player.health, 0);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::SoundRequested(Sound::Hit)));
        assert!(events.contains(&GameEvent::PlayerHit { health: 0 }));
        assert!(events.contains(&GameEvent::MusicStopped));
        assert!(events.contains(&GameEvent::ModeChanged {
            from: Mode::Playing,
            to: Mode::GameOver
        }));

        // Frozen afterwards
        let t = state.level_time;
        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.level_time, t);
    }

    #[test]
    fn test_contact_respects_invulnerability() {
        let mut state = playing_state(9);
        state.player.health = PLAYER_MAX_HEALTH;
        state.player.invulnerable_until = 0.0;
        let mut rng = Pcg32::seed_from_u64(1);
        let mut enemy = Enemy::new(playfield_center(), 100.0, &mut rng);
        enemy.pos = playfield_center();
        state.enemies = vec![enemy.clone(), enemy];

        tick(&mut state, &TickInput::default(), FRAME);
        // Two overlapping enemies, one hit
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH - 1);

        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), FRAME);
        }
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH - 1);
        assert_eq!(state.mode, Mode::Playing);
    }

    #[test]
    fn test_back_to_menu_and_restart_resets() {
        let mut state = playing_state(11);
        state.player.invulnerable_until = f64::MAX;
        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), FRAME);
        }
        state.player.score = 120;

        let back = TickInput {
            back: true,
            ..Default::default()
        };
        tick(&mut state, &back, FRAME);
        assert_eq!(state.mode, Mode::Menu);
        assert_eq!(state.score(), 120);
        assert!(state.drain_events().contains(&GameEvent::MusicStopped));

        tick(&mut state, &start(), 0.0);
        assert_eq!(state.mode, Mode::Playing);
        assert_eq!(state.score(), 0);
        assert_eq!(state.level_time, 0.0);
        assert_eq!(state.player.pos, playfield_center());
    }

    #[test]
    fn test_start_from_gameover_routes_through_menu() {
        let mut state = playing_state(12);
        state.set_mode(Mode::GameOver);
        state.drain_events();

        tick(&mut state, &start(), 0.0);
        assert_eq!(state.mode, Mode::Playing);
        assert_eq!(state.level_time, 0.0);
        assert_eq!(state.enemies.len(), ENEMY_COUNT);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::ModeChanged {
            from: Mode::GameOver,
            to: Mode::Menu
        }));
        assert!(events.contains(&GameEvent::ModeChanged {
            from: Mode::Menu,
            to: Mode::Playing
        }));
    }

    #[test]
    fn test_exit_is_permanent() {
        let mut state = GameState::new(13);
        let exit = TickInput {
            exit: true,
            ..Default::default()
        };
        tick(&mut state, &exit, FRAME);
        assert_eq!(state.mode, Mode::Quit);

        let everything = TickInput {
            start: true,
            back: true,
            toggle_music: true,
            ..Default::default()
        };
        tick(&mut state, &everything, FRAME);
        assert_eq!(state.mode, Mode::Quit);
        assert!(!state.music_enabled);
        assert_eq!(state.level_time, 0.0);

        tick(&mut state, &everything, FRAME);
        assert_eq!(state.mode, Mode::Quit);
        assert!(state.music_enabled);
    }

    #[test]
    fn test_exit_ignored_while_playing() {
        let mut state = playing_state(14);
        let exit = TickInput {
            exit: true,
            ..Default::default()
        };
        tick(&mut state, &exit, 0.0);
        assert_eq!(state.mode, Mode::Playing);
    }

    #[test]
    fn test_toggle_music() {
        let mut state = GameState::new(15);
        let toggle = TickInput {
            toggle_music: true,
            ..Default::default()
        };
        tick(&mut state, &toggle, FRAME);
        assert!(!state.music_enabled);
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::MusicStopped,
                GameEvent::SoundRequested(Sound::MenuClick)
            ]
        );

        tick(&mut state, &toggle, FRAME);
        assert!(state.music_enabled);
        assert!(state
            .drain_events()
            .contains(&GameEvent::MusicStarted(Track::Background)));
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed| {
            let mut state = playing_state(seed);
            let input = TickInput {
                autopilot: true,
                ..Default::default()
            };
            for _ in 0..600 {
                tick(&mut state, &input, FRAME);
            }
            (
                state.player.pos,
                state.score(),
                state.enemies.iter().map(|e| e.pos).collect::<Vec<_>>(),
            )
        };
        assert_eq!(run(77), run(77));
    }

    #[test]
    fn test_autopilot_collects_items() {
        let mut state = playing_state(21);
        state.enemies.clear();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..(60 * 20) {
            tick(&mut state, &input, FRAME);
        }
        assert!(state.score() >= ITEM_REWARD * 3);
    }

    #[test]
    fn test_spawned_enemies_keep_clearance() {
        let mut rng = Pcg32::seed_from_u64(33);
        let player = playfield_center();
        let enemies = spawn_enemies(&mut rng, 200, player);
        for e in &enemies {
            assert!(distance(e.territory_center, player) > ENEMY_SPAWN_CLEARANCE);
            assert!(e.territory_radius >= ENEMY_MIN_PATROL as f32);
            assert!(e.territory_radius <= ENEMY_MAX_PATROL as f32);
            let offset = (e.pos - e.territory_center).abs();
            assert!(offset.x <= e.territory_radius / 2.0 + 1e-3);
            assert!(offset.y <= e.territory_radius / 2.0 + 1e-3);
        }
    }

    #[test]
    fn test_generated_items_within_margin() {
        let mut rng = Pcg32::seed_from_u64(34);
        let items = generate_items(&mut rng, 500);
        assert_eq!(items.len(), 500);
        for it in &items {
            assert!(it.pos.x >= 40.0 && it.pos.x <= 860.0);
            assert!(it.pos.y >= 40.0 && it.pos.y <= 560.0);
            assert!(!it.collected);
        }
    }
}
