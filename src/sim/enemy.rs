//! Patrolling enemies
//!
//! Each enemy owns a territory disk. It wanders between random points inside
//! it, pausing at each, until the player comes within perception range; then
//! it chases for a fixed window that every new sighting extends.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;
use crate::distance;

/// What an enemy is doing during the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Standing at a reached patrol point
    Pausing,
    /// Walking toward the current patrol target
    Patrolling,
    /// Pursuing the player
    Chasing,
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    /// Territory center (fixed at spawn)
    pub territory_center: Vec2,
    pub territory_radius: f32,
    /// Units per second, fixed for the enemy's lifetime
    pub speed: f32,
    pub size: Vec2,
    /// Set while pursuing the player
    pub alert: bool,
    /// Session time at which the current chase ends
    pub chase_until: f64,
    /// Current patrol target
    pub target: Vec2,
    /// Session time until which the enemy stands still
    pub pause_until: f64,
    pub frame: u8,
    pub frame_timer: f32,
}

impl Enemy {
    /// Create an enemy standing on its territory center with randomized
    /// speed, animation phase and first patrol target
    pub fn new<R: Rng + ?Sized>(center: Vec2, territory_radius: f32, rng: &mut R) -> Self {
        let speed =
            ENEMY_SPEED * (ENEMY_SPEED_JITTER_BASE + rng.random::<f32>() * ENEMY_SPEED_JITTER_SPAN);
        let frame = rng.random_range(0..ANIMATION_FRAMES);
        let frame_timer = rng.random::<f32>() * 0.5;
        let mut enemy = Self {
            pos: center,
            territory_center: center,
            territory_radius,
            speed,
            size: Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT),
            alert: false,
            chase_until: 0.0,
            target: center,
            pause_until: 0.0,
            frame,
            frame_timer,
        };
        enemy.target = enemy.random_point_in_territory(rng);
        enemy
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.pos, self.size)
    }

    /// Pick a patrol point: uniform angle, uniform radius in
    /// `[PATROL_MIN_RADIUS, territory_radius]`. Not area-uniform; points
    /// cluster toward the center.
    pub fn random_point_in_territory<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let max_r = self.territory_radius.max(PATROL_MIN_RADIUS);
        let r = rng.random_range(PATROL_MIN_RADIUS..=max_r);
        self.territory_center + Vec2::new(angle.cos(), angle.sin()) * r
    }

    /// Whether the chase window is open at `now`
    #[inline]
    pub fn is_chasing(&self, now: f64) -> bool {
        self.alert && now < self.chase_until
    }

    /// Current behavior as seen at session time `now`
    pub fn behavior(&self, now: f64) -> Behavior {
        if self.is_chasing(now) {
            Behavior::Chasing
        } else if now < self.pause_until {
            Behavior::Pausing
        } else {
            Behavior::Patrolling
        }
    }

    /// Advance AI, movement, animation and territory containment by `dt`
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, player_pos: Vec2, now: f64, rng: &mut R) {
        // Perception: every sighting re-arms the chase window
        if distance(self.pos, player_pos) < PERCEPTION_RADIUS {
            self.alert = true;
            self.chase_until = now + CHASE_DURATION;
        }

        if self.is_chasing(now) {
            self.chase(dt, player_pos);
        } else {
            self.alert = false;
            self.patrol(dt, now, rng);
        }

        self.frame_timer += dt;
        if self.frame_timer >= ENEMY_FRAME_TIME {
            self.frame_timer = 0.0;
            self.frame = (self.frame + 1) % ANIMATION_FRAMES;
        }

        self.contain();
    }

    fn chase(&mut self, dt: f32, player_pos: Vec2) {
        let delta = player_pos - self.pos;
        let mut length = delta.length();
        if length == 0.0 {
            length = 1.0;
        }
        self.pos += delta / length * self.speed * dt * CHASE_SPEED_BONUS;
    }

    fn patrol<R: Rng + ?Sized>(&mut self, dt: f32, now: f64, rng: &mut R) {
        if now < self.pause_until {
            return;
        }
        let delta = self.target - self.pos;
        let dist = delta.length();
        if dist < ARRIVE_DISTANCE {
            self.pause_until = now + rng.random_range(PATROL_PAUSE_MIN..PATROL_PAUSE_MAX);
            self.target = self.random_point_in_territory(rng);
        } else {
            self.pos += delta / dist * self.speed * dt;
        }
    }

    /// Soft fence: past `radius + slack`, snap back along the same bearing
    fn contain(&mut self) {
        let offset = self.pos - self.territory_center;
        if offset.length() > self.territory_radius + TERRITORY_SLACK {
            let angle = offset.y.atan2(offset.x);
            let r = self.territory_radius - TERRITORY_SNAP_INSET;
            self.pos = self.territory_center + Vec2::new(angle.cos(), angle.sin()) * r;
        }
    }
}
