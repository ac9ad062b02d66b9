//! Game balance parameters
//!
//! Every number that shapes how the game plays lives here instead of being
//! scattered through the simulation. The defaults are the shipped balance.

use serde::{Deserialize, Serialize};

/// Balance table consumed by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub player_health: f32,
    pub player_stamina: u32,
    pub player_attack: f32,
    /// Movement speed with no mob nearby (pixels/second)
    pub player_max_speed: f32,
    /// Movement speed floor when a mob is on top of the player (pixels/second)
    pub player_min_speed: f32,
    /// Distance at which mobs stop slowing the player down
    pub slowdown_radius: f32,
    /// Damage bonus of the starting sword
    pub sword_bonus: f32,
    /// Fraction of max health dealt by a sword strike on the boss
    pub sword_boss_fraction: f32,
    /// Multiplier on sword strikes after leveling up
    pub sword_level_multiplier: f32,

    // === Danger timer (microseconds of continuous mob overlap) ===
    pub danger_yellow_us: u64,
    pub danger_orange_us: u64,
    pub danger_red_us: u64,
    pub danger_lethal_us: u64,

    // === Mobs ===
    pub mob_initial_count: u32,
    pub mob_health_min: u32,
    pub mob_health_max: u32,
    pub mob_stamina: u32,
    pub mob_attack_min: u32,
    pub mob_attack_max: u32,
    /// Chase speed (pixels/second)
    pub mob_speed: f32,
    /// Time between mob spawns (microseconds)
    pub spawn_interval_us: u64,
    /// Preferred minimum distance between a fresh mob and the player
    pub spawn_clearance: f32,
    /// Kill awards are uniform in `kill_points_min..=kill_points_max`
    pub kill_points_min: u32,
    pub kill_points_max: u32,

    // === Boss ===
    pub boss_health: f32,
    pub boss_stamina: u32,
    pub boss_attack: f32,

    // === Projectile ===
    pub ball_speed: f32,
    pub ball_damage: f32,

    // === Progression ===
    pub level_up_points: u32,
    pub level_up_attack_multiplier: f32,
    pub follower_count: u32,
    /// Follower catch-up rate (fraction of the gap closed per second)
    pub follower_catch_up: f32,

    // === World ===
    pub obstacle_count: u32,
    pub obstacle_size: f32,
    pub actor_size: f32,
    pub ball_size: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_health: 100.0,
            player_stamina: 50,
            player_attack: 10.0,
            player_max_speed: 300.0,
            player_min_speed: 60.0,
            slowdown_radius: 300.0,
            sword_bonus: 5.0,
            sword_boss_fraction: 0.22,
            sword_level_multiplier: 1.15,

            danger_yellow_us: 500_000,
            danger_orange_us: 1_000_000,
            danger_red_us: 2_000_000,
            danger_lethal_us: 3_000_000,

            mob_initial_count: 5,
            mob_health_min: 20,
            mob_health_max: 50,
            mob_stamina: 10,
            mob_attack_min: 5,
            mob_attack_max: 10,
            mob_speed: 66.7,
            spawn_interval_us: 7_000_000,
            spawn_clearance: 150.0,
            kill_points_min: 0,
            kill_points_max: 10,

            boss_health: 200.0,
            boss_stamina: 50,
            boss_attack: 20.0,

            ball_speed: 600.0,
            ball_damage: 10.0,

            level_up_points: 50,
            level_up_attack_multiplier: 2.0,
            follower_count: 2,
            follower_catch_up: 6.0,

            obstacle_count: 5,
            obstacle_size: 50.0,
            actor_size: 40.0,
            ball_size: 10.0,
        }
    }
}

impl Tuning {
    /// Player speed for a given distance to the nearest mob.
    ///
    /// Linear falloff from max speed at `slowdown_radius` down to the floor
    /// at contact; never above max or below min.
    pub fn speed_for_distance(&self, distance: Option<f32>) -> f32 {
        let Some(distance) = distance else {
            return self.player_max_speed;
        };
        let span = self.player_max_speed - self.player_min_speed;
        let falloff = 1.0 - distance / self.slowdown_radius;
        (self.player_max_speed - span * falloff).clamp(self.player_min_speed, self.player_max_speed)
    }
}
