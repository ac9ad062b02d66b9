//! Game state and core simulation types
//!
//! One `GameState` owns everything the frame loop touches: the player, the
//! flat list of other entities, timers, progression and the seeded RNG.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::collision::Aabb;
use crate::tuning::Tuning;
use crate::{us_to_ms, viewport_size};

/// Story line shown when the NPC hands out the quest
pub const QUEST_TEXT: &str = "Kill all mobs and a boss will appear!";

/// Where the quest giver stands
pub const NPC_POSITION: Vec2 = Vec2::new(100.0, 100.0);

/// Attempts made to find a spawn point away from the player
const SPAWN_ATTEMPTS: u32 = 16;

/// Progression through a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Roaming; the NPC has not spoken yet
    Exploring,
    /// Quest text is on screen, waiting for the player to accept
    QuestOffered,
    /// NPC gone; the boss appears once every mob is dead
    QuestAccepted,
    /// Boss is in the arena
    BossSpawned,
    /// Boss defeated
    Won,
    /// Danger timer ran out
    Lost,
}

impl GamePhase {
    /// Run is over; the simulation no longer advances
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }
}

/// Cardinal facing/travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Left,
    #[default]
    Right,
    Up,
    Down,
}

impl Direction {
    /// Unit vector in screen space (y down)
    pub fn unit(&self) -> Vec2 {
        match self {
            Direction::Left => Vec2::NEG_X,
            Direction::Right => Vec2::X,
            Direction::Up => Vec2::NEG_Y,
            Direction::Down => Vec2::Y,
        }
    }
}

/// Visual representation of an entity; the renderer owns the actual colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    Green,
    Blue,
    Red,
    Purple,
    Yellow,
    Orange,
    Turquoise,
    Black,
}

/// A weapon adds a flat damage bonus to melee attacks
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub name: String,
    pub damage: f32,
}

impl Weapon {
    pub fn sword(damage: f32) -> Self {
        Self {
            name: "Sword".to_string(),
            damage,
        }
    }
}

/// Combat stats shared by everything that can fight
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub health: f32,
    pub max_health: f32,
    pub stamina: u32,
    pub attack_power: f32,
    pub weapon: Option<Weapon>,
}

impl Stats {
    pub fn new(health: f32, stamina: u32, attack_power: f32) -> Self {
        Self {
            health,
            max_health: health,
            stamina,
            attack_power,
            weapon: None,
        }
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Base attack plus weapon bonus
    pub fn melee_damage(&self) -> f32 {
        self.attack_power + self.weapon.as_ref().map_or(0.0, |w| w.damage)
    }

    /// Consume one stamina unit; false when exhausted
    pub fn spend_stamina(&mut self) -> bool {
        if self.stamina == 0 {
            return false;
        }
        self.stamina -= 1;
        true
    }
}

/// Position and extent of anything that occupies space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Center position
    pub pos: Vec2,
    pub half_extents: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, size: f32) -> Self {
        Self {
            pos,
            half_extents: Vec2::splat(size / 2.0),
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, self.half_extents)
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        self.aabb().intersects(&other.aabb())
    }
}

/// What an entity is; per-kind behavior keys off this tag
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityKind {
    /// Quest giver
    Npc,
    /// Chasing enemy
    Mob,
    /// Two-hit end boss
    Boss { wounded: bool },
    /// Companion granted on level-up; `slot` orders the trail
    Follower { slot: u32 },
    /// Player projectile
    Ball { direction: Direction },
    /// Static movement blocker
    Obstacle,
}

/// Anything in the arena besides the player
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub body: Body,
    pub stats: Option<Stats>,
    pub tint: Tint,
    /// Cleared on removal; dead entities are skipped until swept
    pub alive: bool,
}

impl Entity {
    pub fn is_mob(&self) -> bool {
        self.alive && self.kind == EntityKind::Mob
    }

    pub fn is_boss(&self) -> bool {
        self.alive && matches!(self.kind, EntityKind::Boss { .. })
    }

    pub fn is_obstacle(&self) -> bool {
        self.alive && self.kind == EntityKind::Obstacle
    }
}

/// The player character
#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub stats: Stats,
    pub facing: Direction,
    pub points: u32,
    pub leveled_up: bool,
    /// Entity ids of companions
    pub followers: Vec<u32>,
    /// Current movement speed (pixels/second)
    pub speed: f32,
    /// Continuous time spent overlapping a mob (microseconds)
    pub danger_us: u64,
    pub tint: Tint,
}

impl Player {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        let stats = Stats::new(
            tuning.player_health,
            tuning.player_stamina,
            tuning.player_attack,
        )
        .with_weapon(Weapon::sword(tuning.sword_bonus));
        Self {
            body: Body::new(pos, tuning.actor_size),
            stats,
            facing: Direction::default(),
            points: 0,
            leveled_up: false,
            followers: Vec::new(),
            speed: tuning.player_max_speed,
            danger_us: 0,
            tint: Tint::Green,
        }
    }

    /// Tint when not in danger
    pub fn base_tint(&self) -> Tint {
        if self.leveled_up {
            Tint::Turquoise
        } else {
            Tint::Green
        }
    }
}

/// Something noteworthy that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    MobSpawned { id: u32 },
    MobDefeated { id: u32, points: u32 },
    BallFired { id: u32 },
    QuestOffered,
    QuestAccepted,
    BossSpawned { id: u32 },
    BossWounded,
    BossDefeated,
    OutOfStamina,
    LevelUp,
    Won,
    Lost,
}

/// End-of-run report
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub outcome: GamePhase,
    pub points: u32,
    pub elapsed_ms: u64,
    pub mobs_defeated: u32,
    pub leveled_up: bool,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub player: Player,
    /// Every non-player entity, in spawn order
    pub entities: Vec<Entity>,
    /// Total simulated time (microseconds)
    pub elapsed_us: u64,
    /// Time since the last mob spawn (microseconds)
    pub spawn_timer_us: u64,
    pub mobs_defeated: u32,
    /// Story line currently on screen
    pub story: Option<&'static str>,
    /// Events raised since the host last drained them
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game with the shipped balance
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Create a new game: player, NPC, starting mobs and obstacles
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self::blank(seed, tuning);

        state.spawn_npc(NPC_POSITION);
        for _ in 0..state.tuning.obstacle_count {
            state.spawn_obstacle_random();
        }
        for _ in 0..state.tuning.mob_initial_count {
            state.spawn_mob_random();
        }
        state.events.clear();

        log::info!(
            "New game (seed {}): {} mobs, {} obstacles",
            seed,
            state.living_mob_count(),
            state.entities.iter().filter(|e| e.is_obstacle()).count()
        );
        state
    }

    /// A world with only the player, centered in the viewport
    pub fn blank(seed: u64, tuning: Tuning) -> Self {
        let player = Player::new(viewport_size() / 2.0, &tuning);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            phase: GamePhase::Exploring,
            player,
            entities: Vec::new(),
            elapsed_us: 0,
            spawn_timer_us: 0,
            mobs_defeated: 0,
            story: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn push_entity(&mut self, kind: EntityKind, body: Body, stats: Option<Stats>, tint: Tint) -> u32 {
        let id = self.next_entity_id();
        self.entities.push(Entity {
            id,
            kind,
            body,
            stats,
            tint,
            alive: true,
        });
        id
    }

    pub fn spawn_npc(&mut self, pos: Vec2) -> u32 {
        let body = Body::new(pos, self.tuning.actor_size);
        self.push_entity(EntityKind::Npc, body, None, Tint::Blue)
    }

    /// Spawn a mob with rolled health and attack
    pub fn spawn_mob(&mut self, pos: Vec2) -> u32 {
        let t = &self.tuning;
        let (health_range, attack_range) = (
            t.mob_health_min..=t.mob_health_max.max(t.mob_health_min),
            t.mob_attack_min..=t.mob_attack_max.max(t.mob_attack_min),
        );
        let health = self.rng.random_range(health_range) as f32;
        let attack = self.rng.random_range(attack_range) as f32;
        let stats = Stats::new(health, self.tuning.mob_stamina, attack);
        let body = Body::new(pos, self.tuning.actor_size);
        let id = self.push_entity(EntityKind::Mob, body, Some(stats), Tint::Red);
        self.events.push(GameEvent::MobSpawned { id });
        id
    }

    pub fn spawn_mob_random(&mut self) -> u32 {
        let pos = self.random_spawn_point(self.tuning.actor_size, self.tuning.spawn_clearance);
        self.spawn_mob(pos)
    }

    pub fn spawn_boss(&mut self, pos: Vec2) -> u32 {
        let t = &self.tuning;
        let stats = Stats::new(t.boss_health, t.boss_stamina, t.boss_attack);
        let body = Body::new(pos, t.actor_size);
        let id = self.push_entity(
            EntityKind::Boss { wounded: false },
            body,
            Some(stats),
            Tint::Purple,
        );
        self.events.push(GameEvent::BossSpawned { id });
        id
    }

    pub fn spawn_boss_random(&mut self) -> u32 {
        let pos = self.random_spawn_point(self.tuning.actor_size, self.tuning.spawn_clearance);
        self.spawn_boss(pos)
    }

    /// Spawn an obstacle with its top-left corner at `top_left`
    pub fn spawn_obstacle(&mut self, top_left: Vec2) -> u32 {
        let size = self.tuning.obstacle_size;
        let body = Body::new(top_left + Vec2::splat(size / 2.0), size);
        self.push_entity(EntityKind::Obstacle, body, None, Tint::Black)
    }

    /// Place an obstacle somewhere that does not trap the player or the NPC
    pub fn spawn_obstacle_random(&mut self) -> u32 {
        let size = self.tuning.obstacle_size;
        let mut pos = self.random_spawn_point(size, self.tuning.actor_size + size);
        for _ in 0..SPAWN_ATTEMPTS {
            if pos.distance(NPC_POSITION) >= self.tuning.actor_size + size {
                break;
            }
            pos = self.random_spawn_point(size, self.tuning.actor_size + size);
        }
        self.spawn_obstacle(pos - Vec2::splat(size / 2.0))
    }

    pub fn spawn_ball(&mut self, pos: Vec2, direction: Direction) -> u32 {
        let body = Body::new(pos, self.tuning.ball_size);
        let id = self.push_entity(EntityKind::Ball { direction }, body, None, Tint::Purple);
        self.events.push(GameEvent::BallFired { id });
        id
    }

    pub fn spawn_follower(&mut self, slot: u32) -> u32 {
        let t = &self.tuning;
        let stats = Stats::new(t.player_health, t.player_stamina, t.player_attack);
        let offset = Vec2::new(slot as f32 * t.actor_size, 0.0);
        let body = Body::new(self.player.body.pos + offset, t.actor_size);
        let id = self.push_entity(
            EntityKind::Follower { slot },
            body,
            Some(stats),
            Tint::Turquoise,
        );
        self.player.followers.push(id);
        id
    }

    /// Random center for a body of `size`, fully inside the viewport and, when
    /// possible, at least `clearance` away from the player
    pub fn random_spawn_point(&mut self, size: f32, clearance: f32) -> Vec2 {
        let half = size / 2.0;
        let max = viewport_size() - Vec2::splat(half);
        let mut pos = Vec2::ZERO;
        for _ in 0..SPAWN_ATTEMPTS {
            pos = Vec2::new(
                self.rng.random_range(half..=max.x),
                self.rng.random_range(half..=max.y),
            );
            if pos.distance(self.player.body.pos) >= clearance {
                break;
            }
        }
        pos
    }

    /// Living mobs
    pub fn mobs(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.is_mob())
    }

    pub fn living_mob_count(&self) -> usize {
        self.mobs().count()
    }

    pub fn boss(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.is_boss())
    }

    pub fn npc(&self) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.alive && e.kind == EntityKind::Npc)
    }

    /// Look up a living entity by id
    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.alive && e.id == id)
    }

    /// Distance from the player to the nearest living mob
    pub fn nearest_mob_distance(&self) -> Option<f32> {
        let player_pos = self.player.body.pos;
        self.mobs()
            .map(|m| m.body.pos.distance(player_pos))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Drop entities removed during the tick
    pub fn sweep_dead(&mut self) {
        self.entities.retain(|e| e.alive);
    }

    /// Take the events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.seed,
            outcome: self.phase,
            points: self.player.points,
            elapsed_ms: us_to_ms(self.elapsed_us),
            mobs_defeated: self.mobs_defeated,
            leveled_up: self.player.leveled_up,
        }
    }
}
