//! Per-frame simulation tick
//!
//! Core game loop step: spawn timer, key actions, entity updates, collisions
//! and win/lose checks, in that order.

use super::collision::viewport_bounds;
use super::combat;
use super::state::{Direction, EntityKind, GameEvent, GamePhase, GameState, QUEST_TEXT, Tint};
use crate::us_to_secs;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Held movement keys
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Interact key went down this frame (talk to the NPC)
    pub interact: bool,
    /// Action key went down this frame (melee / sword / ranged)
    pub action: bool,
}

/// Advance the game state by `dt_us` microseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_us: u64) {
    if state.phase.is_terminal() {
        return;
    }

    state.elapsed_us += dt_us;
    let dt = us_to_secs(dt_us);

    advance_spawn_timer(state, dt_us);

    if input.interact {
        interact(state);
    }
    if input.action {
        combat::perform_action(state);
    }

    update_player(state, input, dt);
    update_followers(state, dt);
    update_mobs(state, dt);
    update_balls(state, dt);

    resolve_ball_hits(state);
    cull_offscreen_balls(state);
    update_danger(state, dt_us);

    check_boss_spawn(state);
    state.sweep_dead();
}

/// Add one mob per elapsed spawn interval
fn advance_spawn_timer(state: &mut GameState, dt_us: u64) {
    let interval = state.tuning.spawn_interval_us;
    if interval == 0 {
        return;
    }
    state.spawn_timer_us += dt_us;
    while state.spawn_timer_us >= interval {
        state.spawn_timer_us -= interval;
        let id = state.spawn_mob_random();
        log::debug!("Spawn timer fired: mob {}", id);
    }
}

/// Interact key: take the quest from the NPC, then accept it
fn interact(state: &mut GameState) {
    match state.phase {
        GamePhase::Exploring => {
            let near_npc = state
                .npc()
                .is_some_and(|npc| npc.body.overlaps(&state.player.body));
            if near_npc {
                state.story = Some(QUEST_TEXT);
                state.phase = GamePhase::QuestOffered;
                state.events.push(GameEvent::QuestOffered);
                log::info!("Quest offered");
            }
        }
        GamePhase::QuestOffered => {
            state.story = None;
            for npc in state
                .entities
                .iter_mut()
                .filter(|e| e.kind == EntityKind::Npc)
            {
                npc.alive = false;
            }
            state.phase = GamePhase::QuestAccepted;
            state.events.push(GameEvent::QuestAccepted);
            log::info!("Quest accepted, {} mobs left", state.living_mob_count());
        }
        _ => {}
    }
}

/// Movement, viewport clamp, obstacle push-back and speed update
fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let step = state.player.speed * dt;
    let player = &mut state.player;

    let moves = [
        (input.left, Direction::Left),
        (input.right, Direction::Right),
        (input.up, Direction::Up),
        (input.down, Direction::Down),
    ];
    for (held, direction) in moves {
        if held {
            player.body.pos += direction.unit() * step;
            player.facing = direction;
        }
    }

    let bounds = viewport_bounds();
    player.body.pos = bounds.clamp_center(player.body.pos, player.body.half_extents);

    for obstacle in state.entities.iter().filter(|e| e.is_obstacle()) {
        let push = player.body.aabb().push_out(&obstacle.body.aabb(), player.facing);
        player.body.pos += push;
    }
    // Obstacles near the edge can push the player out again
    player.body.pos = bounds.clamp_center(player.body.pos, player.body.half_extents);

    let nearest = state.nearest_mob_distance();
    state.player.speed = state.tuning.speed_for_distance(nearest);
}

/// Followers glide toward a slot behind the player
fn update_followers(state: &mut GameState, dt: f32) {
    let player_pos = state.player.body.pos;
    let behind = -state.player.facing.unit();
    let spacing = state.tuning.actor_size + 5.0;
    let catch_up = (state.tuning.follower_catch_up * dt).min(1.0);
    let bounds = viewport_bounds();

    for entity in state.entities.iter_mut().filter(|e| e.alive) {
        if let EntityKind::Follower { slot } = entity.kind {
            let offset = behind * spacing * (slot + 1) as f32;
            let target = bounds.clamp_center(player_pos + offset, entity.body.half_extents);
            entity.body.pos += (target - entity.body.pos) * catch_up;
        }
    }
}

/// Mobs walk straight at the player; the boss holds its ground
fn update_mobs(state: &mut GameState, dt: f32) {
    let player_pos = state.player.body.pos;
    let step = state.tuning.mob_speed * dt;

    for entity in state.entities.iter_mut().filter(|e| e.is_mob()) {
        let to_player = player_pos - entity.body.pos;
        entity.body.pos += to_player.normalize_or_zero() * step.min(to_player.length());
    }
}

/// Balls fly straight in the direction they were fired
fn update_balls(state: &mut GameState, dt: f32) {
    let step = state.tuning.ball_speed * dt;

    for entity in state.entities.iter_mut().filter(|e| e.alive) {
        if let EntityKind::Ball { direction } = entity.kind {
            entity.body.pos += direction.unit() * step;
        }
    }
}

/// Balls no longer fully inside the viewport vanish. Runs after hit
/// resolution so a ball crossing the edge still lands its hit.
fn cull_offscreen_balls(state: &mut GameState) {
    let bounds = viewport_bounds();
    for entity in state.entities.iter_mut().filter(|e| e.alive) {
        if matches!(entity.kind, EntityKind::Ball { .. }) && !bounds.contains(&entity.body.aabb()) {
            entity.alive = false;
        }
    }
}

/// Ball vs mob and ball vs boss; each ball is spent on its first hit
fn resolve_ball_hits(state: &mut GameState) {
    for ball_idx in 0..state.entities.len() {
        let ball = &state.entities[ball_idx];
        if !ball.alive || !matches!(ball.kind, EntityKind::Ball { .. }) {
            continue;
        }
        let ball_body = ball.body;

        let target = state
            .entities
            .iter()
            .position(|e| e.is_mob() && e.body.overlaps(&ball_body))
            .or_else(|| {
                state
                    .entities
                    .iter()
                    .position(|e| e.is_boss() && e.body.overlaps(&ball_body))
            });
        let Some(target_idx) = target else {
            continue;
        };

        state.entities[ball_idx].alive = false;
        if state.entities[target_idx].is_mob() {
            combat::ball_hits_mob(state, target_idx);
        } else {
            combat::ball_hits_boss(state, target_idx);
        }
    }
}

/// Continuous mob overlap escalates the warning tint and finally kills
fn update_danger(state: &mut GameState, dt_us: u64) {
    if state.phase.is_terminal() {
        return;
    }
    let player_body = state.player.body;
    let in_danger = state.mobs().any(|m| m.body.overlaps(&player_body));
    let t = &state.tuning;
    let player = &mut state.player;

    if !in_danger {
        player.danger_us = 0;
        player.tint = player.base_tint();
        return;
    }

    player.danger_us += dt_us;
    if player.danger_us >= t.danger_lethal_us {
        state.phase = GamePhase::Lost;
        state.events.push(GameEvent::Lost);
        log::info!("Caught by a mob after {} ms", player.danger_us / 1000);
    } else if player.danger_us >= t.danger_red_us {
        player.tint = Tint::Red;
    } else if player.danger_us >= t.danger_orange_us {
        player.tint = Tint::Orange;
    } else if player.danger_us >= t.danger_yellow_us {
        player.tint = Tint::Yellow;
    }
}

/// With the quest accepted and every mob dead, the boss shows up
fn check_boss_spawn(state: &mut GameState) {
    if state.phase != GamePhase::QuestAccepted {
        return;
    }
    if state.living_mob_count() > 0 || state.boss().is_some() {
        return;
    }
    let id = state.spawn_boss_random();
    state.phase = GamePhase::BossSpawned;
    log::info!("Boss {} spawned", id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT_US;
    use crate::sim::state::NPC_POSITION;
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    fn blank() -> GameState {
        GameState::blank(12345, Tuning::default())
    }

    fn near_player(state: &GameState, offset: Vec2) -> Vec2 {
        state.player.body.pos + offset
    }

    fn run(state: &mut GameState, input: &TickInput, ticks: u32) {
        for _ in 0..ticks {
            tick(state, input, SIM_DT_US);
        }
    }

    fn press(interact: bool, action: bool) -> TickInput {
        TickInput {
            interact,
            action,
            ..Default::default()
        }
    }

    #[test]
    fn test_tick_moves_player() {
        let mut state = blank();
        let start = state.player.body.pos;
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        run(&mut state, &input, 60);

        let moved = state.player.body.pos - start;
        assert!(moved.x > 250.0 && moved.x < 350.0, "moved {moved}");
        assert_eq!(moved.y, 0.0);
        assert_eq!(state.player.facing, Direction::Right);
    }

    #[test]
    fn test_last_key_sets_facing() {
        let mut state = blank();
        let input = TickInput {
            left: true,
            down: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT_US);
        assert_eq!(state.player.facing, Direction::Down);
    }

    #[test]
    fn test_player_clamped_to_viewport() {
        let mut state = blank();
        let input = TickInput {
            left: true,
            up: true,
            ..Default::default()
        };
        run(&mut state, &input, 600);

        let aabb = state.player.body.aabb();
        assert_eq!(aabb.min, Vec2::ZERO);
    }

    #[test]
    fn test_obstacle_blocks_movement() {
        let mut state = blank();
        let pos = state.player.body.pos;
        // Wall just to the right of the player
        state.spawn_obstacle(Vec2::new(pos.x + 30.0, pos.y - 25.0));
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        run(&mut state, &input, 30);

        assert!((state.player.body.aabb().max.x - (pos.x + 30.0)).abs() < 1e-3);
    }

    #[test]
    fn test_mob_chases_player() {
        let mut state = blank();
        let id = state.spawn_mob(near_player(&state, Vec2::new(300.0, 0.0)));
        let before = state.entity(id).unwrap().body.pos.distance(state.player.body.pos);
        run(&mut state, &TickInput::default(), 30);
        let after = state.entity(id).unwrap().body.pos.distance(state.player.body.pos);

        let expected = state.tuning.mob_speed * us_to_secs(SIM_DT_US) * 30.0;
        assert!((before - after - expected).abs() < 0.5);
    }

    #[test]
    fn test_nearby_mob_slows_player() {
        let mut state = blank();
        state.spawn_mob(near_player(&state, Vec2::new(150.0, 0.0)));
        tick(&mut state, &TickInput::default(), SIM_DT_US);
        assert!(state.player.speed < state.tuning.player_max_speed);
        assert!(state.player.speed >= state.tuning.player_min_speed);
    }

    #[test]
    fn test_spawn_timer_adds_one_mob_per_interval() {
        let mut state = blank();
        let ticks_per_interval = state.tuning.spawn_interval_us.div_ceil(SIM_DT_US) as u32;

        run(&mut state, &TickInput::default(), ticks_per_interval - 1);
        assert_eq!(state.living_mob_count(), 0);

        run(&mut state, &TickInput::default(), 1);
        assert_eq!(state.living_mob_count(), 1);
    }

    #[test]
    fn test_danger_escalates_to_loss() {
        let mut state = blank();
        state.tuning.mob_speed = 0.0;
        state.spawn_mob(state.player.body.pos);

        // 0.6 s in: yellow
        run(&mut state, &TickInput::default(), 36);
        assert_eq!(state.player.tint, Tint::Yellow);

        // 1.2 s: orange
        run(&mut state, &TickInput::default(), 36);
        assert_eq!(state.player.tint, Tint::Orange);

        // 2.4 s: red
        run(&mut state, &TickInput::default(), 72);
        assert_eq!(state.player.tint, Tint::Red);
        assert_eq!(state.phase, GamePhase::Exploring);

        // Past 3 s: lost
        run(&mut state, &TickInput::default(), 36);
        assert_eq!(state.phase, GamePhase::Lost);
        assert!(state.events.contains(&GameEvent::Lost));
    }

    #[test]
    fn test_stationary_in_mob_for_three_seconds_loses() {
        let mut state = blank();
        state.spawn_mob(state.player.body.pos);

        let mut ticks = 0;
        while state.phase != GamePhase::Lost && ticks < 1000 {
            tick(&mut state, &TickInput::default(), SIM_DT_US);
            ticks += 1;
        }
        assert_eq!(state.phase, GamePhase::Lost);
        assert!(state.elapsed_us >= state.tuning.danger_lethal_us);
        assert!(state.elapsed_us < state.tuning.danger_lethal_us + SIM_DT_US);
    }

    #[test]
    fn test_danger_resets_when_escaping() {
        let mut state = blank();
        state.tuning.mob_speed = 0.0;
        state.spawn_mob(state.player.body.pos);
        run(&mut state, &TickInput::default(), 40);
        assert!(state.player.danger_us > 0);

        let escape = TickInput {
            right: true,
            ..Default::default()
        };
        let mut ticks = 0;
        while state.mobs().any(|m| m.body.overlaps(&state.player.body)) && ticks < 200 {
            tick(&mut state, &escape, SIM_DT_US);
            ticks += 1;
        }
        assert_eq!(state.phase, GamePhase::Exploring);
        assert_eq!(state.player.danger_us, 0);
        assert_eq!(state.player.tint, Tint::Green);
    }

    #[test]
    fn test_terminal_state_is_frozen() {
        let mut state = blank();
        state.phase = GamePhase::Won;
        let before = state.player.body.pos;
        let input = TickInput {
            right: true,
            action: true,
            ..Default::default()
        };
        run(&mut state, &input, 10);
        assert_eq!(state.player.body.pos, before);
        assert_eq!(state.elapsed_us, 0);
    }

    #[test]
    fn test_ball_flies_and_leaves_viewport() {
        let mut state = blank();
        tick(&mut state, &press(false, true), SIM_DT_US);
        let ball = state
            .entities
            .iter()
            .find(|e| matches!(e.kind, EntityKind::Ball { .. }))
            .map(|e| e.id)
            .unwrap();

        // Half the viewport width at 600 px/s is a bit over a second
        run(&mut state, &TickInput::default(), 90);
        assert!(state.entity(ball).is_none());
    }

    #[test]
    fn test_ball_kills_weak_mob() {
        let mut state = blank();
        state.tuning.mob_speed = 0.0;
        let id = state.spawn_mob(near_player(&state, Vec2::new(200.0, 0.0)));
        let idx = state.entities.iter().position(|e| e.id == id).unwrap();
        state.entities[idx].stats.as_mut().unwrap().health = 10.0;

        tick(&mut state, &press(false, true), SIM_DT_US);
        run(&mut state, &TickInput::default(), 30);

        assert!(state.entity(id).is_none());
        assert_eq!(state.mobs_defeated, 1);
        assert!(state.player.points <= 10);
        assert!(!state.entities.iter().any(|e| matches!(e.kind, EntityKind::Ball { .. })));
    }

    #[test]
    fn test_ball_hits_mob_at_screen_edge() {
        let mut state = blank();
        state.tuning.mob_speed = 0.0;
        state.tuning.spawn_interval_us = 0;
        let size = state.tuning.actor_size;
        let width = crate::consts::VIEWPORT_WIDTH;
        let y = state.player.body.pos.y;
        // Mob flush against the right edge; this step carries the ball past it
        let id = state.spawn_mob(Vec2::new(width - size * 0.5, y));
        let idx = state.entities.iter().position(|e| e.id == id).unwrap();
        state.entities[idx].stats.as_mut().unwrap().health = 5.0;
        state.spawn_ball(Vec2::new(width - 12.0, y), Direction::Right);

        tick(&mut state, &TickInput::default(), SIM_DT_US);

        assert!(state.entity(id).is_none());
        assert_eq!(state.mobs_defeated, 1);
        assert!(!state.entities.iter().any(|e| matches!(e.kind, EntityKind::Ball { .. })));
    }

    #[test]
    fn test_quest_flow_spawns_boss_and_two_hits_win() {
        let mut state = blank();
        state.spawn_npc(NPC_POSITION);
        state.player.body.pos = NPC_POSITION + Vec2::new(10.0, 0.0);

        tick(&mut state, &press(true, false), SIM_DT_US);
        assert_eq!(state.phase, GamePhase::QuestOffered);
        assert_eq!(state.story, Some(QUEST_TEXT));

        tick(&mut state, &press(true, false), SIM_DT_US);
        assert!(state.story.is_none());
        assert!(state.npc().is_none());
        // No mobs alive, so the boss shows up on the same tick
        assert_eq!(state.phase, GamePhase::BossSpawned);
        assert!(state.boss().is_some());

        // Park the boss in the line of fire and shoot it twice
        state.tuning.mob_speed = 0.0;
        let boss_idx = state.entities.iter().position(|e| e.is_boss()).unwrap();
        state.entities[boss_idx].body.pos = near_player(&state, Vec2::new(150.0, 0.0));
        state.player.facing = Direction::Right;

        tick(&mut state, &press(false, true), SIM_DT_US);
        run(&mut state, &TickInput::default(), 30);
        assert!(state.events.contains(&GameEvent::BossWounded));
        assert_eq!(state.phase, GamePhase::BossSpawned);

        tick(&mut state, &press(false, true), SIM_DT_US);
        run(&mut state, &TickInput::default(), 30);
        assert_eq!(state.phase, GamePhase::Won);
        assert!(state.boss().is_none());
    }

    #[test]
    fn test_interact_away_from_npc_does_nothing() {
        let mut state = blank();
        state.spawn_npc(NPC_POSITION);
        tick(&mut state, &press(true, false), SIM_DT_US);
        assert_eq!(state.phase, GamePhase::Exploring);
        assert!(state.story.is_none());
    }

    #[test]
    fn test_boss_waits_for_mobs() {
        let mut state = blank();
        state.phase = GamePhase::QuestAccepted;
        state.tuning.mob_speed = 0.0;
        state.spawn_mob(near_player(&state, Vec2::new(400.0, 200.0)));

        tick(&mut state, &TickInput::default(), SIM_DT_US);
        assert_eq!(state.phase, GamePhase::QuestAccepted);
        assert!(state.boss().is_none());
    }

    #[test]
    fn test_followers_trail_after_level_up() {
        let mut state = blank();
        combat::award_points(&mut state, 50);
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        run(&mut state, &input, 120);

        let player_x = state.player.body.pos.x;
        for id in &state.player.followers {
            let follower = state.entity(*id).unwrap();
            assert!(follower.body.pos.x < player_x);
            assert!(follower.body.pos.distance(state.player.body.pos) < 200.0);
        }
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        let inputs = [
            TickInput {
                right: true,
                ..Default::default()
            },
            press(false, true),
            TickInput {
                up: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..100 {
            for input in &inputs {
                tick(&mut state1, input, SIM_DT_US);
                tick(&mut state2, input, SIM_DT_US);
            }
        }

        assert_eq!(state1.phase, state2.phase);
        assert_eq!(state1.player.points, state2.player.points);
        assert_eq!(state1.entities.len(), state2.entities.len());
        assert_eq!(state1.player.body.pos, state2.player.body.pos);
    }

    fn input_strategy() -> impl Strategy<Value = TickInput> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(left, right, up, down, action)| TickInput {
                left,
                right,
                up,
                down,
                interact: false,
                action,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_player_stays_in_viewport(
            seed in any::<u64>(),
            inputs in prop::collection::vec(input_strategy(), 1..200),
        ) {
            let mut state = GameState::new(seed);
            let bounds = viewport_bounds();
            for input in &inputs {
                tick(&mut state, input, SIM_DT_US * 4);
                prop_assert!(bounds.contains(&state.player.body.aabb()));
            }
        }

        #[test]
        fn prop_danger_zero_when_clear(
            seed in any::<u64>(),
            inputs in prop::collection::vec(input_strategy(), 1..200),
        ) {
            let mut state = GameState::new(seed);
            for input in &inputs {
                tick(&mut state, input, SIM_DT_US);
                if state.phase.is_terminal() {
                    break;
                }
                let touching = state.mobs().any(|m| m.body.overlaps(&state.player.body));
                if !touching {
                    prop_assert_eq!(state.player.danger_us, 0);
                }
            }
        }
    }
}
