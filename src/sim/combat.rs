//! Combat and scoring rules
//!
//! Melee, sword strikes, projectile hits, kill rewards and the one-time
//! level-up buff. Everything here mutates `GameState` in place and records a
//! `GameEvent` for anything the host might want to report.

use rand::Rng;

use super::state::{EntityKind, GameEvent, GamePhase, GameState, Stats, Tint};

/// Basic attack: spend one stamina, deal attack power plus weapon bonus.
///
/// Returns the damage dealt, or `None` if the attacker is out of stamina.
pub fn melee(attacker: &mut Stats, target: &mut Stats) -> Option<f32> {
    if !attacker.spend_stamina() {
        return None;
    }
    let damage = attacker.melee_damage();
    target.health -= damage;
    Some(damage)
}

/// Damage of a sword strike on the boss: a share of the player's max health,
/// boosted after leveling up
pub fn sword_damage(state: &GameState) -> f32 {
    let t = &state.tuning;
    let mut damage = state.player.stats.max_health * t.sword_boss_fraction;
    if state.player.leveled_up {
        damage *= t.sword_level_multiplier;
    }
    damage
}

/// Context-sensitive action key: sword the boss if touching it, otherwise
/// hit a touching mob, otherwise fire a ball
pub fn perform_action(state: &mut GameState) {
    let player_body = state.player.body;

    if let Some(idx) = state
        .entities
        .iter()
        .position(|e| e.is_boss() && e.body.overlaps(&player_body))
    {
        sword_strike(state, idx);
        return;
    }

    if let Some(idx) = state
        .entities
        .iter()
        .position(|e| e.is_mob() && e.body.overlaps(&player_body))
    {
        melee_mob(state, idx);
        return;
    }

    fire_ball(state);
}

/// Sword strike on the boss at `idx`. Wears down health only; the boss
/// falls to the second ball hit.
pub fn sword_strike(state: &mut GameState, idx: usize) {
    let damage = sword_damage(state);
    if !state.player.stats.spend_stamina() {
        state.events.push(GameEvent::OutOfStamina);
        return;
    }
    let Some(stats) = state.entities[idx].stats.as_mut() else {
        return;
    };
    stats.health -= damage;
    log::debug!("Sword hits boss for {:.1}, {:.1} left", damage, stats.health);
}

/// Melee the mob at `idx`, killing it if its health runs out
pub fn melee_mob(state: &mut GameState, idx: usize) {
    let id = state.entities[idx].id;
    let GameState {
        player, entities, ..
    } = &mut *state;
    let Some(target) = entities[idx].stats.as_mut() else {
        return;
    };
    let Some(damage) = melee(&mut player.stats, target) else {
        state.events.push(GameEvent::OutOfStamina);
        return;
    };
    let weapon = player.stats.weapon.as_ref().map_or("Fists", |w| w.name.as_str());
    log::debug!("{} hits mob {} for {:.1}", weapon, id, damage);
    if target.is_dead() {
        defeat_mob(state, idx);
    }
}

/// Fire a ball from the player's center in the facing direction
pub fn fire_ball(state: &mut GameState) {
    let pos = state.player.body.pos;
    let direction = state.player.facing;
    state.spawn_ball(pos, direction);
}

/// Apply projectile damage to the mob at `idx`
pub fn ball_hits_mob(state: &mut GameState, idx: usize) {
    let damage = state.tuning.ball_damage;
    let Some(stats) = state.entities[idx].stats.as_mut() else {
        return;
    };
    stats.health -= damage;
    if stats.is_dead() {
        defeat_mob(state, idx);
    }
}

/// Projectile hit on the boss at `idx`: the first hit wounds, the second kills
pub fn ball_hits_boss(state: &mut GameState, idx: usize) {
    let entity = &mut state.entities[idx];
    match entity.kind {
        EntityKind::Boss { wounded: false } => {
            entity.kind = EntityKind::Boss { wounded: true };
            entity.tint = Tint::Yellow;
            state.events.push(GameEvent::BossWounded);
            log::info!("Boss wounded");
        }
        EntityKind::Boss { wounded: true } => defeat_boss(state, idx),
        _ => {}
    }
}

/// Remove the mob at `idx` and award a random number of points
pub fn defeat_mob(state: &mut GameState, idx: usize) {
    let entity = &mut state.entities[idx];
    if !entity.is_mob() {
        return;
    }
    entity.alive = false;
    let id = entity.id;

    let t = &state.tuning;
    let points = state
        .rng
        .random_range(t.kill_points_min..=t.kill_points_max.max(t.kill_points_min));
    state.mobs_defeated += 1;
    state.events.push(GameEvent::MobDefeated { id, points });
    log::debug!("Mob {} defeated (+{} points)", id, points);
    award_points(state, points);
}

/// Remove the boss at `idx`; that ends the run in victory
pub fn defeat_boss(state: &mut GameState, idx: usize) {
    let entity = &mut state.entities[idx];
    if !entity.is_boss() {
        return;
    }
    entity.alive = false;
    state.events.push(GameEvent::BossDefeated);
    if !state.phase.is_terminal() {
        state.phase = GamePhase::Won;
        state.events.push(GameEvent::Won);
        log::info!("Boss defeated with {} points", state.player.points);
    }
}

/// Add points, leveling up the first time the threshold is crossed
pub fn award_points(state: &mut GameState, points: u32) {
    state.player.points += points;
    if !state.player.leveled_up && state.player.points >= state.tuning.level_up_points {
        level_up(state);
    }
}

/// One-time permanent buff: doubled attack and companions
fn level_up(state: &mut GameState) {
    let player = &mut state.player;
    player.leveled_up = true;
    player.stats.attack_power *= state.tuning.level_up_attack_multiplier;
    player.tint = player.base_tint();

    for slot in 0..state.tuning.follower_count {
        state.spawn_follower(slot);
    }
    state.events.push(GameEvent::LevelUp);
    log::info!("Level up at {} points", state.player.points);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Weapon;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn blank() -> GameState {
        GameState::blank(1234, Tuning::default())
    }

    fn index_of(state: &GameState, id: u32) -> usize {
        state.entities.iter().position(|e| e.id == id).unwrap()
    }

    #[test]
    fn test_melee_spends_stamina_and_applies_weapon() {
        let mut attacker = Stats::new(100.0, 2, 10.0).with_weapon(Weapon::sword(5.0));
        let mut target = Stats::new(40.0, 0, 0.0);

        assert_eq!(melee(&mut attacker, &mut target), Some(15.0));
        assert_eq!(target.health, 25.0);
        assert_eq!(attacker.stamina, 1);

        melee(&mut attacker, &mut target);
        assert_eq!(melee(&mut attacker, &mut target), None);
        assert_eq!(target.health, 10.0);
        assert_eq!(attacker.stamina, 0);
    }

    #[test]
    fn test_sword_damage_scales_with_level() {
        let mut state = blank();
        let base = sword_damage(&state);
        assert!((base - 22.0).abs() < 1e-4);

        state.player.leveled_up = true;
        assert!((sword_damage(&state) - 22.0 * 1.15).abs() < 1e-4);
    }

    #[test]
    fn test_killing_mob_awards_bounded_points() {
        for seed in 0..64 {
            let mut state = GameState::blank(seed, Tuning::default());
            let id = state.spawn_mob(Vec2::new(200.0, 200.0));
            let idx = index_of(&state, id);
            state.entities[idx].stats.as_mut().unwrap().health = 5.0;

            ball_hits_mob(&mut state, idx);

            assert!(!state.entities[idx].alive);
            assert_eq!(state.living_mob_count(), 0);
            assert!(state.player.points <= 10);
            assert_eq!(state.mobs_defeated, 1);
            assert!(matches!(
                state.events.last(),
                Some(GameEvent::MobDefeated { points, .. }) if *points == state.player.points
            ));
        }
    }

    #[test]
    fn test_ball_damage_without_kill() {
        let mut state = blank();
        let id = state.spawn_mob(Vec2::new(200.0, 200.0));
        let idx = index_of(&state, id);
        state.entities[idx].stats.as_mut().unwrap().health = 30.0;

        ball_hits_mob(&mut state, idx);

        assert!(state.entities[idx].alive);
        assert_eq!(state.entities[idx].stats.as_ref().unwrap().health, 20.0);
        assert_eq!(state.player.points, 0);
    }

    #[test]
    fn test_boss_needs_two_hits() {
        let mut state = blank();
        state.phase = GamePhase::BossSpawned;
        let id = state.spawn_boss(Vec2::new(300.0, 300.0));
        let idx = index_of(&state, id);

        ball_hits_boss(&mut state, idx);
        assert!(state.entities[idx].alive);
        assert_eq!(state.entities[idx].kind, EntityKind::Boss { wounded: true });
        assert_eq!(state.entities[idx].tint, Tint::Yellow);
        assert_eq!(state.phase, GamePhase::BossSpawned);

        ball_hits_boss(&mut state, idx);
        assert!(!state.entities[idx].alive);
        assert_eq!(state.phase, GamePhase::Won);
        assert!(state.events.contains(&GameEvent::Won));
    }

    #[test]
    fn test_level_up_exactly_once() {
        let mut state = blank();
        state.player.stats.health = 30.0;
        state.player.stats.stamina = 3;
        for _ in 0..5 {
            award_points(&mut state, 10);
        }
        assert_eq!(state.player.points, 50);
        assert!(state.player.leveled_up);
        assert_eq!(state.player.stats.attack_power, 20.0);
        assert_eq!(state.player.followers.len(), 2);
        assert_eq!(state.player.tint, Tint::Turquoise);
        // Health and stamina carry over untouched
        assert_eq!(state.player.stats.health, 30.0);
        assert_eq!(state.player.stats.stamina, 3);

        award_points(&mut state, 10);
        let level_ups = state
            .events
            .iter()
            .filter(|e| **e == GameEvent::LevelUp)
            .count();
        assert_eq!(level_ups, 1);
        assert_eq!(state.player.stats.attack_power, 20.0);
        assert_eq!(state.player.followers.len(), 2);
    }

    #[test]
    fn test_action_prefers_boss_then_mob_then_ball() {
        let mut state = blank();
        let player_pos = state.player.body.pos;

        perform_action(&mut state);
        assert!(matches!(state.events.last(), Some(GameEvent::BallFired { .. })));

        let mob = state.spawn_mob(player_pos);
        let mob_idx = index_of(&state, mob);
        let mob_health = state.entities[mob_idx].stats.as_ref().unwrap().health;
        perform_action(&mut state);
        let after = state.entities[mob_idx].stats.as_ref().unwrap().health;
        assert_eq!(after, mob_health - 15.0);

        let boss = state.spawn_boss(player_pos);
        let boss_idx = index_of(&state, boss);
        perform_action(&mut state);
        let boss_health = state.entities[boss_idx].stats.as_ref().unwrap().health;
        assert!((boss_health - (200.0 - 22.0)).abs() < 1e-3);
        // The mob was left alone
        assert_eq!(state.entities[mob_idx].stats.as_ref().unwrap().health, after);
    }

    #[test]
    fn test_out_of_stamina_does_nothing() {
        let mut state = blank();
        state.player.stats.stamina = 0;
        let id = state.spawn_mob(state.player.body.pos);
        let idx = index_of(&state, id);
        let health = state.entities[idx].stats.as_ref().unwrap().health;

        perform_action(&mut state);

        assert_eq!(state.entities[idx].stats.as_ref().unwrap().health, health);
        assert_eq!(state.events.last(), Some(&GameEvent::OutOfStamina));
    }

    #[test]
    fn test_sword_never_removes_boss() {
        let mut state = blank();
        state.phase = GamePhase::BossSpawned;
        state.player.stats.stamina = 100;
        let id = state.spawn_boss(state.player.body.pos);
        let idx = index_of(&state, id);

        for _ in 0..20 {
            perform_action(&mut state);
        }

        let boss = &state.entities[idx];
        assert!(boss.alive);
        assert!(boss.stats.as_ref().unwrap().health <= 0.0);
        assert_eq!(boss.kind, EntityKind::Boss { wounded: false });
        assert_eq!(state.phase, GamePhase::BossSpawned);
        assert!(!state.events.contains(&GameEvent::BossDefeated));
    }

    #[test]
    fn test_five_ten_point_kills_level_up_once() {
        let mut state = blank();
        state.tuning.kill_points_min = 10;
        state.tuning.kill_points_max = 10;

        for i in 0..5 {
            let id = state.spawn_mob(Vec2::new(200.0 + 60.0 * i as f32, 200.0));
            let idx = index_of(&state, id);
            state.entities[idx].stats.as_mut().unwrap().health = 5.0;
            ball_hits_mob(&mut state, idx);
        }

        assert_eq!(state.mobs_defeated, 5);
        assert_eq!(state.player.points, 50);
        assert!(state.player.leveled_up);
        let level_ups = state
            .events
            .iter()
            .filter(|e| **e == GameEvent::LevelUp)
            .count();
        assert_eq!(level_ups, 1);
    }
}
