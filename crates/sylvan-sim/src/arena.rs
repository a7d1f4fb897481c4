//! The arena: owns every combatant and serves as their combat world.
//!
//! Each actor is ticked by taking it out of the arena, handing the arena to
//! it as the [`CombatWorld`], and putting it back. The actor being ticked is
//! therefore invisible to its own queries, which is what every strategy
//! expects.

use ahash::AHashMap;
use crossbeam_channel::Sender;
use glam::Vec2;
use serde::Serialize;
use sylvan_combat::{
    ActorSnapshot, Boss, BossArena, CombatEvent, CombatWorld, DamagePacket, Damageable,
    Enemy, EventBus, HealthChange, HealthHooks, Player, Projectile, ProjectileStatus,
    SpatialQuery,
};
use sylvan_common::{ActorId, LayerMask};
use tracing::{debug, trace, warn};

use crate::pilot::Pilot;

/// Publishes to the bus from a hook; drops the event when the bus is full.
fn publisher(sender: Sender<CombatEvent>) -> impl Fn(CombatEvent) {
    move |event| {
        if sender.try_send(event).is_err() {
            trace!("combat event bus full, event dropped");
        }
    }
}

fn wire_health_hooks(hooks: &mut HealthHooks, actor: ActorId, sender: &Sender<CombatEvent>) {
    let publish = publisher(sender.clone());
    hooks.damaged.subscribe(move |packet: &DamagePacket| {
        publish(CombatEvent::ActorDamaged {
            actor,
            source: packet.source,
            amount: packet.amount,
        });
    });
    let publish = publisher(sender.clone());
    hooks
        .death
        .subscribe(move |_| publish(CombatEvent::ActorDied { actor }));
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArenaStats {
    /// Projectiles that entered the arena
    pub projectiles_fired: u64,
    /// Projectiles that hit something
    pub projectiles_hit: u64,
    /// Player melee swings that connected
    pub player_swings_landed: u64,
    /// Abilities the player used
    pub abilities_used: u64,
    /// Enemies removed after dying
    pub enemies_removed: u64,
}

/// Arena state and the combat world the actors see.
pub struct Arena {
    player: Option<Player>,
    pilot: Pilot,
    enemies: AHashMap<ActorId, Enemy>,
    boss: Option<Boss>,
    boss_arena: Option<BossArena>,
    boss_defeated: bool,
    projectiles: Vec<Projectile>,
    bus: EventBus,
    stats: ArenaStats,
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("enemies", &self.enemies.len())
            .field("boss", &self.boss.as_ref().map(Boss::phase))
            .field("projectiles", &self.projectiles.len())
            .field("pending_events", &self.bus.pending_count())
            .finish_non_exhaustive()
    }
}

impl Arena {
    /// Creates an arena around a player.
    #[must_use]
    pub fn new(mut player: Player, pilot: Pilot, event_capacity: usize) -> Self {
        let bus = EventBus::new(event_capacity);
        let id = player.id();
        wire_health_hooks(player.hooks_mut(), id, &bus.sender());
        Self {
            player: Some(player),
            pilot,
            enemies: AHashMap::new(),
            boss: None,
            boss_arena: None,
            boss_defeated: false,
            projectiles: Vec::new(),
            bus,
            stats: ArenaStats::default(),
        }
    }

    /// Adds an enemy targeting the player.
    pub fn add_enemy(&mut self, enemy: Enemy) -> ActorId {
        let mut enemy = enemy;
        let id = enemy.id();
        enemy.set_target(self.player_id());
        wire_health_hooks(enemy.hooks_mut(), id, &self.bus.sender());
        self.enemies.insert(id, enemy);
        id
    }

    /// Installs the boss and its arena trigger.
    pub fn set_boss(&mut self, boss: Boss) -> ActorId {
        let mut boss = boss;
        let id = boss.id();
        boss.set_target(self.player_id());
        let sender = self.bus.sender();
        wire_health_hooks(boss.hooks_mut(), id, &sender);

        let hooks = boss.encounter_hooks_mut();
        let publish = publisher(sender.clone());
        hooks
            .phase_changed
            .subscribe(move |phase| publish(CombatEvent::BossPhaseChanged { boss: id, phase: *phase }));
        let publish = publisher(sender.clone());
        hooks
            .enrage
            .subscribe(move |_| publish(CombatEvent::BossEnraged { boss: id }));
        let publish = publisher(sender);
        hooks.loot_drop.subscribe(move |position| {
            publish(CombatEvent::LootDropped {
                boss: id,
                position: *position,
            });
        });

        self.boss_arena = Some(BossArena::from_config(boss.config()));
        self.boss = Some(boss);
        self.boss_defeated = false;
        id
    }

    fn player_id(&self) -> Option<ActorId> {
        self.player.as_ref().map(Player::id)
    }

    /// The player, if present.
    #[must_use]
    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    /// The boss, until it is removed.
    #[must_use]
    pub fn boss(&self) -> Option<&Boss> {
        self.boss.as_ref()
    }

    /// Returns whether a boss has been defeated and removed.
    #[must_use]
    pub fn boss_defeated(&self) -> bool {
        self.boss_defeated
    }

    /// Enemies still in the arena.
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    /// Run counters.
    #[must_use]
    pub fn stats(&self) -> &ArenaStats {
        &self.stats
    }

    /// Collects every event published since the last drain.
    pub fn drain_events(&self) -> Vec<CombatEvent> {
        self.bus.drain()
    }

    /// Returns whether every hostile is gone.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.enemies.is_empty() && self.boss.is_none()
    }

    fn sorted_enemy_ids(&self) -> Vec<ActorId> {
        let mut ids: Vec<ActorId> = self.enemies.keys().copied().collect();
        ids.sort_by_key(|id| id.raw());
        ids
    }

    fn hostile_snapshots(&self) -> Vec<ActorSnapshot> {
        self.enemies
            .values()
            .map(|e| e.actor().snapshot())
            .chain(self.boss.iter().map(|b| b.actor().snapshot()))
            .collect()
    }

    /// Logic tick: player, enemies, boss, then projectiles.
    pub fn tick(&mut self, dt: f32) {
        self.tick_player(dt);

        for id in self.sorted_enemy_ids() {
            let Some(mut enemy) = self.enemies.remove(&id) else {
                continue;
            };
            enemy.tick(self, dt);
            if enemy.is_removed() {
                debug!(enemy = %id, "enemy removed");
                self.bus.publish(CombatEvent::ActorRemoved { actor: id });
                self.stats.enemies_removed += 1;
            } else {
                self.enemies.insert(id, enemy);
            }
        }

        self.tick_boss(dt);
        self.tick_projectiles(dt);
    }

    fn tick_player(&mut self, dt: f32) {
        let Some(mut player) = self.player.take() else {
            return;
        };

        let hostiles = self.hostile_snapshots();
        let command = self.pilot.decide(&player, &hostiles, dt);
        player.move_input(command.movement);
        player.aim(command.aim);
        if command.attack {
            if let Ok(hits) = player.attack(self) {
                if !hits.is_empty() {
                    self.stats.player_swings_landed += 1;
                }
            }
        }
        if let Some(slot) = command.ability {
            match player.use_ability(slot, self) {
                Ok(kind) => {
                    debug!(slot, ?kind, "player ability");
                    self.stats.abilities_used += 1;
                }
                Err(err) => trace!(slot, %err, "player ability refused"),
            }
        }
        player.tick(self, dt);

        self.player = Some(player);
    }

    fn tick_boss(&mut self, dt: f32) {
        let Some(mut boss) = self.boss.take() else {
            return;
        };

        let player_position = self
            .player
            .as_ref()
            .filter(|p| p.actor().is_alive())
            .map(|p| p.actor().position());
        if let Some(arena) = self.boss_arena.as_mut() {
            if let Some(state) = arena.update(&mut boss, player_position, dt) {
                debug!(?state, "boss arena");
            }
        }

        boss.tick(self, dt);

        if boss.is_removed() {
            let id = boss.id();
            debug!(boss = %id, "boss removed");
            self.bus.publish(CombatEvent::ActorRemoved { actor: id });
            self.boss_defeated = true;
        } else {
            self.boss = Some(boss);
        }
    }

    fn tick_projectiles(&mut self, dt: f32) {
        let mut flying = std::mem::take(&mut self.projectiles);
        flying.retain_mut(|projectile| match projectile.update(self, dt) {
            ProjectileStatus::Flying => true,
            ProjectileStatus::Hit(target) => {
                trace!(owner = %projectile.owner, %target, "projectile hit");
                self.stats.projectiles_hit += 1;
                false
            }
            ProjectileStatus::Expired => {
                self.bus.publish(CombatEvent::ProjectileExpired {
                    owner: projectile.owner,
                });
                false
            }
        });
        // Anything spawned during the updates joins the flight next tick
        flying.append(&mut self.projectiles);
        self.projectiles = flying;
    }

    /// Physics tick: integrate every body, then keep the player in a locked
    /// boss arena.
    pub fn fixed_tick(&mut self, dt: f32) {
        if let Some(player) = self.player.as_mut() {
            player.fixed_tick(dt);
            if let Some(arena) = &self.boss_arena {
                let confined = arena.confine_player(player.actor().position());
                player.actor_mut().set_position(confined);
            }
        }
        for enemy in self.enemies.values_mut() {
            enemy.fixed_tick(dt);
        }
        if let Some(boss) = self.boss.as_mut() {
            boss.fixed_tick(dt);
        }
    }
}

impl SpatialQuery for Arena {
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> Vec<ActorId> {
        let mut found = Vec::new();
        if let Some(player) = &self.player {
            if player.actor().overlaps_circle(center, radius, mask) {
                found.push(player.id());
            }
        }
        for id in self.sorted_enemy_ids() {
            let hit = self
                .enemies
                .get(&id)
                .is_some_and(|e| e.actor().overlaps_circle(center, radius, mask));
            if hit {
                found.push(id);
            }
        }
        if let Some(boss) = &self.boss {
            if boss.actor().overlaps_circle(center, radius, mask) {
                found.push(boss.id());
            }
        }
        found
    }
}

impl CombatWorld for Arena {
    fn snapshot(&self, id: ActorId) -> Option<ActorSnapshot> {
        if let Some(player) = self.player.as_ref().filter(|p| p.id() == id) {
            return Some(player.actor().snapshot());
        }
        if let Some(enemy) = self.enemies.get(&id) {
            return Some(enemy.actor().snapshot());
        }
        self.boss
            .as_ref()
            .filter(|b| b.id() == id)
            .map(|b| b.actor().snapshot())
    }

    fn damage(&mut self, target: ActorId, packet: &DamagePacket) -> Option<HealthChange> {
        if let Some(player) = self.player.as_mut().filter(|p| p.id() == target) {
            return player.take_damage(packet);
        }
        if let Some(enemy) = self.enemies.get_mut(&target) {
            return enemy.take_damage(packet);
        }
        if let Some(boss) = self.boss.as_mut().filter(|b| b.id() == target) {
            return boss.take_damage(packet);
        }
        warn!(%target, "damage for unknown actor");
        None
    }

    fn spawn_projectile(&mut self, projectile: Projectile) {
        self.bus.publish(CombatEvent::ProjectileSpawned {
            owner: projectile.owner,
        });
        self.stats.projectiles_fired += 1;
        self.projectiles.push(projectile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pilot::PilotConfig;
    use sylvan_combat::{
        ArchetypeConfig, BossConfig, BossPhase, EnemyConfig, PlayerConfig, RangedConfig,
    };

    const DT: f32 = 1.0 / 30.0;

    fn arena_with_player(at: Vec2) -> Arena {
        let player = Player::new(PlayerConfig::default(), at).expect("player");
        Arena::new(player, Pilot::new(PilotConfig::default()), 1024)
    }

    fn run(arena: &mut Arena, seconds: f32) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        let frames = (seconds / DT) as usize;
        for _ in 0..frames {
            arena.tick(DT);
            arena.fixed_tick(DT);
            events.extend(arena.drain_events());
        }
        events
    }

    #[test]
    fn test_damage_routes_to_owner_and_publishes() {
        let mut arena = arena_with_player(Vec2::ZERO);
        let enemy = Enemy::new(EnemyConfig::default(), Vec2::new(30.0, 0.0)).expect("enemy");
        let id = arena.add_enemy(enemy);

        let packet = DamagePacket::new(200.0, ActorId::NULL, Vec2::ZERO);
        let change = arena.damage(id, &packet).expect("applied");
        assert!(change.died);

        let events = arena.drain_events();
        assert!(events.contains(&CombatEvent::ActorDamaged {
            actor: id,
            source: ActorId::NULL,
            amount: 200.0,
        }));
        assert!(events.contains(&CombatEvent::ActorDied { actor: id }));
        assert!(arena.damage(ActorId::new(), &packet).is_none());
    }

    #[test]
    fn test_overlap_respects_mask() {
        let mut arena = arena_with_player(Vec2::ZERO);
        let enemy = Enemy::new(EnemyConfig::default(), Vec2::new(1.0, 0.0)).expect("enemy");
        let id = arena.add_enemy(enemy);

        assert_eq!(arena.overlap_circle(Vec2::ZERO, 2.0, LayerMask::ENEMY), vec![id]);
        assert_eq!(arena.overlap_circle(Vec2::ZERO, 2.0, LayerMask::ALL).len(), 2);
    }

    #[test]
    fn test_dead_enemy_is_removed_after_delay() {
        let mut arena = arena_with_player(Vec2::new(-50.0, 0.0));
        let enemy = Enemy::new(EnemyConfig::default(), Vec2::new(50.0, 0.0)).expect("enemy");
        let id = arena.add_enemy(enemy);

        arena.damage(id, &DamagePacket::new(500.0, ActorId::NULL, Vec2::ZERO));
        let events = run(&mut arena, 2.5);

        assert_eq!(arena.enemy_count(), 0);
        assert!(events.contains(&CombatEvent::ActorRemoved { actor: id }));
        assert_eq!(arena.stats().enemies_removed, 1);
    }

    #[test]
    fn test_ranged_enemy_projectiles_fly_and_resolve() {
        let mut arena = arena_with_player(Vec2::ZERO);
        let config = EnemyConfig::default()
            .with_archetype(ArchetypeConfig::Ranged(RangedConfig::default()))
            .with_attack_range(5.0)
            .with_seed(7);
        let enemy = Enemy::new(config, Vec2::new(4.0, 0.0)).expect("enemy");
        arena.add_enemy(enemy);

        let events = run(&mut arena, 3.0);
        assert!(arena.stats().projectiles_fired > 0);
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::ProjectileSpawned { .. })));
    }

    #[test]
    fn test_boss_encounter_starts_when_player_enters() {
        let mut arena = arena_with_player(Vec2::new(-30.0, 0.0));
        let boss = Boss::new(BossConfig::default(), Vec2::ZERO).expect("boss");
        let id = arena.set_boss(boss);

        let events = run(&mut arena, 5.0);
        assert!(events.contains(&CombatEvent::BossPhaseChanged {
            boss: id,
            phase: BossPhase::Intro,
        }));
        assert!(arena.boss().is_some_and(|b| b.phase().is_active()));
    }
}
