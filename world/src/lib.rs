#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Invaders.
//!
//! A [`World`] holds everything one player sees during a level: the enemy
//! formation, the player ship, bullets, items and obstacles. It never draws
//! random numbers; every random decision arrives through a [`Command`] chosen
//! by a system, so replaying the same commands reproduces the same level.

mod combat;
mod entities;
mod formation;

use std::time::Duration;

use invaders_core::{
    AlertLevel, Arena, BarrierId, BlockId, BlockerId, BulletId, Command, Cooldown,
    DestructionCause, Difficulty, EnemySlot, Event, GameSettings, GameState, ItemBoxId,
    ItemEffect, ItemKind, Lateral, LevelOutcome, LevelPhase, Loadout, Position,
};

use entities::{Barrier, Block, Blocker, BonusShip, Bullet, ItemBox, PlayerShip, Web};
use formation::{Formation, ENEMY_EXTENT};

const INPUT_DELAY: Duration = Duration::from_millis(6000);
const SCREEN_CHANGE_INTERVAL: Duration = Duration::from_millis(1500);
const COMBO_TIMEOUT: Duration = Duration::from_millis(3000);
const LIFE_SCORE: u32 = 100;
const ENEMY_BULLET_SPEED: i32 = 4;
const ENEMY_BULLET_SPACING: i32 = 10;
const MAX_SHOT_COUNT: u32 = 3;

/// Represents the authoritative state of a single player's level.
#[derive(Debug)]
pub struct World {
    arena: Arena,
    phase: LevelPhase,
    outcome: Option<LevelOutcome>,
    settings: GameSettings,
    difficulty: Difficulty,
    state: GameState,
    countdown: Cooldown,
    close_timer: Cooldown,
    combo_timer: Cooldown,
    ghost: Cooldown,
    time_stop: Cooldown,
    shot_count: u32,
    alert: AlertLevel,
    formation: Formation,
    player: PlayerShip,
    bullets: Vec<Bullet>,
    barriers: Vec<Barrier>,
    item_boxes: Vec<ItemBox>,
    webs: Vec<Web>,
    blocks: Vec<Block>,
    blockers: Vec<Blocker>,
    bonus_ship: Option<BonusShip>,
    ids: IdAllocator,
}

impl World {
    /// Creates an idle world for a playfield of the provided size.
    ///
    /// The world holds no formation until it receives [`Command::StartLevel`].
    #[must_use]
    pub fn new(arena: Arena) -> Self {
        Self {
            arena,
            phase: LevelPhase::Countdown,
            outcome: None,
            settings: GameSettings::default(),
            difficulty: Difficulty::default(),
            state: GameState::default(),
            countdown: Cooldown::new(INPUT_DELAY),
            close_timer: Cooldown::new(SCREEN_CHANGE_INTERVAL),
            combo_timer: Cooldown::new(COMBO_TIMEOUT),
            ghost: Cooldown::default(),
            time_stop: Cooldown::default(),
            shot_count: 1,
            alert: AlertLevel::Calm,
            formation: Formation::empty(),
            player: PlayerShip::new(arena, Default::default(), Loadout::default()),
            bullets: Vec::new(),
            barriers: Vec::new(),
            item_boxes: Vec::new(),
            webs: Vec::new(),
            blocks: Vec::new(),
            blockers: Vec::new(),
            bonus_ship: None,
            ids: IdAllocator::default(),
        }
    }

    fn start_level(
        &mut self,
        settings: GameSettings,
        mut state: GameState,
        difficulty: Difficulty,
        loadout: Loadout,
        bonus_life: bool,
        out_events: &mut Vec<Event>,
    ) {
        if bonus_life {
            state.lives += 1;
        }
        let level = state.level;
        tracing::info!(
            level,
            lives = state.lives,
            columns = settings.formation_width,
            rows = settings.formation_height,
            "level started"
        );

        let arena = self.arena;
        *self = Self::new(arena);
        self.formation = Formation::new(&settings, level, difficulty);
        self.player = PlayerShip::new(arena, state.ship_type, loadout);
        self.settings = settings;
        self.difficulty = difficulty;
        self.state = state;
        self.countdown.reset();
        out_events.push(Event::LevelStarted { level });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });
        self.tick_timers(dt, out_events);

        match self.phase {
            LevelPhase::Countdown => {
                if self.countdown.is_finished() {
                    self.begin_play(out_events);
                }
            }
            LevelPhase::Playing => self.advance_play(dt, out_events),
            LevelPhase::Finishing | LevelPhase::Finished => {}
        }

        if self.phase != LevelPhase::Finished {
            self.resolve_collisions(out_events);
            self.advance_bullets();
        }

        self.check_level_end(out_events);
    }

    fn tick_timers(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let _ = self.countdown.tick(dt);
        let _ = self.close_timer.tick(dt);
        let _ = self.ghost.tick(dt);
        let _ = self.time_stop.tick(dt);
        self.player.tick(dt);
        for item_box in &mut self.item_boxes {
            item_box.tick(dt);
        }
        if let Some(bonus_ship) = self.bonus_ship.as_mut() {
            bonus_ship.tick(dt);
        }
        if self.combo_timer.tick(dt) {
            self.reset_combo(out_events);
        }
    }

    fn begin_play(&mut self, out_events: &mut Vec<Event>) {
        self.phase = LevelPhase::Playing;
        if self.state.level > 1 {
            self.state.lap_time = self.state.elapsed;
            self.state.lap_score = self.state.score;
            self.state.max_combo = 0;
        }
        out_events.push(Event::CountdownFinished {
            level: self.state.level,
        });
    }

    fn advance_play(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.state.elapsed = self.state.elapsed.saturating_add(dt);

        if !self.player.is_destroyed() {
            self.player.check_webs(&self.webs);
        }

        if let Some(bonus_ship) = self.bonus_ship.as_mut() {
            bonus_ship.advance();
            if bonus_ship.has_escaped(self.arena) {
                self.bonus_ship = None;
                tracing::info!("bonus ship escaped");
                out_events.push(Event::BonusShipEscaped);
            } else if bonus_ship.is_wreck_cleared() {
                self.bonus_ship = None;
            }
        }

        if self.time_stop.is_finished() {
            self.formation.update(self.arena, out_events);
        }

        let arena = self.arena;
        let mut departed = Vec::new();
        self.blockers.retain_mut(|blocker| {
            if blocker.has_departed(arena) {
                departed.push(blocker.id);
                return false;
            }
            blocker.drift();
            true
        });
        out_events.extend(
            departed
                .into_iter()
                .map(|blocker| Event::BlockerDeparted { blocker }),
        );
    }

    fn advance_bullets(&mut self) {
        let floor = self.arena.height();
        for bullet in &mut self.bullets {
            bullet.position = bullet.position.offset(0, bullet.speed);
        }
        self.bullets.retain(|bullet| {
            let y = bullet.position.y();
            (Arena::SEPARATION_LINE..=floor).contains(&y)
        });
    }

    fn check_level_end(&mut self, out_events: &mut Vec<Event>) {
        match self.phase {
            LevelPhase::Countdown | LevelPhase::Playing => {
                let outcome = if self.state.lives == 0 {
                    LevelOutcome::Defeated
                } else if self.formation.is_empty() {
                    LevelOutcome::Cleared
                } else {
                    return;
                };
                self.phase = LevelPhase::Finishing;
                self.outcome = Some(outcome);
                self.close_timer.reset();
                self.set_alert(AlertLevel::Calm, out_events);
                tracing::info!(
                    level = self.state.level,
                    score = self.state.score,
                    ?outcome,
                    "level finished"
                );
                out_events.push(Event::LevelFinished { outcome });
            }
            LevelPhase::Finishing => {
                if self.close_timer.is_finished() {
                    self.close(out_events);
                }
            }
            LevelPhase::Finished => {}
        }
    }

    fn close(&mut self, out_events: &mut Vec<Event>) {
        self.phase = LevelPhase::Finished;
        if self.state.lives > 0 {
            self.state.score = self
                .state
                .score
                .saturating_add(LIFE_SCORE * (self.state.lives - 1));
        }
        self.state.combo = 0;
        out_events.push(Event::LevelClosed {
            state: self.state.clone(),
        });
    }

    fn move_player(&mut self, direction: Lateral) {
        if self.phase != LevelPhase::Playing || self.player.is_destroyed() {
            return;
        }
        let _ = self.player.slide(direction, self.arena);
    }

    fn fire_player(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != LevelPhase::Playing {
            return;
        }
        let Some(origins) = self.player.fire(self.shot_count) else {
            return;
        };
        let speed = self.player.bullet_speed();
        let fired = origins.len() as u32;
        for position in origins {
            let id = self.ids.bullet();
            self.bullets.push(Bullet {
                id,
                position,
                speed,
            });
        }
        self.state.bullets_shot = self.state.bullets_shot.saturating_add(fired);
        out_events.push(Event::PlayerFired { bullets: fired });
    }

    fn fire_enemy_volley(
        &mut self,
        shooters: &[EnemySlot],
        bullets_per_shooter: u32,
        out_events: &mut Vec<Event>,
    ) {
        if self.phase != LevelPhase::Playing || !self.time_stop.is_finished() {
            return;
        }
        let mut fired = 0;
        for slot in shooters {
            if !self.formation.shooters().contains(slot) {
                continue;
            }
            let Some(origin) = self.formation.position_of(*slot) else {
                continue;
            };
            for index in 0..bullets_per_shooter as i32 {
                let id = self.ids.bullet();
                self.bullets.push(Bullet {
                    id,
                    position: origin.offset(
                        ENEMY_EXTENT.width() / 2 + ENEMY_BULLET_SPACING * (index + 1),
                        0,
                    ),
                    speed: ENEMY_BULLET_SPEED,
                });
                fired += 1;
            }
        }
        if fired > 0 {
            out_events.push(Event::EnemyVolleyFired { bullets: fired });
        }
    }

    fn apply_item(&mut self, effect: ItemEffect, out_events: &mut Vec<Event>) {
        if self.phase == LevelPhase::Finished {
            return;
        }
        let kind = effect.kind();
        let mut score = 0;
        let mut ships_destroyed = 0;
        match effect {
            ItemEffect::Bomb { targets } | ItemEffect::LineBomb { targets } => {
                let cause = if kind == ItemKind::Bomb {
                    DestructionCause::Bomb
                } else {
                    DestructionCause::LineBomb
                };
                for slot in targets {
                    if let Some((position, points)) = self.formation.destroy(slot) {
                        score += points;
                        ships_destroyed += 1;
                        out_events.push(Event::EnemyDestroyed {
                            slot,
                            position,
                            points,
                            cause,
                        });
                    }
                }
                self.state.score = self.state.score.saturating_add(score);
                self.state.ships_destroyed =
                    self.state.ships_destroyed.saturating_add(ships_destroyed);
            }
            ItemEffect::Barrier { positions } => {
                self.barriers.clear();
                for position in positions {
                    let id = self.ids.barrier();
                    self.barriers.push(Barrier::new(id, position));
                }
            }
            ItemEffect::Ghost { duration } => self.ghost.reset_to(duration),
            ItemEffect::TimeStop { duration } => self.time_stop.reset_to(duration),
            ItemEffect::MultiShot => {
                self.shot_count = (self.shot_count + 1).min(MAX_SHOT_COUNT);
            }
        }
        tracing::info!(?kind, score, ships_destroyed, "item applied");
        out_events.push(Event::ItemApplied {
            kind,
            score,
            ships_destroyed,
        });
    }

    fn spawn_item_box(&mut self, position: Position, out_events: &mut Vec<Event>) {
        let id = self.ids.item_box();
        self.item_boxes.push(ItemBox::new(id, position));
        tracing::debug!(x = position.x(), y = position.y(), "item box dropped");
        out_events.push(Event::ItemBoxDropped {
            item_box: id,
            position,
        });
    }

    fn spawn_blocker(
        &mut self,
        heading: Lateral,
        y: i32,
        angle: f32,
        out_events: &mut Vec<Event>,
    ) {
        let id = self.ids.blocker();
        self.blockers
            .push(Blocker::launch(id, heading, y, angle, self.arena));
        out_events.push(Event::BlockerSpawned { blocker: id });
    }

    fn spawn_bonus_ship(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != LevelPhase::Playing || self.bonus_ship.is_some() {
            return;
        }
        self.bonus_ship = Some(BonusShip::launch());
        self.set_alert(AlertLevel::Calm, out_events);
        tracing::info!("bonus ship appeared");
        out_events.push(Event::BonusShipAppeared);
    }

    fn set_alert(&mut self, level: AlertLevel, out_events: &mut Vec<Event>) {
        if self.alert != level {
            self.alert = level;
            out_events.push(Event::AlertChanged { level });
        }
    }

    fn register_hit(&mut self) {
        self.state.combo = self.state.combo.saturating_add(1);
        self.state.max_combo = self.state.max_combo.max(self.state.combo);
        self.combo_timer.reset();
    }

    fn reset_combo(&mut self, out_events: &mut Vec<Event>) {
        if self.state.combo > 0 {
            out_events.push(Event::ComboReset {
                combo: self.state.combo,
            });
            self.state.combo = 0;
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Arena::default())
    }
}

#[derive(Debug, Default)]
struct IdAllocator {
    next_bullet: u32,
    next_item_box: u32,
    next_barrier: u32,
    next_block: u32,
    next_blocker: u32,
}

impl IdAllocator {
    fn bullet(&mut self) -> BulletId {
        BulletId::new(bump(&mut self.next_bullet))
    }

    fn item_box(&mut self) -> ItemBoxId {
        ItemBoxId::new(bump(&mut self.next_item_box))
    }

    fn barrier(&mut self) -> BarrierId {
        BarrierId::new(bump(&mut self.next_barrier))
    }

    fn block(&mut self) -> BlockId {
        BlockId::new(bump(&mut self.next_block))
    }

    fn blocker(&mut self) -> BlockerId {
        BlockerId::new(bump(&mut self.next_blocker))
    }
}

fn bump(counter: &mut u32) -> u32 {
    let value = *counter;
    *counter = counter.wrapping_add(1);
    value
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartLevel {
            settings,
            state,
            difficulty,
            loadout,
            bonus_life,
        } => world.start_level(settings, state, difficulty, loadout, bonus_life, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::MovePlayer { direction } => world.move_player(direction),
        Command::FirePlayer => world.fire_player(out_events),
        Command::FireEnemyVolley {
            shooters,
            bullets_per_shooter,
        } => world.fire_enemy_volley(&shooters, bullets_per_shooter, out_events),
        Command::SpawnItemBox { position } => world.spawn_item_box(position, out_events),
        Command::ApplyItem { effect } => world.apply_item(effect, out_events),
        Command::SpawnWebs { positions } => {
            world.webs = positions
                .into_iter()
                .map(|position| Web { position })
                .collect();
        }
        Command::SpawnBlocks { positions } => {
            world.blocks = positions
                .into_iter()
                .map(|position| Block {
                    id: world.ids.block(),
                    position,
                })
                .collect();
        }
        Command::SpawnBlocker { heading, y, angle } => {
            world.spawn_blocker(heading, y, angle, out_events)
        }
        Command::SpawnBonusShip => world.spawn_bonus_ship(out_events),
        Command::SetAlert { level } => {
            if world.phase == LevelPhase::Playing && world.bonus_ship.is_none() {
                world.set_alert(level, out_events);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use invaders_core::{
        AlertLevel, Arena, BarrierId, BlockId, BlockerId, BulletId, EnemySlot, Extent,
        FormationHeading, FormationView, GameState, ItemBoxId, LevelContext, LevelOutcome,
        LevelPhase, Position,
    };

    use super::{
        entities::{
            BARRIER_EXTENT, BLOCKER_EXTENT, BLOCK_EXTENT, BONUS_SHIP_EXTENT, BULLET_EXTENT,
            ITEM_BOX_EXTENT, PLAYER_EXTENT, WEB_EXTENT,
        },
        World,
    };

    /// Playfield dimensions.
    #[must_use]
    pub fn arena(world: &World) -> Arena {
        world.arena
    }

    /// Current lifecycle phase of the level.
    #[must_use]
    pub fn phase(world: &World) -> LevelPhase {
        world.phase
    }

    /// How the level ended, once it has.
    #[must_use]
    pub fn outcome(world: &World) -> Option<LevelOutcome> {
        world.outcome
    }

    /// Snapshot of the player's progress.
    ///
    /// The end-of-level life bonus is only included after the level closed.
    #[must_use]
    pub fn game_state(world: &World) -> GameState {
        world.state.clone()
    }

    /// Level-wide facts consulted by pure systems.
    #[must_use]
    pub fn level_context(world: &World) -> LevelContext {
        LevelContext {
            level: world.state.level,
            difficulty: world.difficulty,
            phase: world.phase,
            settings: world.settings,
            arena: world.arena,
            shot_count: world.shot_count,
            time_stopped: !world.time_stop.is_finished(),
            bonus_ship_present: world.bonus_ship.is_some(),
            blocker_count: world.blockers.len(),
        }
    }

    /// Read-only view of the enemy formation.
    #[must_use]
    pub fn formation_view(world: &World) -> FormationView {
        world.formation.view()
    }

    /// Heading the formation will keep unless it reaches a boundary.
    #[must_use]
    pub fn formation_heading(world: &World) -> FormationHeading {
        world.formation.heading()
    }

    /// Formation ships currently allowed to fire.
    #[must_use]
    pub fn shooters(world: &World) -> &[EnemySlot] {
        world.formation.shooters()
    }

    /// Bullets released per player shot.
    #[must_use]
    pub fn shot_count(world: &World) -> u32 {
        world.shot_count
    }

    /// Current bonus ship warning.
    #[must_use]
    pub fn alert(world: &World) -> AlertLevel {
        world.alert
    }

    /// Time left before the countdown ends.
    #[must_use]
    pub fn countdown_remaining(world: &World) -> Duration {
        world.countdown.remaining()
    }

    /// Snapshot of the player ship.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            extent: PLAYER_EXTENT,
            destroyed: world.player.is_destroyed(),
            in_web: world.player.in_web,
            ghost: !world.ghost.is_finished(),
            reload_remaining: world.player.reload_remaining(),
        }
    }

    /// Snapshots of every bullet in flight, ordered by identifier.
    #[must_use]
    pub fn bullets(world: &World) -> Vec<BulletSnapshot> {
        world
            .bullets
            .iter()
            .map(|bullet| BulletSnapshot {
                id: bullet.id,
                position: bullet.position,
                extent: BULLET_EXTENT,
                hostile: bullet.is_hostile(),
            })
            .collect()
    }

    /// Snapshots of the barriers standing.
    #[must_use]
    pub fn barriers(world: &World) -> Vec<BarrierSnapshot> {
        world
            .barriers
            .iter()
            .map(|barrier| BarrierSnapshot {
                id: barrier.id,
                position: barrier.position,
                extent: BARRIER_EXTENT,
                health: barrier.health,
            })
            .collect()
    }

    /// Snapshots of the item boxes waiting to be shot.
    #[must_use]
    pub fn item_boxes(world: &World) -> Vec<ItemBoxSnapshot> {
        world
            .item_boxes
            .iter()
            .map(|item_box| ItemBoxSnapshot {
                id: item_box.id,
                position: item_box.position,
                extent: ITEM_BOX_EXTENT,
                collectable: item_box.is_collectable(),
            })
            .collect()
    }

    /// Hitboxes of the spider webs on the ground.
    #[must_use]
    pub fn webs(world: &World) -> Vec<(Position, Extent)> {
        world
            .webs
            .iter()
            .map(|web| (web.position, WEB_EXTENT))
            .collect()
    }

    /// Identifiers and hitboxes of the blocks still standing.
    #[must_use]
    pub fn blocks(world: &World) -> Vec<(BlockId, Position, Extent)> {
        world
            .blocks
            .iter()
            .map(|block| (block.id, block.position, BLOCK_EXTENT))
            .collect()
    }

    /// Snapshots of the blockers drifting across the playfield.
    #[must_use]
    pub fn blockers(world: &World) -> Vec<BlockerSnapshot> {
        world
            .blockers
            .iter()
            .map(|blocker| BlockerSnapshot {
                id: blocker.id,
                x: blocker.x,
                y: blocker.y,
                extent: BLOCKER_EXTENT,
                angle: blocker.angle,
            })
            .collect()
    }

    /// Snapshot of the bonus ship, if one is on screen.
    #[must_use]
    pub fn bonus_ship(world: &World) -> Option<BonusShipSnapshot> {
        world.bonus_ship.as_ref().map(|ship| BonusShipSnapshot {
            position: ship.position,
            extent: BONUS_SHIP_EXTENT,
            destroyed: ship.destroyed,
        })
    }

    /// Immutable representation of the player ship.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PlayerSnapshot {
        /// Upper-left corner of the ship.
        pub position: Position,
        /// Size of the ship.
        pub extent: Extent,
        /// Whether the ship is recovering from a hit.
        pub destroyed: bool,
        /// Whether a web slows the ship.
        pub in_web: bool,
        /// Whether the ghost item protects the ship.
        pub ghost: bool,
        /// Time before the trigger recovers.
        pub reload_remaining: Duration,
    }

    /// Immutable representation of a bullet in flight.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BulletSnapshot {
        /// Identifier assigned to the bullet.
        pub id: BulletId,
        /// Upper-left corner of the bullet.
        pub position: Position,
        /// Size of the bullet.
        pub extent: Extent,
        /// Whether the bullet was fired by an enemy.
        pub hostile: bool,
    }

    /// Immutable representation of a barrier.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BarrierSnapshot {
        /// Identifier assigned to the barrier.
        pub id: BarrierId,
        /// Upper-left corner of the barrier.
        pub position: Position,
        /// Size of the barrier.
        pub extent: Extent,
        /// Enemy bullets the barrier can still absorb.
        pub health: u32,
    }

    /// Immutable representation of an item box.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ItemBoxSnapshot {
        /// Identifier assigned to the box.
        pub id: ItemBoxId,
        /// Upper-left corner of the box.
        pub position: Position,
        /// Size of the box.
        pub extent: Extent,
        /// Whether bullets can collect the box yet.
        pub collectable: bool,
    }

    /// Immutable representation of a blocker.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct BlockerSnapshot {
        /// Identifier assigned to the blocker.
        pub id: BlockerId,
        /// Horizontal coordinate of the blocker's left edge.
        pub x: f32,
        /// Vertical coordinate of the blocker's upper edge.
        pub y: i32,
        /// Size of the blocker sprite.
        pub extent: Extent,
        /// Rotation in degrees.
        pub angle: f32,
    }

    /// Immutable representation of the bonus ship.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BonusShipSnapshot {
        /// Upper-left corner of the ship.
        pub position: Position,
        /// Size of the ship.
        pub extent: Extent,
        /// Whether the ship was shot down and is exploding.
        pub destroyed: bool,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invaders_core::{ShipType, FRAME_DURATION};

    fn started_world(settings: GameSettings, state: GameState) -> (World, Vec<Event>) {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartLevel {
                settings,
                state,
                difficulty: Difficulty::Easy,
                loadout: Loadout::default(),
                bonus_life: false,
            },
            &mut events,
        );
        (world, events)
    }

    fn tick(world: &mut World, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::Tick { dt }, &mut events);
        events
    }

    #[test]
    fn start_level_lays_out_formation_and_countdown() {
        let (world, events) = started_world(
            GameSettings::new(5, 3, 60, 2500),
            GameState::new(ShipType::StarDefender, 3),
        );
        assert_eq!(events, vec![Event::LevelStarted { level: 1 }]);
        assert_eq!(query::phase(&world), LevelPhase::Countdown);
        assert_eq!(query::formation_view(&world).iter().count(), 15);
        assert_eq!(query::shooters(&world).len(), 5);
        assert_eq!(query::countdown_remaining(&world), INPUT_DELAY);
    }

    #[test]
    fn bonus_life_is_granted_on_start() {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartLevel {
                settings: GameSettings::default(),
                state: GameState::new(ShipType::StarDefender, 2),
                difficulty: Difficulty::Normal,
                loadout: Loadout::default(),
                bonus_life: true,
            },
            &mut events,
        );
        assert_eq!(query::game_state(&world).lives, 3);
    }

    #[test]
    fn input_is_ignored_during_countdown() {
        let (mut world, _) = started_world(
            GameSettings::default(),
            GameState::new(ShipType::StarDefender, 3),
        );
        let before = query::player(&world).position;
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Lateral::Left,
            },
            &mut events,
        );
        apply(&mut world, Command::FirePlayer, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::player(&world).position, before);
        assert!(query::bullets(&world).is_empty());
    }

    #[test]
    fn countdown_hands_over_control_and_records_lap() {
        let state = GameState {
            level: 4,
            score: 700,
            max_combo: 9,
            elapsed: Duration::from_secs(90),
            ..GameState::new(ShipType::StarDefender, 3)
        };
        let (mut world, _) = started_world(GameSettings::default(), state);
        let events = tick(&mut world, INPUT_DELAY);
        assert!(events.contains(&Event::CountdownFinished { level: 4 }));
        assert_eq!(query::phase(&world), LevelPhase::Playing);
        let state = query::game_state(&world);
        assert_eq!(state.lap_time, Duration::from_secs(90));
        assert_eq!(state.lap_score, 700);
        assert_eq!(state.max_combo, 0);
    }

    #[test]
    fn player_shots_count_towards_bullets_shot() {
        let (mut world, _) = started_world(
            GameSettings::default(),
            GameState::new(ShipType::StarDefender, 3),
        );
        let _ = tick(&mut world, INPUT_DELAY);
        let mut events = Vec::new();
        apply(&mut world, Command::FirePlayer, &mut events);
        apply(&mut world, Command::FirePlayer, &mut events);
        assert_eq!(events, vec![Event::PlayerFired { bullets: 1 }]);
        assert_eq!(query::game_state(&world).bullets_shot, 1);
        assert_eq!(query::bullets(&world).len(), 1);
    }

    #[test]
    fn multi_shot_caps_at_three() {
        let (mut world, _) = started_world(
            GameSettings::default(),
            GameState::new(ShipType::StarDefender, 3),
        );
        let mut events = Vec::new();
        for _ in 0..4 {
            apply(
                &mut world,
                Command::ApplyItem {
                    effect: ItemEffect::MultiShot,
                },
                &mut events,
            );
        }
        assert_eq!(query::shot_count(&world), 3);
    }

    #[test]
    fn bombs_destroy_targets_and_award_points() {
        let (mut world, _) = started_world(
            GameSettings::new(2, 2, 60, 2500),
            GameState::new(ShipType::StarDefender, 3),
        );
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ApplyItem {
                effect: ItemEffect::LineBomb {
                    targets: vec![EnemySlot::new(0, 1), EnemySlot::new(1, 1)],
                },
            },
            &mut events,
        );
        assert_eq!(
            events.last(),
            Some(&Event::ItemApplied {
                kind: ItemKind::LineBomb,
                score: 20,
                ships_destroyed: 2,
            })
        );
        let state = query::game_state(&world);
        assert_eq!(state.score, 20);
        assert_eq!(state.ships_destroyed, 2);
        assert_eq!(
            query::shooters(&world),
            &[EnemySlot::new(0, 0), EnemySlot::new(1, 0)]
        );
    }

    #[test]
    fn clearing_the_formation_finishes_then_closes_the_level() {
        let (mut world, _) = started_world(
            GameSettings::new(1, 1, 60, 2500),
            GameState::new(ShipType::StarDefender, 3),
        );
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ApplyItem {
                effect: ItemEffect::Bomb {
                    targets: vec![EnemySlot::new(0, 0)],
                },
            },
            &mut events,
        );
        let events = tick(&mut world, FRAME_DURATION);
        assert!(events.contains(&Event::LevelFinished {
            outcome: LevelOutcome::Cleared
        }));
        assert_eq!(query::phase(&world), LevelPhase::Finishing);

        let events = tick(&mut world, SCREEN_CHANGE_INTERVAL);
        let closed = events.iter().find_map(|event| match event {
            Event::LevelClosed { state } => Some(state.clone()),
            _ => None,
        });
        let state = closed.expect("level closes after the screen change interval");
        // The lone ship sits in the top row, then each spare life adds 100.
        assert_eq!(state.score, 50 + 200);
        assert_eq!(query::phase(&world), LevelPhase::Finished);
        assert_eq!(query::outcome(&world), Some(LevelOutcome::Cleared));
    }

    #[test]
    fn barriers_replace_previous_barriers() {
        let (mut world, _) = started_world(
            GameSettings::default(),
            GameState::new(ShipType::StarDefender, 3),
        );
        let mut events = Vec::new();
        for _ in 0..2 {
            apply(
                &mut world,
                Command::ApplyItem {
                    effect: ItemEffect::Barrier {
                        positions: vec![Position::new(61, 580), Position::new(261, 580)],
                    },
                },
                &mut events,
            );
        }
        let barriers = query::barriers(&world);
        assert_eq!(barriers.len(), 2);
        assert_eq!(barriers[0].id, BarrierId::new(2));
    }

    #[test]
    fn blockers_drift_and_depart() {
        let (mut world, _) = started_world(
            GameSettings::default(),
            GameState::new(ShipType::StarDefender, 3),
        );
        let _ = tick(&mut world, INPUT_DELAY);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnBlocker {
                heading: Lateral::Left,
                y: 200,
                angle: 10.0,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::BlockerSpawned {
                blocker: BlockerId::new(0)
            }]
        );
        let _ = tick(&mut world, FRAME_DURATION);
        let blocker = query::blockers(&world)[0];
        assert_eq!(blocker.x, 898.5);

        let mut departed = false;
        for _ in 0..1000 {
            departed |= tick(&mut world, FRAME_DURATION)
                .contains(&Event::BlockerDeparted {
                    blocker: BlockerId::new(0),
                });
        }
        assert!(departed);
        assert!(query::blockers(&world).is_empty());
    }
}
