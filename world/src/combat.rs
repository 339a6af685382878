//! Collision resolution between bullets, ships and obstacles.

use invaders_core::{combo_score, DestructionCause, Event, LevelPhase};

use crate::{
    entities::{Bullet, BONUS_SHIP_POINTS},
    formation::HitOutcome,
    World,
};

impl World {
    /// Resolves every collision for the current frame.
    ///
    /// Each bullet is consumed by the first thing it strikes. Enemy bullets
    /// test the player ship before barriers; player bullets test the formation,
    /// the bonus ship, item boxes and then blocks.
    pub(crate) fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        let top_enemy_y = self.top_target_y();
        let bullets = std::mem::take(&mut self.bullets);
        let mut surviving = Vec::with_capacity(bullets.len());

        for bullet in bullets {
            let consumed = if bullet.is_hostile() {
                self.resolve_enemy_bullet(&bullet, out_events)
            } else {
                self.resolve_player_bullet(&bullet, top_enemy_y, out_events)
            };
            if !consumed {
                surviving.push(bullet);
            }
        }
        self.bullets = surviving;

        self.crush_blocks(out_events);
    }

    fn top_target_y(&self) -> Option<i32> {
        let bonus_y = self
            .bonus_ship
            .as_ref()
            .filter(|ship| !ship.destroyed)
            .map(|ship| ship.position.y());
        match (self.formation.top_y(), bonus_y) {
            (Some(formation), Some(bonus)) => Some(formation.min(bonus)),
            (formation, bonus) => formation.or(bonus),
        }
    }

    fn resolve_enemy_bullet(&mut self, bullet: &Bullet, out_events: &mut Vec<Event>) -> bool {
        let hitbox = bullet.hitbox();
        let level_running = matches!(self.phase, LevelPhase::Countdown | LevelPhase::Playing);

        if level_running && self.ghost.is_finished() && hitbox.overlaps(&self.player.hitbox()) {
            if !self.player.is_destroyed() {
                self.player.destroy();
                let damage = self.state.level / 3 + 1;
                self.state.lives = self.state.lives.saturating_sub(damage);
                tracing::info!(lives = self.state.lives, "player ship hit");
                out_events.push(Event::PlayerHit {
                    lives: self.state.lives,
                });
            }
            return true;
        }

        let Some(index) = self
            .barriers
            .iter()
            .position(|barrier| hitbox.overlaps(&barrier.hitbox()))
        else {
            return false;
        };
        let barrier = &mut self.barriers[index];
        barrier.health = barrier.health.saturating_sub(1);
        if barrier.health == 0 {
            let barrier = self.barriers.remove(index);
            out_events.push(Event::BarrierDestroyed {
                barrier: barrier.id,
            });
        }
        true
    }

    fn resolve_player_bullet(
        &mut self,
        bullet: &Bullet,
        top_enemy_y: Option<i32>,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let hitbox = bullet.hitbox();

        if let Some(slot) = self.formation.first_overlapping(&hitbox) {
            match self.formation.hit(slot) {
                Some(HitOutcome::Destroyed { position, points }) => {
                    let score = self.award(points);
                    tracing::debug!(?slot, score, "enemy ship destroyed");
                    self.state.ships_destroyed = self.state.ships_destroyed.saturating_add(1);
                    out_events.push(Event::EnemyDestroyed {
                        slot,
                        position,
                        points,
                        cause: DestructionCause::PlayerBullet,
                    });
                }
                Some(HitOutcome::Damaged { position, health }) => {
                    self.register_hit();
                    out_events.push(Event::EnemyDamaged {
                        slot,
                        position,
                        health,
                    });
                }
                None => {}
            }
            return true;
        }

        if let Some(ship) = self.bonus_ship.as_mut() {
            if !ship.destroyed && hitbox.overlaps(&ship.hitbox()) {
                ship.destroy();
                let score = self.award(BONUS_SHIP_POINTS);
                self.state.ships_destroyed = self.state.ships_destroyed.saturating_add(1);
                tracing::info!(score, "bonus ship destroyed");
                out_events.push(Event::BonusShipDestroyed { score });
                return true;
            }
        }

        if self.shot_count == 1
            && top_enemy_y.is_some_and(|top| bullet.position.y() < top)
        {
            self.reset_combo(out_events);
        }

        if let Some(index) = self
            .item_boxes
            .iter()
            .position(|item_box| item_box.is_collectable() && hitbox.overlaps(&item_box.hitbox()))
        {
            let item_box = self.item_boxes.remove(index);
            out_events.push(Event::ItemBoxCollected {
                item_box: item_box.id,
            });
            return true;
        }

        if let Some(block) = self
            .blocks
            .iter()
            .find(|block| hitbox.overlaps(&block.hitbox()))
        {
            out_events.push(Event::BulletBlocked { block: block.id });
            return true;
        }

        false
    }

    /// Adds a combo-scaled award to the score and extends the combo.
    fn award(&mut self, points: u32) -> u32 {
        let score = combo_score(points, self.state.combo);
        self.state.score = self.state.score.saturating_add(score);
        self.register_hit();
        score
    }

    fn crush_blocks(&mut self, out_events: &mut Vec<Event>) {
        if self.blocks.is_empty() {
            return;
        }
        let enemies: Vec<_> = self
            .formation
            .alive_hitboxes()
            .map(|(_, hitbox)| hitbox)
            .collect();
        self.blocks.retain(|block| {
            let crushed = enemies
                .iter()
                .any(|enemy| enemy.overlaps(&block.hitbox()));
            if crushed {
                out_events.push(Event::BlockCrushed { block: block.id });
            }
            !crushed
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use invaders_core::{
        Command, Difficulty, EnemySlot, GameSettings, GameState, ItemEffect, Loadout, Position,
        ShipType,
    };

    use crate::{apply, query};

    use super::*;

    fn playing_world(settings: GameSettings, state: GameState) -> World {
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
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(6000),
            },
            &mut events,
        );
        world
    }

    fn place_bullet(world: &mut World, x: i32, y: i32, speed: i32) {
        let id = world.ids.bullet();
        world.bullets.push(Bullet {
            id,
            position: Position::new(x, y),
            speed,
        });
    }

    fn resolve(world: &mut World) -> Vec<Event> {
        let mut events = Vec::new();
        world.resolve_collisions(&mut events);
        events
    }

    #[test]
    fn player_bullet_destroys_enemy_and_builds_combo() {
        let mut world = playing_world(
            GameSettings::new(2, 1, 60, 2500),
            GameState::new(ShipType::StarDefender, 3),
        );
        place_bullet(&mut world, 29, 103, -6);
        let events = resolve(&mut world);
        assert_eq!(
            events,
            vec![Event::EnemyDestroyed {
                slot: EnemySlot::new(0, 0),
                position: Position::new(20, 100),
                points: 50,
                cause: DestructionCause::PlayerBullet,
            }]
        );
        assert!(world.bullets.is_empty());

        place_bullet(&mut world, 69, 103, -6);
        let _ = resolve(&mut world);
        let state = query::game_state(&world);
        // Second kill is scaled by the one-hit combo.
        assert_eq!(state.score, 50 + 55);
        assert_eq!(state.combo, 2);
        assert_eq!(state.max_combo, 2);
        assert_eq!(state.ships_destroyed, 2);
    }

    #[test]
    fn armored_enemies_absorb_hits_without_points() {
        let mut world = playing_world(
            GameSettings::new(1, 1, 60, 2500),
            GameState {
                level: 3,
                ..GameState::new(ShipType::StarDefender, 3)
            },
        );
        place_bullet(&mut world, 29, 103, -6);
        let events = resolve(&mut world);
        assert!(matches!(
            events.as_slice(),
            [Event::EnemyDamaged { health: 0, .. }]
        ));
        let state = query::game_state(&world);
        assert_eq!(state.score, 0);
        assert_eq!(state.combo, 1);
    }

    #[test]
    fn enemy_bullet_costs_lives_once_per_destruction() {
        let mut world = playing_world(
            GameSettings::default(),
            GameState {
                level: 4,
                ..GameState::new(ShipType::StarDefender, 5)
            },
        );
        place_bullet(&mut world, 310, 575, 4);
        place_bullet(&mut world, 305, 575, 4);
        let events = resolve(&mut world);
        assert_eq!(events, vec![Event::PlayerHit { lives: 3 }]);
        assert!(world.bullets.is_empty());
        assert!(query::player(&world).destroyed);
    }

    #[test]
    fn ghost_lets_enemy_bullets_pass() {
        let mut world = playing_world(
            GameSettings::default(),
            GameState::new(ShipType::StarDefender, 3),
        );
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ApplyItem {
                effect: ItemEffect::Ghost {
                    duration: Duration::from_millis(3000),
                },
            },
            &mut events,
        );
        place_bullet(&mut world, 310, 575, 4);
        assert!(resolve(&mut world).is_empty());
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(query::game_state(&world).lives, 3);
    }

    #[test]
    fn barriers_absorb_enemy_bullets() {
        let mut world = playing_world(
            GameSettings::default(),
            GameState::new(ShipType::StarDefender, 3),
        );
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ApplyItem {
                effect: ItemEffect::Barrier {
                    positions: vec![Position::new(100, 400)],
                },
            },
            &mut events,
        );
        place_bullet(&mut world, 120, 400, 4);
        let events = resolve(&mut world);
        assert!(matches!(
            events.as_slice(),
            [Event::BarrierDestroyed { .. }]
        ));
        assert!(query::barriers(&world).is_empty());
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn fresh_item_boxes_ignore_bullets() {
        let mut world = playing_world(
            GameSettings::default(),
            GameState::new(ShipType::StarDefender, 3),
        );
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnItemBox {
                position: Position::new(400, 450),
            },
            &mut events,
        );
        place_bullet(&mut world, 403, 452, -6);
        assert!(resolve(&mut world).is_empty());

        for item_box in &mut world.item_boxes {
            item_box.tick(Duration::from_millis(100));
        }
        let events = resolve(&mut world);
        assert!(matches!(
            events.as_slice(),
            [Event::ItemBoxCollected { .. }]
        ));
        assert!(query::item_boxes(&world).is_empty());
    }

    #[test]
    fn shots_passing_the_formation_reset_the_combo() {
        let mut world = playing_world(
            GameSettings::new(1, 1, 60, 2500),
            GameState::new(ShipType::StarDefender, 3),
        );
        world.state.combo = 4;
        place_bullet(&mut world, 400, 90, -6);
        let events = resolve(&mut world);
        assert_eq!(events, vec![Event::ComboReset { combo: 4 }]);
        assert_eq!(query::game_state(&world).combo, 0);
    }

    #[test]
    fn blocks_absorb_player_bullets_until_crushed() {
        let mut world = playing_world(
            GameSettings::new(1, 1, 60, 2500),
            GameState::new(ShipType::StarDefender, 3),
        );
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnBlocks {
                positions: vec![Position::new(300, 300), Position::new(10, 105)],
            },
            &mut events,
        );
        place_bullet(&mut world, 310, 302, -6);
        let events = resolve(&mut world);
        assert!(events.contains(&Event::BulletBlocked {
            block: invaders_core::BlockId::new(0)
        }));
        assert!(events.contains(&Event::BlockCrushed {
            block: invaders_core::BlockId::new(1)
        }));
        assert_eq!(query::blocks(&world).len(), 1);
    }

    #[test]
    fn bonus_ship_awards_combo_scaled_points() {
        let mut world = playing_world(
            GameSettings::default(),
            GameState::new(ShipType::StarDefender, 3),
        );
        let mut events = Vec::new();
        apply(&mut world, Command::SpawnBonusShip, &mut events);
        assert_eq!(events, vec![Event::BonusShipAppeared]);
        world.state.combo = 10;
        place_bullet(&mut world, -20, 60, -6);
        let events = resolve(&mut world);
        assert_eq!(events, vec![Event::BonusShipDestroyed { score: 200 }]);
        assert!(query::bonus_ship(&world).is_some_and(|ship| ship.destroyed));
    }
}
