//! Translation of world snapshots into rendering scenes.

use glam::Vec2;
use invaders_core::{Extent, LevelPhase, Position};
use invaders_rendering::{Hud, Scene, SceneSprite, SpriteKind};
use invaders_world::{query, World};

fn corner(position: Position) -> Vec2 {
    Vec2::new(position.x() as f32, position.y() as f32)
}

fn size(extent: Extent) -> Vec2 {
    Vec2::new(extent.width() as f32, extent.height() as f32)
}

/// Builds the scene shown for the current frame of `world`.
///
/// Ground hazards are queued first so that ships and bullets cover them.
pub(crate) fn capture(world: &World) -> Scene {
    let arena = query::arena(world);
    let mut scene = Scene::new(arena.width() as f32, arena.height() as f32);

    for (position, extent) in query::webs(world) {
        scene.push(SceneSprite::new(SpriteKind::Web, corner(position), size(extent)));
    }
    for (_, position, extent) in query::blocks(world) {
        scene.push(SceneSprite::new(SpriteKind::Block, corner(position), size(extent)));
    }
    for barrier in query::barriers(world) {
        scene.push(SceneSprite::new(
            SpriteKind::Barrier,
            corner(barrier.position),
            size(barrier.extent),
        ));
    }
    for item_box in query::item_boxes(world) {
        scene.push(SceneSprite::new(
            SpriteKind::ItemBox,
            corner(item_box.position),
            size(item_box.extent),
        ));
    }
    for enemy in query::formation_view(world).iter() {
        let kind = if enemy.exploding {
            SpriteKind::Explosion
        } else {
            SpriteKind::Enemy(enemy.class)
        };
        scene.push(SceneSprite::new(kind, corner(enemy.position), size(enemy.extent)));
    }
    for blocker in query::blockers(world) {
        scene.push(
            SceneSprite::new(
                SpriteKind::Blocker,
                Vec2::new(blocker.x, blocker.y as f32),
                size(blocker.extent),
            )
            .rotated(blocker.angle),
        );
    }
    if let Some(ship) = query::bonus_ship(world) {
        let kind = if ship.destroyed {
            SpriteKind::Explosion
        } else {
            SpriteKind::BonusShip
        };
        scene.push(SceneSprite::new(kind, corner(ship.position), size(ship.extent)));
    }
    for bullet in query::bullets(world) {
        let kind = if bullet.hostile {
            SpriteKind::EnemyBullet
        } else {
            SpriteKind::PlayerBullet
        };
        scene.push(SceneSprite::new(kind, corner(bullet.position), size(bullet.extent)));
    }

    let player = query::player(world);
    let kind = if player.destroyed {
        SpriteKind::Explosion
    } else {
        SpriteKind::Player
    };
    scene.push(SceneSprite::new(kind, corner(player.position), size(player.extent)));

    let state = query::game_state(world);
    let context = query::level_context(world);
    let countdown = (context.phase == LevelPhase::Countdown).then(|| {
        let millis = query::countdown_remaining(world).as_millis().div_ceil(1000);
        u32::try_from(millis).unwrap_or(u32::MAX)
    });
    scene.hud = Hud {
        level: state.level,
        score: state.score,
        lives: state.lives,
        combo: state.combo,
        alert: query::alert(world),
        countdown,
        ghost: player.ghost,
        time_stopped: context.time_stopped,
    };
    scene
}
