//! Enemy formation: a grid of ships that moves as a rigid body.

use invaders_core::{
    Arena, Difficulty, EnemyClass, EnemySlot, EnemySnapshot, Event, Extent, FormationHeading,
    FormationView, GameSettings, Hitbox, Position,
};

/// Size of a single enemy ship.
pub(crate) const ENEMY_EXTENT: Extent = Extent::new(24, 16);

const INITIAL_POSITION: Position = Position::new(20, 100);
const SEPARATION: i32 = 40;
const X_SPEED: i32 = 8;
const Y_SPEED: i32 = 4;
const SIDE_MARGIN: i32 = 20;
const BOTTOM_MARGIN: i32 = 80;
const DESCENT_DISTANCE: i32 = 20;
const MINIMUM_SPEED: i32 = 10;

#[derive(Clone, Debug)]
struct Enemy {
    class: EnemyClass,
    position: Position,
    health: u32,
    points: u32,
    exploding: bool,
}

impl Enemy {
    fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.position, ENEMY_EXTENT)
    }
}

/// Result of landing a player bullet on an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HitOutcome {
    /// The enemy absorbed the hit.
    Damaged { position: Position, health: u32 },
    /// The hit destroyed the enemy.
    Destroyed { position: Position, points: u32 },
}

#[derive(Clone, Copy, Debug)]
struct Bounds {
    origin: Position,
    extent: Extent,
}

/// Grid of enemy ships addressed by column then row.
///
/// Destroyed ships keep their slot as an explosion until the next formation
/// step clears it, so slots never shift while a level is running.
#[derive(Clone, Debug)]
pub(crate) struct Formation {
    columns: u32,
    rows: u32,
    grid: Vec<Vec<Option<Enemy>>>,
    bounds: Option<Bounds>,
    heading: FormationHeading,
    previous_heading: FormationHeading,
    step_counter: i32,
    step_interval: i32,
    shooters: Vec<EnemySlot>,
    alive: usize,
}

impl Formation {
    /// Creates a formation without ships.
    pub(crate) fn empty() -> Self {
        Self {
            columns: 0,
            rows: 0,
            grid: Vec::new(),
            bounds: None,
            heading: FormationHeading::Right,
            previous_heading: FormationHeading::Right,
            step_counter: 0,
            step_interval: MINIMUM_SPEED,
            shooters: Vec::new(),
            alive: 0,
        }
    }

    /// Lays out a fresh formation for `level`.
    pub(crate) fn new(settings: &GameSettings, level: u32, difficulty: Difficulty) -> Self {
        let columns = settings.formation_width;
        let rows = settings.formation_height;
        let health = level / 3;
        let level_bonus = level / 10 + difficulty.ordinal();

        let grid: Vec<Vec<Option<Enemy>>> = (0..columns)
            .map(|column| {
                (0..rows)
                    .map(|row| {
                        let class = EnemyClass::for_row(row, rows);
                        Some(Enemy {
                            class,
                            position: INITIAL_POSITION
                                .offset(SEPARATION * column as i32, SEPARATION * row as i32),
                            health,
                            points: class.base_points() + level_bonus,
                            exploding: false,
                        })
                    })
                    .collect()
            })
            .collect();

        let mut formation = Self {
            columns,
            rows,
            grid,
            step_interval: settings.base_speed.saturating_add(MINIMUM_SPEED),
            alive: columns as usize * rows as usize,
            ..Self::empty()
        };
        let shooters = (0..columns)
            .filter_map(|column| formation.bottom_alive(column))
            .collect();
        formation.shooters = shooters;
        formation.recompute_bounds();
        formation
    }

    /// Reports whether every ship was destroyed.
    pub(crate) fn is_empty(&self) -> bool {
        self.alive == 0
    }

    /// Current heading of the formation.
    pub(crate) fn heading(&self) -> FormationHeading {
        self.heading
    }

    /// Bottom-most surviving ship of every column that still has one.
    pub(crate) fn shooters(&self) -> &[EnemySlot] {
        &self.shooters
    }

    /// Position of the ship in `slot`, including explosions.
    pub(crate) fn position_of(&self, slot: EnemySlot) -> Option<Position> {
        self.enemy(slot).map(|enemy| enemy.position)
    }

    /// Smallest y coordinate among ships that can still be hit.
    pub(crate) fn top_y(&self) -> Option<i32> {
        self.alive_ships().map(|(_, enemy)| enemy.position.y()).min()
    }

    /// Hitboxes of every ship that can still be hit, ordered by slot.
    pub(crate) fn alive_hitboxes(&self) -> impl Iterator<Item = (EnemySlot, Hitbox)> + '_ {
        self.alive_ships().map(|(slot, enemy)| (slot, enemy.hitbox()))
    }

    /// First ship that can still be hit and overlaps `hitbox`.
    pub(crate) fn first_overlapping(&self, hitbox: &Hitbox) -> Option<EnemySlot> {
        self.alive_hitboxes()
            .find(|(_, candidate)| candidate.overlaps(hitbox))
            .map(|(slot, _)| slot)
    }

    /// Lands a hit on `slot`: ships without health left are destroyed, others lose one point.
    pub(crate) fn hit(&mut self, slot: EnemySlot) -> Option<HitOutcome> {
        let enemy = self.enemy_mut(slot)?;
        if enemy.exploding {
            return None;
        }
        if enemy.health > 0 {
            enemy.health -= 1;
            return Some(HitOutcome::Damaged {
                position: enemy.position,
                health: enemy.health,
            });
        }
        self.destroy(slot)
            .map(|(position, points)| HitOutcome::Destroyed { position, points })
    }

    /// Destroys the ship in `slot` regardless of its health.
    ///
    /// Returns the ship's position and point value, or `None` when the slot is
    /// empty or already exploding.
    pub(crate) fn destroy(&mut self, slot: EnemySlot) -> Option<(Position, u32)> {
        let enemy = self.enemy_mut(slot)?;
        if enemy.exploding {
            return None;
        }
        enemy.exploding = true;
        let destroyed = (enemy.position, enemy.points);
        self.alive = self.alive.saturating_sub(1);
        self.refresh_shooter(slot.column());
        tracing::debug!(
            column = slot.column(),
            row = slot.row(),
            "enemy ship destroyed"
        );
        Some(destroyed)
    }

    /// Advances the formation by one frame.
    ///
    /// The formation steps once every `base_speed + 10` frames. Before each
    /// step it checks the playfield boundaries, turning when needed, and clears
    /// explosions left by ships destroyed since the previous step.
    pub(crate) fn update(&mut self, arena: Arena, out_events: &mut Vec<Event>) {
        self.recompute_bounds();
        let Some(bounds) = self.bounds else {
            return;
        };

        self.step_counter = self.step_counter.saturating_add(1);
        if self.step_counter < self.step_interval {
            return;
        }
        self.step_counter = 0;

        let from = self.heading;
        self.heading = self.next_heading(bounds, arena);
        if self.heading != from {
            tracing::debug!(?from, to = ?self.heading, "formation turned");
            out_events.push(Event::FormationTurned {
                from,
                to: self.heading,
            });
        }

        let (dx, dy) = match self.heading {
            FormationHeading::Right => (X_SPEED, 0),
            FormationHeading::Left => (-X_SPEED, 0),
            FormationHeading::Down => (0, Y_SPEED),
        };

        for column in &mut self.grid {
            for cell in column.iter_mut() {
                if cell.as_ref().is_some_and(|enemy| enemy.exploding) {
                    *cell = None;
                }
                if let Some(enemy) = cell {
                    enemy.position = enemy.position.offset(dx, dy);
                }
            }
        }
        self.recompute_bounds();
        out_events.push(Event::FormationAdvanced {
            heading: self.heading,
        });
    }

    /// Read-only view of every present ship.
    pub(crate) fn view(&self) -> FormationView {
        let enemies = self
            .slots()
            .filter_map(|(slot, enemy)| {
                enemy.map(|enemy| EnemySnapshot {
                    slot,
                    class: enemy.class,
                    position: enemy.position,
                    extent: ENEMY_EXTENT,
                    health: enemy.health,
                    points: enemy.points,
                    exploding: enemy.exploding,
                })
            })
            .collect();
        FormationView::new(self.columns, self.rows, enemies)
    }

    fn next_heading(&mut self, bounds: Bounds, arena: Arena) -> FormationHeading {
        let top = bounds.origin.y();
        let left = bounds.origin.x();
        let at_bottom = top + bounds.extent.height() > arena.height() - BOTTOM_MARGIN;
        let at_right_side = left + bounds.extent.width() >= arena.width() - SIDE_MARGIN;
        let at_left_side = left <= SIDE_MARGIN;
        let at_altitude = top % DESCENT_DISTANCE == 0;

        match self.heading {
            FormationHeading::Down if at_altitude => match self.previous_heading {
                FormationHeading::Right => FormationHeading::Left,
                _ => FormationHeading::Right,
            },
            FormationHeading::Left if at_left_side => {
                if at_bottom {
                    FormationHeading::Right
                } else {
                    self.previous_heading = FormationHeading::Left;
                    FormationHeading::Down
                }
            }
            FormationHeading::Right if at_right_side => {
                if at_bottom {
                    FormationHeading::Left
                } else {
                    self.previous_heading = FormationHeading::Right;
                    FormationHeading::Down
                }
            }
            heading => heading,
        }
    }

    fn recompute_bounds(&mut self) {
        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        for (_, enemy) in self.slots() {
            if let Some(enemy) = enemy {
                min_x = min_x.min(enemy.position.x());
                min_y = min_y.min(enemy.position.y());
                max_x = max_x.max(enemy.position.x() + ENEMY_EXTENT.width());
                max_y = max_y.max(enemy.position.y() + ENEMY_EXTENT.height());
            }
        }
        self.bounds = (min_x <= max_x).then(|| Bounds {
            origin: Position::new(min_x, min_y),
            extent: Extent::new(max_x - min_x, max_y - min_y),
        });
    }

    fn refresh_shooter(&mut self, column: u32) {
        let replacement = self.bottom_alive(column);
        let existing = self
            .shooters
            .iter()
            .position(|shooter| shooter.column() == column);
        match (existing, replacement) {
            (Some(index), Some(slot)) => self.shooters[index] = slot,
            (Some(index), None) => {
                let _ = self.shooters.remove(index);
            }
            (None, _) => {}
        }
    }

    fn bottom_alive(&self, column: u32) -> Option<EnemySlot> {
        let cells = self.grid.get(column as usize)?;
        cells
            .iter()
            .enumerate()
            .rev()
            .find(|(_, cell)| cell.as_ref().is_some_and(|enemy| !enemy.exploding))
            .map(|(row, _)| EnemySlot::new(column, row as u32))
    }

    fn slots(&self) -> impl Iterator<Item = (EnemySlot, Option<&Enemy>)> + '_ {
        self.grid.iter().enumerate().flat_map(|(column, cells)| {
            cells.iter().enumerate().map(move |(row, cell)| {
                (EnemySlot::new(column as u32, row as u32), cell.as_ref())
            })
        })
    }

    fn alive_ships(&self) -> impl Iterator<Item = (EnemySlot, &Enemy)> + '_ {
        self.slots().filter_map(|(slot, enemy)| match enemy {
            Some(enemy) if !enemy.exploding => Some((slot, enemy)),
            _ => None,
        })
    }

    fn enemy(&self, slot: EnemySlot) -> Option<&Enemy> {
        self.grid
            .get(slot.column() as usize)?
            .get(slot.row() as usize)?
            .as_ref()
    }

    fn enemy_mut(&mut self, slot: EnemySlot) -> Option<&mut Enemy> {
        self.grid
            .get_mut(slot.column() as usize)?
            .get_mut(slot.row() as usize)?
            .as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formation(width: u32, height: u32, base_speed: i32, level: u32) -> Formation {
        Formation::new(
            &GameSettings::new(width, height, base_speed, 2500),
            level,
            Difficulty::Easy,
        )
    }

    fn run_steps(formation: &mut Formation, arena: Arena, steps: usize) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..steps {
            formation.update(arena, &mut events);
        }
        events
    }

    #[test]
    fn lays_out_grid_with_classes_and_points() {
        let formation = Formation::new(&GameSettings::new(3, 2, 60, 2500), 12, Difficulty::Hard);
        let view = formation.view();
        let first = view.get(EnemySlot::new(0, 0)).expect("top-left ship");
        assert_eq!(first.position, Position::new(20, 100));
        assert_eq!(first.class, EnemyClass::E);
        assert_eq!(first.health, 4);
        assert_eq!(first.points, 50 + 1 + 2);

        let last = view.get(EnemySlot::new(2, 1)).expect("bottom-right ship");
        assert_eq!(last.position, Position::new(100, 140));
        assert_eq!(last.class, EnemyClass::A);
        assert_eq!(
            formation.shooters(),
            &[
                EnemySlot::new(0, 1),
                EnemySlot::new(1, 1),
                EnemySlot::new(2, 1)
            ]
        );
    }

    #[test]
    fn steps_only_after_interval_elapses() {
        let mut formation = formation(2, 2, -5, 1);
        let arena = Arena::default();
        assert!(run_steps(&mut formation, arena, 4).is_empty());
        let events = run_steps(&mut formation, arena, 1);
        assert_eq!(
            events,
            vec![Event::FormationAdvanced {
                heading: FormationHeading::Right
            }]
        );
        assert_eq!(
            formation.position_of(EnemySlot::new(0, 0)),
            Some(Position::new(28, 100))
        );
    }

    #[test]
    fn negative_speed_steps_every_frame() {
        let mut formation = formation(1, 1, -150, 1);
        let events = run_steps(&mut formation, Arena::default(), 3);
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn descends_at_right_edge_then_turns_left_at_altitude() {
        let mut formation = formation(1, 1, -150, 1);
        let arena = Arena::new(80, 650);
        // Ship starts at x = 20 and is 24 wide; the right margin sits at x = 60.
        let events = run_steps(&mut formation, arena, 2);
        assert_eq!(formation.heading(), FormationHeading::Right);
        assert_eq!(
            formation.position_of(EnemySlot::new(0, 0)),
            Some(Position::new(36, 100))
        );
        assert!(events
            .iter()
            .all(|event| !matches!(event, Event::FormationTurned { .. })));

        let events = run_steps(&mut formation, arena, 1);
        assert_eq!(formation.heading(), FormationHeading::Down);
        assert!(events.contains(&Event::FormationTurned {
            from: FormationHeading::Right,
            to: FormationHeading::Down,
        }));

        // Four more descent steps reach y = 120, the next horizontal altitude.
        let _ = run_steps(&mut formation, arena, 4);
        assert_eq!(formation.heading(), FormationHeading::Down);
        assert_eq!(
            formation.position_of(EnemySlot::new(0, 0)),
            Some(Position::new(36, 120))
        );
        let _ = run_steps(&mut formation, arena, 1);
        assert_eq!(formation.heading(), FormationHeading::Left);
        assert_eq!(
            formation.position_of(EnemySlot::new(0, 0)),
            Some(Position::new(28, 120))
        );
    }

    #[test]
    fn bounces_sideways_instead_of_descending_at_bottom() {
        let mut formation = formation(1, 1, -150, 1);
        // Bottom margin at y = 40 keeps the formation permanently at the bottom.
        let arena = Arena::new(80, 120);
        let _ = run_steps(&mut formation, arena, 3);
        assert_eq!(formation.heading(), FormationHeading::Left);
    }

    #[test]
    fn hit_drains_health_before_destroying() {
        let mut formation = formation(1, 2, 60, 3);
        let slot = EnemySlot::new(0, 1);
        assert!(matches!(
            formation.hit(slot),
            Some(HitOutcome::Damaged { health: 0, .. })
        ));
        assert!(matches!(
            formation.hit(slot),
            Some(HitOutcome::Destroyed { points: 10, .. })
        ));
        assert_eq!(formation.hit(slot), None);
        assert_eq!(formation.shooters(), &[EnemySlot::new(0, 0)]);
    }

    #[test]
    fn emptied_columns_stop_shooting() {
        let mut formation = formation(2, 1, 60, 1);
        assert!(formation.destroy(EnemySlot::new(0, 0)).is_some());
        assert_eq!(formation.shooters(), &[EnemySlot::new(1, 0)]);
        assert!(!formation.is_empty());
        assert!(formation.destroy(EnemySlot::new(1, 0)).is_some());
        assert!(formation.shooters().is_empty());
        assert!(formation.is_empty());
    }

    #[test]
    fn explosions_clear_on_next_step() {
        let mut formation = formation(2, 1, -150, 1);
        let _ = formation.destroy(EnemySlot::new(0, 0));
        assert!(formation
            .view()
            .get(EnemySlot::new(0, 0))
            .is_some_and(|enemy| enemy.exploding));
        let _ = run_steps(&mut formation, Arena::default(), 1);
        assert!(formation.view().get(EnemySlot::new(0, 0)).is_none());
        assert_eq!(formation.top_y(), Some(100));
    }
}
