//! Frame-by-frame campaign driver used when a game is rendered.

use invaders_core::{GameState, LevelPhase};
use invaders_rendering::Scene;
use invaders_session::{GameConfig, InputSource, LevelSession};
use invaders_system_progression::{Campaign, Wallet};
use invaders_world::query;

use crate::scene;

/// Plays a single-player campaign one frame per [`Spectator::advance`] call.
pub(crate) struct Spectator<I> {
    config: GameConfig,
    campaign: Campaign,
    session: LevelSession,
    input: I,
}

impl<I: InputSource> Spectator<I> {
    pub(crate) fn new(config: GameConfig, wallet: &Wallet, input: I) -> Self {
        let campaign = Campaign::from_wallet(
            config.settings,
            config.ship_type,
            config.difficulty,
            wallet,
        );
        let session = open_level(&config, &campaign);
        Self {
            config,
            campaign,
            session,
            input,
        }
    }

    /// Simulates one frame and redraws `scene`. Returns `false` once the
    /// campaign is over.
    pub(crate) fn advance(&mut self, scene: &mut Scene) -> bool {
        if query::phase(self.session.world()) == LevelPhase::Finished {
            let report = self.session.report();
            let level = report.state.level;
            self.campaign.record(report.state);
            if self.campaign.is_over() || self.config.max_levels.is_some_and(|cap| level >= cap) {
                return false;
            }
            self.session = open_level(&self.config, &self.campaign);
        } else if self
            .config
            .max_frames_per_level
            .is_some_and(|max| self.session.frames() >= max)
        {
            tracing::warn!(frames = self.session.frames(), "level abandoned at frame limit");
            return false;
        }

        let _ = self.session.step(&mut self.input);
        *scene = scene::capture(self.session.world());
        true
    }

    /// State of the campaign as of the last simulated frame.
    pub(crate) fn state(&self) -> GameState {
        if query::phase(self.session.world()) == LevelPhase::Finished {
            self.campaign.state().clone()
        } else {
            self.session.report().state
        }
    }
}

fn open_level(config: &GameConfig, campaign: &Campaign) -> LevelSession {
    let plan = campaign.plan_level();
    let seed = config.level_seed(0, plan.state.level);
    tracing::info!(level = plan.state.level, "watching level");
    LevelSession::new(config.arena, plan, seed)
}
