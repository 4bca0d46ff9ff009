use super::{Battle, BattleResult};
use crate::capabilities::{BasicAttacker, BattleFeedback, EnemyBrain, NoFeedback};
use crate::combatant::Combatant;
use crate::config::BattleConfig;
use crate::error::BattleSetupError;
use crate::input::InputGate;
use crate::notify::Signal;
use crate::scheduler::Scheduler;
use crate::time::Millis;
use crate::turn::TurnStateMachine;
use crate::window::{TimingWindow, WindowKind};

/// Builder for [`Battle`].
///
/// The player is required; every other collaborator has a default. The enemy
/// may also be assigned later with [`Battle::assign_enemy`].
#[derive(Default)]
pub struct BattleBuilder {
    config: BattleConfig,
    player: Option<Combatant>,
    enemy: Option<Combatant>,
    feedback: Option<Box<dyn BattleFeedback>>,
    brain: Option<Box<dyn EnemyBrain>>,
}

impl BattleBuilder {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Override the default tuning.
    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn player(mut self, player: Combatant) -> Self {
        self.player = Some(player);
        self
    }

    pub fn enemy(mut self, enemy: Combatant) -> Self {
        self.enemy = Some(enemy);
        self
    }

    /// Presentation hooks (defaults to [`NoFeedback`]).
    pub fn feedback(mut self, feedback: impl BattleFeedback + 'static) -> Self {
        self.feedback = Some(Box::new(feedback));
        self
    }

    /// Enemy decision maker (defaults to [`BasicAttacker`] with the
    /// configured attack).
    pub fn brain(mut self, brain: impl EnemyBrain + 'static) -> Self {
        self.brain = Some(Box::new(brain));
        self
    }

    pub fn build(self) -> Result<Battle, BattleSetupError> {
        self.config.validate()?;
        let player = self.player.ok_or(BattleSetupError::MissingPlayer)?;

        let config = self.config;
        let brain = self
            .brain
            .unwrap_or_else(|| Box::new(BasicAttacker::new(config.enemy_attack)) as Box<dyn EnemyBrain>);
        let feedback = self
            .feedback
            .unwrap_or_else(|| Box::new(NoFeedback) as Box<dyn BattleFeedback>);

        Ok(Battle {
            turns: TurnStateMachine::new(),
            gate: InputGate::new(config.queue_during_action),
            parry: TimingWindow::new(WindowKind::Parry, config.parry),
            qte: TimingWindow::new(WindowKind::Qte, config.qte),
            player,
            enemy: self.enemy,
            scheduler: Scheduler::new(),
            result: BattleResult::None,
            active_action: None,
            queued_action: None,
            pending_attack: None,
            feedback,
            brain,
            events: Signal::new(),
            now: Millis::ZERO,
            encounter: 0,
            config,
        })
    }
}
