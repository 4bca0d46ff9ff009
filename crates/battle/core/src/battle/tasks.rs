//! Delayed battle steps.
//!
//! Each variant is one resumable wait of the encounter ("hit lands after the
//! wind-up", "counter lands 500ms after the parry"). They are queued on the
//! battle's scheduler and dispatched from [`Battle::tick`].

use super::Battle;
use crate::action::ActionKind;
use crate::scheduler::Due;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BattleTask {
    /// Damage of an action without a QTE lands.
    PlayerHit { kind: ActionKind },
    /// The action's QTE window opens.
    OpenQte { kind: ActionKind },
    ActionComplete,
    EnemyAttack,
    OpenParry,
    CounterAttack,
    EndEnemyTurn,
}

impl Battle {
    pub(super) fn run_task(&mut self, due: Due<BattleTask>) {
        let Due { id, at, task } = due;
        tracing::trace!(?id, ?task, at = %at, "running battle task");

        match task {
            BattleTask::PlayerHit { kind } => self.land_player_hit(kind, at),
            BattleTask::OpenQte { kind } => self.open_qte(kind, at),
            BattleTask::ActionComplete => self.complete_action(at),
            BattleTask::EnemyAttack => self.start_enemy_attack(at),
            BattleTask::OpenParry => self.open_parry(at),
            BattleTask::CounterAttack => self.land_counter_attack(at),
            BattleTask::EndEnemyTurn => self.end_enemy_turn(),
        }
    }
}
