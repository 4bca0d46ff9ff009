//! Player turn: action requests, attack/skill execution and the QTE.

use super::{Battle, BattleEvent, BattleTask, DamageSource};
use crate::action::ActionKind;
use crate::capabilities::HapticPulse;
use crate::combatant::Side;
use crate::input::{InputPermission, InputVerdict, PressOutcome};
use crate::time::Millis;
use crate::turn::PlayerTurnState;
use crate::window::{WindowKind, WindowOutcome};

impl Battle {
    /// Routes a semantic action request through the input gate.
    ///
    /// An accepted request that the player cannot afford is reported with
    /// [`BattleEvent::InsufficientStamina`] and changes nothing else.
    pub fn request_action(&mut self, kind: ActionKind, now: Millis) -> InputVerdict {
        self.advance(now);

        let verdict = self.gate.request_action(kind);
        if let InputVerdict::Rejected(reason) = verdict {
            self.emit(BattleEvent::InputRejected { reason });
            return verdict;
        }

        if self.gate.permission() == InputPermission::ExecutingAction {
            if let Some(replaced) = self.queued_action.replace(kind) {
                tracing::debug!(%replaced, %kind, "queued action replaced");
            }
            self.emit(BattleEvent::ActionQueued { kind });
            return verdict;
        }

        self.perform_action(kind, self.now);
        verdict
    }

    /// Timed press during the player's attack.
    pub fn request_qte(&mut self, now: Millis) -> PressOutcome {
        self.advance(now);

        let press = self.gate.request_qte(&mut self.qte, self.now);
        match press {
            PressOutcome::Resolved(outcome) => self.resolve_qte(outcome, self.now),
            PressOutcome::Rejected(reason) => self.emit(BattleEvent::InputRejected { reason }),
        }
        press
    }

    pub(super) fn begin_player_turn(&mut self) {
        self.player.stamina_mut().restore_to_max();
        self.gate.set_permission(InputPermission::PlayerTurn);
        tracing::debug!(stamina = self.player.stamina().current(), "player turn");
        self.emit(BattleEvent::TurnStarted { side: Side::Player });
    }

    pub(super) fn perform_action(&mut self, kind: ActionKind, at: Millis) {
        if kind == ActionKind::EndTurn {
            self.end_player_turn(at);
            return;
        }
        let (Some(spec), Some(executing)) = (self.config.actions.get(kind).copied(), kind.executing_state())
        else {
            tracing::warn!(%kind, "no action data for combat action");
            return;
        };

        let available = self.player.stamina().current();
        if !self.player.stamina_mut().consume(spec.stamina_cost) {
            tracing::debug!(%kind, required = spec.stamina_cost, available, "not enough stamina");
            self.emit(BattleEvent::InsufficientStamina {
                kind,
                required: spec.stamina_cost,
                available,
            });
            return;
        }

        self.gate.set_permission(InputPermission::ExecutingAction);
        self.turns.change_player_turn_state(executing);
        self.active_action = Some(kind);
        tracing::debug!(%kind, cost = spec.stamina_cost, "action started");
        self.emit(BattleEvent::ActionStarted {
            kind,
            stamina_spent: spec.stamina_cost,
        });

        let task = if spec.qte.is_some() {
            BattleTask::OpenQte { kind }
        } else {
            BattleTask::PlayerHit { kind }
        };
        self.scheduler
            .schedule_after(at, self.config.player_timing.hit_delay, task);
    }

    /// Hit frame of an action without a QTE.
    pub(super) fn land_player_hit(&mut self, kind: ActionKind, at: Millis) {
        let damage = self.config.actions.get(kind).map_or(0, |spec| spec.damage);
        self.deal_damage(Side::Enemy, damage, DamageSource::Action(kind));
        self.schedule_action_complete(at);
    }

    pub(super) fn open_qte(&mut self, kind: ActionKind, at: Millis) {
        if !self.qte.open(at) {
            return;
        }
        self.gate.set_qte_window_active(true);
        self.turns
            .change_player_turn_state(PlayerTurnState::WaitingForInput);
        self.feedback.show_prompt(WindowKind::Qte);
        tracing::debug!(%kind, at = %at, "qte window opened");
        self.emit(BattleEvent::WindowOpened {
            kind: WindowKind::Qte,
            at,
        });
    }

    /// Applies the QTE outcome to the running action's damage.
    pub(super) fn resolve_qte(&mut self, outcome: WindowOutcome, at: Millis) {
        self.gate.set_qte_window_active(false);
        self.restore_permission_after_window(InputPermission::ExecutingAction);
        self.feedback.hide_prompt();
        self.emit(BattleEvent::QteResolved { outcome });

        let Some(kind) = self.active_action else {
            tracing::warn!(?outcome, "qte resolved without an active action");
            return;
        };
        if let Some(executing) = kind.executing_state() {
            self.turns.change_player_turn_state(executing);
        }

        let Some(spec) = self.config.actions.get(kind).copied() else {
            return;
        };
        let percent = match (outcome, spec.qte) {
            (WindowOutcome::Success { perfect: true }, Some(bonus)) => {
                self.feedback.haptic(HapticPulse::Strong);
                bonus.perfect_percent
            }
            (WindowOutcome::Success { perfect: false }, Some(bonus)) => {
                self.feedback.haptic(HapticPulse::Light);
                bonus.success_percent
            }
            _ => 100,
        };
        let damage = spec.damage.saturating_mul(percent) / 100;
        tracing::debug!(%kind, ?outcome, percent, damage, "qte applied");

        self.deal_damage(Side::Enemy, damage, DamageSource::Action(kind));
        self.schedule_action_complete(at);
    }

    /// End of the action's recovery. Hands control back to the player or
    /// starts the queued action.
    pub(super) fn complete_action(&mut self, at: Millis) {
        let Some(kind) = self.active_action.take() else {
            return;
        };
        if self.enemy.as_ref().is_some_and(|enemy| !enemy.is_alive()) {
            self.check_deaths();
            return;
        }

        self.gate.set_permission(InputPermission::PlayerTurn);
        self.turns
            .change_player_turn_state(PlayerTurnState::SelectingAction);
        self.emit(BattleEvent::ActionCompleted { kind });

        if let Some(next) = self.queued_action.take() {
            tracing::debug!(%next, "running queued action");
            self.perform_action(next, at);
        }
    }

    pub(super) fn end_player_turn(&mut self, at: Millis) {
        self.queued_action = None;
        if self.turns.end_player_turn() {
            self.begin_enemy_turn(at);
        }
    }

    fn schedule_action_complete(&mut self, at: Millis) {
        if self.state().is_in_progress() {
            self.scheduler.schedule_after(
                at,
                self.config.player_timing.recovery,
                BattleTask::ActionComplete,
            );
        }
    }
}
