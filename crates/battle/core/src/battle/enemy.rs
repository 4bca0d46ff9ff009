//! Enemy turn: thinking, the attack, the parry window and the counter.

use super::{Battle, BattleEvent, BattleTask, DamageSource};
use crate::capabilities::HapticPulse;
use crate::combatant::Side;
use crate::input::{InputPermission, PressOutcome};
use crate::time::Millis;
use crate::turn::EnemyTurnState;
use crate::window::{WindowKind, WindowOutcome};

impl Battle {
    /// Timed press during the enemy's attack.
    pub fn request_parry(&mut self, now: Millis) -> PressOutcome {
        self.advance(now);

        let press = self.gate.request_parry(&mut self.parry, self.now);
        match press {
            PressOutcome::Resolved(outcome) => self.resolve_parry(outcome, self.now),
            PressOutcome::Rejected(reason) => self.emit(BattleEvent::InputRejected { reason }),
        }
        press
    }

    pub(super) fn begin_enemy_turn(&mut self, at: Millis) {
        if let Some(enemy) = self.enemy.as_mut() {
            enemy.stamina_mut().restore_to_max();
        }
        self.gate.set_permission(InputPermission::Disabled);
        self.emit(BattleEvent::TurnStarted { side: Side::Enemy });
        self.emit(BattleEvent::EnemyThinking);

        self.scheduler.schedule_after(
            at,
            self.config.enemy_timing.thinking,
            BattleTask::EnemyAttack,
        );
    }

    pub(super) fn start_enemy_attack(&mut self, at: Millis) {
        let Some(enemy) = self.enemy.as_ref() else {
            tracing::warn!("enemy turn without an enemy");
            return;
        };
        let intent = self.brain.decide(enemy, &self.player);

        let available = enemy.stamina().current();
        let paid = self
            .enemy
            .as_mut()
            .is_some_and(|enemy| enemy.stamina_mut().consume(intent.stamina_cost));
        if !paid {
            tracing::debug!(required = intent.stamina_cost, available, "enemy too exhausted to attack");
            self.emit(BattleEvent::EnemyExhausted {
                required: intent.stamina_cost,
                available,
            });
            self.schedule_end_enemy_turn(at, self.config.enemy_timing.recovery);
            return;
        }

        self.turns
            .change_enemy_turn_state(EnemyTurnState::Attacking);
        self.pending_attack = Some(intent);
        tracing::debug!(damage = intent.damage, "enemy attack started");
        self.emit(BattleEvent::EnemyAttackStarted {
            damage: intent.damage,
        });

        self.scheduler.schedule_after(
            at,
            self.config.enemy_timing.windup,
            BattleTask::OpenParry,
        );
    }

    pub(super) fn open_parry(&mut self, at: Millis) {
        if !self.parry.open(at) {
            return;
        }
        self.gate.set_parry_window_active(true);
        self.feedback.show_prompt(WindowKind::Parry);
        tracing::debug!(at = %at, "parry window opened");
        self.emit(BattleEvent::WindowOpened {
            kind: WindowKind::Parry,
            at,
        });
    }

    /// A successful parry negates the attack, rewards stamina and queues the
    /// counter. A failed one lets the attack land.
    pub(super) fn resolve_parry(&mut self, outcome: WindowOutcome, at: Millis) {
        self.gate.set_parry_window_active(false);
        self.restore_permission_after_window(InputPermission::Disabled);
        self.feedback.hide_prompt();
        self.emit(BattleEvent::ParryResolved { outcome });

        let attack = self.pending_attack.take();
        match outcome {
            WindowOutcome::Success { perfect } => {
                let reward = self.config.rewards.for_outcome(perfect);
                let gained = self.player.stamina_mut().add(reward);
                self.feedback.haptic(if perfect {
                    HapticPulse::Strong
                } else {
                    HapticPulse::Light
                });
                tracing::debug!(perfect, reward, gained, "parry succeeded");
                self.emit(BattleEvent::StaminaRewarded {
                    amount: gained,
                    perfect,
                });

                let counter_at = at + self.config.counter.delay;
                self.scheduler
                    .schedule_at(counter_at, BattleTask::CounterAttack);
                self.emit(BattleEvent::CounterAttackQueued { at: counter_at });
            }
            WindowOutcome::Fail { reason } => {
                tracing::debug!(%reason, "parry failed");
                if let Some(attack) = attack {
                    self.feedback.haptic(HapticPulse::Strong);
                    self.deal_damage(Side::Player, attack.damage, DamageSource::EnemyAttack);
                }
                self.schedule_end_enemy_turn(at, self.config.enemy_timing.recovery);
            }
        }
    }

    pub(super) fn land_counter_attack(&mut self, at: Millis) {
        self.deal_damage(Side::Enemy, self.config.counter.damage, DamageSource::Counter);
        self.schedule_end_enemy_turn(at, self.config.counter.recovery);
    }

    pub(super) fn end_enemy_turn(&mut self) {
        if self.turns.end_enemy_turn() {
            self.begin_player_turn();
        }
    }

    fn schedule_end_enemy_turn(&mut self, at: Millis, delay: Millis) {
        if self.state().is_in_progress() {
            self.scheduler
                .schedule_after(at, delay, BattleTask::EndEnemyTurn);
        }
    }
}
