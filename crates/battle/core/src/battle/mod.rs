//! Battle orchestrator.
//!
//! [`Battle`] is the only component with business logic. It owns the turn
//! state machine, the input gate, both timing windows and the combatants,
//! and wires them together with direct calls. It is the sole writer of
//! [`BattleResult`] and the sole caller of [`InputGate::set_permission`].
//!
//! Time only moves when the host calls [`Battle::tick`] (or one of the
//! `request_*` methods) with the current battle clock. Delayed steps such as
//! the counter-attack are queued on an internal [`Scheduler`] and run from
//! `tick`, in due-time order, interleaved with window timeouts. The outcome
//! of an encounter therefore does not depend on the host's frame length.
//!
//! Subscribers attached through [`Battle::subscribe`] (or the component
//! signals exposed by the accessors) are notified synchronously. Callbacks
//! must not call back into the battle.

mod builder;
mod enemy;
mod player;
mod tasks;

use core::fmt;

pub use builder::BattleBuilder;

use crate::action::ActionKind;
use crate::capabilities::{BattleFeedback, EnemyBrain, EnemyIntent};
use crate::combatant::{Combatant, CombatantSnapshot, DamageReport, Side};
use crate::config::BattleConfig;
use crate::error::BattleSetupError;
use crate::input::{InputGate, InputPermission, RejectReason};
use crate::notify::{Signal, Subscription};
use crate::scheduler::Scheduler;
use crate::time::Millis;
use crate::turn::{BattleState, EnemyTurnState, PlayerTurnState, TurnStateMachine};
use crate::window::{TimingWindow, WindowKind, WindowOutcome};

use tasks::BattleTask;

/// Outcome of an encounter. Set exactly once per encounter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum BattleResult {
    #[default]
    None,
    PlayerVictory,
    PlayerDefeated,
}

/// What caused a [`BattleEvent::DamageDealt`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DamageSource {
    Action(ActionKind),
    EnemyAttack,
    Counter,
    /// Damage applied by a host through [`Battle::damage_combatant`].
    External,
}

/// Orchestrator-level notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "event", rename_all = "snake_case")
)]
pub enum BattleEvent {
    BattleStarted {
        encounter: u32,
    },
    TurnStarted {
        side: Side,
    },
    ActionStarted {
        kind: ActionKind,
        stamina_spent: u32,
    },
    /// One action accepted while another was executing; it runs next.
    ActionQueued {
        kind: ActionKind,
    },
    InsufficientStamina {
        kind: ActionKind,
        required: u32,
        available: u32,
    },
    InputRejected {
        reason: RejectReason,
    },
    WindowOpened {
        kind: WindowKind,
        at: Millis,
    },
    QteResolved {
        outcome: WindowOutcome,
    },
    ParryResolved {
        outcome: WindowOutcome,
    },
    StaminaRewarded {
        amount: u32,
        perfect: bool,
    },
    CounterAttackQueued {
        at: Millis,
    },
    DamageDealt {
        target: Side,
        source: DamageSource,
        amount: u32,
        remaining: u32,
    },
    ActionCompleted {
        kind: ActionKind,
    },
    EnemyThinking,
    EnemyAttackStarted {
        damage: u32,
    },
    EnemyExhausted {
        required: u32,
        available: u32,
    },
    CombatantDefeated {
        side: Side,
    },
    BattleEnded {
        result: BattleResult,
    },
    BattleReset,
}

/// Read-only view of the whole battle for UI collaborators.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSnapshot {
    pub now: Millis,
    pub encounter: u32,
    pub state: BattleState,
    pub player_turn_state: Option<PlayerTurnState>,
    pub enemy_turn_state: Option<EnemyTurnState>,
    pub permission: InputPermission,
    pub result: BattleResult,
    pub parry_open: bool,
    pub qte_open: bool,
    pub player: CombatantSnapshot,
    pub enemy: Option<CombatantSnapshot>,
}

pub struct Battle {
    config: BattleConfig,
    turns: TurnStateMachine,
    gate: InputGate,
    parry: TimingWindow,
    qte: TimingWindow,
    player: Combatant,
    enemy: Option<Combatant>,
    scheduler: Scheduler<BattleTask>,
    result: BattleResult,
    active_action: Option<ActionKind>,
    queued_action: Option<ActionKind>,
    pending_attack: Option<EnemyIntent>,
    feedback: Box<dyn BattleFeedback>,
    brain: Box<dyn EnemyBrain>,
    events: Signal<BattleEvent>,
    now: Millis,
    encounter: u32,
}

impl Battle {
    pub fn builder() -> BattleBuilder {
        BattleBuilder::new()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn state(&self) -> BattleState {
        self.turns.battle_state()
    }

    pub fn player_turn_state(&self) -> Option<PlayerTurnState> {
        self.turns.player_turn_state()
    }

    pub fn enemy_turn_state(&self) -> Option<EnemyTurnState> {
        self.turns.enemy_turn_state()
    }

    pub fn permission(&self) -> InputPermission {
        self.gate.permission()
    }

    pub fn result(&self) -> BattleResult {
        self.result
    }

    /// Latest battle clock value seen.
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Number of encounters started on this instance.
    pub fn encounter(&self) -> u32 {
        self.encounter
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn enemy(&self) -> Option<&Combatant> {
        self.enemy.as_ref()
    }

    pub fn combatant(&self, side: Side) -> Option<&Combatant> {
        match side {
            Side::Player => Some(&self.player),
            Side::Enemy => self.enemy.as_ref(),
        }
    }

    pub fn turns(&self) -> &TurnStateMachine {
        &self.turns
    }

    pub fn input(&self) -> &InputGate {
        &self.gate
    }

    pub fn window(&self, kind: WindowKind) -> &TimingWindow {
        match kind {
            WindowKind::Parry => &self.parry,
            WindowKind::Qte => &self.qte,
        }
    }

    /// True if the player can currently afford `kind`.
    pub fn can_perform_action(&self, kind: ActionKind) -> bool {
        self.player
            .stamina()
            .has_enough(self.config.actions.cost_of(kind))
    }

    /// Action waiting for the current one to complete.
    pub fn queued_action(&self) -> Option<ActionKind> {
        self.queued_action
    }

    /// Number of delayed steps still pending.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Earliest time at which [`Battle::tick`] has work to do.
    pub fn next_wakeup(&self) -> Option<Millis> {
        [
            self.scheduler.next_due(),
            self.parry.deadline(),
            self.qte.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            now: self.now,
            encounter: self.encounter,
            state: self.state(),
            player_turn_state: self.player_turn_state(),
            enemy_turn_state: self.enemy_turn_state(),
            permission: self.permission(),
            result: self.result,
            parry_open: self.parry.is_open(),
            qte_open: self.qte.is_open(),
            player: self.player.snapshot(),
            enemy: self.enemy.as_ref().map(Combatant::snapshot),
        }
    }

    pub fn subscribe(&self, callback: impl FnMut(&BattleEvent) + 'static) -> Subscription {
        self.events.subscribe(callback)
    }

    pub fn on_event(&self) -> &Signal<BattleEvent> {
        &self.events
    }

    // ========================================================================
    // Encounter lifecycle
    // ========================================================================

    /// Sets the opponent for the next encounter, returning the previous one.
    pub fn assign_enemy(&mut self, enemy: Combatant) -> Result<Option<Combatant>, BattleSetupError> {
        self.ensure_idle("assign an enemy")?;
        if enemy.side() != Side::Enemy {
            tracing::warn!(name = enemy.name(), side = %enemy.side(), "assigned enemy fights on the wrong side");
        }
        Ok(self.enemy.replace(enemy))
    }

    /// Removes the opponent once its actor leaves the scene.
    pub fn release_enemy(&mut self) -> Result<Option<Combatant>, BattleSetupError> {
        self.ensure_idle("release the enemy")?;
        Ok(self.enemy.take())
    }

    /// Starts an encounter at `now` and hands the first turn to the player.
    ///
    /// Without an assigned enemy the call is aborted and nothing changes.
    /// Starting from `BattleEnd` first performs [`Battle::force_reset`].
    pub fn initialize_battle(&mut self, now: Millis) -> Result<(), BattleSetupError> {
        self.ensure_idle("initialize the battle")?;
        let Some(enemy) = self.enemy.as_mut() else {
            tracing::error!("cannot initialize battle: no enemy assigned");
            return Err(BattleSetupError::MissingEnemy);
        };
        enemy.reset_for_battle();

        if self.state() != BattleState::BattleStart {
            self.force_reset();
        }

        self.advance(now);
        self.encounter += 1;
        self.result = BattleResult::None;
        self.player.reset_for_battle();

        tracing::info!(
            encounter = self.encounter,
            player = self.player.name(),
            enemy = self.enemy.as_ref().map(Combatant::name).unwrap_or_default(),
            at = %self.now,
            "battle started"
        );
        self.emit(BattleEvent::BattleStarted {
            encounter: self.encounter,
        });

        self.turns.change_battle_state(BattleState::PlayerTurn);
        self.begin_player_turn();
        Ok(())
    }

    /// Returns to the pre-battle state from anywhere: windows cancelled,
    /// pending steps dropped, permission disabled, result cleared.
    /// Combatant health is left alone; the next encounter restores it.
    pub fn force_reset(&mut self) {
        self.teardown();
        self.turns.reset();
        self.result = BattleResult::None;
        tracing::info!(encounter = self.encounter, "battle reset");
        self.emit(BattleEvent::BattleReset);
    }

    /// Advances the battle clock to `now`, resolving window timeouts and
    /// due steps in chronological order.
    pub fn tick(&mut self, now: Millis) {
        self.advance(now);

        while self.state().is_in_progress() {
            let window_due = [self.qte.deadline(), self.parry.deadline()]
                .into_iter()
                .flatten()
                .filter(|deadline| *deadline <= now)
                .min();
            let task_due = self.scheduler.next_due().filter(|at| *at <= now);

            match (window_due, task_due) {
                (Some(deadline), task) if task.is_none_or(|at| deadline <= at) => {
                    self.expire_windows(deadline);
                }
                (_, Some(_)) => {
                    if let Some(due) = self.scheduler.pop_due(now) {
                        self.run_task(due);
                    }
                }
                _ => break,
            }
        }

        self.check_deaths();
    }

    /// Applies `amount` damage to `side` on behalf of the host.
    pub fn damage_combatant(&mut self, side: Side, amount: u32, now: Millis) -> Option<DamageReport> {
        self.advance(now);
        self.deal_damage(side, amount, DamageSource::External)
    }

    // ========================================================================
    // Internals shared by the player and enemy flows
    // ========================================================================

    fn ensure_idle(&self, operation: &'static str) -> Result<(), BattleSetupError> {
        let state = self.state();
        if state.is_in_progress() {
            tracing::warn!(state = %state, "cannot {operation} during a battle");
            return Err(BattleSetupError::InProgress { operation, state });
        }
        Ok(())
    }

    fn advance(&mut self, now: Millis) {
        if now < self.now {
            tracing::debug!(now = %now, clock = %self.now, "ignoring clock value from the past");
            return;
        }
        self.now = now;
    }

    fn emit(&self, event: BattleEvent) {
        tracing::trace!(?event, "battle event");
        self.events.emit(&event);
    }

    fn combatant_mut(&mut self, side: Side) -> Option<&mut Combatant> {
        match side {
            Side::Player => Some(&mut self.player),
            Side::Enemy => self.enemy.as_mut(),
        }
    }

    fn expire_windows(&mut self, at: Millis) {
        if let Some(outcome) = self.qte.tick(at) {
            self.resolve_qte(outcome, at);
        }
        if let Some(outcome) = self.parry.tick(at) {
            self.resolve_parry(outcome, at);
        }
    }

    /// Restores the permission that was active before the last window opened.
    fn restore_permission_after_window(&mut self, fallback: InputPermission) {
        let previous = self.gate.permission_before_window().unwrap_or(fallback);
        self.gate.set_permission(previous);
    }

    fn deal_damage(&mut self, target: Side, amount: u32, source: DamageSource) -> Option<DamageReport> {
        let Some(combatant) = self.combatant_mut(target) else {
            tracing::debug!(%target, "damage ignored: no such combatant");
            return None;
        };

        let report = combatant.take_damage(amount);
        tracing::debug!(%target, ?source, applied = report.applied, remaining = report.health_after, "damage dealt");
        self.emit(BattleEvent::DamageDealt {
            target,
            source,
            amount: report.applied,
            remaining: report.health_after,
        });
        if report.is_lethal() {
            self.emit(BattleEvent::CombatantDefeated { side: target });
        }

        self.check_deaths();
        Some(report)
    }

    /// Ends the encounter if either side is dead. The player is checked first.
    fn check_deaths(&mut self) {
        if !self.state().is_in_progress() {
            return;
        }

        if !self.player.is_alive() {
            self.conclude(BattleResult::PlayerDefeated);
        } else if self.enemy.as_ref().is_some_and(|enemy| !enemy.is_alive()) {
            self.feedback.play_victory();
            self.conclude(BattleResult::PlayerVictory);
        }
    }

    fn conclude(&mut self, result: BattleResult) {
        self.result = result;
        self.turns.change_battle_state(BattleState::BattleEnd);
        self.teardown();

        tracing::info!(encounter = self.encounter, %result, at = %self.now, "battle ended");
        self.emit(BattleEvent::BattleEnded { result });
    }

    fn teardown(&mut self) {
        let had_prompt = self.parry.cancel() | self.qte.cancel();
        if had_prompt {
            self.feedback.hide_prompt();
        }

        self.gate.reset();
        self.scheduler.cancel_all();
        self.active_action = None;
        self.queued_action = None;
        self.pending_attack = None;
    }
}

impl fmt::Debug for Battle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Battle")
            .field("encounter", &self.encounter)
            .field("now", &self.now)
            .field("state", &self.state())
            .field("permission", &self.permission())
            .field("result", &self.result)
            .field("player", &self.player)
            .field("enemy", &self.enemy)
            .field("pending_tasks", &self.scheduler.len())
            .finish_non_exhaustive()
    }
}
