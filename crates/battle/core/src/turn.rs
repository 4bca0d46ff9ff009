//! Battle and turn state machine.
//!
//! [`TurnStateMachine`] is a pure state holder: it tracks the battle phase and
//! the sub-state of whichever side is acting, guards transitions, and
//! notifies subscribers. It never decides *when* to transition; the
//! orchestrator does.
//!
//! Legal battle-state edges:
//!
//! ```text
//! BattleStart ─▶ PlayerTurn ◀─▶ EnemyTurn
//!      │              │             │
//!      └──────────────┴─────────────┴──▶ BattleEnd
//! ```
//!
//! `BattleEnd` is left only through [`TurnStateMachine::reset`].

use crate::notify::{Signal, Subscription};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum BattleState {
    #[default]
    BattleStart,
    PlayerTurn,
    EnemyTurn,
    BattleEnd,
}

impl BattleState {
    pub const fn can_transition_to(self, next: BattleState) -> bool {
        use BattleState::*;

        matches!(
            (self, next),
            (BattleStart, PlayerTurn)
                | (PlayerTurn, EnemyTurn)
                | (EnemyTurn, PlayerTurn)
                | (BattleStart | PlayerTurn | EnemyTurn, BattleEnd)
        )
    }

    pub const fn is_in_progress(self) -> bool {
        matches!(self, BattleState::PlayerTurn | BattleState::EnemyTurn)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum PlayerTurnState {
    #[default]
    SelectingAction,
    ExecutingAttack,
    ExecutingSkill,
    WaitingForInput,
    TurnEnd,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum EnemyTurnState {
    #[default]
    Thinking,
    Attacking,
    TurnEnd,
}

/// Transition notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TurnEvent {
    BattleStateChanged {
        from: BattleState,
        to: BattleState,
    },
    PlayerTurnStateChanged {
        from: PlayerTurnState,
        to: PlayerTurnState,
    },
    EnemyTurnStateChanged {
        from: EnemyTurnState,
        to: EnemyTurnState,
    },
}

#[derive(Debug, Default)]
pub struct TurnStateMachine {
    battle: BattleState,
    player: PlayerTurnState,
    enemy: EnemyTurnState,
    events: Signal<TurnEvent>,
}

impl TurnStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn battle_state(&self) -> BattleState {
        self.battle
    }

    /// Player sub-state, meaningful only during the player's turn.
    pub fn player_turn_state(&self) -> Option<PlayerTurnState> {
        (self.battle == BattleState::PlayerTurn).then_some(self.player)
    }

    /// Enemy sub-state, meaningful only during the enemy's turn.
    pub fn enemy_turn_state(&self) -> Option<EnemyTurnState> {
        (self.battle == BattleState::EnemyTurn).then_some(self.enemy)
    }

    /// Moves to `next`. Returns true if the state changed.
    ///
    /// Unchanged targets are a silent no-op; illegal edges are rejected and
    /// logged. Entering a turn initializes that side's sub-state.
    pub fn change_battle_state(&mut self, next: BattleState) -> bool {
        let from = self.battle;
        if from == next {
            return false;
        }
        if !from.can_transition_to(next) {
            tracing::warn!(%from, to = %next, "illegal battle state transition rejected");
            return false;
        }

        self.battle = next;
        tracing::debug!(%from, to = %next, "battle state changed");
        self.events
            .emit(&TurnEvent::BattleStateChanged { from, to: next });

        match next {
            BattleState::PlayerTurn => {
                self.change_player_turn_state(PlayerTurnState::SelectingAction);
            }
            BattleState::EnemyTurn => {
                self.change_enemy_turn_state(EnemyTurnState::Thinking);
            }
            BattleState::BattleStart | BattleState::BattleEnd => {}
        }

        true
    }

    pub fn change_player_turn_state(&mut self, next: PlayerTurnState) -> bool {
        let from = self.player;
        if from == next {
            return false;
        }

        self.player = next;
        self.events
            .emit(&TurnEvent::PlayerTurnStateChanged { from, to: next });
        true
    }

    pub fn change_enemy_turn_state(&mut self, next: EnemyTurnState) -> bool {
        let from = self.enemy;
        if from == next {
            return false;
        }

        self.enemy = next;
        self.events
            .emit(&TurnEvent::EnemyTurnStateChanged { from, to: next });
        true
    }

    /// PlayerTurn → EnemyTurn. Returns false outside the player's turn.
    pub fn end_player_turn(&mut self) -> bool {
        if self.battle != BattleState::PlayerTurn {
            tracing::debug!(state = %self.battle, "end_player_turn outside player turn");
            return false;
        }

        self.change_player_turn_state(PlayerTurnState::TurnEnd);
        self.change_battle_state(BattleState::EnemyTurn)
    }

    /// EnemyTurn → PlayerTurn. Returns false outside the enemy's turn.
    pub fn end_enemy_turn(&mut self) -> bool {
        if self.battle != BattleState::EnemyTurn {
            tracing::debug!(state = %self.battle, "end_enemy_turn outside enemy turn");
            return false;
        }

        self.change_enemy_turn_state(EnemyTurnState::TurnEnd);
        self.change_battle_state(BattleState::PlayerTurn)
    }

    /// Returns to `BattleStart` from any state, notifying if it changed.
    pub fn reset(&mut self) {
        let from = self.battle;
        self.battle = BattleState::BattleStart;
        self.player = PlayerTurnState::default();
        self.enemy = EnemyTurnState::default();

        if from != BattleState::BattleStart {
            self.events.emit(&TurnEvent::BattleStateChanged {
                from,
                to: BattleState::BattleStart,
            });
        }
    }

    pub fn subscribe(&self, callback: impl FnMut(&TurnEvent) + 'static) -> Subscription {
        self.events.subscribe(callback)
    }

    pub fn on_event(&self) -> &Signal<TurnEvent> {
        &self.events
    }
}
