use core::fmt;

use battle_core::{
    BattleEvent, BattleResult, DamageSource, Millis, Side, WindowKind, WindowOutcome,
};
use serde::{Deserialize, Serialize};

use super::RecordedEvent;

/// Press results for one window kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowStats {
    pub opened: u32,
    pub perfect: u32,
    pub success: u32,
    pub failed: u32,
}

impl WindowStats {
    fn record(&mut self, outcome: WindowOutcome) {
        match outcome {
            WindowOutcome::Success { perfect: true } => self.perfect += 1,
            WindowOutcome::Success { perfect: false } => self.success += 1,
            WindowOutcome::Fail { .. } => self.failed += 1,
        }
    }

    /// Successful presses, perfect included.
    pub fn landed(&self) -> u32 {
        self.perfect + self.success
    }
}

impl fmt::Display for WindowStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} landed ({} perfect)",
            self.landed(),
            self.opened,
            self.perfect
        )
    }
}

/// Summary of a single encounter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterReport {
    pub encounter: u32,
    pub enemy: String,
    pub result: BattleResult,
    pub started_at: Millis,
    pub duration: Millis,
    pub player_health: u32,
    pub enemy_health: u32,
    pub player_turns: u32,
    pub enemy_turns: u32,
    pub parry: WindowStats,
    pub qte: WindowStats,
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub stamina_rewarded: u32,
    pub inputs_rejected: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<RecordedEvent>,
}

impl EncounterReport {
    /// Folds the recorded event stream into counters.
    ///
    /// Health and identity come from the caller since they are not fully
    /// described by events.
    pub fn from_events(
        encounter: u32,
        enemy: impl Into<String>,
        started_at: Millis,
        finished_at: Millis,
        events: Vec<RecordedEvent>,
    ) -> Self {
        let mut report = Self {
            encounter,
            enemy: enemy.into(),
            result: BattleResult::None,
            started_at,
            duration: finished_at - started_at,
            player_health: 0,
            enemy_health: 0,
            player_turns: 0,
            enemy_turns: 0,
            parry: WindowStats::default(),
            qte: WindowStats::default(),
            damage_dealt: 0,
            damage_taken: 0,
            stamina_rewarded: 0,
            inputs_rejected: 0,
            events: Vec::new(),
        };

        for recorded in &events {
            report.absorb(&recorded.event);
        }
        report.events = events;
        report
    }

    fn absorb(&mut self, event: &BattleEvent) {
        match *event {
            BattleEvent::TurnStarted { side: Side::Player } => self.player_turns += 1,
            BattleEvent::TurnStarted { side: Side::Enemy } => self.enemy_turns += 1,
            BattleEvent::WindowOpened { kind, .. } => match kind {
                WindowKind::Parry => self.parry.opened += 1,
                WindowKind::Qte => self.qte.opened += 1,
            },
            BattleEvent::ParryResolved { outcome } => self.parry.record(outcome),
            BattleEvent::QteResolved { outcome } => self.qte.record(outcome),
            BattleEvent::DamageDealt {
                target: Side::Enemy,
                source,
                amount,
                ..
            } if source != DamageSource::External => self.damage_dealt += amount,
            BattleEvent::DamageDealt {
                target: Side::Player,
                amount,
                ..
            } => self.damage_taken += amount,
            BattleEvent::StaminaRewarded { amount, .. } => self.stamina_rewarded += amount,
            BattleEvent::InputRejected { .. } | BattleEvent::InsufficientStamina { .. } => {
                self.inputs_rejected += 1
            }
            BattleEvent::BattleEnded { result } => self.result = result,
            _ => {}
        }
    }

    pub fn is_victory(&self) -> bool {
        self.result == BattleResult::PlayerVictory
    }

    /// Report without the raw event log.
    pub fn without_events(mut self) -> Self {
        self.events.clear();
        self
    }
}

impl fmt::Display for EncounterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Encounter #{} vs {}: {} after {}",
            self.encounter, self.enemy, self.result, self.duration
        )?;
        writeln!(
            f,
            "  health      player {} / enemy {}",
            self.player_health, self.enemy_health
        )?;
        writeln!(
            f,
            "  turns       player {} / enemy {}",
            self.player_turns, self.enemy_turns
        )?;
        writeln!(f, "  parry       {}", self.parry)?;
        writeln!(f, "  qte         {}", self.qte)?;
        writeln!(
            f,
            "  damage      dealt {} / taken {}",
            self.damage_dealt, self.damage_taken
        )?;
        write!(
            f,
            "  stamina     +{} from parries, {} rejected inputs",
            self.stamina_rewarded, self.inputs_rejected
        )
    }
}

/// Summary of a scenario run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignReport {
    pub scenario: String,
    pub encounters: Vec<EncounterReport>,
}

impl CampaignReport {
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            encounters: Vec::new(),
        }
    }

    pub fn push(&mut self, report: EncounterReport) {
        self.encounters.push(report);
    }

    pub fn victories(&self) -> usize {
        self.encounters.iter().filter(|r| r.is_victory()).count()
    }

    /// True if every encounter was won.
    pub fn cleared(&self) -> bool {
        !self.encounters.is_empty() && self.victories() == self.encounters.len()
    }

    /// Result of the final encounter played.
    pub fn outcome(&self) -> BattleResult {
        self.encounters
            .last()
            .map(|r| r.result)
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for CampaignReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Scenario '{}': {}/{} encounters won",
            self.scenario,
            self.victories(),
            self.encounters.len()
        )?;
        for report in &self.encounters {
            writeln!(f)?;
            writeln!(f, "{report}")?;
        }
        Ok(())
    }
}
