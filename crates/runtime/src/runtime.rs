//! High-level runtime orchestrator.
//!
//! The runtime owns a [`Battle`] and its clock, and plays the host role the
//! combat core expects: it polls an [`InputProvider`] for presses, routes
//! them through the battle's request API and ticks the battle forward one
//! frame at a time. Frames are shortened to land exactly on the battle's
//! next wake-up, so recorded event times are exact.

use core::fmt;

use battle_content::Roster;
use battle_core::{
    Battle, BattleBuilder, BattleConfig, BattleFeedback, Combatant, EnemyBrain, Millis, Side,
};

use crate::api::{InputProvider, Press, Result, RuntimeError};
use crate::config::RuntimeConfig;
use crate::events::{CampaignReport, EncounterReport, EventRecorder};
use crate::feedback::TraceFeedback;
use crate::scenario::Scenario;

/// Drives encounters on a single battle instance.
pub struct Runtime {
    config: RuntimeConfig,
    battle: Battle,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn battle(&self) -> &Battle {
        &self.battle
    }

    /// Direct access for hosts that tick the battle themselves.
    pub fn battle_mut(&mut self) -> &mut Battle {
        &mut self.battle
    }

    /// Assigns `enemy` and starts an encounter at the current battle time.
    pub fn begin_encounter(&mut self, enemy: Combatant) -> Result<EncounterSession<'_>> {
        let name = enemy.name().to_string();
        self.battle.assign_enemy(enemy)?;

        let recorder = EventRecorder::attach(&self.battle);
        let started_at = self.battle.now();
        if let Err(e) = self.battle.initialize_battle(started_at) {
            self.battle.release_enemy()?;
            return Err(e.into());
        }

        Ok(EncounterSession {
            runtime: self,
            recorder,
            enemy: name,
            started_at,
        })
    }

    /// Plays one encounter to completion with `provider` supplying presses.
    pub fn run_encounter(
        &mut self,
        enemy: Combatant,
        provider: &mut dyn InputProvider,
    ) -> Result<EncounterReport> {
        let mut session = self.begin_encounter(enemy)?;
        loop {
            match session.step(provider) {
                Ok(true) => {}
                Ok(false) => return session.finish(),
                Err(e) => {
                    session.abort()?;
                    return Err(e);
                }
            }
        }
    }

    /// Plays the scenario's encounters in order, stopping at the first
    /// defeat.
    ///
    /// Every enemy id is resolved against `roster` before the first fight.
    pub fn run_campaign(&mut self, scenario: &Scenario, roster: &Roster) -> Result<CampaignReport> {
        scenario.validate()?;
        let enemies = scenario
            .encounters
            .iter()
            .map(|spec| {
                roster
                    .spawn(&spec.enemy, Side::Enemy)
                    .ok_or_else(|| RuntimeError::UnknownCombatant {
                        id: spec.enemy.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            scenario = %scenario.name,
            encounters = enemies.len(),
            "campaign started"
        );

        let mut campaign = CampaignReport::new(scenario.name.clone());
        for (spec, enemy) in scenario.encounters.iter().zip(enemies) {
            let mut provider = spec.provider();
            let report = self.run_encounter(enemy, &mut provider)?;
            let defeated = !report.is_victory();
            campaign.push(report);

            if defeated {
                tracing::info!(enemy = %spec.enemy, "campaign lost");
                break;
            }
        }

        tracing::info!(
            scenario = %scenario.name,
            won = campaign.victories(),
            played = campaign.encounters.len(),
            "campaign finished"
        );
        Ok(campaign)
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("battle", &self.battle)
            .finish()
    }
}

/// An encounter in progress.
///
/// Obtained from [`Runtime::begin_encounter`]; consume it with
/// [`EncounterSession::finish`] once [`EncounterSession::step`] reports the
/// battle is over, or [`EncounterSession::abort`] to walk away early.
pub struct EncounterSession<'a> {
    runtime: &'a mut Runtime,
    recorder: EventRecorder,
    enemy: String,
    started_at: Millis,
}

impl EncounterSession<'_> {
    pub fn battle(&self) -> &Battle {
        &self.runtime.battle
    }

    pub fn recorder(&self) -> &EventRecorder {
        &self.recorder
    }

    pub fn is_running(&self) -> bool {
        self.runtime.battle.state().is_in_progress()
    }

    /// Runs one frame. Returns `false` once the encounter has ended.
    pub fn step(&mut self, provider: &mut dyn InputProvider) -> Result<bool> {
        let limit = self.runtime.battle.now() + self.frame();
        self.step_within(provider, limit)
    }

    /// Runs frames until the battle clock reaches `until` or the encounter
    /// ends. Used by hosts pacing the battle against a wall clock.
    pub fn advance_to(&mut self, provider: &mut dyn InputProvider, until: Millis) -> Result<bool> {
        loop {
            let limit = until.min(self.runtime.battle.now() + self.frame());
            if !self.step_within(provider, limit)? {
                return Ok(false);
            }
            if self.runtime.battle.now() >= until {
                return Ok(true);
            }
        }
    }

    fn frame(&self) -> Millis {
        self.runtime.config.frame.max(Millis(1))
    }

    fn step_within(&mut self, provider: &mut dyn InputProvider, limit: Millis) -> Result<bool> {
        let battle = &mut self.runtime.battle;
        let now = battle.now();
        self.recorder.stamp(now);

        for _ in 0..self.runtime.config.max_presses_per_frame {
            let Some(press) = provider.poll(battle) else {
                break;
            };
            dispatch(battle, press, now);
            if !battle.state().is_in_progress() {
                break;
            }
        }
        battle.tick(now);
        if !battle.state().is_in_progress() {
            return Ok(false);
        }

        let elapsed = now - self.started_at;
        if elapsed >= self.runtime.config.max_encounter {
            tracing::warn!(elapsed = %elapsed, enemy = %self.enemy, "encounter timed out");
            return Err(RuntimeError::EncounterTimeout {
                encounter: battle.encounter(),
                limit: self.runtime.config.max_encounter,
            });
        }

        let target = [battle.next_wakeup(), provider.wake_at(battle)]
            .into_iter()
            .flatten()
            .filter(|at| *at > now)
            .fold(limit.max(now), Millis::min);

        self.recorder.stamp(target);
        battle.tick(target);
        Ok(battle.state().is_in_progress())
    }

    /// Summarises the encounter and frees the battle for the next one.
    pub fn finish(self) -> Result<EncounterReport> {
        let battle = &mut self.runtime.battle;
        let mut report = EncounterReport::from_events(
            battle.encounter(),
            self.enemy,
            self.started_at,
            battle.now(),
            self.recorder.drain(),
        );
        report.player_health = battle.player().health();
        report.enemy_health = battle.enemy().map(Combatant::health).unwrap_or_default();
        if report.result != battle.result() {
            tracing::warn!(recorded = %report.result, actual = %battle.result(), "result mismatch");
            report.result = battle.result();
        }

        drop(self.recorder);
        battle.force_reset();
        battle.release_enemy()?;

        tracing::info!(
            encounter = report.encounter,
            enemy = %report.enemy,
            result = %report.result,
            duration = %report.duration,
            "encounter finished"
        );
        Ok(report)
    }

    /// Abandons the encounter without a report.
    pub fn abort(self) -> Result<()> {
        let battle = &mut self.runtime.battle;
        drop(self.recorder);
        tracing::info!(encounter = battle.encounter(), enemy = %self.enemy, "encounter aborted");
        battle.force_reset();
        battle.release_enemy()?;
        Ok(())
    }
}

impl fmt::Debug for EncounterSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncounterSession")
            .field("enemy", &self.enemy)
            .field("started_at", &self.started_at)
            .field("recorded", &self.recorder.len())
            .finish()
    }
}

fn dispatch(battle: &mut Battle, press: Press, now: Millis) {
    tracing::trace!(?press, at = %now, "press");
    match press {
        Press::Action(kind) => {
            let _ = battle.request_action(kind, now);
        }
        Press::Parry => {
            let _ = battle.request_parry(now);
        }
        Press::Qte => {
            let _ = battle.request_qte(now);
        }
    }
}

/// Builder for [`Runtime`] with flexible configuration.
///
/// Only the player is required. Feedback defaults to [`TraceFeedback`] and
/// the enemy brain to the battle's own default.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    battle: BattleBuilder,
    battle_config: BattleConfig,
    has_player: bool,
    has_feedback: bool,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            battle: Battle::builder(),
            battle_config: BattleConfig::default(),
            has_player: false,
            has_feedback: false,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Override battle tuning
    pub fn battle_config(mut self, config: BattleConfig) -> Self {
        self.battle_config = config;
        self
    }

    pub fn player(mut self, player: Combatant) -> Self {
        self.battle = self.battle.player(player);
        self.has_player = true;
        self
    }

    /// Spawns the player from `roster`.
    pub fn player_from(self, roster: &Roster, id: &str) -> Result<Self> {
        let player = roster
            .spawn(id, Side::Player)
            .ok_or_else(|| RuntimeError::UnknownCombatant { id: id.to_string() })?;
        Ok(self.player(player))
    }

    pub fn feedback(mut self, feedback: impl BattleFeedback + 'static) -> Self {
        self.battle = self.battle.feedback(feedback);
        self.has_feedback = true;
        self
    }

    pub fn brain(mut self, brain: impl EnemyBrain + 'static) -> Self {
        self.battle = self.battle.brain(brain);
        self
    }

    pub fn build(self) -> Result<Runtime> {
        if !self.has_player {
            return Err(RuntimeError::MissingPlayer);
        }

        let mut battle = self.battle.config(self.battle_config);
        if !self.has_feedback {
            battle = battle.feedback(TraceFeedback);
        }

        Ok(Runtime {
            config: self.config,
            battle: battle.build()?,
        })
    }
}
