//! Play a scenario.
//!
//! By default encounters are simulated as fast as possible. With
//! `--realtime` the battle clock follows the wall clock and events are
//! printed as they happen.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use battle_content::{ContentFactory, Roster};
use battle_core::{Millis, Side};
use battle_runtime::{CampaignReport, Runtime, RuntimeConfig, Scenario};
use clap::Parser;
use console::style;
use tokio::time::MissedTickBehavior;

use crate::dirs;

/// Play a scenario and print the report
#[derive(Parser, Debug)]
pub struct Run {
    /// Scenario name under `scenarios/`, or a path to a RON file
    #[arg(value_name = "SCENARIO")]
    pub scenario: String,

    /// Content directory (defaults to $BATTLE_DATA_DIR or the shipped data)
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Include the full event log in the JSON report
    #[arg(long, requires = "json")]
    pub events: bool,

    /// Pace the battle clock against the wall clock
    #[arg(long)]
    pub realtime: bool,

    /// Frame length in milliseconds (overrides BATTLE_FRAME_MS)
    #[arg(long, value_name = "MS")]
    pub frame_ms: Option<u64>,
}

impl Run {
    pub async fn execute(self) -> Result<ExitCode> {
        let factory = ContentFactory::new(dirs::data_dir(self.data_dir.clone()));
        let battle_config = factory.load_config()?;
        let roster = factory.load_roster()?;
        let scenario = Scenario::load_from_file(&self.scenario_path(&factory))?;

        for id in scenario.combatant_ids() {
            if roster.get(id).is_none() {
                anyhow::bail!("scenario '{}' references unknown combatant '{}'", scenario.name, id);
            }
        }

        let mut config = RuntimeConfig::from_env();
        if let Some(frame) = self.frame_ms {
            config = config.with_frame(Millis(frame));
        }

        let mut runtime = Runtime::builder()
            .config(config)
            .battle_config(battle_config)
            .player_from(&roster, &scenario.player)?
            .build()?;

        tracing::info!(scenario = %scenario.name, realtime = self.realtime, "running scenario");
        let mut report = if self.realtime {
            run_realtime(&mut runtime, &scenario, &roster).await?
        } else {
            runtime.run_campaign(&scenario, &roster)?
        };

        if self.json {
            if !self.events {
                report.encounters = report
                    .encounters
                    .into_iter()
                    .map(|encounter| encounter.without_events())
                    .collect();
            }
            println!("{}", report.to_json()?);
        } else {
            print!("{report}");
            let verdict = if report.cleared() {
                style("cleared").green().bold()
            } else {
                style("failed").red().bold()
            };
            println!("\nScenario {verdict}");
        }

        Ok(if report.cleared() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    fn scenario_path(&self, factory: &ContentFactory) -> PathBuf {
        let candidate = Path::new(&self.scenario);
        if candidate.extension().is_some_and(|ext| ext == "ron") {
            candidate.to_path_buf()
        } else {
            factory.scenario_path(&self.scenario)
        }
    }
}

async fn run_realtime(
    runtime: &mut Runtime,
    scenario: &Scenario,
    roster: &Roster,
) -> Result<CampaignReport> {
    let frame = Duration::from_millis(runtime.config().frame.as_u64());
    let mut campaign = CampaignReport::new(scenario.name.clone());

    for spec in &scenario.encounters {
        let enemy = roster
            .spawn(&spec.enemy, Side::Enemy)
            .ok_or_else(|| anyhow!("enemy '{}' not found in roster", spec.enemy))?;
        let mut provider = spec.provider();
        let mut session = runtime.begin_encounter(enemy)?;

        let printer = session.battle().subscribe(|event| {
            if let Ok(line) = serde_json::to_string(event) {
                println!("{}", style(line).dim());
            }
        });

        let origin = session.battle().now();
        let wall = tokio::time::Instant::now();
        let mut interval = tokio::time::interval(frame);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let elapsed = u64::try_from(wall.elapsed().as_millis()).unwrap_or(u64::MAX);
            match session.advance_to(&mut provider, origin + Millis(elapsed)) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    session.abort()?;
                    return Err(e).context("encounter failed");
                }
            }
        }

        drop(printer);
        let report = session.finish()?;
        let won = report.is_victory();
        campaign.push(report);
        if !won {
            break;
        }
    }

    Ok(campaign)
}
