//! Validate a content directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use battle_content::ContentFactory;
use battle_runtime::Scenario;
use clap::Parser;
use console::style;

use crate::dirs;

/// Load and validate battle tuning, the roster and every scenario
#[derive(Parser, Debug)]
pub struct Check {
    /// Content directory (defaults to $BATTLE_DATA_DIR or the shipped data)
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

impl Check {
    pub fn execute(self) -> Result<()> {
        let factory = ContentFactory::new(dirs::data_dir(self.data_dir));
        println!("Checking {}", factory.data_dir().display());

        let config = factory.load_config()?;
        println!(
            "{} battle.toml: parry {} / qte {}, counter {} damage",
            style("✓").green().bold(),
            config.parry.duration,
            config.qte.duration,
            config.counter.damage
        );

        let roster = factory.load_roster()?;
        println!(
            "{} roster.ron: {}",
            style("✓").green().bold(),
            roster.ids().collect::<Vec<_>>().join(", ")
        );

        let scenario_dir = factory.data_dir().join("scenarios");
        let mut entries = std::fs::read_dir(&scenario_dir)
            .with_context(|| format!("Failed to list {}", scenario_dir.display()))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
            .collect::<Vec<_>>();
        entries.sort();

        for path in entries {
            let scenario = Scenario::load_from_file(&path)?;
            let missing = scenario
                .combatant_ids()
                .filter(|id| roster.get(id).is_none())
                .collect::<Vec<_>>();
            if !missing.is_empty() {
                anyhow::bail!(
                    "scenario '{}' references unknown combatants: {}",
                    scenario.name,
                    missing.join(", ")
                );
            }
            println!(
                "{} {}: {} encounters",
                style("✓").green().bold(),
                path.display(),
                scenario.encounters.len()
            );
        }

        Ok(())
    }
}
