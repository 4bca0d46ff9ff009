//! Battle participants.
//!
//! A [`Combatant`] exclusively owns its health and stamina; other components
//! change them only by calling its methods.

use crate::config::ConfigError;
use crate::notify::{Signal, Subscription};
use crate::stamina::StaminaResource;

/// Which side of the encounter a combatant fights on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Side {
    Player,
    Enemy,
}

/// Static description used to spawn a combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantSpec {
    pub name: String,
    pub max_health: u32,
    pub max_stamina: u32,
}

impl CombatantSpec {
    pub fn new(name: impl Into<String>, max_health: u32, max_stamina: u32) -> Self {
        Self {
            name: name.into(),
            max_health,
            max_stamina,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_health == 0 {
            return Err(ConfigError::ZeroHealth {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthChanged {
    pub side: Side,
    pub current: u32,
    pub max: u32,
}

/// What a call to [`Combatant::take_damage`] actually did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageReport {
    pub applied: u32,
    pub health_before: u32,
    pub health_after: u32,
}

impl DamageReport {
    /// True when this hit took the combatant from alive to dead.
    pub const fn is_lethal(&self) -> bool {
        self.health_before > 0 && self.health_after == 0
    }
}

/// Read-only view of a combatant for UI collaborators.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantSnapshot {
    pub side: Side,
    pub name: String,
    pub health: u32,
    pub max_health: u32,
    pub stamina: u32,
    pub max_stamina: u32,
}

#[derive(Debug)]
pub struct Combatant {
    side: Side,
    name: String,
    health: u32,
    max_health: u32,
    stamina: StaminaResource,
    health_changed: Signal<HealthChanged>,
}

impl Combatant {
    pub fn new(side: Side, name: impl Into<String>, max_health: u32, max_stamina: u32) -> Self {
        Self {
            side,
            name: name.into(),
            health: max_health,
            max_health,
            stamina: StaminaResource::new(max_stamina),
            health_changed: Signal::new(),
        }
    }

    pub fn from_spec(side: Side, spec: &CombatantSpec) -> Self {
        Self::new(side, spec.name.clone(), spec.max_health, spec.max_stamina)
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn stamina(&self) -> &StaminaResource {
        &self.stamina
    }

    pub fn stamina_mut(&mut self) -> &mut StaminaResource {
        &mut self.stamina
    }

    /// Reduces health by `amount`, never below zero.
    pub fn take_damage(&mut self, amount: u32) -> DamageReport {
        let health_before = self.health;
        self.health = self.health.saturating_sub(amount);

        let report = DamageReport {
            applied: health_before - self.health,
            health_before,
            health_after: self.health,
        };
        if report.applied > 0 {
            self.notify();
        }
        if report.is_lethal() {
            tracing::info!(side = %self.side, name = %self.name, "combatant defeated");
        }
        report
    }

    /// Restores health up to the maximum. Dead combatants cannot be healed.
    /// Returns the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }

        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        let restored = self.health - before;
        if restored > 0 {
            self.notify();
        }
        restored
    }

    /// Full health and stamina for a fresh encounter.
    pub fn reset_for_battle(&mut self) {
        self.health = self.max_health;
        self.stamina.restore_to_max();
        self.notify();
    }

    pub fn snapshot(&self) -> CombatantSnapshot {
        CombatantSnapshot {
            side: self.side,
            name: self.name.clone(),
            health: self.health,
            max_health: self.max_health,
            stamina: self.stamina.current(),
            max_stamina: self.stamina.max(),
        }
    }

    pub fn subscribe_health(
        &self,
        callback: impl FnMut(&HealthChanged) + 'static,
    ) -> Subscription {
        self.health_changed.subscribe(callback)
    }

    pub fn on_health_changed(&self) -> &Signal<HealthChanged> {
        &self.health_changed
    }

    fn notify(&self) {
        self.health_changed.emit(&HealthChanged {
            side: self.side,
            current: self.health,
            max: self.max_health,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_saturates_at_zero() {
        let mut hero = Combatant::new(Side::Player, "hero", 100, 100);

        let report = hero.take_damage(130);
        assert_eq!(report.applied, 100);
        assert!(report.is_lethal());
        assert_eq!(hero.health(), 0);
        assert!(!hero.is_alive());

        let again = hero.take_damage(10);
        assert_eq!(again.applied, 0);
        assert!(!again.is_lethal());
    }

    #[test]
    fn heal_is_clamped_and_ignores_the_dead() {
        let mut hero = Combatant::new(Side::Player, "hero", 100, 100);
        hero.take_damage(30);
        assert_eq!(hero.heal(50), 30);

        hero.take_damage(100);
        assert_eq!(hero.heal(50), 0);
        assert_eq!(hero.health(), 0);
    }

    #[test]
    fn reset_restores_health_and_stamina() {
        let mut slime = Combatant::from_spec(Side::Enemy, &CombatantSpec::new("slime", 60, 40));
        slime.take_damage(60);
        slime.stamina_mut().consume(25);

        slime.reset_for_battle();
        assert_eq!(slime.health(), 60);
        assert!(slime.stamina().is_full());
        assert!(slime.is_alive());
    }

    #[test]
    fn spec_without_health_is_invalid() {
        assert_eq!(
            CombatantSpec::new("ghost", 0, 10).validate(),
            Err(ConfigError::ZeroHealth {
                name: "ghost".into()
            })
        );
        assert!(CombatantSpec::new("slime", 1, 0).validate().is_ok());
    }
}
