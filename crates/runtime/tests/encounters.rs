//! Encounters driven through the frame loop.

use battle_core::{
    ActionKind, BattleEvent, BattleResult, BattleState, Combatant, DamageSource, Millis, Side,
    WindowKind, WindowOutcome,
};
use battle_runtime::{
    PlannedInput, RecordedEvent, Runtime, RuntimeConfig, RuntimeError, ScriptedProvider,
};

fn runtime(config: RuntimeConfig) -> Runtime {
    Runtime::builder()
        .config(config)
        .player(Combatant::new(Side::Player, "Hero", 100, 100))
        .build()
        .unwrap()
}

fn slime() -> Combatant {
    Combatant::new(Side::Enemy, "Slime", 60, 40)
}

fn six_light_attacks() -> ScriptedProvider {
    ScriptedProvider::new(std::iter::repeat_n(
        PlannedInput::Action(ActionKind::LightAttack),
        6,
    ))
}

fn find(events: &[RecordedEvent], pred: impl Fn(&BattleEvent) -> bool) -> Option<Millis> {
    events.iter().find(|r| pred(&r.event)).map(|r| r.at)
}

#[test]
fn light_attacks_defeat_a_slime_in_one_turn() {
    let mut runtime = runtime(RuntimeConfig::default());
    let report = runtime
        .run_encounter(slime(), &mut six_light_attacks())
        .unwrap();

    // Hits land 300ms into each 700ms action: the sixth at 3800ms.
    assert_eq!(report.result, BattleResult::PlayerVictory);
    assert_eq!(report.duration, Millis(3_800));
    assert_eq!(report.damage_dealt, 60);
    assert_eq!(report.damage_taken, 0);
    assert_eq!((report.player_turns, report.enemy_turns), (1, 0));
    assert_eq!(report.enemy_health, 0);
    assert_eq!(report.player_health, 100);

    // The session released the battle for the next encounter.
    assert_eq!(runtime.battle().state(), BattleState::BattleStart);
    assert!(runtime.battle().enemy().is_none());
}

#[test]
fn frame_length_does_not_change_the_report() {
    let fine = runtime(RuntimeConfig::default().with_frame(Millis(1)))
        .run_encounter(slime(), &mut six_light_attacks())
        .unwrap();
    let coarse = runtime(RuntimeConfig::default().with_frame(Millis(250)))
        .run_encounter(slime(), &mut six_light_attacks())
        .unwrap();

    assert_eq!(fine, coarse);
}

#[test]
fn scripted_perfect_parry_is_recorded_at_exact_times() {
    let mut runtime = runtime(RuntimeConfig::default());
    let mut provider = ScriptedProvider::new([
        PlannedInput::Action(ActionKind::LightAttack),
        PlannedInput::Action(ActionKind::LightAttack),
        PlannedInput::Action(ActionKind::EndTurn),
        PlannedInput::Parry { at: Millis(150) },
    ]);

    let mut session = runtime
        .begin_encounter(Combatant::new(Side::Enemy, "Dummy", 120, 100))
        .unwrap();
    assert!(session.advance_to(&mut provider, Millis(3_750)).unwrap());

    let enemy = session.battle().enemy().unwrap();
    assert_eq!(enemy.health(), 75);
    assert_eq!(session.battle().player().stamina().current(), 100);
    assert_eq!(session.battle().state(), BattleState::PlayerTurn);

    let events = session.recorder().events();
    assert_eq!(
        find(&events, |e| matches!(
            e,
            BattleEvent::WindowOpened {
                kind: WindowKind::Parry,
                ..
            }
        )),
        Some(Millis(2_600))
    );
    assert_eq!(
        find(&events, |e| matches!(
            e,
            BattleEvent::ParryResolved {
                outcome: WindowOutcome::Success { perfect: true }
            }
        )),
        Some(Millis(2_750))
    );
    assert_eq!(
        find(&events, |e| matches!(
            e,
            BattleEvent::DamageDealt {
                source: DamageSource::Counter,
                ..
            }
        )),
        Some(Millis(3_250))
    );

    session.abort().unwrap();
    assert!(runtime.battle().enemy().is_none());
}

#[test]
fn passive_player_is_eventually_defeated() {
    let mut runtime = runtime(RuntimeConfig::default());
    let report = runtime
        .run_encounter(slime(), &mut ScriptedProvider::passive())
        .unwrap();

    // 15 damage per unparried attack.
    assert_eq!(report.result, BattleResult::PlayerDefeated);
    assert_eq!(report.enemy_turns, 7);
    assert_eq!(report.parry.opened, 7);
    assert_eq!(report.parry.failed, 7);
    assert_eq!(report.damage_taken, 100);
    assert_eq!(report.player_health, 0);
    assert_eq!(report.enemy_health, 60);
}

#[test]
fn encounters_past_the_limit_are_abandoned() {
    let config = RuntimeConfig::default().with_max_encounter(Millis(5_000));
    let mut runtime = runtime(config);

    let err = runtime
        .run_encounter(
            Combatant::new(Side::Enemy, "Ogre", 160, 100),
            &mut ScriptedProvider::passive(),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        RuntimeError::EncounterTimeout { encounter: 1, limit } if limit == Millis(5_000)
    ));
    assert_eq!(runtime.battle().state(), BattleState::BattleStart);
    assert!(runtime.battle().enemy().is_none());

    // The runtime is reusable afterwards.
    let report = runtime
        .run_encounter(slime(), &mut six_light_attacks())
        .unwrap();
    assert_eq!(report.encounter, 2);
    assert!(report.is_victory());
}

#[test]
fn building_without_a_player_fails() {
    let err = Runtime::builder().build().unwrap_err();
    assert!(matches!(err, RuntimeError::MissingPlayer));
}
