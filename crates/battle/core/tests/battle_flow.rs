use std::cell::RefCell;
use std::rc::Rc;

use battle_core::{
    ActionKind, Battle, BattleConfig, BattleEvent, BattleFeedback, BattleResult,
    BattleSetupError, BattleState, Combatant, DamageSource, FailReason, HapticPulse,
    InputPermission, InputVerdict, Millis, PlayerTurnState, PressOutcome, RejectReason, Side,
    Subscription, WindowKind, WindowOutcome,
};

fn hero() -> Combatant {
    Combatant::new(Side::Player, "hero", 100, 100)
}

fn foe(health: u32) -> Combatant {
    Combatant::new(Side::Enemy, "slime", health, 100)
}

fn start(enemy_health: u32) -> Battle {
    start_with(BattleConfig::default(), enemy_health)
}

fn start_with(config: BattleConfig, enemy_health: u32) -> Battle {
    let mut battle = Battle::builder()
        .config(config)
        .player(hero())
        .enemy(foe(enemy_health))
        .build()
        .expect("battle builds");
    battle.initialize_battle(Millis(0)).expect("enemy assigned");
    battle
}

fn record(battle: &Battle) -> (Rc<RefCell<Vec<BattleEvent>>>, Subscription) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let subscription = battle.subscribe(move |event| sink.borrow_mut().push(*event));
    (events, subscription)
}

fn count(events: &RefCell<Vec<BattleEvent>>, pred: impl Fn(&BattleEvent) -> bool) -> usize {
    events.borrow().iter().filter(|event| pred(event)).count()
}

fn enemy_health(battle: &Battle) -> u32 {
    battle.enemy().map(Combatant::health).unwrap_or_default()
}

#[derive(Clone, Default)]
struct FeedbackLog(Rc<RefCell<Vec<String>>>);

impl BattleFeedback for FeedbackLog {
    fn haptic(&mut self, pulse: HapticPulse) {
        self.0.borrow_mut().push(format!("haptic:{pulse}"));
    }

    fn show_prompt(&mut self, window: WindowKind) {
        self.0.borrow_mut().push(format!("show:{window}"));
    }

    fn hide_prompt(&mut self) {
        self.0.borrow_mut().push("hide".to_owned());
    }

    fn play_victory(&mut self) {
        self.0.borrow_mut().push("victory".to_owned());
    }
}

#[test]
fn initialize_hands_first_turn_to_player() {
    let battle = start(100);

    assert_eq!(battle.state(), BattleState::PlayerTurn);
    assert_eq!(
        battle.player_turn_state(),
        Some(PlayerTurnState::SelectingAction)
    );
    assert_eq!(battle.permission(), InputPermission::PlayerTurn);
    assert_eq!(battle.result(), BattleResult::None);
    assert_eq!(battle.encounter(), 1);
}

#[test]
fn missing_enemy_aborts_without_touching_state() {
    let mut battle = Battle::builder().player(hero()).build().expect("battle builds");

    let error = battle.initialize_battle(Millis(0)).unwrap_err();
    assert_eq!(error, BattleSetupError::MissingEnemy);
    assert_eq!(battle.state(), BattleState::BattleStart);
    assert_eq!(battle.permission(), InputPermission::Disabled);
    assert_eq!(battle.encounter(), 0);
}

#[test]
fn builder_requires_player_and_valid_config() {
    assert_eq!(
        Battle::builder().enemy(foe(10)).build().unwrap_err(),
        BattleSetupError::MissingPlayer
    );

    let mut config = BattleConfig::default();
    config.parry.duration = Millis::ZERO;
    assert!(matches!(
        Battle::builder().config(config).player(hero()).build(),
        Err(BattleSetupError::InvalidConfig(_))
    ));
}

#[test]
fn light_attack_lands_after_hit_delay() {
    let mut battle = start(100);
    let (events, _sub) = record(&battle);

    assert!(battle
        .request_action(ActionKind::LightAttack, Millis(0))
        .is_accepted());
    assert_eq!(battle.permission(), InputPermission::ExecutingAction);
    assert_eq!(
        battle.player_turn_state(),
        Some(PlayerTurnState::ExecutingAttack)
    );
    assert_eq!(battle.player().stamina().current(), 85);

    battle.tick(Millis(299));
    assert_eq!(enemy_health(&battle), 100);
    battle.tick(Millis(300));
    assert_eq!(enemy_health(&battle), 90);

    battle.tick(Millis(700));
    assert_eq!(battle.permission(), InputPermission::PlayerTurn);
    assert_eq!(
        battle.player_turn_state(),
        Some(PlayerTurnState::SelectingAction)
    );
    assert_eq!(
        count(&events, |event| matches!(
            event,
            BattleEvent::ActionCompleted {
                kind: ActionKind::LightAttack
            }
        )),
        1
    );
}

#[test]
fn perfect_parry_rewards_stamina_and_counters() {
    let mut battle = start(120);

    // Spend 30 stamina so the reward is visible; the enemy drops to 100.
    let _ = battle.request_action(ActionKind::LightAttack, Millis(0));
    battle.tick(Millis(700));
    let _ = battle.request_action(ActionKind::LightAttack, Millis(700));
    battle.tick(Millis(1_400));
    assert_eq!(battle.player().stamina().current(), 70);
    assert_eq!(enemy_health(&battle), 100);

    assert!(battle
        .request_action(ActionKind::EndTurn, Millis(1_400))
        .is_accepted());
    assert_eq!(battle.state(), BattleState::EnemyTurn);
    assert_eq!(battle.permission(), InputPermission::Disabled);

    // Thinking 800ms, wind-up 400ms.
    battle.tick(Millis(2_600));
    assert!(battle.window(WindowKind::Parry).is_open());
    assert_eq!(battle.permission(), InputPermission::ParryWindow);

    assert_eq!(
        battle.request_parry(Millis(2_750)),
        PressOutcome::Resolved(WindowOutcome::Success { perfect: true })
    );
    assert_eq!(battle.player().stamina().current(), 100);
    assert_eq!(battle.permission(), InputPermission::Disabled);
    assert!(!battle.window(WindowKind::Parry).is_open());

    battle.tick(Millis(3_249));
    assert_eq!(enemy_health(&battle), 100);
    battle.tick(Millis(3_250));
    assert_eq!(enemy_health(&battle), 75);
    assert_eq!(battle.player().health(), 100);

    battle.tick(Millis(3_750));
    assert_eq!(battle.state(), BattleState::PlayerTurn);
    assert_eq!(battle.permission(), InputPermission::PlayerTurn);
}

#[test]
fn plain_parry_grants_smaller_reward() {
    let mut battle = start(200);
    let _ = battle.request_action(ActionKind::Skill2, Millis(0));
    battle.tick(Millis(700));
    let _ = battle.request_action(ActionKind::EndTurn, Millis(700));
    battle.tick(Millis(1_900));

    assert_eq!(battle.player().stamina().current(), 30);
    assert_eq!(
        battle.request_parry(Millis(1_910)),
        PressOutcome::Resolved(WindowOutcome::Success { perfect: false })
    );
    assert_eq!(battle.player().stamina().current(), 45);
}

#[test]
fn failed_parry_lets_attack_land() {
    let feedback = FeedbackLog::default();
    let mut battle = Battle::builder()
        .player(hero())
        .enemy(foe(100))
        .feedback(feedback.clone())
        .build()
        .expect("battle builds");
    battle.initialize_battle(Millis(0)).expect("enemy assigned");
    let (events, _sub) = record(&battle);

    let _ = battle.request_action(ActionKind::EndTurn, Millis(0));
    battle.tick(Millis(1_200));
    assert!(battle.window(WindowKind::Parry).is_open());

    battle.tick(Millis(1_500));
    assert_eq!(battle.player().health(), 85);
    assert_eq!(battle.permission(), InputPermission::Disabled);
    assert!(events.borrow().contains(&BattleEvent::ParryResolved {
        outcome: WindowOutcome::Fail {
            reason: FailReason::TimedOut
        }
    }));
    assert!(events.borrow().contains(&BattleEvent::DamageDealt {
        target: Side::Player,
        source: DamageSource::EnemyAttack,
        amount: 15,
        remaining: 85,
    }));
    assert_eq!(
        *feedback.0.borrow(),
        vec!["show:parry", "hide", "haptic:strong"]
    );

    battle.tick(Millis(2_100));
    assert_eq!(battle.state(), BattleState::PlayerTurn);
}

#[test]
fn press_at_deadline_is_late() {
    let mut battle = start(100);
    let _ = battle.request_action(ActionKind::EndTurn, Millis(0));
    battle.tick(Millis(1_200));

    assert_eq!(
        battle.request_parry(Millis(1_500)),
        PressOutcome::Resolved(WindowOutcome::Fail {
            reason: FailReason::Late
        })
    );
    assert_eq!(battle.player().health(), 85);
}

#[test]
fn missed_qte_deals_base_damage() {
    let mut battle = start(100);
    let (events, _sub) = record(&battle);

    let _ = battle.request_action(ActionKind::HeavyAttack, Millis(0));
    battle.tick(Millis(300));
    assert!(battle.window(WindowKind::Qte).is_open());
    assert_eq!(battle.permission(), InputPermission::QteWindow);
    assert_eq!(
        battle.player_turn_state(),
        Some(PlayerTurnState::WaitingForInput)
    );

    battle.tick(Millis(799));
    assert_eq!(enemy_health(&battle), 100);

    battle.tick(Millis(800));
    assert_eq!(enemy_health(&battle), 80);
    assert!(events.borrow().contains(&BattleEvent::QteResolved {
        outcome: WindowOutcome::Fail {
            reason: FailReason::TimedOut
        }
    }));
    assert_eq!(battle.permission(), InputPermission::ExecutingAction);
    assert_eq!(
        battle.player_turn_state(),
        Some(PlayerTurnState::ExecutingAttack)
    );

    battle.tick(Millis(1_200));
    assert_eq!(battle.permission(), InputPermission::PlayerTurn);
}

#[test]
fn qte_success_scales_damage() {
    let mut perfect = start(100);
    let _ = perfect.request_action(ActionKind::HeavyAttack, Millis(0));
    perfect.tick(Millis(300));
    assert_eq!(
        perfect.request_qte(Millis(550)),
        PressOutcome::Resolved(WindowOutcome::Success { perfect: true })
    );
    assert_eq!(enemy_health(&perfect), 60);

    let mut early = start(100);
    let _ = early.request_action(ActionKind::HeavyAttack, Millis(0));
    early.tick(Millis(300));
    assert_eq!(
        early.request_qte(Millis(320)),
        PressOutcome::Resolved(WindowOutcome::Success { perfect: false })
    );
    assert_eq!(enemy_health(&early), 70);
}

#[test]
fn insufficient_stamina_is_reported_without_state_change() {
    let mut battle = start(200);
    let (events, _sub) = record(&battle);

    let _ = battle.request_action(ActionKind::Skill2, Millis(0));
    battle.tick(Millis(700));
    assert_eq!(battle.player().stamina().current(), 30);
    assert!(!battle.can_perform_action(ActionKind::Skill2));

    assert_eq!(
        battle.request_action(ActionKind::Skill2, Millis(700)),
        InputVerdict::Accepted
    );
    assert!(events.borrow().contains(&BattleEvent::InsufficientStamina {
        kind: ActionKind::Skill2,
        required: 70,
        available: 30,
    }));
    assert_eq!(battle.player().stamina().current(), 30);
    assert_eq!(battle.permission(), InputPermission::PlayerTurn);
    assert_eq!(
        battle.player_turn_state(),
        Some(PlayerTurnState::SelectingAction)
    );
    assert_eq!(battle.pending_tasks(), 0);
}

#[test]
fn actions_rejected_outside_player_turn() {
    let mut battle = start(100);
    let (events, _sub) = record(&battle);

    let _ = battle.request_action(ActionKind::LightAttack, Millis(0));
    assert_eq!(
        battle.request_action(ActionKind::LightAttack, Millis(10)),
        InputVerdict::Rejected(RejectReason::NotPlayerTurn {
            permission: InputPermission::ExecutingAction
        })
    );

    battle.tick(Millis(700));
    let _ = battle.request_action(ActionKind::EndTurn, Millis(700));
    assert_eq!(
        battle.request_action(ActionKind::HeavyAttack, Millis(800)),
        InputVerdict::Rejected(RejectReason::NotPlayerTurn {
            permission: InputPermission::Disabled
        })
    );

    battle.tick(Millis(1_900));
    assert_eq!(
        battle.request_action(ActionKind::Skill1, Millis(1_950)),
        InputVerdict::Rejected(RejectReason::NotPlayerTurn {
            permission: InputPermission::ParryWindow
        })
    );
    assert!(matches!(
        battle.request_qte(Millis(1_960)),
        PressOutcome::Rejected(RejectReason::WindowInactive {
            kind: WindowKind::Qte
        })
    ));

    let rejected = count(&events, |event| {
        matches!(event, BattleEvent::InputRejected { .. })
    });
    assert_eq!(rejected, 4);
    assert_eq!(enemy_health(&battle), 90);
}

#[test]
fn queued_action_runs_after_current_one() {
    let config = BattleConfig {
        queue_during_action: true,
        ..BattleConfig::default()
    };
    let mut battle = start_with(config, 100);

    let _ = battle.request_action(ActionKind::LightAttack, Millis(0));
    assert!(battle
        .request_action(ActionKind::LightAttack, Millis(100))
        .is_accepted());
    assert_eq!(battle.queued_action(), Some(ActionKind::LightAttack));
    assert_eq!(battle.player().stamina().current(), 85);

    battle.tick(Millis(700));
    assert_eq!(battle.queued_action(), None);
    assert_eq!(battle.permission(), InputPermission::ExecutingAction);
    assert_eq!(battle.player().stamina().current(), 70);

    battle.tick(Millis(1_400));
    assert_eq!(enemy_health(&battle), 80);
    assert_eq!(battle.permission(), InputPermission::PlayerTurn);
}

#[test]
fn turns_alternate_through_full_cycles() {
    for cycles in 0..4u64 {
        let mut battle = start(100);
        let mut now = Millis(0);

        for _ in 0..cycles {
            let _ = battle.request_action(ActionKind::EndTurn, now);
            now = now + Millis(2_100);
            battle.tick(now);
        }

        assert_eq!(battle.state(), BattleState::PlayerTurn);
        assert_eq!(
            battle.player_turn_state(),
            Some(PlayerTurnState::SelectingAction)
        );
        assert_eq!(battle.player().health(), 100 - 15 * cycles as u32);
    }
}

#[test]
fn coarse_ticks_resolve_in_chronological_order() {
    let mut fine = start(100);
    let mut coarse = start(100);

    let _ = fine.request_action(ActionKind::HeavyAttack, Millis(0));
    let _ = coarse.request_action(ActionKind::HeavyAttack, Millis(0));
    for step in 1..=120 {
        fine.tick(Millis(step * 10));
    }
    coarse.tick(Millis(1_200));

    assert_eq!(fine.snapshot(), coarse.snapshot());
}

#[test]
fn defeat_ends_battle_once() {
    let mut battle = start(100);
    let (events, _sub) = record(&battle);

    battle.damage_combatant(Side::Player, 100, Millis(50));
    assert_eq!(battle.result(), BattleResult::PlayerDefeated);
    assert_eq!(battle.state(), BattleState::BattleEnd);
    assert_eq!(battle.permission(), InputPermission::Disabled);

    battle.damage_combatant(Side::Player, 10, Millis(60));
    battle.tick(Millis(5_000));

    let ended = count(&events, |event| {
        matches!(event, BattleEvent::BattleEnded { .. })
    });
    assert_eq!(ended, 1);
    assert!(events.borrow().contains(&BattleEvent::BattleEnded {
        result: BattleResult::PlayerDefeated
    }));
}

#[test]
fn enemy_attack_can_defeat_player() {
    let mut battle = Battle::builder()
        .player(Combatant::new(Side::Player, "hero", 10, 100))
        .enemy(foe(100))
        .build()
        .expect("battle builds");
    battle.initialize_battle(Millis(0)).expect("enemy assigned");

    let _ = battle.request_action(ActionKind::EndTurn, Millis(0));
    battle.tick(Millis(5_000));

    assert_eq!(battle.result(), BattleResult::PlayerDefeated);
    assert_eq!(battle.pending_tasks(), 0);
}

#[test]
fn victory_plays_hook_and_clears_windows() {
    let feedback = FeedbackLog::default();
    let mut battle = Battle::builder()
        .player(hero())
        .enemy(foe(20))
        .feedback(feedback.clone())
        .build()
        .expect("battle builds");
    battle.initialize_battle(Millis(0)).expect("enemy assigned");

    let _ = battle.request_action(ActionKind::HeavyAttack, Millis(0));
    battle.tick(Millis(300));
    let _ = battle.request_qte(Millis(550));

    assert_eq!(battle.result(), BattleResult::PlayerVictory);
    assert_eq!(battle.state(), BattleState::BattleEnd);
    assert!(feedback.0.borrow().contains(&"victory".to_owned()));
    assert!(!battle.window(WindowKind::Qte).is_open());
    assert_eq!(battle.pending_tasks(), 0);
}

#[test]
fn force_reset_discards_pending_counter() {
    let mut battle = start(100);
    let _ = battle.request_action(ActionKind::EndTurn, Millis(0));
    battle.tick(Millis(1_200));
    let _ = battle.request_parry(Millis(1_350));
    assert_eq!(battle.pending_tasks(), 1);

    battle.force_reset();
    assert_eq!(battle.state(), BattleState::BattleStart);
    assert_eq!(battle.pending_tasks(), 0);

    battle.tick(Millis(10_000));
    assert_eq!(enemy_health(&battle), 100);
}

#[test]
fn reset_and_reinitialize_leaves_no_residue() {
    let mut battle = start(100);
    let _ = battle.request_action(ActionKind::HeavyAttack, Millis(0));
    battle.tick(Millis(300));
    battle.damage_combatant(Side::Player, 100, Millis(350));
    assert_eq!(battle.result(), BattleResult::PlayerDefeated);

    battle.force_reset();
    assert_eq!(battle.result(), BattleResult::None);
    assert_eq!(battle.state(), BattleState::BattleStart);
    assert_eq!(battle.permission(), InputPermission::Disabled);
    assert!(!battle.window(WindowKind::Qte).is_open());
    assert!(!battle.input().is_qte_window_active());
    assert_eq!(battle.next_wakeup(), None);

    let previous = battle.assign_enemy(foe(60)).expect("battle idle");
    assert_eq!(previous.map(|enemy| enemy.health()), Some(100));
    battle.initialize_battle(Millis(1_000)).expect("enemy assigned");

    assert_eq!(battle.encounter(), 2);
    assert_eq!(battle.player().health(), 100);
    assert_eq!(battle.result(), BattleResult::None);
    assert_eq!(battle.permission(), InputPermission::PlayerTurn);
}

#[test]
fn enemy_cannot_be_swapped_mid_battle() {
    let mut battle = start(100);

    assert!(matches!(
        battle.assign_enemy(foe(10)),
        Err(BattleSetupError::InProgress { .. })
    ));
    assert!(battle.release_enemy().is_err());
    assert_eq!(enemy_health(&battle), 100);
}

fn assert_single_window(battle: &Battle, at: &str) {
    let snapshot = battle.snapshot();
    assert!(
        !(snapshot.parry_open && snapshot.qte_open),
        "{at}: both windows open"
    );
    assert_eq!(
        snapshot.permission == InputPermission::ParryWindow,
        snapshot.parry_open,
        "{at}: parry permission out of step with its window"
    );
    assert_eq!(
        snapshot.permission == InputPermission::QteWindow,
        snapshot.qte_open,
        "{at}: qte permission out of step with its window"
    );
    assert_eq!(snapshot.permission, battle.permission());
}

/// Ticks in 50ms steps until `done` holds, checking the window invariants
/// after every tick.
fn advance_until(battle: &mut Battle, now: &mut Millis, done: impl Fn(&Battle) -> bool) {
    for _ in 0..200 {
        if done(battle) {
            return;
        }
        *now = *now + Millis(50);
        battle.tick(*now);
        assert_single_window(battle, &format!("tick {now}"));
    }
    panic!("condition not reached by {now}");
}

#[test]
fn at_most_one_window_owns_input_across_a_full_round() {
    for queue_during_action in [false, true] {
        let config = BattleConfig {
            queue_during_action,
            ..BattleConfig::default()
        };
        let mut battle = start_with(config, 500);
        let mut now = Millis(0);
        assert_single_window(&battle, "start");

        assert!(battle
            .request_action(ActionKind::HeavyAttack, now)
            .is_accepted());
        assert_single_window(&battle, "heavy attack");

        advance_until(&mut battle, &mut now, |b| b.window(WindowKind::Qte).is_open());
        assert_eq!(battle.permission(), InputPermission::QteWindow);

        // Neither an action nor a parry may steal the QTE window.
        assert!(!battle
            .request_action(ActionKind::LightAttack, now)
            .is_accepted());
        assert_single_window(&battle, "action during qte");
        assert!(matches!(
            battle.request_parry(now),
            PressOutcome::Rejected(_)
        ));
        assert_single_window(&battle, "parry during qte");

        now = Millis(550);
        battle.tick(now);
        assert_single_window(&battle, "tick before qte press");
        assert_eq!(
            battle.request_qte(now),
            PressOutcome::Resolved(WindowOutcome::Success { perfect: true })
        );
        assert_single_window(&battle, "qte press");
        assert_eq!(battle.permission(), InputPermission::ExecutingAction);

        let queued = battle
            .request_action(ActionKind::LightAttack, now)
            .is_accepted();
        assert_eq!(queued, queue_during_action);
        assert_single_window(&battle, "action during recovery");

        advance_until(&mut battle, &mut now, |b| {
            b.permission() == InputPermission::PlayerTurn
        });
        assert!(battle
            .request_action(ActionKind::EndTurn, now)
            .is_accepted());
        assert_single_window(&battle, "end turn");

        advance_until(&mut battle, &mut now, |b| {
            b.window(WindowKind::Parry).is_open()
        });
        assert_eq!(battle.permission(), InputPermission::ParryWindow);
        assert!(matches!(battle.request_qte(now), PressOutcome::Rejected(_)));
        assert_single_window(&battle, "qte during parry");
        assert!(!battle
            .request_action(ActionKind::LightAttack, now)
            .is_accepted());
        assert_single_window(&battle, "action during parry");

        let opened = now;
        now = opened + Millis(150);
        battle.tick(now);
        assert_single_window(&battle, "tick before parry press");
        assert!(matches!(
            battle.request_parry(now),
            PressOutcome::Resolved(WindowOutcome::Success { .. })
        ));
        assert_single_window(&battle, "parry press");

        let before_counter = enemy_health(&battle);
        advance_until(&mut battle, &mut now, |b| {
            b.permission() == InputPermission::PlayerTurn
        });
        assert!(enemy_health(&battle) < before_counter, "counter landed");
        assert_eq!(battle.state(), BattleState::PlayerTurn);
        assert_eq!(battle.player().health(), 100);
    }
}
