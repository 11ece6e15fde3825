use std::{sync::Arc, time::Duration};

use endless_defence_core::{
    CellCoord, Command, EnemyId, EnemyKind, EnemyRecord, Event, FieldId, FieldRecord,
    FieldStatus, GameSpeed, Order, OrderError, PlacementError, TargetMode, TowerId, TowerKind,
    TowerRecord, WaveClock,
};
use endless_defence_world::{apply, query, Field, MapModel};

fn quiet_record() -> FieldRecord {
    FieldRecord {
        id: FieldId::new(1),
        name: "Field A".to_owned(),
        next_enemy_id: 1,
        next_tower_id: 1,
        wave: WaveClock {
            wave_index: 0,
            spawned_in_wave: 12,
            spawn_timer: 0.0,
            inter_wave_timer: 2.0,
        },
        selected_tower_kind: TowerKind::Gunner,
        selected_tower: None,
        gold: 180,
        base_hp: 20,
        max_base_hp: 20,
        speed: GameSpeed::Normal,
        paused: false,
        game_over: false,
        victory: false,
        towers: Vec::new(),
        enemies: Vec::new(),
    }
}

fn restored(record: FieldRecord) -> Field {
    let (field, report) = Field::restore(record, Arc::new(MapModel::standard()), 99);
    assert!(report.is_clean(), "fixture must restore cleanly: {report:?}");
    field
}

fn fresh() -> Field {
    Field::new(
        FieldId::new(1),
        "Field A",
        Arc::new(MapModel::standard()),
        99,
    )
}

fn ready_tower(id: u32, kind: TowerKind, column: u32, row: u32) -> TowerRecord {
    TowerRecord {
        id: TowerId::new(id),
        kind,
        cell: CellCoord::new(column, row),
        level: 1,
        target_mode: TargetMode::First,
        cooldown: 0.0,
    }
}

fn parked_enemy(id: u32, hp: f32, progress: f32) -> EnemyRecord {
    EnemyRecord {
        id: EnemyId::new(id),
        kind: EnemyKind::Grunt,
        hp,
        max_hp: hp,
        speed: 1.0,
        reward: 8,
        progress,
    }
}

fn send(field: &mut Field, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    apply(field, command, &mut events);
    events
}

fn tick(field: &mut Field, seconds: f32) -> Vec<Event> {
    send(
        field,
        Command::Tick {
            dt: Duration::from_secs_f32(seconds),
        },
    )
}

fn build(field: &mut Field, kind: TowerKind, column: u32, row: u32) -> Vec<Event> {
    send(
        field,
        Command::BuildTower {
            cell: CellCoord::new(column, row),
            kind,
        },
    )
}

fn kills(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::EnemyKilled { .. }))
        .count()
}

#[test]
fn three_gunners_spend_down_to_thirty_and_a_fourth_is_rejected() {
    let mut field = fresh();

    for column in [4, 6, 8] {
        let events = build(&mut field, TowerKind::Gunner, column, 2);
        assert!(matches!(events[0], Event::TowerBuilt { cost: 50, .. }));
    }
    assert_eq!(query::gold(&field), 30);

    let events = build(&mut field, TowerKind::Gunner, 10, 2);
    assert_eq!(
        events,
        vec![Event::TowerBuildRejected {
            kind: TowerKind::Gunner,
            cell: CellCoord::new(10, 2),
            reason: PlacementError::InsufficientGold,
        }]
    );
    assert_eq!(query::gold(&field), 30);
    assert_eq!(query::tower_view(&field).len(), 3);
}

#[test]
fn occupied_cells_reject_builds() {
    let mut field = fresh();
    let _ = build(&mut field, TowerKind::Gunner, 4, 2);
    let events = build(&mut field, TowerKind::Gunner, 4, 2);

    assert!(matches!(
        events[0],
        Event::TowerBuildRejected {
            reason: PlacementError::Occupied,
            ..
        }
    ));
    assert_eq!(query::gold(&field), 130);
}

#[test]
fn builds_are_ignored_while_paused() {
    let mut field = fresh();
    let _ = send(&mut field, Command::TogglePause);

    let events = build(&mut field, TowerKind::Gunner, 4, 2);

    assert!(matches!(
        events[0],
        Event::TowerBuildRejected {
            reason: PlacementError::Halted,
            ..
        }
    ));
    assert_eq!(query::status(&field), FieldStatus::Paused);
}

#[test]
fn fifty_five_hp_enemy_dies_to_the_fourth_gunner_shot_and_pays_once() {
    let mut record = quiet_record();
    record.towers = vec![ready_tower(1, TowerKind::Gunner, 4, 2)];
    record.enemies = vec![parked_enemy(1, 55.0, 4.0)];
    record.next_enemy_id = 2;
    record.next_tower_id = 2;
    let mut field = restored(record);

    let mut events = Vec::new();
    for _ in 0..6 {
        events.extend(tick(&mut field, 0.7));
    }

    let shots = events
        .iter()
        .filter(|event| matches!(event, Event::ShotFired { .. }))
        .count();
    assert_eq!(shots, 4);
    assert_eq!(kills(&events), 1);
    assert!(events.contains(&Event::EnemyKilled {
        enemy: EnemyId::new(1),
        reward: 8,
    }));
    assert_eq!(query::gold(&field), 188);
    assert!(query::enemy_view(&field).is_empty());
}

#[test]
fn overkill_by_a_second_tower_pays_nothing_extra() {
    let mut record = quiet_record();
    record.towers = vec![
        ready_tower(1, TowerKind::Blaster, 4, 2),
        ready_tower(2, TowerKind::Blaster, 4, 4),
    ];
    record.enemies = vec![parked_enemy(1, 20.0, 4.0)];
    record.next_enemy_id = 2;
    record.next_tower_id = 3;
    let mut field = restored(record);

    let events = tick(&mut field, 0.1);

    let shooters: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::ShotFired { tower, .. } => Some(*tower),
            _ => None,
        })
        .collect();
    assert_eq!(
        shooters,
        vec![TowerId::new(1)],
        "dead enemies leave the candidate set"
    );
    assert_eq!(kills(&events), 1);
    assert_eq!(query::gold(&field), 188);
    assert_eq!(query::effects(&field).len(), 1);
}

#[test]
fn towers_without_targets_keep_their_readiness() {
    let mut record = quiet_record();
    record.towers = vec![ready_tower(1, TowerKind::Gunner, 12, 0)];
    record.next_tower_id = 2;
    let mut field = restored(record);

    let events = tick(&mut field, 0.5);

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ShotFired { .. })));
    let tower = query::tower_view(&field).into_vec()[0];
    assert!(tower.cooldown <= 0.0);
}

#[test]
fn leak_with_one_base_hp_loses_the_field() {
    let mut record = quiet_record();
    record.base_hp = 1;
    let mut runner = parked_enemy(1, 30.0, 14.99);
    runner.speed = 84.0;
    record.enemies = vec![runner];
    record.next_enemy_id = 2;
    let mut field = restored(record);

    let events = tick(&mut field, 0.1);

    assert!(events.contains(&Event::EnemyLeaked {
        enemy: EnemyId::new(1),
        base_hp: 0,
    }));
    assert!(events.contains(&Event::FieldLost { wave: 0 }));
    let view = query::field_view(&field);
    assert_eq!(view.base_hp, 0);
    assert!(view.game_over);
    assert!(!view.victory);
    assert_eq!(view.status, FieldStatus::GameOver);
    assert!(view.enemies.is_empty());

    assert!(tick(&mut field, 1.0).is_empty(), "lost fields stay frozen");
}

#[test]
fn selling_a_level_one_sniper_refunds_seventy_seven() {
    let mut field = fresh();
    let _ = build(&mut field, TowerKind::Sniper, 4, 2);
    assert_eq!(query::gold(&field), 70);

    let events = send(&mut field, Command::SellSelected);

    assert_eq!(
        events,
        vec![
            Event::TowerSold {
                tower: TowerId::new(1),
                refund: 77,
            },
            Event::SelectionChanged { tower: None },
        ]
    );
    assert_eq!(query::gold(&field), 147);
    assert!(query::tower_view(&field).is_empty());
    assert_eq!(query::tower_at(&field, CellCoord::new(4, 2)), None);
}

#[test]
fn upgrades_and_target_cycles_act_on_the_selection() {
    let mut field = fresh();
    let _ = build(&mut field, TowerKind::Gunner, 4, 2);

    let events = send(&mut field, Command::UpgradeSelected);
    assert_eq!(
        events,
        vec![Event::TowerUpgraded {
            tower: TowerId::new(1),
            level: 2,
            cost: 62,
        }]
    );
    assert_eq!(query::gold(&field), 68);

    let events = send(&mut field, Command::CycleTargetMode);
    assert_eq!(
        events,
        vec![Event::TargetModeChanged {
            tower: TowerId::new(1),
            mode: TargetMode::Last,
        }]
    );

    let events = send(&mut field, Command::UpgradeSelected);
    assert_eq!(
        events,
        vec![Event::OrderRejected {
            order: Order::Upgrade,
            reason: OrderError::InsufficientGold,
        }]
    );

    let _ = send(
        &mut field,
        Command::SelectTowerAt {
            cell: CellCoord::new(0, 0),
        },
    );
    let events = send(&mut field, Command::SellSelected);
    assert_eq!(
        events,
        vec![Event::OrderRejected {
            order: Order::Sell,
            reason: OrderError::NoSelection,
        }]
    );
}

#[test]
fn orders_work_while_paused_and_after_defeat() {
    let mut record = quiet_record();
    record.towers = vec![ready_tower(1, TowerKind::Gunner, 4, 2)];
    record.selected_tower = Some(TowerId::new(1));
    record.next_tower_id = 2;
    record.paused = true;
    let mut field = restored(record.clone());

    let events = send(&mut field, Command::CycleTargetMode);
    assert!(matches!(events[0], Event::TargetModeChanged { .. }));

    record.paused = false;
    record.game_over = true;
    let mut lost = restored(record);
    let events = send(&mut lost, Command::UpgradeSelected);
    assert_eq!(
        events,
        vec![Event::TowerUpgraded {
            tower: TowerId::new(1),
            level: 2,
            cost: 62,
        }]
    );

    let events = send(&mut lost, Command::SellSelected);
    assert!(matches!(events[0], Event::TowerSold { .. }));
    assert_eq!(query::status(&lost), FieldStatus::GameOver);
    assert!(
        build(&mut lost, TowerKind::Gunner, 4, 2)
            .iter()
            .all(|event| matches!(event, Event::TowerBuildRejected { .. })),
        "builds stay closed on a lost field"
    );
}

#[test]
fn cleared_wave_waits_then_advances() {
    let mut field = restored(quiet_record());

    let early = tick(&mut field, 1.0);
    assert!(!early
        .iter()
        .any(|event| matches!(event, Event::WaveAdvanced { .. })));

    let events = tick(&mut field, 1.0);
    assert!(events.contains(&Event::WaveAdvanced { wave: 1 }));
    assert_eq!(query::wave_clock(&field).wave_index, 1);
}

#[test]
fn long_defended_run_keeps_invariants() {
    let mut field = fresh();
    let _ = build(&mut field, TowerKind::Gunner, 4, 2);
    let _ = build(&mut field, TowerKind::Gunner, 6, 4);
    let _ = build(&mut field, TowerKind::Gunner, 8, 4);
    let segments = query::map(&field).segment_count() as f32;

    let mut leaks = 0;
    let mut killed = Vec::new();
    for _ in 0..3_600 {
        for event in tick(&mut field, 1.0 / 60.0) {
            match event {
                Event::EnemyLeaked { .. } => leaks += 1,
                Event::EnemyKilled { enemy, .. } => killed.push(enemy),
                _ => {}
            }
        }
        for enemy in query::enemy_view(&field).iter() {
            assert!((0.0..=segments).contains(&enemy.progress));
            assert!(enemy.hp > 0.0);
        }
    }

    let unique: std::collections::HashSet<_> = killed.iter().copied().collect();
    assert_eq!(unique.len(), killed.len(), "an enemy was paid for twice");
    assert_eq!(query::base_hp(&field), 20u32.saturating_sub(leaks));
    assert!(query::wave_clock(&field).wave_index >= 1);
}
