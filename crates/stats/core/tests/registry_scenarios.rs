use stats_core::{
    DeferredStore, MemoryStore, OpKind, Operation, ParticipantId, Scope, StatKey, StatSchema,
    StatValue, Stats, StatsError, StatsStore, ValueType, apply_all,
};

const P5: ParticipantId = ParticipantId(5);
const P7: ParticipantId = ParticipantId(7);
const PLAYERS: [ParticipantId; 2] = [P5, P7];

fn game_schema() -> StatSchema {
    StatSchema::builder()
        .player("number turns", ValueType::Int)
        .player("met objective", ValueType::Bool)
        .player("average die roll", ValueType::Float)
        .table("cities captured", ValueType::Int)
        .table("sudden death", ValueType::Bool)
        .table("average pieces per turn", ValueType::Float)
        .build()
        .unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn init_all_sets_zero_values() {
    let mut stats = Stats::in_memory(game_schema()).unwrap();
    stats.init_all(&PLAYERS).unwrap();

    for p in PLAYERS {
        assert_eq!(stats.player_int("PLAYER_NUMBER_TURNS").unwrap().get(p), Ok(0));
        assert_eq!(
            stats.player_bool("PLAYER_MET_OBJECTIVE").unwrap().get(p),
            Ok(false)
        );
        assert_eq!(
            stats
                .player_float("PLAYER_AVERAGE_DIE_ROLL")
                .unwrap()
                .get(p),
            Ok(0.0)
        );
    }
    assert_eq!(stats.table_int("TABLE_CITIES_CAPTURED").unwrap().get(), Ok(0));
    assert_eq!(stats.table_bool("TABLE_SUDDEN_DEATH").unwrap().get(), Ok(false));
    assert_eq!(
        stats
            .table_float("TABLE_AVERAGE_PIECES_PER_TURN")
            .unwrap()
            .get(),
        Ok(0.0)
    );
}

#[test]
fn init_map_computes_per_player() {
    let mut stats = Stats::in_memory(game_schema()).unwrap();
    let mut turns = stats.player_int("PLAYER_NUMBER_TURNS").unwrap();
    turns
        .init_map(&PLAYERS, |p| (p.0 * p.0 + 1) as i64)
        .unwrap();
    assert_eq!(turns.get(P5), Ok(26));
    assert_eq!(turns.get(P7), Ok(50));
}

#[test]
fn player_int_set_and_increment() {
    let mut stats = Stats::for_test(game_schema(), &PLAYERS).unwrap();
    let mut turns = stats.player_int("PLAYER_NUMBER_TURNS").unwrap();

    turns.set(P5, 4).unwrap();
    assert_eq!(turns.get(P5), Ok(4));
    assert_eq!(turns.get(P7), Ok(0));

    turns.inc(P7).unwrap();
    turns.inc(P7).unwrap();
    turns.increment(P7, 3).unwrap();
    assert_eq!(turns.get(P5), Ok(4));
    assert_eq!(turns.get(P7), Ok(5));
}

#[test]
fn player_bool_and_float() {
    let mut stats = Stats::for_test(game_schema(), &PLAYERS).unwrap();

    stats
        .player_bool("PLAYER_MET_OBJECTIVE")
        .unwrap()
        .set(P5, true)
        .unwrap();
    assert_eq!(stats.player_bool("PLAYER_MET_OBJECTIVE").unwrap().get(P5), Ok(true));
    assert_eq!(stats.player_bool("PLAYER_MET_OBJECTIVE").unwrap().get(P7), Ok(false));

    let mut roll = stats.player_float("PLAYER_AVERAGE_DIE_ROLL").unwrap();
    roll.set(P5, 1.732).unwrap();
    roll.add(P7, 3.0).unwrap();
    roll.add(P7, 3.14159).unwrap();
    assert_eq!(roll.get(P5), Ok(1.732));
    assert!(close(roll.get(P7).unwrap(), 6.14159));
}

#[test]
fn table_int_increment() {
    let mut stats = Stats::for_test(game_schema(), &PLAYERS).unwrap();
    let mut cities = stats.table_int("TABLE_CITIES_CAPTURED").unwrap();
    cities.set(3).unwrap();
    cities.inc().unwrap();
    cities.inc().unwrap();
    cities.increment(3).unwrap();
    assert_eq!(cities.get(), Ok(8));
}

#[test]
fn concrete_player_scenario() {
    let schema = StatSchema::builder()
        .player("turns", ValueType::Int)
        .player("metObjective", ValueType::Bool)
        .table("citiesCaptured", ValueType::Int)
        .build()
        .unwrap();
    let mut stats = Stats::in_memory(schema).unwrap();
    stats.init_all(&PLAYERS).unwrap();

    assert_eq!(stats.player_int("PLAYER_TURNS").unwrap().get(P5), Ok(0));
    assert_eq!(stats.player_bool("PLAYER_METOBJECTIVE").unwrap().get(P7), Ok(false));
    assert_eq!(stats.table_int("TABLE_CITIESCAPTURED").unwrap().get(), Ok(0));

    let mut turns = stats.player_int("PLAYER_TURNS").unwrap();
    turns.set(P5, 4).unwrap();
    turns.inc(P7).unwrap();
    turns.increment(P7, 3).unwrap();
    assert_eq!(turns.get(P5), Ok(4));
    assert_eq!(turns.get(P7), Ok(4));
}

#[test]
fn concrete_deferred_scenario() {
    let schema = StatSchema::builder()
        .table("citiesCaptured", ValueType::Int)
        .build()
        .unwrap();
    let mut stats = Stats::deferred(MemoryStore::new(schema)).unwrap();
    let key = StatKey::table("citiesCaptured");

    stats
        .table_int("TABLE_CITIESCAPTURED")
        .unwrap()
        .init(0)
        .unwrap();
    stats.enter_deferred();
    assert!(stats.is_deferred());
    stats
        .table_int("TABLE_CITIESCAPTURED")
        .unwrap()
        .increment(3)
        .unwrap();

    assert_eq!(stats.store().inner().get(&key), Ok(StatValue::Int(0)));
    assert_eq!(stats.table_int("TABLE_CITIESCAPTURED").unwrap().get(), Ok(3));

    let log = stats.exit_deferred();
    assert_eq!(
        log.as_slice(),
        &[Operation {
            kind: OpKind::Increment,
            key: key.clone(),
            value: StatValue::Int(3),
        }]
    );

    stats.apply_all(&log).unwrap();
    assert_eq!(stats.store().inner().get(&key), Ok(StatValue::Int(3)));
}

#[test]
fn deferred_log_replays_onto_another_store() {
    let mut preview = Stats::deferred(MemoryStore::new(game_schema())).unwrap();
    preview.init_all(&PLAYERS).unwrap();
    let schema = preview.store().inner().schema_handle();
    let mut committed = Stats::for_test(schema, &PLAYERS).unwrap();

    preview.enter_deferred();
    preview
        .player_int("PLAYER_NUMBER_TURNS")
        .unwrap()
        .increment(P5, 2)
        .unwrap();
    preview
        .table_bool("TABLE_SUDDEN_DEATH")
        .unwrap()
        .set(true)
        .unwrap();
    let log = preview.exit_deferred();

    apply_all(&log, committed.store_mut()).unwrap();
    assert_eq!(committed.player_int("PLAYER_NUMBER_TURNS").unwrap().get(P5), Ok(2));
    assert_eq!(committed.table_bool("TABLE_SUDDEN_DEATH").unwrap().get(), Ok(true));
    // The recording store was never touched.
    assert_eq!(preview.player_int("PLAYER_NUMBER_TURNS").unwrap().get(P5), Ok(0));
}

#[test]
fn discarded_log_leaves_store_unchanged() {
    let mut stats = Stats::deferred(MemoryStore::new(game_schema())).unwrap();
    stats.init_all(&PLAYERS).unwrap();
    let before = stats.store().inner().snapshot();

    stats.enter_deferred();
    stats
        .table_float("TABLE_AVERAGE_PIECES_PER_TURN")
        .unwrap()
        .add(2.5)
        .unwrap();
    drop(stats.exit_deferred());

    assert_eq!(stats.store().inner().snapshot(), before);
}

#[test]
fn replay_reports_failing_index() {
    let mut stats = Stats::for_test(game_schema(), &PLAYERS).unwrap();
    let log = vec![
        Operation::increment(StatKey::player("number turns", P5), StatValue::Int(1)),
        Operation::increment(StatKey::player("met objective", P5), StatValue::Bool(true)),
    ]
    .into();

    let err = stats.apply_all(&log).unwrap_err();
    assert!(matches!(
        err,
        StatsError::Replay { index: 1, ref source }
            if matches!(**source, StatsError::UnsupportedOperation { .. })
    ));
    assert_eq!(stats.player_int("PLAYER_NUMBER_TURNS").unwrap().get(P5), Ok(1));
}

#[test]
fn increment_equivalence() {
    let mut stats = Stats::for_test(game_schema(), &PLAYERS).unwrap();
    let mut cities = stats.table_int("TABLE_CITIES_CAPTURED").unwrap();
    cities.set(10).unwrap();
    for _ in 0..7 {
        cities.increment(4).unwrap();
    }
    assert_eq!(cities.get(), Ok(10 + 7 * 4));
}

#[test]
fn deferred_visibility_matches_sequential_replay() {
    let mut stats = Stats::deferred(MemoryStore::new(game_schema())).unwrap();
    stats.init_all(&PLAYERS).unwrap();
    let mut reference = Stats::for_test(game_schema(), &PLAYERS).unwrap();

    stats.enter_deferred();
    for step in 1..=5 {
        stats
            .player_int("PLAYER_NUMBER_TURNS")
            .unwrap()
            .increment(P7, step)
            .unwrap();
        reference
            .player_int("PLAYER_NUMBER_TURNS")
            .unwrap()
            .increment(P7, step)
            .unwrap();
        assert_eq!(
            stats.player_int("PLAYER_NUMBER_TURNS").unwrap().get(P7),
            reference.player_int("PLAYER_NUMBER_TURNS").unwrap().get(P7)
        );
    }
    assert_eq!(stats.store().pending().len(), 5);
}

#[test]
fn scope_enforcement_on_every_operation() {
    let mut store = MemoryStore::new(game_schema());
    let table_with_player = StatKey::player("cities captured", P5);
    let player_without = StatKey::table("number turns");

    for key in [&table_with_player, &player_without] {
        assert!(matches!(
            store.init(key, StatValue::Int(0)),
            Err(StatsError::ScopeMismatch { .. })
        ));
        assert!(matches!(store.get(key), Err(StatsError::ScopeMismatch { .. })));
        assert!(matches!(
            store.set(key, StatValue::Int(1)),
            Err(StatsError::ScopeMismatch { .. })
        ));
        assert!(matches!(
            store.increment(key, StatValue::Int(1)),
            Err(StatsError::ScopeMismatch { .. })
        ));
    }

    let err = store.get(&player_without).unwrap_err();
    assert_eq!(
        err,
        StatsError::ScopeMismatch {
            stat: "number turns".into(),
            declared: Scope::Player,
            requested: Scope::Table,
        }
    );
}

#[test]
fn non_deferred_store_ignores_deferred_mode() {
    let mut stats = Stats::for_test(game_schema(), &PLAYERS).unwrap();
    stats.enter_deferred();
    assert!(!stats.is_deferred());
    stats
        .table_int("TABLE_CITIES_CAPTURED")
        .unwrap()
        .inc()
        .unwrap();
    assert!(stats.exit_deferred().is_empty());
    assert_eq!(stats.table_int("TABLE_CITIES_CAPTURED").unwrap().get(), Ok(1));
}

#[test]
fn overlay_over_borrowed_store() {
    let mut base = MemoryStore::new(game_schema());
    {
        let mut stats = Stats::new(DeferredStore::new(&mut base)).unwrap();
        stats.init_all(&PLAYERS).unwrap();
        stats.enter_deferred();
        stats
            .player_int("PLAYER_NUMBER_TURNS")
            .unwrap()
            .inc(P5)
            .unwrap();
    }
    assert_eq!(
        base.get(&StatKey::player("number turns", P5)),
        Ok(StatValue::Int(0))
    );
}
