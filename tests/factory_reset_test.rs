// ==========================================
// 演示数据重置集成测试
// ==========================================
// 测试目标: 清空 + 固定演示集 + 幂等性 + 管理员账号
// ==========================================


use mine_haul_tracker::domain::OreComposition;
use mine_haul_tracker::logging;

/// 演示集固定计数: 2 型号 / 3 卡车 / 4 载荷 / 3 活跃运输单 / 1 堆场 / 1 直接入库
fn assert_demo_counts(db_path: &str) {
    let conn = test_helpers::open_test_connection(db_path).expect("Failed to open db");

    let count = |table: &str| -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .unwrap()
    };

    assert_eq!(count("truck_model"), 2, "truck_model 计数");
    assert_eq!(count("truck"), 3, "truck 计数");
    assert_eq!(count("mineral"), 4, "mineral 计数");
    assert_eq!(count("trip"), 3, "trip 计数");
    assert_eq!(count("storage"), 1, "storage 计数");
    assert_eq!(count("storage_income"), 1, "storage_income 计数");

    // 演示运输单全部活跃
    let active: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM trip WHERE unloading_point_wkt IS NULL",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(active, 3, "活跃运输单计数");
}

#[test]
fn test_factory_reset_seeds_demo_data() {
    logging::init_test();

    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    state.maintenance_api.factory_reset(true).unwrap();
    assert_demo_counts(&state.db_path);

    // 演示报告: 单堆场, 入库 900t (34% SiO2, 65% Fe), 无已关单
    let rows = state.report_api.build_report().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].weight_before_t, 900);
    assert_eq!(rows[0].weight_after_t, 900);
    assert_eq!(rows[0].quality_after, "34.00% SiO2, 65.00% Fe");
}

#[test]
fn test_factory_reset_is_idempotent() {
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    state.maintenance_api.factory_reset(true).unwrap();
    state.maintenance_api.factory_reset(true).unwrap();
    assert_demo_counts(&state.db_path);
}

#[test]
fn test_factory_reset_clears_prior_operational_data() {
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    // 先写入一批业务数据
    let model = state.fleet_api.create_truck_model("Caterpillar", 90).unwrap();
    let truck = state.fleet_api.create_truck("C-1", model.id).unwrap();
    let storage = state
        .storage_api
        .create_storage("旧堆场", "POLYGON ((100 100, 110 100, 110 110, 100 110, 100 100))")
        .unwrap();
    state
        .storage_api
        .record_direct_income(
            storage.id,
            &OreComposition {
                weight_t: 50,
                sio2_pct: 20,
                fe_pct: 30,
            },
        )
        .unwrap();
    let trip = state
        .trip_api
        .start_trip(
            truck.id,
            &OreComposition {
                weight_t: 80,
                sio2_pct: 25,
                fe_pct: 35,
            },
        )
        .unwrap();
    state.trip_api.close_trip(trip.id, "105 105").unwrap();

    state.maintenance_api.factory_reset(false).unwrap();

    // 旧数据全部清空, 只剩演示集
    assert_demo_counts(&state.db_path);
    let storages = state.storage_api.list_storages().unwrap();
    assert_eq!(storages.len(), 1);
    assert_eq!(storages[0].title, "一号堆场");
}

#[test]
fn test_factory_reset_admin_account_flag() {
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");
    let conn = test_helpers::open_test_connection(&state.db_path).expect("Failed to open db");

    // 不重置管理员: 账号表保持为空
    state.maintenance_api.factory_reset(false).unwrap();
    let accounts: i64 = conn
        .query_row("SELECT COUNT(*) FROM operator_account", [], |row| row.get(0))
        .unwrap();
    assert_eq!(accounts, 0);

    // 重置管理员: 写入内置超级用户
    state.maintenance_api.factory_reset(true).unwrap();
    let (username, is_superuser): (String, i64) = conn
        .query_row(
            "SELECT username, is_superuser FROM operator_account",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(username, "admin");
    assert_eq!(is_superuser, 1);

    // 口令存摘要, 不落明文
    let digest: String = conn
        .query_row("SELECT password_sha256 FROM operator_account", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(digest.len(), 64);
    assert_ne!(digest, "admin");
}

#[test]
fn test_factory_reset_writes_action_log() {
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    state.maintenance_api.factory_reset(true).unwrap();

    let logs = state.action_log_repo.list_recent(10).unwrap();
    assert_eq!(logs.len(), 1, "重置后只保留重置动作本身");
    assert_eq!(logs[0].action_type, "FACTORY_RESET");
}
