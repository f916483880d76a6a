// ==========================================
// 实体规则层集成测试
// ==========================================
// 测试目标: 忽略大小写唯一性 / 边界不相交 / 成分校验
// 经 API 层走到存储层, 验证完整创建流水线
// ==========================================


use mine_haul_tracker::domain::OreComposition;
use mine_haul_tracker::logging;
use mine_haul_tracker::ApiError;

// ==========================================
// 忽略大小写唯一性
// ==========================================

#[test]
fn test_truck_model_title_unique_ignore_case() {
    logging::init_test();

    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    state
        .fleet_api
        .create_truck_model("Komatsu", 110)
        .expect("首次创建应成功");

    // 仅大小写不同, 第二次插入失败
    let err = state
        .fleet_api
        .create_truck_model("KOMATSU", 120)
        .unwrap_err();
    match err {
        ApiError::DuplicateKey { field, value } => {
            assert_eq!(field, "title");
            assert_eq!(value, "KOMATSU");
        }
        other => panic!("应返回 DuplicateKey, 实际: {:?}", other),
    }

    // 西里尔字母同样按 Unicode 小写归一化
    state
        .fleet_api
        .create_truck_model("БЕЛАЗ", 120)
        .expect("创建应成功");
    let err = state
        .fleet_api
        .create_truck_model("белаз", 120)
        .unwrap_err();
    assert!(matches!(err, ApiError::DuplicateKey { .. }));
}

#[test]
fn test_truck_number_unique_ignore_case() {
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    let model = state.fleet_api.create_truck_model("Komatsu", 110).unwrap();
    state.fleet_api.create_truck("K103", model.id).unwrap();

    let err = state.fleet_api.create_truck("k103", model.id).unwrap_err();
    match err {
        ApiError::DuplicateKey { field, .. } => assert_eq!(field, "number"),
        other => panic!("应返回 DuplicateKey, 实际: {:?}", other),
    }
}

#[test]
fn test_storage_title_unique_ignore_case() {
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    state
        .storage_api
        .create_storage("Main", "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))")
        .unwrap();

    let err = state
        .storage_api
        .create_storage("MAIN", "POLYGON ((20 20, 30 20, 30 30, 20 30, 20 20))")
        .unwrap_err();
    assert!(matches!(err, ApiError::DuplicateKey { .. }));
}

#[test]
fn test_empty_title_rejected() {
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    assert!(matches!(
        state.fleet_api.create_truck_model("", 120).unwrap_err(),
        ApiError::InvalidInput(_)
    ));
    assert!(matches!(
        state.fleet_api.create_truck_model("   ", 120).unwrap_err(),
        ApiError::InvalidInput(_)
    ));
}

#[test]
fn test_max_weight_must_be_positive() {
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    let err = state.fleet_api.create_truck_model("BelAZ", 0).unwrap_err();
    match err {
        ApiError::InvalidComposition { fields } => assert_eq!(fields, vec!["max_weight"]),
        other => panic!("应返回 InvalidComposition, 实际: {:?}", other),
    }
}

// ==========================================
// 堆场边界不相交
// ==========================================

#[test]
fn test_overlapping_territory_rejected() {
    logging::init_test();

    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    state
        .storage_api
        .create_storage("一号堆场", "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))")
        .expect("首个堆场应创建成功");

    // 内部交叠
    let err = state
        .storage_api
        .create_storage("二号堆场", "POLYGON ((5 5, 15 5, 15 15, 5 15, 5 5))")
        .unwrap_err();
    match err {
        ApiError::TerritoryOverlap { existing_title } => {
            assert_eq!(existing_title, "一号堆场");
        }
        other => panic!("应返回 TerritoryOverlap, 实际: {:?}", other),
    }

    // 完全包含
    let err = state
        .storage_api
        .create_storage("三号堆场", "POLYGON ((2 2, 8 2, 8 8, 2 8, 2 2))")
        .unwrap_err();
    assert!(matches!(err, ApiError::TerritoryOverlap { .. }));
}

#[test]
fn test_boundary_touching_territory_rejected() {
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    state
        .storage_api
        .create_storage("一号堆场", "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))")
        .unwrap();

    // 共享边也算相交
    let err = state
        .storage_api
        .create_storage("二号堆场", "POLYGON ((10 0, 20 0, 20 10, 10 10, 10 0))")
        .unwrap_err();
    assert!(matches!(err, ApiError::TerritoryOverlap { .. }));

    // 公共单点也算相交
    let err = state
        .storage_api
        .create_storage("三号堆场", "POLYGON ((10 10, 20 10, 20 20, 10 20, 10 10))")
        .unwrap_err();
    assert!(matches!(err, ApiError::TerritoryOverlap { .. }));

    // 不相交的边界可以创建
    state
        .storage_api
        .create_storage("四号堆场", "POLYGON ((30 30, 40 30, 40 40, 30 40, 30 30))")
        .expect("不相交边界应创建成功");
}

#[test]
fn test_malformed_territory_rejected() {
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    let err = state
        .storage_api
        .create_storage("一号堆场", "not a polygon")
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    // POINT 不是 POLYGON
    let err = state
        .storage_api
        .create_storage("一号堆场", "POINT (1 2)")
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

// ==========================================
// 矿石成分
// ==========================================

#[test]
fn test_composition_sum_rule_names_both_fields() {
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    let storage = state
        .storage_api
        .create_storage("一号堆场", "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))")
        .unwrap();

    // sio2 + fe >= 100, 两个字段同时命名
    let err = state
        .storage_api
        .record_direct_income(
            storage.id,
            &OreComposition {
                weight_t: 100,
                sio2_pct: 60,
                fe_pct: 70,
            },
        )
        .unwrap_err();
    match err {
        ApiError::InvalidComposition { fields } => {
            assert_eq!(fields, vec!["sio2", "fe"]);
        }
        other => panic!("应返回 InvalidComposition, 实际: {:?}", other),
    }
}

#[test]
fn test_composition_valid_income_accepted() {
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    let storage = state
        .storage_api
        .create_storage("一号堆场", "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))")
        .unwrap();

    let income = state
        .storage_api
        .record_direct_income(
            storage.id,
            &OreComposition {
                weight_t: 900,
                sio2_pct: 34,
                fe_pct: 65,
            },
        )
        .expect("合法成分应入库成功");
    assert_eq!(income.storage_id, storage.id);
}

#[test]
fn test_income_to_missing_storage_is_not_found() {
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    let err = state
        .storage_api
        .record_direct_income(
            999,
            &OreComposition {
                weight_t: 100,
                sio2_pct: 30,
                fe_pct: 60,
            },
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

// ==========================================
// 存储层兜底 (绕过 API 预检直接写库)
// ==========================================

#[test]
fn test_storage_layer_backstops_constraints() {
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");
    let conn = test_helpers::open_test_connection(&state.db_path).expect("Failed to open db");

    // 归一化唯一索引拦截大小写重复
    conn.execute(
        "INSERT INTO truck_model (title, title_norm, max_weight_t, created_at, updated_at)
         VALUES ('Komatsu', 'komatsu', 110, datetime('now'), datetime('now'))",
        [],
    )
    .unwrap();
    let err = conn
        .execute(
            "INSERT INTO truck_model (title, title_norm, max_weight_t, created_at, updated_at)
             VALUES ('KOMATSU', 'komatsu', 120, datetime('now'), datetime('now'))",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("UNIQUE"));

    // CHECK 约束拦截非法成分
    let err = conn
        .execute(
            "INSERT INTO mineral (weight_t, sio2_pct, fe_pct, created_at)
             VALUES (100, 60, 70, datetime('now'))",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("ck_mineral_sio2_fe_lt_100"));
}
