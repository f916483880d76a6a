// ==========================================
// 端到端业务流集成测试
// ==========================================
// 测试目标: 建车队 → 建堆场 → 开单 → 关单 → 报告 完整闭环
// ==========================================


use mine_haul_tracker::domain::{OreComposition, TripOutcome};
use mine_haul_tracker::logging;

fn comp(weight_t: i64, sio2_pct: i64, fe_pct: i64) -> OreComposition {
    OreComposition {
        weight_t,
        sio2_pct,
        fe_pct,
    }
}

#[test]
fn test_full_business_flow() {
    // 初始化日志系统
    logging::init_test();

    println!("\n=== 测试：完整业务流 ===");

    // 步骤 1: 创建测试应用
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");
    println!("✓ 步骤 1: 测试应用已装配");

    // 步骤 2: 建车队 (2 型号, 3 卡车)
    let belaz = state.fleet_api.create_truck_model("БЕЛАЗ", 120).unwrap();
    let komatsu = state.fleet_api.create_truck_model("Komatsu", 110).unwrap();
    let t_101 = state.fleet_api.create_truck("101", belaz.id).unwrap();
    let t_102 = state.fleet_api.create_truck("102", belaz.id).unwrap();
    let t_k103 = state.fleet_api.create_truck("K103", komatsu.id).unwrap();
    println!("✓ 步骤 2: 车队已创建");

    // 步骤 3: 建堆场 (两个不相交边界) + 直接入库
    let s1 = state
        .storage_api
        .create_storage("一号堆场", "POLYGON ((30 10, 40 40, 20 40, 10 20, 30 10))")
        .unwrap();
    let s2 = state
        .storage_api
        .create_storage("二号堆场", "POLYGON ((50 50, 60 50, 60 60, 50 60, 50 50))")
        .unwrap();
    state
        .storage_api
        .record_direct_income(s1.id, &comp(900, 34, 65))
        .unwrap();
    println!("✓ 步骤 3: 堆场与直接入库已记录");

    // 步骤 4: 三台卡车开单
    let trip_101 = state.trip_api.start_trip(t_101.id, &comp(100, 32, 67)).unwrap();
    let trip_102 = state.trip_api.start_trip(t_102.id, &comp(125, 30, 65)).unwrap();
    let trip_k103 = state.trip_api.start_trip(t_k103.id, &comp(120, 35, 62)).unwrap();

    let views = state.trip_api.list_active_trips().unwrap();
    assert_eq!(views.len(), 3);
    // 125t / 120t 额定 → 超载 4%
    assert_eq!(views[1].overload_pct, 4);
    println!("✓ 步骤 4: 三张运输单已开");

    // 步骤 5: 关单 (一号堆场内 / 二号堆场内 / 场外)
    state.trip_api.close_trip(trip_101.id, "25 25").unwrap();
    state.trip_api.close_trip(trip_102.id, "55 55").unwrap();
    state.trip_api.close_trip(trip_k103.id, "0 0").unwrap();

    assert!(state.trip_api.list_active_trips().unwrap().is_empty());
    assert_eq!(
        state.trip_api.get_trip_status(trip_101.id).unwrap().outcome,
        Some(TripOutcome::Successful)
    );
    assert_eq!(
        state.trip_api.get_trip_status(trip_k103.id).unwrap().outcome,
        Some(TripOutcome::Failed)
    );
    println!("✓ 步骤 5: 运输单已关, 成败分类符合预期");

    // 步骤 6: 报告
    let rows = state.report_api.build_report().unwrap();
    assert_eq!(rows.len(), 2);

    // 一号堆场: 900t 入库 + 100t 运输单
    assert_eq!(rows[0].title, "一号堆场");
    assert_eq!(rows[0].weight_before_t, 900);
    assert_eq!(rows[0].weight_after_t, 1000);
    // (900*34 + 100*32) / 1000 = 33.8
    assert!((rows[0].percent_sio2_after - 33.8).abs() < 1e-9);
    // (900*65 + 100*67) / 1000 = 65.2
    assert!((rows[0].percent_fe_after - 65.2).abs() < 1e-9);
    assert_eq!(rows[0].quality_after, "33.80% SiO2, 65.20% Fe");

    // 二号堆场: 仅 125t 运输单
    assert_eq!(rows[1].title, "二号堆场");
    assert_eq!(rows[1].weight_before_t, 0);
    assert_eq!(rows[1].weight_after_t, 125);
    assert_eq!(rows[1].quality_after, "30.00% SiO2, 65.00% Fe");
    println!("✓ 步骤 6: 报告聚合符合预期");

    // 步骤 7: 操作日志覆盖全部写入
    let logs = state.action_log_repo.list_recent(50).unwrap();
    // 2 型号 + 3 卡车 + 2 堆场 + 1 入库 + 3 开单 + 3 关单 = 14
    assert_eq!(logs.len(), 14);
    println!("✓ 步骤 7: 操作日志完整");
}

#[test]
fn test_report_after_factory_reset_flow() {
    let (_temp_file, state) = test_helpers::create_test_state().expect("Failed to create state");

    state.maintenance_api.factory_reset(true).unwrap();

    // 演示集上继续操作: 关一张演示运输单到堆场内
    let views = state.trip_api.list_active_trips().unwrap();
    assert_eq!(views.len(), 3);
    let first_trip = views[0].trip_id;

    state.trip_api.close_trip(first_trip, "25 25").unwrap();

    let rows = state.report_api.build_report().unwrap();
    assert_eq!(rows.len(), 1);
    // 900t 入库 + 100t 演示载荷 (32% SiO2, 67% Fe)
    assert_eq!(rows[0].weight_after_t, 1000);
    assert!((rows[0].percent_sio2_after - 33.8).abs() < 1e-9);
}
