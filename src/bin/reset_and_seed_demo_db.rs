// ==========================================
// 露天矿运输跟踪系统 - 演示库重置工具
// ==========================================
// 用法: reset-and-seed-demo-db [db_path] [--keep-admin]
// 既有库先备份为 <db_path>.bak.<时间戳> 再重建
// ==========================================

use std::error::Error;
use std::fs;
use std::path::Path;

use chrono::Local;

use mine_haul_tracker::app::{get_default_db_path, AppState};
use mine_haul_tracker::i18n::t;
use mine_haul_tracker::logging;

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let db_path = std::env::args()
        .nth(1)
        .filter(|arg| !arg.starts_with("--"))
        .unwrap_or_else(get_default_db_path);

    let keep_admin = std::env::args().any(|arg| arg == "--keep-admin");

    backup_and_reset_db(&db_path)?;

    if let Some(parent) = Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let state = AppState::new(db_path.clone())?;
    state.maintenance_api.factory_reset(!keep_admin)?;

    println!("{}", t("reset.done"));
    if !keep_admin {
        println!("{}", t("reset.admin_reset"));
    }

    print_quick_counts(&state)?;

    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn print_quick_counts(state: &AppState) -> Result<(), Box<dyn Error>> {
    let models = state.fleet_api.list_truck_models()?;
    let trucks = state.fleet_api.list_trucks()?;
    let storages = state.storage_api.list_storages()?;
    let active_trips = state.trip_api.list_active_trips()?;

    println!(
        "truck_model={} truck={} storage={} active_trip={}",
        models.len(),
        trucks.len(),
        storages.len(),
        active_trips.len()
    );

    Ok(())
}
