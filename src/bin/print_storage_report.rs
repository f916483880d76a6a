// ==========================================
// 露天矿运输跟踪系统 - 报告打印工具
// ==========================================
// 用法: print-storage-report [db_path]
// 按堆场插入顺序输出: 名称 / 入库重量 / 混合后重量 / 品位
// ==========================================

use std::error::Error;

use mine_haul_tracker::app::{get_default_db_path, AppState};
use mine_haul_tracker::i18n::{set_locale, t, t_with_args};
use mine_haul_tracker::logging;

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);

    let state = AppState::new(db_path)?;

    // 界面语言取自配置
    if let Ok(locale) = state.config_manager.get_locale() {
        set_locale(&locale);
    }

    let rows = state.report_api.build_report()?;

    println!("== {} ==", t("report.header"));
    if rows.is_empty() {
        println!("{}", t("report.empty"));
        return Ok(());
    }

    for row in &rows {
        println!(
            "{}\tweight_before={}t\tweight_after={}t\t{}",
            row.title, row.weight_before_t, row.weight_after_t, row.quality_after
        );
    }

    println!(
        "{}",
        t_with_args("report.generated_rows", &[("count", &rows.len().to_string())])
    );

    Ok(())
}
