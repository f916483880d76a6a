// ==========================================
// 露天矿运输跟踪系统 - 堆场质量报告引擎
// ==========================================
// 职责: 按堆场聚合直接入库与成功运输单, 计算混合后品位
// 输入: 堆场/入库合计/已关单载荷快照
// 口径: 加权合计用整数累加, 百分比用 f64 真除,
//       weight_after 为 0 时百分比取 0
// ==========================================

use crate::domain::storage::Storage;
use crate::domain::types::TripOutcome;
use crate::engine::lifecycle::TripLifecycleEngine;
use crate::geometry::{self, GeometryResult};
use crate::repository::storage_income_repo::StorageIncomeTotals;
use crate::repository::trip_repo::ClosedTripLoad;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

// ==========================================
// StorageReportRow - 报告行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageReportRow {
    pub storage_id: i64,
    pub title: String,
    pub weight_before_t: i64,        // 直接入库重量合计
    pub weight_after_t: i64,         // 混合后重量合计 (含成功运输单)
    pub percent_sio2_after: f64,     // 混合后 SiO2 品位
    pub percent_fe_after: f64,       // 混合后 Fe 品位
    pub quality_after: String,       // 品位描述 "{sio2}% SiO2, {fe}% Fe"
}

// ==========================================
// ReportEngine - 报告引擎
// ==========================================

/// 堆场质量报告引擎
///
/// 行序与堆场插入顺序一致 (storage.id 升序);
/// 无入库亦无运输单的堆场输出全零行
pub struct ReportEngine {
    lifecycle: TripLifecycleEngine,
    decimal_places: usize, // 品位显示小数位
}

impl ReportEngine {
    /// 创建新的报告引擎 (默认两位小数)
    pub fn new() -> Self {
        Self::with_precision(2)
    }

    /// 指定品位显示小数位创建
    pub fn with_precision(decimal_places: usize) -> Self {
        Self {
            lifecycle: TripLifecycleEngine::new(),
            decimal_places,
        }
    }

    /// 生成报告
    ///
    /// # 参数
    /// - storages: 全部堆场 (按插入顺序)
    /// - income_totals: 按堆场分组的直接入库加权合计
    /// - closed_loads: 全部已关单载荷
    ///
    /// # 返回
    /// - Ok(Vec<StorageReportRow>): 每个堆场一行
    /// - Err(GeometryError): 落库边界/卸载点解析失败 (数据损坏)
    pub fn build(
        &self,
        storages: &[Storage],
        income_totals: &[StorageIncomeTotals],
        closed_loads: &[ClosedTripLoad],
    ) -> GeometryResult<Vec<StorageReportRow>> {
        // 堆场边界快照 (卸载点归属判定)
        let mut territories = Vec::with_capacity(storages.len());
        for storage in storages {
            territories.push((storage.id, geometry::parse_territory(&storage.territory_wkt)?));
        }

        // 入库合计索引
        let income_by_storage: HashMap<i64, &StorageIncomeTotals> = income_totals
            .iter()
            .map(|t| (t.storage_id, t))
            .collect();

        // 成功运输单按命中堆场累加 (weight, sio2_weighted, fe_weighted)
        let mut trip_totals: HashMap<i64, (i64, i64, i64)> = HashMap::new();
        for load in closed_loads {
            let point = geometry::parse_unloading_point(&load.unloading_point_wkt)?;
            if let (TripOutcome::Successful, Some(storage_id)) =
                self.lifecycle.classify_closed(&point, &territories)
            {
                let entry = trip_totals.entry(storage_id).or_insert((0, 0, 0));
                entry.0 += load.weight_t;
                entry.1 += load.weight_t * load.sio2_pct;
                entry.2 += load.weight_t * load.fe_pct;
            }
        }

        let mut rows = Vec::with_capacity(storages.len());
        for storage in storages {
            let (weight_before, sio2_before, fe_before) = income_by_storage
                .get(&storage.id)
                .map(|t| (t.weight_t, t.sio2_weighted, t.fe_weighted))
                .unwrap_or((0, 0, 0));

            let (trip_weight, trip_sio2, trip_fe) = trip_totals
                .get(&storage.id)
                .copied()
                .unwrap_or((0, 0, 0));

            let weight_after = weight_before + trip_weight;
            let sio2_after_total = sio2_before + trip_sio2;
            let fe_after_total = fe_before + trip_fe;

            let (percent_sio2_after, percent_fe_after) = if weight_after > 0 {
                (
                    sio2_after_total as f64 / weight_after as f64,
                    fe_after_total as f64 / weight_after as f64,
                )
            } else {
                (0.0, 0.0)
            };

            rows.push(StorageReportRow {
                storage_id: storage.id,
                title: storage.title.clone(),
                weight_before_t: weight_before,
                weight_after_t: weight_after,
                percent_sio2_after,
                percent_fe_after,
                quality_after: format!(
                    "{:.prec$}% SiO2, {:.prec$}% Fe",
                    percent_sio2_after,
                    percent_fe_after,
                    prec = self.decimal_places
                ),
            });
        }

        debug!(rows = rows.len(), "报告生成完成");
        Ok(rows)
    }
}

impl Default for ReportEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn storage(id: i64, title: &str, territory_wkt: &str) -> Storage {
        Storage {
            id,
            title: title.to_string(),
            territory_wkt: territory_wkt.to_string(),
            created_at: DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
        }
    }

    fn demo_storage() -> Storage {
        storage(1, "一号堆场", "POLYGON ((30 10, 40 40, 20 40, 10 20, 30 10))")
    }

    #[test]
    fn test_report_single_income_no_trips() {
        let engine = ReportEngine::new();
        let storages = vec![demo_storage()];
        let incomes = vec![StorageIncomeTotals {
            storage_id: 1,
            weight_t: 900,
            sio2_weighted: 900 * 34,
            fe_weighted: 900 * 65,
        }];

        let rows = engine.build(&storages, &incomes, &[]).unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.weight_before_t, 900);
        assert_eq!(row.weight_after_t, 900);
        assert!((row.percent_sio2_after - 34.0).abs() < f64::EPSILON);
        assert!((row.percent_fe_after - 65.0).abs() < f64::EPSILON);
        assert_eq!(row.quality_after, "34.00% SiO2, 65.00% Fe");
    }

    #[test]
    fn test_report_empty_storage_is_zero_row() {
        let engine = ReportEngine::new();
        let storages = vec![demo_storage()];

        let rows = engine.build(&storages, &[], &[]).unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.weight_before_t, 0);
        assert_eq!(row.weight_after_t, 0);
        assert_eq!(row.percent_sio2_after, 0.0);
        assert_eq!(row.percent_fe_after, 0.0);
        assert_eq!(row.quality_after, "0.00% SiO2, 0.00% Fe");
    }

    #[test]
    fn test_report_mixes_income_and_successful_trips() {
        let engine = ReportEngine::new();
        let storages = vec![demo_storage()];
        let incomes = vec![StorageIncomeTotals {
            storage_id: 1,
            weight_t: 900,
            sio2_weighted: 900 * 34,
            fe_weighted: 900 * 65,
        }];
        let loads = vec![
            // 堆场内卸载, 计入
            ClosedTripLoad {
                trip_id: 1,
                unloading_point_wkt: "POINT(25 25)".to_string(),
                weight_t: 100,
                sio2_pct: 30,
                fe_pct: 60,
            },
            // 堆场外卸载, 不计入
            ClosedTripLoad {
                trip_id: 2,
                unloading_point_wkt: "POINT(0 0)".to_string(),
                weight_t: 500,
                sio2_pct: 50,
                fe_pct: 40,
            },
        ];

        let rows = engine.build(&storages, &incomes, &loads).unwrap();
        let row = &rows[0];

        assert_eq!(row.weight_before_t, 900);
        assert_eq!(row.weight_after_t, 1000);
        // (900*34 + 100*30) / 1000 = 33.6
        assert!((row.percent_sio2_after - 33.6).abs() < 1e-9);
        // (900*65 + 100*60) / 1000 = 64.5
        assert!((row.percent_fe_after - 64.5).abs() < 1e-9);
        assert_eq!(row.quality_after, "33.60% SiO2, 64.50% Fe");
    }

    #[test]
    fn test_report_boundary_unloading_counts() {
        let engine = ReportEngine::new();
        let storages = vec![demo_storage()];
        let loads = vec![ClosedTripLoad {
            trip_id: 1,
            unloading_point_wkt: "POINT(30 10)".to_string(), // 顶点
            weight_t: 100,
            sio2_pct: 30,
            fe_pct: 60,
        }];

        let rows = engine.build(&storages, &[], &loads).unwrap();
        assert_eq!(rows[0].weight_after_t, 100);
    }

    #[test]
    fn test_report_rows_follow_insertion_order() {
        let engine = ReportEngine::new();
        let storages = vec![
            storage(1, "一号堆场", "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))"),
            storage(2, "二号堆场", "POLYGON ((20 20, 30 20, 30 30, 20 30, 20 20))"),
        ];

        let rows = engine.build(&storages, &[], &[]).unwrap();
        assert_eq!(
            rows.iter().map(|r| r.storage_id).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn test_report_precision_follows_config() {
        let engine = ReportEngine::with_precision(1);
        let storages = vec![demo_storage()];
        let incomes = vec![StorageIncomeTotals {
            storage_id: 1,
            weight_t: 900,
            sio2_weighted: 900 * 34,
            fe_weighted: 900 * 65,
        }];

        let rows = engine.build(&storages, &incomes, &[]).unwrap();
        assert_eq!(rows[0].quality_after, "34.0% SiO2, 65.0% Fe");
    }
}
