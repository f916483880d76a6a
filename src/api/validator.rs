// ==========================================
// 露天矿运输跟踪系统 - 输入校验器
// ==========================================
// 职责: 创建流水线显式调用的具名校验函数 (按实体种类参数化)
// 校验仅用于友好报错, 存储层约束同口径兜底
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::mineral::OreComposition;

/// 名称/编号非空校验
///
/// # 参数
/// - field: 字段名 (报错用)
/// - value: 提交原文
pub fn validate_title(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput(format!("{} 不能为空", field)));
    }
    Ok(())
}

/// 型号额定载重校验 (> 0)
pub fn validate_max_weight(max_weight_t: i64) -> ApiResult<()> {
    if max_weight_t <= 0 {
        return Err(ApiError::InvalidComposition {
            fields: vec!["max_weight".to_string()],
        });
    }
    Ok(())
}

/// 矿石成分校验
///
/// 规则: weight > 0; sio2, fe ∈ (0,100); sio2 + fe < 100
/// 一次性收集全部违规字段 (和超限同时命名 sio2 与 fe)
pub fn validate_composition(comp: &OreComposition) -> ApiResult<()> {
    let mut fields: Vec<String> = Vec::new();

    if comp.weight_t <= 0 {
        fields.push("weight".to_string());
    }
    if comp.sio2_pct <= 0 || comp.sio2_pct >= 100 {
        fields.push("sio2".to_string());
    }
    if comp.fe_pct <= 0 || comp.fe_pct >= 100 {
        fields.push("fe".to_string());
    }
    if comp.sio2_pct + comp.fe_pct >= 100 {
        for field in ["sio2", "fe"] {
            if !fields.iter().any(|f| f == field) {
                fields.push(field.to_string());
            }
        }
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ApiError::InvalidComposition { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comp(weight_t: i64, sio2_pct: i64, fe_pct: i64) -> OreComposition {
        OreComposition {
            weight_t,
            sio2_pct,
            fe_pct,
        }
    }

    fn violated_fields(result: ApiResult<()>) -> Vec<String> {
        match result {
            Err(ApiError::InvalidComposition { fields }) => fields,
            other => panic!("应返回 InvalidComposition, 实际: {:?}", other),
        }
    }

    #[test]
    fn test_valid_composition() {
        assert!(validate_composition(&comp(100, 32, 67)).is_ok());
        // 边界内最小值
        assert!(validate_composition(&comp(1, 1, 1)).is_ok());
    }

    #[test]
    fn test_weight_must_be_positive() {
        assert_eq!(violated_fields(validate_composition(&comp(0, 30, 60))), ["weight"]);
        assert_eq!(violated_fields(validate_composition(&comp(-5, 30, 60))), ["weight"]);
    }

    #[test]
    fn test_percent_open_interval() {
        assert_eq!(violated_fields(validate_composition(&comp(10, 0, 60))), ["sio2"]);
        // sio2=100 同时触发和超限, 不重复命名
        assert_eq!(
            violated_fields(validate_composition(&comp(10, 100, 60))),
            ["sio2", "fe"]
        );
        assert_eq!(violated_fields(validate_composition(&comp(10, 30, 0))), ["fe"]);
    }

    #[test]
    fn test_sum_violation_names_both_fields() {
        // 50 + 50 = 100, 单字段均合法
        assert_eq!(
            violated_fields(validate_composition(&comp(10, 50, 50))),
            ["sio2", "fe"]
        );
        assert_eq!(
            violated_fields(validate_composition(&comp(10, 60, 70))),
            ["sio2", "fe"]
        );
    }

    #[test]
    fn test_multiple_violations_reported_together() {
        assert_eq!(
            violated_fields(validate_composition(&comp(0, 0, 100))),
            ["weight", "sio2", "fe"]
        );
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("title", "БЕЛАЗ").is_ok());
        assert!(validate_title("title", "").is_err());
        assert!(validate_title("title", "   ").is_err());
    }

    #[test]
    fn test_validate_max_weight() {
        assert!(validate_max_weight(120).is_ok());
        let err = validate_max_weight(0).unwrap_err();
        match err {
            ApiError::InvalidComposition { fields } => assert_eq!(fields, ["max_weight"]),
            other => panic!("应返回 InvalidComposition, 实际: {:?}", other),
        }
    }
}
