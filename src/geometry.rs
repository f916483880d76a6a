// ==========================================
// 露天矿运输跟踪系统 - 几何基础设施
// ==========================================
// 职责: WKT 解析/序列化 + 相交/覆盖谓词 + 卸载坐标文本解析
// 谓词委托 geo 库: intersects 含边界接触, covers 含边界点
// 不含业务规则
// ==========================================

use geo::{Intersects, Point, Polygon, Relate};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use wkt::{ToWkt, TryFromWkt};

/// 卸载坐标文本 "X Y" 的匹配模式
///
/// 形状: 可选符号 + (整数 | 小数点前可省略的小数), 恰好一个空格分隔,
/// 首尾不允许多余字符
static XY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<x>[-+]?(?:\d*\.\d+|\d+)) (?P<y>[-+]?(?:\d*\.\d+|\d+))$")
        .expect("XY 模式为编译期常量")
});

// ==========================================
// 错误类型
// ==========================================

/// 几何层错误类型
#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("非法多边形 WKT: {0}")]
    InvalidPolygon(String),

    #[error("非法坐标点 WKT: {0}")]
    InvalidPoint(String),

    #[error("坐标文本格式不合法: \"{0}\"")]
    InvalidXyFormat(String),
}

/// Result 类型别名
pub type GeometryResult<T> = Result<T, GeometryError>;

// ==========================================
// WKT 解析/序列化
// ==========================================

/// 解析堆场边界多边形 WKT
///
/// # 参数
/// - wkt_text: 例如 "POLYGON ((30 10, 40 40, 20 40, 10 20, 30 10))"
///
/// # 返回
/// - Ok(Polygon): 解析成功
/// - Err(GeometryError::InvalidPolygon): 文本不是合法 POLYGON
pub fn parse_territory(wkt_text: &str) -> GeometryResult<Polygon<f64>> {
    Polygon::try_from_wkt_str(wkt_text)
        .map_err(|e| GeometryError::InvalidPolygon(format!("{:?}: {}", e, wkt_text)))
}

/// 解析卸载点 WKT
pub fn parse_unloading_point(wkt_text: &str) -> GeometryResult<Point<f64>> {
    Point::try_from_wkt_str(wkt_text)
        .map_err(|e| GeometryError::InvalidPoint(format!("{:?}: {}", e, wkt_text)))
}

/// 卸载点序列化为 WKT (存储格式)
pub fn point_to_wkt(point: &Point<f64>) -> String {
    point.wkt_string()
}

// ==========================================
// 坐标文本解析
// ==========================================

/// 解析操作员录入的卸载坐标文本 "X Y"
///
/// 合法示例: "10 20" / "+11 -22" / ".9 3.2"
/// 非法示例: "1d 20" / "" / "ad.9 3.2" / ".9 3.2dsa"
///
/// # 返回
/// - Ok(Point): 坐标点 (f64)
/// - Err(GeometryError::InvalidXyFormat): 文本不满足 "X Y" 形状
pub fn parse_xy(text: &str) -> GeometryResult<Point<f64>> {
    let captures = XY_PATTERN
        .captures(text)
        .ok_or_else(|| GeometryError::InvalidXyFormat(text.to_string()))?;

    // 模式保证两个捕获组均为合法小数字面量
    let x: f64 = captures["x"]
        .parse()
        .map_err(|_| GeometryError::InvalidXyFormat(text.to_string()))?;
    let y: f64 = captures["y"]
        .parse()
        .map_err(|_| GeometryError::InvalidXyFormat(text.to_string()))?;

    Ok(Point::new(x, y))
}

// ==========================================
// 谓词
// ==========================================

/// 两个堆场边界是否相交
///
/// 非不相交即相交: 内部交叠、边重合、公共单点均计入
pub fn territories_intersect(a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
    a.intersects(b)
}

/// 堆场边界是否覆盖卸载点 (covers 语义, 边界上的点计入)
pub fn territory_covers(territory: &Polygon<f64>, point: &Point<f64>) -> bool {
    territory.relate(point).is_covers()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_territory() -> Polygon<f64> {
        parse_territory("POLYGON ((30 10, 40 40, 20 40, 10 20, 30 10))").unwrap()
    }

    #[test]
    fn test_parse_xy_valid() {
        let p = parse_xy("10 20").unwrap();
        assert_eq!((p.x(), p.y()), (10.0, 20.0));

        let p = parse_xy("+11 -22").unwrap();
        assert_eq!((p.x(), p.y()), (11.0, -22.0));

        let p = parse_xy(".9 3.2").unwrap();
        assert_eq!((p.x(), p.y()), (0.9, 3.2));
    }

    #[test]
    fn test_parse_xy_invalid() {
        for text in ["1d 20", "", "ad.9 3.2", ".9 3.2dsa", "10", "10  20", "10 20 30", "10, 20"] {
            assert!(
                parse_xy(text).is_err(),
                "文本应解析失败: {:?}",
                text
            );
        }
    }

    #[test]
    fn test_parse_territory_invalid() {
        assert!(parse_territory("not wkt").is_err());
        // POINT 不是 POLYGON
        assert!(parse_territory("POINT (30 10)").is_err());
    }

    #[test]
    fn test_point_wkt_roundtrip() {
        let p = parse_xy("30 10").unwrap();
        let wkt_text = point_to_wkt(&p);
        let back = parse_unloading_point(&wkt_text).unwrap();
        assert_eq!((back.x(), back.y()), (30.0, 10.0));
    }

    #[test]
    fn test_covers_interior_and_boundary() {
        let territory = demo_territory();

        // 内部点
        assert!(territory_covers(&territory, &Point::new(25.0, 25.0)));
        // 顶点 (边界)
        assert!(territory_covers(&territory, &Point::new(30.0, 10.0)));
        // 边上的点 (边界): (40,40)-(20,40) 连线中点
        assert!(territory_covers(&territory, &Point::new(30.0, 40.0)));
        // 外部点
        assert!(!territory_covers(&territory, &Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_territories_intersect_inclusive() {
        let a = parse_territory("POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))").unwrap();

        // 内部交叠
        let overlapping = parse_territory("POLYGON ((5 5, 15 5, 15 15, 5 15, 5 5))").unwrap();
        assert!(territories_intersect(&a, &overlapping));

        // 共享边
        let edge_touching = parse_territory("POLYGON ((10 0, 20 0, 20 10, 10 10, 10 0))").unwrap();
        assert!(territories_intersect(&a, &edge_touching));

        // 公共单点
        let corner_touching =
            parse_territory("POLYGON ((10 10, 20 10, 20 20, 10 20, 10 10))").unwrap();
        assert!(territories_intersect(&a, &corner_touching));

        // 完全包含
        let contained = parse_territory("POLYGON ((2 2, 8 2, 8 8, 2 8, 2 2))").unwrap();
        assert!(territories_intersect(&a, &contained));

        // 不相交
        let disjoint = parse_territory("POLYGON ((20 20, 30 20, 30 30, 20 30, 20 20))").unwrap();
        assert!(!territories_intersect(&a, &disjoint));
    }
}
