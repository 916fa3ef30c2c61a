// ==========================================
// 工厂生产监控系统 - 生产记录领域模型
// ==========================================
// 约定: 每台机台每个日历日一条记录(约定而非数据库约束)
// 写入者: 当日记录仅由模拟引擎推进,历史记录来自种子数据
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 生产记录（机台 × 日历日）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionLog {
    pub id: i64,                // 记录ID (自增主键)
    pub machine_id: i64,        // 关联机台
    pub date: NaiveDate,        // 日历日 (厂区本地,无时区)
    pub planned_qty: i64,       // 计划产量 (>= 0)
    pub actual_qty: i64,        // 实际产量 (>= 0, 通常 <= planned_qty, 不强制)
    pub runtime_hours: f64,     // 运行时长 (小时, 名义上 0 <= x <= 班次时长)
}

impl ProductionLog {
    /// 效率百分比
    ///
    /// # 规则
    /// - planned_qty > 0: actual_qty / planned_qty * 100
    /// - planned_qty = 0: 恒为 0 (显式防除零)
    pub fn efficiency(&self) -> f64 {
        if self.planned_qty > 0 {
            self.actual_qty as f64 / self.planned_qty as f64 * 100.0
        } else {
            0.0
        }
    }

    /// 是否存在生产延误 (实际产量落后于计划)
    pub fn is_delayed(&self) -> bool {
        self.actual_qty < self.planned_qty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(planned: i64, actual: i64) -> ProductionLog {
        ProductionLog {
            id: 1,
            machine_id: 1,
            date: NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
            planned_qty: planned,
            actual_qty: actual,
            runtime_hours: 0.0,
        }
    }

    #[test]
    fn test_efficiency_zero_planned() {
        // planned_qty = 0 时效率恒为 0,不得除零
        assert_eq!(log(0, 100).efficiency(), 0.0);
    }

    #[test]
    fn test_efficiency_normal() {
        assert_eq!(log(800, 760).efficiency(), 95.0);
        assert_eq!(log(4000, 2000).efficiency(), 50.0);
    }
}
