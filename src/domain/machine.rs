// ==========================================
// 工厂生产监控系统 - 机台领域模型
// ==========================================
// 用途: 机台主数据,注册后不可变(本系统不提供修改/删除)
// ==========================================

use serde::{Deserialize, Serialize};

/// 机台
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub id: i64,                   // 机台ID (自增主键)
    pub name: String,              // 机台名称 (如 CNC-01)
    #[serde(rename = "type")]
    pub machine_type: String,      // 机台类型 (如 Milling / Press / Packing)
    pub capacity_per_hour: i64,    // 小时产能 (件/小时)
}

impl Machine {
    /// 默认日计划产量 = 小时产能 × 班次时长(8小时)
    ///
    /// 机台注册时用于生成当日生产记录的 planned_qty
    pub fn default_daily_plan(&self) -> i64 {
        self.capacity_per_hour * 8
    }
}
