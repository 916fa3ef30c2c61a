// ==========================================
// 工厂生产监控系统 - 告警领域模型
// ==========================================
// 创建者: 仅模拟引擎在效率跌落条件命中时创建
// 生命周期: 创建后不可变、永久保留(无关闭/处理流程)
// 去重键: (machine_id, alert_date, kind) 唯一
// ==========================================

use crate::domain::types::{AlertKind, AlertSeverity};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 告警
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,                     // 告警ID (自增主键)
    pub machine_id: i64,             // 关联机台
    pub message: String,             // 告警文本 (如 "Efficiency drop detected: 42%")
    pub severity: AlertSeverity,     // 告警级别
    pub kind: AlertKind,             // 告警类型 (去重键的一部分)
    pub alert_date: NaiveDate,       // 告警归属日历日 (去重键的一部分)
    pub created_at: NaiveDateTime,   // 创建时间
}
