// ==========================================
// 工厂生产监控系统 - 领域枚举类型
// ==========================================
// 职责: 机台状态 / 告警级别 / 告警类型 的统一定义
// 约束: 字符串形式与数据库、前端 JSON 保持一致
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// MachineStatus - 机台效率状态
// ==========================================

/// 机台效率状态
///
/// # 判定规则（threshold 为效率阈值，默认 75.0）
/// - `Critical`: efficiency < threshold
/// - `Warning`: threshold <= efficiency < threshold + 15
/// - `Good`: efficiency >= threshold + 15
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineStatus {
    Good,
    Warning,
    Critical,
}

impl MachineStatus {
    /// 根据效率与阈值判定状态
    ///
    /// # 参数
    /// - `efficiency`: 效率百分比
    /// - `threshold`: 效率阈值百分比
    pub fn classify(efficiency: f64, threshold: f64) -> Self {
        if efficiency < threshold {
            MachineStatus::Critical
        } else if efficiency < threshold + 15.0 {
            MachineStatus::Warning
        } else {
            MachineStatus::Good
        }
    }

    /// 转换为字符串（用于 JSON 输出）
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineStatus::Good => "Good",
            MachineStatus::Warning => "Warning",
            MachineStatus::Critical => "Critical",
        }
    }
}

// ==========================================
// AlertSeverity - 告警级别
// ==========================================

/// 告警级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

impl AlertSeverity {
    /// 转换为字符串（用于数据库存储）
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Critical => "Critical",
            AlertSeverity::Warning => "Warning",
            AlertSeverity::Info => "Info",
        }
    }

    /// 从数据库字符串解析
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(AlertSeverity::Critical),
            "Warning" => Some(AlertSeverity::Warning),
            "Info" => Some(AlertSeverity::Info),
            _ => None,
        }
    }
}

// ==========================================
// AlertKind - 告警类型
// ==========================================

/// 告警类型
///
/// 与 alert_date / machine_id 组成告警去重键:
/// 同一机台同一天同一类型的告警至多一条
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    /// 效率跌落（模拟引擎在效率 < 60% 时触发）
    EfficiencyDrop,
}

impl AlertKind {
    /// 转换为字符串（用于数据库存储）
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::EfficiencyDrop => "EFFICIENCY_DROP",
        }
    }

    /// 从数据库字符串解析
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EFFICIENCY_DROP" => Some(AlertKind::EfficiencyDrop),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classify_boundaries() {
        // 阈值 75.0: 低于阈值为 Critical
        assert_eq!(MachineStatus::classify(74.9, 75.0), MachineStatus::Critical);
        // 恰好等于阈值为 Warning
        assert_eq!(MachineStatus::classify(75.0, 75.0), MachineStatus::Warning);
        // 阈值 + 15 以内为 Warning
        assert_eq!(MachineStatus::classify(89.9, 75.0), MachineStatus::Warning);
        // 阈值 + 15 及以上为 Good
        assert_eq!(MachineStatus::classify(90.0, 75.0), MachineStatus::Good);
    }

    #[test]
    fn test_severity_roundtrip() {
        for sev in [
            AlertSeverity::Critical,
            AlertSeverity::Warning,
            AlertSeverity::Info,
        ] {
            assert_eq!(AlertSeverity::parse(sev.as_str()), Some(sev));
        }
        assert_eq!(AlertSeverity::parse("UNKNOWN"), None);
    }
}
