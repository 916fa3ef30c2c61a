// ==========================================
// 工厂生产监控系统 - 厂区配置
// ==========================================
// 职责: 配置加载与缺省回退
// 存储: settings 表 (key-value)
// 设计: 配置作为显式对象传入各引擎,不做 ad hoc 读取;
//       缺省回退在加载时一次性完成,引擎侧不再出现兜底逻辑
// ==========================================

use crate::repository::settings_repo::SettingsRepository;
use crate::repository::RepositoryResult;
use serde::{Deserialize, Serialize};

/// 班次时长（小时），利用率计算的分母
pub const SHIFT_HOURS: f64 = 8.0;

/// 默认厂区名称
pub const DEFAULT_PLANT_NAME: &str = "Nagpur MIDC Zone-A";

/// 默认效率阈值（百分比）
pub const DEFAULT_THRESHOLD_EFF: f64 = 75.0;

// ==========================================
// PlantConfig - 厂区配置
// ==========================================

/// 厂区配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantConfig {
    /// 厂区显示名称
    pub plant_name: String,
    /// 效率阈值（百分比），机台状态判定与告警触发的基准
    pub threshold_eff: f64,
    /// 班次时长（小时）
    pub shift_hours: f64,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            plant_name: DEFAULT_PLANT_NAME.to_string(),
            threshold_eff: DEFAULT_THRESHOLD_EFF,
            shift_hours: SHIFT_HOURS,
        }
    }
}

impl PlantConfig {
    /// 从 settings 表加载配置
    ///
    /// # 回退规则
    /// - plant_name 缺失: 使用默认名称
    /// - threshold_eff 缺失或无法解析为浮点数: 静默回退 75.0,不报错
    ///
    /// # 返回
    /// - Ok(PlantConfig): 加载后的配置
    /// - Err: 仅在数据库访问失败时
    pub fn load(settings: &SettingsRepository) -> RepositoryResult<Self> {
        let plant_name = settings
            .get("plant_name")?
            .unwrap_or_else(|| DEFAULT_PLANT_NAME.to_string());

        let threshold_eff = settings
            .get("threshold_eff")?
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .unwrap_or(DEFAULT_THRESHOLD_EFF);

        Ok(Self {
            plant_name,
            threshold_eff,
            shift_hours: SHIFT_HOURS,
        })
    }
}
