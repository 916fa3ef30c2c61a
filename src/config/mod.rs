// ==========================================
// 工厂生产监控系统 - 配置层
// ==========================================
// 职责: 从 settings 表加载厂区配置,缺省/非法值在加载时回退
// ==========================================

pub mod plant_config;

pub use plant_config::{PlantConfig, DEFAULT_PLANT_NAME, DEFAULT_THRESHOLD_EFF, SHIFT_HOURS};
