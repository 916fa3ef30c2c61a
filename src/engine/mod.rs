// ==========================================
// 工厂生产监控系统 - 引擎层
// ==========================================
// 职责: 业务规则 (KPI 计算 / 多日分析 / 生产模拟与告警)
// 约束: KPI / 分析引擎为纯计算,数据由调用方查询后传入;
//       模拟引擎是 production_logs 进度与 alerts 的唯一写入者
// ==========================================

pub mod analytics;
pub mod kpi;
pub mod simulation;

pub use analytics::{AnalyticsEngine, AnalyticsView, EfficiencyTrend, MachineRanking};
pub use kpi::{DashboardKpis, KpiEngine, KpiSummary, MachineKpi};
pub use simulation::{SimulationEngine, SimulationTickReport};

/// 四舍五入到 1 位小数（百分比、小时数的展示精度）
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// 四舍五入到 2 位小数（runtime_hours 的存储精度）
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
