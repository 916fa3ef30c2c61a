// ==========================================
// 工厂生产监控系统 - KPI 引擎
// ==========================================
// 职责: 当日机台效率/利用率/闲置指标 + 厂区汇总
// 输入: 机台清单(按ID升序) + 当日生产记录 + 厂区配置
// 输出: DashboardKpis (看板数据,只读计算)
// ==========================================

use crate::config::PlantConfig;
use crate::domain::machine::Machine;
use crate::domain::production_log::ProductionLog;
use crate::domain::types::MachineStatus;
use crate::engine::round1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// 输出结构
// ==========================================

/// 单台机台的当日 KPI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineKpi {
    pub id: i64,
    pub name: String,
    pub efficiency: f64,       // 效率百分比 (1位小数)
    pub utilization: f64,      // 利用率百分比 (1位小数)
    pub idle_time: f64,        // 闲置时长小时 (1位小数, 下限0)
    pub actual_qty: i64,
    pub planned_qty: i64,
    pub status: MachineStatus, // 阈值判定状态
}

/// 厂区汇总指标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiSummary {
    pub avg_efficiency: f64,   // 全厂平均效率 (无数据时为0)
    pub total_machines: usize, // 当日有生产记录的机台数
    pub delayed_orders: usize, // 实际产量落后计划的机台数
    pub bottleneck: String,    // 效率最低机台名称 (无数据时为 "None")
}

/// 看板 KPI 聚合结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardKpis {
    pub summary: KpiSummary,
    pub machines: Vec<MachineKpi>,
}

// ==========================================
// KpiEngine - KPI 引擎
// ==========================================
pub struct KpiEngine {
    // 无状态引擎,不需要注入依赖
    // Repository 操作由调用方处理
}

impl Default for KpiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl KpiEngine {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 计算当日看板 KPI
    ///
    /// # 参数
    /// - `machines`: 机台清单，按ID升序（瓶颈并列时最小ID优先依赖此顺序）
    /// - `today_logs`: 当日生产记录
    /// - `config`: 厂区配置（阈值/班次时长已在加载时补齐缺省）
    ///
    /// # 规则
    /// - efficiency = actual / planned * 100 (planned=0 时恒为0)
    /// - utilization = runtime / shift_hours * 100
    /// - idle_time = max(0, shift_hours - runtime)
    /// - 当日无生产记录的机台不参与任何指标
    pub fn compute(
        &self,
        machines: &[Machine],
        today_logs: &[ProductionLog],
        config: &PlantConfig,
    ) -> DashboardKpis {
        // 机台 -> 当日记录映射（按约定每机台每日一条,重复时取首条）
        let mut logs_by_machine: HashMap<i64, &ProductionLog> = HashMap::new();
        for log in today_logs {
            logs_by_machine.entry(log.machine_id).or_insert(log);
        }

        let mut rows: Vec<MachineKpi> = Vec::new();
        let mut total_eff = 0.0;
        let mut delayed = 0;
        // 瓶颈: 效率最低者;并列时严格小于比较保留先遇到的(最小机台ID)
        let mut bottleneck: Option<(f64, &str)> = None;

        for machine in machines {
            let Some(log) = logs_by_machine.get(&machine.id) else {
                continue;
            };

            let efficiency = round1(log.efficiency());
            let utilization = round1(log.runtime_hours / config.shift_hours * 100.0);
            let idle_time = round1((config.shift_hours - log.runtime_hours).max(0.0));
            let status = MachineStatus::classify(efficiency, config.threshold_eff);

            if log.is_delayed() {
                delayed += 1;
            }
            total_eff += efficiency;

            match bottleneck {
                Some((min_eff, _)) if efficiency >= min_eff => {}
                _ => bottleneck = Some((efficiency, machine.name.as_str())),
            }

            rows.push(MachineKpi {
                id: machine.id,
                name: machine.name.clone(),
                efficiency,
                utilization,
                idle_time,
                actual_qty: log.actual_qty,
                planned_qty: log.planned_qty,
                status,
            });
        }

        let avg_efficiency = if rows.is_empty() {
            0.0
        } else {
            round1(total_eff / rows.len() as f64)
        };

        DashboardKpis {
            summary: KpiSummary {
                avg_efficiency,
                total_machines: rows.len(),
                delayed_orders: delayed,
                bottleneck: bottleneck
                    .map(|(_, name)| name.to_string())
                    .unwrap_or_else(|| "None".to_string()),
            },
            machines: rows,
        }
    }
}
