// ==========================================
// 工厂生产监控系统 - 分析引擎
// ==========================================
// 职责: 多日效率排名 + 7日全厂效率趋势
// 输入: 机台清单 + 全部历史生产记录
// 输出: AnalyticsView (只读计算)
// 约束: planned_qty = 0 的记录不参与聚合(排除而非按0计入)
// ==========================================

use crate::domain::machine::Machine;
use crate::domain::production_log::ProductionLog;
use crate::engine::round1;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// 趋势保留的最近日历日数量
const TREND_DAYS: usize = 7;

// ==========================================
// 输出结构
// ==========================================

/// 机台效率排名行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineRanking {
    pub name: String,
    pub avg_eff: f64, // 全历史平均效率 (1位小数)
}

/// 全厂效率趋势（labels 与 data 平行，升序日期）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EfficiencyTrend {
    pub labels: Vec<NaiveDate>,
    pub data: Vec<f64>,
}

/// 分析视图聚合结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsView {
    pub rankings: Vec<MachineRanking>,
    pub trend: EfficiencyTrend,
}

// ==========================================
// AnalyticsEngine - 分析引擎
// ==========================================
pub struct AnalyticsEngine {
    // 无状态引擎,不需要注入依赖
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsEngine {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 计算分析视图
    ///
    /// # 参数
    /// - `machines`: 机台清单，按ID升序
    /// - `logs`: 全部历史生产记录（不限当日）
    pub fn compute(&self, machines: &[Machine], logs: &[ProductionLog]) -> AnalyticsView {
        AnalyticsView {
            rankings: self.compute_rankings(machines, logs),
            trend: self.compute_trend(logs),
        }
    }

    /// 机台效率排名
    ///
    /// # 规则
    /// - 每机台取其 planned_qty > 0 记录的效率均值,1位小数
    /// - 按均值降序;并列时稳定排序保留机台ID升序
    /// - 无合格记录的机台不出现在排名中
    fn compute_rankings(
        &self,
        machines: &[Machine],
        logs: &[ProductionLog],
    ) -> Vec<MachineRanking> {
        // machine_id -> (效率和, 记录数)
        let mut acc: HashMap<i64, (f64, usize)> = HashMap::new();
        for log in logs {
            if log.planned_qty > 0 {
                let entry = acc.entry(log.machine_id).or_insert((0.0, 0));
                entry.0 += log.efficiency();
                entry.1 += 1;
            }
        }

        let mut rankings: Vec<MachineRanking> = machines
            .iter()
            .filter_map(|machine| {
                let (sum, count) = acc.get(&machine.id)?;
                Some(MachineRanking {
                    name: machine.name.clone(),
                    avg_eff: round1(sum / *count as f64),
                })
            })
            .collect();

        rankings.sort_by(|a, b| {
            b.avg_eff
                .partial_cmp(&a.avg_eff)
                .unwrap_or(Ordering::Equal)
        });
        rankings
    }

    /// 全厂效率趋势
    ///
    /// # 规则
    /// - 按日历日分组,取 planned_qty > 0 记录的效率均值
    /// - 保留最近 7 个不同日期,升序输出(最旧在前)
    fn compute_trend(&self, logs: &[ProductionLog]) -> EfficiencyTrend {
        // 日期 -> (效率和, 记录数); BTreeMap 保证日期有序
        let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for log in logs {
            if log.planned_qty > 0 {
                let entry = by_date.entry(log.date).or_insert((0.0, 0));
                entry.0 += log.efficiency();
                entry.1 += 1;
            }
        }

        // 最近 7 天(倒序取),再翻转为升序
        let mut recent: Vec<(NaiveDate, f64)> = by_date
            .iter()
            .rev()
            .take(TREND_DAYS)
            .map(|(date, (sum, count))| (*date, round1(sum / *count as f64)))
            .collect();
        recent.reverse();

        let (labels, data) = recent.into_iter().unzip();
        EfficiencyTrend { labels, data }
    }
}
