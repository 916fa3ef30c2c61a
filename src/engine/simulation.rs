// ==========================================
// 工厂生产监控系统 - 模拟引擎
// ==========================================
// 职责: 增量推进当日生产记录,模拟产线实时活动;
//       效率跌落条件命中时产生告警(按日去重)
// 约束:
// - production_logs 进度与 alerts 的唯一写入者
// - 单个 tick 的全部写入在一个事务内提交,避免半套更新
// - actual_qty / runtime_hours 单调不减,分别钳制在
//   planned_qty / 班次时长(8.0小时),重复调用无害
// 随机源: 由调用方注入(可种子化),测试可精确断言
// ==========================================

use crate::config::SHIFT_HOURS;
use crate::domain::types::{AlertKind, AlertSeverity};
use crate::engine::round2;
use crate::repository::alert_repo::AlertRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::production_log_repo::ProductionLogRepository;
use chrono::NaiveDate;
use rand::Rng;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 告警触发的效率下限（百分比）
const ALERT_EFFICIENCY_FLOOR: f64 = 60.0;

/// 告警触发概率（效率跌落后按此概率抽样,模拟偶发上报）
const ALERT_PROBABILITY: f64 = 0.3;

// ==========================================
// 输出结构
// ==========================================

/// 单次 tick 的执行报告
#[derive(Debug, Clone, Copy)]
pub struct SimulationTickReport {
    /// 本次推进的生产记录数
    pub advanced_logs: usize,
    /// 本次新建的告警数
    pub alerts_raised: usize,
}

/// 单条记录的推进结果（纯计算）
#[derive(Debug, Clone, Copy)]
struct LogAdvance {
    new_actual: i64,
    new_runtime: f64,
    efficiency: f64,
}

// ==========================================
// SimulationEngine - 模拟引擎
// ==========================================
pub struct SimulationEngine {
    conn: Arc<Mutex<Connection>>,
}

impl SimulationEngine {
    /// 从已有连接创建引擎实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 执行一次模拟 tick
    ///
    /// # 参数
    /// - `today`: 当日日期（仅推进该日期的记录）
    /// - `rng`: 随机源
    ///
    /// # 行为（对每条 actual_qty < planned_qty 的当日记录）
    /// 1. actual_qty += [10, 50] 的随机整数,钳制在 planned_qty
    /// 2. runtime_hours += [0.1, 0.3) 的随机实数,钳制在 8.0,保留2位小数
    /// 3. 重算效率;效率 < 60% 且 30% 抽样命中且当日无同类型告警时,
    ///    插入 Warning 告警 "Efficiency drop detected: {floor(eff)}%"
    ///
    /// # 返回
    /// - Ok(SimulationTickReport): 推进与告警计数
    /// - Err: 数据库访问失败（整个 tick 回滚）
    pub fn tick<R: Rng>(
        &self,
        today: NaiveDate,
        rng: &mut R,
    ) -> RepositoryResult<SimulationTickReport> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn.unchecked_transaction()?;

        let logs = ProductionLogRepository::list_by_date_in(&tx, today)?;

        let mut advanced = 0;
        let mut alerts = 0;

        for log in &logs {
            // 终态: 已达计划产量,无需推进
            if log.actual_qty >= log.planned_qty {
                continue;
            }

            let step = advance_log(log.planned_qty, log.actual_qty, log.runtime_hours, rng);
            ProductionLogRepository::update_progress_in(
                &tx,
                log.id,
                step.new_actual,
                step.new_runtime,
            )?;
            advanced += 1;

            // 效率跌落告警(抽样 + 按日去重)
            if step.efficiency < ALERT_EFFICIENCY_FLOOR
                && rng.random_bool(ALERT_PROBABILITY)
                && !AlertRepository::exists_for_day_in(
                    &tx,
                    log.machine_id,
                    today,
                    AlertKind::EfficiencyDrop,
                )?
            {
                let message =
                    format!("Efficiency drop detected: {}%", step.efficiency.floor() as i64);
                AlertRepository::insert_in(
                    &tx,
                    log.machine_id,
                    &message,
                    AlertSeverity::Warning,
                    AlertKind::EfficiencyDrop,
                    today,
                    chrono::Local::now().naive_local(),
                )?;
                alerts += 1;
                tracing::warn!(
                    machine_id = log.machine_id,
                    efficiency = step.efficiency,
                    "效率跌落告警已创建"
                );
            }
        }

        tx.commit()?;
        tracing::debug!(date = %today, advanced, alerts, "模拟 tick 完成");

        Ok(SimulationTickReport {
            advanced_logs: advanced,
            alerts_raised: alerts,
        })
    }
}

/// 推进一条生产记录（纯计算,不触库）
///
/// # 前置条件
/// - actual < planned（调用方已过滤终态记录）,因此 planned > 0
fn advance_log<R: Rng>(planned: i64, actual: i64, runtime: f64, rng: &mut R) -> LogAdvance {
    let increment = rng.random_range(10..=50i64);
    let new_actual = (actual + increment).min(planned);

    let delta = rng.random_range(0.1..0.3);
    let new_runtime = round2((runtime + delta).min(SHIFT_HOURS));

    LogAdvance {
        new_actual,
        new_runtime,
        efficiency: new_actual as f64 / planned as f64 * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_advance_log_never_overshoots() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut actual = 0i64;
        let mut runtime = 0.0f64;

        // 多次推进后产量与时长均不越界且单调不减
        for _ in 0..200 {
            let step = advance_log(800, actual, runtime, &mut rng);
            assert!(step.new_actual >= actual);
            assert!(step.new_actual <= 800);
            assert!(step.new_runtime >= runtime);
            assert!(step.new_runtime <= SHIFT_HOURS);
            actual = step.new_actual;
            runtime = step.new_runtime;
        }
        assert_eq!(actual, 800);
    }

    #[test]
    fn test_advance_log_clamps_to_planned() {
        let mut rng = SmallRng::seed_from_u64(1);
        // 差 1 件到计划量,任何增量都应钳制
        let step = advance_log(100, 99, 7.95, &mut rng);
        assert_eq!(step.new_actual, 100);
        assert!(step.new_runtime <= SHIFT_HOURS);
        assert_eq!(step.efficiency, 100.0);
    }
}
