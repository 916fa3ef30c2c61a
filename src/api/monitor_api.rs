// ==========================================
// 工厂生产监控系统 - 监控 API
// ==========================================
// 职责: 看板/分析/模拟/主数据维护的统一入口
// 架构: API 层 → Engine 层(业务规则) + Repository 层(数据访问)
// 约定: 公开方法默认取"今天"(厂区本地),并提供显式日期的
//       完整参数版本供测试与回放使用
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::PlantConfig;
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::machine::Machine;
use crate::engine::{AnalyticsEngine, AnalyticsView, DashboardKpis, KpiEngine, SimulationEngine};
use crate::repository::error::RepositoryError;
use crate::repository::{
    AlertRepository, AlertWithMachine, MachineRepository, ProductionHistoryRow,
    ProductionLogRepository, SettingsRepository,
};

// ==========================================
// 响应结构
// ==========================================

/// 模拟 tick 响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationTickResponse {
    pub status: String,
}

/// 告警总览（告警列表 + 各级别计数）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsOverview {
    pub alerts: Vec<AlertWithMachine>,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

// ==========================================
// MonitorApi - 监控 API
// ==========================================

/// 监控API
///
/// 职责：
/// 1. 看板 KPI 聚合查询（KpiEngine）
/// 2. 多日分析查询（AnalyticsEngine）
/// 3. 模拟 tick 触发（SimulationEngine）
/// 4. 机台注册、历史报表、告警总览、配置读写
pub struct MonitorApi {
    /// 共享数据库连接（模拟与注册的事务载体）
    conn: Arc<Mutex<Connection>>,
    machine_repo: Arc<MachineRepository>,
    log_repo: Arc<ProductionLogRepository>,
    alert_repo: Arc<AlertRepository>,
    settings_repo: Arc<SettingsRepository>,
    kpi_engine: KpiEngine,
    analytics_engine: AnalyticsEngine,
    simulation_engine: SimulationEngine,
}

impl MonitorApi {
    /// 创建新的MonitorApi实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（schema 需已初始化）
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(RepositoryError::from)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建实例
    ///
    /// 说明：所有仓储与引擎共享同一连接,单连接串行执行
    /// 与"请求逐个处理"的执行模型一致
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        // 幂等地应用统一 PRAGMA,保证连接行为一致
        if let Ok(guard) = conn.lock() {
            if let Err(e) = configure_sqlite_connection(&guard) {
                tracing::warn!("连接 PRAGMA 配置失败(将继续): {}", e);
            }
        }

        Self {
            machine_repo: Arc::new(MachineRepository::from_connection(conn.clone())),
            log_repo: Arc::new(ProductionLogRepository::from_connection(conn.clone())),
            alert_repo: Arc::new(AlertRepository::from_connection(conn.clone())),
            settings_repo: Arc::new(SettingsRepository::from_connection(conn.clone())),
            kpi_engine: KpiEngine::new(),
            analytics_engine: AnalyticsEngine::new(),
            simulation_engine: SimulationEngine::from_connection(conn.clone()),
            conn,
        }
    }

    // ==========================================
    // 看板与分析查询
    // ==========================================

    /// 查询当日看板 KPI
    pub fn get_dashboard_kpis(&self) -> ApiResult<DashboardKpis> {
        self.get_dashboard_kpis_for(today_local())
    }

    /// 查询指定日期的看板 KPI（完整参数版本）
    ///
    /// # 参数
    /// - `date`: 看板日期
    ///
    /// # 返回
    /// - Ok(DashboardKpis): 机台行 + 厂区汇总
    pub fn get_dashboard_kpis_for(&self, date: NaiveDate) -> ApiResult<DashboardKpis> {
        let machines = self.machine_repo.list_all()?;
        let logs = self.log_repo.list_by_date(date)?;
        let config = PlantConfig::load(&self.settings_repo)?;
        Ok(self.kpi_engine.compute(&machines, &logs, &config))
    }

    /// 查询多日分析视图（效率排名 + 7日趋势）
    pub fn get_analytics(&self) -> ApiResult<AnalyticsView> {
        let machines = self.machine_repo.list_all()?;
        let logs = self.log_repo.list_all()?;
        Ok(self.analytics_engine.compute(&machines, &logs))
    }

    // ==========================================
    // 模拟触发
    // ==========================================

    /// 触发一次模拟 tick（操作系统熵随机源,作用于今天）
    pub fn run_simulation_tick(&self) -> ApiResult<SimulationTickResponse> {
        let mut rng = SmallRng::from_os_rng();
        self.run_simulation_tick_on(today_local(), &mut rng)
    }

    /// 触发一次模拟 tick（完整参数版本）
    ///
    /// # 参数
    /// - `date`: 推进哪一天的生产记录
    /// - `rng`: 随机源（测试注入种子化随机源以复现结果）
    pub fn run_simulation_tick_on<R: Rng>(
        &self,
        date: NaiveDate,
        rng: &mut R,
    ) -> ApiResult<SimulationTickResponse> {
        let report = self.simulation_engine.tick(date, rng)?;
        tracing::info!(
            advanced = report.advanced_logs,
            alerts = report.alerts_raised,
            "模拟 tick 执行完成"
        );
        Ok(SimulationTickResponse {
            status: "ok".to_string(),
        })
    }

    // ==========================================
    // 机台主数据
    // ==========================================

    /// 注册机台并生成当日零进度生产记录
    ///
    /// # 参数
    /// - `name`: 机台名称
    /// - `machine_type`: 机台类型
    /// - `capacity_per_hour`: 小时产能（> 0）
    ///
    /// # 行为
    /// 机台插入与当日记录生成在同一事务内:
    /// planned_qty = capacity_per_hour × 8, actual_qty = 0
    pub fn register_machine(
        &self,
        name: &str,
        machine_type: &str,
        capacity_per_hour: i64,
    ) -> ApiResult<Machine> {
        self.register_machine_on(today_local(), name, machine_type, capacity_per_hour)
    }

    /// 注册机台（完整参数版本）
    pub fn register_machine_on(
        &self,
        date: NaiveDate,
        name: &str,
        machine_type: &str,
        capacity_per_hour: i64,
    ) -> ApiResult<Machine> {
        let name = name.trim();
        let machine_type = machine_type.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("机台名称不能为空".to_string()));
        }
        if machine_type.is_empty() {
            return Err(ApiError::InvalidInput("机台类型不能为空".to_string()));
        }
        if capacity_per_hour <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "小时产能必须为正数: {}",
                capacity_per_hour
            )));
        }

        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn.unchecked_transaction().map_err(RepositoryError::from)?;

        let machine_id = MachineRepository::insert_in(&tx, name, machine_type, capacity_per_hour)?;
        let machine = Machine {
            id: machine_id,
            name: name.to_string(),
            machine_type: machine_type.to_string(),
            capacity_per_hour,
        };
        ProductionLogRepository::insert_in(
            &tx,
            machine_id,
            date,
            machine.default_daily_plan(),
            0,
            0.0,
        )?;

        tx.commit().map_err(RepositoryError::from)?;
        tracing::info!(machine_id, name, "机台注册完成,当日生产记录已生成");
        Ok(machine)
    }

    /// 查询机台清单（按ID升序）
    pub fn list_machines(&self) -> ApiResult<Vec<Machine>> {
        Ok(self.machine_repo.list_all()?)
    }

    // ==========================================
    // 报表与告警
    // ==========================================

    /// 查询历史生产报表（关联机台名称,日期倒序）
    pub fn list_production_history(&self) -> ApiResult<Vec<ProductionHistoryRow>> {
        Ok(self.log_repo.list_history()?)
    }

    /// 查询告警总览（创建时间倒序 + 各级别计数）
    pub fn list_alerts(&self) -> ApiResult<AlertsOverview> {
        use crate::domain::types::AlertSeverity;

        let alerts = self.alert_repo.list_with_machine()?;
        let critical = alerts
            .iter()
            .filter(|a| a.alert.severity == AlertSeverity::Critical)
            .count();
        let warning = alerts
            .iter()
            .filter(|a| a.alert.severity == AlertSeverity::Warning)
            .count();
        let info = alerts
            .iter()
            .filter(|a| a.alert.severity == AlertSeverity::Info)
            .count();

        Ok(AlertsOverview {
            alerts,
            critical,
            warning,
            info,
        })
    }

    // ==========================================
    // 配置读写
    // ==========================================

    /// 读取厂区配置（缺省/非法值已回退）
    pub fn get_settings(&self) -> ApiResult<PlantConfig> {
        Ok(PlantConfig::load(&self.settings_repo)?)
    }

    /// 更新厂区配置（upsert 两个识别键）
    ///
    /// # 参数
    /// - `plant_name`: 厂区显示名称
    /// - `threshold_eff`: 效率阈值（必须可解析为浮点数）
    pub fn update_settings(&self, plant_name: &str, threshold_eff: &str) -> ApiResult<()> {
        let plant_name = plant_name.trim();
        if plant_name.is_empty() {
            return Err(ApiError::InvalidInput("厂区名称不能为空".to_string()));
        }
        if threshold_eff.trim().parse::<f64>().is_err() {
            return Err(ApiError::InvalidInput(format!(
                "效率阈值必须为数字: {}",
                threshold_eff
            )));
        }

        self.settings_repo.upsert("plant_name", plant_name)?;
        self.settings_repo.upsert("threshold_eff", threshold_eff.trim())?;
        tracing::info!(plant_name, threshold_eff, "厂区配置已更新");
        Ok(())
    }
}

/// 厂区本地的"今天"
fn today_local() -> NaiveDate {
    chrono::Local::now().date_naive()
}
