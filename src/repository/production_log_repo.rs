// ==========================================
// 工厂生产监控系统 - 生产记录数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑,只负责数据访问
// 写入约束: actual_qty / runtime_hours 的更新仅由模拟引擎发起
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::production_log::ProductionLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

// ==========================================
// ProductionHistoryRow - 历史报表行
// ==========================================
/// 历史报表行（生产记录关联机台名称）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionHistoryRow {
    pub date: NaiveDate,
    pub machine_name: String,
    pub planned_qty: i64,
    pub actual_qty: i64,
    pub runtime_hours: f64,
}

// ==========================================
// ProductionLogRepository - 生产记录仓储
// ==========================================
/// 生产记录仓储
/// 职责: 管理 production_logs 表的插入、查询与进度更新
pub struct ProductionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionLogRepository {
    /// 创建新的 ProductionLogRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入生产记录
    ///
    /// # 返回
    /// - Ok(i64): 新记录ID (last_insert_rowid)
    pub fn insert(
        &self,
        machine_id: i64,
        date: NaiveDate,
        planned_qty: i64,
        actual_qty: i64,
        runtime_hours: f64,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_in(&conn, machine_id, date, planned_qty, actual_qty, runtime_hours)
    }

    /// 插入生产记录（事务内版本）
    pub fn insert_in(
        conn: &Connection,
        machine_id: i64,
        date: NaiveDate,
        planned_qty: i64,
        actual_qty: i64,
        runtime_hours: f64,
    ) -> RepositoryResult<i64> {
        conn.execute(
            "INSERT INTO production_logs (machine_id, date, planned_qty, actual_qty, runtime_hours)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![machine_id, date, planned_qty, actual_qty, runtime_hours],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按日期查询生产记录（按机台ID升序）
    pub fn list_by_date(&self, date: NaiveDate) -> RepositoryResult<Vec<ProductionLog>> {
        let conn = self.get_conn()?;
        Self::list_by_date_in(&conn, date)
    }

    /// 按日期查询生产记录（事务内版本）
    pub fn list_by_date_in(
        conn: &Connection,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<ProductionLog>> {
        let mut stmt = conn.prepare(
            "SELECT id, machine_id, date, planned_qty, actual_qty, runtime_hours
             FROM production_logs WHERE date = ?1 ORDER BY machine_id",
        )?;
        let logs = stmt
            .query_map(params![date], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    /// 查询全部生产记录（分析引擎数据源）
    pub fn list_all(&self) -> RepositoryResult<Vec<ProductionLog>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, machine_id, date, planned_qty, actual_qty, runtime_hours
             FROM production_logs ORDER BY date, machine_id",
        )?;
        let logs = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    /// 更新生产进度（actual_qty + runtime_hours）
    ///
    /// # 说明
    /// 仅模拟引擎调用;两个字段一次性更新,避免半套数据
    pub fn update_progress(
        &self,
        id: i64,
        actual_qty: i64,
        runtime_hours: f64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::update_progress_in(&conn, id, actual_qty, runtime_hours)
    }

    /// 更新生产进度（事务内版本，模拟引擎在单个 tick 事务中调用）
    pub fn update_progress_in(
        conn: &Connection,
        id: i64,
        actual_qty: i64,
        runtime_hours: f64,
    ) -> RepositoryResult<()> {
        let updated = conn.execute(
            "UPDATE production_logs SET actual_qty = ?1, runtime_hours = ?2 WHERE id = ?3",
            params![actual_qty, runtime_hours, id],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ProductionLog".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 查询历史报表（关联机台名称，日期倒序）
    pub fn list_history(&self) -> RepositoryResult<Vec<ProductionHistoryRow>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT p.date, m.name, p.planned_qty, p.actual_qty, p.runtime_hours
             FROM production_logs p
             JOIN machines m ON p.machine_id = m.id
             ORDER BY p.date DESC, p.machine_id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ProductionHistoryRow {
                    date: row.get(0)?,
                    machine_name: row.get(1)?,
                    planned_qty: row.get(2)?,
                    actual_qty: row.get(3)?,
                    runtime_hours: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 行映射: production_logs 表 -> ProductionLog
    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProductionLog> {
        Ok(ProductionLog {
            id: row.get(0)?,
            machine_id: row.get(1)?,
            date: row.get(2)?,
            planned_qty: row.get(3)?,
            actual_qty: row.get(4)?,
            runtime_hours: row.get(5)?,
        })
    }
}
