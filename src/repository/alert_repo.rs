// ==========================================
// 工厂生产监控系统 - 告警数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑,只负责数据访问
// 去重: (machine_id, alert_date, kind) 唯一约束
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::alert::Alert;
use crate::domain::types::{AlertKind, AlertSeverity};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// 告警时间戳的存储格式
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// AlertWithMachine - 告警视图行
// ==========================================
/// 告警视图行（关联机台名称，LEFT JOIN: 机台缺失时为 None）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertWithMachine {
    #[serde(flatten)]
    pub alert: Alert,
    pub machine_name: Option<String>,
}

// ==========================================
// AlertRepository - 告警仓储
// ==========================================
/// 告警仓储
/// 职责: 管理 alerts 表的插入与查询
/// 说明: 告警创建后不可变,不提供 update/delete
pub struct AlertRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AlertRepository {
    /// 创建新的 AlertRepository 实例
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

    /// 插入告警
    ///
    /// # 返回
    /// - Ok(i64): 新告警ID
    /// - Err(UniqueConstraintViolation): 去重键冲突（同机台同日同类型已存在）
    pub fn insert(
        &self,
        machine_id: i64,
        message: &str,
        severity: AlertSeverity,
        kind: AlertKind,
        alert_date: NaiveDate,
        created_at: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_in(&conn, machine_id, message, severity, kind, alert_date, created_at)
    }

    /// 插入告警（事务内版本，模拟引擎在单个 tick 事务中调用）
    pub fn insert_in(
        conn: &Connection,
        machine_id: i64,
        message: &str,
        severity: AlertSeverity,
        kind: AlertKind,
        alert_date: NaiveDate,
        created_at: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        conn.execute(
            "INSERT INTO alerts (machine_id, message, severity, kind, alert_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                machine_id,
                message,
                severity.as_str(),
                kind.as_str(),
                alert_date,
                created_at.format(CREATED_AT_FORMAT).to_string(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 判断某机台某日是否已存在指定类型的告警
    ///
    /// # 说明
    /// 模拟引擎的告警去重检查;结构化键查询,不做消息前缀匹配
    pub fn exists_for_day(
        &self,
        machine_id: i64,
        alert_date: NaiveDate,
        kind: AlertKind,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        Self::exists_for_day_in(&conn, machine_id, alert_date, kind)
    }

    /// 去重检查（事务内版本）
    pub fn exists_for_day_in(
        conn: &Connection,
        machine_id: i64,
        alert_date: NaiveDate,
        kind: AlertKind,
    ) -> RepositoryResult<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM alerts
                 WHERE machine_id = ?1 AND alert_date = ?2 AND kind = ?3 LIMIT 1",
                params![machine_id, alert_date, kind.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// 查询全部告警（关联机台名称，创建时间倒序）
    pub fn list_with_machine(&self) -> RepositoryResult<Vec<AlertWithMachine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT a.id, a.machine_id, a.message, a.severity, a.kind, a.alert_date, a.created_at,
                    m.name
             FROM alerts a
             LEFT JOIN machines m ON a.machine_id = m.id
             ORDER BY a.created_at DESC, a.id DESC",
        )?;
        let alerts = stmt
            .query_map([], |row| {
                Ok(AlertWithMachine {
                    alert: Self::map_alert_row(row)?,
                    machine_name: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(alerts)
    }

    /// 行映射: alerts 表 -> Alert
    fn map_alert_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Alert> {
        let severity_raw: String = row.get(3)?;
        let severity = AlertSeverity::parse(&severity_raw).ok_or_else(|| {
            field_error(3, format!("未知告警级别: {}", severity_raw))
        })?;

        let kind_raw: String = row.get(4)?;
        let kind = AlertKind::parse(&kind_raw)
            .ok_or_else(|| field_error(4, format!("未知告警类型: {}", kind_raw)))?;

        let created_raw: String = row.get(6)?;
        let created_at = NaiveDateTime::parse_from_str(&created_raw, CREATED_AT_FORMAT)
            .map_err(|e| field_error(6, format!("时间戳解析失败({}): {}", created_raw, e)))?;

        Ok(Alert {
            id: row.get(0)?,
            machine_id: row.get(1)?,
            message: row.get(2)?,
            severity,
            kind,
            alert_date: row.get(5)?,
            created_at,
        })
    }
}

/// 构造字段级解析失败错误
fn field_error(index: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        message.into(),
    )
}
