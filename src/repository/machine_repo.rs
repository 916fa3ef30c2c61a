// ==========================================
// 工厂生产监控系统 - 机台数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑,只负责数据访问
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::machine::Machine;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// MachineRepository - 机台仓储
// ==========================================
/// 机台仓储
/// 职责: 管理 machines 表的插入与查询
/// 说明: 机台注册后不可变,不提供 update/delete
pub struct MachineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MachineRepository {
    /// 创建新的 MachineRepository 实例
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

    /// 插入机台
    ///
    /// # 返回
    /// - Ok(i64): 新机台ID (last_insert_rowid)
    pub fn insert(
        &self,
        name: &str,
        machine_type: &str,
        capacity_per_hour: i64,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_in(&conn, name, machine_type, capacity_per_hour)
    }

    /// 插入机台（事务内版本，供调用方组合原子操作）
    pub fn insert_in(
        conn: &Connection,
        name: &str,
        machine_type: &str,
        capacity_per_hour: i64,
    ) -> RepositoryResult<i64> {
        conn.execute(
            "INSERT INTO machines (name, type, capacity_per_hour) VALUES (?1, ?2, ?3)",
            params![name, machine_type, capacity_per_hour],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 查询全部机台（自然顺序: 按ID升序）
    ///
    /// # 说明
    /// KPI 引擎的瓶颈并列裁决依赖此顺序（最小机台ID优先）
    pub fn list_all(&self) -> RepositoryResult<Vec<Machine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, type, capacity_per_hour FROM machines ORDER BY id",
        )?;
        let machines = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(machines)
    }

    /// 按ID查询机台
    ///
    /// # 返回
    /// - Ok(Some(Machine)): 找到机台
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Machine>> {
        let conn = self.get_conn()?;
        let machine = conn
            .query_row(
                "SELECT id, name, type, capacity_per_hour FROM machines WHERE id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(machine)
    }

    /// 行映射: machines 表 -> Machine
    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Machine> {
        Ok(Machine {
            id: row.get(0)?,
            name: row.get(1)?,
            machine_type: row.get(2)?,
            capacity_per_hour: row.get(3)?,
        })
    }
}
