// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据写入等功能
// ==========================================

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

use smart_factory_monitor::db;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = db::open_sqlite_connection(&db_path)?;
    db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接（统一 PRAGMA）
pub fn open_test_connection(db_path: &str) -> rusqlite::Result<Connection> {
    db::open_sqlite_connection(db_path)
}

/// 打开共享连接（Arc<Mutex<Connection>> 形式）
pub fn open_shared_connection(db_path: &str) -> rusqlite::Result<Arc<Mutex<Connection>>> {
    Ok(Arc::new(Mutex::new(open_test_connection(db_path)?)))
}

/// 插入测试机台
pub fn insert_machine(
    conn: &Connection,
    name: &str,
    machine_type: &str,
    capacity_per_hour: i64,
) -> i64 {
    conn.execute(
        "INSERT INTO machines (name, type, capacity_per_hour) VALUES (?1, ?2, ?3)",
        params![name, machine_type, capacity_per_hour],
    )
    .expect("插入机台失败");
    conn.last_insert_rowid()
}

/// 插入测试生产记录
pub fn insert_log(
    conn: &Connection,
    machine_id: i64,
    date: NaiveDate,
    planned_qty: i64,
    actual_qty: i64,
    runtime_hours: f64,
) -> i64 {
    conn.execute(
        "INSERT INTO production_logs (machine_id, date, planned_qty, actual_qty, runtime_hours)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![machine_id, date, planned_qty, actual_qty, runtime_hours],
    )
    .expect("插入生产记录失败");
    conn.last_insert_rowid()
}

/// 写入配置项（绕过 API 校验,用于构造非法取值场景）
pub fn set_setting(conn: &Connection, key: &str, value: &str) {
    conn.execute(
        "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
        params![key, value],
    )
    .expect("写入配置失败");
}

/// 统计告警数量
pub fn count_alerts(conn: &Connection) -> i64 {
    conn.query_row("SELECT count(*) FROM alerts", [], |row| row.get(0))
        .expect("统计告警失败")
}
