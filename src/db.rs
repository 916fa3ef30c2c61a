// ==========================================
// 工厂生产监控系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表与演示数据种子集中在此处
// ==========================================

use chrono::{Duration as ChronoDuration, NaiveDate};
use rand::Rng;
use rusqlite::{params, Connection};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

// ==========================================
// Schema 初始化
// ==========================================

/// 初始化数据库 schema（幂等）
///
/// # 表结构
/// - machines: 机台主数据
/// - production_logs: 生产记录（机台 × 日历日）
/// - alerts: 告警，(machine_id, alert_date, kind) 唯一约束实现去重
/// - settings: 扁平 key/value 配置
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS machines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            capacity_per_hour INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS production_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            machine_id INTEGER NOT NULL REFERENCES machines(id),
            date TEXT NOT NULL,
            planned_qty INTEGER NOT NULL DEFAULT 0,
            actual_qty INTEGER NOT NULL DEFAULT 0,
            runtime_hours REAL NOT NULL DEFAULT 0.0
        );

        CREATE INDEX IF NOT EXISTS idx_production_logs_date
            ON production_logs(date);
        CREATE INDEX IF NOT EXISTS idx_production_logs_machine
            ON production_logs(machine_id);

        CREATE TABLE IF NOT EXISTS alerts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            machine_id INTEGER NOT NULL REFERENCES machines(id),
            message TEXT NOT NULL,
            severity TEXT NOT NULL,
            kind TEXT NOT NULL,
            alert_date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (machine_id, alert_date, kind)
        );

        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

// ==========================================
// 演示数据种子
// ==========================================

/// 演示机台清单: (名称, 类型, 小时产能)
const DEMO_MACHINES: [(&str, &str, i64); 4] = [
    ("CNC-01", "Milling", 100),
    ("CNC-02", "Milling", 100),
    ("PRESS-A", "Press", 500),
    ("PACK-01", "Packing", 1000),
];

/// 写入演示数据（幂等）
///
/// # 行为
/// - machines 为空时: 插入 4 台演示机台 + 最近 7 天历史生产记录
///   （实际产量为计划的 70%~95%，运行时长 6.5~8.0 小时）
/// - 当日无生产记录时: 为每台机台补一条零进度的当日记录
///   （planned_qty = 小时产能 × 8，由模拟引擎逐步推进）
/// - settings 缺省键补默认值（INSERT OR IGNORE）
///
/// # 参数
/// - `conn`: 数据库连接（schema 已初始化）
/// - `today`: 当日日期（厂区本地）
/// - `rng`: 随机源（历史数据取值；注入以便测试可复现）
pub fn seed_demo_data<R: Rng>(
    conn: &Connection,
    today: NaiveDate,
    rng: &mut R,
) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;

    // 机台与历史记录
    let machine_count: i64 =
        tx.query_row("SELECT count(*) FROM machines", [], |row| row.get(0))?;
    if machine_count == 0 {
        for (name, machine_type, capacity) in DEMO_MACHINES {
            tx.execute(
                "INSERT INTO machines (name, type, capacity_per_hour) VALUES (?1, ?2, ?3)",
                params![name, machine_type, capacity],
            )?;
            let machine_id = tx.last_insert_rowid();
            let planned = capacity * 8;

            // 最近 7 天历史（今天之前）
            for offset in 1..=7i64 {
                let date = today - ChronoDuration::days(offset);
                let actual = (planned as f64 * rng.random_range(0.70..=0.95)) as i64;
                let runtime = (rng.random_range(6.5..=8.0) * 10.0_f64).round() / 10.0;
                tx.execute(
                    "INSERT INTO production_logs (machine_id, date, planned_qty, actual_qty, runtime_hours)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![machine_id, date, planned, actual, runtime],
                )?;
            }
        }
        tracing::info!("已写入演示机台与 7 天历史生产记录");
    }

    // 当日记录（看板数据源，模拟引擎的推进对象）
    let today_count: i64 = tx.query_row(
        "SELECT count(*) FROM production_logs WHERE date = ?1",
        params![today],
        |row| row.get(0),
    )?;
    if today_count == 0 {
        let mut stmt = tx.prepare("SELECT id, capacity_per_hour FROM machines ORDER BY id")?;
        let machines: Vec<(i64, i64)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<_, _>>()?;
        drop(stmt);

        for (machine_id, capacity) in machines {
            tx.execute(
                "INSERT INTO production_logs (machine_id, date, planned_qty, actual_qty, runtime_hours)
                 VALUES (?1, ?2, ?3, 0, 0.0)",
                params![machine_id, today, capacity * 8],
            )?;
        }
        tracing::info!(date = %today, "已补当日零进度生产记录");
    }

    // 默认配置
    tx.execute(
        "INSERT OR IGNORE INTO settings (key, value) VALUES ('plant_name', 'Nagpur MIDC Zone-A')",
        [],
    )?;
    tx.execute(
        "INSERT OR IGNORE INTO settings (key, value) VALUES ('threshold_eff', '75.0')",
        [],
    )?;

    tx.commit()?;
    Ok(())
}
