// ==========================================
// 数据库种子集成测试
// ==========================================
// 测试目标: 验证演示数据写入的内容与幂等性
// ==========================================

mod test_helpers;

use chrono::NaiveDate;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use smart_factory_monitor::db;
use test_helpers::*;

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
}

#[test]
fn test_seed_creates_machines_history_and_today_rows() {
    let (_tmp, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开连接失败");

    let mut rng = SmallRng::seed_from_u64(11);
    db::seed_demo_data(&conn, test_date(), &mut rng).expect("种子写入失败");

    // 4 台演示机台
    let machines: i64 = conn
        .query_row("SELECT count(*) FROM machines", [], |row| row.get(0))
        .unwrap();
    assert_eq!(machines, 4);

    // 每台 7 天历史 + 1 条当日记录
    let logs: i64 = conn
        .query_row("SELECT count(*) FROM production_logs", [], |row| row.get(0))
        .unwrap();
    assert_eq!(logs, 4 * 8);

    // 当日记录零进度,planned = 小时产能 × 8
    let (planned, actual, runtime): (i64, i64, f64) = conn
        .query_row(
            "SELECT p.planned_qty, p.actual_qty, p.runtime_hours
             FROM production_logs p JOIN machines m ON p.machine_id = m.id
             WHERE p.date = ?1 AND m.name = 'PRESS-A'",
            [test_date()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(planned, 4000);
    assert_eq!(actual, 0);
    assert_eq!(runtime, 0.0);

    // 历史记录取值范围: 实际产量为计划的 70%~95%,时长 6.5~8.0
    let mut stmt = conn
        .prepare(
            "SELECT planned_qty, actual_qty, runtime_hours
             FROM production_logs WHERE date < ?1",
        )
        .unwrap();
    let rows: Vec<(i64, i64, f64)> = stmt
        .query_map([test_date()], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows.len(), 4 * 7);
    for (planned, actual, runtime) in rows {
        assert!(actual >= (planned as f64 * 0.70) as i64 - 1);
        assert!(actual <= (planned as f64 * 0.95) as i64 + 1);
        assert!((6.5..=8.0).contains(&runtime));
    }

    // 默认配置已补齐
    let threshold: String = conn
        .query_row(
            "SELECT value FROM settings WHERE key = 'threshold_eff'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(threshold, "75.0");
}

#[test]
fn test_seed_is_idempotent() {
    let (_tmp, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开连接失败");

    let mut rng = SmallRng::seed_from_u64(11);
    db::seed_demo_data(&conn, test_date(), &mut rng).expect("种子写入失败");
    db::seed_demo_data(&conn, test_date(), &mut rng).expect("种子写入失败");

    let machines: i64 = conn
        .query_row("SELECT count(*) FROM machines", [], |row| row.get(0))
        .unwrap();
    let logs: i64 = conn
        .query_row("SELECT count(*) FROM production_logs", [], |row| row.get(0))
        .unwrap();
    assert_eq!(machines, 4);
    assert_eq!(logs, 4 * 8);
}

#[test]
fn test_seed_respects_existing_settings() {
    let (_tmp, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_test_connection(&db_path).expect("打开连接失败");
    set_setting(&conn, "threshold_eff", "60.0");

    let mut rng = SmallRng::seed_from_u64(11);
    db::seed_demo_data(&conn, test_date(), &mut rng).expect("种子写入失败");

    // INSERT OR IGNORE 不覆盖既有配置
    let threshold: String = conn
        .query_row(
            "SELECT value FROM settings WHERE key = 'threshold_eff'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(threshold, "60.0");
}
