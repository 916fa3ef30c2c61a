// ==========================================
// SimulationEngine 引擎集成测试
// ==========================================
// 测试目标: 验证生产进度推进的钳制/终态与告警去重
// 随机源: ZeroRng(最小增量+必中抽样) 与种子化 SmallRng
// ==========================================

mod test_helpers;

use chrono::NaiveDate;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use smart_factory_monitor::engine::SimulationEngine;
use smart_factory_monitor::SHIFT_HOURS;
use test_helpers::*;

// ==========================================
// 测试辅助
// ==========================================

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
}

/// 恒零随机源: random_range 取区间下界,random_bool 必中
///
/// 用途: 把模拟步进变成确定性的最小步长,便于精确断言
struct ZeroRng;

impl RngCore for ZeroRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }
}

/// 读取某条生产记录的 (actual_qty, runtime_hours)
fn read_progress(conn: &rusqlite::Connection, log_id: i64) -> (i64, f64) {
    conn.query_row(
        "SELECT actual_qty, runtime_hours FROM production_logs WHERE id = ?1",
        [log_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .expect("读取生产记录失败")
}

// ==========================================
// 测试用例 1: 最小步长推进与终态钳制
// ==========================================

#[test]
fn test_tick_clamps_at_planned_qty() {
    let (_tmp, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_shared_connection(&db_path).expect("打开连接失败");

    let log_id = {
        let guard = conn.lock().unwrap();
        let machine_id = insert_machine(&guard, "CNC-01", "Milling", 100);
        // 计划量 30: ZeroRng 每次 +10,三次到顶
        insert_log(&guard, machine_id, test_date(), 30, 0, 0.0)
    };

    let engine = SimulationEngine::from_connection(conn.clone());
    let mut rng = ZeroRng;

    for expected in [10i64, 20, 30] {
        let report = engine.tick(test_date(), &mut rng).expect("tick 失败");
        assert_eq!(report.advanced_logs, 1);
        let (actual, runtime) = {
            let guard = conn.lock().unwrap();
            read_progress(&guard, log_id)
        };
        assert_eq!(actual, expected);
        assert!(runtime >= 0.1 && runtime <= SHIFT_HOURS);
    }

    // 终态: 后续 tick 不再推进
    let report = engine.tick(test_date(), &mut rng).expect("tick 失败");
    assert_eq!(report.advanced_logs, 0);
    let (actual, _) = {
        let guard = conn.lock().unwrap();
        read_progress(&guard, log_id)
    };
    assert_eq!(actual, 30);
}

// ==========================================
// 测试用例 2: 大量 tick 后产量/时长不越界
// ==========================================

#[test]
fn test_many_ticks_never_overshoot() {
    let (_tmp, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_shared_connection(&db_path).expect("打开连接失败");

    let log_id = {
        let guard = conn.lock().unwrap();
        let machine_id = insert_machine(&guard, "PRESS-A", "Press", 500);
        insert_log(&guard, machine_id, test_date(), 800, 0, 0.0)
    };

    let engine = SimulationEngine::from_connection(conn.clone());
    let mut rng = SmallRng::seed_from_u64(42);

    let mut prev_actual = 0i64;
    let mut prev_runtime = 0.0f64;
    for _ in 0..100 {
        engine.tick(test_date(), &mut rng).expect("tick 失败");
        let (actual, runtime) = {
            let guard = conn.lock().unwrap();
            read_progress(&guard, log_id)
        };
        // 单调不减且不越界
        assert!(actual >= prev_actual);
        assert!(actual <= 800);
        assert!(runtime >= prev_runtime);
        assert!(runtime <= SHIFT_HOURS);
        prev_actual = actual;
        prev_runtime = runtime;
    }

    // 100 次 tick(每次至少+10)后必达计划量
    assert_eq!(prev_actual, 800);
}

// ==========================================
// 测试用例 3: 效率跌落告警按日去重
// ==========================================

#[test]
fn test_alert_deduplicated_per_machine_per_day() {
    let (_tmp, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_shared_connection(&db_path).expect("打开连接失败");

    {
        let guard = conn.lock().unwrap();
        // 计划量极大: 效率长期 < 60%,每次 tick 都满足告警条件
        let machine_id = insert_machine(&guard, "PACK-01", "Packing", 1000);
        insert_log(&guard, machine_id, test_date(), 1_000_000, 0, 0.0);
    }

    let engine = SimulationEngine::from_connection(conn.clone());
    let mut rng = ZeroRng;

    // 首次 tick: 抽样必中且当日无同类型告警 → 创建一条
    let report = engine.tick(test_date(), &mut rng).expect("tick 失败");
    assert_eq!(report.alerts_raised, 1);

    // 后续 tick 条件仍命中,但去重键已存在 → 不再新增
    for _ in 0..5 {
        let report = engine.tick(test_date(), &mut rng).expect("tick 失败");
        assert_eq!(report.alerts_raised, 0);
    }

    let guard = conn.lock().unwrap();
    assert_eq!(count_alerts(&guard), 1);

    // 告警内容: Warning 级别,消息带向下取整的效率百分比
    let (message, severity): (String, String) = guard
        .query_row(
            "SELECT message, severity FROM alerts LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("读取告警失败");
    assert_eq!(severity, "Warning");
    assert_eq!(message, "Efficiency drop detected: 0%");
}

// ==========================================
// 测试用例 4: 效率未跌落时不产生告警
// ==========================================

#[test]
fn test_no_alert_when_efficiency_above_floor() {
    let (_tmp, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_shared_connection(&db_path).expect("打开连接失败");

    {
        let guard = conn.lock().unwrap();
        // 计划量 16: 首次 +10 后效率 62.5% >= 60%,告警分支不进入
        let machine_id = insert_machine(&guard, "CNC-02", "Milling", 2);
        insert_log(&guard, machine_id, test_date(), 16, 0, 0.0);
    }

    let engine = SimulationEngine::from_connection(conn.clone());
    let mut rng = ZeroRng;

    let report = engine.tick(test_date(), &mut rng).expect("tick 失败");
    assert_eq!(report.advanced_logs, 1);
    assert_eq!(report.alerts_raised, 0);

    let guard = conn.lock().unwrap();
    assert_eq!(count_alerts(&guard), 0);
}

// ==========================================
// 测试用例 5: 只推进指定日期的记录
// ==========================================

#[test]
fn test_tick_only_touches_given_date() {
    let (_tmp, db_path) = create_test_db().expect("创建测试库失败");
    let conn = open_shared_connection(&db_path).expect("打开连接失败");

    let (today_log, history_log) = {
        let guard = conn.lock().unwrap();
        let machine_id = insert_machine(&guard, "CNC-01", "Milling", 100);
        let today_log = insert_log(&guard, machine_id, test_date(), 800, 0, 0.0);
        // 历史记录未完工,也不得被推进
        let history = test_date() - chrono::Duration::days(1);
        let history_log = insert_log(&guard, machine_id, history, 800, 100, 2.0);
        (today_log, history_log)
    };

    let engine = SimulationEngine::from_connection(conn.clone());
    let mut rng = ZeroRng;
    engine.tick(test_date(), &mut rng).expect("tick 失败");

    let guard = conn.lock().unwrap();
    let (today_actual, _) = read_progress(&guard, today_log);
    let (history_actual, history_runtime) = read_progress(&guard, history_log);

    assert_eq!(today_actual, 10);
    assert_eq!(history_actual, 100);
    assert_eq!(history_runtime, 2.0);
}
