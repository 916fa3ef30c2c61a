// ==========================================
// 工厂生产监控系统 - 主入口
// ==========================================
// 行为: 初始化数据库与演示数据,执行一次模拟 tick,
//       输出看板 KPI 与分析视图的 JSON
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use smart_factory_monitor::{db, logging, MonitorApi};

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", smart_factory_monitor::APP_NAME);
    tracing::info!("系统版本: {}", smart_factory_monitor::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = default_db_path()?;
    tracing::info!("使用数据库: {}", db_path.display());

    // 初始化 schema 与演示数据
    let conn = db::open_sqlite_connection(
        db_path
            .to_str()
            .context("数据库路径包含非法字符")?,
    )?;
    db::init_schema(&conn)?;

    let today = chrono::Local::now().date_naive();
    let mut rng = SmallRng::from_os_rng();
    db::seed_demo_data(&conn, today, &mut rng)?;

    // 创建API并演示一轮完整流程
    let api = MonitorApi::from_connection(Arc::new(Mutex::new(conn)));

    api.run_simulation_tick()?;

    let kpis = api.get_dashboard_kpis()?;
    println!("{}", serde_json::to_string_pretty(&kpis)?);

    let analytics = api.get_analytics()?;
    println!("{}", serde_json::to_string_pretty(&analytics)?);

    Ok(())
}

/// 默认数据库路径: <系统数据目录>/smart-factory-monitor/monitor.db
fn default_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("smart-factory-monitor");
    std::fs::create_dir_all(&base)
        .with_context(|| format!("无法创建数据目录: {}", base.display()))?;
    Ok(base.join("monitor.db"))
}
