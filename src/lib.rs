// ==========================================
// 工厂生产监控系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 生产看板与效率分析 (按请求重算,无缓存)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 厂区配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/种子数据）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AlertKind, AlertSeverity, MachineStatus};

// 领域实体
pub use domain::{Alert, Machine, ProductionLog};

// 配置
pub use config::{PlantConfig, SHIFT_HOURS};

// 引擎
pub use engine::{AnalyticsEngine, KpiEngine, SimulationEngine};

// API
pub use api::{ApiError, ApiResult, MonitorApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "工厂生产监控系统";
