// ==========================================
// 工厂生产监控系统 - 领域层
// ==========================================
// 职责: 领域实体与类型定义,不含数据访问
// ==========================================

pub mod alert;
pub mod machine;
pub mod production_log;
pub mod types;

// 重导出核心实体
pub use alert::Alert;
pub use machine::Machine;
pub use production_log::ProductionLog;
pub use types::{AlertKind, AlertSeverity, MachineStatus};
