// ==========================================
// 工厂生产监控系统 - API 层
// ==========================================
// 职责: 对外业务接口,输入校验与错误转换
// ==========================================

pub mod error;
pub mod monitor_api;

pub use error::{ApiError, ApiResult};
pub use monitor_api::{AlertsOverview, MonitorApi, SimulationTickResponse};
