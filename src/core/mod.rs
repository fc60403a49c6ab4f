//! 核心功能模块
//!
//! 与具体图形 API 无关的基础设施：日志、配置和错误处理。
//!
//! # 模块组织
//!
//! - `log`：基于 tracing 的日志系统
//! - `config`：从 TOML 配置文件加载运行参数
//! - `error`：统一的错误类型

pub mod log;
pub mod config;
pub mod error;

// 重新导出常用类型，方便使用
pub use error::{Result, KamataError, MeshError};
pub use config::Config;
