//! 配置管理模块
//!
//! 从 TOML 配置文件加载运行参数，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//!
//! [mesh]
//! smoothing = true
//! normal_blend = "normalized"   # 或 "average"
//!
//! [render]
//! material_root_parameter = 1
//! texture_root_parameter = 2
//!
//! [scene]
//! model_path = "assets/models/cube.obj"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};
use crate::geometry::NormalBlend;

/// 运行配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,

    /// 网格处理配置
    #[serde(default)]
    pub mesh: MeshConfig,

    /// 绘制时的绑定槽位
    #[serde(default)]
    pub render: RenderConfig,

    /// 场景内容
    #[serde(default)]
    pub scene: SceneConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// 网格处理配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    /// 加载后是否计算平滑法线
    #[serde(default = "default_smoothing")]
    pub smoothing: bool,

    /// 平滑时的法线混合方式
    #[serde(default = "default_normal_blend")]
    pub normal_blend: NormalBlend,
}

/// 绘制绑定配置
///
/// 对应原始引擎中 `Draw` 的两个根参数编号。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// 材质常量缓冲区的绑定槽位
    #[serde(default = "default_material_slot")]
    pub material_root_parameter: u32,

    /// 纹理的绑定槽位
    #[serde(default = "default_texture_slot")]
    pub texture_root_parameter: u32,
}

/// 场景配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// 模型文件路径
    #[serde(default = "default_model_path")]
    pub model_path: String,

    /// 绘制时替换材质纹理（可选）
    #[serde(default)]
    pub texture_override: Option<u32>,
}

// 默认值函数
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "kamata_mesh.log".to_string() }
fn default_smoothing() -> bool { true }
fn default_normal_blend() -> NormalBlend { NormalBlend::Normalized }
fn default_material_slot() -> u32 { 1 }
fn default_texture_slot() -> u32 { 2 }
fn default_model_path() -> String { "assets/models/cube.obj".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            smoothing: default_smoothing(),
            normal_blend: default_normal_blend(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            material_root_parameter: default_material_slot(),
            texture_root_parameter: default_texture_slot(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            texture_override: None,
        }
    }
}

impl Config {
    /// 从配置文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        Self::from_toml_str(&contents)
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在或无法解析则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                // 日志系统此时还未初始化
                eprintln!("Failed to load {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// 支持的参数：
    /// - `--model <path>`: 模型文件路径
    /// - `--no-smoothing`: 关闭法线平滑
    /// - `--average-normals`: 平滑时只取平均，不重新归一化
    /// - `--texture <handle>`: 绘制时替换纹理
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        if let Some(idx) = args.iter().position(|a| a == "--model") {
            if let Some(path) = args.get(idx + 1) {
                self.scene.model_path = path.clone();
            }
        }

        if args.iter().any(|a| a == "--no-smoothing") {
            self.mesh.smoothing = false;
        }

        if args.iter().any(|a| a == "--average-normals") {
            self.mesh.normal_blend = NormalBlend::Average;
        }

        if let Some(idx) = args.iter().position(|a| a == "--texture") {
            if let Some(handle) = args.get(idx + 1).and_then(|s| s.parse().ok()) {
                self.scene.texture_override = Some(handle);
            }
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.render.material_root_parameter == self.render.texture_root_parameter {
            return Err(ConfigError::InvalidValue {
                field: "render.texture_root_parameter".to_string(),
                reason: "Material and texture must use different binding slots".to_string(),
            }
            .into());
        }

        if self.scene.model_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scene.model_path".to_string(),
                reason: "Model path must not be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
