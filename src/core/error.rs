//! 错误处理模块
//!
//! 定义了库中使用的统一错误类型。
//!
//! 原始引擎中越界索引、提前绘制、重复创建缓冲区都是未定义行为，
//! 这里全部转换为 `MeshError` 的显式变体。

use std::fmt;
use std::path::PathBuf;

use crate::resource::MaterialHandle;

/// 统一的 Result 类型
pub type Result<T> = std::result::Result<T, KamataError>;

/// 库的顶层错误类型
#[derive(Debug)]
pub enum KamataError {
    /// 配置错误
    Config(ConfigError),

    /// 图形资源错误
    Graphics(GraphicsError),

    /// 网格加载错误
    MeshLoading(MeshLoadError),

    /// 网格操作错误
    Mesh(MeshError),

    /// IO 错误
    Io(std::io::Error),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 图形资源相关的错误
#[derive(Debug)]
pub enum GraphicsError {
    /// 资源创建失败
    ResourceCreation(String),

    /// 缓冲区句柄无效（已释放或从未创建）
    InvalidBuffer(u64),

    /// 设备正被其他地方借用
    DeviceBusy,
}

/// 网格加载相关的错误
#[derive(Debug)]
pub enum MeshLoadError {
    /// 文件不存在
    FileNotFound(PathBuf),

    /// 不支持的文件格式
    UnsupportedFormat(String),

    /// 解析失败
    ParseError(String),

    /// 几何数据无效
    InvalidGeometry(String),
}

/// 网格生命周期和几何数据相关的错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// 索引数组中的某个索引超出顶点范围
    IndexOutOfBounds {
        position: usize,
        index: u32,
        vertex_count: usize,
    },

    /// 平滑组引用了不存在的顶点
    SmoothVertexOutOfBounds {
        position_key: u32,
        vertex: u32,
        vertex_count: usize,
    },

    /// 在 `create_buffers` 之前调用了绘制
    BuffersNotCreated,

    /// `create_buffers` 被重复调用
    BuffersAlreadyCreated,

    /// 没有顶点或索引可以上传
    EmptyGeometry,

    /// 材质句柄在材质库中找不到
    MaterialNotFound(MaterialHandle),
}

impl fmt::Display for KamataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KamataError::Config(e) => write!(f, "Configuration error: {}", e),
            KamataError::Graphics(e) => write!(f, "Graphics error: {}", e),
            KamataError::MeshLoading(e) => write!(f, "Mesh loading error: {}", e),
            KamataError::Mesh(e) => write!(f, "Mesh error: {}", e),
            KamataError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::ResourceCreation(msg) => write!(f, "Resource creation failed: {}", msg),
            GraphicsError::InvalidBuffer(id) => write!(f, "Invalid buffer handle: {}", id),
            GraphicsError::DeviceBusy => write!(f, "Render device is already borrowed"),
        }
    }
}

impl fmt::Display for MeshLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshLoadError::FileNotFound(path) => write!(f, "Mesh file not found: {}", path.display()),
            MeshLoadError::UnsupportedFormat(msg) => write!(f, "Unsupported mesh format: {}", msg),
            MeshLoadError::ParseError(msg) => write!(f, "Failed to parse mesh: {}", msg),
            MeshLoadError::InvalidGeometry(msg) => write!(f, "Invalid geometry data: {}", msg),
        }
    }
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::IndexOutOfBounds { position, index, vertex_count } => write!(
                f,
                "Index {} at position {} is out of bounds (vertex count {})",
                index, position, vertex_count
            ),
            MeshError::SmoothVertexOutOfBounds { position_key, vertex, vertex_count } => write!(
                f,
                "Smoothing group {} references vertex {} (vertex count {})",
                position_key, vertex, vertex_count
            ),
            MeshError::BuffersNotCreated => write!(f, "Buffers have not been created yet"),
            MeshError::BuffersAlreadyCreated => write!(f, "Buffers have already been created"),
            MeshError::EmptyGeometry => write!(f, "Mesh has no vertices or indices to upload"),
            MeshError::MaterialNotFound(handle) => write!(f, "Material {} not found", handle.id()),
        }
    }
}

impl std::error::Error for KamataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KamataError::Io(e) => Some(e),
            KamataError::Mesh(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for GraphicsError {}
impl std::error::Error for MeshLoadError {}
impl std::error::Error for MeshError {}

impl From<std::io::Error> for KamataError {
    fn from(err: std::io::Error) -> Self {
        KamataError::Io(err)
    }
}

impl From<ConfigError> for KamataError {
    fn from(err: ConfigError) -> Self {
        KamataError::Config(err)
    }
}

impl From<GraphicsError> for KamataError {
    fn from(err: GraphicsError) -> Self {
        KamataError::Graphics(err)
    }
}

impl From<MeshLoadError> for KamataError {
    fn from(err: MeshLoadError) -> Self {
        KamataError::MeshLoading(err)
    }
}

impl From<MeshError> for KamataError {
    fn from(err: MeshError) -> Self {
        KamataError::Mesh(err)
    }
}

impl KamataError {
    /// 如果是网格错误则返回其引用，便于测试和调用方模式匹配
    pub fn as_mesh_error(&self) -> Option<&MeshError> {
        match self {
            KamataError::Mesh(e) => Some(e),
            _ => None,
        }
    }
}
