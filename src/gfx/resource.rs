//! 资源描述模块
//!
//! 描述 GPU 常驻缓冲区以及绘制管线读取缓冲区所需的视图。
//! 视图对应 D3D12 的 `D3D12_VERTEX_BUFFER_VIEW` / `D3D12_INDEX_BUFFER_VIEW`，
//! 但不持有任何原生指针，只记录句柄、大小和格式。

/// 设备分配的缓冲区句柄
///
/// 由 `RenderDevice` 发放，释放后不再有效且不会被复用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(u64);

impl BufferHandle {
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn id(&self) -> u64 {
        self.0
    }
}

/// 外部管理的纹理句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn id(&self) -> u32 {
        self.0
    }
}

/// 缓冲区使用类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsageType {
    /// 顶点缓冲区
    Vertex,
    /// 索引缓冲区
    Index,
}

/// 缓冲区描述信息
#[derive(Debug, Clone)]
pub struct BufferDescriptor {
    /// 缓冲区大小（字节）
    pub size: u64,
    /// 使用类型
    pub usage: BufferUsageType,
    /// 调试名称（可选）
    pub name: Option<String>,
}

impl BufferDescriptor {
    pub fn new(size: u64, usage: BufferUsageType) -> Self {
        Self {
            size,
            usage,
            name: None,
        }
    }

    /// 设置调试名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// 索引格式
///
/// 网格索引固定为 32 位。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    /// 32 位无符号整数
    Uint32,
}

impl IndexFormat {
    /// 单个索引占用的字节数
    #[inline]
    pub fn stride(&self) -> u32 {
        match self {
            IndexFormat::Uint32 => 4,
        }
    }
}

/// 顶点缓冲区视图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBufferView {
    pub buffer: BufferHandle,
    /// 整个缓冲区的字节数
    pub size_in_bytes: u32,
    /// 每个顶点的字节数
    pub stride_in_bytes: u32,
}

impl VertexBufferView {
    /// 视图覆盖的顶点数量
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        if self.stride_in_bytes == 0 {
            0
        } else {
            self.size_in_bytes / self.stride_in_bytes
        }
    }
}

/// 索引缓冲区视图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBufferView {
    pub buffer: BufferHandle,
    /// 整个缓冲区的字节数
    pub size_in_bytes: u32,
    pub format: IndexFormat,
}

impl IndexBufferView {
    /// 视图覆盖的索引数量
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.size_in_bytes / self.format.stride()
    }
}
