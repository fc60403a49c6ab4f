/// 网格顶点定义模块
///
/// 定义带纹理坐标的顶点结构，包含位置、法线和 UV 坐标。

use bytemuck::{Pod, Zeroable};

/// 顶点结构（位置 + 法线 + UV）
///
/// 内存布局与 GPU 兼容，使用 `#[repr(C)]` 保证顺序和对齐，
/// 可以直接通过 `bytemuck::cast_slice` 上传到顶点缓冲区。
///
/// # 内存布局
///
/// - position: 12 bytes (3 * f32)
/// - normal: 12 bytes (3 * f32)
/// - uv: 8 bytes (2 * f32)
/// - **总计**: 32 bytes
///
/// # 示例
///
/// ```rust
/// use kamata_mesh::geometry::Vertex;
///
/// let vertex = Vertex::new([0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.5, 0.5]);
/// assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
/// ```
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexPosNormalUv {
    /// 顶点位置 (x, y, z)
    pub position: [f32; 3],

    /// 法线向量 (nx, ny, nz)
    ///
    /// 平滑处理会覆盖这个字段。
    pub normal: [f32; 3],

    /// 纹理坐标 (u, v)
    pub uv: [f32; 2],
}

impl VertexPosNormalUv {
    /// 顶点步长（字节）
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;

    /// 创建一个新的顶点
    #[inline]
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}
