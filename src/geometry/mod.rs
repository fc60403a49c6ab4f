/// 几何体模块
///
/// 网格数据容器、顶点法线平滑以及从模型文件填充网格的加载器。
///
/// # 模块结构
///
/// - `vertex`: 顶点数据结构定义
/// - `mesh`: 网格容器（顶点/索引追加、缓冲区创建、绘制）
/// - `smoothing`: 平滑组与法线混合
/// - `loaders`: 各种格式的模型加载器
///
/// # 数据流
///
/// ```text
/// 文件 (OBJ)
///     ↓
/// Loader (ObjLoader) ── add_vertex / add_index / add_smooth_data
///     ↓
/// Mesh (CPU侧数据) ── calculate_smoothed_vertex_normals
///     ↓
/// RenderDevice (create_buffers) → CommandContext (draw)
/// ```

pub mod vertex;
pub mod mesh;
pub mod smoothing;
pub mod loaders;

// 重新导出常用类型
pub use vertex::VertexPosNormalUv;
pub use vertex::VertexPosNormalUv as Vertex;
pub use mesh::Mesh;
pub use smoothing::{NormalBlend, SmoothingGroups};
