/// 模型加载器模块
///
/// 通过 `add_vertex` / `add_index` / `add_smooth_data` 把模型文件填充为 `Mesh`。
///
/// # 支持的格式
///
/// - **OBJ**: Wavefront OBJ 格式（使用 tobj crate）
///
/// # 使用示例
///
/// ```rust,no_run
/// use kamata_mesh::geometry::loaders::{load_mesh, LoadOptions};
/// use kamata_mesh::resource::MaterialLibrary;
/// use std::path::Path;
///
/// let mut materials = MaterialLibrary::new();
/// let meshes = load_mesh(Path::new("model.obj"), &LoadOptions::default(), &mut materials)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
use crate::core::error::{MeshLoadError, Result};
use crate::geometry::mesh::Mesh;
use crate::geometry::smoothing::NormalBlend;
use crate::resource::MaterialLibrary;
use std::path::Path;

pub mod obj_loader;

pub use obj_loader::ObjLoader;

/// 加载选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// 是否登记平滑组并在加载后计算平滑法线
    pub smoothing: bool,

    /// 平滑时的法线混合方式
    pub normal_blend: NormalBlend,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            smoothing: false,
            normal_blend: NormalBlend::Normalized,
        }
    }
}

impl LoadOptions {
    /// 开启平滑的加载选项
    pub fn smoothed(normal_blend: NormalBlend) -> Self {
        Self {
            smoothing: true,
            normal_blend,
        }
    }
}

/// 网格加载器 trait
///
/// 加载器是无状态的；材质注册到调用方传入的材质库，
/// 返回的网格通过句柄引用这些材质。
pub trait MeshLoader {
    /// 从文件路径加载
    fn load_from_file(
        path: &Path,
        options: &LoadOptions,
        materials: &mut MaterialLibrary,
    ) -> Result<Vec<Mesh>>;

    /// 从内存数据加载
    fn load_from_memory(
        data: &[u8],
        options: &LoadOptions,
        materials: &mut MaterialLibrary,
    ) -> Result<Vec<Mesh>>;

    /// 支持的文件扩展名（小写，不含点号）
    fn supported_extensions() -> &'static [&'static str];
}

/// 根据文件扩展名选择合适的加载器
pub fn load_mesh(
    path: &Path,
    options: &LoadOptions,
    materials: &mut MaterialLibrary,
) -> Result<Vec<Mesh>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| {
            MeshLoadError::UnsupportedFormat(format!(
                "cannot determine file extension of {}",
                path.display()
            ))
        })?;

    if ObjLoader::supported_extensions().contains(&extension.as_str()) {
        ObjLoader::load_from_file(path, options, materials)
    } else {
        Err(MeshLoadError::UnsupportedFormat(format!(".{}", extension)).into())
    }
}
