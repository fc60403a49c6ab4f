//! 材质与材质库
//!
//! 网格只保存 `MaterialHandle`，材质本身由 `MaterialLibrary` 持有。
//! 材质被重新加载或删除时不会留下悬空引用：
//! 已删除材质的句柄在查找时返回 `None`，句柄不会被复用。

use std::collections::BTreeMap;

use tracing::debug;

use crate::gfx::TextureHandle;

/// 材质句柄（非拥有引用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(u32);

impl MaterialHandle {
    #[inline]
    pub const fn id(&self) -> u32 {
        self.0
    }
}

/// 材质参数
///
/// 对应 MTL 文件中的 `Ka` / `Kd` / `Ks` / `d` / `map_Kd`。
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// 材质名称
    pub name: String,
    /// 环境光颜色
    pub ambient: [f32; 3],
    /// 漫反射颜色
    pub diffuse: [f32; 3],
    /// 高光颜色
    pub specular: [f32; 3],
    /// 不透明度
    pub alpha: f32,
    /// 漫反射纹理文件名
    pub texture_filename: Option<String>,
    /// 已加载的纹理句柄，由外部纹理管理器分配
    pub texture: Option<TextureHandle>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: [0.3, 0.3, 0.3],
            diffuse: [0.0, 0.0, 0.0],
            specular: [0.0, 0.0, 0.0],
            alpha: 1.0,
            texture_filename: None,
            texture: None,
        }
    }
}

/// 材质查找表
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    materials: BTreeMap<MaterialHandle, Material>,
    next_id: u32,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册材质并返回新句柄
    pub fn insert(&mut self, material: Material) -> MaterialHandle {
        let handle = MaterialHandle(self.next_id);
        self.next_id += 1;
        debug!(handle = handle.id(), name = %material.name, "Material registered");
        self.materials.insert(handle, material);
        handle
    }

    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(&handle)
    }

    pub fn get_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        self.materials.get_mut(&handle)
    }

    /// 删除材质，之后该句柄查找结果为 `None`
    pub fn remove(&mut self, handle: MaterialHandle) -> Option<Material> {
        self.materials.remove(&handle)
    }

    /// 原地替换材质（重新加载），句柄保持不变
    ///
    /// 返回旧材质；句柄不存在时返回 `None` 且不插入。
    pub fn replace(&mut self, handle: MaterialHandle, material: Material) -> Option<Material> {
        self.materials
            .get_mut(&handle)
            .map(|slot| std::mem::replace(slot, material))
    }

    /// 按名称查找第一个匹配的材质
    pub fn find_by_name(&self, name: &str) -> Option<MaterialHandle> {
        self.materials
            .iter()
            .find(|(_, m)| m.name == name)
            .map(|(handle, _)| *handle)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut library = MaterialLibrary::new();
        let red = library.insert(Material::new("red"));
        let blue = library.insert(Material::new("blue"));

        assert_ne!(red, blue);
        assert_eq!(library.len(), 2);
        assert_eq!(library.get(blue).map(|m| m.name.as_str()), Some("blue"));
        assert_eq!(library.find_by_name("red"), Some(red));
        assert_eq!(library.find_by_name("green"), None);
    }

    #[test]
    fn test_removed_handle_is_stale() {
        let mut library = MaterialLibrary::new();
        let handle = library.insert(Material::new("temp"));
        library.remove(handle);

        assert!(library.get(handle).is_none());

        // 新材质不复用旧句柄
        let next = library.insert(Material::new("next"));
        assert_ne!(handle, next);
        assert!(library.get(handle).is_none());
    }

    #[test]
    fn test_replace_keeps_handle() {
        let mut library = MaterialLibrary::new();
        let handle = library.insert(Material::new("v1"));

        let old = library.replace(handle, Material::new("v2").with_texture(TextureHandle::new(4)));

        assert_eq!(old.map(|m| m.name), Some("v1".to_string()));
        let current = library.get(handle).unwrap();
        assert_eq!(current.name, "v2");
        assert_eq!(current.texture, Some(TextureHandle::new(4)));
    }

    #[test]
    fn test_default_material() {
        let material = Material::default();
        assert_eq!(material.alpha, 1.0);
        assert!(material.texture.is_none());
    }
}
