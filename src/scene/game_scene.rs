//! 游戏场景
//!
//! 场景持有网格和材质库，按 初始化 → 每帧更新 → 绘制 → 关闭 的顺序驱动它们。
//! 渲染设备和命令上下文都以参数形式传入，场景本身不访问任何全局对象。

use std::path::Path;

use tracing::{debug, info};

use crate::core::config::Config;
use crate::core::error::Result;
use crate::geometry::loaders::{load_mesh, LoadOptions};
use crate::geometry::Mesh;
use crate::gfx::{CommandContext, SharedDevice, TextureHandle};
use crate::resource::MaterialLibrary;

/// 场景的绘制绑定和加载参数
#[derive(Debug, Clone, Copy)]
struct SceneSettings {
    load_options: LoadOptions,
    material_slot: u32,
    texture_slot: u32,
    texture_override: Option<TextureHandle>,
}

/// 游戏场景
pub struct GameScene {
    settings: SceneSettings,
    meshes: Vec<Mesh>,
    materials: MaterialLibrary,
    initialized: bool,
    frame_count: u64,
    elapsed: f32,
}

impl GameScene {
    pub fn new(config: &Config) -> Self {
        Self {
            settings: SceneSettings {
                load_options: LoadOptions {
                    smoothing: config.mesh.smoothing,
                    normal_blend: config.mesh.normal_blend,
                },
                material_slot: config.render.material_root_parameter,
                texture_slot: config.render.texture_root_parameter,
                texture_override: config.scene.texture_override.map(TextureHandle::new),
            },
            meshes: Vec::new(),
            materials: MaterialLibrary::new(),
            initialized: false,
            frame_count: 0,
            elapsed: 0.0,
        }
    }

    /// 从模型文件加载网格，材质注册到场景的材质库
    ///
    /// 返回新增的网格数量。
    pub fn load_model(&mut self, path: &Path) -> Result<usize> {
        let meshes = load_mesh(path, &self.settings.load_options, &mut self.materials)?;
        let count = meshes.len();
        self.meshes.extend(meshes);
        info!(path = %path.display(), meshes = count, "Model added to scene");
        Ok(count)
    }

    /// 添加一个已填充的网格
    pub fn add_mesh(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    /// 为所有尚未上传的网格创建缓冲区
    pub fn initialize(&mut self, device: SharedDevice) -> Result<()> {
        for mesh in self.meshes.iter_mut().filter(|m| !m.is_buffered()) {
            mesh.create_buffers(device.clone())?;
        }
        self.initialized = true;
        info!(meshes = self.meshes.len(), "Scene initialized");
        Ok(())
    }

    /// 每帧更新
    pub fn update(&mut self, delta_time: f32) {
        self.frame_count += 1;
        self.elapsed += delta_time;
    }

    /// 把所有网格的绘制命令记录到 `ctx`
    pub fn draw<C>(&self, ctx: &mut C) -> Result<()>
    where
        C: CommandContext + ?Sized,
    {
        let SceneSettings { material_slot, texture_slot, texture_override, .. } = self.settings;

        for mesh in &self.meshes {
            match texture_override {
                Some(texture) => mesh.draw_with_texture(
                    ctx,
                    &self.materials,
                    material_slot,
                    texture_slot,
                    texture,
                )?,
                None => mesh.draw(ctx, &self.materials, material_slot, texture_slot)?,
            }
        }
        debug!(frame = self.frame_count, meshes = self.meshes.len(), "Scene drawn");
        Ok(())
    }

    /// 释放所有网格的常驻缓冲区
    ///
    /// 场景析构时网格会自行释放，这里用于在仍持有场景时提前释放。
    pub fn shutdown(&mut self) -> Result<()> {
        for mesh in &mut self.meshes {
            mesh.release_buffers()?;
        }
        self.initialized = false;
        info!(frames = self.frame_count, "Scene shut down");
        Ok(())
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    /// 材质库的可变引用，用于分配纹理或重新加载材质
    pub fn materials_mut(&mut self) -> &mut MaterialLibrary {
        &mut self.materials
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// 累计经过的时间（秒）
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vertex;
    use crate::gfx::{Command, CommandList, HeadlessDevice};
    use crate::resource::Material;

    fn quad(name: &str) -> Mesh {
        let mut mesh = Mesh::with_name(name);
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]] {
            mesh.add_vertex(Vertex::new(p, [0.0, 0.0, 1.0], [0.0, 0.0]));
        }
        for i in [0, 1, 2, 0, 2, 3] {
            mesh.add_index(i);
        }
        mesh
    }

    #[test]
    fn test_scene_lifecycle() {
        let device = HeadlessDevice::shared();
        let mut scene = GameScene::new(&Config::default());
        scene.add_mesh(quad("A"));
        scene.add_mesh(quad("B"));

        scene.initialize(device.clone()).unwrap();
        assert!(scene.is_initialized());
        assert_eq!(device.borrow().live_buffer_count(), 4);

        scene.update(0.016);
        scene.update(0.016);
        assert_eq!(scene.frame_count(), 2);
        assert!((scene.elapsed() - 0.032).abs() < 1e-6);

        let mut list = CommandList::new();
        scene.draw(&mut list).unwrap();
        assert_eq!(list.draw_call_count(), 2);
        assert_eq!(list.total_indices_drawn(), 12);

        scene.shutdown().unwrap();
        assert_eq!(device.borrow().live_buffer_count(), 0);
    }

    #[test]
    fn test_draw_before_initialize_fails() {
        let mut scene = GameScene::new(&Config::default());
        scene.add_mesh(quad("A"));

        let mut list = CommandList::new();
        assert!(scene.draw(&mut list).is_err());
    }

    #[test]
    fn test_texture_override_from_config() {
        let mut config = Config::default();
        config.scene.texture_override = Some(11);

        let device = HeadlessDevice::shared();
        let mut scene = GameScene::new(&config);
        let material = scene
            .materials_mut()
            .insert(Material::new("base").with_texture(TextureHandle::new(3)));

        let mut mesh = quad("A");
        mesh.set_material(Some(material));
        scene.add_mesh(mesh);
        scene.initialize(device.clone()).unwrap();

        let mut list = CommandList::new();
        scene.draw(&mut list).unwrap();

        assert!(list.commands().contains(&Command::BindMaterial {
            slot: config.render.material_root_parameter,
            material,
        }));
        assert!(list.commands().contains(&Command::BindTexture {
            slot: config.render.texture_root_parameter,
            texture: TextureHandle::new(11),
        }));

        scene.shutdown().unwrap();
    }

    #[test]
    fn test_dropping_scene_releases_buffers() {
        let device = HeadlessDevice::shared();
        let mut scene = GameScene::new(&Config::default());
        scene.add_mesh(quad("A"));
        scene.add_mesh(quad("B"));
        scene.initialize(device.clone()).unwrap();
        assert_eq!(device.borrow().live_buffer_count(), 4);

        drop(scene);

        assert_eq!(device.borrow().live_buffer_count(), 0);
    }
}
