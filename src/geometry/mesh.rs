/// 网格模块
///
/// `Mesh` 保存顶点、索引、平滑组和材质引用，并负责把几何数据上传为
/// 常驻缓冲区以及记录绘制命令。
///
/// # 生命周期
///
/// ```text
/// Empty ──add_vertex/add_index/add_smooth_data──▶ Populated
///   ──create_buffers──▶ Buffered/Drawable ──draw (0..n 次)
///   ──release_buffers / drop──▶ Released
/// ```
///
/// 常驻缓冲区持有创建它们的设备，网格析构时自动归还；
/// `release_buffers` 用于提前释放并取得释放结果。
///
/// 原始引擎中越界索引、提前绘制、重复创建缓冲区都是未定义行为，
/// 这里分别返回 `MeshError` 的对应变体。

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use super::smoothing::{NormalBlend, SmoothingGroups};
use super::vertex::VertexPosNormalUv;
use crate::core::error::{GraphicsError, MeshError, Result};
use crate::gfx::{
    BufferDescriptor, BufferHandle, BufferUsageType, CommandContext, IndexBufferView,
    IndexFormat, SharedDevice, TextureHandle, VertexBufferView,
};
use crate::resource::{MaterialHandle, MaterialLibrary};

/// 网格拥有的常驻缓冲区及其视图
///
/// 析构时把两个缓冲区归还给 `device`。
struct MeshBuffers {
    vb_view: VertexBufferView,
    ib_view: IndexBufferView,
    device: SharedDevice,
    released: bool,
}

impl MeshBuffers {
    fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        let mut device = self
            .device
            .try_borrow_mut()
            .map_err(|_| GraphicsError::DeviceBusy)?;
        self.released = true;

        let vb = device.release_buffer(self.vb_view.buffer);
        let ib = device.release_buffer(self.ib_view.buffer);
        vb.and(ib)
    }
}

impl Drop for MeshBuffers {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            crate::engine_error!(
                vb = self.vb_view.buffer.id(),
                ib = self.ib_view.buffer.id(),
                error = %e,
                "Failed to release mesh buffers"
            );
        }
    }
}

impl fmt::Debug for MeshBuffers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshBuffers")
            .field("vb_view", &self.vb_view)
            .field("ib_view", &self.ib_view)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

/// 网格数据
///
/// # 示例
///
/// ```rust
/// use kamata_mesh::geometry::{Mesh, Vertex};
///
/// let mut mesh = Mesh::with_name("Quad");
/// mesh.add_vertex(Vertex::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0]));
/// mesh.add_vertex(Vertex::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]));
/// mesh.add_smooth_data(0, 0);
/// mesh.add_smooth_data(0, 1);
/// mesh.calculate_smoothed_vertex_normals()?;
///
/// assert_eq!(mesh.vertices()[0].normal, mesh.vertices()[1].normal);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct Mesh {
    name: String,
    vertices: Vec<VertexPosNormalUv>,
    indices: Vec<u32>,
    smooth_data: SmoothingGroups,
    material: Option<MaterialHandle>,
    buffers: Option<MeshBuffers>,
}

impl Mesh {
    /// 创建一个空网格
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建一个指定名称的空网格
    pub fn with_name(name: impl Into<String>) -> Self {
        let mut mesh = Self::new();
        mesh.name = name.into();
        mesh
    }

    /// 创建一个带容量预分配的网格
    pub fn with_capacity(vertex_capacity: usize, index_capacity: usize) -> Self {
        let mut mesh = Self::new();
        mesh.vertices.reserve(vertex_capacity);
        mesh.indices.reserve(index_capacity);
        mesh
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// 追加顶点，返回它在顶点数组中的索引
    ///
    /// 索引缓冲区是 32 位的，顶点数不能超过 `u32::MAX`；
    /// 超出时返回值饱和为 `u32::MAX`，`create_buffers` 会拒绝这样的网格。
    pub fn add_vertex(&mut self, vertex: VertexPosNormalUv) -> u32 {
        let index = u32::try_from(self.vertices.len()).unwrap_or(u32::MAX);
        self.vertices.push(vertex);
        index
    }

    /// 追加索引
    ///
    /// 此处不检查范围，越界索引在 `create_buffers` 时报告。
    pub fn add_index(&mut self, index: u32) {
        self.indices.push(index);
    }

    /// 登记顶点 `index_vertex` 与源位置 `index_position` 共享同一坐标
    ///
    /// 同一对重复登记只记录一次。
    pub fn add_smooth_data(&mut self, index_position: u32, index_vertex: u32) {
        self.smooth_data.insert(index_position, index_vertex);
    }

    /// 计算平滑顶点法线（平均后重新归一化）
    pub fn calculate_smoothed_vertex_normals(&mut self) -> Result<usize> {
        self.calculate_smoothed_vertex_normals_with(NormalBlend::Normalized)
    }

    /// 使用指定的混合方式计算平滑顶点法线
    ///
    /// 每个成员数不少于 2 的平滑组，其所有成员的法线被替换为组内法线的均值。
    /// 返回被平滑的组数量。
    pub fn calculate_smoothed_vertex_normals_with(&mut self, blend: NormalBlend) -> Result<usize> {
        let _span = crate::span_trace!("smooth_normals").entered();
        let smoothed = self.smooth_data.apply(&mut self.vertices, blend)?;
        debug!(
            mesh = %self.name,
            groups = self.smooth_data.len(),
            smoothed,
            ?blend,
            "Smoothed vertex normals"
        );
        Ok(smoothed)
    }

    /// 把顶点和索引上传为常驻缓冲区
    ///
    /// 只能调用一次；重复调用返回 `BuffersAlreadyCreated` 且不改变现有缓冲区。
    /// 网格保留 `device` 的引用，直到缓冲区被释放。
    pub fn create_buffers(&mut self, device: SharedDevice) -> Result<()> {
        if self.buffers.is_some() {
            return Err(MeshError::BuffersAlreadyCreated.into());
        }
        if self.vertices.is_empty() || self.indices.is_empty() {
            return Err(MeshError::EmptyGeometry.into());
        }
        self.validate_indices()?;

        let vertex_bytes: &[u8] = bytemuck::cast_slice(&self.vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(&self.indices);
        let vb_size = byte_size(vertex_bytes.len())?;
        let ib_size = byte_size(index_bytes.len())?;

        let mut dev = device.try_borrow_mut().map_err(|_| GraphicsError::DeviceBusy)?;

        let vb_desc = BufferDescriptor::new(vb_size as u64, BufferUsageType::Vertex)
            .with_name(format!("{}.VB", self.name));
        let vertex_buffer = dev.create_buffer(&vb_desc, vertex_bytes)?;

        let ib_desc = BufferDescriptor::new(ib_size as u64, BufferUsageType::Index)
            .with_name(format!("{}.IB", self.name));
        let index_buffer = match dev.create_buffer(&ib_desc, index_bytes) {
            Ok(handle) => handle,
            Err(e) => {
                // 索引缓冲区失败时不留下半个网格
                if let Err(cleanup) = dev.release_buffer(vertex_buffer) {
                    crate::engine_error!(
                        mesh = %self.name,
                        vb = vertex_buffer.id(),
                        error = %cleanup,
                        "Failed to release vertex buffer after index buffer creation failed"
                    );
                }
                return Err(e);
            }
        };

        crate::engine_info!(
            mesh = %self.name,
            backend = dev.backend_name(),
            vertices = self.vertices.len(),
            indices = self.indices.len(),
            "Mesh buffers created"
        );
        drop(dev);

        self.buffers = Some(MeshBuffers {
            vb_view: VertexBufferView {
                buffer: vertex_buffer,
                size_in_bytes: vb_size,
                stride_in_bytes: VertexPosNormalUv::STRIDE,
            },
            ib_view: IndexBufferView {
                buffer: index_buffer,
                size_in_bytes: ib_size,
                format: IndexFormat::Uint32,
            },
            device,
            released: false,
        });
        Ok(())
    }

    /// 提前释放常驻缓冲区
    ///
    /// 没有缓冲区时什么也不做。释放后可以再次调用 `create_buffers`。
    /// 设备正被借用时返回 `DeviceBusy`，缓冲区保持常驻。
    pub fn release_buffers(&mut self) -> Result<()> {
        if let Some(buffers) = self.buffers.as_mut() {
            let result = buffers.release();
            if buffers.released {
                self.buffers = None;
            }
            result?;
            debug!(mesh = %self.name, "Mesh buffers released");
        }
        Ok(())
    }

    /// 记录绘制命令，使用材质自带的纹理
    ///
    /// # 参数
    ///
    /// - `ctx`: 命令记录目标
    /// - `materials`: 用于解析材质句柄的材质库
    /// - `material_slot`: 材质常量的绑定槽位
    /// - `texture_slot`: 纹理的绑定槽位
    pub fn draw<C>(
        &self,
        ctx: &mut C,
        materials: &MaterialLibrary,
        material_slot: u32,
        texture_slot: u32,
    ) -> Result<()>
    where
        C: CommandContext + ?Sized,
    {
        self.record_draw(ctx, materials, material_slot, texture_slot, None)
    }

    /// 记录绘制命令，用 `texture` 替换材质的纹理
    pub fn draw_with_texture<C>(
        &self,
        ctx: &mut C,
        materials: &MaterialLibrary,
        material_slot: u32,
        texture_slot: u32,
        texture: TextureHandle,
    ) -> Result<()>
    where
        C: CommandContext + ?Sized,
    {
        self.record_draw(ctx, materials, material_slot, texture_slot, Some(texture))
    }

    fn record_draw<C>(
        &self,
        ctx: &mut C,
        materials: &MaterialLibrary,
        material_slot: u32,
        texture_slot: u32,
        texture_override: Option<TextureHandle>,
    ) -> Result<()>
    where
        C: CommandContext + ?Sized,
    {
        let buffers = self.buffers.as_ref().ok_or(MeshError::BuffersNotCreated)?;

        // 先解析材质，失败时不记录任何命令
        let material = match self.material {
            Some(handle) => Some((
                handle,
                materials.get(handle).ok_or(MeshError::MaterialNotFound(handle))?,
            )),
            None => None,
        };

        ctx.set_vertex_buffer(&buffers.vb_view);
        ctx.set_index_buffer(&buffers.ib_view);

        if let Some((handle, _)) = material {
            ctx.bind_material(material_slot, handle);
        }

        let texture = texture_override.or_else(|| material.and_then(|(_, m)| m.texture));
        if let Some(texture) = texture {
            ctx.bind_texture(texture_slot, texture);
        }

        ctx.draw_indexed(buffers.ib_view.index_count(), 1);
        Ok(())
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn vertices(&self) -> &[VertexPosNormalUv] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn material(&self) -> Option<MaterialHandle> {
        self.material
    }

    /// 设置材质引用，`None` 表示解除
    pub fn set_material(&mut self, material: Option<MaterialHandle>) {
        self.material = material;
    }

    /// 某个源位置的平滑组
    pub fn smooth_group(&self, index_position: u32) -> Option<&BTreeSet<u32>> {
        self.smooth_data.group(index_position)
    }

    pub fn smooth_group_count(&self) -> usize {
        self.smooth_data.len()
    }

    /// 顶点缓冲区视图，`create_buffers` 之前为 `None`
    #[inline]
    pub fn vb_view(&self) -> Option<&VertexBufferView> {
        self.buffers.as_ref().map(|b| &b.vb_view)
    }

    /// 索引缓冲区视图，`create_buffers` 之前为 `None`
    #[inline]
    pub fn ib_view(&self) -> Option<&IndexBufferView> {
        self.buffers.as_ref().map(|b| &b.ib_view)
    }

    #[inline]
    pub fn is_buffered(&self) -> bool {
        self.buffers.is_some()
    }

    /// 常驻缓冲区句柄（顶点, 索引）
    pub fn buffer_handles(&self) -> Option<(BufferHandle, BufferHandle)> {
        self.buffers.as_ref().map(|b| (b.vb_view.buffer, b.ib_view.buffer))
    }

    /// 检查所有索引都在顶点范围内
    pub fn validate_indices(&self) -> std::result::Result<(), MeshError> {
        let vertex_count = self.vertices.len();
        match self
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &index)| index as usize >= vertex_count)
        {
            Some((position, &index)) => Err(MeshError::IndexOutOfBounds {
                position,
                index,
                vertex_count,
            }),
            None => Ok(()),
        }
    }
}

fn byte_size(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        GraphicsError::ResourceCreation(format!("buffer of {} bytes exceeds 4 GiB", len)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::core::error::KamataError;
    use crate::gfx::{Command, CommandList, HeadlessDevice, RenderDevice};
    use crate::resource::Material;

    /// 创建索引缓冲区必定失败的设备
    struct IndexFailDevice {
        inner: HeadlessDevice,
        reject_release: bool,
    }

    impl RenderDevice for IndexFailDevice {
        fn create_buffer(&mut self, desc: &BufferDescriptor, contents: &[u8]) -> Result<BufferHandle> {
            if desc.usage == BufferUsageType::Index {
                return Err(GraphicsError::ResourceCreation("index heap exhausted".to_string()).into());
            }
            self.inner.create_buffer(desc, contents)
        }

        fn release_buffer(&mut self, handle: BufferHandle) -> Result<()> {
            if self.reject_release {
                return Err(GraphicsError::InvalidBuffer(handle.id()).into());
            }
            self.inner.release_buffer(handle)
        }

        fn buffer_size(&self, handle: BufferHandle) -> Option<u64> {
            self.inner.buffer_size(handle)
        }

        fn backend_name(&self) -> &str {
            "IndexFail"
        }
    }

    fn vertex(normal: [f32; 3]) -> VertexPosNormalUv {
        VertexPosNormalUv::new([0.0, 0.0, 0.0], normal, [0.0, 0.0])
    }

    fn triangle_mesh() -> Mesh {
        let mut mesh = Mesh::with_name("Triangle");
        mesh.add_vertex(VertexPosNormalUv::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]));
        mesh.add_vertex(VertexPosNormalUv::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]));
        mesh.add_vertex(VertexPosNormalUv::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]));
        for i in 0..3 {
            mesh.add_index(i);
        }
        mesh
    }

    fn assert_normal(actual: [f32; 3], expected: [f32; 3]) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-6, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_add_vertex_counts() {
        let mut mesh = Mesh::new();
        for i in 0..17 {
            assert_eq!(mesh.add_vertex(VertexPosNormalUv::default()), i);
        }
        assert_eq!(mesh.vertex_count(), 17);
    }

    #[test]
    fn test_name_and_material() {
        let mut mesh = Mesh::with_capacity(8, 24);
        assert_eq!(mesh.name(), "");
        mesh.set_name("Body");
        assert_eq!(mesh.name(), "Body");

        let mut library = MaterialLibrary::new();
        let handle = library.insert(Material::new("skin"));
        mesh.set_material(Some(handle));
        assert_eq!(mesh.material(), Some(handle));
        mesh.set_material(None);
        assert!(mesh.material().is_none());
    }

    #[test]
    fn test_smoothing_average() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(vertex([1.0, 0.0, 0.0]));
        mesh.add_vertex(vertex([0.0, 1.0, 0.0]));
        mesh.add_smooth_data(0, 0);
        mesh.add_smooth_data(0, 1);

        mesh.calculate_smoothed_vertex_normals_with(NormalBlend::Average).unwrap();

        assert_normal(mesh.vertices()[0].normal, [0.5, 0.5, 0.0]);
        assert_normal(mesh.vertices()[1].normal, [0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_smoothing_normalized_by_default() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(vertex([1.0, 0.0, 0.0]));
        mesh.add_vertex(vertex([0.0, 1.0, 0.0]));
        mesh.add_smooth_data(0, 0);
        mesh.add_smooth_data(0, 1);

        let smoothed = mesh.calculate_smoothed_vertex_normals().unwrap();

        let h = std::f32::consts::FRAC_1_SQRT_2;
        assert_eq!(smoothed, 1);
        assert_normal(mesh.vertices()[0].normal, [h, h, 0.0]);
        assert_normal(mesh.vertices()[1].normal, [h, h, 0.0]);
    }

    #[test]
    fn test_single_member_group_unchanged() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(vertex([0.0, 0.0, 1.0]));
        mesh.add_vertex(vertex([0.0, 1.0, 0.0]));
        mesh.add_smooth_data(4, 1);

        mesh.calculate_smoothed_vertex_normals().unwrap();

        assert_eq!(mesh.vertices()[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.vertices()[1].normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_duplicate_smooth_data() {
        let mut mesh = Mesh::new();
        mesh.add_smooth_data(2, 5);
        let single = mesh.smooth_group(2).map(|g| g.len());
        mesh.add_smooth_data(2, 5);

        assert_eq!(mesh.smooth_group(2).map(|g| g.len()), single);
        assert_eq!(mesh.smooth_group_count(), 1);
    }

    #[test]
    fn test_smooth_data_out_of_range() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(vertex([1.0, 0.0, 0.0]));
        mesh.add_smooth_data(0, 0);
        mesh.add_smooth_data(0, 3);

        let err = mesh.calculate_smoothed_vertex_normals().unwrap_err();
        assert!(matches!(
            err.as_mesh_error(),
            Some(MeshError::SmoothVertexOutOfBounds { vertex: 3, .. })
        ));
    }

    #[test]
    fn test_create_buffers_view_sizes() {
        let device = HeadlessDevice::shared();
        let mut mesh = triangle_mesh();

        mesh.create_buffers(device.clone()).unwrap();

        let vb = mesh.vb_view().unwrap();
        let ib = mesh.ib_view().unwrap();
        assert_eq!(vb.size_in_bytes as usize, mesh.vertex_count() * 32);
        assert_eq!(vb.stride_in_bytes, 32);
        assert_eq!(ib.size_in_bytes as usize, mesh.index_count() * 4);
        assert_eq!(ib.format, IndexFormat::Uint32);

        // 上传的字节与 CPU 侧数据一致
        {
            let device = device.borrow();
            let data = device.buffer_data(ib.buffer).unwrap();
            assert_eq!(data, bytemuck::cast_slice::<u32, u8>(mesh.indices()));
            assert_eq!(device.buffer_name(vb.buffer), Some("Triangle.VB"));
        }

        mesh.release_buffers().unwrap();
    }

    #[test]
    fn test_create_buffers_twice() {
        let device = HeadlessDevice::shared();
        let mut mesh = triangle_mesh();
        mesh.create_buffers(device.clone()).unwrap();
        let handles = mesh.buffer_handles();

        let err = mesh.create_buffers(device.clone()).unwrap_err();

        assert_eq!(err.as_mesh_error(), Some(&MeshError::BuffersAlreadyCreated));
        assert_eq!(mesh.buffer_handles(), handles);
        assert_eq!(device.borrow().live_buffer_count(), 2);

        mesh.release_buffers().unwrap();
    }

    #[test]
    fn test_create_buffers_index_out_of_bounds() {
        let device = HeadlessDevice::shared();
        let mut mesh = triangle_mesh();
        mesh.add_index(0);
        mesh.add_index(1);
        mesh.add_index(3);

        let err = mesh.create_buffers(device.clone()).unwrap_err();

        assert_eq!(
            err.as_mesh_error(),
            Some(&MeshError::IndexOutOfBounds {
                position: 5,
                index: 3,
                vertex_count: 3,
            })
        );
        assert!(!mesh.is_buffered());
        assert_eq!(device.borrow().live_buffer_count(), 0);
    }

    #[test]
    fn test_create_buffers_empty() {
        let device = HeadlessDevice::shared();
        let mut mesh = Mesh::new();

        let err = mesh.create_buffers(device.clone()).unwrap_err();
        assert_eq!(err.as_mesh_error(), Some(&MeshError::EmptyGeometry));
    }

    #[test]
    fn test_draw_before_buffers() {
        let mesh = triangle_mesh();
        let mut list = CommandList::new();

        let err = mesh.draw(&mut list, &MaterialLibrary::new(), 1, 2).unwrap_err();

        assert_eq!(err.as_mesh_error(), Some(&MeshError::BuffersNotCreated));
        assert!(list.is_empty());
    }

    #[test]
    fn test_draw_records_commands() {
        let device = HeadlessDevice::shared();
        let mut library = MaterialLibrary::new();
        let material = library.insert(Material::new("base").with_texture(TextureHandle::new(9)));

        let mut mesh = triangle_mesh();
        mesh.set_material(Some(material));
        mesh.create_buffers(device.clone()).unwrap();

        let mut list = CommandList::new();
        mesh.draw(&mut list, &library, 1, 2).unwrap();

        let vb = *mesh.vb_view().unwrap();
        let ib = *mesh.ib_view().unwrap();
        assert_eq!(
            list.commands(),
            &[
                Command::SetVertexBuffer(vb),
                Command::SetIndexBuffer(ib),
                Command::BindMaterial { slot: 1, material },
                Command::BindTexture { slot: 2, texture: TextureHandle::new(9) },
                Command::DrawIndexed { index_count: 3, instance_count: 1 },
            ]
        );

        mesh.release_buffers().unwrap();
    }

    #[test]
    fn test_draw_with_texture_override() {
        let device = HeadlessDevice::shared();
        let mut library = MaterialLibrary::new();
        let material = library.insert(Material::new("base").with_texture(TextureHandle::new(9)));

        let mut mesh = triangle_mesh();
        mesh.set_material(Some(material));
        mesh.create_buffers(device.clone()).unwrap();

        let mut list = CommandList::new();
        mesh.draw_with_texture(&mut list, &library, 1, 2, TextureHandle::new(42)).unwrap();

        assert!(list
            .commands()
            .contains(&Command::BindTexture { slot: 2, texture: TextureHandle::new(42) }));
        assert!(!list
            .commands()
            .contains(&Command::BindTexture { slot: 2, texture: TextureHandle::new(9) }));

        mesh.release_buffers().unwrap();
    }

    #[test]
    fn test_draw_without_material() {
        let device = HeadlessDevice::shared();
        let mut mesh = triangle_mesh();
        mesh.create_buffers(device.clone()).unwrap();

        let mut list = CommandList::new();
        mesh.draw(&mut list, &MaterialLibrary::new(), 1, 2).unwrap();

        assert_eq!(list.len(), 3);
        assert_eq!(list.draw_call_count(), 1);

        mesh.release_buffers().unwrap();
    }

    #[test]
    fn test_draw_with_stale_material() {
        let device = HeadlessDevice::shared();
        let mut library = MaterialLibrary::new();
        let material = library.insert(Material::new("gone"));
        library.remove(material);

        let mut mesh = triangle_mesh();
        mesh.set_material(Some(material));
        mesh.create_buffers(device.clone()).unwrap();

        let mut list = CommandList::new();
        let err = mesh.draw(&mut list, &library, 1, 2).unwrap_err();

        assert_eq!(err.as_mesh_error(), Some(&MeshError::MaterialNotFound(material)));
        assert!(list.is_empty());

        mesh.release_buffers().unwrap();
    }

    #[test]
    fn test_release_and_recreate() {
        let device = HeadlessDevice::shared();
        let mut mesh = triangle_mesh();

        mesh.create_buffers(device.clone()).unwrap();
        mesh.release_buffers().unwrap();
        assert!(!mesh.is_buffered());
        assert!(mesh.vb_view().is_none());
        assert_eq!(device.borrow().live_buffer_count(), 0);

        // 释放后 CPU 侧数据仍然保留
        assert_eq!(mesh.vertex_count(), 3);
        mesh.create_buffers(device.clone()).unwrap();
        assert_eq!(device.borrow().live_buffer_count(), 2);

        mesh.release_buffers().unwrap();
        // 没有缓冲区时释放是空操作
        mesh.release_buffers().unwrap();
    }

    #[test]
    fn test_drop_releases_buffers() {
        let device = HeadlessDevice::shared();
        {
            let mut mesh = triangle_mesh();
            mesh.create_buffers(device.clone()).unwrap();
            assert_eq!(device.borrow().live_buffer_count(), 2);
        }

        assert_eq!(device.borrow().live_buffer_count(), 0);
        assert_eq!(Rc::strong_count(&device), 1);
    }

    #[test]
    fn test_index_buffer_failure_releases_vertex_buffer() {
        let device = Rc::new(RefCell::new(IndexFailDevice {
            inner: HeadlessDevice::new(),
            reject_release: false,
        }));
        let mut mesh = triangle_mesh();

        let err = mesh.create_buffers(device.clone()).unwrap_err();

        assert!(matches!(err, KamataError::Graphics(GraphicsError::ResourceCreation(_))));
        assert!(!mesh.is_buffered());
        assert_eq!(device.borrow().inner.total_created(), 1);
        assert_eq!(device.borrow().inner.live_buffer_count(), 0);
    }

    #[test]
    fn test_failed_cleanup_keeps_creation_error() {
        let device = Rc::new(RefCell::new(IndexFailDevice {
            inner: HeadlessDevice::new(),
            reject_release: true,
        }));
        let mut mesh = triangle_mesh();

        let err = mesh.create_buffers(device.clone()).unwrap_err();

        assert!(matches!(err, KamataError::Graphics(GraphicsError::ResourceCreation(_))));
        assert!(!mesh.is_buffered());
        assert_eq!(Rc::strong_count(&device), 1);
    }

    #[test]
    fn test_release_while_device_borrowed() {
        let device = HeadlessDevice::shared();
        let mut mesh = triangle_mesh();
        mesh.create_buffers(device.clone()).unwrap();

        {
            let _guard = device.borrow_mut();
            let err = mesh.release_buffers().unwrap_err();
            assert!(matches!(err, KamataError::Graphics(GraphicsError::DeviceBusy)));
            assert!(mesh.is_buffered());
        }

        mesh.release_buffers().unwrap();
        assert!(!mesh.is_buffered());
        assert_eq!(device.borrow().live_buffer_count(), 0);
    }
}
