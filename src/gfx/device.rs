//! 渲染设备抽象
//!
//! 网格只通过 `RenderDevice` 创建和释放常驻缓冲区，
//! 设备以参数形式传入（不再通过全局单例获取）。
//! 常驻缓冲区持有 `SharedDevice`，析构时把缓冲区归还给设备。

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::error::Result;

use super::resource::{BufferDescriptor, BufferHandle};

/// 缓冲区分配接口
///
/// 具体的图形后端（D3D12、Vulkan、wgpu 等）实现此 trait；
/// 库本身提供 `HeadlessDevice` 作为内存实现。
pub trait RenderDevice {
    /// 创建缓冲区并上传初始数据
    ///
    /// `contents` 的长度必须等于 `desc.size`。
    fn create_buffer(&mut self, desc: &BufferDescriptor, contents: &[u8]) -> Result<BufferHandle>;

    /// 释放缓冲区
    fn release_buffer(&mut self, handle: BufferHandle) -> Result<()>;

    /// 查询缓冲区大小（字节），句柄无效时返回 `None`
    fn buffer_size(&self, handle: BufferHandle) -> Option<u64>;

    /// 后端名称，用于日志
    fn backend_name(&self) -> &str;
}

/// 共享的设备引用
pub type SharedDevice = Rc<RefCell<dyn RenderDevice>>;
