//! 内存渲染设备
//!
//! 把上传的数据保存在 CPU 内存中，用于测试、工具导出和没有 GPU 的环境。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

use super::device::RenderDevice;
use super::resource::{BufferDescriptor, BufferHandle, BufferUsageType};
use crate::core::error::{GraphicsError, Result};

struct HeadlessBuffer {
    usage: BufferUsageType,
    name: Option<String>,
    data: Vec<u8>,
}

/// 内存中的 `RenderDevice` 实现
#[derive(Default)]
pub struct HeadlessDevice {
    buffers: HashMap<BufferHandle, HeadlessBuffer>,
    next_id: u64,
    total_created: u64,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建可在网格之间共享的设备
    ///
    /// 返回的 `Rc` 可以直接 `clone()` 传给 `Mesh::create_buffers`，
    /// 调用方仍保留具体类型以便读取统计信息。
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// 当前存活的缓冲区数量
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// 累计创建过的缓冲区数量
    pub fn total_created(&self) -> u64 {
        self.total_created
    }

    /// 读取缓冲区内容
    pub fn buffer_data(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&handle).map(|b| b.data.as_slice())
    }

    /// 读取缓冲区用途
    pub fn buffer_usage(&self, handle: BufferHandle) -> Option<BufferUsageType> {
        self.buffers.get(&handle).map(|b| b.usage)
    }

    /// 读取缓冲区调试名称
    pub fn buffer_name(&self, handle: BufferHandle) -> Option<&str> {
        self.buffers.get(&handle).and_then(|b| b.name.as_deref())
    }
}

impl RenderDevice for HeadlessDevice {
    fn create_buffer(&mut self, desc: &BufferDescriptor, contents: &[u8]) -> Result<BufferHandle> {
        if contents.len() as u64 != desc.size {
            return Err(GraphicsError::ResourceCreation(format!(
                "buffer {:?} declares {} bytes but {} were supplied",
                desc.name,
                desc.size,
                contents.len()
            ))
            .into());
        }

        // 句柄从 1 开始，释放后不复用
        self.next_id += 1;
        let handle = BufferHandle::new(self.next_id);
        self.total_created += 1;

        self.buffers.insert(
            handle,
            HeadlessBuffer {
                usage: desc.usage,
                name: desc.name.clone(),
                data: contents.to_vec(),
            },
        );

        debug!(
            handle = handle.id(),
            size = desc.size,
            usage = ?desc.usage,
            "Buffer created"
        );
        Ok(handle)
    }

    fn release_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        match self.buffers.remove(&handle) {
            Some(_) => {
                trace!(handle = handle.id(), "Buffer released");
                Ok(())
            }
            None => Err(GraphicsError::InvalidBuffer(handle.id()).into()),
        }
    }

    fn buffer_size(&self, handle: BufferHandle) -> Option<u64> {
        self.buffers.get(&handle).map(|b| b.data.len() as u64)
    }

    fn backend_name(&self) -> &str {
        "Headless"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_release() {
        let mut device = HeadlessDevice::new();
        let desc = BufferDescriptor::new(4, BufferUsageType::Index).with_name("IB");

        let handle = device.create_buffer(&desc, &[1, 2, 3, 4]).unwrap();

        assert_eq!(device.live_buffer_count(), 1);
        assert_eq!(device.buffer_size(handle), Some(4));
        assert_eq!(device.buffer_data(handle), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(device.buffer_usage(handle), Some(BufferUsageType::Index));
        assert_eq!(device.buffer_name(handle), Some("IB"));

        device.release_buffer(handle).unwrap();
        assert_eq!(device.live_buffer_count(), 0);
        assert!(device.buffer_size(handle).is_none());

        // 重复释放是错误
        assert!(device.release_buffer(handle).is_err());
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let mut device = HeadlessDevice::new();
        let desc = BufferDescriptor::new(8, BufferUsageType::Vertex);

        assert!(device.create_buffer(&desc, &[0u8; 4]).is_err());
        assert_eq!(device.total_created(), 0);
    }

    #[test]
    fn test_handles_not_reused() {
        let mut device = HeadlessDevice::new();
        let desc = BufferDescriptor::new(0, BufferUsageType::Vertex);

        let a = device.create_buffer(&desc, &[]).unwrap();
        device.release_buffer(a).unwrap();
        let b = device.create_buffer(&desc, &[]).unwrap();

        assert_ne!(a, b);
        assert_eq!(device.total_created(), 2);
    }
}
