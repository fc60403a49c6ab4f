//! 图形资源抽象层
//!
//! 缓冲区上传和命令记录的后端无关接口。
//!
//! - `resource`：缓冲区描述、句柄和视图
//! - `device`：`RenderDevice` trait（创建/释放缓冲区）
//! - `command`：`CommandContext` trait 和内存命令列表
//! - `headless`：内存中的设备实现

pub mod resource;
pub mod device;
pub mod command;
pub mod headless;

pub use command::{Command, CommandContext, CommandList};
pub use device::{RenderDevice, SharedDevice};
pub use headless::HeadlessDevice;
pub use resource::{
    BufferDescriptor, BufferHandle, BufferUsageType, IndexBufferView, IndexFormat,
    TextureHandle, VertexBufferView,
};
