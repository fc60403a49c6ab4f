//! 命令记录模块
//!
//! `CommandContext` 对应原始引擎中的 `ID3D12GraphicsCommandList`：
//! 网格绘制时通过它设置缓冲区、绑定材质和纹理并发出绘制调用。
//! `CommandList` 是记录到内存中的实现，可以在之后回放到真实后端或在测试中检查。

use super::resource::{IndexBufferView, TextureHandle, VertexBufferView};
use crate::resource::MaterialHandle;

/// 命令记录接口
pub trait CommandContext {
    /// 绑定顶点缓冲区
    fn set_vertex_buffer(&mut self, view: &VertexBufferView);

    /// 绑定索引缓冲区
    fn set_index_buffer(&mut self, view: &IndexBufferView);

    /// 把材质常量绑定到指定槽位
    fn bind_material(&mut self, slot: u32, material: MaterialHandle);

    /// 把纹理绑定到指定槽位
    fn bind_texture(&mut self, slot: u32, texture: TextureHandle);

    /// 索引绘制
    fn draw_indexed(&mut self, index_count: u32, instance_count: u32);
}

/// 记录下来的单条命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetVertexBuffer(VertexBufferView),
    SetIndexBuffer(IndexBufferView),
    BindMaterial { slot: u32, material: MaterialHandle },
    BindTexture { slot: u32, texture: TextureHandle },
    DrawIndexed { index_count: u32, instance_count: u32 },
}

/// 内存命令列表
#[derive(Debug, Clone, Default)]
pub struct CommandList {
    commands: Vec<Command>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已记录的命令
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// 绘制调用数量
    pub fn draw_call_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::DrawIndexed { .. }))
            .count()
    }

    /// 所有绘制调用的索引总数
    pub fn total_indices_drawn(&self) -> u64 {
        self.commands
            .iter()
            .map(|c| match c {
                Command::DrawIndexed { index_count, instance_count } => {
                    *index_count as u64 * *instance_count as u64
                }
                _ => 0,
            })
            .sum()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// 清空命令，开始新的一帧
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl CommandContext for CommandList {
    fn set_vertex_buffer(&mut self, view: &VertexBufferView) {
        self.commands.push(Command::SetVertexBuffer(*view));
    }

    fn set_index_buffer(&mut self, view: &IndexBufferView) {
        self.commands.push(Command::SetIndexBuffer(*view));
    }

    fn bind_material(&mut self, slot: u32, material: MaterialHandle) {
        self.commands.push(Command::BindMaterial { slot, material });
    }

    fn bind_texture(&mut self, slot: u32, texture: TextureHandle) {
        self.commands.push(Command::BindTexture { slot, texture });
    }

    fn draw_indexed(&mut self, index_count: u32, instance_count: u32) {
        self.commands.push(Command::DrawIndexed { index_count, instance_count });
    }
}
