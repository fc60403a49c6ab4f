//! KamataMesh - 网格数据容器与平滑法线计算
//!
//! 保存顶点/索引数据和平滑组，计算平滑顶点法线，
//! 并通过后端无关的接口上传缓冲区、记录绘制命令。
//!
//! # 模块结构
//!
//! - `core`: 日志、配置、错误处理
//! - `math`: 基于 nalgebra 的向量工具和法线计算
//! - `geometry`: 顶点、网格、平滑组、OBJ 加载器
//! - `gfx`: 缓冲区/视图描述、`RenderDevice`、`CommandContext`
//! - `resource`: 材质和材质库
//! - `scene`: 游戏场景
//!
//! # 使用示例
//!
//! ```
//! use kamata_mesh::geometry::{Mesh, Vertex};
//! use kamata_mesh::gfx::{CommandList, HeadlessDevice};
//! use kamata_mesh::resource::MaterialLibrary;
//!
//! let mut mesh = Mesh::with_name("Triangle");
//! for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
//!     let index = mesh.add_vertex(Vertex::new(p, [0.0, 0.0, 1.0], [0.0, 0.0]));
//!     mesh.add_index(index);
//! }
//!
//! let device = HeadlessDevice::shared();
//! mesh.create_buffers(device.clone())?;
//!
//! let mut commands = CommandList::new();
//! mesh.draw(&mut commands, &MaterialLibrary::new(), 1, 2)?;
//! assert_eq!(commands.draw_call_count(), 1);
//!
//! // 网格析构时缓冲区归还给设备
//! drop(mesh);
//! assert_eq!(device.borrow().live_buffer_count(), 0);
//! # Ok::<(), kamata_mesh::core::KamataError>(())
//! ```

pub mod core;
pub mod math;
pub mod geometry;
pub mod gfx;
pub mod resource;
pub mod scene;
