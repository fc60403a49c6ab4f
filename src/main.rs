//! KamataMesh 命令行入口
//!
//! 加载配置和模型，计算平滑法线，把网格上传到内存设备并记录若干帧的绘制命令，
//! 最后输出网格和命令统计。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用配置文件
//! cargo run
//!
//! # 指定模型并关闭平滑
//! cargo run -- --model assets/models/cube.obj --no-smoothing
//! ```

use std::path::Path;

use anyhow::Context;
use tracing::info;

use kamata_mesh::core::{log, Config};
use kamata_mesh::gfx::{CommandList, HeadlessDevice, RenderDevice};
use kamata_mesh::scene::GameScene;

/// 记录的帧数
const FRAME_COUNT: u32 = 3;

/// 固定帧间隔（秒）
const FRAME_TIME: f32 = 1.0 / 60.0;

fn main() -> anyhow::Result<()> {
    // 1. 加载配置（在初始化日志之前）
    let mut config = Config::from_file_or_default("config.toml");

    // 2. 应用命令行参数
    config.apply_args(std::env::args());

    // 3. 验证配置
    config.validate().context("invalid configuration")?;

    // 4. 初始化日志系统
    let log_file = if config.logging.file_output {
        Some(config.logging.log_file.as_str())
    } else {
        None
    };
    log::init_logger(config.logging.level, config.logging.file_output, log_file);
    info!(version = env!("CARGO_PKG_VERSION"), "KamataMesh starting");
    info!(
        model = %config.scene.model_path,
        smoothing = config.mesh.smoothing,
        blend = ?config.mesh.normal_blend,
        "Configuration loaded"
    );

    // 5. 构建场景
    let device = HeadlessDevice::shared();
    let mut scene = GameScene::new(&config);
    scene
        .load_model(Path::new(&config.scene.model_path))
        .with_context(|| format!("failed to load model {}", config.scene.model_path))?;
    scene
        .initialize(device.clone())
        .with_context(|| format!("failed to create buffers on {}", device.borrow().backend_name()))?;

    // 6. 记录若干帧
    let mut commands = CommandList::new();
    for _ in 0..FRAME_COUNT {
        commands.clear();
        scene.update(FRAME_TIME);
        scene.draw(&mut commands).context("failed to record draw commands")?;
    }

    for mesh in scene.meshes() {
        kamata_mesh::app_info!(
            name = %mesh.name(),
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            smooth_groups = mesh.smooth_group_count(),
            vb_bytes = mesh.vb_view().map(|v| v.size_in_bytes).unwrap_or(0),
            ib_bytes = mesh.ib_view().map(|v| v.size_in_bytes).unwrap_or(0),
            "Mesh"
        );
    }
    info!(
        frames = scene.frame_count(),
        draw_calls = commands.draw_call_count(),
        indices = commands.total_indices_drawn(),
        materials = scene.materials().len(),
        "Last frame recorded"
    );

    // 7. 释放资源
    scene.shutdown().context("failed to release buffers")?;
    info!(
        buffers_created = device.borrow().total_created(),
        live_buffers = device.borrow().live_buffer_count(),
        "KamataMesh finished"
    );
    Ok(())
}
