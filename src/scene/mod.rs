//! 场景模块

pub mod game_scene;

pub use game_scene::GameScene;
