//! 外部资源模块
//!
//! 网格引用但不拥有的资源：材质和材质库。

pub mod material;

pub use material::{Material, MaterialHandle, MaterialLibrary};
