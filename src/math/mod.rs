//! 数学库模块
//!
//! 基于 `nalgebra`，提供网格处理用到的向量类型和少量工具函数。
//! 顶点结构使用原始数组（便于 `bytemuck` 直接上传），
//! 计算时通过 `to_vector3` / `from_vector3` 在两种表示之间转换。

pub use nalgebra::Vector3 as Vec3;

pub type Vector3 = Vec3<f32>;

/// 浮点比较和零长度判定使用的阈值
pub const EPSILON: f32 = 1e-6;

/// 数组转换为 `Vector3`
#[inline]
pub fn to_vector3(v: [f32; 3]) -> Vector3 {
    Vector3::new(v[0], v[1], v[2])
}

/// `Vector3` 转换为数组
#[inline]
pub fn from_vector3(v: &Vector3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

/// 检查两个浮点数是否近似相等
#[inline]
pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

// 几何处理（面法线、法线混合）
pub mod geometry;
