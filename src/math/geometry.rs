//! 几何数学工具模块
//!
//! 网格后处理用到的法线计算：
//! - 三角形面法线（OBJ 缺少法线时填充）
//! - 法线混合（平滑组的平均 / 归一化平均）

use super::{from_vector3, to_vector3, Vector3, EPSILON};

/// 计算三角形的单位面法线
///
/// 右手系，逆时针绕序的正面朝向观察者。
/// 退化三角形（面积接近零）返回零向量。
pub fn face_normal(p0: [f32; 3], p1: [f32; 3], p2: [f32; 3]) -> [f32; 3] {
    let edge1 = to_vector3(p1) - to_vector3(p0);
    let edge2 = to_vector3(p2) - to_vector3(p0);

    match edge1.cross(&edge2).try_normalize(EPSILON) {
        Some(n) => from_vector3(&n),
        None => [0.0, 0.0, 0.0],
    }
}

/// 计算一组法线的算术平均值
///
/// 空输入返回零向量。
pub fn average_normals<I>(normals: I) -> Vector3
where
    I: IntoIterator<Item = [f32; 3]>,
{
    let mut sum = Vector3::zeros();
    let mut count = 0usize;

    for n in normals {
        sum += to_vector3(n);
        count += 1;
    }

    if count == 0 {
        sum
    } else {
        sum / count as f32
    }
}

/// 将向量归一化为单位长度
///
/// 长度接近零时原样返回，避免产生 NaN。
pub fn normalize_or_keep(v: Vector3) -> Vector3 {
    v.try_normalize(EPSILON).unwrap_or(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_normal_xy_plane() {
        let n = face_normal([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert!((n[2] - 1.0).abs() < 1e-6);
        assert!(n[0].abs() < 1e-6);
        assert!(n[1].abs() < 1e-6);
    }

    #[test]
    fn test_face_normal_degenerate() {
        let n = face_normal([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        assert_eq!(n, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_average_normals() {
        let avg = average_normals([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert!((avg.x - 0.5).abs() < 1e-6);
        assert!((avg.y - 0.5).abs() < 1e-6);
        assert!(avg.z.abs() < 1e-6);

        assert_eq!(average_normals(std::iter::empty()), Vector3::zeros());
    }

    #[test]
    fn test_normalize_or_keep() {
        let n = normalize_or_keep(Vector3::new(3.0, 4.0, 0.0));
        assert!((n.x - 0.6).abs() < 1e-6);
        assert!((n.y - 0.8).abs() < 1e-6);

        // 零向量保持不变
        assert_eq!(normalize_or_keep(Vector3::zeros()), Vector3::zeros());
    }
}
