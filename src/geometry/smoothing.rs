/// 顶点法线平滑模块
///
/// 平滑组把共享同一个源位置（例如 OBJ 的 `v` 索引）的多个顶点缓冲区索引
/// 归为一组，平滑时组内所有顶点写入相同的混合法线，
/// 从而消除相邻面之间的硬边。

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::vertex::VertexPosNormalUv;
use crate::core::error::MeshError;
use crate::math::{from_vector3, geometry};

/// 平滑组的法线混合方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBlend {
    /// 仅取算术平均值
    ///
    /// 结果通常不是单位向量，重复执行会导致法线逐渐缩短。
    Average,

    /// 取平均值后重新归一化为单位长度（默认）
    ///
    /// 输入法线为单位向量时，重复执行结果不变。
    #[default]
    Normalized,
}

/// 源位置索引到顶点缓冲区索引集合的映射
///
/// 键由调用方定义，不要求覆盖所有顶点；
/// 同一个 `(位置, 顶点)` 对重复插入只记录一次。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmoothingGroups {
    groups: BTreeMap<u32, BTreeSet<u32>>,
}

impl SmoothingGroups {
    /// 创建空的平滑组映射
    pub fn new() -> Self {
        Self::default()
    }

    /// 把顶点加入某个源位置的平滑组
    ///
    /// 返回 `false` 表示该顶点已经在组内。
    pub fn insert(&mut self, position_key: u32, vertex_index: u32) -> bool {
        self.groups.entry(position_key).or_default().insert(vertex_index)
    }

    /// 获取某个源位置的平滑组
    pub fn group(&self, position_key: u32) -> Option<&BTreeSet<u32>> {
        self.groups.get(&position_key)
    }

    /// 平滑组数量
    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// 按源位置升序遍历所有平滑组
    pub fn iter(&self) -> impl Iterator<Item = (u32, &BTreeSet<u32>)> {
        self.groups.iter().map(|(key, set)| (*key, set))
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// 检查所有组成员都在顶点范围内
    pub fn validate(&self, vertex_count: usize) -> Result<(), MeshError> {
        for (position_key, members) in self.iter() {
            // BTreeSet 有序，只需检查最大值
            if let Some(&vertex) = members.iter().next_back() {
                if vertex as usize >= vertex_count {
                    return Err(MeshError::SmoothVertexOutOfBounds {
                        position_key,
                        vertex,
                        vertex_count,
                    });
                }
            }
        }
        Ok(())
    }

    /// 对顶点数组执行平滑
    ///
    /// 成员数少于 2 的组保持不变。任何成员越界时在写入前返回错误，
    /// 顶点数组不会被部分修改。
    ///
    /// 返回实际被平滑的组数量。
    pub fn apply(
        &self,
        vertices: &mut [VertexPosNormalUv],
        blend: NormalBlend,
    ) -> Result<usize, MeshError> {
        self.validate(vertices.len())?;

        let mut smoothed = 0;
        for (_, members) in self.iter() {
            if members.len() < 2 {
                continue;
            }

            let mean = geometry::average_normals(
                members.iter().map(|&v| vertices[v as usize].normal),
            );
            let normal = match blend {
                NormalBlend::Average => mean,
                NormalBlend::Normalized => geometry::normalize_or_keep(mean),
            };
            let normal = from_vector3(&normal);

            for &v in members {
                vertices[v as usize].normal = normal;
            }
            smoothed += 1;
        }

        Ok(smoothed)
    }
}
