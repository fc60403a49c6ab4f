/// OBJ 文件加载器
///
/// 使用 tobj crate 解析 Wavefront OBJ。每个 `o`/`g` 对象生成一个 `Mesh`，
/// 每个面角生成一个独立顶点，`v` 索引作为平滑组的源位置键。
use super::{LoadOptions, MeshLoader};
use crate::core::error::{MeshLoadError, Result};
use crate::geometry::mesh::Mesh;
use crate::geometry::vertex::VertexPosNormalUv;
use crate::math::geometry::face_normal;
use crate::resource::{Material, MaterialHandle, MaterialLibrary};
use std::path::Path;

/// OBJ 格式加载器
///
/// # 特性
///
/// - 自动三角化
/// - UV 坐标翻转（V轴：1.0 - v）
/// - 缺失法线时使用面法线
/// - MTL 材质注册到材质库并分配给对应网格
pub struct ObjLoader;

impl MeshLoader for ObjLoader {
    fn load_from_file(
        path: &Path,
        options: &LoadOptions,
        materials: &mut MaterialLibrary,
    ) -> Result<Vec<Mesh>> {
        if !path.exists() {
            return Err(MeshLoadError::FileNotFound(path.to_path_buf()).into());
        }

        let (models, obj_materials) = tobj::load_obj(path, &tobj_options())
            .map_err(|e| MeshLoadError::ParseError(format!("tobj: {}", e)))?;

        let obj_materials = obj_materials.unwrap_or_else(|e| {
            crate::engine_warn!("Failed to load MTL for {}: {}", path.display(), e);
            Vec::new()
        });

        let fallback_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unnamed");

        let meshes = build_meshes(&models, &obj_materials, options, materials, fallback_name)?;

        tracing::info!(
            path = %path.display(),
            meshes = meshes.len(),
            materials = obj_materials.len(),
            "OBJ loaded"
        );
        Ok(meshes)
    }

    fn load_from_memory(
        data: &[u8],
        options: &LoadOptions,
        materials: &mut MaterialLibrary,
    ) -> Result<Vec<Mesh>> {
        let mut reader = data;
        // 内存加载不解析 mtllib
        let (models, _) = tobj::load_obj_buf(&mut reader, &tobj_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .map_err(|e| MeshLoadError::ParseError(format!("tobj: {}", e)))?;

        build_meshes(&models, &[], options, materials, "Unnamed")
    }

    fn supported_extensions() -> &'static [&'static str] {
        &["obj"]
    }
}

fn tobj_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        // 保留独立的 v/vt/vn 索引，v 索引用作平滑组的键
        single_index: false,
        ..Default::default()
    }
}

/// 注册 MTL 材质并把 tobj 模型转换为网格
fn build_meshes(
    models: &[tobj::Model],
    obj_materials: &[tobj::Material],
    options: &LoadOptions,
    library: &mut MaterialLibrary,
    fallback_name: &str,
) -> Result<Vec<Mesh>> {
    let handles: Vec<MaterialHandle> = obj_materials
        .iter()
        .map(|m| library.insert(convert_material(m)))
        .collect();

    let mut meshes = Vec::with_capacity(models.len());
    for model in models {
        if model.mesh.indices.is_empty() {
            tracing::debug!(model = %model.name, "Skipping OBJ object without faces");
            continue;
        }

        let name = if model.name.is_empty() || model.name == "unnamed_object" {
            fallback_name
        } else {
            model.name.as_str()
        };

        let mut mesh = build_mesh(&model.mesh, name, options)?;
        mesh.set_material(model.mesh.material_id.and_then(|id| handles.get(id).copied()));

        if options.smoothing {
            mesh.calculate_smoothed_vertex_normals_with(options.normal_blend)?;
        }
        meshes.push(mesh);
    }

    if meshes.is_empty() {
        return Err(MeshLoadError::InvalidGeometry("OBJ contains no faces".to_string()).into());
    }
    Ok(meshes)
}

fn build_mesh(src: &tobj::Mesh, name: &str, options: &LoadOptions) -> Result<Mesh> {
    if src.positions.len() % 3 != 0 {
        return Err(MeshLoadError::InvalidGeometry(format!(
            "incomplete position data: {} floats",
            src.positions.len()
        ))
        .into());
    }
    if src.indices.len() % 3 != 0 {
        return Err(MeshLoadError::InvalidGeometry(format!(
            "face indices are not triangulated: {} indices",
            src.indices.len()
        ))
        .into());
    }

    let has_normals = !src.normals.is_empty();
    let has_texcoords = !src.texcoords.is_empty();
    if !has_normals {
        crate::engine_warn!(mesh = %name, "OBJ object has no normals, using face normals");
    }

    let mut mesh = Mesh::with_capacity(src.indices.len(), src.indices.len());
    mesh.set_name(name);

    for (face, corners) in src.indices.chunks_exact(3).enumerate() {
        let mut positions = [[0.0f32; 3]; 3];
        for (k, &p) in corners.iter().enumerate() {
            positions[k] = read3(&src.positions, p)?;
        }
        let flat_normal = if has_normals {
            None
        } else {
            Some(face_normal(positions[0], positions[1], positions[2]))
        };

        for (k, &p) in corners.iter().enumerate() {
            let corner = face * 3 + k;

            let normal = match flat_normal {
                Some(n) => n,
                None => {
                    let n = src.normal_indices.get(corner).copied().unwrap_or(p);
                    read3(&src.normals, n)?
                }
            };

            let uv = if has_texcoords {
                let t = src.texcoord_indices.get(corner).copied().unwrap_or(p);
                let [u, v] = read2(&src.texcoords, t)?;
                [u, 1.0 - v]
            } else {
                [0.0, 0.0]
            };

            let index = mesh.add_vertex(VertexPosNormalUv::new(positions[k], normal, uv));
            mesh.add_index(index);
            if options.smoothing {
                mesh.add_smooth_data(p, index);
            }
        }
    }

    Ok(mesh)
}

fn convert_material(src: &tobj::Material) -> Material {
    let defaults = Material::default();
    Material {
        name: src.name.clone(),
        ambient: src.ambient.unwrap_or(defaults.ambient),
        diffuse: src.diffuse.unwrap_or(defaults.diffuse),
        specular: src.specular.unwrap_or(defaults.specular),
        alpha: src.dissolve.unwrap_or(defaults.alpha),
        texture_filename: src.diffuse_texture.clone(),
        texture: None,
    }
}

fn read3(data: &[f32], index: u32) -> Result<[f32; 3]> {
    let i = index as usize * 3;
    data.get(i..i + 3)
        .map(|s| [s[0], s[1], s[2]])
        .ok_or_else(|| invalid_reference(index, data.len() / 3))
}

fn read2(data: &[f32], index: u32) -> Result<[f32; 2]> {
    let i = index as usize * 2;
    data.get(i..i + 2)
        .map(|s| [s[0], s[1]])
        .ok_or_else(|| invalid_reference(index, data.len() / 2))
}

fn invalid_reference(index: u32, available: usize) -> crate::core::error::KamataError {
    MeshLoadError::InvalidGeometry(format!(
        "attribute index {} out of range ({} available)",
        index, available
    ))
    .into()
}
