/// Demo terrain and optional glTF scene loading.
use bevy::asset::RenderAssetUsages;
use bevy::picking::mesh_picking::ray_cast::RayCastBackfaces;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};

use crate::engine::assets::profile_settings::SceneSettings;

#[derive(Component)]
pub struct DemoTerrain;

#[derive(Component)]
pub struct LoadedModel;

/// Rolling hills below the probe origin, with one ridge poking above it so
/// both probe directions get exercised.
pub fn terrain_height(x: f32, y: f32) -> f32 {
    let hills = 0.45 * (0.8 * x).sin() * (0.6 * y).cos() + 0.2 * (1.7 * x + 0.4 * y).sin();
    let ridge = 1.6 * (-((x - 1.5).powi(2) + (y + 1.0).powi(2)) / 0.6).exp();
    hills + ridge - 0.6
}

/// Grid mesh of `resolution` x `resolution` quads over a square of side `size`
/// centred on the origin, displaced along Z by `height`.
pub fn heightfield_mesh(size: f32, resolution: u32, height: impl Fn(f32, f32) -> f32) -> Mesh {
    let resolution = resolution.max(1);
    let verts_per_side = resolution + 1;
    let cell = size / resolution as f32;
    let half = size * 0.5;

    let mut positions = Vec::with_capacity((verts_per_side * verts_per_side) as usize);
    let mut normals = Vec::with_capacity(positions.capacity());
    let mut uvs = Vec::with_capacity(positions.capacity());

    for j in 0..verts_per_side {
        for i in 0..verts_per_side {
            let x = -half + i as f32 * cell;
            let y = -half + j as f32 * cell;
            positions.push([x, y, height(x, y)]);

            // Central differences for a smooth shading normal.
            let e = cell * 0.5;
            let dx = (height(x + e, y) - height(x - e, y)) / (2.0 * e);
            let dy = (height(x, y + e) - height(x, y - e)) / (2.0 * e);
            normals.push(Vec3::new(-dx, -dy, 1.0).normalize().to_array());

            uvs.push([i as f32 / resolution as f32, j as f32 / resolution as f32]);
        }
    }

    let mut indices = Vec::with_capacity((resolution * resolution * 6) as usize);
    for j in 0..resolution {
        for i in 0..resolution {
            let a = j * verts_per_side + i;
            let b = a + 1;
            let c = a + verts_per_side;
            let d = c + 1;
            // Counter-clockwise seen from +Z.
            indices.extend_from_slice(&[a, b, d, a, d, c]);
        }
    }

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Spawn the demo terrain. Probes start inside it in places, so backfaces
/// must count as hits for the upward probe.
pub fn spawn_demo_terrain(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    settings: &SceneSettings,
) {
    let mesh = heightfield_mesh(
        settings.terrain_size,
        settings.terrain_resolution,
        terrain_height,
    );

    commands.spawn((
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.32, 0.46, 0.30),
            perceptual_roughness: 0.9,
            double_sided: true,
            cull_mode: None,
            ..default()
        })),
        Transform::IDENTITY,
        RayCastBackfaces,
        DemoTerrain,
        Name::new("Demo terrain"),
    ));
    info!(
        "Demo terrain spawned: {} units, {} cells per side",
        settings.terrain_size, settings.terrain_resolution
    );
}

/// Stream a glTF scene into the world. Ray casts find nothing on it until it
/// has loaded.
pub fn spawn_model(commands: &mut Commands, asset_server: &AssetServer, path: &str) {
    info!("Loading scene model from: {}", path);
    commands.spawn((
        SceneRoot(asset_server.load(GltfAssetLabel::Scene(0).from_asset(path.to_string()))),
        LoadedModel,
        Name::new("Scene model"),
    ));
}

/// Mark every mesh inside loaded models as backface-hittable.
pub fn mark_model_meshes(
    mut commands: Commands,
    models: Query<Entity, With<LoadedModel>>,
    children: Query<&Children>,
    meshes: Query<(), (With<Mesh3d>, Without<RayCastBackfaces>)>,
) {
    for model in &models {
        for descendant in children.iter_descendants(model) {
            if meshes.contains(descendant) {
                commands.entity(descendant).insert(RayCastBackfaces);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::raycast::{HeightfieldScene, SceneRaycast};
    use bevy::render::mesh::VertexAttributeValues;

    #[test]
    fn mesh_vertices_follow_height_function() {
        let mesh = heightfield_mesh(4.0, 4, |x, y| x + 2.0 * y);
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("missing positions");
        };

        assert_eq!(positions.len(), 25);
        for [x, y, z] in positions {
            assert!((z - (x + 2.0 * y)).abs() < 1e-5);
        }
        assert_eq!(mesh.indices().map(|i| i.len()), Some(4 * 4 * 6));
    }

    #[test]
    fn demo_terrain_needs_both_probe_directions() {
        let mut scene = HeightfieldScene::new().with_surface(terrain_height);

        let below = Vec3::new(-2.0, 2.0, 0.0);
        let above = Vec3::new(1.5, -1.0, 0.0);
        assert!(terrain_height(below.x, below.y) < 0.0);
        assert!(terrain_height(above.x, above.y) > 0.0);

        assert!(scene.nearest_hit(Ray3d::new(below, Dir3::NEG_Z)).is_some());
        assert!(scene.nearest_hit(Ray3d::new(above, Dir3::NEG_Z)).is_none());
        assert!(scene.nearest_hit(Ray3d::new(above, Dir3::Z)).is_some());
    }
}
