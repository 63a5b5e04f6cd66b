//! Shared test geometry.

use std::sync::Arc;

use tw_geometry::TriangleMesh;
use tw_math::{Point3, Transform};

use crate::loader::{Asset, AssetNode};

/// Closed cube with `half` extent on every axis, two triangles per face.
pub fn cube(half: f64) -> TriangleMesh {
    // corner i has x, y, z taken from bits 0, 1, 2
    let positions = (0..8)
        .map(|i| {
            let side = |bit: u32| if i & (1 << bit) != 0 { half } else { -half };
            Point3::new(side(0), side(1), side(2))
        })
        .collect();
    let faces: [[u32; 4]; 6] = [
        [0, 2, 6, 4],
        [1, 5, 7, 3],
        [0, 4, 5, 1],
        [2, 3, 7, 6],
        [0, 1, 3, 2],
        [4, 6, 7, 5],
    ];
    let indices = faces
        .iter()
        .flat_map(|&[a, b, c, d]| [a, b, c, a, c, d])
        .collect();
    TriangleMesh {
        positions,
        indices,
        ..Default::default()
    }
}

/// The cube spanning `[-0.5, 0.5]^3`.
pub fn unit_box() -> Arc<TriangleMesh> {
    Arc::new(cube(0.5))
}

/// An asset with one group holding one unit box mesh.
pub fn box_asset(name: &str) -> Asset {
    Asset {
        name: name.to_string(),
        root: AssetNode {
            name: "root".into(),
            transform: Transform::identity(),
            mesh: None,
            color: [1.0; 3],
            children: vec![AssetNode {
                name: format!("{}-mesh", name),
                transform: Transform::identity(),
                mesh: Some(unit_box()),
                color: [0.8, 0.2, 0.2],
                children: Vec::new(),
            }],
        },
    }
}
