//! Integration tests for pyramid construction.
//!
//! These tests drive the builder end-to-end:
//! - Assembly from in-memory sources through a real disk store
//! - Sparse, data-driven subdivision with ancestor interpolation
//! - The plate-carrée half-globe root, from memory and from a TMS
//!   directory pyramid
//! - Store selection from an INI configuration

use std::sync::Arc;

use image::Rgba;
use quadterra::assembler::QuadrantAssembler;
use quadterra::builder::{ChildState, QuadtreeBuilder, TileTree};
use quadterra::config::{ConfigFile, TerrainSettings};
use quadterra::key::{Extent, Profile, TileKey};
use quadterra::log::{Logger, NoOpLogger};
use quadterra::source::{
    CachingSource, DirectorySource, HeightField, MemorySource, SourceContent, TileSource,
};
use quadterra::store::{create_store, AddressScheme, DiskTileStore, SourceId, TileStore};
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

fn quiet() -> Arc<dyn Logger> {
    Arc::new(NoOpLogger)
}

fn imagery(name: &str) -> Arc<MemorySource> {
    Arc::new(MemorySource::new(name).with_uniform_image(Rgba([40, 110, 60, 255]), 16))
}

fn elevation(name: &str) -> Arc<MemorySource> {
    Arc::new(MemorySource::new(name).with_uniform_heightfield(HeightField::flat(9, 9, 250.0)))
}

fn cached(inner: Arc<MemorySource>, store: &Arc<dyn TileStore>) -> Arc<dyn TileSource> {
    Arc::new(CachingSource::new(inner, Arc::clone(store), quiet()))
}

/// Write a global-geodetic TMS pyramid (`2^(L+1) x 2^L` tiles per level).
fn write_geodetic_pyramid(root: &std::path::Path, max_level: u32) {
    for level in 0..=max_level {
        for x in 0..(2u32 << level) {
            for y in 0..(1u32 << level) {
                let path = root
                    .join(level.to_string())
                    .join(x.to_string())
                    .join(format!("{}.png", y));
                std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                image::RgbaImage::from_pixel(4, 4, Rgba([30, 80, 160, 255]))
                    .save(&path)
                    .unwrap();
            }
        }
    }
}

fn node_at<'a>(tree: &'a TileTree, key: &TileKey) -> &'a quadterra::builder::TileNode {
    let id = tree.find(key).expect("node should exist");
    tree.get(id).expect("id should resolve")
}

// =============================================================================
// Store-backed builds
// =============================================================================

#[test]
fn test_build_persists_fragments_and_reuses_them() {
    let temp = TempDir::new().unwrap();
    let store: Arc<dyn TileStore> = Arc::new(DiskTileStore::new(
        temp.path(),
        AddressScheme::Tms { invert_y: false },
        None,
        quiet(),
    ));
    let ortho = imagery("ortho");
    let dem = elevation("dem");

    let assembler = QuadrantAssembler::new(Profile::Geodetic, TerrainSettings::default(), quiet())
        .with_image_source(cached(ortho.clone(), &store))
        .with_heightfield_source(cached(dem.clone(), &store));
    let builder = QuadtreeBuilder::new(Arc::new(assembler));

    let tree = builder.build(1);
    assert_eq!(tree.len(), 2 + 8);

    // One image and one heightfield per node.
    let stats = store.stats();
    assert_eq!(stats.writes, 20);
    assert_eq!(stats.write_failures, 0);

    let east_root = Profile::Geodetic.root_keys()[1];
    assert!(temp.path().join("ortho/0/1/0.png").exists());
    assert!(temp.path().join("dem/0/1/0.qthf").exists());
    assert!(store.exists(&east_root, &SourceId::heightfield("dem")));

    // A second build is served entirely from disk.
    let ortho_calls = ortho.requests().len();
    let dem_calls = dem.requests().len();
    let again = builder.build(1);
    assert_eq!(again.len(), tree.len());
    assert_eq!(ortho.requests().len(), ortho_calls);
    assert_eq!(dem.requests().len(), dem_calls);
    assert_eq!(store.stats().hits, 20);
}

#[test]
fn test_heightfields_scale_to_degrees_on_geographic_profiles() {
    let assembler = QuadrantAssembler::new(Profile::Geodetic, TerrainSettings::default(), quiet())
        .with_heightfield_source(elevation("dem"));
    let tree = QuadtreeBuilder::new(Arc::new(assembler)).build(0);

    let root = node_at(&tree, &Profile::Geodetic.root_keys()[0]);
    let (lo, hi) = root.tile.elevation.heightfield.min_max();
    let expected = 250.0 / 111_319.0;
    assert!((lo - expected).abs() < 1e-7);
    assert!((hi - expected).abs() < 1e-7);
}

// =============================================================================
// Data-driven subdivision
// =============================================================================

#[test]
fn test_sparse_pyramid_follows_detail_coverage() {
    // Coarse imagery everywhere for levels 0..1, detail only around the
    // centre of one level-1 tile.
    let coarse = Arc::new(
        MemorySource::new("coarse")
            .with_levels(0, 1)
            .with_uniform_image(Rgba([90, 90, 90, 255]), 16),
    );
    let detail = Arc::new(
        MemorySource::new("detail")
            .with_uniform_image(Rgba([200, 30, 30, 255]), 16)
            .with_coverage(Extent::new(-136.0, 44.0, -134.0, 46.0)),
    );
    let assembler = QuadrantAssembler::new(Profile::Geodetic, TerrainSettings::default(), quiet())
        .with_image_source(coarse)
        .with_image_source(detail);
    let tree = QuadtreeBuilder::new(Arc::new(assembler)).build(5);

    let counts = tree.level_counts();
    assert_eq!(counts.get(&0), Some(&2));
    assert_eq!(counts.get(&1), Some(&8));
    assert_eq!(counts.get(&2), Some(&4));
    assert_eq!(counts.get(&3), None);

    // The tile centred on the patch is the only level-1 tile that split.
    let split = TileKey::new(Profile::Geodetic, 1, 0, 0).unwrap();
    assert_eq!(node_at(&tree, &split).state, ChildState::Expanded);
    let neighbour = TileKey::new(Profile::Geodetic, 1, 1, 0).unwrap();
    assert_eq!(node_at(&tree, &neighbour).state, ChildState::Leaf);

    // At level 2 the coarse layer is interpolated from level 1.
    let deep = split.subkey(3).unwrap();
    let node = node_at(&tree, &deep);
    assert_eq!(node.tile.color_layers.len(), 2);
    let coarse_layer = &node.tile.color_layers[0];
    assert_eq!(coarse_layer.source_index, 0);
    assert_eq!(coarse_layer.origin_key, split);
    assert_eq!(node.tile.color_layers[1].origin_key, deep);
}

#[test]
fn test_branch_failure_stays_local() {
    // Two disjoint patches: one under each geodetic root.
    let west = Arc::new(
        MemorySource::new("west")
            .with_uniform_image(Rgba([0, 0, 255, 255]), 8)
            .with_coverage(Extent::new(-91.0, -1.0, -89.0, 1.0)),
    );
    let east = Arc::new(
        MemorySource::new("east")
            .with_uniform_image(Rgba([0, 255, 0, 255]), 8)
            .with_coverage(Extent::new(10.0, 10.0, 20.0, 20.0)),
    );
    let assembler = QuadrantAssembler::new(Profile::Geodetic, TerrainSettings::default(), quiet())
        .with_image_source(west)
        .with_image_source(east);
    let tree = QuadtreeBuilder::new(Arc::new(assembler)).build(3);

    let roots = Profile::Geodetic.root_keys();
    // The western root's children all touch (-90, 0); the eastern patch
    // only reaches one quadrant.
    assert_eq!(node_at(&tree, &roots[0]).state, ChildState::Expanded);
    assert_eq!(node_at(&tree, &roots[1]).state, ChildState::Leaf);
    assert_eq!(tree.len(), 2 + 4);
}

#[test]
fn test_plate_carre_builds_two_hemispheres() {
    let assembler = QuadrantAssembler::new(Profile::PlateCarre, TerrainSettings::default(), quiet())
        .with_image_source(imagery("ortho"));
    let builder = QuadtreeBuilder::new(Arc::new(assembler));

    let tree = builder.build(2);

    let counts = tree.level_counts();
    assert_eq!(counts.get(&0), Some(&1));
    assert_eq!(counts.get(&1), Some(&2));
    assert_eq!(counts.get(&2), Some(&8));

    let root = tree.roots()[0];
    let names: Vec<String> = tree
        .children(root)
        .iter()
        .map(|id| tree.get(*id).unwrap().key.to_string())
        .collect();
    assert_eq!(names, vec!["c00", "c01"]);
    assert_eq!(
        builder.coordinate_system().definition,
        quadterra::builder::EQUIRECTANGULAR_PROJ4
    );
}

#[test]
fn test_plate_carre_builds_from_directory_pyramid() {
    let temp = TempDir::new().unwrap();
    write_geodetic_pyramid(temp.path(), 2);
    let source = DirectorySource::new("ortho", temp.path(), SourceContent::Imagery, quiet())
        .unwrap()
        .with_levels(0, 3)
        .unwrap();

    let assembler = QuadrantAssembler::new(Profile::PlateCarre, TerrainSettings::default(), quiet())
        .with_image_source(Arc::new(source));
    let tree = QuadtreeBuilder::new(Arc::new(assembler)).build(3);

    let counts = tree.level_counts();
    assert_eq!(counts.get(&0), Some(&1));
    assert_eq!(counts.get(&1), Some(&2));
    assert_eq!(counts.get(&2), Some(&8));
    assert_eq!(counts.get(&3), Some(&32));

    // The root is composed from both level-0 files.
    let root = node_at(&tree, &Profile::PlateCarre.root_keys()[0]);
    assert_eq!(root.state, ChildState::Expanded);
    assert_eq!(root.tile.color_layers[0].image.dimensions(), (8, 8));

    let east = node_at(&tree, &TileKey::new(Profile::PlateCarre, 1, 1, 0).unwrap());
    assert_eq!(east.tile.color_layers[0].image.dimensions(), (4, 4));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_store_from_configuration() {
    let temp = TempDir::new().unwrap();
    let ini = format!(
        "[profile]\ntype = mercator\n\n[cache]\ntype = tms\ntms_type = google\npath = {}\nformat = png\n",
        temp.path().display()
    );
    let config = ConfigFile::from_ini_str(&ini).unwrap();
    let profile = config.profile.to_profile().unwrap();
    let store = create_store(&config.cache, quiet());

    let assembler = QuadrantAssembler::new(profile, config.terrain.clone(), quiet())
        .with_image_source(cached(imagery("osm"), &store));
    QuadtreeBuilder::new(Arc::new(assembler)).build(1);

    // Google rows count from the north: key m00 is level 1, x 0, y 0.
    assert!(temp.path().join("osm/1/0/0.png").exists());
    assert!(temp.path().join("osm/0/0/0.png").exists());
    assert_eq!(store.stats().writes, 5);
}
