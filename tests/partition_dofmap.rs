//! Integration tests for partitioning and unknown maps.
//!
//! These tests check the slab/subdomain count relation the sweep relies on, the subdomain id
//! encoding, the rejection of curved geometry, and the gather/scatter and zero-extension
//! round trips of the per-subdomain maps.

use rand::Rng;
use sourcesweep::mesh::{CartesianMesh, GeometryKind, Mesh};
use sourcesweep::partition::{GridShape, PartitionKind, Partitioner, validate_sweep_pair};
use sourcesweep::pml::LayerThickness;
use sourcesweep::space::H1Space;
use sourcesweep::{DofMap, KError};

/// A 1D mesh of `n` unit slabs with `per_slab` cells each.
fn line(n: usize, per_slab: usize) -> CartesianMesh {
    CartesianMesh::new(&[0.0], &[n as f64], &[n * per_slab]).unwrap()
}

/// Random block vector of true size `n`.
fn random_block(n: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    (0..2 * n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

#[test]
fn one_sided_overlap_has_one_subdomain_less_than_slabs() {
    for n in 2..=6 {
        let mesh = line(n, 4);
        let partitioner = Partitioner::new(GridShape::along(0, n)).with_overlap(4);
        let slabs = partitioner.partition(&mesh, PartitionKind::NonOverlapping).unwrap();
        let overlapping = partitioner.partition(&mesh, PartitionKind::OverlappingOneSided).unwrap();
        assert_eq!(slabs.len(), n);
        assert_eq!(slabs.len(), overlapping.len() + 1, "slab count for n = {n}");
        assert!(validate_sweep_pair(&overlapping, &slabs).is_ok());

        let two_sided = partitioner.partition(&mesh, PartitionKind::OverlappingTwoSided).unwrap();
        assert_eq!(two_sided.len(), n);
    }
}

#[test]
fn one_sided_overlap_along_second_axis() {
    let mesh = CartesianMesh::new(&[0.0, 0.0], &[1.0, 3.0], &[2, 6]).unwrap();
    let partitioner = Partitioner::new(GridShape::along(1, 3)).with_overlap(2);
    let overlapping = partitioner.partition(&mesh, PartitionKind::OverlappingOneSided).unwrap();
    assert_eq!(overlapping.len(), 2);
    let b = overlapping.subdomain(1).bbox;
    assert_eq!((b.min[1], b.max[1]), (1.0, 3.0));
    assert_eq!((b.min[0], b.max[0]), (0.0, 1.0));
}

#[test]
fn mismatched_pair_is_rejected() {
    let mesh = line(4, 2);
    let a = Partitioner::new(GridShape::along(0, 4)).partition(&mesh, PartitionKind::NonOverlapping).unwrap();
    let b = Partitioner::new(GridShape::along(0, 4)).partition(&mesh, PartitionKind::OverlappingTwoSided).unwrap();
    assert!(matches!(
        validate_sweep_pair(&b, &a),
        Err(KError::PartitionMismatch { overlapping: 4, non_overlapping: 4 })
    ));
}

#[test]
fn grid_ids_follow_lexicographic_encoding() {
    let mesh = CartesianMesh::new(&[0.0, 0.0, 0.0], &[2.0, 3.0, 2.0], &[4, 3, 2]).unwrap();
    let grid = GridShape::new(2, 3, 2);
    let part = Partitioner::new(grid).partition(&mesh, PartitionKind::NonOverlapping).unwrap();
    assert_eq!(part.len(), 12);
    for sub in part.subdomains() {
        assert_eq!(grid.id(sub.ijk), sub.id);
        for &e in &sub.elements {
            let c = mesh.element_centroid(e);
            // unit-wide cells on every axis
            for a in 0..3 {
                assert_eq!(c[a].floor() as usize, sub.ijk[a]);
            }
        }
    }
}

#[test]
fn curved_and_nurbs_meshes_are_rejected() {
    for geometry in [GeometryKind::Curved { order: 2 }, GeometryKind::Nurbs] {
        let mesh = line(3, 2).with_geometry(geometry);
        let r = Partitioner::new(GridShape::along(0, 3)).partition(&mesh, PartitionKind::NonOverlapping);
        assert!(matches!(r, Err(KError::UnsupportedGeometry(_))));
    }
}

#[test]
fn gather_scatter_round_trip() {
    let mesh = CartesianMesh::new(&[0.0, 0.0], &[3.0, 1.0], &[12, 4]).unwrap();
    let space = H1Space::new(mesh);
    let part = Partitioner::new(GridShape::along(0, 3))
        .with_overlap(2)
        .partition(space.mesh(), PartitionKind::OverlappingTwoSided)
        .unwrap();
    let map = DofMap::new(&space, &part).unwrap();
    let n = map.global_size();
    let g = random_block(n);

    for entry in map.entries() {
        let mut local = vec![0.0; 2 * entry.size()];
        entry.gather(&g, &mut local);
        let mut back = vec![0.0; 2 * n];
        entry.scatter(&local, &mut back);

        let mut inside = vec![false; n];
        entry.dof2global().iter().for_each(|&i| inside[i] = true);
        for i in 0..n {
            let (re, im) = if inside[i] { (g[i], g[i + n]) } else { (0.0, 0.0) };
            assert_eq!(back[i], re);
            assert_eq!(back[i + n], im);
        }
    }
}

#[test]
fn zero_extension_reproduces_restriction() {
    let mesh = CartesianMesh::new(&[0.0, 0.0], &[4.0, 1.0], &[16, 4]).unwrap();
    let space = H1Space::new(mesh);
    let part = Partitioner::new(GridShape::along(0, 4))
        .with_overlap(4)
        .partition(space.mesh(), PartitionKind::OverlappingOneSided)
        .unwrap();
    let mut thickness = LayerThickness::uniform(2, 0.5);
    thickness.lower[1] = 0.0;
    let map = DofMap::with_absorbing_layers(&space, &part, &vec![thickness; part.len()]).unwrap();
    let n = map.global_size();
    let g = random_block(n);

    for entry in map.entries() {
        let m = entry.size();
        let np = entry.pml_size();
        assert!(np > m);
        let mut local = vec![0.0; 2 * m];
        entry.gather(&g, &mut local);
        let mut pml = vec![f64::NAN; 2 * np];
        entry.extend(&local, &mut pml);

        let mut physical = vec![false; np];
        entry.dof2pml().iter().for_each(|&i| physical[i] = true);
        for (i, &p) in entry.dof2pml().iter().enumerate() {
            assert_eq!(pml[p], g[entry.dof2global()[i]]);
            assert_eq!(pml[p + np], g[entry.dof2global()[i] + n]);
        }
        for i in (0..np).filter(|&i| !physical[i]) {
            assert_eq!(pml[i], 0.0);
            assert_eq!(pml[i + np], 0.0);
        }
    }
}

#[test]
fn absorbing_thickness_rounds_up_to_whole_layers() {
    let mesh = line(4, 16);
    let space = H1Space::new(mesh);
    let part = Partitioner::new(GridShape::along(0, 4)).partition(space.mesh(), PartitionKind::NonOverlapping).unwrap();
    let h = 1.0 / 16.0;

    // a fraction of an element still meshes one layer; exact multiples are kept
    for (requested, layers) in [(0.03, 1), (0.125, 2), (0.0, 0)] {
        let t = vec![LayerThickness::uniform(1, requested); part.len()];
        let map = DofMap::with_absorbing_layers(&space, &part, &t).unwrap();
        for entry in map.entries() {
            assert_eq!(entry.pml_size(), entry.size() + 2 * layers, "requested {requested}");
            assert!((entry.thickness().lower[0] - layers as f64 * h).abs() < 1e-12);
            assert!((entry.thickness().upper[0] - layers as f64 * h).abs() < 1e-12);
        }
    }
}
