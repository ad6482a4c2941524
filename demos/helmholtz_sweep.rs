use std::sync::Arc;

use num_complex::Complex64;
use sourcesweep::mesh::CartesianMesh;
use sourcesweep::preconditioner::{Preconditioner, SourceTransfer};
use sourcesweep::space::{DiscreteSpace, H1Space};
use sourcesweep::{BlockVec, LayerThickness, SweepMode, SweepOptions};

fn main() {
    // waveguide [0, 4] x [0, 1] with a slower layer in the middle
    let mesh = CartesianMesh::new(&[0.0, 0.0], &[4.0, 1.0], &[64, 16]).unwrap();
    let space = H1Space::new(mesh);
    let material = Arc::new(|x: &[f64]| if (1.8..2.2).contains(&x[0]) { 1.5 } else { 1.0 });

    let mut pml = LayerThickness::uniform(2, 0.75);
    pml.lower[1] = 0.0;
    pml.upper[1] = 0.0;
    let options = SweepOptions::default()
        .with_omega(12.0)
        .with_absorbing_layers(6)
        .with_pml_length(pml);

    let mut r = BlockVec::zeros(space.true_vsize());
    let src = space.mesh().locate_vertex(&[0.5, 0.5]).unwrap();
    r.set(src, Complex64::new(1.0, 0.0));
    let r = r.into_inner();

    // full-domain absorbing solve
    let full = SourceTransfer::new(&space, material.clone(), options.clone().with_subdomains(1)).unwrap();
    let mut z_full = vec![0.0; full.size()];
    full.apply(&r, &mut z_full).unwrap();

    for (subdomains, mode) in [(3, SweepMode::Forward), (7, SweepMode::Forward), (3, SweepMode::ForwardBackward)] {
        let pc = SourceTransfer::new(&space, material.clone(), options.clone().with_subdomains(subdomains).with_mode(mode))
            .unwrap();
        let mut z = vec![0.0; pc.size()];
        pc.apply(&r, &mut z).unwrap();
        let diff: f64 = z.iter().zip(&z_full).map(|(a, b)| (a - b) * (a - b)).sum::<f64>().sqrt();
        let norm: f64 = z_full.iter().map(|v| v * v).sum::<f64>().sqrt();
        println!(
            "{} subdomains, {:?}: local sizes {:?}, relative difference to full solve = {:.3e}",
            pc.nrpatch(),
            mode,
            (0..pc.nrpatch()).map(|p| pc.local_system(p).size()).collect::<Vec<_>>(),
            diff / norm
        );
    }
}
