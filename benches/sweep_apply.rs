use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sourcesweep::assembly::ConstantCoefficient;
use sourcesweep::mesh::CartesianMesh;
use sourcesweep::preconditioner::{Preconditioner, SourceTransfer};
use sourcesweep::space::H1Space;
use sourcesweep::{LayerThickness, SweepMode, SweepOptions};

fn waveguide() -> H1Space {
    H1Space::new(CartesianMesh::new(&[0.0, 0.0], &[4.0, 1.0], &[80, 20]).unwrap())
}

fn options(mode: SweepMode) -> SweepOptions {
    let mut pml = LayerThickness::uniform(2, 0.5);
    pml.lower[1] = 0.0;
    pml.upper[1] = 0.0;
    SweepOptions::default()
        .with_omega(10.0)
        .with_subdomains(4)
        .with_absorbing_layers(5)
        .with_pml_length(pml)
        .with_mode(mode)
}

fn bench_sweep(c: &mut Criterion) {
    let space = waveguide();

    c.bench_function("source transfer setup", |ben| {
        ben.iter(|| {
            let _pc = SourceTransfer::new(
                black_box(&space),
                Arc::new(ConstantCoefficient(1.0)),
                options(SweepMode::Forward),
            )
            .unwrap();
        })
    });

    for mode in [SweepMode::Forward, SweepMode::ForwardBackward] {
        let pc = SourceTransfer::new(&space, Arc::new(ConstantCoefficient(1.0)), options(mode)).unwrap();
        let r: Vec<f64> = (0..pc.size()).map(|i| (i as f64 * 0.01).sin()).collect();
        let mut z = vec![0.0; pc.size()];
        c.bench_function(&format!("source transfer apply ({mode:?})"), |ben| {
            ben.iter(|| pc.apply(black_box(&r), black_box(&mut z)).unwrap())
        });
    }
}

criterion_group!(benches, bench_sweep);
criterion_main!(benches);
