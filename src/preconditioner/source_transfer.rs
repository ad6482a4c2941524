//! Source-transfer sweeping preconditioner.
//!
//! Setup cuts the domain along one axis into `nrpatch + 1` slabs and `nrpatch` overlapping
//! subdomains, surrounds every subdomain with absorbing layers and factorizes its system once.
//! Each application then sweeps the residual through the chain of subdomains (see
//! [`SweepEngine`]) and returns the accumulated correction.
//!
//! Vectors are real with length `2n` in `[re; im]` block layout, `n` being the number of
//! unknowns of the global space.

use std::sync::Arc;

use log::info;

use crate::assembly::Coefficient;
use crate::config::{SweepMode, SweepOptions};
use crate::dofmap::DofMap;
use crate::error::KError;
use crate::local::{LocalSystem, LocalSystemBuilder, layer_thickness};
use crate::mesh::Mesh;
use crate::partition::{GridShape, Partition, PartitionKind, Partitioner, validate_sweep_pair};
use crate::preconditioner::Preconditioner;
use crate::preconditioner::cutoff::Direction;
use crate::preconditioner::sweep::SweepEngine;
use crate::space::{DiscreteSpace, H1Space};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Sweeping preconditioner for the stretched Helmholtz operator on an [`H1Space`].
pub struct SourceTransfer {
    size: usize,
    directions: Vec<Direction>,
    slab_partition: Partition,
    overlapping_partition: Partition,
    slab_map: DofMap,
    overlapping_map: DofMap,
    systems: Vec<LocalSystem>,
}

impl SourceTransfer {
    /// Partition `space`, build the maps and factorize every subdomain system.
    pub fn new(space: &H1Space, material: Arc<dyn Coefficient>, options: SweepOptions) -> Result<Self, KError> {
        let mesh = space.mesh();
        options.validate(mesh.dimension())?;
        let axis = options.axis;
        let nrpatch = options.subdomains;
        let nslabs = nrpatch + 1;

        let cells = mesh.cells()[axis];
        if cells % nslabs != 0 {
            return Err(KError::InvalidConfig(format!(
                "{cells} cells along axis {axis} cannot be split into {nslabs} equal slabs"
            )));
        }
        let slab_layers = cells / nslabs;
        let overlap = options.overlap_layers.unwrap_or(slab_layers);
        if overlap < slab_layers {
            return Err(KError::InvalidConfig(format!(
                "overlap of {overlap} layers does not cover a slab of {slab_layers} layers"
            )));
        }

        let partitioner = Partitioner::new(GridShape::along(axis, nslabs)).with_overlap(overlap);
        let slab_partition = partitioner.partition(mesh, PartitionKind::NonOverlapping)?;
        let overlapping_partition = partitioner.partition(mesh, PartitionKind::OverlappingOneSided)?;
        validate_sweep_pair(&overlapping_partition, &slab_partition)?;

        let h = mesh.spacing()[axis];
        let thickness: Vec<_> = (0..nrpatch)
            .map(|p| layer_thickness(p, nrpatch, axis, options.absorbing_layers, h, &options.pml_length))
            .collect();
        let slab_map = DofMap::new(space, &slab_partition)?;
        let overlapping_map = DofMap::with_absorbing_layers(space, &overlapping_partition, &thickness)?;

        let builder = LocalSystemBuilder::new(options.omega, material, options.threshold);
        #[cfg(feature = "rayon")]
        let systems = overlapping_map
            .entries()
            .par_iter()
            .enumerate()
            .map(|(p, entry)| builder.build(p, entry))
            .collect::<Result<Vec<_>, KError>>()?;
        #[cfg(not(feature = "rayon"))]
        let systems = overlapping_map
            .entries()
            .iter()
            .enumerate()
            .map(|(p, entry)| builder.build(p, entry))
            .collect::<Result<Vec<_>, KError>>()?;

        let directions = match options.mode {
            SweepMode::Forward => vec![Direction::along(axis, 1)],
            SweepMode::ForwardBackward => vec![Direction::along(axis, 1), Direction::along(axis, -1)],
        };

        info!(
            "source transfer: {} unknowns, {} slabs, {} subdomains along axis {}, local sizes {:?}",
            space.true_vsize(),
            slab_partition.len(),
            overlapping_partition.len(),
            axis,
            systems.iter().map(|s| s.size()).collect::<Vec<_>>()
        );

        Ok(SourceTransfer {
            size: 2 * space.true_vsize(),
            directions,
            slab_partition,
            overlapping_partition,
            slab_map,
            overlapping_map,
            systems,
        })
    }

    /// Number of overlapping subdomains.
    pub fn nrpatch(&self) -> usize {
        self.systems.len()
    }

    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    pub fn slab_partition(&self) -> &Partition {
        &self.slab_partition
    }

    pub fn overlapping_partition(&self) -> &Partition {
        &self.overlapping_partition
    }

    pub fn slab_map(&self) -> &DofMap {
        &self.slab_map
    }

    pub fn overlapping_map(&self) -> &DofMap {
        &self.overlapping_map
    }

    pub fn local_system(&self, p: usize) -> &LocalSystem {
        &self.systems[p]
    }

    /// Sweep engine over this setup's maps and factorized systems, for running single sweeps.
    pub fn engine(&self) -> Result<SweepEngine<'_>, KError> {
        SweepEngine::new(&self.slab_map, &self.overlapping_map, &self.systems)
    }
}

impl Preconditioner<Vec<f64>> for SourceTransfer {
    /// `z ≈ A⁻¹ r`: one sweep per configured direction, run concurrently.
    ///
    /// The direction corrections are combined by averaging, i.e. their sum scaled by
    /// `1 / directions().len()`, so a single-direction setup returns its sweep unchanged.
    fn apply(&self, r: &Vec<f64>, z: &mut Vec<f64>) -> Result<(), KError> {
        if r.len() != self.size {
            return Err(KError::DimensionMismatch { expected: self.size, found: r.len() });
        }
        let engine = self.engine()?;
        let sweep = |d: &Direction| -> Result<Vec<f64>, KError> {
            let mut zd = vec![0.0; self.size];
            engine.sweep(*d, r, &mut zd)?;
            Ok(zd)
        };

        #[cfg(feature = "rayon")]
        let corrections = self.directions.par_iter().map(sweep).collect::<Result<Vec<_>, KError>>()?;
        #[cfg(not(feature = "rayon"))]
        let corrections = self.directions.iter().map(sweep).collect::<Result<Vec<_>, KError>>()?;

        z.clear();
        z.resize(self.size, 0.0);
        let scale = 1.0 / corrections.len() as f64;
        for c in &corrections {
            z.iter_mut().zip(c).for_each(|(zi, ci)| *zi += scale * ci);
        }
        Ok(())
    }

    fn size(&self) -> usize {
        self.size
    }
}
