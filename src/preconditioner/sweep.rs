//! Sequential source-transfer sweep over a chain of overlapping subdomains.
//!
//! Overlapping subdomain `q` covers slabs `q` and `q + 1`. A sweep visits the subdomains in
//! order; each step solves its absorbing-layer system with
//! - the source transferred from the previous step on its trailing slab, and
//! - the residual restricted to its leading slab,
//!
//! writes the field on its leading slab into the correction (the first step writes
//! everything) and hands the windowed field's residual on to the next subdomain.

use log::trace;

use crate::dofmap::DofMap;
use crate::error::KError;
use crate::local::LocalSystem;
use crate::mesh::BoundingBox;
use crate::preconditioner::cutoff::{CutoffWindow, Direction};
use crate::utils::blockvec;

/// One step of a sweep: the subdomain solved and its trailing and leading slabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepStep {
    pub subdomain: usize,
    pub trailing: usize,
    pub leading: usize,
}

/// Runs sweeps over borrowed maps and factorized systems.
pub struct SweepEngine<'a> {
    slabs: &'a DofMap,
    overlapping: &'a DofMap,
    systems: &'a [LocalSystem],
}

impl<'a> SweepEngine<'a> {
    pub fn new(slabs: &'a DofMap, overlapping: &'a DofMap, systems: &'a [LocalSystem]) -> Result<Self, KError> {
        if slabs.len() != overlapping.len() + 1 {
            return Err(KError::PartitionMismatch { overlapping: overlapping.len(), non_overlapping: slabs.len() });
        }
        if systems.len() != overlapping.len() {
            return Err(KError::DimensionMismatch { expected: overlapping.len(), found: systems.len() });
        }
        Ok(SweepEngine { slabs, overlapping, systems })
    }

    pub fn nrpatch(&self) -> usize {
        self.overlapping.len()
    }

    /// Visit order of a forward or backward sweep.
    pub fn schedule(&self, forward: bool) -> Vec<SweepStep> {
        let n = self.nrpatch();
        (0..n)
            .map(|k| {
                if forward {
                    SweepStep { subdomain: k, trailing: k, leading: k + 1 }
                } else {
                    let q = n - 1 - k;
                    SweepStep { subdomain: q, trailing: q + 1, leading: q }
                }
            })
            .collect()
    }

    /// One sweep along `direction`, writing the correction for residual `r` into `z`.
    pub fn sweep(&self, direction: Direction, r: &[f64], z: &mut [f64]) -> Result<(), KError> {
        let axis = direction
            .axis()
            .ok_or(KError::Unsupported("sweeps run along a single axis"))?;
        let forward = direction.component(axis) > 0;
        let n = self.slabs.global_size();
        for v in [r.len(), z.len()] {
            if v != 2 * n {
                return Err(KError::DimensionMismatch { expected: 2 * n, found: v });
            }
        }
        z.iter_mut().for_each(|x| *x = 0.0);

        let steps = self.schedule(forward);
        let sources = self.slab_sources(r, &steps);
        let mut ftransf = sources[steps[0].trailing].clone();
        let mut faux = vec![0.0; 2 * n];

        for (k, step) in steps.iter().enumerate() {
            let entry = self.overlapping.entry(step.subdomain);
            let trailing = self.slabs.entry(step.trailing);
            let leading = self.slabs.entry(step.leading);
            trace!("sweep {:?} step {k}: subdomain {}", direction.0, step.subdomain);

            faux.iter_mut().for_each(|x| *x = 0.0);
            trailing.scatter(&ftransf, &mut faux);
            leading.scatter_add(&sources[step.leading], &mut faux);

            let mut local = vec![0.0; 2 * entry.size()];
            entry.gather(&faux, &mut local);
            let mut rhs = vec![0.0; 2 * entry.pml_size()];
            entry.extend(&local, &mut rhs);
            let mut upml = vec![0.0; rhs.len()];
            self.systems[step.subdomain].solve(&rhs, &mut upml)?;
            entry.restrict(&upml, &mut local);

            faux.iter_mut().for_each(|x| *x = 0.0);
            entry.scatter(&local, &mut faux);
            // past the first step the trailing slab holds the previous step's full field, while
            // this solve only carries the transferred source there
            if k == 0 {
                blockvec::copy_entries(&faux, entry.dof2global(), z);
            } else {
                blockvec::copy_entries(&faux, leading.dof2global(), z);
            }

            let Some(next) = steps.get(k + 1) else {
                break;
            };

            let outer = entry.thickness().extend(&entry.bbox());
            let receiver = padded_across(&self.overlapping.entry(next.subdomain).bbox(), &outer, axis);
            let source = padded_across(&entry.bbox(), &outer, axis);
            CutoffWindow::new(direction, &receiver, &source).apply(entry.pml_space(), &mut upml)?;

            let mut res = vec![0.0; upml.len()];
            self.systems[step.subdomain].apply(&upml, &mut res);
            entry.restrict(&res, &mut local);
            faux.iter_mut().for_each(|x| *x = 0.0);
            entry.scatter(&local, &mut faux);
            ftransf = vec![0.0; 2 * leading.size()];
            leading.gather(&faux, &mut ftransf);
        }
        Ok(())
    }

    /// Residual restricted to each slab; shared unknowns go to the first slab visited.
    fn slab_sources(&self, r: &[f64], steps: &[SweepStep]) -> Vec<Vec<f64>> {
        let n = self.slabs.global_size();
        let mut order = vec![steps[0].trailing];
        order.extend(steps.iter().map(|s| s.leading));

        let mut claimed = vec![false; n];
        let mut sources = vec![Vec::new(); self.slabs.len()];
        for s in order {
            let e = self.slabs.entry(s);
            let m = e.size();
            let mut f = vec![0.0; 2 * m];
            e.gather(r, &mut f);
            for (i, &g) in e.dof2global().iter().enumerate() {
                if claimed[g] {
                    f[i] = 0.0;
                    f[i + m] = 0.0;
                } else {
                    claimed[g] = true;
                }
            }
            sources[s] = f;
        }
        sources
    }
}

/// `b` with its extent across the sweep axis replaced by that of `outer`.
fn padded_across(b: &BoundingBox, outer: &BoundingBox, axis: usize) -> BoundingBox {
    let mut out = *b;
    for d in (0..b.dim).filter(|&d| d != axis) {
        out.min[d] = outer.min[d];
        out.max[d] = outer.max[d];
    }
    out
}
