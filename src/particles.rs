//! Locating sets of particles in curvilinear grids.

use crate::{
    error::SearchError,
    geometry::Point3,
    grid::{fsr, vertical::VerticalLayout, CellIndices, CellLocation, CurvilinearGrid, SearchOptions},
    io::Verbose,
    num::BFloat,
};
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::debug;

#[cfg(feature = "serialization")]
use serde::Serialize;

/// Identifier of a particle.
pub type ParticleId = u64;

/// Cell indices last found for each particle, used to warm-start later searches.
#[derive(Clone, Debug, Default)]
pub struct IndexCache {
    indices: HashMap<ParticleId, CellIndices>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ParticleId) -> Option<&CellIndices> {
        self.indices.get(&id)
    }

    /// Records the indices found for the given particle, replacing earlier ones.
    pub fn record(&mut self, id: ParticleId, indices: CellIndices) {
        self.indices.insert(id, indices);
    }

    /// Drops the entry of the given particle, e.g. when it is removed from the simulation.
    pub fn forget(&mut self, id: ParticleId) -> Option<CellIndices> {
        self.indices.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl<F: BFloat, L: VerticalLayout<F>> CurvilinearGrid<F, L> {
    /// Searches for the cell of the given particle, starting from the cell
    /// cached for it if there is one.
    ///
    /// The cache entry is updated only when the search succeeds, so a failed
    /// search leaves the previous hint in place.
    pub fn search_particle_indices(
        &self,
        id: ParticleId,
        point: &Point3<fsr>,
        cache: &mut IndexCache,
        options: &SearchOptions,
    ) -> Result<CellLocation, SearchError> {
        let hint = cache.get(id).map(|indices| indices.horizontal).or(options.hint);
        let location = self.search_indices(point, &options.with_hint(hint))?;
        cache.record(id, location.indices);
        Ok(location)
    }
}

/// State of a particle with respect to the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub enum ParticleStatus {
    Active,
    OutOfDomain,
    NonConvergence,
    SamplingError,
}

impl From<&SearchError> for ParticleStatus {
    fn from(error: &SearchError) -> Self {
        match error {
            SearchError::OutOfDomain { .. } => Self::OutOfDomain,
            SearchError::NonConvergence { .. } => Self::NonConvergence,
            SearchError::Sampling { .. } => Self::SamplingError,
        }
    }
}

/// A particle with its position and the last cell it was found in.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct Particle {
    id: ParticleId,
    position: Point3<fsr>,
    last_indices: Option<CellIndices>,
    location: Option<CellLocation>,
    status: ParticleStatus,
}

impl Particle {
    pub fn new(id: ParticleId, position: Point3<fsr>) -> Self {
        Self {
            id,
            position,
            last_indices: None,
            location: None,
            status: ParticleStatus::Active,
        }
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn position(&self) -> &Point3<fsr> {
        &self.position
    }

    /// Indices of the last cell the particle was found in.
    pub fn last_indices(&self) -> Option<&CellIndices> {
        self.last_indices.as_ref()
    }

    /// Result of the most recent successful search, if it was the latest search.
    pub fn location(&self) -> Option<&CellLocation> {
        self.location.as_ref()
    }

    pub fn status(&self) -> ParticleStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == ParticleStatus::Active
    }

    fn locate<F: BFloat, L: VerticalLayout<F>>(
        &mut self,
        grid: &CurvilinearGrid<F, L>,
        options: &SearchOptions,
    ) {
        if !self.is_active() {
            return;
        }
        let hint = self
            .last_indices
            .map(|indices| indices.horizontal)
            .or(options.hint);
        match grid.search_indices(&self.position, &options.with_hint(hint)) {
            Ok(location) => {
                self.last_indices = Some(location.indices);
                self.location = Some(location);
            }
            Err(err) => {
                debug!(id = self.id, %err, "Deactivating particle");
                self.location = None;
                self.status = ParticleStatus::from(&err);
            }
        }
    }
}

/// A set of particles that are located in a grid together.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct ParticleSet {
    particles: Vec<Particle>,
    #[cfg_attr(feature = "serialization", serde(skip))]
    verbose: Verbose,
}

impl ParticleSet {
    /// Creates a new set of active particles at the given positions, with
    /// identifiers numbered from zero.
    pub fn new<P>(positions: P, verbose: Verbose) -> Self
    where
        P: IntoIterator<Item = Point3<fsr>>,
    {
        let particles: Vec<_> = positions
            .into_iter()
            .enumerate()
            .map(|(idx, position)| Particle::new(idx as ParticleId, position))
            .collect();
        if verbose.is_yes() {
            println!("Initialized {} particles", particles.len());
        }
        Self { particles, verbose }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn number_of_particles(&self) -> usize {
        self.particles.len()
    }

    pub fn number_of_active_particles(&self) -> usize {
        self.particles.iter().filter(|p| p.is_active()).count()
    }

    pub fn verbose(&self) -> Verbose {
        self.verbose
    }

    /// Moves each active particle to the position computed by the given updater.
    pub fn update_positions<U>(&mut self, updater: U)
    where
        U: Fn(&Particle) -> Point3<fsr> + Sync,
    {
        self.particles
            .par_iter_mut()
            .filter(|particle| particle.is_active())
            .for_each(|particle| particle.position = updater(particle));
    }

    /// Finds the grid cell of every active particle in parallel.
    ///
    /// Each particle starts from the cell it was last found in, falling back to the
    /// hint in `options`. Particles whose search fails are deactivated with a status
    /// telling why.
    pub fn locate<F: BFloat, L: VerticalLayout<F>>(
        &mut self,
        grid: &CurvilinearGrid<F, L>,
        options: &SearchOptions,
    ) {
        if self.verbose.is_yes() {
            println!("Locating {} particles", self.number_of_active_particles());
        }
        let progress_bar = self.verbose.create_progress_bar(self.particles.len());
        self.particles
            .par_iter_mut()
            .progress_with(progress_bar)
            .for_each(|particle| particle.locate(grid, options));

        if self.verbose.is_yes() {
            println!(
                "Located {} of {} particles",
                self.number_of_active_particles(),
                self.number_of_particles()
            );
        }
    }

    /// Collects the last found cell indices of all particles into a cache.
    pub fn index_cache(&self) -> IndexCache {
        let mut cache = IndexCache::new();
        for particle in &self.particles {
            if let Some(indices) = particle.last_indices {
                cache.record(particle.id, indices);
            }
        }
        cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::Idx2,
        grid::{CurvilinearZGrid, Mesh},
    };
    use ndarray::Array2;

    fn unit_grid(size: usize) -> CurvilinearZGrid<f32> {
        let lon = Array2::from_shape_fn((size, size), |(_, i)| i as f32);
        let lat = Array2::from_shape_fn((size, size), |(j, _)| j as f32);
        CurvilinearZGrid::from_coords(lon, lat, None, None, Mesh::Flat).unwrap()
    }

    #[test]
    fn cache_is_updated_only_on_success() {
        let grid = unit_grid(6);
        let mut cache = IndexCache::new();
        let options = SearchOptions::default();

        let location = grid
            .search_particle_indices(7, &Point3::new(4.5, 0.5, 0.0), &mut cache, &options)
            .unwrap();
        assert_eq!(location.indices.horizontal, Idx2::new(4, 0));
        assert_eq!(cache.get(7), Some(&location.indices));

        assert!(grid
            .search_particle_indices(7, &Point3::new(9.0, 0.5, 0.0), &mut cache, &options)
            .is_err());
        assert_eq!(cache.get(7), Some(&location.indices));
        assert_eq!(cache.get(8), None);
        assert_eq!(cache.forget(7), Some(location.indices));
        assert!(cache.is_empty());
    }

    #[test]
    fn particle_set_location_deactivates_lost_particles() {
        let grid = unit_grid(5);
        let mut particles = ParticleSet::new(
            vec![
                Point3::new(0.5, 0.5, 0.0),
                Point3::new(3.5, 2.5, 0.0),
                Point3::new(-1.0, 2.5, 0.0),
            ],
            Verbose::No,
        );
        particles.locate(&grid, &SearchOptions::default());

        let statuses: Vec<_> = particles.particles().iter().map(Particle::status).collect();
        assert_eq!(
            statuses,
            vec![
                ParticleStatus::Active,
                ParticleStatus::Active,
                ParticleStatus::OutOfDomain
            ]
        );
        let located = particles.particles()[1].location().unwrap();
        assert_eq!((located.xi(), located.yi()), (3, 2));
        assert_eq!(particles.index_cache().len(), 2);
    }

    #[test]
    fn particles_are_followed_from_previous_cells() {
        let grid = unit_grid(5);
        let mut particles = ParticleSet::new(vec![Point3::new(0.5, 0.5, 0.0)], Verbose::No);
        particles.locate(&grid, &SearchOptions::default());
        particles.update_positions(|particle| {
            let position = particle.position();
            Point3::new(position.x + 1.0, position.y + 2.0, position.z)
        });
        particles.locate(&grid, &SearchOptions::default());

        let particle = &particles.particles()[0];
        assert!(particle.is_active());
        assert_eq!(
            particle.last_indices().map(|indices| indices.horizontal),
            Some(Idx2::new(1, 2))
        );
    }
}
