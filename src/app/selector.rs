//! Coverage selection
//!
//! Picks the dataset that best serves a route's bounding box, preferring data
//! already on disk. The heuristic compares center distances, keeps the first
//! dataset that fully covers the route, and only chooses that covering
//! dataset over the closest one when doing so avoids a download.
//!
//! # Examples
//!
//! ```rust,no_run
//! use geodata_catalog::app::bounding_box::{BoundingBox, Position};
//! use geodata_catalog::app::catalog::{Catalog, CatalogConfig};
//! use geodata_catalog::app::selector::CoverageSelector;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::build(CatalogConfig::new("/var/lib/graphs"))?;
//! let route = [Position::new(9.99, 53.55), Position::new(13.40, 52.52)];
//! let target = BoundingBox::from_positions(&route).ok_or("empty route")?;
//!
//! let selection = CoverageSelector::new(&catalog).select(&target)?;
//! println!("{} (fetch: {})", selection.descriptor, selection.requires_fetch);
//! # Ok(())
//! # }
//! ```

use tracing::{debug, info};

use crate::app::bounding_box::BoundingBox;
use crate::app::catalog::Catalog;
use crate::app::descriptor::DatasetDescriptor;
use crate::constants::DISTANCE_TIE_BREAK;
use crate::errors::{SelectionError, SelectionResult};

/// Outcome of a selection
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub descriptor: &'a DatasetDescriptor,
    /// The dataset must be fetched before it can be used
    pub requires_fetch: bool,
}

/// Selection over a fixed, ordered set of candidates
#[derive(Debug, Clone)]
pub struct CoverageSelector<'a> {
    candidates: Vec<&'a DatasetDescriptor>,
}

struct Closest<'a> {
    descriptor: &'a DatasetDescriptor,
    bbox: BoundingBox,
    distance: f64,
}

impl<'a> CoverageSelector<'a> {
    /// Select among every descriptor of the catalog, local ones first
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::from_candidates(catalog.descriptors())
    }

    /// Select among the given descriptors, in the given order
    pub fn from_candidates(candidates: impl IntoIterator<Item = &'a DatasetDescriptor>) -> Self {
        Self {
            candidates: candidates.into_iter().collect(),
        }
    }

    pub fn candidates(&self) -> &[&'a DatasetDescriptor] {
        &self.candidates
    }

    /// Choose the dataset for `target`
    ///
    /// Only descriptors with a valid bounding box take part. Ties within
    /// [`DISTANCE_TIE_BREAK`] metres go to the contained, more specific box.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::NoCandidate` when no descriptor has a valid box.
    pub fn select(&self, target: &BoundingBox) -> SelectionResult<Selection<'a>> {
        let mut closest: Option<Closest<'a>> = None;
        let mut covering: Option<&'a DatasetDescriptor> = None;

        for &descriptor in &self.candidates {
            let bbox = match descriptor.bounding_box() {
                Some(bbox) if bbox.is_valid() => bbox,
                _ => continue,
            };
            let distance = bbox.distance_between_centers(target);

            let replace = match &closest {
                None => true,
                Some(current) => {
                    distance < current.distance
                        || ((distance - current.distance).abs() < DISTANCE_TIE_BREAK
                            && current.bbox.contains(&bbox))
                }
            };
            if replace {
                closest = Some(Closest {
                    descriptor,
                    bbox,
                    distance,
                });
            }

            if bbox.contains(target) {
                covering = match covering {
                    None => Some(descriptor),
                    Some(current) if !current.exists_locally() && descriptor.exists_locally() => {
                        Some(descriptor)
                    }
                    keep => keep,
                };
            }
        }

        let closest = closest.ok_or(SelectionError::NoCandidate)?;
        debug!(
            "Closest dataset {} at {:.0}m, covering dataset {:?}",
            closest.descriptor,
            closest.distance,
            covering.map(|d| d.name())
        );

        let descriptor = match covering {
            Some(covering)
                if !closest.descriptor.exists_locally() && covering.exists_locally() =>
            {
                covering
            }
            _ => closest.descriptor,
        };
        let requires_fetch = !descriptor.exists_locally();

        info!(
            "Selected {} for {} (requires fetch: {})",
            descriptor, target, requires_fetch
        );
        Ok(Selection {
            descriptor,
            requires_fetch,
        })
    }

    /// Select among the candidates matching `identifier` or covering `target`
    pub fn select_matching(
        &self,
        identifier: &str,
        target: &BoundingBox,
    ) -> SelectionResult<Selection<'a>> {
        Self::from_candidates(
            self.candidates
                .iter()
                .copied()
                .filter(|descriptor| descriptor.matches(Some(identifier), target)),
        )
        .select(target)
    }

    /// Every candidate serving `identifier` or `target`, best first
    ///
    /// Candidates with a valid box are preferred; when none has one, all
    /// matches are listed. Present datasets come first. Within each group a
    /// box is listed before any box containing it, otherwise closer centers
    /// come first.
    pub fn candidates_for(
        &self,
        identifier: Option<&str>,
        target: &BoundingBox,
    ) -> Vec<&'a DatasetDescriptor> {
        let matching: Vec<&'a DatasetDescriptor> = self
            .candidates
            .iter()
            .copied()
            .filter(|descriptor| descriptor.matches(identifier, target))
            .collect();

        let boxed: Vec<&'a DatasetDescriptor> = matching
            .iter()
            .copied()
            .filter(|descriptor| descriptor.has_valid_bounding_box())
            .collect();
        let listed = if boxed.is_empty() { matching } else { boxed };

        let mut by_distance: Vec<Candidate<'a>> = listed
            .into_iter()
            .map(|descriptor| {
                let bbox = descriptor.bounding_box().filter(BoundingBox::is_valid);
                Candidate {
                    descriptor,
                    absent: !descriptor.exists_locally(),
                    distance: bbox.map_or(f64::INFINITY, |b| b.distance_between_centers(target)),
                    bbox,
                }
            })
            .collect();
        by_distance.sort_by(|a, b| {
            a.absent
                .cmp(&b.absent)
                .then_with(|| a.distance.total_cmp(&b.distance))
        });

        // containment is not a total order, so it is applied by insertion
        let mut ordered: Vec<Candidate<'a>> = Vec::with_capacity(by_distance.len());
        for candidate in by_distance {
            let position = ordered
                .iter()
                .position(|placed| {
                    placed.absent == candidate.absent && placed.strictly_contains(&candidate)
                })
                .unwrap_or(ordered.len());
            ordered.insert(position, candidate);
        }

        ordered.into_iter().map(|c| c.descriptor).collect()
    }
}

struct Candidate<'a> {
    descriptor: &'a DatasetDescriptor,
    absent: bool,
    distance: f64,
    bbox: Option<BoundingBox>,
}

impl Candidate<'_> {
    fn strictly_contains(&self, other: &Candidate<'_>) -> bool {
        match (self.bbox, other.bbox) {
            (Some(outer), Some(inner)) => outer != inner && outer.contains(&inner),
            _ => false,
        }
    }
}
