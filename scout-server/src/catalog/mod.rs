//! Read side of the influencer catalog: the source abstraction, the filter
//! engine, the paginator and the filter-option summary.

mod filter;
mod pagination;

pub use filter::{filter, FilterCriteria};
pub use pagination::{paginate, parse_page, LISTING_PAGE_SIZE};

use anyhow::Result;
use std::collections::BTreeSet;
use thiserror::Error;

use scout_types::{FilterOptions, Influencer, Page};

use crate::db::repositories::InfluencerRepository;

/// Rejected listing query parameters
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown gender '{0}'")]
    UnknownGender(String),
    #[error("Invalid page '{0}': expected a positive integer")]
    InvalidPage(String),
}

/// Where request handlers read the catalog from
pub trait CatalogSource: Send + Sync {
    /// Every influencer with relations, ordered by id
    fn snapshot(&self) -> Result<Vec<Influencer>>;

    fn find(&self, id: &str) -> Result<Option<Influencer>>;
}

impl CatalogSource for InfluencerRepository {
    fn snapshot(&self) -> Result<Vec<Influencer>> {
        self.list_all()
    }

    fn find(&self, id: &str) -> Result<Option<Influencer>> {
        self.find_by_id(id)
    }
}

/// A fixed in-memory catalog
impl CatalogSource for Vec<Influencer> {
    fn snapshot(&self) -> Result<Vec<Influencer>> {
        let mut all = self.clone();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    fn find(&self, id: &str) -> Result<Option<Influencer>> {
        Ok(self.iter().find(|i| i.id == id).cloned())
    }
}

/// Filter the catalog and return the requested page
pub fn search(
    source: &dyn CatalogSource,
    criteria: &FilterCriteria,
    page: usize,
    page_size: usize,
) -> Result<Page<Influencer>> {
    let catalog = source.snapshot()?;
    let matches = if criteria.is_empty() {
        catalog
    } else {
        filter(&catalog, criteria)
    };
    Ok(paginate(matches, page, page_size))
}

/// Distinct topics, platforms and genders present in the catalog
pub fn filter_options(catalog: &[Influencer]) -> FilterOptions {
    let mut topics = BTreeSet::new();
    let mut platforms = BTreeSet::new();
    let mut genders = BTreeSet::new();

    for influencer in catalog {
        topics.extend(influencer.topics.iter().cloned());
        platforms.extend(influencer.platforms.iter().cloned());
        if let Some(gender) = influencer.gender {
            genders.insert(gender.as_str().to_string());
        }
    }

    FilterOptions {
        topics: topics.into_iter().collect(),
        platforms: platforms.into_iter().collect(),
        genders: genders.into_iter().collect(),
    }
}
