use scout_types::{Gender, Influencer};

use super::QueryError;

/// Optional catalog predicates, combined with logical AND
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring of name or location
    pub search: Option<String>,
    pub topic: Option<String>,
    pub platform: Option<String>,
    pub gender: Option<Gender>,
}

impl FilterCriteria {
    /// Build criteria from raw query values. Blank values count as absent;
    /// an unrecognized gender is rejected. Search text is kept as given,
    /// surrounding whitespace included.
    pub fn from_params(
        search: Option<&str>,
        topic: Option<&str>,
        platform: Option<&str>,
        gender: Option<&str>,
    ) -> Result<Self, QueryError> {
        let gender = match non_blank(gender) {
            Some(raw) => Some(Gender::parse(&raw).ok_or(QueryError::UnknownGender(raw))?),
            None => None,
        };

        Ok(Self {
            search: search
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string),
            topic: non_blank(topic),
            platform: non_blank(platform),
            gender,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.topic.is_none() && self.platform.is_none() && self.gender.is_none()
    }

    pub fn matches(&self, influencer: &Influencer) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_name = influencer.name.to_lowercase().contains(&needle);
            let in_location = influencer
                .location
                .as_deref()
                .is_some_and(|loc| loc.to_lowercase().contains(&needle));
            if !in_name && !in_location {
                return false;
            }
        }

        if let Some(topic) = &self.topic {
            if !influencer.topics.iter().any(|t| t == topic) {
                return false;
            }
        }

        if let Some(platform) = &self.platform {
            if !influencer.platforms.iter().any(|p| p == platform) {
                return false;
            }
        }

        if let Some(gender) = self.gender {
            if influencer.gender != Some(gender) {
                return false;
            }
        }

        true
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Matching subset of the catalog, in catalog order
pub fn filter(catalog: &[Influencer], criteria: &FilterCriteria) -> Vec<Influencer> {
    catalog
        .iter()
        .filter(|influencer| criteria.matches(influencer))
        .cloned()
        .collect()
}
