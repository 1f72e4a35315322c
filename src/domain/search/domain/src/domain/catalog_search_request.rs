// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{ObjectType, ResourceId};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub const MAX_SEARCH_PAGE_SIZE: usize = 10000;
pub const DEFAULT_SEARCH_PAGE_SIZE: usize = 10;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Flat, validated search-parameter set. Each field maps to a text-query
/// clause, a term filter (possibly against a nested path), or an
/// aggregation request.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CatalogSearchRequest {
    /// Free-text query; wrapping in quotes forces an exact phrase match
    pub q: Option<String>,

    pub offset: usize,
    pub limit: usize,

    /// Sort key; `-` prefix for descending, `.`-paths sort nested fields
    pub sortby: Option<String>,

    pub resource_types: Vec<ObjectType>,
    pub professional: Option<bool>,
    pub certification: Vec<String>,
    pub offered_by: Vec<String>,
    pub platform: Vec<String>,
    pub topic: Vec<String>,
    pub department: Vec<String>,
    pub level: Vec<String>,
    pub resource_content_tags: Vec<String>,

    /// Facets to compute counts for, each excluding its own filter
    pub aggregations: Vec<FacetField>,

    /// Restrict to explicit resource ids
    pub ids: Vec<ResourceId>,
}

impl Default for CatalogSearchRequest {
    fn default() -> Self {
        Self {
            q: None,
            offset: 0,
            limit: DEFAULT_SEARCH_PAGE_SIZE,
            sortby: None,
            resource_types: Vec::new(),
            professional: None,
            certification: Vec::new(),
            offered_by: Vec::new(),
            platform: Vec::new(),
            topic: Vec::new(),
            department: Vec::new(),
            level: Vec::new(),
            resource_content_tags: Vec::new(),
            aggregations: Vec::new(),
            ids: Vec::new(),
        }
    }
}

impl CatalogSearchRequest {
    /// String values of a filterable facet as present in this request;
    /// empty when the facet is not filtered on
    pub fn facet_values(&self, facet: FacetField) -> Vec<String> {
        match facet {
            FacetField::ResourceType => self
                .resource_types
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            FacetField::Professional => self
                .professional
                .iter()
                .map(std::string::ToString::to_string)
                .collect(),
            FacetField::Certification => self.certification.clone(),
            FacetField::OfferedBy => self.offered_by.clone(),
            FacetField::Platform => self.platform.clone(),
            FacetField::Topic => self.topic.clone(),
            FacetField::Department => self.department.clone(),
            FacetField::Level => self.level.clone(),
            FacetField::ResourceContentTags => self.resource_content_tags.clone(),
        }
    }

    /// Facets that carry at least one filter value in this request
    pub fn active_facets(&self) -> Vec<FacetField> {
        ALL_FACET_FIELDS
            .into_iter()
            .filter(|f| !self.facet_values(*f).is_empty())
            .collect()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FacetField {
    ResourceType,
    Professional,
    Certification,
    OfferedBy,
    Platform,
    Topic,
    Department,
    Level,
    ResourceContentTags,
}

pub const ALL_FACET_FIELDS: [FacetField; 9] = [
    FacetField::ResourceType,
    FacetField::Professional,
    FacetField::Certification,
    FacetField::OfferedBy,
    FacetField::Platform,
    FacetField::Topic,
    FacetField::Department,
    FacetField::Level,
    FacetField::ResourceContentTags,
];

impl FacetField {
    /// Document field the filter/aggregation runs against
    pub fn field_path(self) -> &'static str {
        match self {
            Self::ResourceType => "resource_type",
            Self::Professional => "professional",
            Self::Certification => "certification",
            Self::OfferedBy => "offered_by",
            Self::Platform => "platform",
            Self::Topic => "topics.name",
            Self::Department => "departments.name",
            Self::Level => "runs.level",
            Self::ResourceContentTags => "resource_content_tags",
        }
    }

    /// Nested object path the clause must be wrapped in, if any
    pub fn nested_path(self) -> Option<&'static str> {
        match self {
            Self::Topic => Some("topics"),
            Self::Department => Some("departments"),
            Self::Level => Some("runs"),
            _ => None,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
