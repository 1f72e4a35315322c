// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use chrono::{DateTime, Utc};

use crate::{ObjectType, ResourceId, RunId, SearchDocument};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Denormalized document shape of a learning resource, matching the declared
/// index mapping. Produced by the external document serializer; this crate
/// only defines the contract the chunker and query builder depend on.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResourceDocument {
    pub id: ResourceId,
    pub readable_id: String,
    pub resource_type: String,
    pub title: String,
    pub description: Option<String>,
    pub full_description: Option<String>,
    pub platform: Option<String>,
    pub offered_by: Option<String>,
    pub professional: bool,
    pub certification: Vec<String>,
    pub resource_content_tags: Vec<String>,
    pub topics: Vec<ResourceTopic>,
    pub departments: Vec<ResourceDepartment>,
    pub course: Option<CourseDetails>,
    pub runs: Vec<ResourceRun>,
    pub created_on: Option<DateTime<Utc>>,
}

impl ResourceDocument {
    pub fn into_search_document(self) -> SearchDocument {
        let id = self.id.to_string();
        // Serialization of a plain value-struct cannot fail
        let source = serde_json::to_value(self).unwrap();
        SearchDocument::new(id, source)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResourceTopic {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResourceDepartment {
    pub department_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CourseDetails {
    pub course_numbers: Vec<CourseNumber>,
}

/// One catalog listing of a course. `primary` and `sort_coursenum` are
/// computed by the serializer: the primary listing drives default ordering.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CourseNumber {
    pub value: String,
    pub listing_type: String,
    pub primary: bool,
    pub sort_coursenum: String,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResourceRun {
    pub run_id: RunId,
    pub year: Option<i32>,
    pub semester: Option<String>,
    pub level: Vec<String>,
    pub instructors: Vec<RunInstructor>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunInstructor {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Child document for a single file of course content, indexed into the
/// parent course's index and routed to the parent's shard.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContentFileDocument {
    pub key: String,
    pub resource_id: ResourceId,
    pub run_id: RunId,
    pub content_type: Option<String>,
    pub content_title: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
}

impl ContentFileDocument {
    /// Parent object type content files are co-located with
    pub const PARENT_OBJECT_TYPE: ObjectType = ObjectType::Course;

    pub fn into_search_document(self) -> SearchDocument {
        let id = format!("content_file_{}", self.key);
        let routing = self.resource_id.to_string();
        let source = serde_json::to_value(self).unwrap();
        SearchDocument::new(id, source).with_routing(routing)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
