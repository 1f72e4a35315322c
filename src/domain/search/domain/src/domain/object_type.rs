// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub type ResourceId = i64;
pub type RunId = i64;
pub type UserId = i64;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Object types each backed by a dedicated physical index behind aliases.
/// Content files are not listed here: they are child documents routed into
/// their parent course's index.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Course,
    Program,
    Podcast,
    PodcastEpisode,
    LearningPath,
    Video,
    VideoPlaylist,
    Percolator,
}

impl ObjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::Program => "program",
            Self::Podcast => "podcast",
            Self::PodcastEpisode => "podcast_episode",
            Self::LearningPath => "learning_path",
            Self::Video => "video",
            Self::VideoPlaylist => "video_playlist",
            Self::Percolator => "percolator",
        }
    }
}

/// All learning-resource types, i.e. everything except the percolator index
pub const RESOURCE_OBJECT_TYPES: [ObjectType; 7] = [
    ObjectType::Course,
    ObjectType::Program,
    ObjectType::Podcast,
    ObjectType::PodcastEpisode,
    ObjectType::LearningPath,
    ObjectType::Video,
    ObjectType::VideoPlaylist,
];

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Which alias generation a write or read targets.
///
/// Normal upserts go to `All` so an in-flight full rebuild also receives
/// them; search traffic and the rebuild corpus writes pick one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSelector {
    Current,
    Reindexing,
    All,
}

impl IndexSelector {
    pub fn wants_current(self) -> bool {
        matches!(self, Self::Current | Self::All)
    }

    pub fn wants_reindexing(self) -> bool {
        matches!(self, Self::Reindexing | Self::All)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
