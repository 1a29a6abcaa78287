//! Job search parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ApiError;

/// Largest page size the API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Posting-age filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatePosted {
    /// Last 24 hours.
    PastDay,
    /// Last 7 days.
    PastWeek,
    /// Last 30 days.
    PastMonth,
}

/// Seniority filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceLevel {
    /// Internship.
    Internship,
    /// Entry level.
    EntryLevel,
    /// Associate.
    Associate,
    /// Mid-senior level.
    MidSenior,
    /// Director.
    Director,
    /// Executive.
    Executive,
}

/// Employment-type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    /// Full time.
    FullTime,
    /// Part time.
    PartTime,
    /// Contract.
    Contract,
    /// Temporary.
    Temporary,
    /// Volunteer.
    Volunteer,
    /// Internship.
    Internship,
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortBy {
    /// Server relevance ranking.
    #[default]
    Relevance,
    /// Newest first.
    Recent,
}

macro_rules! wire_names {
    ($ty:ty { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Value sent on the wire and accepted by `FromStr`.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let normalized = value.trim().to_ascii_uppercase().replace(['-', ' '], "_");
                match normalized.as_str() {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(format!(
                        "unknown value '{value}' (expected one of: {})",
                        [$($name),+].join(", ")
                    )),
                }
            }
        }
    };
}

wire_names!(DatePosted {
    PastDay => "PAST_DAY",
    PastWeek => "PAST_WEEK",
    PastMonth => "PAST_MONTH",
});

wire_names!(ExperienceLevel {
    Internship => "INTERNSHIP",
    EntryLevel => "ENTRY_LEVEL",
    Associate => "ASSOCIATE",
    MidSenior => "MID_SENIOR",
    Director => "DIRECTOR",
    Executive => "EXECUTIVE",
});

wire_names!(JobType {
    FullTime => "FULL_TIME",
    PartTime => "PART_TIME",
    Contract => "CONTRACT",
    Temporary => "TEMPORARY",
    Volunteer => "VOLUNTEER",
    Internship => "INTERNSHIP",
});

wire_names!(SortBy {
    Relevance => "RELEVANCE",
    Recent => "RECENT",
});

/// Parameters of one logical job search.
///
/// `offset` is where the first page starts and `limit` the page size; a
/// [`SearchSession`](super::SearchSession) owns the advancing offset after
/// submission, so the query itself never changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSearchQuery {
    /// Free-text keywords.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    /// Location name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Posting-age filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_posted: Option<DatePosted>,
    /// Accepted experience levels (any of).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub experience_levels: Vec<ExperienceLevel>,
    /// Accepted job types (any of).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub job_types: Vec<JobType>,
    /// Result ordering.
    #[serde(default)]
    pub sort_by: SortBy,
    /// Offset of the first page.
    #[serde(default)]
    pub offset: u32,
    /// Page size; the client default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl JobSearchQuery {
    /// Empty query; add at least one filter before submitting.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the keywords.
    #[must_use]
    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the posting-age filter.
    #[must_use]
    pub fn date_posted(mut self, date_posted: DatePosted) -> Self {
        self.date_posted = Some(date_posted);
        self
    }

    /// Adds an accepted experience level.
    #[must_use]
    pub fn experience_level(mut self, level: ExperienceLevel) -> Self {
        if !self.experience_levels.contains(&level) {
            self.experience_levels.push(level);
        }
        self
    }

    /// Adds an accepted job type.
    #[must_use]
    pub fn job_type(mut self, job_type: JobType) -> Self {
        if !self.job_types.contains(&job_type) {
            self.job_types.push(job_type);
        }
        self
    }

    /// Sets the ordering.
    #[must_use]
    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Sets the starting offset.
    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether any filter field carries a value.
    #[must_use]
    pub fn has_filters(&self) -> bool {
        let non_blank = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
        non_blank(&self.keywords)
            || non_blank(&self.location)
            || self.date_posted.is_some()
            || !self.experience_levels.is_empty()
            || !self.job_types.is_empty()
    }

    /// Checks the query can be submitted.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidQuery`] when every filter field is empty or
    /// `limit` is outside `1..=100`.
    pub fn validate(&self) -> Result<(), ApiError> {
        if !self.has_filters() {
            return Err(ApiError::invalid_query(
                "at least one of keywords, location, date posted, experience level or job type is required",
            ));
        }
        if let Some(limit) = self.limit
            && !(1..=MAX_PAGE_SIZE).contains(&limit)
        {
            return Err(ApiError::invalid_query(format!(
                "page size {limit} is outside 1..={MAX_PAGE_SIZE}"
            )));
        }
        Ok(())
    }

    /// Query-string pairs for one page request.
    pub(crate) fn to_params(&self, start: u32, count: u32) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(keywords) = self.keywords.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            params.push(("keywords", keywords.to_string()));
        }
        if let Some(location) = self.location.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            params.push(("location", location.to_string()));
        }
        if let Some(date_posted) = self.date_posted {
            params.push(("datePosted", date_posted.as_str().to_string()));
        }
        if !self.experience_levels.is_empty() {
            params.push(("experienceLevel", join_wire(&self.experience_levels, |l| l.as_str())));
        }
        if !self.job_types.is_empty() {
            params.push(("jobType", join_wire(&self.job_types, |t| t.as_str())));
        }
        params.push(("sortBy", self.sort_by.as_str().to_string()));
        params.push(("start", start.to_string()));
        params.push(("count", count.to_string()));
        params
    }

    /// Short human-readable summary for history listings.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(keywords) = self.keywords.as_deref().filter(|v| !v.trim().is_empty()) {
            parts.push(format!("keywords={keywords}"));
        }
        if let Some(location) = self.location.as_deref().filter(|v| !v.trim().is_empty()) {
            parts.push(format!("location={location}"));
        }
        if let Some(date_posted) = self.date_posted {
            parts.push(format!("posted={date_posted}"));
        }
        if !self.experience_levels.is_empty() {
            parts.push(format!(
                "experience={}",
                join_wire(&self.experience_levels, |l| l.as_str())
            ));
        }
        if !self.job_types.is_empty() {
            parts.push(format!("type={}", join_wire(&self.job_types, |t| t.as_str())));
        }
        parts.join(" ")
    }
}

fn join_wire<T: Copy>(values: &[T], name: impl Fn(T) -> &'static str) -> String {
    values.iter().map(|v| name(*v)).collect::<Vec<_>>().join(",")
}
