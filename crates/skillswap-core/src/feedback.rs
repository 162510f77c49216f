// Feedback domain types
//
// Feedback is an independent rating record. Sessions only keep a reference to it
// (see FeedbackLink); the rating content lives here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{Result, SessionError};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const MAX_COMMENT_CHARS: usize = 500;

/// Kind of exchange being rated
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum SessionType {
    #[default]
    SkillShare,
    Tutoring,
    Collaboration,
    Other,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::SkillShare => "skill-share",
            SessionType::Tutoring => "tutoring",
            SessionType::Collaboration => "collaboration",
            SessionType::Other => "other",
        }
    }
}

impl From<&str> for SessionType {
    fn from(s: &str) -> Self {
        match s {
            "tutoring" => SessionType::Tutoring,
            "collaboration" => SessionType::Collaboration,
            "other" => SessionType::Other,
            _ => SessionType::SkillShare,
        }
    }
}

/// Feedback - a rating one user gives another
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Feedback {
    pub id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub skill_category: String,
    pub session_type: SessionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating feedback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateFeedback {
    pub reviewee_id: Uuid,
    #[cfg_attr(feature = "openapi", schema(minimum = 1, maximum = 5, example = 5))]
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[cfg_attr(feature = "openapi", schema(example = "Rust"))]
    pub skill_category: String,
    #[serde(default)]
    pub session_type: Option<SessionType>,
    /// Session this feedback is about, if any
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

impl CreateFeedback {
    /// Validate and normalize into a Feedback record
    pub fn into_feedback(self, reviewer_id: Uuid, now: DateTime<Utc>) -> Result<Feedback> {
        if reviewer_id == self.reviewee_id {
            return Err(SessionError::invalid("Cannot provide feedback to yourself"));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(SessionError::invalid(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }
        let comment = self.comment.unwrap_or_default().trim().to_string();
        if comment.chars().count() > MAX_COMMENT_CHARS {
            return Err(SessionError::invalid(format!(
                "Comment cannot exceed {} characters",
                MAX_COMMENT_CHARS
            )));
        }
        let skill_category = self.skill_category.trim().to_string();
        if skill_category.is_empty() {
            return Err(SessionError::invalid("Skill category is required"));
        }

        Ok(Feedback {
            id: Uuid::now_v7(),
            reviewer_id,
            reviewee_id: self.reviewee_id,
            rating: self.rating,
            comment,
            skill_category,
            session_type: self.session_type.unwrap_or_default(),
            session_id: self.session_id,
            created_at: now,
        })
    }
}

/// Aggregate rating for a user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RatingStats {
    pub average_rating: f64,
    pub total_ratings: u32,
}

/// Per-skill-category rating breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CategorySummary {
    pub skill_category: String,
    pub average_rating: f64,
    pub count: u32,
    pub ratings: Vec<u8>,
}

/// Feedback summary for a user profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FeedbackSummary {
    pub rating_stats: RatingStats,
    pub by_category: Vec<CategorySummary>,
}

impl FeedbackSummary {
    /// Summarize all feedback received by one user
    pub fn from_feedback(feedback: &[Feedback]) -> Self {
        let rating_stats = RatingStats {
            average_rating: round_one_decimal(average(feedback.iter().map(|f| f.rating))),
            total_ratings: feedback.len() as u32,
        };

        let mut grouped: BTreeMap<&str, Vec<u8>> = BTreeMap::new();
        for f in feedback {
            grouped
                .entry(f.skill_category.as_str())
                .or_default()
                .push(f.rating);
        }

        let mut by_category: Vec<CategorySummary> = grouped
            .into_iter()
            .map(|(category, ratings)| CategorySummary {
                skill_category: category.to_string(),
                average_rating: round_one_decimal(average(ratings.iter().copied())),
                count: ratings.len() as u32,
                ratings,
            })
            .collect();
        by_category.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));

        Self {
            rating_stats,
            by_category,
        }
    }
}

fn average(ratings: impl Iterator<Item = u8>) -> f64 {
    let (sum, count) = ratings.fold((0u32, 0u32), |(s, c), r| (s + r as u32, c + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
