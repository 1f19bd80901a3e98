//! Remote achievement store boundary.
//!
//! [`AchievementRemote`] is the trait the engine consumes; [`HttpRemote`] is
//! the shipped REST adapter. The wire DTOs carry the legacy camelCase field
//! names (`isUnlocked`, `currentProgress`, ...) and translate to the
//! canonical model here, at this boundary only.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::catalog::{
    AchievementCategory, AchievementDef, ConditionKind, LessonCategory, LocalizedText, Rarity,
};
use crate::identity::UserId;
use crate::stats::PlayerStats;
use crate::store::UserProgress;
use crate::sync::SyncError;

/// Operations the engine consumes from the remote store.
#[async_trait]
pub trait AchievementRemote: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<AchievementDef>, SyncError>;
    async fn fetch_user_progress(&self, user: UserId) -> Result<Vec<UserProgress>, SyncError>;
    async fn fetch_user_stats(&self, user: UserId) -> Result<PlayerStats, SyncError>;
    async fn push_unlock(&self, user: UserId, achievement_id: u32) -> Result<(), SyncError>;
    async fn push_progress(
        &self,
        user: UserId,
        achievement_id: u32,
        progress: u32,
    ) -> Result<(), SyncError>;
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AchievementDto {
    id: u32,
    category: AchievementCategory,
    rarity: Rarity,
    points: u32,
    condition: ConditionKind,
    target_value: u32,
    title_en: String,
    title_es: String,
    description_en: String,
    description_es: String,
    encouragement_en: String,
    encouragement_es: String,
}

impl From<AchievementDto> for AchievementDef {
    fn from(dto: AchievementDto) -> Self {
        AchievementDef {
            id: dto.id,
            category: dto.category,
            rarity: dto.rarity,
            points: dto.points,
            condition: dto.condition,
            target: dto.target_value.max(1),
            title: LocalizedText::new(dto.title_en, dto.title_es),
            description: LocalizedText::new(dto.description_en, dto.description_es),
            encouragement: LocalizedText::new(dto.encouragement_en, dto.encouragement_es),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressDto {
    achievement_id: u32,
    is_unlocked: bool,
    current_progress: u32,
    #[serde(default)]
    unlocked_at: Option<DateTime<Utc>>,
}

impl From<ProgressDto> for UserProgress {
    fn from(dto: ProgressDto) -> Self {
        UserProgress {
            achievement_id: dto.achievement_id,
            unlocked: dto.is_unlocked,
            progress: dto.current_progress,
            unlocked_at: dto.unlocked_at,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StatsDto {
    lessons_completed: u32,
    stars_earned: u32,
    help_used: u32,
    perfect_runs: u32,
    fast_completions: u32,
    consecutive_days_played: u32,
    categories_touched: BTreeSet<LessonCategory>,
    play_dates: BTreeSet<NaiveDate>,
    attempts_per_lesson: BTreeMap<u32, u32>,
}

impl From<StatsDto> for PlayerStats {
    fn from(dto: StatsDto) -> Self {
        PlayerStats {
            lessons_completed: dto.lessons_completed,
            stars_earned: dto.stars_earned,
            help_used: dto.help_used,
            perfect_runs: dto.perfect_runs,
            fast_completions: dto.fast_completions,
            consecutive_days: dto.consecutive_days_played,
            categories_touched: dto.categories_touched,
            play_dates: dto.play_dates,
            attempts_per_lesson: dto.attempts_per_lesson,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressPushBody {
    current_progress: u32,
}

/// REST adapter for the remote achievement store.
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpRemote {
    /// Build a client with a transport-level request timeout.
    pub fn new(
        base_url: impl Into<String>,
        bearer_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SyncError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(SyncError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }
}

#[async_trait]
impl AchievementRemote for HttpRemote {
    async fn fetch_catalog(&self) -> Result<Vec<AchievementDef>, SyncError> {
        let response = self
            .request(reqwest::Method::GET, "/api/achievements")
            .send()
            .await?;
        let dtos: Vec<AchievementDto> = Self::check(response).await?.json().await?;
        Ok(dtos.into_iter().map(AchievementDef::from).collect())
    }

    async fn fetch_user_progress(&self, user: UserId) -> Result<Vec<UserProgress>, SyncError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/api/users/{user}/achievements"),
            )
            .send()
            .await?;
        let dtos: Vec<ProgressDto> = Self::check(response).await?.json().await?;
        Ok(dtos.into_iter().map(UserProgress::from).collect())
    }

    async fn fetch_user_stats(&self, user: UserId) -> Result<PlayerStats, SyncError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/api/users/{user}/stats"))
            .send()
            .await?;
        let dto: StatsDto = Self::check(response).await?.json().await?;
        Ok(dto.into())
    }

    async fn push_unlock(&self, user: UserId, achievement_id: u32) -> Result<(), SyncError> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/api/users/{user}/achievements/{achievement_id}/unlock"),
            )
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn push_progress(
        &self,
        user: UserId,
        achievement_id: u32,
        progress: u32,
    ) -> Result<(), SyncError> {
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/api/users/{user}/achievements/{achievement_id}/progress"),
            )
            .json(&ProgressPushBody {
                current_progress: progress,
            })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_dto_translates_legacy_names() {
        let json = r#"{"achievementId":7,"isUnlocked":true,"currentProgress":5}"#;
        let dto: ProgressDto = serde_json::from_str(json).unwrap();
        let progress: UserProgress = dto.into();
        assert_eq!(progress.achievement_id, 7);
        assert!(progress.unlocked);
        assert_eq!(progress.progress, 5);
        assert_eq!(progress.unlocked_at, None);
    }

    #[test]
    fn test_stats_dto_defaults_missing_fields() {
        let json = r#"{"lessonsCompleted":3,"starsEarned":9}"#;
        let dto: StatsDto = serde_json::from_str(json).unwrap();
        let stats: PlayerStats = dto.into();
        assert_eq!(stats.lessons_completed, 3);
        assert_eq!(stats.stars_earned, 9);
        assert_eq!(stats.help_used, 0);
        assert!(stats.play_dates.is_empty());
    }

    #[test]
    fn test_achievement_dto_clamps_target() {
        let json = r#"{
            "id": 1, "category": "completion", "rarity": "common", "points": 10,
            "condition": {"kind": "first-activity"}, "targetValue": 0,
            "titleEn": "t", "titleEs": "t", "descriptionEn": "d", "descriptionEs": "d",
            "encouragementEn": "e", "encouragementEs": "e"
        }"#;
        let dto: AchievementDto = serde_json::from_str(json).unwrap();
        let def: AchievementDef = dto.into();
        assert_eq!(def.target, 1);
        assert_eq!(def.condition, ConditionKind::FirstActivity);
    }
}
