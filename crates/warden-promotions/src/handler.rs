//! Promotion event handler: log-entry and notification emission paths.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::templates::format_log_entry;
use crate::{
    CampaignOutcome, PromotionActionCreated, PromotionActionKind, PromotionActionSummary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Purpose a guild channel can be designated for.
pub enum ChannelPurpose {
    PromotionLog,
    PromotionNotifications,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Resolved display identity used for a notification's author block.
pub struct AuthorRef {
    pub user_id: u64,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Rich notification payload sent to promotion-notification channels.
pub struct PromotionNotification {
    pub title: String,
    pub description: String,
    pub author: AuthorRef,
    pub footer_text: String,
}

#[async_trait]
/// Resolves a promotion action id into its full rendering summary.
pub trait PromotionDataService: Send + Sync {
    async fn action_summary(&self, action_id: i64) -> Result<PromotionActionSummary>;
}

#[async_trait]
/// Answers which output channels a guild has designated and delivers to them.
pub trait DesignatedChannelRegistry: Send + Sync {
    async fn any_designated(&self, guild_id: u64, purpose: ChannelPurpose) -> Result<bool>;
    async fn send_text(&self, guild_id: u64, purpose: ChannelPurpose, text: &str) -> Result<()>;
    async fn send_notification(
        &self,
        guild_id: u64,
        purpose: ChannelPurpose,
        notification: &PromotionNotification,
    ) -> Result<()>;
}

#[async_trait]
/// Resolves a guild member's display information.
pub trait GuildUserLookup: Send + Sync {
    async fn user_information(&self, guild_id: u64, user_id: u64) -> Result<AuthorRef>;
}

/// The notification fires only for an accepted campaign close.
pub fn notification_gate(kind: PromotionActionKind, outcome: Option<CampaignOutcome>) -> bool {
    kind == PromotionActionKind::CampaignClosed && outcome == Some(CampaignOutcome::Accepted)
}

/// Renders promotion actions, as they are created, into each designated
/// promotion-log and promotion-notification channel of the guild.
pub struct PromotionLoggingHandler {
    data: Arc<dyn PromotionDataService>,
    channels: Arc<dyn DesignatedChannelRegistry>,
    users: Arc<dyn GuildUserLookup>,
}

impl PromotionLoggingHandler {
    pub fn new(
        data: Arc<dyn PromotionDataService>,
        channels: Arc<dyn DesignatedChannelRegistry>,
        users: Arc<dyn GuildUserLookup>,
    ) -> Self {
        Self {
            data,
            channels,
            users,
        }
    }

    /// Handles one promotion action event. Delivery is at-least-once and the
    /// bus owns any retry policy, so failures simply propagate.
    ///
    /// The summary is resolved once up front; a lookup failure fails the
    /// whole event rather than emitting a partial rendering. The two output
    /// paths are otherwise independent: both, either, or neither may fire.
    pub async fn handle(&self, event: &PromotionActionCreated) -> Result<()> {
        let summary = self
            .data
            .action_summary(event.action_id)
            .await
            .with_context(|| format!("failed to resolve promotion action {}", event.action_id))?;

        if self
            .channels
            .any_designated(event.guild_id, ChannelPurpose::PromotionLog)
            .await?
        {
            match format_log_entry(&summary) {
                Some(text) => {
                    self.channels
                        .send_text(event.guild_id, ChannelPurpose::PromotionLog, &text)
                        .await?;
                }
                None => debug!(
                    action_id = event.action_id,
                    "no log template for this action; skipping log entry"
                ),
            }
        }

        if self
            .channels
            .any_designated(event.guild_id, ChannelPurpose::PromotionNotifications)
            .await?
        {
            if let Some(notification) = self.format_notification(event.guild_id, &summary).await? {
                self.channels
                    .send_notification(
                        event.guild_id,
                        ChannelPurpose::PromotionNotifications,
                        &notification,
                    )
                    .await?;
            }
        }

        Ok(())
    }

    async fn format_notification(
        &self,
        guild_id: u64,
        summary: &PromotionActionSummary,
    ) -> Result<Option<PromotionNotification>> {
        let Some(campaign) = summary.target_campaign() else {
            return Ok(None);
        };
        if !notification_gate(summary.kind, campaign.outcome) {
            return Ok(None);
        }

        let author = self
            .users
            .user_information(guild_id, campaign.subject.id)
            .await?;
        let bold_name = format!(
            "**{}#{}**",
            campaign.subject.username, campaign.subject.discriminator
        );
        let bold_role = format!("**<@&{}>**", campaign.target_role.id);

        Ok(Some(PromotionNotification {
            title: "The campaign is over!".to_string(),
            description: format!(
                "Staff accepted the campaign, and {bold_name} was promoted to {bold_role}! \u{1F389}"
            ),
            author,
            footer_text: "See more at https://mod.gg/promotions".to_string(),
        }))
    }
}
