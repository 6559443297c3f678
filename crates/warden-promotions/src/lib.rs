//! Templated promotion-event renderer for the Warden moderation bot.
//!
//! Subscribes to promotion domain events and renders each into the guild's
//! designated channels: a fixed-template log entry, and a celebratory
//! notification gated on an accepted campaign close.

use chrono::{DateTime, Utc};

mod handler;
mod templates;
mod worker;

pub use handler::{
    notification_gate, AuthorRef, ChannelPurpose, DesignatedChannelRegistry, GuildUserLookup,
    PromotionDataService, PromotionLoggingHandler, PromotionNotification,
};
pub use templates::{log_template, render_template, RenderKey};
pub use worker::run_promotion_event_worker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Enumerates supported `PromotionActionKind` values.
pub enum PromotionActionKind {
    CampaignCreated,
    CommentCreated,
    CommentModified,
    CampaignClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Enumerates supported `PromotionSentiment` values.
pub enum PromotionSentiment {
    Abstain,
    Approve,
    Oppose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Enumerates supported `CampaignOutcome` values.
pub enum CampaignOutcome {
    Accepted,
    Rejected,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable record of a promotion state change, as published on the bus.
pub struct PromotionActionCreated {
    pub action_id: i64,
    pub guild_id: u64,
    pub kind: PromotionActionKind,
    pub sentiment: Option<PromotionSentiment>,
    pub outcome: Option<CampaignOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The user a campaign proposes to promote.
pub struct SubjectUser {
    pub id: u64,
    pub display_name: String,
    pub username: String,
    pub discriminator: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The role a campaign proposes to grant.
pub struct RoleRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One promotion campaign with its subject, target role, and outcome.
pub struct CampaignSummary {
    pub id: i64,
    pub subject: SubjectUser,
    pub target_role: RoleRef,
    pub outcome: Option<CampaignOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A comment left on a campaign, with the campaign it belongs to.
pub struct CommentSummary {
    pub sentiment: PromotionSentiment,
    pub content: String,
    pub campaign: CampaignSummary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Full immutable summary of one promotion action, resolved by the domain
/// data service for rendering.
///
/// Campaign-level actions carry `campaign`; comment actions carry
/// `new_comment` (whose campaign holds the identifying details).
pub struct PromotionActionSummary {
    pub created: DateTime<Utc>,
    pub kind: PromotionActionKind,
    pub campaign: Option<CampaignSummary>,
    pub new_comment: Option<CommentSummary>,
}

impl PromotionActionSummary {
    /// The campaign this action concerns, wherever it is attached.
    pub fn target_campaign(&self) -> Option<&CampaignSummary> {
        self.campaign
            .as_ref()
            .or_else(|| self.new_comment.as_ref().map(|comment| &comment.campaign))
    }
}
