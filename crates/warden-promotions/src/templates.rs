//! Static log-entry template table and slot substitution.
//!
//! Template wording is load-bearing: existing consumers of the promotion log
//! channel parse these strings, so every entry must be reproduced exactly.

use warden_core::render_clock;

use crate::{
    CampaignOutcome, PromotionActionKind, PromotionActionSummary, PromotionSentiment,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Exact-match discriminant selecting a log template for one action.
///
/// Two actions with equal keys always resolve to the same template.
pub struct RenderKey {
    pub kind: PromotionActionKind,
    pub sentiment: Option<PromotionSentiment>,
    pub outcome: Option<CampaignOutcome>,
}

impl RenderKey {
    /// Sentiment comes from the newest comment, outcome from the campaign.
    pub fn from_summary(summary: &PromotionActionSummary) -> Self {
        Self {
            kind: summary.kind,
            sentiment: summary.new_comment.as_ref().map(|comment| comment.sentiment),
            outcome: summary
                .campaign
                .as_ref()
                .and_then(|campaign| campaign.outcome),
        }
    }
}

/// Looks up the log template for a render key.
///
/// `None` means "this action kind produces no log entry" and is a silent
/// skip for the caller, never an error.
pub fn log_template(key: &RenderKey) -> Option<&'static str> {
    use CampaignOutcome::{Accepted, Failed, Rejected};
    use PromotionActionKind::{CampaignClosed, CampaignCreated, CommentCreated, CommentModified};
    use PromotionSentiment::{Abstain, Approve, Oppose};

    match (key.kind, key.sentiment, key.outcome) {
        (CampaignCreated, None, None) => Some("`[{0}]` A campaign (`{1}`) was created to promote **{2}** (`{3}`) to **{4}** (`{5}`)."),
        (CommentCreated, Some(Abstain), None) => Some("`[{0}]` A comment was added to the campaign (`{6}`) to promote **{7}** (`{8}`) to **{9}** (`{10}`), abstaining from the campaign. ```{11}```"),
        (CommentCreated, Some(Approve), None) => Some("`[{0}]` A comment was added to the campaign (`{6}`) to promote **{7}** (`{8}`) to **{9}** (`{10}`), approving of the promotion. ```{11}```"),
        (CommentCreated, Some(Oppose), None) => Some("`[{0}]` A comment was added to the campaign (`{6}`) to promote **{7}** (`{8}`) to **{9}** (`{10}`), opposing the promotion. ```{11}```"),
        (CommentModified, Some(Abstain), None) => Some("`[{0}]` A comment was modified in the campaign (`{6}`) to promote **{7}** (`{8}`) to **{9}** (`{10}`), abstaining from the campaign. ```{11}```"),
        (CommentModified, Some(Approve), None) => Some("`[{0}]` A comment was modified in the campaign (`{6}`) to promote **{7}** (`{8}`) to **{9}** (`{10}`), approving of the promotion. ```{11}```"),
        (CommentModified, Some(Oppose), None) => Some("`[{0}]` A comment was modified in the campaign (`{6}`) to promote **{7}** (`{8}`) to **{9}** (`{10}`), opposing the promotion. ```{11}```"),
        (CampaignClosed, None, Some(Accepted)) => Some("`[{0}]` The campaign (`{1}`) to promote **{2}** (`{3}`) to **{4}** (`{5}`) was accepted."),
        (CampaignClosed, None, Some(Rejected)) => Some("`[{0}]` The campaign (`{1}`) to promote **{2}** (`{3}`) to **{4}** (`{5}`) was rejected."),
        (CampaignClosed, None, Some(Failed)) => Some("`[{0}]` The campaign (`{1}`) to promote **{2}** (`{3}`) to **{4}** (`{5}`) failed to process."),
        _ => None,
    }
}

/// Substitutes positional `{N}` markers with the matching slot value.
/// Markers outside the slot range and lone braces pass through literally.
pub fn render_template(template: &str, slots: &[String; 12]) -> String {
    let mut output = String::with_capacity(template.len() + 32);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        if let Some(close) = after.find('}') {
            if let Ok(index) = after[..close].parse::<usize>() {
                if index < slots.len() {
                    output.push_str(&slots[index]);
                    rest = &after[close + 1..];
                    continue;
                }
            }
        }
        output.push('{');
        rest = after;
    }
    output.push_str(rest);
    output
}

/// Renders the log entry for an action, or `None` when its render key has
/// no template.
pub(crate) fn format_log_entry(summary: &PromotionActionSummary) -> Option<String> {
    let template = log_template(&RenderKey::from_summary(summary))?;
    Some(render_template(template, &log_slots(summary)))
}

/// Builds the 12 positional slots. Slots 1-5 describe the campaign on
/// campaign-level actions; slots 6-11 describe the comment variant.
/// Unpopulated slots render as empty strings.
fn log_slots(summary: &PromotionActionSummary) -> [String; 12] {
    let mut slots: [String; 12] = Default::default();
    slots[0] = render_clock(summary.created);
    if let Some(campaign) = &summary.campaign {
        slots[1] = campaign.id.to_string();
        slots[2] = campaign.subject.display_name.clone();
        slots[3] = campaign.subject.id.to_string();
        slots[4] = campaign.target_role.name.clone();
        slots[5] = campaign.target_role.id.to_string();
    }
    if let Some(comment) = &summary.new_comment {
        slots[6] = comment.campaign.id.to_string();
        slots[7] = comment.campaign.subject.display_name.clone();
        slots[8] = comment.campaign.subject.id.to_string();
        slots[9] = comment.campaign.target_role.name.clone();
        slots[10] = comment.campaign.target_role.id.to_string();
        slots[11] = comment.content.clone();
    }
    slots
}
