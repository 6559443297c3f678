/// Zero-width space inserted after `@` to defuse mass-mention tokens.
const MENTION_BREAK: &str = "@\u{200B}";

/// Neutralizes `@everyone` and `@here` in text destined for a chat channel.
///
/// Error reasons can echo user-controlled input, so every reply the runtime
/// sends on a failure path goes through this first.
pub fn sanitize_everyone(text: &str) -> String {
    text.replace("@everyone", &format!("{MENTION_BREAK}everyone"))
        .replace("@here", &format!("{MENTION_BREAK}here"))
}
