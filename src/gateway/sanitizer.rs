//! Redaction of upstream error bodies.

use std::sync::LazyLock;

use regex::Regex;

/// `org-` plus exactly 24 alphanumerics, not inside a longer word.
static ORG_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)org-[a-zA-Z0-9]{24}(?-u:\b)").expect("Invalid organization id regex")
});

const ORG_ID_MASK: &str = "org-****************************";

/// Upstream's billing nag, removed together with its leading space.
pub const BILLING_NAG: &str = " Please add a payment method to your account to increase your rate limit. Visit https://platform.openai.com/account/billing to add a payment method.";

/// Mask organization ids and strip the billing sentence. Never fails.
pub fn sanitize(text: &str) -> String {
    ORG_ID_REGEX
        .replace_all(text, ORG_ID_MASK)
        .replace(BILLING_NAG, "")
}
