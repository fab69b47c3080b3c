use std::sync::LazyLock;

use regex::Regex;
use shopinsight_core::{SocialHandles, SocialPlatform};

static SOCIAL_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?:https?:)?//(?:www\.|m\.|[a-z]{2}\.)?(instagram\.com|facebook\.com|fb\.com|twitter\.com|x\.com|tiktok\.com|youtube\.com|linkedin\.com|pinterest\.com)/([^\s"'<>?#\\]+)"#,
    )
    .expect("valid regex")
});

/// First path segments that are widgets or share links, not profiles.
const NON_PROFILE_SEGMENTS: &[&str] = &[
    "share",
    "sharer",
    "sharer.php",
    "sharearticle",
    "intent",
    "dialog",
    "plugins",
    "embed",
    "watch",
    "tr",
    "pin",
    "hashtag",
    "home",
];

fn platform_for(domain: &str) -> Option<SocialPlatform> {
    match domain {
        "instagram.com" => Some(SocialPlatform::Instagram),
        "facebook.com" | "fb.com" => Some(SocialPlatform::Facebook),
        "twitter.com" | "x.com" => Some(SocialPlatform::Twitter),
        "tiktok.com" => Some(SocialPlatform::Tiktok),
        "youtube.com" => Some(SocialPlatform::Youtube),
        "linkedin.com" => Some(SocialPlatform::Linkedin),
        "pinterest.com" => Some(SocialPlatform::Pinterest),
        _ => None,
    }
}

/// Profile URLs for known social platforms, scanning the raw markup in
/// document order. The first profile seen for a platform is kept.
#[must_use]
pub fn extract_social_handles(html: &str) -> SocialHandles {
    let mut handles = SocialHandles::new();
    for caps in SOCIAL_URL_RE.captures_iter(html) {
        let domain = caps[1].to_ascii_lowercase();
        let Some(platform) = platform_for(&domain) else {
            continue;
        };
        if handles.contains_key(&platform) {
            continue;
        }
        let path = caps[2].trim_end_matches('/');
        let first = path.split('/').next().unwrap_or_default().to_ascii_lowercase();
        if first.is_empty() || NON_PROFILE_SEGMENTS.contains(&first.as_str()) {
            continue;
        }
        handles.insert(platform, format!("https://{domain}/{path}"));
    }
    handles
}
