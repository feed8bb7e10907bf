use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

use crate::error::{AppError, AppResult};
use crate::models::DEFAULT_EVENT_ID;

const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 6;
pub const MAX_EVENT_ID_LEN: usize = 64;

fn event_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid event id pattern"))
}

/// 校验活动ID：URL 安全、长度不超过 64；缺失或空串回退为默认活动。
/// 活动ID按原样比较，前后空白同样视为非法字符。
pub fn normalize_event_id(raw: Option<&str>) -> AppResult<String> {
    let event_id = match raw {
        None | Some("") => return Ok(DEFAULT_EVENT_ID.to_string()),
        Some(id) => id,
    };
    if event_id.len() > MAX_EVENT_ID_LEN || !event_id_pattern().is_match(event_id) {
        return Err(AppError::ValidationError(format!(
            "Invalid event id: {event_id}"
        )));
    }
    Ok(event_id.to_string())
}

/// 解析链接中的 range 参数，缺失、非数字或 <= 0 时使用默认值
pub fn parse_range(raw: Option<&str>, default_range: u32) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(default_range)
}

/// 项目名称转为 URL 安全的 slug：小写、空白替换为 '-'，其余非法字符丢弃
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.trim().chars() {
        if c.is_whitespace() {
            pending_dash = !slug.is_empty();
            continue;
        }
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.push(c.to_ascii_lowercase());
        }
    }
    slug
}

/// 生成活动ID: `<slug>-<6位大写字母数字>`
pub fn generate_event_id(project_name: &str) -> AppResult<String> {
    // 预留后缀长度，保证整体不超过上限
    let max_slug = MAX_EVENT_ID_LEN - SUFFIX_LEN - 1;
    let slug: String = slugify(project_name).chars().take(max_slug).collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        return Err(AppError::ValidationError(
            "Project name must contain at least one letter or digit".to_string(),
        ));
    }
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();
    Ok(format!("{slug}-{suffix}"))
}

/// 可分享的活动链接: `<base-url>/visitor/<eventId>?range=<range>`
pub fn campaign_link(base_url: &str, event_id: &str, range: u32) -> String {
    format!(
        "{}/visitor/{}?range={}",
        base_url.trim_end_matches('/'),
        event_id,
        range
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_event_id() {
        assert_eq!(normalize_event_id(None).unwrap(), "default");
        assert_eq!(normalize_event_id(Some("")).unwrap(), "default");
        assert_eq!(
            normalize_event_id(Some("demo-ABC123")).unwrap(),
            "demo-ABC123"
        );
        assert!(normalize_event_id(Some("demo/ABC")).is_err());
        assert!(normalize_event_id(Some("événement")).is_err());
        assert!(normalize_event_id(Some(&"a".repeat(65))).is_err());
    }

    #[test]
    fn test_event_id_is_not_trimmed() {
        assert!(normalize_event_id(Some(" demo")).is_err());
        assert!(normalize_event_id(Some("demo ")).is_err());
        assert!(normalize_event_id(Some("  ")).is_err());
    }

    #[test]
    fn test_parse_range_defaults() {
        assert_eq!(parse_range(Some("300"), 100), 300);
        assert_eq!(parse_range(None, 100), 100);
        assert_eq!(parse_range(Some("abc"), 100), 100);
        assert_eq!(parse_range(Some("0"), 100), 100);
        assert_eq!(parse_range(Some("-5"), 100), 100);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Spring Fair  2025"), "spring-fair-2025");
        assert_eq!(slugify("  Demo!  "), "demo");
        assert_eq!(slugify("حفلة"), "");
    }

    #[test]
    fn test_generate_event_id_format() {
        let id = generate_event_id("Spring Fair").unwrap();
        let (slug, suffix) = id.rsplit_once('-').unwrap();
        assert_eq!(slug, "spring-fair");
        assert_eq!(suffix.len(), 6);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert!(normalize_event_id(Some(&id)).is_ok());

        assert!(generate_event_id("!!!").is_err());
        assert!(generate_event_id(&"x".repeat(200)).unwrap().len() <= MAX_EVENT_ID_LEN);
    }

    #[test]
    fn test_campaign_link() {
        assert_eq!(
            campaign_link("https://raffle.example.com/", "demo-ABC123", 200),
            "https://raffle.example.com/visitor/demo-ABC123?range=200"
        );
    }
}
