use std::collections::HashMap;

use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite};

/// 客户端本地保存的"已领取号码"，按活动区分。
/// 只用于让同一访客重复打开链接时拿到同一个号码，不能替代服务端的唯一性保证。
pub trait AssignmentCache {
    fn get(&self, event_id: &str) -> Option<u32>;
    fn set(&mut self, event_id: &str, number: u32);
}

const KEY_PREFIX: &str = "raffle_number_";

/// 缓存键: `raffle_number_<eventId>`
pub fn cache_key(event_id: &str) -> String {
    format!("{KEY_PREFIX}{event_id}")
}

#[derive(Debug, Default, Clone)]
pub struct MemoryAssignmentCache {
    entries: HashMap<String, u32>,
}

impl MemoryAssignmentCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssignmentCache for MemoryAssignmentCache {
    fn get(&self, event_id: &str) -> Option<u32> {
        self.entries.get(&cache_key(event_id)).copied()
    }

    fn set(&mut self, event_id: &str, number: u32) {
        self.entries.insert(cache_key(event_id), number);
    }
}

/// 基于 Cookie 的缓存：请求中读取已有号码，新分配的号码通过 Set-Cookie 写回浏览器
#[derive(Debug, Default)]
pub struct CookieAssignmentCache {
    saved: HashMap<String, u32>,
    pending: Vec<(String, u32)>,
    cross_site: bool,
}

impl CookieAssignmentCache {
    pub fn from_request(req: &HttpRequest) -> Self {
        let mut saved = HashMap::new();
        match req.cookies() {
            Ok(cookies) => {
                for cookie in cookies.iter() {
                    if !cookie.name().starts_with(KEY_PREFIX) {
                        continue;
                    }
                    // 被篡改或损坏的值直接忽略，视同未领取
                    if let Ok(number) = cookie.value().parse::<u32>() {
                        saved.insert(cookie.name().to_string(), number);
                    }
                }
            }
            Err(e) => log::warn!("Failed to parse request cookies: {e}"),
        }
        Self {
            saved,
            pending: Vec::new(),
            cross_site: false,
        }
    }

    /// 前端与 API 跨站时，浏览器只保存并回传 `SameSite=None; Secure` 的 Cookie
    pub fn cross_site(mut self, enabled: bool) -> Self {
        self.cross_site = enabled;
        self
    }

    /// 本次请求中新写入的号码，对应的 Set-Cookie
    pub fn cookies(&self) -> impl Iterator<Item = Cookie<'static>> + '_ {
        let same_site = if self.cross_site {
            SameSite::None
        } else {
            SameSite::Lax
        };
        let secure = self.cross_site;
        self.pending.iter().map(move |(key, number)| {
            Cookie::build(key.clone(), number.to_string())
                .path("/")
                .http_only(true)
                .same_site(same_site)
                .secure(secure)
                .permanent()
                .finish()
        })
    }
}

impl AssignmentCache for CookieAssignmentCache {
    fn get(&self, event_id: &str) -> Option<u32> {
        self.saved.get(&cache_key(event_id)).copied()
    }

    fn set(&mut self, event_id: &str, number: u32) {
        let key = cache_key(event_id);
        self.saved.insert(key.clone(), number);
        self.pending.push((key, number));
    }
}
