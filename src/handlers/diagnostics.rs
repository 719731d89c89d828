use tower_cookies::Cookies;

/// Logs the cookies the client sent and answers `ok`.
pub async fn test_cookies(cookies: Cookies) -> &'static str {
    let names: Vec<String> = cookies
        .list()
        .iter()
        .map(|cookie| cookie.name().to_string())
        .collect();
    tracing::info!("🍪 Cookies received: {:?}", names);
    "ok"
}
