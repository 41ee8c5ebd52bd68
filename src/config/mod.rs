use std::env;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub backend_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            backend_url: env::var("BACKEND_URL")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(3000),
            api_base_uri: env::var("API_BASE_URI")
                .map(|uri| normalize_base_uri(&uri))
                .unwrap_or_else(|_| "/console".into()),
        })
    }
}

// axum 的 nest 要求前缀以 / 开头且不以 / 结尾
fn normalize_base_uri(uri: &str) -> String {
    let trimmed = uri.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
