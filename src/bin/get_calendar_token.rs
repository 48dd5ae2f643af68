use calendar_agent::components::google_calendar::{StoredToken, TokenManager};
use calendar_agent::config::Config;
use calendar_agent::error::{config_error, other_error, AgentResult};
use serde::Deserialize;
use url::Url;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const REDIRECT_URI: &str = "http://localhost:8080";
const SCOPE: &str = "https://www.googleapis.com/auth/calendar";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[tokio::main]
async fn main() -> AgentResult<()> {
    // Load configuration
    let config = Config::load()?;
    if config.google_client_id.is_empty() || config.google_client_secret.is_empty() {
        return Err(config_error(
            "GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET must be set",
        ));
    }

    let client = reqwest::Client::new();
    let token_manager = TokenManager::new(
        config.google_token_path.clone(),
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        client.clone(),
    );

    // Generate random state for security
    let state = uuid::Uuid::new_v4().to_string();

    let auth_url = Url::parse_with_params(
        AUTH_URL,
        &[
            ("client_id", config.google_client_id.as_str()),
            ("redirect_uri", REDIRECT_URI),
            ("response_type", "code"),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("scope", SCOPE),
            ("state", state.as_str()),
        ],
    )
    .map_err(|e| other_error(&format!("Failed to build authorization URL: {}", e)))?;

    println!("Opening browser for Google Calendar authorization...");
    if webbrowser::open(auth_url.as_str()).is_err() {
        println!("Open this URL in your browser:\n{}", auth_url);
    }

    // Start local server to receive the callback
    let server = tiny_http::Server::http("127.0.0.1:8080")
        .map_err(|e| other_error(&format!("Failed to start callback server: {}", e)))?;
    println!("Waiting for authorization callback...");

    let request = server.recv()?;
    let callback = Url::parse(REDIRECT_URI)
        .and_then(|base| base.join(request.url()))
        .map_err(|e| other_error(&format!("Invalid callback URL: {}", e)))?;

    let param = |name: &str| {
        callback
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    if param("state").as_deref() != Some(state.as_str()) {
        return Err(other_error("Authorization state mismatch"));
    }
    let code = param("code").ok_or_else(|| other_error("No authorization code found in callback"))?;

    // Exchange code for tokens
    let response = client
        .post(TOKEN_URL)
        .form(&[
            ("client_id", config.google_client_id.as_str()),
            ("client_secret", config.google_client_secret.as_str()),
            ("code", code.as_str()),
            ("redirect_uri", REDIRECT_URI),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        let error_text = response.text().await?;
        return Err(other_error(&format!("Failed to get token: {}", error_text)));
    }

    let token: TokenResponse = response.json().await?;
    let token = StoredToken {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at: Some(chrono::Utc::now().timestamp() + token.expires_in.unwrap_or(3600)),
    };
    token_manager.save(&token).await?;

    let response =
        tiny_http::Response::from_string("Authorization successful! You can close this window.");
    request.respond(response)?;

    println!("Token saved to {}", config.google_token_path);

    Ok(())
}
