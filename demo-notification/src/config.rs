use std::env;

const DEFAULT_LISTEN_HOST: &str = "127.0.0.1";
const DEFAULT_LISTEN_PORT: u16 = 2345;

pub(crate) struct ListenConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
}

impl ListenConfig {
    /// Read after `BridgeConfig::from_env`, so values from `.env` files apply.
    pub(crate) fn from_env() -> Result<Self, String> {
        let host = env::var("NOTIFICATION_SERVER_LISTEN_HOST")
            .ok()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_LISTEN_HOST.to_string());

        let port = match env::var("NOTIFICATION_SERVER_LISTEN_PORT") {
            Ok(port) if !port.is_empty() => port
                .parse()
                .map_err(|_| format!("Invalid NOTIFICATION_SERVER_LISTEN_PORT: {port:?}"))?,
            _ => DEFAULT_LISTEN_PORT,
        };

        Ok(Self { host, port })
    }
}
