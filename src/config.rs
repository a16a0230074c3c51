use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub support: SupportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

/// 模拟支付网关配置, checkout_base_url 是前端收银台页面地址
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub checkout_base_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            checkout_base_url: "http://localhost:3000/checkout".to_string(),
        }
    }
}

/// 支持金额的服务端校验边界(美分)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportConfig {
    pub min_amount_cents: i64,
    pub max_amount_cents: i64,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            min_amount_cents: 100,        // $1
            max_amount_cents: 1_000_000,  // $10,000
        }
    }
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                // 有配置文件：先解析再用环境变量覆盖
                toml::from_str(&config_str).context("解析配置文件失败")?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 无配置文件：使用环境变量与默认值构建
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .context("缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                        refresh_token_expires_in: get_env_parse(
                            "JWT_REFRESH_EXPIRES_IN",
                            2_592_000i64,
                        ),
                    },
                    gateway: GatewayConfig {
                        checkout_base_url: get_env("GATEWAY_CHECKOUT_BASE_URL")
                            .unwrap_or_else(|| GatewayConfig::default().checkout_base_url),
                    },
                    support: SupportConfig {
                        min_amount_cents: get_env_parse(
                            "SUPPORT_MIN_AMOUNT_CENTS",
                            SupportConfig::default().min_amount_cents,
                        ),
                        max_amount_cents: get_env_parse(
                            "SUPPORT_MAX_AMOUNT_CENTS",
                            SupportConfig::default().max_amount_cents,
                        ),
                    },
                }
            }
            Err(e) => {
                return Err(anyhow::anyhow!("无法读取配置文件 {config_path}: {e}"));
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.refresh_token_expires_in = n;
        }
        if let Ok(v) = env::var("GATEWAY_CHECKOUT_BASE_URL") {
            config.gateway.checkout_base_url = v;
        }
        if let Ok(v) = env::var("SUPPORT_MIN_AMOUNT_CENTS")
            && let Ok(n) = v.parse()
        {
            config.support.min_amount_cents = n;
        }
        if let Ok(v) = env::var("SUPPORT_MAX_AMOUNT_CENTS")
            && let Ok(n) = v.parse()
        {
            config.support.max_amount_cents = n;
        }

        Ok(config)
    }
}
