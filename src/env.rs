//! Environment variable configuration
//!
//! Every variable is a type implementing [`EnvVar`], which knows its name,
//! its default and how to validate a raw value. Command-line flags take
//! precedence over these.

use std::env;

use thiserror::Error;

/// A variable that is set but holds an unusable value
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Environment variable '{variable}': {message}")]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

pub type EnvResult<T> = Result<T, EnvError>;

/// Typed access to a single environment variable
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }
}

/// Logging
pub mod logging {
    use super::*;

    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "PAGESNAP_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // Any non-empty value disables colors, as per the NO_COLOR convention
            Ok(!value.is_empty())
        }
    }
}

/// Retrieval of the page and its stylesheets
pub mod network {
    use super::*;

    pub struct Jobs;
    impl EnvVar<usize> for Jobs {
        const NAME: &'static str = "PAGESNAP_JOBS";
        const DEFAULT: Option<usize> = Some(crate::relocator::DEFAULT_JOBS);
        const DESCRIPTION: &'static str = "Number of stylesheets fetched in parallel";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 64)
        }
    }

    pub struct Timeout;
    impl EnvVar<u64> for Timeout {
        const NAME: &'static str = "PAGESNAP_TIMEOUT";
        const DEFAULT: Option<u64> = Some(crate::network::session::DEFAULT_TIMEOUT);
        const DESCRIPTION: &'static str = "Request timeout in seconds (0 disables it)";

        fn parse(value: &str) -> EnvResult<u64> {
            value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid number of seconds".to_string(),
            })
        }
    }

    pub struct UserAgent;
    impl EnvVar<String> for UserAgent {
        const NAME: &'static str = "PAGESNAP_USER_AGENT";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "User-Agent header sent with every request";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::network::session::DEFAULT_USER_AGENT.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let user_agent = value.trim();
            if user_agent.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "User agent cannot be empty".to_string(),
                });
            }
            Ok(user_agent.to_string())
        }
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

/// Every setting read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub log_level: String,
    pub no_color: bool,
    pub jobs: usize,
    pub timeout: u64,
    pub user_agent: String,
}

impl EnvConfig {
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: logging::LogLevel::get()?,
            no_color: logging::NoColor::get()?,
            jobs: network::Jobs::get()?,
            timeout: network::Timeout::get()?,
            user_agent: network::UserAgent::get()?,
        })
    }
}

/// Lists every recognized variable in Markdown
pub fn generate_env_docs() -> String {
    let entries = [
        (
            logging::LogLevel::NAME,
            logging::LogLevel::DESCRIPTION,
            "info".to_string(),
        ),
        (
            logging::NoColor::NAME,
            logging::NoColor::DESCRIPTION,
            "unset".to_string(),
        ),
        (
            network::Jobs::NAME,
            network::Jobs::DESCRIPTION,
            crate::relocator::DEFAULT_JOBS.to_string(),
        ),
        (
            network::Timeout::NAME,
            network::Timeout::DESCRIPTION,
            crate::network::session::DEFAULT_TIMEOUT.to_string(),
        ),
        (
            network::UserAgent::NAME,
            network::UserAgent::DESCRIPTION,
            "a desktop Firefox user agent".to_string(),
        ),
    ];

    let mut docs = String::from("# Environment Variables\n\n");
    for (name, description, default) in entries {
        docs.push_str(&format!("- `{}`: {} (default: {})\n", name, description, default));
    }
    docs
}
