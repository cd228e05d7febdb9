// Credentials handling: locate and parse the auth file. The resulting
// `Credentials` value is handed to `ApiClient` once and never re-read.
//
// The file is INI style:
//
//     [credentials]
//     user_id = 5f1c0b1e-0000-4000-8000-000000000000
//     api_token = 0a1b2c3d-0000-4000-8000-000000000000
//
// Values may be bare or quoted; `key: value` is accepted as well, and lines
// starting with `#` or `;` are comments.

use crate::config::hopla_config_dir;
use crate::error::{HoplaError, Result};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const AUTH_FILE_ENV: &str = "HOPLA_AUTH_FILE";
pub const AUTH_FILE_NAME: &str = "auth.conf";

const SECTION: &str = "credentials";

/// Habitica user id and API token, sent as `x-api-user` / `x-api-key`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub api_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Parse the `[credentials]` section out of an auth file's content.
    pub fn parse(content: &str) -> Result<Self> {
        let values = section_values(content, SECTION)?
            .ok_or_else(|| HoplaError::Credentials("no [credentials] section".into()))?;

        let field = |key: &str| -> Result<String> {
            match values.get(key) {
                Some(v) if !v.is_empty() => Ok(v.clone()),
                Some(_) => Err(HoplaError::Credentials(format!("{} is empty", key))),
                None => Err(HoplaError::Credentials(format!("{} is missing", key))),
            }
        };
        Ok(Credentials {
            user_id: field("user_id")?,
            api_token: field("api_token")?,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(HoplaError::Credentials(format!(
                "no credentials found; create {} with a [credentials] section \
                 containing user_id and api_token",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| HoplaError::Credentials(format!("{}: {}", path.display(), e)))
    }
}

/// Key/value pairs of one INI section, or `None` when the section is absent.
/// Later duplicates of a key win.
fn section_values(content: &str, wanted: &str) -> Result<Option<HashMap<String, String>>> {
    let mut current: Option<&str> = None;
    let mut found: Option<HashMap<String, String>> = None;

    for (n, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(rest) = line.strip_prefix('[') {
            let name = rest.strip_suffix(']').ok_or_else(|| {
                HoplaError::Credentials(format!("line {}: unterminated section header", n + 1))
            })?;
            let name = name.trim();
            current = Some(name);
            if name == wanted && found.is_none() {
                found = Some(HashMap::new());
            }
            continue;
        }

        let (key, value) = line
            .split_once(['=', ':'])
            .ok_or_else(|| HoplaError::Credentials(format!("line {}: expected key = value", n + 1)))?;
        if current == Some(wanted) {
            if let Some(map) = found.as_mut() {
                map.insert(key.trim().to_string(), unquote(value.trim()).to_string());
            }
        }
    }
    Ok(found)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner.trim();
        }
    }
    value
}

/// `HOPLA_AUTH_FILE` wins over the default `<config dir>/hopla/auth.conf`.
pub fn auth_file(from_env: Option<PathBuf>) -> PathBuf {
    from_env.unwrap_or_else(|| hopla_config_dir().join(AUTH_FILE_NAME))
}

/// Resolve the auth file from the environment.
pub fn auth_file_from_env() -> PathBuf {
    let from_env = std::env::var_os(AUTH_FILE_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    auth_file(from_env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_unquoted_values() {
        let creds = Credentials::parse(
            "[credentials]\n\
             user_id = 5f1c0b1e-1111-4000-8000-000000000000\n\
             api_token = 0a1b2c3d-2222-4000-8000-000000000000\n",
        )
        .unwrap();
        assert_eq!(creds.user_id, "5f1c0b1e-1111-4000-8000-000000000000");
        assert_eq!(creds.api_token, "0a1b2c3d-2222-4000-8000-000000000000");
    }

    #[test]
    fn parses_quoted_values_and_colons() {
        let creds =
            Credentials::parse("[credentials]\nuser_id: \"abc-123\"\napi_token = ' secret '\n")
                .unwrap();
        assert_eq!(creds.user_id, "abc-123");
        assert_eq!(creds.api_token, "secret");
    }

    #[test]
    fn other_sections_and_comments_are_skipped() {
        let creds = Credentials::parse(
            "# written by hopla\n\
             [other]\n\
             user_id = wrong\n\
             \n\
             [credentials]\n\
             ; the id\n\
             user_id = right\n\
             api_token = t\n",
        )
        .unwrap();
        assert_eq!(creds.user_id, "right");
    }

    #[test]
    fn missing_section_is_an_error() {
        let err = Credentials::parse("[other]\nkey = 1\n").unwrap_err();
        assert!(err.to_string().contains("no [credentials] section"));
    }

    #[test]
    fn missing_or_blank_token_is_an_error() {
        let err = Credentials::parse("[credentials]\nuser_id = u\napi_token =   \n").unwrap_err();
        assert!(err.to_string().contains("api_token is empty"));

        let err = Credentials::parse("[credentials]\nuser_id = u\n").unwrap_err();
        assert!(err.to_string().contains("api_token is missing"));
    }

    #[test]
    fn garbage_line_is_an_error() {
        let err = Credentials::parse("[credentials]\nuser_id\n").unwrap_err();
        assert!(matches!(err, HoplaError::Credentials(_)));
    }

    #[test]
    fn debug_output_hides_the_token() {
        let creds = Credentials {
            user_id: "u".into(),
            api_token: "very-secret".into(),
        };
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("very-secret"));
        assert!(shown.contains("<redacted>"));
    }

    #[test]
    fn load_reports_missing_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(AUTH_FILE_NAME);
        let err = Credentials::load(&path).unwrap_err();
        assert!(err.to_string().contains("auth.conf"));
    }

    #[test]
    fn load_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[credentials]\nuser_id = u\napi_token = t").unwrap();
        let creds = Credentials::load(file.path()).unwrap();
        assert_eq!(creds.user_id, "u");
        assert_eq!(creds.api_token, "t");
    }

    #[test]
    fn env_override_takes_precedence() {
        let explicit = PathBuf::from("/etc/hopla/auth.conf");
        assert_eq!(auth_file(Some(explicit.clone())), explicit);
        assert!(auth_file(None).ends_with("hopla/auth.conf"));
    }
}
