//! Configuration commands.

use std::path::Path;

use crate::config::StaysyncConfig;
use crate::error::CliResult;

/// Dump the effective configuration as TOML.
pub fn dump(config: &StaysyncConfig, path: &Path) -> CliResult<String> {
    let toml_str = config.to_toml()?;
    Ok(format!("# config.toml ({})\n{}", path.display(), toml_str.trim_end()))
}

/// Validate the configuration.
pub fn validate(config: &StaysyncConfig) -> CliResult<String> {
    config.validate()?;

    let mut lines = vec![format!("{} feed(s) configured.", config.feeds.len())];
    let policy = config.authorization_policy()?;
    if policy.is_empty() {
        lines.push("No allowed emails; every login will be refused.".to_string());
    } else {
        lines.push(format!("{} allowed email(s).", policy.len()));
    }
    lines.push("Configuration is valid.".to_string());
    Ok(lines.join("\n"))
}

/// Show the configuration and database paths.
pub fn path(config: &StaysyncConfig, path: &Path) -> String {
    format!(
        "config: {}\ndatabase: {}",
        path.display(),
        config.database_path().display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthSettings;
    use std::path::PathBuf;

    #[test]
    fn dump_starts_with_the_source_path() {
        let config = StaysyncConfig {
            default_room: Some("garden".to_string()),
            ..StaysyncConfig::default()
        };
        let text = dump(&config, Path::new("/etc/staysync.toml")).unwrap();

        assert!(text.starts_with("# config.toml (/etc/staysync.toml)\n"));
        assert!(text.contains("default_room = \"garden\""));
        let body = text.split_once('\n').unwrap().1;
        assert_eq!(StaysyncConfig::parse(body).unwrap(), config);
    }

    #[test]
    fn validate_reports_policy_size() {
        let config = StaysyncConfig {
            auth: AuthSettings {
                allowed_emails: vec!["Owner@Example.com".to_string()],
            },
            ..StaysyncConfig::default()
        };
        insta::assert_snapshot!(validate(&config).unwrap(), @r"
        0 feed(s) configured.
        1 allowed email(s).
        Configuration is valid.
        ");
    }

    #[test]
    fn validate_surfaces_errors() {
        let config = StaysyncConfig {
            fetch_timeout_secs: 0,
            ..StaysyncConfig::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn path_lists_both_files() {
        let config = StaysyncConfig {
            database_path: Some(PathBuf::from("/var/lib/staysync.db")),
            ..StaysyncConfig::default()
        };
        assert_eq!(
            path(&config, Path::new("/etc/staysync.toml")),
            "config: /etc/staysync.toml\ndatabase: /var/lib/staysync.db"
        );
    }
}
