use std::{env, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use log::LevelFilter;

const DATA_DIR_VAR: &str = "TIMETALLY_DATA_DIR";
const API_URL_VAR: &str = "TIMETALLY_API_URL";
const TAGS_VAR: &str = "TIMETALLY_TAGS";
const LOG_VAR: &str = "TIMETALLY_LOG";

/// 環境変数から読み込むアプリケーションの設定。
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `LocalStore`の保存先ディレクトリ。
    ///
    /// REST APIを利用し、明示的に指定されていない場合は`None`になる。
    pub data_dir: Option<PathBuf>,
    /// 設定されている場合は`RemoteStore`を利用する。
    pub api_url: Option<String>,
    /// 追加で登録するタグ名。
    pub custom_tags: Vec<String>,
    pub log_level: LevelFilter,
}

impl Config {
    /// 環境変数から設定を読み込む。
    ///
    /// * `TIMETALLY_DATA_DIR` - 保存先ディレクトリ(既定値はOSのデータディレクトリ配下の`timetally`)
    /// * `TIMETALLY_API_URL` - REST APIのURL
    /// * `TIMETALLY_TAGS` - カンマ区切りのタグ名
    /// * `TIMETALLY_LOG` - ログレベル(既定値は`info`)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の取得関数から設定を読み込む。
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = value(API_URL_VAR).map(|url| url.trim().to_string());
        let data_dir = match value(DATA_DIR_VAR) {
            Some(dir) => Some(PathBuf::from(dir)),
            None if api_url.is_some() => None,
            None => Some(
                dirs::data_dir()
                    .context("Failed to find the data directory")?
                    .join(env!("CARGO_PKG_NAME")),
            ),
        };
        let custom_tags = value(TAGS_VAR)
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        let log_level = match value(LOG_VAR) {
            Some(level) => LevelFilter::from_str(level.trim())
                .ok()
                .with_context(|| format!("Invalid {}: {}", LOG_VAR, level))?,
            None => LevelFilter::Info,
        };

        Ok(Self {
            data_dir,
            api_url,
            custom_tags,
            log_level,
        })
    }

    /// `LocalStore`のファイルパスを返す。
    pub fn entries_path(&self) -> Result<PathBuf> {
        let data_dir = self
            .data_dir
            .as_ref()
            .with_context(|| format!("{} is not set", DATA_DIR_VAR))?;

        Ok(data_dir.join("entries.json"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use log::LevelFilter;

    use super::Config;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    /// 全ての環境変数を設定した場合を確認する。
    #[test]
    fn test_from_lookup() {
        let config = Config::from_lookup(lookup(&[
            ("TIMETALLY_DATA_DIR", "/tmp/timetally"),
            ("TIMETALLY_API_URL", " http://localhost:8001 "),
            ("TIMETALLY_TAGS", "Gym, Reading,,"),
            ("TIMETALLY_LOG", "debug"),
        ]))
        .unwrap();

        assert_eq!(
            config,
            Config {
                data_dir: Some(PathBuf::from("/tmp/timetally")),
                api_url: Some("http://localhost:8001".to_string()),
                custom_tags: vec!["Gym".to_string(), "Reading".to_string()],
                log_level: LevelFilter::Debug,
            }
        );
        assert_eq!(
            config.entries_path().unwrap(),
            PathBuf::from("/tmp/timetally/entries.json")
        );
    }

    /// 空の値は未設定として扱うことを確認する。
    #[test]
    fn test_from_lookup_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("TIMETALLY_DATA_DIR", "/tmp/timetally"),
            ("TIMETALLY_API_URL", ""),
        ]))
        .unwrap();

        assert_eq!(config.api_url, None);
        assert!(config.custom_tags.is_empty());
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    /// REST APIを利用する場合は保存先ディレクトリを解決しないことを確認する。
    #[test]
    fn test_from_lookup_api_url_without_data_dir() {
        let config =
            Config::from_lookup(lookup(&[("TIMETALLY_API_URL", "http://localhost:8001")]))
                .unwrap();

        assert_eq!(config.api_url, Some("http://localhost:8001".to_string()));
        assert_eq!(config.data_dir, None);
        assert!(config.entries_path().is_err());
    }

    #[test]
    fn test_from_lookup_invalid_log_level() {
        let result = Config::from_lookup(lookup(&[
            ("TIMETALLY_DATA_DIR", "/tmp/timetally"),
            ("TIMETALLY_LOG", "loud"),
        ]));

        assert!(result.is_err());
    }
}
