pub mod error;
pub mod stack;

pub use error::*;
pub use stack::{ConfigValue, Namespace, StackConfig};

use std::path::{Path, PathBuf};

/// Project-wide defaults shared by every stack
pub const PROJECT_FILE: &str = "skyform.kdl";

/// skyformの設定ディレクトリを取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("skyform");

    Ok(config_dir)
}

fn stack_candidates(stack: &str) -> [String; 2] {
    [
        format!("skyform.{}.local.kdl", stack),
        format!("skyform.{}.kdl", stack),
    ]
}

/// スタックの設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 SKYFORM_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: skyform.{stack}.local.kdl, skyform.{stack}.kdl
/// 3. ./.skyform/ ディレクトリ内: 同様の順序
/// 4. ~/.config/skyform/skyform.{stack}.kdl (グローバル設定)
pub fn find_stack_file(stack: &str) -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var("SKYFORM_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    let candidates = stack_candidates(stack);

    // 2. カレントディレクトリで検索
    for filename in &candidates {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    // 3. ./.skyform/ ディレクトリで検索
    let skyform_dir = current_dir.join(".skyform");
    if skyform_dir.is_dir() {
        for filename in &candidates {
            let path = skyform_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    // 4. グローバル設定ファイル
    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join(format!("skyform.{}.kdl", stack));
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::StackFileNotFound(stack.to_string()))
}

/// スタック設定をロード
///
/// スタックファイルと同じディレクトリに `skyform.kdl` があれば、それを土台にして
/// スタックの値で上書きする。
pub fn load_stack(stack: &str) -> Result<StackConfig> {
    let path = find_stack_file(stack)?;
    load_stack_from(&path)
}

pub fn load_stack_from(path: &Path) -> Result<StackConfig> {
    let stack_config = StackConfig::load(path)?;

    let project_file = path.parent().map(|dir| dir.join(PROJECT_FILE));
    match project_file {
        Some(project_file) if project_file.exists() && project_file != path => {
            let mut config = StackConfig::load(&project_file)?;
            config.merge(stack_config);
            Ok(config)
        }
        _ => Ok(stack_config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_get_config_dir() {
        let result = get_config_dir();
        assert!(result.is_ok());
        assert!(result.unwrap().ends_with("skyform"));
    }

    #[test]
    #[serial]
    fn test_find_stack_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("skyform.dev.kdl"), "// test").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_stack_file("dev");
        assert!(result.is_ok());
        assert!(result.unwrap().ends_with("skyform.dev.kdl"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_stack_file_local_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("skyform.dev.kdl"), "// shared").unwrap();
        fs::write(temp_dir.path().join("skyform.dev.local.kdl"), "// local").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_stack_file("dev").unwrap();

        // skyform.dev.local.kdl が優先される
        assert!(result.ends_with("skyform.dev.local.kdl"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_stack_file_in_skyform_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        let skyform_dir = temp_dir.path().join(".skyform");
        fs::create_dir(&skyform_dir).unwrap();
        fs::write(skyform_dir.join("skyform.prod.kdl"), "// in skyform dir").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_stack_file("prod").unwrap();
        assert!(result.ends_with(".skyform/skyform.prod.kdl"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_stack_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.kdl");
        fs::write(&config_path, "// custom").unwrap();

        let result = temp_env::with_var("SKYFORM_CONFIG_PATH", Some(&config_path), || {
            find_stack_file("dev").unwrap()
        });
        assert_eq!(result, config_path);
    }

    #[test]
    #[serial]
    fn test_find_stack_file_env_var_missing_path_falls_through() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join("skyform.dev.kdl"), "// local").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_var(
            "SKYFORM_CONFIG_PATH",
            Some(temp_dir.path().join("missing.kdl")),
            || find_stack_file("dev").unwrap(),
        );
        assert!(result.ends_with("skyform.dev.kdl"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_stack_file_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_stack_file("no-such-stack-for-tests");
        assert!(matches!(result, Err(ConfigError::StackFileNotFound(_))));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    fn test_load_stack_merges_project_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join(PROJECT_FILE),
            r#"
            project "zadig-infra"
            config "koderover" {
                org "acme"
                timezone "Asia/Shanghai"
            }
            "#,
        )
        .unwrap();
        let stack_path = temp_dir.path().join("skyform.dev.kdl");
        fs::write(
            &stack_path,
            r#"
            config "koderover" {
                timezone "UTC"
            }
            "#,
        )
        .unwrap();

        let config = load_stack_from(&stack_path).unwrap();
        let ns = config.namespace("koderover");
        assert_eq!(config.project(), Some("zadig-infra"));
        assert_eq!(ns.get("org"), Some("acme"));
        assert_eq!(ns.get("timezone"), Some("UTC"));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = load_stack_from(&temp_dir.path().join("skyform.none.kdl"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
