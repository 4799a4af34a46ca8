pub mod config;
pub mod preview;

use skyform_config::StackConfig;
use std::path::PathBuf;

/// スタック設定とその読み込み元
pub struct LoadedStack {
    pub name: String,
    pub path: PathBuf,
    pub config: StackConfig,
}

/// スタック名を決定し、設定ファイルを読み込む
pub fn load_stack(stack: Option<String>) -> anyhow::Result<LoadedStack> {
    let name = stack.ok_or_else(|| {
        anyhow::anyhow!("スタック名を指定してください: skyform <command> <stack> または SKYFORM_STACK=<stack>")
    })?;

    let path = skyform_config::find_stack_file(&name)?;
    let config = skyform_config::load_stack_from(&path)?;
    tracing::debug!(stack = %name, path = %path.display(), "Loaded stack file");

    Ok(LoadedStack { name, path, config })
}

pub fn home_dir() -> anyhow::Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("ホームディレクトリが見つかりません"))
}
