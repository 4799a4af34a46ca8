use super::load_stack;
use colored::Colorize;
use skyform_cloud::REDACTED;
use skyform_config::ConfigValue;

/// 解決済みの設定を表示（secretは伏せる）
pub fn handle(stack: Option<String>) -> anyhow::Result<()> {
    let loaded = load_stack(stack)?;

    println!("設定ファイル: {}", loaded.path.display().to_string().cyan());
    if let Some(project) = loaded.config.project() {
        println!("プロジェクト: {}", project.cyan());
    }
    println!();

    if loaded.config.is_empty() {
        println!("{}", "設定値はありません".dimmed());
        return Ok(());
    }

    println!("{}", format!("{:<32} {:<40}", "KEY", "VALUE").bold());
    println!("{}", "─".repeat(72).dimmed());
    for (key, value) in loaded.config.iter() {
        match value {
            ConfigValue::Plain(v) => println!("{:<32} {:<40}", key, v),
            ConfigValue::Secret(_) => println!("{:<32} {:<40}", key, REDACTED.yellow()),
        }
    }

    Ok(())
}
