mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skyform")]
#[command(about = "ひとつの環境を、Alibaba Cloud に宣言する。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// トポロジーをプレビューエンジンで宣言し、計画を表示
    Preview {
        /// スタック名 (dev, stg, prod)
        stack: Option<String>,
        /// スタック名 (-s/--stack フラグ、SKYFORM_STACK 環境変数)
        #[arg(
            short = 's',
            long = "stack",
            env = "SKYFORM_STACK",
            conflicts_with = "stack",
            hide = true
        )]
        stack_flag: Option<String>,
        /// プレビューに使うゾーン（省略時は {region}-a, {region}-b）
        #[arg(long = "zone")]
        zones: Vec<String>,
        /// 計画をJSONで出力
        #[arg(long)]
        json: bool,
    },
    /// スタックの設定を表示（secretは伏せる）
    Config {
        /// スタック名 (dev, stg, prod)
        stack: Option<String>,
        /// スタック名 (-s/--stack フラグ、SKYFORM_STACK 環境変数)
        #[arg(
            short = 's',
            long = "stack",
            env = "SKYFORM_STACK",
            conflicts_with = "stack",
            hide = true
        )]
        stack_flag: Option<String>,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // ログはstderrに出力（stdoutは計画の出力に使う）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "エラー:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Preview {
            stack,
            stack_flag,
            zones,
            json,
        } => commands::preview::handle(stack.or(stack_flag), zones, json).await,
        Commands::Config { stack, stack_flag } => commands::config::handle(stack.or(stack_flag)),
        Commands::Version => {
            println!("skyform {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
