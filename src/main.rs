use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use pr_snapshot::utils::logging;
use pr_snapshot::{App, Config};

/// GitHub PR 截图工具：逐个整页截图并生成 PDF
#[derive(Debug, Parser)]
#[command(name = "pr-snapshot", version)]
struct Cli {
    /// PR 列表 CSV 文件（默认使用配置中的 input_file）
    input: Option<PathBuf>,

    /// 配置文件路径
    #[arg(long)]
    config: Option<PathBuf>,

    /// 无头模式运行浏览器
    #[arg(long)]
    headless: bool,

    /// 不截图，只把已有截图转成 PDF
    #[arg(long)]
    pdf_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.headless {
        config.headless = true;
    }
    let input = cli.input.unwrap_or_else(|| config.input_file.clone());

    let app = App::new(config);

    if cli.pdf_only {
        app.assemble_documents().await?;
        return Ok(());
    }

    app.run(&input).await?;

    Ok(())
}
