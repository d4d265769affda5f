//! GitHub CLI 凭据检查 - 业务能力层
//!
//! 只用来提示用户；拿不到 token 不影响运行，浏览器里手动登录即可

use tokio::process::Command;
use tracing::{debug, info, warn};

/// 外部凭据提供者
pub struct CredentialProvider {
    program: String,
    args: Vec<String>,
}

impl CredentialProvider {
    /// `gh auth token`
    pub fn github_cli() -> Self {
        Self::with_command("gh", ["auth", "token"])
    }

    /// 使用自定义命令
    pub fn with_command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// 获取 token，命令不存在、失败或输出为空都返回 `None`
    pub async fn fetch_token(&self) -> Option<String> {
        let output = match Command::new(&self.program).args(&self.args).output().await {
            Ok(output) => output,
            Err(e) => {
                debug!("无法执行 {}: {}", self.program, e);
                return None;
            }
        };

        if !output.status.success() {
            debug!(
                "{} 退出码 {:?}: {}",
                self.program,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }

    /// 检查并记录认证状态
    pub async fn check(&self) -> bool {
        info!("GitHub CLI 认证确认中...");
        if self.fetch_token().await.is_some() {
            info!("✓ GitHub CLI 已认证\n");
            true
        } else {
            warn!("⚠ GitHub CLI 未认证，可以在浏览器中手动登录（gh auth login）\n");
            false
        }
    }
}

impl Default for CredentialProvider {
    fn default() -> Self {
        Self::github_cli()
    }
}
