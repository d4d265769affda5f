//! 登录会话管理 - 业务能力层
//!
//! 状态流转：
//!
//! ```text
//! Unchecked → CheckingLogin → Authenticated
//!                   ↓
//!             AwaitingHuman → Authenticated | AuthFailed
//! ```
//!
//! `AwaitingHuman` 是唯一的人工介入点：等待终端输入一行后重新检查。

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::SessionError;
use crate::infrastructure::{BrowsingContext, PageDriver};

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unchecked,
    CheckingLogin,
    AwaitingHuman,
    Authenticated,
    AuthFailed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Authenticated | SessionState::AuthFailed)
    }
}

/// 人工登录确认
#[async_trait]
pub trait LoginPrompt: Send + Sync {
    /// 阻塞直到用户确认已经登录
    async fn wait_for_login(&self) -> std::io::Result<()>;
}

/// 从终端读取一行作为确认信号
pub struct TerminalPrompt;

#[async_trait]
impl LoginPrompt for TerminalPrompt {
    async fn wait_for_login(&self) -> std::io::Result<()> {
        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        Ok(())
    }
}

/// 会话管理器
pub struct SessionManager {
    login_url: String,
    check_timeout: Duration,
    state: SessionState,
}

impl SessionManager {
    pub fn new(config: &Config) -> Self {
        Self::with_login_url(config.login_url(), config.login_check_timeout())
    }

    pub fn with_login_url(login_url: impl Into<String>, check_timeout: Duration) -> Self {
        Self {
            login_url: login_url.into(),
            check_timeout,
            state: SessionState::Unchecked,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 确认浏览上下文已登录
    ///
    /// 检查用的标签页无论结果如何都会关闭；浏览器本身由调用方负责关闭
    pub async fn establish<C: BrowsingContext>(
        &mut self,
        context: &C,
        prompt: &dyn LoginPrompt,
    ) -> Result<(), SessionError> {
        info!("GitHub 认证状态确认中...");
        self.transition(SessionState::CheckingLogin);

        let page = match context.new_page().await {
            Ok(page) => page,
            Err(e) => {
                self.transition(SessionState::AuthFailed);
                return Err(e.into());
            }
        };

        let outcome = self.check_on_page(&page, prompt).await;

        if let Err(e) = page.close().await {
            warn!("关闭检查页面失败: {}", e);
        }

        match &outcome {
            Ok(()) => self.transition(SessionState::Authenticated),
            Err(_) => self.transition(SessionState::AuthFailed),
        }
        outcome
    }

    async fn check_on_page<P: PageDriver>(
        &mut self,
        page: &P,
        prompt: &dyn LoginPrompt,
    ) -> Result<(), SessionError> {
        page.goto(&self.login_url, self.check_timeout).await?;

        // 已登录时访问 /login 会被重定向
        if is_logged_in(page).await? {
            info!("✓ GitHub 已认证\n");
            return Ok(());
        }

        self.transition(SessionState::AwaitingHuman);
        warn!("\n⚠ 需要登录 GitHub");
        warn!("请在打开的浏览器中登录 GitHub");
        warn!("登录完成后按 Enter 键继续...\n");

        prompt.wait_for_login().await?;

        page.reload(self.check_timeout).await?;
        if is_logged_in(page).await? {
            info!("✓ 登录确认完成\n");
            Ok(())
        } else {
            error!("\n错误: 仍未登录");
            Err(SessionError::AuthenticationRequired {
                login_url: self.login_url.clone(),
            })
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!("会话状态: {:?} → {:?}", self.state, next);
        self.state = next;
    }
}

async fn is_logged_in<P: PageDriver>(page: &P) -> Result<bool, SessionError> {
    let path = page.current_path().await?;
    Ok(!path.contains("/login"))
}
