//! 截图循环 - 编排层
//!
//! 按顺序逐个截图，统计值作为 fold 的累加器传递并返回。
//! 上一个 PR（包括关闭标签页）完成后才开始下一个。

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::sleep;

use crate::infrastructure::BrowsingContext;
use crate::models::{RunStatistics, WorkItem};
use crate::services::CaptureService;
use crate::utils::logging::log_item_start;

/// 截图所有 PR
///
/// 两个 PR 之间等待 `item_delay`，最后一个之后不等待
pub async fn capture_all<C: BrowsingContext>(
    context: &C,
    service: &CaptureService,
    items: &[WorkItem],
    item_delay: Duration,
) -> RunStatistics {
    let total = items.len();

    stream::iter(items.iter().enumerate())
        .fold(RunStatistics::new(total), move |mut stats, (index, item)| async move {
            log_item_start(index + 1, total, item);

            let result = service.capture(context, item).await;
            stats.record(&result);

            if index + 1 < total {
                sleep(item_delay).await;
            }
            stats
        })
        .await
}
