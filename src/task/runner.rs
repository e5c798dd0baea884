// Outer run loop shared by every task
use super::context::TaskContext;
use super::types::Task;
use std::time::Duration;

pub const DEFAULT_STEP_BACKOFF: Duration = Duration::from_secs(1);

/// Repeat `execute` until the task reports it is finished or it is cancelled.
/// Step errors are logged and the loop continues after `backoff`.
pub async fn run_task(mut task: Box<dyn Task>, cx: TaskContext, backoff: Duration) {
    let name = task.name().to_string();
    log::info!("▶️ [{name}] started");
    loop {
        if task.is_finished() {
            log::info!("🏁 [{name}] finished");
            break;
        }
        match task.execute(&cx).await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {
                log::info!("⏹️ [{name}] stopped");
                return;
            }
            Err(e) if e.is_recognition_unavailable() => log::warn!("⚠️ [{name}] {e}"),
            Err(e) => log::error!("❌ [{name}] {e}"),
        }
        if cx.sleep(backoff).await.is_err() {
            log::info!("⏹️ [{name}] stopped");
            return;
        }
    }
}
