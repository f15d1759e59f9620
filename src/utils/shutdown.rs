use std::future::Future;

/// 等待 Ctrl-C；無法註冊時永遠不會完成
pub async fn ctrl_c() {
    signal_or_pending(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires. A signal that fails to install never resolves.
pub async fn signal_or_pending<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => tracing::info!("🛑 Shutdown signal received"),
        Err(e) => {
            tracing::warn!("⚠️ Could not listen for shutdown signal: {}", e);
            std::future::pending::<()>().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_signal_resolves() {
        let result = tokio::time::timeout(
            Duration::from_secs(1),
            signal_or_pending(async { Ok::<(), std::io::Error>(()) }),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_signal_install_never_resolves() {
        let failing = async { Err::<(), _>(std::io::Error::other("no signal handler")) };
        let result = tokio::time::timeout(Duration::from_secs(60), signal_or_pending(failing)).await;
        assert!(result.is_err());
    }
}
