use std::time::Duration;

/// Sleep for the given duration without blocking the scheduling thread.
#[cfg(feature = "native")]
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Sleep for the given duration without blocking the scheduling thread.
#[cfg(all(feature = "wasm-js", not(feature = "native")))]
pub async fn sleep(duration: Duration) {
    let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
    gloo_timers::future::TimeoutFuture::new(millis).await;
}
