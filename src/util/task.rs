use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Runs a future and turns a panic inside it into an `Err` carrying the
/// panic message.
///
/// Background lookups must always report back to the event loop, otherwise
/// the loading indicator would stay up forever. Wrapping the task body in
/// this helper lets the caller send a completion event on both paths.
///
/// ```
/// use popcorn::util::catch_task_panic;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let ok = catch_task_panic(async { 7 }).await;
/// assert_eq!(ok, Ok(7));
/// # });
/// ```
pub async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                (*s).to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "task panicked with a non-string payload".to_string()
            }
        })
}
