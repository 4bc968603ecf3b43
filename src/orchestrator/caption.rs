use super::events::{AppEvent, EventBus};
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Clears the character caption after a delay. Restarting replaces any
/// pending clear.
pub struct CaptionTimer {
    delay: Duration,
    bus: EventBus,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl CaptionTimer {
    pub fn new(delay: Duration, bus: EventBus) -> Self {
        Self {
            delay,
            bus,
            pending: Mutex::new(None),
        }
    }

    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }

    pub fn restart(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let delay = self.delay;
        let bus = self.bus.clone();
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            bus.publish(AppEvent::HoverCaptionClear);
        }));
    }
}

impl Drop for CaptionTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn clears_after_delay() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let timer = CaptionTimer::new(Duration::from_secs(5), bus);

        timer.restart();
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(rx.try_recv().unwrap(), AppEvent::HoverCaptionClear);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_pending_clear() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let timer = CaptionTimer::new(Duration::from_secs(5), bus);

        timer.restart();
        tokio::time::sleep(Duration::from_secs(3)).await;
        timer.restart();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(rx.try_recv().unwrap(), AppEvent::HoverCaptionClear);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_suppresses_clear() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let timer = CaptionTimer::new(Duration::from_secs(1), bus);

        timer.restart();
        timer.cancel();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }
}
