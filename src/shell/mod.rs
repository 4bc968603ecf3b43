pub mod bridge;
pub mod instance;
pub mod window;

use crate::config::Config;
use crate::core::error::AssistError;
use crate::persistence::PersistenceGateway;
use bridge::Bridge;
use instance::InstanceRole;
use std::sync::Arc;
use tokio::task::JoinHandle;
use window::Window;

pub enum Launch {
    Started(AppContext),
    /// An existing session was focused instead.
    AlreadyRunning,
}

/// Process-wide state of the shell: the bridge over the window and the
/// instance server that keeps later launches out.
pub struct AppContext {
    bridge: Arc<Bridge>,
    instance_server: Option<JoinHandle<()>>,
}

impl AppContext {
    pub async fn init(config: &Config, window: Arc<dyn Window>) -> Result<Launch, AssistError> {
        let server = match instance::acquire(config.instance_port).await? {
            InstanceRole::Primary(server) => server,
            InstanceRole::Secondary => {
                tracing::info!(
                    "another session holds port {}; focused it",
                    config.instance_port
                );
                return Ok(Launch::AlreadyRunning);
            }
        };
        let port = server.port().unwrap_or(config.instance_port);
        let instance_server = Some(server.spawn(window.clone()));

        let bridge = Arc::new(Bridge::new(
            PersistenceGateway::from_config(config),
            window,
        ));

        if config.always_on_top {
            let response = bridge.set_always_on_top(true);
            if !response.success {
                tracing::warn!("starting without always-on-top");
            }
        }

        tracing::info!("shell initialised on port {}", port);
        Ok(Launch::Started(Self {
            bridge,
            instance_server,
        }))
    }

    pub fn bridge(&self) -> Arc<Bridge> {
        self.bridge.clone()
    }

    pub fn shutdown(&mut self) {
        if let Some(handle) = self.instance_server.take() {
            handle.abort();
            tracing::info!("instance server stopped");
        }
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::bridge::tests::FakeWindow;
    use tempfile::tempdir;

    fn config_in(root: &std::path::Path, port: u16) -> Config {
        Config {
            data_dir: Some(root.to_path_buf()),
            instance_port: port,
            ..Config::default()
        }
    }

    async fn free_port() -> u16 {
        let probe = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        probe.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn second_init_reports_already_running() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path(), free_port().await);

        let first = AppContext::init(&config, Arc::new(FakeWindow::new(false)))
            .await
            .unwrap();
        assert!(matches!(first, Launch::Started(_)));

        let second = AppContext::init(&config, Arc::new(FakeWindow::new(false)))
            .await
            .unwrap();
        assert!(matches!(second, Launch::AlreadyRunning));
    }

    #[tokio::test]
    async fn shutdown_releases_the_port() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path(), free_port().await);

        let mut ctx = match AppContext::init(&config, Arc::new(FakeWindow::new(false)))
            .await
            .unwrap()
        {
            Launch::Started(ctx) => ctx,
            Launch::AlreadyRunning => panic!("port was free"),
        };
        ctx.shutdown();
        drop(ctx);

        let mut restarted = false;
        for _ in 0..20 {
            tokio::time::sleep(std::time::Duration::from_millis(25)).await;
            if let Ok(Launch::Started(_)) =
                AppContext::init(&config, Arc::new(FakeWindow::new(false))).await
            {
                restarted = true;
                break;
            }
        }
        assert!(restarted);
    }

    #[tokio::test]
    async fn configured_always_on_top_is_applied() {
        let dir = tempdir().unwrap();
        let config = Config {
            always_on_top: true,
            ..config_in(dir.path(), free_port().await)
        };

        let ctx = match AppContext::init(&config, Arc::new(FakeWindow::new(false)))
            .await
            .unwrap()
        {
            Launch::Started(ctx) => ctx,
            Launch::AlreadyRunning => panic!("port was free"),
        };
        assert!(ctx.bridge().is_always_on_top());
    }
}
