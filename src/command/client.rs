//! One-connection-per-command TCP client.

use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use super::{BatchReport, Command, CommandOutcome, Qualifier};
use crate::{BridgeError, Result};

/// Port the bridge listens on for commands.
pub const DEFAULT_COMMAND_PORT: u16 = 12346;
/// Bound on connect + write + shutdown for one command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Sends commands to the bridge.
///
/// The client holds no socket; each send opens a fresh connection, so a
/// client is cheap to clone and safe to share between tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandClient {
    host: String,
    port: u16,
    timeout: Duration,
}

impl Default for CommandClient {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_COMMAND_PORT)
    }
}

impl CommandClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port, timeout: DEFAULT_COMMAND_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Deliver one command, returning the elapsed time.
    pub async fn try_send(&self, command: &Command) -> Result<Duration> {
        let payload = command.to_wire()?;
        let endpoint = self.endpoint();
        let started = Instant::now();

        let delivery = async {
            let mut stream = TcpStream::connect(&endpoint).await.map_err(|e| {
                BridgeError::connection_failed_with_source(format!("connect {endpoint}"), Box::new(e))
            })?;
            stream.write_all(&payload).await.map_err(|e| {
                BridgeError::connection_failed_with_source(format!("write to {endpoint}"), Box::new(e))
            })?;
            // A reset after the payload went out is not a delivery failure
            if let Err(e) = stream.shutdown().await {
                debug!(endpoint = %endpoint, error = %e, "Shutdown after send failed");
            }
            Ok::<_, BridgeError>(())
        };

        tokio::time::timeout(self.timeout, delivery)
            .await
            .map_err(|_| BridgeError::Timeout { duration: self.timeout })??;

        let elapsed = started.elapsed();
        debug!(endpoint = %endpoint, command = %command, elapsed_ms = elapsed.as_secs_f64() * 1000.0, "Command sent");
        Ok(elapsed)
    }

    /// Deliver one command; failures are logged and reported as `false`.
    pub async fn send_command(&self, command: &Command) -> bool {
        match self.try_send(command).await {
            Ok(_) => true,
            Err(e) => {
                warn!(endpoint = %self.endpoint(), command = %command, error = %e, "Command failed");
                false
            }
        }
    }

    /// Convenience form of [`CommandClient::send_command`].
    pub async fn send(&self, variable: &str, value: f64, qualifier: Option<Qualifier>) -> bool {
        self.send_command(&Command::with_qualifier(variable, value, qualifier)).await
    }

    /// Send commands in order, one connection each, pausing `delay` between
    /// them. Every command is attempted regardless of earlier failures and
    /// nothing already delivered is undone.
    pub async fn send_sequence(&self, commands: &[Command], delay: Duration) -> BatchReport {
        let started = Instant::now();
        let mut outcomes = Vec::with_capacity(commands.len());

        for (index, command) in commands.iter().enumerate() {
            let outcome = match self.try_send(command).await {
                Ok(elapsed) => CommandOutcome::delivered(command.clone(), elapsed),
                Err(e) => {
                    warn!(
                        index,
                        total = commands.len(),
                        command = %command,
                        error = %e,
                        "Command in sequence failed"
                    );
                    CommandOutcome::failed(command.clone(), e.to_string())
                }
            };
            outcomes.push(outcome);

            if index + 1 < commands.len() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        let report = BatchReport::new(outcomes, started.elapsed());
        info!(
            sent = report.successful(),
            failed = report.failed(),
            total_ms = report.total_time.as_secs_f64() * 1000.0,
            "Command sequence finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    async fn accept_one(listener: &TcpListener) -> Vec<u8> {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        socket.read_to_end(&mut received).await.unwrap();
        received
    }

    #[tokio::test]
    async fn delivers_json_and_closes() {
        let (listener, port) = listener().await;
        let server = tokio::spawn(async move { accept_one(&listener).await });

        let client = CommandClient::new("127.0.0.1", port);
        assert!(client.send("Controls.Gear", 0.0, Some(Qualifier::Toggle)).await);

        let received = server.await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&received).unwrap();
        assert_eq!(json["variable"], "Controls.Gear");
        assert_eq!(json["value"], 1.0);
        assert_eq!(json["qualifier"], "toggle");
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_within_timeout() {
        // Bind then drop to get a port with nothing listening
        let (listener, port) = listener().await;
        drop(listener);

        let client =
            CommandClient::new("127.0.0.1", port).with_timeout(Duration::from_millis(500));
        let started = Instant::now();
        let delivered = client.send("Controls.Throttle", 0.5, None).await;

        assert!(!delivered);
        assert!(started.elapsed() < Duration::from_secs(2));
        let error = client.try_send(&Command::new("Controls.Throttle", 0.5)).await.unwrap_err();
        assert!(error.is_retryable());
    }

    #[tokio::test]
    async fn invalid_value_is_not_sent() {
        let client = CommandClient::new("127.0.0.1", 1);
        let error = client.try_send(&Command::new("Controls.Throttle", f64::NAN)).await;
        assert!(matches!(error, Err(BridgeError::Parse { .. })));
    }

    #[tokio::test]
    async fn later_failure_keeps_earlier_deliveries() {
        let (listener, port) = listener().await;
        let server = tokio::spawn(async move {
            let mut received = Vec::new();
            for _ in 0..2 {
                received.push(accept_one(&listener).await);
            }
            // Listener dropped here; the third command has nowhere to go
            received
        });

        let client =
            CommandClient::new("127.0.0.1", port).with_timeout(Duration::from_millis(500));
        let commands = [
            Command::new("Controls.Throttle", 0.5),
            Command::new("Controls.Gear", 1.0),
        ];
        let first = client.send_sequence(&commands, Duration::ZERO).await;
        let received = server.await.unwrap();

        let third = client.send_sequence(&[Command::new("Controls.Flaps", 0.5)], Duration::ZERO).await;

        assert_eq!(first.successful(), 2);
        assert_eq!(received.len(), 2);
        assert!(String::from_utf8_lossy(&received[0]).contains("Controls.Throttle"));
        assert!(String::from_utf8_lossy(&received[1]).contains("Controls.Gear"));
        assert_eq!(third.successful(), 0);
        assert_eq!(third.failed(), 1);
    }

    #[tokio::test]
    async fn listener_closing_mid_sequence_fails_the_rest() {
        let (listener, port) = listener().await;
        let server = tokio::spawn(async move {
            let first = accept_one(&listener).await;
            let (mut socket, _) = listener.accept().await.unwrap();
            // Stop listening before the third command connects
            drop(listener);
            let mut second = Vec::new();
            socket.read_to_end(&mut second).await.unwrap();
            vec![first, second]
        });

        let client =
            CommandClient::new("127.0.0.1", port).with_timeout(Duration::from_millis(500));
        let commands = [
            Command::new("Controls.Throttle", 0.5),
            Command::new("Controls.Gear", 1.0),
            Command::new("Controls.Flaps", 0.5),
            Command::new("Controls.Pitch.Input", 0.1),
        ];
        let report = client.send_sequence(&commands, Duration::from_millis(200)).await;
        let received = server.await.unwrap();

        assert_eq!(received.len(), 2);
        assert!(String::from_utf8_lossy(&received[0]).contains("Controls.Throttle"));
        assert!(String::from_utf8_lossy(&received[1]).contains("Controls.Gear"));

        assert_eq!(report.len(), 4);
        assert!(report.outcomes[0].delivered && report.outcomes[1].delivered);
        assert!(!report.outcomes[2].delivered);
        assert!(report.outcomes[2].error.is_some());
        // Attempted after the failure, and failed on its own
        assert_eq!(report.outcomes[3].command.variable, "Controls.Pitch.Input");
        assert!(report.outcomes[3].error.is_some());
        assert_eq!(report.successful(), 2);
    }

    #[tokio::test]
    async fn sequence_continues_past_failures() {
        let (listener, port) = listener().await;
        let server = tokio::spawn(async move {
            let mut received = Vec::new();
            for _ in 0..2 {
                received.push(accept_one(&listener).await);
            }
            received
        });

        let client = CommandClient::new("127.0.0.1", port);
        let commands = [
            Command::new("Controls.Throttle", 0.3),
            Command::new("Controls.Throttle", f64::NAN),
            Command::new("Controls.Flaps", 1.0),
        ];
        let report = client.send_sequence(&commands, Duration::from_millis(5)).await;

        assert_eq!(report.successful(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.outcomes[1].delivered);
        assert!(report.outcomes[2].delivered);
        assert_eq!(server.await.unwrap().len(), 2);
    }
}
