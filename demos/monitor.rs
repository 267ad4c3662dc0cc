use signal_monitor_rs::{MonitorOptions, SignalMonitor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let endpoint = std::env::var("SIGNAL_ENDPOINT")
        .unwrap_or_else(|_| "ws://localhost:8080/ws/signals".to_string());
    let mut options = MonitorOptions::new(endpoint);
    options.logs.url = std::env::var("LOG_URL").ok();

    let monitor = SignalMonitor::new(options)?;
    let mut status = monitor.subscribe_status();
    let mut signals = monitor.subscribe_signals();
    let mut notifications = monitor.subscribe_notifications();

    println!("Starting signal monitor...");
    monitor.start()?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Ok(()) = status.changed() => {
                let status = status.borrow_and_update().clone();
                println!("[{}] {} (attempts: {})", status.state, status.message, status.attempts);
            }
            Ok(()) = signals.changed() => {
                let active = signals.borrow_and_update().active();
                println!("Active signals: {:?}", active);
            }
            Ok(()) = notifications.changed() => {
                for notification in notifications.borrow_and_update().iter() {
                    println!("  {:?}: {}", notification.kind, notification.message);
                }
            }
        }
    }

    println!("Stopping...");
    monitor.stop().await?;
    println!("Stopped!");

    Ok(())
}
