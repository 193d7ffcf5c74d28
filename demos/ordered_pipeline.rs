//! # Example: Ordered Pipeline
//!
//! Six "downloads" run concurrently, finish in reverse order, and still
//! write their results in launch order through the order-restorer chain.
//! A background ticker runs until the controller shuts down.
//!
//! Run with: `cargo run --example ordered_pipeline --features logging`

use std::sync::Arc;
use std::time::Duration;

use jobvisor::{Controller, ControllerConfig, JobError, JobFn, Level, LogWriter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ctl = Controller::builder(ControllerConfig::with_limit(3))
        .with_logger(Arc::new(LogWriter::with_min_level(Level::Info)))
        .build()?;

    ctl.background(JobFn::new(|ctl: Controller| async move {
        let mut ticks = 0u32;
        loop {
            tokio::select! {
                _ = ctl.shutting_down() => break,
                _ = tokio::time::sleep(Duration::from_millis(100)) => {
                    ticks += 1;
                    println!("[ticker] tick {ticks}");
                }
            }
        }
        Ok(())
    }));

    for i in 0..6u64 {
        let order = ctl.next_order_restorer();
        ctl.go(JobFn::new(move |_ctl: Controller| async move {
            let work = Duration::from_millis((6 - i) * 60);
            tokio::time::sleep(work).await;
            println!("[download {i}] fetched after {work:?}");

            order
                .wait()
                .await
                .map_err(|e| JobError::fail(format!("download {i}: {e}")))?;
            println!("[download {i}] written");
            order
                .finished()
                .await
                .map_err(|e| JobError::fail(format!("download {i}: {e}")))?;
            Ok(())
        }));
    }

    match ctl.wait().await {
        Ok(()) => println!("[main] all downloads written in order"),
        Err(e) => println!("[main] {e}: {}", ctl.errors()),
    }
    Ok(())
}
