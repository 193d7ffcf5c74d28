//! End-to-end controller scenarios.
//!
//! Tests that depend on the order in which tasks are polled run on the
//! default `current_thread` test runtime, where spawned tasks are polled
//! in FIFO order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use jobvisor::{
    Controller, ControllerConfig, ControllerError, Job, JobError, JobFn, OrderError,
};

const LIMIT: Duration = Duration::from_secs(5);

fn controller(limit: usize) -> Controller {
    Controller::builder(ControllerConfig {
        limit,
        handle_signals: false,
        ..ControllerConfig::default()
    })
    .build()
    .unwrap()
}

async fn wait(ctl: &Controller) -> Result<(), ControllerError> {
    timeout(LIMIT, ctl.wait()).await.expect("controller never finished")
}

type Ready = futures::future::Ready<Result<(), JobError>>;

fn fail(msg: &'static str) -> JobFn<impl FnOnce(Controller) -> Ready + Send + 'static> {
    JobFn::new(move |_ctl: Controller| futures::future::ready(Err(JobError::fail(msg))))
}

// -------------- Receiver / sender jobs -----------------

/// Collects values until it has `num` of them, is told to stop, or sees shutdown.
struct Receiver {
    pass: mpsc::Receiver<i32>,
    stop: oneshot::Receiver<()>,
    started: oneshot::Sender<()>,
    received: Arc<Mutex<Vec<i32>>>,
    num: usize,
}

/// Test-side handle for a [`Receiver`].
struct ReceiverHandle {
    pass: mpsc::Sender<i32>,
    stop: Option<oneshot::Sender<()>>,
    started: Option<oneshot::Receiver<()>>,
    received: Arc<Mutex<Vec<i32>>>,
}

fn receiver(num: usize) -> (Receiver, ReceiverHandle) {
    let (pass_tx, pass_rx) = mpsc::channel(num);
    let (stop_tx, stop_rx) = oneshot::channel();
    let (started_tx, started_rx) = oneshot::channel();
    let received = Arc::new(Mutex::new(Vec::new()));
    (
        Receiver {
            pass: pass_rx,
            stop: stop_rx,
            started: started_tx,
            received: received.clone(),
            num,
        },
        ReceiverHandle {
            pass: pass_tx,
            stop: Some(stop_tx),
            started: Some(started_rx),
            received,
        },
    )
}

impl ReceiverHandle {
    async fn started(&mut self) {
        let started = self.started.take().unwrap();
        timeout(LIMIT, started).await.unwrap().unwrap();
    }

    fn stop(&mut self) {
        let _ = self.stop.take().unwrap().send(());
    }

    async fn add(&self, v: i32) {
        self.pass.send(v).await.unwrap();
    }

    fn sender(&self, value: i32) -> Sender {
        Sender {
            value,
            pass: self.pass.clone(),
        }
    }

    fn sorted(&self) -> Vec<i32> {
        let mut got = self.received.lock().unwrap().clone();
        got.sort_unstable();
        got
    }
}

#[async_trait]
impl Job for Receiver {
    async fn run(mut self, ctl: Controller) -> Result<(), JobError> {
        let _ = self.started.send(());
        loop {
            tokio::select! {
                biased;
                Some(v) = self.pass.recv() => {
                    self.received.lock().unwrap().push(v);
                    self.num -= 1;
                    if self.num == 0 {
                        return Ok(());
                    }
                }
                _ = &mut self.stop => return Ok(()),
                _ = ctl.shutting_down() => return Err(JobError::fail("closed receiver early")),
            }
        }
    }
}

/// Sends one value; finding the receiver gone is not an error.
struct Sender {
    value: i32,
    pass: mpsc::Sender<i32>,
}

#[async_trait]
impl Job for Sender {
    async fn run(self, _ctl: Controller) -> Result<(), JobError> {
        let _ = self.pass.send(self.value).await;
        Ok(())
    }
}

// -------------- Basic lifecycle -----------------

#[tokio::test]
async fn no_jobs_finishes_immediately() {
    let ctl = controller(4);
    assert!(!ctl.is_finished());

    assert_eq!(wait(&ctl).await, Ok(()));
    assert!(ctl.is_finished());
    assert!(ctl.is_shutting_down());
    assert_eq!(ctl.errors(), "");
}

#[tokio::test]
async fn default_controller_with_signal_listener_finishes() {
    let ctl = Controller::new(2).unwrap();
    assert_eq!(wait(&ctl).await, Ok(()));
}

#[tokio::test]
async fn invalid_limit_is_rejected() {
    assert_eq!(
        Controller::new(0).unwrap_err(),
        ControllerError::InvalidLimit { limit: 0 }
    );
}

#[tokio::test]
async fn closes_if_only_background_is_left() {
    let ctl = controller(4);
    ctl.background(JobFn::new(|ctl: Controller| async move {
        ctl.shutting_down().await;
        Ok(())
    }));

    assert_eq!(wait(&ctl).await, Ok(()));
    assert!(ctl.is_finished());
}

#[tokio::test]
async fn errors_are_joined_in_completion_order() {
    let ctl = controller(4);
    ctl.go(fail("first"));
    ctl.go(fail("second"));

    assert_eq!(wait(&ctl).await, Err(ControllerError::JobsFailed));
    assert_eq!(ctl.errors(), "first, second");
    assert_eq!(ctl.error_messages(), ["first", "second"]);
}

#[tokio::test]
async fn shutdown_sentinel_is_not_a_failure() {
    let ctl = controller(4);
    ctl.go(JobFn::new(|_ctl: Controller| async { Err(JobError::ShuttingDown) }));
    ctl.limited_go(JobFn::new(|_ctl: Controller| async { Err(JobError::ShuttingDown) }));

    assert_eq!(wait(&ctl).await, Ok(()));
    assert_eq!(ctl.errors(), "");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn background_error_shuts_down_and_is_reported() {
    let ctl = controller(4);
    let saw_shutdown = Arc::new(AtomicBool::new(false));

    ctl.background(fail("background broke"));
    {
        let saw_shutdown = saw_shutdown.clone();
        ctl.go(JobFn::new(move |ctl: Controller| async move {
            ctl.shutting_down().await;
            saw_shutdown.store(true, Ordering::SeqCst);
            Err(JobError::ShuttingDown)
        }));
    }

    assert_eq!(wait(&ctl).await, Err(ControllerError::JobsFailed));
    assert!(saw_shutdown.load(Ordering::SeqCst));
    assert_eq!(ctl.errors(), "background broke");
}

#[tokio::test]
async fn shutdown_refuses_new_main_and_background_jobs() {
    let ctl = controller(4);
    let ran = Arc::new(AtomicBool::new(false));
    ctl.shutdown();
    ctl.shutdown();

    for _ in 0..2 {
        let ran = ran.clone();
        let job = JobFn::new(move |_ctl: Controller| async move {
            ran.store(true, Ordering::SeqCst);
            Ok(())
        });
        ctl.go(job);
    }
    {
        let ran = ran.clone();
        ctl.background(JobFn::new(move |_ctl: Controller| async move {
            ran.store(true, Ordering::SeqCst);
            Ok(())
        }));
    }

    assert_eq!(wait(&ctl).await, Ok(()));
    assert!(!ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn panicking_job_is_recorded() {
    let ctl = controller(1);
    ctl.limited_go(JobFn::new(|_ctl: Controller| async move {
        if true {
            panic!("boom");
        }
        Ok(())
    }));

    assert_eq!(wait(&ctl).await, Err(ControllerError::JobsFailed));
    assert_eq!(ctl.errors(), "job panicked");
}

#[tokio::test]
async fn sub_jobs_are_waited_for() {
    let ctl = controller(2);
    let ran = Arc::new(AtomicBool::new(false));
    {
        let ran = ran.clone();
        ctl.go(JobFn::new(move |ctl: Controller| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            ctl.limited_go(JobFn::new(move |_ctl: Controller| async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                ran.store(true, Ordering::SeqCst);
                Ok(())
            }));
            Ok(())
        }));
    }

    assert_eq!(wait(&ctl).await, Ok(()));
    assert!(ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn run_blocking_runs_on_the_caller_and_routes_errors() {
    let ctl = controller(1);
    let ran = Arc::new(AtomicBool::new(false));
    {
        let ran = ran.clone();
        ctl.run_blocking(JobFn::new(move |_ctl: Controller| async move {
            ran.store(true, Ordering::SeqCst);
            Err(JobError::fail("inline failure"))
        }))
        .await;
    }
    assert!(ran.load(Ordering::SeqCst));

    assert_eq!(wait(&ctl).await, Err(ControllerError::JobsFailed));
    assert_eq!(ctl.errors(), "inline failure");
}

#[tokio::test]
async fn finish_abandons_running_jobs() {
    let ctl = controller(1);
    ctl.go(JobFn::new(|_ctl: Controller| async move {
        std::future::pending::<()>().await;
        Ok(())
    }));

    ctl.finish();
    assert!(ctl.is_shutting_down());
    assert_eq!(wait(&ctl).await, Ok(()));
}

#[tokio::test]
async fn finish_still_reports_collected_errors() {
    let ctl = controller(1);
    ctl.go(fail("boom"));
    ctl.go(JobFn::new(|_ctl: Controller| async move {
        std::future::pending::<()>().await;
        Ok(())
    }));
    tokio::time::sleep(Duration::from_millis(50)).await;

    ctl.finish();
    assert_eq!(wait(&ctl).await, Err(ControllerError::JobsFailed));
    assert_eq!(ctl.errors(), "boom");
}

#[tokio::test]
async fn waiting_twice_is_harmless() {
    let ctl = controller(1);
    ctl.go(fail("once"));

    assert_eq!(wait(&ctl).await, Err(ControllerError::JobsFailed));
    assert_eq!(wait(&ctl).await, Err(ControllerError::JobsFailed));
    assert_eq!(ctl.errors(), "once");
}

// -------------- Pools and admission -----------------

#[tokio::test]
async fn go_is_not_limited() {
    let ctl = controller(1);
    let (rec, mut handle) = receiver(4);
    ctl.go(rec);
    handle.started().await;

    for v in 1..=3 {
        ctl.go(handle.sender(v));
    }
    handle.add(4).await;

    assert_eq!(wait(&ctl).await, Ok(()));
    assert_eq!(handle.sorted(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn limited_receiver_and_unlimited_senders() {
    let ctl = controller(1);
    let (rec, mut handle) = receiver(4);
    ctl.limited_go(rec);
    handle.started().await;

    for v in 1..=3 {
        ctl.go(handle.sender(v));
    }
    handle.add(4).await;

    assert_eq!(wait(&ctl).await, Ok(()));
    assert_eq!(handle.sorted(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn limited_go_is_limited() {
    let ctl = controller(1);
    let (rec, mut handle) = receiver(4);
    ctl.limited_go(rec);
    handle.started().await;

    // Queued behind the receiver's slot; by the time they run, it is gone.
    for v in 1..=3 {
        ctl.limited_go(handle.sender(v));
    }
    handle.add(4).await;
    handle.stop();

    assert_eq!(wait(&ctl).await, Ok(()));
    assert_eq!(handle.sorted(), vec![4]);
}

#[tokio::test]
async fn queued_limited_job_is_skipped_on_shutdown() {
    let ctl = controller(1);
    let ran = Arc::new(AtomicBool::new(false));
    let (held_tx, held_rx) = oneshot::channel();

    ctl.limited_go(JobFn::new(move |ctl: Controller| async move {
        let _ = held_tx.send(());
        ctl.shutting_down().await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(())
    }));
    {
        let ran = ran.clone();
        ctl.limited_go(JobFn::new(move |_ctl: Controller| async move {
            ran.store(true, Ordering::SeqCst);
            Ok(())
        }));
    }

    timeout(LIMIT, held_rx).await.unwrap().unwrap();
    tokio::task::yield_now().await;
    ctl.shutdown();

    assert_eq!(wait(&ctl).await, Ok(()));
    assert!(!ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn blocking_limited_go_applies_back_pressure() {
    let ctl = controller(1);
    let (held_tx, held_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel::<()>();

    ctl.limited_go(JobFn::new(move |_ctl: Controller| async move {
        let _ = held_tx.send(());
        let _ = release_rx.await;
        Ok(())
    }));
    timeout(LIMIT, held_rx).await.unwrap().unwrap();

    let admitted = Arc::new(AtomicBool::new(false));
    let caller = {
        let ctl = ctl.clone();
        let admitted = admitted.clone();
        tokio::spawn(async move {
            ctl.blocking_limited_go(JobFn::new(|_ctl: Controller| async { Ok(()) }))
                .await;
            admitted.store(true, Ordering::SeqCst);
        })
    };

    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    assert!(!admitted.load(Ordering::SeqCst));

    release_tx.send(()).unwrap();
    timeout(LIMIT, caller).await.unwrap().unwrap();
    assert!(admitted.load(Ordering::SeqCst));

    assert_eq!(wait(&ctl).await, Ok(()));
}

#[tokio::test]
async fn blocking_limited_go_returns_on_shutdown() {
    let ctl = controller(1);
    let (held_tx, held_rx) = oneshot::channel();
    ctl.limited_go(JobFn::new(move |ctl: Controller| async move {
        let _ = held_tx.send(());
        ctl.shutting_down().await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(())
    }));
    timeout(LIMIT, held_rx).await.unwrap().unwrap();

    let ran = Arc::new(AtomicBool::new(false));
    let caller = {
        let ctl = ctl.clone();
        let ran = ran.clone();
        tokio::spawn(async move {
            ctl.blocking_limited_go(JobFn::new(move |_ctl: Controller| async move {
                ran.store(true, Ordering::SeqCst);
                Ok(())
            }))
            .await;
        })
    };
    tokio::task::yield_now().await;
    ctl.shutdown();

    timeout(LIMIT, caller).await.unwrap().unwrap();
    assert_eq!(wait(&ctl).await, Ok(()));
    assert!(!ran.load(Ordering::SeqCst));
}

// -------------- Fail-fast -----------------

/// Records whether it saw shutdown, launches the next link, then fails with its name.
struct Link {
    name: &'static str,
    rest: Vec<&'static str>,
    seen: Arc<Mutex<Vec<(&'static str, bool)>>>,
}

#[async_trait]
impl Job for Link {
    async fn run(self, ctl: Controller) -> Result<(), JobError> {
        let Link {
            name,
            mut rest,
            seen,
        } = self;
        seen.lock().unwrap().push((name, ctl.is_shutting_down()));

        if !rest.is_empty() {
            let next = rest.remove(0);
            ctl.limited_go(Link {
                name: next,
                rest,
                seen,
            });
        }
        Err(JobError::fail(name))
    }
}

#[tokio::test]
async fn fail_fast_shuts_down_before_the_next_link_runs() {
    let ctl = controller(1);
    ctl.enable_fail_fast();
    let seen = Arc::new(Mutex::new(Vec::new()));

    ctl.limited_go(Link {
        name: "first",
        rest: vec!["second", "third"],
        seen: seen.clone(),
    });

    assert_eq!(wait(&ctl).await, Err(ControllerError::JobsFailed));
    assert_eq!(ctl.errors(), "first, second, third");
    assert_eq!(
        *seen.lock().unwrap(),
        vec![("first", false), ("second", true), ("third", true)]
    );
}

#[tokio::test]
async fn fail_fast_from_config() {
    let ctl = Controller::builder(ControllerConfig {
        limit: 2,
        fail_fast: true,
        handle_signals: false,
    })
    .build()
    .unwrap();
    let saw_shutdown = Arc::new(AtomicBool::new(false));
    {
        let saw_shutdown = saw_shutdown.clone();
        ctl.go(JobFn::new(move |ctl: Controller| async move {
            ctl.shutting_down().await;
            saw_shutdown.store(true, Ordering::SeqCst);
            Ok(())
        }));
    }
    ctl.go(fail("boom"));

    assert_eq!(wait(&ctl).await, Err(ControllerError::JobsFailed));
    assert!(saw_shutdown.load(Ordering::SeqCst));
    assert_eq!(ctl.errors(), "boom");
}

#[tokio::test]
async fn without_fail_fast_errors_do_not_shut_down() {
    let ctl = controller(2);
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let observed = Arc::new(Mutex::new(None));
    {
        let observed = observed.clone();
        ctl.go(JobFn::new(move |ctl: Controller| async move {
            let _ = release_rx.await;
            *observed.lock().unwrap() = Some(ctl.is_shutting_down());
            Ok(())
        }));
    }
    ctl.go(fail("boom"));
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    release_tx.send(()).unwrap();

    assert_eq!(wait(&ctl).await, Err(ControllerError::JobsFailed));
    assert_eq!(*observed.lock().unwrap(), Some(false));
}

// -------------- Order restorer hand-out -----------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn order_restorers_reimpose_launch_order() {
    let ctl = controller(8);
    let vals = Arc::new(Mutex::new(Vec::new()));

    for i in 0..6u64 {
        let order = ctl.next_order_restorer();
        let vals = vals.clone();
        ctl.go(JobFn::new(move |_ctl: Controller| async move {
            // Later jobs finish their unordered part first.
            tokio::time::sleep(Duration::from_millis((6 - i) * 10)).await;
            order
                .wait()
                .await
                .map_err(|e| JobError::fail(e.to_string()))?;
            vals.lock().unwrap().push(i);
            order
                .finished()
                .await
                .map_err(|e| JobError::fail(e.to_string()))?;
            Ok(())
        }));
    }

    assert_eq!(wait(&ctl).await, Ok(()));
    assert_eq!(*vals.lock().unwrap(), vec![0, 1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn order_restorer_bails_out_on_shutdown() {
    let ctl = controller(1);
    let first = ctl.next_order_restorer();
    let second = ctl.next_order_restorer();

    ctl.shutdown();
    assert_eq!(second.wait().await, Err(OrderError::ControllerFinished));
    assert_eq!(first.wait().await, Ok(()));

    assert_eq!(wait(&ctl).await, Ok(()));
}
