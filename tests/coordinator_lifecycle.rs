use stylewatch_test_utils::fakes::{FakeCompiler, RecordingWatchService, StaticFinder};
use stylewatch_test_utils::{init_tracing, with_timeout};

use std::error::Error;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot};

use stylewatch::engine::{TriggerWhileRunningBehaviour, WatchCoordinator};
use stylewatch::errors::StylewatchError;
use stylewatch::exec::BuildPipeline;
use stylewatch::finder::{Finder, IgnorePatterns, StaticFile};
use stylewatch::types::{ChangeEvent, ChangeKind};
use stylewatch::watch::{ChangeFilter, PathResolver};

type TestResult = Result<(), Box<dyn Error>>;

fn extensions() -> Vec<String> {
    vec![".scss".to_string(), ".less".to_string()]
}

fn coordinator(finders: Vec<Box<dyn Finder>>, compiler: Arc<FakeCompiler>) -> WatchCoordinator {
    let resolver = PathResolver::new(
        finders,
        extensions(),
        IgnorePatterns::none(),
        "/proj/static_root",
    );
    WatchCoordinator::new(
        resolver,
        ChangeFilter::new(extensions()),
        BuildPipeline::new(compiler),
        TriggerWhileRunningBehaviour::Queue,
    )
}

fn two_source_dirs() -> Vec<Box<dyn Finder>> {
    let finder = StaticFinder::new("fixed")
        .with_file("css/site.scss", "/proj/assets/css/site.scss")
        .with_file("blog/post.scss", "/proj/apps/blog/static/blog/post.scss");
    vec![Box::new(finder)]
}

fn shutdown_signal() -> (oneshot::Sender<()>, impl Future<Output = ()> + Send + 'static) {
    let (tx, rx) = oneshot::channel::<()>();
    (tx, async move {
        let _ = rx.await;
    })
}

#[derive(Debug)]
struct UnreadableFinder;

impl Finder for UnreadableFinder {
    fn name(&self) -> &str {
        "unreadable"
    }

    fn enumerate(&self, _ignore: &IgnorePatterns) -> anyhow::Result<Vec<StaticFile>> {
        Err(anyhow!("permission denied"))
    }
}

#[tokio::test]
async fn initial_build_runs_even_with_nothing_to_watch() -> TestResult {
    with_timeout(async {
        init_tracing();

        let compiler = FakeCompiler::new();
        let mut started = compiler.started();
        let service = RecordingWatchService::new();
        let log = service.log();
        let (_changes_tx, changes_rx) = mpsc::unbounded_channel();
        let (stop, shutdown) = shutdown_signal();

        let handle = tokio::spawn(
            coordinator(Vec::new(), compiler.clone()).run(service, changes_rx, shutdown),
        );

        assert_eq!(started.recv().await, Some(1));
        let _ = stop.send(());

        let report = handle.await??;
        assert_eq!(report.builds_started, 1);
        assert!(log.scheduled().is_empty());
        assert!(log.released());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn relevant_change_triggers_a_rebuild() -> TestResult {
    with_timeout(async {
        init_tracing();

        let compiler = FakeCompiler::new();
        let mut started = compiler.started();
        let service = RecordingWatchService::new();
        let log = service.log();
        let (changes_tx, changes_rx) = mpsc::unbounded_channel();
        let (stop, shutdown) = shutdown_signal();

        let handle = tokio::spawn(
            coordinator(two_source_dirs(), compiler.clone()).run(service, changes_rx, shutdown),
        );

        assert_eq!(started.recv().await, Some(1));
        changes_tx.send(ChangeEvent::new(
            "/proj/assets/css/_variables.scss",
            ChangeKind::Modified,
        ))?;
        assert_eq!(started.recv().await, Some(2));
        let _ = stop.send(());

        handle.await??;
        assert_eq!(
            log.scheduled(),
            vec![
                PathBuf::from("/proj/apps/blog/static/blog"),
                PathBuf::from("/proj/assets/css"),
            ]
        );
        assert_eq!(compiler.calls(), 2);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn irrelevant_changes_do_not_rebuild() -> TestResult {
    with_timeout(async {
        init_tracing();

        let compiler = FakeCompiler::new();
        let mut started = compiler.started();
        let (changes_tx, changes_rx) = mpsc::unbounded_channel();
        let (stop, shutdown) = shutdown_signal();

        let handle = tokio::spawn(coordinator(two_source_dirs(), compiler.clone()).run(
            RecordingWatchService::new(),
            changes_rx,
            shutdown,
        ));

        assert_eq!(started.recv().await, Some(1));
        for event in [
            ChangeEvent::new("/proj/assets/css/site.css", ChangeKind::Modified),
            ChangeEvent::new("/proj/assets/css/site.scss.swp", ChangeKind::Modified),
            ChangeEvent::new("/proj/assets/css/new.scss", ChangeKind::Created),
            ChangeEvent::new("/proj/assets/css/old.scss", ChangeKind::Deleted),
            ChangeEvent::new("/proj/assets/css/site.scss", ChangeKind::Moved),
        ] {
            changes_tx.send(event)?;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = stop.send(());

        handle.await??;
        assert_eq!(compiler.calls(), 1);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn refused_directory_is_skipped() -> TestResult {
    with_timeout(async {
        init_tracing();

        let compiler = FakeCompiler::new();
        let mut started = compiler.started();
        let service = RecordingWatchService::new().refusing("/proj/assets/css");
        let log = service.log();
        let (_changes_tx, changes_rx) = mpsc::unbounded_channel();
        let (stop, shutdown) = shutdown_signal();

        let handle = tokio::spawn(
            coordinator(two_source_dirs(), compiler.clone()).run(service, changes_rx, shutdown),
        );

        assert_eq!(started.recv().await, Some(1));
        let _ = stop.send(());

        handle.await??;
        assert_eq!(
            log.scheduled(),
            vec![PathBuf::from("/proj/apps/blog/static/blog")]
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn shutdown_waits_for_in_flight_build() -> TestResult {
    with_timeout(async {
        init_tracing();

        let compiler = FakeCompiler::gated();
        let mut started = compiler.started();
        let service = RecordingWatchService::new();
        let log = service.log();
        let (_changes_tx, changes_rx) = mpsc::unbounded_channel();
        let (stop, shutdown) = shutdown_signal();

        let handle = tokio::spawn(
            coordinator(two_source_dirs(), compiler.clone()).run(service, changes_rx, shutdown),
        );

        assert_eq!(started.recv().await, Some(1));
        let _ = stop.send(());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());
        assert!(!log.released());

        compiler.release();
        let report = handle.await??;
        assert_eq!(report.builds_succeeded, 1);
        assert!(log.released());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn finder_failure_aborts_before_watching() -> TestResult {
    with_timeout(async {
        init_tracing();

        let compiler = FakeCompiler::new();
        let service = RecordingWatchService::new();
        let log = service.log();
        let (_changes_tx, changes_rx) = mpsc::unbounded_channel();
        let (_stop, shutdown) = shutdown_signal();

        let finders: Vec<Box<dyn Finder>> = vec![Box::new(UnreadableFinder)];
        let err = coordinator(finders, compiler.clone())
            .run(service, changes_rx, shutdown)
            .await
            .unwrap_err();

        assert!(matches!(err, StylewatchError::ConfigError(_)), "got {err:?}");
        assert!(log.scheduled().is_empty());
        assert_eq!(compiler.calls(), 0);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn run_once_builds_a_single_time() -> TestResult {
    with_timeout(async {
        init_tracing();

        let compiler = FakeCompiler::new();
        let report = coordinator(two_source_dirs(), compiler.clone())
            .run_once()
            .await?;

        assert_eq!(report.builds_started, 1);
        assert_eq!(compiler.calls(), 1);
        Ok(())
    })
    .await
}
