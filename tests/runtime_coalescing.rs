use stylewatch_test_utils::fakes::{CompileStep, FakeCompiler, FakePublisher};
use stylewatch_test_utils::{capture_logs, init_tracing, with_timeout};

use std::error::Error;

use tokio::sync::mpsc;

use stylewatch::engine::{
    RebuildTrigger, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason,
    TriggerWhileRunningBehaviour,
};
use stylewatch::errors::StylewatchError;
use stylewatch::exec::{BuildExecutor, BuildPipeline};

type TestResult = Result<(), Box<dyn Error>>;

fn change() -> RuntimeEvent {
    RuntimeEvent::RebuildRequested {
        reason: TriggerReason::FileChange("/proj/assets/css/site.scss".into()),
    }
}

/// Wire a runtime around `pipeline`; returns the sender tests use to inject
/// events and the runtime itself.
fn runtime(
    pipeline: BuildPipeline,
    behaviour: TriggerWhileRunningBehaviour,
    exit_when_idle: bool,
) -> (mpsc::Sender<RuntimeEvent>, Runtime) {
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executor = BuildExecutor::new(pipeline, rt_tx.clone());
    let core = RebuildTrigger::new(behaviour, RuntimeOptions { exit_when_idle });
    (rt_tx, Runtime::new(core, rt_rx, executor))
}

#[tokio::test]
async fn burst_during_build_yields_exactly_one_follow_up() -> TestResult {
    with_timeout(async {
        init_tracing();

        let compiler = FakeCompiler::gated();
        let mut started = compiler.started();
        let (tx, runtime) = runtime(
            BuildPipeline::new(compiler.clone()),
            TriggerWhileRunningBehaviour::Queue,
            true,
        );
        let handle = tokio::spawn(runtime.run());

        // Initial build is issued without any event.
        assert_eq!(started.recv().await, Some(1));

        for _ in 0..5 {
            tx.send(change()).await?;
        }
        compiler.release();

        assert_eq!(started.recv().await, Some(2));
        compiler.release();

        let report = handle.await??;
        assert_eq!(compiler.calls(), 2);
        assert_eq!(report.builds_started, 2);
        assert_eq!(report.builds_succeeded, 2);
        assert_eq!(report.coalesced_requests, 4);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn drop_mode_discards_requests_during_build() -> TestResult {
    with_timeout(async {
        init_tracing();

        let compiler = FakeCompiler::gated();
        let mut started = compiler.started();
        let (tx, runtime) = runtime(
            BuildPipeline::new(compiler.clone()),
            TriggerWhileRunningBehaviour::Drop,
            true,
        );
        let handle = tokio::spawn(runtime.run());

        assert_eq!(started.recv().await, Some(1));
        for _ in 0..3 {
            tx.send(change()).await?;
        }
        compiler.release();

        let report = handle.await??;
        assert_eq!(compiler.calls(), 1);
        assert_eq!(report.dropped_requests, 3);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn compile_failure_keeps_watching_and_retries_on_next_change() -> TestResult {
    with_timeout(async {
        init_tracing();

        let compiler = FakeCompiler::scripted(vec![CompileStep::Fail("undefined variable".into())]);
        let publisher = FakePublisher::new();
        let mut started = compiler.started();
        let pipeline = BuildPipeline::new(compiler.clone()).with_publisher(publisher.clone());
        let (tx, runtime) = runtime(pipeline, TriggerWhileRunningBehaviour::Queue, false);
        let handle = tokio::spawn(runtime.run());

        assert_eq!(started.recv().await, Some(1));
        tx.send(change()).await?;
        assert_eq!(started.recv().await, Some(2));
        tx.send(RuntimeEvent::ShutdownRequested).await?;

        let report = handle.await??;
        assert_eq!(report.compile_failures, 1);
        assert_eq!(report.builds_succeeded, 1);
        // Publish only runs after a successful compile.
        assert_eq!(publisher.calls(), 1);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn compile_failure_is_reported_as_warnings() -> TestResult {
    let (logs, _guard) = capture_logs();

    with_timeout(async {
        let compiler =
            FakeCompiler::scripted(vec![CompileStep::Fail("line 3: unexpected token".into())]);
        let (_tx, runtime) = runtime(
            BuildPipeline::new(compiler.clone()),
            TriggerWhileRunningBehaviour::Queue,
            true,
        );

        let report = runtime.run().await?;
        assert_eq!(report.compile_failures, 1);

        let lines = logs.lines();
        assert!(
            lines
                .iter()
                .any(|l| l.contains("WARN") && l.contains("line 3: unexpected token")),
            "no warning with the compiler message in {lines:#?}"
        );
        assert!(
            lines
                .iter()
                .any(|l| l.contains("WARN") && l.contains("fix the stylesheet and save it again")),
            "no retry hint in {lines:#?}"
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn publish_failure_stops_the_runtime() -> TestResult {
    with_timeout(async {
        init_tracing();

        let compiler = FakeCompiler::new();
        let publisher = FakePublisher::failing("collectstatic exited with status 1");
        let pipeline = BuildPipeline::new(compiler.clone()).with_publisher(publisher.clone());
        let (_tx, runtime) = runtime(pipeline, TriggerWhileRunningBehaviour::Queue, false);

        let err = runtime.run().await.unwrap_err();
        assert!(matches!(err, StylewatchError::PublishError(_)), "got {err:?}");
        assert!(!err.is_recoverable());
        assert_eq!(publisher.calls(), 1);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn compiler_that_cannot_run_is_fatal() -> TestResult {
    with_timeout(async {
        init_tracing();

        let compiler = FakeCompiler::scripted(vec![CompileStep::Crash("sassc: not found".into())]);
        let publisher = FakePublisher::new();
        let pipeline = BuildPipeline::new(compiler.clone()).with_publisher(publisher.clone());
        let (_tx, runtime) = runtime(pipeline, TriggerWhileRunningBehaviour::Queue, false);

        let err = runtime.run().await.unwrap_err();
        assert!(matches!(err, StylewatchError::Other(_)), "got {err:?}");
        assert_eq!(publisher.calls(), 0);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn shutdown_waits_for_build_and_discards_follow_up() -> TestResult {
    with_timeout(async {
        init_tracing();

        let compiler = FakeCompiler::gated();
        let mut started = compiler.started();
        let (tx, runtime) = runtime(
            BuildPipeline::new(compiler.clone()),
            TriggerWhileRunningBehaviour::Queue,
            false,
        );
        let handle = tokio::spawn(runtime.run());

        assert_eq!(started.recv().await, Some(1));
        tx.send(change()).await?;
        tx.send(RuntimeEvent::ShutdownRequested).await?;
        tx.send(change()).await?;

        // Still running: shutdown must wait for the gated build.
        tokio::task::yield_now().await;
        assert!(!handle.is_finished());

        compiler.release();
        let report = handle.await??;

        assert_eq!(compiler.calls(), 1);
        assert_eq!(report.builds_succeeded, 1);
        assert_eq!(report.dropped_requests, 2);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn pipeline_can_be_shared_between_runs() -> TestResult {
    with_timeout(async {
        let compiler = FakeCompiler::new();
        let pipeline = BuildPipeline::new(compiler.clone());

        for _ in 0..2 {
            let (_tx, runtime) = runtime(pipeline.clone(), TriggerWhileRunningBehaviour::Queue, true);
            runtime.run().await?;
        }
        assert_eq!(compiler.calls(), 2);
        Ok(())
    })
    .await
}
