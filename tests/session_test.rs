use std::{sync::Arc, time::Duration};

use pretty_assertions::assert_eq;
use stepscan::{
    config, ChannelObserver, Locale, ProbeKind, ScannerConfig, SessionConfig, StepError,
    StepResult, StepScanner, TokenSpan, Tokenizer,
};
use strum::IntoEnumIterator;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn tab_config() -> SessionConfig {
    config::from_str(r#"{ "source_description": "File(\"data.txt\")", "scanner": { "delimiter": "\t", "radix": 10 } }"#)
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_display_task_drives_session() {
    let (observer, mut snapshots) = ChannelObserver::new(true);
    let (scanner, handle) =
        StepScanner::from_config("12\t34\tabc", &tab_config(), Arc::new(observer)).unwrap();

    let worker = scanner.spawn(|scanner| {
        let mut sum = 0;
        while scanner.has_next_int()? {
            sum += scanner.next_int()?;
        }
        let word = scanner.next()?;
        Ok((sum, word, scanner.steps()))
    });

    let mut seen = Vec::new();
    while let Some(snapshot) = snapshots.recv().await {
        let pending = snapshot.is_pending();
        seen.push(snapshot);
        if !pending {
            break;
        }
        assert!(handle.release());
    }

    let (sum, word, steps) = worker.await.unwrap().unwrap();
    assert_eq!(sum, 46);
    assert_eq!(word, "abc");

    // One snapshot per guarded call plus the final idle one.
    assert_eq!(seen.len() as u64, steps + 1);
    assert_eq!(handle.pause_count(), steps);

    let first = &seen[0];
    assert_eq!(first.source_description, "File(\"data.txt\")");
    assert_eq!(
        first.spans.as_deref(),
        Some(&[TokenSpan::new(0, 2), TokenSpan::new(3, 2), TokenSpan::new(6, 3)][..])
    );
    assert!(first.probe(ProbeKind::Int));

    let last = seen.last().unwrap();
    assert_eq!(last.current_operation, None);
    assert!(ProbeKind::iter().all(|kind| !last.probe(kind)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cancel_terminates_learner_code() {
    let (observer, mut snapshots) = ChannelObserver::new(false);
    let tokenizer = Tokenizer::new("1 2 3 4", ScannerConfig::default()).unwrap();
    let (scanner, handle) = StepScanner::new(tokenizer, "String", Arc::new(observer));

    let worker = scanner.spawn(|scanner| -> StepResult<Vec<i32>> {
        let mut consumed = Vec::new();
        loop {
            consumed.push(scanner.next_int()?);
        }
    });

    let first = snapshots.recv().await.unwrap();
    assert_eq!(first.step, 1);
    assert!(handle.release());
    let second = snapshots.recv().await.unwrap();
    assert_eq!(second.step, 2);
    handle.cancel();

    let result = tokio::time::timeout(Duration::from_secs(2), worker)
        .await
        .expect("worker did not stop after cancel")
        .unwrap();
    assert!(matches!(result, Err(StepError::SessionCancelled)));
    assert!(handle.is_cancelled());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_no_more_input_surfaces_to_learner() {
    let (observer, mut snapshots) = ChannelObserver::new(false);
    let tokenizer = Tokenizer::new("only", ScannerConfig::default()).unwrap();
    let (scanner, handle) = StepScanner::new(tokenizer, "String", Arc::new(observer));

    let worker = scanner.spawn(|scanner| {
        scanner.next()?;
        scanner.next()
    });

    for _ in 0..2 {
        snapshots.recv().await.unwrap();
        handle.release();
    }
    let result = worker.await.unwrap();
    assert!(matches!(result, Err(StepError::NoMoreInput)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_highlight_toggle_between_steps() {
    let (observer, mut snapshots) = ChannelObserver::new(false);
    let display = observer.clone();
    let tokenizer = Tokenizer::new("a b", ScannerConfig::default()).unwrap();
    let (scanner, handle) = StepScanner::new(tokenizer, "String", Arc::new(observer));

    let worker = scanner.spawn(|scanner| {
        scanner.has_next()?;
        scanner.next()
    });

    let first = snapshots.recv().await.unwrap();
    assert!(first.spans.is_none());
    display.set_highlighting(true);
    handle.release();

    let second = snapshots.recv().await.unwrap();
    assert_eq!(second.spans.map(|s| s.len()), Some(2));
    handle.release();

    assert_eq!(worker.await.unwrap().unwrap(), "a");
}

#[test]
fn test_scenario_locale_and_radix() {
    let config = ScannerConfig::new(";", 10, Locale::parse("sk_SK").unwrap()).unwrap();
    let mut t = Tokenizer::new("3,14;3.14;1\u{a0}000;ff", config).unwrap();
    assert!(t.probe(ProbeKind::Double));
    assert!(!t.probe(ProbeKind::Int));
    assert_eq!(t.consume_double().unwrap(), 3.14);
    assert!(!t.probe(ProbeKind::Double));
    t.consume_next().unwrap();
    assert!(t.probe(ProbeKind::Int));
    assert_eq!(t.consume_int().unwrap(), 1000);
    assert!(!t.probe(ProbeKind::Int));
    t.use_radix(16).unwrap();
    assert!(t.probe(ProbeKind::Int));
    assert!(t.probe(ProbeKind::BigInteger));
    assert!(!t.probe(ProbeKind::Double));
}
