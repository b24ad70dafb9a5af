//! Integration tests for `ResilientConnectorFactory`
//!
//! Construction has its own failure vocabulary: an expired session while
//! logging in is fatal, an unreachable host is worth another try.

mod support;

use std::sync::Arc;
use std::time::Duration;

use hostlink_common::testing::TrackingSleeper;
use hostlink_common::{BackoffSchedule, CancelPhase};
use hostlink_core::{ResilientConnectorFactory, ThreadAffinityGuard};
use hostlink_domain::{ConnectorError, Identity, TransportFailure};
use support::{identity, MockSession, MockTransport};
use tokio_util::sync::CancellationToken;

fn factory(millis: &[u64], transport: MockTransport) -> (ResilientConnectorFactory, Arc<MockTransport>, Arc<TrackingSleeper>) {
    let transport = Arc::new(transport);
    let sleeper = Arc::new(TrackingSleeper::new());
    let factory = ResilientConnectorFactory::new(transport.clone())
        .with_schedule(BackoffSchedule::from_millis(millis).expect("valid schedule"))
        .with_sleeper(sleeper.clone());
    (factory, transport, sleeper)
}

/// Validates that an unreachable host is retried until it answers.
///
/// Assertions:
/// - Two `Unreachable` failures then success: three connects.
/// - The waits follow the table.
/// - The handle carries generation 1 and the requested identity.
#[tokio::test]
async fn test_unreachable_host_is_retried() {
    let transport = MockTransport::new().failing_with([
        ConnectorError::Unreachable("host restarting".into()),
        ConnectorError::Unreachable("host restarting".into()),
    ]);
    let (factory, transport, sleeper) = factory(&[0, 5, 10], transport);

    let handle = factory.new_connection(&identity()).await.expect("third connect succeeds");

    assert_eq!(transport.connects.get(), 3);
    assert_eq!(sleeper.recorded(), vec![Duration::ZERO, Duration::from_millis(5)]);
    assert_eq!(handle.generation(), 1);
    assert_eq!(handle.identity(), &identity());
    assert_eq!(handle.session().session_id(), "mock-3");
}

/// Validates that bad credentials are never retried.
#[tokio::test]
async fn test_authentication_failure_is_fatal() {
    let transport =
        MockTransport::new().failing_with([ConnectorError::authentication("admin", "bad password")]);
    let (factory, transport, sleeper) = factory(&[0, 1, 2], transport);

    let err = factory.new_connection(&identity()).await.expect_err("bad credentials");

    assert_eq!(err, ConnectorError::authentication("admin", "bad password"));
    assert_eq!(transport.connects.get(), 1);
    assert!(sleeper.recorded().is_empty());
    assert_eq!(factory.last_generation(), 0);
}

/// Validates that an expired session is fatal while connecting, although
/// the same error is retried on ordinary calls.
#[tokio::test]
async fn test_session_expiry_during_construction_is_fatal() {
    let transport = MockTransport::new().failing_with([ConnectorError::SessionExpired("login raced".into())]);
    let (factory, transport, _sleeper) = factory(&[0, 1, 2], transport);

    let err = factory.new_connection(&identity()).await.expect_err("expired session");

    assert!(matches!(err, ConnectorError::SessionExpired(_)));
    assert_eq!(transport.connects.get(), 1);
}

/// Validates that exhaustion hands back the last transport error unchanged.
#[tokio::test]
async fn test_exhaustion_returns_last_error() {
    let transport = MockTransport::new().failing_with([
        ConnectorError::transport(TransportFailure::Unavailable, "first"),
        ConnectorError::transport(TransportFailure::Timeout, "second"),
    ]);
    let (factory, transport, _sleeper) = factory(&[0], transport);

    let err = factory.new_connection(&identity()).await.expect_err("both attempts fail");

    assert_eq!(err, ConnectorError::transport(TransportFailure::Timeout, "second"));
    assert_eq!(transport.connects.get(), 2);
}

/// Validates that every handle gets a fresh, increasing generation.
#[tokio::test]
async fn test_generations_increase() {
    let (factory, _transport, _sleeper) = factory(&[0], MockTransport::new());

    let first = factory.new_connection(&identity()).await.expect("connects");
    let second = factory.new_connection(&identity()).await.expect("connects");

    assert_eq!(first.generation(), 1);
    assert_eq!(second.generation(), 2);
    assert_ne!(first.id(), second.id());
    assert_eq!(factory.last_generation(), 2);
}

/// Validates rejections that happen before the transport is touched.
///
/// Assertions:
/// - A forbidden thread gets `ForbiddenContext`.
/// - An incomplete identity gets `Validation`.
/// - Neither reaches `connect`.
#[tokio::test]
async fn test_rejections_before_connect() {
    let (factory, transport, _sleeper) = factory(&[0, 1], MockTransport::new());
    let factory = factory.with_guard(ThreadAffinityGuard::from_predicate(|| true));
    let err = factory.new_connection(&identity()).await.expect_err("guard objects");
    assert_eq!(err, ConnectorError::forbidden("new_connection"));

    let factory = factory.with_guard(ThreadAffinityGuard::allow_all());
    let incomplete = Identity::new("en_US", "", "admin", "hunter2");
    let err = factory.new_connection(&incomplete).await.expect_err("incomplete identity");
    assert!(matches!(err, ConnectorError::Validation { .. }));

    assert_eq!(transport.connects.get(), 0);
}

/// Validates cancellation before the first connect.
#[tokio::test]
async fn test_cancelled_construction() {
    let (factory, transport, _sleeper) = factory(&[0, 1], MockTransport::new());
    let token = CancellationToken::new();
    token.cancel();

    let err = factory
        .new_connection_with_cancel(&identity(), &token)
        .await
        .expect_err("cancelled");

    assert!(matches!(err, ConnectorError::Cancelled { phase: CancelPhase::BeforeAttempt, .. }));
    assert_eq!(transport.connects.get(), 0);
}

/// Validates downcasting the session to the protocol's concrete type.
#[tokio::test]
async fn test_session_downcast() {
    let (factory, _transport, _sleeper) = factory(&[0], MockTransport::new());

    let handle = factory.new_connection(&identity()).await.expect("connects");
    let session = handle.session_as::<MockSession>().expect("mock session");

    assert_eq!(session.number, 1);
    assert!(!session.is_closed());
}
