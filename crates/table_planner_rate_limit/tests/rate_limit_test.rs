//! Tests for command admission and listing cooldowns.

use chrono::{DateTime, TimeDelta, Utc};
use table_planner_error::PlannerErrorKind;
use table_planner_rate_limit::{
    Admission, ChannelCooldown, CommandRateLimiter, RateLimitScope, RateLimitSettings,
    SlidingWindowLimiter, WindowLimit,
};

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-03-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn at(millis: i64) -> DateTime<Utc> {
    base_time() + TimeDelta::milliseconds(millis)
}

#[test]
fn test_two_per_window_then_denied_then_allowed_again() {
    let limit = WindowLimit::new(2, 10);
    let mut limiter = SlidingWindowLimiter::new();

    assert_eq!(limiter.check_and_record(1, at(0), limit), Admission::Allowed);
    assert_eq!(limiter.check_and_record(1, at(1_000), limit), Admission::Allowed);

    let denied = limiter.check_and_record(1, at(2_000), limit);
    assert_eq!(denied, Admission::Denied { wait_seconds: 8 });

    assert_eq!(limiter.check_and_record(1, at(11_000), limit), Admission::Allowed);
}

#[test]
fn test_wait_rounds_up_partial_seconds() {
    let limit = WindowLimit::new(1, 10);
    let mut limiter = SlidingWindowLimiter::new();
    limiter.check_and_record(1, at(0), limit);

    let denied = limiter.check_and_record(1, at(2_500), limit);
    assert_eq!(denied, Admission::Denied { wait_seconds: 8 });
}

#[test]
fn test_denied_calls_are_not_recorded() {
    let limit = WindowLimit::new(1, 10);
    let mut limiter = SlidingWindowLimiter::new();
    limiter.check_and_record(1, at(0), limit);
    for second in 1..10 {
        assert!(!limiter.check_and_record(1, at(second * 1_000), limit).is_allowed());
    }
    // Only the first admission counts, so the window frees at t=10s.
    assert!(limiter.check_and_record(1, at(10_001), limit).is_allowed());
}

#[test]
fn test_keys_have_independent_windows() {
    let limit = WindowLimit::new(1, 10);
    let mut limiter = SlidingWindowLimiter::new();
    assert!(limiter.check_and_record(1, at(0), limit).is_allowed());
    assert!(limiter.check_and_record(2, at(0), limit).is_allowed());
    assert!(!limiter.check_and_record(1, at(1), limit).is_allowed());
    assert!(!limiter.check_and_record(2, at(1), limit).is_allowed());
    assert!(limiter.check_and_record(3, at(1), limit).is_allowed());
}

#[tokio::test]
async fn test_scopes_are_independent() {
    let settings = RateLimitSettings {
        user: WindowLimit::new(1, 10),
        guild: WindowLimit::new(1, 5),
        list_cooldown_seconds: 60,
    };
    let limiter = CommandRateLimiter::new(settings);

    limiter.check(RateLimitScope::User, 42, at(0)).await.unwrap();
    limiter.check(RateLimitScope::Guild, 42, at(0)).await.unwrap();

    let err = limiter
        .check(RateLimitScope::Guild, 42, at(1_000))
        .await
        .unwrap_err();
    match err.kind() {
        PlannerErrorKind::RateLimited(limited) => {
            assert_eq!(limited.scope, "guild");
            assert_eq!(limited.key, 42);
            assert_eq!(limited.wait_seconds, 4);
        }
        other => panic!("expected a rate limit error, got {other}"),
    }
}

#[tokio::test]
async fn test_check_command_counts_user_before_guild() {
    let settings = RateLimitSettings {
        user: WindowLimit::new(5, 10),
        guild: WindowLimit::new(2, 10),
        list_cooldown_seconds: 60,
    };
    let limiter = CommandRateLimiter::new(settings);

    limiter.check_command(1, Some(9), at(0)).await.unwrap();
    limiter.check_command(2, Some(9), at(10)).await.unwrap();
    let err = limiter.check_command(3, Some(9), at(20)).await.unwrap_err();
    assert!(err.user_message().contains("server is busy"));

    // Direct messages skip the server window entirely.
    limiter.check_command(3, None, at(30)).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_checks_never_over_admit() {
    let limiter = std::sync::Arc::new(CommandRateLimiter::new(RateLimitSettings {
        user: WindowLimit::new(3, 10),
        ..RateLimitSettings::default()
    }));

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let limiter = std::sync::Arc::clone(&limiter);
            tokio::spawn(async move { limiter.admit(RateLimitScope::User, 7, at(0)).await })
        })
        .collect();

    let mut allowed = 0;
    for task in tasks {
        if task.await.unwrap().is_allowed() {
            allowed += 1;
        }
    }
    assert_eq!(allowed, 3);
}

#[test]
fn test_default_settings() {
    let settings = RateLimitSettings::default();
    assert_eq!(settings.user, WindowLimit::new(3, 10));
    assert_eq!(settings.guild, WindowLimit::new(12, 10));
    assert_eq!(settings.list_cooldown_seconds, 60);
    assert_eq!("guild".parse::<RateLimitScope>().unwrap(), RateLimitScope::Guild);
}

#[tokio::test]
async fn test_listing_cooldown_starts_on_record() {
    let cooldown = ChannelCooldown::new(60);

    assert!(cooldown.check(5, at(0)).await.is_allowed());
    assert!(cooldown.check(5, at(1_000)).await.is_allowed());

    cooldown.record(5, at(1_000)).await;
    assert_eq!(
        cooldown.check(5, at(31_000)).await,
        Admission::Denied { wait_seconds: 30 }
    );
    assert!(cooldown.check(6, at(31_000)).await.is_allowed());
    assert!(cooldown.check(5, at(61_000)).await.is_allowed());
}
