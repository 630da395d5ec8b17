//! End-to-end stage scenarios driven through a scripted session.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]

use stage_controller::actors::{StageActor, StageActorHandle, StageSnapshot};
use stage_controller::config::StageConfig;
use stage_controller::layout::{Arrangement, LayoutMode};
use stage_test_utils::{fixtures, FakeSession};
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("stage=debug")
        .with_test_writer()
        .try_init();
}

/// Poll snapshots until `pred` holds; session events and commands travel on
/// separate channels, so state changes are eventually visible.
async fn snapshot_when<F>(handle: &StageActorHandle, mut pred: F) -> StageSnapshot
where
    F: FnMut(&StageSnapshot) -> bool,
{
    for _ in 0..500 {
        if let Ok(snapshot) = handle.snapshot().await {
            if pred(&snapshot) {
                return snapshot;
            }
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("stage never reached the expected state");
}

#[tokio::test]
async fn test_join_speak_leave_scenario() {
    init_tracing();
    let (session, driver) = FakeSession::connected(fixtures::local("me"));
    let (handle, _task) = StageActor::spawn(StageConfig::default(), Ok(session));

    // Two publishing participants join.
    let a = fixtures::publisher("a");
    let b = fixtures::publisher("b");
    driver.emit(fixtures::joined(&a)).await;
    driver.emit(fixtures::joined(&b)).await;

    let snapshot = snapshot_when(&handle, |s| s.participants.len() == 2).await;
    let ids: Vec<&str> = snapshot
        .participants
        .iter()
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);

    // B speaks: focus moves to B, roster order unchanged (both already
    // within the visible region).
    driver.emit(fixtures::speakers(&[&b])).await;
    let snapshot =
        snapshot_when(&handle, |s| s.focus.active_speaker == Some("b".into())).await;
    let ids: Vec<&str> = snapshot
        .participants
        .iter()
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);

    // B leaves: roster shrinks and focus re-selects A in the same step.
    driver.emit(fixtures::left(&b)).await;
    let snapshot = snapshot_when(&handle, |s| s.participants.len() == 1).await;
    assert_eq!(snapshot.participants.first().map(|p| p.id.as_str()), Some("a"));
    assert_eq!(snapshot.focus.active_speaker, Some("a".into()));

    handle.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_capacity_and_dedup_across_long_event_sequence() {
    init_tracing();
    let (session, driver) = FakeSession::connected(fixtures::local("me"));
    let (handle, _task) = StageActor::spawn(StageConfig::default(), Ok(session));

    let participants: Vec<_> = (0..15)
        .map(|i| fixtures::publisher(&format!("p{i}")))
        .collect();
    for p in &participants {
        driver.emit(fixtures::joined(p)).await;
        // Duplicate deliveries must not create duplicate entries.
        driver.emit(fixtures::joined(p)).await;
    }

    let snapshot = snapshot_when(&handle, |s| s.hidden_participants == 5).await;
    assert_eq!(snapshot.participants.len(), 10);

    let mut ids: Vec<&str> = snapshot
        .participants
        .iter()
        .map(|p| p.id.as_str())
        .collect();
    let before = ids.len();
    ids.dedup();
    assert_eq!(ids.len(), before);

    handle.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_offpage_speaker_promoted_into_view() {
    init_tracing();
    let (session, driver) = FakeSession::connected(fixtures::local("me"));
    let (handle, _task) = StageActor::spawn(StageConfig::default(), Ok(session));

    let participants: Vec<_> = (0..12)
        .map(|i| fixtures::publisher(&format!("p{i}")))
        .collect();
    for p in &participants {
        driver.emit(fixtures::joined(p)).await;
    }
    snapshot_when(&handle, |s| s.hidden_participants == 2).await;

    // p11 sits past the capacity cut until they speak.
    let speaker = participants.last().unwrap();
    driver.emit(fixtures::speakers(&[speaker])).await;

    let snapshot = snapshot_when(&handle, |s| {
        s.participants.first().map(|p| p.id.as_str()) == Some("p11")
    })
    .await;
    assert_eq!(snapshot.participants.len(), 10);
    assert_eq!(snapshot.focus.active_speaker, Some("p11".into()));

    handle.cancel();
}

#[tokio::test]
async fn test_second_sharer_cannot_steal_share_focus() {
    init_tracing();
    let (session, driver) = FakeSession::connected(fixtures::local("me"));
    let (handle, _task) = StageActor::spawn(StageConfig::default(), Ok(session));

    let s1 = fixtures::screen_sharer("s1");
    let s2 = fixtures::screen_sharer("s2");
    driver.emit(fixtures::joined(&s1)).await;
    driver.emit(fixtures::joined(&s2)).await;

    let track1 = s1.screen_share_track().unwrap().clone();
    let track2 = s2.screen_share_track().unwrap().clone();
    driver.emit(fixtures::subscribed(&s1, track1)).await;
    driver.emit(fixtures::subscribed(&s2, track2.clone())).await;

    let snapshot = snapshot_when(&handle, |s| s.focus.active_screen_share.is_some()).await;
    assert_eq!(
        snapshot
            .focus
            .active_screen_share
            .map(|s| s.participant_id),
        Some("s1".into())
    );

    // The first share stops; the second sharer takes over.
    let track1 = s1.screen_share_track().unwrap().clone();
    driver.emit(fixtures::unsubscribed(&s1, track1)).await;
    let snapshot = snapshot_when(&handle, |s| {
        s.focus
            .active_screen_share
            .as_ref()
            .is_some_and(|share| share.participant_id.as_str() == "s2")
    })
    .await;
    assert_eq!(
        snapshot.focus.active_screen_share.map(|s| s.track_sid),
        Some(track2.sid)
    );

    handle.cancel();
}

#[tokio::test]
async fn test_mode_switches_drive_arrangements() {
    init_tracing();
    let (session, driver) = FakeSession::connected(fixtures::local("me"));
    let (handle, _task) = StageActor::spawn(StageConfig::default(), Ok(session));

    handle.resize(1920, 1080).await.expect("resize");
    for i in 0..3 {
        driver
            .emit(fixtures::joined(&fixtures::publisher(&format!("p{i}"))))
            .await;
    }
    snapshot_when(&handle, |s| {
        s.participants.len() == 3 && s.viewport.width == 1920
    })
    .await;

    assert!(matches!(
        handle.arrangement().await.expect("arrangement"),
        Arrangement::Grid(_)
    ));

    handle
        .set_layout_mode(LayoutMode::SpeakerFocus)
        .await
        .expect("mode change");
    snapshot_when(&handle, |s| s.layout_mode == LayoutMode::SpeakerFocus).await;
    assert!(matches!(
        handle.arrangement().await.expect("arrangement"),
        Arrangement::Speaker(_)
    ));

    handle
        .set_layout_mode(LayoutMode::Crop)
        .await
        .expect("mode change");
    snapshot_when(&handle, |s| s.layout_mode == LayoutMode::Crop).await;
    let Arrangement::Crop(crop) = handle.arrangement().await.expect("arrangement") else {
        panic!("expected crop arrangement");
    };
    assert_eq!(crop.boxes.len(), 3);

    handle.cancel();
}

#[tokio::test]
async fn test_snapshot_serializes_for_the_render_tree() {
    init_tracing();
    let (session, driver) = FakeSession::connected(fixtures::local("me"));
    let config = StageConfig {
        background_image: Some("https://example.com/bg.png".to_string()),
        ..StageConfig::default()
    };
    let (handle, _task) = StageActor::spawn(config, Ok(session));

    driver.emit(fixtures::joined(&fixtures::publisher("alice"))).await;
    let snapshot = snapshot_when(&handle, |s| s.participants.len() == 1).await;

    let json = serde_json::to_value(&snapshot).expect("snapshot serializes");
    assert_eq!(json["participants"][0]["id"], "alice");
    assert_eq!(json["background_image"], "https://example.com/bg.png");
    assert_eq!(json["focus"]["active_speaker"], "alice");

    let arrangement = handle.arrangement().await.expect("arrangement");
    serde_json::to_string(&arrangement).expect("arrangement serializes");

    handle.cancel();
}
