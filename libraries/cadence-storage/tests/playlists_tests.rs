use cadence_core::{types::*, CadenceError};

use test_helpers::{create_test_artist, create_test_track, create_test_user, TestDb};

async fn create_playlist(db: &TestDb, owner: &UserId, name: &str) -> Playlist {
    cadence_storage::playlists::create(
        db.pool(),
        CreatePlaylist {
            name: name.to_string(),
            description: None,
            user_id: owner.clone(),
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_tracks_keep_insertion_order() {
    let db = TestDb::new().await;
    let user = create_test_user(db.pool(), "alice").await;
    let artist = create_test_artist(db.pool(), &user.id, "The Band").await;
    let a = create_test_track(db.pool(), &artist.id, None, "Pop", "A").await;
    let b = create_test_track(db.pool(), &artist.id, None, "Pop", "B").await;
    let c = create_test_track(db.pool(), &artist.id, None, "Pop", "C").await;

    let playlist = create_playlist(&db, &user.id, "Mix").await;
    cadence_storage::playlists::add_tracks(db.pool(), &playlist.id, &[c.id.clone(), a.id.clone()])
        .await
        .unwrap();
    cadence_storage::playlists::add_tracks(db.pool(), &playlist.id, &[b.id.clone()])
        .await
        .unwrap();

    let titles: Vec<String> = cadence_storage::playlists::get_tracks(db.pool(), &playlist.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.track.title)
        .collect();
    assert_eq!(titles, vec!["C", "A", "B"]);
}

#[tokio::test]
async fn test_duplicate_track_rolls_back_batch() {
    let db = TestDb::new().await;
    let user = create_test_user(db.pool(), "alice").await;
    let artist = create_test_artist(db.pool(), &user.id, "The Band").await;
    let a = create_test_track(db.pool(), &artist.id, None, "Pop", "A").await;
    let b = create_test_track(db.pool(), &artist.id, None, "Pop", "B").await;

    let playlist = create_playlist(&db, &user.id, "Mix").await;
    cadence_storage::playlists::add_tracks(db.pool(), &playlist.id, &[a.id.clone()])
        .await
        .unwrap();

    let result =
        cadence_storage::playlists::add_tracks(db.pool(), &playlist.id, &[b.id.clone(), a.id.clone()])
            .await;
    assert!(matches!(result, Err(CadenceError::Duplicate(_))));

    assert!(!cadence_storage::playlists::contains_track(db.pool(), &playlist.id, &b.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_remove_track_reports_absence() {
    let db = TestDb::new().await;
    let user = create_test_user(db.pool(), "alice").await;
    let artist = create_test_artist(db.pool(), &user.id, "The Band").await;
    let a = create_test_track(db.pool(), &artist.id, None, "Pop", "A").await;

    let playlist = create_playlist(&db, &user.id, "Mix").await;
    cadence_storage::playlists::add_tracks(db.pool(), &playlist.id, &[a.id.clone()])
        .await
        .unwrap();

    assert!(cadence_storage::playlists::remove_track(db.pool(), &playlist.id, &a.id)
        .await
        .unwrap());
    assert!(!cadence_storage::playlists::remove_track(db.pool(), &playlist.id, &a.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_deleting_track_removes_it_from_playlists() {
    let db = TestDb::new().await;
    let user = create_test_user(db.pool(), "alice").await;
    let artist = create_test_artist(db.pool(), &user.id, "The Band").await;
    let a = create_test_track(db.pool(), &artist.id, None, "Pop", "A").await;

    let playlist = create_playlist(&db, &user.id, "Mix").await;
    cadence_storage::playlists::add_tracks(db.pool(), &playlist.id, &[a.id.clone()])
        .await
        .unwrap();

    cadence_storage::tracks::delete(db.pool(), &a.id).await.unwrap();

    let tracks = cadence_storage::playlists::get_tracks(db.pool(), &playlist.id)
        .await
        .unwrap();
    assert!(tracks.is_empty());
}

#[tokio::test]
async fn test_update_and_delete_playlist() {
    let db = TestDb::new().await;
    let user = create_test_user(db.pool(), "alice").await;
    let playlist = create_playlist(&db, &user.id, "Mix").await;

    let updated = cadence_storage::playlists::update(
        db.pool(),
        &playlist.id,
        UpdatePlaylist {
            name: None,
            description: Some("late night".to_string()),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.name, "Mix");
    assert_eq!(updated.description.as_deref(), Some("late night"));

    let owned = cadence_storage::playlists::get_by_owner(db.pool(), &user.id)
        .await
        .unwrap();
    assert_eq!(owned.len(), 1);

    assert!(cadence_storage::playlists::delete(db.pool(), &playlist.id).await.unwrap());
    assert!(cadence_storage::playlists::get_by_id(db.pool(), &playlist.id)
        .await
        .unwrap()
        .is_none());
}
