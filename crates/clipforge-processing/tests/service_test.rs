//! End-to-end orchestration tests: fake tool + in-memory records + real
//! filesystem storage

use std::sync::Arc;

use bytes::Bytes;
use clipforge_core::{Cut, EditParams, Quality, Rotate};
use clipforge_processing::testing::FakeTool;
use clipforge_processing::EditService;
use clipforge_store::{FileStore, InMemoryRecordStore, MediaStore};
use tempfile::tempdir;

async fn new_service(root: &std::path::Path) -> (EditService, Arc<FakeTool>) {
    let tool = Arc::new(FakeTool::new());
    let records = Arc::new(InMemoryRecordStore::new());
    let files = FileStore::new(root).await.unwrap();
    let store = Arc::new(MediaStore::new(records, files));
    (EditService::new(store, tool.clone()), tool)
}

#[tokio::test]
async fn test_upload_probes_and_stores() {
    let dir = tempdir().unwrap();
    let (service, _tool) = new_service(dir.path()).await;

    let record = service
        .upload(Bytes::from_static(b"raw video"), "a.mp4", Some("client/1.0".into()), None)
        .await
        .unwrap();

    assert_eq!(record.version, 1);
    let metadata = record.metadata.as_ref().unwrap();
    assert_eq!(metadata.duration, Some(30.0));
    assert_eq!(metadata.codec_name.as_deref(), Some("h264"));
    assert!(dir.path().join("a.mp4").is_file());
}

#[tokio::test]
async fn test_edit_media_noop_leaves_everything_untouched() {
    let dir = tempdir().unwrap();
    let (service, tool) = new_service(dir.path()).await;

    let record = service
        .upload(Bytes::from_static(b"raw video"), "a.mp4", None, None)
        .await
        .unwrap();

    // full-span cut plus a full-turn rotation: a pure pass-through
    let params = EditParams {
        cut: Some(Cut { start: 0.0, end: 30.0 }),
        rotate: Some(Rotate { degree: 720 }),
        ..EditParams::default()
    };

    let after = service.edit_media(record.id, &params, None).await.unwrap();

    assert_eq!(after.version, record.version);
    assert_eq!(
        service.store().get(record.id).await.unwrap(),
        Bytes::from_static(b"raw video")
    );
    assert!(tool.transcodes().is_empty());
}

#[tokio::test]
async fn test_edit_media_replaces_content_in_place() {
    let dir = tempdir().unwrap();
    let (service, tool) = new_service(dir.path()).await;

    let record = service
        .upload(Bytes::from_static(b"raw video"), "a.mp4", None, None)
        .await
        .unwrap();

    let params = EditParams {
        rotate: Some(Rotate { degree: 90 }),
        ..EditParams::default()
    };

    let after = service
        .edit_media(record.id, &params, Some("client/2.0".into()))
        .await
        .unwrap();

    assert_eq!(after.id, record.id);
    assert_eq!(after.filename, "a.mp4");
    assert_eq!(after.version, 1);
    assert!(!after.processing);
    assert_eq!(after.client_info.as_deref(), Some("client/2.0"));
    assert_eq!(
        service.store().get(record.id).await.unwrap(),
        Bytes::from_static(b"transcoded bytes")
    );
    assert_eq!(tool.transcodes().len(), 1);
}

#[tokio::test]
async fn test_fork_media_creates_child_version() {
    let dir = tempdir().unwrap();
    let (service, _tool) = new_service(dir.path()).await;

    let parent = service
        .upload(Bytes::from_static(b"raw video"), "a.mp4", None, None)
        .await
        .unwrap();

    let params = EditParams {
        quality: Some(Quality { width: 640 }),
        ..EditParams::default()
    };

    let child = service
        .fork_media(parent.id, "b.mp4", &params, None)
        .await
        .unwrap();

    assert_eq!(child.version, 2);
    assert_eq!(child.parent.as_ref().unwrap().id, parent.id);
    assert_eq!(
        service.store().get(child.id).await.unwrap(),
        Bytes::from_static(b"transcoded bytes")
    );
    // the parent artifact is untouched
    assert_eq!(
        service.store().get(parent.id).await.unwrap(),
        Bytes::from_static(b"raw video")
    );
}

#[tokio::test]
async fn test_fork_media_noop_copies_parent_bytes() {
    let dir = tempdir().unwrap();
    let (service, _tool) = new_service(dir.path()).await;

    let parent = service
        .upload(Bytes::from_static(b"raw video"), "a.mp4", None, None)
        .await
        .unwrap();

    let child = service
        .fork_media(parent.id, "b.mp4", &EditParams::default(), None)
        .await
        .unwrap();

    assert_eq!(child.version, 2);
    assert_eq!(
        service.store().get(child.id).await.unwrap(),
        Bytes::from_static(b"raw video")
    );
}

#[tokio::test]
async fn test_capture_thumbnail_registers_frame_on_record() {
    let dir = tempdir().unwrap();
    let (service, _tool) = new_service(dir.path()).await;

    let record = service
        .upload(Bytes::from_static(b"raw video"), "a.mp4", None, None)
        .await
        .unwrap();

    let after = service.capture_thumbnail(record.id, 12.5).await.unwrap();

    let thumb = after.thumbnails.get("12.5").expect("thumbnail registered");
    assert_eq!(thumb.filename, "a_thumb_12.5.png");
    assert_eq!(thumb.mimetype, "image/png");
    assert_eq!(thumb.width, Some(1280));
    assert!(dir.path().join("a_thumb_12.5.png").is_file());
}

#[tokio::test]
async fn test_capture_timeline_registers_all_frames() {
    let dir = tempdir().unwrap();
    let (service, _tool) = new_service(dir.path()).await;

    let record = service
        .upload(Bytes::from_static(b"raw video"), "a.mp4", None, None)
        .await
        .unwrap();

    let after = service.capture_timeline(record.id, 4).await.unwrap();

    assert_eq!(after.thumbnails.len(), 5);
    for index in 0..5 {
        let thumb = after.thumbnails.get(&index.to_string()).expect("frame registered");
        assert_eq!(thumb.mimetype, "image/bmp");
        assert_eq!(thumb.filename, format!("a_frame_{}.bmp", index));
        assert!(dir.path().join(&thumb.filename).is_file());
    }
}

#[tokio::test]
async fn test_fork_seeds_thumbnails_from_parent() {
    let dir = tempdir().unwrap();
    let (service, _tool) = new_service(dir.path()).await;

    let parent = service
        .upload(Bytes::from_static(b"raw video"), "a.mp4", None, None)
        .await
        .unwrap();
    service.capture_thumbnail(parent.id, 3.0).await.unwrap();

    let child = service
        .fork_media(parent.id, "b.mp4", &EditParams::default(), None)
        .await
        .unwrap();

    assert!(child.thumbnails.contains_key("3"));
}

#[tokio::test]
async fn test_delete_media_is_silent_for_unknown_ids() {
    let dir = tempdir().unwrap();
    let (service, _tool) = new_service(dir.path()).await;

    assert!(service.delete_media(uuid::Uuid::new_v4()).await.is_ok());
}

#[tokio::test]
async fn test_delete_media_removes_artifacts() {
    let dir = tempdir().unwrap();
    let (service, _tool) = new_service(dir.path()).await;

    let record = service
        .upload(Bytes::from_static(b"raw video"), "a.mp4", None, None)
        .await
        .unwrap();
    service.capture_thumbnail(record.id, 5.0).await.unwrap();

    service.delete_media(record.id).await.unwrap();

    assert!(!dir.path().join("a.mp4").exists());
    assert!(!dir.path().join("a_thumb_5.png").exists());
    let err = service.store().get(record.id).await.unwrap_err();
    assert_eq!(err.error_type(), "NotFound");
}

#[tokio::test]
async fn test_edit_media_unknown_id_is_not_found() {
    let dir = tempdir().unwrap();
    let (service, _tool) = new_service(dir.path()).await;

    let params = EditParams {
        rotate: Some(Rotate { degree: 90 }),
        ..EditParams::default()
    };
    let err = service
        .edit_media(uuid::Uuid::new_v4(), &params, None)
        .await
        .unwrap_err();
    assert_eq!(err.error_type(), "NotFound");
}

#[tokio::test]
async fn test_concurrent_edits_of_one_asset_serialize() {
    let dir = tempdir().unwrap();
    let (service, _tool) = new_service(dir.path()).await;
    let service = Arc::new(service);

    let record = service
        .upload(Bytes::from_static(b"raw video"), "a.mp4", None, None)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for degree in [90i64, 180, 270] {
        let service = service.clone();
        let id = record.id;
        handles.push(tokio::spawn(async move {
            let params = EditParams {
                rotate: Some(Rotate { degree }),
                ..EditParams::default()
            };
            service.edit_media(id, &params, None).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // the store is consistent after the contention: one record, intact file
    let after = service.store().get_record(record.id).await.unwrap();
    assert!(!after.processing);
    assert_eq!(
        service.store().get(record.id).await.unwrap(),
        Bytes::from_static(b"transcoded bytes")
    );
}
