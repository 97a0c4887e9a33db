//! Tests for job_db (use in-memory DB helper from db).

use crate::error::PersistenceError;
use crate::job_db::db::open_memory;
use crate::job_db::{JobStatus, JobStore, NewJob};

fn new_job(source: &str, output: &str) -> NewJob {
    NewJob {
        source: source.to_string(),
        output_name: output.to_string(),
        ..NewJob::default()
    }
}

#[tokio::test]
async fn create_stores_all_fields_as_queued() {
    let db = open_memory().await.unwrap();
    let id = db
        .create(&NewJob {
            source: "https://www.youtube.com/watch?v=J38Yq85ZoyY".to_string(),
            output_name: "talk".to_string(),
            audio_only: true,
            audio_format: "mp3".to_string(),
            embed_thumbnail: true,
            extra_args: "--no-playlist".to_string(),
        })
        .await
        .unwrap();

    let job = db.get_job(id).await.unwrap().expect("job exists");
    assert_eq!(job.id, id);
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.source, "https://www.youtube.com/watch?v=J38Yq85ZoyY");
    assert_eq!(job.output_name, "talk");
    assert!(job.audio_only);
    assert_eq!(job.audio_format, "mp3");
    assert!(job.embed_thumbnail);
    assert_eq!(job.extra_args, "--no-playlist");
}

#[tokio::test]
async fn create_rejects_empty_required_fields() {
    let db = open_memory().await.unwrap();
    let err = db.create(&new_job("", "name")).await.unwrap_err();
    assert!(matches!(err, PersistenceError::EmptyField("source")));
    let err = db.create(&new_job("abc123", "   ")).await.unwrap_err();
    assert!(matches!(err, PersistenceError::EmptyField("output_name")));
    assert!(db.list_jobs().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_by_status_keeps_creation_order() {
    let db = open_memory().await.unwrap();
    assert!(db.list_by_status(JobStatus::Queued).await.unwrap().is_empty());

    let a = db.create(&new_job("a", "one")).await.unwrap();
    let b = db.create(&new_job("b", "two")).await.unwrap();
    let c = db.create(&new_job("c", "three")).await.unwrap();
    db.set_status(b, JobStatus::Completed).await.unwrap();

    let queued: Vec<_> = db
        .list_by_status(JobStatus::Queued)
        .await
        .unwrap()
        .into_iter()
        .map(|j| j.id)
        .collect();
    assert_eq!(queued, vec![a, c]);
    let completed = db.list_by_status(JobStatus::Completed).await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, b);
}

#[tokio::test]
async fn status_partitions_cover_every_job_once() {
    let db = open_memory().await.unwrap();
    let mut ids = Vec::new();
    for (i, status) in [
        JobStatus::Queued,
        JobStatus::Downloading,
        JobStatus::Completed,
        JobStatus::Error,
        JobStatus::Queued,
        JobStatus::Error,
    ]
    .into_iter()
    .enumerate()
    {
        let id = db
            .create(&new_job(&format!("src{i}"), &format!("out{i}")))
            .await
            .unwrap();
        db.set_status(id, status).await.unwrap();
        ids.push(id);
    }

    let mut seen = Vec::new();
    for status in JobStatus::ALL {
        for job in db.list_by_status(status).await.unwrap() {
            assert_eq!(job.status, status);
            seen.push(job.id);
        }
    }
    seen.sort_unstable();
    assert_eq!(seen, ids);
}

#[tokio::test]
async fn set_status_is_idempotent_and_rejects_unknown_ids() {
    let db = open_memory().await.unwrap();
    let id = db.create(&new_job("abc", "x")).await.unwrap();
    db.set_status(id, JobStatus::Queued).await.unwrap();
    db.set_status(id, JobStatus::Queued).await.unwrap();
    assert_eq!(db.get_job(id).await.unwrap().unwrap().status, JobStatus::Queued);

    let err = db.set_status(id + 100, JobStatus::Error).await.unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound(missing) if missing == id + 100));
}

#[tokio::test]
async fn delete_removes_row_and_rejects_unknown_ids() {
    let db = open_memory().await.unwrap();
    let id1 = db.create(&new_job("a", "one")).await.unwrap();
    let id2 = db.create(&new_job("b", "two")).await.unwrap();

    db.delete(id1).await.unwrap();
    let jobs = db.list_jobs().await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, id2);

    let err = db.delete(id1).await.unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound(_)));
}

#[tokio::test]
async fn reset_downloading_requeues_only_downloading_jobs() {
    let db = open_memory().await.unwrap();
    let a = db.create(&new_job("a", "one")).await.unwrap();
    let b = db.create(&new_job("b", "two")).await.unwrap();
    db.set_status(a, JobStatus::Downloading).await.unwrap();
    db.set_status(b, JobStatus::Error).await.unwrap();

    assert_eq!(db.reset_downloading().await.unwrap(), 1);
    assert_eq!(db.get_job(a).await.unwrap().unwrap().status, JobStatus::Queued);
    assert_eq!(db.get_job(b).await.unwrap().unwrap().status, JobStatus::Error);
    assert_eq!(db.reset_downloading().await.unwrap(), 0);
}

#[test]
fn status_strings_roundtrip() {
    for status in JobStatus::ALL {
        assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
    }
    assert!("paused".parse::<JobStatus>().is_err());
    assert_eq!(JobStatus::from_db("garbage"), JobStatus::Error);
}
