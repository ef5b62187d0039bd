// Integration tests for the append-only session logs
//
// These tests verify id ordering, blocking reads, cursor semantics and
// the teardown behavior of the per-session log store.

use anyhow::Result;
use bytes::Bytes;
use echonotes::{EntryId, FieldMap, LogError, LogReader, LogStore, SessionLog};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn text_fields(text: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert("text".to_string(), Bytes::from(text.to_string()));
    fields
}

#[tokio::test]
async fn test_append_assigns_strictly_increasing_ids() -> Result<()> {
    let log = SessionLog::new("transcript:session:ids");

    let mut previous = EntryId::ZERO;
    for i in 0..50 {
        let id = log.append(text_fields(&format!("entry {}", i))).await?;
        assert!(id > previous, "Id {} should be greater than {}", id, previous);
        previous = id;
    }

    assert_eq!(log.entry_count().await, 50);
    assert_eq!(log.last_id().await, previous);
    Ok(())
}

#[tokio::test]
async fn test_read_after_excludes_the_cursor_entry() -> Result<()> {
    let log = SessionLog::new("transcript:session:cursor");

    let first = log.append(text_fields("first")).await?;
    let second = log.append(text_fields("second")).await?;
    let third = log.append(text_fields("third")).await?;

    // Reading after the second id must return only the third entry
    let batch = log.read_after(second, 10, Duration::ZERO).await?;
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].id, third);
    assert!(batch[0].id > second);

    // Reading after the last id returns nothing
    let batch = log.read_after(third, 10, Duration::ZERO).await?;
    assert!(batch.is_empty());

    // Reading from ZERO replays everything in order
    let batch = log.read_after(EntryId::ZERO, 10, Duration::ZERO).await?;
    assert_eq!(batch.len(), 3);
    assert_eq!(batch[0].id, first);
    assert_eq!(batch[2].id, third);
    Ok(())
}

#[tokio::test]
async fn test_read_after_returns_empty_on_timeout() -> Result<()> {
    let log = SessionLog::new("audio:session:timeout");

    let started = Instant::now();
    let batch = log
        .read_after(EntryId::ZERO, 10, Duration::from_millis(50))
        .await?;

    assert!(batch.is_empty(), "Timeout should yield an empty batch");
    assert!(
        started.elapsed() >= Duration::from_millis(50),
        "Read should have waited out its budget"
    );
    Ok(())
}

#[tokio::test]
async fn test_read_after_wakes_a_blocked_reader() -> Result<()> {
    let log = Arc::new(SessionLog::new("audio:session:wakeup"));

    let writer = log.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = writer.append(text_fields("late arrival")).await;
    });

    let started = Instant::now();
    let batch = log
        .read_after(EntryId::ZERO, 10, Duration::from_secs(5))
        .await?;

    assert_eq!(batch.len(), 1);
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "Reader should wake on append, not wait out the full budget"
    );
    Ok(())
}

#[tokio::test]
async fn test_read_after_caps_the_batch() -> Result<()> {
    let log = SessionLog::new("transcript:session:batch");

    for i in 0..25 {
        log.append(text_fields(&format!("entry {}", i))).await?;
    }

    let first = log.read_after(EntryId::ZERO, 10, Duration::ZERO).await?;
    assert_eq!(first.len(), 10);

    let second = log
        .read_after(first[9].id, 10, Duration::ZERO)
        .await?;
    assert_eq!(second.len(), 10);
    assert!(second[0].id > first[9].id);

    let rest = log.read_after(second[9].id, 10, Duration::ZERO).await?;
    assert_eq!(rest.len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_appends_stay_ordered() -> Result<()> {
    let log = Arc::new(SessionLog::new("audio:session:concurrent"));

    let mut handles = Vec::new();
    for writer in 0..4 {
        let log = log.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                log.append(text_fields(&format!("writer {} entry {}", writer, i)))
                    .await
                    .expect("append should succeed");
            }
        }));
    }
    for handle in handles {
        handle.await?;
    }

    let entries = log.read_after(EntryId::ZERO, 200, Duration::ZERO).await?;
    assert_eq!(entries.len(), 100);
    for pair in entries.windows(2) {
        assert!(
            pair[0].id < pair[1].id,
            "Ids must be strictly increasing, got {} then {}",
            pair[0].id,
            pair[1].id
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_store_creates_lazily_and_shares() -> Result<()> {
    let store = LogStore::new();
    assert_eq!(store.session_count().await, 0);
    assert!(store.get("lecture-1").await.is_none());

    let first = store.open_session("lecture-1").await;
    let again = store.open_session("lecture-1").await;

    // Same underlying logs, not fresh ones
    assert!(Arc::ptr_eq(&first.audio, &again.audio));
    assert!(Arc::ptr_eq(&first.summary, &again.summary));
    assert_eq!(store.session_count().await, 1);

    store.open_session("lecture-2").await;
    assert_eq!(store.session_count().await, 2);
    Ok(())
}

#[tokio::test]
async fn test_removed_session_logs_reject_all_access() -> Result<()> {
    let store = LogStore::new();
    let logs = store.open_session("ending").await;
    logs.audio.append(text_fields("chunk")).await?;

    assert!(store.remove_session("ending").await);
    assert!(store.get("ending").await.is_none());
    assert!(!store.remove_session("ending").await, "Second remove is a no-op");

    // Held handles now fail instead of blocking
    let append = logs.audio.append(text_fields("too late")).await;
    assert!(matches!(append, Err(LogError::Closed(_))));
    let read = logs
        .audio
        .read_after(EntryId::ZERO, 10, Duration::from_secs(5))
        .await;
    assert!(matches!(read, Err(LogError::Closed(_))));
    Ok(())
}

#[tokio::test]
async fn test_remove_session_wakes_blocked_readers() -> Result<()> {
    let store = Arc::new(LogStore::new());
    let logs = store.open_session("torn-down").await;

    let closer = store.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        closer.remove_session("torn-down").await;
    });

    let started = Instant::now();
    let read = logs
        .summary
        .read_after(EntryId::ZERO, 10, Duration::from_secs(10))
        .await;

    assert!(matches!(read, Err(LogError::Closed(_))));
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "Teardown should wake the reader promptly"
    );
    Ok(())
}

#[tokio::test]
async fn test_reader_redelivers_until_advanced() -> Result<()> {
    let log = Arc::new(SessionLog::new("transcript:session:redelivery"));
    let first = log.append(text_fields("first")).await?;
    log.append(text_fields("second")).await?;

    let mut reader = LogReader::new(log);

    let batch = reader.poll(10, Duration::ZERO).await?;
    assert_eq!(batch.len(), 2);

    // Nothing acknowledged, so the same entries come back
    let again = reader.poll(10, Duration::ZERO).await?;
    assert_eq!(again.len(), 2);
    assert_eq!(again[0].id, batch[0].id);

    reader.advance_to(first);
    let rest = reader.poll(10, Duration::ZERO).await?;
    assert_eq!(rest.len(), 1, "Only the unacknowledged entry remains");
    assert_eq!(rest[0].id, batch[1].id);
    Ok(())
}

#[tokio::test]
async fn test_reader_never_moves_backwards() -> Result<()> {
    let log = Arc::new(SessionLog::new("transcript:session:rewind"));
    let first = log.append(text_fields("first")).await?;
    let second = log.append(text_fields("second")).await?;

    let mut reader = LogReader::new(log);
    reader.advance_to(second);
    assert_eq!(reader.position(), second);

    // A stale acknowledgement must not rewind the cursor
    reader.advance_to(first);
    assert_eq!(reader.position(), second);

    let batch = reader.poll(10, Duration::ZERO).await?;
    assert!(batch.is_empty());
    Ok(())
}
