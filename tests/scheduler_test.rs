use std::sync::Arc;
use std::time::Duration;

use signpost::publisher::{Collaborators, Publisher};
use signpost::scheduler::{Scheduler, fire};
use signpost::search::memory::MemoryIndex;
use signpost::social::Credentials;
use signpost::social::mock::{FailAt, RecordingSocial};
use signpost::store::memory::{MemoryBlobs, MemoryKv};

fn publisher(social: Arc<RecordingSocial>) -> Arc<Publisher> {
    Arc::new(Publisher::new(
        Collaborators {
            kv: Arc::new(
                MemoryKv::new().with("quality", r#"{"imageCount": 2, "images": ["a", "b"]}"#),
            ),
            blobs: Arc::new(
                MemoryBlobs::new()
                    .with("a/a_m.jpg", b"a", "image/jpeg")
                    .with("b/b_m.jpg", b"b", "image/jpeg"),
            ),
            index: Arc::new(
                MemoryIndex::new()
                    .with("a", "Yield", "Triangle")
                    .with("b", "Stop Sign", "A red octagon"),
            ),
            social,
        },
        Credentials {
            identifier: "signs.bsky.social".to_string(),
            password: "app-pass".to_string(),
        },
    ))
}

#[tokio::test]
async fn fire_runs_detached() {
    let social = Arc::new(RecordingSocial::new());
    let handle = fire(publisher(social.clone()));

    handle.await.unwrap();
    assert_eq!(social.calls().posts.len(), 1);
}

#[tokio::test]
async fn failed_run_does_not_panic_task() {
    let social = Arc::new(RecordingSocial::failing_at(FailAt::Login));
    let handle = fire(publisher(social.clone()));

    // The error is logged inside the task, not surfaced as a panic
    assert!(handle.await.is_ok());
    assert!(social.calls().posts.is_empty());
}

#[tokio::test]
async fn overlapping_runs_are_independent() {
    let social = Arc::new(RecordingSocial::new());
    let publisher = publisher(social.clone());

    let handles: Vec<_> = (0..8).map(|_| fire(Arc::clone(&publisher))).collect();
    for result in futures::future::join_all(handles).await {
        result.unwrap();
    }

    let calls = social.calls();
    assert_eq!(calls.logins.len(), 8);
    assert_eq!(calls.uploads.len(), 8);
    assert_eq!(calls.posts.len(), 8);
    for post in &calls.posts {
        assert!(
            post.text == "Yield\nTriangle" || post.text == "Stop Sign\nA red octagon",
            "unexpected text {:?}",
            post.text
        );
        let title_len = post.text.split('\n').next().unwrap().len();
        assert_eq!(post.facets[0].index.byte_end, title_len);
        assert_eq!(post.embed.images[0].alt, &post.text[..title_len]);
    }
}

#[tokio::test(start_paused = true)]
async fn scheduler_fires_each_period_until_shutdown() {
    let social = Arc::new(RecordingSocial::new());
    let scheduler = Scheduler::new(Duration::from_secs(60));

    let fired = scheduler
        .run(
            publisher(social.clone()),
            tokio::time::sleep(Duration::from_secs(60 * 3 + 30)),
        )
        .await;
    assert_eq!(fired, 3);

    // Let the detached runs finish
    for _ in 0..50 {
        if social.calls().posts.len() == 3 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(social.calls().posts.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn scheduler_shutdown_before_first_tick() {
    let social = Arc::new(RecordingSocial::new());
    let scheduler = Scheduler::new(Duration::from_secs(3600));

    let fired = scheduler
        .run(publisher(social.clone()), tokio::time::sleep(Duration::from_secs(10)))
        .await;
    assert_eq!(fired, 0);
    assert_eq!(social.contacts(), 0);
}
