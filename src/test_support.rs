// Fake marketplace backend for tests that go over HTTP

use axum::Router;
use std::sync::{Arc, Mutex};

// Serves `router` on an ephemeral local port and returns its base URL
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test backend");
    let addr = listener.local_addr().expect("test backend address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test backend crashed");
    });
    format!("http://{}", addr)
}

// Log of what the fake backend saw, shared with handlers
#[derive(Clone, Default)]
pub struct Recorded(Arc<Mutex<Vec<String>>>);

impl Recorded {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().expect("recorded lock").push(entry.into());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().expect("recorded lock"))
    }
}
