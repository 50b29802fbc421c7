//! Test helpers: a throwaway device simulator and ad-hoc axum routers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::extract::Query;
use axum::http::header::CONTENT_TYPE;
use axum::routing::get;
use axum::Router;
use dashcam_sim::DeviceState;
use tokio::net::TcpListener;

use crate::Dashcam;

/// Serve `app` on an ephemeral localhost port and return its base URL.
pub async fn spawn_router(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Fresh, empty directory under the system temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dashcam_test_{}_{name}", std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Query strings received by a test router, in arrival order.
#[derive(Clone, Default)]
pub struct QueryLog(Arc<Mutex<Vec<HashMap<String, String>>>>);

impl QueryLog {
    pub fn take(&self) -> Vec<HashMap<String, String>> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }

    fn push(&self, query: HashMap<String, String>) {
        self.0.lock().unwrap().push(query);
    }
}

/// Router answering `/app/getfilelist` with a fixed body and logging queries.
pub fn file_list_router(log: QueryLog, body: &'static str) -> Router {
    Router::new().route(
        "/app/getfilelist",
        get(move |Query(query): Query<HashMap<String, String>>| {
            let log = log.clone();
            async move {
                log.push(query);
                ([(CONTENT_TYPE, "application/json")], body)
            }
        }),
    )
}

/// A running simulator over its own card directory.
pub struct Sim {
    pub base: String,
    pub card: PathBuf,
    pub root: PathBuf,
}

impl Sim {
    /// Simulator whose `rec` changes apply immediately.
    pub async fn start(name: &str) -> Self {
        Self::start_with(name, |state| state.with_rec_settle(std::time::Duration::ZERO)).await
    }

    pub async fn start_with(name: &str, configure: impl FnOnce(DeviceState) -> DeviceState) -> Self {
        let root = temp_dir(name);
        let card = root.join("card");
        std::fs::create_dir_all(&card).unwrap();

        let state = configure(DeviceState::new(card.clone()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            dashcam_sim::serve(listener, state).await.unwrap();
        });
        Self { base, card, root }
    }

    pub fn client(&self) -> Dashcam {
        Dashcam::new(&self.base).unwrap()
    }

    /// Place a recording on the card and return its device path.
    pub fn put(&self, dir: &str, name: &str, content: &[u8]) -> String {
        let folder = self.card.join(dir);
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join(name), content).unwrap();
        format!("{}/{dir}/{name}", dashcam_sim::CARD_PREFIX)
    }

    /// Place the thumbnail sidecar of a recording on the card.
    pub fn put_thumbnail(&self, dir: &str, name: &str, content: &[u8]) {
        let folder = self.card.join(dir);
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join(format!("{name}.jpg")), content).unwrap();
    }

    /// Output directory inside this simulator's scratch area (not created).
    pub fn out_dir(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join("out").join(rel)
    }
}
