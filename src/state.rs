use crate::{
    directory::StudentDirectory,
    error::{DirectoryError, MissingClientSnafu, ParseClientIdSnafu, UnknownClientSnafu},
    gateway::StudentGateway,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use maud::{DOCTYPE, Markup, html};
use snafu::{OptionExt, ResultExt};
use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};
use tokio::sync::Mutex;
use uuid::Uuid;

pub type SharedGateway = Arc<dyn StudentGateway>;
pub type SharedDirectory = Arc<StudentDirectory<SharedGateway>>;

/// Sent by htmx on every fragment request, inherited from the page wrapper.
pub const CLIENT_HEADER: &str = "x-directory-client";
/// Oldest page loads are unmounted past this many.
pub const MAX_MOUNTED: usize = 256;

#[derive(Default)]
struct MountTable {
    directories: HashMap<Uuid, SharedDirectory>,
    order: VecDeque<Uuid>,
}

#[derive(Clone)]
pub struct DirectoryState {
    gateway: SharedGateway,
    mounted: Arc<Mutex<MountTable>>,
}

impl DirectoryState {
    pub fn new(gateway: SharedGateway) -> Self {
        Self {
            gateway,
            mounted: Arc::default(),
        }
    }

    /// A fresh directory for one page load. Nothing from earlier page loads carries over.
    pub async fn mount(&self) -> (Uuid, SharedDirectory) {
        let id = Uuid::new_v4();
        let directory = Arc::new(StudentDirectory::new(self.gateway.clone()));

        let mut table = self.mounted.lock().await;
        if table.order.len() >= MAX_MOUNTED {
            if let Some(oldest) = table.order.pop_front() {
                table.directories.remove(&oldest);
                debug!(%oldest, "unmounted oldest directory");
            }
        }
        table.order.push_back(id);
        table.directories.insert(id, directory.clone());

        (id, directory)
    }

    pub async fn directory(&self, id: &Uuid) -> Option<SharedDirectory> {
        self.mounted.lock().await.directories.get(id).cloned()
    }

    #[allow(clippy::unused_self, clippy::needless_pass_by_value)] //in case self is ever needed :), and to allow direct html! usage
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Students" }
                }
                body class="bg-gray-900 min-h-screen flex flex-col items-center text-white p-8" {
                    (markup)
                }
            }
        }
    }

    /// Unmounts every directory; nothing they hold outlives the process.
    pub async fn sensible_shutdown(&self) {
        let mut table = self.mounted.lock().await;
        info!(
            mounted = table.directories.len(),
            "tearing down student directories"
        );
        table.directories.clear();
        table.order.clear();
    }
}

/// The directory mounted for the page that sent the request.
pub struct MountedDirectory(pub SharedDirectory);

impl FromRequestParts<DirectoryState> for MountedDirectory {
    type Rejection = DirectoryError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &DirectoryState,
    ) -> Result<Self, Self::Rejection> {
        let original = parts
            .headers
            .get(CLIENT_HEADER)
            .and_then(|value| value.to_str().ok())
            .context(MissingClientSnafu)?;
        let id = Uuid::parse_str(original).context(ParseClientIdSnafu { original })?;

        state
            .directory(&id)
            .await
            .map(Self)
            .context(UnknownClientSnafu { id })
    }
}
