use crate::{
    data::student::{Student, StudentDraft, StudentId},
    error::{
        BaseUrlNotHierarchicalSnafu, DecodeStudentsSnafu, DirectoryResult, InvalidBaseUrlSnafu,
        RequestSnafu, UnsuccessfulStatusSnafu,
    },
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use snafu::{OptionExt, ResultExt, ensure};
use std::{
    fmt::{Display, Formatter},
    sync::Arc,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GatewayAction {
    List,
    Create,
    Update,
    Delete,
}

impl GatewayAction {
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::List => "Failed to fetch data",
            Self::Create => "Failed to add student",
            Self::Update => "Failed to update data",
            Self::Delete => "Failed to delete student",
        }
    }
}

impl Display for GatewayAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::List => "fetch students",
            Self::Create => "add student",
            Self::Update => "update student",
            Self::Delete => "delete student",
        })
    }
}

/// The remote store holding the students. Each call is one request/response.
#[async_trait]
pub trait StudentGateway: Send + Sync {
    async fn list(&self) -> DirectoryResult<Vec<Student>>;
    /// Returns the stored record if the store echoed one back.
    async fn create(&self, draft: &StudentDraft) -> DirectoryResult<Option<Student>>;
    async fn update(
        &self,
        id: &StudentId,
        draft: &StudentDraft,
    ) -> DirectoryResult<Option<Student>>;
    async fn delete(&self, id: &StudentId) -> DirectoryResult<()>;
}

#[async_trait]
impl<T: StudentGateway + ?Sized> StudentGateway for Arc<T> {
    async fn list(&self) -> DirectoryResult<Vec<Student>> {
        (**self).list().await
    }

    async fn create(&self, draft: &StudentDraft) -> DirectoryResult<Option<Student>> {
        (**self).create(draft).await
    }

    async fn update(
        &self,
        id: &StudentId,
        draft: &StudentDraft,
    ) -> DirectoryResult<Option<Student>> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: &StudentId) -> DirectoryResult<()> {
        (**self).delete(id).await
    }
}

#[derive(Clone, Debug)]
pub struct HttpStudentGateway {
    client: Client,
    base: Url,
}

impl HttpStudentGateway {
    pub fn new(base: &str) -> DirectoryResult<Self> {
        let parsed = Url::parse(base).context(InvalidBaseUrlSnafu { url: base })?;
        ensure!(
            !parsed.cannot_be_a_base(),
            BaseUrlNotHierarchicalSnafu { url: base }
        );

        Ok(Self {
            client: Client::new(),
            base: parsed,
        })
    }

    fn collection_url(&self) -> Url {
        self.base.clone()
    }

    fn member_url(&self, id: &StudentId) -> DirectoryResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .ok()
            .context(BaseUrlNotHierarchicalSnafu {
                url: self.base.as_str(),
            })?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }

    async fn send(request: RequestBuilder, action: GatewayAction) -> DirectoryResult<Response> {
        let response = request.send().await.context(RequestSnafu { action })?;
        let status = response.status();
        ensure!(
            status.is_success(),
            UnsuccessfulStatusSnafu { action, status }
        );
        Ok(response)
    }

    async fn echoed_record(response: Response, action: GatewayAction) -> Option<Student> {
        match response.json::<Student>().await {
            Ok(student) => Some(student),
            Err(e) => {
                debug!(?e, %action, "store did not echo a record back");
                None
            }
        }
    }
}

#[async_trait]
impl StudentGateway for HttpStudentGateway {
    async fn list(&self) -> DirectoryResult<Vec<Student>> {
        let url = self.collection_url();
        debug!(%url, "listing students");

        let response = Self::send(self.client.get(url), GatewayAction::List).await?;
        response
            .json::<Vec<Student>>()
            .await
            .context(DecodeStudentsSnafu)
    }

    async fn create(&self, draft: &StudentDraft) -> DirectoryResult<Option<Student>> {
        let url = self.collection_url();
        debug!(%url, "creating student");

        let response =
            Self::send(self.client.post(url).json(draft), GatewayAction::Create).await?;
        Ok(Self::echoed_record(response, GatewayAction::Create).await)
    }

    async fn update(
        &self,
        id: &StudentId,
        draft: &StudentDraft,
    ) -> DirectoryResult<Option<Student>> {
        let url = self.member_url(id)?;
        debug!(%url, "updating student");

        let response =
            Self::send(self.client.put(url).json(draft), GatewayAction::Update).await?;
        Ok(Self::echoed_record(response, GatewayAction::Update).await)
    }

    async fn delete(&self, id: &StudentId) -> DirectoryResult<()> {
        let url = self.member_url(id)?;
        debug!(%url, "deleting student");

        Self::send(self.client.delete(url), GatewayAction::Delete).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DirectoryError;
    use axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode,
        routing::get,
    };
    use tokio::{net::TcpListener, sync::Mutex};

    type Store = Arc<Mutex<Vec<Student>>>;

    async fn list_students(State(store): State<Store>) -> Json<Vec<Student>> {
        Json(store.lock().await.clone())
    }

    async fn create_student(
        State(store): State<Store>,
        Json(draft): Json<StudentDraft>,
    ) -> (StatusCode, Json<Student>) {
        let mut store = store.lock().await;
        let student = Student {
            id: StudentId::from(format!("id-{}", store.len() + 1)),
            full_name: draft.full_name,
            email: Some(draft.email),
            age: Some(draft.age),
            class: Some(draft.class),
        };
        store.push(student.clone());
        (StatusCode::CREATED, Json(student))
    }

    async fn update_student(
        State(store): State<Store>,
        Path(id): Path<String>,
        Json(draft): Json<StudentDraft>,
    ) -> Result<Json<Student>, StatusCode> {
        let mut store = store.lock().await;
        let student = store
            .iter_mut()
            .find(|s| s.id.as_str() == id)
            .ok_or(StatusCode::NOT_FOUND)?;
        student.full_name = draft.full_name;
        student.email = Some(draft.email);
        student.age = Some(draft.age);
        student.class = Some(draft.class);
        Ok(Json(student.clone()))
    }

    async fn delete_student(State(store): State<Store>, Path(id): Path<String>) -> StatusCode {
        let mut store = store.lock().await;
        let before = store.len();
        store.retain(|s| s.id.as_str() != id);
        if store.len() == before {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::NO_CONTENT
        }
    }

    async fn serve_fake_store() -> (String, Store) {
        let store: Store = Arc::default();
        let app = Router::new()
            .route("/students", get(list_students).post(create_student))
            .route(
                "/students/{id}",
                axum::routing::put(update_student).delete(delete_student),
            )
            .route("/broken", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .route("/garbage", get(|| async { "not json" }))
            .with_state(store.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), store)
    }

    fn draft(name: &str) -> StudentDraft {
        StudentDraft {
            full_name: name.to_string(),
            email: "x@example.com".to_string(),
            age: "20".to_string(),
            class: "A".to_string(),
        }
    }

    #[test]
    fn member_urls_escape_the_identifier() {
        let gateway = HttpStudentGateway::new("http://localhost/students/").unwrap();
        let url = gateway.member_url(&StudentId::from("a/b c")).unwrap();
        assert_eq!(url.as_str(), "http://localhost/students/a%2Fb%20c");

        let gateway = HttpStudentGateway::new("http://localhost/students").unwrap();
        let url = gateway.member_url(&StudentId::from("007")).unwrap();
        assert_eq!(url.as_str(), "http://localhost/students/007");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            HttpStudentGateway::new("not a url"),
            Err(DirectoryError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            HttpStudentGateway::new("mailto:someone@example.com"),
            Err(DirectoryError::BaseUrlNotHierarchical { .. })
        ));
    }

    #[tokio::test]
    async fn full_crud_cycle_against_a_store() {
        let (root, store) = serve_fake_store().await;
        let gateway = HttpStudentGateway::new(&format!("{root}/students")).unwrap();

        assert!(gateway.list().await.unwrap().is_empty());

        let created = gateway.create(&draft("Ali")).await.unwrap().unwrap();
        assert_eq!(created.full_name, "Ali");

        let listed = gateway.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);

        let updated = gateway
            .update(&created.id, &draft("Ali Hassan"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.full_name, "Ali Hassan");
        assert_eq!(store.lock().await[0].full_name, "Ali Hassan");

        gateway.delete(&created.id).await.unwrap();
        assert!(gateway.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_success_statuses_name_the_failed_action() {
        let (root, _store) = serve_fake_store().await;
        let gateway = HttpStudentGateway::new(&format!("{root}/students")).unwrap();

        let err = gateway
            .update(&StudentId::from("missing"), &draft("Nobody"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DirectoryError::UnsuccessfulStatus {
                action: GatewayAction::Update,
                status: StatusCode::NOT_FOUND
            }
        ));

        let err = gateway.delete(&StudentId::from("missing")).await.unwrap_err();
        assert!(err.banner_message().starts_with("Failed to delete student"));

        let broken = HttpStudentGateway::new(&format!("{root}/broken")).unwrap();
        let err = broken.list().await.unwrap_err();
        assert!(err.banner_message().starts_with("Failed to fetch data"));
    }

    #[tokio::test]
    async fn unreadable_lists_are_errors() {
        let (root, _store) = serve_fake_store().await;
        let gateway = HttpStudentGateway::new(&format!("{root}/garbage")).unwrap();
        assert!(matches!(
            gateway.list().await,
            Err(DirectoryError::DecodeStudents { .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_store_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let gateway = HttpStudentGateway::new(&format!("http://{addr}/students")).unwrap();
        assert!(matches!(
            gateway.list().await,
            Err(DirectoryError::Request {
                action: GatewayAction::List,
                ..
            })
        ));
    }
}
