//! The student directory: one owner of the list, the modal and the draft.
//! One directory is mounted per page load and never shared between clients.
//!
//! Network calls never hold the state lock. Each operation takes what it needs
//! from the view, awaits the gateway, then applies a single success or failure
//! transition.

use crate::{
    data::student::{DraftField, Student, StudentDraft, StudentId},
    error::{DirectoryError, DirectoryResult, MissingStudentSnafu},
    gateway::StudentGateway,
};
use snafu::OptionExt;
use tokio::sync::{Mutex, MutexGuard, OnceCell};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Closed,
    AddOpen,
    EditOpen(Student),
}

impl ModalState {
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub const fn editing(&self) -> Option<&Student> {
        match self {
            Self::EditOpen(student) => Some(student),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved,
    Failed,
    MissingFullName,
    NothingToSubmit,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Failed,
    Declined,
}

#[derive(Debug, Clone)]
pub struct DirectoryView {
    students: Vec<Student>,
    loading: bool,
    error: Option<String>,
    modal: ModalState,
    draft: StudentDraft,
}

impl Default for DirectoryView {
    fn default() -> Self {
        Self {
            students: Vec::new(),
            loading: true,
            error: None,
            modal: ModalState::Closed,
            draft: StudentDraft::empty(),
        }
    }
}

impl DirectoryView {
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub const fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub const fn draft(&self) -> &StudentDraft {
        &self.draft
    }

    pub fn find(&self, id: &StudentId) -> Option<&Student> {
        self.students.iter().find(|s| &s.id == id)
    }

    fn begin_initial_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn begin_request(&mut self) {
        self.error = None;
    }

    fn fail(&mut self, error: &DirectoryError) {
        warn!(?error, "directory operation failed");
        self.error = Some(error.banner_message());
    }

    fn finish_list(&mut self, result: DirectoryResult<Vec<Student>>) {
        match result {
            Ok(students) => self.students = students,
            Err(e) => self.fail(&e),
        }
        self.loading = false;
    }

    fn open_add(&mut self) {
        self.modal = ModalState::AddOpen;
        self.draft = StudentDraft::empty();
    }

    fn open_edit(&mut self, student: Student) {
        self.draft = StudentDraft::from(&student);
        self.modal = ModalState::EditOpen(student);
    }

    fn close(&mut self) {
        self.modal = ModalState::Closed;
        self.draft = StudentDraft::empty();
    }
}

enum PendingSubmit {
    Create(StudentDraft),
    Update(StudentId, StudentDraft),
}

pub struct StudentDirectory<G> {
    gateway: G,
    view: Mutex<DirectoryView>,
    mounted: OnceCell<()>,
}

impl<G: StudentGateway> StudentDirectory<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            view: Mutex::new(DirectoryView::default()),
            mounted: OnceCell::new(),
        }
    }

    pub async fn view(&self) -> MutexGuard<'_, DirectoryView> {
        self.view.lock().await
    }

    /// Runs the start-up load once. Later calls wait for that load to finish.
    pub async fn mount(&self) {
        self.mounted.get_or_init(|| self.load()).await;
    }

    /// The start-up load: the only fetch that raises the loading flag.
    pub async fn load(&self) {
        self.view.lock().await.begin_initial_load();
        let result = self.gateway.list().await;
        let mut view = self.view.lock().await;
        if let Ok(students) = &result {
            info!(count = students.len(), "loaded students");
        }
        view.finish_list(result);
    }

    async fn reload(&self) {
        self.view.lock().await.begin_request();
        let result = self.gateway.list().await;
        self.view.lock().await.finish_list(result);
    }

    pub async fn open_add(&self) {
        self.view.lock().await.open_add();
    }

    pub async fn open_edit(&self, id: &StudentId) -> DirectoryResult<()> {
        let mut view = self.view.lock().await;
        let student = view
            .find(id)
            .cloned()
            .context(MissingStudentSnafu { id: id.clone() })?;
        view.open_edit(student);
        Ok(())
    }

    pub async fn close(&self) {
        self.view.lock().await.close();
    }

    pub async fn set_field(&self, field: DraftField, value: String) {
        self.view.lock().await.draft.set(field, value);
    }

    /// Creates or updates depending on the modal. A closed modal has nothing to submit.
    /// Posted form values become the draft only while the modal is open.
    pub async fn submit(&self, posted: Option<StudentDraft>) -> SubmitOutcome {
        let pending = {
            let mut view = self.view.lock().await;
            if !view.modal.is_open() {
                return SubmitOutcome::NothingToSubmit;
            }
            if let Some(posted) = posted {
                view.draft = posted;
            }

            let draft = view.draft.clone();
            let pending = match &view.modal {
                ModalState::Closed => return SubmitOutcome::NothingToSubmit,
                _ if !draft.has_full_name() => return SubmitOutcome::MissingFullName,
                ModalState::AddOpen => PendingSubmit::Create(draft),
                ModalState::EditOpen(student) => PendingSubmit::Update(student.id.clone(), draft),
            };
            view.begin_request();
            pending
        };

        let result = match &pending {
            PendingSubmit::Create(draft) => self.gateway.create(draft).await,
            PendingSubmit::Update(id, draft) => self.gateway.update(id, draft).await,
        };

        match result {
            Ok(_) => {
                self.reload().await;
                self.view.lock().await.close();
                SubmitOutcome::Saved
            }
            Err(e) => {
                self.view.lock().await.fail(&e);
                SubmitOutcome::Failed
            }
        }
    }

    /// `confirm` is asked before anything else happens; declining issues no request.
    pub async fn delete(
        &self,
        id: &StudentId,
        confirm: impl FnOnce(&StudentId) -> bool,
    ) -> DeleteOutcome {
        if !confirm(id) {
            return DeleteOutcome::Declined;
        }

        self.view.lock().await.begin_request();
        match self.gateway.delete(id).await {
            Ok(()) => {
                info!(%id, "deleted student");
                self.reload().await;
                self.view.lock().await.close();
                DeleteOutcome::Deleted
            }
            Err(e) => {
                self.view.lock().await.fail(&e);
                DeleteOutcome::Failed
            }
        }
    }
}
