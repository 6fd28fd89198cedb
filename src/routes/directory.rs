use crate::{
    data::{
        IdForm,
        student::{DraftField, DraftFieldUpdate, Student, StudentDraft, StudentId},
    },
    directory::{DeleteOutcome, DirectoryView},
    error::DirectoryResult,
    maud_conveniences::{error_banner, form_element, form_submit_button, subtitle, title},
    state::{CLIENT_HEADER, DirectoryState, MountedDirectory, SharedDirectory},
};
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
};
use maud::{Markup, html};
use serde::Deserialize;
use serde_json::json;

const DIRECTORY_TARGET: &str = "#directory";

/// Every page load mounts its own directory, which then loads once.
pub async fn get_index(State(state): State<DirectoryState>) -> Markup {
    let (client, directory) = state.mount().await;
    info!(%client, "mounted student directory");

    let client = client.to_string();
    let headers = json!({ CLIENT_HEADER: client }).to_string();
    let fragment = render(&directory).await;

    state.render(html! {
        div class="w-full max-w-5xl" data-client-id=(client) hx-headers=(headers) {
            (fragment)
        }
    })
}

async fn render(directory: &SharedDirectory) -> Markup {
    render_directory(&*directory.view().await)
}

pub async fn internal_post_load(MountedDirectory(directory): MountedDirectory) -> Markup {
    directory.mount().await;
    render(&directory).await
}

pub async fn internal_get_directory(MountedDirectory(directory): MountedDirectory) -> Markup {
    render(&directory).await
}

pub async fn internal_post_open_add(MountedDirectory(directory): MountedDirectory) -> Markup {
    directory.open_add().await;
    render(&directory).await
}

pub async fn internal_post_open_edit(
    MountedDirectory(directory): MountedDirectory,
    Form(IdForm { id }): Form<IdForm>,
) -> DirectoryResult<Markup> {
    directory.open_edit(&id).await?;
    Ok(render(&directory).await)
}

pub async fn internal_post_close(MountedDirectory(directory): MountedDirectory) -> Markup {
    directory.close().await;
    render(&directory).await
}

pub async fn internal_post_draft(
    MountedDirectory(directory): MountedDirectory,
    Form(update): Form<DraftFieldUpdate>,
) -> StatusCode {
    for (field, value) in update.into_changes() {
        directory.set_field(field, value).await;
    }
    StatusCode::NO_CONTENT
}

pub async fn internal_post_submit(
    MountedDirectory(directory): MountedDirectory,
    Form(draft): Form<StudentDraft>,
) -> Markup {
    let outcome = directory.submit(Some(draft)).await;
    debug!(?outcome, "submitted student form");
    render(&directory).await
}

#[derive(Deserialize)]
pub struct DeleteForm {
    pub id: StudentId,
    #[serde(default)]
    pub confirmed: bool,
}

pub async fn internal_delete_student(
    MountedDirectory(directory): MountedDirectory,
    Query(DeleteForm { id, confirmed }): Query<DeleteForm>,
) -> Markup {
    let outcome = directory.delete(&id, move |_| confirmed).await;
    if outcome == DeleteOutcome::Declined {
        debug!(%id, "delete declined");
    }
    render(&directory).await
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

pub fn render_directory(view: &DirectoryView) -> Markup {
    if view.loading() {
        return html! {
            div id="directory" hx-post="/internal/directory/load" hx-trigger="load" hx-swap="outerHTML" class="flex flex-col items-center justify-center py-16" {
                div class="animate-spin rounded-full h-12 w-12 border-b-2 border-blue-500 mb-4" {}
                p {"Loading data..."}
            }
        };
    }

    let students = view.students();

    html! {
        div id="directory" class="flex flex-col space-y-4" {
            div class="bg-gray-800 p-6 rounded shadow-md flex flex-row items-center justify-between" {
                div {
                    (title("Student management system"))
                    p class="text-gray-300" {"Number of students: " (students.len())}
                }
                button hx-post="/internal/modal/add" hx-target=(DIRECTORY_TARGET) hx-swap="outerHTML" class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" {
                    "+ Add new student"
                }
            }

            @if let Some(error) = view.error() {
                (error_banner("An error occurred", error))
            }

            @if students.is_empty() {
                div class="bg-gray-800 p-8 rounded shadow-md text-center" {
                    (subtitle("No data"))
                    p class="text-gray-400" {"Start by adding a new student"}
                }
            } @else {
                div class="grid grid-cols-1 sm:grid-cols-2 md:grid-cols-3 gap-4" {
                    @for student in students {
                        (student_card(student))
                    }
                }
            }

            @if view.modal().is_open() {
                (render_modal(view))
            }
        }
    }
}

fn student_card(student: &Student) -> Markup {
    let id_vals = json!({ "id": student.id }).to_string();
    let delete_vals = json!({ "id": student.id, "confirmed": true }).to_string();

    html! {
        div data-student-id=(student.id.as_str()) class="rounded-lg shadow-md p-4 bg-gray-800" {
            div class="flex flex-row items-center justify-between mb-2" {
                span class="text-sm bg-blue-900 text-blue-200 px-2 py-1 rounded" {
                    (non_empty(student.class.as_ref()).unwrap_or("unspecified"))
                }
                div class="flex flex-row space-x-2" {
                    button title="Edit" hx-post="/internal/modal/edit" hx-vals=(id_vals) hx-target=(DIRECTORY_TARGET) hx-swap="outerHTML" class="hover:text-blue-400" {
                        "Edit"
                    }
                    button title="Delete" hx-delete="/internal/students" hx-vals=(delete_vals) hx-confirm="Are you sure you want to delete this student?" hx-target=(DIRECTORY_TARGET) hx-swap="outerHTML" class="hover:text-red-400" {
                        "Delete"
                    }
                }
            }
            h3 class="text-lg font-semibold" {(student.full_name)}
            p class="text-gray-300" {
                strong {"Email: "}
                (non_empty(student.email.as_ref()).unwrap_or("unavailable"))
            }
            p class="text-gray-300" {
                strong {"Age: "}
                (non_empty(student.age.as_ref()).unwrap_or("unspecified"))
            }
        }
    }
}

fn render_modal(view: &DirectoryView) -> Markup {
    let draft = view.draft();
    let editing = view.modal().editing().is_some();

    html! {
        div class="fixed inset-0 bg-black/60 flex items-center justify-center" {
            div class="bg-gray-800 p-6 rounded shadow-md w-full max-w-md" {
                div class="flex flex-row items-center justify-between" {
                    @if editing {
                        (subtitle("Edit student details"))
                    } @else {
                        (subtitle("Add new student"))
                    }
                    button title="Close" hx-post="/internal/modal/close" hx-target=(DIRECTORY_TARGET) hx-swap="outerHTML" {"✕"}
                }

                form hx-post="/internal/submit" hx-target=(DIRECTORY_TARGET) hx-swap="outerHTML" {
                    (form_element(DraftField::FullName, "Full name *", true, None, "Enter the full name", draft.get(DraftField::FullName)))
                    (form_element(DraftField::Email, "Email", false, Some("email"), "example@email.com", draft.get(DraftField::Email)))
                    (form_element(DraftField::Age, "Age", false, None, "e.g. 20", draft.get(DraftField::Age)))
                    (form_element(DraftField::Class, "Class", false, None, "e.g. First grade", draft.get(DraftField::Class)))

                    div class="flex items-center justify-between" {
                        @if editing {
                            (form_submit_button(Some("Save changes")))
                        } @else {
                            (form_submit_button(Some("Add student")))
                        }
                        button type="button" hx-post="/internal/modal/close" hx-target=(DIRECTORY_TARGET) hx-swap="outerHTML" class="bg-gray-600 hover:bg-gray-700 font-bold py-2 px-4 rounded" {
                            "Cancel"
                        }
                    }
                }
            }
        }
    }
}
