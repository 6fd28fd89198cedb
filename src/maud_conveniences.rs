use crate::data::student::DraftField;
use maud::{Markup, Render, html};

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn subtitle(s: impl Render) -> Markup {
    html! {
        h2 class="text-xl font-semibold mb-4" {(s)}
    }
}

/// A labelled draft input. Every keystroke posts just this field back to the directory.
pub fn form_element(
    field: DraftField,
    label: &str,
    required: bool,
    ty: Option<&str>,
    placeholder: &str,
    value: &str,
) -> Markup {
    let name = field.wire_name();

    html! {
        div class="mb-4" {
            label for=(name) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            input
                type=(ty.unwrap_or("text"))
                id=(name)
                name=(name)
                value=(value)
                placeholder=(placeholder)
                required[required]
                hx-post="/internal/draft"
                hx-trigger="input changed delay:150ms"
                hx-params=(name)
                hx-swap="none"
                class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {}
        }
    }
}

pub fn form_submit_button(text: Option<&str>) -> Markup {
    html! {
        button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
            (text.unwrap_or("Submit"))
        }
    }
}

pub fn error_banner(heading: &str, message: &str) -> Markup {
    html! {
        div role="alert" class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" {
            strong class="font-bold" {(heading)}
            br;
            span class="block sm:inline" {(message)}
        }
    }
}
