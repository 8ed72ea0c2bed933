// Resume matching: field extraction, categorization, scoring and the
// request pipeline tying them to the form.
// Collaborators are trait objects held in AppState.

pub mod category;
pub mod handlers;
pub mod pipeline;
pub mod resume_data;
pub mod scoring;
