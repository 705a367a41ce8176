use patentloom_core::JobBuilder;
use tempfile::tempdir;

use super::*;

#[test]
fn accepts_a_well_formed_idea_job() {
    let job = JobBuilder::default().mode(Mode::Idea).iterations(2).build();
    assert!(validate(&job.input).is_ok());
}

#[test]
fn rejects_iterations_out_of_range() {
    let job = JobBuilder::default().iterations(0).build();
    assert!(validate(&job.input).is_err());
    let job = JobBuilder::default().iterations(11).build();
    assert!(validate(&job.input).is_err());
}

#[test]
fn rejects_blank_idea_text() {
    let mut job = JobBuilder::default().mode(Mode::Idea).build();
    job.input.idea_text = Some("   ".to_string());
    assert!(validate(&job.input).is_err());
}

#[test]
fn rejects_code_mode_without_project_path() {
    let mut job = JobBuilder::default().mode(Mode::Code).build();
    job.input.project_path = None;
    assert!(validate(&job.input).is_err());
}

#[test]
fn rejects_code_mode_with_nonexistent_project_path() {
    let mut job = JobBuilder::default().mode(Mode::Code).build();
    job.input.project_path = Some("/no/such/path/at/all".into());
    assert!(validate(&job.input).is_err());
}

#[test]
fn accepts_code_mode_with_existing_project_path() {
    let dir = tempdir().expect("tempdir");
    let mut job = JobBuilder::default().mode(Mode::Code).build();
    job.input.project_path = Some(dir.path().to_path_buf());
    assert!(validate(&job.input).is_ok());
}

#[test]
fn rejects_output_name_with_path_separator() {
    let mut job = JobBuilder::default().build();
    job.input.output_name = Some("../escape".to_string());
    assert!(validate(&job.input).is_err());
}

#[test]
fn rejects_blank_template_id() {
    let mut job = JobBuilder::default().build();
    job.input.template_id = Some("  ".to_string());
    assert!(validate(&job.input).is_err());
}
