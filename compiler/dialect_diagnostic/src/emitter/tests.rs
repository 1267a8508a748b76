use super::*;
use crate::ErrorCode;
use dialect_ir::Pos;
use pretty_assertions::assert_eq;

fn sample() -> Vec<Diagnostic> {
    vec![
        Diagnostic::warning(ErrorCode::E5101)
            .with_message("unused rule `Tag`")
            .with_label(Pos::new(1, 1), "declared here"),
        Diagnostic::error(ErrorCode::E4005)
            .with_message("need 1..* Email(s)")
            .with_label(Pos::new(4, 1), "in this object"),
        Diagnostic::info(ErrorCode::E9001)
            .with_message("loaded 3 rules")
            .with_label(Pos::new(1, 1), "here"),
        Diagnostic::error(ErrorCode::E4002)
            .with_message("unknown member `Phone`")
            .with_label(Pos::new(6, 3), "here")
            .with_note("valid members: key, Email"),
    ]
}

#[test]
fn test_render_groups_by_severity() {
    let text = render("person.dl", &sample());
    assert_eq!(
        text,
        "person.dl:4 need 1..* Email(s)\n\
         person.dl:6 unknown member `Phone`\n\
         \x20 = note: valid members: key, Email\n\
         person.dl:1 unused rule `Tag`\n\
         person.dl:1 loaded 3 rules\n\
         person.dl: failed with 2 errors; 1 warning emitted\n"
    );
}

#[test]
fn test_render_warnings_only() {
    let diags = vec![Diagnostic::warning(ErrorCode::E5101).with_message("unused rule `Tag`")];
    assert_eq!(
        render("d", &diags),
        "d:0 unused rule `Tag`\nd: 1 warning emitted\n"
    );
}

#[test]
fn test_render_empty() {
    assert_eq!(render("d", &[]), "");
}
