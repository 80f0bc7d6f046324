use eventdigest_canonical::{
    canonicalize_event_type, canonicalize_key, walk, Canonicalized, EventTypeOptions, Exclusion,
    HintSources, IdentityDirectory, IdentityHints, StopWords,
};
use serde_json::json;

fn options(exclude_known_noise: bool, disable_slugging: bool) -> EventTypeOptions {
    EventTypeOptions {
        exclude_known_noise,
        disable_slugging,
        ..Default::default()
    }
}

fn signature(event_type: &str, options: EventTypeOptions) -> String {
    match canonicalize_event_type(event_type, &options, None) {
        Canonicalized::Signature(signature) => signature,
        Canonicalized::Excluded(reason) => panic!("{} excluded: {}", event_type, reason),
    }
}

fn excluded(event_type: &str, options: EventTypeOptions) -> Exclusion {
    match canonicalize_event_type(event_type, &options, None) {
        Canonicalized::Excluded(reason) => reason,
        Canonicalized::Signature(signature) => panic!("{} kept as {}", event_type, signature),
    }
}

#[test]
fn jump_to_id_keeps_five_segments() {
    let sig = signature(
        "/courses/course-v1:edX+DemoX+Demo_2014/jump_to_id/8f3a1c",
        options(false, false),
    );
    assert_eq!(sig, "/courses/(course_id)/jump_to_id/(block-id)");
    assert_eq!(sig.split('/').count(), 5);

    let sig = signature("/courses/edX/DemoX/Demo/jump_to_id/8f3a1c", options(true, true));
    assert_eq!(sig, "/courses/(course_id)/jump_to_id/(hex6)");
}

#[test]
fn xqueue_collapses_location_before_terminal_action() {
    let sig = signature(
        "/courses/edX/DemoX/Demo/xqueue/1/abc123def456/score_update",
        options(false, false),
    );
    assert_eq!(sig, "/courses/(course_id)/xqueue/(int1)/(block-loc)/score_update");

    let sig = signature(
        "/courses/edX/DemoX/Demo/xqueue/12/i4x:/edX/DemoX/problem/p1/ungraded_response",
        options(false, false),
    );
    assert_eq!(
        sig,
        "/courses/(course_id)/xqueue/(int2)/(block-loc)/ungraded_response"
    );

    assert_eq!(
        excluded(
            "/courses/edX/DemoX/Demo/xqueue/1/abc123def456/score_update",
            options(true, false)
        ),
        Exclusion::Route("xqueue".into())
    );
}

#[test]
fn xblock_handler_calls() {
    let sig = signature(
        "/courses/course-v1:edX+DemoX+Demo/xblock/block-v1:edX+DemoX+Demo+type@problem+block@d1/handler/xmodule_handler/problem_check",
        options(false, false),
    );
    assert_eq!(
        sig,
        "/courses/(course_id)/xblock/(xblock-loc)/handler/xmodule_handler/problem_check"
    );

    let sig = signature(
        "/courses/edX/DemoX/Demo/xblock/abc/view",
        options(false, false),
    );
    assert_eq!(sig, "/courses/(course_id)/xblock/(hex3)/view");
}

#[test]
fn collapsing_routes() {
    assert_eq!(
        signature(
            "/courses/edX/DemoX/Demo/submission_history/alice/i4x:/edX/p1",
            options(true, false)
        ),
        "/courses/(course_id)/(maybe_username)/(block-loc)"
    );
    assert_eq!(
        signature(
            "/courses/edX/DemoX/Demo/submission_history/alice",
            options(true, false)
        ),
        "/courses/(course_id)/(maybe_username)/(block-loc)"
    );
    assert_eq!(
        signature("/courses/edX/DemoX/Demo/submission_history", options(true, false)),
        "/courses/(course_id)/submission_history"
    );
    assert_eq!(
        signature(
            "/courses/edX/DemoX/Demo/courseware/week_1/lesson_2/",
            options(true, false)
        ),
        "/courses/(course_id)/courseware/(courseware-loc)"
    );
    assert_eq!(
        signature("/courses/edX/DemoX/Demo/courseware", options(true, false)),
        "/courses/(course_id)/courseware/(courseware-loc)"
    );
    assert_eq!(
        signature("/courses/edX/DemoX/Demo/jump_to/i4x:/edX/p1", options(false, false)),
        "/courses/(course_id)/(block-loc)"
    );
    assert_eq!(
        signature("/courses/edX/DemoX/Demo/jump_to", options(false, false)),
        "/courses/(course_id)/(block-loc)"
    );
    assert_eq!(
        excluded("/courses/edX/DemoX/Demo/jump_to/x", options(true, false)),
        Exclusion::Route("jump_to".into())
    );
}

#[test]
fn parenthesized_values_in_event_types_are_slugged() {
    assert_eq!(
        signature(
            "/courses/edX/DemoX/Demo/instructor/(alice1987)",
            options(false, false)
        ),
        "/courses/(course_id)/instructor/(alnum11)"
    );
}

#[test]
fn wiki_articles_and_commands() {
    assert_eq!(
        signature(
            "/courses/edX/DemoX/Demo/wiki/DemoX/page-one/_edit/",
            options(false, false)
        ),
        "/courses/(course_id)/wiki/(wikislug)/(wikislug)/_edit/"
    );
    assert_eq!(
        excluded(
            "/courses/edX/DemoX/Demo/wiki/DemoX/page-one/_edit/",
            options(true, false)
        ),
        Exclusion::WikiCommand
    );
    assert_eq!(
        signature(
            "/courses/edX/DemoX/Demo/wiki/DemoX/page-one/moment.js",
            options(true, false)
        ),
        "/courses/(course_id)/wiki/(wikislug)/(wikislug)/moment.js"
    );
    assert_eq!(
        signature(
            "/courses/edX/DemoX/Demo/wiki/DemoX/page-one/moment.js",
            options(true, true)
        ),
        "/courses/(course_id)/wiki/DemoX/page-one/moment.js"
    );
}

#[test]
fn discussion_ids() {
    assert_eq!(
        signature(
            "/courses/edX/DemoX/Demo/discussion/forum/intro_topic/threads/5f2a1b3c4d5e6f7a8b9c0d1e",
            options(true, false)
        ),
        "/courses/(course_id)/discussion/forum/(forum-id)/threads/(hex24)"
    );
    assert_eq!(
        signature(
            "/courses/edX/DemoX/Demo/discussion/general/threads/create",
            options(true, false)
        ),
        "/courses/(course_id)/discussion/(discussion-id)/threads/create"
    );
    assert_eq!(
        signature(
            "/courses/edX/DemoX/Demo/discussion/general/threads/create",
            options(true, true)
        ),
        "/courses/(course_id)/discussion/general/threads/create"
    );
}

#[test]
fn pdfbook_template_only_applies_under_noise_exclusion() {
    assert_eq!(
        signature("/courses/edX/DemoX/Demo/pdfbook/0/chapter/3/12", options(true, false)),
        "/courses/(course_id)/pdfbook/(int1)/chapter/(int1)/(int2)"
    );
    assert_eq!(
        excluded("/courses/edX/DemoX/Demo/pdfbook/0/notes", options(true, false)),
        Exclusion::PdfbookTemplate
    );
    assert_eq!(
        signature("/courses/edX/DemoX/Demo/pdfbook/0/notes", options(false, false)),
        "/courses/(course_id)/pdfbook/(int1)/notes"
    );
}

#[test]
fn noise_pages_with_trailing_segments() {
    assert_eq!(
        excluded("/courses/edX/DemoX/Demo/info/extra", options(true, false)),
        Exclusion::TrailingSegments
    );
    assert_eq!(
        signature("/courses/edX/DemoX/Demo/info", options(true, false)),
        "/courses/(course_id)/info"
    );
    assert_eq!(
        signature("/courses/edX/DemoX/Demo/info/extra", options(false, false)),
        "/courses/(course_id)/info/extra"
    );
    for page in ["progress", "course_wiki", "about", "teams"] {
        let path = format!("/courses/edX/DemoX/Demo/{}/1", page);
        assert_eq!(excluded(&path, options(true, false)), Exclusion::TrailingSegments);
    }
}

#[test]
fn unknown_routes() {
    assert_eq!(
        excluded("/courses/edX/DemoX/Demo/instructor/api/list", options(true, false)),
        Exclusion::Route("instructor".into())
    );
    assert_eq!(
        signature("/courses/edX/DemoX/Demo/instructor/api/42", options(false, false)),
        "/courses/(course_id)/instructor/api/(int2)"
    );
}

#[test]
fn disable_slugging_keeps_inclusion_decisions() {
    for event_type in [
        "/courses/edX/DemoX/Demo/xblock/a/handler/x",
        "/courses/edX/DemoX/Demo/info/extra",
        "/courses/edX/DemoX/Demo/wiki/a/_history",
        "/dashboard",
    ] {
        let slugged = canonicalize_event_type(event_type, &options(true, false), None);
        let unslugged = canonicalize_event_type(event_type, &options(true, true), None);
        assert_eq!(slugged.is_excluded(), unslugged.is_excluded(), "{}", event_type);
        assert!(slugged.is_excluded());
    }
}

#[test]
fn payload_key_paths_with_hints() {
    let mut directory = IdentityDirectory::new();
    directory.insert("12345", "alice", "alice@example.com");
    let sources = HintSources {
        username: Some("alice".into()),
        context_user_id: Some("12345".into()),
        payload_user_id: None,
    };
    let hints = IdentityHints::from_sources(&sources, Some(&directory));
    let payload = json!({
        "answers": {"i4x-edX-DemoX-problem-3f2a_2_1": "choice_0"},
        "POST": {"password": ["hunter2"]},
        "attempts": 2,
        "owner": 12345,
        "state": {}
    });
    let stopwords: StopWords = ["POST", "GET"].into_iter().collect();
    let paths: Vec<String> = walk(&payload, "event", &stopwords, Some(&hints)).collect();
    assert_eq!(
        paths,
        vec![
            "event.POST(TRIMMED)",
            "event.answers.(input-id)(string)",
            "event.attempts(int)",
            "event.owner(user-id)",
            "event.owner(user_id_from_username)",
            "event.state(emptydict)",
        ]
    );
    for path in &paths {
        assert_eq!(&canonicalize_key(path), path);
    }
}
