use storydeck_application::{
    Catalog, DetailView, FetchError, Navigation, Navigator, OptionMark, RequestToken, Step,
    StoryState, StorySource,
};
use storydeck_core::Tab;
use storydeck_test::{FixtureSource, make_catalog, make_question, make_story};

/// Opens `id` the way the UI does: ids from the catalog, story fetched alone.
async fn open(source: &FixtureSource, id: &str) -> DetailView {
    let ids = source
        .load_catalog()
        .await
        .map(|stories| stories.into_iter().map(|s| s.id).collect())
        .unwrap_or_default();
    let (mut view, token) = DetailView::open(ids, id, RequestToken::default());
    let result = source.load_story(id).await;
    assert!(view.apply_story(token, result));
    view
}

async fn follow(source: &FixtureSource, view: &mut DetailView, nav: Navigation) -> bool {
    match nav {
        Navigation::Load { token, id } => {
            let result = source.load_story(&id).await;
            view.apply_story(token, result)
        }
        Navigation::Blocked => false,
    }
}

fn answer_all(view: &mut DetailView, pick: usize) {
    view.select_tab(Tab::BrainQuest);
    let count = view.story().map(|s| s.questions.len()).unwrap_or(0);
    for _ in 0..count {
        for _ in 0..pick {
            view.option_next();
        }
        assert!(view.choose());
        view.move_down();
    }
}

#[tokio::test]
async fn quiz_scores_only_matching_selections_and_freezes() {
    let mut story = make_story("quiz", "new", 0);
    story.questions = vec![
        make_question("q1", &["a", "b"], "a"),
        make_question("q2", &["a", "b"], "b"),
        make_question("q3", &["a", "b"], "a"),
    ];
    let source = FixtureSource::new(vec![story]);
    let mut view = open(&source, "quiz").await;

    assert!(!view.can_submit());
    view.select_option("q1", "a");
    view.select_option("q2", "a");
    assert!(!view.can_submit());
    assert_eq!(view.submit(), None);
    view.select_option("q3", "a");
    assert!(view.can_submit());

    let score = view.submit().unwrap();
    assert_eq!((score.correct, score.total), (2, 3));

    assert!(!view.select_option("q2", "b"));
    assert_eq!(view.answers().selection("q2"), Some("a"));
    assert_eq!(view.score(), Some(score));

    let story = view.story().unwrap();
    let q2 = &story.questions[1];
    assert_eq!(view.answers().mark(q2, "a"), OptionMark::Incorrect);
    assert_eq!(view.answers().mark(q2, "b"), OptionMark::Unselected);
}

#[tokio::test]
async fn navigator_blocks_at_both_ends() {
    let catalog = make_catalog(4);
    let mut nav = Navigator::from_catalog(&catalog, 0);
    assert_eq!(nav.prev(), Step::Blocked);
    assert_eq!(nav.position(), 0);

    let mut nav = Navigator::from_catalog(&catalog, 3);
    assert_eq!(nav.next(), Step::Blocked);
    assert_eq!(nav.position(), 3);

    for i in 1..3 {
        let mut nav = Navigator::from_catalog(&catalog, i);
        assert!(matches!(nav.prev(), Step::Moved { .. }));
        assert!(matches!(nav.next(), Step::Moved { index, .. } if index == i));
    }
}

#[tokio::test]
async fn consecutive_navigation_resets_detail_state() {
    let source = FixtureSource::new(make_catalog(4));
    let mut view = open(&source, "s0").await;

    for expected in ["s1", "s2", "s3"] {
        answer_all(&mut view, 0);
        assert!(view.submit().is_some());
        assert!(view.answers().is_revealed());

        let nav = view.next();
        assert_eq!(view.tab(), Tab::WordExplorer);
        assert_eq!(view.answers().answered(), 0);
        assert!(!view.answers().is_revealed());
        assert!(follow(&source, &mut view, nav).await);
        assert_eq!(view.story().map(|s| s.id.as_str()), Some(expected));
    }
    assert_eq!(view.next(), Navigation::Blocked);

    let nav = view.prev();
    assert!(follow(&source, &mut view, nav).await);
    assert_eq!(view.navigator().current_id(), Some("s2"));
}

#[tokio::test]
async fn superseded_story_response_is_ignored() {
    let source = FixtureSource::new(make_catalog(3));
    let mut view = open(&source, "s0").await;

    let Navigation::Load { token: first, id: first_id } = view.next() else {
        panic!("expected a load");
    };
    let Navigation::Load { token: second, id: second_id } = view.next() else {
        panic!("expected a load");
    };

    // the newer request resolves first, the older one straggles in afterwards
    let newer = source.load_story(&second_id).await;
    let older = source.load_story(&first_id).await;
    assert!(view.apply_story(second, newer));
    assert!(!view.apply_story(first, older));
    assert_eq!(view.story().map(|s| s.id.as_str()), Some("s2"));
}

#[tokio::test]
async fn unknown_id_surfaces_not_found_at_position_zero() {
    let source = FixtureSource::new(make_catalog(3));
    let view = open(&source, "missing").await;
    assert_eq!(view.navigator().position(), 0);
    assert!(matches!(view.state(), StoryState::NotFound(msg) if msg.contains("missing")));
    assert!(!view.shows_submit());
}

#[tokio::test]
async fn failed_id_list_blocks_navigation() {
    let mut source = FixtureSource::failing(FetchError::Http { status: 502 });
    source.stories = vec![make_story("solo", "new", 1)];
    let mut view = open(&source, "solo").await;
    assert!(view.story().is_some());
    assert!(view.navigator().is_empty());
    assert_eq!(view.prev(), Navigation::Blocked);
    assert_eq!(view.next(), Navigation::Blocked);
}

#[tokio::test]
async fn story_without_questions_has_no_submit() {
    let source = FixtureSource::new(vec![make_story("empty", "new", 0)]);
    let mut view = open(&source, "empty").await;
    view.select_tab(Tab::BrainQuest);
    assert!(view.can_submit());
    assert!(!view.shows_submit());
    assert_eq!(view.submit(), None);
    assert!(!view.answers().is_revealed());
}

#[tokio::test]
async fn index_mode_walks_the_in_memory_catalog() {
    let catalog = Catalog::with_stories(make_catalog(3));
    let mut view = DetailView::from_catalog(catalog.stories(), 1);
    answer_all(&mut view, 1);
    assert!(view.step_in(catalog.stories(), false));
    assert_eq!(view.story().map(|s| s.id.as_str()), Some("s0"));
    assert_eq!(view.answers().answered(), 0);
    assert!(!view.step_in(catalog.stories(), false));
}
