use storydeck_application::{
    Catalog, FetchError, ListView, LoadState, PAGE_SIZE, StatusFilter, StorySource,
    available_statuses, filtered, page_slice, total_pages,
};
use storydeck_core::Story;
use storydeck_test::{FixtureSource, make_catalog, make_story};

async fn loaded(source: &FixtureSource) -> Catalog {
    let mut catalog = Catalog::new();
    let token = catalog.begin_load();
    let result = source.load_catalog().await;
    assert!(catalog.apply(token, result));
    catalog
}

fn ids(stories: &[&Story]) -> Vec<String> {
    stories.iter().map(|s| s.id.clone()).collect()
}

#[tokio::test]
async fn filter_by_status_keeps_exactly_matching_stories_in_order() {
    let catalog = loaded(&FixtureSource::new(make_catalog(23))).await;
    let stories = catalog.stories();

    let all = filtered(stories, &StatusFilter::All);
    assert_eq!(all.len(), stories.len());

    for status in available_statuses(stories) {
        let subset = filtered(stories, &StatusFilter::Only(status.clone()));
        let expected: Vec<String> = stories
            .iter()
            .filter(|s| s.status == status)
            .map(|s| s.id.clone())
            .collect();
        assert_eq!(ids(&subset), expected, "status {status}");
    }
}

#[tokio::test]
async fn pages_rebuild_the_filtered_list() {
    let catalog = loaded(&FixtureSource::new(make_catalog(29))).await;
    for filter in [
        StatusFilter::All,
        StatusFilter::Only("new".to_string()),
        StatusFilter::Only("completed".to_string()),
    ] {
        let subset = filtered(catalog.stories(), &filter);
        let pages = total_pages(subset.len(), PAGE_SIZE);
        let mut rebuilt = Vec::new();
        for page in 1..=pages {
            let slice = page_slice(&subset, page, PAGE_SIZE);
            assert!(!slice.is_empty() && slice.len() <= PAGE_SIZE);
            rebuilt.extend_from_slice(slice);
        }
        assert_eq!(ids(&rebuilt), ids(&subset));
        assert!(page_slice(&subset, pages + 1, PAGE_SIZE).is_empty());
    }
}

#[tokio::test]
async fn changing_status_always_lands_on_page_one() {
    let catalog = loaded(&FixtureSource::new(make_catalog(40))).await;
    let stories = catalog.stories();
    let mut view = ListView::new();

    for _ in 0..3 {
        while view.next_page(stories) {}
        assert!(view.page() > 1);
        view.cycle_status(stories, true);
        assert_eq!(view.page(), 1);
        view.select_status(StatusFilter::All);
        assert_eq!(view.page(), 1);
    }
}

#[tokio::test]
async fn unknown_status_tags_still_filter() {
    let mut stories = make_catalog(3);
    stories.push(make_story("odd", "Archived", 0));
    let catalog = loaded(&FixtureSource::new(stories)).await;
    assert_eq!(
        available_statuses(catalog.stories()),
        vec!["new", "in progress", "completed", "Archived"]
    );
    let subset = filtered(catalog.stories(), &StatusFilter::Only("Archived".to_string()));
    assert_eq!(ids(&subset), vec!["odd"]);
}

#[tokio::test]
async fn failed_catalog_leaves_an_empty_list() {
    let source = FixtureSource::failing(FetchError::Transport("connection reset".to_string()));
    let catalog = loaded(&source).await;
    assert!(catalog.stories().is_empty());
    assert!(matches!(catalog.state(), LoadState::Failed(msg) if msg.contains("connection reset")));

    let view = ListView::new();
    assert_eq!(view.total_pages(catalog.stories()), 0);
    assert!(view.visible(catalog.stories()).is_empty());
    assert_eq!(view.progress(catalog.stories()).percent(), 0.0);
}

#[tokio::test]
async fn catalog_decodes_from_wire_json() {
    let json = r#"[
        {"_id":"a1","Title":"Moon Base","Status":"new","Image":["covers/moon.png"],
         "Wordexplore":[{"Storytitle":"Crater","Storyttext":"a bowl-shaped hole","Storyitext":"The rover fell into a crater.","Storyimage":["w/crater.png"]}],
         "Storyadvenure":{"Storytitle":"Night on the Moon","content":[{"Storyimage":["s/1.png"],"Paragraph":"It was cold."}]},
         "Brainquest":[{"_id":"q1","Question":"Where?","Option":["Moon","Mars"],"Answer":"Moon"}]},
        {"_id":"a2","Title":"Bare","Status":null,"Wordexplore":null}
    ]"#;
    let stories = storydeck_remote::parse_catalog(json.as_bytes()).unwrap();
    assert_eq!(stories.len(), 2);
    assert_eq!(stories[0].words[0].word, "Crater");
    assert_eq!(stories[0].adventure.sections[0].body(), "It was cold.");
    assert_eq!(stories[0].questions[0].answer, "Moon");
    assert!(stories[1].words.is_empty());
    assert!(stories[1].status.is_empty());
    assert_eq!(stories[1].adventure_title(), "Bare");
    assert_eq!(available_statuses(&stories), vec!["new"]);
}
