use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use storydeck_application::{AppContext, FetchError, LoadState, StorySource};
use storydeck_core::{Settings, Tab};
use storydeck_remote::Loader;
use storydeck_test::{FixtureSource, make_catalog};
use storydeck_ui::Ui;

struct Harness {
    ui: Ui,
    _runtime: tokio::runtime::Runtime,
}

impl Harness {
    fn new(source: FixtureSource, show_images: bool) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let source: Arc<dyn StorySource> = Arc::new(source);
        let (loader, events) = Loader::new(source, runtime.handle().clone());
        let settings = Settings {
            show_images,
            ..Settings::default()
        };
        let mut ui = Ui::new(AppContext::new(settings), loader, events);
        ui.start();
        Self {
            ui,
            _runtime: runtime,
        }
    }

    fn press(&mut self, code: KeyCode) {
        let _ = self
            .ui
            .handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn settle_until(&mut self, done: impl Fn(&Ui) -> bool) {
        for _ in 0..300 {
            self.ui.pump();
            if done(&self.ui) {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("ui never settled");
    }

    fn wait_for_catalog(&mut self) {
        self.settle_until(|ui| !matches!(ui.context().catalog.state(), LoadState::Loading));
    }

    fn wait_for_story(&mut self) {
        self.settle_until(|ui| ui.context().detail().is_some_and(|v| v.story().is_some()));
    }

    fn screen(&mut self) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 32)).unwrap();
        terminal.draw(|frame| self.ui.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol().to_string())
            .collect()
    }
}

fn png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([200, 40, 90, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

#[test]
fn browse_filter_and_page() {
    let mut h = Harness::new(FixtureSource::new(make_catalog(20)), false);
    assert!(h.screen().contains("Loading stories..."));
    h.wait_for_catalog();

    let screen = h.screen();
    assert!(screen.contains("Story s0"));
    assert!(screen.contains("Page 1 of 3"));

    h.press(KeyCode::Right);
    h.press(KeyCode::Right);
    assert!(h.screen().contains("Story s16"));

    h.press(KeyCode::Tab);
    assert_eq!(h.ui.context().list.page(), 1);
    let screen = h.screen();
    assert!(screen.contains("Story s0"));
    assert!(!screen.contains("Story s1 "));
}

#[test]
fn catalog_failure_then_retry() {
    let mut h = Harness::new(
        FixtureSource::failing(FetchError::Http { status: 500 }),
        false,
    );
    h.wait_for_catalog();
    let screen = h.screen();
    assert!(screen.contains("Could not load stories."));
    assert!(screen.contains("HTTP 500"));

    h.press(KeyCode::Char('r'));
    assert!(h.screen().contains("Loading stories..."));
    h.wait_for_catalog();
    assert!(h.screen().contains("Press r to retry."));
}

#[test]
fn open_story_take_quiz_and_move_on() {
    let mut h = Harness::new(FixtureSource::new(make_catalog(3)), false);
    h.wait_for_catalog();
    h.press(KeyCode::Down);
    h.press(KeyCode::Enter);
    h.wait_for_story();

    let screen = h.screen();
    assert!(screen.contains("Story 2 of 3"));
    assert!(screen.contains("Orbit"));

    h.press(KeyCode::Char('2'));
    assert!(h.screen().contains("The rocket lifted off."));

    h.press(KeyCode::Char('3'));
    for _ in 0..3 {
        h.press(KeyCode::Enter);
        h.press(KeyCode::Down);
    }
    h.press(KeyCode::Char('s'));
    assert!(h.screen().contains("You got 3 out of 3 correct!"));

    h.press(KeyCode::Char('n'));
    h.wait_for_story();
    let view = h.ui.context().detail().unwrap();
    assert_eq!(view.tab(), Tab::WordExplorer);
    assert!(!view.answers().is_revealed());
    assert!(h.screen().contains("Story 3 of 3"));

    h.press(KeyCode::Esc);
    assert!(h.ui.context().detail().is_none());
    assert_eq!(h.ui.context().list.cursor(), 1);
}

#[test]
fn cover_image_is_fetched_and_shown() {
    let url = format!("{}/covers/s0.png", Settings::default().image_base_url);
    let source = FixtureSource::new(make_catalog(2)).with_image(&url, png());
    let mut h = Harness::new(source, true);
    h.wait_for_catalog();
    assert!(h.screen().contains("Loading image..."));

    for _ in 0..300 {
        h.ui.pump();
        if !h.screen().contains("Loading image...") {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    let screen = h.screen();
    assert!(!screen.contains("Loading image..."));
    assert!(!screen.contains("Image unavailable"));

    // s1 has no image registered in the fixture
    h.press(KeyCode::Down);
    for _ in 0..300 {
        h.ui.pump();
        if h.screen().contains("Image unavailable") {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("missing image never reported");
}
