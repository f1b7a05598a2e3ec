//! Shared helpers for window integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use cueview::config::{AppConfig, HelpUrls};
use cueview::menu::{Action, Menu};
use cueview::settings::{Settings, SettingsStore, SettingsValue};
use cueview::window::{
    FacilityBackend, FacilityConfig, PanelPlugins, UrlOpener, UserPrompt, WindowSession,
};
use parking_lot::Mutex;

/// A facility backend that records every activation.
pub struct RecordingBackend {
    config: Mutex<FacilityConfig>,
    pub activations: Mutex<Vec<String>>,
}

impl RecordingBackend {
    pub fn new(names: &[&str], default: &str) -> Arc<Self> {
        Arc::new(Self {
            config: Mutex::new(FacilityConfig::new(names.iter().copied(), default).unwrap()),
            activations: Mutex::new(Vec::new()),
        })
    }

    /// Replace the facility list served from now on.
    pub fn offer(&self, names: &[&str], default: &str) {
        *self.config.lock() = FacilityConfig::new(names.iter().copied(), default).unwrap();
    }
}

impl FacilityBackend for RecordingBackend {
    fn facility_config(&self) -> cueview::Result<FacilityConfig> {
        Ok(self.config.lock().clone())
    }

    fn set_active_facility(&self, name: &str) {
        self.activations.lock().push(name.to_string());
    }
}

/// A prompt with scripted answers that records what it was shown.
#[derive(Default)]
pub struct ScriptedPrompt {
    pub text_answers: Mutex<VecDeque<Option<String>>>,
    pub confirm_answer: AtomicBool,
    pub confirmations: AtomicUsize,
    pub informs: Mutex<Vec<String>>,
    pub abouts: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn answer_text(&self, answer: Option<&str>) {
        self.text_answers
            .lock()
            .push_back(answer.map(str::to_string));
    }

    pub fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }
}

impl UserPrompt for ScriptedPrompt {
    fn request_text(&self, _title: &str, _label: &str, _current: &str) -> Option<String> {
        self.text_answers.lock().pop_front().flatten()
    }

    fn confirm(&self, _title: &str, _message: &str) -> bool {
        self.confirmations.fetch_add(1, Ordering::SeqCst);
        self.confirm_answer.load(Ordering::SeqCst)
    }

    fn inform(&self, _title: &str, message: &str) {
        self.informs.lock().push(message.to_string());
    }

    fn about(&self, _title: &str, message: &str) {
        self.abouts.lock().push(message.to_string());
    }
}

/// Records opened URLs instead of launching a browser.
#[derive(Default)]
pub struct RecordingUrls {
    pub opened: Mutex<Vec<String>>,
}

impl UrlOpener for RecordingUrls {
    fn open_url(&self, url: &str) {
        self.opened.lock().push(url.to_string());
    }
}

/// Records plugin calls as `"<call>:<slot>"`.
#[derive(Default)]
pub struct RecordingPlugins {
    pub calls: Mutex<Vec<String>>,
}

impl RecordingPlugins {
    pub fn calls_for(&self, call: &str) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| c.strip_prefix(&format!("{call}:")).map(str::to_string))
            .collect()
    }
}

impl PanelPlugins for RecordingPlugins {
    fn setup_menu(&self, slot: &str, menu: &Menu) {
        self.calls.lock().push(format!("setup:{slot}"));
        menu.add_action(Arc::new(Action::new("Monitor Jobs")));
    }

    fn restore_state(&self, slot: &str) {
        self.calls.lock().push(format!("restore:{slot}"));
    }

    fn save_state(&self, slot: &str) {
        self.calls.lock().push(format!("save:{slot}"));
    }
}

/// Wraps [`Settings`] and counts how its writes reach the disk.
pub struct CountingStore {
    inner: Arc<Settings>,
    depth: AtomicUsize,
    dirty: AtomicBool,
    /// Sets made outside any batch, each an immediate write.
    pub unbatched_sets: AtomicUsize,
    /// Outermost batches that ended with changes to write.
    pub flushes: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<Settings>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            depth: AtomicUsize::new(0),
            dirty: AtomicBool::new(false),
            unbatched_sets: AtomicUsize::new(0),
            flushes: AtomicUsize::new(0),
        })
    }

    pub fn reset(&self) {
        self.unbatched_sets.store(0, Ordering::SeqCst);
        self.flushes.store(0, Ordering::SeqCst);
    }
}

impl SettingsStore for CountingStore {
    fn value(&self, key: &str) -> Option<SettingsValue> {
        self.inner.value(key)
    }

    fn set_value(&self, key: &str, value: SettingsValue) {
        if self.depth.load(Ordering::SeqCst) == 0 {
            self.unbatched_sets.fetch_add(1, Ordering::SeqCst);
        } else {
            self.dirty.store(true, Ordering::SeqCst);
        }
        self.inner.set_value(key, value);
    }

    fn identity(&self) -> String {
        self.inner.identity()
    }

    fn begin_batch(&self) {
        self.depth.fetch_add(1, Ordering::SeqCst);
        self.inner.begin_batch();
    }

    fn end_batch(&self) {
        if self.depth.fetch_sub(1, Ordering::SeqCst) == 1 && self.dirty.swap(false, Ordering::SeqCst) {
            self.flushes.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.end_batch();
    }
}

pub struct Harness {
    pub session: Arc<WindowSession>,
    pub settings: Arc<Settings>,
    pub store: Arc<CountingStore>,
    pub backend: Arc<RecordingBackend>,
    pub prompt: Arc<ScriptedPrompt>,
    pub urls: Arc<RecordingUrls>,
    pub plugins: Arc<RecordingPlugins>,
}

pub fn config() -> AppConfig {
    AppConfig::new("App", "2.1.0").with_urls(HelpUrls {
        user_guide: "https://docs.example.com/guide".to_string(),
        suggestion: "https://example.com/suggest".to_string(),
        bug: "https://example.com/bugs".to_string(),
    })
}

pub fn harness() -> Harness {
    harness_with(config(), Arc::new(Settings::new()))
}

pub fn harness_with(config: AppConfig, settings: Arc<Settings>) -> Harness {
    cueview::logging::init("cueview=debug");

    let backend = RecordingBackend::new(&["local", "cloud"], "local");
    let prompt = Arc::new(ScriptedPrompt::default());
    let urls = Arc::new(RecordingUrls::default());
    let plugins = Arc::new(RecordingPlugins::default());
    let store = CountingStore::new(settings.clone());

    let session = WindowSession::builder(config)
        .settings(store.clone())
        .facility_backend(backend.clone())
        .prompt(prompt.clone())
        .url_opener(urls.clone())
        .plugins(plugins.clone())
        .build()
        .unwrap();

    Harness {
        session,
        settings,
        store,
        backend,
        prompt,
        urls,
        plugins,
    }
}

/// Current labels of the shared Window menu entries.
pub fn slot_labels(session: &WindowSession) -> Vec<String> {
    session
        .window_menu()
        .actions()
        .iter()
        .map(|action| action.text())
        .collect()
}
