//! Browser glue: DOM renderer, `setInterval` / `setTimeout` scheduler,
//! `localStorage` wish store and event wiring. wasm32 only.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Display;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, EventTarget, HtmlElement, HtmlImageElement, HtmlTextAreaElement,
    KeyboardEvent, PointerEvent, Storage, window,
};

use crate::config::JourneyConfig;
use crate::content::{Artwork, ContentPack, WishCard};
use crate::error::WishError;
use crate::journey::{
    Frame, JourneyInput, Phase, PhaseChange, ProgressController, Renderer, Scheduler, TimerHandle,
    track_fraction,
};
use crate::sampler::{NoRepeatSampler, SystemRandom};
use crate::shortcuts::{KonamiDetector, Shortcut};
use crate::wishes::{KeyValueStore, WishBook};

// --- Renderer -----------------------------------------------------------------

struct DomRenderer {
    doc: Document,
}

impl DomRenderer {
    fn html(&self, id: &str) -> Option<HtmlElement> {
        self.doc.get_element_by_id(id)?.dyn_into().ok()
    }
}

impl Renderer for DomRenderer {
    fn render(&mut self, frame: Frame) {
        let pct = format!("{:.3}%", frame.progress);
        let transition = if frame.animate { "" } else { "none" };
        if let Some(el) = self.html("journey-character") {
            let style = el.style();
            style.set_property("transition", transition).ok();
            style.set_property("left", &pct).ok();
        }
        if let Some(el) = self.html("journey-progress-fill") {
            let style = el.style();
            style.set_property("transition", transition).ok();
            style.set_property("width", &pct).ok();
        }
        if let Some(el) = self.doc.get_element_by_id("journey") {
            let phase = frame.phase.number().to_string();
            el.set_attribute("data-phase", &phase).ok();
        }
        for cp in checkpoints(&self.doc) {
            let n = cp
                .get_attribute("data-phase")
                .and_then(|v| v.parse::<u8>().ok());
            cp.class_list()
                .toggle_with_force("active", n == Some(frame.phase.number()))
                .ok();
        }
    }

    fn phase_changed(&mut self, change: PhaseChange) {
        log::info!("journey: entering phase {}", change.new_phase.number());
        if let Some(img) = self
            .doc
            .get_element_by_id("journey-character-img")
            .and_then(|el| el.dyn_into::<HtmlImageElement>().ok())
        {
            img.set_src(&change.new_phase.asset_path());
        }
    }
}

fn checkpoints(doc: &Document) -> Vec<Element> {
    let Ok(list) = doc.query_selector_all(".journey-checkpoint") else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

// --- Scheduler ------------------------------------------------------------------

struct BrowserTimer {
    id: i32,
    interval: bool,
    _callback: Closure<dyn FnMut()>,
}

/// Owns the JS callbacks of live timers. Cancelled or fired timers are parked in
/// `retired` and dropped at the start of the next dispatch, never while their own
/// callback is still on the stack.
#[derive(Default)]
struct BrowserScheduler {
    next_id: u64,
    live: HashMap<TimerHandle, BrowserTimer>,
    retired: Vec<BrowserTimer>,
}

impl BrowserScheduler {
    fn arm(&mut self, ms: u32, interval: bool) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let callback = Closure::wrap(Box::new(move || dispatch_timer(handle)) as Box<dyn FnMut()>);
        let Some(win) = window() else {
            log::error!("timer: no window, timer {} not armed", handle.0);
            return handle;
        };
        let fun = callback.as_ref().unchecked_ref();
        let armed = if interval {
            win.set_interval_with_callback_and_timeout_and_arguments_0(fun, ms as i32)
        } else {
            win.set_timeout_with_callback_and_timeout_and_arguments_0(fun, ms as i32)
        };
        match armed {
            Ok(id) => {
                self.live.insert(
                    handle,
                    BrowserTimer {
                        id,
                        interval,
                        _callback: callback,
                    },
                );
            }
            Err(e) => log::error!("timer: failed to arm: {e:?}"),
        }
        handle
    }

    fn reap(&mut self) {
        self.retired.clear();
    }

    /// A one-shot timer ran; its callback can go once this dispatch finishes.
    fn mark_fired(&mut self, handle: TimerHandle) {
        if self.live.get(&handle).is_some_and(|t| !t.interval) {
            if let Some(t) = self.live.remove(&handle) {
                self.retired.push(t);
            }
        }
    }
}

impl Scheduler for BrowserScheduler {
    fn set_interval(&mut self, period_ms: u32) -> TimerHandle {
        self.arm(period_ms, true)
    }

    fn set_timeout(&mut self, delay_ms: u32) -> TimerHandle {
        self.arm(delay_ms, false)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        let Some(timer) = self.live.remove(&handle) else {
            return;
        };
        if let Some(win) = window() {
            if timer.interval {
                win.clear_interval_with_handle(timer.id);
            } else {
                win.clear_timeout_with_handle(timer.id);
            }
        }
        self.retired.push(timer);
    }
}

fn dispatch_timer(handle: TimerHandle) {
    with_site(|site| {
        let scheduler = site.journey.scheduler_mut();
        scheduler.reap();
        scheduler.mark_fired(handle);
        site.journey.fire(handle);
    });
}

// --- Storage ------------------------------------------------------------------

struct LocalStorage(Option<Storage>);

impl LocalStorage {
    fn open() -> Self {
        Self(window().and_then(|w| w.local_storage().ok().flatten()))
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.0.as_ref()?.get_item(key).ok().flatten()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), WishError> {
        let storage = self
            .0
            .as_ref()
            .ok_or_else(|| WishError::Storage("localStorage unavailable".into()))?;
        storage
            .set_item(key, value)
            .map_err(|e| WishError::Storage(format!("{e:?}")))
    }
}

// --- Site state -----------------------------------------------------------------

struct Site {
    doc: Document,
    journey: ProgressController<DomRenderer, BrowserScheduler>,
    wishes: NoRepeatSampler<WishCard>,
    artworks: NoRepeatSampler<Artwork>,
    book: WishBook<LocalStorage>,
    konami: KonamiDetector,
    journey_visible: bool,
}

thread_local! {
    static SITE: RefCell<Option<Site>> = const { RefCell::new(None) };
}

fn with_site<T>(f: impl FnOnce(&mut Site) -> T) -> Option<T> {
    SITE.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

fn to_js(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn now_seed() -> u64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now().to_bits())
        .unwrap_or(0)
}

// --- Entry points ---------------------------------------------------------------

/// Boot the page logic. Both arguments are optional JSON documents; absent
/// ones fall back to defaults and the bundled content.
#[wasm_bindgen]
pub fn start_site(
    config_json: Option<String>,
    content_json: Option<String>,
) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if SITE.with(|cell| cell.borrow().is_some()) {
        log::warn!("start_site called twice; ignoring");
        return Ok(());
    }

    let config = match config_json {
        Some(json) => JourneyConfig::from_json(&json).map_err(to_js)?,
        None => JourneyConfig::default(),
    };
    let content = match content_json {
        Some(json) => ContentPack::from_json(&json).map_err(to_js)?,
        None => ContentPack::builtin(),
    };
    if let Err(e) = content.require_artworks() {
        log::warn!("{e}");
    }

    let book = WishBook::load(LocalStorage::open());
    let mut wish_pool = content.wishes;
    wish_pool.extend(book.wishes().iter().map(WishCard::from));
    let seed = now_seed();

    let mut journey = ProgressController::new(
        config,
        DomRenderer { doc: doc.clone() },
        BrowserScheduler::default(),
    );
    journey.render_current(false);

    SITE.with(|cell| {
        *cell.borrow_mut() = Some(Site {
            doc: doc.clone(),
            journey,
            wishes: NoRepeatSampler::with_rng(wish_pool, SystemRandom::with_fallback_seed(seed)),
            artworks: NoRepeatSampler::with_rng(
                content.artworks,
                SystemRandom::with_fallback_seed(seed.rotate_left(17)),
            ),
            book,
            konami: KonamiDetector::new(),
            journey_visible: false,
        });
    });

    wire_journey(&doc)?;
    wire_wishes(&doc)?;
    wire_gallery(&doc)?;
    wire_keys(&doc)?;
    listen::<web_sys::Event>(&win, "scroll", |_| check_visibility())?;
    listen::<web_sys::Event>(&win, "resize", |_| check_visibility())?;

    check_visibility();
    with_site(|site| {
        show_next_wish(site).ok();
        show_next_artwork(site).ok();
        render_wish_list(site);
    });
    log::info!("dream journey started");
    Ok(())
}

/// Draw the next wish card and return it as JSON.
#[wasm_bindgen]
pub fn next_wish() -> Result<String, JsValue> {
    with_site(show_next_wish)
        .ok_or_else(|| JsValue::from_str("site not started"))?
}

/// Draw the next artwork and return it as JSON.
#[wasm_bindgen]
pub fn next_artwork() -> Result<String, JsValue> {
    with_site(show_next_artwork)
        .ok_or_else(|| JsValue::from_str("site not started"))?
}

// --- Event wiring ---------------------------------------------------------------

fn listen<E: JsCast + 'static>(
    target: &EventTarget,
    event: &str,
    mut f: impl FnMut(E) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |evt: web_sys::Event| {
        if let Ok(e) = evt.dyn_into::<E>() {
            f(e);
        }
    }) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn on_click(
    doc: &Document,
    id: &str,
    mut f: impl FnMut(&mut Site) + 'static,
) -> Result<(), JsValue> {
    let Some(el) = doc.get_element_by_id(id) else {
        return Ok(());
    };
    listen::<web_sys::MouseEvent>(&el, "click", move |_| {
        with_site(&mut f);
    })
}

fn pointer_fraction(track: &Element, evt: &PointerEvent) -> f64 {
    let rect = track.get_bounding_client_rect();
    track_fraction(evt.client_x() as f64, rect.left(), rect.width())
}

fn wire_journey(doc: &Document) -> Result<(), JsValue> {
    if let Some(track) = doc.get_element_by_id("journey-track") {
        {
            let t = track.clone();
            listen::<PointerEvent>(&track, "pointerdown", move |evt| {
                t.set_pointer_capture(evt.pointer_id()).ok();
                let fraction = pointer_fraction(&t, &evt);
                with_site(|site| site.journey.handle(JourneyInput::PointerDown { fraction }));
            })?;
        }
        {
            let t = track.clone();
            listen::<PointerEvent>(&track, "pointermove", move |evt| {
                let fraction = pointer_fraction(&t, &evt);
                with_site(|site| site.journey.handle(JourneyInput::PointerMove { fraction }));
            })?;
        }
        for name in ["pointerup", "pointercancel"] {
            listen::<PointerEvent>(&track, name, |_| {
                with_site(|site| site.journey.handle(JourneyInput::PointerUp));
            })?;
        }
    } else {
        log::warn!("journey: #journey-track missing, drag disabled");
    }

    for cp in checkpoints(doc) {
        let Some(phase) = cp
            .get_attribute("data-phase")
            .and_then(|v| v.parse::<u8>().ok())
            .and_then(Phase::from_number)
        else {
            continue;
        };
        listen::<web_sys::MouseEvent>(&cp, "click", move |evt| {
            evt.stop_propagation();
            with_site(|site| site.journey.handle(JourneyInput::CheckpointClick(phase)));
        })?;
    }
    Ok(())
}

fn check_visibility() {
    with_site(|site| {
        let Some(visible) = journey_in_view(&site.doc) else {
            return;
        };
        if visible != site.journey_visible {
            site.journey_visible = visible;
            site.journey.handle(JourneyInput::VisibilityChanged(visible));
        }
    });
}

fn journey_in_view(doc: &Document) -> Option<bool> {
    let el = doc.get_element_by_id("journey")?;
    let height = window()?.inner_height().ok()?.as_f64()?;
    let rect = el.get_bounding_client_rect();
    Some(rect.top() < height && rect.bottom() > 0.0)
}

fn wire_wishes(doc: &Document) -> Result<(), JsValue> {
    on_click(doc, "nextWishBtn", |site| {
        show_next_wish(site).ok();
    })?;
    if let Some(btn) = doc.get_element_by_id("addWishBtn") {
        listen::<web_sys::MouseEvent>(&btn, "click", |_| submit_wish())?;
    }
    on_click(doc, "clearWishesBtn", |site| {
        let confirmed = window()
            .and_then(|w| {
                w.confirm_with_message("Are you sure you want to clear all wishes?")
                    .ok()
            })
            .unwrap_or(false);
        if !confirmed {
            return;
        }
        // Cards already handed to the wish sampler stay in its pool until reload.
        match site.book.clear() {
            Ok(()) => set_text(&site.doc, "wishStatus", "All wishes cleared!"),
            Err(e) => log::warn!("wishes: {e}"),
        }
        render_wish_list(site);
    })?;
    if let Some(input) = doc.get_element_by_id("wishInput") {
        listen::<KeyboardEvent>(&input, "keydown", |evt| {
            if evt.key() == "Enter" && evt.ctrl_key() {
                submit_wish();
            }
        })?;
    }
    Ok(())
}

fn wire_gallery(doc: &Document) -> Result<(), JsValue> {
    on_click(doc, "nextArtBtn", |site| {
        show_next_artwork(site).ok();
    })
}

fn wire_keys(doc: &Document) -> Result<(), JsValue> {
    listen::<KeyboardEvent>(doc, "keydown", |evt| {
        let in_text_field = evt
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .map(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA"))
            .unwrap_or(false);
        let code = evt.code();
        let key = evt.key();
        let fired = with_site(|site| {
            let mut events = Vec::new();
            if site.konami.push(&code) {
                log::info!("konami code entered");
                events.push("dream:celebrate");
            }
            if let Some(shortcut) = Shortcut::from_key(&key, in_text_field) {
                events.push(shortcut.event_name());
            }
            (site.doc.clone(), events)
        });
        // outside the borrow: page listeners may call `next_wish` / `next_artwork`
        if let Some((doc, events)) = fired {
            for name in events {
                announce(&doc, name);
            }
        }
    })
}

// --- Wish wall / gallery rendering ------------------------------------------------

fn set_text(doc: &Document, id: &str, text: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

fn announce(doc: &Document, name: &str) {
    match web_sys::Event::new(name) {
        Ok(evt) => {
            doc.dispatch_event(&evt).ok();
        }
        Err(e) => log::warn!("failed to create {name} event: {e:?}"),
    }
}

fn show_next_wish(site: &mut Site) -> Result<String, JsValue> {
    let card = site.wishes.next().map_err(to_js)?.clone();
    set_text(&site.doc, "randomWishText", &format!("\"{}\"", card.text));
    set_text(&site.doc, "randomWishAuthor", &format!("- {}", card.author));
    serde_json::to_string(&card).map_err(to_js)
}

fn show_next_artwork(site: &mut Site) -> Result<String, JsValue> {
    let art = site.artworks.next().map_err(to_js)?.clone();
    if let Some(img) = site
        .doc
        .get_element_by_id("artworkImage")
        .and_then(|el| el.dyn_into::<HtmlImageElement>().ok())
    {
        img.set_src(&art.path);
        img.set_alt(&art.description);
    }
    set_text(&site.doc, "artworkArtist", &art.artist);
    set_text(&site.doc, "artworkDescription", &art.description);
    if let Some(link) = site.doc.get_element_by_id("artworkLink") {
        if art.link.is_empty() {
            link.set_attribute("hidden", "").ok();
        } else {
            link.remove_attribute("hidden").ok();
            link.set_attribute("href", &art.link).ok();
        }
    }
    serde_json::to_string(&art).map_err(to_js)
}

fn submit_wish() {
    let sent = with_site(|site| (site.doc.clone(), add_wish_from_input(site)));
    if let Some((doc, Some(name))) = sent {
        announce(&doc, name);
    }
}

/// Returns the event to announce once the site borrow is released.
fn add_wish_from_input(site: &mut Site) -> Option<&'static str> {
    let Some(input) = site
        .doc
        .get_element_by_id("wishInput")
        .and_then(|el| el.dyn_into::<HtmlTextAreaElement>().ok())
    else {
        return None;
    };
    let mut sent = None;
    let now = chrono::Local::now();
    let timestamp = now.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string();
    match site.book.add(&input.value(), now.timestamp_millis(), &timestamp) {
        Ok(wish) => {
            site.wishes.push(WishCard::from(wish));
            input.set_value("");
            set_text(&site.doc, "wishStatus", "Birthday wish sent!");
            sent = Some("dream:wish-sent");
        }
        Err(WishError::EmptyText) => {
            set_text(&site.doc, "wishStatus", "Please write a message first!");
        }
        Err(e) => {
            // kept in memory for this visit even though it was not saved
            log::warn!("wishes: {e}");
            if let Some(wish) = site.book.wishes().first() {
                site.wishes.push(WishCard::from(wish));
            }
            input.set_value("");
        }
    }
    render_wish_list(site);
    sent
}

fn render_wish_list(site: &Site) {
    let Some(list) = site.doc.get_element_by_id("wishList") else {
        return;
    };
    list.set_text_content(None);
    if site.book.is_empty() {
        if let Ok(p) = site.doc.create_element("p") {
            p.set_class_name("wish-empty");
            p.set_text_content(Some("No wishes yet. Be the first to send one!"));
            list.append_child(&p).ok();
        }
        return;
    }
    for wish in site.book.wishes() {
        let Ok(item) = build_wish_item(&site.doc, &wish.text, &wish.author, &wish.timestamp)
        else {
            continue;
        };
        item.set_attribute("data-wish-id", &wish.id.to_string()).ok();
        list.append_child(&item).ok();
    }
}

fn build_wish_item(
    doc: &Document,
    text: &str,
    author: &str,
    timestamp: &str,
) -> Result<Element, JsValue> {
    let item = doc.create_element("div")?;
    item.set_class_name("wish-item");
    let body = doc.create_element("p")?;
    body.set_text_content(Some(&format!("\"{text}\"")));
    let by = doc.create_element("span")?;
    by.set_class_name("wish-author");
    by.set_text_content(Some(&format!("- {author} ({timestamp})")));
    item.append_child(&body)?;
    item.append_child(&by)?;
    Ok(item)
}
