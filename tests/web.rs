// Browser tests for the wasm glue. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

fn mount_fixture() {
    let doc = web_sys::window().unwrap().document().unwrap();
    let body = doc.body().unwrap();
    body.set_inner_html(
        r#"<section id="journey">
             <div id="journey-track" style="width:400px;height:20px">
               <div id="journey-progress-fill"></div>
               <div id="journey-character"><img id="journey-character-img"></div>
             </div>
             <button class="journey-checkpoint" data-phase="1"></button>
             <button class="journey-checkpoint" data-phase="3"></button>
           </section>
           <p id="randomWishText"></p><span id="randomWishAuthor"></span>
           <img id="artworkImage"><span id="artworkArtist"></span>
           <div id="wishList"></div>"#,
    );
}

#[wasm_bindgen_test]
fn site_boots_and_draws_content() {
    mount_fixture();
    dream_journey::start_site(None, None).unwrap();

    let doc = web_sys::window().unwrap().document().unwrap();
    let character: HtmlElement = doc
        .get_element_by_id("journey-character")
        .unwrap()
        .dyn_into()
        .unwrap();
    let left = character.style().get_property_value("left").unwrap();
    let pct: f64 = left.trim_end_matches('%').parse().unwrap();
    assert!(left.ends_with('%'));
    assert!(pct < 1.0);
    assert_eq!(
        doc.get_element_by_id("journey")
            .unwrap()
            .get_attribute("data-phase")
            .as_deref(),
        Some("1")
    );
    let active = doc
        .query_selector(".journey-checkpoint.active")
        .unwrap()
        .and_then(|el| el.get_attribute("data-phase"));
    assert_eq!(active.as_deref(), Some("1"));

    let wish: dream_journey::WishCard =
        serde_json::from_str(&dream_journey::next_wish().unwrap()).unwrap();
    assert!(!wish.text.is_empty());
    let art: dream_journey::Artwork =
        serde_json::from_str(&dream_journey::next_artwork().unwrap()).unwrap();
    assert!(art.path.starts_with("assets/artworks/"));

    // a second boot is ignored
    assert!(dream_journey::start_site(None, None).is_ok());
}
