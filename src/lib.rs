//! Dream Journey core crate.
//!
//! Logic behind the birthday celebration page: the autoplaying progress
//! journey ([`journey`]), no-repeat random picks for the wish wall and art
//! gallery ([`sampler`]), and the visitor wish book ([`wishes`]). All of it runs
//! natively for tests; the browser glue lives in `web` and is only compiled for
//! `wasm32`. Particles, confetti, audio and toasts stay in the page scripts and
//! are reached through DOM events.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod content;
pub mod error;
pub mod journey;
pub mod sampler;
pub mod shortcuts;
pub mod wishes;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{next_artwork, next_wish, start_site};

pub use config::JourneyConfig;
pub use content::{Artwork, ContentPack, WishCard};
pub use error::{ConfigError, ContentError, SamplerError, WishError};
pub use journey::{
    Frame, JourneyInput, ManualScheduler, Phase, PhaseChange, ProgressController, ProgressState,
    Renderer, ResumeMode, Scheduler, TimerHandle,
};
pub use sampler::{NoRepeatSampler, RandomSource, SystemRandom, XorShift64};
pub use wishes::{KeyValueStore, MemoryStore, Wish, WishBook};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}

// -----------------------------------------------------------------------------
// Bundled content (used when the page supplies no content pack)
// -----------------------------------------------------------------------------

/// (author, text)
pub const DEFAULT_WISHES: &[(&str, &str)] = &[
    ("Sapnap", "Happy birthday Dream! Thanks for all the chaos and the laughs."),
    ("GeorgeNotFound", "Happy birthday! Still can't see green, still a fan."),
    ("BadBoyHalo", "Happy birthday you muffin! Have the best day!"),
    ("A Speedrun Fan", "Every manhunt got me on the edge of my seat. Happy birthday!"),
    ("SMP Citizen", "Thank you for building a world we all got to live in. Happy birthday!"),
    ("Night Owl", "Your music kept me company through finals. Happy birthday!"),
    ("Anonymous Fan", "Wishing you a year as legendary as a one-shot dragon kill."),
    ("Sketchbook Kid", "You inspired me to start drawing. Happy birthday Dream!"),
];

/// (file under `assets/artworks/`, artist, description)
pub const SAMPLE_ARTWORKS: &[(&str, &str, &str)] = &[
    ("sample_art_1.jpg", "Community Artist", "Speedrun Master"),
    ("sample_art_2.jpg", "Community Artist", "Manhunt Legend"),
    ("sample_art_3.jpg", "Community Artist", "Face Reveal"),
    ("sample_art_4.jpg", "Community Artist", "SMP Birthday"),
    ("sample_art_5.jpg", "Community Artist", "Music Journey"),
    ("sample_art_6.jpg", "Community Artist", "Dream Team"),
];
