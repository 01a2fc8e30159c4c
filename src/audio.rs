//! Clip playback for the loop tracker
//!
//! Plays one slice of a single audio file and reports back when the slice
//! has ended, so the tracker can allow its next move.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlAudioElement;

use crate::settings::AudioConfig;
use crate::sim::SoundRange;

/// Audio element wrapper
pub struct ClipPlayer {
    element: Option<HtmlAudioElement>,
}

impl ClipPlayer {
    pub fn new(config: &AudioConfig) -> Self {
        let element = HtmlAudioElement::new_with_src(&config.clip_url).ok();
        match &element {
            Some(element) => {
                let volume = if config.muted { 0.0 } else { config.master_volume.clamp(0.0, 1.0) };
                element.set_volume(volume as f64);
            }
            None => log::warn!("Failed to create audio element - audio disabled"),
        }
        Self { element }
    }

    /// Nothing is playing right now
    pub fn is_idle(&self) -> bool {
        self.element.as_ref().map(|e| e.paused()).unwrap_or(true)
    }

    /// Play `range` and call `on_done` once it has ended.
    ///
    /// `on_done` still runs when audio is unavailable so the caller's
    /// cooldown always lifts.
    pub fn play_range(&self, range: SoundRange, on_done: impl FnOnce() + 'static) {
        if let Some(element) = &self.element {
            element.set_current_time(range.start);
            if let Err(e) = element.play() {
                log::warn!("Audio playback refused: {:?}", e);
            }
        }

        let element = self.element.clone();
        let finish: js_sys::Function = Closure::once_into_js(move || {
            if let Some(element) = element {
                let _ = element.pause();
                element.set_current_time(0.0);
            }
            on_done();
        })
        .unchecked_into();

        let scheduled = web_sys::window().and_then(|w| {
            w.set_timeout_with_callback_and_timeout_and_arguments_0(
                &finish,
                range.duration_ms() as i32,
            )
            .ok()
        });
        finish_unscheduled(scheduled, &finish);
    }
}

/// Run `finish` right away when no timer holds it
fn finish_unscheduled(scheduled: Option<i32>, finish: &js_sys::Function) {
    if scheduled.is_some() {
        return;
    }
    log::error!("Failed to schedule end of clip, finishing now");
    if let Err(e) = finish.call0(&JsValue::NULL) {
        log::error!("Clip finish callback failed: {:?}", e);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn flagging_callback() -> (Rc<Cell<u32>>, js_sys::Function) {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let callback = Closure::once_into_js(move || counter.set(counter.get() + 1));
        (calls, callback.unchecked_into())
    }

    #[wasm_bindgen_test]
    fn test_unscheduled_clip_finishes_immediately() {
        let (calls, finish) = flagging_callback();
        finish_unscheduled(None, &finish);
        assert_eq!(calls.get(), 1);
    }

    #[wasm_bindgen_test]
    fn test_scheduled_clip_waits_for_timer() {
        let (calls, finish) = flagging_callback();
        finish_unscheduled(Some(7), &finish);
        assert_eq!(calls.get(), 0);
    }
}
