use leptos::leptos_dom::helpers::{request_animation_frame, set_timeout_with_handle, TimeoutHandle};
use leptos::prelude::*;

use crate::config::{duration, Millis};
use crate::motion::{AnimationScope, Cancel};
use crate::pointer::Rect;

impl Cancel for TimeoutHandle {
    fn cancel(self) {
        self.clear();
    }
}

/// Page clock in milliseconds. Browser only.
pub fn now() -> Millis {
    js_sys::Date::now() as Millis
}

/// Client rect of `el` in viewport coordinates.
pub fn rect_of(el: &web_sys::Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect::new(r.left(), r.top(), r.width(), r.height())
}

/// Deferred animation steps owned by the calling component.
#[derive(Debug, Clone, Copy)]
pub struct Scope(StoredValue<AnimationScope<TimeoutHandle>>);

/// Creates a scope that is revoked when the calling component unmounts.
pub fn use_animation_scope() -> Scope {
    let scope = StoredValue::new(AnimationScope::new());
    on_cleanup(move || {
        scope.try_update_value(|s| s.revoke());
    });
    Scope(scope)
}

impl Scope {
    /// Runs `f` after `ms` unless the scope has been revoked by then.
    pub fn after(self, ms: Millis, f: impl FnOnce() + 'static) {
        let Some(step) = self.0.try_with_value(|s| s.guard(f)) else {
            return;
        };
        match set_timeout_with_handle(step, duration(ms)) {
            Ok(handle) => {
                self.0.try_update_value(|s| s.track(handle));
            }
            Err(e) => log::debug!("animation step not scheduled: {e:?}"),
        }
    }

    /// Runs `f` on the next animation frame.
    pub fn frame(self, f: impl FnOnce() + 'static) {
        if let Some(step) = self.0.try_with_value(|s| s.guard(f)) {
            request_animation_frame(step);
        }
    }

    /// Runs `f` once the styles set in this frame have been painted, so a
    /// transition starts from them instead of jumping.
    pub fn after_paint(self, f: impl FnOnce() + 'static) {
        self.frame(move || self.frame(f));
    }
}
