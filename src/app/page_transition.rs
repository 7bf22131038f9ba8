use leptos::{ev::MouseEvent, prelude::*};
use leptos_router::{
    hooks::{use_location, use_navigate},
    NavigateOptions,
};

use crate::config::PageTiming;
use crate::transition::{PagePhase, PageTransitions};

use super::scope::{now, use_animation_scope};

/// Shared page transition state. Links produce navigations, the overlay drives them.
#[derive(Debug, Clone, Copy)]
pub struct PageTransitionService(RwSignal<PageTransitions>);

impl PageTransitionService {
    pub fn provide(timing: PageTiming) -> Self {
        let service = Self(RwSignal::new(PageTransitions::new(timing)));
        provide_context(service);
        service
    }

    pub fn expect() -> Self {
        expect_context::<Self>()
    }

    /// Returns false when a transition is already running or `href` is the current page.
    pub fn navigate(self, current: &str, href: &str) -> bool {
        self.0
            .try_maybe_update(|t| {
                let accepted = t.begin(current, href, now()).is_some();
                (accepted, accepted)
            })
            .unwrap_or(false)
    }

    pub fn content_style(self) -> String {
        self.0.with(|t| t.content_frame().to_style())
    }

    fn overlay_style(self) -> String {
        self.0.with(|t| t.overlay_frame().to_style())
    }
}

#[component]
pub fn PageTransitionOverlay() -> impl IntoView {
    let service = PageTransitionService::expect();
    let state = service.0;
    let timing = state.with_untracked(|t| *t.timing());
    let scope = use_animation_scope();
    let navigate = use_navigate();
    let location = use_location();

    Effect::new(move |_| match state.with(|t| t.phase().clone()) {
        PagePhase::Idle => {}
        PagePhase::Covering(n) => {
            let id = n.id;
            scope.after(timing.cover_ms, move || {
                state.maybe_update(|t| t.covered(id).is_some());
            });
            scope.after(timing.safety_timeout_ms, move || {
                state.maybe_update(|t| t.cover_timed_out(id, now()));
            });
        }
        PagePhase::Navigating(n) => {
            navigate(&n.to, NavigateOptions::default());
            scope.after(timing.safety_timeout_ms, move || {
                state.maybe_update(|t| t.route_timed_out(n.id, now()));
            });
        }
        PagePhase::Revealing(n) => {
            scope.after(timing.reveal_ms, move || {
                state.maybe_update(|t| t.revealed(n.id));
            });
        }
        PagePhase::Cooling(n) => {
            scope.after(timing.buffer_ms, move || {
                state.maybe_update(|t| t.idle(n.id));
            });
        }
    });

    Effect::new(move |_| {
        let path = location.pathname.get();
        state.maybe_update(|t| t.arrived(&path).is_some());
    });

    view! { <div class="page-overlay" aria-hidden="true" style=move || service.overlay_style()></div> }
}

/// Anchor that navigates through the page transition instead of swapping routes directly.
#[component]
pub fn TransitionLink(
    href: &'static str,
    #[prop(optional)] class: &'static str,
    children: Children,
) -> impl IntoView {
    let service = PageTransitionService::expect();
    let location = use_location();
    let on_click = move |ev: MouseEvent| {
        let modified = ev.ctrl_key() || ev.meta_key() || ev.shift_key() || ev.alt_key();
        if ev.default_prevented() || ev.button() != 0 || modified {
            return;
        }
        ev.prevent_default();
        let current = location.pathname.get_untracked();
        service.navigate(&current, href);
    };
    view! {
        <a href=href class=class on:click:undelegated=on_click>
            {children()}
        </a>
    }
}
