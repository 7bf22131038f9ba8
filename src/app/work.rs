use leptos::{either::Either, ev, prelude::*};
use leptos_meta::Title;
use leptos_use::{use_event_listener_with_options, use_window, UseEventListenerOptions};

use crate::config::{RevealTiming, SlideTiming, GLOBAL_MOTION_CONFIG};
use crate::motion::{
    image_settle, image_zoomed, reveal_style, slide_entry, slide_entry_start, slide_exit,
    slide_offscreen, slide_rest, split_words, Frame, RevealPlan,
};
use crate::navigator::{Direction, SlideNavigator, SlidePosition, SwipeTracker, Transition};
use crate::projects::{get_projects, index_label, Project};

use super::scope::{now, use_animation_scope, Scope};

/// Tags, index and description.
const DETAIL_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
struct SlideVisual {
    frame: Frame,
    image: Frame,
    revealed: bool,
}

impl SlideVisual {
    fn current() -> Self {
        Self {
            frame: slide_rest(),
            image: image_zoomed(),
            revealed: false,
        }
    }

    fn parked() -> Self {
        Self {
            frame: slide_offscreen(),
            image: image_zoomed(),
            revealed: false,
        }
    }
}

#[component]
pub fn WorkPage() -> impl IntoView {
    let projects = match get_projects() {
        Ok(projects) => projects,
        Err(e) => {
            log::error!("{e}");
            Vec::new()
        }
    };
    view! {
        <Title text="Work" />
        {if projects.is_empty() {
            Either::Left(
                view! { <p class="gallery-empty">"No projects to show yet."</p> },
            )
        } else {
            Either::Right(view! { <Gallery projects /> })
        }}
    }
}

#[component]
fn Gallery(projects: Vec<Project>) -> impl IntoView {
    let config = *GLOBAL_MOTION_CONFIG;
    let timing = config.slides;
    let reveal = config.reveal;
    let len = projects.len();

    let navigator = RwSignal::new(SlideNavigator::mount(len, timing, 0));
    let visuals = RwSignal::new(
        (0..len)
            .map(|i| {
                if i == 0 {
                    SlideVisual::current()
                } else {
                    SlideVisual::parked()
                }
            })
            .collect::<Vec<_>>(),
    );
    let plans = StoredValue::new(
        projects
            .iter()
            .map(|p| RevealPlan::new(split_words(&p.title).len(), DETAIL_LINES, &reveal))
            .collect::<Vec<_>>(),
    );
    let scope = use_animation_scope();
    let swipe = StoredValue::new(SwipeTracker::default());

    // opening reveal, browser only
    Effect::new(move |_| {
        let mounted_at = now();
        navigator.set(SlideNavigator::mount(len, timing, mounted_at));
        scope.after_paint(move || {
            visuals.update(|v| {
                if let Some(first) = v.first_mut() {
                    first.image = image_settle(&timing);
                    first.revealed = true;
                }
            });
        });
        scope.after(timing.initial_hold_ms, move || {
            navigator.maybe_update(|n| {
                let at = now().max(n.ready_at());
                n.release_input(at)
            });
        });
    });

    let go = move |direction: Direction| {
        let Some(t) = navigator
            .try_maybe_update(|n| {
                let accepted = n.request_transition(direction, now());
                (accepted.is_some(), accepted)
            })
            .flatten()
        else {
            return;
        };
        run_transition(t, timing, navigator, visuals, plans, scope);
    };

    let _ = use_event_listener_with_options(
        use_window(),
        ev::wheel,
        move |e| {
            e.prevent_default();
            if let Some(direction) = Direction::from_wheel(e.delta_y()) {
                go(direction);
            }
        },
        UseEventListenerOptions::default().passive(false),
    );

    let on_touch_start = move |e: ev::TouchEvent| {
        if let Some(touch) = e.touches().get(0) {
            swipe.update_value(|s| s.begin(touch.client_y() as f64));
        }
    };
    let on_touch_end = move |e: ev::TouchEvent| {
        let Some(touch) = e.changed_touches().get(0) else {
            return;
        };
        let direction = swipe
            .try_update_value(|s| s.end(touch.client_y() as f64, timing.swipe_threshold_px))
            .flatten();
        if let Some(direction) = direction {
            go(direction);
        }
    };

    let slides = projects
        .into_iter()
        .enumerate()
        .map(|(index, project)| {
            let plan = plans.with_value(|p| p[index].clone());
            view! { <Slide index project plan reveal navigator visuals /> }
        })
        .collect_view();

    view! {
        <section class="gallery" on:touchstart=on_touch_start on:touchend=on_touch_end>
            {slides}
            <div class="gallery-counter">
                <span>
                    {move || index_label(navigator.with(|n| n.current_index()) + 1)}
                </span>
                " / "
                <span>{index_label(len)}</span>
            </div>
        </section>
    }
}

/// Applies a phase step, notifying only when the navigator accepted it.
fn advance(
    navigator: RwSignal<SlideNavigator>,
    step: impl FnOnce(&mut SlideNavigator) -> bool,
) -> bool {
    navigator
        .try_maybe_update(|n| {
            let applied = step(n);
            (applied, applied)
        })
        .unwrap_or(false)
}

/// Exit, swap, entrance and settle of one accepted transition.
fn run_transition(
    t: Transition,
    timing: SlideTiming,
    navigator: RwSignal<SlideNavigator>,
    visuals: RwSignal<Vec<SlideVisual>>,
    plans: StoredValue<Vec<RevealPlan>>,
    scope: Scope,
) {
    let same_slide = t.from == t.to;
    visuals.update(|v| {
        if !same_slide {
            v[t.from].frame = slide_exit(t.direction, &timing);
        }
        v[t.to] = SlideVisual {
            frame: if same_slide {
                v[t.to].frame
            } else {
                slide_entry_start(t.direction)
            },
            image: image_zoomed(),
            revealed: false,
        };
    });

    scope.after(timing.swap_at_ms, move || {
        if !advance(navigator, |n| n.swap(t.id)) {
            return;
        }
        if same_slide {
            visuals.update(|v| v[t.to].frame = slide_entry_start(t.direction));
        }
        scope.after_paint(move || {
            visuals.update(|v| {
                let incoming = &mut v[t.to];
                incoming.frame = slide_entry(&timing);
                incoming.image = image_settle(&timing);
                incoming.revealed = true;
            });
        });

        let text_ms = plans.with_value(|p| p.get(t.to).map_or(0, |plan| plan.total));
        scope.after(timing.entrance_ms.max(text_ms), move || {
            if !advance(navigator, |n| n.finish(t.id)) {
                return;
            }
            if !same_slide {
                visuals.update(|v| v[t.from] = SlideVisual::parked());
            }
            scope.after(timing.settle_ms, move || {
                navigator.maybe_update(|n| n.settle(t.id, now()));
            });
        });
    });
}

#[component]
fn Slide(
    index: usize,
    project: Project,
    plan: RevealPlan,
    reveal: RevealTiming,
    navigator: RwSignal<SlideNavigator>,
    visuals: RwSignal<Vec<SlideVisual>>,
) -> impl IntoView {
    let visual = move || visuals.with(|v| v.get(index).copied());
    let shown = move || visual().is_some_and(|v| v.revealed);
    let layer = move || match navigator.with(|n| n.position_of(index)) {
        SlidePosition::Incoming => 3,
        SlidePosition::Outgoing => 2,
        SlidePosition::Active => 1,
        SlidePosition::OffScreen => 0,
    };
    let frame_style = move || {
        let frame = visual().map(|v| v.frame.to_style()).unwrap_or_default();
        format!("z-index: {}; {frame}", layer())
    };
    let image_style = move || visual().map(|v| v.image.to_style()).unwrap_or_default();
    let masked = move |delay| move || reveal_style(shown(), delay, &reveal);

    let title_words = split_words(&project.title)
        .into_iter()
        .enumerate()
        .map(|(i, word)| {
            view! {
                <span class="reveal-mask">
                    <span class="reveal-item" style=masked(plan.word(i))>
                        {word.to_string()}
                    </span>
                </span>
                " "
            }
        })
        .collect_view();

    let lines = [
        project.tags.join(" · "),
        project.summary_line(index + 1),
        project.short_description.clone(),
    ];
    let detail_lines = lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            view! {
                <span class="reveal-mask block">
                    <span class="reveal-item block" style=masked(plan.line(i))>
                        {text}
                    </span>
                </span>
            }
        })
        .collect_view();

    view! {
        <article class="slide" style=frame_style>
            <div class="slide-image" style=image_style>
                <img src=project.banner_image.clone() alt=project.title.clone() />
            </div>
            <div class="slide-copy">
                <h2 class="slide-title">{title_words}</h2>
                <p class="slide-details">{detail_lines}</p>
                <span class="reveal-mask">
                    <a class="reveal-item slide-link" href=project.detail_href() style=masked(plan.link)>
                        "View project"
                    </a>
                </span>
            </div>
        </article>
    }
}
