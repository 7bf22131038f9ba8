use leptos::{ev, html, prelude::*};
use leptos_use::{
    use_document, use_event_listener, use_raf_fn, use_window_size, UseWindowSizeReturn,
};

use crate::pan::{indicator_items, tick_opacity, total_ticks, IndicatorItem, PanLayout};
use crate::pointer::{HoverChange, Point, PointerTracker, Tilt};
use crate::projects::{index_label, Project};

use super::scope::rect_of;

/// Scroll-pinned horizontal strip of featured projects.
#[component]
pub fn FeaturedWork(projects: Vec<Project>) -> impl IntoView {
    let cards = projects.len();
    let UseWindowSizeReturn { width, height } = use_window_size();
    let layout = Memo::new(move |_| PanLayout::new(width.get(), height.get(), cards));

    let section = NodeRef::<html::Section>::new();
    let card_refs = (0..cards)
        .map(|_| NodeRef::<html::Article>::new())
        .collect::<Vec<_>>();
    let card_refs = StoredValue::new(card_refs);

    let progress = RwSignal::new(0.0);
    let tilts = RwSignal::new(vec![Tilt::rest(); cards]);
    let hovered = RwSignal::new(None::<usize>);
    let tracker = StoredValue::new(PointerTracker::new());

    let _ = use_event_listener(use_document(), ev::pointermove, move |e| {
        let p = Point::new(e.client_x() as f64, e.client_y() as f64);
        tracker.update_value(|t| t.set_pointer(p));
    });
    let _ = use_event_listener(use_document(), ev::mouseleave, move |_| {
        tracker.update_value(|t| t.clear_pointer());
    });

    let set_tilt = move |id: usize, tilt: Tilt| {
        let changed = tilts.with_untracked(|t| t.get(id).is_some_and(|old| *old != tilt));
        if changed {
            tilts.update(|t| t[id] = tilt);
        }
    };

    let set_hovered = move |id: Option<usize>| {
        if hovered.get_untracked() != id {
            hovered.set(id);
        }
    };

    let _ = use_raf_fn(move |_| {
        let layout = layout.get_untracked();
        if let Some(el) = section.get_untracked() {
            let p = layout.progress(el.get_bounding_client_rect().top());
            if p != progress.get_untracked() {
                progress.set(p);
            }
        }

        // rects move while the strip pans, so refresh them before hit-testing
        let change = tracker
            .try_update_value(|t| {
                card_refs.with_value(|refs| {
                    for (id, node) in refs.iter().enumerate() {
                        match node.get_untracked() {
                            Some(el) => t.register(id, rect_of(&el)),
                            None => t.unregister(id),
                        }
                    }
                });
                t.frame()
            })
            .unwrap_or(HoverChange::Unchanged);

        match change {
            HoverChange::Unchanged => {}
            HoverChange::Enter(h) | HoverChange::Move(h) => {
                set_hovered(Some(h.id));
                set_tilt(h.id, Tilt::at(&h));
            }
            HoverChange::Leave(id) => {
                set_hovered(None);
                set_tilt(id, Tilt::rest());
            }
            HoverChange::Switch { from, to } => {
                set_tilt(from, Tilt::rest());
                set_hovered(Some(to.id));
                set_tilt(to.id, Tilt::at(&to));
            }
        }
    });

    let section_style = move || {
        let layout = layout.get();
        if layout.is_enabled() {
            format!("height: {}px;", layout.section_height())
        } else {
            String::new()
        }
    };
    let track_style = move || {
        let offset = layout.with(|l| l.offset_x(progress.get()));
        format!("transform: translate3d({offset:.2}px, 0, 0);")
    };

    let total = total_ticks();
    let indicator = indicator_items()
        .into_iter()
        .map(|item| match item {
            IndicatorItem::Label(label) => {
                view! { <span class="indicator-label">{label}</span> }.into_any()
            }
            IndicatorItem::Tick(k) => view! {
                <span
                    class="indicator-tick"
                    style:opacity=move || tick_opacity(k, total, progress.get()).to_string()
                ></span>
            }
            .into_any(),
        })
        .collect_view();

    let card_views = projects
        .into_iter()
        .enumerate()
        .map(|(id, project)| {
            let card_ref = card_refs.with_value(|refs| refs[id]);
            view! { <FeaturedCard id project card_ref tilts hovered /> }
        })
        .collect_view();

    view! {
        <section node_ref=section class="featured" style=section_style>
            <div class="featured-sticky">
                <div class="featured-track" style=track_style>
                    <div class="featured-intro">
                        <h2>"Featured work"</h2>
                        <p>"A few recent projects, from first sketch to production."</p>
                    </div>
                    {card_views}
                </div>
                <div class="featured-indicator">{indicator}</div>
            </div>
        </section>
    }
}

#[component]
fn FeaturedCard(
    id: usize,
    project: Project,
    card_ref: NodeRef<html::Article>,
    tilts: RwSignal<Vec<Tilt>>,
    hovered: RwSignal<Option<usize>>,
) -> impl IntoView {
    let tilt = move || tilts.with(|t| t.get(id).copied().unwrap_or_default());
    let card_style = move || format!("transform: {};", tilt().card_transform().to_css());
    let spotlight_style = move || {
        let t = tilt();
        format!(
            "transform: translate({:.1}px, {:.1}px);",
            t.spotlight_x, t.spotlight_y
        )
    };
    let layer_style = move |child: usize| {
        move || {
            let (x, y) = tilt().overlay_offset(child);
            format!("transform: translate({x:.1}px, {y:.1}px);")
        }
    };

    view! {
        <article
            node_ref=card_ref
            class="featured-card"
            class=("is-hovered", move || hovered.get() == Some(id))
            style=card_style
        >
            <img class="featured-image" src=project.banner_image.clone() alt=project.title.clone() />
            <div class="featured-spotlight" style=spotlight_style></div>
            <div class="featured-overlay">
                <span class="featured-index" style=layer_style(0)>
                    {format!("{} · {}", index_label(id + 1), project.categories)}
                </span>
                <h3 class="featured-title" style=layer_style(1)>
                    {project.title.clone()}
                </h3>
                <p class="featured-subtitle" style=layer_style(2)>
                    {project.subtitle.clone()}
                </p>
                <a class="featured-link" href=project.detail_href() style=layer_style(3)>
                    "View project"
                </a>
            </div>
        </article>
    }
}
