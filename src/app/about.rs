use leptos::{html, prelude::*};
use leptos_meta::Title;
use leptos_use::{
    use_raf_fn_with_options, use_window_scroll, use_window_size, UseRafFnOptions,
    UseWindowSizeReturn,
};

use crate::physics::{PhysicsConfig, World};
use crate::projects::{get_skills, Skill};

/// The simulation runs while the box's top edge is above this share of the viewport.
const START_AT_VIEWPORT: f64 = 0.5;

#[component]
pub fn AboutPage() -> impl IntoView {
    let skills = get_skills().unwrap_or_else(|e| {
        log::error!("{e}");
        Vec::new()
    });
    view! {
        <Title text="About" />
        <section class="about-intro">
            <h1 class="about-title">"About"</h1>
            <p>
                "I design and build websites and web apps, from the first wireframe to the last deploy. "
                "Most of my work pairs a typed backend with an interface that moves with intent."
            </p>
            <p>
                "Below is what I work with day to day. Scroll down and watch it settle."
            </p>
        </section>
        <PhysicsSkills skills />
    }
}

#[component]
fn PhysicsSkills(skills: Vec<Skill>) -> impl IntoView {
    let container = NodeRef::<html::Div>::new();
    let tag_refs = StoredValue::new(
        (0..skills.len())
            .map(|_| NodeRef::<html::Span>::new())
            .collect::<Vec<_>>(),
    );
    let world = StoredValue::new(None::<World>);
    let poses = RwSignal::new(Vec::new());

    let pausable = use_raf_fn_with_options(
        move |args| {
            if world.with_value(Option::is_none) {
                let Some(created) = build_world(container, tag_refs) else {
                    return;
                };
                log::debug!("physics started with {} tags", created.bodies().len());
                world.set_value(Some(created));
            }
            let frame = world
                .try_update_value(|w| {
                    w.as_mut().map(|w| {
                        w.advance(args.delta);
                        w.poses()
                    })
                })
                .flatten();
            if let Some(frame) = frame {
                poses.set(frame);
            }
        },
        UseRafFnOptions::default().immediate(false),
    );

    let (_, scroll_y) = use_window_scroll();
    let UseWindowSizeReturn { height, .. } = use_window_size();
    let (pause, resume) = (pausable.pause, pausable.resume);
    Effect::new(move |_| {
        scroll_y.track();
        let viewport = height.get();
        let Some(el) = container.get() else {
            return;
        };
        let rect = el.get_bounding_client_rect();
        let in_view = rect.top() <= viewport * START_AT_VIEWPORT && rect.bottom() >= 0.0;
        if in_view {
            resume();
        } else {
            pause();
        }
    });

    let tags = skills
        .into_iter()
        .enumerate()
        .map(|(i, skill)| {
            let node_ref = tag_refs.with_value(|refs| refs[i]);
            let style = move || {
                poses.with(|p| match p.get(i) {
                    Some(pose) => pose.to_style(),
                    None => "left: 0px; top: -200px; visibility: hidden;".to_string(),
                })
            };
            view! {
                <span node_ref=node_ref class=format!("skill-tag {}", skill.tone_class()) style=style>
                    {skill.name}
                </span>
            }
        })
        .collect_view();

    view! {
        <section class="skills">
            <h2 class="skills-title">"Skills"</h2>
            <div node_ref=container class="skills-box">
                {tags}
            </div>
        </section>
    }
}

/// Measures the box and every tag. `None` until the layout is in place.
fn build_world(
    container: NodeRef<html::Div>,
    tag_refs: StoredValue<Vec<NodeRef<html::Span>>>,
) -> Option<World> {
    let el = container.get_untracked()?;
    let rect = el.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let sizes = tag_refs.with_value(|refs| {
        refs.iter()
            .map(|node| {
                let tag = node.get_untracked()?.get_bounding_client_rect();
                Some((tag.width(), tag.height()))
            })
            .collect::<Option<Vec<_>>>()
    })?;
    let seed = js_sys::Date::now() as u64;
    Some(World::new(
        rect.width(),
        rect.height(),
        &sizes,
        PhysicsConfig::default(),
        seed,
    ))
}
