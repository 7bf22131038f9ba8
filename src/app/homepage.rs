use leptos::{either::Either, ev, html, prelude::*};
use leptos_meta::Title;
use leptos_use::{use_window_scroll, use_window_size, UseWindowSizeReturn};

use crate::motion::{split_words, Frame, Pose};
use crate::pointer::{Point, PointerTracker};
use crate::projects::{featured_projects, get_services, get_skills, index_label, Service, Skill};
use crate::scroll::{
    fade_up, fill_strips, has_entered, intro_card_pose, scrubbed, service_item, services_header,
    services_list, skills_subtitle, skills_title_line, strip_offset, word_opacity, GridHighlight,
    GridReveal, PinnedRange, HERO_TITLE_FADE, INTRO_PIN_VIEWPORTS, OUTRO_PIN_VIEWPORTS,
    SCROLL_HINT_FADE, SERVICES_LIST_TRIGGER, SERVICES_TRIGGER, SKILLS_GRID_TRIGGER,
    SKILLS_TITLE_TRIGGER, STRIP_RANGE, STRIP_SPEEDS,
};

use super::featured::FeaturedWork;
use super::page_transition::TransitionLink;
use super::scope::{rect_of, use_animation_scope};

const OUTRO_TEXT: &str = "The scroll ends but the ideas keep flowing";
const SKILLS_PER_STRIP: usize = 6;

/// Window size and scroll offset, shared by the scroll-driven sections.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    width: Signal<f64>,
    height: Signal<f64>,
    scroll_y: Signal<f64>,
}

impl Viewport {
    fn new() -> Self {
        let UseWindowSizeReturn { width, height } = use_window_size();
        let (_, scroll_y) = use_window_scroll();
        Self {
            width,
            height,
            scroll_y,
        }
    }

    fn scrubbed(self) -> bool {
        scrubbed(self.width.get())
    }

    fn known(self) -> bool {
        self.height.get().is_finite()
    }

    /// Top edge of `el`, re-read whenever the window scrolls or resizes.
    fn top_of(self, el: Option<web_sys::Element>) -> Option<f64> {
        self.scroll_y.track();
        self.width.track();
        self.height.track();
        el.map(|el| el.get_bounding_client_rect().top())
    }

    fn entered(self, el: Option<web_sys::Element>, line: f64) -> bool {
        let height = self.height.get();
        self.top_of(el)
            .is_some_and(|top| has_entered(top, height, line))
    }
}

fn pose_style(pose: Pose) -> String {
    Frame::instant(pose).to_style()
}

#[component]
pub fn HomePage() -> impl IntoView {
    let featured = featured_projects().unwrap_or_else(|e| {
        log::error!("{e}");
        Vec::new()
    });
    let skills = get_skills().unwrap_or_else(|e| {
        log::error!("{e}");
        Vec::new()
    });
    let services = get_services().unwrap_or_else(|e| {
        log::error!("{e}");
        Vec::new()
    });
    let viewport = Viewport::new();
    let intro = NodeRef::<html::Section>::new();

    view! {
        <Title text="Home" />
        <Hero intro viewport />
        <IntroSection section=intro viewport />
        <SkillsGrid skills=skills.clone() viewport />
        {if featured.is_empty() {
            Either::Left(())
        } else {
            Either::Right(view! { <FeaturedWork projects=featured /> })
        }}
        <ServicesSection services viewport />
        <OutroSection skills viewport />
    }
}

/// Title and scroll hint fade out as the intro comes up.
#[component]
fn Hero(intro: NodeRef<html::Section>, viewport: Viewport) -> impl IntoView {
    let intro_top = move || viewport.top_of(intro.get().map(Into::into));
    let title_style = move || {
        if !viewport.scrubbed() {
            return String::new();
        }
        let progress = intro_top().map_or(0.0, |top| {
            HERO_TITLE_FADE.progress(top, viewport.height.get())
        });
        pose_style(fade_up(progress, 30.0))
    };
    let hint_style = move || {
        let progress = intro_top().map_or(0.0, |top| {
            SCROLL_HINT_FADE.progress(top, viewport.height.get())
        });
        pose_style(fade_up(progress, 20.0))
    };

    view! {
        <section class="hero">
            <div class="hero-copy" style=title_style>
                <p class="hero-kicker">"Web developer · Designer"</p>
                <h1 class="hero-title">"I build websites that feel alive."</h1>
                <p class="hero-lede">
                    "Interfaces with motion, typed backends and the care in between. "
                    "Currently taking on new projects."
                </p>
                <div class="hero-links">
                    <TransitionLink href="/work" class="hero-link">
                        "See the work"
                    </TransitionLink>
                    <TransitionLink href="/about" class="hero-link hero-link-muted">
                        "About me"
                    </TransitionLink>
                </div>
            </div>
            <p class="scroll-hint" style=hint_style>
                "Scroll down"
            </p>
        </section>
    }
}

/// Two cards pinned while they fade in and grow. Static on phones.
#[component]
fn IntroSection(section: NodeRef<html::Section>, viewport: Viewport) -> impl IntoView {
    let range = move || PinnedRange::viewports(viewport.height.get(), INTRO_PIN_VIEWPORTS);
    let section_style = move || {
        if viewport.scrubbed() {
            format!("height: {}px;", viewport.height.get() + range().distance)
        } else {
            String::new()
        }
    };
    let card_style = move || {
        if !viewport.scrubbed() {
            return pose_style(Pose::default());
        }
        let progress = viewport
            .top_of(section.get().map(Into::into))
            .map_or(0.0, |top| range().progress(top));
        pose_style(intro_card_pose(progress))
    };

    view! {
        <section node_ref=section class="intro" class=("is-pinned", move || viewport.scrubbed()) style=section_style>
            <div class="intro-stage">
                <article class="intro-card" style=card_style>
                    <span class="intro-caption">"Backend developer"</span>
                    <h2 class="intro-title">"Portfolio"</h2>
                    <h3 class="intro-name">"Carlos Eduardo"</h3>
                    <p>
                        "Systems developer focused on Java and React, turning ideas into "
                        "solid, scalable digital products."
                    </p>
                </article>
                <article class="intro-card" style=card_style>
                    <span class="intro-caption">"About me"</span>
                    <p>
                        "I build documented APIs on the Spring ecosystem and React interfaces "
                        "on top of them, and I am at home with agile teams, CI/CD and deploys."
                    </p>
                    <span class="intro-caption">"Let's connect"</span>
                    <div class="intro-links">
                        <a href="/cv/resume.pdf" download="">
                            "Download CV"
                        </a>
                        <a href="https://www.linkedin.com/in/carlosealeixo/" target="_blank" rel="noopener noreferrer">
                            "LinkedIn"
                        </a>
                        <a href="https://github.com/SAIKO9X" target="_blank" rel="noopener noreferrer">
                            "GitHub"
                        </a>
                    </div>
                </article>
            </div>
        </section>
    }
}

/// Skill grid with a highlight box that follows the pointer once the grid has landed.
#[component]
fn SkillsGrid(skills: Vec<Skill>, viewport: Viewport) -> impl IntoView {
    let title = NodeRef::<html::Div>::new();
    let container = NodeRef::<html::Div>::new();
    let item_refs = StoredValue::new(
        (0..skills.len())
            .map(|_| NodeRef::<html::Span>::new())
            .collect::<Vec<_>>(),
    );
    let reveal = GridReveal::new(skills.len());
    let highlight = RwSignal::new(GridHighlight::new());
    let tracker = StoredValue::new(PointerTracker::new());
    let scope = use_animation_scope();

    // both play back when scrolled above their trigger again
    let title_shown = Memo::new(move |_| {
        viewport.entered(title.get().map(Into::into), SKILLS_TITLE_TRIGGER)
    });
    let grid_shown = Memo::new(move |_| {
        viewport.entered(container.get().map(Into::into), SKILLS_GRID_TRIGGER)
    });

    let reveal_round = StoredValue::new(0u64);
    Effect::new(move |_| {
        let shown = grid_shown.get();
        let round = reveal_round
            .try_update_value(|r| {
                *r += 1;
                *r
            })
            .unwrap_or_default();
        if shown {
            scope.after(reveal.complete_ms(), move || {
                if reveal_round.get_value() == round {
                    highlight.maybe_update(GridHighlight::unlock);
                }
            });
        } else {
            highlight.maybe_update(GridHighlight::lock);
        }
    });

    let on_move = move |e: ev::MouseEvent| {
        if highlight.with_untracked(GridHighlight::is_locked) {
            return;
        }
        let Some(el) = container.get_untracked() else {
            return;
        };
        let point = Point::new(e.client_x() as f64, e.client_y() as f64);
        let hit = tracker
            .try_update_value(|t| {
                item_refs.with_value(|refs| {
                    for (id, node) in refs.iter().enumerate() {
                        match node.get_untracked() {
                            Some(item) => t.register(id, rect_of(&item)),
                            None => t.unregister(id),
                        }
                    }
                });
                t.region_at(point)
            })
            .flatten();
        if let Some((_, item)) = hit {
            let frame = rect_of(&el);
            highlight.maybe_update(|h| h.move_to(item, frame));
        }
    };

    let lines = ["My", "tech stack"]
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let style = move || skills_title_line(i).frame(title_shown.get()).to_style();
            view! {
                <span class="reveal-mask block">
                    <span class="reveal-item block" style=style>
                        {line}
                    </span>
                </span>
            }
        })
        .collect_view();

    let items = skills
        .into_iter()
        .enumerate()
        .map(|(i, skill)| {
            let node_ref = item_refs.with_value(|refs| refs[i]);
            let style = move || reveal.item(i).frame(grid_shown.get()).to_style();
            view! {
                <span node_ref=node_ref class="skills-grid-item" style=style>
                    {skill.name}
                </span>
            }
        })
        .collect_view();

    view! {
        <section class="skills-grid-section">
            <div node_ref=title class="skills-grid-heading">
                <h2 class="skills-grid-title">{lines}</h2>
                <p
                    class="skills-grid-subtitle"
                    style=move || skills_subtitle().frame(title_shown.get()).to_style()
                >
                    "Tools and technologies I use to build all kinds of digital experiences."
                </p>
            </div>
            <div
                node_ref=container
                class="skills-grid"
                class=("is-locked", move || highlight.with(GridHighlight::is_locked))
                on:mousemove=on_move
            >
                {items}
                <div
                    class="skills-highlight"
                    class=("is-visible", move || highlight.with(GridHighlight::is_visible))
                    style=move || highlight.with(GridHighlight::style)
                ></div>
            </div>
        </section>
    }
}

/// Header, list and items slide in once, the first time they scroll into view.
#[component]
fn ServicesSection(services: Vec<Service>, viewport: Viewport) -> impl IntoView {
    let section = NodeRef::<html::Section>::new();
    let list = NodeRef::<html::Div>::new();
    let header_shown = Memo::new(move |seen: Option<&bool>| {
        seen.copied().unwrap_or(false)
            || viewport.entered(section.get().map(Into::into), SERVICES_TRIGGER)
    });
    let list_shown = Memo::new(move |seen: Option<&bool>| {
        seen.copied().unwrap_or(false)
            || viewport.entered(list.get().map(Into::into), SERVICES_LIST_TRIGGER)
    });

    let count = services.len();
    let items = services
        .into_iter()
        .enumerate()
        .map(|(i, service)| {
            let style = move || service_item(i).frame(list_shown.get()).to_style();
            let tags = service
                .tags
                .into_iter()
                .map(|tag| view! { <span class="service-tag">{tag}</span> })
                .collect_view();
            view! {
                <div class="service-item" style=style>
                    <span class="service-number">{index_label(i + 1)}</span>
                    <div class="service-info">
                        <h3 class="service-title">{service.title.clone()}</h3>
                        <p class="service-copy">{service.copy}</p>
                        <div class="service-tags">{tags}</div>
                    </div>
                    <img class="service-image" src=service.image alt=service.title />
                </div>
                {(i + 1 < count).then(|| view! { <div class="service-divider"></div> })}
            }
        })
        .collect_view();

    view! {
        <section node_ref=section class="services">
            <div
                class="services-header"
                style=move || services_header().frame(header_shown.get()).to_style()
            >
                <span class="services-label">"Services"</span>
                <h2 class="services-title">
                    "From concept to cloud, my process covers the whole software lifecycle. "
                    "Creative design, solid engineering and efficient DevOps, delivered as "
                    "fast, scalable and reliable products."
                </h2>
            </div>
            <div
                node_ref=list
                class="services-list"
                style=move || services_list().frame(list_shown.get()).to_style()
            >
                {items}
            </div>
        </section>
    }
}

/// Pinned closing line lit word by word, over strips of skills drifting sideways.
#[component]
fn OutroSection(skills: Vec<Skill>, viewport: Viewport) -> impl IntoView {
    let section = NodeRef::<html::Section>::new();
    let range = move || PinnedRange::viewports(viewport.height.get(), OUTRO_PIN_VIEWPORTS);
    let top = move || viewport.top_of(section.get().map(Into::into));
    // fully lit until the browser has measured the window
    let text_progress = move || match top() {
        Some(top) if viewport.known() => range().progress(top),
        _ => 1.0,
    };
    let strip_progress = move || match top() {
        Some(top) => STRIP_RANGE.progress(top, viewport.height.get()),
        None => 0.0,
    };
    let section_style = move || {
        if viewport.known() {
            format!("height: {}px;", viewport.height.get() + range().distance)
        } else {
            String::new()
        }
    };

    let words = split_words(OUTRO_TEXT);
    let total = words.len();
    let words = words
        .into_iter()
        .enumerate()
        .map(|(i, word)| {
            view! {
                <span
                    class="outro-word"
                    style:opacity=move || word_opacity(i, total, text_progress()).to_string()
                >
                    {word}
                </span>
                " "
            }
        })
        .collect_view();

    let strips = fill_strips(&skills, STRIP_SPEEDS.len(), SKILLS_PER_STRIP)
        .into_iter()
        .enumerate()
        .map(|(i, strip)| {
            let style = move || {
                let x = strip_offset(i, strip_progress());
                format!("transform: translate3d({x:.2}%, 0, 0);")
            };
            let chips = strip
                .into_iter()
                .map(|skill| {
                    let class = format!("outro-skill {}", skill.tone_class());
                    view! { <span class=class>{skill.name}</span> }
                })
                .collect_view();
            view! {
                <div class="outro-strip" style=style>
                    {chips}
                </div>
            }
        })
        .collect_view();

    view! {
        <section node_ref=section class="outro" style=section_style>
            <div class="outro-stage">
                <h2 class="outro-title">{words}</h2>
                <div class="outro-strips">{strips}</div>
                <TransitionLink href="/work" class="hero-link outro-link">
                    "All projects"
                </TransitionLink>
            </div>
        </section>
    }
}
