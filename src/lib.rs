pub mod data;
pub mod game;
pub mod posters;
pub mod storage;

use data::{Movie, User};
use game::{GameSession, Phase, RoundOutcome};
use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use log::warn;
use posters::MovieArt;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{window, HtmlInputElement, KeyboardEvent};
use yew::prelude::*;

const EMPTY_NAME_MESSAGE: &str = "Por favor, escribí tu nombre";
const REJECTED_NAME_MESSAGE: &str =
    "Ese nombre no está en la lista. ¿Tienes el coraje necesario?";

const CELEBRATION_MS: u32 = 6_000;

#[derive(PartialEq, Clone)]
enum FetchStatus {
    Idle,
    Loading,
    Error(String),
}

#[derive(Clone, PartialEq)]
enum Modal {
    Confirm,
    Retry(&'static str),
    Victory(&'static str),
}

// Poster art lives in a reducer so the fan-out tasks can land their results
// one by one, last write per movie id wins.
#[derive(Default, PartialEq)]
struct ArtStore {
    entries: HashMap<String, MovieArt>,
}

enum ArtAction {
    Seed(HashMap<String, MovieArt>),
    Update(String, MovieArt),
}

impl Reducible for ArtStore {
    type Action = ArtAction;

    fn reduce(self: Rc<Self>, action: ArtAction) -> Rc<Self> {
        match action {
            ArtAction::Seed(entries) => Rc::new(Self { entries }),
            ArtAction::Update(id, art) => {
                let mut entries = self.entries.clone();
                entries.insert(id, art);
                Rc::new(Self { entries })
            }
        }
    }
}

#[function_component(App)]
fn app() -> Html {
    let visitor = use_state(storage::load_visitor_name);
    let name_value = use_state(String::new);
    let name_error = use_state(|| None::<&'static str>);

    let data_status = use_state(|| FetchStatus::Loading);
    let users = use_state(|| None::<Vec<User>>);
    let movies = use_state(|| None::<Vec<Movie>>);

    let session = use_state(|| None::<GameSession>);
    let current_index = use_state(|| 0_usize);
    let modal = use_state(|| None::<Modal>);
    let confirmed_ids = use_state(Vec::<String>::new);
    let celebrating = use_state(|| false);
    let lights_off = use_state(|| false);

    let art = use_reducer(ArtStore::default);

    {
        let data_status = data_status.clone();
        let users = users.clone();
        let movies = movies.clone();

        use_effect_with_deps(
            move |_| {
                data_status.set(FetchStatus::Loading);

                spawn_local(async move {
                    let fetched_users = match data::fetch_users().await {
                        Ok(fetched) => fetched,
                        Err(err) => {
                            data_status.set(FetchStatus::Error(err.to_string()));
                            return;
                        }
                    };
                    match data::fetch_movies().await {
                        Ok(fetched) => {
                            users.set(Some(fetched_users));
                            // The gallery order is reshuffled once per visit.
                            movies.set(Some(game::shuffle_movies(&fetched)));
                            data_status.set(FetchStatus::Idle);
                        }
                        Err(err) => {
                            data_status.set(FetchStatus::Error(err.to_string()));
                        }
                    }
                });

                || ()
            },
            (),
        );
    }

    {
        let visitor_handle = visitor.clone();
        let session = session.clone();

        use_effect_with_deps(
            move |(visitor, users): &(Option<String>, Option<Vec<User>>)| {
                match (visitor, users) {
                    (Some(name), Some(list)) => {
                        match data::target_set(list, name) {
                            Some(target) if game::validate_visitor_name(name) => {
                                let stored = storage::load_selection();
                                session.set(Some(GameSession::with_selection(
                                    target.to_vec(),
                                    stored,
                                )));
                            }
                            _ => {
                                // A cached name the data no longer knows:
                                // back to the gate.
                                warn!("Stored visitor '{}' has no target set", name);
                                storage::clear_visitor();
                                visitor_handle.set(None);
                            }
                        }
                    }
                    _ => session.set(None),
                }
                || ()
            },
            ((*visitor).clone(), (*users).clone()),
        );
    }

    {
        use_effect_with_deps(
            move |selection: &Option<Vec<String>>| {
                if let Some(ids) = selection {
                    storage::save_selection(ids);
                }
                || ()
            },
            (*session).as_ref().map(|s| s.selection().to_vec()),
        );
    }

    {
        let art = art.clone();

        use_effect_with_deps(
            move |loaded: &Option<Vec<Movie>>| {
                let alive = Rc::new(Cell::new(false));

                if let Some(list) = loaded.clone() {
                    alive.set(true);

                    let seeded: HashMap<String, MovieArt> = list
                        .iter()
                        .map(|movie| (movie.id.clone(), MovieArt::fallback(movie.year)))
                        .collect();
                    art.dispatch(ArtAction::Seed(seeded));

                    for movie in list {
                        let art = art.clone();
                        let alive = alive.clone();
                        spawn_local(async move {
                            let outcome =
                                posters::search_movie(&movie.title, movie.year).await;
                            if !alive.get() {
                                // Late arrival after the gallery went away.
                                return;
                            }
                            match outcome {
                                Ok(found) => art.dispatch(ArtAction::Update(
                                    movie.id.clone(),
                                    posters::resolve_art(found, movie.year),
                                )),
                                Err(err) => {
                                    warn!(
                                        "Poster lookup for '{}' failed: {}",
                                        movie.title, err
                                    );
                                }
                            }
                        });
                    }
                }

                move || alive.set(false)
            },
            (*movies).clone(),
        );
    }

    {
        let current_index_handle = current_index.clone();
        let session_handle = session.clone();

        use_effect_with_deps(
            move |(movies, session, modal_open, index): &(
                Option<Vec<Movie>>,
                Option<GameSession>,
                bool,
                usize,
            )| {
                let listener = match (movies, session, window()) {
                    (Some(list), Some(_), Some(window)) if !modal_open && !list.is_empty() => {
                        let list = list.clone();
                        let index = *index;
                        let current_session = session.clone();

                        Some(EventListener::new(&window, "keydown", move |event| {
                            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                                return;
                            };
                            match event.key().as_str() {
                                "ArrowLeft" => {
                                    event.prevent_default();
                                    current_index_handle
                                        .set((index + list.len() - 1) % list.len());
                                }
                                "ArrowRight" => {
                                    event.prevent_default();
                                    current_index_handle.set((index + 1) % list.len());
                                }
                                " " | "Enter" => {
                                    event.prevent_default();
                                    if let Some(mut updated) = current_session.clone() {
                                        updated.toggle(&list[index].id);
                                        session_handle.set(Some(updated));
                                    }
                                }
                                _ => {}
                            }
                        }))
                    }
                    _ => None,
                };

                move || drop(listener)
            },
            (
                (*movies).clone(),
                (*session).clone(),
                modal.is_some(),
                *current_index,
            ),
        );
    }

    let on_name_input = {
        let name_value = name_value.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(input) = event
                .target()
                .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
            {
                name_value.set(input.value());
            }
        })
    };

    let on_name_submit = {
        let name_value = name_value.clone();
        let name_error = name_error.clone();
        let visitor = visitor.clone();

        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();

            let submitted = (*name_value).trim().to_string();
            if submitted.is_empty() {
                name_error.set(Some(EMPTY_NAME_MESSAGE));
                return;
            }

            if game::validate_visitor_name(&submitted) {
                name_error.set(None);
                storage::save_visitor_name(&submitted);
                visitor.set(Some(submitted));
            } else {
                name_error.set(Some(REJECTED_NAME_MESSAGE));
            }
        })
    };

    let on_toggle = {
        let session = session.clone();
        Callback::from(move |movie_id: String| {
            if let Some(mut updated) = (*session).clone() {
                updated.toggle(&movie_id);
                session.set(Some(updated));
            }
        })
    };

    let on_prev = {
        let current_index = current_index.clone();
        let movies = movies.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(list) = (*movies).as_ref() {
                if !list.is_empty() {
                    current_index.set((*current_index + list.len() - 1) % list.len());
                }
            }
        })
    };

    let on_next = {
        let current_index = current_index.clone();
        let movies = movies.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(list) = (*movies).as_ref() {
                if !list.is_empty() {
                    current_index.set((*current_index + 1) % list.len());
                }
            }
        })
    };

    let on_consult = {
        let modal = modal.clone();
        Callback::from(move |_: MouseEvent| {
            modal.set(Some(Modal::Confirm));
        })
    };

    // Cancelling the confirmation carries no penalty.
    let on_cancel = {
        let modal = modal.clone();
        Callback::from(move |_: MouseEvent| {
            modal.set(None);
        })
    };

    let on_confirm = {
        let session = session.clone();
        let modal = modal.clone();
        let confirmed_ids = confirmed_ids.clone();
        let celebrating = celebrating.clone();

        Callback::from(move |_: MouseEvent| {
            let Some(mut current) = (*session).clone() else {
                modal.set(None);
                return;
            };
            let Some(outcome) = current.submit() else {
                modal.set(None);
                return;
            };

            match outcome {
                RoundOutcome::Won { message } => {
                    confirmed_ids.set(current.target().to_vec());
                    modal.set(Some(Modal::Victory(message)));
                    celebrating.set(true);
                    let celebrating = celebrating.clone();
                    Timeout::new(CELEBRATION_MS, move || celebrating.set(false)).forget();
                }
                RoundOutcome::Retry { report, message } => {
                    confirmed_ids.set(report.correct_ids);
                    modal.set(Some(Modal::Retry(message)));
                }
            }

            session.set(Some(current));
        })
    };

    let on_modal_ack = {
        let modal = modal.clone();
        Callback::from(move |_: MouseEvent| {
            modal.set(None);
        })
    };

    let on_back = {
        let visitor = visitor.clone();
        let name_value = name_value.clone();
        let name_error = name_error.clone();
        let session = session.clone();
        let modal = modal.clone();
        let confirmed_ids = confirmed_ids.clone();
        let celebrating = celebrating.clone();
        let lights_off = lights_off.clone();

        Callback::from(move |_: MouseEvent| {
            storage::clear_visitor();
            visitor.set(None);
            name_value.set(String::new());
            name_error.set(None);
            session.set(None);
            modal.set(None);
            confirmed_ids.set(Vec::new());
            celebrating.set(false);
            lights_off.set(false);
        })
    };

    let on_retry_art = {
        let movies = movies.clone();
        let art = art.clone();

        Callback::from(move |movie_id: String| {
            let Some(list) = (*movies).as_ref() else {
                return;
            };
            let Some(movie) = list.iter().find(|movie| movie.id == movie_id).cloned()
            else {
                return;
            };

            let art = art.clone();
            spawn_local(async move {
                match posters::search_movie(&movie.title, movie.year).await {
                    Ok(found) => art.dispatch(ArtAction::Update(
                        movie.id.clone(),
                        posters::resolve_art(found, movie.year),
                    )),
                    Err(err) => {
                        warn!("Poster lookup for '{}' failed: {}", movie.title, err);
                    }
                }
            });
        })
    };

    let on_lights = {
        let lights_off = lights_off.clone();
        Callback::from(move |_: MouseEvent| {
            lights_off.set(!*lights_off);
        })
    };

    let stage = match (&*visitor, &*data_status) {
        (_, FetchStatus::Error(message)) => html! {
            <p class="stage-error">{ message }</p>
        },
        (None, _) => render_name_gate(&name_value, &name_error, &on_name_input, &on_name_submit),
        (Some(name), FetchStatus::Loading) => html! {
            <p class="stage-loading">{ format!("Cargando la galería para {name}…") }</p>
        },
        (Some(name), FetchStatus::Idle) => match ((*movies).as_ref(), (*session).as_ref()) {
            (Some(list), Some(current)) => render_gallery(
                name,
                list,
                current,
                *current_index,
                &art.entries,
                &confirmed_ids,
                &on_toggle,
                &on_prev,
                &on_next,
                &on_consult,
                &on_back,
                &on_retry_art,
                &on_lights,
            ),
            _ => html! { <p class="stage-loading">{ "Cargando la galería…" }</p> },
        },
    };

    let container_classes = classes!(
        "lodge-container",
        (*lights_off).then_some("lights-off"),
    );

    html! {
        <div class={container_classes}>
            { stage }
            { render_modal(&modal, &on_confirm, &on_cancel, &on_modal_ack) }
            { render_celebration(*celebrating) }
        </div>
    }
}

fn render_name_gate(
    name_value: &UseStateHandle<String>,
    name_error: &UseStateHandle<Option<&'static str>>,
    on_input: &Callback<InputEvent>,
    on_submit: &Callback<SubmitEvent>,
) -> Html {
    html! {
        <div class="name-gate">
            <h1 class="lodge-title">{ "Welcome to the Fer Lodge" }</h1>
            <h2 class="lodge-subtitle">{ "A Realm of Scripts and Crazy Shit" }</h2>

            <div class="gate-panel">
                <p class="gate-hint">
                    { "Si te sobra coraje, escribí tu nombre y apretá enter" }
                </p>

                <form onsubmit={on_submit.clone()}>
                    <input
                        type="text"
                        value={(**name_value).clone()}
                        oninput={on_input.clone()}
                        placeholder="Enter your name..."
                    />
                    {
                        if let Some(message) = **name_error {
                            html! { <p class="gate-error">{ message }</p> }
                        } else {
                            html! {}
                        }
                    }
                    <button type="submit" disabled={name_value.trim().is_empty()}>
                        { "Entrar" }
                    </button>
                </form>
            </div>
        </div>
    }
}

fn render_gallery(
    visitor: &str,
    movies: &[Movie],
    session: &GameSession,
    current_index: usize,
    art: &HashMap<String, MovieArt>,
    confirmed_ids: &[String],
    on_toggle: &Callback<String>,
    on_prev: &Callback<MouseEvent>,
    on_next: &Callback<MouseEvent>,
    on_consult: &Callback<MouseEvent>,
    on_back: &Callback<MouseEvent>,
    on_retry_art: &Callback<String>,
    on_lights: &Callback<MouseEvent>,
) -> Html {
    let selected_count = session.selection().len();

    html! {
        <div class="gallery">
            <header class="gallery-header">
                <button class="back-button" onclick={on_back.clone()}>{ "← Volver" }</button>
                <div class="gallery-titles">
                    <h1>{ "Galería de Películas" }</h1>
                    <p class="welcome-line">{ format!("Bienvenida, {visitor} 🎬") }</p>
                    <p class="selection-count">
                        { format!("Selecciona hasta 5 películas ({selected_count}/5)") }
                    </p>
                </div>
                <div class="header-spacer"></div>
            </header>

            { render_selected_bar(movies, session, confirmed_ids, on_toggle, on_consult, on_lights) }

            { render_carousel(movies, session, current_index, art, on_toggle, on_prev, on_next, on_retry_art) }

            <footer class="keyboard-hints">
                <p>{ "Usa las flechas del teclado para navegar" }</p>
                <p>{ "Presiona Espacio o Enter para seleccionar/deseleccionar" }</p>
            </footer>
        </div>
    }
}

fn render_carousel(
    movies: &[Movie],
    session: &GameSession,
    current_index: usize,
    art: &HashMap<String, MovieArt>,
    on_toggle: &Callback<String>,
    on_prev: &Callback<MouseEvent>,
    on_next: &Callback<MouseEvent>,
    on_retry_art: &Callback<String>,
) -> Html {
    let Some(movie) = movies.get(current_index) else {
        return html! { <p class="stage-loading">{ "No hay películas para mostrar." }</p> };
    };

    let movie_art = art
        .get(&movie.id)
        .cloned()
        .unwrap_or_else(|| MovieArt::fallback(movie.year));
    let selected = session.is_selected(&movie.id);

    let toggle_click = {
        let on_toggle = on_toggle.clone();
        let id = movie.id.clone();
        Callback::from(move |_: MouseEvent| on_toggle.emit(id.clone()))
    };

    let retry_click = {
        let on_retry_art = on_retry_art.clone();
        let id = movie.id.clone();
        Callback::from(move |_: MouseEvent| on_retry_art.emit(id.clone()))
    };

    let at_cap = !selected && session.phase() != Phase::Selecting;
    let toggle_label = if selected { "Quitar" } else { "Elegir" };

    html! {
        <div class="carousel">
            <button class="carousel-arrow" onclick={on_prev.clone()}>{ "‹" }</button>

            <div class={classes!("movie-card", selected.then_some("selected"))}>
                <img class="movie-poster" src={movie_art.poster_url.clone()} alt={movie.title.clone()} />
                <div class="movie-details">
                    <h2>{ format!("{} ({})", movie.title, movie.year) }</h2>
                    <p class="movie-credit">{ format!("Dirigida por {}", movie.director) }</p>
                    <p class="movie-credit">{ movie.actors.join(", ") }</p>
                    <p class="movie-synopsis">{ &movie.synopsis }</p>
                    {
                        if let Some(overview) = &movie_art.overview {
                            html! { <p class="movie-overview">{ overview }</p> }
                        } else {
                            html! {}
                        }
                    }
                    {
                        if let Some(rating) = movie_art.vote_average {
                            html! { <p class="movie-rating">{ format!("★ {rating:.1}") }</p> }
                        } else {
                            html! {}
                        }
                    }
                    <button
                        class={classes!("toggle-button", selected.then_some("remove"))}
                        onclick={toggle_click}
                        disabled={at_cap}
                    >
                        { toggle_label }
                    </button>
                    {
                        if !movie_art.from_lookup {
                            html! {
                                <button class="retry-art" onclick={retry_click}>
                                    { "Reintentar póster" }
                                </button>
                            }
                        } else {
                            html! {}
                        }
                    }
                </div>
            </div>

            <button class="carousel-arrow" onclick={on_next.clone()}>{ "›" }</button>
        </div>
    }
}

fn render_selected_bar(
    movies: &[Movie],
    session: &GameSession,
    confirmed_ids: &[String],
    on_toggle: &Callback<String>,
    on_consult: &Callback<MouseEvent>,
    on_lights: &Callback<MouseEvent>,
) -> Html {
    if session.selection().is_empty() {
        return html! {};
    }

    let chips = session.selection().iter().filter_map(|id| {
        let movie = movies.iter().find(|movie| &movie.id == id)?;
        let confirmed = confirmed_ids.contains(id);

        let remove_click = {
            let on_toggle = on_toggle.clone();
            let id = id.clone();
            Callback::from(move |_: MouseEvent| on_toggle.emit(id.clone()))
        };

        Some(html! {
            <div class={classes!("selected-chip", confirmed.then_some("confirmed"))} key={id.clone()}>
                <span class="chip-title" title={movie.title.clone()}>{ &movie.title }</span>
                <button class="chip-remove" onclick={remove_click} aria-label={format!("Remover {}", movie.title)}>
                    { "×" }
                </button>
            </div>
        })
    });

    let action = match session.phase() {
        Phase::Won => html! {
            <button class="lights-button" onclick={on_lights.clone()}>
                { "Apagar las luces" }
            </button>
        },
        Phase::ReadyToSubmit => html! {
            <button class="consult-button" onclick={on_consult.clone()}>
                { "Consulta" }
            </button>
        },
        Phase::Selecting => html! {},
    };

    html! {
        <div class="selected-bar">
            <div class="selected-chips">{ for chips }</div>
            { action }
        </div>
    }
}

fn render_modal(
    modal: &Option<Modal>,
    on_confirm: &Callback<MouseEvent>,
    on_cancel: &Callback<MouseEvent>,
    on_ack: &Callback<MouseEvent>,
) -> Html {
    let Some(modal) = modal.as_ref() else {
        return html! {};
    };

    let (message, confirm_click, show_cancel) = match modal {
        Modal::Confirm => (game::CONFIRM_PROMPT, on_confirm.clone(), true),
        Modal::Retry(message) => (*message, on_ack.clone(), false),
        Modal::Victory(message) => (*message, on_ack.clone(), false),
    };

    html! {
        <div class="modal-overlay">
            <div class="modal-panel">
                <p class="modal-message">{ message }</p>
                <div class="modal-actions">
                    <button class="modal-confirm" onclick={confirm_click}>
                        { game::CONFIRM_YES }
                    </button>
                    {
                        if show_cancel {
                            html! {
                                <button class="modal-cancel" onclick={on_cancel.clone()}>
                                    { game::CONFIRM_CANCEL }
                                </button>
                            }
                        } else {
                            html! {}
                        }
                    }
                </div>
            </div>
        </div>
    }
}

fn render_celebration(active: bool) -> Html {
    if !active {
        return html! {};
    }

    html! {
        <div class="celebration-overlay">
            { for (0..40).map(|index| {
                let style = format!(
                    "left: {}%; animation-delay: {}ms;",
                    (index * 29) % 100,
                    index * 120
                );
                html! { <span class="celebration-star" {style}></span> }
            }) }
        </div>
    }
}

#[wasm_bindgen(start)]
pub fn run_app() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<App>::new().render();
}
