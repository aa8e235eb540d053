//! Giao diện niên biểu lịch sử cho môi trường WebAssembly.

mod panels;

#[cfg(target_arch = "wasm32")]
mod styles;

pub use panels::{LinkedZoom, PanelVisibility, ZoomEvent, ZoomSync};

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::panels::{LinkedZoom, PanelVisibility, ZoomEvent};
    use crate::styles;
    use chronicle_core::{
        detail_for, render_panels, Dataset, DetailCard, DynastyPalette,
        EventCategory, FilterState, Locale, PanelChart, PanelKind, TimelineConfig, YearRange,
    };
    use serde_wasm_bindgen::{from_value, to_value};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::{console, Document, Element, HtmlInputElement, HtmlSelectElement, Window};
    use yew::events::InputEvent;
    use yew::prelude::*;
    use yew::TargetCast;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = Plotly, js_name = newPlot, catch)]
        fn plotly_new_plot(
            target: &str,
            data: &JsValue,
            layout: &JsValue,
        ) -> Result<JsValue, JsValue>;

        #[wasm_bindgen(js_namespace = Plotly, js_name = relayout, catch)]
        fn plotly_relayout(target: &str, update: &JsValue) -> Result<JsValue, JsValue>;

        /// Phần tử DOM đã được Plotly gắn bộ phát sự kiện.
        type PlotlyGraph;

        #[wasm_bindgen(method, js_name = on)]
        fn on(this: &PlotlyGraph, event: &str, handler: &Closure<dyn FnMut(JsValue)>);

        #[wasm_bindgen(method, js_name = removeAllListeners)]
        fn remove_all_listeners(this: &PlotlyGraph, event: &str);
    }

    const PLOTLY_CLICK: &str = "plotly_click";
    const PLOTLY_RELAYOUT: &str = "plotly_relayout";

    #[derive(Clone)]
    enum LoadState {
        Loading,
        Ready {
            dataset: Rc<Dataset>,
            palette: Rc<DynastyPalette>,
        },
        Failed,
    }

    impl PartialEq for LoadState {
        fn eq(&self, other: &Self) -> bool {
            match (self, other) {
                (LoadState::Loading, LoadState::Loading) => true,
                (LoadState::Failed, LoadState::Failed) => true,
                (
                    LoadState::Ready { dataset: left, .. },
                    LoadState::Ready { dataset: right, .. },
                ) => Rc::ptr_eq(left, right),
                _ => false,
            }
        }
    }

    #[derive(Properties, PartialEq)]
    pub struct TimelineAppProps {
        pub data_url: AttrValue,
        pub config: TimelineConfig,
    }

    #[function_component(TimelineApp)]
    fn timeline_app(props: &TimelineAppProps) -> Html {
        let config = props.config.clone();
        let locale = config.locale;
        let labels = locale.labels();

        use_effect_with((), |_| {
            if let Some(window) = web_sys::window() {
                if let Some(document) = window.document() {
                    if let Err(err) = styles::ensure_styles(&document) {
                        console::error_1(&err);
                    }
                }
            }
            || ()
        });

        let load_state = use_state(|| LoadState::Loading);
        {
            let load_state = load_state.clone();
            use_effect_with(props.data_url.clone(), move |url| {
                let url = url.to_string();
                wasm_bindgen_futures::spawn_local(async move {
                    match fetch_dataset(&url).await {
                        Ok(dataset) => {
                            let palette = Rc::new(dataset.palette());
                            load_state.set(LoadState::Ready {
                                dataset: Rc::new(dataset),
                                palette,
                            });
                        }
                        Err(err) => {
                            console::error_1(&JsValue::from_str(&format!(
                                "加载数据失败: {err}"
                            )));
                            load_state.set(LoadState::Failed);
                        }
                    }
                });
                || ()
            });
        }

        let filters = {
            let config = config.clone();
            use_state(move || FilterState::from_config(&config))
        };
        let search_text = use_state(String::new);
        let visibility = use_state(PanelVisibility::default);
        let selected = use_state(|| None::<DetailCard>);
        let graph_handlers = use_mut_ref(Vec::<Closure<dyn FnMut(JsValue)>>::new);

        let filters_value = (*filters).clone();
        let visibility_value = *visibility;
        let load_value = (*load_state).clone();

        {
            let selected = selected.clone();
            let graph_handlers = graph_handlers.clone();
            use_effect_with(
                (filters_value.clone(), visibility_value, load_value.clone()),
                move |(state, visible, load)| {
                    if let LoadState::Ready { dataset, palette } = load {
                        let filtered = dataset.filter(state);
                        let shown: Vec<PanelKind> = PanelKind::ALL
                            .into_iter()
                            .filter(|panel| visible.shows(*panel))
                            .collect();
                        let zoom = Rc::new(RefCell::new(LinkedZoom::new(state.range)));
                        let mut handlers = Vec::new();

                        for chart in render_panels(&filtered, state, palette, locale) {
                            if !visible.shows(chart.panel) {
                                detach_handlers(chart.panel);
                                continue;
                            }
                            if let Err(err) = draw_panel(&chart) {
                                console::error_1(&err);
                                continue;
                            }
                            let Some(graph) = plotly_graph(chart.panel) else {
                                continue;
                            };
                            handlers.push(bind_click(
                                &graph,
                                chart.panel,
                                dataset.clone(),
                                locale,
                                selected.clone(),
                            ));
                            handlers.push(bind_relayout(
                                &graph,
                                chart.panel,
                                shown.clone(),
                                zoom.clone(),
                            ));
                        }

                        *graph_handlers.borrow_mut() = handlers;
                    }
                    || ()
                },
            );
        }

        let on_lower = {
            let filters = filters.clone();
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                if let Ok(year) = input.value().parse::<i32>() {
                    let current = (*filters).clone();
                    let range = YearRange::new(year, current.range.upper);
                    filters.set(current.with_range(range));
                }
            })
        };

        let on_upper = {
            let filters = filters.clone();
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                if let Ok(year) = input.value().parse::<i32>() {
                    let current = (*filters).clone();
                    let range = YearRange::new(current.range.lower, year);
                    filters.set(current.with_range(range));
                }
            })
        };

        let on_search = {
            let filters = filters.clone();
            let search_text = search_text.clone();
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                let raw = input.value();
                filters.set((*filters).clone().with_search(&raw));
                search_text.set(raw);
            })
        };

        let on_category = {
            let filters = filters.clone();
            Callback::from(move |event: Event| {
                let select: HtmlSelectElement = event.target_unchecked_into();
                filters.set((*filters).clone().with_category(select.value()));
            })
        };

        let on_importance = {
            let filters = filters.clone();
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                if let Ok(level) = input.value().parse::<i32>() {
                    filters.set((*filters).clone().with_min_importance(level));
                }
            })
        };

        let on_reset = {
            let filters = filters.clone();
            let search_text = search_text.clone();
            let config = config.clone();
            Callback::from(move |_: MouseEvent| {
                filters.set(FilterState::from_config(&config));
                search_text.set(String::new());
            })
        };

        let summary = match &load_value {
            LoadState::Ready { dataset, .. } => {
                let filtered = dataset.filter(&filters_value);
                format!(
                    "{} {} · {} {} · {} {}",
                    labels.dynasty_axis,
                    filtered.dynasties.len(),
                    labels.event_axis,
                    filtered.events.len(),
                    labels.figure_axis,
                    filtered.figures.len()
                )
            }
            LoadState::Loading | LoadState::Failed => String::new(),
        };

        let selected_category = String::from(filters_value.category.clone());
        let full_range = config.full_range;

        html! {
            <div class="chronicle-root">
                <header class="chronicle-header">
                    <h1>{ labels.page_title }</h1>
                    <h2>{ labels.page_subtitle }</h2>
                </header>
                <section class="chronicle-controls">
                    <div class="chronicle-control">
                        <label>{ labels.search_field }</label>
                        <input
                            type="search"
                            placeholder={labels.search_placeholder}
                            value={(*search_text).clone()}
                            oninput={on_search}
                        />
                    </div>
                    <div class="chronicle-control">
                        <label>{ labels.category_field }</label>
                        <select onchange={on_category}>
                            <option value="all" selected={selected_category == "all"}>{ labels.all_categories }</option>
                            {
                                for EventCategory::SELECTABLE.into_iter().map(|category| html! {
                                    <option
                                        value={category.label()}
                                        selected={selected_category == category.label()}
                                    >
                                        { category.label() }
                                    </option>
                                })
                            }
                        </select>
                    </div>
                    <div class="chronicle-control">
                        <label>{ format!("{} ≥ {}", labels.importance_field, filters_value.min_importance) }</label>
                        <input
                            type="range"
                            min="1"
                            max="5"
                            step="1"
                            value={filters_value.min_importance.to_string()}
                            oninput={on_importance}
                        />
                    </div>
                    <div class="chronicle-control">
                        <label>{ labels.range_field }</label>
                        <div class="chronicle-range-labels">
                            <span>{ locale.format_year(filters_value.range.lower) }</span>
                            <span>{ locale.format_year(filters_value.range.upper) }</span>
                        </div>
                        <input
                            type="range"
                            min={full_range.lower.to_string()}
                            max={full_range.upper.to_string()}
                            step="1"
                            value={filters_value.range.lower.to_string()}
                            oninput={on_lower}
                            aria-label="lower-year"
                        />
                        <input
                            type="range"
                            min={full_range.lower.to_string()}
                            max={full_range.upper.to_string()}
                            step="1"
                            value={filters_value.range.upper.to_string()}
                            oninput={on_upper}
                            aria-label="upper-year"
                        />
                    </div>
                    <div class="chronicle-control">
                        <label>{ labels.display_field }</label>
                        { render_toggles(visibility.clone(), locale) }
                        <button type="button" class="chronicle-reset" onclick={on_reset}>{ labels.reset }</button>
                    </div>
                </section>
                <p class="chronicle-summary">{ summary }</p>
                {
                    for PanelKind::ALL.into_iter().map(|panel| html! {
                        <section class="chronicle-panel" hidden={!visibility_value.shows(panel)}>
                            <div id={panel.mount_id()}></div>
                        </section>
                    })
                }
                <section class="chronicle-detail">
                    {
                        match &*selected {
                            Some(card) => render_detail(card),
                            None => html! { <p>{ labels.detail_prompt }</p> },
                        }
                    }
                </section>
            </div>
        }
    }

    fn render_toggles(visibility: UseStateHandle<PanelVisibility>, locale: Locale) -> Html {
        let labels = locale.labels();

        html! {
            <div class="chronicle-toggles" role="group">
                {
                    for PanelKind::ALL.into_iter().map(|panel| {
                        let visibility = visibility.clone();
                        let checked = visibility.shows(panel);
                        let label = match panel {
                            PanelKind::Dynasty => labels.dynasty_axis,
                            PanelKind::Event => labels.event_axis,
                            PanelKind::Figure => labels.figure_axis,
                        };
                        let onchange = Callback::from(move |_: Event| {
                            visibility.set(visibility.toggled(panel));
                        });

                        html! {
                            <label>
                                <input type="checkbox" checked={checked} onchange={onchange} />
                                { format!(" {label}") }
                            </label>
                        }
                    })
                }
            </div>
        }
    }

    fn render_detail(card: &DetailCard) -> Html {
        html! {
            <>
                <h3>{ card.title.clone() }</h3>
                {
                    card.image_url
                        .as_ref()
                        .map(|src| html! { <img src={src.clone()} alt={card.title.clone()} /> })
                        .unwrap_or_default()
                }
                <p>{ card.description.clone() }</p>
                {
                    card.dynasty_line
                        .as_ref()
                        .map(|line| html! { <p class="chronicle-dynasty-line">{ line.clone() }</p> })
                        .unwrap_or_default()
                }
            </>
        }
    }

    async fn fetch_dataset(url: &str) -> Result<Dataset, String> {
        let response = gloo_net::http::Request::get(url)
            .send()
            .await
            .map_err(|err| err.to_string())?;
        if !response.ok() {
            return Err(format!("HTTP {}", response.status()));
        }
        let body = response.text().await.map_err(|err| err.to_string())?;
        chronicle_dataset::load_dataset_str(&body).map_err(|err| err.to_string())
    }

    fn draw_panel(chart: &PanelChart) -> Result<(), JsValue> {
        let data = to_value(&chart.figure.data)?;
        let layout = to_value(&chart.figure.layout)?;
        plotly_new_plot(&chart.target, &data, &layout)?;
        Ok(())
    }

    /// Chỉ trả về phần tử khi Plotly đã vẽ vào đó ít nhất một lần.
    fn plotly_graph(panel: PanelKind) -> Option<PlotlyGraph> {
        let element = web_sys::window()?
            .document()?
            .get_element_by_id(panel.mount_id())?;
        let value = JsValue::from(element);
        let ready = js_sys::Reflect::has(&value, &JsValue::from_str("removeAllListeners"))
            .unwrap_or(false);
        ready.then(|| value.unchecked_into::<PlotlyGraph>())
    }

    fn detach_handlers(panel: PanelKind) {
        if let Some(graph) = plotly_graph(panel) {
            graph.remove_all_listeners(PLOTLY_CLICK);
            graph.remove_all_listeners(PLOTLY_RELAYOUT);
        }
    }

    fn bind_click(
        graph: &PlotlyGraph,
        panel: PanelKind,
        dataset: Rc<Dataset>,
        locale: Locale,
        selected: UseStateHandle<Option<DetailCard>>,
    ) -> Closure<dyn FnMut(JsValue)> {
        graph.remove_all_listeners(PLOTLY_CLICK);

        let handler = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
            if let Some(key) = clicked_key(&payload) {
                selected.set(detail_for(&dataset, panel, &key, locale));
            }
        });
        graph.on(PLOTLY_CLICK, &handler);
        handler
    }

    /// Zoom trên một bảng được áp sang các bảng đang hiển thị còn lại.
    fn bind_relayout(
        graph: &PlotlyGraph,
        source: PanelKind,
        shown: Vec<PanelKind>,
        zoom: Rc<RefCell<LinkedZoom>>,
    ) -> Closure<dyn FnMut(JsValue)> {
        graph.remove_all_listeners(PLOTLY_RELAYOUT);

        let handler = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
            let Some(event) = zoom_event(&payload) else {
                return;
            };
            let Some(sync) = zoom.borrow_mut().sync(event) else {
                return;
            };
            let update = match axis_update(sync.range) {
                Ok(update) => update,
                Err(err) => {
                    console::error_1(&err);
                    return;
                }
            };

            for panel in shown
                .iter()
                .copied()
                .filter(|panel| sync.include_source || *panel != source)
            {
                if let Err(err) = plotly_relayout(panel.mount_id(), &update) {
                    console::error_1(&err);
                }
            }
        });
        graph.on(PLOTLY_RELAYOUT, &handler);
        handler
    }

    fn zoom_event(payload: &JsValue) -> Option<ZoomEvent> {
        let field = |key: &str| js_sys::Reflect::get(payload, &JsValue::from_str(key)).ok();

        if field("xaxis.autorange").and_then(|value| value.as_bool()) == Some(true) {
            return Some(ZoomEvent::Reset);
        }
        let lower = field("xaxis.range[0]")?.as_f64()?;
        let upper = field("xaxis.range[1]")?.as_f64()?;
        Some(ZoomEvent::Range(lower, upper))
    }

    fn axis_update(range: [f64; 2]) -> Result<JsValue, JsValue> {
        let update = js_sys::Object::new();
        let bounds = js_sys::Array::of2(&JsValue::from_f64(range[0]), &JsValue::from_f64(range[1]));
        js_sys::Reflect::set(&update, &JsValue::from_str("xaxis.range"), &bounds)?;
        Ok(update.into())
    }

    fn clicked_key(payload: &JsValue) -> Option<String> {
        let points = js_sys::Reflect::get(payload, &JsValue::from_str("points")).ok()?;
        if !js_sys::Array::is_array(&points) {
            return None;
        }
        let first = js_sys::Array::from(&points).get(0);
        js_sys::Reflect::get(&first, &JsValue::from_str("customdata"))
            .ok()?
            .as_string()
    }

    #[wasm_bindgen]
    pub fn mount_timeline_app(
        selector: &str,
        data_url: &str,
        config: Option<JsValue>,
    ) -> Result<(), JsValue> {
        let window: Window =
            web_sys::window().ok_or_else(|| JsValue::from_str("Không có window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Không truy cập được document"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Selector lỗi: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("Không tìm thấy element theo selector"))?;

        let config: TimelineConfig = match config {
            Some(value) if !value.is_undefined() && !value.is_null() => from_value(value)?,
            _ => TimelineConfig::default(),
        };

        yew::Renderer::<TimelineApp>::with_root_and_props(
            target,
            TimelineAppProps {
                data_url: AttrValue::from(data_url.to_string()),
                config,
            },
        )
        .render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::mount_timeline_app;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_timeline_app(
    _: &str,
    _: &str,
    _: Option<wasm_bindgen::JsValue>,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "chronicle-ui chỉ hỗ trợ biên dịch target wasm32",
    ))
}
