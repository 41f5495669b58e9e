//! FakePage setups shared by the flow tests.

use std::sync::Arc;

use action_primitives::fake::{FakeDom, FakePage};
use autoincur_core_types::{format_clock, last_clock_in};

use crate::policy::FlowTimeouts;
use crate::selectors::PageSelectors;
use crate::timesheet::Timesheet;

pub fn fast_timeouts() -> FlowTimeouts {
    FlowTimeouts {
        poll_interval_ms: 5,
        element_ms: 200,
        option_lookup_ms: 60,
        calendar_ms: 200,
        page_refresh_ms: 300,
        incurred_change_ms: 200,
        wizard_step_ms: 100,
        settle_ms: 0,
        field_settle_ms: 0,
    }
}

pub fn sheet_for(fixture: &SheetFixture) -> Timesheet {
    Timesheet::new(
        Arc::new(fixture.page.clone()),
        fixture.selectors.clone(),
        fast_timeouts(),
    )
}

fn total_text(minutes: u32) -> String {
    format!("Total: {}", format_clock(minutes))
}

fn read_total(dom: &FakeDom, selector: &str) -> u32 {
    dom.text_of(selector)
        .and_then(|text| last_clock_in(&text))
        .unwrap_or(0)
}

fn typed_minutes(dom: &FakeDom, hours: &str, minutes: &str) -> u32 {
    let parse = |selector: &str| {
        dom.value_of(selector)
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(0)
    };
    parse(hours) * 60 + parse(minutes)
}

/// A timesheet page with the incurring panel rendered.
///
/// Pressing create or modify adds the typed time to the total; pressing an
/// option copies its text into the selection label.
pub struct SheetFixture {
    pub page: FakePage,
    pub selectors: PageSelectors,
}

impl SheetFixture {
    pub fn new(total: &str) -> Self {
        let selectors = PageSelectors::default();
        let page = FakePage::new();
        page.with_dom(|dom| {
            dom.add(&selectors.date_display, "17 de marzo de 2025");
            dom.add(&selectors.incurred_total, &format!("Total: {total}"));
            dom.add(&selectors.task_selector_trigger, "");
            dom.add(&selectors.task_selected_label, "");
            dom.add(&selectors.hours_input, "");
            dom.add(&selectors.minutes_input, "");
            dom.add(&selectors.create_button, "Incurrir");
            dom.add(&selectors.modify_button, "Modificar");
        });

        let label = selectors.task_selected_label.clone();
        page.on_press(&selectors.task_option, move |dom| {
            if let Some(text) = dom.last_pressed().map(|el| el.text.clone()) {
                dom.set_text(&label, &text);
            }
        });

        for button in [&selectors.create_button, &selectors.modify_button] {
            let (hours, minutes, total) = (
                selectors.hours_input.clone(),
                selectors.minutes_input.clone(),
                selectors.incurred_total.clone(),
            );
            page.on_press(button, move |dom| {
                let added = typed_minutes(dom, &hours, &minutes);
                let current = read_total(dom, &total);
                dom.set_text(&total, &total_text(current + added));
            });
        }

        Self { page, selectors }
    }

    pub fn add_option(&self, text: &str) {
        let selector = self.selectors.task_option.clone();
        self.page.with_dom(|dom| {
            dom.add(&selector, text);
        });
    }

    pub fn option_count(&self) -> usize {
        self.page
            .with_dom(|dom| dom.elements(&self.selectors.task_option).len())
    }

    pub fn show_date(&self, text: &str) {
        self.page
            .with_dom(|dom| dom.set_text(&self.selectors.date_display, text));
    }

    pub fn total(&self) -> Option<String> {
        self.page
            .with_dom(|dom| dom.text_of(&self.selectors.incurred_total))
    }

    /// Renders the wizard controls. Without `with_project_result` the project
    /// search returns nothing, so the wizard fails at step 4.
    pub fn install_wizard(&self, with_project_result: bool) {
        let s = &self.selectors;
        self.page.with_dom(|dom| {
            dom.add(&s.new_task_button, "Nueva tarea");
            dom.add(&s.coded_projects_button, "Proyectos con código");
            dom.add(&s.project_search_input, "");
            dom.add(&s.project_results_trigger, "");
            if with_project_result {
                dom.add(&s.project_results_option, "SDA-COMMON Proyectos comunes");
            }
            dom.add(&s.project_results_confirm, "Aceptar");
            dom.add(&s.task_type_trigger, "");
            dom.add(&s.task_type_option, "Diseño");
            dom.add(&s.task_type_option, "Construcción");
            dom.add(&s.task_type_submit, "Aceptar");
            dom.add(&s.feature_trigger, "");
            dom.add(&s.feature_filter_input, "");
            dom.add(&s.feature_option, "PRJ-9 Facturación");
            dom.add(&s.feature_confirm, "Aceptar");
            dom.add(&s.technology_trigger, "");
            dom.add(&s.technology_option, "Java");
            dom.add(&s.wizard_hours_input, "");
            dom.add(&s.wizard_minutes_input, "");
            dom.add(&s.wizard_incur_button, "Incurrir");
        });

        let (hours, minutes, total) = (
            s.wizard_hours_input.clone(),
            s.wizard_minutes_input.clone(),
            s.incurred_total.clone(),
        );
        self.page.on_press(&s.wizard_incur_button, move |dom| {
            let added = typed_minutes(dom, &hours, &minutes);
            let current = read_total(dom, &total);
            dom.set_text(&total, &total_text(current + added));
        });
    }

    /// Renders a calendar showing `title` with `flagged` day cells.
    pub fn install_calendar(&self, title: &str, flagged: &[u32]) {
        let s = &self.selectors;
        self.page.with_dom(|dom| {
            dom.add(&s.change_date_button, "Cambiar fecha");
            dom.add(&s.calendar_marker, "");
            dom.add(&s.calendar_title, title);
            for day in flagged {
                dom.add(&s.calendar_flagged_day, &day.to_string());
            }
            dom.add(&s.calendar_close_button, "Cerrar");
        });
    }

    /// Page script hook that renders the date requested through the body
    /// attributes, the way the real bridge triggers a page refresh. The newly
    /// shown day starts with nothing incurred.
    pub fn install_bridge(&self) {
        let display = self.selectors.date_display.clone();
        let total = self.selectors.incurred_total.clone();
        self.page.on_page_script(move |dom| {
            let Some(requested) = dom.body_attribute("data-autoincur-date").map(str::to_string)
            else {
                return;
            };
            let mut parts = requested.split('/');
            let day = parts.next().and_then(|d| d.parse::<u32>().ok()).unwrap_or(0);
            dom.set_text(&display, &format!("{day} de marzo de 2025"));
            dom.set_text(&total, &total_text(0));
        });
    }

    /// Delete removes the selected option and subtracts its time.
    pub fn install_delete(&self) {
        let s = &self.selectors;
        self.page.with_dom(|dom| {
            dom.add(&s.delete_button, "Eliminar");
        });
        let (label, option, total) = (
            s.task_selected_label.clone(),
            s.task_option.clone(),
            s.incurred_total.clone(),
        );
        self.page.on_press(&s.delete_button, move |dom| {
            let selected = dom.text_of(&label).unwrap_or_default();
            let Some(entry) = dom
                .elements(&option)
                .into_iter()
                .find(|el| el.text == selected)
            else {
                return;
            };
            let removed = last_clock_in(&entry.text).unwrap_or(0);
            dom.remove_ref(&entry.reference);
            let current = read_total(dom, &total);
            dom.set_text(&total, &total_text(current.saturating_sub(removed)));
        });
    }
}
