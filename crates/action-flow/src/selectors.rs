//! CSS selectors for the timesheet page.
//!
//! The page is a server-rendered component framework whose element ids carry a
//! generated prefix, so the defaults match on id suffixes. Every selector can be
//! overridden from the application config when the page layout changes.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSelectors {
    // Date header and calendar
    pub date_display: String,
    pub change_date_button: String,
    pub calendar_marker: String,
    pub calendar_title: String,
    pub calendar_previous: String,
    pub calendar_next: String,
    pub calendar_flagged_day: String,
    pub calendar_close_button: String,
    /// Id of the form the date bridge submits.
    pub date_form_id: String,

    // Incurring panel
    pub incurred_total: String,
    pub task_selector_trigger: String,
    pub task_option: String,
    pub task_selected_label: String,
    pub hours_input: String,
    pub minutes_input: String,
    pub create_button: String,
    pub modify_button: String,
    pub delete_button: String,
    /// Option texts that stand for "nothing selected".
    pub placeholder_markers: Vec<String>,

    // Task creation wizard
    pub new_task_button: String,
    pub coded_projects_button: String,
    pub project_search_input: String,
    pub project_results_trigger: String,
    pub project_results_option: String,
    pub project_results_confirm: String,
    pub task_type_trigger: String,
    pub task_type_option: String,
    pub task_type_submit: String,
    pub feature_trigger: String,
    pub feature_filter_input: String,
    pub feature_option: String,
    pub feature_confirm: String,
    pub technology_trigger: String,
    pub technology_option: String,
    pub wizard_hours_input: String,
    pub wizard_minutes_input: String,
    pub wizard_incur_button: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            date_display: "[id$='fechaIncurrido']".into(),
            change_date_button: "[id$='cambiarFecha']".into(),
            calendar_marker: ".ui-datepicker-calendar".into(),
            calendar_title: ".ui-datepicker-title".into(),
            calendar_previous: ".ui-datepicker-prev".into(),
            calendar_next: ".ui-datepicker-next".into(),
            calendar_flagged_day: ".ui-datepicker-calendar td.conIncurridos a".into(),
            calendar_close_button: "[id$='cerrarCalendario']".into(),
            date_form_id: "formFecha".into(),

            incurred_total: "[id$='totalIncurrido']".into(),
            task_selector_trigger: "[id$='selectorTarea'] .ui-selectonemenu-trigger".into(),
            task_option: "[id$='selectorTarea_items'] li.ui-selectonemenu-item".into(),
            task_selected_label: "[id$='selectorTarea_label']".into(),
            hours_input: "[id$='horas']".into(),
            minutes_input: "[id$='minutos']".into(),
            create_button: "[id$='btnIncurrir']".into(),
            modify_button: "[id$='btnModificar']".into(),
            delete_button: "[id$='btnEliminar']".into(),
            placeholder_markers: vec!["Seleccione".into(), "--".into()],

            new_task_button: "[id$='btnNuevaTarea']".into(),
            coded_projects_button: "[id$='btnProyectosConCodigo']".into(),
            project_search_input: "[id$='codigoProyecto']".into(),
            project_results_trigger: "[id$='resultadoProyectos'] .ui-selectonemenu-trigger".into(),
            project_results_option: "[id$='resultadoProyectos_items'] li".into(),
            project_results_confirm: "[id$='btnAceptarProyecto']".into(),
            task_type_trigger: "[id$='tipoTarea'] .ui-selectonemenu-trigger".into(),
            task_type_option: "[id$='tipoTarea_items'] li".into(),
            task_type_submit: "[id$='btnAceptarTipo']".into(),
            feature_trigger: "[id$='funcionalidad'] .ui-selectonemenu-trigger".into(),
            feature_filter_input: "[id$='funcionalidad_filter']".into(),
            feature_option: "[id$='funcionalidad_items'] li".into(),
            feature_confirm: "[id$='btnAceptarFuncionalidad']".into(),
            technology_trigger: "[id$='tecnologia'] .ui-selectonemenu-trigger".into(),
            technology_option: "[id$='tecnologia_items'] li".into(),
            wizard_hours_input: "[id$='horasNuevaTarea']".into(),
            wizard_minutes_input: "[id$='minutosNuevaTarea']".into(),
            wizard_incur_button: "[id$='btnIncurrirNuevaTarea']".into(),
        }
    }
}

impl PageSelectors {
    pub fn is_placeholder(&self, option_text: &str) -> bool {
        let trimmed = option_text.trim();
        trimmed.is_empty()
            || self
                .placeholder_markers
                .iter()
                .any(|marker| trimmed.starts_with(marker.as_str()))
    }
}
