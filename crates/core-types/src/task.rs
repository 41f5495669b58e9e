use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Task types known to the timesheet, in incurring precedence order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Design,
    Build,
    Test,
    Deploy,
    Other(String),
}

impl TaskType {
    /// Maps a configured label (English or Spanish) onto a task type.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "design" | "diseño" | "diseno" | "análisis" | "analisis" => TaskType::Design,
            "build" | "construction" | "construcción" | "construccion" | "desarrollo" => {
                TaskType::Build
            }
            "test" | "testing" | "pruebas" | "prueba" => TaskType::Test,
            "deploy" | "deployment" | "despliegue" | "implantación" | "implantacion" => {
                TaskType::Deploy
            }
            _ => TaskType::Other(label.trim().to_string()),
        }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            TaskType::Design => 0,
            TaskType::Build => 1,
            TaskType::Test => 2,
            TaskType::Deploy => 3,
            TaskType::Other(_) => 4,
        }
    }

    /// Label shown by the timesheet inside the task option text.
    pub fn display_name(&self) -> &str {
        match self {
            TaskType::Design => "Diseño",
            TaskType::Build => "Construcción",
            TaskType::Test => "Pruebas",
            TaskType::Deploy => "Despliegue",
            TaskType::Other(label) => label.as_str(),
        }
    }

    /// Bracketed name, which is how task options identify their type.
    pub fn bracketed_name(&self) -> String {
        format!("[{}]", self.display_name())
    }
}

impl Default for TaskType {
    fn default() -> Self {
        TaskType::Build
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl PartialOrd for TaskType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TaskType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence().cmp(&other.precedence()).then_with(|| {
            match (self, other) {
                (TaskType::Other(a), TaskType::Other(b)) => a.cmp(b),
                _ => Ordering::Equal,
            }
        })
    }
}

/// A unit of work for the incurring loop: one task type on one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTask {
    pub name: String,
    pub task_type: TaskType,
    pub project_code: String,
    pub hours: u32,
    pub minutes: u32,
}

impl PlannedTask {
    pub fn new(task_type: TaskType, project_code: impl Into<String>, total_minutes: u32) -> Self {
        Self {
            name: task_type.bracketed_name(),
            task_type,
            project_code: project_code.into(),
            hours: total_minutes / 60,
            minutes: total_minutes % 60,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }

    pub fn hours_text(&self) -> String {
        self.hours.to_string()
    }

    pub fn minutes_text(&self) -> String {
        self.minutes.to_string()
    }

    /// Text fragments that an existing task option must all contain.
    pub fn option_markers(&self) -> [&str; 2] {
        [self.name.as_str(), self.project_code.as_str()]
    }
}

impl fmt::Display for PlannedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}h {:02}m)",
            self.name, self.project_code, self.hours, self.minutes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_map_to_known_types() {
        assert_eq!(TaskType::from_label("Diseño"), TaskType::Design);
        assert_eq!(TaskType::from_label(" build "), TaskType::Build);
        assert_eq!(TaskType::from_label("PRUEBAS"), TaskType::Test);
        assert_eq!(TaskType::from_label("despliegue"), TaskType::Deploy);
        assert_eq!(
            TaskType::from_label("Soporte"),
            TaskType::Other("Soporte".into())
        );
    }

    #[test]
    fn precedence_orders_design_first_and_unknown_last() {
        let mut types = vec![
            TaskType::Other("Soporte".into()),
            TaskType::Deploy,
            TaskType::Build,
            TaskType::Design,
            TaskType::Test,
        ];
        types.sort();
        assert_eq!(
            types,
            vec![
                TaskType::Design,
                TaskType::Build,
                TaskType::Test,
                TaskType::Deploy,
                TaskType::Other("Soporte".into()),
            ]
        );
    }

    #[test]
    fn planned_task_splits_minutes() {
        let task = PlannedTask::new(TaskType::Build, "PRJ-1", 150);
        assert_eq!(task.hours, 2);
        assert_eq!(task.minutes, 30);
        assert_eq!(task.total_minutes(), 150);
        assert_eq!(task.name, "[Construcción]");
        assert_eq!(task.option_markers(), ["[Construcción]", "PRJ-1"]);
    }
}
