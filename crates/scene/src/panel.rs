use std::fmt;

use catalog::{DirectoryKey, ProjectDirectory, ProjectRecord, RegionCatalog};

use crate::selection::Selection;

pub const COUNTRY_TITLE: &str = "Argentina";
pub const NO_SELECTION_HINT: &str = "Hacé clic sobre una provincia para ver proyectos de divulgación, o seleccioná el círculo para información general.";
pub const NO_PROJECTS_MESSAGE: &str =
    "No hemos encontrado un proyecto de divulgación para esta provincia.";

/// Detail panel contents for the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel<'a> {
    /// `None` when nothing is selected.
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub projects: &'a [ProjectRecord],
}

impl<'a> Panel<'a> {
    pub fn build(
        selection: &Selection,
        catalog: &'a RegionCatalog,
        directory: &'a ProjectDirectory,
    ) -> Self {
        match selection {
            Selection::None => Self {
                title: None,
                description: None,
                projects: &[],
            },
            Selection::Country => Self {
                title: Some(COUNTRY_TITLE),
                description: None,
                projects: directory.projects_for(DirectoryKey::National),
            },
            Selection::Region(id) => match catalog.get(id.as_str()) {
                Some(region) => Self {
                    title: Some(region.display_name.as_str()),
                    description: Some(region.description.as_str()),
                    projects: directory
                        .projects_for(DirectoryKey::Province(&region.display_name)),
                },
                None => Self {
                    title: None,
                    description: None,
                    projects: &[],
                },
            },
        }
    }

    pub fn is_open(&self) -> bool {
        self.title.is_some()
    }
}

impl fmt::Display for Panel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(title) = self.title else {
            return writeln!(f, "{NO_SELECTION_HINT}");
        };
        writeln!(f, "{title}")?;
        if let Some(description) = self.description {
            writeln!(f, "{description}")?;
        }
        if self.projects.is_empty() {
            return writeln!(f, "\n{NO_PROJECTS_MESSAGE}");
        }
        for project in self.projects {
            writeln!(f, "\n{}", project.name)?;
            for contact in &project.contacts {
                writeln!(f, "  {}: {} <{}>", contact.label, contact.value, contact.href)?;
            }
        }
        Ok(())
    }
}
